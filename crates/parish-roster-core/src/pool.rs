//! Candidate pools: which people may be offered for an event.
//!
//! The role × visibility matrix is the [`RULES`] table; each [`PoolRule`]
//! reads only the directory data it names from a [`PoolContext`].

use crate::event::{Event, Visibility};
use crate::exclusion::ExclusionSet;
use crate::id::{MinistryId, PersonId};
use crate::person::{Person, Requester, Role};
use std::collections::{BTreeMap, BTreeSet};

/// Directory data that may still be in flight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Loadable<T> {
    /// Still being fetched.
    Loading,
    /// Available.
    Ready(T),
}

/// Volunteer group and coordinators of one ministry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MinistryPool {
    /// Members of the ministry's "Volunteers" group.
    pub volunteers: Vec<Person>,
    /// Ministry coordinators.
    pub coordinators: Vec<Person>,
}

impl MinistryPool {
    /// Volunteers first, then coordinators.
    pub fn members(&self) -> impl Iterator<Item = &Person> {
        self.volunteers.iter().chain(self.coordinators.iter())
    }
}

/// Pre-fetched directory data a rule reads from.
///
/// A ministry absent from `ministries` is treated as still loading.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoolContext {
    /// Platform-wide volunteers, coordinators and admins.
    pub platform: Vec<Person>,
    /// Pools of the ministries the rule needs.
    pub ministries: BTreeMap<MinistryId, Loadable<MinistryPool>>,
    /// Ministries the requester coordinates.
    pub coordinated: Vec<MinistryId>,
}

/// Resolver output. `Loading` is the disabled placeholder shown while a
/// ministry pool is in flight, distinct from an empty `Ready` list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Candidates {
    /// A required ministry pool has not loaded yet.
    Loading,
    /// Eligible people, unique by id.
    Ready(Vec<Person>),
}

impl Candidates {
    /// Whether the placeholder is being returned.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    /// Eligible people (empty while loading).
    #[must_use]
    pub fn people(&self) -> &[Person] {
        match self {
            Self::Loading => &[],
            Self::Ready(people) => people,
        }
    }

    /// Apply the exclusion filter, leaving the placeholder untouched.
    #[must_use]
    pub fn exclude(self, booked: &ExclusionSet, keep: Option<PersonId>) -> Self {
        match self {
            Self::Loading => Self::Loading,
            Self::Ready(people) => Self::Ready(booked.filter(people, keep)),
        }
    }
}

/// One cell of the role × visibility matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PoolRule {
    /// Everyone on the platform who serves: volunteers, coordinators, admins.
    PlatformWide,
    /// The event's own ministry pool.
    EventMinistry,
    /// Union of every ministry the requester coordinates, else platform-wide.
    CoordinatedMinistries,
    /// The explicitly selected ministry's pool.
    SelectedMinistry,
}

/// Role × visibility lookup table.
pub const RULES: &[(Role, Visibility, PoolRule)] = &[
    (Role::Admin, Visibility::Public, PoolRule::PlatformWide),
    (Role::Admin, Visibility::Private, PoolRule::EventMinistry),
    (Role::Coordinator, Visibility::Public, PoolRule::CoordinatedMinistries),
    (Role::Coordinator, Visibility::Private, PoolRule::SelectedMinistry),
    (Role::Volunteer, Visibility::Public, PoolRule::CoordinatedMinistries),
    (Role::Volunteer, Visibility::Private, PoolRule::SelectedMinistry),
];

/// Rule for a requester role and event visibility. Roles without an entry
/// never see candidates.
#[must_use]
pub fn rule_for(role: Role, visibility: Visibility) -> Option<PoolRule> {
    RULES
        .iter()
        .find(|(r, v, _)| *r == role && *v == visibility)
        .map(|&(_, _, rule)| rule)
}

/// Inputs of a single resolution.
#[derive(Debug, Clone, Copy)]
pub struct PoolRequest<'a> {
    /// Event being staffed.
    pub event: &'a Event,
    /// Who is asking.
    pub requester: Requester,
    /// Ministry picked in the caller's selector; defaults to the event's.
    pub selection: Option<MinistryId>,
}

impl<'a> PoolRequest<'a> {
    /// Request with no explicit ministry selection.
    #[must_use]
    pub const fn new(event: &'a Event, requester: Requester) -> Self {
        Self {
            event,
            requester,
            selection: None,
        }
    }

    /// Override the ministry selection.
    #[must_use]
    pub const fn with_selection(mut self, ministry: Option<MinistryId>) -> Self {
        self.selection = ministry;
        self
    }

    /// Rule this request resolves under.
    #[must_use]
    pub fn rule(&self) -> Option<PoolRule> {
        rule_for(self.requester.role, self.event.visibility)
    }

    /// Selected ministry, falling back to the event's own.
    #[must_use]
    pub fn selected_ministry(&self) -> Option<MinistryId> {
        self.selection.or(self.event.ministry_id)
    }
}

impl PoolRule {
    /// Whether the rule may read the platform-wide pool.
    #[must_use]
    pub const fn needs_platform(self) -> bool {
        matches!(self, Self::PlatformWide | Self::CoordinatedMinistries)
    }

    /// Whether the rule reads the requester's coordinated ministries.
    #[must_use]
    pub const fn needs_coordinated(self) -> bool {
        matches!(self, Self::CoordinatedMinistries)
    }

    /// Ministry pools the rule reads for `request`, given the requester's
    /// coordinated ministries.
    #[must_use]
    pub fn ministries(self, request: &PoolRequest<'_>, coordinated: &[MinistryId]) -> Vec<MinistryId> {
        match self {
            Self::PlatformWide => Vec::new(),
            Self::EventMinistry => request.event.ministry_id.into_iter().collect(),
            Self::SelectedMinistry => request.selected_ministry().into_iter().collect(),
            Self::CoordinatedMinistries => coordinated.to_vec(),
        }
    }

    /// Collect the pool for `request` from `ctx`.
    #[must_use]
    pub fn collect(self, request: &PoolRequest<'_>, ctx: &PoolContext) -> Candidates {
        match self {
            Self::PlatformWide => Candidates::Ready(unique(
                ctx.platform.iter().filter(|p| p.role.serves_events()),
            )),
            Self::EventMinistry => ministry_pool(ctx, request.event.ministry_id),
            Self::SelectedMinistry => ministry_pool(ctx, request.selected_ministry()),
            Self::CoordinatedMinistries => {
                let mut members = Vec::new();
                for ministry in &ctx.coordinated {
                    match ctx.ministries.get(ministry) {
                        Some(Loadable::Ready(pool)) => members.extend(pool.members()),
                        Some(Loadable::Loading) | None => return Candidates::Loading,
                    }
                }
                if members.is_empty() {
                    Self::PlatformWide.collect(request, ctx)
                } else {
                    Candidates::Ready(unique(members))
                }
            }
        }
    }
}

fn ministry_pool(ctx: &PoolContext, ministry: Option<MinistryId>) -> Candidates {
    let Some(ministry) = ministry else {
        return Candidates::Ready(Vec::new());
    };
    match ctx.ministries.get(&ministry) {
        Some(Loadable::Ready(pool)) => Candidates::Ready(unique(pool.members())),
        Some(Loadable::Loading) | None => Candidates::Loading,
    }
}

fn unique<'a, I>(people: I) -> Vec<Person>
where
    I: IntoIterator<Item = &'a Person>,
{
    let mut seen = BTreeSet::new();
    people
        .into_iter()
        .filter(|p| seen.insert(p.id))
        .cloned()
        .collect()
}

/// Eligible people for `request`, before exclusion.
#[must_use]
pub fn resolve(request: &PoolRequest<'_>, ctx: &PoolContext) -> Candidates {
    request
        .rule()
        .map_or(Candidates::Ready(Vec::new()), |rule| rule.collect(request, ctx))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::EventId;

    fn person(first: &str, role: Role) -> Person {
        Person::new(PersonId::new(), first, "Test", role)
    }

    fn ids(candidates: &Candidates) -> BTreeSet<PersonId> {
        candidates.people().iter().map(|p| p.id).collect()
    }

    fn requester(role: Role) -> Requester {
        Requester {
            id: PersonId::new(),
            role,
        }
    }

    #[test]
    fn table_covers_serving_roles_only() {
        for role in [Role::Admin, Role::Coordinator, Role::Volunteer] {
            for visibility in [Visibility::Public, Visibility::Private] {
                assert!(rule_for(role, visibility).is_some(), "{role:?}/{visibility:?}");
            }
        }
        assert_eq!(rule_for(Role::Parishioner, Visibility::Public), None);
        assert_eq!(rule_for(Role::Coparent, Visibility::Private), None);
    }

    #[test]
    fn admin_public_uses_platform_pool() {
        let admin = person("Ann", Role::Admin);
        let vol = person("Val", Role::Volunteer);
        let parishioner = person("Pat", Role::Parishioner);
        let ctx = PoolContext {
            platform: vec![admin.clone(), vol.clone(), parishioner, vol.clone()],
            ..PoolContext::default()
        };
        let event = Event::public(EventId::new());
        let out = resolve(&PoolRequest::new(&event, requester(Role::Admin)), &ctx);
        assert_eq!(out, Candidates::Ready(vec![admin, vol]));
    }

    #[test]
    fn admin_private_uses_event_ministry_and_ignores_selection() {
        let ministry = MinistryId::new();
        let other = MinistryId::new();
        let v1 = person("V1", Role::Volunteer);
        let c1 = person("C1", Role::Coordinator);
        let mut ctx = PoolContext::default();
        ctx.ministries.insert(
            ministry,
            Loadable::Ready(MinistryPool {
                volunteers: vec![v1.clone()],
                coordinators: vec![c1.clone()],
            }),
        );
        ctx.ministries
            .insert(other, Loadable::Ready(MinistryPool::default()));
        let event = Event::private(EventId::new(), ministry);
        let request = PoolRequest::new(&event, requester(Role::Admin)).with_selection(Some(other));
        assert_eq!(resolve(&request, &ctx), Candidates::Ready(vec![v1, c1]));
    }

    #[test]
    fn coordinator_public_unions_coordinated_ministries() {
        let (m1, m2) = (MinistryId::new(), MinistryId::new());
        let shared = person("Sam", Role::Volunteer);
        let a = person("A", Role::Volunteer);
        let b = person("B", Role::Coordinator);
        let mut ctx = PoolContext {
            coordinated: vec![m1, m2],
            platform: vec![person("Other", Role::Admin)],
            ..PoolContext::default()
        };
        ctx.ministries.insert(
            m1,
            Loadable::Ready(MinistryPool {
                volunteers: vec![shared.clone(), a.clone()],
                coordinators: vec![],
            }),
        );
        ctx.ministries.insert(
            m2,
            Loadable::Ready(MinistryPool {
                volunteers: vec![shared.clone()],
                coordinators: vec![b.clone()],
            }),
        );
        let event = Event::public(EventId::new());
        let out = resolve(&PoolRequest::new(&event, requester(Role::Coordinator)), &ctx);
        assert_eq!(out, Candidates::Ready(vec![shared, a, b]));
    }

    #[test]
    fn coordinator_public_falls_back_to_platform_pool() {
        let admin = person("Ann", Role::Admin);
        let ctx = PoolContext {
            platform: vec![admin.clone()],
            ..PoolContext::default()
        };
        let event = Event::public(EventId::new());
        let out = resolve(&PoolRequest::new(&event, requester(Role::Volunteer)), &ctx);
        assert_eq!(out, Candidates::Ready(vec![admin]));
    }

    #[test]
    fn private_without_selection_is_empty_not_error() {
        let mut event = Event::private(EventId::new(), MinistryId::new());
        event.ministry_id = None;
        let out = resolve(
            &PoolRequest::new(&event, requester(Role::Coordinator)),
            &PoolContext::default(),
        );
        assert_eq!(out, Candidates::Ready(Vec::new()));
        assert!(!out.is_loading());
    }

    #[test]
    fn loading_ministry_yields_placeholder() {
        let ministry = MinistryId::new();
        let mut ctx = PoolContext::default();
        ctx.ministries.insert(ministry, Loadable::Loading);
        let event = Event::private(EventId::new(), ministry);
        let out = resolve(&PoolRequest::new(&event, requester(Role::Coordinator)), &ctx);
        assert!(out.is_loading());
        assert!(out.people().is_empty());
    }

    #[test]
    fn coordinated_ministry_still_loading_blocks_public_pool() {
        let (ready, pending) = (MinistryId::new(), MinistryId::new());
        let mut ctx = PoolContext {
            coordinated: vec![ready, pending],
            platform: vec![person("Ann", Role::Admin)],
            ..PoolContext::default()
        };
        ctx.ministries.insert(
            ready,
            Loadable::Ready(MinistryPool {
                volunteers: vec![person("V", Role::Volunteer)],
                coordinators: vec![],
            }),
        );
        ctx.ministries.insert(pending, Loadable::Loading);
        let event = Event::public(EventId::new());

        let out = resolve(&PoolRequest::new(&event, requester(Role::Coordinator)), &ctx);
        assert!(out.is_loading());

        // A coordinated ministry missing from the context counts as loading too.
        ctx.ministries.remove(&pending);
        let out = resolve(&PoolRequest::new(&event, requester(Role::Volunteer)), &ctx);
        assert_eq!(out, Candidates::Loading);
    }

    #[test]
    fn selection_overrides_event_ministry_for_coordinators() {
        let (own, picked) = (MinistryId::new(), MinistryId::new());
        let v = person("V", Role::Volunteer);
        let mut ctx = PoolContext::default();
        ctx.ministries
            .insert(own, Loadable::Ready(MinistryPool::default()));
        ctx.ministries.insert(
            picked,
            Loadable::Ready(MinistryPool {
                volunteers: vec![v.clone()],
                coordinators: vec![],
            }),
        );
        let event = Event::private(EventId::new(), own);
        let request =
            PoolRequest::new(&event, requester(Role::Coordinator)).with_selection(Some(picked));
        assert_eq!(ids(&resolve(&request, &ctx)), BTreeSet::from([v.id]));
    }

    #[test]
    fn parishioner_sees_nobody() {
        let ctx = PoolContext {
            platform: vec![person("Ann", Role::Admin)],
            ..PoolContext::default()
        };
        let event = Event::public(EventId::new());
        let out = resolve(&PoolRequest::new(&event, requester(Role::Parishioner)), &ctx);
        assert_eq!(out, Candidates::Ready(Vec::new()));
    }

    #[test]
    fn rules_report_what_they_read() {
        let ministry = MinistryId::new();
        let event = Event::private(EventId::new(), ministry);
        let request = PoolRequest::new(&event, requester(Role::Admin));
        assert_eq!(PoolRule::EventMinistry.ministries(&request, &[]), vec![ministry]);
        assert!(PoolRule::PlatformWide.ministries(&request, &[ministry]).is_empty());
        assert!(PoolRule::CoordinatedMinistries.needs_platform());
        assert!(!PoolRule::SelectedMinistry.needs_coordinated());
    }
}
