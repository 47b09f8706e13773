//! Roster façade used by UI and CLI surfaces.

use parish_roster_core::id::{EventId, PersonId};
use parish_roster_core::pool::resolve;
use parish_roster_core::{Assignment, Candidates, Event, Person, PoolContext, PoolRequest, SlotState};

use crate::config::ReplaceStrategy;
use crate::coordinator::{
    RemoveOutcome, ReplaceOutcome, ReplaceRequest, RosterCoordinator, RosterError, RosterStore,
};
use crate::directory::PersonDirectory;

/// One slot of an event roster with people resolved through the directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterEntry {
    /// Stored record.
    pub assignment: Assignment,
    /// Volunteer named on the record.
    pub volunteer: Option<Person>,
    /// Person currently serving the slot.
    pub holder: Option<Person>,
    /// Who made the booking.
    pub assigner: Option<Person>,
}

impl RosterEntry {
    /// Active or replaced.
    pub const fn state(&self) -> SlotState {
        self.assignment.slot
    }
}

/// Candidate resolution and roster mutation over a store and a directory.
pub struct RosterService<S, D> {
    coordinator: RosterCoordinator<S>,
    directory: D,
}

impl<S, D> RosterService<S, D> {
    /// Construct a new service.
    pub const fn new(store: S, directory: D, strategy: ReplaceStrategy) -> Self {
        Self {
            coordinator: RosterCoordinator::new(store, strategy),
            directory,
        }
    }

    /// Borrow the coordinator.
    pub const fn coordinator(&self) -> &RosterCoordinator<S> {
        &self.coordinator
    }

    /// Borrow the directory.
    pub const fn directory(&self) -> &D {
        &self.directory
    }
}

impl<S, D> RosterService<S, D>
where
    S: RosterStore,
    D: PersonDirectory,
{
    fn directory_error(err: D::Error) -> RosterError {
        RosterError::Directory(err.into())
    }

    /// Everyone eligible for `request`, before removing booked people.
    ///
    /// Only the directory data the matching rule reads is fetched.
    ///
    /// # Errors
    /// Returns [`RosterError::Directory`] when a lookup fails.
    pub fn resolve_candidates(&self, request: &PoolRequest<'_>) -> Result<Candidates, RosterError> {
        let Some(rule) = request.rule() else {
            return Ok(Candidates::Ready(Vec::new()));
        };

        let mut ctx = PoolContext::default();
        if rule.needs_coordinated() {
            ctx.coordinated = self
                .directory
                .coordinated_ministries(request.requester.id)
                .map_err(Self::directory_error)?;
        }
        if rule.needs_platform() {
            ctx.platform = self
                .directory
                .platform_pool()
                .map_err(Self::directory_error)?;
        }
        for ministry in rule.ministries(request, &ctx.coordinated) {
            let pool = self
                .directory
                .ministry_pool(ministry)
                .map_err(Self::directory_error)?;
            ctx.ministries.insert(ministry, pool);
        }

        Ok(resolve(request, &ctx))
    }

    /// Eligible people who are not already booked on the event. `keep`
    /// stays selectable even when booked, for re-opening a slot's dialog.
    ///
    /// # Errors
    /// Returns [`RosterError`] when the directory or store fails.
    pub fn offer_candidates(
        &self,
        request: &PoolRequest<'_>,
        keep: Option<PersonId>,
    ) -> Result<Candidates, RosterError> {
        let candidates = self.resolve_candidates(request)?;
        if candidates.is_loading() {
            return Ok(candidates);
        }
        let booked = self.coordinator.booked(request.event.id)?;
        Ok(candidates.exclude(&booked, keep))
    }

    /// Book `volunteers` onto `event`, all or nothing.
    ///
    /// # Errors
    /// See [`RosterCoordinator::add_volunteers`].
    pub fn add_volunteers(
        &self,
        event: &Event,
        volunteers: &[PersonId],
        assigner: PersonId,
    ) -> Result<Vec<Assignment>, RosterError> {
        self.coordinator.add_volunteers(event, volunteers, assigner)
    }

    /// Point a slot at a new replacement.
    ///
    /// # Errors
    /// See [`RosterCoordinator::replace_volunteer`].
    pub fn replace_volunteer(&self, request: ReplaceRequest) -> Result<ReplaceOutcome, RosterError> {
        self.coordinator.replace_volunteer(request)
    }

    /// Drop a volunteer or replacement from `event`.
    ///
    /// # Errors
    /// See [`RosterCoordinator::remove_volunteer`].
    pub fn remove_volunteer(
        &self,
        event: EventId,
        target: Option<PersonId>,
    ) -> Result<RemoveOutcome, RosterError> {
        self.coordinator.remove_volunteer(event, target)
    }

    /// Current slots of `event` in booking order.
    ///
    /// # Errors
    /// Returns [`RosterError`] when the directory or store fails.
    pub fn roster(&self, event: EventId) -> Result<Vec<RosterEntry>, RosterError> {
        let mut rows = self.coordinator.assignments(event)?;
        rows.sort_by_key(|row| (row.assigned_at, row.id));

        rows.into_iter()
            .map(|assignment| {
                let lookup = |id| self.directory.person(id).map_err(Self::directory_error);
                Ok(RosterEntry {
                    volunteer: lookup(assignment.volunteer_id)?,
                    holder: lookup(assignment.holder())?,
                    assigner: lookup(assignment.assigner_id)?,
                    assignment,
                })
            })
            .collect()
    }
}
