//! Property checks for resolve + exclude.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use parish_roster_core::id::{EventId, MinistryId, PersonId};
use parish_roster_core::pool::resolve;
use parish_roster_core::{
    Assignment, Candidates, Event, ExclusionSet, Loadable, MinistryPool, Person, PoolContext,
    PoolRequest, Requester, Role, SlotState,
};
use proptest::prelude::*;

#[derive(Clone, Debug)]
enum Row {
    Active(usize),
    Replaced(usize, usize),
}

fn row_strategy(people: usize) -> impl Strategy<Value = Row> {
    prop_oneof![
        (0..people).prop_map(Row::Active),
        (0..people, 0..people).prop_map(|(v, r)| Row::Replaced(v, r)),
    ]
}

fn roles() -> impl Strategy<Value = Role> {
    prop_oneof![
        Just(Role::Admin),
        Just(Role::Coordinator),
        Just(Role::Volunteer),
    ]
}

const PEOPLE: usize = 12;

proptest! {
    #[test]
    fn offered_people_are_never_booked(
        rows in prop::collection::vec(row_strategy(PEOPLE), 0..16),
        role in roles(),
        private in any::<bool>(),
        keep in prop::option::of(0..PEOPLE),
    ) {
        let people: Vec<Person> = (0..PEOPLE)
            .map(|i| Person::new(PersonId::new(), format!("P{i}"), "Test", Role::Volunteer))
            .collect();
        let ministry = MinistryId::new();
        let event = if private {
            Event::private(EventId::new(), ministry)
        } else {
            Event::public(EventId::new())
        };

        let (volunteers, coordinators) = people.split_at(PEOPLE / 2);
        let mut ctx = PoolContext {
            platform: people.clone(),
            coordinated: vec![ministry],
            ..PoolContext::default()
        };
        ctx.ministries.insert(
            ministry,
            Loadable::Ready(MinistryPool {
                volunteers: volunteers.to_vec(),
                coordinators: coordinators.to_vec(),
            }),
        );

        let assigner = PersonId::new();
        let assignments: Vec<Assignment> = rows
            .iter()
            .map(|row| match *row {
                Row::Active(v) => Assignment::new(event.id, people[v].id, assigner),
                Row::Replaced(v, r) => {
                    let mut a = Assignment::new(event.id, people[v].id, assigner);
                    a.slot = SlotState::Replaced { by: people[r].id };
                    a
                }
            })
            .collect();

        let keep_id = keep.map(|k| people[k].id);
        let requester = Requester { id: assigner, role };
        let booked = ExclusionSet::from_assignments(&assignments);
        let offered = resolve(&PoolRequest::new(&event, requester), &ctx).exclude(&booked, keep_id);

        let Candidates::Ready(offered) = offered else {
            panic!("context is fully loaded");
        };
        for person in &offered {
            let is_active = assignments
                .iter()
                .any(|a| a.is_active() && a.volunteer_id == person.id);
            let is_replacement = assignments
                .iter()
                .any(|a| a.slot.replaced_by() == Some(person.id));
            prop_assert!(
                Some(person.id) == keep_id || (!is_active && !is_replacement),
                "{} was offered while booked",
                person.first_name
            );
        }

        let mut ids: Vec<PersonId> = offered.iter().map(|p| p.id).collect();
        ids.sort();
        ids.dedup();
        prop_assert_eq!(ids.len(), offered.len());
    }
}
