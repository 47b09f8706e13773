//! Assignment record storage for parish-roster.
//!
//! Both stores hold a flat table of [`Assignment`] rows and answer the same
//! filtered queries. Conditional inserts check and write under one lock so two
//! concurrent bookings of the same person cannot both land.

mod error;
mod file;
mod memory;

pub use error::StoreError;
pub use file::FileStore;
pub use memory::MemoryStore;

use parish_roster_core::id::{EventId, PersonId};
use parish_roster_core::{Assignment, AssignmentFilter, AssignmentPatch, Conflict, ExclusionSet};
use std::collections::BTreeMap;

/// Result of a conditional batch insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// Every row was written.
    Inserted(usize),
    /// Nothing was written because `person` is already booked on `event`.
    Conflict {
        /// Event of the rejected row.
        event: EventId,
        /// First person found booked.
        person: PersonId,
        /// Why the booking was refused.
        conflict: Conflict,
    },
}

/// Result of a conditional update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// Patch applied to this many rows.
    Updated(usize),
    /// Nothing was written because `person` is already booked on `event`.
    Conflict {
        /// Event of the filtered rows.
        event: EventId,
        /// Person that would have been booked twice.
        person: PersonId,
        /// Why the update was refused.
        conflict: Conflict,
    },
}

/// Check `batch` against `rows` and append it only when no person in it is
/// already active or a live replacement on its event.
pub(crate) fn insert_if_vacant(rows: &mut Vec<Assignment>, batch: &[Assignment]) -> InsertOutcome {
    let mut by_event: BTreeMap<EventId, Vec<PersonId>> = BTreeMap::new();
    for row in batch {
        by_event.entry(row.event_id).or_default().push(row.volunteer_id);
    }

    for (event, people) in &by_event {
        let booked = ExclusionSet::from_assignments(rows.iter().filter(|r| r.event_id == *event));
        if let Some((person, conflict)) = booked.batch_conflict(people) {
            return InsertOutcome::Conflict {
                event: *event,
                person,
                conflict,
            };
        }
    }

    rows.extend(batch.iter().cloned());
    InsertOutcome::Inserted(batch.len())
}

pub(crate) fn find(rows: &[Assignment], filter: &AssignmentFilter) -> Vec<Assignment> {
    rows.iter().filter(|r| filter.matches(r)).cloned().collect()
}

pub(crate) fn update(rows: &mut [Assignment], filter: &AssignmentFilter, patch: &AssignmentPatch) -> usize {
    let mut touched = 0;
    for row in rows.iter_mut().filter(|r| filter.matches(r)) {
        patch.apply(row);
        touched += 1;
    }
    touched
}

/// Apply `patch` to the rows matching `filter` only when `incoming` is not
/// already active or a live replacement on the filter's event.
pub(crate) fn update_if_vacant(
    rows: &mut [Assignment],
    filter: &AssignmentFilter,
    patch: &AssignmentPatch,
    incoming: PersonId,
) -> UpdateOutcome {
    let booked = ExclusionSet::from_assignments(rows.iter().filter(|r| r.event_id == filter.event_id));
    if let Some(conflict) = booked.conflict(incoming) {
        return UpdateOutcome::Conflict {
            event: filter.event_id,
            person: incoming,
            conflict,
        };
    }
    UpdateOutcome::Updated(update(rows, filter, patch))
}

pub(crate) fn delete(rows: &mut Vec<Assignment>, filter: &AssignmentFilter) -> usize {
    let before = rows.len();
    rows.retain(|r| !filter.matches(r));
    before - rows.len()
}
