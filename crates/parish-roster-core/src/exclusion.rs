//! Who is already booked on an event and therefore must not be offered again.

use crate::assignment::Assignment;
use crate::id::PersonId;
use crate::person::Person;
use std::collections::BTreeSet;
use std::fmt;

/// Why a person cannot take another slot on an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Conflict {
    /// Holds an active original slot.
    AlreadyActive,
    /// Is standing in for someone else's slot.
    LiveReplacement,
    /// Appears more than once in the same batch.
    RepeatedInBatch,
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::AlreadyActive => "already holds an active slot",
            Self::LiveReplacement => "is already serving as a replacement",
            Self::RepeatedInBatch => "was listed more than once",
        };
        f.write_str(text)
    }
}

/// Booked people of one event, recomputed from the assignment rows on every read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionSet {
    active: BTreeSet<PersonId>,
    live_replacements: BTreeSet<PersonId>,
    // Still named as `volunteerId` on a replaced row: hidden from offers for
    // other slots, but not a booking conflict.
    stood_down: BTreeSet<PersonId>,
}

impl ExclusionSet {
    /// Collect active volunteers and live replacements from `assignments`.
    ///
    /// Callers pass the rows of a single event.
    pub fn from_assignments<'a, I>(assignments: I) -> Self
    where
        I: IntoIterator<Item = &'a Assignment>,
    {
        let mut set = Self::default();
        for row in assignments {
            if row.is_active() {
                set.active.insert(row.volunteer_id);
            } else {
                set.stood_down.insert(row.volunteer_id);
            }
            if let Some(by) = row.slot.replaced_by() {
                set.live_replacements.insert(by);
            }
        }
        set
    }

    /// Why `person` may not be booked, if anything stops it.
    #[must_use]
    pub fn conflict(&self, person: PersonId) -> Option<Conflict> {
        if self.active.contains(&person) {
            Some(Conflict::AlreadyActive)
        } else if self.live_replacements.contains(&person) {
            Some(Conflict::LiveReplacement)
        } else {
            None
        }
    }

    /// Whether `person` is active or a live replacement.
    #[must_use]
    pub fn is_booked(&self, person: PersonId) -> bool {
        self.conflict(person).is_some()
    }

    /// Whether `person` may be offered for another slot: not booked and not
    /// the original holder of a replaced slot.
    #[must_use]
    pub fn is_offerable(&self, person: PersonId) -> bool {
        !self.is_booked(person) && !self.stood_down.contains(&person)
    }

    /// Drop candidates who may not be offered, keeping `keep` regardless.
    #[must_use]
    pub fn filter(&self, candidates: Vec<Person>, keep: Option<PersonId>) -> Vec<Person> {
        candidates
            .into_iter()
            .filter(|person| Some(person.id) == keep || self.is_offerable(person.id))
            .collect()
    }

    /// First conflict in `batch`, checking each id against the event and
    /// against earlier ids of the same batch.
    #[must_use]
    pub fn batch_conflict(&self, batch: &[PersonId]) -> Option<(PersonId, Conflict)> {
        let mut seen = BTreeSet::new();
        for &person in batch {
            if let Some(conflict) = self.conflict(person) {
                return Some((person, conflict));
            }
            if !seen.insert(person) {
                return Some((person, Conflict::RepeatedInBatch));
            }
        }
        None
    }
}

/// Remove already-booked people from `candidates`, except `keep`.
#[must_use]
pub fn filter(candidates: Vec<Person>, assignments: &[Assignment], keep: Option<PersonId>) -> Vec<Person> {
    ExclusionSet::from_assignments(assignments).filter(candidates, keep)
}
