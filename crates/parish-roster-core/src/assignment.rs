//! Assignment records and the slot state machine.

use crate::error::ModelError;
use crate::id::{AssignmentId, EventId, PersonId};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// State of a single volunteer slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotState {
    /// The original volunteer still holds the slot.
    Active,
    /// Someone else is standing in for the original volunteer.
    Replaced {
        /// The live replacement.
        by: PersonId,
    },
}

impl SlotState {
    /// Whether the slot has been superseded.
    #[must_use]
    pub const fn is_replaced(self) -> bool {
        matches!(self, Self::Replaced { .. })
    }

    /// The live replacement, if any.
    #[must_use]
    pub const fn replaced_by(self) -> Option<PersonId> {
        match self {
            Self::Active => None,
            Self::Replaced { by } => Some(by),
        }
    }
}

/// One person booked onto one event. Replacement mutates this row in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "AssignmentRecord", into = "AssignmentRecord")]
pub struct Assignment {
    /// Record identifier.
    pub id: AssignmentId,
    /// Event the slot belongs to.
    pub event_id: EventId,
    /// Volunteer named on the record.
    pub volunteer_id: PersonId,
    /// Who made the booking.
    pub assigner_id: PersonId,
    /// When the booking was made (UTC).
    pub assigned_at: OffsetDateTime,
    /// Active or replaced.
    pub slot: SlotState,
}

impl Assignment {
    /// New active booking stamped with the current time.
    #[must_use]
    pub fn new(event_id: EventId, volunteer_id: PersonId, assigner_id: PersonId) -> Self {
        Self {
            id: AssignmentId::new(),
            event_id,
            volunteer_id,
            assigner_id,
            assigned_at: OffsetDateTime::now_utc(),
            slot: SlotState::Active,
        }
    }

    /// Whether the named volunteer still holds the slot.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self.slot, SlotState::Active)
    }

    /// Person currently serving in this slot.
    #[must_use]
    pub const fn holder(&self) -> PersonId {
        match self.slot {
            SlotState::Active => self.volunteer_id,
            SlotState::Replaced { by } => by,
        }
    }
}

/// Flat persisted shape: `{ id, eventId, volunteerId, assignerId, assignedAt, replaced, replacedById }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentRecord {
    /// Record identifier.
    pub id: AssignmentId,
    /// Event identifier.
    pub event_id: EventId,
    /// Volunteer identifier.
    pub volunteer_id: PersonId,
    /// Assigner identifier.
    pub assigner_id: PersonId,
    /// Booking time.
    #[serde(with = "time::serde::rfc3339")]
    pub assigned_at: OffsetDateTime,
    /// Superseded flag.
    #[serde(default)]
    pub replaced: bool,
    /// Live replacement.
    #[serde(default)]
    pub replaced_by_id: Option<PersonId>,
}

impl TryFrom<AssignmentRecord> for Assignment {
    type Error = ModelError;

    fn try_from(record: AssignmentRecord) -> Result<Self, Self::Error> {
        let slot = match (record.replaced, record.replaced_by_id) {
            (false, None) => SlotState::Active,
            (true, Some(by)) => SlotState::Replaced { by },
            (true, None) => return Err(ModelError::ReplacedWithoutReplacement(record.id)),
            (false, Some(_)) => return Err(ModelError::ReplacementOnActiveSlot(record.id)),
        };
        Ok(Self {
            id: record.id,
            event_id: record.event_id,
            volunteer_id: record.volunteer_id,
            assigner_id: record.assigner_id,
            assigned_at: record.assigned_at,
            slot,
        })
    }
}

impl From<Assignment> for AssignmentRecord {
    fn from(assignment: Assignment) -> Self {
        Self {
            id: assignment.id,
            event_id: assignment.event_id,
            volunteer_id: assignment.volunteer_id,
            assigner_id: assignment.assigner_id,
            assigned_at: assignment.assigned_at,
            replaced: assignment.slot.is_replaced(),
            replaced_by_id: assignment.slot.replaced_by(),
        }
    }
}

/// Row selector used by filtered reads, updates and deletes.
///
/// Unset fields match anything; the event is always required.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssignmentFilter {
    /// Event to search within.
    pub event_id: EventId,
    /// Match on `volunteerId`.
    pub volunteer_id: Option<PersonId>,
    /// Match on `replacedById`.
    pub replaced_by_id: Option<PersonId>,
    /// Match on the `replaced` flag.
    pub replaced: Option<bool>,
}

impl AssignmentFilter {
    /// Every row of `event_id`.
    #[must_use]
    pub const fn event(event_id: EventId) -> Self {
        Self {
            event_id,
            volunteer_id: None,
            replaced_by_id: None,
            replaced: None,
        }
    }

    /// Restrict to rows naming `volunteer`.
    #[must_use]
    pub const fn volunteer(mut self, volunteer: PersonId) -> Self {
        self.volunteer_id = Some(volunteer);
        self
    }

    /// Restrict to rows whose live replacement is `person`.
    #[must_use]
    pub const fn replaced_by(mut self, person: PersonId) -> Self {
        self.replaced_by_id = Some(person);
        self
    }

    /// Restrict on the `replaced` flag.
    #[must_use]
    pub const fn replaced(mut self, replaced: bool) -> Self {
        self.replaced = Some(replaced);
        self
    }

    /// Whether `row` satisfies every set condition.
    #[must_use]
    pub fn matches(&self, row: &Assignment) -> bool {
        row.event_id == self.event_id
            && self.volunteer_id.is_none_or(|v| row.volunteer_id == v)
            && self
                .replaced_by_id
                .is_none_or(|p| row.slot.replaced_by() == Some(p))
            && self.replaced.is_none_or(|r| row.slot.is_replaced() == r)
    }
}

/// Field changes applied by a filtered update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AssignmentPatch {
    /// New `volunteerId`.
    pub volunteer_id: Option<PersonId>,
    /// New slot state.
    pub slot: Option<SlotState>,
}

impl AssignmentPatch {
    /// Mark the slot as replaced by `by`.
    #[must_use]
    pub const fn replaced_by(by: PersonId) -> Self {
        Self {
            volunteer_id: None,
            slot: Some(SlotState::Replaced { by }),
        }
    }

    /// Also rewrite the named volunteer.
    #[must_use]
    pub const fn with_volunteer(mut self, volunteer: PersonId) -> Self {
        self.volunteer_id = Some(volunteer);
        self
    }

    /// Apply the patch to `row` in place.
    pub const fn apply(&self, row: &mut Assignment) {
        if let Some(volunteer) = self.volunteer_id {
            row.volunteer_id = volunteer;
        }
        if let Some(slot) = self.slot {
            row.slot = slot;
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used)]

    use super::*;

    fn sample() -> Assignment {
        Assignment::new(EventId::new(), PersonId::new(), PersonId::new())
    }

    #[test]
    fn record_uses_flat_flags() {
        let mut row = sample();
        let by = PersonId::new();
        row.slot = SlotState::Replaced { by };

        let value = serde_json::to_value(&row).expect("serialize assignment");
        assert_eq!(value["replaced"], serde_json::Value::Bool(true));
        assert_eq!(value["replacedById"], serde_json::Value::String(by.to_string()));
        assert!(value["assignedAt"].is_string());
        assert!(value.get("eventId").is_some());

        let back: Assignment = serde_json::from_value(value).expect("deserialize assignment");
        assert_eq!(back.slot, SlotState::Replaced { by });
    }

    #[test]
    fn active_record_has_null_replacement() {
        let value = serde_json::to_value(sample()).expect("serialize assignment");
        assert_eq!(value["replaced"], serde_json::Value::Bool(false));
        assert!(value["replacedById"].is_null());
    }

    #[test]
    fn rejects_inconsistent_flags() {
        let row = sample();
        let mut record = AssignmentRecord::from(row);
        record.replaced = true;
        assert!(matches!(
            Assignment::try_from(record.clone()),
            Err(ModelError::ReplacedWithoutReplacement(_))
        ));

        record.replaced = false;
        record.replaced_by_id = Some(PersonId::new());
        assert!(matches!(
            Assignment::try_from(record),
            Err(ModelError::ReplacementOnActiveSlot(_))
        ));
    }

    #[test]
    fn holder_follows_replacement() {
        let mut row = sample();
        assert_eq!(row.holder(), row.volunteer_id);
        let by = PersonId::new();
        AssignmentPatch::replaced_by(by).apply(&mut row);
        assert_eq!(row.holder(), by);
        assert!(!row.is_active());
    }

    #[test]
    fn filter_combines_conditions() {
        let mut row = sample();
        let base = AssignmentFilter::event(row.event_id);
        assert!(base.matches(&row));
        assert!(base.volunteer(row.volunteer_id).replaced(false).matches(&row));
        assert!(!base.replaced(true).matches(&row));
        assert!(!AssignmentFilter::event(EventId::new()).matches(&row));

        let by = PersonId::new();
        row.slot = SlotState::Replaced { by };
        assert!(base.replaced_by(by).replaced(true).matches(&row));
        assert!(!base.replaced_by(PersonId::new()).matches(&row));
    }

    #[test]
    fn patch_can_rewrite_volunteer() {
        let mut row = sample();
        let current = PersonId::new();
        let next = PersonId::new();
        AssignmentPatch::replaced_by(next)
            .with_volunteer(current)
            .apply(&mut row);
        assert_eq!(row.volunteer_id, current);
        assert_eq!(row.slot.replaced_by(), Some(next));
    }
}
