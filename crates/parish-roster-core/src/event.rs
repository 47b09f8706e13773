use crate::error::ModelError;
use crate::id::{EventId, MinistryId};
use serde::{Deserialize, Serialize};

/// Who may see (and volunteer for) an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    /// Open to the whole parish.
    Public,
    /// Restricted to a single ministry.
    Private,
}

/// Scheduled event, read-only from the roster's point of view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// Event identifier.
    pub id: EventId,
    /// Visibility of the event.
    pub visibility: Visibility,
    /// Owning ministry, required for private events.
    #[serde(default)]
    pub ministry_id: Option<MinistryId>,
    /// Whether attendance is tracked for this event.
    #[serde(default)]
    pub requires_attendance: bool,
}

impl Event {
    /// Public event with no owning ministry.
    #[must_use]
    pub const fn public(id: EventId) -> Self {
        Self {
            id,
            visibility: Visibility::Public,
            ministry_id: None,
            requires_attendance: false,
        }
    }

    /// Private event owned by `ministry`.
    #[must_use]
    pub const fn private(id: EventId, ministry: MinistryId) -> Self {
        Self {
            id,
            visibility: Visibility::Private,
            ministry_id: Some(ministry),
            requires_attendance: false,
        }
    }

    /// Check that a private event names its ministry.
    ///
    /// # Errors
    /// Returns [`ModelError::MissingMinistry`] for a private event without one.
    pub fn validate(&self) -> Result<(), ModelError> {
        match (self.visibility, self.ministry_id) {
            (Visibility::Private, None) => Err(ModelError::MissingMinistry(self.id)),
            _ => Ok(()),
        }
    }

    /// True when only a ministry's members are eligible.
    #[must_use]
    pub const fn is_private(&self) -> bool {
        matches!(self.visibility, Visibility::Private)
    }
}
