//! Error types for roster domain values.

use crate::id::{AssignmentId, EventId};
use thiserror::Error;

/// Errors raised while building or decoding domain values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// A private event has no owning ministry.
    #[error("private event {0} has no ministry")]
    MissingMinistry(EventId),

    /// Record says `replaced = true` but names no replacement.
    #[error("assignment {0} is marked replaced but has no replacement")]
    ReplacedWithoutReplacement(AssignmentId),

    /// Record names a replacement while still marked active.
    #[error("assignment {0} names a replacement but is not marked replaced")]
    ReplacementOnActiveSlot(AssignmentId),
}
