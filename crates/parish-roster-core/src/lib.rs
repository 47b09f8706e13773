//! Domain types for event volunteer rosters: people, events, assignment
//! slots, candidate pools and the exclusion rule.

/// Assignment records and the slot state machine.
pub mod assignment;
/// Domain errors.
pub mod error;
/// Scheduled events.
pub mod event;
/// Exclusion of already-booked people.
pub mod exclusion;
/// Identifier types.
pub mod id;
/// People and roles.
pub mod person;
/// Candidate pool resolution.
pub mod pool;

pub use assignment::{Assignment, AssignmentFilter, AssignmentPatch, AssignmentRecord, SlotState};
pub use error::ModelError;
pub use event::{Event, Visibility};
pub use exclusion::{Conflict, ExclusionSet};
pub use person::{Person, Requester, Role};
pub use pool::{Candidates, Loadable, MinistryPool, PoolContext, PoolRequest, PoolRule};
