//! Application layer logic for parish-roster.
//!
//! This crate provides the roster coordinator, directory lookups, the service
//! façade and configuration shared by the CLI and any other front end.

pub mod config;
pub mod coordinator;
pub mod directory;
pub mod service;

// Re-exports for convenience
pub use config::{ProjectConfig, ReplaceStrategy, CONFIG_DIR};
pub use coordinator::{
    RemoveOutcome, ReplaceOutcome, ReplaceRequest, RosterCoordinator, RosterError, RosterStore,
};
pub use directory::{Ministry, PersonDirectory, StaticDirectory};
pub use service::{RosterEntry, RosterService};
