use crate::{InsertOutcome, StoreError, UpdateOutcome};
use parish_roster_core::id::PersonId;
use parish_roster_core::{Assignment, AssignmentFilter, AssignmentPatch};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info};

/// In-process assignment table. Clones share the same rows.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    rows: Arc<Mutex<Vec<Assignment>>>,
}

impl MemoryStore {
    /// Empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn rows(&self) -> Result<MutexGuard<'_, Vec<Assignment>>, StoreError> {
        self.rows.lock().map_err(|_| StoreError::LockPoisoned)
    }

    /// Append `batch` unless someone in it is already booked on its event.
    ///
    /// # Errors
    /// Returns [`StoreError::LockPoisoned`] when a writer panicked.
    pub fn insert_if_vacant(&self, batch: &[Assignment]) -> Result<InsertOutcome, StoreError> {
        let mut rows = self.rows()?;
        let outcome = crate::insert_if_vacant(&mut rows, batch);
        drop(rows);
        if let InsertOutcome::Inserted(count) = outcome {
            info!(count, "Inserted assignments");
        }
        Ok(outcome)
    }

    /// Rows matching `filter`, in insertion order.
    ///
    /// # Errors
    /// Returns [`StoreError::LockPoisoned`] when a writer panicked.
    pub fn find(&self, filter: &AssignmentFilter) -> Result<Vec<Assignment>, StoreError> {
        Ok(crate::find(&self.rows()?, filter))
    }

    /// Apply `patch` to every row matching `filter`; returns the match count.
    ///
    /// # Errors
    /// Returns [`StoreError::LockPoisoned`] when a writer panicked.
    pub fn update(&self, filter: &AssignmentFilter, patch: &AssignmentPatch) -> Result<usize, StoreError> {
        let touched = crate::update(&mut *self.rows()?, filter, patch);
        debug!(event = %filter.event_id, touched, "Updated assignments");
        Ok(touched)
    }

    /// Apply `patch` to the rows matching `filter` unless `incoming` is already
    /// booked on the filter's event.
    ///
    /// # Errors
    /// Returns [`StoreError::LockPoisoned`] when a writer panicked.
    pub fn update_if_vacant(
        &self,
        filter: &AssignmentFilter,
        patch: &AssignmentPatch,
        incoming: PersonId,
    ) -> Result<UpdateOutcome, StoreError> {
        let outcome = crate::update_if_vacant(&mut *self.rows()?, filter, patch, incoming);
        debug!(event = %filter.event_id, %incoming, ?outcome, "Conditional update");
        Ok(outcome)
    }

    /// Delete every row matching `filter`; returns the number removed.
    ///
    /// # Errors
    /// Returns [`StoreError::LockPoisoned`] when a writer panicked.
    pub fn delete(&self, filter: &AssignmentFilter) -> Result<usize, StoreError> {
        let removed = crate::delete(&mut *self.rows()?, filter);
        debug!(event = %filter.event_id, removed, "Deleted assignments");
        Ok(removed)
    }
}
