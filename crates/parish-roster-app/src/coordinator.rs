//! Roster mutations shared by CLI and service surfaces.

use anyhow::Error;
use parish_roster_core::id::{EventId, PersonId};
use parish_roster_core::{
    Assignment, AssignmentFilter, AssignmentPatch, Conflict, Event, ExclusionSet, ModelError,
};
use parish_roster_store::{FileStore, InsertOutcome, MemoryStore, StoreError, UpdateOutcome};
use tracing::{debug, info, warn};

use crate::config::ReplaceStrategy;

/// Minimal storage abstraction required by [`RosterCoordinator`].
pub trait RosterStore {
    /// Error type bubbled up from the backing store.
    type Error: Into<Error>;

    /// Append every row of `batch` or none of them, refusing people already
    /// active or serving as a live replacement on the row's event.
    ///
    /// # Errors
    /// Returns a store-specific error when persisting fails.
    fn insert_if_vacant(&self, batch: &[Assignment]) -> Result<InsertOutcome, Self::Error>;

    /// Rows matching `filter`.
    ///
    /// # Errors
    /// Returns a store-specific error when the rows cannot be read.
    fn find(&self, filter: &AssignmentFilter) -> Result<Vec<Assignment>, Self::Error>;

    /// Patch every row matching `filter`, returning how many matched.
    ///
    /// # Errors
    /// Returns a store-specific error when persisting fails.
    fn update(&self, filter: &AssignmentFilter, patch: &AssignmentPatch) -> Result<usize, Self::Error>;

    /// Patch the rows matching `filter` unless `incoming` is already active or
    /// a live replacement on the filter's event. Check and write are atomic.
    ///
    /// # Errors
    /// Returns a store-specific error when persisting fails.
    fn update_if_vacant(
        &self,
        filter: &AssignmentFilter,
        patch: &AssignmentPatch,
        incoming: PersonId,
    ) -> Result<UpdateOutcome, Self::Error>;

    /// Delete every row matching `filter`, returning how many were removed.
    ///
    /// # Errors
    /// Returns a store-specific error when persisting fails.
    fn delete(&self, filter: &AssignmentFilter) -> Result<usize, Self::Error>;
}

/// Replace a slot's volunteer (or its current replacement) with someone new.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplaceRequest {
    /// Event the slot belongs to.
    pub event: EventId,
    /// Volunteer named on the slot being replaced.
    pub volunteer: PersonId,
    /// Person who takes over.
    pub replacement: PersonId,
    /// The slot already has a live replacement that is itself being replaced.
    pub already_replaced: bool,
    /// The live replacement being superseded; required when `already_replaced`.
    pub current_replacement: Option<PersonId>,
}

/// Rows touched by each step of a replacement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplaceOutcome {
    /// Step one: `volunteerId` rewritten to the outgoing replacement. Only
    /// attempted for already-replaced slots.
    pub rewritten: Option<usize>,
    /// Step two: slot marked replaced, keyed on the original volunteer. Not
    /// attempted when the merged strategy already wrote the slot.
    pub marked: Option<usize>,
}

impl ReplaceOutcome {
    /// Total rows touched across both steps.
    #[must_use]
    pub fn touched(&self) -> usize {
        self.rewritten.unwrap_or(0) + self.marked.unwrap_or(0)
    }
}

/// Rows removed by [`RosterCoordinator::remove_volunteer`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RemoveOutcome {
    /// Active original slots held by the person.
    pub originals: usize,
    /// Slots in which the person was the live replacement.
    pub replacements: usize,
}

/// Errors surfaced by [`RosterCoordinator`].
#[derive(thiserror::Error, Debug)]
pub enum RosterError {
    /// Person is already booked on the event.
    #[error("{person} cannot be booked on event {event}: {conflict}")]
    DuplicateAssignment {
        /// Event being staffed.
        event: EventId,
        /// Person refused.
        person: PersonId,
        /// Why the booking was refused.
        conflict: Conflict,
    },
    /// Missing or malformed input.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// Private event with no ministry to assign into.
    #[error("private event {0} has no ministry")]
    MissingMinistry(EventId),
    /// Person/ministry directory failed.
    #[error("directory error: {0}")]
    Directory(#[source] Error),
    /// Backing store returned an error.
    #[error("store error: {0}")]
    Store(#[from] Error),
}

/// Validate a batch of new bookings against the event's current rows and
/// build the rows to insert. Nothing is written.
pub(crate) fn plan_add(
    event: &Event,
    volunteers: &[PersonId],
    assigner: PersonId,
    booked: &ExclusionSet,
) -> Result<Vec<Assignment>, RosterError> {
    event.validate().map_err(|err| match err {
        ModelError::MissingMinistry(id) => RosterError::MissingMinistry(id),
        other => RosterError::InvalidArgument(other.to_string()),
    })?;
    if volunteers.is_empty() {
        return Err(RosterError::InvalidArgument("no volunteers given".to_owned()));
    }
    if assigner.is_nil() || volunteers.iter().any(PersonId::is_nil) {
        return Err(RosterError::InvalidArgument("empty person id".to_owned()));
    }
    if let Some((person, conflict)) = booked.batch_conflict(volunteers) {
        warn!(event = %event.id, %person, %conflict, "Rejected booking");
        return Err(RosterError::DuplicateAssignment {
            event: event.id,
            person,
            conflict,
        });
    }
    Ok(volunteers
        .iter()
        .map(|&volunteer| Assignment::new(event.id, volunteer, assigner))
        .collect())
}

pub(crate) fn insert_outcome(outcome: InsertOutcome, rows: Vec<Assignment>) -> Result<Vec<Assignment>, RosterError> {
    match outcome {
        InsertOutcome::Inserted(_) => Ok(rows),
        InsertOutcome::Conflict {
            event,
            person,
            conflict,
        } => {
            warn!(%event, %person, %conflict, "Booking lost a race with a concurrent writer");
            Err(RosterError::DuplicateAssignment {
                event,
                person,
                conflict,
            })
        }
    }
}

/// Validates roster mutations and writes them to a [`RosterStore`].
pub struct RosterCoordinator<S> {
    store: S,
    strategy: ReplaceStrategy,
}

impl<S> RosterCoordinator<S> {
    /// Construct a new coordinator.
    pub const fn new(store: S, strategy: ReplaceStrategy) -> Self {
        Self { store, strategy }
    }

    /// Replacement write strategy in use.
    pub const fn strategy(&self) -> ReplaceStrategy {
        self.strategy
    }

    /// Expose a reference to the underlying store (read-only operations).
    pub const fn store(&self) -> &S {
        &self.store
    }
}

impl<S> RosterCoordinator<S>
where
    S: RosterStore,
{
    fn store_error(err: S::Error) -> RosterError {
        RosterError::Store(err.into())
    }

    /// Every row of `event`.
    ///
    /// # Errors
    /// Returns [`RosterError::Store`] when the store cannot be read.
    pub fn assignments(&self, event: EventId) -> Result<Vec<Assignment>, RosterError> {
        self.store
            .find(&AssignmentFilter::event(event))
            .map_err(Self::store_error)
    }

    /// People currently active or serving as live replacements on `event`.
    ///
    /// # Errors
    /// Returns [`RosterError::Store`] when the store cannot be read.
    pub fn booked(&self, event: EventId) -> Result<ExclusionSet, RosterError> {
        Ok(ExclusionSet::from_assignments(&self.assignments(event)?))
    }

    /// Book `volunteers` onto `event`, all or nothing.
    ///
    /// # Errors
    /// Returns [`RosterError::DuplicateAssignment`] when anyone in the batch is
    /// already booked (nothing is written), [`RosterError::MissingMinistry`] for
    /// a private event without a ministry, and [`RosterError::Store`] on
    /// storage failures.
    pub fn add_volunteers(
        &self,
        event: &Event,
        volunteers: &[PersonId],
        assigner: PersonId,
    ) -> Result<Vec<Assignment>, RosterError> {
        let booked = self.booked(event.id)?;
        let rows = plan_add(event, volunteers, assigner, &booked)?;
        let outcome = self
            .store
            .insert_if_vacant(&rows)
            .map_err(Self::store_error)?;
        let rows = insert_outcome(outcome, rows)?;
        info!(event = %event.id, count = rows.len(), %assigner, "Booked volunteers");
        Ok(rows)
    }

    /// Point a slot at a new replacement.
    ///
    /// # Errors
    /// Returns [`RosterError::InvalidArgument`] when an already-replaced slot
    /// does not name its current replacement, [`RosterError::DuplicateAssignment`]
    /// when the new replacement is booked elsewhere on the event, and
    /// [`RosterError::Store`] on storage failures.
    pub fn replace_volunteer(&self, request: ReplaceRequest) -> Result<ReplaceOutcome, RosterError> {
        let ReplaceRequest {
            event,
            volunteer,
            replacement,
            already_replaced,
            current_replacement,
        } = request;

        if volunteer.is_nil() || replacement.is_nil() {
            return Err(RosterError::InvalidArgument("empty person id".to_owned()));
        }
        let current = if already_replaced {
            let Some(current) = current_replacement.filter(|id| !id.is_nil()) else {
                return Err(RosterError::InvalidArgument(
                    "current replacement is required for an already replaced slot".to_owned(),
                ));
            };
            Some(current)
        } else {
            None
        };

        // Each step is scoped to one slot so a volunteer booked again after
        // standing down keeps their new row.
        let by_volunteer = AssignmentFilter::event(event).volunteer(volunteer);
        let slot = current.map_or_else(
            || by_volunteer.replaced(false),
            |current| by_volunteer.replaced_by(current).replaced(true),
        );
        // Handing the slot back to whoever already serves it books nobody new.
        let incoming = (current != Some(replacement)).then_some(replacement);
        let mark = AssignmentPatch::replaced_by(replacement);
        let mut outcome = ReplaceOutcome::default();

        if let Some(current) = current {
            outcome.rewritten = Some(self.update_guarded(&slot, &mark.with_volunteer(current), incoming)?);
            if self.strategy == ReplaceStrategy::Merged {
                info!(%event, %volunteer, %replacement, touched = outcome.touched(), "Replaced volunteer");
                return Ok(outcome);
            }
            // The rewrite moved the row out of `slot`, so this matches nothing.
            let marked = self.store.update(&slot, &mark).map_err(Self::store_error)?;
            outcome.marked = Some(marked);
        } else {
            outcome.marked = Some(self.update_guarded(&slot, &mark, incoming)?);
        }

        if outcome.touched() == 0 {
            debug!(%event, %volunteer, "Replacement matched no rows");
        }
        info!(%event, %volunteer, %replacement, touched = outcome.touched(), "Replaced volunteer");
        Ok(outcome)
    }

    fn update_guarded(
        &self,
        filter: &AssignmentFilter,
        patch: &AssignmentPatch,
        incoming: Option<PersonId>,
    ) -> Result<usize, RosterError> {
        let Some(person) = incoming else {
            return self.store.update(filter, patch).map_err(Self::store_error);
        };
        match self
            .store
            .update_if_vacant(filter, patch, person)
            .map_err(Self::store_error)?
        {
            UpdateOutcome::Updated(touched) => Ok(touched),
            UpdateOutcome::Conflict {
                event,
                person,
                conflict,
            } => {
                warn!(%event, %person, %conflict, "Rejected replacement");
                Err(RosterError::DuplicateAssignment {
                    event,
                    person,
                    conflict,
                })
            }
        }
    }

    /// Drop `target` from `event`, whether it holds an original slot or is
    /// standing in for someone.
    ///
    /// # Errors
    /// Returns [`RosterError::InvalidArgument`] when no id is given and
    /// [`RosterError::Store`] on storage failures.
    pub fn remove_volunteer(
        &self,
        event: EventId,
        target: Option<PersonId>,
    ) -> Result<RemoveOutcome, RosterError> {
        let Some(person) = target.filter(|id| !id.is_nil()) else {
            return Err(RosterError::InvalidArgument(
                "a volunteer or replacement id is required".to_owned(),
            ));
        };

        let originals = self
            .store
            .delete(&AssignmentFilter::event(event).volunteer(person).replaced(false))
            .map_err(Self::store_error)?;
        let replacements = self
            .store
            .delete(&AssignmentFilter::event(event).replaced_by(person).replaced(true))
            .map_err(Self::store_error)?;

        let outcome = RemoveOutcome {
            originals,
            replacements,
        };
        if originals + replacements == 0 {
            debug!(%event, %person, "Nothing to remove");
        } else {
            info!(%event, %person, originals, replacements, "Removed from roster");
        }
        Ok(outcome)
    }
}

impl RosterStore for MemoryStore {
    type Error = StoreError;

    fn insert_if_vacant(&self, batch: &[Assignment]) -> Result<InsertOutcome, Self::Error> {
        Self::insert_if_vacant(self, batch)
    }

    fn find(&self, filter: &AssignmentFilter) -> Result<Vec<Assignment>, Self::Error> {
        Self::find(self, filter)
    }

    fn update(&self, filter: &AssignmentFilter, patch: &AssignmentPatch) -> Result<usize, Self::Error> {
        Self::update(self, filter, patch)
    }

    fn update_if_vacant(
        &self,
        filter: &AssignmentFilter,
        patch: &AssignmentPatch,
        incoming: PersonId,
    ) -> Result<UpdateOutcome, Self::Error> {
        Self::update_if_vacant(self, filter, patch, incoming)
    }

    fn delete(&self, filter: &AssignmentFilter) -> Result<usize, Self::Error> {
        Self::delete(self, filter)
    }
}

impl RosterStore for FileStore {
    type Error = StoreError;

    fn insert_if_vacant(&self, batch: &[Assignment]) -> Result<InsertOutcome, Self::Error> {
        Self::insert_if_vacant(self, batch)
    }

    fn find(&self, filter: &AssignmentFilter) -> Result<Vec<Assignment>, Self::Error> {
        Self::find(self, filter)
    }

    fn update(&self, filter: &AssignmentFilter, patch: &AssignmentPatch) -> Result<usize, Self::Error> {
        Self::update(self, filter, patch)
    }

    fn update_if_vacant(
        &self,
        filter: &AssignmentFilter,
        patch: &AssignmentPatch,
        incoming: PersonId,
    ) -> Result<UpdateOutcome, Self::Error> {
        Self::update_if_vacant(self, filter, patch, incoming)
    }

    fn delete(&self, filter: &AssignmentFilter) -> Result<usize, Self::Error> {
        Self::delete(self, filter)
    }
}

impl<S> RosterStore for &S
where
    S: RosterStore + ?Sized,
{
    type Error = S::Error;

    fn insert_if_vacant(&self, batch: &[Assignment]) -> Result<InsertOutcome, Self::Error> {
        (*self).insert_if_vacant(batch)
    }

    fn find(&self, filter: &AssignmentFilter) -> Result<Vec<Assignment>, Self::Error> {
        (*self).find(filter)
    }

    fn update(&self, filter: &AssignmentFilter, patch: &AssignmentPatch) -> Result<usize, Self::Error> {
        (*self).update(filter, patch)
    }

    fn update_if_vacant(
        &self,
        filter: &AssignmentFilter,
        patch: &AssignmentPatch,
        incoming: PersonId,
    ) -> Result<UpdateOutcome, Self::Error> {
        (*self).update_if_vacant(filter, patch, incoming)
    }

    fn delete(&self, filter: &AssignmentFilter) -> Result<usize, Self::Error> {
        (*self).delete(filter)
    }
}

impl<S> RosterStore for std::sync::Arc<S>
where
    S: RosterStore,
{
    type Error = S::Error;

    fn insert_if_vacant(&self, batch: &[Assignment]) -> Result<InsertOutcome, Self::Error> {
        (**self).insert_if_vacant(batch)
    }

    fn find(&self, filter: &AssignmentFilter) -> Result<Vec<Assignment>, Self::Error> {
        (**self).find(filter)
    }

    fn update(&self, filter: &AssignmentFilter, patch: &AssignmentPatch) -> Result<usize, Self::Error> {
        (**self).update(filter, patch)
    }

    fn update_if_vacant(
        &self,
        filter: &AssignmentFilter,
        patch: &AssignmentPatch,
        incoming: PersonId,
    ) -> Result<UpdateOutcome, Self::Error> {
        (**self).update_if_vacant(filter, patch, incoming)
    }

    fn delete(&self, filter: &AssignmentFilter) -> Result<usize, Self::Error> {
        (**self).delete(filter)
    }
}
