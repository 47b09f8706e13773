use crate::{InsertOutcome, StoreError, UpdateOutcome};
use fs2::FileExt;
use parish_roster_core::id::PersonId;
use parish_roster_core::{Assignment, AssignmentFilter, AssignmentPatch};
use std::fs::{self, File, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Assignment table persisted as a JSON array of records.
///
/// Every call takes an advisory lock on a sibling `.lock` file (shared for
/// reads, exclusive for writes), so separate processes and threads see a
/// consistent table. Writes go to a temporary file that is renamed into place.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
    lock_path: PathBuf,
}

#[derive(Clone, Copy)]
enum LockMode {
    Read,
    Write,
}

struct LockGuard {
    file: File,
    path: PathBuf,
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        if let Err(err) = FileExt::unlock(&self.file) {
            warn!(path = %self.path.display(), %err, "Failed to release roster lock");
        }
    }
}

impl FileStore {
    /// Store backed by `path`. Parent directories are created on first write.
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let mut lock_name = path.file_name().unwrap_or_default().to_os_string();
        lock_name.push(".lock");
        let lock_path = path.with_file_name(lock_name);
        Self { path, lock_path }
    }

    /// Location of the JSON file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self, mode: LockMode) -> Result<LockGuard, StoreError> {
        if let Some(parent) = self.lock_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
        }
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.lock_path)
            .map_err(|e| StoreError::io(&self.lock_path, e))?;
        let locked = match mode {
            LockMode::Read => FileExt::lock_shared(&file),
            LockMode::Write => FileExt::lock_exclusive(&file),
        };
        locked.map_err(|e| StoreError::io(&self.lock_path, e))?;
        Ok(LockGuard {
            file,
            path: self.lock_path.clone(),
        })
    }

    fn load(&self) -> Result<Vec<Assignment>, StoreError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(StoreError::io(&self.path, err)),
        };
        if contents.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&contents).map_err(|source| StoreError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    fn save(&self, rows: &[Assignment]) -> Result<(), StoreError> {
        let body = serde_json::to_string_pretty(rows)?;
        let mut tmp_name = self.path.file_name().unwrap_or_default().to_os_string();
        tmp_name.push(".tmp");
        let tmp = self.path.with_file_name(tmp_name);
        fs::write(&tmp, body).map_err(|e| StoreError::io(&tmp, e))?;
        fs::rename(&tmp, &self.path).map_err(|e| StoreError::io(&self.path, e))
    }

    fn mutate<T>(&self, f: impl FnOnce(&mut Vec<Assignment>) -> (T, bool)) -> Result<T, StoreError> {
        let _guard = self.lock(LockMode::Write)?;
        let mut rows = self.load()?;
        let (value, dirty) = f(&mut rows);
        if dirty {
            self.save(&rows)?;
        }
        Ok(value)
    }

    /// Append `batch` unless someone in it is already booked on its event.
    ///
    /// # Errors
    /// Returns [`StoreError`] when the file cannot be read or written.
    pub fn insert_if_vacant(&self, batch: &[Assignment]) -> Result<InsertOutcome, StoreError> {
        let outcome = self.mutate(|rows| {
            let outcome = crate::insert_if_vacant(rows, batch);
            let dirty = matches!(outcome, InsertOutcome::Inserted(n) if n > 0);
            (outcome, dirty)
        })?;
        if let InsertOutcome::Inserted(count) = outcome {
            info!(path = %self.path.display(), count, "Inserted assignments");
        }
        Ok(outcome)
    }

    /// Rows matching `filter`, in insertion order.
    ///
    /// # Errors
    /// Returns [`StoreError`] when the file cannot be read or parsed.
    pub fn find(&self, filter: &AssignmentFilter) -> Result<Vec<Assignment>, StoreError> {
        let _guard = self.lock(LockMode::Read)?;
        Ok(crate::find(&self.load()?, filter))
    }

    /// Apply `patch` to every row matching `filter`; returns the match count.
    ///
    /// # Errors
    /// Returns [`StoreError`] when the file cannot be read or written.
    pub fn update(&self, filter: &AssignmentFilter, patch: &AssignmentPatch) -> Result<usize, StoreError> {
        let touched = self.mutate(|rows| {
            let touched = crate::update(rows, filter, patch);
            (touched, touched > 0)
        })?;
        debug!(path = %self.path.display(), event = %filter.event_id, touched, "Updated assignments");
        Ok(touched)
    }

    /// Apply `patch` to the rows matching `filter` unless `incoming` is already
    /// booked on the filter's event. The check and the write share one lock.
    ///
    /// # Errors
    /// Returns [`StoreError`] when the file cannot be read or written.
    pub fn update_if_vacant(
        &self,
        filter: &AssignmentFilter,
        patch: &AssignmentPatch,
        incoming: PersonId,
    ) -> Result<UpdateOutcome, StoreError> {
        let outcome = self.mutate(|rows| {
            let outcome = crate::update_if_vacant(rows, filter, patch, incoming);
            let dirty = matches!(outcome, UpdateOutcome::Updated(n) if n > 0);
            (outcome, dirty)
        })?;
        debug!(path = %self.path.display(), event = %filter.event_id, %incoming, ?outcome, "Conditional update");
        Ok(outcome)
    }

    /// Delete every row matching `filter`; returns the number removed.
    ///
    /// # Errors
    /// Returns [`StoreError`] when the file cannot be read or written.
    pub fn delete(&self, filter: &AssignmentFilter) -> Result<usize, StoreError> {
        let removed = self.mutate(|rows| {
            let removed = crate::delete(rows, filter);
            (removed, removed > 0)
        })?;
        debug!(path = %self.path.display(), event = %filter.event_id, removed, "Deleted assignments");
        Ok(removed)
    }
}
