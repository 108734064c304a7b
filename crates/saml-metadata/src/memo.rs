//! Compute-once memoization cell.
//!
//! A [`MemoCell`] holds a lazily computed value behind a read-write lock.
//! Readers only ever take the shared lock. On a miss the shared lock is
//! released, the exclusive lock is taken and the slot is checked again, so
//! a value is computed at most once per cell even when many threads miss
//! at the same moment: later writers find the slot filled and reuse it.

use std::fmt;

use parking_lot::RwLock;

/// A lock-guarded optional value computed on first use.
pub struct MemoCell<T> {
    slot: RwLock<Option<T>>,
}

impl<T> MemoCell<T> {
    /// Creates an empty cell.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            slot: RwLock::new(None),
        }
    }

    /// Returns true once a value has been stored.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.slot.read().is_some()
    }

    /// Removes the stored value, returning it.
    pub fn take(&self) -> Option<T> {
        self.slot.write().take()
    }
}

impl<T: Clone> MemoCell<T> {
    /// Returns a clone of the stored value, if any.
    #[must_use]
    pub fn get(&self) -> Option<T> {
        self.slot.read().clone()
    }

    /// Returns the stored value, computing and storing it with `init` first
    /// if the cell is empty.
    ///
    /// `init` runs while the exclusive lock is held and at most once across
    /// all concurrent callers. If it fails the cell stays empty and the
    /// error is returned; a later call will try again.
    ///
    /// # Errors
    ///
    /// Returns whatever `init` returns.
    pub fn get_or_try_init<E, F>(&self, init: F) -> Result<T, E>
    where
        F: FnOnce() -> Result<T, E>,
    {
        {
            let slot = self.slot.read();
            if let Some(value) = slot.as_ref() {
                return Ok(value.clone());
            }
        }

        let mut slot = self.slot.write();
        if let Some(value) = slot.as_ref() {
            return Ok(value.clone());
        }

        let value = init()?;
        *slot = Some(value.clone());
        Ok(value)
    }
}

impl<T> Default for MemoCell<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for MemoCell<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoCell")
            .field("initialized", &self.is_initialized())
            .finish()
    }
}
