#![forbid(unsafe_code)]

//! Watched value cell: equality-gated assignment with automatic
//! notification.
//!
//! [`Watched<T>`] is the packaged form of the most common [`Subject`]
//! implementation: a single value whose every real change should be
//! broadcast. Assigning an equal value is silent; assigning a different
//! one stores it, marks the embedded observable changed, and notifies with
//! the keyed payload `{"value": <new>}`.

use std::fmt;

use serde::Serialize;

use crate::notification::Notification;
use crate::observable::{NotifyError, Observable};
use crate::subject::Subject;

/// A value whose changes are broadcast to registered observers.
pub struct Watched<T> {
    value: T,
    observable: Observable,
}

impl<T> Watched<T> {
    /// Wrap an initial value. No notification fires for the initial value.
    #[must_use]
    pub fn new(value: T) -> Self {
        Self {
            value,
            observable: Observable::new(),
        }
    }

    /// The current value.
    #[must_use]
    pub fn get(&self) -> &T {
        &self.value
    }

    /// Unwrap the cell, discarding the observer registrations.
    #[must_use]
    pub fn into_inner(self) -> T {
        self.value
    }
}

impl<T: Serialize + PartialEq> Watched<T> {
    /// Assign a new value.
    ///
    /// Equal values (by `PartialEq`) are a complete no-op: nothing is
    /// stored, the change flag is untouched, no observer runs. A differing
    /// value is stored, the observable is marked changed, and every
    /// observer is notified with `{"value": <new>}`.
    ///
    /// # Errors
    ///
    /// [`WatchedError::Encode`] if the new value cannot be serialized into
    /// a payload — the value is already stored and the change flag stays
    /// set. [`WatchedError::Notify`] if an observer fails; see
    /// [`Observable::notify_observers`] for the abort-and-stay-dirty
    /// semantics. In both cases a later successful notification round
    /// (e.g. the next `set`) delivers the then-current value.
    pub fn set(&mut self, value: T) -> Result<(), WatchedError> {
        if self.value == value {
            return Ok(());
        }
        self.value = value;
        self.observable.mark_changed();
        let encoded = serde_json::to_value(&self.value).map_err(WatchedError::Encode)?;
        self.observable
            .notify_observers(Notification::new().entry("value", encoded))
            .map_err(WatchedError::Notify)
    }
}

impl<T> Subject for Watched<T> {
    fn observable(&self) -> &Observable {
        &self.observable
    }

    fn observable_mut(&mut self) -> &mut Observable {
        &mut self.observable
    }
}

impl<T: fmt::Debug> fmt::Debug for Watched<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Watched")
            .field("value", &self.value)
            .field("observable", &self.observable)
            .finish()
    }
}

/// Failure while assigning a [`Watched`] value.
#[derive(Debug)]
pub enum WatchedError {
    /// The new value could not be serialized into the payload.
    Encode(serde_json::Error),
    /// An observer rejected the notification; the change flag stays set.
    Notify(NotifyError),
}

impl fmt::Display for WatchedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Encode(_) => write!(f, "failed to encode the new value for notification"),
            Self::Notify(_) => write!(f, "failed to notify observers of the new value"),
        }
    }
}

impl std::error::Error for WatchedError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Encode(error) => Some(error),
            Self::Notify(error) => Some(error),
        }
    }
}
