#![forbid(unsafe_code)]

//! Derived-extension contract for types embedding an [`Observable`].
//!
//! The base type ([`Observable`]) carries the mechanism; [`Subject`] is the
//! contract an embedding type implements to inherit it. Implement the two
//! accessors and the protected mutators plus dispatch come along as
//! provided methods:
//!
//! ```
//! use herald::{Notification, NotifyError, Observable, Subject};
//!
//! struct Counter {
//!     observable: Observable,
//!     value: u64,
//! }
//!
//! impl Subject for Counter {
//!     fn observable(&self) -> &Observable {
//!         &self.observable
//!     }
//!     fn observable_mut(&mut self) -> &mut Observable {
//!         &mut self.observable
//!     }
//! }
//!
//! impl Counter {
//!     fn increment(&mut self) -> Result<(), NotifyError> {
//!         self.value += 1;
//!         self.mark_changed();
//!         self.notify_observers(Notification::new().entry("value", self.value))
//!     }
//! }
//! # let mut counter = Counter { observable: Observable::new(), value: 0 };
//! # counter.increment().unwrap();
//! ```
//!
//! Keeping the mutators away from external callers is then an ownership
//! question, not a visibility one: expose `observable()` (or delegate the
//! queries) from your public API and keep `observable_mut()` out of it.

use crate::notification::Notification;
use crate::observable::{NotifyError, Observable};
use crate::observer::Observer;

/// Implemented by entities that embed an [`Observable`].
pub trait Subject {
    /// Shared access to the embedded observable: the query surface.
    fn observable(&self) -> &Observable;

    /// Exclusive access to the embedded observable. Intended for the
    /// implementing type itself; think twice before exposing it.
    fn observable_mut(&mut self) -> &mut Observable;

    /// See [`Observable::mark_changed`].
    fn mark_changed(&mut self) {
        self.observable_mut().mark_changed();
    }

    /// See [`Observable::clear_changed`].
    fn clear_changed(&mut self) {
        self.observable_mut().clear_changed();
    }

    /// See [`Observable::has_changed`].
    fn has_changed(&self) -> bool {
        self.observable().has_changed()
    }

    /// See [`Observable::count_observers`].
    fn count_observers(&self) -> usize {
        self.observable().count_observers()
    }

    /// See [`Observable::add_observers`].
    fn add_observers(&mut self, observers: impl IntoIterator<Item = Observer>) {
        self.observable_mut().add_observers(observers);
    }

    /// See [`Observable::delete_observers`].
    fn delete_observers<'a>(&mut self, observers: impl IntoIterator<Item = &'a Observer>) {
        self.observable_mut().delete_observers(observers);
    }

    /// See [`Observable::notify_observers`].
    fn notify_observers(&mut self, notification: Notification) -> Result<(), NotifyError> {
        self.observable_mut().notify_observers(notification)
    }
}
