#![forbid(unsafe_code)]

//! herald: a minimal, synchronous change-notification primitive.
//!
//! # Role
//!
//! An [`Observable`] owns a set of [`Observer`] callback handles and a
//! change flag. Owning code marks the observable changed when its own
//! state mutates, then dispatches a [`Notification`] — positional and
//! keyed values — to every registered observer in one synchronous round.
//! Notifying without a pending change is a no-op; a completed round
//! clears the flag.
//!
//! # Primary responsibilities
//!
//! - **[`Observable`]**: observer registration, the change flag, dispatch.
//! - **[`Observer`]**: cloneable identity-keyed callback handles.
//! - **[`Notification`]**: the structured payload observers receive.
//! - **[`Subject`]**: the contract for entities embedding an observable.
//! - **[`Watched`]**: a value cell that notifies on every real change.
//!
//! # Example
//!
//! ```
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! use herald::{Notification, Observable, Observer};
//!
//! let mut subject = Observable::new();
//!
//! let seen = Rc::new(Cell::new(0));
//! let seen_in_cb = Rc::clone(&seen);
//! let observer = Observer::infallible(move |_subject, notification| {
//!     let value = notification.get("value").and_then(|v| v.as_i64());
//!     seen_in_cb.set(value.unwrap_or(0));
//! });
//!
//! subject.add_observer(observer.clone());
//! subject.mark_changed();
//! subject.notify_observers(Notification::new().entry("value", 42))?;
//!
//! assert_eq!(seen.get(), 42);
//! assert!(!subject.has_changed());
//!
//! subject.delete_observer(&observer);
//! assert_eq!(subject.count_observers(), 0);
//! # Ok::<(), herald::NotifyError>(())
//! ```
//!
//! # What this is not
//!
//! Dispatch is in-line and single-threaded: no ordering contract across
//! observers, no asynchronous delivery, no error isolation between
//! callbacks (the first failure aborts the round), no weak registrations.
//! If that list reads like your requirements, you want a channel, not an
//! observable.

pub mod notification;
pub mod observable;
pub mod observer;
pub mod subject;
pub mod watched;

pub use notification::{Notification, Value};
pub use observable::{NotifyError, Observable};
pub use observer::{Observer, ObserverError};
pub use subject::Subject;
pub use watched::{Watched, WatchedError};
