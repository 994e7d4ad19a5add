#![forbid(unsafe_code)]

//! Observer handles: cloneable, identity-keyed callbacks.
//!
//! # Design
//!
//! An [`Observer`] wraps its callback in an `Rc`, and the allocation *is*
//! the observer's identity: cloning a handle yields the same observer,
//! while constructing a new handle from a byte-identical closure yields a
//! different one. [`Observable`](crate::Observable) dedups and deletes by
//! this identity, so the handle returned from [`Observer::new`] must be
//! kept (or cloned) by anyone who intends to unregister it later.
//!
//! `Rc` also makes handles deliberately `!Send`/`!Sync`: dispatch is
//! single-threaded and synchronous, and the type system enforces it.

use std::fmt;
use std::rc::Rc;

use crate::notification::Notification;
use crate::observable::Observable;

/// Error type an observer callback may surface.
///
/// Observers belong to the embedding application, so their failures are
/// opaque to this crate; a boxed error is the whole contract.
pub type ObserverError = Box<dyn std::error::Error + Send + Sync + 'static>;

type ObserverFn = dyn Fn(&Observable, &Notification) -> Result<(), ObserverError>;

/// A registered (or registrable) callback handle.
///
/// Invoked during [`Observable::notify_observers`] with a shared reference
/// to the notifying observable and the dispatched [`Notification`].
/// Cloning is cheap and preserves identity.
#[derive(Clone)]
pub struct Observer {
    callback: Rc<ObserverFn>,
}

impl Observer {
    /// Create an observer from a fallible callback.
    ///
    /// Returning `Err` from the callback aborts the dispatch round it is
    /// part of; see [`Observable::notify_observers`].
    pub fn new(
        callback: impl Fn(&Observable, &Notification) -> Result<(), ObserverError> + 'static,
    ) -> Self {
        Self {
            callback: Rc::new(callback),
        }
    }

    /// Create an observer from a callback that cannot fail.
    pub fn infallible(callback: impl Fn(&Observable, &Notification) + 'static) -> Self {
        Self::new(move |observable, notification| {
            callback(observable, notification);
            Ok(())
        })
    }

    /// Whether `self` and `other` are handles to the same observer.
    #[must_use]
    pub fn same_observer(&self, other: &Observer) -> bool {
        Rc::ptr_eq(&self.callback, &other.callback)
    }

    pub(crate) fn call(
        &self,
        observable: &Observable,
        notification: &Notification,
    ) -> Result<(), ObserverError> {
        (self.callback)(observable, notification)
    }

    fn addr(&self) -> usize {
        Rc::as_ptr(&self.callback) as *const () as usize
    }
}

impl fmt::Debug for Observer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observer")
            .field("addr", &format_args!("{:#x}", self.addr()))
            .finish()
    }
}
