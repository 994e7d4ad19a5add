#![forbid(unsafe_code)]

//! Observable core: an observer set, a change flag, and on-demand dispatch.
//!
//! # Design
//!
//! [`Observable`] is a base type for application entities that want
//! change-notification behavior: embed one, call [`mark_changed`] when your
//! own state mutates, then [`notify_observers`] with whatever payload you
//! want to broadcast. Observers are [`Observer`] handles, deduplicated by
//! handle identity and stored in insertion order.
//!
//! The change flag is the heart of the contract: notifying a clean
//! observable is a no-op, and a dispatch round that runs to completion
//! clears the flag. This lets owning code mark several times and notify
//! once, and lets callers retry a failed round wholesale.
//!
//! # Protected mutators
//!
//! [`mark_changed`] and [`clear_changed`] are meant for the embedding type,
//! not for external consumers. They take `&mut self`; hand consumers a
//! `&Observable` (see [`Subject`](crate::Subject)) and only the queries
//! remain reachable.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Observer returns `Err` | application callback failed | dispatch stops, remaining observers skipped, flag stays set, [`NotifyError`] returned |
//! | Retry after failure | caller re-notifies | ALL observers run again, including already-notified ones |
//! | Duplicate add | same handle added twice | second add is a no-op |
//! | Absent delete | handle never added (or already deleted) | no-op |
//!
//! [`mark_changed`]: Observable::mark_changed
//! [`clear_changed`]: Observable::clear_changed
//! [`notify_observers`]: Observable::notify_observers

use std::fmt;

use tracing::{debug, trace, warn};

use crate::notification::Notification;
use crate::observer::{Observer, ObserverError};

/// An observable entity: a set of observer handles plus a change flag.
///
/// # Invariants
///
/// 1. The observer list never holds two handles with the same identity.
/// 2. The flag is `false` at construction and after every dispatch round
///    that ran to completion; it is `true` only between [`mark_changed`]
///    and that completion.
/// 3. A dispatch round invokes exactly the handles registered when it
///    started, each exactly once, in insertion order. Delivery order is
///    NOT part of the contract; observers must not rely on it.
///
/// [`mark_changed`]: Observable::mark_changed
#[derive(Default)]
pub struct Observable {
    observers: Vec<Observer>,
    changed: bool,
}

impl Observable {
    /// Create an observable with no observers and a cleared change flag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a single observer. Re-adding an already-registered handle
    /// is a no-op.
    pub fn add_observer(&mut self, observer: Observer) {
        if self.is_observed_by(&observer) {
            return;
        }
        trace!(observer = ?observer, total = self.observers.len() + 1, "observer added");
        self.observers.push(observer);
    }

    /// Register each observer in `observers`. Idempotent per handle; an
    /// empty iterator is a no-op.
    pub fn add_observers(&mut self, observers: impl IntoIterator<Item = Observer>) {
        for observer in observers {
            self.add_observer(observer);
        }
    }

    /// Unregister a single observer. Absent handles are silently ignored.
    pub fn delete_observer(&mut self, observer: &Observer) {
        if let Some(index) = self
            .observers
            .iter()
            .position(|registered| registered.same_observer(observer))
        {
            self.observers.remove(index);
            trace!(observer = ?observer, total = self.observers.len(), "observer removed");
        }
    }

    /// Unregister each observer in `observers`. Absent handles are
    /// silently ignored; an empty iterator is a no-op.
    pub fn delete_observers<'a>(&mut self, observers: impl IntoIterator<Item = &'a Observer>) {
        for observer in observers {
            self.delete_observer(observer);
        }
    }

    /// Number of currently registered observers.
    #[must_use]
    pub fn count_observers(&self) -> usize {
        self.observers.len()
    }

    /// Whether `observer` is currently registered (by handle identity).
    #[must_use]
    pub fn is_observed_by(&self, observer: &Observer) -> bool {
        self.observers
            .iter()
            .any(|registered| registered.same_observer(observer))
    }

    /// Whether a change is pending notification.
    #[must_use]
    pub fn has_changed(&self) -> bool {
        self.changed
    }

    /// Set the change flag. Idempotent.
    ///
    /// Protected mutator: intended for the embedding type, after its own
    /// state has mutated. Consumers holding `&Observable` cannot reach it.
    pub fn mark_changed(&mut self) {
        self.changed = true;
    }

    /// Clear the change flag without notifying anyone.
    ///
    /// Protected mutator: intended for the embedding type, e.g. to swallow
    /// a pending change it decided not to broadcast.
    pub fn clear_changed(&mut self) {
        self.changed = false;
    }

    /// Notify every registered observer of a pending change.
    ///
    /// If the change flag is clear this is a no-op: no observer runs and
    /// `Ok(())` is returned. Otherwise every handle registered at the start
    /// of the call is invoked exactly once with `(&self, &notification)`,
    /// and once all of them return the flag is cleared — including the
    /// degenerate case of zero observers.
    ///
    /// # Errors
    ///
    /// The first observer to return `Err` aborts the round: remaining
    /// observers are not invoked and the change flag is LEFT SET. A
    /// retried call therefore re-delivers to every observer, including the
    /// ones that already succeeded — callers own the retry/skip policy.
    /// The returned [`NotifyError`] reports how many observers completed
    /// before the failure.
    pub fn notify_observers(&mut self, notification: Notification) -> Result<(), NotifyError> {
        if !self.changed {
            return Ok(());
        }
        // Snapshot the handle list: callbacks see a stable round even
        // though they can inspect `&self` mid-dispatch.
        let round = self.observers.clone();
        debug!(observers = round.len(), payload = %notification, "dispatching notification");
        for (delivered, observer) in round.iter().enumerate() {
            if let Err(source) = observer.call(self, &notification) {
                warn!(delivered, "observer failed; dispatch aborted, change flag left set");
                return Err(NotifyError { delivered, source });
            }
        }
        self.changed = false;
        Ok(())
    }
}

impl fmt::Debug for Observable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observable")
            .field("observers", &self.observers.len())
            .field("changed", &self.changed)
            .finish()
    }
}

/// A notification round was aborted by a failing observer.
///
/// The change flag is still set when this is returned; see
/// [`Observable::notify_observers`] for the retry semantics.
#[derive(Debug)]
pub struct NotifyError {
    delivered: usize,
    source: ObserverError,
}

impl NotifyError {
    /// How many observers completed successfully before the failure.
    #[must_use]
    pub fn delivered(&self) -> usize {
        self.delivered
    }

    /// The failing observer's error.
    #[must_use]
    pub fn observer_error(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
        self.source.as_ref()
    }

    /// Consume the error, keeping only the failing observer's error.
    #[must_use]
    pub fn into_observer_error(self) -> ObserverError {
        self.source
    }
}

impl fmt::Display for NotifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "observer callback failed after {} successful deliveries",
            self.delivered
        )
    }
}

impl std::error::Error for NotifyError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        let source: &(dyn std::error::Error + 'static) = self.source.as_ref();
        Some(source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use serde_json::json;

    fn counting_observer() -> (Observer, Rc<Cell<usize>>) {
        let count = Rc::new(Cell::new(0));
        let count_in_cb = Rc::clone(&count);
        let observer = Observer::infallible(move |_, _| {
            count_in_cb.set(count_in_cb.get() + 1);
        });
        (observer, count)
    }

    #[test]
    fn starts_clean_and_empty() {
        let observable = Observable::new();
        assert_eq!(observable.count_observers(), 0);
        assert!(!observable.has_changed());
    }

    #[test]
    fn mark_and_clear() {
        let mut observable = Observable::new();
        observable.mark_changed();
        assert!(observable.has_changed());
        observable.mark_changed(); // Idempotent.
        assert!(observable.has_changed());
        observable.clear_changed();
        assert!(!observable.has_changed());
    }

    // Scenario: two observers, one marked change, one dispatch.
    #[test]
    fn dirty_dispatch_reaches_every_observer_once() {
        let mut observable = Observable::new();
        let (x, x_count) = counting_observer();
        let (y, y_count) = counting_observer();
        observable.add_observers([x, y]);
        observable.mark_changed();

        observable
            .notify_observers(Notification::new().entry("value", 42))
            .unwrap();

        assert_eq!(x_count.get(), 1);
        assert_eq!(y_count.get(), 1);
        assert_eq!(observable.count_observers(), 2);
        assert!(!observable.has_changed());
    }

    // Scenario: add then delete, dispatch to nobody still clears the flag.
    #[test]
    fn empty_dirty_dispatch_clears_flag() {
        let mut observable = Observable::new();
        let (x, x_count) = counting_observer();
        observable.add_observer(x.clone());
        observable.delete_observer(&x);
        assert_eq!(observable.count_observers(), 0);

        observable.mark_changed();
        observable.notify_observers(Notification::new()).unwrap();

        assert_eq!(x_count.get(), 0);
        assert!(!observable.has_changed());
    }

    // Scenario: double add is a single registration.
    #[test]
    fn duplicate_add_is_noop() {
        let mut observable = Observable::new();
        let (x, x_count) = counting_observer();
        observable.add_observer(x.clone());
        observable.add_observer(x.clone());
        assert_eq!(observable.count_observers(), 1);

        observable.mark_changed();
        observable.notify_observers(Notification::new()).unwrap();
        assert_eq!(x_count.get(), 1);
    }

    // Scenario: notifying a clean observable is a no-op.
    #[test]
    fn clean_notify_is_noop() {
        let mut observable = Observable::new();
        let (x, x_count) = counting_observer();
        observable.add_observer(x);

        observable.notify_observers(Notification::new()).unwrap();

        assert_eq!(x_count.get(), 0);
        assert!(!observable.has_changed());
    }

    #[test]
    fn delete_absent_is_noop() {
        let mut observable = Observable::new();
        let (x, _) = counting_observer();
        let (y, _) = counting_observer();
        observable.add_observer(x);
        observable.delete_observer(&y);
        assert_eq!(observable.count_observers(), 1);
    }

    #[test]
    fn cloned_handle_deletes_original_registration() {
        let mut observable = Observable::new();
        let (x, _) = counting_observer();
        observable.add_observer(x.clone());

        let alias = x.clone();
        observable.delete_observer(&alias);
        assert_eq!(observable.count_observers(), 0);
    }

    #[test]
    fn identical_closure_is_a_different_observer() {
        let mut observable = Observable::new();
        let a = Observer::infallible(|_, _| {});
        let b = Observer::infallible(|_, _| {});
        observable.add_observers([a.clone(), b]);
        assert_eq!(observable.count_observers(), 2);
        observable.delete_observer(&a);
        assert_eq!(observable.count_observers(), 1);
    }

    #[test]
    fn bulk_add_and_delete() {
        let mut observable = Observable::new();
        let (x, _) = counting_observer();
        let (y, _) = counting_observer();
        let (z, _) = counting_observer();
        observable.add_observers([x.clone(), y.clone(), z.clone()]);
        assert_eq!(observable.count_observers(), 3);

        observable.delete_observers([&x, &z]);
        assert_eq!(observable.count_observers(), 1);
        assert!(observable.is_observed_by(&y));
        assert!(!observable.is_observed_by(&x));

        // Empty iterators are no-ops.
        observable.add_observers([]);
        observable.delete_observers([]);
        assert_eq!(observable.count_observers(), 1);
    }

    #[test]
    fn payload_reaches_observer_intact() {
        let mut observable = Observable::new();
        let received = Rc::new(RefCell::new(Vec::new()));
        let received_in_cb = Rc::clone(&received);
        observable.add_observer(Observer::infallible(move |_, notification| {
            received_in_cb.borrow_mut().push(notification.clone());
        }));

        let payload = Notification::new()
            .arg("positional")
            .arg(7)
            .entry("value", json!({"nested": true}));
        observable.mark_changed();
        observable.notify_observers(payload.clone()).unwrap();

        assert_eq!(received.borrow().as_slice(), &[payload]);
    }

    #[test]
    fn observer_sees_subject_mid_dispatch() {
        let mut observable = Observable::new();
        let seen = Rc::new(Cell::new((0, false)));
        let seen_in_cb = Rc::clone(&seen);
        observable.add_observer(Observer::infallible(move |subject, _| {
            // The flag is cleared only after the full round.
            seen_in_cb.set((subject.count_observers(), subject.has_changed()));
        }));

        observable.mark_changed();
        observable.notify_observers(Notification::new()).unwrap();
        assert_eq!(seen.get(), (1, true));
    }

    #[test]
    fn failing_observer_aborts_round_and_keeps_flag() {
        let mut observable = Observable::new();
        let (first, first_count) = counting_observer();
        let failing = Observer::new(|_, _| Err("observer exploded".into()));
        let (last, last_count) = counting_observer();
        observable.add_observers([first, failing, last]);

        observable.mark_changed();
        let error = observable
            .notify_observers(Notification::new())
            .unwrap_err();

        assert_eq!(error.delivered(), 1);
        assert_eq!(error.observer_error().to_string(), "observer exploded");
        assert_eq!(first_count.get(), 1);
        assert_eq!(last_count.get(), 0);
        assert!(observable.has_changed());
    }

    #[test]
    fn retry_after_failure_redelivers_to_all() {
        let mut observable = Observable::new();
        let (first, first_count) = counting_observer();
        // Fails once, then succeeds.
        let failures_left = Rc::new(Cell::new(1));
        let failures_in_cb = Rc::clone(&failures_left);
        let flaky = Observer::new(move |_, _| {
            if failures_in_cb.get() > 0 {
                failures_in_cb.set(failures_in_cb.get() - 1);
                return Err("transient".into());
            }
            Ok(())
        });
        observable.add_observers([first, flaky]);

        observable.mark_changed();
        assert!(observable.notify_observers(Notification::new()).is_err());
        assert!(observable.has_changed());

        observable.notify_observers(Notification::new()).unwrap();
        assert!(!observable.has_changed());
        // The first observer ran in both rounds: the documented
        // re-delivery quirk.
        assert_eq!(first_count.get(), 2);
    }

    #[test]
    fn notify_error_formats_and_sources() {
        let mut observable = Observable::new();
        observable.add_observer(Observer::new(|_, _| Err("boom".into())));
        observable.mark_changed();

        let error = observable
            .notify_observers(Notification::new())
            .unwrap_err();
        assert_eq!(
            error.to_string(),
            "observer callback failed after 0 successful deliveries"
        );
        let source = std::error::Error::source(&error).expect("source");
        assert_eq!(source.to_string(), "boom");
        assert_eq!(error.into_observer_error().to_string(), "boom");
    }

    #[test]
    fn debug_format() {
        let mut observable = Observable::new();
        observable.add_observer(Observer::infallible(|_, _| {}));
        observable.mark_changed();
        let dbg = format!("{observable:?}");
        assert!(dbg.contains("Observable"));
        assert!(dbg.contains("observers: 1"));
        assert!(dbg.contains("changed: true"));
    }
}
