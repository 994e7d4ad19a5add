#![forbid(unsafe_code)]

//! End-to-end demo: a thermostat subject with logging observers.
//!
//! Drives the whole herald surface: registration and deletion by handle,
//! the clean no-op, dirty dispatch with a structured payload, a failing
//! observer aborting a round (and the retry that re-delivers), and a
//! [`Watched`] status cell.
//!
//! Run with: RUST_LOG=debug cargo run -p herald-demo

use herald::{Notification, NotifyError, Observable, Observer, Subject, Watched};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// A thermostat: owns a temperature and broadcasts every real change.
struct Thermostat {
    observable: Observable,
    celsius: f64,
}

impl Thermostat {
    fn new(celsius: f64) -> Self {
        Self {
            observable: Observable::new(),
            celsius,
        }
    }

    fn set_celsius(&mut self, celsius: f64) -> Result<(), NotifyError> {
        if self.celsius == celsius {
            return Ok(());
        }
        let previous = self.celsius;
        self.celsius = celsius;
        self.mark_changed();
        self.notify_observers(
            Notification::new()
                .entry("celsius", celsius)
                .entry("previous", previous),
        )
    }
}

impl Subject for Thermostat {
    fn observable(&self) -> &Observable {
        &self.observable
    }

    fn observable_mut(&mut self) -> &mut Observable {
        &mut self.observable
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut thermostat = Thermostat::new(19.0);

    let logger = Observer::infallible(|subject, notification| {
        info!(
            observers = subject.count_observers(),
            payload = %notification,
            "temperature changed"
        );
    });
    let alarm = Observer::new(|_, notification| {
        let celsius = notification
            .get("celsius")
            .and_then(|v| v.as_f64())
            .unwrap_or(0.0);
        if celsius > 30.0 {
            return Err(format!("{celsius}°C exceeds the 30°C alarm limit").into());
        }
        Ok(())
    });

    thermostat.add_observers([logger.clone(), alarm.clone()]);
    info!(observers = thermostat.count_observers(), "thermostat wired");

    // Ordinary change: both observers run, flag ends clear.
    if let Err(error) = thermostat.set_celsius(21.5) {
        warn!(%error, "unexpected dispatch failure");
    }

    // No real change, no dispatch.
    if let Err(error) = thermostat.set_celsius(21.5) {
        warn!(%error, "unexpected dispatch failure");
    }

    // The alarm observer rejects this round: dispatch aborts after the
    // logger, and the change stays pending.
    match thermostat.set_celsius(35.0) {
        Ok(()) => warn!("alarm should have fired"),
        Err(error) => info!(
            delivered = error.delivered(),
            cause = %error.observer_error(),
            still_pending = thermostat.has_changed(),
            "round aborted"
        ),
    }

    // Drop the alarm and retry the pending round: the logger is notified
    // again — retries re-deliver to every observer.
    thermostat.delete_observers([&alarm]);
    match thermostat.notify_observers(Notification::new().entry("celsius", 35.0)) {
        Ok(()) => info!(pending = thermostat.has_changed(), "retry delivered"),
        Err(error) => warn!(%error, "retry failed"),
    }

    // A watched status line: equal assignments are silent.
    let mut status = Watched::new(String::from("idle"));
    status.add_observers([Observer::infallible(|_, notification| {
        info!(payload = %notification, "status changed");
    })]);
    for next in ["heating", "heating", "idle"] {
        if let Err(error) = status.set(String::from(next)) {
            warn!(%error, "status update failed");
        }
    }

    info!(status = %status.get(), celsius = thermostat.celsius, "demo complete");
}
