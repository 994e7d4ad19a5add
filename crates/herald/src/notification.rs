#![forbid(unsafe_code)]

//! Structured notification payloads: positional and keyed data.
//!
//! A [`Notification`] is a variadic argument list under a fixed signature:
//! positional values in order, keyed values by name, both carried as
//! [`Value`]s. Observers receive the payload by reference and must treat
//! it as read-only.
//!
//! # Invariants
//!
//! 1. Positional values keep their insertion order.
//! 2. Keyed values are last-write-wins per key, iterated in key order.
//! 3. Values arrive at observers exactly as built (no coercion, no
//!    cloning on the dispatch path).

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

pub use serde_json::Value;

/// Payload dispatched to every observer in a notification round.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    positional: Vec<Value>,
    keyed: BTreeMap<String, Value>,
}

impl Notification {
    /// Create an empty payload.
    ///
    /// Useful as-is for "something changed, look at the subject" style
    /// notifications that carry no data.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a positional value.
    #[must_use]
    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.positional.push(value.into());
        self
    }

    /// Insert a keyed value. Re-inserting a key overwrites its value,
    /// like a repeated keyword argument.
    #[must_use]
    pub fn entry(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.keyed.insert(key.into(), value.into());
        self
    }

    /// The positional values, in the order they were appended.
    #[must_use]
    pub fn positional(&self) -> &[Value] {
        &self.positional
    }

    /// The keyed values.
    #[must_use]
    pub fn keyed(&self) -> &BTreeMap<String, Value> {
        &self.keyed
    }

    /// Look up a keyed value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.keyed.get(key)
    }

    /// Total number of carried values, positional and keyed.
    #[must_use]
    pub fn len(&self) -> usize {
        self.positional.len() + self.keyed.len()
    }

    /// Whether the payload carries no values at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.keyed.is_empty()
    }
}

impl fmt::Display for Notification {
    /// Compact argument-list rendering: `(1, "x", key=42)`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        let mut first = true;
        for value in &self.positional {
            if !first {
                write!(f, ", ")?;
            }
            first = false;
            write!(f, "{value}")?;
        }
        for (key, value) in &self.keyed {
            if !first {
                write!(f, ", ")?;
            }
            first = false;
            write!(f, "{key}={value}")?;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_payload() {
        let n = Notification::new();
        assert!(n.is_empty());
        assert_eq!(n.len(), 0);
        assert_eq!(n.positional(), &[] as &[Value]);
        assert!(n.get("anything").is_none());
    }

    #[test]
    fn positional_order_preserved() {
        let n = Notification::new().arg(1).arg("two").arg(3.0);
        assert_eq!(n.positional(), &[json!(1), json!("two"), json!(3.0)]);
        assert_eq!(n.len(), 3);
    }

    #[test]
    fn keyed_lookup_and_overwrite() {
        let n = Notification::new()
            .entry("value", 41)
            .entry("value", 42)
            .entry("unit", "celsius");
        assert_eq!(n.get("value"), Some(&json!(42)));
        assert_eq!(n.get("unit"), Some(&json!("celsius")));
        assert_eq!(n.len(), 2);
    }

    #[test]
    fn mixed_payload_display() {
        let n = Notification::new().arg(1).arg("x").entry("key", 42);
        assert_eq!(n.to_string(), "(1, \"x\", key=42)");
    }

    #[test]
    fn serde_round_trip() {
        let n = Notification::new()
            .arg(json!({"nested": [1, 2]}))
            .entry("who", "thermostat");
        let encoded = serde_json::to_string(&n).unwrap();
        let decoded: Notification = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, n);
    }
}
