//! Partial comparison of a normalized event against expected fields.
//!
//! Expectations are addressed by dotted paths (`log.iocname`), each segment
//! being an object key. Every expectation is evaluated; a check never stops at
//! the first problem, so one round trip reports everything that is wrong.

use crate::error::{HarnessError, Result};
use serde_json::Value;
use std::fmt::{Display, Formatter};

/// Ordered `(dotted key, expected value)` pairs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Expectation {
    fields: Vec<(String, Value)>,
}

impl Expectation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.push((key.into(), value.into()));
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(key, _)| key.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Expectation {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MismatchKind {
    MissingKey,
    BadValue,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Mismatch {
    Missing {
        key: String,
    },
    BadValue {
        key: String,
        expected: Value,
        received: Value,
    },
}

impl Mismatch {
    pub fn key(&self) -> &str {
        match self {
            Mismatch::Missing { key } | Mismatch::BadValue { key, .. } => key,
        }
    }

    pub fn kind(&self) -> MismatchKind {
        match self {
            Mismatch::Missing { .. } => MismatchKind::MissingKey,
            Mismatch::BadValue { .. } => MismatchKind::BadValue,
        }
    }
}

impl Display for Mismatch {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Mismatch::Missing { key } => write!(f, "Missing key '{key}'"),
            Mismatch::BadValue {
                key,
                expected,
                received,
            } => write!(
                f,
                "Bad value for key '{key}': expected {expected}, received {received}"
            ),
        }
    }
}

/// Every mismatch found by one [`check`]; empty means the event matched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MismatchReport {
    mismatches: Vec<Mismatch>,
}

impl MismatchReport {
    pub fn is_empty(&self) -> bool {
        self.mismatches.is_empty()
    }

    pub fn len(&self) -> usize {
        self.mismatches.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Mismatch> {
        self.mismatches.iter()
    }

    pub fn get(&self, key: &str) -> Option<&Mismatch> {
        self.mismatches.iter().find(|mismatch| mismatch.key() == key)
    }

    pub fn lines(&self) -> Vec<String> {
        self.mismatches.iter().map(ToString::to_string).collect()
    }

    /// `Ok` for an empty report, otherwise [`HarnessError::Validation`].
    pub fn into_result(self) -> Result<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(HarnessError::Validation(self))
        }
    }

    fn push(&mut self, mismatch: Mismatch) {
        self.mismatches.push(mismatch);
    }
}

impl FromIterator<Mismatch> for MismatchReport {
    fn from_iter<T: IntoIterator<Item = Mismatch>>(iter: T) -> Self {
        Self {
            mismatches: iter.into_iter().collect(),
        }
    }
}

impl Display for MismatchReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.lines().join("\n"))
    }
}

/// Looks up `key` one `.`-separated object key at a time.
pub fn dotted_get<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    key.split('.')
        .try_fold(value, |node, segment| node.as_object()?.get(segment))
}

pub fn check(expected: &Expectation, received: &Value) -> MismatchReport {
    let mut report = MismatchReport::default();
    for (key, expected_value) in expected.iter() {
        match dotted_get(received, key) {
            None => report.push(Mismatch::Missing { key: key.to_string() }),
            Some(received_value) if received_value != expected_value => {
                report.push(Mismatch::BadValue {
                    key: key.to_string(),
                    expected: expected_value.clone(),
                    received: received_value.clone(),
                })
            }
            Some(_) => {}
        }
    }
    report
}
