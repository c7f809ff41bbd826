//! `matches` — Recursive structural match with first-divergence reporting
//!
//! The matcher walks the pattern, not the value. At each node it dispatches on
//! the pattern kind:
//!
//! 1. **Sequence** — against a set: set equality. Against a sequence: equal
//!    length, then index by index. Anything else: expected `array`.
//! 2. **Predicate** — the predicate must accept the value.
//! 3. **Mapping** — fields in declaration order, then the exact-only check.
//! 4. **Literal** — strict equality.
//!
//! # INV: first divergence wins
//!
//! Evaluation stops at the first failing index or field. Later siblings are
//! never evaluated, so at most one [`Mismatch`] is ever produced.

use std::fmt;

use crate::pattern::MappingPattern;
use crate::render::{lit, Shown};
use crate::{Pattern, Value, ValueSet};

/// Message reported when a predicate rejects its value.
pub const PREDICATE_FAILED: &str = "predicate failed";

/// Result of matching a value against a pattern.
#[derive(Debug, Clone, PartialEq)]
pub enum MatchOutcome {
    /// The value matches.
    Match,
    /// The first point where value and pattern diverge.
    Mismatch(Mismatch),
    /// A `name$$` key stopped matching to show a field's value.
    Dump(Dump),
}

impl MatchOutcome {
    /// Returns `true` for [`MatchOutcome::Match`].
    #[must_use]
    pub fn is_match(&self) -> bool {
        matches!(self, Self::Match)
    }

    /// Returns `true` for [`MatchOutcome::Dump`].
    #[must_use]
    pub fn is_dump(&self) -> bool {
        matches!(self, Self::Dump(_))
    }

    /// Returns the mismatch, if any.
    #[must_use]
    pub fn mismatch(&self) -> Option<&Mismatch> {
        match self {
            Self::Mismatch(m) => Some(m),
            _ => None,
        }
    }

    /// Returns the dump, if any.
    #[must_use]
    pub fn dump(&self) -> Option<&Dump> {
        match self {
            Self::Dump(d) => Some(d),
            _ => None,
        }
    }
}

impl fmt::Display for MatchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Match => f.write_str("match"),
            Self::Mismatch(m) => m.fmt(f),
            Self::Dump(d) => d.fmt(f),
        }
    }
}

/// What diverged at a mismatch.
#[derive(Debug, Clone, PartialEq)]
pub enum Detail {
    /// Expected one thing, got another.
    Expected {
        /// What the pattern wanted.
        expected: Shown,
        /// What the value had.
        got: Shown,
    },
    /// A bare explanation (predicate failures).
    Message(String),
}

/// A single first-divergence record.
///
/// Renders as `at <path>, expected <X>, got <Y>` or `at <path>, <message>`.
/// The empty path renders as `(root)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Mismatch {
    path: Vec<String>,
    detail: Detail,
}

impl Mismatch {
    /// Create a mismatch at `path`.
    #[must_use]
    pub fn new(path: Vec<String>, detail: Detail) -> Self {
        Self { path, detail }
    }

    /// Field names and indexes from the root down to the divergence.
    #[must_use]
    pub fn path(&self) -> &[String] {
        &self.path
    }

    /// The divergence itself.
    #[must_use]
    pub fn detail(&self) -> &Detail {
        &self.detail
    }

    /// Expected slot, absent for message-only mismatches.
    #[must_use]
    pub fn expected(&self) -> Option<&Shown> {
        match &self.detail {
            Detail::Expected { expected, .. } => Some(expected),
            Detail::Message(_) => None,
        }
    }

    /// Got slot, absent for message-only mismatches.
    #[must_use]
    pub fn got(&self) -> Option<&Shown> {
        match &self.detail {
            Detail::Expected { got, .. } => Some(got),
            Detail::Message(_) => None,
        }
    }

    /// Explanation, present only for message-only mismatches.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        match &self.detail {
            Detail::Message(m) => Some(m),
            Detail::Expected { .. } => None,
        }
    }

    /// Dot-joined path, `(root)` when empty.
    #[must_use]
    pub fn location(&self) -> String {
        location(&self.path)
    }
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "at {}, ", self.location())?;
        match &self.detail {
            Detail::Expected { expected, got } => write!(f, "expected {expected}, got {got}"),
            Detail::Message(m) => f.write_str(m),
        }
    }
}

/// Value captured by a `name$$` debug key.
#[derive(Debug, Clone, PartialEq)]
pub struct Dump {
    path: Vec<String>,
    value: Value,
}

impl Dump {
    /// Path of the dumped field (including the field itself).
    #[must_use]
    pub fn path(&self) -> &[String] {
        &self.path
    }

    /// The field's value.
    #[must_use]
    pub fn value(&self) -> &Value {
        &self.value
    }
}

impl fmt::Display for Dump {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "debug dump at {}: {}",
            location(&self.path),
            Shown::Value(self.value.clone())
        )
    }
}

fn location(path: &[String]) -> String {
    if path.is_empty() {
        "(root)".to_owned()
    } else {
        path.join(".")
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Matching
// ═══════════════════════════════════════════════════════════════════════════════

/// Match `received` against `pattern`.
///
/// Pure: no state is kept between calls, and the same pattern can be used
/// from many threads at once.
///
/// # Example
///
/// ```
/// use shapecheck::{matches, Pattern, Value};
///
/// let value = Value::from(vec![1, 2, 3]);
/// assert!(matches(&value, &Pattern::from(vec![1, 2, 3])).is_match());
///
/// let outcome = matches(&value, &Pattern::from(vec![1, 2]));
/// assert_eq!(outcome.to_string(), "at (root), expected length 2, got length 3");
/// ```
#[must_use]
pub fn matches(received: &Value, pattern: &Pattern) -> MatchOutcome {
    let mut path = Vec::new();
    match match_value(received, pattern, &mut path) {
        Ok(()) => MatchOutcome::Match,
        Err(Failure::Mismatch(m)) => {
            tracing::trace!(location = %m.location(), "pattern mismatch");
            MatchOutcome::Mismatch(m)
        }
        Err(Failure::Dump(d)) => {
            tracing::debug!(location = %location(&d.path), "debug dump key reached");
            MatchOutcome::Dump(d)
        }
    }
}

/// Internal short-circuit carrier: `?` stops at the first failure.
enum Failure {
    Mismatch(Mismatch),
    Dump(Dump),
}

type Step = Result<(), Failure>;

fn expected(path: &[String], expected: impl Into<Shown>, got: impl Into<Shown>) -> Failure {
    Failure::Mismatch(Mismatch::new(
        path.to_vec(),
        Detail::Expected {
            expected: expected.into(),
            got: got.into(),
        },
    ))
}

fn match_value(value: &Value, pattern: &Pattern, path: &mut Vec<String>) -> Step {
    match pattern {
        Pattern::Sequence(items) => match_sequence(value, items, path),
        Pattern::Predicate(predicate) => {
            if predicate.test(value) {
                Ok(())
            } else {
                Err(Failure::Mismatch(Mismatch::new(
                    path.clone(),
                    Detail::Message(PREDICATE_FAILED.to_owned()),
                )))
            }
        }
        Pattern::Mapping(mapping) => match_mapping(value, mapping, path),
        Pattern::Literal(literal) => {
            if value.strict_eq(literal) {
                Ok(())
            } else {
                Err(expected(path, literal.clone(), value.clone()))
            }
        }
    }
}

fn match_sequence(value: &Value, items: &[Pattern], path: &mut Vec<String>) -> Step {
    match value {
        Value::Set(received) => {
            // Predicates have no data form and never equal a member.
            let comparable = items.iter().all(|p| p.to_value().is_some());
            let wanted: ValueSet = items
                .iter()
                .map(|p| p.to_value().unwrap_or_default())
                .collect();
            if comparable && wanted == *received {
                Ok(())
            } else {
                Err(expected(path, Value::Set(wanted), value.clone()))
            }
        }
        Value::Sequence(received) => {
            if received.len() != items.len() {
                return Err(expected(
                    path,
                    lit(format!("length {}", items.len())),
                    lit(format!("length {}", received.len())),
                ));
            }
            for (index, (item, pattern)) in received.iter().zip(items).enumerate() {
                path.push(index.to_string());
                match_value(item, pattern, path)?;
                path.pop();
            }
            Ok(())
        }
        _ => Err(expected(path, lit("array"), value.clone())),
    }
}

fn match_mapping(value: &Value, mapping: &MappingPattern, path: &mut Vec<String>) -> Step {
    if value.is_nullish() {
        let wanted = mapping
            .class_name()
            .map_or_else(|| "an object".to_owned(), |class| format!("a {class}"));
        return Err(expected(path, lit(wanted), value.clone()));
    }

    for field in mapping.fields() {
        path.push(field.key().to_owned());
        let actual = field.selector().resolve(value);
        if field.selector().is_dump() {
            return Err(Failure::Dump(Dump {
                path: path.clone(),
                value: actual.into_owned(),
            }));
        }
        match_value(&actual, field.pattern(), path)?;
        path.pop();
    }

    if mapping.is_exact() {
        let extra: Vec<String> = value
            .own_keys()
            .into_iter()
            .filter(|key| !mapping.names(key))
            .collect();
        if !extra.is_empty() {
            return Err(expected(path, lit("no extra keys"), lit(extra.join(", "))));
        }
    }

    Ok(())
}
