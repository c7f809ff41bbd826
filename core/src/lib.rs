//! shapecheck - structural pattern matching for test assertions
//!
//! Checks whether a value "has" the shape described by a pattern and reports the
//! first place where it does not.
//!
//! # Architecture
//!
//! - [`Value`] — Dynamically-typed data under test (scalars, sequences, sets, mappings, instances)
//! - [`Pattern`] — Expected shape: literals, predicates, positional sequences, named fields
//! - [`FieldSelector`] — How a pattern key reads from a value (`class`, `$$keys`, `$$size`, `$$type`, `$$` dump)
//! - [`matches`] — The matcher: depth-first, short-circuits on the first failure
//! - [`MatchOutcome`] — `Match`, or a [`Mismatch`] / [`Dump`] carrying the path to the failure
//! - [`to_have`] / [`assert_has!`] — Test-framework integration
//!
//! # Key Invariants
//!
//! 1. **Partial by default**: mapping patterns check only the keys they list.
//!    [`exactly`] (or a `$$only` key) turns on the "no extra keys" check.
//!
//! 2. **Sequences are positional**: lengths must agree and items are matched
//!    in order. A sequence pattern against a *set* is compared as a set instead.
//!
//! 3. **First failure wins**: matching stops at the first mismatch; its path is
//!    the chain of keys and indices from the root, rendered as `a.b.0`.
//!
//! # Example
//!
//! ```
//! use shapecheck::prelude::*;
//!
//! let order = Value::mapping([
//!     ("id", Value::from(7)),
//!     ("items", Value::from(vec![
//!         Value::mapping([("sku", "a-1"), ("qty", "2")]),
//!     ])),
//! ]);
//!
//! let pattern = Pattern::mapping([
//!     ("id", Pattern::predicate(TypeIs::Integer)),
//!     ("items.length", Pattern::from(1)),
//!     ("items", Pattern::sequence([Pattern::mapping([("qty", 2)])])),
//! ]);
//!
//! let outcome = matches(&order, &pattern);
//! assert_eq!(outcome.to_string(), r#"at items.0.qty, expected 2, got "2""#);
//! ```
//!
//! # Loading patterns from documents
//!
//! With the `registry` feature, JSON/YAML documents can reference named
//! predicates (`{"$predicate": "type", "config": "string"}`) resolved through a
//! [`Registry`](crate::Registry). Without it, [`Pattern::try_from`] accepts
//! predicate-free documents.

// ═══════════════════════════════════════════════════════════════════════════════
// Modules
// ═══════════════════════════════════════════════════════════════════════════════

mod assertion;
mod config;
mod matcher;
mod pattern;
mod predicate;
mod render;
mod selector;
mod value;

#[cfg(feature = "registry")]
mod registry;

// ═══════════════════════════════════════════════════════════════════════════════
// Public API
// ═══════════════════════════════════════════════════════════════════════════════

// Core types
pub use matcher::{matches, Detail, Dump, MatchOutcome, Mismatch, PREDICATE_FAILED};
pub use pattern::{exactly, FieldPattern, MappingPattern, Pattern};
pub use selector::{FieldSelector, DUMP_SUFFIX, ONLY_KEY};
pub use value::{ClassRef, Fields, Instance, Kind, Value, ValueSet};

// Rendering
pub use render::{lit, to_json, Shown};

// Assertions
pub use assertion::{to_have, Verdict, NEGATION_UNSUPPORTED};

// Documents
pub use config::{CLASS_KEY, PREDICATE_CONFIG_KEY, PREDICATE_KEY, SET_KEY, UNDEFINED_KEY};

// Registry (feature-gated)
#[cfg(feature = "registry")]
pub use predicate::into_predicate::{RangeConfig, StringMatchConfig};
#[cfg(feature = "registry")]
pub use registry::{register_core_predicates, IntoPredicate, Registry, RegistryBuilder, UnitConfig};

// Predicates
pub use predicate::{
    AnyValue, Defined, FnPredicate, NonEmpty, OneOf, Present, Range, StringMatchType, StringMatcher,
    TypeIs, ValuePredicate,
};

// ═══════════════════════════════════════════════════════════════════════════════
// Prelude
// ═══════════════════════════════════════════════════════════════════════════════

/// Prelude module for convenient imports.
///
/// ```
/// use shapecheck::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        // Predicates
        AnyValue,
        // Values
        ClassRef,
        Defined,
        FnPredicate,
        Instance,
        // Outcomes
        MatchOutcome,
        Mismatch,
        NonEmpty,
        OneOf,
        // Patterns
        Pattern,
        // Errors
        PatternError,
        Present,
        Range,
        StringMatchType,
        StringMatcher,
        TypeIs,
        Value,
        ValuePredicate,
        ValueSet,
        Verdict,
        // Functions
        exactly,
        matches,
        to_have,
    };
    pub use crate::assert_has;
}

// ═══════════════════════════════════════════════════════════════════════════════
// Constants
// ═══════════════════════════════════════════════════════════════════════════════

/// Maximum nesting depth of a pattern loaded from a document.
///
/// Patterns built in code are not checked; the matcher recurses once per level.
pub const MAX_DEPTH: usize = 64;

/// Maximum length for non-regex string match patterns (exact, prefix, suffix, contains).
pub const MAX_PATTERN_LENGTH: usize = 8192;

/// Maximum length for regex patterns.
///
/// Shorter limit than [`MAX_PATTERN_LENGTH`] because regex compilation cost
/// grows faster than literal matching.
pub const MAX_REGEX_PATTERN_LENGTH: usize = 4096;

// ═══════════════════════════════════════════════════════════════════════════════
// Errors
// ═══════════════════════════════════════════════════════════════════════════════

/// Errors from loading a pattern out of a document.
///
/// Matching itself never fails; a value either matches or yields a [`Mismatch`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PatternError {
    /// Pattern nesting exceeds [`MAX_DEPTH`].
    #[error("pattern nesting depth is {depth}, but maximum allowed is {max}")]
    DepthExceeded {
        /// Actual depth of the pattern tree.
        depth: usize,
        /// Maximum allowed depth.
        max: usize,
    },
    /// A regex failed to compile.
    #[error("invalid pattern \"{pattern}\": {reason}")]
    InvalidPattern {
        /// The pattern that failed to compile.
        pattern: String,
        /// The underlying error message.
        reason: String,
    },
    /// Predicate configuration could not be deserialized or is malformed.
    #[error("invalid config: {reason}")]
    InvalidConfig {
        /// The underlying error message.
        reason: String,
    },
    /// A `$predicate` name is not registered.
    #[error("unknown predicate \"{name}\"{}", available_hint(.available))]
    UnknownPredicate {
        /// The unregistered name.
        name: String,
        /// Names that ARE registered.
        available: Vec<String>,
    },
    /// A string match pattern exceeds the maximum allowed length.
    #[error("pattern length is {len}, but maximum allowed is {max}")]
    PatternTooLong {
        /// Actual length of the pattern.
        len: usize,
        /// Maximum allowed length.
        max: usize,
    },
}

fn available_hint(available: &[String]) -> String {
    if available.is_empty() {
        " (no predicates are registered)".to_owned()
    } else {
        format!(" (registered: {})", available.join(", "))
    }
}
