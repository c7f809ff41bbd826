//! shapecheck-test: Test domain for conformance testing
//!
//! Provides a couple of domain predicates on top of the core set, and (with
//! the `fixtures` feature) a runner for the YAML fixtures under `fixtures/`.
//! This is the reference extension that shows how to add named predicates.
//!
//! # Example
//!
//! ```
//! use shapecheck_test::prelude::*;
//!
//! let pattern = Pattern::mapping([
//!     ("count", Pattern::predicate(Even)),
//!     ("tags", Pattern::predicate(LengthIs::new(2))),
//! ]);
//!
//! let value = Value::mapping([
//!     ("count", Value::from(4)),
//!     ("tags", Value::from(vec!["a", "b"])),
//! ]);
//! assert!(matches(&value, &pattern).is_match());
//! ```

use shapecheck::{Value, ValuePredicate};

#[cfg(feature = "fixtures")]
pub mod fixture;

/// Matches even integers.
#[derive(Debug, Clone, Copy, Default)]
pub struct Even;

impl ValuePredicate for Even {
    fn test(&self, value: &Value) -> bool {
        value
            .as_f64()
            .is_some_and(|n| n.is_finite() && n % 2.0 == 0.0)
    }
}

/// Matches sequences, strings and sets of exactly `len` items.
#[derive(Debug, Clone, Copy)]
pub struct LengthIs {
    len: usize,
}

impl LengthIs {
    /// Create a length check.
    #[must_use]
    pub fn new(len: usize) -> Self {
        Self { len }
    }
}

impl ValuePredicate for LengthIs {
    fn test(&self, value: &Value) -> bool {
        let actual = match value {
            Value::Set(set) => set.len(),
            Value::Sequence(items) => items.len(),
            Value::String(s) => s.chars().count(),
            _ => return false,
        };
        actual == self.len
    }
}

/// Prelude for convenient imports.
pub mod prelude {
    pub use super::{Even, LengthIs};
    pub use shapecheck::prelude::*;
}

// ═══════════════════════════════════════════════════════════════════════════════
// Registry support (feature = "registry")
// ═══════════════════════════════════════════════════════════════════════════════

/// Configuration for [`LengthIs`].
#[cfg(feature = "registry")]
#[derive(Debug, serde::Deserialize)]
pub struct LengthIsConfig {
    /// Expected number of items.
    pub len: usize,
}

#[cfg(feature = "registry")]
impl shapecheck::IntoPredicate for Even {
    type Config = shapecheck::UnitConfig;

    fn from_config(
        _: Self::Config,
    ) -> Result<std::sync::Arc<dyn ValuePredicate>, shapecheck::PatternError> {
        Ok(std::sync::Arc::new(Even))
    }
}

#[cfg(feature = "registry")]
impl shapecheck::IntoPredicate for LengthIs {
    type Config = LengthIsConfig;

    fn from_config(
        config: Self::Config,
    ) -> Result<std::sync::Arc<dyn ValuePredicate>, shapecheck::PatternError> {
        Ok(std::sync::Arc::new(LengthIs::new(config.len)))
    }
}

/// Register the core predicates plus this domain's `even` and `length`.
///
/// ```
/// # #[cfg(feature = "registry")]
/// # {
/// let registry = shapecheck_test::register(shapecheck::RegistryBuilder::new()).build();
/// assert!(registry.contains("even"));
/// assert!(registry.contains("range"));
/// # }
/// ```
#[cfg(feature = "registry")]
#[must_use]
pub fn register(builder: shapecheck::RegistryBuilder) -> shapecheck::RegistryBuilder {
    shapecheck::register_core_predicates(builder)
        .predicate::<Even>("even")
        .predicate::<LengthIs>("length")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn even_numbers() {
        assert!(Even.test(&Value::from(0)));
        assert!(Even.test(&Value::from(-4)));
        assert!(!Even.test(&Value::from(3)));
        assert!(!Even.test(&Value::from(2.5)));
        assert!(!Even.test(&Value::from(f64::INFINITY)));
        assert!(!Even.test(&Value::from("2")));
    }

    #[test]
    fn length_of_collections() {
        let two = LengthIs::new(2);
        assert!(two.test(&Value::from(vec![1, 2])));
        assert!(two.test(&Value::from("ab")));
        assert!(two.test(&Value::set([1, 2, 2])));
        assert!(!two.test(&Value::mapping([("a", 1), ("b", 2)])));
        assert!(!two.test(&Value::Null));
    }

    #[cfg(feature = "registry")]
    #[test]
    fn registry_includes_domain_predicates() {
        let registry = register(shapecheck::RegistryBuilder::new()).build();
        assert_eq!(registry.len(), 10);

        let pattern = registry
            .load_pattern(&serde_json::json!({"$predicate": "length", "config": {"len": 3}}))
            .unwrap();
        assert!(shapecheck::matches(&Value::from("abc"), &pattern).is_match());
    }
}
