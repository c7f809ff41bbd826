//! Predicate registry for document-driven pattern construction.
//!
//! Patterns written as JSON/YAML cannot carry closures, so predicates are
//! referenced by name: `{"$predicate": "range", "config": {"min": 0}}`. Each
//! predicate type registers itself under a name via [`IntoPredicate`]; at
//! registration time the concrete type is monomorphized into a closure and
//! erased behind `Box<dyn Fn>`, then invoked at load time with the
//! document's `config`.
//!
//! # Example
//!
//! ```
//! use serde_json::json;
//! use shapecheck::{matches, register_core_predicates, RegistryBuilder, Value};
//!
//! let registry = register_core_predicates(RegistryBuilder::new()).build();
//!
//! let pattern = registry
//!     .load_pattern(&json!({
//!         "id": {"$predicate": "type", "config": "integer"},
//!         "email": {"$predicate": "string_match", "config": {"value": "@", "match_type": "contains"}}
//!     }))
//!     .unwrap();
//!
//! let user = Value::from(json!({"id": 7, "email": "a@b.c", "extra": true}));
//! assert!(matches(&user, &pattern).is_match());
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::config::pattern_from_json;
use crate::{
    AnyValue, Defined, NonEmpty, OneOf, Pattern, PatternError, Present, Range, StringMatcher,
    TypeIs, ValuePredicate, MAX_DEPTH,
};

// ═══════════════════════════════════════════════════════════════════════════════
// Traits
// ═══════════════════════════════════════════════════════════════════════════════

/// Trait for predicate types that can be constructed from configuration.
///
/// Each predicate knows its own config shape via the associated `Config` type.
/// The registry deserializes the document's `config` as `Config` and calls
/// [`from_config`](Self::from_config).
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use shapecheck::{IntoPredicate, PatternError, UnitConfig, Value, ValuePredicate};
///
/// #[derive(Debug)]
/// struct Even;
///
/// impl ValuePredicate for Even {
///     fn test(&self, value: &Value) -> bool {
///         value.as_f64().is_some_and(|n| n % 2.0 == 0.0)
///     }
/// }
///
/// impl IntoPredicate for Even {
///     type Config = UnitConfig;
///     fn from_config(_: UnitConfig) -> Result<Arc<dyn ValuePredicate>, PatternError> {
///         Ok(Arc::new(Even))
///     }
/// }
/// ```
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot be registered as a named predicate",
    label = "missing `IntoPredicate` impl",
    note = "implement `IntoPredicate` with a `Config` type and `from_config`"
)]
pub trait IntoPredicate: Send + Sync + 'static {
    /// The configuration type deserialized from the document's `config`.
    type Config: DeserializeOwned + Send + Sync;

    /// Construct the predicate from deserialized configuration.
    ///
    /// # Errors
    ///
    /// Returns [`PatternError::InvalidConfig`] if the config is semantically invalid,
    /// or [`PatternError::InvalidPattern`] if a regex pattern is invalid.
    fn from_config(config: Self::Config) -> Result<Arc<dyn ValuePredicate>, PatternError>;
}

/// Config for predicates that take no parameters.
///
/// Accepts `{}` (and is what an omitted `config` turns into).
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UnitConfig {}

// ═══════════════════════════════════════════════════════════════════════════════
// Type-erased factories
// ═══════════════════════════════════════════════════════════════════════════════

/// Type-erased predicate factory closure.
type BoxedPredicateFactory =
    Box<dyn Fn(&serde_json::Value) -> Result<Arc<dyn ValuePredicate>, PatternError> + Send + Sync>;

// ═══════════════════════════════════════════════════════════════════════════════
// Builder
// ═══════════════════════════════════════════════════════════════════════════════

/// Builder for constructing a [`Registry`].
///
/// Register predicate types under names, then call [`build()`](Self::build)
/// to produce an immutable `Registry`. Registering a name twice keeps the
/// later registration.
pub struct RegistryBuilder {
    factories: HashMap<String, BoxedPredicateFactory>,
}

impl RegistryBuilder {
    /// Create a new empty registry builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Register a predicate type under `name`.
    #[must_use]
    pub fn predicate<T: IntoPredicate>(mut self, name: &str) -> Self {
        self.factories.insert(
            name.to_owned(),
            Box::new(|value: &serde_json::Value| {
                let config: T::Config = serde_json::from_value(value.clone()).map_err(|e| {
                    PatternError::InvalidConfig {
                        reason: e.to_string(),
                    }
                })?;
                T::from_config(config)
            }),
        );
        self
    }

    /// Freeze the registry. No further registration is possible.
    #[must_use]
    pub fn build(self) -> Registry {
        tracing::debug!(predicates = self.factories.len(), "predicate registry built");
        Registry {
            factories: self.factories,
        }
    }
}

impl Default for RegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Register the built-in predicates.
///
/// | Name | Config | Predicate |
/// |------|--------|-----------|
/// | `any` | — | [`AnyValue`] |
/// | `defined` | — | [`Defined`] |
/// | `present` | — | [`Present`] |
/// | `non_empty` | — | [`NonEmpty`] |
/// | `type` | `"string"`, `"integer"`, ... | [`TypeIs`] |
/// | `string_match` | [`StringMatchConfig`](crate::StringMatchConfig) | [`StringMatcher`] |
/// | `one_of` | list of documents | [`OneOf`] |
/// | `range` | [`RangeConfig`](crate::RangeConfig) | [`Range`] |
#[must_use]
pub fn register_core_predicates(builder: RegistryBuilder) -> RegistryBuilder {
    builder
        .predicate::<AnyValue>("any")
        .predicate::<Defined>("defined")
        .predicate::<Present>("present")
        .predicate::<NonEmpty>("non_empty")
        .predicate::<TypeIs>("type")
        .predicate::<StringMatcher>("string_match")
        .predicate::<OneOf>("one_of")
        .predicate::<Range>("range")
}

// ═══════════════════════════════════════════════════════════════════════════════
// Registry
// ═══════════════════════════════════════════════════════════════════════════════

/// Immutable registry of predicate factories.
///
/// Constructed via [`RegistryBuilder`]. Use [`load_pattern()`](Self::load_pattern)
/// to turn a document into a [`Pattern`].
pub struct Registry {
    factories: HashMap<String, BoxedPredicateFactory>,
}

impl Registry {
    /// Load a pattern from a document.
    ///
    /// # Errors
    ///
    /// - [`PatternError::UnknownPredicate`] — `$predicate` name not registered
    /// - [`PatternError::InvalidConfig`] — config deserialization or construction failed
    /// - [`PatternError::InvalidPattern`] — regex pattern is invalid
    /// - [`PatternError::PatternTooLong`] — string match value over the length limit
    /// - [`PatternError::DepthExceeded`] — nesting exceeds [`MAX_DEPTH`]
    pub fn load_pattern(&self, document: &serde_json::Value) -> Result<Pattern, PatternError> {
        let pattern = pattern_from_json(document, &|name, config| self.resolve(name, config))?;
        let depth = pattern.depth();
        if depth > MAX_DEPTH {
            return Err(PatternError::DepthExceeded {
                depth,
                max: MAX_DEPTH,
            });
        }
        tracing::debug!(depth, "pattern loaded");
        Ok(pattern)
    }

    /// Returns the number of registered predicates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// Returns `true` if no predicates are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Returns `true` if `name` is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Returns all registered predicate names (sorted).
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    fn resolve(&self, name: &str, config: &serde_json::Value) -> Result<Pattern, PatternError> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| PatternError::UnknownPredicate {
                name: name.to_owned(),
                available: self.names().into_iter().map(str::to_owned).collect(),
            })?;
        tracing::trace!(predicate = name, "resolving predicate");
        factory(config).map(Pattern::Predicate)
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("predicates", &self.names())
            .finish()
    }
}
