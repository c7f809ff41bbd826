//! `FieldSelector` — How a mapping-pattern key reads the received value
//!
//! Most keys name a field. A few reserved keys instead compute a value from the
//! received data:
//!
//! | Key | Selector | Yields |
//! |-----|----------|--------|
//! | `class` | [`FieldSelector::Class`] | the value's class descriptor |
//! | `$$keys` | [`FieldSelector::Keys`] | set of own field names |
//! | `$$size` | [`FieldSelector::Size`] | number of own fields |
//! | `$$type` | [`FieldSelector::Type`] | type tag string |
//! | `name$$` | [`FieldSelector::Dump`] | stops matching and dumps the field |
//!
//! Keys are parsed once, when the pattern is built.

use std::borrow::Cow;

use crate::{Value, ValueSet};

/// Key that switches a mapping pattern to exact-only. Never a field.
pub const ONLY_KEY: &str = "$$only";

/// Suffix marking a debug-dump key.
pub const DUMP_SUFFIX: &str = "$$";

/// Parsed form of a mapping-pattern key.
///
/// # Example
///
/// ```
/// use shapecheck::{FieldSelector, Value};
///
/// let value = Value::mapping([("b", 1), ("a", 2)]);
///
/// assert_eq!(FieldSelector::parse("$$size").resolve(&value).as_f64(), Some(2.0));
/// assert_eq!(FieldSelector::parse("a").resolve(&value).as_f64(), Some(2.0));
/// assert_eq!(FieldSelector::parse("$$type").resolve(&value).as_str(), Some("object"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldSelector {
    /// The value's runtime class.
    Class,
    /// Sorted own field names, as a set.
    Keys,
    /// Count of own fields.
    Size,
    /// Type tag (`"string"`, `"object"`, ...).
    Type,
    /// Plain named field.
    Named(String),
    /// Debug dump of the inner selector's value.
    Dump(Box<FieldSelector>),
}

impl FieldSelector {
    /// Parse a mapping-pattern key.
    ///
    /// Dotted keys are split by the pattern builder before they get here, so
    /// `"a.b"` parses as a plain field named `a.b`.
    #[must_use]
    pub fn parse(key: &str) -> Self {
        if let Some(inner) = key.strip_suffix(DUMP_SUFFIX) {
            return Self::Dump(Box::new(Self::parse(inner)));
        }
        match key {
            "class" => Self::Class,
            "$$keys" => Self::Keys,
            "$$size" => Self::Size,
            "$$type" => Self::Type,
            other => Self::Named(other.to_owned()),
        }
    }

    /// Returns `true` for a debug-dump selector.
    #[must_use]
    pub fn is_dump(&self) -> bool {
        matches!(self, Self::Dump(_))
    }

    /// Read this selector's value out of `value`.
    #[must_use]
    pub fn resolve<'v>(&self, value: &'v Value) -> Cow<'v, Value> {
        match self {
            Self::Class => Cow::Owned(value.class_of().map_or(Value::Undefined, Value::Class)),
            Self::Keys => {
                let mut keys = value.own_keys();
                keys.sort_unstable();
                Cow::Owned(Value::Set(keys.into_iter().map(Value::String).collect::<ValueSet>()))
            }
            Self::Size => Cow::Owned(Value::from(value.own_keys().len())),
            Self::Type => Cow::Owned(Value::from(value.type_tag())),
            Self::Named(name) => value.field(name),
            Self::Dump(inner) => inner.resolve(value),
        }
    }
}
