//! `Pattern` — Expected shape of a value
//!
//! A pattern node is one of:
//!
//! - [`Pattern::Literal`] — strict equality with a value
//! - [`Pattern::Predicate`] — a [`ValuePredicate`] must accept the value
//! - [`Pattern::Sequence`] — positional sub-patterns (or set equality against a set)
//! - [`Pattern::Mapping`] — named fields, optionally exact-only
//!
//! Patterns are immutable once built. Dotted keys (`"a.b.c"`) are expanded into
//! nested single-field mappings at construction, and the `$$only` key turns into
//! the exact-only flag rather than a field.

use std::sync::Arc;

use crate::selector::{FieldSelector, ONLY_KEY};
use crate::{ClassRef, FnPredicate, Instance, Value, ValuePredicate, ValueSet};

/// One node of a pattern tree.
///
/// # Example
///
/// ```
/// use shapecheck::{exactly, matches, Pattern, Value};
///
/// let user = Value::mapping([("name", Value::from("alice")), ("admin", Value::from(false))]);
///
/// let pattern = Pattern::mapping([("name", Pattern::from("alice"))]);
/// assert!(matches(&user, &pattern).is_match());
///
/// // exact-only: `admin` is not listed
/// assert!(!matches(&user, &exactly(pattern)).is_match());
/// ```
#[derive(Debug, Clone)]
pub enum Pattern {
    /// Value must be strictly equal.
    Literal(Value),
    /// Value must pass the predicate.
    Predicate(Arc<dyn ValuePredicate>),
    /// Ordered sub-patterns.
    Sequence(Vec<Pattern>),
    /// Named sub-patterns.
    Mapping(MappingPattern),
}

impl Pattern {
    /// Literal pattern.
    pub fn literal(value: impl Into<Value>) -> Self {
        Self::Literal(value.into())
    }

    /// Predicate pattern.
    pub fn predicate(predicate: impl ValuePredicate + 'static) -> Self {
        Self::Predicate(Arc::new(predicate))
    }

    /// Predicate pattern from a named closure.
    pub fn check(
        name: impl Into<String>,
        check: impl Fn(&Value) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self::predicate(FnPredicate::new(name, check))
    }

    /// Sequence pattern.
    pub fn sequence<P: Into<Pattern>>(items: impl IntoIterator<Item = P>) -> Self {
        Self::Sequence(items.into_iter().map(Into::into).collect())
    }

    /// Mapping pattern; see [`MappingPattern::new`].
    pub fn mapping<K, P>(entries: impl IntoIterator<Item = (K, P)>) -> Self
    where
        K: Into<String>,
        P: Into<Pattern>,
    {
        Self::Mapping(MappingPattern::new(entries))
    }

    /// Literal class descriptor, for use under a `class` key.
    pub fn class(name: impl Into<String>) -> Self {
        Self::Literal(Value::Class(ClassRef::new(name)))
    }

    /// Returns the mapping pattern, if this is one.
    #[must_use]
    pub fn as_mapping(&self) -> Option<&MappingPattern> {
        match self {
            Self::Mapping(m) => Some(m),
            _ => None,
        }
    }

    /// Truthiness of the pattern itself, as seen by the `$$only` key.
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Literal(v) => v.is_truthy(),
            _ => true,
        }
    }

    /// Nesting depth of this pattern tree. Leaves are depth 1.
    #[must_use]
    pub fn depth(&self) -> usize {
        match self {
            Self::Literal(_) | Self::Predicate(_) => 1,
            Self::Sequence(items) => 1 + items.iter().map(Pattern::depth).max().unwrap_or(0),
            Self::Mapping(m) => {
                1 + m
                    .fields()
                    .iter()
                    .map(|f| f.pattern().depth())
                    .max()
                    .unwrap_or(0)
            }
        }
    }

    /// The pattern read as plain data, used when a sequence pattern is compared
    /// with a set. Predicates have no data form.
    #[must_use]
    pub fn to_value(&self) -> Option<Value> {
        match self {
            Self::Literal(v) => Some(v.clone()),
            Self::Predicate(_) => None,
            Self::Sequence(items) => items
                .iter()
                .map(Pattern::to_value)
                .collect::<Option<Vec<_>>>()
                .map(Value::Sequence),
            Self::Mapping(m) => m
                .fields()
                .iter()
                .map(|f| f.pattern().to_value().map(|v| (f.key().to_owned(), v)))
                .collect::<Option<_>>()
                .map(Value::Mapping),
        }
    }
}

/// Mark a mapping pattern exact-only: the received value may carry no fields
/// beyond the ones the pattern names.
///
/// Returns a new pattern; non-mapping patterns come back unchanged.
///
/// ```
/// use shapecheck::{exactly, matches, Pattern, Value};
///
/// let value = Value::mapping([("a", 1), ("b", 2)]);
/// let outcome = matches(&value, &exactly(Pattern::mapping([("a", 1)])));
/// assert_eq!(outcome.to_string(), "at (root), expected no extra keys, got b");
/// ```
#[must_use]
pub fn exactly(pattern: impl Into<Pattern>) -> Pattern {
    match pattern.into() {
        Pattern::Mapping(m) => Pattern::Mapping(m.exact()),
        other => other,
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Mapping patterns
// ═══════════════════════════════════════════════════════════════════════════════

/// One named entry of a [`MappingPattern`].
#[derive(Debug, Clone)]
pub struct FieldPattern {
    key: String,
    selector: FieldSelector,
    pattern: Pattern,
}

impl FieldPattern {
    fn new(key: String, pattern: Pattern) -> Self {
        Self {
            selector: FieldSelector::parse(&key),
            key,
            pattern,
        }
    }

    /// The key as written (head segment for dotted keys).
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// How the key reads the received value.
    #[must_use]
    pub fn selector(&self) -> &FieldSelector {
        &self.selector
    }

    /// The sub-pattern for this field.
    #[must_use]
    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }
}

/// Ordered field-name → sub-pattern pairs.
///
/// Entry order is significant: matching stops at the first failing field.
#[derive(Debug, Clone, Default)]
pub struct MappingPattern {
    fields: Vec<FieldPattern>,
    exact: bool,
}

impl MappingPattern {
    /// Build a mapping pattern from entries, in order.
    ///
    /// - `"a.b.c"` keys become `{a: {b: {c: pattern}}}`
    /// - a truthy `"$$only"` entry makes the mapping exact-only
    /// - reserved keys (`class`, `$$keys`, `$$size`, `$$type`) become selectors
    pub fn new<K, P>(entries: impl IntoIterator<Item = (K, P)>) -> Self
    where
        K: Into<String>,
        P: Into<Pattern>,
    {
        let mut mapping = Self::default();
        for (key, pattern) in entries {
            mapping.push(key.into(), pattern.into());
        }
        mapping
    }

    fn push(&mut self, key: String, pattern: Pattern) {
        if key == ONLY_KEY {
            self.exact |= pattern.is_truthy();
            return;
        }
        let Some((head, rest)) = key.split_once('.') else {
            self.fields.push(FieldPattern::new(key, pattern));
            return;
        };
        // built innermost first, without recursion; only a trailing `$$only` is a flag
        let mut segments = rest.rsplit('.');
        let mut nested = Self::default();
        match segments.next() {
            Some(ONLY_KEY) => nested.exact |= pattern.is_truthy(),
            Some(last) => nested.fields.push(FieldPattern::new(last.to_owned(), pattern)),
            None => {}
        }
        for segment in segments {
            let inner = Pattern::Mapping(std::mem::take(&mut nested));
            nested.fields.push(FieldPattern::new(segment.to_owned(), inner));
        }
        self.fields.push(FieldPattern::new(head.to_owned(), Pattern::Mapping(nested)));
    }

    /// The same mapping with the exact-only constraint on.
    #[must_use]
    pub fn exact(mut self) -> Self {
        self.exact = true;
        self
    }

    /// Returns `true` if extra received fields are a mismatch.
    #[must_use]
    pub fn is_exact(&self) -> bool {
        self.exact
    }

    /// Entries in declaration order.
    #[must_use]
    pub fn fields(&self) -> &[FieldPattern] {
        &self.fields
    }

    /// Returns `true` if some entry is keyed `key`.
    #[must_use]
    pub fn names(&self, key: &str) -> bool {
        self.fields.iter().any(|f| f.key == key)
    }

    /// Class named by a literal `class` entry, for "a {Class}" messages.
    #[must_use]
    pub fn class_name(&self) -> Option<&str> {
        self.fields.iter().find_map(|f| match (&f.selector, &f.pattern) {
            (FieldSelector::Class, Pattern::Literal(Value::Class(class))) => Some(class.name()),
            _ => None,
        })
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Conversions
// ═══════════════════════════════════════════════════════════════════════════════

impl From<Value> for Pattern {
    /// Mappings and sequences become structural patterns; everything else is a literal.
    fn from(value: Value) -> Self {
        match value {
            Value::Mapping(fields) => Self::Mapping(MappingPattern::new(fields)),
            Value::Sequence(items) => Self::Sequence(items.into_iter().map(Into::into).collect()),
            other => Self::Literal(other),
        }
    }
}

impl From<MappingPattern> for Pattern {
    fn from(mapping: MappingPattern) -> Self {
        Self::Mapping(mapping)
    }
}

impl<P: Into<Pattern>> From<Vec<P>> for Pattern {
    fn from(items: Vec<P>) -> Self {
        Self::sequence(items)
    }
}

macro_rules! literal_from {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Pattern {
                fn from(v: $t) -> Self {
                    Self::Literal(Value::from(v))
                }
            }
        )*
    };
}

literal_from!(
    bool, f64, f32, i8, i16, i32, i64, u8, u16, u32, u64, usize, isize, &str, String, ValueSet,
    Instance, ClassRef
);

#[cfg(test)]
mod tests {
    use super::*;

    fn field_keys(m: &MappingPattern) -> Vec<&str> {
        m.fields().iter().map(FieldPattern::key).collect()
    }

    #[test]
    fn dotted_keys_expand_to_nested_mappings() {
        let m = MappingPattern::new([("a.b.c", 5)]);
        assert_eq!(field_keys(&m), ["a"]);

        let b = m.fields()[0].pattern().as_mapping().unwrap();
        assert_eq!(field_keys(b), ["b"]);

        let c = b.fields()[0].pattern().as_mapping().unwrap();
        assert_eq!(field_keys(c), ["c"]);
        assert!(matches!(c.fields()[0].pattern(), Pattern::Literal(Value::Number(n)) if *n == 5.0));
    }

    #[test]
    fn trailing_only_segment_marks_the_nested_mapping() {
        let m = MappingPattern::new([("a.$$only", true)]);
        let a = m.fields()[0].pattern().as_mapping().unwrap();
        assert!(a.is_exact());
        assert!(a.fields().is_empty());
    }

    #[test]
    fn long_dotted_keys_expand() {
        let key = vec!["k"; 1_000].join(".");
        let pattern = Pattern::mapping([(key, 1)]);
        assert_eq!(pattern.depth(), 1_001);
    }

    #[test]
    fn only_key_sets_exact_flag() {
        let m = MappingPattern::new([("a", Pattern::from(1)), (ONLY_KEY, Pattern::from(true))]);
        assert!(m.is_exact());
        assert_eq!(field_keys(&m), ["a"]);

        let m = MappingPattern::new([("a", Pattern::from(1)), (ONLY_KEY, Pattern::from(false))]);
        assert!(!m.is_exact());
    }

    #[test]
    fn exactly_does_not_touch_the_original() {
        let original = MappingPattern::new([("a", 1)]);
        let strict = exactly(original.clone());
        assert!(!original.is_exact());
        assert!(strict.as_mapping().unwrap().is_exact());
    }

    #[test]
    fn exactly_leaves_non_mappings_alone() {
        assert!(matches!(exactly(vec![1, 2]), Pattern::Sequence(_)));
    }

    #[test]
    fn reserved_keys_become_selectors() {
        let m = MappingPattern::new([
            ("class", Pattern::class("Point")),
            ("$$size", Pattern::from(2)),
        ]);
        assert_eq!(m.fields()[0].selector(), &FieldSelector::Class);
        assert_eq!(m.fields()[1].selector(), &FieldSelector::Size);
        assert_eq!(m.class_name(), Some("Point"));
    }

    #[test]
    fn from_value_builds_structure() {
        let p = Pattern::from(Value::mapping([("a", Value::from(vec![1, 2]))]));
        let m = p.as_mapping().unwrap();
        assert!(matches!(m.fields()[0].pattern(), Pattern::Sequence(items) if items.len() == 2));
        assert_eq!(p.depth(), 3);
    }

    #[test]
    fn to_value_fails_on_predicates() {
        assert!(Pattern::from(vec![1, 2]).to_value().is_some());
        let p = Pattern::sequence([Pattern::from(1), Pattern::check("any", |_| true)]);
        assert!(p.to_value().is_none());
    }
}
