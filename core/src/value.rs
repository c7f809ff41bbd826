//! `Value` — Dynamic data under test
//!
//! Received values are untyped trees: scalars, ordered sequences, unordered
//! sets, keyed mappings, and class instances (a mapping tagged with a class).
//! Every value classifies into exactly one [`Kind`] before the matcher
//! dispatches on it.
//!
//! # Two equalities
//!
//! - [`Value::strict_eq`] — literal patterns. Scalars compare by value, `NaN`
//!   never equals itself.
//! - `==` ([`PartialEq`]) — deep structural equality used for set comparison.
//!   `NaN` equals `NaN`, `0` and `-0` differ, mapping key order is ignored.

use std::borrow::Cow;
use std::fmt;

use indexmap::IndexMap;

/// Ordered field storage for mappings and instances.
///
/// Insertion order is kept so that own-key listings come out in the order the
/// fields were written.
pub type Fields = IndexMap<String, Value>;

/// A runtime class descriptor.
///
/// Two descriptors are the same class when their names are equal.
///
/// ```
/// use shapecheck::ClassRef;
///
/// let point = ClassRef::new("Point");
/// assert_eq!(point.name(), "Point");
/// assert_eq!(point, ClassRef::new("Point"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClassRef {
    name: String,
}

impl ClassRef {
    /// Create a class descriptor with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Returns the class name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for ClassRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Shape classification of a [`Value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    /// Undefined, null, booleans, numbers, strings and class descriptors.
    Scalar,
    /// Ordered sequence.
    Sequence,
    /// Unordered collection compared by membership.
    SetLike,
    /// Bare keyed mapping.
    Mapping,
    /// Keyed mapping carrying a class.
    Instance,
}

/// A class instance: named fields plus the class they belong to.
#[derive(Debug, Clone)]
pub struct Instance {
    class: ClassRef,
    fields: Fields,
}

impl Instance {
    /// Create an instance of `class` with the given fields.
    pub fn new<K, V>(class: ClassRef, fields: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        Self {
            class,
            fields: fields
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Returns the instance's class.
    #[must_use]
    pub fn class(&self) -> &ClassRef {
        &self.class
    }

    /// Returns the instance's fields.
    #[must_use]
    pub fn fields(&self) -> &Fields {
        &self.fields
    }
}

/// Unordered collection of values.
///
/// Scalars are de-duplicated on insert (a number, string or boolean appears at
/// most once). Compound values are always kept: two equal-looking mappings are
/// still two members, the same way two separately built objects are.
#[derive(Debug, Clone, Default)]
pub struct ValueSet {
    items: Vec<Value>,
}

impl ValueSet {
    /// Create an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value. Returns `false` if an equal scalar was already present.
    pub fn insert(&mut self, value: Value) -> bool {
        if self.items.iter().any(|v| v.same_value_zero(&value)) {
            return false;
        }
        self.items.push(value);
        true
    }

    /// Number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if the set has no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns `true` if some member is deeply equal to `value`.
    #[must_use]
    pub fn contains(&self, value: &Value) -> bool {
        self.items.iter().any(|v| v == value)
    }

    /// Iterate members in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.items.iter()
    }
}

impl PartialEq for ValueSet {
    /// Each member must pair with a distinct deeply equal member of `other`.
    fn eq(&self, other: &Self) -> bool {
        if self.len() != other.len() {
            return false;
        }
        let mut taken = vec![false; other.len()];
        self.items.iter().all(|v| {
            let slot = (0..other.len()).find(|&i| !taken[i] && *v == other.items[i]);
            match slot {
                Some(i) => {
                    taken[i] = true;
                    true
                }
                None => false,
            }
        })
    }
}

impl FromIterator<Value> for ValueSet {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        let mut set = Self::new();
        for value in iter {
            set.insert(value);
        }
        set
    }
}

impl<'a> IntoIterator for &'a ValueSet {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Dynamic value under test.
///
/// # Example
///
/// ```
/// use shapecheck::{Kind, Value};
///
/// let user = Value::mapping([("name", Value::from("alice")), ("age", Value::from(30))]);
/// assert_eq!(user.kind(), Kind::Mapping);
/// assert_eq!(user.field("name").as_str(), Some("alice"));
/// assert!(user.field("missing").is_undefined());
/// ```
#[derive(Debug, Clone, Default)]
pub enum Value {
    /// Absent value (a field that does not exist).
    #[default]
    Undefined,
    /// Explicit null.
    Null,
    /// Boolean.
    Bool(bool),
    /// Number (IEEE-754 double; the only numeric type).
    Number(f64),
    /// String.
    String(String),
    /// Ordered sequence.
    Sequence(Vec<Value>),
    /// Unordered set.
    Set(ValueSet),
    /// Bare keyed mapping.
    Mapping(Fields),
    /// Class instance.
    Instance(Instance),
    /// Class descriptor (what the `class` selector yields).
    Class(ClassRef),
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Undefined, Self::Undefined) | (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Number(a), Self::Number(b)) => same_number(*a, *b),
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Class(a), Self::Class(b)) => a == b,
            (Self::Sequence(a), Self::Sequence(b)) => a == b,
            (Self::Set(a), Self::Set(b)) => a == b,
            (Self::Mapping(a), Self::Mapping(b)) => fields_eq(a, b),
            (Self::Instance(a), Self::Instance(b)) => {
                a.class == b.class && fields_eq(&a.fields, &b.fields)
            }
            _ => false,
        }
    }
}

/// Number identity: `NaN` equals `NaN`, `0` differs from `-0`.
fn same_number(a: f64, b: f64) -> bool {
    if a.is_nan() || b.is_nan() {
        return a.is_nan() && b.is_nan();
    }
    a == b && (a != 0.0 || a.is_sign_negative() == b.is_sign_negative())
}

fn fields_eq(a: &Fields, b: &Fields) -> bool {
    a.len() == b.len() && a.iter().all(|(k, v)| b.get(k).is_some_and(|w| v == w))
}

impl Value {
    /// Build a mapping from key/value pairs, keeping their order.
    pub fn mapping<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        Self::Mapping(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Build a set; scalars are de-duplicated.
    pub fn set<V: Into<Value>>(items: impl IntoIterator<Item = V>) -> Self {
        Self::Set(items.into_iter().map(Into::into).collect())
    }

    /// Build an instance of the named class.
    pub fn instance<K, V>(class: &str, fields: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        Self::Instance(Instance::new(ClassRef::new(class), fields))
    }

    /// Classify this value.
    #[must_use]
    pub fn kind(&self) -> Kind {
        match self {
            Self::Sequence(_) => Kind::Sequence,
            Self::Set(_) => Kind::SetLike,
            Self::Mapping(_) => Kind::Mapping,
            Self::Instance(_) => Kind::Instance,
            _ => Kind::Scalar,
        }
    }

    /// Returns `true` for [`Value::Undefined`].
    #[inline]
    #[must_use]
    pub fn is_undefined(&self) -> bool {
        matches!(self, Self::Undefined)
    }

    /// Returns `true` for null or undefined.
    #[inline]
    #[must_use]
    pub fn is_nullish(&self) -> bool {
        matches!(self, Self::Undefined | Self::Null)
    }

    /// Truthiness: false for undefined, null, `false`, `0`, `NaN` and `""`.
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Undefined | Self::Null => false,
            Self::Bool(b) => *b,
            Self::Number(n) => *n != 0.0 && !n.is_nan(),
            Self::String(s) => !s.is_empty(),
            _ => true,
        }
    }

    /// Try to get the value as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get the value as a number.
    #[inline]
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Try to get the value as a boolean.
    #[inline]
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Try to get the value as a sequence.
    #[inline]
    #[must_use]
    pub fn as_sequence(&self) -> Option<&[Value]> {
        match self {
            Self::Sequence(items) => Some(items),
            _ => None,
        }
    }

    /// Try to get the value as a set.
    #[inline]
    #[must_use]
    pub fn as_set(&self) -> Option<&ValueSet> {
        match self {
            Self::Set(set) => Some(set),
            _ => None,
        }
    }

    /// Fields of a mapping or instance.
    #[must_use]
    pub fn as_fields(&self) -> Option<&Fields> {
        match self {
            Self::Mapping(fields) => Some(fields),
            Self::Instance(instance) => Some(&instance.fields),
            _ => None,
        }
    }

    /// The type tag reported by the `$$type` selector.
    #[must_use]
    pub fn type_tag(&self) -> &'static str {
        match self {
            Self::Undefined => "undefined",
            Self::Bool(_) => "boolean",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::Class(_) => "function",
            Self::Null
            | Self::Sequence(_)
            | Self::Set(_)
            | Self::Mapping(_)
            | Self::Instance(_) => "object",
        }
    }

    /// The runtime class of this value. Null and undefined have none.
    #[must_use]
    pub fn class_of(&self) -> Option<ClassRef> {
        let name = match self {
            Self::Undefined | Self::Null => return None,
            Self::Instance(instance) => return Some(instance.class.clone()),
            Self::Bool(_) => "Boolean",
            Self::Number(_) => "Number",
            Self::String(_) => "String",
            Self::Class(_) => "Function",
            Self::Sequence(_) => "Array",
            Self::Set(_) => "Set",
            Self::Mapping(_) => "Object",
        };
        Some(ClassRef::new(name))
    }

    /// Own field names, in order.
    ///
    /// Mappings and instances list their fields; sequences and strings list
    /// their indexes; everything else has no own fields.
    #[must_use]
    pub fn own_keys(&self) -> Vec<String> {
        match self {
            Self::Mapping(fields) => fields.keys().cloned().collect(),
            Self::Instance(instance) => instance.fields.keys().cloned().collect(),
            Self::Sequence(items) => (0..items.len()).map(|i| i.to_string()).collect(),
            Self::String(s) => (0..s.chars().count()).map(|i| i.to_string()).collect(),
            _ => Vec::new(),
        }
    }

    /// Look up a named field, yielding [`Value::Undefined`] when absent.
    ///
    /// Besides mapping fields, sequences and strings expose `length` and their
    /// indexes, and sets expose `size`.
    #[must_use]
    pub fn field(&self, name: &str) -> Cow<'_, Value> {
        match self {
            Self::Mapping(fields) | Self::Instance(Instance { fields, .. }) => fields
                .get(name)
                .map_or(Cow::Owned(Value::Undefined), Cow::Borrowed),
            Self::Sequence(items) => {
                if name == "length" {
                    return Cow::Owned(Value::from(items.len()));
                }
                parse_index(name)
                    .and_then(|i| items.get(i))
                    .map_or(Cow::Owned(Value::Undefined), Cow::Borrowed)
            }
            Self::String(s) => {
                if name == "length" {
                    return Cow::Owned(Value::from(s.chars().count()));
                }
                Cow::Owned(
                    parse_index(name)
                        .and_then(|i| s.chars().nth(i))
                        .map_or(Value::Undefined, |c| Value::String(c.to_string())),
                )
            }
            Self::Set(set) if name == "size" => Cow::Owned(Value::from(set.len())),
            _ => Cow::Owned(Value::Undefined),
        }
    }

    /// Strict equality used by literal patterns.
    ///
    /// Scalars compare by value (`NaN` never matches, `0` matches `-0`).
    /// Compound literals compare structurally.
    #[must_use]
    pub fn strict_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => a == b,
            _ => self == other,
        }
    }

    /// Set membership identity: scalars by value (`NaN` equals `NaN`),
    /// compound values are never the same member.
    fn same_value_zero(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => a == b || (a.is_nan() && b.is_nan()),
            (Self::Sequence(_) | Self::Set(_) | Self::Mapping(_) | Self::Instance(_), _) => false,
            _ => self == other,
        }
    }
}

/// Canonical decimal index: `"3"` is an index, `"03"` and `"+3"` are not.
fn parse_index(name: &str) -> Option<usize> {
    let index: usize = name.parse().ok()?;
    (index.to_string() == name).then_some(index)
}

// ═══════════════════════════════════════════════════════════════════════════════
// Conversions
// ═══════════════════════════════════════════════════════════════════════════════

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

macro_rules! from_number {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                #[allow(clippy::cast_precision_loss, clippy::cast_lossless)]
                fn from(n: $t) -> Self {
                    Self::Number(n as f64)
                }
            }
        )*
    };
}

from_number!(i8, i16, i32, i64, u8, u16, u32, u64, usize, isize, f32);

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl<V: Into<Value>> From<Vec<V>> for Value {
    fn from(items: Vec<V>) -> Self {
        Self::Sequence(items.into_iter().map(Into::into).collect())
    }
}

impl<V: Into<Value>> From<Option<V>> for Value {
    fn from(value: Option<V>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

impl From<ValueSet> for Value {
    fn from(set: ValueSet) -> Self {
        Self::Set(set)
    }
}

impl From<Instance> for Value {
    fn from(instance: Instance) -> Self {
        Self::Instance(instance)
    }
}

impl From<ClassRef> for Value {
    fn from(class: ClassRef) -> Self {
        Self::Class(class)
    }
}

impl From<Fields> for Value {
    fn from(fields: Fields) -> Self {
        Self::Mapping(fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(x: i32, y: i32) -> Value {
        Value::instance("Point", [("x", x), ("y", y)])
    }

    #[test]
    fn kind_classification() {
        assert_eq!(Value::Null.kind(), Kind::Scalar);
        assert_eq!(Value::from("x").kind(), Kind::Scalar);
        assert_eq!(Value::Class(ClassRef::new("Point")).kind(), Kind::Scalar);
        assert_eq!(Value::from(vec![1, 2]).kind(), Kind::Sequence);
        assert_eq!(Value::set([1, 2]).kind(), Kind::SetLike);
        assert_eq!(Value::mapping([("a", 1)]).kind(), Kind::Mapping);
        assert_eq!(point(1, 2).kind(), Kind::Instance);
    }

    #[test]
    fn strict_eq_scalars() {
        assert!(Value::from(1).strict_eq(&Value::from(1.0)));
        assert!(!Value::from(1).strict_eq(&Value::from("1")));
        assert!(!Value::from(f64::NAN).strict_eq(&Value::from(f64::NAN)));
        assert!(Value::from(0.0).strict_eq(&Value::from(-0.0)));
        assert!(Value::Null.strict_eq(&Value::Null));
        assert!(!Value::Null.strict_eq(&Value::Undefined));
    }

    #[test]
    fn deep_eq_numbers_use_object_is() {
        assert_eq!(Value::from(f64::NAN), Value::from(f64::NAN));
        assert_ne!(Value::from(0.0), Value::from(-0.0));
    }

    #[test]
    fn deep_eq_mappings_ignore_order() {
        let a = Value::mapping([("a", 1), ("b", 2)]);
        let b = Value::mapping([("b", 2), ("a", 1)]);
        assert_eq!(a, b);
        assert_ne!(a, Value::mapping([("a", 1)]));
    }

    #[test]
    fn deep_eq_instance_compares_class() {
        let fields = [("x", 1), ("y", 2)];
        assert_eq!(point(1, 2), point(1, 2));
        assert_ne!(point(1, 2), Value::mapping(fields));
        assert_ne!(point(1, 2), Value::instance("Vector", fields));
    }

    #[test]
    fn set_dedupes_scalars_only() {
        let set: ValueSet = [Value::from(1), Value::from(1), Value::from(f64::NAN), Value::from(f64::NAN)]
            .into_iter()
            .collect();
        assert_eq!(set.len(), 2);

        let set = Value::set([Value::mapping([("a", 1)]), Value::mapping([("a", 1)])]);
        assert_eq!(set.as_set().map(ValueSet::len), Some(2));
    }

    #[test]
    fn set_equality_ignores_order() {
        assert_eq!(Value::set([1, 2, 3]), Value::set([3, 1, 2]));
        assert_ne!(Value::set([1, 2]), Value::set([1, 2, 3]));
    }

    #[test]
    fn set_equality_pairs_compound_members() {
        let twice = Value::set([Value::mapping([("a", 1)]), Value::mapping([("a", 1)])]);
        let mixed = Value::set([Value::mapping([("a", 1)]), Value::mapping([("b", 2)])]);
        assert_ne!(twice, mixed);
        assert_ne!(mixed, twice);
        assert_eq!(mixed, Value::set([Value::mapping([("b", 2)]), Value::mapping([("a", 1)])]));
    }

    #[test]
    fn field_lookup() {
        let m = Value::mapping([("a", 1)]);
        assert_eq!(m.field("a").as_f64(), Some(1.0));
        assert!(m.field("b").is_undefined());

        let seq = Value::from(vec!["x", "y"]);
        assert_eq!(seq.field("1").as_str(), Some("y"));
        assert_eq!(seq.field("length").as_f64(), Some(2.0));
        assert!(seq.field("01").is_undefined());
        assert!(seq.field("5").is_undefined());

        let s = Value::from("héllo");
        assert_eq!(s.field("length").as_f64(), Some(5.0));
        assert_eq!(s.field("1").as_str(), Some("é"));

        assert_eq!(Value::set([1, 2]).field("size").as_f64(), Some(2.0));
        assert!(Value::from(true).field("x").is_undefined());
    }

    #[test]
    fn own_keys_by_kind() {
        assert_eq!(Value::mapping([("b", 1), ("a", 2)]).own_keys(), ["b", "a"]);
        assert_eq!(Value::from(vec![7, 8]).own_keys(), ["0", "1"]);
        assert_eq!(Value::from("ab").own_keys(), ["0", "1"]);
        assert!(Value::set([1]).own_keys().is_empty());
        assert!(Value::from(3).own_keys().is_empty());
    }

    #[test]
    fn type_tags_and_classes() {
        assert_eq!(Value::Undefined.type_tag(), "undefined");
        assert_eq!(Value::Null.type_tag(), "object");
        assert_eq!(Value::from(vec![1]).type_tag(), "object");
        assert_eq!(Value::Class(ClassRef::new("A")).type_tag(), "function");

        assert_eq!(Value::Null.class_of(), None);
        assert_eq!(Value::mapping([("a", 1)]).class_of(), Some(ClassRef::new("Object")));
        assert_eq!(Value::from(vec![1]).class_of(), Some(ClassRef::new("Array")));
        assert_eq!(point(0, 0).class_of(), Some(ClassRef::new("Point")));
    }

    #[test]
    fn truthiness() {
        assert!(!Value::from(0).is_truthy());
        assert!(!Value::from("").is_truthy());
        assert!(!Value::from(f64::NAN).is_truthy());
        assert!(Value::from(vec![0; 0]).is_truthy());
        assert!(Value::from("x").is_truthy());
    }
}
