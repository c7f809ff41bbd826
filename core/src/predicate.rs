//! `ValuePredicate` — Caller-supplied checks inside patterns
//!
//! A predicate pattern hands the candidate value to a check and matches when
//! the check returns `true`. A failing predicate reports only
//! `predicate failed`; it has no expected value to show.
//!
//! # Available Predicates
//!
//! - [`FnPredicate`] — Wraps a closure
//! - [`AnyValue`], [`Defined`], [`Present`] — Presence checks
//! - [`TypeIs`] — Shape checks (`string`, `number`, `array`, ...)
//! - [`NonEmpty`] — Has at least one own field, member or character
//! - [`StringMatcher`] — Exact / prefix / suffix / contains / regex on strings
//! - [`OneOf`] — Deep-equal to one of a list of values
//! - [`Range`] — Number within inclusive bounds

use std::borrow::Cow;
use std::fmt::{self, Debug};

use crate::{Kind, PatternError, Value, MAX_PATTERN_LENGTH, MAX_REGEX_PATTERN_LENGTH};

/// Check applied to a candidate value.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` so patterns can be shared between
/// test threads.
///
/// # Example
///
/// ```
/// use shapecheck::{ValuePredicate, Value};
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
/// assert!(Even.test(&Value::from(4)));
/// assert!(!Even.test(&Value::from("4")));
/// ```
#[diagnostic::on_unimplemented(
    message = "`{Self}` does not implement `ValuePredicate`",
    label = "this type cannot be used as a pattern predicate",
    note = "implement `test(&self, &Value) -> bool`, or wrap a closure with `FnPredicate::new`"
)]
pub trait ValuePredicate: Send + Sync + Debug {
    /// Returns `true` if `value` passes the check.
    fn test(&self, value: &Value) -> bool;
}

// ═══════════════════════════════════════════════════════════════════════════════
// Closures
// ═══════════════════════════════════════════════════════════════════════════════

type BoxedCheck = Box<dyn Fn(&Value) -> bool + Send + Sync>;

/// A named closure predicate.
///
/// The name only shows up in `Debug` output.
///
/// ```
/// use shapecheck::{FnPredicate, ValuePredicate, Value};
///
/// let positive = FnPredicate::new("positive", |v| v.as_f64().is_some_and(|n| n > 0.0));
/// assert!(positive.test(&Value::from(3)));
/// assert_eq!(format!("{positive:?}"), "FnPredicate(\"positive\")");
/// ```
pub struct FnPredicate {
    name: String,
    check: BoxedCheck,
}

impl FnPredicate {
    /// Wrap `check` under `name`.
    pub fn new(
        name: impl Into<String>,
        check: impl Fn(&Value) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            check: Box::new(check),
        }
    }

    /// Returns the predicate's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl ValuePredicate for FnPredicate {
    fn test(&self, value: &Value) -> bool {
        (self.check)(value)
    }
}

impl Debug for FnPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("FnPredicate").field(&self.name).finish()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Presence
// ═══════════════════════════════════════════════════════════════════════════════

/// Matches every value, including undefined.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnyValue;

impl ValuePredicate for AnyValue {
    fn test(&self, _value: &Value) -> bool {
        true
    }
}

/// Matches anything except undefined.
#[derive(Debug, Clone, Copy, Default)]
pub struct Defined;

impl ValuePredicate for Defined {
    fn test(&self, value: &Value) -> bool {
        !value.is_undefined()
    }
}

/// Matches anything except null and undefined.
#[derive(Debug, Clone, Copy, Default)]
pub struct Present;

impl ValuePredicate for Present {
    fn test(&self, value: &Value) -> bool {
        !value.is_nullish()
    }
}

/// Has at least one own field, set member or character.
#[derive(Debug, Clone, Copy, Default)]
pub struct NonEmpty;

impl ValuePredicate for NonEmpty {
    fn test(&self, value: &Value) -> bool {
        match value {
            Value::Set(set) => !set.is_empty(),
            Value::String(s) => !s.is_empty(),
            other => !other.own_keys().is_empty(),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Shape
// ═══════════════════════════════════════════════════════════════════════════════

/// Shape check on the candidate value.
///
/// ```
/// use shapecheck::{TypeIs, ValuePredicate, Value};
///
/// assert!(TypeIs::Integer.test(&Value::from(3)));
/// assert!(!TypeIs::Integer.test(&Value::from(3.5)));
/// assert!(TypeIs::Object.test(&Value::mapping([("a", 1)])));
/// assert!(!TypeIs::Object.test(&Value::instance("Point", [("x", 1)])));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "registry", derive(serde::Deserialize))]
#[cfg_attr(feature = "registry", serde(rename_all = "lowercase"))]
pub enum TypeIs {
    /// A string.
    String,
    /// A number (including `NaN`).
    Number,
    /// A finite number with no fractional part.
    Integer,
    /// A boolean.
    Boolean,
    /// An ordered sequence.
    Array,
    /// A set.
    Set,
    /// A bare mapping (not an instance).
    Object,
    /// A class instance.
    Instance,
}

impl ValuePredicate for TypeIs {
    fn test(&self, value: &Value) -> bool {
        match self {
            Self::String => matches!(value, Value::String(_)),
            Self::Number => matches!(value, Value::Number(_)),
            Self::Integer => value
                .as_f64()
                .is_some_and(|n| n.is_finite() && n.fract() == 0.0),
            Self::Boolean => matches!(value, Value::Bool(_)),
            Self::Array => value.kind() == Kind::Sequence,
            Self::Set => value.kind() == Kind::SetLike,
            Self::Object => value.kind() == Kind::Mapping,
            Self::Instance => value.kind() == Kind::Instance,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// StringMatcher
// ═══════════════════════════════════════════════════════════════════════════════

/// Where the configured text must appear in a string value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "registry", derive(serde::Deserialize))]
#[cfg_attr(feature = "registry", serde(rename_all = "snake_case"))]
pub enum StringMatchType {
    /// The whole string.
    Exact,
    /// At the start.
    Prefix,
    /// At the end.
    Suffix,
    /// Anywhere.
    Contains,
    /// The text is a regular expression (RE2 semantics, linear time).
    Regex,
}

/// Text predicate over string values. Non-string values never match.
///
/// Case-insensitive matching folds both sides with Unicode lowercasing, so
/// `"ÉTÉ"` matches `"été"`.
///
/// ```
/// use shapecheck::{StringMatchType, StringMatcher, ValuePredicate, Value};
///
/// let m = StringMatcher::new(StringMatchType::Prefix, "/api/", true).unwrap();
/// assert!(m.test(&Value::from("/API/users")));
///
/// let m = StringMatcher::regex(r"^user-\d+$").unwrap();
/// assert!(m.test(&Value::from("user-123")));
/// assert!(!m.test(&Value::from("user-abc")));
/// assert!(!m.test(&Value::from(123)));
/// ```
#[derive(Debug, Clone)]
pub struct StringMatcher {
    rule: TextRule,
    ignore_case: bool,
}

#[derive(Debug, Clone)]
enum TextRule {
    Fixed { at: StringMatchType, text: String },
    Regex(regex::Regex),
}

impl StringMatcher {
    /// Build a matcher for `text`, lowercasing it once when `ignore_case` is set.
    ///
    /// # Errors
    ///
    /// - [`PatternError::PatternTooLong`] past [`MAX_PATTERN_LENGTH`], or
    ///   [`MAX_REGEX_PATTERN_LENGTH`] for regexes
    /// - [`PatternError::InvalidPattern`] if the regex does not compile
    pub fn new(at: StringMatchType, text: &str, ignore_case: bool) -> Result<Self, PatternError> {
        let max = match at {
            StringMatchType::Regex => MAX_REGEX_PATTERN_LENGTH,
            _ => MAX_PATTERN_LENGTH,
        };
        if text.len() > max {
            return Err(PatternError::PatternTooLong { len: text.len(), max });
        }
        let rule = match at {
            StringMatchType::Regex => regex::RegexBuilder::new(text)
                .case_insensitive(ignore_case)
                .build()
                .map(TextRule::Regex)
                .map_err(|e| PatternError::InvalidPattern {
                    pattern: text.to_owned(),
                    reason: e.to_string(),
                })?,
            _ if ignore_case => TextRule::Fixed { at, text: text.to_lowercase() },
            _ => TextRule::Fixed { at, text: text.to_owned() },
        };
        Ok(Self { rule, ignore_case })
    }

    /// Case-sensitive regex matcher.
    ///
    /// # Errors
    ///
    /// Same as [`StringMatcher::new`].
    pub fn regex(pattern: &str) -> Result<Self, PatternError> {
        Self::new(StringMatchType::Regex, pattern, false)
    }
}

impl ValuePredicate for StringMatcher {
    fn test(&self, value: &Value) -> bool {
        let Some(input) = value.as_str() else {
            return false;
        };
        let (at, text) = match &self.rule {
            TextRule::Regex(re) => return re.is_match(input),
            TextRule::Fixed { at, text } => (*at, text.as_str()),
        };
        let folded: Cow<'_, str> = if self.ignore_case {
            Cow::Owned(input.to_lowercase())
        } else {
            Cow::Borrowed(input)
        };
        match at {
            StringMatchType::Exact => folded == text,
            StringMatchType::Prefix => folded.starts_with(text),
            StringMatchType::Suffix => folded.ends_with(text),
            StringMatchType::Contains | StringMatchType::Regex => folded.contains(text),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Membership and bounds
// ═══════════════════════════════════════════════════════════════════════════════

/// Deep-equal to one of the listed values.
#[derive(Debug, Clone)]
pub struct OneOf {
    choices: Vec<Value>,
}

impl OneOf {
    /// Create a membership check over `choices`.
    pub fn new(choices: impl IntoIterator<Item = Value>) -> Self {
        Self {
            choices: choices.into_iter().collect(),
        }
    }
}

impl ValuePredicate for OneOf {
    fn test(&self, value: &Value) -> bool {
        self.choices.iter().any(|c| c == value)
    }
}

/// Number within inclusive bounds. `NaN` and non-numbers never match.
///
/// ```
/// use shapecheck::{Range, ValuePredicate, Value};
///
/// let percent = Range::new(Some(0.0), Some(100.0));
/// assert!(percent.test(&Value::from(100)));
/// assert!(!percent.test(&Value::from(100.5)));
/// assert!(Range::new(None, Some(0.0)).test(&Value::from(-7)));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Range {
    min: Option<f64>,
    max: Option<f64>,
}

impl Range {
    /// Create a range; `None` leaves that side open.
    #[must_use]
    pub fn new(min: Option<f64>, max: Option<f64>) -> Self {
        Self { min, max }
    }
}

impl ValuePredicate for Range {
    fn test(&self, value: &Value) -> bool {
        let Some(n) = value.as_f64() else {
            return false;
        };
        !n.is_nan() && self.min.is_none_or(|min| n >= min) && self.max.is_none_or(|max| n <= max)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// IntoPredicate impls (feature = "registry")
// ═══════════════════════════════════════════════════════════════════════════════

#[cfg(feature = "registry")]
pub(crate) mod into_predicate {
    use std::sync::Arc;

    use serde::Deserialize;

    use super::{
        AnyValue, Defined, NonEmpty, OneOf, Present, Range, StringMatchType, StringMatcher, TypeIs,
    };
    use crate::registry::{IntoPredicate, UnitConfig};
    use crate::{PatternError, Value, ValuePredicate};

    macro_rules! unit_predicate {
        ($($ty:ident),*) => {$(
            impl IntoPredicate for $ty {
                type Config = UnitConfig;

                fn from_config(_: UnitConfig) -> Result<Arc<dyn ValuePredicate>, PatternError> {
                    Ok(Arc::new($ty))
                }
            }
        )*};
    }

    unit_predicate!(AnyValue, Defined, Present, NonEmpty);

    // ── TypeIs ───────────────────────────────────────────────────────────────

    impl IntoPredicate for TypeIs {
        type Config = TypeIs;

        fn from_config(config: TypeIs) -> Result<Arc<dyn ValuePredicate>, PatternError> {
            Ok(Arc::new(config))
        }
    }

    // ── StringMatcher ────────────────────────────────────────────────────────

    /// Configuration for a [`StringMatcher`] predicate.
    ///
    /// JSON example:
    /// ```json
    /// { "value": "user-", "match_type": "prefix", "ignore_case": true }
    /// ```
    #[derive(Debug, Clone, Deserialize)]
    #[serde(deny_unknown_fields)]
    pub struct StringMatchConfig {
        /// Text, or regex source for `regex`.
        pub value: String,
        /// Where `value` must appear.
        pub match_type: StringMatchType,
        /// Unicode case-insensitive matching (default: false).
        #[serde(default)]
        pub ignore_case: bool,
    }

    impl IntoPredicate for StringMatcher {
        type Config = StringMatchConfig;

        fn from_config(config: Self::Config) -> Result<Arc<dyn ValuePredicate>, PatternError> {
            let matcher = StringMatcher::new(config.match_type, &config.value, config.ignore_case)?;
            Ok(Arc::new(matcher))
        }
    }

    // ── OneOf / Range ────────────────────────────────────────────────────────

    impl IntoPredicate for OneOf {
        /// Choices are documents, so `{"$set": [...]}` and friends work here too.
        type Config = Vec<serde_json::Value>;

        fn from_config(config: Self::Config) -> Result<Arc<dyn ValuePredicate>, PatternError> {
            if config.is_empty() {
                return Err(PatternError::InvalidConfig {
                    reason: "one_of needs at least one choice".to_owned(),
                });
            }
            Ok(Arc::new(OneOf::new(config.iter().map(Value::from))))
        }
    }

    /// Configuration for a [`Range`] predicate. Both bounds are inclusive.
    #[derive(Debug, Clone, Copy, Default, Deserialize)]
    #[serde(deny_unknown_fields)]
    pub struct RangeConfig {
        /// Lower bound, if any.
        #[serde(default)]
        pub min: Option<f64>,
        /// Upper bound, if any.
        #[serde(default)]
        pub max: Option<f64>,
    }

    impl IntoPredicate for Range {
        type Config = RangeConfig;

        fn from_config(config: Self::Config) -> Result<Arc<dyn ValuePredicate>, PatternError> {
            if let (Some(min), Some(max)) = (config.min, config.max) {
                if min > max {
                    return Err(PatternError::InvalidConfig {
                        reason: format!("range min {min} is greater than max {max}"),
                    });
                }
            }
            Ok(Arc::new(Range::new(config.min, config.max)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fn_predicate_calls_closure() {
        let p = FnPredicate::new("even", |v| v.as_f64().is_some_and(|n| n % 2.0 == 0.0));
        assert!(p.test(&Value::from(2)));
        assert!(!p.test(&Value::from(3)));
        assert_eq!(p.name(), "even");
    }

    #[test]
    fn presence_checks() {
        assert!(AnyValue.test(&Value::Undefined));
        assert!(!Defined.test(&Value::Undefined));
        assert!(Defined.test(&Value::Null));
        assert!(!Present.test(&Value::Null));
        assert!(Present.test(&Value::from(0)));
    }

    #[test]
    fn non_empty() {
        assert!(NonEmpty.test(&Value::from("x")));
        assert!(!NonEmpty.test(&Value::from("")));
        assert!(NonEmpty.test(&Value::set([1])));
        assert!(!NonEmpty.test(&Value::set(Vec::<i32>::new())));
        assert!(NonEmpty.test(&Value::mapping([("a", 1)])));
        assert!(!NonEmpty.test(&Value::from(Vec::<i32>::new())));
        assert!(!NonEmpty.test(&Value::from(5)));
    }

    #[test]
    fn type_checks() {
        assert!(TypeIs::String.test(&Value::from("a")));
        assert!(TypeIs::Number.test(&Value::from(f64::NAN)));
        assert!(!TypeIs::Integer.test(&Value::from(f64::INFINITY)));
        assert!(TypeIs::Boolean.test(&Value::from(false)));
        assert!(TypeIs::Array.test(&Value::from(vec![1])));
        assert!(TypeIs::Set.test(&Value::set([1])));
        assert!(TypeIs::Instance.test(&Value::instance("P", [("x", 1)])));
        assert!(!TypeIs::Array.test(&Value::set([1])));
    }

    fn text(at: StringMatchType, needle: &str, ignore_case: bool) -> StringMatcher {
        StringMatcher::new(at, needle, ignore_case).unwrap()
    }

    #[test]
    fn string_matcher_case_insensitive() {
        assert!(text(StringMatchType::Exact, "Bash", true).test(&Value::from("bash")));
        assert!(!text(StringMatchType::Exact, "Bash", false).test(&Value::from("bash")));
        assert!(text(StringMatchType::Suffix, ".JSON", true).test(&Value::from("data.json")));
        assert!(text(StringMatchType::Contains, "ERR", true).test(&Value::from("an error")));
        assert!(!text(StringMatchType::Suffix, "long suffix", false).test(&Value::from("x")));
    }

    #[test]
    fn string_matcher_folds_unicode() {
        assert!(text(StringMatchType::Exact, "ÉTÉ", true).test(&Value::from("été")));
        assert!(text(StringMatchType::Contains, "Ω", true).test(&Value::from("ωmega")));
        assert!(!text(StringMatchType::Exact, "ÉTÉ", false).test(&Value::from("été")));
    }

    #[test]
    fn invalid_regex_is_error() {
        let err = StringMatcher::regex("[bad").unwrap_err();
        assert!(matches!(err, PatternError::InvalidPattern { ref pattern, .. } if pattern == "[bad"));
    }

    #[test]
    fn string_matcher_length_limits() {
        let long = "a".repeat(MAX_REGEX_PATTERN_LENGTH + 1);
        assert!(StringMatcher::regex(&long).is_err());
        assert!(StringMatcher::new(StringMatchType::Contains, &long, false).is_ok());
    }

    #[test]
    fn one_of_uses_deep_equality() {
        let p = OneOf::new([Value::from("a"), Value::mapping([("k", 1)])]);
        assert!(p.test(&Value::mapping([("k", 1)])));
        assert!(p.test(&Value::from("a")));
        assert!(!p.test(&Value::from("b")));
    }

    #[test]
    fn range_rejects_nan_and_non_numbers() {
        let r = Range::new(Some(1.0), None);
        assert!(r.test(&Value::from(1)));
        assert!(!r.test(&Value::from(0.5)));
        assert!(!r.test(&Value::from(f64::NAN)));
        assert!(!r.test(&Value::from("2")));
    }
}
