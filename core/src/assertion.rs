//! Test-framework integration: pass/fail plus a lazily rendered message.

use crate::{matches, MatchOutcome, Pattern, Value};

/// Message of a passing verdict. Negated assertions are not supported.
pub const NEGATION_UNSUPPORTED: &str = "assert_has does not support negation";

/// Outcome of an assertion, in the shape custom test assertions expect.
///
/// The message is only rendered when asked for.
#[derive(Debug, Clone, PartialEq)]
pub struct Verdict {
    outcome: MatchOutcome,
}

impl Verdict {
    /// Returns `true` if the value matched.
    #[must_use]
    pub fn pass(&self) -> bool {
        self.outcome.is_match()
    }

    /// The underlying match outcome.
    #[must_use]
    pub fn outcome(&self) -> &MatchOutcome {
        &self.outcome
    }

    /// Failure message, or [`NEGATION_UNSUPPORTED`] when the assertion passed.
    #[must_use]
    pub fn message(&self) -> String {
        match &self.outcome {
            MatchOutcome::Match => NEGATION_UNSUPPORTED.to_owned(),
            other => other.to_string(),
        }
    }
}

/// Run the structural match and wrap it as a [`Verdict`].
///
/// ```
/// use shapecheck::{to_have, Pattern, Value};
///
/// let verdict = to_have(&Value::mapping([("a", 1)]), &Pattern::mapping([("a", 2)]));
/// assert!(!verdict.pass());
/// assert_eq!(verdict.message(), "at a, expected 2, got 1");
/// ```
#[must_use]
pub fn to_have(received: &Value, pattern: &Pattern) -> Verdict {
    Verdict {
        outcome: matches(received, pattern),
    }
}

/// Assert that a value matches a pattern, panicking with the first mismatch.
///
/// Both arguments go through `Into`, so anything convertible to
/// [`Value`](crate::Value) / [`Pattern`](crate::Pattern) works.
///
/// ```
/// use shapecheck::{assert_has, exactly, Pattern, Value};
///
/// let user = Value::mapping([("name", "alice"), ("role", "admin")]);
/// assert_has!(user.clone(), Pattern::mapping([("role", "admin")]));
/// assert_has!(user, exactly(Pattern::mapping([("name", "alice"), ("role", "admin")])));
/// ```
///
/// ```should_panic
/// use shapecheck::{assert_has, Value};
///
/// assert_has!(Value::from(vec![1, 2]), vec![1, 2, 3]);
/// ```
#[macro_export]
macro_rules! assert_has {
    ($received:expr, $pattern:expr $(,)?) => {{
        let received: $crate::Value = ::core::convert::Into::into($received);
        let pattern: $crate::Pattern = ::core::convert::Into::into($pattern);
        let verdict = $crate::to_have(&received, &pattern);
        if !verdict.pass() {
            ::core::panic!("assertion failed: {}", verdict.message());
        }
    }};
}
