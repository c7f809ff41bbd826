//! Conformance test fixture runner
//!
//! Loads YAML fixtures and runs them through the registry and the matcher.
//!
//! ```yaml
//! name: partial mappings
//! description: unlisted keys are ignored
//! cases:
//!   - name: extra key
//!     value: {a: 1, b: 2}
//!     pattern: {a: 1}
//!     expect: match
//!   - name: wrong value
//!     value: {a: 1}
//!     pattern: {a: 2}
//!     expect: "at a, expected 2, got 1"
//! ```
//!
//! `expect` is the rendered outcome: `match`, the mismatch or dump message, or
//! `error: ...` when the pattern fails to load.

use serde::Deserialize;
use shapecheck::{matches, Registry, RegistryBuilder, Value};

/// A complete test fixture
#[derive(Debug, Deserialize)]
pub struct Fixture {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub cases: Vec<TestCase>,
}

/// Test case
#[derive(Debug, Deserialize)]
pub struct TestCase {
    pub name: String,
    /// Value document (`$set`, `$class`, `$undefined` allowed).
    #[serde(default)]
    pub value: serde_json::Value,
    /// Pattern document (`$predicate`, `$$only` allowed).
    pub pattern: serde_json::Value,
    pub expect: String,
}

// ═══════════════════════════════════════════════════════════════════════════════
// Runner
// ═══════════════════════════════════════════════════════════════════════════════

/// Result of running a single test case
#[derive(Debug)]
pub struct CaseResult {
    pub case_name: String,
    pub passed: bool,
    pub expected: String,
    pub actual: String,
}

/// The registry fixtures run against: core predicates plus the test domain.
#[must_use]
pub fn registry() -> Registry {
    crate::register(RegistryBuilder::new()).build()
}

impl TestCase {
    /// Load the pattern, match the value, and render the outcome.
    #[must_use]
    pub fn evaluate(&self, registry: &Registry) -> String {
        match registry.load_pattern(&self.pattern) {
            Ok(pattern) => matches(&Value::from(&self.value), &pattern).to_string(),
            Err(e) => format!("error: {e}"),
        }
    }
}

impl Fixture {
    /// Parse a fixture from YAML
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Parse multiple fixtures from a YAML file with `---` separators
    pub fn from_yaml_multi(yaml: &str) -> Result<Vec<Self>, serde_yaml::Error> {
        let mut fixtures = Vec::new();
        for doc in serde_yaml::Deserializer::from_str(yaml) {
            fixtures.push(Self::deserialize(doc)?);
        }
        Ok(fixtures)
    }

    /// Run all test cases and return results
    #[must_use]
    pub fn run(&self) -> Vec<CaseResult> {
        let registry = registry();
        self.cases
            .iter()
            .map(|case| {
                let actual = case.evaluate(&registry);
                CaseResult {
                    case_name: case.name.clone(),
                    passed: actual == case.expect,
                    expected: case.expect.clone(),
                    actual,
                }
            })
            .collect()
    }

    /// Run all test cases and panic on first failure
    pub fn run_and_assert(&self) {
        let results = self.run();
        for result in results {
            assert!(
                result.passed,
                "Fixture '{}' case '{}' failed: expected {:?}, got {:?}",
                self.name, result.case_name, result.expected, result.actual
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const YAML: &str = r#"
name: first
cases:
  - name: equal
    value: 1
    pattern: 1
    expect: match
---
name: second
description: a failing expectation
cases:
  - name: unequal
    value: {a: 1}
    pattern: {a: 2}
    expect: "at a, expected 3, got 1"
"#;

    #[test]
    fn parses_multi_document_files() {
        let fixtures = Fixture::from_yaml_multi(YAML).unwrap();
        assert_eq!(fixtures.len(), 2);
        assert_eq!(fixtures[0].name, "first");
        assert!(fixtures[0].description.is_empty());
        assert_eq!(fixtures[1].cases[0].pattern, serde_json::json!({"a": 2}));
    }

    #[test]
    fn reports_actual_outcome() {
        let fixtures = Fixture::from_yaml_multi(YAML).unwrap();
        assert!(fixtures[0].run().iter().all(|r| r.passed));

        let results = fixtures[1].run();
        assert!(!results[0].passed);
        assert_eq!(results[0].actual, "at a, expected 2, got 1");
    }

    #[test]
    fn load_errors_are_rendered() {
        let case: TestCase = serde_yaml::from_str(
            "{name: bad, value: 1, pattern: {$predicate: nope}, expect: x}",
        )
        .unwrap();
        let actual = case.evaluate(&registry());
        assert!(actual.starts_with("error: unknown predicate \"nope\""), "{actual}");
    }

    #[test]
    fn missing_value_is_null() {
        let case: TestCase =
            serde_yaml::from_str("{name: null value, pattern: null, expect: match}").unwrap();
        assert_eq!(case.evaluate(&registry()), "match");
    }
}
