//! JSON/YAML documents → values and patterns.
//!
//! Documents are plain JSON (YAML goes through the same `serde_json::Value`
//! tree). A few reserved object shapes cover what JSON cannot say directly:
//!
//! | Document | Value | Pattern |
//! |----------|-------|---------|
//! | `{"$set": [...]}` | set | literal set |
//! | `{"$class": "Point", "x": 1}` | instance of `Point` | literal instance |
//! | `{"$undefined": true}` | undefined | literal undefined |
//! | `{"$predicate": "name", "config": ...}` | — | registered predicate |
//! | `{"class": "Point"}` | — | `class` entry naming a class descriptor |
//!
//! Objects keep their key order (`serde_json` is built with `preserve_order`),
//! which matters for mapping patterns: the first failing field is reported.

use serde_json::{Map, Value as Json};

use crate::{ClassRef, MappingPattern, Pattern, PatternError, Value, MAX_DEPTH};

/// Object key marking a set: `{"$set": [...]}`.
pub const SET_KEY: &str = "$set";

/// Object key naming an instance's class: `{"$class": "Point", ...}`.
pub const CLASS_KEY: &str = "$class";

/// Object key marking undefined: `{"$undefined": true}`.
pub const UNDEFINED_KEY: &str = "$undefined";

/// Object key referencing a registered predicate.
pub const PREDICATE_KEY: &str = "$predicate";

/// Sibling of [`PREDICATE_KEY`] carrying the predicate's configuration.
pub const PREDICATE_CONFIG_KEY: &str = "config";

impl From<&Json> for Value {
    fn from(json: &Json) -> Self {
        match json {
            Json::Null => Value::Null,
            Json::Bool(b) => Value::Bool(*b),
            Json::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            Json::String(s) => Value::String(s.clone()),
            Json::Array(items) => Value::Sequence(items.iter().map(Value::from).collect()),
            Json::Object(map) => object_value(map),
        }
    }
}

impl From<Json> for Value {
    fn from(json: Json) -> Self {
        Value::from(&json)
    }
}

fn object_value(map: &Map<String, Json>) -> Value {
    if map.len() == 1 {
        if map.contains_key(UNDEFINED_KEY) {
            return Value::Undefined;
        }
        if let Some(Json::Array(items)) = map.get(SET_KEY) {
            return Value::Set(items.iter().map(Value::from).collect());
        }
    }
    let fields = map
        .iter()
        .filter(|(k, _)| k.as_str() != CLASS_KEY)
        .map(|(k, v)| (k.clone(), Value::from(v)));
    match map.get(CLASS_KEY) {
        Some(Json::String(class)) => Value::instance(class, fields),
        _ => Value::mapping(fields),
    }
}

/// Resolves a `{"$predicate": name, "config": ...}` reference.
pub(crate) type PredicateResolver<'a> = dyn Fn(&str, &Json) -> Result<Pattern, PatternError> + 'a;

/// Build a pattern from a document, resolving predicate references through
/// `resolve`.
///
/// Nesting past [`MAX_DEPTH`] is rejected while building, including the
/// levels a dotted key expands to.
pub(crate) fn pattern_from_json(
    json: &Json,
    resolve: &PredicateResolver<'_>,
) -> Result<Pattern, PatternError> {
    build(json, 1, resolve)
}

fn build(json: &Json, level: usize, resolve: &PredicateResolver<'_>) -> Result<Pattern, PatternError> {
    if level > MAX_DEPTH {
        return Err(PatternError::DepthExceeded {
            depth: level,
            max: MAX_DEPTH,
        });
    }
    match json {
        Json::Array(items) => items
            .iter()
            .map(|item| build(item, level + 1, resolve))
            .collect::<Result<Vec<_>, _>>()
            .map(Pattern::Sequence),
        Json::Object(map) => object_pattern(map, level, resolve),
        scalar => Ok(Pattern::Literal(Value::from(scalar))),
    }
}

fn object_pattern(
    map: &Map<String, Json>,
    level: usize,
    resolve: &PredicateResolver<'_>,
) -> Result<Pattern, PatternError> {
    if let Some(name) = map.get(PREDICATE_KEY) {
        let Json::String(name) = name else {
            return Err(PatternError::InvalidConfig {
                reason: format!("\"{PREDICATE_KEY}\" must name a predicate, got {name}"),
            });
        };
        let config = map
            .get(PREDICATE_CONFIG_KEY)
            .cloned()
            .unwrap_or_else(|| Json::Object(Map::new()));
        return resolve(name, &config);
    }

    let reserved = map.len() == 1 && (map.contains_key(SET_KEY) || map.contains_key(UNDEFINED_KEY));
    if reserved || map.contains_key(CLASS_KEY) {
        return Ok(Pattern::Literal(object_value(map)));
    }

    let mut entries = Vec::with_capacity(map.len());
    for (key, json) in map {
        // each dotted segment adds a mapping level
        let value_level = level + key.split('.').count();
        if value_level > MAX_DEPTH {
            return Err(PatternError::DepthExceeded {
                depth: value_level,
                max: MAX_DEPTH,
            });
        }
        let names_class = key.rsplit('.').next() == Some("class");
        let pattern = match json {
            Json::String(class) if names_class => {
                Pattern::Literal(Value::Class(ClassRef::new(class.as_str())))
            }
            other => build(other, value_level, resolve)?,
        };
        entries.push((key.as_str(), pattern));
    }
    Ok(Pattern::Mapping(MappingPattern::new(entries)))
}

impl TryFrom<&Json> for Pattern {
    type Error = PatternError;

    /// Convert a document with no predicate references.
    fn try_from(json: &Json) -> Result<Self, Self::Error> {
        pattern_from_json(json, &|name, _| {
            Err(PatternError::UnknownPredicate {
                name: name.to_owned(),
                available: Vec::new(),
            })
        })
    }
}

impl TryFrom<Json> for Pattern {
    type Error = PatternError;

    fn try_from(json: Json) -> Result<Self, Self::Error> {
        Pattern::try_from(&json)
    }
}
