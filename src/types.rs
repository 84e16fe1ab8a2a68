//! Type descriptors, the constructor registry, and resolved value parsers.
//!
//! Descriptors resolve through an explicit registry: a plain name lookup
//! with a clear "unknown type" error, fatal at startup rather than at
//! argument-parse time.
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::{Error, Result};

/// Descriptor for how a parameter's raw text becomes a validated value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeSpec {
    /// Built-in integer parsing.
    Int,
    /// Raw, unvalidated text. Only legal for no-value actions.
    Str,
    /// A registered restricted type plus construction parameters.
    Named {
        name: String,
        #[serde(default, skip_serializing_if = "Map::is_empty")]
        params: Map<String, Value>,
    },
}

impl TypeSpec {
    /// Named descriptor with JSON construction parameters.
    pub fn named(name: impl Into<String>, params: Map<String, Value>) -> Self {
        TypeSpec::Named {
            name: name.into(),
            params,
        }
    }
}

type ConvertFn = dyn Fn(&str) -> std::result::Result<Value, String> + Send + Sync;

/// A resolved parsing/validation callable.
///
/// `is_raw_text` distinguishes the one unrestricted text parser; spec
/// validation refuses it for value-consuming actions.
#[derive(Clone)]
pub struct TypeParser {
    raw_text: bool,
    convert: Arc<ConvertFn>,
}

impl TypeParser {
    /// Wrap a custom parsing callable. Custom parsers are restricted by
    /// definition.
    pub fn custom(
        convert: impl Fn(&str) -> std::result::Result<Value, String> + Send + Sync + 'static,
    ) -> Self {
        Self {
            raw_text: false,
            convert: Arc::new(convert),
        }
    }

    fn int() -> Self {
        Self {
            raw_text: false,
            convert: Arc::new(|raw| {
                raw.parse::<i64>()
                    .map(Value::from)
                    .map_err(|err| format!("invalid integer: {err}"))
            }),
        }
    }

    fn raw() -> Self {
        Self {
            raw_text: true,
            convert: Arc::new(|raw| Ok(Value::String(raw.to_string()))),
        }
    }

    /// Whether this is the unrestricted text parser.
    pub fn is_raw_text(&self) -> bool {
        self.raw_text
    }

    /// Parse and validate one raw value.
    pub fn parse(&self, raw: &str) -> std::result::Result<Value, String> {
        (self.convert)(raw)
    }
}

impl fmt::Debug for TypeParser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeParser")
            .field("raw_text", &self.raw_text)
            .finish_non_exhaustive()
    }
}

/// Builds a parser from the declared construction parameters.
pub type TypeConstructor = fn(&Map<String, Value>) -> Result<TypeParser>;

/// Registry mapping descriptor names to restricted-type constructors.
pub struct TypeRegistry {
    constructors: HashMap<String, TypeConstructor>,
}

impl TypeRegistry {
    /// Empty registry with no restricted types.
    pub fn empty() -> Self {
        Self {
            constructors: HashMap::new(),
        }
    }

    /// Registry preloaded with the built-in restricted types
    /// (`restricted_str`, `restricted_int`, `domain`).
    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        registry.register("restricted_str", restricted_str);
        registry.register("restricted_int", restricted_int);
        registry.register("domain", domain);
        registry
    }

    pub fn register(&mut self, name: impl Into<String>, constructor: TypeConstructor) {
        self.constructors.insert(name.into(), constructor);
    }

    /// Resolve a descriptor into a parsing callable.
    pub fn resolve(&self, spec: &TypeSpec) -> Result<TypeParser> {
        match spec {
            TypeSpec::Int => Ok(TypeParser::int()),
            TypeSpec::Str => Ok(TypeParser::raw()),
            TypeSpec::Named { name, params } => {
                let constructor = self
                    .constructors
                    .get(name)
                    .ok_or_else(|| Error::Spec(format!("unknown type {name:?}")))?;
                constructor(params)
            }
        }
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

/// Anchored character-class validation with length bounds.
///
/// Params: `allowed_chars` (regex character class, default `a-z0-9._-`),
/// `min_length` (default 1), `max_length` (default 255).
fn restricted_str(params: &Map<String, Value>) -> Result<TypeParser> {
    let allowed = params
        .get("allowed_chars")
        .and_then(Value::as_str)
        .unwrap_or("a-z0-9._-")
        .to_string();
    let min_length = params
        .get("min_length")
        .and_then(Value::as_u64)
        .unwrap_or(1);
    let max_length = params
        .get("max_length")
        .and_then(Value::as_u64)
        .unwrap_or(255);
    if min_length > max_length {
        return Err(Error::Spec(format!(
            "restricted_str: min_length {min_length} exceeds max_length {max_length}"
        )));
    }
    let pattern = format!("^[{allowed}]{{{min_length},{max_length}}}$");
    let regex = Regex::new(&pattern).map_err(|err| {
        Error::Spec(format!(
            "restricted_str: bad allowed_chars {allowed:?}: {err}"
        ))
    })?;
    Ok(TypeParser::custom(move |raw| {
        if regex.is_match(raw) {
            Ok(Value::String(raw.to_string()))
        } else {
            Err(format!(
                "must be {min_length} to {max_length} characters from [{allowed}]"
            ))
        }
    }))
}

/// Integer parsing with optional `minimum`/`maximum` bounds.
fn restricted_int(params: &Map<String, Value>) -> Result<TypeParser> {
    let minimum = params.get("minimum").and_then(Value::as_i64);
    let maximum = params.get("maximum").and_then(Value::as_i64);
    Ok(TypeParser::custom(move |raw| {
        let value: i64 = raw
            .parse()
            .map_err(|err| format!("invalid integer: {err}"))?;
        if minimum.is_some_and(|min| value < min) || maximum.is_some_and(|max| value > max) {
            let min = minimum.map_or("-inf".to_string(), |min| min.to_string());
            let max = maximum.map_or("inf".to_string(), |max| max.to_string());
            return Err(format!("{value} is out of range [{min}, {max}]"));
        }
        Ok(Value::from(value))
    }))
}

/// Hostname validation: lowercases, then checks RFC-1035-shaped labels and
/// the 253-character total bound. Takes no construction parameters.
fn domain(_params: &Map<String, Value>) -> Result<TypeParser> {
    let label = Regex::new(r"^[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?$")
        .map_err(|err| Error::Spec(format!("domain: {err}")))?;
    Ok(TypeParser::custom(move |raw| {
        let name = raw.trim_end_matches('.').to_ascii_lowercase();
        if name.is_empty() || name.len() > 253 {
            return Err(format!("{raw:?} is not a valid domain name"));
        }
        if name.split('.').all(|part| label.is_match(part)) {
            Ok(Value::String(name))
        } else {
            Err(format!("{raw:?} is not a valid domain name"))
        }
    }))
}
