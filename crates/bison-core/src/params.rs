//! Parameter normalization
//!
//! The host hands over loosely typed values: IDs arrive as numbers, numeric
//! strings, comma separated text or arrays; collections arrive as objects
//! or JSON text. Everything here turns those into canonical values before a
//! payload is built.

use crate::error::{BisonError, Result};
use crate::workflow::{ExecutionEvent, ExecutionObserver};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

static EMAIL_PATTERN: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").ok());

/// Read access to node parameters, evaluated per input item
pub trait ParameterSource: Send + Sync {
    fn parameter(&self, name: &str, item_index: usize) -> Option<&Value>;
}

/// Node-level parameters with optional per-item overrides
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StaticParameters {
    #[serde(default)]
    pub node: Map<String, Value>,
    #[serde(default)]
    pub items: Vec<Map<String, Value>>,
}

impl StaticParameters {
    pub fn new(node: Map<String, Value>) -> Self {
        Self {
            node,
            items: Vec::new(),
        }
    }

    /// Build from a JSON object; anything else yields empty parameters
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(node) => Self::new(node),
            _ => Self::default(),
        }
    }

    pub fn with_item(mut self, overrides: Value) -> Self {
        let overrides = match overrides {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        self.items.push(overrides);
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        self.node.insert(name.into(), value);
    }

    /// A node always runs for at least one item
    pub fn item_count(&self) -> usize {
        self.items.len().max(1)
    }
}

impl ParameterSource for StaticParameters {
    fn parameter(&self, name: &str, item_index: usize) -> Option<&Value> {
        self.items
            .get(item_index)
            .and_then(|item| item.get(name))
            .or_else(|| self.node.get(name))
    }
}

/// Canonical list of positive-or-zero integer IDs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdList(Vec<i64>);

impl IdList {
    pub fn new(ids: Vec<i64>) -> Self {
        Self(ids)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn as_slice(&self) -> &[i64] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<i64> {
        self.0
    }

    pub fn to_value(&self) -> Value {
        Value::from(self.0.clone())
    }
}

impl From<Vec<i64>> for IdList {
    fn from(ids: Vec<i64>) -> Self {
        Self(ids)
    }
}

/// The three shapes an ID list parameter can take
#[derive(Debug, Clone, PartialEq)]
pub enum IdListInput {
    Text(String),
    Many(Vec<Value>),
    Single(Value),
}

/// IDs that parsed plus the raw tokens that did not
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedIds {
    pub ids: IdList,
    pub rejected: Vec<String>,
}

impl IdListInput {
    /// Null and objects carry no IDs
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(text) => Some(IdListInput::Text(text.clone())),
            Value::Array(items) => Some(IdListInput::Many(items.clone())),
            Value::Number(_) | Value::Bool(_) => Some(IdListInput::Single(value.clone())),
            Value::Null | Value::Object(_) => None,
        }
    }

    pub fn normalize(&self) -> NormalizedIds {
        let mut out = NormalizedIds::default();
        let mut ids = Vec::new();

        let mut accept = |value: &Value| match value {
            Value::String(text) => {
                for token in text.split(',').map(str::trim).filter(|t| !t.is_empty()) {
                    match parse_id_token(token) {
                        Some(id) => ids.push(id),
                        None => out.rejected.push(token.to_string()),
                    }
                }
            }
            Value::Number(number) => match number_to_id(number) {
                Some(id) => ids.push(id),
                None => out.rejected.push(number.to_string()),
            },
            Value::Null => {}
            other => out.rejected.push(other.to_string()),
        };

        match self {
            IdListInput::Text(text) => accept(&Value::String(text.clone())),
            IdListInput::Many(items) => items.iter().for_each(&mut accept),
            IdListInput::Single(value) => accept(value),
        }

        out.ids = IdList(ids);
        out
    }
}

fn number_to_id(number: &serde_json::Number) -> Option<i64> {
    number
        .as_i64()
        .or_else(|| number.as_f64().and_then(integral_f64))
        .filter(|id| *id >= 0)
}

fn integral_f64(value: f64) -> Option<i64> {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        Some(value as i64)
    } else {
        None
    }
}

/// `"42"` and `"42.0"` are IDs; `"abc"`, `"4.5"` and `"-3"` are not
pub fn parse_id_token(token: &str) -> Option<i64> {
    let token = token.trim();
    if token.is_empty() {
        return None;
    }
    token
        .parse::<i64>()
        .ok()
        .or_else(|| token.parse::<f64>().ok().and_then(integral_f64))
        .filter(|id| *id >= 0)
}

/// A single URL path segment: ASCII letters, digits, `_` and `-` only
pub fn is_path_segment(candidate: &str) -> bool {
    !candidate.is_empty()
        && candidate
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Identifier safe to splice into a request path; `7.0` becomes `7`
pub fn path_id(raw: &str) -> Option<String> {
    if is_path_segment(raw) {
        return Some(raw.to_string());
    }
    parse_id_token(raw).map(|id| id.to_string())
}

/// Trimmed, non-empty string form of a scalar
pub fn value_as_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Like [`value_as_string`] but keeps surrounding whitespace of free text
pub fn value_as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::String(_) => None,
        other => value_as_string(other),
    }
}

pub fn value_as_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_f64().map(|f| f != 0.0),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => Some(true),
            "false" | "0" | "no" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// `Ok(None)` for absent or blank values, error for non-numeric ones
pub fn value_as_u64(name: &str, value: &Value) -> Result<Option<u64>> {
    let parsed = match value {
        Value::Null => return Ok(None),
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).and_then(integral_f64).map(|i| i as u64)),
        Value::String(s) if s.trim().is_empty() => return Ok(None),
        Value::String(s) => parse_id_token(s).map(|i| i as u64),
        _ => None,
    };

    parsed.map(Some).ok_or_else(|| {
        BisonError::validation(format!("'{}' must be a non-negative whole number", name))
    })
}

pub fn is_email(candidate: &str) -> bool {
    EMAIL_PATTERN
        .as_ref()
        .map(|re| re.is_match(candidate))
        .unwrap_or_else(|| candidate.contains('@'))
}

pub fn invalid_identifier(what: &str, raw: &str) -> BisonError {
    BisonError::validation(format!("{} '{}' is not a valid identifier", what, raw))
}

/// Typed view of the parameters for one item
pub struct Params<'a> {
    source: &'a dyn ParameterSource,
    observer: &'a dyn ExecutionObserver,
    item_index: usize,
}

impl<'a> Params<'a> {
    pub fn new(
        source: &'a dyn ParameterSource,
        observer: &'a dyn ExecutionObserver,
        item_index: usize,
    ) -> Self {
        Self {
            source,
            observer,
            item_index,
        }
    }

    pub fn item_index(&self) -> usize {
        self.item_index
    }

    pub fn raw(&self, name: &str) -> Option<&'a Value> {
        self.source.parameter(name, self.item_index)
    }

    pub fn optional_string(&self, name: &str) -> Option<String> {
        self.raw(name).and_then(value_as_string)
    }

    pub fn optional_text(&self, name: &str) -> Option<String> {
        self.raw(name).and_then(value_as_text)
    }

    pub fn string_or(&self, name: &str, default: &str) -> String {
        self.optional_string(name)
            .unwrap_or_else(|| default.to_string())
    }

    pub fn required_string(&self, name: &str, what: &str) -> Result<String> {
        self.optional_string(name)
            .ok_or_else(|| BisonError::validation(format!("{} is required", what)))
    }

    pub fn required_text(&self, name: &str, what: &str) -> Result<String> {
        self.optional_text(name)
            .ok_or_else(|| BisonError::validation(format!("{} is required", what)))
    }

    pub fn required_email(&self, name: &str, what: &str) -> Result<String> {
        let email = self.required_string(name, what)?;
        if !is_email(&email) {
            return Err(BisonError::validation(format!(
                "{} '{}' is not a valid email address",
                what, email
            )));
        }
        Ok(email)
    }

    /// Path identifier, see [`path_id`]
    pub fn required_id(&self, name: &str, what: &str) -> Result<String> {
        let raw = self.required_string(name, what)?;
        path_id(&raw).ok_or_else(|| invalid_identifier(what, &raw))
    }

    /// Numeric ID sent in a body
    pub fn required_numeric_id(&self, name: &str, what: &str) -> Result<i64> {
        let raw = self.required_string(name, what)?;
        parse_id_token(&raw).ok_or_else(|| {
            BisonError::validation(format!("{} must be numeric, got '{}'", what, raw))
        })
    }

    pub fn bool_or(&self, name: &str, default: bool) -> bool {
        self.raw(name).and_then(value_as_bool).unwrap_or(default)
    }

    pub fn u64_or(&self, name: &str, default: u64) -> Result<u64> {
        match self.raw(name) {
            Some(value) => Ok(value_as_u64(name, value)?.unwrap_or(default)),
            None => Ok(default),
        }
    }

    pub fn optional_u64(&self, name: &str) -> Result<Option<u64>> {
        match self.raw(name) {
            Some(value) => value_as_u64(name, value),
            None => Ok(None),
        }
    }

    /// Canonical ID list; dropped tokens are reported, not fatal
    pub fn id_list(&self, name: &str) -> IdList {
        self.ids_from(name, self.raw(name))
    }

    /// Normalize an ID list held somewhere other than a top-level parameter
    pub fn ids_from(&self, name: &str, value: Option<&Value>) -> IdList {
        let normalized = match value.and_then(IdListInput::from_value) {
            Some(input) => input.normalize(),
            None => return IdList::default(),
        };

        if !normalized.rejected.is_empty() {
            self.observer.record(ExecutionEvent::IdTokensDropped {
                item_index: self.item_index,
                parameter: name.to_string(),
                tokens: normalized.rejected,
            });
        }
        normalized.ids
    }

    pub fn required_id_list(&self, name: &str, what: &str) -> Result<IdList> {
        let ids = self.id_list(name);
        if ids.is_empty() {
            return Err(BisonError::validation(format!(
                "At least one valid {} is required",
                what
            )));
        }
        Ok(ids)
    }

    /// Comma separated text or an array of scalars
    pub fn string_list(&self, name: &str) -> Vec<String> {
        match self.raw(name) {
            Some(Value::String(text)) => text
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
            Some(Value::Array(items)) => items.iter().filter_map(value_as_string).collect(),
            Some(other) => value_as_string(other).into_iter().collect(),
            None => Vec::new(),
        }
    }

    /// Collection given as an object or as JSON text
    pub fn collection(&self, name: &str) -> Result<Map<String, Value>> {
        match self.raw(name) {
            None | Some(Value::Null) => Ok(Map::new()),
            Some(Value::Object(map)) => Ok(map.clone()),
            Some(Value::String(text)) if text.trim().is_empty() => Ok(Map::new()),
            Some(Value::String(text)) => match serde_json::from_str::<Value>(text) {
                Ok(Value::Object(map)) => Ok(map),
                Ok(_) => Err(BisonError::validation(format!("'{}' must be a JSON object", name))),
                Err(e) => Err(BisonError::validation(format!(
                    "'{}' is not valid JSON: {}",
                    name, e
                ))),
            },
            Some(_) => Err(BisonError::validation(format!("'{}' must be an object", name))),
        }
    }

    /// Entries of a fixed collection such as `{"values": [{...}, {...}]}`
    pub fn fixed_collection(&self, name: &str, key: &str) -> Result<Vec<Map<String, Value>>> {
        let collection = self.collection(name)?;
        Ok(match collection.get(key) {
            Some(Value::Array(entries)) => entries
                .iter()
                .filter_map(|entry| entry.as_object().cloned())
                .collect(),
            Some(Value::Object(entry)) => vec![entry.clone()],
            _ => Vec::new(),
        })
    }
}
