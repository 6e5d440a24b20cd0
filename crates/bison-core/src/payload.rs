//! Request payload construction
//!
//! Friendly parameter names map to the snake_case wire names through static
//! field tables. Optional values are omitted when absent or blank; fields the
//! API expects as explicit `null` go through [`Payload::insert_nullable`].

use crate::error::Result;
use crate::params::{value_as_string, value_as_text, value_as_u64, IdList, Params};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Trimmed string
    Text,
    /// String kept verbatim (message bodies)
    Body,
    Number,
}

/// One friendly-name to wire-name mapping
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub param: &'static str,
    pub wire: &'static str,
    pub kind: FieldKind,
}

const fn text(param: &'static str, wire: &'static str) -> FieldSpec {
    FieldSpec { param, wire, kind: FieldKind::Text }
}

const fn body(param: &'static str, wire: &'static str) -> FieldSpec {
    FieldSpec { param, wire, kind: FieldKind::Body }
}

const fn number(param: &'static str, wire: &'static str) -> FieldSpec {
    FieldSpec { param, wire, kind: FieldKind::Number }
}

pub const LEAD_FIELDS: &[FieldSpec] = &[
    text("firstName", "first_name"),
    text("lastName", "last_name"),
    text("company", "company"),
    text("phone", "phone"),
    text("website", "website"),
];

/// Optional campaign fields shared by create and update
pub const CAMPAIGN_FIELDS: &[FieldSpec] = &[
    text("fromName", "from_name"),
    text("replyTo", "reply_to"),
];

pub const CAMPAIGN_UPDATE_FIELDS: &[FieldSpec] = &[
    text("name", "name"),
    text("subject", "subject"),
    body("emailContent", "html_content"),
    text("fromName", "from_name"),
    text("replyTo", "reply_to"),
];

pub const EMAIL_ACCOUNT_UPDATE_FIELDS: &[FieldSpec] = &[
    text("name", "name"),
    text("smtpHost", "smtp_host"),
    number("smtpPort", "smtp_port"),
    text("smtpUsername", "smtp_username"),
    text("smtpPassword", "smtp_password"),
    text("smtpSecurity", "smtp_security"),
    number("dailySendLimit", "daily_send_limit"),
];

pub const WEBHOOK_FIELDS: &[FieldSpec] = &[
    text("name", "name"),
    text("url", "url"),
    text("secret", "secret"),
];

/// JSON object being assembled for a request body
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Payload {
    fields: Map<String, Value>,
}

impl Payload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: &str, value: impl Into<Value>) -> &mut Self {
        self.fields.insert(key.to_string(), value.into());
        self
    }

    pub fn insert_opt<V: Into<Value>>(&mut self, key: &str, value: Option<V>) -> &mut Self {
        if let Some(value) = value {
            self.fields.insert(key.to_string(), value.into());
        }
        self
    }

    /// Absent values become an explicit `null`
    pub fn insert_nullable<V: Into<Value>>(&mut self, key: &str, value: Option<V>) -> &mut Self {
        let value = value.map(Into::into).unwrap_or(Value::Null);
        self.fields.insert(key.to_string(), value);
        self
    }

    /// Empty lists are omitted
    pub fn insert_ids(&mut self, key: &str, ids: &IdList) -> &mut Self {
        if !ids.is_empty() {
            self.fields.insert(key.to_string(), ids.to_value());
        }
        self
    }

    /// Copy every mapped field the item provides
    pub fn apply(&mut self, params: &Params<'_>, table: &[FieldSpec]) -> Result<&mut Self> {
        for spec in table {
            if let Some(raw) = params.raw(spec.param) {
                self.apply_one(spec, raw)?;
            }
        }
        Ok(self)
    }

    /// Same as [`Payload::apply`] for values held in a collection parameter
    pub fn apply_collection(
        &mut self,
        collection: &Map<String, Value>,
        table: &[FieldSpec],
    ) -> Result<&mut Self> {
        for spec in table {
            if let Some(raw) = collection.get(spec.param) {
                self.apply_one(spec, raw)?;
            }
        }
        Ok(self)
    }

    fn apply_one(&mut self, spec: &FieldSpec, raw: &Value) -> Result<()> {
        let value = match spec.kind {
            FieldKind::Text => value_as_string(raw).map(Value::from),
            FieldKind::Body => value_as_text(raw).map(Value::from),
            FieldKind::Number => value_as_u64(spec.param, raw)?.map(Value::from),
        };
        if let Some(value) = value {
            self.fields.insert(spec.wire.to_string(), value);
        }
        Ok(())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.fields)
    }
}

/// `{"field": [{"key": k, "value": v}]}` to `{k: v}`; blank keys dropped
pub fn custom_fields(collection: &Map<String, Value>) -> Option<Map<String, Value>> {
    let entries = collection.get("field")?.as_array()?;
    let mut out = Map::new();
    for entry in entries {
        let key = entry.get("key").and_then(value_as_string);
        let value = entry.get("value").and_then(value_as_text);
        if let (Some(key), Some(value)) = (key, value) {
            out.insert(key, Value::String(value));
        }
    }
    (!out.is_empty()).then_some(out)
}
