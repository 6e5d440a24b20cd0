//! Job files: one node execution described as JSON
//!
//! ```json
//! {
//!   "resource": "lead",
//!   "operation": "create",
//!   "continueOnFail": true,
//!   "parameters": { "email": "ada@example.com" },
//!   "items": [ { "firstName": "Ada" }, { "email": "grace@example.com" } ]
//! }
//! ```
//!
//! `parameters` apply to every item; each entry of `items` overrides them
//! for that item only.

use anyhow::{Context, Result};
use bison_core::StaticParameters;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobFile {
    pub resource: String,
    pub operation: String,
    #[serde(default)]
    pub continue_on_fail: Option<bool>,
    #[serde(default)]
    pub parameters: Map<String, Value>,
    #[serde(default)]
    pub items: Vec<Map<String, Value>>,
}

impl JobFile {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read job file {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse job file {}", path.display()))
    }

    /// Parameters as the executor reads them, `resource`/`operation` included
    pub fn into_parameters(self) -> StaticParameters {
        let mut params = StaticParameters::new(self.parameters);
        params.set("resource", Value::String(self.resource));
        params.set("operation", Value::String(self.operation));
        params.items = self.items;
        params
    }
}
