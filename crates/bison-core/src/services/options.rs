//! Dropdown option loaders
//!
//! Each loader lists one entity type and turns it into `{name, value}`
//! pairs. Loaders never fail: errors are reported and yield no options.

use crate::clients::{ApiRequest, ApiTransport};
use crate::constants::OPTIONS_PAGE_SIZE;
use crate::error::BisonError;
use crate::params::value_as_string;
use crate::response::unwrap_data;
use crate::workflow::{ExecutionEvent, ExecutionObserver};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionEntry {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionSource {
    Leads,
    Campaigns,
    SenderEmails,
    Workspaces,
    Tags,
}

impl OptionSource {
    pub const ALL: [OptionSource; 5] = [
        OptionSource::Leads,
        OptionSource::Campaigns,
        OptionSource::SenderEmails,
        OptionSource::Workspaces,
        OptionSource::Tags,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OptionSource::Leads => "getLeads",
            OptionSource::Campaigns => "getCampaigns",
            OptionSource::SenderEmails => "getSenderEmails",
            OptionSource::Workspaces => "getWorkspaces",
            OptionSource::Tags => "getTags",
        }
    }

    fn path(&self) -> &'static str {
        match self {
            OptionSource::Leads => "/leads",
            OptionSource::Campaigns => "/campaigns",
            OptionSource::SenderEmails => "/sender-emails",
            OptionSource::Workspaces => "/workspaces/v1.1",
            OptionSource::Tags => "/tags",
        }
    }

    /// Label shown in the dropdown; `None` when the entity has no id
    fn label(&self, entity: &Value) -> Option<OptionEntry> {
        let id = value_as_string(entity.get("id")?)?;
        let field = |key: &str| entity.get(key).and_then(value_as_string);

        let name = match self {
            OptionSource::Leads => format!(
                "{} {} - {} (ID: {})",
                field("first_name").unwrap_or_default(),
                field("last_name").unwrap_or_default(),
                field("email").unwrap_or_default(),
                id
            )
            .trim()
            .to_string(),
            OptionSource::Campaigns => format!(
                "{} - {} (ID: {})",
                field("name").unwrap_or_default(),
                field("status").unwrap_or_else(|| "N/A".to_string()),
                id
            ),
            OptionSource::SenderEmails => format!(
                "{} - {} (ID: {})",
                field("email").unwrap_or_default(),
                field("name").unwrap_or_else(|| "N/A".to_string()),
                id
            ),
            OptionSource::Workspaces | OptionSource::Tags => {
                format!("{} (ID: {})", field("name").unwrap_or_default(), id)
            }
        };

        Some(OptionEntry { name, value: id })
    }
}

impl fmt::Display for OptionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OptionSource {
    type Err = BisonError;

    /// Accepts both `getTags` and the short `tags`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OptionSource::ALL
            .into_iter()
            .find(|source| {
                source.as_str() == s
                    || source.as_str().trim_start_matches("get").eq_ignore_ascii_case(s)
            })
            .ok_or_else(|| BisonError::validation(format!("Unknown option source '{}'", s)))
    }
}

pub struct OptionsService<T: ApiTransport> {
    transport: T,
    observer: Arc<dyn ExecutionObserver>,
}

impl<T: ApiTransport> OptionsService<T> {
    pub fn new(transport: T, observer: Arc<dyn ExecutionObserver>) -> Self {
        Self { transport, observer }
    }

    pub async fn load(&self, source: OptionSource) -> Vec<OptionEntry> {
        let request = ApiRequest::get(source.path())
            .query("limit", OPTIONS_PAGE_SIZE)
            .query("per_page", OPTIONS_PAGE_SIZE);

        let body = match self.transport.send(request).await {
            Ok(body) => body,
            Err(e) => {
                self.report(source, e.to_string());
                return Vec::new();
            }
        };

        match unwrap_data(body) {
            Value::Array(entities) => entities.iter().filter_map(|e| source.label(e)).collect(),
            other => {
                self.report(source, format!("response is not an array: {}", other));
                Vec::new()
            }
        }
    }

    fn report(&self, source: OptionSource, error: String) {
        self.observer.record(ExecutionEvent::OptionsLoadFailed {
            source: source.as_str().to_string(),
            error,
        });
    }
}
