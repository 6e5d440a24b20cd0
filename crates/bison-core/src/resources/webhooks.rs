//! Webhook operations

use super::OperationContext;
use crate::clients::ApiRequest;
use crate::error::{BisonError, Result};
use crate::payload::{Payload, WEBHOOK_FIELDS};
use bison_types::WebhookOperation;
use serde_json::Value;

pub const WEBHOOK_EVENTS: &[&str] = &[
    "email.sent",
    "email.delivered",
    "email.bounced",
    "email.opened",
    "email.clicked",
    "email.replied",
    "campaign.started",
    "campaign.completed",
];

fn validated_events(events: Vec<String>) -> Result<Vec<String>> {
    if let Some(unknown) = events.iter().find(|e| !WEBHOOK_EVENTS.contains(&e.as_str())) {
        return Err(BisonError::validation(format!(
            "Unknown webhook event '{}'",
            unknown
        )));
    }
    Ok(events)
}

fn validated_url(url: &str) -> Result<()> {
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        Err(BisonError::validation(format!(
            "Webhook URL '{}' must start with http:// or https://",
            url
        )))
    }
}

pub async fn execute(
    ctx: &OperationContext<'_>,
    operation: WebhookOperation,
) -> Result<Vec<Value>> {
    let params = ctx.params();
    match operation {
        WebhookOperation::Create => {
            let url = params.required_string("url", "Webhook URL")?;
            validated_url(&url)?;
            let events = validated_events(params.string_list("events"))?;
            if events.is_empty() {
                return Err(BisonError::validation("At least one webhook event is required"));
            }

            let mut payload = Payload::new();
            payload.apply(params, WEBHOOK_FIELDS)?;
            payload.insert("events", events);

            ctx.records(ApiRequest::post("/webhooks").json(payload.into_value()))
                .await
        }
        WebhookOperation::Get => {
            let webhook_id = params.required_id("webhookId", "Webhook ID")?;
            ctx.records(ApiRequest::get(format!("/webhooks/{}", webhook_id))).await
        }
        WebhookOperation::Update => {
            let webhook_id = params.required_id("webhookId", "Webhook ID")?;
            if let Some(url) = params.optional_string("url") {
                validated_url(&url)?;
            }
            let events = validated_events(params.string_list("events"))?;

            let mut payload = Payload::new();
            payload.apply(params, WEBHOOK_FIELDS)?;
            if !events.is_empty() {
                payload.insert("events", events);
            }

            let request = ApiRequest::put(format!("/webhooks/{}", webhook_id));
            ctx.records(request.json(payload.into_value())).await
        }
        WebhookOperation::Delete => {
            let webhook_id = params.required_id("webhookId", "Webhook ID")?;
            ctx.delete(format!("/webhooks/{}", webhook_id), &webhook_id).await
        }
    }
}
