//! Reply and outbound email operations

use super::OperationContext;
use crate::clients::ApiRequest;
use crate::error::{BisonError, Result};
use crate::params::{is_email, value_as_string, Params};
use crate::payload::Payload;
use bison_types::ReplyOperation;
use serde_json::{json, Value};

const CONTENT_TYPES: &[&str] = &["html", "text"];

pub async fn execute(ctx: &OperationContext<'_>, operation: ReplyOperation) -> Result<Vec<Value>> {
    let params = ctx.params();
    match operation {
        ReplyOperation::Compose => {
            let sender_email_id = params.required_numeric_id("senderEmailId", "Sender email ID")?;
            let to_emails = recipients(params, "toEmails")?;
            if to_emails.is_empty() {
                return Err(BisonError::validation("At least one recipient is required"));
            }
            let content_type = params.string_or("contentType", "html");
            if !CONTENT_TYPES.contains(&content_type.as_str()) {
                return Err(BisonError::validation(format!(
                    "Content type must be 'html' or 'text', got '{}'",
                    content_type
                )));
            }
            let cc = recipients(params, "ccEmails")?;
            let bcc = recipients(params, "bccEmails")?;

            let mut payload = Payload::new();
            payload
                .insert("sender_email_id", sender_email_id)
                .insert("to_emails", to_emails)
                .insert_nullable("subject", params.optional_string("subject"))
                .insert("message", params.optional_text("message").unwrap_or_default())
                .insert("content_type", content_type)
                .insert_nullable("cc_emails", (!cc.is_empty()).then_some(cc))
                .insert_nullable("bcc_emails", (!bcc.is_empty()).then_some(bcc))
                .insert("use_dedicated_ips", params.bool_or("useDedicatedIps", false));

            ctx.records(ApiRequest::post("/replies/new").json(payload.into_value()))
                .await
        }
        ReplyOperation::GetMany => {
            let filters = params.collection("filters")?;
            let mut request = ApiRequest::get("/replies");
            // The lead filter has been stored under both spellings
            let lead = filters.get("leadId").or_else(|| filters.get("lead_id"));
            let pairs = [
                ("campaign_id", filters.get("campaignId")),
                ("lead_id", lead),
                ("status", filters.get("status")),
            ];
            for (wire, value) in pairs {
                if let Some(value) = value.and_then(value_as_string) {
                    request = request.query(wire, value);
                }
            }
            ctx.list(request).await
        }
        ReplyOperation::MarkInterested => {
            let reply_id = params.required_id("replyId", "Reply ID")?;
            ctx.records(ApiRequest::patch(format!("/replies/{}/mark-as-interested", reply_id)))
                .await
        }
        ReplyOperation::PushToFollowup => {
            let reply_id = params.required_id("replyId", "Reply ID")?;
            let body = json!({
                "campaign_id": params.required_numeric_id("campaignId", "Campaign ID")?,
                "force_add_reply": params.bool_or("forceAddReply", false),
            });
            let path = format!("/replies/{}/followup-campaign/push", reply_id);
            ctx.records(ApiRequest::post(path).json(body)).await
        }
    }
}

/// `{values: [{name, emailAddress}]}` to `[{name, email_address}]`
fn recipients(params: &Params<'_>, name: &str) -> Result<Vec<Value>> {
    let mut out = Vec::new();
    for entry in params.fixed_collection(name, "values")? {
        let Some(address) = entry.get("emailAddress").and_then(value_as_string) else {
            continue;
        };
        if !is_email(&address) {
            return Err(BisonError::validation(format!(
                "'{}' is not a valid email address",
                address
            )));
        }
        let display = entry.get("name").and_then(value_as_string).unwrap_or_default();
        out.push(json!({ "name": display, "email_address": address }));
    }
    Ok(out)
}
