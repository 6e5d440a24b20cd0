//! Sender email account operations (`/sender-emails`)

use super::OperationContext;
use crate::clients::ApiRequest;
use crate::error::{BisonError, Result};
use crate::payload::{Payload, EMAIL_ACCOUNT_UPDATE_FIELDS};
use bison_types::EmailAccountOperation;
use serde_json::Value;

const SMTP_SECURITY_MODES: &[&str] = &["none", "tls", "ssl"];

pub async fn execute(
    ctx: &OperationContext<'_>,
    operation: EmailAccountOperation,
) -> Result<Vec<Value>> {
    let params = ctx.params();
    match operation {
        EmailAccountOperation::Create => {
            let smtp_security = params.string_or("smtpSecurity", "tls").to_ascii_lowercase();
            if !SMTP_SECURITY_MODES.contains(&smtp_security.as_str()) {
                return Err(BisonError::validation(format!(
                    "SMTP security must be one of {:?}, got '{}'",
                    SMTP_SECURITY_MODES, smtp_security
                )));
            }

            let mut payload = Payload::new();
            payload
                .insert("email", params.required_email("email", "Email")?)
                .insert("name", params.required_string("name", "Name")?)
                .insert("smtp_host", params.required_string("smtpHost", "SMTP host")?)
                .insert("smtp_port", params.u64_or("smtpPort", 587)?)
                .insert("smtp_username", params.required_string("smtpUsername", "SMTP username")?)
                .insert("smtp_password", params.required_text("smtpPassword", "SMTP password")?)
                .insert("smtp_security", smtp_security)
                .insert("daily_send_limit", params.u64_or("dailySendLimit", 30)?);

            ctx.records(ApiRequest::post("/sender-emails").json(payload.into_value()))
                .await
        }
        EmailAccountOperation::Get => {
            let id = params.required_id("emailAccountId", "Email account ID")?;
            ctx.records(ApiRequest::get(format!("/sender-emails/{}", id))).await
        }
        EmailAccountOperation::GetMany => ctx.list(ApiRequest::get("/sender-emails")).await,
        EmailAccountOperation::Update => {
            let id = params.required_id("emailAccountId", "Email account ID")?;
            let update_fields = params.collection("updateFields")?;

            let mut payload = Payload::new();
            payload.apply_collection(&update_fields, EMAIL_ACCOUNT_UPDATE_FIELDS)?;
            if payload.is_empty() {
                return Err(BisonError::validation("Please select at least one field to update"));
            }

            let request = ApiRequest::patch(format!("/sender-emails/{}", id));
            ctx.records(request.json(payload.into_value())).await
        }
        EmailAccountOperation::Delete => {
            let id = params.required_id("emailAccountId", "Email account ID")?;
            ctx.delete(format!("/sender-emails/{}", id), &id).await
        }
    }
}
