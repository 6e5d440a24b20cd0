//! Campaign operations
//!
//! `create` is the one composite operation with two dependent steps: once
//! the campaign exists its sender emails are attached and the first sequence
//! step is written. Both are best-effort; the campaign is returned either way.

use super::{entity_id, OperationContext};
use crate::clients::ApiRequest;
use crate::error::{BisonError, Result};
use crate::params::{parse_id_token, value_as_bool, value_as_string, IdList, Params};
use crate::payload::{Payload, CAMPAIGN_FIELDS, CAMPAIGN_UPDATE_FIELDS};
use crate::workflow::{DependentStep, Outcome};
use bison_types::CampaignOperation;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::{json, Value};

const SCHEDULE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

pub async fn execute(
    ctx: &OperationContext<'_>,
    operation: CampaignOperation,
) -> Result<Vec<Value>> {
    match operation {
        CampaignOperation::Create => create(ctx).await,
        CampaignOperation::Get => {
            let campaign_id = campaign_id(ctx.params())?;
            ctx.records(ApiRequest::get(format!("/campaigns/{}", campaign_id))).await
        }
        CampaignOperation::GetMany => {
            let filters = ctx.params().collection("filters")?;
            let mut request = ApiRequest::get("/campaigns");
            for key in ["status", "tag"] {
                if let Some(value) = filters.get(key).and_then(value_as_string) {
                    request = request.query(key, value);
                }
            }
            ctx.list(request).await
        }
        CampaignOperation::Update => update(ctx).await,
        CampaignOperation::Delete => {
            let campaign_id = campaign_id(ctx.params())?;
            ctx.delete(format!("/campaigns/{}", campaign_id), &campaign_id).await
        }
        CampaignOperation::DeleteMany => {
            let ids = ctx.params().required_id_list("campaignIds", "campaign ID")?;
            let request = ApiRequest::delete("/campaigns/bulk")
                .json(json!({ "campaign_ids": ids.as_slice() }));
            let records = ctx.records(request).await?;
            if records.is_empty() {
                Ok(vec![json!({"success": true, "campaign_ids": ids.as_slice()})])
            } else {
                Ok(records)
            }
        }
        CampaignOperation::Pause => {
            let campaign_id = campaign_id(ctx.params())?;
            ctx.records(ApiRequest::patch(format!("/campaigns/{}/pause", campaign_id))).await
        }
        CampaignOperation::Resume => {
            let campaign_id = campaign_id(ctx.params())?;
            ctx.records(ApiRequest::patch(format!("/campaigns/{}/resume", campaign_id))).await
        }
        CampaignOperation::AddLeads => {
            let campaign_id = campaign_id(ctx.params())?;
            let lead_ids = ctx.params().required_id_list("leadIds", "lead ID")?;
            let request = ApiRequest::post(format!("/campaigns/{}/leads", campaign_id))
                .json(json!({ "lead_ids": lead_ids.as_slice() }));
            ctx.records(request).await
        }
        CampaignOperation::AddSequenceStep => add_sequence_step(ctx).await,
    }
}

fn campaign_id(params: &Params<'_>) -> Result<String> {
    params.required_id("campaignId", "Campaign ID")
}

async fn create(ctx: &OperationContext<'_>) -> Result<Vec<Value>> {
    let params = ctx.params();

    // Nothing is sent unless all of these are present
    let name = params.required_string("name", "Campaign name")?;
    let subject = params.required_string("subject", "Subject")?;
    let content = params.required_text("emailContent", "Email content")?;
    let sender_emails = params.required_id_list("senderEmails", "sender email ID")?;
    let tags = params.id_list("tags");
    let scheduled_at = scheduled_at(params)?;

    let mut payload = Payload::new();
    payload
        .insert("name", name.as_str())
        .insert("subject", subject.as_str())
        .insert("html_content", content.as_str())
        .insert_opt("scheduled_at", scheduled_at)
        .insert_ids("tags", &tags);
    payload.apply(params, CAMPAIGN_FIELDS)?;

    let campaign = ctx
        .fetch(ApiRequest::post("/campaigns").json(payload.into_value()))
        .await?;
    log::info!("Campaign '{}' created", name);

    let mut outcome = Outcome::new(campaign);
    match entity_id(&outcome.primary) {
        Some(id) => {
            attach_sender_emails(ctx, &mut outcome, id, &sender_emails).await;
            let step = json!({
                "title": format!("{} sequence", name),
                "sequence_steps": [{
                    "email_subject": subject,
                    "email_body": content,
                    "wait_in_days": 1,
                    "order": 1,
                }],
            });
            let path = format!("/campaigns/v1.1/{}/sequence-steps", id);
            let request = ApiRequest::post(path).json(step);
            match ctx.call(request).await {
                Ok(_) => outcome.succeeded(DependentStep::CreateSequenceStep),
                Err(e) => outcome.failed(DependentStep::CreateSequenceStep, e.to_string()),
            }
        }
        None => {
            let message = "campaign response carried no numeric id";
            outcome.failed(DependentStep::AttachSenderEmails, message);
            outcome.failed(DependentStep::CreateSequenceStep, message);
        }
    }

    ctx.report(&outcome);
    Ok(vec![outcome.primary])
}

async fn update(ctx: &OperationContext<'_>) -> Result<Vec<Value>> {
    let params = ctx.params();
    let campaign_id = campaign_id(params)?;
    let sender_emails = params.id_list("senderEmails");
    let tags = params.id_list("tags");

    let mut payload = Payload::new();
    payload.apply(params, CAMPAIGN_UPDATE_FIELDS)?;
    payload
        .insert_opt("scheduled_at", scheduled_at(params)?)
        .insert_ids("tags", &tags);

    let campaign = ctx
        .fetch(ApiRequest::patch(format!("/campaigns/{}", campaign_id)).json(payload.into_value()))
        .await?;

    let mut outcome = Outcome::new(campaign);
    if !sender_emails.is_empty() {
        match parse_id_token(&campaign_id) {
            Some(id) => attach_sender_emails(ctx, &mut outcome, id, &sender_emails).await,
            None => outcome.failed(
                DependentStep::AttachSenderEmails,
                format!("campaign id '{}' is not numeric", campaign_id),
            ),
        }
    }

    ctx.report(&outcome);
    Ok(vec![outcome.primary])
}

async fn attach_sender_emails(
    ctx: &OperationContext<'_>,
    outcome: &mut Outcome<Value>,
    campaign_id: i64,
    sender_emails: &IdList,
) {
    let request = ApiRequest::post(format!("/campaigns/{}/attach-sender-emails", campaign_id))
        .json(json!({ "sender_email_ids": sender_emails.as_slice() }));
    match ctx.call(request).await {
        Ok(_) => outcome.succeeded(DependentStep::AttachSenderEmails),
        Err(e) => outcome.failed(DependentStep::AttachSenderEmails, e.to_string()),
    }
}

async fn add_sequence_step(ctx: &OperationContext<'_>) -> Result<Vec<Value>> {
    let params = ctx.params();
    let campaign_id = campaign_id(params)?;
    let subject = params.required_string("emailSubject", "Email subject")?;
    let body = params.required_text("emailBody", "Email body")?;
    let order = params.u64_or("stepOrder", 2)?;
    let wait_days = params.u64_or("waitDays", 3)?;
    let additional = params.collection("additionalFields")?;

    // Title lookup is a read; failing it only costs the nicer default
    let mut title_lookup = Outcome::new(());
    let title = match additional.get("sequenceTitle").and_then(value_as_string) {
        Some(title) => title,
        None => {
            let lookup = ApiRequest::get(format!("/campaigns/{}", campaign_id));
            let name = match ctx.fetch(lookup).await {
                Ok(campaign) => {
                    title_lookup.succeeded(DependentStep::ResolveSequenceTitle);
                    campaign.get("name").and_then(value_as_string)
                }
                Err(e) => {
                    title_lookup.failed(DependentStep::ResolveSequenceTitle, e.to_string());
                    None
                }
            };
            format!("{} sequence", name.unwrap_or_else(|| format!("Campaign {}", campaign_id)))
        }
    };
    ctx.report(&title_lookup);

    let step = json!({
        "title": title,
        "sequence_steps": [{
            "email_subject": subject,
            "email_body": body,
            "wait_in_days": wait_days,
            "order": order,
            "variant": additional.get("variant").and_then(value_as_bool).unwrap_or(false),
            "thread_reply": additional.get("threadReply").and_then(value_as_bool).unwrap_or(false),
        }],
    });

    let path = format!("/campaigns/v1.1/{}/sequence-steps", campaign_id);
    ctx.records(ApiRequest::post(path).json(step)).await
}

/// `scheduled_at` value, present only for `scheduleType = scheduled`
fn scheduled_at(params: &Params<'_>) -> Result<Option<String>> {
    match params.string_or("scheduleType", "now").as_str() {
        "now" => Ok(None),
        "scheduled" => {
            let raw = params.required_string("scheduledDate", "Scheduled date")?;
            normalize_schedule(&raw).map(Some)
        }
        other => Err(BisonError::validation(format!(
            "Unknown schedule type '{}', expected 'now' or 'scheduled'",
            other
        ))),
    }
}

/// Accepts RFC 3339, common naive date-times and plain dates; offsets are
/// converted to UTC
pub fn normalize_schedule(raw: &str) -> Result<String> {
    let raw = raw.trim();

    if let Ok(aware) = DateTime::parse_from_rfc3339(raw) {
        return Ok(aware.with_timezone(&Utc).format(SCHEDULE_FORMAT).to_string());
    }
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(naive.format(SCHEDULE_FORMAT).to_string());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(format!("{} 00:00:00", date.format("%Y-%m-%d")));
    }

    Err(BisonError::validation(format!(
        "Scheduled date '{}' is not a recognised date or date-time",
        raw
    )))
}
