//! Lead operations

use super::{entity_id, OperationContext};
use crate::clients::ApiRequest;
use crate::error::Result;
use crate::params::{parse_id_token, value_as_bool, value_as_string, IdList};
use crate::payload::{custom_fields, Payload, LEAD_FIELDS};
use crate::workflow::{DependentStep, Outcome};
use bison_types::LeadOperation;
use serde_json::{json, Value};

pub async fn execute(ctx: &OperationContext<'_>, operation: LeadOperation) -> Result<Vec<Value>> {
    match operation {
        LeadOperation::Create => create(ctx).await,
        LeadOperation::Get => {
            let lead_id = ctx.params().required_id("leadId", "Lead ID")?;
            ctx.records(ApiRequest::get(format!("/leads/{}", lead_id))).await
        }
        LeadOperation::GetMany => get_many(ctx).await,
        LeadOperation::Update => update(ctx).await,
        LeadOperation::Delete => {
            let lead_id = ctx.params().required_id("leadId", "Lead ID")?;
            ctx.delete(format!("/leads/{}", lead_id), &lead_id).await
        }
        LeadOperation::AttachTags => {
            let params = ctx.params();
            let lead_ids = params.required_id_list("leadIds", "lead ID")?;
            let tag_ids = params.required_id_list("tagIds", "tag ID")?;

            let mut payload = Payload::new();
            payload
                .insert_ids("lead_ids", &lead_ids)
                .insert_ids("tag_ids", &tag_ids)
                .insert("skip_webhooks", params.bool_or("skipWebhooks", false));

            ctx.records(ApiRequest::post("/tags/attach-to-leads").json(payload.into_value()))
                .await
        }
    }
}

/// Fields shared by create and update, tags excluded
fn lead_payload(ctx: &OperationContext<'_>, payload: &mut Payload) -> Result<()> {
    let params = ctx.params();
    payload.apply(params, LEAD_FIELDS)?;
    if let Some(fields) = custom_fields(&params.collection("customFields")?) {
        payload.insert("custom_fields", Value::Object(fields));
    }
    Ok(())
}

async fn create(ctx: &OperationContext<'_>) -> Result<Vec<Value>> {
    let params = ctx.params();
    let email = params.required_email("email", "Email")?;
    let tags = params.id_list("tags");

    let mut payload = Payload::new();
    payload.insert("email", email);
    lead_payload(ctx, &mut payload)?;

    let lead = ctx
        .fetch(ApiRequest::post("/leads").json(payload.into_value()))
        .await?;
    let lead_id = entity_id(&lead);

    let outcome = attach_tags(ctx, lead, lead_id, &tags).await;
    ctx.report(&outcome);
    Ok(vec![outcome.primary])
}

async fn update(ctx: &OperationContext<'_>) -> Result<Vec<Value>> {
    let params = ctx.params();
    let lead_id = params.required_id("leadId", "Lead ID")?;
    let tags = params.id_list("tags");

    let mut payload = Payload::new();
    lead_payload(ctx, &mut payload)?;

    let lead = ctx
        .fetch(ApiRequest::patch(format!("/leads/{}", lead_id)).json(payload.into_value()))
        .await?;

    let outcome = attach_tags(ctx, lead, parse_id_token(&lead_id), &tags).await;
    ctx.report(&outcome);
    Ok(vec![outcome.primary])
}

/// Second call of lead create/update; never fails the lead itself
async fn attach_tags(
    ctx: &OperationContext<'_>,
    lead: Value,
    lead_id: Option<i64>,
    tags: &IdList,
) -> Outcome<Value> {
    let mut outcome = Outcome::new(lead);
    if tags.is_empty() {
        return outcome;
    }

    let Some(lead_id) = lead_id else {
        outcome.failed(DependentStep::AttachTags, "lead response carried no numeric id");
        return outcome;
    };

    let body = json!({
        "lead_ids": [lead_id],
        "tag_ids": tags.as_slice(),
    });
    match ctx.call(ApiRequest::post("/tags/attach-to-leads").json(body)).await {
        Ok(_) => outcome.succeeded(DependentStep::AttachTags),
        Err(e) => outcome.failed(DependentStep::AttachTags, e.to_string()),
    }
    outcome
}

async fn get_many(ctx: &OperationContext<'_>) -> Result<Vec<Value>> {
    let params = ctx.params();
    let mut request = ApiRequest::get("/leads");

    if let Some(search) = params.optional_string("search") {
        request = request.query("search", search);
    }

    let filters = params.collection("filters")?;
    if let Some(status) = filters.get("lead_campaign_status").and_then(value_as_string) {
        request = request.query("filters[lead_campaign_status]", status);
    }
    if let Some(Value::Array(statuses)) = filters.get("verification_statuses") {
        for status in statuses.iter().filter_map(value_as_string) {
            request = request.query("filters[verification_statuses][]", status);
        }
    }
    for key in ["tag_ids", "excluded_tag_ids"] {
        let ids = params.ids_from(key, filters.get(key));
        for id in ids.as_slice() {
            request = request.query(format!("filters[{}][]", key), id);
        }
    }
    if filters
        .get("without_tags")
        .and_then(value_as_bool)
        .unwrap_or(false)
    {
        request = request.query("filters[without_tags]", 1);
    }

    ctx.list(request).await
}
