//! Tag operations

use super::OperationContext;
use crate::clients::ApiRequest;
use crate::error::Result;
use crate::payload::Payload;
use bison_types::TagOperation;
use serde_json::Value;

/// Where a tag attach/remove call points and which IDs it carries
struct TagTarget {
    path: &'static str,
    param: &'static str,
    wire: &'static str,
    what: &'static str,
}

const fn tag_target(
    path: &'static str,
    param: &'static str,
    wire: &'static str,
    what: &'static str,
) -> TagTarget {
    TagTarget { path, param, wire, what }
}

const ATTACH_TO_LEADS: TagTarget =
    tag_target("/tags/attach-to-leads", "leadIds", "lead_ids", "lead ID");
const REMOVE_FROM_LEADS: TagTarget =
    tag_target("/tags/remove-from-leads", "leadIds", "lead_ids", "lead ID");
const ATTACH_TO_CAMPAIGNS: TagTarget =
    tag_target("/tags/attach-to-campaigns", "campaignIds", "campaign_ids", "campaign ID");
const REMOVE_FROM_CAMPAIGNS: TagTarget =
    tag_target("/tags/remove-from-campaigns", "campaignIds", "campaign_ids", "campaign ID");
const ATTACH_TO_SENDER_EMAILS: TagTarget = tag_target(
    "/tags/attach-to-sender-emails",
    "emailAccountIds",
    "sender_email_ids",
    "email account ID",
);
const REMOVE_FROM_SENDER_EMAILS: TagTarget = tag_target(
    "/tags/remove-from-sender-emails",
    "emailAccountIds",
    "sender_email_ids",
    "email account ID",
);

pub async fn execute(ctx: &OperationContext<'_>, operation: TagOperation) -> Result<Vec<Value>> {
    let params = ctx.params();
    match operation {
        TagOperation::Create => {
            let mut payload = Payload::new();
            payload
                .insert("name", params.required_string("name", "Tag name")?)
                .insert("default", params.bool_or("default", false));
            ctx.records(ApiRequest::post("/tags").json(payload.into_value())).await
        }
        TagOperation::Get => {
            let tag_id = params.required_id("tagId", "Tag ID")?;
            ctx.records(ApiRequest::get(format!("/tags/{}", tag_id))).await
        }
        TagOperation::GetMany => ctx.list(ApiRequest::get("/tags")).await,
        TagOperation::Delete => {
            let tag_id = params.required_id("tagId", "Tag ID")?;
            ctx.delete(format!("/tags/{}", tag_id), &tag_id).await
        }
        TagOperation::AttachToLeads => bulk(ctx, &ATTACH_TO_LEADS).await,
        TagOperation::RemoveFromLeads => bulk(ctx, &REMOVE_FROM_LEADS).await,
        TagOperation::AttachToCampaigns => bulk(ctx, &ATTACH_TO_CAMPAIGNS).await,
        TagOperation::RemoveFromCampaigns => bulk(ctx, &REMOVE_FROM_CAMPAIGNS).await,
        TagOperation::AttachToEmailAccounts => bulk(ctx, &ATTACH_TO_SENDER_EMAILS).await,
        TagOperation::RemoveFromEmailAccounts => bulk(ctx, &REMOVE_FROM_SENDER_EMAILS).await,
    }
}

/// `{tag_ids, <target>_ids, skip_webhooks}` against one of the bulk routes
async fn bulk(ctx: &OperationContext<'_>, target: &TagTarget) -> Result<Vec<Value>> {
    let params = ctx.params();
    let tag_ids = params.required_id_list("tagIds", "tag ID")?;
    let target_ids = params.required_id_list(target.param, target.what)?;

    let mut payload = Payload::new();
    payload
        .insert_ids("tag_ids", &tag_ids)
        .insert_ids(target.wire, &target_ids)
        .insert("skip_webhooks", params.bool_or("skipWebhooks", false));

    ctx.records(ApiRequest::post(target.path).json(payload.into_value()))
        .await
}
