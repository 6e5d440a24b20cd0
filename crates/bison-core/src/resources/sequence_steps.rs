//! Sequence step operations

use super::OperationContext;
use crate::clients::ApiRequest;
use crate::error::{BisonError, Result};
use crate::params::{invalid_identifier, path_id, value_as_string};
use bison_types::SequenceStepOperation;
use serde_json::{json, Value};

pub async fn execute(
    ctx: &OperationContext<'_>,
    operation: SequenceStepOperation,
) -> Result<Vec<Value>> {
    let params = ctx.params();
    match operation {
        SequenceStepOperation::GetMany => {
            let filters = params.collection("filters")?;
            let raw = filters
                .get("campaignId")
                .and_then(value_as_string)
                .ok_or_else(|| BisonError::validation("Campaign ID filter is required"))?;
            let campaign_id =
                path_id(&raw).ok_or_else(|| invalid_identifier("Campaign ID", &raw))?;
            let path = format!("/campaigns/v1.1/{}/sequence-steps", campaign_id);
            ctx.list(ApiRequest::get(path)).await
        }
        SequenceStepOperation::SendTest => {
            let step_id = params.required_id("sequenceStepId", "Sequence step ID")?;
            let body = json!({
                "sender_email_id": params.required_numeric_id("senderEmailId", "Sender email ID")?,
                "to_email": params.required_email("toEmail", "Recipient email")?,
                "use_dedicated_ips": params.bool_or("useDedicatedIps", false),
            });
            let path = format!("/campaigns/sequence-steps/{}/send-test", step_id);
            ctx.records(ApiRequest::post(path).json(body)).await
        }
        SequenceStepOperation::Delete => {
            let step_id = params.required_id("sequenceStepId", "Sequence step ID")?;
            ctx.delete(format!("/campaigns/sequence-steps/{}", step_id), &step_id)
                .await
        }
    }
}
