//! Workspace operations (`/workspaces/v1.1`)

use super::OperationContext;
use crate::clients::ApiRequest;
use crate::error::{BisonError, Result};
use crate::params::Params;
use crate::payload::Payload;
use bison_types::WorkspaceOperation;
use serde_json::{json, Value};

const BASE: &str = "/workspaces/v1.1";

const MEMBER_ROLES: &[&str] = &["admin", "member"];

fn team_id(params: &Params<'_>) -> Result<String> {
    params.required_id("teamId", "Workspace ID")
}

pub async fn execute(
    ctx: &OperationContext<'_>,
    operation: WorkspaceOperation,
) -> Result<Vec<Value>> {
    let params = ctx.params();
    match operation {
        WorkspaceOperation::Get => {
            let team_id = team_id(params)?;
            ctx.records(ApiRequest::get(format!("{}/{}", BASE, team_id))).await
        }
        WorkspaceOperation::GetMany => ctx.list(ApiRequest::get(BASE)).await,
        WorkspaceOperation::Create => {
            let name = params.required_string("name", "Workspace name")?;
            ctx.records(ApiRequest::post(BASE).json(json!({ "name": name }))).await
        }
        WorkspaceOperation::Update => {
            let team_id = team_id(params)?;
            let mut payload = Payload::new();
            payload.insert_opt("name", params.optional_string("name"));
            ctx.records(ApiRequest::put(format!("{}/{}", BASE, team_id)).json(payload.into_value()))
                .await
        }
        WorkspaceOperation::Delete => {
            let team_id = team_id(params)?;
            let records = ctx.records(ApiRequest::delete(format!("{}/{}", BASE, team_id))).await?;
            if records.is_empty() {
                Ok(vec![json!({"success": true, "id": team_id})])
            } else {
                Ok(records)
            }
        }
        WorkspaceOperation::CreateUser => {
            let mut payload = Payload::new();
            payload
                .insert("email", params.required_email("email", "Email")?)
                .insert_opt("first_name", params.optional_string("firstName"))
                .insert_opt("last_name", params.optional_string("lastName"));
            ctx.records(ApiRequest::post(format!("{}/users", BASE)).json(payload.into_value()))
                .await
        }
        WorkspaceOperation::CreateApiToken => {
            let team_id = team_id(params)?;
            let mut payload = Payload::new();
            payload.insert_opt("name", params.optional_string("name"));
            let request = ApiRequest::post(format!("{}/{}/api-tokens", BASE, team_id));
            ctx.records(request.json(payload.into_value())).await
        }
        WorkspaceOperation::SwitchWorkspace => {
            let team_id = params.required_numeric_id("teamId", "Workspace ID")?;
            let request = ApiRequest::post(format!("{}/switch-workspace", BASE));
            ctx.records(request.json(json!({ "team_id": team_id }))).await
        }
        WorkspaceOperation::InviteMembers => {
            let email = params.required_email("email", "Email")?;
            let role = params.string_or("role", "member");
            if !MEMBER_ROLES.contains(&role.as_str()) {
                return Err(BisonError::validation(format!(
                    "Role must be 'admin' or 'member', got '{}'",
                    role
                )));
            }
            ctx.records(
                ApiRequest::post(format!("{}/invite-members", BASE))
                    .json(json!({ "email": email, "role": role })),
            )
            .await
        }
        WorkspaceOperation::AcceptInvitation => {
            let invitation_id = params.required_id("teamInvitationId", "Invitation ID")?;
            ctx.records(ApiRequest::post(format!("{}/accept/{}", BASE, invitation_id)))
                .await
        }
        WorkspaceOperation::DeleteMember => {
            let user_id = params.required_id("userId", "User ID")?;
            let records = ctx
                .records(ApiRequest::delete(format!("{}/members/{}", BASE, user_id)))
                .await?;
            if records.is_empty() {
                Ok(vec![json!({"success": true, "id": user_id})])
            } else {
                Ok(records)
            }
        }
        WorkspaceOperation::GetMasterInboxSettings => {
            ctx.records(ApiRequest::get(format!("{}/master-inbox-settings", BASE)))
                .await
        }
        WorkspaceOperation::UpdateMasterInboxSettings => {
            let settings = params.collection("settings")?;
            if settings.is_empty() {
                return Err(BisonError::validation("Settings must contain at least one field"));
            }
            let request = ApiRequest::patch(format!("{}/master-inbox-settings", BASE));
            ctx.records(request.json(Value::Object(settings))).await
        }
        WorkspaceOperation::GetStats => {
            ctx.records(ApiRequest::get(format!("{}/stats", BASE))).await
        }
        WorkspaceOperation::GetLineAreaChartStats => {
            ctx.records(ApiRequest::get(format!("{}/line-area-chart-stats", BASE)))
                .await
        }
    }
}
