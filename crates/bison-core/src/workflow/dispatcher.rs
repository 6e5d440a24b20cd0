//! Resource × operation dispatch
//!
//! Host-supplied names are resolved once against a table built from the
//! closed operation enums; dispatch itself is an exhaustive `match`.

use crate::error::Result;
use crate::resources::{
    blacklists::{self, BlacklistKind},
    campaigns, email_accounts, leads, replies, sequence_steps, tags, webhooks, workspaces,
    OperationContext,
};
use bison_types::{NodeOperation, UnsupportedOperation};
use once_cell::sync::Lazy;
use serde_json::Value;
use std::collections::HashMap;

type OperationTable = HashMap<&'static str, HashMap<&'static str, NodeOperation>>;

static OPERATIONS: Lazy<OperationTable> = Lazy::new(|| {
    let mut table = OperationTable::new();
    for operation in NodeOperation::all() {
        table
            .entry(operation.resource().as_str())
            .or_default()
            .insert(operation.operation_name(), operation);
    }
    table
});

/// Map host names onto a supported operation
pub fn resolve(
    resource: &str,
    operation: &str,
) -> std::result::Result<NodeOperation, UnsupportedOperation> {
    let operations = OPERATIONS
        .get(resource)
        .ok_or_else(|| UnsupportedOperation::Resource(resource.to_string()))?;

    operations
        .get(operation)
        .copied()
        .ok_or_else(|| UnsupportedOperation::Operation {
            resource: resource.to_string(),
            operation: operation.to_string(),
        })
}

/// Run one operation for the item held by `ctx`
pub async fn dispatch(ctx: &OperationContext<'_>, operation: NodeOperation) -> Result<Vec<Value>> {
    match operation {
        NodeOperation::Lead(op) => leads::execute(ctx, op).await,
        NodeOperation::Campaign(op) => campaigns::execute(ctx, op).await,
        NodeOperation::EmailAccount(op) => email_accounts::execute(ctx, op).await,
        NodeOperation::Tag(op) => tags::execute(ctx, op).await,
        NodeOperation::Workspace(op) => workspaces::execute(ctx, op).await,
        NodeOperation::Webhook(op) => webhooks::execute(ctx, op).await,
        NodeOperation::SequenceStep(op) => sequence_steps::execute(ctx, op).await,
        NodeOperation::Reply(op) => replies::execute(ctx, op).await,
        NodeOperation::BlacklistedEmail(op) => {
            blacklists::execute(ctx, BlacklistKind::Email, op).await
        }
        NodeOperation::BlacklistedDomain(op) => {
            blacklists::execute(ctx, BlacklistKind::Domain, op).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bison_types::{BlacklistOperation, CampaignOperation, Resource};

    #[test]
    fn test_resolve_known_pairs() {
        assert_eq!(
            resolve("campaign", "addSequenceStep").unwrap(),
            NodeOperation::Campaign(CampaignOperation::AddSequenceStep)
        );
        assert_eq!(
            resolve("blacklistedDomain", "getMany").unwrap(),
            NodeOperation::BlacklistedDomain(BlacklistOperation::GetMany)
        );
    }

    #[test]
    fn test_resolve_rejects_unknown_names() {
        assert_eq!(
            resolve("invoice", "create").unwrap_err(),
            UnsupportedOperation::Resource("invoice".to_string())
        );

        let err = resolve("webhook", "getMany").unwrap_err();
        assert_eq!(
            err.to_string(),
            "The operation \"getMany\" is not supported for resource \"webhook\"!"
        );
    }

    #[test]
    fn test_table_covers_every_resource() {
        for resource in Resource::ALL {
            assert!(OPERATIONS.contains_key(resource.as_str()), "{} missing", resource);
        }
        let total: usize = OPERATIONS.values().map(HashMap::len).sum();
        assert_eq!(total, NodeOperation::all().len());
    }
}
