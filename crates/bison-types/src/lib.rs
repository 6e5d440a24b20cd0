//! Shared types for the EmailBison node
//!
//! Resources and operations are closed enums so dispatch can be matched
//! exhaustively; the host-facing metadata is derived from the same enums.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;
use thiserror::Error;

/// Declares an operation enum together with its wire value, display name
/// and action text.
macro_rules! operation_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $($variant:ident => ($value:literal, $display:literal, $action:literal)),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $value)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Operation name as sent by the host
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $value,)+
                }
            }

            pub fn display_name(&self) -> &'static str {
                match self {
                    $($name::$variant => $display,)+
                }
            }

            pub fn action(&self) -> &'static str {
                match self {
                    $($name::$variant => $action,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

/// Resource exposed by the node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Resource {
    Lead,
    Campaign,
    EmailAccount,
    Tag,
    Workspace,
    Webhook,
    SequenceStep,
    Reply,
    BlacklistedEmail,
    BlacklistedDomain,
}

impl Resource {
    pub const ALL: &'static [Resource] = &[
        Resource::Lead,
        Resource::Campaign,
        Resource::EmailAccount,
        Resource::Tag,
        Resource::Workspace,
        Resource::Webhook,
        Resource::SequenceStep,
        Resource::Reply,
        Resource::BlacklistedEmail,
        Resource::BlacklistedDomain,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Resource::Lead => "lead",
            Resource::Campaign => "campaign",
            Resource::EmailAccount => "emailAccount",
            Resource::Tag => "tag",
            Resource::Workspace => "workspace",
            Resource::Webhook => "webhook",
            Resource::SequenceStep => "sequenceStep",
            Resource::Reply => "reply",
            Resource::BlacklistedEmail => "blacklistedEmail",
            Resource::BlacklistedDomain => "blacklistedDomain",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Resource::Lead => "Lead",
            Resource::Campaign => "Campaign",
            Resource::EmailAccount => "Email Account",
            Resource::Tag => "Tag",
            Resource::Workspace => "Workspace",
            Resource::Webhook => "Webhook",
            Resource::SequenceStep => "Sequence Step",
            Resource::Reply => "Reply",
            Resource::BlacklistedEmail => "Blacklisted Email",
            Resource::BlacklistedDomain => "Blacklisted Domain",
        }
    }

    /// Operations available on this resource, in catalogue order
    pub fn operations(&self) -> Vec<NodeOperation> {
        match self {
            Resource::Lead => LeadOperation::ALL.iter().copied().map(NodeOperation::Lead).collect(),
            Resource::Campaign => CampaignOperation::ALL
                .iter()
                .copied()
                .map(NodeOperation::Campaign)
                .collect(),
            Resource::EmailAccount => EmailAccountOperation::ALL
                .iter()
                .copied()
                .map(NodeOperation::EmailAccount)
                .collect(),
            Resource::Tag => TagOperation::ALL.iter().copied().map(NodeOperation::Tag).collect(),
            Resource::Workspace => WorkspaceOperation::ALL
                .iter()
                .copied()
                .map(NodeOperation::Workspace)
                .collect(),
            Resource::Webhook => WebhookOperation::ALL
                .iter()
                .copied()
                .map(NodeOperation::Webhook)
                .collect(),
            Resource::SequenceStep => SequenceStepOperation::ALL
                .iter()
                .copied()
                .map(NodeOperation::SequenceStep)
                .collect(),
            Resource::Reply => ReplyOperation::ALL
                .iter()
                .copied()
                .map(NodeOperation::Reply)
                .collect(),
            Resource::BlacklistedEmail => BlacklistOperation::ALL
                .iter()
                .copied()
                .map(NodeOperation::BlacklistedEmail)
                .collect(),
            Resource::BlacklistedDomain => BlacklistOperation::ALL
                .iter()
                .copied()
                .map(NodeOperation::BlacklistedDomain)
                .collect(),
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Resource {
    type Err = UnsupportedOperation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Resource::ALL
            .iter()
            .copied()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| UnsupportedOperation::Resource(s.to_string()))
    }
}

operation_enum! {
    LeadOperation {
        Create => ("create", "Create", "Create a lead"),
        Get => ("get", "Get", "Get a lead"),
        GetMany => ("getMany", "Get Many", "Get many leads"),
        Update => ("update", "Update", "Update a lead"),
        Delete => ("delete", "Delete", "Delete a lead"),
        AttachTags => ("attachTags", "Attach Tags", "Attach tags to leads"),
    }
}

operation_enum! {
    CampaignOperation {
        Create => ("create", "Create", "Create a campaign"),
        Get => ("get", "Get", "Get a campaign"),
        GetMany => ("getMany", "Get Many", "Get many campaigns"),
        Update => ("update", "Update", "Update a campaign"),
        Delete => ("delete", "Delete", "Delete a campaign"),
        DeleteMany => ("deleteMany", "Delete Many", "Delete many campaigns"),
        Pause => ("pause", "Stop/Pause", "Stop/Pause a campaign"),
        Resume => ("resume", "Start/Resume", "Start/Resume a campaign"),
        AddLeads => ("addLeads", "Add Leads", "Add leads to campaign"),
        AddSequenceStep => (
            "addSequenceStep",
            "Add Sequence Step",
            "Add sequence step to campaign"
        ),
    }
}

operation_enum! {
    EmailAccountOperation {
        Create => ("create", "Create", "Create an email account"),
        Get => ("get", "Get", "Get an email account"),
        GetMany => ("getMany", "Get Many", "Get many email accounts"),
        Update => ("update", "Update", "Update an email account"),
        Delete => ("delete", "Delete", "Delete an email account"),
    }
}

operation_enum! {
    TagOperation {
        Create => ("create", "Create", "Create a tag"),
        Get => ("get", "Get", "Get a tag"),
        GetMany => ("getMany", "Get Many", "Get many tags"),
        Delete => ("delete", "Delete", "Delete a tag"),
        AttachToLeads => ("attachToLeads", "Attach Tags to Leads", "Attach tags to leads"),
        RemoveFromLeads => ("removeFromLeads", "Remove Tags from Leads", "Remove tags from leads"),
        AttachToCampaigns => (
            "attachToCampaigns",
            "Attach Tags to Campaigns",
            "Attach tags to campaigns"
        ),
        RemoveFromCampaigns => (
            "removeFromCampaigns",
            "Remove Tags from Campaigns",
            "Remove tags from campaigns"
        ),
        AttachToEmailAccounts => (
            "attachToEmailAccounts",
            "Attach Tags to Email Accounts",
            "Attach tags to email accounts"
        ),
        RemoveFromEmailAccounts => (
            "removeFromEmailAccounts",
            "Remove Tags from Email Accounts",
            "Remove tags from email accounts"
        ),
    }
}

operation_enum! {
    WorkspaceOperation {
        Get => ("get", "Get", "Get a workspace"),
        GetMany => ("getMany", "Get Many", "Get many workspaces"),
        Create => ("create", "Create", "Create a workspace"),
        Update => ("update", "Update", "Update a workspace"),
        Delete => ("delete", "Delete", "Delete a workspace"),
        CreateUser => ("createUser", "Create User", "Create a user in the workspace"),
        CreateApiToken => (
            "createApiToken",
            "Create API Token",
            "Create an API token for a workspace"
        ),
        SwitchWorkspace => (
            "switchWorkspace",
            "Switch Workspace",
            "Switch to a different workspace"
        ),
        InviteMembers => ("inviteMembers", "Invite Members", "Invite members to the workspace"),
        AcceptInvitation => (
            "acceptInvitation",
            "Accept Invitation",
            "Accept a workspace invitation"
        ),
        DeleteMember => ("deleteMember", "Delete Member", "Delete a member from the workspace"),
        GetMasterInboxSettings => (
            "getMasterInboxSettings",
            "Get Master Inbox Settings",
            "Get master inbox settings"
        ),
        UpdateMasterInboxSettings => (
            "updateMasterInboxSettings",
            "Update Master Inbox Settings",
            "Update master inbox settings"
        ),
        GetStats => ("getStats", "Get Stats", "Get workspace statistics"),
        GetLineAreaChartStats => (
            "getLineAreaChartStats",
            "Get Line Area Chart Stats",
            "Get line/area chart statistics"
        ),
    }
}

operation_enum! {
    WebhookOperation {
        Create => ("create", "Create", "Create a webhook"),
        Get => ("get", "Get", "Get a webhook"),
        Update => ("update", "Update", "Update a webhook"),
        Delete => ("delete", "Delete", "Delete a webhook"),
    }
}

operation_enum! {
    SequenceStepOperation {
        GetMany => ("getMany", "Get Many", "Get many sequence steps"),
        SendTest => ("sendTest", "Send Test Email", "Send test email"),
        Delete => ("delete", "Delete", "Delete a sequence step"),
    }
}

operation_enum! {
    ReplyOperation {
        Compose => ("compose", "Compose Email", "Compose a new email"),
        GetMany => ("getMany", "Get Many", "Get many replies"),
        MarkInterested => ("markInterested", "Mark as Interested", "Mark a reply as interested"),
        PushToFollowup => (
            "pushToFollowup",
            "Push to Follow-up Campaign",
            "Push reply to a follow-up campaign"
        ),
    }
}

operation_enum! {
    /// Shared by blacklisted emails and blacklisted domains
    BlacklistOperation {
        Create => ("create", "Create", "Add to the blacklist"),
        Delete => ("delete", "Delete", "Remove from the blacklist"),
        GetMany => ("getMany", "Get Many", "Get blacklist entries"),
    }
}

/// Closed union of every resource × operation pair the node supports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeOperation {
    Lead(LeadOperation),
    Campaign(CampaignOperation),
    EmailAccount(EmailAccountOperation),
    Tag(TagOperation),
    Workspace(WorkspaceOperation),
    Webhook(WebhookOperation),
    SequenceStep(SequenceStepOperation),
    Reply(ReplyOperation),
    BlacklistedEmail(BlacklistOperation),
    BlacklistedDomain(BlacklistOperation),
}

impl NodeOperation {
    pub fn resource(&self) -> Resource {
        match self {
            NodeOperation::Lead(_) => Resource::Lead,
            NodeOperation::Campaign(_) => Resource::Campaign,
            NodeOperation::EmailAccount(_) => Resource::EmailAccount,
            NodeOperation::Tag(_) => Resource::Tag,
            NodeOperation::Workspace(_) => Resource::Workspace,
            NodeOperation::Webhook(_) => Resource::Webhook,
            NodeOperation::SequenceStep(_) => Resource::SequenceStep,
            NodeOperation::Reply(_) => Resource::Reply,
            NodeOperation::BlacklistedEmail(_) => Resource::BlacklistedEmail,
            NodeOperation::BlacklistedDomain(_) => Resource::BlacklistedDomain,
        }
    }

    pub fn operation_name(&self) -> &'static str {
        self.describe().0
    }

    /// (value, display name, action)
    fn describe(&self) -> (&'static str, &'static str, &'static str) {
        match self {
            NodeOperation::Lead(op) => (op.as_str(), op.display_name(), op.action()),
            NodeOperation::Campaign(op) => (op.as_str(), op.display_name(), op.action()),
            NodeOperation::EmailAccount(op) => (op.as_str(), op.display_name(), op.action()),
            NodeOperation::Tag(op) => (op.as_str(), op.display_name(), op.action()),
            NodeOperation::Workspace(op) => (op.as_str(), op.display_name(), op.action()),
            NodeOperation::Webhook(op) => (op.as_str(), op.display_name(), op.action()),
            NodeOperation::SequenceStep(op) => (op.as_str(), op.display_name(), op.action()),
            NodeOperation::Reply(op) => (op.as_str(), op.display_name(), op.action()),
            NodeOperation::BlacklistedEmail(op) | NodeOperation::BlacklistedDomain(op) => {
                (op.as_str(), op.display_name(), op.action())
            }
        }
    }

    /// Every supported pair, resource by resource
    pub fn all() -> Vec<NodeOperation> {
        Resource::ALL.iter().flat_map(|r| r.operations()).collect()
    }
}

impl fmt::Display for NodeOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.resource(), self.operation_name())
    }
}

/// Raised when the host names a resource or operation the node does not know
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UnsupportedOperation {
    #[error("The resource \"{0}\" is not known!")]
    Resource(String),

    #[error("The operation \"{operation}\" is not supported for resource \"{resource}\"!")]
    Operation { resource: String, operation: String },
}

/// Link from an output record back to the input item that produced it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairedItem {
    pub item: usize,
}

/// One record emitted by the node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputItem {
    pub json: Value,
    pub paired_item: PairedItem,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl OutputItem {
    pub fn success(item: usize, json: Value) -> Self {
        Self {
            json,
            paired_item: PairedItem { item },
            error: None,
        }
    }

    /// Error record emitted under continue-on-fail
    pub fn failure(item: usize, message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            json: json!({ "error": message }),
            paired_item: PairedItem { item },
            error: Some(message),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationDescription {
    pub value: String,
    pub display_name: String,
    pub action: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceDescription {
    pub value: String,
    pub display_name: String,
    pub operations: Vec<OperationDescription>,
}

/// Metadata consumed by a host UI to render the node
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDescription {
    pub name: String,
    pub display_name: String,
    pub version: u32,
    pub credential: String,
    pub resources: Vec<ResourceDescription>,
}

impl NodeDescription {
    pub fn build() -> Self {
        let resources = Resource::ALL
            .iter()
            .map(|resource| ResourceDescription {
                value: resource.as_str().to_string(),
                display_name: resource.display_name().to_string(),
                operations: resource
                    .operations()
                    .iter()
                    .map(|op| {
                        let (value, display_name, action) = op.describe();
                        OperationDescription {
                            value: value.to_string(),
                            display_name: display_name.to_string(),
                            action: action.to_string(),
                        }
                    })
                    .collect(),
            })
            .collect();

        Self {
            name: "emailBison".to_string(),
            display_name: "EmailBison".to_string(),
            version: 1,
            credential: "emailBisonApi".to_string(),
            resources,
        }
    }
}
