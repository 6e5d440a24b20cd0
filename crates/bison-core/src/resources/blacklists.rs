//! Blacklisted email and domain operations
//!
//! Both resources share one shape and differ only in route and value field.

use super::OperationContext;
use crate::clients::ApiRequest;
use crate::error::{BisonError, Result};
use crate::params::is_email;
use crate::payload::Payload;
use bison_types::BlacklistOperation;
use serde_json::{json, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlacklistKind {
    Email,
    Domain,
}

impl BlacklistKind {
    fn path(&self) -> &'static str {
        match self {
            BlacklistKind::Email => "/blacklisted-emails",
            BlacklistKind::Domain => "/blacklisted-domains",
        }
    }

    /// (value parameter, wire field, label)
    fn value_field(&self) -> (&'static str, &'static str, &'static str) {
        match self {
            BlacklistKind::Email => ("email", "email", "Email"),
            BlacklistKind::Domain => ("domain", "domain", "Domain"),
        }
    }

    fn id_param(&self) -> (&'static str, &'static str) {
        match self {
            BlacklistKind::Email => ("blacklistedEmailId", "Blacklisted email ID"),
            BlacklistKind::Domain => ("blacklistedDomainId", "Blacklisted domain ID"),
        }
    }

    fn validate(&self, value: &str) -> Result<()> {
        let valid = match self {
            BlacklistKind::Email => is_email(value),
            BlacklistKind::Domain => value.contains('.') && !value.contains(['@', '/', ' ']),
        };
        if valid {
            Ok(())
        } else {
            let (_, _, label) = self.value_field();
            Err(BisonError::validation(format!("{} '{}' is not valid", label, value)))
        }
    }
}

pub async fn execute(
    ctx: &OperationContext<'_>,
    kind: BlacklistKind,
    operation: BlacklistOperation,
) -> Result<Vec<Value>> {
    let params = ctx.params();
    match operation {
        BlacklistOperation::Create => {
            let (param, wire, label) = kind.value_field();
            let value = params.required_string(param, label)?;
            kind.validate(&value)?;
            let mut payload = Payload::new();
            payload.insert(wire, value);
            ctx.records(ApiRequest::post(kind.path()).json(payload.into_value()))
                .await
        }
        BlacklistOperation::Delete => {
            let (param, label) = kind.id_param();
            let id = params.required_id(param, label)?;
            ctx.call(ApiRequest::delete(format!("{}/{}", kind.path(), id)))
                .await?;
            Ok(vec![json!({"success": true, "deleted": true, "id": id})])
        }
        BlacklistOperation::GetMany => ctx.list(ApiRequest::get(kind.path())).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_validation() {
        assert!(BlacklistKind::Email.validate("spam@example.com").is_ok());
        assert!(BlacklistKind::Email.validate("example.com").is_err());
        assert!(BlacklistKind::Domain.validate("example.com").is_ok());
        assert!(BlacklistKind::Domain.validate("user@example.com").is_err());
        assert!(BlacklistKind::Domain.validate("localhost").is_err());
    }
}
