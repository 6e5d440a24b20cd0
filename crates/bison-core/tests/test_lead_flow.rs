//! Lead operations through the full executor

mod common;

use bison_core::clients::HttpMethod;
use bison_core::workflow::{DependentStep, ExecutionEvent, MemoryObserver, NodeExecutor};
use common::{params, MockTransport};
use serde_json::json;
use std::sync::Arc;

fn executor(
    transport: &Arc<MockTransport>,
    observer: &Arc<MemoryObserver>,
) -> NodeExecutor<Arc<MockTransport>> {
    NodeExecutor::new(transport.clone()).with_observer(observer.clone())
}

#[tokio::test]
async fn test_create_lead_then_attach_tags() {
    let transport = Arc::new(
        MockTransport::new()
            .with_response(
                HttpMethod::Post,
                "/leads",
                json!({"data": {"id": 42, "email": "ada@example.com"}}),
            )
            .with_response(
                HttpMethod::Post,
                "/tags/attach-to-leads",
                json!({"data": {"success": true}}),
            ),
    );
    let observer = Arc::new(MemoryObserver::new());

    let input = params(json!({
        "resource": "lead",
        "operation": "create",
        "email": "ada@example.com",
        "firstName": "Ada",
        "lastName": "",
        "tags": [5, 7],
    }));

    let output = executor(&transport, &observer).execute(&input, 1).await.unwrap();

    assert_eq!(output.len(), 1);
    assert_eq!(output[0].json, json!({"id": 42, "email": "ada@example.com"}));
    assert_eq!(transport.calls(), vec!["POST /leads", "POST /tags/attach-to-leads"]);

    // Tags never travel with the lead itself
    assert_eq!(transport.body_of(0), json!({"email": "ada@example.com", "first_name": "Ada"}));
    assert_eq!(transport.body_of(1), json!({"lead_ids": [42], "tag_ids": [5, 7]}));
    assert!(observer.dependent_failures().is_empty());
}

#[tokio::test]
async fn test_tag_attach_failure_keeps_the_lead() {
    let transport = Arc::new(
        MockTransport::new()
            .with_response(HttpMethod::Post, "/leads", json!({"data": {"id": 42}}))
            .with_failure(
                HttpMethod::Post,
                "/tags/attach-to-leads",
                422,
                "The selected tag ids is invalid.",
            ),
    );
    let observer = Arc::new(MemoryObserver::new());

    let input = params(json!({
        "resource": "lead",
        "operation": "create",
        "email": "ada@example.com",
        "tags": "5, 7",
    }));

    let output = executor(&transport, &observer).execute(&input, 1).await.unwrap();

    assert_eq!(output.len(), 1);
    assert!(!output[0].is_error());
    assert_eq!(output[0].json["id"], 42);

    let failures = observer.dependent_failures();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].0, 0);
    assert_eq!(failures[0].1, DependentStep::AttachTags);
    assert!(failures[0].2.contains("tag ids is invalid"));
}

#[tokio::test]
async fn test_create_without_tags_is_a_single_call() {
    let transport =
        Arc::new(MockTransport::new().with_response(HttpMethod::Post, "/leads", json!({"id": 1})));
    let observer = Arc::new(MemoryObserver::new());

    let input = params(json!({
        "resource": "lead",
        "operation": "create",
        "email": "grace@example.com",
        "customFields": {"field": [{"key": "industry", "value": "Navy"}]},
    }));

    executor(&transport, &observer).execute(&input, 1).await.unwrap();

    assert_eq!(transport.calls(), vec!["POST /leads"]);
    assert_eq!(transport.body_of(0)["custom_fields"], json!({"industry": "Navy"}));
}

#[tokio::test]
async fn test_garbage_tag_tokens_are_reported_not_sent() {
    let transport = Arc::new(
        MockTransport::new()
            .with_response(HttpMethod::Post, "/leads", json!({"data": {"id": 8}}))
            .with_response(HttpMethod::Post, "/tags/attach-to-leads", json!({})),
    );
    let observer = Arc::new(MemoryObserver::new());

    let input = params(json!({
        "resource": "lead",
        "operation": "create",
        "email": "x@example.com",
        "tags": "3,vip",
    }));

    executor(&transport, &observer).execute(&input, 1).await.unwrap();

    assert_eq!(transport.body_of(1)["tag_ids"], json!([3]));
    assert!(observer.events().contains(&ExecutionEvent::IdTokensDropped {
        item_index: 0,
        parameter: "tags".to_string(),
        tokens: vec!["vip".to_string()],
    }));
}

#[tokio::test]
async fn test_create_requires_email_before_any_call() {
    let transport = Arc::new(MockTransport::new());
    let observer = Arc::new(MemoryObserver::new());

    let input = params(json!({"resource": "lead", "operation": "create", "email": "  "}));
    let err = executor(&transport, &observer).execute(&input, 1).await.unwrap_err();

    assert!(err.is_validation());
    assert!(transport.calls().is_empty());
}

#[tokio::test]
async fn test_update_attaches_tags_to_the_given_lead() {
    let transport = Arc::new(
        MockTransport::new()
            .with_response(
                HttpMethod::Patch,
                "/leads/17",
                json!({"data": {"id": 17, "company": "Acme"}}),
            )
            .with_response(HttpMethod::Post, "/tags/attach-to-leads", json!({})),
    );
    let observer = Arc::new(MemoryObserver::new());

    let input = params(json!({
        "resource": "lead",
        "operation": "update",
        "leadId": "17",
        "company": "Acme",
        "tags": ["2"],
    }));

    let output = executor(&transport, &observer).execute(&input, 1).await.unwrap();

    assert_eq!(output[0].json["company"], "Acme");
    assert_eq!(transport.calls(), vec!["PATCH /leads/17", "POST /tags/attach-to-leads"]);
    assert_eq!(transport.body_of(0), json!({"company": "Acme"}));
    assert_eq!(transport.body_of(1), json!({"lead_ids": [17], "tag_ids": [2]}));
}

#[tokio::test]
async fn test_get_many_sends_filters_and_limit() {
    let transport = Arc::new(MockTransport::new().with_response(
        HttpMethod::Get,
        "/leads",
        json!({"data": [{"id": 1}, {"id": 2}, {"id": 3}]}),
    ));
    let observer = Arc::new(MemoryObserver::new());

    let input = params(json!({
        "resource": "lead",
        "operation": "getMany",
        "limit": 2,
        "search": "acme",
        "filters": {
            "lead_campaign_status": "replied",
            "verification_statuses": ["verified", "risky"],
            "tag_ids": "4,5",
            "without_tags": false,
        },
    }));

    let output = executor(&transport, &observer).execute(&input, 1).await.unwrap();

    // Upstream may ignore the limit; output is still capped
    assert_eq!(output.len(), 2);

    let request = &transport.requests()[0];
    assert_eq!(request.query_value("limit"), Some("2"));
    assert_eq!(request.query_value("search"), Some("acme"));
    assert_eq!(request.query_value("filters[lead_campaign_status]"), Some("replied"));
    let statuses: Vec<_> = request
        .query
        .iter()
        .filter(|(k, _)| k == "filters[verification_statuses][]")
        .map(|(_, v)| v.as_str())
        .collect();
    assert_eq!(statuses, vec!["verified", "risky"]);
    assert_eq!(
        request.query.iter().filter(|(k, _)| k == "filters[tag_ids][]").count(),
        2
    );
    assert_eq!(request.query_value("filters[without_tags]"), None);
}

#[tokio::test]
async fn test_attach_tags_requires_both_lists() {
    let transport = Arc::new(MockTransport::new());
    let observer = Arc::new(MemoryObserver::new());

    let input = params(json!({
        "resource": "lead",
        "operation": "attachTags",
        "leadIds": "1,2",
        "tagIds": "",
    }));
    let err = executor(&transport, &observer).execute(&input, 1).await.unwrap_err();

    assert!(err.to_string().contains("tag ID"));
    assert!(transport.calls().is_empty());
}

#[tokio::test]
async fn test_delete_acknowledges_with_id() {
    let transport = Arc::new(MockTransport::new().with_response(
        HttpMethod::Delete,
        "/leads/9",
        json!(null),
    ));
    let observer = Arc::new(MemoryObserver::new());

    let input = params(json!({"resource": "lead", "operation": "delete", "leadId": 9}));
    let output = executor(&transport, &observer).execute(&input, 1).await.unwrap();

    assert_eq!(output[0].json, json!({"success": true, "id": "9"}));
}
