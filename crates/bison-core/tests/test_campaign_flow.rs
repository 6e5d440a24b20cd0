//! Campaign composite flows

mod common;

use bison_core::clients::HttpMethod;
use bison_core::workflow::{DependentStep, MemoryObserver, NodeExecutor};
use bison_core::{OutputItem, Result, StaticParameters};
use common::{params, MockTransport};
use serde_json::{json, Value};
use std::sync::Arc;

fn create_params(overrides: Value) -> StaticParameters {
    let mut base = json!({
        "resource": "campaign",
        "operation": "create",
        "name": "Q3 Outreach",
        "subject": "Quick question",
        "emailContent": "<p>Hi {{first_name}}</p>",
        "senderEmails": [11, 12],
        "fromName": "Sales",
    });
    if let (Some(base), Some(overrides)) = (base.as_object_mut(), overrides.as_object()) {
        for (k, v) in overrides {
            base.insert(k.clone(), v.clone());
        }
    }
    params(base)
}

fn created_campaign() -> MockTransport {
    MockTransport::new().with_response(
        HttpMethod::Post,
        "/campaigns",
        json!({"data": {"id": 77, "name": "Q3 Outreach", "status": "draft"}}),
    )
}

async fn run(
    transport: &Arc<MockTransport>,
    input: &StaticParameters,
) -> (Result<Vec<OutputItem>>, Arc<MemoryObserver>) {
    let observer = Arc::new(MemoryObserver::new());
    let result = NodeExecutor::new(transport.clone())
        .with_observer(observer.clone())
        .execute(input, 1)
        .await;
    (result, observer)
}

#[tokio::test]
async fn test_create_runs_all_three_calls_in_order() {
    let transport = Arc::new(
        created_campaign()
            .with_response(
                HttpMethod::Post,
                "/campaigns/77/attach-sender-emails",
                json!({"data": {}}),
            )
            .with_response(
                HttpMethod::Post,
                "/campaigns/v1.1/77/sequence-steps",
                json!({"data": {}}),
            ),
    );

    let (result, observer) = run(&transport, &create_params(json!({}))).await;
    let output = result.unwrap();

    assert_eq!(output.len(), 1);
    assert_eq!(output[0].json["id"], 77);
    assert_eq!(
        transport.calls(),
        vec![
            "POST /campaigns",
            "POST /campaigns/77/attach-sender-emails",
            "POST /campaigns/v1.1/77/sequence-steps",
        ]
    );

    let primary = transport.body_of(0);
    assert_eq!(primary["name"], "Q3 Outreach");
    assert_eq!(primary["html_content"], "<p>Hi {{first_name}}</p>");
    assert_eq!(primary["from_name"], "Sales");
    assert!(primary.get("sender_email_ids").is_none());
    assert!(primary.get("scheduled_at").is_none());

    assert_eq!(transport.body_of(1), json!({"sender_email_ids": [11, 12]}));

    let step = transport.body_of(2);
    assert_eq!(step["title"], "Q3 Outreach sequence");
    assert_eq!(step["sequence_steps"][0]["email_subject"], "Quick question");
    assert_eq!(step["sequence_steps"][0]["order"], 1);
    assert!(observer.dependent_failures().is_empty());
}

#[tokio::test]
async fn test_create_validates_before_any_call() {
    for missing in ["name", "subject", "emailContent"] {
        let transport = Arc::new(created_campaign());
        let (result, _) = run(&transport, &create_params(json!({ missing: "   " }))).await;

        let err = result.unwrap_err();
        assert!(err.is_validation(), "{} should be required", missing);
        assert!(transport.calls().is_empty());
    }
}

#[tokio::test]
async fn test_create_requires_a_sender_email() {
    let transport = Arc::new(created_campaign());
    let (result, _) = run(&transport, &create_params(json!({"senderEmails": "abc, "}))).await;

    let err = result.unwrap_err();
    assert!(err.to_string().contains("sender email ID"));
    assert!(transport.calls().is_empty());
}

#[tokio::test]
async fn test_dependent_failures_still_return_the_campaign() {
    let transport = Arc::new(
        created_campaign()
            .with_failure(
                HttpMethod::Post,
                "/campaigns/77/attach-sender-emails",
                500,
                "Server Error",
            )
            .with_failure(
                HttpMethod::Post,
                "/campaigns/v1.1/77/sequence-steps",
                422,
                "Invalid step",
            ),
    );

    let (result, observer) = run(&transport, &create_params(json!({}))).await;
    let output = result.unwrap();

    assert_eq!(output.len(), 1);
    assert!(!output[0].is_error());
    assert_eq!(output[0].json["status"], "draft");

    let steps: Vec<_> = observer.dependent_failures().into_iter().map(|(_, s, _)| s).collect();
    assert_eq!(
        steps,
        vec![DependentStep::AttachSenderEmails, DependentStep::CreateSequenceStep]
    );
}

#[tokio::test]
async fn test_primary_failure_aborts() {
    let transport = Arc::new(
        MockTransport::new().with_failure(HttpMethod::Post, "/campaigns", 401, "Unauthenticated."),
    );

    let (result, _) = run(&transport, &create_params(json!({}))).await;

    assert_eq!(result.unwrap_err().status(), Some(401));
    assert_eq!(transport.calls(), vec!["POST /campaigns"]);
}

#[tokio::test]
async fn test_scheduled_create_normalizes_the_date() {
    let transport = Arc::new(
        created_campaign()
            .with_response(HttpMethod::Post, "/campaigns/77/attach-sender-emails", json!({}))
            .with_response(HttpMethod::Post, "/campaigns/v1.1/77/sequence-steps", json!({})),
    );

    let input = create_params(json!({
        "scheduleType": "scheduled",
        "scheduledDate": "2026-11-02T08:00:00Z",
        "tags": "3,4",
    }));
    let (result, _) = run(&transport, &input).await;
    result.unwrap();

    let primary = transport.body_of(0);
    assert_eq!(primary["scheduled_at"], "2026-11-02 08:00:00");
    assert_eq!(primary["tags"], json!([3, 4]));
}

#[tokio::test]
async fn test_update_sends_only_supplied_fields() {
    let transport = Arc::new(
        MockTransport::new()
            .with_response(
                HttpMethod::Patch,
                "/campaigns/5",
                json!({"data": {"id": 5, "subject": "New"}}),
            )
            .with_failure(HttpMethod::Post, "/campaigns/5/attach-sender-emails", 500, "down"),
    );

    let input = params(json!({
        "resource": "campaign",
        "operation": "update",
        "campaignId": "5",
        "subject": "New",
        "fromName": "",
        "senderEmails": "21",
    }));
    let (result, observer) = run(&transport, &input).await;
    let output = result.unwrap();

    assert_eq!(output[0].json["subject"], "New");
    assert_eq!(transport.body_of(0), json!({"subject": "New"}));
    assert_eq!(
        transport.calls(),
        vec!["PATCH /campaigns/5", "POST /campaigns/5/attach-sender-emails"]
    );
    assert_eq!(observer.dependent_failures().len(), 1);
}

#[tokio::test]
async fn test_update_without_sender_emails_skips_attachment() {
    let transport = Arc::new(MockTransport::new().with_response(
        HttpMethod::Patch,
        "/campaigns/5",
        json!({"data": {"id": 5}}),
    ));

    let input = params(json!({
        "resource": "campaign",
        "operation": "update",
        "campaignId": 5,
        "name": "Renamed",
    }));
    let (result, _) = run(&transport, &input).await;
    result.unwrap();

    assert_eq!(transport.calls(), vec!["PATCH /campaigns/5"]);
}

#[tokio::test]
async fn test_add_sequence_step_defaults_title_from_campaign() {
    let transport = Arc::new(
        MockTransport::new()
            .with_response(
                HttpMethod::Get,
                "/campaigns/9",
                json!({"data": {"id": 9, "name": "Spring Push"}}),
            )
            .with_response(
                HttpMethod::Post,
                "/campaigns/v1.1/9/sequence-steps",
                json!({"data": {"id": 300}}),
            ),
    );

    let input = params(json!({
        "resource": "campaign",
        "operation": "addSequenceStep",
        "campaignId": "9",
        "emailSubject": "Following up",
        "emailBody": "Any thoughts?",
        "additionalFields": {"threadReply": true},
    }));
    let (result, _) = run(&transport, &input).await;
    let output = result.unwrap();

    assert_eq!(output[0].json["id"], 300);
    let body = transport.body_of(1);
    assert_eq!(body["title"], "Spring Push sequence");
    assert_eq!(
        body["sequence_steps"][0],
        json!({
            "email_subject": "Following up",
            "email_body": "Any thoughts?",
            "wait_in_days": 3,
            "order": 2,
            "variant": false,
            "thread_reply": true,
        })
    );
}

#[tokio::test]
async fn test_add_sequence_step_survives_title_lookup_failure() {
    let transport = Arc::new(
        MockTransport::new()
            .with_failure(HttpMethod::Get, "/campaigns/9", 404, "Record not found.")
            .with_response(
                HttpMethod::Post,
                "/campaigns/v1.1/9/sequence-steps",
                json!({"data": {"id": 301}}),
            ),
    );

    let input = params(json!({
        "resource": "campaign",
        "operation": "addSequenceStep",
        "campaignId": "9",
        "emailSubject": "Bump",
        "emailBody": "Bump",
        "stepOrder": 3,
    }));
    let (result, observer) = run(&transport, &input).await;
    result.unwrap();

    let body = transport.body_of(1);
    assert_eq!(body["title"], "Campaign 9 sequence");
    assert_eq!(body["sequence_steps"][0]["order"], 3);
    assert_eq!(observer.dependent_failures()[0].1, DependentStep::ResolveSequenceTitle);
}

#[tokio::test]
async fn test_delete_many_and_pause() {
    let transport = Arc::new(
        MockTransport::new()
            .with_response(HttpMethod::Delete, "/campaigns/bulk", json!(null))
            .with_response(
                HttpMethod::Patch,
                "/campaigns/4/pause",
                json!({"data": {"id": 4, "status": "paused"}}),
            ),
    );

    let input = params(json!({
        "resource": "campaign",
        "operation": "deleteMany",
        "campaignIds": "1, 2",
    }));
    let (result, _) = run(&transport, &input).await;
    assert_eq!(
        result.unwrap()[0].json,
        json!({"success": true, "campaign_ids": [1, 2]})
    );
    assert_eq!(transport.body_of(0), json!({"campaign_ids": [1, 2]}));

    let input = params(json!({"resource": "campaign", "operation": "pause", "campaignId": "4"}));
    let (result, _) = run(&transport, &input).await;
    assert_eq!(result.unwrap()[0].json["status"], "paused");
}
