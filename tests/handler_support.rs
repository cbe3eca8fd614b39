mod common;

use axum::http::StatusCode;
use bizval::domain::Tier;
use serde_json::{Value, json};

#[tokio::test]
async fn test_ticket_priority_follows_tier() {
    for (tier, priority) in [
        (Tier::Basic, "low"),
        (Tier::Professional, "normal"),
        (Tier::Enterprise, "high"),
    ] {
        let app = common::spawn_app(tier).await;

        let response = app
            .server
            .post("/api/support/tickets")
            .authorization_bearer(&app.token)
            .json(&json!({
                "subject": "  Report question  ",
                "message": "How is the EBITDA multiple chosen?",
                "category": "valuation"
            }))
            .await;

        response.assert_status(StatusCode::CREATED);
        let ticket = response.json::<Value>();
        assert_eq!(ticket["priority"], priority);
        assert_eq!(ticket["status"], "open");
        assert_eq!(ticket["subject"], "Report question");
        assert_eq!(ticket["category"], "valuation");
    }
}

#[tokio::test]
async fn test_ticket_validation() {
    let app = common::spawn_app(Tier::Basic).await;

    let response = app
        .server
        .post("/api/support/tickets")
        .authorization_bearer(&app.token)
        .json(&json!({ "subject": "Hi", "message": "short" }))
        .await;

    response.assert_status_bad_request();
    let json = response.json::<Value>();
    assert_eq!(json["error"]["code"], "validation_error");
    assert_eq!(json["error"]["details"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_blank_ticket_text_is_rejected() {
    let app = common::spawn_app(Tier::Basic).await;

    let response = app
        .server
        .post("/api/support/tickets")
        .authorization_bearer(&app.token)
        .json(&json!({ "subject": "     ", "message": "            " }))
        .await;

    response.assert_status_bad_request();
    let json = response.json::<Value>();
    let fields: Vec<&str> = json["error"]["details"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, vec!["message", "subject"]);
}

#[tokio::test]
async fn test_unknown_category_is_validation_error() {
    let app = common::spawn_app(Tier::Basic).await;

    let response = app
        .server
        .post("/api/support/tickets")
        .authorization_bearer(&app.token)
        .json(&json!({
            "subject": "Billing question",
            "message": "Why was I charged twice?",
            "category": "refunds"
        }))
        .await;

    response.assert_status_bad_request();
    let json = response.json::<Value>();
    assert_eq!(json["error"]["code"], "validation_error");
    assert_eq!(json["error"]["details"][0]["field"], "category");
}

#[tokio::test]
async fn test_list_tickets() {
    let app = common::spawn_app(Tier::Professional).await;

    for subject in ["First question", "Second question"] {
        app.server
            .post("/api/support/tickets")
            .authorization_bearer(&app.token)
            .json(&json!({
                "subject": subject,
                "message": "Something I would like to know more about."
            }))
            .await
            .assert_status(StatusCode::CREATED);
    }

    let tickets = app
        .server
        .get("/api/support/tickets")
        .authorization_bearer(&app.token)
        .await
        .json::<Vec<Value>>();

    assert_eq!(tickets.len(), 2);
    assert_eq!(tickets[0]["subject"], "Second question");
    assert_eq!(tickets[1]["category"], "other");
}
