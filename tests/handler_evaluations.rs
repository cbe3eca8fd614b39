mod common;

use axum::body::Bytes;
use axum::http::StatusCode;
use bizval::domain::Tier;
use serde_json::Value;
use std::future::IntoFuture;

#[tokio::test]
async fn test_create_evaluation_hides_opportunities_for_basic() {
    let app = common::spawn_app(Tier::Basic).await;

    let response = app
        .server
        .post("/api/evaluations")
        .authorization_bearer(&app.token)
        .json(&common::struggling_retail())
        .await;

    response.assert_status(StatusCode::CREATED);

    let json = response.json::<Value>();
    assert!(json["id"].is_i64());
    assert_eq!(json["profile"]["business_name"], "Corner Goods");
    assert_eq!(json["opportunities_total"], 8);
    assert_eq!(json["opportunities"].as_array().unwrap().len(), 3);

    let valuation = &json["valuation"];
    let low = valuation["low"].as_f64().unwrap();
    let mid = valuation["mid"].as_f64().unwrap();
    let high = valuation["high"].as_f64().unwrap();
    assert!(low <= mid && mid <= high);
    assert!(json["health"]["grade"].is_string());
    assert!(json["narrative"].is_string());
}

#[tokio::test]
async fn test_create_evaluation_shows_all_opportunities_for_professional() {
    let app = common::spawn_app(Tier::Professional).await;

    let response = app
        .server
        .post("/api/evaluations")
        .authorization_bearer(&app.token)
        .json(&common::struggling_retail())
        .await;

    response.assert_status(StatusCode::CREATED);
    let json = response.json::<Value>();
    assert_eq!(json["opportunities"].as_array().unwrap().len(), 8);
}

#[tokio::test]
async fn test_create_evaluation_validation_details() {
    let app = common::spawn_app(Tier::Basic).await;

    let mut body = common::healthy_tech();
    body["industry"] = "space_mining".into();
    body["annual_revenue"] = (-5).into();
    body["business_name"] = "   ".into();

    let response = app
        .server
        .post("/api/evaluations")
        .authorization_bearer(&app.token)
        .json(&body)
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);

    let json = response.json::<Value>();
    assert_eq!(json["error"]["code"], "validation_error");

    let fields: Vec<&str> = json["error"]["details"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|d| d["field"].as_str())
        .collect();
    assert!(fields.contains(&"industry"));
    assert!(fields.contains(&"annual_revenue"));
    assert!(fields.contains(&"business_name"));
}

fn detail_fields(json: &Value) -> Vec<String> {
    json["error"]["details"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|d| d["field"].as_str().map(str::to_string))
        .collect()
}

#[tokio::test]
async fn test_wrong_typed_field_is_validation_error() {
    let app = common::spawn_app(Tier::Basic).await;

    let mut body = common::healthy_tech();
    body["employee_count"] = (-1).into();

    let response = app
        .server
        .post("/api/evaluations")
        .authorization_bearer(&app.token)
        .json(&body)
        .await;

    response.assert_status_bad_request();
    let json = response.json::<Value>();
    assert_eq!(json["error"]["code"], "validation_error");
    assert_eq!(detail_fields(&json), vec!["employee_count"]);
}

#[tokio::test]
async fn test_missing_field_is_validation_error() {
    let app = common::spawn_app(Tier::Basic).await;

    let mut body = common::healthy_tech();
    body.as_object_mut().unwrap().remove("industry");

    let response = app
        .server
        .post("/api/evaluations")
        .authorization_bearer(&app.token)
        .json(&body)
        .await;

    response.assert_status_bad_request();
    let json = response.json::<Value>();
    assert_eq!(json["error"]["code"], "validation_error");
    assert_eq!(detail_fields(&json), vec!["industry"]);
}

#[tokio::test]
async fn test_malformed_json_is_validation_error() {
    let app = common::spawn_app(Tier::Basic).await;

    let response = app
        .server
        .post("/api/evaluations")
        .authorization_bearer(&app.token)
        .bytes(Bytes::from_static(b"{\"business_name\": "))
        .content_type("application/json")
        .await;

    response.assert_status_bad_request();
    let json = response.json::<Value>();
    assert_eq!(json["error"]["code"], "validation_error");
    assert_eq!(detail_fields(&json), vec!["body"]);
}

#[tokio::test]
async fn test_unbounded_amounts_are_rejected() {
    let app = common::spawn_app(Tier::Basic).await;

    let mut body = common::healthy_tech();
    body["annual_revenue"] = 1e308.into();

    let response = app
        .server
        .post("/api/evaluations")
        .authorization_bearer(&app.token)
        .json(&body)
        .await;

    response.assert_status_bad_request();
    assert_eq!(detail_fields(&response.json::<Value>()), vec!["annual_revenue"]);

    let list = app
        .server
        .get("/api/evaluations")
        .authorization_bearer(&app.token)
        .await;
    list.assert_status_ok();
    assert_eq!(list.json::<Value>()["total"], 0);
}

#[tokio::test]
async fn test_non_numeric_id_is_validation_error() {
    let app = common::spawn_app(Tier::Basic).await;

    let response = app
        .server
        .get("/api/evaluations/abc")
        .authorization_bearer(&app.token)
        .await;

    response.assert_status_bad_request();
    let json = response.json::<Value>();
    assert_eq!(json["error"]["code"], "validation_error");
    assert_eq!(detail_fields(&json), vec!["path"]);
}

#[tokio::test]
async fn test_non_numeric_page_is_validation_error() {
    let app = common::spawn_app(Tier::Basic).await;

    let response = app
        .server
        .get("/api/evaluations")
        .add_query_param("page", "two")
        .authorization_bearer(&app.token)
        .await;

    response.assert_status_bad_request();
    let json = response.json::<Value>();
    assert_eq!(json["error"]["code"], "validation_error");
    assert_eq!(detail_fields(&json), vec!["query"]);
}

#[tokio::test]
async fn test_requires_bearer_token() {
    let app = common::spawn_app(Tier::Basic).await;

    let response = app.server.get("/api/evaluations").await;
    response.assert_status_unauthorized();
    assert_eq!(response.header("www-authenticate"), "Bearer");

    let response = app
        .server
        .get("/api/evaluations")
        .authorization_bearer("not-a-real-token")
        .await;
    response.assert_status_unauthorized();
    assert_eq!(response.json::<Value>()["error"]["code"], "unauthorized");
}

#[tokio::test]
async fn test_basic_monthly_quota() {
    let app = common::spawn_app(Tier::Basic).await;

    for _ in 0..3 {
        common::create_evaluation(&app, &common::healthy_tech()).await;
    }

    let response = app
        .server
        .post("/api/evaluations")
        .authorization_bearer(&app.token)
        .json(&common::healthy_tech())
        .await;

    response.assert_status_forbidden();
    let json = response.json::<Value>();
    assert_eq!(json["error"]["code"], "forbidden");
    assert_eq!(json["error"]["details"]["quota"], 3);
}

#[tokio::test]
async fn test_concurrent_submissions_respect_quota() {
    let app = common::spawn_app(Tier::Basic).await;
    let body = common::healthy_tech();

    let submit = || {
        app.server
            .post("/api/evaluations")
            .authorization_bearer(&app.token)
            .json(&body)
            .into_future()
    };
    let (a, b, c, d, e) = tokio::join!(submit(), submit(), submit(), submit(), submit());

    let created = [a, b, c, d, e]
        .iter()
        .filter(|r| r.status_code() == StatusCode::CREATED)
        .count();
    assert_eq!(created, 3);

    let response = app
        .server
        .get("/api/me")
        .authorization_bearer(&app.token)
        .await;
    assert_eq!(response.json::<Value>()["quota"]["used"], 3);
}

#[tokio::test]
async fn test_deleted_evaluations_still_count_against_quota() {
    let app = common::spawn_app(Tier::Basic).await;

    for _ in 0..3 {
        let id = common::create_evaluation(&app, &common::healthy_tech()).await;
        app.server
            .delete(&format!("/api/evaluations/{id}"))
            .authorization_bearer(&app.token)
            .await
            .assert_status(StatusCode::NO_CONTENT);
    }

    app.server
        .post("/api/evaluations")
        .authorization_bearer(&app.token)
        .json(&common::healthy_tech())
        .await
        .assert_status_forbidden();
}

#[tokio::test]
async fn test_list_evaluations_paginated() {
    let app = common::spawn_app(Tier::Professional).await;

    let first = common::create_evaluation(&app, &common::healthy_tech()).await;
    common::create_evaluation(&app, &common::struggling_retail()).await;
    let last = common::create_evaluation(&app, &common::healthy_tech()).await;

    let response = app
        .server
        .get("/api/evaluations")
        .add_query_param("page", 1)
        .add_query_param("page_size", 2)
        .authorization_bearer(&app.token)
        .await;

    response.assert_status_ok();
    let json = response.json::<Value>();
    assert_eq!(json["total"], 3);
    assert_eq!(json["page"], 1);
    assert_eq!(json["page_size"], 2);
    let items = json["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["id"], last);

    let response = app
        .server
        .get("/api/evaluations")
        .add_query_param("page", 2)
        .add_query_param("page_size", 2)
        .authorization_bearer(&app.token)
        .await;
    let json = response.json::<Value>();
    let items = json["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["id"], first);
}

#[tokio::test]
async fn test_list_rejects_bad_page_size() {
    let app = common::spawn_app(Tier::Basic).await;

    for size in ["0", "101"] {
        let response = app
            .server
            .get("/api/evaluations")
            .add_query_param("page_size", size)
            .authorization_bearer(&app.token)
            .await;
        response.assert_status_bad_request();
    }
}

#[tokio::test]
async fn test_evaluations_are_scoped_to_owner() {
    let app = common::spawn_app(Tier::Professional).await;
    let id = common::create_evaluation(&app, &common::healthy_tech()).await;

    let (_, other_token) = app.add_user("other@example.com", Tier::Enterprise).await;

    app.server
        .get(&format!("/api/evaluations/{id}"))
        .authorization_bearer(&other_token)
        .await
        .assert_status_not_found();

    app.server
        .delete(&format!("/api/evaluations/{id}"))
        .authorization_bearer(&other_token)
        .await
        .assert_status_not_found();

    app.server
        .get(&format!("/api/evaluations/{id}"))
        .authorization_bearer(&app.token)
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn test_update_evaluation_recomputes() {
    let app = common::spawn_app(Tier::Professional).await;
    let id = common::create_evaluation(&app, &common::struggling_retail()).await;

    let before = app
        .server
        .get(&format!("/api/evaluations/{id}"))
        .authorization_bearer(&app.token)
        .await
        .json::<Value>();

    let response = app
        .server
        .put(&format!("/api/evaluations/{id}"))
        .authorization_bearer(&app.token)
        .json(&common::healthy_tech())
        .await;

    response.assert_status_ok();
    let after = response.json::<Value>();
    assert_eq!(after["id"], id);
    assert_eq!(after["profile"]["business_name"], "Acme Analytics");
    assert!(
        after["health"]["overall"].as_f64().unwrap()
            > before["health"]["overall"].as_f64().unwrap()
    );
}

#[tokio::test]
async fn test_update_missing_evaluation() {
    let app = common::spawn_app(Tier::Professional).await;

    app.server
        .put("/api/evaluations/999")
        .authorization_bearer(&app.token)
        .json(&common::healthy_tech())
        .await
        .assert_status_not_found();
}

#[tokio::test]
async fn test_delete_evaluation() {
    let app = common::spawn_app(Tier::Basic).await;
    let id = common::create_evaluation(&app, &common::healthy_tech()).await;

    app.server
        .delete(&format!("/api/evaluations/{id}"))
        .authorization_bearer(&app.token)
        .await
        .assert_status(StatusCode::NO_CONTENT);

    app.server
        .get(&format!("/api/evaluations/{id}"))
        .authorization_bearer(&app.token)
        .await
        .assert_status_not_found();

    app.server
        .delete(&format!("/api/evaluations/{id}"))
        .authorization_bearer(&app.token)
        .await
        .assert_status_not_found();

    let json = app
        .server
        .get("/api/evaluations")
        .authorization_bearer(&app.token)
        .await
        .json::<Value>();
    assert_eq!(json["total"], 0);
}

#[tokio::test]
async fn test_export_requires_professional() {
    let app = common::spawn_app(Tier::Basic).await;

    let response = app
        .server
        .get("/api/evaluations/export")
        .authorization_bearer(&app.token)
        .await;

    response.assert_status_forbidden();
    let json = response.json::<Value>();
    assert_eq!(json["error"]["details"]["feature"], "csv_export");
    assert_eq!(json["error"]["details"]["required_tier"], "professional");
}

#[tokio::test]
async fn test_export_csv() {
    let app = common::spawn_app(Tier::Professional).await;
    common::create_evaluation(&app, &common::healthy_tech()).await;
    common::create_evaluation(&app, &common::struggling_retail()).await;

    let response = app
        .server
        .get("/api/evaluations/export")
        .authorization_bearer(&app.token)
        .await;

    response.assert_status_ok();
    assert!(
        response
            .header("content-type")
            .to_str()
            .unwrap()
            .starts_with("text/csv")
    );
    assert!(
        response
            .header("content-disposition")
            .to_str()
            .unwrap()
            .contains("evaluations.csv")
    );

    let body = response.text();
    let lines: Vec<&str> = body.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[1].contains("Corner Goods"));
    assert!(lines[2].contains("Acme Analytics"));
}
