use axum::http::StatusCode;
use http_body_util::BodyExt;
use serde_json::json;
use tempfile::TempDir;
use tower::ServiceExt;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn app(dir: &TempDir) -> axum::Router {
    gapcheck_server::build_router(dir.path().to_path_buf()).unwrap()
}

async fn send(
    app: axum::Router,
    method: &str,
    uri: &str,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let mut builder = axum::http::Request::builder().method(method).uri(uri);
    let body = match body {
        Some(b) => {
            builder = builder.header("content-type", "application/json");
            axum::body::Body::from(serde_json::to_vec(&b).unwrap())
        }
        None => axum::body::Body::empty(),
    };
    let response = app.oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    (status, json)
}

async fn get(app: axum::Router, uri: &str) -> (StatusCode, serde_json::Value) {
    send(app, "GET", uri, None).await
}

async fn post_json(
    app: axum::Router,
    uri: &str,
    body: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    send(app, "POST", uri, Some(body)).await
}

/// Create the worked-example report: 100K audience, 5% buyers, $2,000 ACV.
async fn create_acme(dir: &TempDir) {
    let (status, _) = post_json(
        app(dir),
        "/api/reports",
        json!({
            "client": { "company_name": "Acme Cooling" },
            "market": {
                "audience_size": 100000.0,
                "buyer_rate": 5.0,
                "annual_customer_value": 2000.0
            },
            "company": { "annual_revenue": 1000000.0 }
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

#[tokio::test]
async fn list_reports_empty() {
    let dir = TempDir::new().unwrap();
    let (status, json) = get(app(&dir), "/api/reports").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, json!([]));
}

#[tokio::test]
async fn create_report_derives_slug_and_share_url() {
    let dir = TempDir::new().unwrap();
    let (status, json) = post_json(
        app(&dir),
        "/api/reports",
        json!({ "client": { "company_name": "Acme Cooling" } }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["slug"], "acme-cooling");
    assert_eq!(json["share_url"], "http://localhost:3141/reports/acme-cooling");
    assert!(dir
        .path()
        .join(".gapcheck/reports/report-acme-cooling.json")
        .exists());

    let (_, list) = get(app(&dir), "/api/reports").await;
    assert_eq!(list[0]["slug"], "acme-cooling");
    assert_eq!(list[0]["company_name"], "Acme Cooling");
}

#[tokio::test]
async fn create_report_requires_company_name() {
    let dir = TempDir::new().unwrap();
    let (status, json) = post_json(
        app(&dir),
        "/api/reports",
        json!({ "market": { "audience_size": 1000.0 } }),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(json["error"].as_str().unwrap().contains("company name"));
}

#[tokio::test]
async fn create_report_twice_conflicts() {
    let dir = TempDir::new().unwrap();
    create_acme(&dir).await;
    let (status, _) = post_json(
        app(&dir),
        "/api/reports",
        json!({ "client": { "company_name": "Acme Cooling" } }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn create_report_rejects_ill_typed_record() {
    let dir = TempDir::new().unwrap();
    let (status, _) = post_json(
        app(&dir),
        "/api/reports",
        json!({ "client": { "company_name": "Acme" }, "channels": "lots" }),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, json) = post_json(
        app(&dir),
        "/api/reports",
        json!({ "client": { "company_name": "Acme" }, "market": { "audience_size": "lots" } }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("market.audience_size"));
}

#[tokio::test]
async fn get_missing_report_is_404() {
    let dir = TempDir::new().unwrap();
    let (status, json) = get(app(&dir), "/api/reports/nobody").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(json["error"].as_str().unwrap().contains("nobody"));
}

#[tokio::test]
async fn invalid_slug_is_400() {
    let dir = TempDir::new().unwrap();
    let (status, _) = get(app(&dir), "/api/reports/Not_A_Slug").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn patch_merges_and_null_clears() {
    let dir = TempDir::new().unwrap();
    create_acme(&dir).await;

    let (status, json) = send(
        app(&dir),
        "PATCH",
        "/api/reports/acme-cooling",
        Some(json!({
            "market": { "buyer_rate": 6.0 },
            "company": { "annual_revenue": null }
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["market"]["buyer_rate"], 6.0);
    assert_eq!(json["market"]["audience_size"], 100000.0);
    assert!(json["company"].get("annual_revenue").is_none());

    let (_, stored) = get(app(&dir), "/api/reports/acme-cooling").await;
    assert_eq!(stored["market"]["buyer_rate"], 6.0);
}

#[tokio::test]
async fn patch_accepts_numeric_text() {
    let dir = TempDir::new().unwrap();
    create_acme(&dir).await;

    let (status, json) = send(
        app(&dir),
        "PATCH",
        "/api/reports/acme-cooling",
        Some(json!({ "market": { "audience_size": "185K", "buyer_rate": "6.2%" } })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["market"]["audience_size"], 185000.0);
    assert_eq!(json["market"]["buyer_rate"], 6.2);

    let (_, stored) = get(app(&dir), "/api/reports/acme-cooling").await;
    assert_eq!(stored["market"]["audience_size"], 185000.0);
}

#[tokio::test]
async fn patch_rejects_out_of_range_percent() {
    let dir = TempDir::new().unwrap();
    create_acme(&dir).await;

    for rate in [json!("140%"), json!(140.0)] {
        let (status, _) = send(
            app(&dir),
            "PATCH",
            "/api/reports/acme-cooling",
            Some(json!({ "market": { "buyer_rate": rate } })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    let (_, stored) = get(app(&dir), "/api/reports/acme-cooling").await;
    assert_eq!(stored["market"]["buyer_rate"], 5.0);
}

#[tokio::test]
async fn patch_cannot_remove_company_name() {
    let dir = TempDir::new().unwrap();
    create_acme(&dir).await;
    let (status, _) = send(
        app(&dir),
        "PATCH",
        "/api/reports/acme-cooling",
        Some(json!({ "client": { "company_name": null } })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn put_fields_parses_raw_values() {
    let dir = TempDir::new().unwrap();
    create_acme(&dir).await;

    let (status, json) = send(
        app(&dir),
        "PUT",
        "/api/reports/acme-cooling/fields",
        Some(json!({
            "funnel.website_visitors": "20K",
            "buyer %": "7.5%"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["record"]["funnel"]["website_visitors"], 20000.0);
    assert_eq!(json["record"]["market"]["buyer_rate"], 7.5);
    let updated: Vec<&str> = json["updated"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap())
        .collect();
    assert!(updated.contains(&"market.buyer_rate"));
}

#[tokio::test]
async fn put_fields_is_all_or_nothing() {
    let dir = TempDir::new().unwrap();
    create_acme(&dir).await;

    let (status, _) = send(
        app(&dir),
        "PUT",
        "/api/reports/acme-cooling/fields",
        Some(json!({
            "funnel.leads": "500",
            "market.buyer_rate": "140"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, stored) = get(app(&dir), "/api/reports/acme-cooling").await;
    assert!(stored["funnel"].get("leads").is_none());
}

#[tokio::test]
async fn put_unknown_field_is_400() {
    let dir = TempDir::new().unwrap();
    create_acme(&dir).await;
    let (status, json) = send(
        app(&dir),
        "PUT",
        "/api/reports/acme-cooling/fields",
        Some(json!({ "market.nope": "1" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("market.nope"));
}

#[tokio::test]
async fn delete_report_then_404() {
    let dir = TempDir::new().unwrap();
    create_acme(&dir).await;

    let (status, json) = send(app(&dir), "DELETE", "/api/reports/acme-cooling", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["deleted"], "acme-cooling");

    let (status, _) = send(app(&dir), "DELETE", "/api/reports/acme-cooling", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Import
// ---------------------------------------------------------------------------

#[tokio::test]
async fn import_applies_lines_and_reports_skips() {
    let dir = TempDir::new().unwrap();
    create_acme(&dir).await;

    let paste = "Website: https://acme.example\nYearly Leads: 1,200\nFavorite color: blue\nOwner: N/A\n";
    let (status, json) = post_json(
        app(&dir),
        "/api/reports/acme-cooling/import",
        json!({ "paste": paste }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["applied"].as_array().unwrap().len(), 2);
    assert_eq!(json["skipped"].as_array().unwrap().len(), 2);
    assert_eq!(json["record"]["funnel"]["leads"], 1200.0);
    assert_eq!(json["record"]["raw_data"], paste);
    assert_eq!(json["record"]["client"]["company_name"], "Acme Cooling");
}

#[tokio::test]
async fn import_into_missing_report_is_404() {
    let dir = TempDir::new().unwrap();
    let (status, _) = post_json(
        app(&dir),
        "/api/reports/nobody/import",
        json!({ "paste": "Leads: 10" }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Views and metrics
// ---------------------------------------------------------------------------

#[tokio::test]
async fn view_includes_market_metrics() {
    let dir = TempDir::new().unwrap();
    create_acme(&dir).await;

    let (status, json) = get(app(&dir), "/api/reports/acme-cooling/view").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["slug"], "acme-cooling");
    let market = &json["metrics"]["market"];
    assert_eq!(market["total_buyers"], 5000.0);
    assert_eq!(market["total_market_revenue"], 10000000.0);
    assert_eq!(market["share"]["share_percent"], 10.0);
    assert_eq!(market["share"]["gap_percent"], 90.0);
}

#[tokio::test]
async fn metrics_for_unsaved_record() {
    let dir = TempDir::new().unwrap();
    let (status, json) = post_json(
        app(&dir),
        "/api/metrics",
        json!({
            "market": {
                "audience_size": 100000.0,
                "buyer_rate": 5.0,
                "annual_customer_value": 2000.0
            }
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["metrics"]["market"]["total_buyers"], 5000.0);
    assert!(json.get("share_url").is_none());

    let (_, list) = get(app(&dir), "/api/reports").await;
    assert_eq!(list, json!([]));
}

#[tokio::test]
async fn metrics_blank_when_inputs_missing() {
    let dir = TempDir::new().unwrap();
    let (status, json) = post_json(app(&dir), "/api/metrics", json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert!(json["metrics"]["market"]["total_buyers"].is_null());
    assert!(json["metrics"]["sba"].is_null());
}

#[tokio::test]
async fn metrics_rejects_non_object() {
    let dir = TempDir::new().unwrap();
    let (status, _) = post_json(app(&dir), "/api/metrics", json!([1, 2])).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

// ---------------------------------------------------------------------------
// Share links
// ---------------------------------------------------------------------------

#[tokio::test]
async fn share_link_resolves_to_view() {
    let dir = TempDir::new().unwrap();
    create_acme(&dir).await;

    let (status, json) = get(app(&dir), "/reports/acme-cooling").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["share_url"], "http://localhost:3141/reports/acme-cooling");
    assert_eq!(json["record"]["client"]["company_name"], "Acme Cooling");
}

#[tokio::test]
async fn share_link_text_format() {
    let dir = TempDir::new().unwrap();
    create_acme(&dir).await;

    let req = axum::http::Request::builder()
        .uri("/reports/acme-cooling?format=text")
        .body(axum::body::Body::empty())
        .unwrap();
    let response = app(&dir).oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(text.contains("Business Gap Analysis: Acme Cooling"));
    assert!(text.contains("$10,000,000"));
}

#[tokio::test]
async fn share_link_unknown_format_is_400() {
    let dir = TempDir::new().unwrap();
    create_acme(&dir).await;
    let (status, _) = get(app(&dir), "/reports/acme-cooling?format=pdf").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn share_link_missing_report_is_404() {
    let dir = TempDir::new().unwrap();
    let (status, _) = get(app(&dir), "/reports/nobody").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[tokio::test]
async fn share_base_url_comes_from_config() {
    let dir = TempDir::new().unwrap();
    let mut config = gapcheck_core::config::Config::default();
    config.share.base_url = "https://reports.example.com/".to_string();
    config.save(dir.path()).unwrap();

    let (_, json) = post_json(
        app(&dir),
        "/api/reports",
        json!({ "client": { "company_name": "Acme" } }),
    )
    .await;
    assert_eq!(json["share_url"], "https://reports.example.com/reports/acme");
}

#[tokio::test]
async fn redb_backend_serves_reports() {
    let dir = TempDir::new().unwrap();
    let mut config = gapcheck_core::config::Config::default();
    config.storage.backend = gapcheck_core::config::StorageBackend::Redb;
    config.save(dir.path()).unwrap();

    create_acme(&dir).await;
    let (status, json) = get(app(&dir), "/api/reports").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json[0]["slug"], "acme-cooling");
    assert!(dir.path().join(".gapcheck/reports.redb").exists());
}
