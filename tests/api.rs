use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use brick_quote::{
    api::{router, AppState},
    error::EstimateError,
    provider::{ImageSource, VisionProvider},
    store::JobStore,
};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

struct CannedProvider(Result<String, EstimateError>);

#[async_trait]
impl VisionProvider for CannedProvider {
    fn name(&self) -> &str {
        "canned"
    }

    async fn complete(&self, _: &str, _: &str, _: &ImageSource) -> Result<String, EstimateError> {
        self.0.clone()
    }
}

/// Remembers the image URL of the last request and answers with a fixed estimate.
#[derive(Default)]
struct RecordingProvider {
    last_image: Mutex<Option<String>>,
}

#[async_trait]
impl VisionProvider for RecordingProvider {
    fn name(&self) -> &str {
        "recording"
    }

    async fn complete(&self, _: &str, _: &str, image: &ImageSource) -> Result<String, EstimateError> {
        *self.last_image.lock().unwrap() = Some(image.to_url());
        Ok(estimate_json().to_string())
    }
}

fn estimate_json() -> Value {
    json!({
        "area_m2": 20,
        "brick_count_range": [2000, 3000],
        "materials": {"sand_kg_range": [400, 600], "cement_bags_range": [4, 6], "other": []},
        "labour_hours_range": [20, 30],
        "recommended_price_gbp_range": [2500, 3500],
        "assumptions": ["Wall height 1.2m"],
        "exclusions": ["Footings"],
        "notes": []
    })
}

fn job_inputs() -> Value {
    json!({
        "jobType": "Brickwork",
        "anchorType": "length",
        "anchorValue": 4.5,
        "difficulty": "Standard",
        "hasOpenings": false
    })
}

fn app(reply: Result<String, EstimateError>, dir: &tempfile::TempDir) -> Router {
    let store = JobStore::open(dir.path()).unwrap();
    let state = AppState::new(Arc::new(CannedProvider(reply)), store).unwrap();
    router(Arc::new(state))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(body.map_or_else(Body::empty, |b| Body::from(b.to_string())))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn estimate_passes_through_model_answer() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(Ok(estimate_json().to_string()), &dir);
    let (status, body) = send(
        &app,
        "POST",
        "/api/estimate",
        Some(json!({"inputs": job_inputs(), "imageUrl": "https://example.com/wall.jpg"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["area_m2"], 20.0);
}

#[tokio::test]
async fn estimate_requires_an_image() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(Ok(estimate_json().to_string()), &dir);
    let (status, body) = send(&app, "POST", "/api/estimate", Some(json!({"inputs": job_inputs()}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn estimate_rejects_bad_anchor_and_unknown_job_type() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(Ok(estimate_json().to_string()), &dir);

    let mut inputs = job_inputs();
    inputs["anchorValue"] = json!(150);
    let (status, body) = send(
        &app,
        "POST",
        "/api/estimate",
        Some(json!({"inputs": inputs, "imageBase64": "QUJD"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_INPUT");

    let mut inputs = job_inputs();
    inputs["jobType"] = json!("Plastering");
    let (status, _) = send(
        &app,
        "POST",
        "/api/estimate",
        Some(json!({"inputs": inputs, "imageBase64": "QUJD"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn provider_and_parse_failures_are_reported() {
    let dir = tempfile::tempdir().unwrap();
    let request = json!({"inputs": job_inputs(), "imageBase64": "QUJD"});

    let failing = app(Err(EstimateError::provider(Some(500), "upstream down")), &dir);
    let (status, body) = send(&failing, "POST", "/api/estimate", Some(request.clone())).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "upstream down");

    let garbled = app(Ok("not json".into()), &dir);
    let (status, body) = send(&garbled, "POST", "/api/estimate", Some(request)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "UNPARSABLE_RESPONSE");
}

#[tokio::test]
async fn price_endpoint_returns_breakdown() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(Ok(String::new()), &dir);
    let (status, body) = send(
        &app,
        "POST",
        "/api/price",
        Some(json!({
            "estimate": estimate_json(),
            "jobType": "Brickwork",
            "pricing": {
                "method": "per_1000_bricks",
                "dayRate": 220,
                "ratePer1000": 500,
                "ratePerM2": 65,
                "materialMarkup": 10,
                "includeVAT": false,
                "vatRate": 20
            }
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["labourLow"], 1000);
    assert_eq!(body["labourHigh"], 1500);
    assert_eq!(body["vatLow"], 0);
    assert_eq!(body["totalLow"], body["subtotalLow"]);
}

#[tokio::test]
async fn saved_jobs_lifecycle() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(Ok(String::new()), &dir);

    let (status, saved) = send(
        &app,
        "POST",
        "/api/jobs",
        Some(json!({"inputs": job_inputs(), "outputs": estimate_json()})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = saved["id"].as_str().unwrap().to_string();

    let (status, listed) = send(&app, "GET", "/api/jobs", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 1);
    assert_eq!(listed[0]["pricing"]["labourLow"], 550);

    let (status, quote) = send(&app, "GET", &format!("/api/jobs/{id}/quote"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(quote["jobTitle"], "BRICKWORK");
    assert_eq!(quote["breakdown"][0]["value"], "£550 – £825");

    let (status, _) = send(&app, "DELETE", &format!("/api/jobs/{id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, "GET", &format!("/api/jobs/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn settings_update_changes_default_pricing() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(Ok(String::new()), &dir);

    let (_, mut settings) = send(&app, "GET", "/api/settings", None).await;
    assert_eq!(settings["defaultDayRate"], 220.0);
    settings["defaultDayRate"] = json!(240);
    settings["vatRegistered"] = json!(true);
    let (status, _) = send(&app, "PUT", "/api/settings", Some(settings)).await;
    assert_eq!(status, StatusCode::OK);

    send(
        &app,
        "POST",
        "/api/jobs",
        Some(json!({"inputs": job_inputs(), "outputs": estimate_json()})),
    )
    .await;
    let (_, listed) = send(&app, "GET", "/api/jobs", None).await;
    // 20h / 8 x £240
    assert_eq!(listed[0]["pricing"]["labourLow"], 600);
    assert!(listed[0]["pricing"]["vatLow"].as_u64().unwrap() > 0);
}

#[tokio::test]
async fn estimate_keeps_image_analysis() {
    let dir = tempfile::tempdir().unwrap();
    let mut answer = estimate_json();
    answer["image_analysis"] = json!("Low garden wall, about six courses");
    let app = app(Ok(answer.to_string()), &dir);
    let (status, body) = send(
        &app,
        "POST",
        "/api/estimate",
        Some(json!({"inputs": job_inputs(), "imageBase64": "QUJD"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["image_analysis"], "Low garden wall, about six courses");
}

#[tokio::test]
async fn inline_photo_media_type_follows_photo_uri() {
    let dir = tempfile::tempdir().unwrap();
    let provider = Arc::new(RecordingProvider::default());
    let store = JobStore::open(dir.path()).unwrap();
    let app = router(Arc::new(AppState::new(provider.clone(), store).unwrap()));

    let mut inputs = job_inputs();
    inputs["photoUri"] = json!("file:///var/mobile/photos/wall.png");
    let (status, _) = send(
        &app,
        "POST",
        "/api/estimate",
        Some(json!({"inputs": inputs, "imageBase64": "QUJD"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        provider.last_image.lock().unwrap().as_deref(),
        Some("data:image/png;base64,QUJD")
    );
}

#[tokio::test]
async fn price_rejects_inverted_ranges() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(Ok(String::new()), &dir);
    let mut estimate = estimate_json();
    estimate["brick_count_range"] = json!([3000, 2000]);
    let (status, body) = send(
        &app,
        "POST",
        "/api/price",
        Some(json!({
            "estimate": estimate,
            "jobType": "Brickwork",
            "pricing": {
                "method": "per_1000_bricks",
                "dayRate": 220,
                "ratePer1000": 500,
                "ratePerM2": 65,
                "materialMarkup": 10,
                "includeVAT": false,
                "vatRate": 20
            }
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_INPUT");
}

#[tokio::test]
async fn degenerate_outputs_are_not_saved() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(Ok(String::new()), &dir);
    let empty = json!({
        "area_m2": 0,
        "brick_count_range": [0, 0],
        "materials": {"sand_kg_range": [0, 0], "cement_bags_range": [0, 0], "other": []},
        "labour_hours_range": [0, 0],
        "recommended_price_gbp_range": [0, 0]
    });
    let (status, body) = send(
        &app,
        "POST",
        "/api/jobs",
        Some(json!({"inputs": job_inputs(), "outputs": empty})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_INPUT");

    let mut inverted = estimate_json();
    inverted["labour_hours_range"] = json!([30, 20]);
    let (status, _) = send(
        &app,
        "POST",
        "/api/jobs",
        Some(json!({"inputs": job_inputs(), "outputs": inverted})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, listed) = send(&app, "GET", "/api/jobs", None).await;
    assert_eq!(listed.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn settings_update_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(Ok(String::new()), &dir);
    let (_, mut settings) = send(&app, "GET", "/api/settings", None).await;
    settings["companyName"] = json!("Acme Brickwork");
    let (status, _) = send(&app, "PUT", "/api/settings", Some(settings)).await;
    assert_eq!(status, StatusCode::OK);

    let restarted = AppState::new(
        Arc::new(CannedProvider(Ok(String::new()))),
        JobStore::open(dir.path()).unwrap(),
    )
    .unwrap();
    assert_eq!(restarted.settings.read().await.company_name, "Acme Brickwork");
}
