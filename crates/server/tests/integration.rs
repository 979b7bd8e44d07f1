//! Integration tests for the scribe server.
//!
//! The router runs against the in-memory store. The language model vendor is
//! replaced by a local axum server on an ephemeral port that speaks the
//! streaming event protocol, and bearer tokens are minted with the shared
//! test secret.

use axum::{
    Json, Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
    response::{IntoResponse, Response},
    routing::post,
};
use http_body_util::BodyExt;
use jsonwebtoken::{EncodingKey, Header, encode};
use serde_json::{Value as JsonValue, json};
use tower::ServiceExt;

use scribe_server::config::Config;
use scribe_server::db::{MemoryStore, Store};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const TEST_SECRET: &str = "test-jwt-secret";

fn token_for(user: &str) -> String {
    let exp = chrono::Utc::now().timestamp() + 3600;
    encode(
        &Header::default(),
        &json!({"sub": user, "exp": exp}),
        &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
    )
    .expect("Failed to sign token")
}

fn test_config() -> Config {
    Config {
        jwt_secret: Some(TEST_SECRET.to_string()),
        rate_limit_rps: 1000,
        ..Config::default()
    }
}

fn test_app() -> Router {
    app_with(test_config())
}

fn app_with(config: Config) -> Router {
    scribe_server::build_app(Store::Memory(MemoryStore::new()), &config)
}

/// Answer Messages API calls: an event stream for `stream: true`, otherwise a
/// single imaging extraction reply. Prompts containing REJECT get a 400.
/// Streamed prompts containing OVERLOAD fail with an error event after the
/// first delta; prompts containing TRUNCATE end without `message_stop`.
async fn mock_messages(Json(body): Json<JsonValue>) -> Response {
    let prompt = body["messages"][0]["content"].as_str().unwrap_or_default();
    if prompt.contains("REJECT") {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "type": "error",
                "error": {"type": "invalid_request_error", "message": "prompt rejected"}
            })),
        )
            .into_response();
    }

    if body["stream"] == json!(true) {
        let mut events = String::from(
            "event: message_start\ndata: {\"type\":\"message_start\",\"message\":{}}\n\n",
        );
        for piece in ["SUBJECTIVE: ", "Feels better. ", "PLAN: continue diuresis."] {
            let data = json!({
                "type": "content_block_delta",
                "index": 0,
                "delta": {"type": "text_delta", "text": piece}
            });
            events.push_str(&format!("event: content_block_delta\ndata: {}\n\n", data));
            if prompt.contains("OVERLOAD") {
                let error = json!({
                    "type": "error",
                    "error": {"type": "overloaded_error", "message": "Overloaded"}
                });
                events.push_str(&format!("event: error\ndata: {}\n\n", error));
                break;
            }
            if prompt.contains("TRUNCATE") {
                break;
            }
        }
        if !prompt.contains("TRUNCATE") {
            events.push_str("event: message_stop\ndata: {\"type\":\"message_stop\"}\n\n");
        }
        return ([(header::CONTENT_TYPE, "text/event-stream")], events).into_response();
    }

    let reply = json!({"studies": [{
        "date": "2024-09-15",
        "findings": [{"echo_name": "LVEF", "echo_value": "30-35%"}]
    }]});
    Json(json!({
        "id": "msg_test",
        "type": "message",
        "content": [{"type": "text", "text": reply.to_string()}]
    }))
    .into_response()
}

/// Start the fake vendor and return its messages endpoint
async fn start_mock_llm() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind mock server");
    let addr = listener.local_addr().expect("No local address");
    let app = Router::new().route("/v1/messages", post(mock_messages));
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Mock server failed");
    });
    format!("http://{}/v1/messages", addr)
}

async fn app_with_llm(llm_imaging: bool) -> Router {
    let url = start_mock_llm().await;
    app_with(Config {
        anthropic_api_key: Some("test-key".to_string()),
        anthropic_api_url: url,
        llm_imaging_extraction: llm_imaging,
        ..test_config()
    })
}

fn build_request(
    method: Method,
    uri: &str,
    user: Option<&str>,
    body: Option<JsonValue>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user) = user {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token_for(user)));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Send a request to the app and return (status, raw response body).
async fn request_raw(app: &Router, req: Request<Body>) -> (StatusCode, String) {
    let response = app.clone().oneshot(req).await.expect("Request failed");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("Failed to read body")
        .to_bytes();
    (status, String::from_utf8_lossy(&bytes).into_owned())
}

/// Send a request to the app and return (status, body as JSON).
async fn request(app: &Router, req: Request<Body>) -> (StatusCode, JsonValue) {
    let (status, text) = request_raw(app, req).await;
    let body = if text.is_empty() {
        JsonValue::Null
    } else {
        serde_json::from_str(&text).unwrap_or(JsonValue::Null)
    };
    (status, body)
}

async fn get(app: &Router, uri: &str, user: &str) -> (StatusCode, JsonValue) {
    request(app, build_request(Method::GET, uri, Some(user), None)).await
}

async fn post_json(
    app: &Router,
    uri: &str,
    user: &str,
    body: JsonValue,
) -> (StatusCode, JsonValue) {
    request(app, build_request(Method::POST, uri, Some(user), Some(body))).await
}

async fn patch_json(
    app: &Router,
    uri: &str,
    user: &str,
    body: JsonValue,
) -> (StatusCode, JsonValue) {
    request(app, build_request(Method::PATCH, uri, Some(user), Some(body))).await
}

async fn delete(app: &Router, uri: &str, user: &str) -> (StatusCode, JsonValue) {
    request(app, build_request(Method::DELETE, uri, Some(user), None)).await
}

fn patient_body() -> JsonValue {
    json!({
        "name": "Maria Garcia",
        "dateOfBirth": "1958-03-14",
        "mrn": "MRN-00123",
        "gender": "female"
    })
}

async fn create_patient(app: &Router, user: &str) -> String {
    let (status, body) = post_json(app, "/api/patients", user, patient_body()).await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().unwrap().to_string()
}

fn progress_note_body(patient_id: &str) -> JsonValue {
    json!({
        "patientId": patient_id,
        "encounter": {"dateOfService": "2024-10-05", "author": "Dr. Chen", "service": "Medicine"},
        "history": {"chiefComplaint": "Shortness of breath"},
        "assessment": {
            "summary": "66F with acute on chronic HFrEF",
            "problems": [{"name": "HFrEF exacerbation", "plan": ["IV furosemide 40 mg BID"]}]
        }
    })
}

// ---------------------------------------------------------------------------
// Public endpoints
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_reports_memory_store() {
    let app = test_app();
    let (status, body) = request(&app, build_request(Method::GET, "/health", None, None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["store"], "memory");
}

#[tokio::test]
async fn metadata_describes_capabilities() {
    let app = test_app();
    let (status, body) = request(&app, build_request(Method::GET, "/metadata", None, None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["service"], "scribe");
    assert_eq!(body["generationEnabled"], false);
    assert_eq!(body["noteTypes"].as_array().unwrap().len(), 5);
    assert!(
        body["extraction"]
            .as_array()
            .unwrap()
            .contains(&json!("imaging:ECHO"))
    );
}

#[tokio::test]
async fn metrics_endpoint_renders() {
    let app = test_app();
    let (status, _) = request_raw(&app, build_request(Method::GET, "/metrics", None, None)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn request_id_is_echoed() {
    let app = test_app();
    let req = Request::builder()
        .uri("/health")
        .header("X-Request-ID", "trace-123")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.headers()["x-request-id"], "trace-123");

    let response = app
        .oneshot(build_request(Method::GET, "/health", None, None))
        .await
        .unwrap();
    assert!(response.headers().contains_key("x-request-id"));
}

// ---------------------------------------------------------------------------
// Authentication and rate limiting
// ---------------------------------------------------------------------------

#[tokio::test]
async fn api_requires_valid_bearer_token() {
    let app = test_app();

    let (status, body) = request(&app, build_request(Method::GET, "/api/notes", None, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "not-authenticated");
    assert_eq!(body["message"], "Not authenticated");

    let req = Request::builder()
        .uri("/api/notes")
        .header(header::AUTHORIZATION, "Bearer not-a-token")
        .body(Body::empty())
        .unwrap();
    let (status, _) = request(&app, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn missing_secret_rejects_every_token() {
    let app = app_with(Config {
        rate_limit_rps: 1000,
        ..Config::default()
    });
    let (status, _) = get(&app, "/api/notes", "alice").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn rate_limit_returns_429() {
    let app = app_with(Config {
        rate_limit_rps: 1,
        ..test_config()
    });

    let (first, _) = get(&app, "/api/note-types", "alice").await;
    assert_eq!(first, StatusCode::OK);

    let (second, body) = get(&app, "/api/note-types", "alice").await;
    assert_eq!(second, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["error"], "throttled");
}

// ---------------------------------------------------------------------------
// Note generation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn generate_rejects_unauthenticated_before_validation() {
    let app = test_app();
    let req = build_request(Method::POST, "/api/generate", None, Some(json!({})));
    let (status, _) = request(&app, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn generate_validates_body() {
    let app = test_app();

    let (status, body) = post_json(
        &app,
        "/api/generate",
        "alice",
        json!({"noteType": "progress"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Missing required field: patientData");

    let (status, _) = post_json(
        &app,
        "/api/generate",
        "alice",
        json!({"noteType": "progress", "patientData": "   "}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = post_json(
        &app,
        "/api/generate",
        "alice",
        json!({"noteType": "soap", "patientData": "72M with CHF"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Unknown note type: soap");

    let req = Request::builder()
        .method(Method::POST)
        .uri("/api/generate")
        .header(header::AUTHORIZATION, format!("Bearer {}", token_for("alice")))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = request(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid");
}

#[tokio::test]
async fn generate_without_credential_is_500() {
    let app = test_app();
    let (status, body) = post_json(
        &app,
        "/api/generate",
        "alice",
        json!({"noteType": "progress", "patientData": "72M with CHF"}),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "exception");
}

#[tokio::test]
async fn generate_streams_concatenated_deltas() {
    let app = app_with_llm(false).await;
    let req = build_request(
        Method::POST,
        "/api/generate",
        Some("alice"),
        Some(json!({"noteType": "progress", "patientData": "72M with CHF, weight down 2 kg"})),
    );

    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/plain; charset=utf-8"
    );
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(
        String::from_utf8_lossy(&bytes),
        "SUBJECTIVE: Feels better. PLAN: continue diuresis."
    );
}

/// Run a generation whose headers succeed and return the body collection result
async fn generate_body(app: &Router, patient_data: &str) -> Result<String, String> {
    let req = build_request(
        Method::POST,
        "/api/generate",
        Some("alice"),
        Some(json!({"noteType": "progress", "patientData": patient_data})),
    );
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    match response.into_body().collect().await {
        Ok(collected) => Ok(String::from_utf8_lossy(&collected.to_bytes()).into_owned()),
        Err(e) => Err(e.to_string()),
    }
}

#[tokio::test]
async fn generate_error_event_mid_stream_aborts_body() {
    let app = app_with_llm(false).await;
    let result = generate_body(&app, "72M with CHF, OVERLOAD").await;
    assert!(result.is_err(), "body completed cleanly: {result:?}");
}

#[tokio::test]
async fn generate_truncated_stream_aborts_body() {
    let app = app_with_llm(false).await;
    let result = generate_body(&app, "72M with CHF, TRUNCATE").await;
    assert!(result.is_err(), "body completed cleanly: {result:?}");
}

#[tokio::test]
async fn generate_vendor_rejection_is_502() {
    let app = app_with_llm(false).await;
    let (status, body) = post_json(
        &app,
        "/api/generate",
        "alice",
        json!({"noteType": "consult", "patientData": "REJECT this request"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "upstream");
    assert!(body["message"].as_str().unwrap().contains("prompt rejected"));
}

#[tokio::test]
async fn note_types_catalog() {
    let app = test_app();
    let (status, body) = get(&app, "/api/note-types", "alice").await;
    assert_eq!(status, StatusCode::OK);

    let keys: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["key"].as_str().unwrap())
        .collect();
    assert_eq!(keys, vec!["progress", "hp", "consult", "discharge", "icu-tracker"]);
}

// ---------------------------------------------------------------------------
// Patients
// ---------------------------------------------------------------------------

#[tokio::test]
async fn patient_create_read_update() {
    let app = test_app();

    let (status, created) = post_json(&app, "/api/patients", "alice", patient_body()).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["ownerId"], "alice");
    assert_eq!(created["name"], "Maria Garcia");
    assert!(created["age"].as_u64().unwrap() >= 66);
    let id = created["id"].as_str().unwrap();

    let (status, read) = get(&app, &format!("/api/patients/{}", id), "alice").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(read["mrn"], "MRN-00123");

    let (status, updated) = patch_json(
        &app,
        &format!("/api/patients/{}", id),
        "alice",
        json!({"phone": "555-0100"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["phone"], "555-0100");
    assert_eq!(updated["name"], "Maria Garcia");
}

#[tokio::test]
async fn patient_required_fields() {
    let app = test_app();

    let (status, body) = post_json(
        &app,
        "/api/patients",
        "alice",
        json!({"name": "A", "dateOfBirth": "1990-01-01", "mrn": " "}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Missing required field: mrn");

    let (status, _) = post_json(
        &app,
        "/api/patients",
        "alice",
        json!({"name": "A", "mrn": "1"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn patient_owner_checks() {
    let app = test_app();
    let id = create_patient(&app, "alice").await;

    let (status, body) = get(&app, &format!("/api/patients/{}", id), "bob").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Not authorized");

    let (status, _) = patch_json(
        &app,
        &format!("/api/patients/{}", id),
        "bob",
        json!({"name": "Mallory"}),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let missing = uuid::Uuid::new_v4();
    let (status, body) = get(&app, &format!("/api/patients/{}", missing), "alice").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Patient not found");

    let (_, listing) = get(&app, "/api/patients", "bob").await;
    assert_eq!(listing["total"], 0);
}

// ---------------------------------------------------------------------------
// Generated notes
// ---------------------------------------------------------------------------

#[tokio::test]
async fn notes_are_listed_per_user_newest_first() {
    let app = test_app();

    for content in ["first note", "second note"] {
        let (status, _) = post_json(
            &app,
            "/api/notes",
            "alice",
            json!({"noteType": "progress", "content": content}),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }
    post_json(&app, "/api/notes", "bob", json!({"noteType": "hp", "content": "bob's"})).await;

    let (status, listing) = get(&app, "/api/notes", "alice").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listing["total"], 2);
    assert_eq!(listing["items"][0]["content"], "second note");
    assert_eq!(listing["items"][1]["content"], "first note");

    let (_, listing) = get(&app, "/api/notes", "bob").await;
    assert_eq!(listing["total"], 1);
    assert_eq!(listing["items"][0]["noteType"], "hp");
}

#[tokio::test]
async fn note_delete_is_owner_only() {
    let app = test_app();
    let (_, note) = post_json(
        &app,
        "/api/notes",
        "alice",
        json!({"noteType": "discharge", "content": "Discharged home."}),
    )
    .await;
    let uri = format!("/api/notes/{}", note["id"].as_str().unwrap());

    let (status, _) = delete(&app, &uri, "bob").await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = delete(&app, &uri, "alice").await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, JsonValue::Null);

    let (status, body) = get(&app, &uri, "alice").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Note not found");
}

#[tokio::test]
async fn note_rejects_unknown_type_and_blank_content() {
    let app = test_app();
    let (status, _) = post_json(
        &app,
        "/api/notes",
        "alice",
        json!({"noteType": "soap", "content": "x"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = post_json(
        &app,
        "/api/notes",
        "alice",
        json!({"noteType": "hp", "content": ""}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Tracker
// ---------------------------------------------------------------------------

#[tokio::test]
async fn tracker_lifecycle() {
    let app = test_app();

    let (status, row) = post_json(
        &app,
        "/api/tracker",
        "alice",
        json!({"name": "J. Doe", "room": "4B-12", "diagnosis": "CAP"}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(row["action"], "none");
    let uri = format!("/api/tracker/{}", row["id"].as_str().unwrap());

    let (status, updated) = patch_json(
        &app,
        &uri,
        "alice",
        json!({"action": "discharge", "dispositionNotes": "Home tomorrow"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["action"], "discharge");
    assert_eq!(updated["room"], "4B-12");

    let (status, _) = patch_json(&app, &uri, "alice", json!({"name": ""})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = delete(&app, &uri, "bob").await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = delete(&app, &uri, "alice").await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, listing) = get(&app, "/api/tracker", "alice").await;
    assert_eq!(listing["total"], 0);
}

// ---------------------------------------------------------------------------
// Progress notes
// ---------------------------------------------------------------------------

#[tokio::test]
async fn progress_note_requires_owned_patient() {
    let app = test_app();
    let patient_id = create_patient(&app, "alice").await;

    let (status, body) = post_json(
        &app,
        "/api/progress-notes",
        "bob",
        progress_note_body(&patient_id),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Patient not found");

    let missing = uuid::Uuid::new_v4().to_string();
    let (status, _) = post_json(
        &app,
        "/api/progress-notes",
        "alice",
        progress_note_body(&missing),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn progress_note_signing_workflow() {
    let app = test_app();
    let patient_id = create_patient(&app, "alice").await;

    let mut body = progress_note_body(&patient_id);
    body["status"] = json!("cosigned");
    let (status, note) = post_json(&app, "/api/progress-notes", "alice", body).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(note["status"], "draft");
    let uri = format!("/api/progress-notes/{}", note["id"].as_str().unwrap());

    let (status, body) = post_json(
        &app,
        &format!("{}/cosign", uri),
        "alice",
        json!({"name": "Dr. Patel"}),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "conflict");

    let (status, edited) = patch_json(
        &app,
        &uri,
        "alice",
        json!({"plan": {"items": ["Daily weights"]}}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(edited["plan"]["items"][0], "Daily weights");

    let (status, signed) = post_json(
        &app,
        &format!("{}/sign", uri),
        "alice",
        json!({"name": "Dr. Chen"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(signed["status"], "signed");
    assert_eq!(signed["attestation"]["provider"]["name"], "Dr. Chen");
    assert!(
        signed["attestation"]["provider"]["statement"]
            .as_str()
            .unwrap()
            .starts_with("Electronically signed by Dr. Chen on ")
    );

    let (status, _) = post_json(
        &app,
        &format!("{}/sign", uri),
        "alice",
        json!({"name": "Dr. Chen"}),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = patch_json(&app, &uri, "alice", json!({"plan": {"items": []}})).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, cosigned) = post_json(
        &app,
        &format!("{}/cosign", uri),
        "alice",
        json!({"name": "Dr. Patel", "statement": "Seen and agree."}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cosigned["status"], "cosigned");
    assert_eq!(cosigned["attestation"]["cosigner"]["statement"], "Seen and agree.");

    let (status, _) = get(&app, &uri, "bob").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn progress_notes_filter_by_patient() {
    let app = test_app();
    let first = create_patient(&app, "alice").await;
    let second = create_patient(&app, "alice").await;

    post_json(&app, "/api/progress-notes", "alice", progress_note_body(&first)).await;
    post_json(&app, "/api/progress-notes", "alice", progress_note_body(&second)).await;
    post_json(&app, "/api/progress-notes", "alice", progress_note_body(&second)).await;

    let (_, all) = get(&app, "/api/progress-notes", "alice").await;
    assert_eq!(all["total"], 3);

    let (status, filtered) = get(
        &app,
        &format!("/api/progress-notes?patientId={}", second),
        "alice",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(filtered["total"], 2);
    assert!(
        filtered["items"]
            .as_array()
            .unwrap()
            .iter()
            .all(|n| n["patientId"] == second.as_str())
    );
}

// ---------------------------------------------------------------------------
// Extraction
// ---------------------------------------------------------------------------

#[tokio::test]
async fn extract_labs_groups_by_date() {
    let app = test_app();
    let (status, body) = post_json(
        &app,
        "/api/extract/labs",
        "alice",
        json!({"text": "On 10/05/2024: Cr 1.3 mg/dL, ALT 24 U/L"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["date"], "2024-10-05");
    let labs = body[0]["labs"].as_array().unwrap();
    assert!(labs.contains(&json!({"lab_name": "Creatinine", "lab_value": "1.3 mg/dL"})));

    let (_, body) = post_json(
        &app,
        "/api/extract/labs",
        "alice",
        json!({"text": "Patient resting."}),
    )
    .await;
    assert_eq!(body, json!("No Data"));

    let (status, _) = post_json(&app, "/api/extract/labs", "alice", json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn extract_imaging_rule_based() {
    let app = test_app();
    let text = "ECHO 09/15/2024: LVEF 35%, mild MR\nCT chest 09/14/2024: No PE";

    let (status, body) = post_json(
        &app,
        "/api/extract/imaging",
        "alice",
        json!({"text": text}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let echo = &body["ECHO"][0];
    assert_eq!(echo["date"], "2024-09-15");
    assert!(
        echo["findings"]
            .as_array()
            .unwrap()
            .contains(&json!({"finding_name": "Ejection Fraction", "finding_value": "35%"}))
    );
    assert!(body["CT"].is_array());

    let (_, only_ct) = post_json(
        &app,
        "/api/extract/imaging",
        "alice",
        json!({"text": text, "modalities": ["ct"]}),
    )
    .await;
    assert!(only_ct.get("ECHO").is_none());
    assert!(only_ct["CT"].is_array());

    let (_, combined) = post_json(
        &app,
        "/api/extract/imaging",
        "alice",
        json!({"text": text, "combineByDate": true}),
    )
    .await;
    assert_eq!(combined[0]["date"], "2024-09-15");
    assert_eq!(combined[0]["is_latest"], true);
}

#[tokio::test]
async fn extract_imaging_edge_cases() {
    let app = test_app();

    let (status, body) = post_json(
        &app,
        "/api/extract/imaging",
        "alice",
        json!({"text": "Patient ambulating in the hallway."}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "No imaging data found");

    let (status, body) = post_json(
        &app,
        "/api/extract/imaging",
        "alice",
        json!({"text": "PET scan", "modalities": ["PET"]}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("Unknown modality: PET"));
}

#[tokio::test]
async fn extract_imaging_with_model() {
    let app = app_with_llm(true).await;
    let (status, body) = post_json(
        &app,
        "/api/extract/imaging",
        "alice",
        json!({"text": "ECHO 09/15/2024: LVEF 35%, mild MR"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let echo = &body["ECHO"][0];
    assert_eq!(echo["date"], "2024-09-15");
    assert_eq!(echo["source_text"], "ECHO report");
    assert_eq!(
        echo["findings"],
        json!([{"finding_name": "LVEF", "finding_value": "30-35%"}])
    );
}
