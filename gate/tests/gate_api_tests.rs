use std::sync::Arc;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use sessionlock::{
    DeviceSession, FixedClock, LockTimestamp, MemoryKeyStore, P256Provider, TokenVerifier,
    ValidationResult,
};
use sessionlock_gate::{
    build_router, AppState, ErrorResponse, HealthResponse, ProtectedResponse, VerifyRequest,
    VerifyResponse,
};

const T0: u64 = 1_684_000_000_000;

struct TestGate {
    base: String,
    clock: Arc<FixedClock>,
    device: DeviceSession,
}

impl TestGate {
    /// Moves the shared clock to `T0 + offset_ms`.
    fn at(&self, offset_ms: u64) {
        self.clock.set(LockTimestamp::from_millis(T0 + offset_ms));
    }

    /// Enrolls the device and locks a JWT bound to it at `T0`.
    async fn locked_token(&self) -> String {
        let public_key = self.device.generate_key_pair().await.unwrap();
        self.at(0);
        self.device.lock_token(&make_jwt(&public_key)).await.unwrap()
    }

    async fn verify(&self, request: &VerifyRequest) -> reqwest::Response {
        reqwest::Client::new()
            .post(format!("{}/api/v1/verify", self.base))
            .json(request)
            .send()
            .await
            .unwrap()
    }

    async fn protected(&self, authorization: Option<&str>) -> reqwest::Response {
        let mut request = reqwest::Client::new().get(format!("{}/api/v1/protected", self.base));
        if let Some(value) = authorization {
            request = request.header("authorization", value);
        }
        request.send().await.unwrap()
    }
}

fn make_jwt(public_key: &str) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD
        .encode(serde_json::json!({ "username": "alice", "publicKey": public_key }).to_string());
    format!("{header}.{payload}.aXNzdWVyLXNpZw")
}

/// Spin up the gate on an OS-assigned port with a device sharing its clock.
async fn spawn_test_gate() -> TestGate {
    let clock = Arc::new(FixedClock::new(LockTimestamp::from_millis(T0)));
    let verifier = TokenVerifier::new(Arc::new(P256Provider::new()), clock.clone());
    let app = build_router(AppState::new(verifier));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let device = DeviceSession::with_parts(
        Arc::new(P256Provider::new()),
        Arc::new(MemoryKeyStore::new()),
        clock.clone(),
    );
    TestGate {
        base: format!("http://127.0.0.1:{}", port),
        clock,
        device,
    }
}

fn verify_request(token: &str) -> VerifyRequest {
    VerifyRequest {
        token: token.to_string(),
        freshness_window_ms: None,
    }
}

// ── Health ──────────────────────────────────────────────────────

#[tokio::test]
async fn health_endpoint_reports_ok() {
    let gate = spawn_test_gate().await;
    let resp = reqwest::get(format!("{}/api/v1/health", gate.base))
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    let body: HealthResponse = resp.json().await.unwrap();
    assert_eq!(body.status, "ok");
}

#[tokio::test]
async fn unknown_route_returns_404() {
    let gate = spawn_test_gate().await;
    let resp = reqwest::get(format!("{}/api/v1/nonexistent", gate.base))
        .await
        .unwrap();

    assert_eq!(resp.status(), 404);
}

// ── Verify endpoint ─────────────────────────────────────────────

#[tokio::test]
async fn verify_endpoint_accepts_fresh_token() {
    let gate = spawn_test_gate().await;
    let token = gate.locked_token().await;
    gate.at(100);

    let resp = gate.verify(&verify_request(&token)).await;
    assert_eq!(resp.status(), 200);

    let body: VerifyResponse = resp.json().await.unwrap();
    assert_eq!(body.result, ValidationResult::Valid);
}

#[tokio::test]
async fn verify_endpoint_uses_snake_case_results() {
    let gate = spawn_test_gate().await;
    let token = gate.locked_token().await;
    gate.at(5_000);

    let body: serde_json::Value = gate
        .verify(&verify_request(&token))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(body, serde_json::json!({ "result": "token_expired" }));
}

#[tokio::test]
async fn verify_endpoint_reports_forged_signature() {
    let gate = spawn_test_gate().await;
    let token = gate.locked_token().await;
    let (signed_part, _) = token.rsplit_once('.').unwrap();
    let forged = format!("{signed_part}.{}", "A".repeat(86) + "==");
    gate.at(100);

    let body: VerifyResponse = gate.verify(&verify_request(&forged)).await.json().await.unwrap();
    assert_eq!(body.result, ValidationResult::InvalidSignature);
}

#[tokio::test]
async fn verify_endpoint_honours_requested_window() {
    let gate = spawn_test_gate().await;
    let token = gate.locked_token().await;
    gate.at(5_000);

    let request = VerifyRequest {
        token,
        freshness_window_ms: Some(10_000),
    };
    let body: VerifyResponse = gate.verify(&request).await.json().await.unwrap();
    assert_eq!(body.result, ValidationResult::Valid);
}

#[tokio::test]
async fn verify_endpoint_rejects_malformed_token() {
    let gate = spawn_test_gate().await;

    let resp = gate.verify(&verify_request("only.three.segments")).await;
    assert_eq!(resp.status(), 400);

    let body: ErrorResponse = resp.json().await.unwrap();
    assert!(body.error.starts_with("malformed token"));
}

#[tokio::test]
async fn verify_endpoint_rejects_missing_token_field() {
    let gate = spawn_test_gate().await;
    let resp = reqwest::Client::new()
        .post(format!("{}/api/v1/verify", gate.base))
        .json(&serde_json::json!({ "freshness_window_ms": 10 }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 422);
    let body: ErrorResponse = resp.json().await.unwrap();
    assert!(body.error.contains("token"), "{}", body.error);
}

#[tokio::test]
async fn verify_endpoint_rejects_non_json_body_with_json_error() {
    let gate = spawn_test_gate().await;
    let resp = reqwest::Client::new()
        .post(format!("{}/api/v1/verify", gate.base))
        .header("content-type", "text/plain")
        .body("not json")
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 415);
    assert_eq!(
        resp.headers()["content-type"].to_str().unwrap(),
        "application/json"
    );
    let body: ErrorResponse = resp.json().await.unwrap();
    assert!(!body.error.is_empty());
}

#[tokio::test]
async fn verify_endpoint_rejects_broken_json_with_json_error() {
    let gate = spawn_test_gate().await;
    let resp = reqwest::Client::new()
        .post(format!("{}/api/v1/verify", gate.base))
        .header("content-type", "application/json")
        .body("{\"token\": ")
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 400);
    let body: ErrorResponse = resp.json().await.unwrap();
    assert!(!body.error.is_empty());
}

// ── Protected route ─────────────────────────────────────────────

#[tokio::test]
async fn protected_route_admits_valid_bearer() {
    let gate = spawn_test_gate().await;
    let token = gate.locked_token().await;
    gate.at(100);

    let resp = gate.protected(Some(&format!("Bearer {token}"))).await;
    assert_eq!(resp.status(), 200);

    let body: ProtectedResponse = resp.json().await.unwrap();
    assert_eq!(body.status, "authorized");
    assert_eq!(body.client_timestamp, LockTimestamp::from_millis(T0));
    assert_eq!(
        body.public_key,
        sessionlock::split_locked_token(&token).unwrap().public_key
    );
}

#[tokio::test]
async fn protected_route_requires_authorization_header() {
    let gate = spawn_test_gate().await;

    let resp = gate.protected(None).await;
    assert_eq!(resp.status(), 401);

    let body: ErrorResponse = resp.json().await.unwrap();
    assert_eq!(body.error, "unauthorized");
}

#[tokio::test]
async fn protected_route_rejects_other_schemes() {
    let gate = spawn_test_gate().await;
    let token = gate.locked_token().await;
    gate.at(100);

    let resp = gate.protected(Some(&format!("Basic {token}"))).await;
    assert_eq!(resp.status(), 401);
}

#[tokio::test]
async fn protected_route_rejects_expired_token() {
    let gate = spawn_test_gate().await;
    let token = gate.locked_token().await;
    gate.at(5_000);

    let resp = gate.protected(Some(&format!("Bearer {token}"))).await;
    assert_eq!(resp.status(), 401);
}

#[tokio::test]
async fn protected_route_rejects_bare_jwt() {
    let gate = spawn_test_gate().await;
    let public_key = gate.device.generate_key_pair().await.unwrap();

    let resp = gate
        .protected(Some(&format!("Bearer {}", make_jwt(&public_key))))
        .await;
    assert_eq!(resp.status(), 401);
}

#[tokio::test]
async fn protected_route_rejects_reenrolled_device_token() {
    let gate = spawn_test_gate().await;
    let token = gate.locked_token().await;
    // Re-enrollment replaces the key the old JWT was bound to.
    gate.device.generate_key_pair().await.unwrap();
    let (jwt, _) = token.split_at(token.find(&format!(".{T0}.")).unwrap());
    let relocked = gate.device.lock_token(jwt).await.unwrap();
    gate.at(100);

    let resp = gate.protected(Some(&format!("Bearer {relocked}"))).await;
    assert_eq!(resp.status(), 401);
}
