//! Integration test harness for the Silver Connect portal.
//!
//! Each test starts a scripted stand-in for the REST backend and a portal
//! wired to it, both on ephemeral local ports, and drives the portal over
//! HTTP with a client that keeps cookies and does not follow redirects.
//!
//! ```rust,ignore
//! let backend = FakeBackend::new();
//! let portal = TestPortal::start(backend).await;
//! let response = portal.get("/health").await;
//! assert_eq!(response.text().await.unwrap(), "ok");
//! ```

#![allow(clippy::missing_panics_doc)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri, header::AUTHORIZATION};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde_json::{Value, json};
use silver_connect_portal::config::{ApiConfig, PortalConfig};
use silver_connect_portal::state::AppState;
use tokio::net::TcpListener;
use tokio::sync::Mutex;

// =============================================================================
// Fake Backend
// =============================================================================

/// A request the fake backend received.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub path: String,
    pub authorization: Option<String>,
    pub body: Value,
}

#[derive(Default)]
struct Script {
    answers: HashMap<(Method, String), (StatusCode, Value)>,
    log: Vec<Recorded>,
}

/// Scripted stand-in for the Silver Connect REST backend.
///
/// Every request is recorded. Unscripted requests answer
/// `404 {"message": "Not found"}`.
#[derive(Clone, Default)]
pub struct FakeBackend {
    script: Arc<Mutex<Script>>,
}

impl FakeBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `method path` with `status` and a JSON body.
    pub async fn answer(&self, method: Method, path: &str, status: StatusCode, body: Value) {
        self.script
            .lock()
            .await
            .answers
            .insert((method, path.to_string()), (status, body));
    }

    /// Answer `method path` with `200` and a JSON body.
    pub async fn ok(&self, method: Method, path: &str, body: Value) {
        self.answer(method, path, StatusCode::OK, body).await;
    }

    /// Everything received so far, oldest first.
    pub async fn requests(&self) -> Vec<Recorded> {
        self.script.lock().await.log.clone()
    }

    /// Requests received for `method path`.
    pub async fn requests_to(&self, method: Method, path: &str) -> Vec<Recorded> {
        self.requests()
            .await
            .into_iter()
            .filter(|r| r.method == method && r.path == path)
            .collect()
    }

    async fn serve(self) -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind fake backend");
        let addr = listener.local_addr().expect("fake backend address");
        let app = Router::new().fallback(respond).with_state(self);

        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("fake backend");
        });

        addr
    }
}

async fn respond(
    State(backend): State<FakeBackend>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = uri.path().to_string();
    let mut script = backend.script.lock().await;

    script.log.push(Recorded {
        method: method.clone(),
        path: path.clone(),
        authorization: headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body: serde_json::from_slice(&body).unwrap_or(Value::Null),
    });

    let (status, answer) = script
        .answers
        .get(&(method, path))
        .cloned()
        .unwrap_or_else(|| (StatusCode::NOT_FOUND, json!({"message": "Not found"})));

    (status, Json(answer)).into_response()
}

// =============================================================================
// Portal
// =============================================================================

/// A running portal and the client driving it.
pub struct TestPortal {
    pub url: String,
    pub client: reqwest::Client,
    pub backend: FakeBackend,
}

impl TestPortal {
    /// Start a portal in front of `backend`.
    ///
    /// Google sign-in and the contact mailer are left unconfigured.
    pub async fn start(backend: FakeBackend) -> Self {
        let backend_addr = backend.clone().serve().await;

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind portal");
        let addr = listener.local_addr().expect("portal address");
        let url = format!("http://{addr}");

        let state = AppState::new(test_config(addr, &format!("http://{backend_addr}")))
            .expect("portal state");
        let app = silver_connect_portal::app(state);

        tokio::spawn(async move {
            axum::serve(
                listener,
                app.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .await
            .expect("portal");
        });

        let client = reqwest::Client::builder()
            .cookie_store(true)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .expect("HTTP client");

        Self {
            url,
            client,
            backend,
        }
    }

    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.url)
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client
            .get(self.url(path))
            .send()
            .await
            .expect("GET portal")
    }

    pub async fn post_form(&self, path: &str, form: &[(&str, &str)]) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .form(form)
            .send()
            .await
            .expect("POST portal")
    }

    /// Sign in through `/login` as `user`, holding `token`.
    ///
    /// Returns the login response, a redirect to the account's landing.
    pub async fn sign_in(&self, user: Value, token: &str) -> reqwest::Response {
        let email = user["email"].as_str().unwrap_or("member@example.in").to_string();
        self.backend
            .ok(
                Method::POST,
                "/api/auth/login",
                json!({"user": user, "token": token}),
            )
            .await;

        self.post_form("/login", &[("email", &email), ("password", "correct-horse")])
            .await
    }
}

fn test_config(addr: SocketAddr, backend_url: &str) -> PortalConfig {
    PortalConfig {
        host: addr.ip(),
        port: addr.port(),
        base_url: format!("http://{addr}"),
        api: ApiConfig {
            base_url: backend_url.to_string(),
            timeout: Duration::from_secs(5),
        },
        google_client_id: None,
        emailjs: None,
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 0.0,
        sentry_traces_sample_rate: 0.0,
    }
}

// =============================================================================
// Fixtures
// =============================================================================

/// An account record as the backend returns it.
#[must_use]
pub fn member(id: &str, name: &str, role: &str, verified: bool) -> Value {
    let handle = name.split_whitespace().next().unwrap_or("member");
    let email = format!("{}@example.in", handle.to_lowercase());
    json!({
        "_id": id,
        "name": name,
        "email": email,
        "role": role,
        "isVerified": verified,
    })
}

/// An unsigned JWT whose `exp` is `offset_secs` from now.
#[must_use]
pub fn token_expiring_in(offset_secs: i64) -> String {
    let exp = chrono::Utc::now().timestamp() + offset_secs;
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let claims = URL_SAFE_NO_PAD.encode(json!({"id": "u1", "exp": exp}).to_string());
    format!("{header}.{claims}.signature")
}

/// A token valid for the next hour.
#[must_use]
pub fn fresh_token() -> String {
    token_expiring_in(3600)
}

/// The `Location` header of a redirect.
#[must_use]
pub fn location(response: &reqwest::Response) -> Option<&str> {
    response
        .headers()
        .get(reqwest::header::LOCATION)
        .and_then(|v| v.to_str().ok())
}
