//! Integration tests for the Lecas storefront client.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p lecas-integration-tests
//! ```
//!
//! Tests talk to a [`MockBackend`], an in-process axum server bound to an
//! ephemeral port, so no real backend is needed.
//!
//! # Test Categories
//!
//! - `api_client` - request helpers and error mapping
//! - `auth_refresh` - the refresh endpoint contract
//! - `token_refresh` - scheduler over a state file
//! - `client_state` - cart, wishlist and session persistence

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use lecas_storefront::api::auth::REFRESH_PATH;
use lecas_storefront::{ApiClient, ApiError};
use serde::Deserialize;
use serde_json::json;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use url::Url;

/// Bearer token the mock accepts on protected routes.
pub const VALID_BEARER: &str = "valid-bearer";

/// How the mock answers refresh requests.
#[derive(Debug, Clone)]
pub enum RefreshBehavior {
    /// 200 with new credentials.
    Issue {
        access_token: String,
        refresh_token: Option<String>,
    },
    /// 401 with a `detail` body.
    Reject,
    /// 500 with a plain-text body.
    Fail,
}

#[derive(Debug)]
struct MockState {
    behavior: Mutex<RefreshBehavior>,
    refresh_calls: AtomicUsize,
    last_refresh_token: Mutex<Option<String>>,
}

/// In-process stand-in for the Lecas backend.
///
/// Routes:
/// - `POST /api/v1/auth/refresh` - answers per [`RefreshBehavior`]
/// - `GET /api/v1/me` - profile, requires [`VALID_BEARER`]
/// - `POST /api/v1/orders` - 201 for a non-empty cart, 422 otherwise
///
/// The server stops when the value is dropped.
#[derive(Debug)]
pub struct MockBackend {
    addr: SocketAddr,
    state: Arc<MockState>,
    task: JoinHandle<()>,
}

impl MockBackend {
    /// Bind to an ephemeral port and start serving.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the listener cannot be bound.
    pub async fn start(behavior: RefreshBehavior) -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let state = Arc::new(MockState {
            behavior: Mutex::new(behavior),
            refresh_calls: AtomicUsize::new(0),
            last_refresh_token: Mutex::new(None),
        });

        let app = Router::new()
            .route(REFRESH_PATH, post(refresh))
            .route("/api/v1/me", get(me))
            .route("/api/v1/orders", post(create_order))
            .with_state(state.clone());

        let task = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self { addr, state, task })
    }

    /// Base URL of the running server.
    ///
    /// # Errors
    ///
    /// Returns a parse error if the bound address does not form a URL.
    pub fn url(&self) -> Result<Url, url::ParseError> {
        Url::parse(&format!("http://{}", self.addr))
    }

    /// A client pointed at this server.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the client cannot be built.
    pub fn client(&self) -> Result<ApiClient, ApiError> {
        ApiClient::new(self.url()?, Duration::from_secs(5))
    }

    /// Change how later refresh requests are answered.
    pub fn set_behavior(&self, behavior: RefreshBehavior) {
        *self
            .state
            .behavior
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = behavior;
    }

    /// Number of refresh requests received.
    #[must_use]
    pub fn refresh_calls(&self) -> usize {
        self.state.refresh_calls.load(Ordering::SeqCst)
    }

    /// Refresh token sent with the most recent refresh request.
    #[must_use]
    pub fn last_refresh_token(&self) -> Option<String> {
        self.state
            .last_refresh_token
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[derive(Deserialize)]
struct RefreshBody {
    refresh_token: String,
}

async fn refresh(State(state): State<Arc<MockState>>, Json(body): Json<RefreshBody>) -> Response {
    state.refresh_calls.fetch_add(1, Ordering::SeqCst);
    *state
        .last_refresh_token
        .lock()
        .unwrap_or_else(PoisonError::into_inner) = Some(body.refresh_token);

    let behavior = state
        .behavior
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .clone();

    match behavior {
        RefreshBehavior::Issue {
            access_token,
            refresh_token,
        } => Json(json!({
            "access_token": access_token,
            "refresh_token": refresh_token,
            "token_type": "bearer",
        }))
        .into_response(),
        RefreshBehavior::Reject => (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "detail": "Invalid refresh token" })),
        )
            .into_response(),
        RefreshBehavior::Fail => {
            (StatusCode::INTERNAL_SERVER_ERROR, "upstream unavailable").into_response()
        }
    }
}

async fn me(headers: HeaderMap) -> Response {
    let authorized = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        == Some(VALID_BEARER);

    if !authorized {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "detail": "Not authenticated" })),
        )
            .into_response();
    }

    Json(json!({
        "id": "u-1",
        "email": "mai@lecas.vn",
        "full_name": "Mai Nguyen",
        "role": "staff",
    }))
    .into_response()
}

#[derive(Deserialize)]
struct OrderBody {
    #[serde(default)]
    items: Vec<serde_json::Value>,
}

async fn create_order(Json(body): Json<OrderBody>) -> Response {
    if body.items.is_empty() {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "message": "Cart is empty" })),
        )
            .into_response();
    }

    (
        StatusCode::CREATED,
        Json(json!({ "id": "ord-1001", "status": "pending" })),
    )
        .into_response()
}

/// An unsigned JWT whose payload is `claims`.
#[must_use]
pub fn unsigned_token(claims: &serde_json::Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{header}.{payload}.signature")
}

/// An unsigned JWT expiring `secs` seconds from now (negative for past).
#[must_use]
pub fn token_expiring_in(secs: i64) -> String {
    let exp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map_or(0, |d| i64::try_from(d.as_secs()).unwrap_or(i64::MAX))
        .saturating_add(secs);
    unsigned_token(&json!({ "exp": exp, "sub": "u-1" }))
}
