//! Lecas backend REST client.
//!
//! The backend is an opaque collaborator: products, orders, cart sync and
//! the CMS all sit behind a JSON REST API. This module provides the generic
//! request helpers plus the one endpoint the client itself depends on, the
//! token refresh.
//!
//! # Errors
//!
//! Non-success responses become [`ApiError::Status`] (or
//! [`ApiError::Unauthorized`] for 401) carrying the message the backend put
//! in its error body. [`ApiError::user_message`] gives the short text shown
//! to the customer in a toast.

pub mod auth;

pub use auth::RefreshedTokens;

use std::time::Duration;

use reqwest::{RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::instrument;
use url::Url;

/// Errors that can occur when calling the backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport failure or undecodable response body.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The request path could not be joined onto the base URL.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// The backend rejected the credentials.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Any other non-success status.
    #[error("API error ({status}): {message}")]
    Status { status: u16, message: String },
}

impl ApiError {
    /// Short message suitable for a user-facing toast.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Http(e) if e.is_timeout() => "The server took too long to respond".to_string(),
            Self::Http(_) | Self::Url(_) => "Could not reach the server".to_string(),
            Self::Unauthorized(_) => "Your session has expired, please sign in again".to_string(),
            Self::Status { status, message } if (400..500).contains(status) => message.clone(),
            Self::Status { .. } => "Something went wrong, please try again".to_string(),
        }
    }
}

/// JSON error body shapes the backend uses.
#[derive(serde::Deserialize)]
struct ErrorBody {
    #[serde(default)]
    detail: Option<serde_json::Value>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl ErrorBody {
    fn into_message(self) -> Option<String> {
        let detail = self.detail.map(|detail| match detail {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        });
        detail.or(self.message).or(self.error)
    }
}

/// Client for the Lecas backend.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    /// Create a client with its own connection pool.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Http` if the HTTP client cannot be built.
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(http, base_url))
    }

    /// Create a client over an existing `reqwest::Client`.
    #[must_use]
    pub fn with_client(http: reqwest::Client, mut base_url: Url) -> Self {
        // Url::join replaces the last segment unless the base ends with '/'.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Self { http, base_url }
    }

    /// The base URL requests are resolved against.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    /// `GET` a JSON resource.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport failure or a non-success status.
    #[instrument(skip(self, bearer))]
    pub async fn get_json<T>(&self, path: &str, bearer: Option<&SecretString>) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
    {
        let request = self.http.get(self.endpoint(path)?);
        Self::send(with_bearer(request, bearer)).await
    }

    /// `POST` a JSON body and decode the JSON response.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport failure or a non-success status.
    #[instrument(skip(self, body, bearer))]
    pub async fn post_json<B, T>(
        &self,
        path: &str,
        body: &B,
        bearer: Option<&SecretString>,
    ) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.http.post(self.endpoint(path)?).json(body);
        Self::send(with_bearer(request, bearer)).await
    }

    async fn send<T>(request: RequestBuilder) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
    {
        let response = request.send().await?;
        let status = response.status();

        if status.is_success() {
            return Ok(response.json().await?);
        }

        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&text)
            .ok()
            .and_then(ErrorBody::into_message)
            .unwrap_or_else(|| {
                if text.is_empty() {
                    status
                        .canonical_reason()
                        .unwrap_or("Unknown error")
                        .to_string()
                } else {
                    text
                }
            });

        tracing::debug!(status = status.as_u16(), %message, "API request failed");

        if status == StatusCode::UNAUTHORIZED {
            Err(ApiError::Unauthorized(message))
        } else {
            Err(ApiError::Status {
                status: status.as_u16(),
                message,
            })
        }
    }
}

fn with_bearer(request: RequestBuilder, bearer: Option<&SecretString>) -> RequestBuilder {
    match bearer {
        Some(token) => request.bearer_auth(token.expose_secret()),
        None => request,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> ApiClient {
        ApiClient::with_client(reqwest::Client::new(), Url::parse(base).unwrap())
    }

    #[test]
    fn test_endpoint_joins_paths() {
        let api = client("http://localhost:8000");
        assert_eq!(
            api.endpoint("/api/v1/auth/refresh").unwrap().as_str(),
            "http://localhost:8000/api/v1/auth/refresh"
        );
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let api = client("https://lecas.vn/backend");
        assert_eq!(api.base_url().as_str(), "https://lecas.vn/backend/");
        assert_eq!(
            api.endpoint("api/v1/products").unwrap().as_str(),
            "https://lecas.vn/backend/api/v1/products"
        );
    }

    #[test]
    fn test_error_body_message_preference() {
        let body: ErrorBody =
            serde_json::from_str(r#"{"detail":"Out of stock","message":"ignored"}"#).unwrap();
        assert_eq!(body.into_message().as_deref(), Some("Out of stock"));

        let body: ErrorBody = serde_json::from_str(r#"{"message":"Bad coupon"}"#).unwrap();
        assert_eq!(body.into_message().as_deref(), Some("Bad coupon"));

        let body: ErrorBody = serde_json::from_str(r#"{"detail":[{"loc":["email"]}]}"#).unwrap();
        assert_eq!(
            body.into_message().as_deref(),
            Some(r#"[{"loc":["email"]}]"#)
        );
    }

    #[test]
    fn test_api_error_display() {
        let err = ApiError::Status {
            status: 422,
            message: "Invalid size".to_string(),
        };
        assert_eq!(err.to_string(), "API error (422): Invalid size");

        let err = ApiError::Unauthorized("token expired".to_string());
        assert_eq!(err.to_string(), "Unauthorized: token expired");
    }

    #[test]
    fn test_user_messages() {
        let client_err = ApiError::Status {
            status: 409,
            message: "Email already registered".to_string(),
        };
        assert_eq!(client_err.user_message(), "Email already registered");

        let server_err = ApiError::Status {
            status: 503,
            message: "upstream connect error".to_string(),
        };
        assert_eq!(server_err.user_message(), "Something went wrong, please try again");

        assert_eq!(
            ApiError::Unauthorized(String::new()).user_message(),
            "Your session has expired, please sign in again"
        );
    }
}
