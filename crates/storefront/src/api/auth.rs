//! Token refresh endpoint.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::{ApiClient, ApiError};

/// Path of the refresh endpoint, relative to the API base URL.
pub const REFRESH_PATH: &str = "/api/v1/auth/refresh";

/// Credentials returned by a successful refresh.
#[derive(Debug, Clone)]
pub struct RefreshedTokens {
    /// New bearer token.
    pub access_token: SecretString,
    /// Rotated refresh token, when the backend issues one.
    pub refresh_token: Option<SecretString>,
}

/// Request body for the refresh endpoint.
#[derive(Serialize)]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

/// Response from the refresh endpoint.
#[derive(Deserialize)]
struct RefreshResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
}

impl ApiClient {
    /// Exchange a refresh token for new credentials.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` if the refresh token was rejected, or
    /// another `ApiError` on transport failure.
    #[instrument(skip(self, refresh_token))]
    pub async fn refresh_tokens(
        &self,
        refresh_token: &SecretString,
    ) -> Result<RefreshedTokens, ApiError> {
        let response: RefreshResponse = self
            .post_json(
                REFRESH_PATH,
                &RefreshRequest {
                    refresh_token: refresh_token.expose_secret(),
                },
                None,
            )
            .await?;

        Ok(RefreshedTokens {
            access_token: SecretString::from(response.access_token),
            refresh_token: response
                .refresh_token
                .filter(|token| !token.is_empty())
                .map(SecretString::from),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refresh_request_shape() {
        let body = serde_json::to_value(RefreshRequest {
            refresh_token: "r-1",
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({ "refresh_token": "r-1" }));
    }

    #[test]
    fn test_refresh_response_without_rotation() {
        let response: RefreshResponse =
            serde_json::from_str(r#"{"access_token":"a-2","token_type":"bearer"}"#).unwrap();
        assert_eq!(response.access_token, "a-2");
        assert!(response.refresh_token.is_none());
    }
}
