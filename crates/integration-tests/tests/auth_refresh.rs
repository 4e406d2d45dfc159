//! Integration tests for the token refresh endpoint.

use lecas_integration_tests::{MockBackend, RefreshBehavior};
use lecas_storefront::ApiError;
use secrecy::{ExposeSecret, SecretString};

fn issue(access: &str, refresh: Option<&str>) -> RefreshBehavior {
    RefreshBehavior::Issue {
        access_token: access.to_string(),
        refresh_token: refresh.map(str::to_string),
    }
}

#[tokio::test]
async fn test_refresh_returns_rotated_tokens() {
    let backend = MockBackend::start(issue("new-access", Some("new-refresh")))
        .await
        .unwrap();
    let client = backend.client().unwrap();

    let tokens = client
        .refresh_tokens(&SecretString::from("old-refresh"))
        .await
        .unwrap();

    assert_eq!(tokens.access_token.expose_secret(), "new-access");
    assert_eq!(
        tokens.refresh_token.as_ref().map(ExposeSecret::expose_secret),
        Some("new-refresh")
    );
    assert_eq!(backend.refresh_calls(), 1);
    assert_eq!(backend.last_refresh_token().as_deref(), Some("old-refresh"));
}

#[tokio::test]
async fn test_refresh_without_rotation() {
    let backend = MockBackend::start(issue("new-access", None)).await.unwrap();
    let client = backend.client().unwrap();

    let tokens = client
        .refresh_tokens(&SecretString::from("old-refresh"))
        .await
        .unwrap();

    assert_eq!(tokens.access_token.expose_secret(), "new-access");
    assert!(tokens.refresh_token.is_none());
}

#[tokio::test]
async fn test_rejected_refresh_is_unauthorized() {
    let backend = MockBackend::start(RefreshBehavior::Reject).await.unwrap();
    let client = backend.client().unwrap();

    let err = client
        .refresh_tokens(&SecretString::from("revoked"))
        .await
        .unwrap_err();

    match err {
        ApiError::Unauthorized(message) => assert_eq!(message, "Invalid refresh token"),
        other => panic!("expected Unauthorized, got {other:?}"),
    }
}

#[tokio::test]
async fn test_server_error_keeps_plain_text_body() {
    let backend = MockBackend::start(RefreshBehavior::Fail).await.unwrap();
    let client = backend.client().unwrap();

    let err = client
        .refresh_tokens(&SecretString::from("old-refresh"))
        .await
        .unwrap_err();

    match &err {
        ApiError::Status { status, message } => {
            assert_eq!(*status, 500);
            assert_eq!(message, "upstream unavailable");
        }
        other => panic!("expected Status, got {other:?}"),
    }
    assert_eq!(err.user_message(), "Something went wrong, please try again");
}
