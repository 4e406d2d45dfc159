//! Session commands.
//!
//! # Usage
//!
//! ```bash
//! lecas session login --access "$ACCESS" --refresh "$REFRESH" \
//!     --user '{"id":"u1","email":"mai@lecas.vn"}'
//! lecas session status
//! lecas session watch      # Ctrl+C to stop
//! lecas session logout
//! ```

use lecas_core::StoredUser;
use lecas_storefront::token;
use lecas_storefront::{
    ApiClient, ClientConfig, Error, RefreshOutcome, StoreEvent, TokenRefreshScheduler,
};
use secrecy::{ExposeSecret, SecretString};
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

use super::App;

/// Store credentials and, optionally, the user profile.
///
/// # Errors
///
/// Returns `Error::InvalidInput` for an empty bearer token or a profile that
/// is not valid JSON, or `Error::Storage` if the session cannot be written.
pub fn login(
    app: &App,
    access: String,
    refresh: Option<String>,
    user: Option<&str>,
) -> Result<(), Error> {
    if access.trim().is_empty() {
        return Err(Error::InvalidInput("access token must not be empty".to_string()));
    }

    let user = user
        .map(serde_json::from_str::<StoredUser>)
        .transpose()
        .map_err(|e| Error::InvalidInput(format!("invalid user profile: {e}")))?;

    let access = SecretString::from(access);
    let refresh = refresh.map(SecretString::from);
    app.session.set_tokens(&access, refresh.as_ref())?;
    if let Some(user) = &user {
        app.session.set_user(user)?;
    }

    if token::decode_claims(access.expose_secret()).is_err() {
        warn!("Bearer token has no readable expiry; it will be refreshed on the next check");
    }
    info!(user = user.as_ref().map(|u| u.email.as_str()), "Signed in");
    Ok(())
}

/// Print the signed-in user and remaining token lifetime.
#[allow(clippy::print_stdout)]
pub fn status(app: &App) {
    let Some(access) = app.session.access_token() else {
        println!("Signed out");
        return;
    };

    match app.session.user() {
        Some(user) => println!(
            "Signed in as {} ({})",
            user.full_name.as_deref().unwrap_or(&user.email),
            user.role
        ),
        None => println!("Signed in"),
    }

    let now = chrono::Utc::now().timestamp();
    match token::expires_in(access.expose_secret(), now) {
        Ok(remaining) if remaining > 0 => println!("Bearer token expires in {remaining}s"),
        Ok(_) => println!("Bearer token has expired"),
        Err(e) => println!("Bearer token expiry unreadable: {e}"),
    }
    println!(
        "Refresh token: {}",
        if app.session.refresh_token().is_some() {
            "stored"
        } else {
            "missing"
        }
    );
}

fn scheduler(app: &App, config: &ClientConfig) -> Result<TokenRefreshScheduler<ApiClient>, Error> {
    let client = ApiClient::new(config.api_base_url.clone(), config.http_timeout)?;
    Ok(TokenRefreshScheduler::new(app.session.clone(), client)
        .with_interval(config.refresh_interval)
        .with_threshold(config.refresh_threshold))
}

fn report(outcome: RefreshOutcome) {
    match outcome {
        RefreshOutcome::NoSession => info!("No session stored"),
        RefreshOutcome::Fresh => info!("Bearer token is still fresh"),
        RefreshOutcome::Refreshed => info!("Bearer token refreshed"),
        RefreshOutcome::Cleared => warn!("Session expired; sign in again"),
    }
}

/// Run a single refresh check now.
///
/// # Errors
///
/// Returns `Error::Api` if the HTTP client cannot be built, or
/// `Error::Storage` if the session cannot be written.
pub async fn refresh(app: &App, config: &ClientConfig) -> Result<(), Error> {
    let outcome = scheduler(app, config)?.check_once().await?;
    report(outcome);
    Ok(())
}

/// Keep the bearer token fresh until Ctrl+C or the session is cleared.
///
/// # Errors
///
/// Returns `Error::Api` if the HTTP client cannot be built, `Error::Storage`
/// if the session cannot be written, or `Error::Scheduler` if the refresh
/// task cannot start.
pub async fn watch(app: &App, config: &ClientConfig) -> Result<(), Error> {
    let scheduler = scheduler(app, config)?;

    let outcome = scheduler.check_once().await?;
    report(outcome);
    if matches!(outcome, RefreshOutcome::NoSession | RefreshOutcome::Cleared) {
        return Ok(());
    }

    let mut events = app.notifier.subscribe();
    let handle = scheduler.spawn()?;
    info!(
        interval_secs = config.refresh_interval.as_secs(),
        "Watching session; press Ctrl+C to stop"
    );

    loop {
        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                if let Err(e) = result {
                    warn!(error = %e, "Could not listen for Ctrl+C");
                }
                break;
            }
            event = events.recv() => match event {
                Ok(StoreEvent::SessionCleared) => {
                    warn!("Session expired; sign in again");
                    break;
                }
                Ok(StoreEvent::SessionUpdated) => info!("Bearer token refreshed"),
                Ok(_) | Err(RecvError::Lagged(_)) => {}
                Err(RecvError::Closed) => break,
            },
        }
    }

    handle.stop().await;
    Ok(())
}

/// Remove all credentials.
///
/// # Errors
///
/// Returns `Error::Storage` if the session cannot be written.
pub fn logout(app: &App) -> Result<(), Error> {
    app.session.clear()?;
    Ok(())
}
