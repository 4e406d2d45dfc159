//! Proactive bearer token refresh.
//!
//! Every `interval` the scheduler looks at the stored bearer token. When less
//! than `threshold` of its lifetime remains it exchanges the stored refresh
//! token for new credentials. If that exchange fails, or there is no refresh
//! token, all credentials are cleared so the UI sends the user to sign in.
//!
//! There is no retry or backoff: a failed tick is simply followed by the next
//! one. The background task lives as long as its [`RefreshHandle`].

use std::future::Future;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, instrument, warn};

use crate::api::{ApiClient, ApiError, RefreshedTokens};
use crate::session::SessionStore;
use crate::storage::StorageError;
use crate::token;

/// Default time between checks.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(60);

/// Default remaining lifetime that triggers a refresh.
pub const DEFAULT_THRESHOLD: Duration = Duration::from_secs(120);

/// Something that can exchange a refresh token for new credentials.
pub trait TokenRefresher: Send + Sync + 'static {
    /// Exchange `refresh_token` for new credentials.
    fn refresh(
        &self,
        refresh_token: &SecretString,
    ) -> impl Future<Output = Result<RefreshedTokens, ApiError>> + Send;
}

impl TokenRefresher for ApiClient {
    fn refresh(
        &self,
        refresh_token: &SecretString,
    ) -> impl Future<Output = Result<RefreshedTokens, ApiError>> + Send {
        self.refresh_tokens(refresh_token)
    }
}

/// Errors starting the background task.
#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("refresh interval must be > 0")]
    ZeroInterval,
    #[error("no tokio runtime available")]
    RuntimeUnavailable,
}

/// What a single check did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// No bearer token is stored; nothing to do.
    NoSession,
    /// The bearer token has enough lifetime left.
    Fresh,
    /// New credentials were stored.
    Refreshed,
    /// Credentials were cleared; the user must sign in again.
    Cleared,
}

/// Periodic bearer token refresher.
#[derive(Debug, Clone)]
pub struct TokenRefreshScheduler<R> {
    session: SessionStore,
    refresher: R,
    interval: Duration,
    threshold: Duration,
}

impl<R: TokenRefresher> TokenRefreshScheduler<R> {
    /// Create a scheduler with the default interval and threshold.
    #[must_use]
    pub fn new(session: SessionStore, refresher: R) -> Self {
        Self {
            session,
            refresher,
            interval: DEFAULT_INTERVAL,
            threshold: DEFAULT_THRESHOLD,
        }
    }

    /// Set the time between checks.
    #[must_use]
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Set the remaining lifetime that triggers a refresh.
    #[must_use]
    pub fn with_threshold(mut self, threshold: Duration) -> Self {
        self.threshold = threshold;
        self
    }

    /// Time between checks.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Run one check.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if new credentials cannot be stored or old
    /// ones cannot be cleared. Refresh failures are not errors; they clear
    /// the session and report [`RefreshOutcome::Cleared`].
    #[instrument(skip(self))]
    pub async fn check_once(&self) -> Result<RefreshOutcome, StorageError> {
        let Some(access_token) = self.session.access_token() else {
            return Ok(RefreshOutcome::NoSession);
        };

        let threshold = i64::try_from(self.threshold.as_secs()).unwrap_or(i64::MAX);
        let now = chrono::Utc::now().timestamp();
        if !token::expires_within(access_token.expose_secret(), threshold, now) {
            return Ok(RefreshOutcome::Fresh);
        }

        let Some(refresh_token) = self.session.refresh_token() else {
            warn!("Bearer token expiring with no refresh token, clearing session");
            self.session.clear()?;
            return Ok(RefreshOutcome::Cleared);
        };

        match self.refresher.refresh(&refresh_token).await {
            Ok(tokens) => {
                self.session
                    .set_tokens(&tokens.access_token, tokens.refresh_token.as_ref())?;
                info!(
                    rotated = tokens.refresh_token.is_some(),
                    "Bearer token refreshed"
                );
                Ok(RefreshOutcome::Refreshed)
            }
            Err(e) => {
                warn!(error = %e, "Token refresh failed, clearing session");
                self.session.clear()?;
                Ok(RefreshOutcome::Cleared)
            }
        }
    }

    /// Start checking in the background.
    ///
    /// The first check runs one interval after spawning. Missed ticks are
    /// skipped rather than bunched up.
    ///
    /// # Errors
    ///
    /// Returns `SchedulerError` if the interval is zero or no tokio runtime
    /// is running.
    pub fn spawn(self) -> Result<RefreshHandle, SchedulerError> {
        if self.interval.is_zero() {
            return Err(SchedulerError::ZeroInterval);
        }
        let runtime = Handle::try_current().map_err(|_| SchedulerError::RuntimeUnavailable)?;

        let (stop_tx, stop_rx) = oneshot::channel();
        let join = runtime.spawn(refresh_loop(self, stop_rx));

        Ok(RefreshHandle {
            stop_tx: Some(stop_tx),
            join,
        })
    }
}

async fn refresh_loop<R: TokenRefresher>(
    scheduler: TokenRefreshScheduler<R>,
    mut stop_rx: oneshot::Receiver<()>,
) {
    let mut ticker = tokio::time::interval(scheduler.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    ticker.tick().await;

    debug!(interval_secs = scheduler.interval.as_secs(), "Token refresh loop started");

    loop {
        tokio::select! {
            _ = &mut stop_rx => break,
            _ = ticker.tick() => {
                match scheduler.check_once().await {
                    Ok(outcome) => debug!(?outcome, "Token refresh check"),
                    Err(e) => error!(error = %e, "Token refresh check failed"),
                }
            }
        }
    }

    debug!("Token refresh loop stopped");
}

/// Owner of a running refresh task.
///
/// Dropping the handle aborts the task.
#[derive(Debug)]
pub struct RefreshHandle {
    stop_tx: Option<oneshot::Sender<()>>,
    join: JoinHandle<()>,
}

impl RefreshHandle {
    /// Whether the task is still running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        !self.join.is_finished()
    }

    /// Stop the task and wait for it to finish its current check.
    pub async fn stop(mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(());
        }
        if let Err(e) = (&mut self.join).await {
            if !e.is_cancelled() {
                error!(error = %e, "Token refresh task panicked");
            }
        }
    }
}

impl Drop for RefreshHandle {
    fn drop(&mut self) {
        self.join.abort();
    }
}
