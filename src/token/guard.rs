use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::debug;

use crate::errors::Error;
use crate::store::{ACCESS_TOKEN_KEY, CredentialStore};
use crate::telemetry::refresh::{RefreshOutcome, RefreshTelemetry};

/// Result of passing through the guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshDecision {
    /// This caller ran the refresh.
    Refreshed,
    /// Credentials were rotated by another caller while waiting; no call was made.
    Reused,
}

/// Collapses concurrent refreshes triggered by simultaneous 401s.
///
/// Callers queue on a single lock. Once inside, a caller whose stale token no longer
/// matches the stored one knows another task already refreshed and replays with the
/// stored token instead of spending the refresh token again.
pub struct RefreshGuard {
    store: Arc<dyn CredentialStore>,
    refresh_lock: Mutex<()>,
    dedupe: bool,
}

impl RefreshGuard {
    pub fn new(store: Arc<dyn CredentialStore>, dedupe: bool) -> Self {
        Self {
            store,
            refresh_lock: Mutex::new(()),
            dedupe,
        }
    }

    /// Runs `refresh_cb` unless the token that was rejected (`stale`) has already
    /// been replaced in the store.
    pub async fn refresh_after_rejection<F, Fut, T>(
        &self,
        stale: Option<&str>,
        refresh_cb: F,
    ) -> Result<RefreshDecision, Error>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<T, Error>>,
    {
        if !self.dedupe {
            refresh_cb().await?;
            return Ok(RefreshDecision::Refreshed);
        }

        // Only one refresh attempt should run at a time.
        let _lock = self.refresh_lock.lock().await;
        let current = self.store.get(ACCESS_TOKEN_KEY)?;
        if current.is_some() && current.as_deref() != stale {
            debug!("access token rotated while waiting; skipping refresh");
            RefreshTelemetry::new("refresh.guard").emit_success(RefreshOutcome::Reused, false);
            return Ok(RefreshDecision::Reused);
        }
        refresh_cb().await?;
        Ok(RefreshDecision::Refreshed)
    }
}
