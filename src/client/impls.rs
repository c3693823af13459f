use std::time::Instant;

use reqwest::Method;
use reqwest::header::AUTHORIZATION;
use serde::Serialize;
use tracing::{error, info, warn};

use crate::{
    AuthClient,
    client::LogoutOutcome,
    errors::{Error, backend_message},
    pipeline::{Disposition, DispatchOutcome, OperationKind, classify},
    request_context::{PendingRequest, RequestContext},
    session::SessionEvent,
    store::{ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY},
    telemetry::refresh::{RefreshOutcome, RefreshTelemetry},
    types::{ApiResponse, AuthResponse, LoginRequest, SignupRequest},
};

impl AuthClient {
    /// Exchanges email and password for a credential pair and stores it.
    /// # Errors
    /// * `Error::Auth` - the backend rejected the credentials; carries its message
    /// * `Error::Transport` / `Error::Json` - the backend was unreachable or answered garbage
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, Error> {
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let request = PendingRequest::post(self.config.endpoints.login.as_str()).with_json(&body)?;
        self.authenticate(OperationKind::Login, request).await
    }

    /// Registers a new account. Same contract as [`AuthClient::login`].
    pub async fn signup(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthResponse, Error> {
        let body = SignupRequest {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        };
        let request =
            PendingRequest::post(self.config.endpoints.signup.as_str()).with_json(&body)?;
        self.authenticate(OperationKind::Signup, request).await
    }

    /// Trades the stored refresh token for a new credential pair.
    ///
    /// Fails with `Error::NoRefreshToken` before any network call when nothing is stored.
    /// Any other failure is an `Error::Refresh` and leaves the store untouched; clearing
    /// it is up to the caller.
    pub async fn refresh(&self) -> Result<AuthResponse, Error> {
        let Some(refresh_token) = self.store.get(REFRESH_TOKEN_KEY)? else {
            warn!("refresh requested without a stored refresh token");
            return Err(Error::NoRefreshToken);
        };

        let started = Instant::now();
        let telemetry = RefreshTelemetry::new(OperationKind::Refresh.to_string());
        telemetry.emit_start();
        let mut ctx = RequestContext::anonymous();
        let result = self.exchange_refresh_token(&refresh_token, &mut ctx).await;
        match &result {
            Ok(resp) => {
                telemetry.emit_success(RefreshOutcome::Success, resp.refresh_token.is_some());
                self.events.emit(SessionEvent::Refreshed);
            }
            Err(err) => telemetry.emit_failure(err),
        }
        DispatchOutcome {
            request_id: ctx.id(),
            operation: OperationKind::Refresh,
            attempts: ctx.attempts(),
            refreshed: false,
            success: result.is_ok(),
            elapsed: started.elapsed(),
        }
        .log();
        result
    }

    /// Tells the backend the session is over, then clears local credentials no matter
    /// what the backend said.
    ///
    /// A failed backend call is returned as `LogoutOutcome::LocalOnly`, not as `Err`.
    /// `Err` is only returned when the local store itself could not be cleared.
    pub async fn logout(&self) -> Result<LogoutOutcome, Error> {
        let started = Instant::now();
        let mut ctx = RequestContext::single_attempt();
        let request = PendingRequest::post(self.config.endpoints.logout.as_str());
        let notified = self.send_once(&request, &mut ctx).await;
        let cleared = self.store.clear();

        let outcome = match notified {
            Ok(_) => LogoutOutcome::Confirmed,
            Err(err) => {
                warn!(error = %err, "logout not confirmed by backend; local credentials cleared");
                let notice = Error::LogoutTransport(err.to_string());
                self.events.emit(SessionEvent::LogoutWarning {
                    message: notice.to_string(),
                });
                LogoutOutcome::LocalOnly(notice)
            }
        };
        DispatchOutcome {
            request_id: ctx.id(),
            operation: OperationKind::Logout,
            attempts: ctx.attempts(),
            refreshed: false,
            success: outcome.is_confirmed(),
            elapsed: started.elapsed(),
        }
        .log();

        if let Err(err) = cleared {
            error!(error = %err, "failed to clear stored credentials on logout");
            return Err(err);
        }
        info!("logged out");
        self.events.emit(SessionEvent::LoggedOut);
        Ok(outcome)
    }

    /// Sends an authenticated request.
    ///
    /// A 401 triggers one refresh and one replay of the same request with the new
    /// token; the replay's result is final. If the refresh fails, stored credentials
    /// are cleared, `SessionEvent::SessionExpired` is emitted and the refresh error is
    /// returned instead of the 401.
    ///
    /// When the store cannot be cleared either, `SessionEvent::ClearFailed` is emitted
    /// instead and an `Error::Store` naming both failures is returned.
    pub async fn request(&self, request: PendingRequest) -> Result<ApiResponse, Error> {
        let started = Instant::now();
        let mut ctx = RequestContext::authenticated();
        let mut refreshed = false;

        let first = self.send_once(&request, &mut ctx).await;
        let result = match classify(&first, &ctx) {
            Disposition::Deliver => first,
            Disposition::RefreshAndRetry => {
                ctx.mark_retried();
                warn!(
                    request_id = %ctx.id(),
                    method = %request.method,
                    path = %request.path,
                    status = 401,
                    "request unauthorized; refreshing credentials"
                );
                let stale = ctx.attached_token().map(str::to_owned);
                match self
                    .guard
                    .refresh_after_rejection(stale.as_deref(), || self.refresh())
                    .await
                {
                    Ok(_) => {
                        refreshed = true;
                        self.send_once(&request, &mut ctx).await
                    }
                    Err(err) => match self.invalidate_session(&err) {
                        Ok(()) => Err(err),
                        Err(clear_err) => Err(clear_err),
                    },
                }
            }
        };

        DispatchOutcome {
            request_id: ctx.id(),
            operation: OperationKind::Request,
            attempts: ctx.attempts(),
            refreshed,
            success: result.is_ok(),
            elapsed: started.elapsed(),
        }
        .log();
        result
    }

    pub async fn get(&self, path: &str) -> Result<ApiResponse, Error> {
        self.request(PendingRequest::get(path)).await
    }

    pub async fn post_json<T: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<ApiResponse, Error> {
        self.request(PendingRequest::post(path).with_json(body)?).await
    }

    pub async fn put_json<T: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<ApiResponse, Error> {
        self.request(PendingRequest::new(Method::PUT, path).with_json(body)?).await
    }

    pub async fn delete(&self, path: &str) -> Result<ApiResponse, Error> {
        self.request(PendingRequest::new(Method::DELETE, path)).await
    }

    /// Whether an access token is currently stored. Says nothing about its validity.
    pub fn is_authenticated(&self) -> Result<bool, Error> {
        Ok(self.store.get(ACCESS_TOKEN_KEY)?.is_some())
    }

    async fn authenticate(
        &self,
        operation: OperationKind,
        request: PendingRequest,
    ) -> Result<AuthResponse, Error> {
        let started = Instant::now();
        let mut ctx = RequestContext::anonymous();
        let result = match self.exchange(&request, &mut ctx).await {
            Ok(resp) if resp.access_token.is_empty() => {
                Err(Error::Auth("response carried no access token".into()))
            }
            Ok(resp) => self
                .store
                .store_pair(&resp.access_token, resp.refresh_token.as_deref())
                .map(|()| resp),
            Err(Error::Http(status, body)) => Err(Error::Auth(backend_message(status, &body))),
            Err(err) => Err(err),
        };

        match &result {
            Ok(resp) => {
                info!(
                    operation = %operation,
                    access_len = resp.access_token.len(),
                    refresh_returned = resp.refresh_token.is_some(),
                    expires_in = resp.expires_in,
                    "credentials stored"
                );
                self.events.emit(SessionEvent::LoggedIn);
            }
            Err(err) => warn!(operation = %operation, error = %err, "authentication failed"),
        }
        DispatchOutcome {
            request_id: ctx.id(),
            operation,
            attempts: ctx.attempts(),
            refreshed: false,
            success: result.is_ok(),
            elapsed: started.elapsed(),
        }
        .log();
        result
    }

    async fn exchange_refresh_token(
        &self,
        refresh_token: &str,
        ctx: &mut RequestContext,
    ) -> Result<AuthResponse, Error> {
        let mut request = PendingRequest::post(self.config.endpoints.refresh.as_str())
            .with_header(AUTHORIZATION, &format!("Bearer refresh {refresh_token}"))
            .map_err(|_| Error::Refresh("stored refresh token is not a valid header".into()))?;
        request.body = Some(serde_json::json!({}));

        let resp = self
            .exchange(&request, ctx)
            .await
            .map_err(|err| match err {
                Error::Http(status, body) => Error::Refresh(format!(
                    "{} {}",
                    status.as_u16(),
                    backend_message(status, &body)
                )),
                other => Error::Refresh(other.to_string()),
            })?;
        if resp.access_token.is_empty() {
            return Err(Error::Refresh("response carried no access token".into()));
        }
        self.store
            .store_pair(&resp.access_token, resp.refresh_token.as_deref())
            .map_err(|e| Error::Refresh(format!("failed to persist refreshed credentials: {e}")))?;
        Ok(resp)
    }

    async fn exchange(
        &self,
        request: &PendingRequest,
        ctx: &mut RequestContext,
    ) -> Result<AuthResponse, Error> {
        let resp = self.send_once(request, ctx).await?;
        resp.json::<AuthResponse>()
    }

    async fn send_once(
        &self,
        request: &PendingRequest,
        ctx: &mut RequestContext,
    ) -> Result<ApiResponse, Error> {
        let prepared = self.pipeline.prepare(request, ctx)?;
        ctx.record_attempt();
        self.transport.execute(&prepared, ctx).await
    }

    /// Drops the session after a failed refresh. `SessionExpired` goes out only once
    /// both keys are gone from the store.
    fn invalidate_session(&self, reason: &Error) -> Result<(), Error> {
        let cleared = self.store.clear().or_else(|err| {
            warn!(error = %err, "clearing stored credentials failed; removing keys one by one");
            let access = self.store.remove(ACCESS_TOKEN_KEY);
            let refresh = self.store.remove(REFRESH_TOKEN_KEY);
            access.and(refresh)
        });

        if let Err(err) = cleared {
            error!(
                error = %err,
                refresh_error = %reason,
                "session invalidation failed; stored credentials may remain"
            );
            self.events.emit(SessionEvent::ClearFailed {
                reason: err.to_string(),
            });
            return Err(Error::Store(format!(
                "could not clear credentials after {reason}: {err}"
            )));
        }
        error!(error = %reason, "session invalidated; stored credentials cleared");
        self.events.emit(SessionEvent::SessionExpired {
            reason: reason.to_string(),
        });
        Ok(())
    }
}
