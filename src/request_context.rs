use reqwest::Method;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::Serialize;
use uuid::Uuid;

use crate::errors::Error;

/// Outbound request description, kept unmodified so it can be replayed after a refresh.
#[derive(Clone, Debug)]
pub struct PendingRequest {
    pub method: Method,
    pub path: String,
    pub headers: HeaderMap,
    pub body: Option<serde_json::Value>,
}

impl PendingRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn with_json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self, Error> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    pub fn with_header(mut self, name: HeaderName, value: &str) -> Result<Self, Error> {
        let value = HeaderValue::from_str(value)
            .map_err(|e| Error::Config(format!("Invalid value for header '{}': {}", name, e)))?;
        self.headers.insert(name, value);
        Ok(self)
    }
}

/// Per logical request state threaded through the pipeline.
///
/// `retried` is the one-shot marker: once set, a 401 is delivered to the caller
/// instead of starting another refresh cycle.
#[derive(Clone, Debug)]
pub struct RequestContext {
    id: Uuid,
    authenticate: bool,
    retried: bool,
    attempts: u8,
    attached_token: Option<String>,
}

impl RequestContext {
    /// Bearer token attached, eligible for one refresh-and-retry.
    pub fn authenticated() -> Self {
        Self {
            id: Uuid::new_v4(),
            authenticate: true,
            retried: false,
            attempts: 0,
            attached_token: None,
        }
    }

    /// Bearer token attached, never refreshed.
    pub fn single_attempt() -> Self {
        Self {
            retried: true,
            ..Self::authenticated()
        }
    }

    /// No bearer token and no refresh handling; used by the auth endpoints themselves.
    pub fn anonymous() -> Self {
        Self {
            authenticate: false,
            retried: true,
            ..Self::authenticated()
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn authenticate(&self) -> bool {
        self.authenticate
    }

    pub fn retried(&self) -> bool {
        self.retried
    }

    pub fn mark_retried(&mut self) {
        self.retried = true;
    }

    pub fn attempts(&self) -> u8 {
        self.attempts
    }

    pub(crate) fn record_attempt(&mut self) {
        self.attempts = self.attempts.saturating_add(1);
    }

    /// Access token attached to the most recent attempt, if any.
    pub fn attached_token(&self) -> Option<&str> {
        self.attached_token.as_deref()
    }

    pub(crate) fn set_attached_token(&mut self, token: Option<String>) {
        self.attached_token = token;
    }
}
