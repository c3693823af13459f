use std::sync::Arc;

use reqwest::Client;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue};
use tracing::{debug, warn};

use crate::config::Config;
use crate::errors::Error;
use crate::request_context::{PendingRequest, RequestContext};
use crate::types::ApiResponse;

/// Thin wrapper over `reqwest::Client`: JSON headers, fixed timeout, cookie jar.
#[derive(Clone)]
pub(crate) struct HttpTransport {
    client: Client,
    config: Arc<Config>,
}

impl HttpTransport {
    pub(crate) fn new(config: Arc<Config>) -> Result<Self, Error> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .default_headers(headers)
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout())
            .cookie_store(true)
            .build()?;
        Ok(Self { client, config })
    }

    /// Sends one attempt. Non-2xx statuses come back as `Error::Http` with the body text.
    pub(crate) async fn execute(
        &self,
        request: &PendingRequest,
        ctx: &RequestContext,
    ) -> Result<ApiResponse, Error> {
        let url = self.config.url_for(&request.path);
        let mut builder = self
            .client
            .request(request.method.clone(), &url)
            .headers(request.headers.clone());
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        debug!(
            request_id = %ctx.id(),
            attempt = ctx.attempts(),
            method = %request.method,
            path = %request.path,
            "request.send"
        );
        let resp = builder.send().await.map_err(|err| {
            warn!(
                request_id = %ctx.id(),
                path = %request.path,
                timeout = err.is_timeout(),
                error = %err,
                "request transport failure"
            );
            Error::Transport(err)
        })?;

        let status = resp.status();
        let headers = resp.headers().clone();
        let body = resp.text().await?;
        if status.is_success() {
            debug!(request_id = %ctx.id(), status = status.as_u16(), "request.ok");
            Ok(ApiResponse {
                status,
                headers,
                body,
            })
        } else {
            debug!(
                request_id = %ctx.id(),
                status = status.as_u16(),
                body_len = body.len(),
                "request.rejected"
            );
            Err(Error::Http(status, body))
        }
    }
}
