use std::sync::Arc;

use reqwest::header::{AUTHORIZATION, HeaderValue};

use crate::errors::Error;
use crate::request_context::{PendingRequest, RequestContext};
use crate::store::{ACCESS_TOKEN_KEY, CredentialStore};

/// A request-phase transform.
pub trait RequestStage: Send + Sync {
    fn apply(&self, request: &mut PendingRequest, ctx: &mut RequestContext) -> Result<(), Error>;
}

/// Attaches the stored access token as a bearer credential.
///
/// Reads the store on every attempt. With no token stored the request goes out as is.
pub struct BearerAuth {
    store: Arc<dyn CredentialStore>,
}

impl BearerAuth {
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self { store }
    }
}

impl RequestStage for BearerAuth {
    fn apply(&self, request: &mut PendingRequest, ctx: &mut RequestContext) -> Result<(), Error> {
        if !ctx.authenticate() {
            return Ok(());
        }
        let token = self.store.get(ACCESS_TOKEN_KEY)?;
        if let Some(token) = token.as_deref() {
            let value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|e| Error::Store(format!("stored access token is not a valid header: {e}")))?;
            request.headers.insert(AUTHORIZATION, value);
        }
        ctx.set_attached_token(token);
        Ok(())
    }
}
