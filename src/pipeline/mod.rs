mod outcome;
mod stage;

pub use outcome::{DispatchOutcome, OperationKind};
pub use stage::{BearerAuth, RequestStage};

use std::sync::Arc;

use crate::errors::Error;
use crate::request_context::{PendingRequest, RequestContext};
use crate::types::ApiResponse;

/// What to do with the result of one attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Hand the result to the caller as-is.
    Deliver,
    /// Refresh credentials, then replay the request once.
    RefreshAndRetry,
}

/// Response-phase decision. Only an HTTP 401 on an authenticated request whose retry
/// marker is still clear starts a refresh cycle; transport failures never do.
pub fn classify(result: &Result<ApiResponse, Error>, ctx: &RequestContext) -> Disposition {
    match result {
        Err(err) if err.is_unauthorized() && ctx.authenticate() && !ctx.retried() => {
            Disposition::RefreshAndRetry
        }
        _ => Disposition::Deliver,
    }
}

/// Ordered request-phase transforms applied before each attempt.
#[derive(Clone, Default)]
pub struct Pipeline {
    stages: Vec<Arc<dyn RequestStage>>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_stage(mut self, stage: Arc<dyn RequestStage>) -> Self {
        self.stages.push(stage);
        self
    }

    /// Produces the request for the next attempt; the original is left untouched.
    pub fn prepare(
        &self,
        request: &PendingRequest,
        ctx: &mut RequestContext,
    ) -> Result<PendingRequest, Error> {
        let mut prepared = request.clone();
        for stage in &self.stages {
            stage.apply(&mut prepared, ctx)?;
        }
        Ok(prepared)
    }
}
