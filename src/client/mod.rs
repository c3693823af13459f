use std::sync::Arc;

use crate::config::Config;
use crate::errors::Error;
use crate::pipeline::{BearerAuth, Pipeline, RequestStage};
use crate::session::SessionEvents;
use crate::store::CredentialStore;
use crate::token::RefreshGuard;

mod impls;
mod transport;

use transport::HttpTransport;

/// HTTP client that attaches stored bearer credentials, refreshes them once on a 401
/// and replays the rejected request.
///
/// Cheap to clone; clones share the transport, store, refresh guard and event channel.
#[derive(Clone)]
pub struct AuthClient {
    config: Arc<Config>,
    transport: HttpTransport,
    store: Arc<dyn CredentialStore>,
    pipeline: Arc<Pipeline>,
    guard: Arc<RefreshGuard>,
    events: SessionEvents,
}

/// Result of [`AuthClient::logout`]. Local credentials are cleared in both cases.
#[derive(Debug)]
pub enum LogoutOutcome {
    Confirmed,
    /// The backend call failed; carries an `Error::LogoutTransport` to show the user.
    LocalOnly(Error),
}

impl LogoutOutcome {
    pub fn is_confirmed(&self) -> bool {
        matches!(self, LogoutOutcome::Confirmed)
    }
}

pub struct AuthClientBuilder {
    config: Config,
    store: Arc<dyn CredentialStore>,
    stages: Vec<Arc<dyn RequestStage>>,
}

impl AuthClientBuilder {
    /// Adds a request stage that runs after the bearer stage on every attempt.
    pub fn with_stage(mut self, stage: Arc<dyn RequestStage>) -> Self {
        self.stages.push(stage);
        self
    }

    pub fn build(self) -> Result<AuthClient, Error> {
        self.config.validate()?;
        let config = Arc::new(self.config);
        let transport = HttpTransport::new(Arc::clone(&config))?;
        let mut pipeline =
            Pipeline::new().with_stage(Arc::new(BearerAuth::new(Arc::clone(&self.store))));
        for stage in self.stages {
            pipeline = pipeline.with_stage(stage);
        }
        let guard = RefreshGuard::new(Arc::clone(&self.store), config.dedupe_refresh);
        Ok(AuthClient {
            config,
            transport,
            store: self.store,
            pipeline: Arc::new(pipeline),
            guard: Arc::new(guard),
            events: SessionEvents::new(),
        })
    }
}

impl AuthClient {
    pub fn new(config: Config, store: Arc<dyn CredentialStore>) -> Result<Self, Error> {
        Self::builder(config, store).build()
    }

    pub fn builder(config: Config, store: Arc<dyn CredentialStore>) -> AuthClientBuilder {
        AuthClientBuilder {
            config,
            store,
            stages: Vec::new(),
        }
    }

    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<crate::session::SessionEvent> {
        self.events.subscribe()
    }
}
