//! Authenticated HTTP client for the chat backend.
//!
//! Attaches the stored access token to every request, refreshes it once when the
//! backend answers 401, replays the rejected request, and drops to a logged-out state
//! when the refresh itself fails.

mod client;
pub mod config;
pub mod errors;
pub mod pipeline;
pub mod request_context;
pub mod session;
pub mod store;
pub mod telemetry;
pub mod token;
pub mod types;

pub use client::{AuthClient, AuthClientBuilder, LogoutOutcome};
pub use config::{Config, Endpoints};
pub use errors::Error;
pub use request_context::{PendingRequest, RequestContext};
pub use session::SessionEvent;
pub use store::{CredentialStore, FileCredentialStore, MemoryCredentialStore};
pub use types::{ApiResponse, AuthResponse, CredentialPair};
