use std::fmt;
use std::time::Duration;

use tracing::{Level, event};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Login,
    Signup,
    Refresh,
    Logout,
    Request,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationKind::Login => write!(f, "login"),
            OperationKind::Signup => write!(f, "signup"),
            OperationKind::Refresh => write!(f, "refresh"),
            OperationKind::Logout => write!(f, "logout"),
            OperationKind::Request => write!(f, "request"),
        }
    }
}

/// Summary of one logical request, logged once it settles.
#[derive(Debug, Clone)]
pub struct DispatchOutcome {
    pub request_id: Uuid,
    pub operation: OperationKind,
    pub attempts: u8,
    pub refreshed: bool,
    pub success: bool,
    pub elapsed: Duration,
}

impl DispatchOutcome {
    pub fn log(&self) {
        event!(
            Level::INFO,
            request_id = %self.request_id,
            operation = %self.operation,
            attempts = self.attempts,
            refreshed = self.refreshed,
            success = self.success,
            elapsed_ms = self.elapsed.as_millis() as u64,
            "dispatch.outcome"
        );
    }
}
