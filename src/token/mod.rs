mod guard;

pub use guard::{RefreshDecision, RefreshGuard};
