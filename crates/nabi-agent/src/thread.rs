//! Thread identity: the correlation id scoping the agent runtime's memory

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque correlation id for one conversation thread.
///
/// Exactly one identity is live per session. Rotating it makes the agent
/// runtime forget the conversation so far, which is how an aborted tool call
/// is prevented from replaying after a form submission.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ThreadIdentity(Uuid);

impl ThreadIdentity {
    /// Create a fresh identity.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Replace this identity with a fresh one. The old value is never reused.
    pub fn rotate(&mut self) {
        self.0 = Uuid::new_v4();
    }
}

impl Default for ThreadIdentity {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ThreadIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}
