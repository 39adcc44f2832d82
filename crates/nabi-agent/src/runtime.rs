//! Agent runtime abstraction
//!
//! The language-model agent that plans and executes tool calls is externally
//! owned. This module fixes the contract the orchestrator drives it through.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::Result;
use crate::fragment::FragmentStream;
use crate::thread::ThreadIdentity;
use crate::tools::{self, ToolKind};

/// Configuration passed to the runtime on every turn.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// System instructions, including the tool roster and trigger-phrase rule
    pub system_prompt: String,
    /// Tools the agent may use; anything else is off limits
    pub tools: Vec<ToolKind>,
    /// Maximum internal plan/act steps per turn
    pub recursion_limit: u32,
    /// Maximum concurrent tool executions
    pub max_concurrency: u32,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        let tools = ToolKind::ALL.to_vec();
        Self {
            system_prompt: tools::system_prompt(&tools),
            tools,
            recursion_limit: 200,
            max_concurrency: 1,
        }
    }
}

/// The externally-owned agent runtime.
///
/// One call corresponds to one user-query turn. The runtime streams fragments
/// in emission order; cancelling the token tells it to stop as soon as it
/// can. Its own conversation memory is keyed by the thread identity.
#[async_trait]
pub trait AgentRuntime: Send + Sync {
    async fn run(
        &self,
        query: &str,
        thread: &ThreadIdentity,
        config: &RuntimeConfig,
        cancel: CancellationToken,
    ) -> Result<FragmentStream>;
}
