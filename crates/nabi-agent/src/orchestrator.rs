//! One user-query-to-response cycle

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::accumulator::{DisplaySink, StreamingAccumulator};
use crate::detector::ToolInvocationDetector;
use crate::gate::{FormGateState, FormKind};
use crate::runtime::{AgentRuntime, RuntimeConfig};
use crate::thread::ThreadIdentity;

/// Default per-turn budget for the agent call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// How one turn ended. Exactly one of these is produced per `run_turn`;
/// nothing from the runtime propagates as an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// The stream finished normally.
    Completed { text: String, tool_log: String },

    /// A side-effecting tool call with empty arguments was intercepted; the
    /// caller must show the form and commit nothing to history for this turn.
    Interrupted {
        form: FormKind,
        partial_text: String,
        partial_tool_log: String,
    },

    /// The agent call exceeded its budget. Fragments that arrived before the
    /// deadline are preserved in `partial_text` but only `message` is meant
    /// for the transcript.
    TimedOut {
        message: String,
        partial_text: String,
    },

    /// The runtime failed. `message` is user-facing; the raw error goes to
    /// the log.
    Failed { message: String },
}

/// Drives one turn: runtime invocation, fragment fan-out to the
/// accumulator/detector pair, deadline enforcement, and outcome
/// classification.
pub struct AgentTurnOrchestrator {
    runtime: Arc<dyn AgentRuntime>,
    runtime_config: RuntimeConfig,
    timeout: Duration,
}

impl AgentTurnOrchestrator {
    /// Create an orchestrator with the default tool roster and timeout.
    pub fn new(runtime: Arc<dyn AgentRuntime>) -> Self {
        Self {
            runtime,
            runtime_config: RuntimeConfig::default(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set the per-turn timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Replace the runtime configuration (tool roster, limits).
    pub fn with_runtime_config(mut self, config: RuntimeConfig) -> Self {
        self.runtime_config = config;
        self
    }

    pub fn runtime_config(&self) -> &RuntimeConfig {
        &self.runtime_config
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run one turn for a non-empty query against the live thread identity.
    ///
    /// The whole turn shares a single deadline: fragments accumulated before
    /// a timeout or interrupt are preserved in the returned outcome. The
    /// detector's verdict is checked after every fragment, and a positive
    /// verdict cancels the runtime call cooperatively.
    pub async fn run_turn(
        &self,
        query: &str,
        thread: &ThreadIdentity,
        gate: &mut FormGateState,
        sink: &mut dyn DisplaySink,
    ) -> TurnOutcome {
        let deadline = Instant::now() + self.timeout;
        let cancel = CancellationToken::new();
        let mut accumulator = StreamingAccumulator::new();
        let mut detector = ToolInvocationDetector::new();

        let run = self
            .runtime
            .run(query, thread, &self.runtime_config, cancel.clone());
        let mut stream = match tokio::time::timeout_at(deadline, run).await {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) => {
                tracing::error!(error = %e, "agent runtime failed to start");
                return TurnOutcome::Failed {
                    message: format!("처리 중 오류 발생: {e}"),
                };
            }
            Err(_) => {
                cancel.cancel();
                return TurnOutcome::TimedOut {
                    message: timeout_message(self.timeout),
                    partial_text: String::new(),
                };
            }
        };

        loop {
            match tokio::time::timeout_at(deadline, stream.next()).await {
                Err(_) => {
                    cancel.cancel();
                    tracing::warn!(timeout = ?self.timeout, "agent turn exceeded its budget");
                    return TurnOutcome::TimedOut {
                        message: timeout_message(self.timeout),
                        partial_text: accumulator.text(),
                    };
                }
                Ok(None) => break,
                Ok(Some(Err(e))) => {
                    cancel.cancel();
                    tracing::error!(error = %e, "agent runtime failed mid-turn");
                    return TurnOutcome::Failed {
                        message: format!("처리 중 오류 발생: {e}"),
                    };
                }
                Ok(Some(Ok(fragment))) => {
                    accumulator.on_fragment(&fragment, sink);
                    if let Some(form) = detector.observe(&fragment, gate) {
                        cancel.cancel();
                        return TurnOutcome::Interrupted {
                            form,
                            partial_text: accumulator.text(),
                            partial_tool_log: accumulator.tool_log(),
                        };
                    }
                }
            }
        }

        TurnOutcome::Completed {
            text: accumulator.text(),
            tool_log: accumulator.tool_log(),
        }
    }
}

/// The user-facing timeout message, carrying the configured budget.
pub fn timeout_message(timeout: Duration) -> String {
    format!(
        "⏱️ 요청 시간이 {}초를 초과했습니다. 나중에 다시 시도해 주세요.",
        timeout.as_secs()
    )
}
