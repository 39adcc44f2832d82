//! Incremental agent-output fragments

use std::pin::Pin;

use serde::{Deserialize, Serialize};
use tokio_stream::Stream;

/// One incremental unit of streamed agent output.
///
/// Fragments are produced by the agent runtime and consumed exactly once, in
/// arrival order, by the accumulator/detector pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamedFragment {
    /// A piece of the assistant's text reply
    TextDelta { delta: String },

    /// A piece of the argument JSON for an in-progress tool call
    ToolCallDelta { name: String, delta: String },

    /// A completed tool execution result
    ToolResult { name: String, payload: String },
}

impl StreamedFragment {
    /// Create a text delta
    pub fn text(delta: impl Into<String>) -> Self {
        Self::TextDelta {
            delta: delta.into(),
        }
    }

    /// Create a tool-call argument delta
    pub fn tool_call(name: impl Into<String>, delta: impl Into<String>) -> Self {
        Self::ToolCallDelta {
            name: name.into(),
            delta: delta.into(),
        }
    }

    /// Create a completed tool result
    pub fn tool_result(name: impl Into<String>, payload: impl Into<String>) -> Self {
        Self::ToolResult {
            name: name.into(),
            payload: payload.into(),
        }
    }
}

/// A stream of fragments from one agent turn. A stream error means the
/// runtime failed mid-turn; the orchestrator converts it into a `Failed`
/// outcome.
pub type FragmentStream =
    Pin<Box<dyn Stream<Item = crate::error::Result<StreamedFragment>> + Send>>;
