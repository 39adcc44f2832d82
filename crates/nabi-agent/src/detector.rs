//! Empty-argument tool-call detection
//!
//! Watches the tool-call argument deltas of one streaming turn. When a
//! side-effecting tool is invoked with empty arguments (the phrase-triggered
//! convention from the system prompt), the detector asks the caller to abort
//! the turn so a form can collect the missing parameters instead.

use crate::fragment::StreamedFragment;
use crate::gate::{FormGateState, FormKind};
use crate::tools::ToolKind;

/// The argument buffer for the tool call currently streaming.
///
/// Lives for one invocation within one turn; discarded when the invocation's
/// result arrives or the turn ends.
#[derive(Debug)]
struct PendingToolCall {
    name: String,
    form: FormKind,
    buffer: String,
    /// A verdict (fire or suppress) was already reached for this invocation
    decided: bool,
}

/// Detects side-effecting tool calls arriving with empty arguments.
///
/// Fires at most once per streaming turn; the turn is aborted on the first
/// positive verdict.
#[derive(Debug, Default)]
pub struct ToolInvocationDetector {
    pending: Option<PendingToolCall>,
    fired: bool,
}

impl ToolInvocationDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inspect one fragment. Returns the form to open when the turn must be
    /// interrupted.
    ///
    /// When `just_submitted_form` is set on the gate, the first qualifying
    /// empty call is the agent re-confirming a submission that already
    /// happened; the flag is consumed and the interrupt suppressed.
    pub fn observe(
        &mut self,
        fragment: &StreamedFragment,
        gate: &mut FormGateState,
    ) -> Option<FormKind> {
        if self.fired {
            return None;
        }

        match fragment {
            StreamedFragment::ToolCallDelta { name, delta } => {
                let Some(form) = ToolKind::from_name(name).and_then(ToolKind::form_kind) else {
                    // Unknown or read-only tool: never matches the interrupt
                    // condition.
                    self.pending = None;
                    return None;
                };

                if !matches!(&self.pending, Some(call) if call.name == *name) {
                    self.pending = Some(PendingToolCall {
                        name: name.clone(),
                        form,
                        buffer: String::new(),
                        decided: false,
                    });
                }
                let Some(call) = self.pending.as_mut() else {
                    return None;
                };
                if call.decided {
                    return None;
                }

                call.buffer.push_str(delta);
                if !arguments_empty(&call.buffer) {
                    // Truncated or non-empty JSON: no verdict yet.
                    return None;
                }
                call.decided = true;

                if gate.consume_just_submitted() {
                    tracing::debug!(
                        tool = %name,
                        "empty call right after a form submission, suppressing interrupt"
                    );
                    return None;
                }

                tracing::debug!(tool = %name, form = ?form, "empty tool call, interrupting turn");
                gate.set_pending(form);
                self.fired = true;
                Some(form)
            }
            StreamedFragment::ToolResult { name, .. } => {
                // The invocation finished; later deltas belong to a new call.
                if matches!(&self.pending, Some(call) if call.name == *name) {
                    self.pending = None;
                }
                None
            }
            StreamedFragment::TextDelta { .. } => None,
        }
    }
}

/// Whether an accumulated argument buffer represents "no arguments".
///
/// Empty means: nothing accumulated, the literal empty object, or valid JSON
/// that is an empty mapping. Anything else (including truncated JSON) is not
/// empty.
fn arguments_empty(buffer: &str) -> bool {
    let trimmed = buffer.trim();
    if trimmed.is_empty() || trimmed == "{}" {
        return true;
    }
    matches!(
        serde_json::from_str::<serde_json::Value>(trimmed),
        Ok(serde_json::Value::Object(map)) if map.is_empty()
    )
}
