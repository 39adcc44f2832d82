//! Streaming accumulation of text and tool output

use crate::fragment::StreamedFragment;

/// Live output target for a streaming turn.
///
/// `text_update` receives the full concatenated reply after every text delta
/// (monotonically growing, never reordered); `tool_log_update` receives the
/// full side-channel log after every tool result.
pub trait DisplaySink: Send {
    fn text_update(&mut self, text: &str);
    fn tool_log_update(&mut self, log: &str);
}

/// A sink that discards updates (headless turns and tests).
#[derive(Debug, Default)]
pub struct NullSink;

impl DisplaySink for NullSink {
    fn text_update(&mut self, _text: &str) {}
    fn tool_log_update(&mut self, _log: &str) {}
}

/// Separator between tool-log entries.
const TOOL_LOG_SEPARATOR: &str = "\n\n";

/// Merges one turn's fragments into the final reply text and an ordered
/// tool-output log.
///
/// Both buffers survive an interrupt or timeout, so partial results are never
/// discarded.
#[derive(Debug, Default)]
pub struct StreamingAccumulator {
    text: Vec<String>,
    tool_entries: Vec<String>,
}

impl StreamingAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume one fragment, pushing live updates to the sink.
    ///
    /// Tool-call argument deltas are the detector's concern and are ignored
    /// here.
    pub fn on_fragment(&mut self, fragment: &StreamedFragment, sink: &mut dyn DisplaySink) {
        match fragment {
            StreamedFragment::TextDelta { delta } => {
                self.text.push(delta.clone());
                sink.text_update(&self.text());
            }
            StreamedFragment::ToolResult { name, payload } => {
                self.tool_entries.push(format_tool_entry(name, payload));
                sink.tool_log_update(&self.tool_log());
            }
            StreamedFragment::ToolCallDelta { .. } => {}
        }
    }

    /// The reply so far: every text delta concatenated in arrival order.
    pub fn text(&self) -> String {
        self.text.concat()
    }

    /// The tool-output log so far, entries joined in arrival order.
    pub fn tool_log(&self) -> String {
        self.tool_entries.join(TOOL_LOG_SEPARATOR)
    }
}

/// Render one tool result for the side-channel log: pretty-printed JSON when
/// the payload parses, preformatted text otherwise, labeled with the tool
/// name.
fn format_tool_entry(name: &str, payload: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(payload) {
        Ok(value) => {
            let pretty = serde_json::to_string_pretty(&value).unwrap_or_else(|_| payload.to_string());
            format!("🔧 {name}\n```json\n{pretty}\n```")
        }
        Err(_) => format!("🔧 {name}\n```\n{payload}\n```"),
    }
}
