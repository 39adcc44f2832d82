//! In-memory conversation transcript

use serde::{Deserialize, Serialize};

/// Who authored a transcript entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

/// One committed transcript entry. Tool output rides alongside the
/// assistant text so the caller can render it collapsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_output: Option<String>,
    /// Unix timestamp, seconds.
    pub timestamp: i64,
}

impl ConversationTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            tool_output: None,
            timestamp: chrono::Utc::now().timestamp(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            tool_output: None,
            timestamp: chrono::Utc::now().timestamp(),
        }
    }

    pub fn with_tool_output(mut self, tool_output: impl Into<String>) -> Self {
        let tool_output = tool_output.into();
        self.tool_output = (!tool_output.is_empty()).then_some(tool_output);
        self
    }
}

/// Append-only transcript for the current session. Entries are only
/// committed once a turn settles; an interrupted or failed turn leaves
/// the transcript untouched.
#[derive(Debug, Default)]
pub struct ConversationHistory {
    turns: Vec<ConversationTurn>,
}

impl ConversationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the transcript with an opening assistant greeting.
    pub fn with_greeting(greeting: impl Into<String>) -> Self {
        Self {
            turns: vec![ConversationTurn::assistant(greeting)],
        }
    }

    pub fn push(&mut self, turn: ConversationTurn) {
        self.turns.push(turn);
    }

    /// Replace the opening greeting in place, or install one if the
    /// transcript is empty.
    pub fn replace_greeting(&mut self, greeting: impl Into<String>) {
        if let Some(first) = self.turns.first_mut() {
            if first.role == Role::Assistant {
                first.content = greeting.into();
                return;
            }
        }
        self.turns.insert(0, ConversationTurn::assistant(greeting));
    }

    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }
}
