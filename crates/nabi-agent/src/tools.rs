//! The tool roster the agent runtime is given at session initialization

use serde::{Deserialize, Serialize};

use crate::gate::FormKind;

/// A capability the agent may invoke, fixed at session-initialization time.
///
/// Lookups by name fail closed: a name outside this roster never matches the
/// interrupt condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolKind {
    Weather,
    ListEmails,
    SearchEmails,
    SendEmail,
    ModifyEmail,
    ListEvents,
    CreateEvent,
    WebSearch,
}

impl ToolKind {
    /// Every tool, in roster order.
    pub const ALL: [ToolKind; 8] = [
        ToolKind::Weather,
        ToolKind::ListEmails,
        ToolKind::SearchEmails,
        ToolKind::SendEmail,
        ToolKind::ModifyEmail,
        ToolKind::ListEvents,
        ToolKind::CreateEvent,
        ToolKind::WebSearch,
    ];

    /// The wire name used in agent tool calls.
    pub fn name(self) -> &'static str {
        match self {
            ToolKind::Weather => "get_weather",
            ToolKind::ListEmails => "list_emails_tool",
            ToolKind::SearchEmails => "search_emails_tool",
            ToolKind::SendEmail => "send_email_tool",
            ToolKind::ModifyEmail => "modify_email_tool",
            ToolKind::ListEvents => "list_events_tool",
            ToolKind::CreateEvent => "create_event_tool",
            ToolKind::WebSearch => "perplexity_search",
        }
    }

    /// Look up a tool by wire name. Unknown names return `None`.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tool| tool.name() == name)
    }

    /// The form that must collect parameters before this tool may run, if the
    /// tool is side-effecting.
    pub fn form_kind(self) -> Option<FormKind> {
        match self {
            ToolKind::SendEmail => Some(FormKind::Email),
            ToolKind::CreateEvent => Some(FormKind::Calendar),
            _ => None,
        }
    }

    /// One-line description for the system prompt.
    pub fn description(self) -> &'static str {
        match self {
            ToolKind::Weather => "현재 위치의 날씨를 조회합니다.",
            ToolKind::ListEmails => "받은편지함의 이메일 목록을 조회합니다.",
            ToolKind::SearchEmails => "Gmail에서 이메일을 검색합니다.",
            ToolKind::SendEmail => "이메일을 전송합니다.",
            ToolKind::ModifyEmail => "이메일 라벨을 수정합니다 (read, unread, archive, trash).",
            ToolKind::ListEvents => "캘린더에서 다가오는 일정을 조회합니다.",
            ToolKind::CreateEvent => "캘린더에 새 일정을 추가합니다.",
            ToolKind::WebSearch => "웹 검색으로 최신 정보를 조회합니다.",
        }
    }
}

/// Build the system instructions for a session's tool roster.
///
/// The trigger-phrase rule is what makes the form-interrupt flow work: on
/// those phrases the agent calls the tool with empty arguments instead of
/// asking follow-up questions, and the detector intercepts that call.
pub fn system_prompt(tools: &[ToolKind]) -> String {
    let mut prompt = String::from(
        "당신은 개인 비서 '나비'입니다. 주어진 도구만 사용하여 질문에 답하세요. \
         목록에 없는 도구는 절대 사용하지 마세요. 한국어로 답변하세요.\n\n사용 가능한 도구:\n",
    );
    for tool in tools {
        prompt.push_str(&format!("- {}: {}\n", tool.name(), tool.description()));
    }
    prompt.push_str(
        "\n규칙: 사용자가 \"일정 추가\"를 요청하면 즉시 create_event_tool을 빈 인자 {}로 \
         호출하세요. 사용자가 \"메일 보내\" 또는 \"이메일 보내\"를 요청하면 즉시 \
         send_email_tool을 빈 인자 {}로 호출하세요. 세부 정보를 되묻지 마세요.",
    );
    prompt
}
