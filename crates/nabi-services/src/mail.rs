//! Gmail collaborator contract: listing, search, send, label changes.
//!
//! The REST/OAuth plumbing is owned by the implementor; this module fixes the
//! narrow interface the assistant core depends on, plus the MIME/raw encoding
//! Gmail's `messages.send` expects.

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Metadata for one inbox message, as shown in list/search results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailSummary {
    pub id: String,
    pub subject: String,
    pub from: String,
    pub date: String,
    /// Short body preview supplied by the API
    pub snippet: String,
}

/// An outgoing email as collected from the user.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmailDraft {
    pub to: Vec<String>,
    pub subject: String,
    pub body: String,
    #[serde(default)]
    pub cc: Vec<String>,
    #[serde(default)]
    pub bcc: Vec<String>,
    /// Send the body as text/html instead of text/plain
    #[serde(default)]
    pub html: bool,
}

impl EmailDraft {
    /// Encode the draft as the URL-safe base64 `raw` payload Gmail's
    /// `messages.send` endpoint takes: an RFC 2822 message with To/Cc/Bcc and
    /// Subject headers and a single text part.
    pub fn encode_raw(&self) -> String {
        let mut message = String::new();
        message.push_str(&format!("To: {}\r\n", self.to.join(", ")));
        if !self.cc.is_empty() {
            message.push_str(&format!("Cc: {}\r\n", self.cc.join(", ")));
        }
        if !self.bcc.is_empty() {
            message.push_str(&format!("Bcc: {}\r\n", self.bcc.join(", ")));
        }
        message.push_str(&format!("Subject: {}\r\n", self.subject));
        let content_type = if self.html { "text/html" } else { "text/plain" };
        message.push_str("MIME-Version: 1.0\r\n");
        message.push_str(&format!(
            "Content-Type: {}; charset=\"utf-8\"\r\n\r\n",
            content_type
        ));
        message.push_str(&self.body);
        URL_SAFE.encode(message)
    }
}

/// Confirmation returned after a successful send.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentEmail {
    pub id: String,
}

/// Label change applied to one message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelAction {
    Read,
    Unread,
    Archive,
    Trash,
}

impl LabelAction {
    /// Parse a user/agent supplied action name. Unknown actions are rejected.
    pub fn parse(action: &str) -> Option<Self> {
        match action.to_lowercase().as_str() {
            "read" => Some(Self::Read),
            "unread" => Some(Self::Unread),
            "archive" => Some(Self::Archive),
            "trash" => Some(Self::Trash),
            _ => None,
        }
    }

    /// Gmail label ids to add and remove for this action.
    pub fn label_changes(self) -> (&'static [&'static str], &'static [&'static str]) {
        match self {
            Self::Read => (&[], &["UNREAD"]),
            Self::Unread => (&["UNREAD"], &[]),
            Self::Archive => (&[], &["INBOX"]),
            Self::Trash => (&["TRASH"], &["INBOX"]),
        }
    }
}

/// The mail operations the assistant core needs.
#[async_trait]
pub trait MailService: Send + Sync {
    /// List the most recent inbox messages.
    async fn list_inbox(&self, max_results: u32) -> Result<Vec<EmailSummary>>;

    /// Search messages with a Gmail query string (e.g. `from:a@b.com`).
    async fn search(&self, query: &str, max_results: u32) -> Result<Vec<EmailSummary>>;

    /// Send a draft. Returns the sent message id.
    async fn send(&self, draft: &EmailDraft) -> Result<SentEmail>;

    /// Apply a label change to one message. Returns the message id.
    async fn modify_labels(&self, msg_id: &str, action: LabelAction) -> Result<String>;
}

/// Render one email as the multi-line block shown in the transcript side panel.
pub fn format_email(email: &EmailSummary) -> String {
    format!(
        "제목: {}\n발신자: {}\n날짜: {}\n미리보기: {}\nID: {}",
        email.subject, email.from, email.date, email.snippet, email.id
    )
}

/// Split a comma-separated recipient field into trimmed, non-empty addresses.
pub fn split_recipients(field: &str) -> Vec<String> {
    field
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_raw_plain_text_headers() {
        let draft = EmailDraft {
            to: vec!["a@example.com".into(), "b@example.com".into()],
            subject: "회의 일정".into(),
            body: "내일 뵙겠습니다.".into(),
            ..Default::default()
        };
        let raw = draft.encode_raw();
        let decoded = URL_SAFE.decode(raw).unwrap();
        let text = String::from_utf8(decoded).unwrap();
        assert!(text.starts_with("To: a@example.com, b@example.com\r\n"));
        assert!(text.contains("Subject: 회의 일정\r\n"));
        assert!(text.contains("Content-Type: text/plain"));
        assert!(!text.contains("Cc:"));
        assert!(text.ends_with("내일 뵙겠습니다."));
    }

    #[test]
    fn test_encode_raw_html_with_cc_bcc() {
        let draft = EmailDraft {
            to: vec!["a@example.com".into()],
            subject: "hi".into(),
            body: "<b>hello</b>".into(),
            cc: vec!["c@example.com".into()],
            bcc: vec!["d@example.com".into()],
            html: true,
        };
        let decoded = URL_SAFE.decode(draft.encode_raw()).unwrap();
        let text = String::from_utf8(decoded).unwrap();
        assert!(text.contains("Cc: c@example.com\r\n"));
        assert!(text.contains("Bcc: d@example.com\r\n"));
        assert!(text.contains("Content-Type: text/html"));
    }

    #[test]
    fn test_label_action_parse() {
        assert_eq!(LabelAction::parse("Archive"), Some(LabelAction::Archive));
        assert_eq!(LabelAction::parse("TRASH"), Some(LabelAction::Trash));
        assert_eq!(LabelAction::parse("read"), Some(LabelAction::Read));
        assert_eq!(LabelAction::parse("star"), None);
    }

    #[test]
    fn test_label_action_changes() {
        let (add, remove) = LabelAction::Trash.label_changes();
        assert_eq!(add, &["TRASH"]);
        assert_eq!(remove, &["INBOX"]);

        let (add, remove) = LabelAction::Read.label_changes();
        assert!(add.is_empty());
        assert_eq!(remove, &["UNREAD"]);
    }

    #[test]
    fn test_split_recipients() {
        assert_eq!(
            split_recipients(" a@b.com , ,c@d.com"),
            vec!["a@b.com".to_string(), "c@d.com".to_string()]
        );
        assert!(split_recipients("  ").is_empty());
    }

    #[test]
    fn test_format_email() {
        let email = EmailSummary {
            id: "m1".into(),
            subject: "안녕하세요".into(),
            from: "kim@example.com".into(),
            date: "Mon, 7 Apr 2025 10:00:00 +0900".into(),
            snippet: "첫 줄 미리보기".into(),
        };
        let block = format_email(&email);
        assert!(block.contains("제목: 안녕하세요"));
        assert!(block.contains("ID: m1"));
    }
}
