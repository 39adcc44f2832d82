//! Google Calendar collaborator contract: upcoming events and event creation.

use async_trait::async_trait;
use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Time zone attached to created events.
pub const DEFAULT_TIME_ZONE: &str = "Asia/Seoul";

/// A new event as collected from the user or the agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventDraft {
    pub summary: String,
    pub start: NaiveDateTime,
    /// Defaults to one hour after `start` when absent
    pub end: Option<NaiveDateTime>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub attendees: Vec<String>,
}

impl EventDraft {
    /// Validate the draft and fill in defaults.
    ///
    /// The summary must be non-empty and the end time, once defaulted, must
    /// come after the start time.
    pub fn normalized(mut self) -> Result<Self> {
        self.summary = self.summary.trim().to_string();
        if self.summary.is_empty() {
            return Err(Error::InvalidInput(
                "일정 제목은 필수 입력 항목입니다.".into(),
            ));
        }
        let end = self.end.unwrap_or(self.start + Duration::hours(1));
        if end <= self.start {
            return Err(Error::InvalidInput(
                "종료 시간은 시작 시간 이후여야 합니다.".into(),
            ));
        }
        self.end = Some(end);
        Ok(self)
    }
}

/// Confirmation returned after a successful creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedEvent {
    pub id: String,
    #[serde(default)]
    pub html_link: Option<String>,
}

/// When an event starts: a clock time or an all-day date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EventStart {
    DateTime(NaiveDateTime),
    AllDay(NaiveDate),
}

/// One upcoming event, as shown in list results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventSummary {
    pub id: String,
    pub summary: String,
    pub start: EventStart,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub attendees: Vec<String>,
    #[serde(default)]
    pub html_link: Option<String>,
}

/// The calendar operations the assistant core needs.
#[async_trait]
pub trait CalendarService: Send + Sync {
    /// List upcoming events, soonest first.
    async fn list_upcoming(&self, max_results: u32) -> Result<Vec<EventSummary>>;

    /// Create an event from a normalized draft. Returns the event id and link.
    async fn create(&self, draft: &EventDraft) -> Result<CreatedEvent>;
}

/// Render one event as the multi-line block shown in the transcript side panel.
pub fn format_event(event: &EventSummary) -> String {
    let start = match &event.start {
        EventStart::DateTime(dt) => dt.format("%Y년 %m월 %d일 %H:%M").to_string(),
        EventStart::AllDay(date) => format!("{} (종일)", date.format("%Y년 %m월 %d일")),
    };

    let mut block = format!("제목: {}\n시작: {}", event.summary, start);
    if let Some(location) = &event.location {
        block.push_str(&format!("\n장소: {}", location));
    }
    if let Some(description) = &event.description {
        block.push_str(&format!("\n설명: {}", description));
    }
    if !event.attendees.is_empty() {
        block.push_str(&format!("\n참석자: {}", event.attendees.join(", ")));
    }
    block.push_str(&format!("\nID: {}", event.id));
    block
}
