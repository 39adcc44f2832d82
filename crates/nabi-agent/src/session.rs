//! Session facade: ties the orchestrator, transcript, form gate, and
//! collaborator services into one conversational surface.

use std::sync::Arc;

use nabi_services::{
    CalendarService, CreatedEvent, EmailDraft, EventDraft, MailService, SentEmail,
};

use crate::accumulator::{DisplaySink, NullSink};
use crate::error::{Error, Result};
use crate::gate::{FormGateState, FormKind};
use crate::history::{ConversationHistory, ConversationTurn};
use crate::orchestrator::{AgentTurnOrchestrator, TurnOutcome};
use crate::thread::ThreadIdentity;

/// Opening assistant message for a fresh transcript.
pub const DEFAULT_GREETING: &str = "안녕하세요! 무엇을 도와드릴까요? 😊";

/// One user-facing conversation. All mutable turn state lives here: the
/// transcript, the live thread identity, and the form gate.
pub struct Session {
    orchestrator: AgentTurnOrchestrator,
    mail: Arc<dyn MailService + Send + Sync>,
    calendar: Arc<dyn CalendarService + Send + Sync>,
    history: ConversationHistory,
    gate: FormGateState,
    thread: ThreadIdentity,
}

impl Session {
    pub fn new(
        orchestrator: AgentTurnOrchestrator,
        mail: Arc<dyn MailService + Send + Sync>,
        calendar: Arc<dyn CalendarService + Send + Sync>,
    ) -> Self {
        Self {
            orchestrator,
            mail,
            calendar,
            history: ConversationHistory::with_greeting(DEFAULT_GREETING),
            gate: FormGateState::new(),
            thread: ThreadIdentity::new(),
        }
    }

    /// Swap the opening greeting without touching the rest of the transcript.
    pub fn set_greeting(&mut self, greeting: impl Into<String>) {
        self.history.replace_greeting(greeting);
    }

    pub fn history(&self) -> &ConversationHistory {
        &self.history
    }

    pub fn thread(&self) -> &ThreadIdentity {
        &self.thread
    }

    /// The form the user still owes input for, if any. Email wins when both
    /// flags happen to be set; shells rendering the forms independently
    /// should read [`Session::is_form_pending`] per form instead.
    pub fn pending_form(&self) -> Option<FormKind> {
        self.gate.pending_form()
    }

    /// Whether one specific form is waiting for user input.
    pub fn is_form_pending(&self, form: FormKind) -> bool {
        self.gate.is_pending(form)
    }

    /// Run one turn and commit it to the transcript according to its outcome.
    ///
    /// Completed turns commit the user query and the assistant reply (tool
    /// log attached). A timeout commits only the timeout notice. Interrupted
    /// and failed turns commit nothing; the caller reads the outcome to
    /// decide what to render.
    pub async fn ask(&mut self, query: &str) -> Result<TurnOutcome> {
        self.ask_with_sink(query, &mut NullSink).await
    }

    /// Like [`Session::ask`] with a live sink for incremental rendering.
    pub async fn ask_with_sink(
        &mut self,
        query: &str,
        sink: &mut dyn DisplaySink,
    ) -> Result<TurnOutcome> {
        let query = query.trim();
        if query.is_empty() {
            return Err(Error::EmptyQuery);
        }

        let outcome = self
            .orchestrator
            .run_turn(query, &self.thread, &mut self.gate, sink)
            .await;

        match &outcome {
            TurnOutcome::Completed { text, tool_log } => {
                self.history.push(ConversationTurn::user(query));
                self.history.push(
                    ConversationTurn::assistant(text.clone()).with_tool_output(tool_log.clone()),
                );
            }
            TurnOutcome::TimedOut { message, .. } => {
                self.history.push(ConversationTurn::assistant(message.clone()));
            }
            TurnOutcome::Interrupted { .. } | TurnOutcome::Failed { .. } => {}
        }
        Ok(outcome)
    }

    /// Submit the email form that an interrupted turn asked for.
    ///
    /// On success the pending flag clears, the thread identity rotates so the
    /// aborted tool call cannot replay, and a confirmation is committed to
    /// the transcript. A send failure keeps the form pending and commits a
    /// failure notice instead.
    pub async fn submit_email_form(&mut self, draft: &EmailDraft) -> Result<SentEmail> {
        let no_recipient = draft.to.iter().all(|t| t.trim().is_empty());
        if no_recipient || draft.subject.trim().is_empty() || draft.body.trim().is_empty() {
            return Err(Error::InvalidForm(
                "받는 사람, 제목, 내용은 필수 입력 항목입니다.".into(),
            ));
        }

        match self.mail.send(draft).await {
            Ok(sent) => {
                self.history.push(ConversationTurn::assistant(format!(
                    "✅ 이메일이 성공적으로 전송되었습니다. (ID: {})",
                    sent.id
                )));
                self.complete_form(FormKind::Email);
                Ok(sent)
            }
            Err(e) => {
                tracing::error!(error = %e, "email send failed");
                self.history.push(ConversationTurn::assistant(format!(
                    "❌ 이메일 전송에 실패했습니다: {e}"
                )));
                Err(e.into())
            }
        }
    }

    /// Submit the calendar form that an interrupted turn asked for.
    pub async fn submit_calendar_form(&mut self, draft: EventDraft) -> Result<CreatedEvent> {
        let draft = draft
            .normalized()
            .map_err(|e| Error::InvalidForm(e.to_string()))?;

        match self.calendar.create(&draft).await {
            Ok(created) => {
                let confirmation = match &created.html_link {
                    Some(link) => format!(
                        "✅ 일정이 성공적으로 추가되었습니다. (ID: {}) [일정 확인하기]({link})",
                        created.id
                    ),
                    None => format!("✅ 일정이 성공적으로 추가되었습니다. (ID: {})", created.id),
                };
                self.history.push(ConversationTurn::assistant(confirmation));
                self.complete_form(FormKind::Calendar);
                Ok(created)
            }
            Err(e) => {
                tracing::error!(error = %e, "event creation failed");
                self.history.push(ConversationTurn::assistant(format!(
                    "❌ 일정 추가에 실패했습니다: {e}"
                )));
                Err(e.into())
            }
        }
    }

    /// Dismiss a pending form without submitting it. The transcript is left
    /// untouched and the thread identity still rotates, so the aborted tool
    /// call is forgotten rather than replayed on the next turn.
    pub fn cancel_form(&mut self, form: FormKind) {
        if self.gate.is_pending(form) {
            self.gate.clear_pending(form);
            self.thread.rotate();
        }
    }

    /// Wipe the transcript and all turn state, starting a fresh conversation
    /// under a new thread identity.
    pub fn clear_conversation(&mut self) {
        self.history.clear();
        self.history.replace_greeting(DEFAULT_GREETING);
        self.gate.reset();
        self.thread.rotate();
    }

    fn complete_form(&mut self, form: FormKind) {
        self.gate.clear_pending(form);
        self.gate.mark_submitted();
        self.thread.rotate();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fragment::{FragmentStream, StreamedFragment};
    use crate::history::Role;
    use crate::runtime::{AgentRuntime, RuntimeConfig};
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use nabi_services::{EmailSummary, EventSummary, LabelAction};
    use parking_lot::Mutex;
    use tokio_util::sync::CancellationToken;

    /// Replays one scripted fragment list per turn.
    struct ScriptedRuntime {
        turns: Mutex<Vec<Vec<StreamedFragment>>>,
    }

    impl ScriptedRuntime {
        fn new(turns: Vec<Vec<StreamedFragment>>) -> Arc<Self> {
            Arc::new(Self {
                turns: Mutex::new(turns),
            })
        }
    }

    #[async_trait]
    impl AgentRuntime for ScriptedRuntime {
        async fn run(
            &self,
            _query: &str,
            _thread: &ThreadIdentity,
            _config: &RuntimeConfig,
            _cancel: CancellationToken,
        ) -> crate::error::Result<FragmentStream> {
            let fragments = {
                let mut turns = self.turns.lock();
                if turns.is_empty() { vec![] } else { turns.remove(0) }
            };
            let stream: FragmentStream = Box::pin(async_stream::stream! {
                for fragment in fragments {
                    yield Ok(fragment);
                }
            });
            Ok(stream)
        }
    }

    #[derive(Default)]
    struct StubMail {
        fail: bool,
        sent: Mutex<Vec<EmailDraft>>,
    }

    #[async_trait]
    impl MailService for StubMail {
        async fn list_inbox(&self, _max_results: u32) -> nabi_services::Result<Vec<EmailSummary>> {
            Ok(vec![])
        }

        async fn search(
            &self,
            _query: &str,
            _max_results: u32,
        ) -> nabi_services::Result<Vec<EmailSummary>> {
            Ok(vec![])
        }

        async fn send(&self, draft: &EmailDraft) -> nabi_services::Result<SentEmail> {
            if self.fail {
                return Err(nabi_services::Error::api(500, "backend error"));
            }
            self.sent.lock().push(draft.clone());
            Ok(SentEmail { id: "msg1".into() })
        }

        async fn modify_labels(
            &self,
            _msg_id: &str,
            _action: LabelAction,
        ) -> nabi_services::Result<String> {
            Ok(String::new())
        }
    }

    #[derive(Default)]
    struct StubCalendar {
        created: Mutex<Vec<EventDraft>>,
    }

    #[async_trait]
    impl CalendarService for StubCalendar {
        async fn list_upcoming(
            &self,
            _max_results: u32,
        ) -> nabi_services::Result<Vec<EventSummary>> {
            Ok(vec![])
        }

        async fn create(&self, draft: &EventDraft) -> nabi_services::Result<CreatedEvent> {
            self.created.lock().push(draft.clone());
            // The link is opaque on purpose: the event id must come from the
            // confirmation text itself, not ride in on the URL.
            Ok(CreatedEvent {
                id: "evt123".into(),
                html_link: Some(
                    "https://www.google.com/calendar/event?eid=X2Fib3JlZDEyM19vcGFxdWU".into(),
                ),
            })
        }
    }

    fn session_with(turns: Vec<Vec<StreamedFragment>>) -> Session {
        Session::new(
            AgentTurnOrchestrator::new(ScriptedRuntime::new(turns)),
            Arc::new(StubMail::default()),
            Arc::new(StubCalendar::default()),
        )
    }

    fn draft_event(summary: &str) -> EventDraft {
        EventDraft {
            summary: summary.into(),
            start: NaiveDate::from_ymd_opt(2025, 3, 14)
                .unwrap()
                .and_hms_opt(10, 0, 0)
                .unwrap(),
            end: None,
            location: None,
            description: None,
            attendees: vec![],
        }
    }

    #[tokio::test]
    async fn test_completed_turn_commits_user_and_assistant() {
        let mut session = session_with(vec![vec![
            StreamedFragment::tool_result("get_weather", "맑음"),
            StreamedFragment::text("맑습니다."),
        ]]);

        let outcome = session.ask("오늘 날씨 어때?").await.unwrap();
        assert!(matches!(outcome, TurnOutcome::Completed { .. }));

        let turns = session.history().turns();
        assert_eq!(turns.len(), 3); // greeting + user + assistant
        assert_eq!(turns[1].role, Role::User);
        assert_eq!(turns[1].content, "오늘 날씨 어때?");
        assert_eq!(turns[2].content, "맑습니다.");
        assert!(turns[2].tool_output.as_deref().unwrap().contains("get_weather"));
    }

    #[tokio::test]
    async fn test_blank_query_is_rejected_before_the_runtime() {
        let mut session = session_with(vec![]);
        let err = session.ask("   ").await.unwrap_err();
        assert!(matches!(err, Error::EmptyQuery));
        assert_eq!(session.history().len(), 1);
    }

    #[tokio::test]
    async fn test_interrupted_turn_commits_nothing_and_exposes_form() {
        let mut session = session_with(vec![vec![StreamedFragment::tool_call(
            "send_email_tool",
            "{}",
        )]]);

        let outcome = session.ask("메일 보내줘").await.unwrap();
        assert!(matches!(
            outcome,
            TurnOutcome::Interrupted {
                form: FormKind::Email,
                ..
            }
        ));
        assert_eq!(session.history().len(), 1);
        assert_eq!(session.pending_form(), Some(FormKind::Email));
    }

    #[tokio::test]
    async fn test_calendar_form_submission_rotates_thread_and_confirms() {
        let mut session = session_with(vec![vec![StreamedFragment::tool_call(
            "create_event_tool",
            "{}",
        )]]);
        session.ask("일정 추가").await.unwrap();
        let before = session.thread().clone();

        let created = session.submit_calendar_form(draft_event("회의")).await.unwrap();

        assert_eq!(created.id, "evt123");
        assert_eq!(session.pending_form(), None);
        assert_ne!(session.thread(), &before);
        assert!(session.gate.just_submitted());
        let last = session.history().turns().last().unwrap();
        assert!(last.content.contains("일정이 성공적으로 추가되었습니다"));
        assert!(last.content.contains("evt123"));
    }

    #[tokio::test]
    async fn test_retrigger_after_submission_is_suppressed_once() {
        // Turn 1 interrupts for the calendar form; after submission the agent
        // re-issues the same empty call in turn 2, which must pass through.
        let mut session = session_with(vec![
            vec![StreamedFragment::tool_call("create_event_tool", "{}")],
            vec![
                StreamedFragment::tool_call("create_event_tool", "{}"),
                StreamedFragment::text("방금 추가한 일정이 있습니다."),
            ],
        ]);
        session.ask("일정 추가").await.unwrap();
        session.submit_calendar_form(draft_event("Team sync")).await.unwrap();

        let outcome = session.ask("일정 추가").await.unwrap();
        assert!(matches!(outcome, TurnOutcome::Completed { .. }));
        assert_eq!(session.pending_form(), None);
        assert!(!session.gate.just_submitted());
    }

    #[tokio::test]
    async fn test_calendar_form_rejects_blank_summary() {
        let mut session = session_with(vec![vec![StreamedFragment::tool_call(
            "create_event_tool",
            "{}",
        )]]);
        session.ask("일정 추가").await.unwrap();

        let err = session.submit_calendar_form(draft_event("  ")).await.unwrap_err();
        assert!(matches!(err, Error::InvalidForm(_)));
        // The form stays up, nothing committed.
        assert_eq!(session.pending_form(), Some(FormKind::Calendar));
        assert_eq!(session.history().len(), 1);
    }

    #[tokio::test]
    async fn test_form_pending_flags_are_readable_independently() {
        // One turn interrupts for each form; both flags end up set and are
        // visible per form, while pending_form() keeps its email priority.
        let mut session = session_with(vec![
            vec![StreamedFragment::tool_call("create_event_tool", "{}")],
            vec![StreamedFragment::tool_call("send_email_tool", "{}")],
        ]);
        session.ask("일정 추가").await.unwrap();
        session.ask("메일 보내줘").await.unwrap();

        assert!(session.is_form_pending(FormKind::Email));
        assert!(session.is_form_pending(FormKind::Calendar));
        assert_eq!(session.pending_form(), Some(FormKind::Email));

        session.cancel_form(FormKind::Email);
        assert!(!session.is_form_pending(FormKind::Email));
        assert!(session.is_form_pending(FormKind::Calendar));
    }

    #[tokio::test]
    async fn test_email_confirmation_contains_message_id() {
        let mut session = session_with(vec![vec![StreamedFragment::tool_call(
            "send_email_tool",
            "{}",
        )]]);
        session.ask("메일 보내줘").await.unwrap();

        let draft = EmailDraft {
            to: vec!["kim@example.com".into()],
            subject: "안부".into(),
            body: "잘 지내시죠?".into(),
            ..Default::default()
        };
        let sent = session.submit_email_form(&draft).await.unwrap();

        assert_eq!(sent.id, "msg1");
        assert_eq!(session.pending_form(), None);
        let last = session.history().turns().last().unwrap();
        assert!(last.content.contains("이메일이 성공적으로 전송되었습니다"));
        assert!(last.content.contains("msg1"));
    }

    #[tokio::test]
    async fn test_email_send_failure_keeps_form_pending() {
        let runtime = ScriptedRuntime::new(vec![vec![StreamedFragment::tool_call(
            "send_email_tool",
            "{}",
        )]]);
        let mut session = Session::new(
            AgentTurnOrchestrator::new(runtime),
            Arc::new(StubMail {
                fail: true,
                ..Default::default()
            }),
            Arc::new(StubCalendar::default()),
        );
        session.ask("메일 보내줘").await.unwrap();

        let draft = EmailDraft {
            to: vec!["kim@example.com".into()],
            subject: "안부".into(),
            body: "잘 지내시죠?".into(),
            ..Default::default()
        };
        let err = session.submit_email_form(&draft).await;
        assert!(err.is_err());
        assert_eq!(session.pending_form(), Some(FormKind::Email));
        let last = session.history().turns().last().unwrap();
        assert!(last.content.contains("이메일 전송에 실패했습니다"));
    }

    #[tokio::test]
    async fn test_timeout_commits_only_the_notice() {
        // An empty script completes instantly, so drive the timeout path by
        // committing the outcome shape directly through a zero-length budget
        // is not possible here; instead reuse the orchestrator-level timeout
        // coverage and check the session-side commit rule with a scripted
        // TimedOut via a hanging runtime.
        struct HangingRuntime;

        #[async_trait]
        impl AgentRuntime for HangingRuntime {
            async fn run(
                &self,
                _query: &str,
                _thread: &ThreadIdentity,
                _config: &RuntimeConfig,
                _cancel: CancellationToken,
            ) -> crate::error::Result<FragmentStream> {
                let stream: FragmentStream = Box::pin(async_stream::stream! {
                    futures::future::pending::<()>().await;
                    yield Ok(StreamedFragment::text("unreachable"));
                });
                Ok(stream)
            }
        }

        let mut session = Session::new(
            AgentTurnOrchestrator::new(Arc::new(HangingRuntime))
                .with_timeout(std::time::Duration::from_secs(120)),
            Arc::new(StubMail::default()),
            Arc::new(StubCalendar::default()),
        );

        tokio::time::pause();
        let outcome = session.ask("뉴스 브리핑").await.unwrap();
        assert!(matches!(outcome, TurnOutcome::TimedOut { .. }));

        let turns = session.history().turns();
        assert_eq!(turns.len(), 2); // greeting + timeout notice
        assert_eq!(turns[1].role, Role::Assistant);
        assert!(turns[1].content.contains("120"));
    }

    #[tokio::test]
    async fn test_clear_conversation_resets_everything() {
        let mut session = session_with(vec![
            vec![StreamedFragment::text("안녕하세요?")],
            vec![StreamedFragment::tool_call("send_email_tool", "{}")],
        ]);
        session.ask("안녕").await.unwrap();
        session.ask("메일 보내줘").await.unwrap();
        let before = session.thread().clone();

        session.clear_conversation();

        assert_eq!(session.history().len(), 1);
        assert_eq!(session.history().turns()[0].content, DEFAULT_GREETING);
        assert_eq!(session.pending_form(), None);
        assert_ne!(session.thread(), &before);
    }

    #[tokio::test]
    async fn test_cancel_form_rotates_without_committing() {
        let mut session = session_with(vec![vec![StreamedFragment::tool_call(
            "create_event_tool",
            "{}",
        )]]);
        session.ask("일정 추가").await.unwrap();
        let before = session.thread().clone();

        session.cancel_form(FormKind::Calendar);

        assert_eq!(session.pending_form(), None);
        assert_ne!(session.thread(), &before);
        assert_eq!(session.history().len(), 1);
    }
}
