//! Per-conversation form-gate flags

use serde::{Deserialize, Serialize};

/// Which structured form a side-effecting tool call maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormKind {
    Email,
    Calendar,
}

/// Per-conversation flags driving the form-interrupt flow.
///
/// `just_submitted_form` is a one-shot: set on a successful form submission,
/// consumed by the very next qualifying tool-call detection regardless of
/// which tool triggered it.
#[derive(Debug, Clone, Default)]
pub struct FormGateState {
    email_form_pending: bool,
    calendar_form_pending: bool,
    just_submitted_form: bool,
}

impl FormGateState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the given form is waiting for user input.
    pub fn is_pending(&self, form: FormKind) -> bool {
        match form {
            FormKind::Email => self.email_form_pending,
            FormKind::Calendar => self.calendar_form_pending,
        }
    }

    /// Mark a form as waiting for user input.
    pub fn set_pending(&mut self, form: FormKind) {
        match form {
            FormKind::Email => self.email_form_pending = true,
            FormKind::Calendar => self.calendar_form_pending = true,
        }
    }

    /// Clear a form's pending flag (after submission or dismissal).
    pub fn clear_pending(&mut self, form: FormKind) {
        match form {
            FormKind::Email => self.email_form_pending = false,
            FormKind::Calendar => self.calendar_form_pending = false,
        }
    }

    /// The form the UI should render, if any. Email wins when both are set.
    pub fn pending_form(&self) -> Option<FormKind> {
        if self.email_form_pending {
            Some(FormKind::Email)
        } else if self.calendar_form_pending {
            Some(FormKind::Calendar)
        } else {
            None
        }
    }

    /// Record that a form was just submitted successfully.
    pub fn mark_submitted(&mut self) {
        self.just_submitted_form = true;
    }

    /// Read and reset the one-shot submission flag.
    pub fn consume_just_submitted(&mut self) -> bool {
        std::mem::take(&mut self.just_submitted_form)
    }

    /// Peek at the submission flag without consuming it.
    pub fn just_submitted(&self) -> bool {
        self.just_submitted_form
    }

    /// Reset all flags (conversation reset).
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
