// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use time::OffsetDateTime;
use tracing::{debug, info, warn};

use crate::forms::{Answers, ChipState, SubmissionState, SummaryPayload, validate_email};
use crate::tracker::ScrollUpdate;
use crate::{FieldId, PageNumber, SubmissionToken, TOTAL_PAGES};

#[derive(Debug, Clone, PartialEq)]
pub struct WorkbookState {
    pub active_page: PageNumber,
    pub progress: f64,
    pub chips: ChipState,
    pub answers: Answers,
    pub email: String,
    pub submission: SubmissionState,
    pub alert: Option<String>,
    pub status_line: Option<String>,
    next_token: u64,
}

impl Default for WorkbookState {
    fn default() -> Self {
        Self::prefilled(Answers::default(), ChipState::default())
    }
}

/// One keystroke applied to a prompt answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerEdit {
    Insert(char),
    Backspace,
}

impl WorkbookState {
    /// Fresh workbook on the cover page with answers and chips already filled in.
    pub fn prefilled(answers: Answers, chips: ChipState) -> Self {
        Self {
            active_page: PageNumber::FIRST,
            progress: 0.0,
            chips,
            answers,
            email: String::new(),
            submission: SubmissionState::Idle,
            alert: None,
            status_line: None,
            next_token: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkbookCommand {
    NavNext,
    NavPrevious,
    ScrollToPage(PageNumber),
    ToggleChip(String),
    EditAnswer(FieldId, AnswerEdit),
    SetEmail(String),
    Submit,
    SubmissionElapsed(SubmissionToken),
    SubmissionFailed {
        token: SubmissionToken,
        message: String,
    },
    DismissAlert,
    SetStatus(String),
    ClearStatus,
}

#[derive(Debug, Clone, PartialEq)]
pub enum WorkbookEvent {
    ScrollRequested(PageNumber),
    ActivePageChanged(PageNumber),
    ProgressChanged(f64),
    ChipToggled { label: String, selected: bool },
    AnswerChanged(FieldId),
    EmailChanged,
    ValidationFailed(String),
    SubmissionStarted {
        token: SubmissionToken,
        payload: SummaryPayload,
    },
    SubmissionCompleted,
    SubmissionFailed(String),
    AlertDismissed,
    StatusUpdated(String),
    StatusCleared,
}

impl WorkbookState {
    pub fn dispatch(&mut self, command: WorkbookCommand) -> Vec<WorkbookEvent> {
        match command {
            WorkbookCommand::NavNext => self.active_page.next().map_or_else(Vec::new, |next| {
                vec![WorkbookEvent::ScrollRequested(next)]
            }),
            WorkbookCommand::NavPrevious => {
                self.active_page.previous().map_or_else(Vec::new, |previous| {
                    vec![WorkbookEvent::ScrollRequested(previous)]
                })
            }
            WorkbookCommand::ScrollToPage(page) => vec![WorkbookEvent::ScrollRequested(page)],
            WorkbookCommand::ToggleChip(label) => {
                let selected = self.chips.toggle(&label);
                debug!(%label, selected, "chip toggled");
                vec![WorkbookEvent::ChipToggled { label, selected }]
            }
            WorkbookCommand::EditAnswer(field, edit) => {
                match edit {
                    AnswerEdit::Insert(ch) => self.answers.push_char(field, ch),
                    AnswerEdit::Backspace => self.answers.pop_char(field),
                }
                vec![WorkbookEvent::AnswerChanged(field)]
            }
            WorkbookCommand::SetEmail(value) => {
                if !self.submission.accepts_submit() {
                    return Vec::new();
                }
                self.email = value;
                vec![WorkbookEvent::EmailChanged]
            }
            WorkbookCommand::Submit => self.submit(),
            WorkbookCommand::SubmissionElapsed(token) => self.complete_submission(token),
            WorkbookCommand::SubmissionFailed { token, message } => {
                self.fail_submission(token, message)
            }
            WorkbookCommand::DismissAlert => match self.alert.take() {
                Some(_) => vec![WorkbookEvent::AlertDismissed],
                None => Vec::new(),
            },
            WorkbookCommand::SetStatus(message) => vec![self.set_status(message)],
            WorkbookCommand::ClearStatus => {
                self.status_line = None;
                vec![WorkbookEvent::StatusCleared]
            }
        }
    }

    /// Applies what the scroll tracker observed. This is the only path that
    /// moves the active page.
    pub fn observe_scroll(&mut self, update: ScrollUpdate) -> Vec<WorkbookEvent> {
        let mut events = Vec::new();
        if update.progress != self.progress {
            self.progress = update.progress;
            events.push(WorkbookEvent::ProgressChanged(update.progress));
        }
        if let Some(page) = update.active
            && page != self.active_page
        {
            debug!(from = %self.active_page, to = %page, "active page changed");
            self.active_page = page;
            events.push(WorkbookEvent::ActivePageChanged(page));
        }
        events
    }

    pub fn dock_visible(&self) -> bool {
        !self.active_page.is_first()
    }

    pub fn previous_enabled(&self) -> bool {
        !self.active_page.is_first()
    }

    pub fn next_enabled(&self) -> bool {
        !self.active_page.is_last()
    }

    pub fn dock_label(&self) -> String {
        format!("Page {} of {}", self.active_page, TOTAL_PAGES)
    }

    fn submit(&mut self) -> Vec<WorkbookEvent> {
        if !self.submission.accepts_submit() {
            debug!(state = self.submission.as_str(), "submit ignored");
            return Vec::new();
        }

        if let Err(error) = validate_email(&self.email) {
            let message = error.to_string();
            warn!(%message, "email rejected");
            self.alert = Some(message.clone());
            return vec![WorkbookEvent::ValidationFailed(message)];
        }

        self.next_token = self.next_token.saturating_add(1);
        let token = SubmissionToken::new(self.next_token);
        let payload = SummaryPayload::compile(
            &self.email,
            &self.answers,
            &self.chips,
            OffsetDateTime::now_utc(),
        );
        info!(
            token = token.get(),
            answered = self.answers.answered(),
            values = payload.values.len(),
            "submission started"
        );
        self.submission = SubmissionState::Submitting { token };
        vec![WorkbookEvent::SubmissionStarted { token, payload }]
    }

    fn complete_submission(&mut self, token: SubmissionToken) -> Vec<WorkbookEvent> {
        if self.submission != (SubmissionState::Submitting { token }) {
            debug!(token = token.get(), "stale submission completion ignored");
            return Vec::new();
        }
        info!(token = token.get(), "submission completed");
        self.submission = SubmissionState::Submitted;
        vec![
            WorkbookEvent::SubmissionCompleted,
            self.set_status("summary requested".to_owned()),
        ]
    }

    fn fail_submission(&mut self, token: SubmissionToken, message: String) -> Vec<WorkbookEvent> {
        if self.submission != (SubmissionState::Submitting { token }) {
            debug!(token = token.get(), "stale submission failure ignored");
            return Vec::new();
        }
        warn!(token = token.get(), %message, "submission failed");
        self.submission = SubmissionState::Failed {
            message: message.clone(),
        };
        vec![
            WorkbookEvent::SubmissionFailed(message.clone()),
            self.set_status(format!("send failed: {message}; press enter to retry")),
        ]
    }

    fn set_status(&mut self, message: String) -> WorkbookEvent {
        self.status_line = Some(message.clone());
        WorkbookEvent::StatusUpdated(message)
    }
}
