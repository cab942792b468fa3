// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use time::OffsetDateTime;

use crate::model::{self, VALUE_CHIPS};
use crate::{FieldId, PageNumber};

pub const INVALID_EMAIL_MESSAGE: &str = "Please enter a valid email address.";

/// How long a simulated submission stays in flight.
pub const SUBMISSION_DELAY: Duration = Duration::from_millis(1500);

/// Minimal syntactic check: non-empty and contains `@`.
pub fn validate_email(raw: &str) -> Result<&str> {
    if raw.is_empty() || !raw.contains('@') {
        bail!(INVALID_EMAIL_MESSAGE);
    }
    Ok(raw)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChipState {
    selected: BTreeMap<String, bool>,
}

impl ChipState {
    pub fn is_selected(&self, label: &str) -> bool {
        self.selected.get(label).copied().unwrap_or(false)
    }

    /// Flips `label`, treating an unseen label as unselected. Returns the new value.
    pub fn toggle(&mut self, label: &str) -> bool {
        let entry = self.selected.entry(label.to_owned()).or_insert(false);
        *entry = !*entry;
        *entry
    }

    /// Selected labels, catalog chips first in catalog order.
    pub fn selected_labels(&self) -> Vec<String> {
        let mut labels = VALUE_CHIPS
            .iter()
            .filter(|label| self.is_selected(label))
            .map(|label| (*label).to_owned())
            .collect::<Vec<_>>();
        labels.extend(
            self.selected
                .iter()
                .filter(|(label, selected)| **selected && !model::is_catalog_chip(label))
                .map(|(label, _)| label.clone()),
        );
        labels
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Answers {
    values: BTreeMap<FieldId, String>,
}

impl Answers {
    pub fn get(&self, field: FieldId) -> &str {
        self.values.get(&field).map(String::as_str).unwrap_or("")
    }

    pub fn set(&mut self, field: FieldId, value: impl Into<String>) {
        self.values.insert(field, value.into());
    }

    pub fn push_char(&mut self, field: FieldId, ch: char) {
        self.values.entry(field).or_default().push(ch);
    }

    pub fn pop_char(&mut self, field: FieldId) {
        if let Some(value) = self.values.get_mut(&field) {
            value.pop();
        }
    }

    pub fn answered(&self) -> usize {
        self.values
            .values()
            .filter(|value| !value.trim().is_empty())
            .count()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionState {
    Idle,
    Submitting { token: crate::SubmissionToken },
    Submitted,
    Failed { message: String },
}

impl SubmissionState {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Submitting { .. } => "submitting",
            Self::Submitted => "submitted",
            Self::Failed { .. } => "failed",
        }
    }

    /// Whether the submit control accepts input.
    pub const fn accepts_submit(&self) -> bool {
        matches!(self, Self::Idle | Self::Failed { .. })
    }

    pub const fn is_submitted(&self) -> bool {
        matches!(self, Self::Submitted)
    }
}

impl Default for SubmissionState {
    fn default() -> Self {
        Self::Idle
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryAnswer {
    pub page: PageNumber,
    pub prompt: String,
    pub answer: String,
}

/// What a mail-dispatch service receives when the user asks for their summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryPayload {
    pub email: String,
    pub answers: Vec<SummaryAnswer>,
    pub values: Vec<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub submitted_at: OffsetDateTime,
}

impl SummaryPayload {
    pub fn compile(
        email: &str,
        answers: &Answers,
        chips: &ChipState,
        submitted_at: OffsetDateTime,
    ) -> Self {
        let answers = model::fields()
            .filter_map(|(field, prompt)| {
                let answer = answers.get(field).trim();
                (!answer.is_empty()).then(|| SummaryAnswer {
                    page: field.page,
                    prompt: prompt.label.to_owned(),
                    answer: answer.to_owned(),
                })
            })
            .collect();

        Self {
            email: email.to_owned(),
            answers,
            values: chips.selected_labels(),
            submitted_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Answers, ChipState, INVALID_EMAIL_MESSAGE, SummaryPayload, validate_email};
    use crate::{FieldId, PageNumber};
    use anyhow::Result;
    use time::OffsetDateTime;

    #[test]
    fn email_validation_requires_at_sign() {
        let empty = validate_email("").expect_err("empty email should fail");
        assert_eq!(empty.to_string(), INVALID_EMAIL_MESSAGE);
        assert!(validate_email("not-an-email").is_err());
        assert!(validate_email("user@example.com").is_ok());
        assert!(validate_email("@").is_ok());
    }

    #[test]
    fn chip_toggle_pairs_restore_previous_value() {
        let mut chips = ChipState::default();
        for label in ["Autonomy", "Learning", "Unlisted"] {
            let before = chips.is_selected(label);
            chips.toggle(label);
            chips.toggle(label);
            assert_eq!(chips.is_selected(label), before);
        }
    }

    #[test]
    fn first_toggle_selects_unseen_label() {
        let mut chips = ChipState::default();
        assert!(!chips.is_selected("Creativity"));
        assert!(chips.toggle("Creativity"));
        assert!(chips.is_selected("Creativity"));
    }

    #[test]
    fn selected_labels_follow_catalog_order() {
        let mut chips = ChipState::default();
        chips.toggle("Learning");
        chips.toggle("Autonomy");
        chips.toggle("Zen");
        assert_eq!(
            chips.selected_labels(),
            vec!["Autonomy".to_owned(), "Learning".to_owned(), "Zen".to_owned()]
        );
    }

    #[test]
    fn payload_skips_blank_answers() -> Result<()> {
        let page3 = PageNumber::new(3).expect("page 3");
        let mut answers = Answers::default();
        answers.set(FieldId::new(page3, 0), "  Status meetings  ");
        answers.set(FieldId::new(page3, 1), "   ");
        let mut chips = ChipState::default();
        chips.toggle("Stability");

        let payload = SummaryPayload::compile(
            "user@example.com",
            &answers,
            &chips,
            OffsetDateTime::UNIX_EPOCH,
        );
        assert_eq!(payload.answers.len(), 1);
        assert_eq!(payload.answers[0].answer, "Status meetings");
        assert_eq!(payload.values, vec!["Stability".to_owned()]);

        let json = serde_json::to_value(&payload)?;
        assert_eq!(json["submitted_at"], "1970-01-01T00:00:00Z");
        assert_eq!(json["answers"][0]["page"], 3);
        Ok(())
    }

    #[test]
    fn answer_editing_tracks_characters() {
        let field = FieldId::new(PageNumber::new(6).expect("page 6"), 0);
        let mut answers = Answers::default();
        answers.push_char(field, '1');
        answers.push_char(field, '&');
        answers.pop_char(field);
        assert_eq!(answers.get(field), "1");
        assert_eq!(answers.answered(), 1);
    }
}
