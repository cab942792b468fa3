// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Sample answers used by `workbook --demo`.

use crate::{Answers, ChipState, FieldId, PageNumber, WorkbookState};

const DEMO_ANSWERS: [(u8, usize, &str); 15] = [
    (3, 0, "1. Status meetings\n2. Chasing approvals\n3. Quarterly planning decks"),
    (3, 1, "Budget reconciliation"),
    (3, 2, "\"I just need to make it to Friday.\""),
    (4, 0, "Ownership of outcomes"),
    (4, 1, "Last-minute client fire drills"),
    (4, 2, "I'd cook dinner most nights and walk before work."),
    (5, 0, "Running workshops\nWriting clear briefs"),
    (5, 1, "Turning messy data into a one-page story"),
    (5, 2, "Calming down tense stakeholder meetings"),
    (6, 0, "2 and 4"),
    (7, 0, "Ask Priya how she moved into product operations"),
    (7, 1, "Look up salary ranges for learning designers"),
    (8, 0, "I don't hate the work, I hate the lack of autonomy."),
    (8, 1, "How many of my skills carry over."),
    (8, 2, "Knowing I don't have to quit tomorrow."),
];

const DEMO_VALUES: [&str; 3] = ["Autonomy", "Deep Focus", "Learning"];

impl WorkbookState {
    /// Workbook with every prompt answered and a few values selected.
    pub fn demo() -> Self {
        let mut answers = Answers::default();
        for (page, index, answer) in DEMO_ANSWERS {
            if let Some(page) = PageNumber::new(page) {
                answers.set(FieldId::new(page, index), answer);
            }
        }

        let mut chips = ChipState::default();
        for label in DEMO_VALUES {
            chips.toggle(label);
        }
        Self::prefilled(answers, chips)
    }
}

#[cfg(test)]
mod tests {
    use crate::{SubmissionState, WorkbookState, fields};

    #[test]
    fn demo_answers_every_prompt() {
        let state = WorkbookState::demo();
        for (field, prompt) in fields() {
            assert!(
                !state.answers.get(field).trim().is_empty(),
                "no demo answer for {:?}",
                prompt.label
            );
        }
        assert_eq!(state.answers.answered(), fields().count());
        assert_eq!(
            state.chips.selected_labels(),
            vec!["Autonomy", "Deep Focus", "Learning"]
        );
        assert_eq!(state.submission, SubmissionState::Idle);
        assert!(state.email.is_empty());
    }
}
