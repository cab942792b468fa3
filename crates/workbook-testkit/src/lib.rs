// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use std::path::PathBuf;
use workbook_app::{
    Answers, ChipState, FieldId, PageNumber, PromptKind, SectionLayout, VALUE_CHIPS, Viewport,
    WorkbookState, fields,
};

const DRAINS: [&str; 8] = [
    "Status meetings that could be emails",
    "Chasing approvals across three teams",
    "Rewriting the same report every Friday",
    "Context switching between tickets",
    "Budget spreadsheets nobody reads",
    "Late-night client fire drills",
    "Performance theater in standups",
    "Onboarding tools that change every quarter",
];

const STRENGTHS: [&str; 8] = [
    "Turning messy data into a clear story",
    "Calming down tense stakeholder calls",
    "Writing documentation people actually read",
    "Mentoring new hires",
    "Spotting risks early",
    "Running workshops",
    "Untangling legacy processes",
    "Negotiating vendor contracts",
];

const NEXT_STEPS: [&str; 6] = [
    "Ask Priya how she moved into product operations",
    "Look up salary bands for customer success leads",
    "Coffee with a former manager who freelances",
    "Read three job posts for learning designers",
    "Sign up for a one-day UX workshop",
    "List companies whose mission I admire",
];

const REFLECTIONS: [&str; 6] = [
    "I don't hate the work, I hate the lack of autonomy",
    "I already have more transferable skills than I thought",
    "Reduced scope might matter more than a new field",
    "I want mornings that start with deep focus",
    "Knowing I don't have to quit tomorrow",
    "Direction feels possible without a grand plan",
];

/// Deterministic generator for filled-in workbooks.
#[derive(Debug, Clone)]
pub struct WorkbookFaker {
    rng: DeterministicRng,
}

impl WorkbookFaker {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: DeterministicRng::new(seed),
        }
    }

    pub fn answers(&mut self) -> Answers {
        let mut answers = Answers::default();
        for (field, prompt) in fields() {
            let pool = pool_for(field);
            let value = match prompt.kind {
                PromptKind::Line => self.rng.pick(pool).to_owned(),
                PromptKind::Area { rows } => (0..rows.max(1))
                    .map(|_| self.rng.pick(pool))
                    .collect::<Vec<_>>()
                    .join("; "),
            };
            answers.set(field, value);
        }
        answers
    }

    pub fn chips(&mut self) -> ChipState {
        let mut chips = ChipState::default();
        let wanted = 2 + self.rng.int_n(3);
        while chips.selected_labels().len() < wanted {
            let label = self.rng.pick(&VALUE_CHIPS);
            if !chips.is_selected(label) {
                chips.toggle(label);
            }
        }
        chips
    }

    /// A workbook filled in up to, but not including, the email submission.
    pub fn filled_state(&mut self) -> WorkbookState {
        let answers = self.answers();
        let chips = self.chips();
        WorkbookState::prefilled(answers, chips)
    }
}

fn pool_for(field: FieldId) -> &'static [&'static str] {
    match field.page.get() {
        3 => &DRAINS,
        4 | 5 => &STRENGTHS,
        6 | 7 => &NEXT_STEPS,
        _ => &REFLECTIONS,
    }
}

#[derive(Debug, Clone)]
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[self.int_n(items.len())]
    }
}

/// Ten sections of `height` rows each, stacked in page order.
pub fn uniform_layout(height: u32) -> SectionLayout {
    SectionLayout::stacked(PageNumber::all().map(|page| (page, height)))
}

/// Viewport scrolled so `page` sits at the top.
pub fn viewport_at(layout: &SectionLayout, page: PageNumber, client_height: u32) -> Viewport {
    let top = layout.get(page).map_or(0, |section| section.top);
    layout.viewport(top, client_height)
}

pub fn page(value: u8) -> PageNumber {
    PageNumber::new(value).unwrap_or(PageNumber::FIRST)
}

pub fn temp_config_path() -> Result<(tempfile::TempDir, PathBuf)> {
    let dir = tempfile::tempdir().context("create temp dir")?;
    let path = dir.path().join("config.toml");
    Ok((dir, path))
}

/// Temp `config.toml` holding `content`. Keep the dir alive while the path is used.
pub fn write_temp_config(content: &str) -> Result<(tempfile::TempDir, PathBuf)> {
    let (dir, path) = temp_config_path()?;
    std::fs::write(&path, content).with_context(|| format!("write {}", path.display()))?;
    Ok((dir, path))
}

#[cfg(test)]
mod tests {
    use super::{WorkbookFaker, page, uniform_layout, viewport_at};
    use workbook_app::{VALUE_CHIPS, fields};

    #[test]
    fn same_seed_produces_same_workbook() {
        let mut left = WorkbookFaker::new(42);
        let mut right = WorkbookFaker::new(42);
        assert_eq!(left.answers(), right.answers());
        assert_eq!(left.chips(), right.chips());
    }

    #[test]
    fn answers_fill_every_prompt() {
        let answers = WorkbookFaker::new(7).answers();
        assert_eq!(answers.answered(), fields().count());
    }

    #[test]
    fn chips_pick_between_two_and_four_catalog_values() {
        for seed in 0..20 {
            let chips = WorkbookFaker::new(seed).chips();
            let selected = chips.selected_labels();
            assert!((2..=4).contains(&selected.len()), "seed {seed}: {selected:?}");
            assert!(selected.iter().all(|label| VALUE_CHIPS.contains(&label.as_str())));
        }
    }

    #[test]
    fn filled_state_is_ready_for_an_email() {
        let state = WorkbookFaker::new(3).filled_state();
        assert!(state.email.is_empty());
        assert!(state.submission.accepts_submit());
        assert_eq!(state.answers.answered(), fields().count());
    }

    #[test]
    fn viewport_at_places_page_at_top() {
        let layout = uniform_layout(30);
        let viewport = viewport_at(&layout, page(4), 30);
        assert_eq!(viewport.scroll_top, 90);
        assert_eq!(viewport.scroll_height, 300);
    }
}
