// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::ids::{FieldId, PageNumber, TOTAL_PAGES};

pub const WORKBOOK_TITLE: &str = "The First Step";

pub const VALUE_CHIPS: [&str; 8] = [
    "Autonomy",
    "Creativity",
    "Stability",
    "Deep Focus",
    "Collaboration",
    "Prestige",
    "Helping Others",
    "Learning",
];

pub const EMAIL_PLACEHOLDER: &str = "your@email.com";
pub const SUBMIT_LABEL: &str = "Compile & Email My Summary";
pub const SUBMITTING_LABEL: &str = "Processing...";
pub const CONSENT_NOTE: &str = "By submitting your email, you'll receive your workbook summary and consent to join a mailing list. Unsubscribe anytime.";
pub const SUBMITTED_TITLE: &str = "Check your inbox!";
pub const SUBMITTED_BODY: &str =
    "Your summary is being compiled and will arrive in a few minutes.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    Cover,
    Orientation,
    Diagnostic,
    Values,
    Confidence,
    Directions,
    NextSteps,
    Reflection,
    Normalizing,
    Summary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    Line,
    Area { rows: u16 },
}

impl PromptKind {
    pub const fn rows(self) -> u16 {
        match self {
            Self::Line => 1,
            Self::Area { rows } => rows,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Prompt {
    pub label: &'static str,
    pub placeholder: Option<&'static str>,
    pub kind: PromptKind,
}

const fn line(label: &'static str, placeholder: Option<&'static str>) -> Prompt {
    Prompt {
        label,
        placeholder,
        kind: PromptKind::Line,
    }
}

const fn area(label: &'static str, placeholder: Option<&'static str>, rows: u16) -> Prompt {
    Prompt {
        label,
        placeholder,
        kind: PromptKind::Area { rows },
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirectionCard {
    pub number: u8,
    pub title: &'static str,
    pub description: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageContent {
    pub kind: PageKind,
    pub eyebrow: Option<&'static str>,
    pub title: &'static str,
    pub body: &'static [&'static str],
    pub checklist: &'static [&'static str],
    pub chips: &'static [&'static str],
    pub cards: &'static [DirectionCard],
    pub prompts: &'static [Prompt],
    pub callout: Option<&'static str>,
}

impl PageContent {
    const fn new(kind: PageKind, title: &'static str) -> Self {
        Self {
            kind,
            eyebrow: None,
            title,
            body: &[],
            checklist: &[],
            chips: &[],
            cards: &[],
            prompts: &[],
            callout: None,
        }
    }

    pub const fn has_email_form(&self) -> bool {
        matches!(self.kind, PageKind::Summary)
    }
}

const PAGES: [PageContent; TOTAL_PAGES as usize] = [
    PageContent {
        body: &[
            "A simple starting point for people who know they don't want to keep doing what they're doing -- but don't know what's next.",
        ],
        callout: Some("Begin the Reflection"),
        ..PageContent::new(PageKind::Cover, WORKBOOK_TITLE)
    },
    PageContent {
        body: &["Before we start, let's lower the stakes. To find your next move:"],
        checklist: &[
            "You don't need a new career yet.",
            "You don't need to find your \"passion.\"",
            "You don't need to quit your job today.",
        ],
        callout: Some("\"This workbook won't give you an answer. It will give you direction.\""),
        ..PageContent::new(PageKind::Orientation, "Orientation")
    },
    PageContent {
        body: &["Let's isolate the noise. Be honest -- nobody is reading this but you."],
        prompts: &[
            area(
                "The top 3 things that exhaust me at work:",
                Some("1. Meetings that could be emails..."),
                3,
            ),
            line(
                "The part of my job I avoid the most:",
                Some("Managing the budget spreadsheets..."),
            ),
            line(
                "The sentence I find myself repeating about work:",
                Some("\"I just need to make it to Friday.\""),
            ),
        ],
        ..PageContent::new(PageKind::Diagnostic, "What's Actually Draining You?")
    },
    PageContent {
        body: &[
            "Not a dream life -- just a better one. Circle the values that feel non-negotiable for your next chapter.",
        ],
        chips: &VALUE_CHIPS,
        prompts: &[
            line("More...", Some("Ownership")),
            line("Less...", Some("Client Fire-drills")),
            area(
                "If work felt \"good enough,\" my life outside of work would look like:",
                Some("I'd have the energy to cook dinner and go for a walk."),
                2,
            ),
        ],
        ..PageContent::new(PageKind::Values, "What You Want More Of")
    },
    PageContent {
        body: &[
            "We often devalue what comes easily to us. Let's inventory your existing capital.",
        ],
        prompts: &[
            area("Things I know how to do that I've done for years:", None, 2),
            line(
                "Skills people underestimate because they're \"normal\" to me:",
                Some("e.g. Synthesizing complex data into simple decks"),
            ),
            line(
                "People already trust me with:",
                Some("e.g. Navigating difficult internal politics"),
            ),
        ],
        ..PageContent::new(PageKind::Confidence, "You're Not Starting From Zero")
    },
    PageContent {
        cards: &[
            DirectionCard {
                number: 1,
                title: "Same Skill, New Scene",
                description: "Doing exactly what you do now, but for a company whose mission you actually care about.",
            },
            DirectionCard {
                number: 2,
                title: "Adjacent Skill, New Context",
                description: "Moving from Sales to Customer Success, or Marketing to Product Analysis.",
            },
            DirectionCard {
                number: 3,
                title: "Reduced Scope",
                description: "Stepping back from management or high-stress roles to regain time and mental health.",
            },
            DirectionCard {
                number: 4,
                title: "The Hybrid Path",
                description: "Consulting or freelancing part-time while you pilot a completely new industry.",
            },
        ],
        prompts: &[line(
            "Which 2 feel worth learning more about?",
            Some("1 and 4..."),
        )],
        ..PageContent::new(PageKind::Directions, "4 Directions Worth Exploring")
    },
    PageContent {
        body: &["Action kills anxiety. Choose one small thing you can do this week."],
        prompts: &[
            line(
                "One Conversation",
                Some("Ask [Name] how they transitioned into [Field]..."),
            ),
            line(
                "One Research Task",
                Some("Look up the average salary for [Role]..."),
            ),
        ],
        callout: Some(
            "\"None of these require quitting or committing. They are just data points.\"",
        ),
        ..PageContent::new(PageKind::NextSteps, "Low-Risk Next Steps")
    },
    PageContent {
        eyebrow: Some("The Final Review"),
        body: &[
            "Take a moment to scroll back through your entries. Look at what you've labeled as draining, the values you circled, and the skills you identified.",
            "As you synthesize those previous answers, use this final set of questions to ground your progress.",
        ],
        prompts: &[
            area(
                "After reviewing my answers, what I'm clearer on now:",
                Some(
                    "e.g. I realize I don't hate the work, I just hate the lack of autonomy...",
                ),
                2,
            ),
            area(
                "Looking back at my skills and directions, what surprised me most:",
                None,
                2,
            ),
            line(
                "As I finish this workbook, what feels lighter in my mind:",
                Some("e.g. Knowing I don't have to quit my job tomorrow to find a path."),
            ),
        ],
        ..PageContent::new(PageKind::Reflection, "Where You Are Now")
    },
    PageContent {
        body: &[
            "You might still feel a knot in your stomach. That's normal. Career changes aren't just about jobs -- they are identity shifts.",
            "The fear of wasted time and the habit of overthinking are your brain's way of trying to keep you safe.",
        ],
        callout: Some("Clarity usually comes in stages -- not all at once."),
        ..PageContent::new(PageKind::Normalizing, "Why This Still Feels Hard")
    },
    PageContent {
        body: &[
            "You've done the hard work. Enter your email below to receive a customized summary of your responses, along with your selected next steps and a transition roadmap.",
        ],
        ..PageContent::new(PageKind::Summary, "Your Next Chapter Starts Here")
    },
];

pub fn page(number: PageNumber) -> &'static PageContent {
    &PAGES[number.index()]
}

pub fn pages() -> impl Iterator<Item = (PageNumber, &'static PageContent)> {
    PageNumber::all().map(|number| (number, page(number)))
}

pub fn prompt(field: FieldId) -> Option<&'static Prompt> {
    page(field.page).prompts.get(field.index)
}

/// Every answerable prompt in document order.
pub fn fields() -> impl Iterator<Item = (FieldId, &'static Prompt)> {
    pages().flat_map(|(number, content)| {
        content
            .prompts
            .iter()
            .enumerate()
            .map(move |(index, prompt)| (FieldId::new(number, index), prompt))
    })
}

pub fn is_catalog_chip(label: &str) -> bool {
    VALUE_CHIPS.contains(&label)
}

#[cfg(test)]
mod tests {
    use super::{PageKind, fields, page, pages, prompt};
    use crate::{FieldId, PageNumber};

    #[test]
    fn catalog_has_ten_pages_in_order() {
        let kinds = pages().map(|(_, content)| content.kind).collect::<Vec<_>>();
        assert_eq!(kinds.len(), 10);
        assert_eq!(kinds.first(), Some(&PageKind::Cover));
        assert_eq!(kinds.last(), Some(&PageKind::Summary));
    }

    #[test]
    fn only_summary_page_carries_the_email_form() {
        let with_form = pages()
            .filter(|(_, content)| content.has_email_form())
            .map(|(number, _)| number)
            .collect::<Vec<_>>();
        assert_eq!(with_form, vec![PageNumber::LAST]);
    }

    #[test]
    fn values_page_offers_all_chips() {
        let values = page(PageNumber::new(4).expect("page 4"));
        assert_eq!(values.kind, PageKind::Values);
        assert_eq!(values.chips.len(), 8);
        assert!(values.chips.contains(&"Deep Focus"));
    }

    #[test]
    fn prompts_are_addressable_by_field_id() {
        let first = fields().next().expect("at least one prompt");
        assert_eq!(first.0.page.get(), 3);
        assert_eq!(prompt(first.0), Some(first.1));

        let missing = FieldId::new(PageNumber::FIRST, 0);
        assert!(prompt(missing).is_none());
        assert_eq!(fields().count(), 15);
    }
}
