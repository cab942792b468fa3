// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use std::fmt;

pub const TOTAL_PAGES: u8 = 10;

/// A workbook page, always within `1..=TOTAL_PAGES`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct PageNumber(u8);

impl PageNumber {
    pub const FIRST: Self = Self(1);
    pub const LAST: Self = Self(TOTAL_PAGES);

    pub const fn new(value: u8) -> Option<Self> {
        if value >= 1 && value <= TOTAL_PAGES {
            Some(Self(value))
        } else {
            None
        }
    }

    pub const fn get(self) -> u8 {
        self.0
    }

    pub const fn index(self) -> usize {
        (self.0 - 1) as usize
    }

    pub const fn next(self) -> Option<Self> {
        Self::new(self.0 + 1)
    }

    pub const fn previous(self) -> Option<Self> {
        Self::new(self.0 - 1)
    }

    pub const fn is_first(self) -> bool {
        self.0 == 1
    }

    pub const fn is_last(self) -> bool {
        self.0 == TOTAL_PAGES
    }

    pub fn all() -> impl Iterator<Item = Self> {
        (1..=TOTAL_PAGES).map(Self)
    }
}

impl fmt::Display for PageNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u8> for PageNumber {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| format!("page {value} is outside 1..={TOTAL_PAGES}"))
    }
}

impl From<PageNumber> for u8 {
    fn from(value: PageNumber) -> Self {
        value.0
    }
}

/// A prompt on a page, addressed by its position in the page's prompt list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FieldId {
    pub page: PageNumber,
    pub index: usize,
}

impl FieldId {
    pub const fn new(page: PageNumber, index: usize) -> Self {
        Self { page, index }
    }
}

/// Identifies one in-flight submission so late completions can be discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubmissionToken(u64);

impl SubmissionToken {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}
