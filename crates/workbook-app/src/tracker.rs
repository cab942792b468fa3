// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Scroll-position tracking: which section is in view and how far the reader
//! has scrolled. Everything is measured in rows.

use tracing::{debug, trace};

use crate::PageNumber;

/// Fraction of a section that must be visible before it can become active.
pub const VISIBILITY_THRESHOLD: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Viewport {
    pub scroll_top: u32,
    pub client_height: u32,
    pub scroll_height: u32,
}

impl Viewport {
    pub const fn max_scroll_top(self) -> u32 {
        self.scroll_height.saturating_sub(self.client_height)
    }

    pub fn with_scroll_top(self, scroll_top: u32) -> Self {
        Self {
            scroll_top: scroll_top.min(self.max_scroll_top()),
            ..self
        }
    }

    pub const fn bottom(self) -> u32 {
        self.scroll_top.saturating_add(self.client_height)
    }
}

/// Percentage of the document scrolled past, clamped to `0.0..=100.0`.
pub fn progress_percent(viewport: Viewport) -> f64 {
    let scrollable = viewport.max_scroll_top();
    if scrollable == 0 {
        return 0.0;
    }
    let scrolled = f64::from(viewport.scroll_top) / f64::from(scrollable) * 100.0;
    scrolled.clamp(0.0, 100.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionBounds {
    pub page: PageNumber,
    pub top: u32,
    pub height: u32,
}

impl SectionBounds {
    pub const fn bottom(self) -> u32 {
        self.top.saturating_add(self.height)
    }
}

/// Vertical placement of every rendered section, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionLayout {
    sections: Vec<SectionBounds>,
}

impl SectionLayout {
    /// Stacks sections top to bottom using their rendered heights.
    pub fn stacked<I>(heights: I) -> Self
    where
        I: IntoIterator<Item = (PageNumber, u32)>,
    {
        let mut top = 0_u32;
        let sections = heights
            .into_iter()
            .map(|(page, height)| {
                let bounds = SectionBounds { page, top, height };
                top = top.saturating_add(height);
                bounds
            })
            .collect();
        Self { sections }
    }

    pub fn get(&self, page: PageNumber) -> Option<SectionBounds> {
        self.sections
            .iter()
            .copied()
            .find(|section| section.page == page)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SectionBounds> {
        self.sections.iter()
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn total_height(&self) -> u32 {
        self.sections.last().map_or(0, |section| section.bottom())
    }

    /// Viewport for this document at `scroll_top`, clamped to the scrollable range.
    pub fn viewport(&self, scroll_top: u32, client_height: u32) -> Viewport {
        Viewport {
            scroll_top: 0,
            client_height,
            scroll_height: self.total_height().max(client_height),
        }
        .with_scroll_top(scroll_top)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntersectionEntry {
    pub page: PageNumber,
    pub ratio: f64,
    pub is_intersecting: bool,
}

impl IntersectionEntry {
    pub fn qualifies(&self) -> bool {
        self.is_intersecting && self.ratio >= VISIBILITY_THRESHOLD
    }
}

/// One entry per section. A section taller than the viewport counts as fully
/// visible once it fills the viewport.
pub fn intersections(viewport: Viewport, layout: &SectionLayout) -> Vec<IntersectionEntry> {
    layout
        .iter()
        .map(|section| {
            let visible_top = section.top.max(viewport.scroll_top);
            let visible_bottom = section.bottom().min(viewport.bottom());
            let visible = visible_bottom.saturating_sub(visible_top);
            let basis = section.height.min(viewport.client_height);
            let ratio = if basis == 0 {
                0.0
            } else {
                (f64::from(visible) / f64::from(basis)).min(1.0)
            };
            IntersectionEntry {
                page: section.page,
                ratio,
                is_intersecting: visible > 0,
            }
        })
        .collect()
}

/// Picks the qualifying entry with the largest ratio; later entries win ties.
pub fn resolve_active(entries: &[IntersectionEntry]) -> Option<PageNumber> {
    entries
        .iter()
        .filter(|entry| entry.qualifies())
        .fold(None::<&IntersectionEntry>, |best, entry| match best {
            Some(current) if current.ratio > entry.ratio => Some(current),
            _ => Some(entry),
        })
        .map(|entry| entry.page)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollUpdate {
    pub active: Option<PageNumber>,
    pub progress: f64,
}

pub trait ScrollListener {
    fn on_scroll(&mut self, update: ScrollUpdate);
}

impl<F> ScrollListener for F
where
    F: FnMut(ScrollUpdate),
{
    fn on_scroll(&mut self, update: ScrollUpdate) {
        (*self)(update)
    }
}

/// Turns viewport snapshots into [`ScrollUpdate`]s for a single listener.
#[derive(Default)]
pub struct ScrollSource {
    layout: Option<SectionLayout>,
    listener: Option<Box<dyn ScrollListener>>,
}

impl ScrollSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the sections to watch, replacing any earlier layout.
    pub fn observe(&mut self, layout: SectionLayout) {
        trace!(sections = layout.len(), "observe sections");
        self.layout = Some(layout);
    }

    /// Installs the listener. Only one listener is kept.
    pub fn subscribe(&mut self, listener: impl ScrollListener + 'static) {
        self.listener = Some(Box::new(listener));
    }

    pub fn layout(&self) -> Option<&SectionLayout> {
        self.layout.as_ref()
    }

    pub fn is_connected(&self) -> bool {
        self.layout.is_some() || self.listener.is_some()
    }

    pub fn publish(&mut self, viewport: Viewport) -> Option<ScrollUpdate> {
        let layout = self.layout.as_ref()?;
        let listener = self.listener.as_mut()?;
        let entries = intersections(viewport, layout);
        let update = ScrollUpdate {
            active: resolve_active(&entries),
            progress: progress_percent(viewport),
        };
        listener.on_scroll(update);
        Some(update)
    }

    /// Releases the listener and all registered sections. Returns `false` when
    /// there was nothing left to release.
    pub fn disconnect(&mut self) -> bool {
        let released = self.is_connected();
        self.layout = None;
        self.listener = None;
        if released {
            debug!("scroll source disconnected");
        }
        released
    }
}

impl Drop for ScrollSource {
    fn drop(&mut self) {
        self.disconnect();
    }
}
