//! Section navigation
//!
//! Tracks which of the seven sections is active. Clicks, arrow keys and
//! scroll-driven intersection changes all go through one controller, so the
//! highlighted nav item and the progress bar can never disagree.

use crate::model::{Language, SectionId};
use serde::Serialize;

/// Minimum visible ratio for a section to become active while scrolling
pub const VISIBILITY_THRESHOLD: f64 = 0.3;
/// Observer root margin: the active band is the upper-middle of the viewport
pub const ROOT_MARGIN: &str = "-20% 0px -60% 0px";
/// Scroll offset past which the back-to-top control is shown
pub const BACK_TO_TOP_OFFSET: f64 = 300.0;

const SECTION_COUNT: usize = SectionId::ALL.len();

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavKey {
    ArrowLeft,
    ArrowRight,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollTarget {
    Section(SectionId),
    Top,
}

/// Result of a navigation event: the new state and where to scroll
/// (smoothly), if anywhere.
#[derive(Debug, Clone, PartialEq)]
pub struct NavEffect {
    pub active: usize,
    pub progress: f64,
    pub scroll: Option<ScrollTarget>,
}

/// One observer entry
#[derive(Debug, Clone, Copy)]
pub struct Intersection<'a> {
    pub id: &'a str,
    pub ratio: f64,
    pub is_intersecting: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NavEntry {
    pub id: &'static str,
    pub label: &'static str,
    pub active: bool,
}

#[derive(Debug, Clone, Default)]
pub struct NavigationController {
    active: usize,
}

impl NavigationController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> usize {
        self.active
    }

    pub fn active_section(&self) -> SectionId {
        SectionId::ALL[self.active]
    }

    /// Progress bar width in percent: `(active + 1) / 7 * 100`
    pub fn progress(&self) -> f64 {
        (self.active + 1) as f64 / SECTION_COUNT as f64 * 100.0
    }

    fn effect(&self, scroll: Option<ScrollTarget>) -> NavEffect {
        NavEffect { active: self.active, progress: self.progress(), scroll }
    }

    /// Activate a section and scroll it into view. Out-of-range indices
    /// are ignored.
    pub fn click(&mut self, index: usize) -> Option<NavEffect> {
        let section = *SectionId::ALL.get(index)?;
        self.active = index;
        Some(self.effect(Some(ScrollTarget::Section(section))))
    }

    /// Arrow keys move one section, clamped at both ends, with exactly the
    /// effects of clicking the neighbour.
    pub fn key(&mut self, key: NavKey) -> Option<NavEffect> {
        match key {
            NavKey::ArrowLeft => self.click(self.active.saturating_sub(1)),
            NavKey::ArrowRight => self.click((self.active + 1).min(SECTION_COUNT - 1)),
            NavKey::Other => None,
        }
    }

    /// Apply one batch of observer entries. Of the entries that intersect at
    /// or above the threshold, the last in the batch wins. The page is
    /// already scrolling, so no scroll target is returned.
    pub fn observe(&mut self, entries: &[Intersection<'_>]) -> Option<NavEffect> {
        let index = entries
            .iter()
            .filter(|e| e.is_intersecting && e.ratio >= VISIBILITY_THRESHOLD)
            .filter_map(|e| SectionId::parse(e.id))
            .map(|s| s.index())
            .last()?;
        self.active = index;
        Some(self.effect(None))
    }

    /// Scroll to the very top; the first section becomes active
    pub fn back_to_top(&mut self) -> NavEffect {
        let clicked = self.click(0).unwrap_or_else(|| self.effect(None));
        NavEffect { scroll: Some(ScrollTarget::Top), ..clicked }
    }

    pub fn back_to_top_visible(scroll_y: f64) -> bool {
        scroll_y > BACK_TO_TOP_OFFSET
    }

    pub fn entries(&self, language: Language) -> Vec<NavEntry> {
        SectionId::ALL
            .iter()
            .enumerate()
            .map(|(i, s)| NavEntry { id: s.as_str(), label: s.label(language), active: i == self.active })
            .collect()
    }
}
