//! Collapsible rows
//!
//! Tables show their first few rows; a toggle reveals the rest. Each toggle
//! is keyed by its table's id and flips between the two states, producing a
//! staggered transition plan for the rows it hides or shows.

use crate::model::{InsightTable, Language, RowId};
use std::collections::BTreeMap;

/// Delay between consecutive rows of one transition
pub const STAGGER_MS: u64 = 50;
/// How long the transient animation class stays on a row
pub const TRANSITION_MS: u64 = 300;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Expanding,
    Collapsing,
}

impl Phase {
    pub fn class(&self) -> &'static str {
        match self {
            Phase::Expanding => "expanding",
            Phase::Collapsing => "collapsing",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StaggerStep {
    pub row: RowId,
    pub delay_ms: u64,
}

/// What one toggle click does to the page
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub phase: Phase,
    pub steps: Vec<StaggerStep>,
    /// When the last row's transient class is removed
    pub settled_after_ms: u64,
    pub label: String,
}

#[derive(Debug, Clone)]
pub struct CollapseToggle {
    table_id: String,
    total: usize,
    hidden: Vec<RowId>,
    expanded: bool,
}

impl CollapseToggle {
    /// `None` when the table has nothing to collapse
    pub fn new(table_id: &str, table: &InsightTable) -> Option<Self> {
        let hidden: Vec<RowId> = table
            .rows
            .iter()
            .enumerate()
            .filter(|(i, _)| table.is_collapsible(*i))
            .map(|(_, r)| r.id.clone())
            .collect();
        if hidden.is_empty() {
            return None;
        }
        Some(Self { table_id: table_id.to_string(), total: table.rows.len(), hidden, expanded: false })
    }

    pub fn table_id(&self) -> &str {
        &self.table_id
    }

    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    pub fn row_visible(&self, row: &RowId) -> bool {
        self.expanded || !self.hidden.contains(row)
    }

    pub fn label(&self, language: Language) -> String {
        match (self.expanded, language) {
            (false, Language::En) => format!("Show all {} items", self.total),
            (false, Language::Zh) => format!("显示全部 {} 项", self.total),
            (true, Language::En) => "Show fewer".to_string(),
            (true, Language::Zh) => "收起".to_string(),
        }
    }

    pub fn toggle(&mut self, language: Language) -> Transition {
        self.expanded = !self.expanded;
        let phase = if self.expanded { Phase::Expanding } else { Phase::Collapsing };
        let steps: Vec<StaggerStep> = self
            .hidden
            .iter()
            .enumerate()
            .map(|(i, row)| StaggerStep { row: row.clone(), delay_ms: i as u64 * STAGGER_MS })
            .collect();
        let last = steps.last().map(|s| s.delay_ms).unwrap_or(0);
        Transition { phase, steps, settled_after_ms: last + TRANSITION_MS, label: self.label(language) }
    }
}

/// All toggles on a page, keyed by table id
#[derive(Debug, Clone, Default)]
pub struct CollapseGroups {
    toggles: BTreeMap<String, CollapseToggle>,
}

impl CollapseGroups {
    /// Register a toggle for a table; returns false when it has nothing
    /// to collapse. Registering again resets the toggle.
    pub fn register(&mut self, table_id: &str, table: &InsightTable) -> bool {
        match CollapseToggle::new(table_id, table) {
            Some(t) => {
                self.toggles.insert(table_id.to_string(), t);
                true
            }
            None => {
                self.toggles.remove(table_id);
                false
            }
        }
    }

    pub fn get(&self, table_id: &str) -> Option<&CollapseToggle> {
        self.toggles.get(table_id)
    }

    pub fn toggle(&mut self, table_id: &str, language: Language) -> Option<Transition> {
        self.toggles.get_mut(table_id).map(|t| t.toggle(language))
    }

    pub fn len(&self) -> usize {
        self.toggles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.toggles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TableRow;

    fn table(rows: usize, visible: Option<usize>) -> InsightTable {
        InsightTable {
            columns: vec![],
            rows: (0..rows).map(|i| TableRow::new(format!("r{}", i))).collect(),
            visible_rows: visible,
        }
    }

    #[test]
    fn test_no_toggle_without_collapsible_rows() {
        assert!(CollapseToggle::new("t", &table(3, Some(3))).is_none());
        assert!(CollapseToggle::new("t", &table(5, None)).is_none());
    }

    #[test]
    fn test_labels() {
        let mut t = CollapseToggle::new("love", &table(5, Some(3))).unwrap();
        assert_eq!(t.label(Language::En), "Show all 5 items");
        assert_eq!(t.label(Language::Zh), "显示全部 5 项");

        t.toggle(Language::En);
        assert_eq!(t.label(Language::En), "Show fewer");
        assert_eq!(t.label(Language::Zh), "收起");
    }

    #[test]
    fn test_staggered_transition() {
        let mut t = CollapseToggle::new("love", &table(6, Some(3))).unwrap();
        let expand = t.toggle(Language::En);

        assert_eq!(expand.phase, Phase::Expanding);
        let delays: Vec<u64> = expand.steps.iter().map(|s| s.delay_ms).collect();
        assert_eq!(delays, vec![0, 50, 100]);
        assert_eq!(expand.settled_after_ms, 400);
        assert_eq!(expand.label, "Show fewer");
        assert!(t.row_visible(&RowId::from("r5")));

        let collapse = t.toggle(Language::En);
        assert_eq!(collapse.phase, Phase::Collapsing);
        assert_eq!(collapse.label, "Show all 6 items");
        assert!(!t.row_visible(&RowId::from("r5")));
        assert!(t.row_visible(&RowId::from("r0")));
    }

    #[test]
    fn test_groups_are_independent() {
        let mut groups = CollapseGroups::default();
        assert!(groups.register("love", &table(5, Some(3))));
        assert!(groups.register("opportunities", &table(5, Some(3))));
        assert!(!groups.register("star-rating", &table(5, None)));

        groups.toggle("love", Language::En);
        assert!(groups.get("love").unwrap().is_expanded());
        assert!(!groups.get("opportunities").unwrap().is_expanded());
        assert!(groups.toggle("missing", Language::En).is_none());
        assert_eq!(groups.len(), 2);
    }
}
