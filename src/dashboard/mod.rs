//! Report rendering and interaction model
//!
//! The dashboard is a thin presentation layer over an [`AnalysisReport`]:
//!
//! - [`charts`]: maps persona/scenario segments and rating points to chart specs
//! - [`table`]: cell formatting, row expansion and the quote-citation modal
//! - [`nav`]: which of the seven sections is active, and the progress bar
//! - [`collapse`]: "show all / show fewer" toggles over collapsible rows
//!
//! [`DashboardContext`] owns all of that state for one view. Charts are
//! disposed explicitly when the view is replaced, so nothing leaks across
//! report switches.

pub mod charts;
pub mod collapse;
pub mod nav;
pub mod table;

use crate::model::{AnalysisReport, Language, SectionId};
use charts::ChartSpec;
use collapse::CollapseGroups;
use nav::NavigationController;
use std::collections::{BTreeMap, BTreeSet};
use table::{ExpansionState, QuoteModal};
use tracing::debug;

/// The set of container ids mounted in the current page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct View {
    containers: BTreeSet<String>,
}

impl View {
    pub fn from_containers<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { containers: ids.into_iter().map(Into::into).collect() }
    }

    /// Every container the full report page provides
    pub fn report_page() -> Self {
        let mut ids: Vec<String> = charts::CONTAINERS.iter().map(|s| s.to_string()).collect();
        ids.extend(SectionId::ALL.iter().map(|s| s.as_str().to_string()));
        Self::from_containers(ids)
    }

    pub fn has(&self, id: &str) -> bool {
        self.containers.contains(id)
    }
}

/// A mounted chart. Its id changes every time the container is redrawn.
#[derive(Debug, Clone)]
pub struct ChartHandle {
    pub id: u64,
    pub spec: ChartSpec,
}

/// Owns chart lifecycles and interaction state for one dashboard view
#[derive(Debug)]
pub struct DashboardContext {
    view: View,
    language: Language,
    charts: BTreeMap<String, ChartHandle>,
    next_handle: u64,
    disposed: u64,
    pub nav: NavigationController,
    pub expansion: ExpansionState,
    pub modal: QuoteModal,
    pub toggles: CollapseGroups,
}

impl DashboardContext {
    pub fn new(view: View, language: Language) -> Self {
        Self {
            view,
            language,
            charts: BTreeMap::new(),
            next_handle: 1,
            disposed: 0,
            nav: NavigationController::new(),
            expansion: ExpansionState::default(),
            modal: QuoteModal::default(),
            toggles: CollapseGroups::default(),
        }
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    pub fn language(&self) -> Language {
        self.language
    }

    /// Run every chart renderer and register collapse toggles for the
    /// report's tables. Returns how many charts were mounted; renderers
    /// whose container or data is missing are skipped silently.
    pub fn render(&mut self, report: &AnalysisReport) -> usize {
        self.language = report.language;
        let mut mounted = 0;
        for render in charts::RENDERERS {
            if let Some(spec) = render(&self.view, report) {
                self.mount(spec);
                mounted += 1;
            }
        }

        for section in SectionId::ALL {
            if !self.view.has(section.as_str()) {
                continue;
            }
            if let Some(table) = report.table_for(section) {
                self.toggles.register(section.as_str(), table);
            }
        }
        if let Some(block) = &report.competitive_analysis {
            self.toggles.register(table::COMPETITOR_TABLE_ID, &block.comparison);
        }
        mounted
    }

    /// Mount a chart, disposing whatever was drawn in that container before
    pub fn mount(&mut self, spec: ChartSpec) -> u64 {
        let id = self.next_handle;
        self.next_handle += 1;
        let container = spec.container().to_string();
        if let Some(old) = self.charts.insert(container.clone(), ChartHandle { id, spec }) {
            debug!(container = %container, handle = old.id, "replacing chart");
            self.disposed += 1;
        }
        id
    }

    pub fn chart(&self, container: &str) -> Option<&ChartSpec> {
        self.charts.get(container).map(|h| &h.spec)
    }

    pub fn handle(&self, container: &str) -> Option<u64> {
        self.charts.get(container).map(|h| h.id)
    }

    pub fn charts(&self) -> impl Iterator<Item = &ChartSpec> {
        self.charts.values().map(|h| &h.spec)
    }

    pub fn live_charts(&self) -> usize {
        self.charts.len()
    }

    /// Total charts torn down over this context's lifetime
    pub fn disposed_charts(&self) -> u64 {
        self.disposed
    }

    /// Dispose every live chart. Returns how many were torn down.
    pub fn dispose(&mut self) -> usize {
        let count = self.charts.len();
        for (container, handle) in std::mem::take(&mut self.charts) {
            debug!(container = %container, handle = handle.id, "disposing chart");
        }
        self.disposed += count as u64;
        count
    }

    /// Swap in a new view: charts of the old one are disposed and all
    /// interaction state starts fresh.
    pub fn replace_view(&mut self, view: View) -> usize {
        let disposed = self.dispose();
        self.view = view;
        self.nav = NavigationController::new();
        self.expansion = ExpansionState::default();
        self.modal = QuoteModal::default();
        self.toggles = CollapseGroups::default();
        disposed
    }
}

impl Drop for DashboardContext {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// Escape text for HTML element content and quoted attributes
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
