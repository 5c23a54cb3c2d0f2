//! Insight tables
//!
//! Cell formatting by column kind, per-row detail expansion and the
//! quote-citation modal. Expansion state and the modal target are keyed by
//! [`RowId`], so re-rendering or re-sorting a table never points them at the
//! wrong row.

use super::escape_html;
use crate::model::{CellKind, Column, InsightTable, Language, RowId, TableRow};
use serde_json::Value;
use std::collections::HashSet;
use std::fmt::Write;

/// Container id of the competitor comparison table
pub const COMPETITOR_TABLE_ID: &str = "competitive-analysis";

// ============================================================================
// Cell formatting
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadgeTier {
    High,
    Medium,
    Low,
}

impl BadgeTier {
    /// `> 70` high, `> 40` medium, anything else low
    pub fn for_score(score: f64) -> Self {
        if score > 70.0 {
            BadgeTier::High
        } else if score > 40.0 {
            BadgeTier::Medium
        } else {
            BadgeTier::Low
        }
    }

    pub fn class(&self) -> &'static str {
        match self {
            BadgeTier::High => "badge-high",
            BadgeTier::Medium => "badge-medium",
            BadgeTier::Low => "badge-low",
        }
    }
}

/// A formatted cell, ready to be written as HTML
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(String),
    /// Bar filled to `width` percent, labelled with the raw value
    Percentage { width: f64, label: String },
    Progress { width: f64 },
    Badge { tier: BadgeTier, label: String },
}

fn numeric(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_end_matches('%').parse().ok(),
        _ => None,
    }
}

fn plain(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Insert thousands separators: `12345` → `12,345`, `-1234.5` → `-1,234.5`
pub fn group_digits(value: f64) -> String {
    let raw = format!("{}", value);
    let (sign, unsigned) = match raw.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", raw.as_str()),
    };
    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (unsigned, None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    match frac_part {
        Some(f) => format!("{}{}.{}", sign, grouped, f),
        None => format!("{}{}", sign, grouped),
    }
}

/// Format one value for a column kind. Values that should be numeric but
/// are not fall back to their text form.
pub fn format_cell(kind: CellKind, value: Option<&Value>) -> Cell {
    let number = numeric(value);
    match (kind, number) {
        (CellKind::Number, Some(n)) => Cell::Number(group_digits(n)),
        (CellKind::Percentage, Some(n)) => Cell::Percentage {
            width: n.clamp(0.0, 100.0),
            label: format!("{}%", n),
        },
        (CellKind::Progress, Some(n)) => Cell::Progress { width: n.clamp(0.0, 100.0) },
        (CellKind::Badge, Some(n)) => Cell::Badge {
            tier: BadgeTier::for_score(n),
            label: format!("{}", n),
        },
        _ => Cell::Text(plain(value)),
    }
}

impl Cell {
    pub fn to_html(&self) -> String {
        match self {
            Cell::Text(s) => escape_html(s),
            Cell::Number(s) => format!("<span class=\"num\">{}</span>", s),
            Cell::Percentage { width, label } => format!(
                "<div class=\"pct\"><div class=\"pct-bar\" style=\"width:{}%\"></div><span>{}</span></div>",
                width, label
            ),
            Cell::Progress { width } => format!(
                "<div class=\"progress-cell\"><div class=\"progress-cell-fill\" style=\"width:{}%\"></div></div>",
                width
            ),
            Cell::Badge { tier, label } => format!("<span class=\"badge {}\">{}</span>", tier.class(), label),
        }
    }
}

// ============================================================================
// Row expansion
// ============================================================================

/// Which rows have their detail panel open
#[derive(Debug, Clone, Default)]
pub struct ExpansionState {
    expanded: HashSet<RowId>,
}

impl ExpansionState {
    /// Flip a row; returns whether it is now expanded
    pub fn toggle(&mut self, row: &RowId) -> bool {
        if self.expanded.remove(row) {
            false
        } else {
            self.expanded.insert(row.clone());
            true
        }
    }

    pub fn is_expanded(&self, row: &RowId) -> bool {
        self.expanded.contains(row)
    }

    pub fn len(&self) -> usize {
        self.expanded.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expanded.is_empty()
    }
}

// ============================================================================
// Quote modal
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct ModalContent {
    pub row: RowId,
    pub title: String,
    pub quotes: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalEvent {
    Backdrop,
    CloseButton,
    Escape,
    /// A click inside the dialog body. Never closes it.
    ContentClick,
}

#[derive(Debug, Clone, Default)]
pub struct QuoteModal {
    content: Option<ModalContent>,
}

impl QuoteModal {
    /// Open on a row's quotes. Rows without quotes do not open the modal.
    pub fn open_for(&mut self, row: &TableRow, columns: &[Column]) -> bool {
        if row.quotes.is_empty() {
            return false;
        }
        self.content = Some(ModalContent {
            row: row.id.clone(),
            title: row.title(columns),
            quotes: row.quotes.clone(),
        });
        true
    }

    /// Apply an event; returns whether the modal is still open
    pub fn handle(&mut self, event: ModalEvent) -> bool {
        match event {
            ModalEvent::Backdrop | ModalEvent::CloseButton | ModalEvent::Escape => self.content = None,
            ModalEvent::ContentClick => {}
        }
        self.is_open()
    }

    pub fn is_open(&self) -> bool {
        self.content.is_some()
    }

    pub fn content(&self) -> Option<&ModalContent> {
        self.content.as_ref()
    }

    /// Modal markup. The skeleton is always emitted so the page script can
    /// fill it; a closed modal is `hidden`.
    pub fn to_html(&self) -> String {
        let mut out = String::from("<div class=\"modal-backdrop\" id=\"quote-modal\"");
        match &self.content {
            None => out.push_str(" hidden>"),
            Some(c) => {
                let _ = write!(out, " data-row-id=\"{}\">", escape_html(c.row.as_str()));
            }
        }
        out.push_str("<div class=\"modal\" role=\"dialog\"><button class=\"modal-close\" aria-label=\"close\">&times;</button>");
        let title = self.content.as_ref().map(|c| c.title.as_str()).unwrap_or("");
        let _ = write!(out, "<h3>{}</h3><div class=\"modal-quotes\">", escape_html(title));
        for q in self.content.iter().flat_map(|c| c.quotes.iter()) {
            let _ = write!(out, "<blockquote>{}</blockquote>", escape_html(q));
        }
        out.push_str("</div></div></div>");
        out
    }
}

// ============================================================================
// Table markup
// ============================================================================

/// Render a table. Rows past the visible count carry the `collapsible`
/// class and start hidden; expanded rows get their detail row shown.
pub fn render_table(table_id: &str, table: &InsightTable, expansion: &ExpansionState, language: Language) -> String {
    let mut out = String::new();
    let _ = write!(out, "<table class=\"insight-table\" id=\"{}-table\"><thead><tr>", escape_html(table_id));
    for col in &table.columns {
        let _ = write!(out, "<th>{}</th>", escape_html(&col.label));
    }
    out.push_str("<th></th></tr></thead><tbody>");

    let (details_label, quotes_label) = match language {
        Language::En => ("Details", "Quotes"),
        Language::Zh => ("详情", "原声"),
    };
    let span = table.columns.len() + 1;

    for (i, row) in table.rows.iter().enumerate() {
        let id = escape_html(row.id.as_str());
        let class = if table.is_collapsible(i) { " class=\"collapsible collapsed\"" } else { "" };
        let _ = write!(out, "<tr data-row-id=\"{}\"{}>", id, class);
        for col in &table.columns {
            let _ = write!(out, "<td>{}</td>", format_cell(col.kind, row.value(&col.key)).to_html());
        }

        out.push_str("<td class=\"row-actions\">");
        if row.details.is_some() {
            let _ = write!(out, "<button data-action=\"expand\" data-row-id=\"{}\">{}</button>", id, details_label);
        }
        if !row.quotes.is_empty() {
            let _ = write!(out, "<button data-action=\"cite\" data-row-id=\"{}\">{} ({})</button>", id, quotes_label, row.quotes.len());
        }
        out.push_str("</td></tr>");

        if let Some(details) = &row.details {
            let hidden = if expansion.is_expanded(&row.id) { "" } else { " hidden" };
            let _ = write!(
                out,
                "<tr class=\"details-row\" data-details-for=\"{}\"{}><td colspan=\"{}\">{}</td></tr>",
                id,
                hidden,
                span,
                escape_html(details)
            );
        }
    }
    out.push_str("</tbody></table>");
    out
}
