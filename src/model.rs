//! Report data schema
//!
//! The typed shape of an analysis result: personas, usage scenarios,
//! insight tables, star ratings and the optional competitive block.
//!
//! Every section is optional on the wire. A report with missing sections
//! still renders; the dashboard skips whatever is absent.

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Language
// ============================================================================

/// Output language of a generated report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Zh,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Zh => "zh",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported language '{0}' (expected 'en' or 'zh')")]
pub struct UnknownLanguage(pub String);

impl FromStr for Language {
    type Err = UnknownLanguage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" => Ok(Language::En),
            "zh" => Ok(Language::Zh),
            _ => Err(UnknownLanguage(s.to_string())),
        }
    }
}

// ============================================================================
// Chart segments and personas
// ============================================================================

/// A named, coloured, percentage-weighted chart slice.
///
/// Sibling percentages should sum to roughly 100 but nothing enforces it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    pub name: String,
    pub percentage: f64,
    pub color: String,
    #[serde(default)]
    pub details: Vec<String>,
    #[serde(default)]
    pub quotes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Demographics {
    pub age: String,
    pub gender: String,
    pub income: String,
    pub occupation: String,
}

/// A consumer segment with demographic attributes and representative quotes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Persona {
    pub id: String,
    pub name: String,
    pub description: String,
    pub percentage: f64,
    pub color: String,
    #[serde(default)]
    pub demographics: Demographics,
    #[serde(default)]
    pub traits: Vec<String>,
    #[serde(default)]
    pub quotes: Vec<String>,
}

// ============================================================================
// Tables
// ============================================================================

/// Stable row identifier. UI state (expansion, modal target) is keyed by
/// this, never by the row's position.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowId(pub String);

impl RowId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RowId {
    fn from(s: &str) -> Self {
        RowId(s.to_string())
    }
}

impl From<String> for RowId {
    fn from(s: String) -> Self {
        RowId(s)
    }
}

/// How a column's values are formatted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellKind {
    #[default]
    Text,
    Number,
    Percentage,
    Badge,
    Progress,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub key: String,
    pub label: String,
    #[serde(default)]
    pub kind: CellKind,
}

impl Column {
    pub fn new(key: impl Into<String>, label: impl Into<String>, kind: CellKind) -> Self {
        Self { key: key.into(), label: label.into(), kind }
    }
}

/// An arbitrary keyed record rendered against a column schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableRow {
    pub id: RowId,
    #[serde(flatten)]
    pub values: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub quotes: Vec<String>,
}

impl TableRow {
    pub fn new(id: impl Into<RowId>) -> Self {
        Self { id: id.into(), values: Map::new(), details: None, quotes: Vec::new() }
    }

    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.values.insert(key.to_string(), value.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_quotes(mut self, quotes: Vec<String>) -> Self {
        self.quotes = quotes;
        self
    }

    pub fn value(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Display title: the first text column that carries a string value,
    /// falling back to the row id.
    pub fn title(&self, columns: &[Column]) -> String {
        columns
            .iter()
            .filter(|c| c.kind == CellKind::Text)
            .find_map(|c| self.value(&c.key).and_then(Value::as_str))
            .map(str::to_string)
            .unwrap_or_else(|| self.id.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightTable {
    pub columns: Vec<Column>,
    pub rows: Vec<TableRow>,
    /// Rows past this count are collapsible. `None` shows everything.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible_rows: Option<usize>,
}

impl InsightTable {
    pub fn is_collapsible(&self, index: usize) -> bool {
        matches!(self.visible_rows, Some(v) if index >= v)
    }

    pub fn collapsible_count(&self) -> usize {
        match self.visible_rows {
            Some(v) => self.rows.len().saturating_sub(v),
            None => 0,
        }
    }
}

// ============================================================================
// Sections
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonaSection {
    pub summary: String,
    #[serde(default)]
    pub personas: Vec<Persona>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioSection {
    pub summary: String,
    #[serde(default)]
    pub moments: Vec<Segment>,
    #[serde(default)]
    pub locations: Vec<Segment>,
    #[serde(default)]
    pub behaviors: Vec<Segment>,
}

/// A section made of a summary line and one insight table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightSection {
    pub summary: String,
    pub table: InsightTable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StarBucket {
    pub stars: u8,
    pub percentage: f64,
}

/// One point of the rating scatter: (star rating, occurrence count)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingPoint {
    pub rating: u8,
    pub count: u32,
    pub sentiment: Sentiment,
    #[serde(default)]
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StarRatingSection {
    pub summary: String,
    pub average_rating: f64,
    pub total_reviews: u32,
    #[serde(default)]
    pub distribution: Vec<StarBucket>,
    #[serde(default)]
    pub points: Vec<RatingPoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breakdown: Option<InsightTable>,
    #[serde(default)]
    pub positive_themes: Vec<String>,
    #[serde(default)]
    pub negative_themes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompetitiveAnalysis {
    pub competitor_label: String,
    pub summary: String,
    pub comparison: InsightTable,
    #[serde(default)]
    pub advantages: Vec<String>,
    #[serde(default)]
    pub gaps: Vec<String>,
}

// ============================================================================
// Report
// ============================================================================

/// A generated analysis. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub target_category: String,
    pub language: Language,
    pub has_competitor_data: bool,
    pub own_brand_file: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub competitor_file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persona: Option<PersonaSection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scenario: Option<ScenarioSection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub love: Option<InsightSection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unmet_needs: Option<InsightSection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purchase_intent: Option<InsightSection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub star_rating: Option<StarRatingSection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opportunities: Option<InsightSection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub competitive_analysis: Option<CompetitiveAnalysis>,
}

impl AnalysisReport {
    pub fn summary(&self) -> ReportSummary {
        ReportSummary {
            id: self.id.clone(),
            timestamp: self.timestamp,
            title: report_title(self.timestamp, self.language),
            has_competitor_data: self.has_competitor_data,
            target_category: self.target_category.clone(),
            language: self.language,
        }
    }

    /// Insight table behind a section, if that section is table-shaped
    pub fn table_for(&self, section: SectionId) -> Option<&InsightTable> {
        match section {
            SectionId::Love => self.love.as_ref().map(|s| &s.table),
            SectionId::UnmetNeeds => self.unmet_needs.as_ref().map(|s| &s.table),
            SectionId::PurchaseIntent => self.purchase_intent.as_ref().map(|s| &s.table),
            SectionId::Opportunities => self.opportunities.as_ref().map(|s| &s.table),
            SectionId::StarRating => self.star_rating.as_ref().and_then(|s| s.breakdown.as_ref()),
            SectionId::Persona | SectionId::Scenario => None,
        }
    }
}

/// Listing entry for `GET /reports`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub title: String,
    pub has_competitor_data: bool,
    pub target_category: String,
    pub language: Language,
}

/// Locale-formatted report title, in the local time zone
pub fn report_title(timestamp: DateTime<Utc>, language: Language) -> String {
    let local = timestamp.with_timezone(&Local);
    match language {
        Language::En => format!("Analysis Report - {}", local.format("%m/%d/%Y, %-I:%M:%S %p")),
        Language::Zh => format!("分析报告 - {}", local.format("%Y/%m/%d %H:%M:%S")),
    }
}

// ============================================================================
// Sections of the dashboard
// ============================================================================

/// The seven report sections, in navigation order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionId {
    Persona,
    Scenario,
    Love,
    UnmetNeeds,
    PurchaseIntent,
    StarRating,
    Opportunities,
}

impl SectionId {
    pub const ALL: [SectionId; 7] = [
        SectionId::Persona,
        SectionId::Scenario,
        SectionId::Love,
        SectionId::UnmetNeeds,
        SectionId::PurchaseIntent,
        SectionId::StarRating,
        SectionId::Opportunities,
    ];

    /// DOM id of the section container
    pub fn as_str(&self) -> &'static str {
        match self {
            SectionId::Persona => "persona",
            SectionId::Scenario => "scenario",
            SectionId::Love => "love",
            SectionId::UnmetNeeds => "unmet-needs",
            SectionId::PurchaseIntent => "purchase-intent",
            SectionId::StarRating => "star-rating",
            SectionId::Opportunities => "opportunities",
        }
    }

    pub fn index(&self) -> usize {
        Self::ALL.iter().position(|s| s == self).unwrap_or(0)
    }

    pub fn parse(id: &str) -> Option<SectionId> {
        Self::ALL.iter().copied().find(|s| s.as_str() == id)
    }

    pub fn label(&self, language: Language) -> &'static str {
        match (self, language) {
            (SectionId::Persona, Language::En) => "Consumer Personas",
            (SectionId::Persona, Language::Zh) => "用户画像",
            (SectionId::Scenario, Language::En) => "Usage Scenarios",
            (SectionId::Scenario, Language::Zh) => "使用场景",
            (SectionId::Love, Language::En) => "What Customers Love",
            (SectionId::Love, Language::Zh) => "用户喜爱点",
            (SectionId::UnmetNeeds, Language::En) => "Unmet Needs",
            (SectionId::UnmetNeeds, Language::Zh) => "未满足需求",
            (SectionId::PurchaseIntent, Language::En) => "Purchase Intent",
            (SectionId::PurchaseIntent, Language::Zh) => "购买动机",
            (SectionId::StarRating, Language::En) => "Star Rating Analysis",
            (SectionId::StarRating, Language::Zh) => "星级评分分析",
            (SectionId::Opportunities, Language::En) => "Opportunities",
            (SectionId::Opportunities, Language::Zh) => "机会点",
        }
    }
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
