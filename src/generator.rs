//! Mock analysis generator
//!
//! Produces a full [`AnalysisReport`] by filling the bilingual template bank
//! with the target category. The uploaded review files are downloaded and
//! decoded, but their content never shapes the output: the analysis is
//! category-templated, not derived from the data.
//!
//! Output is deterministic apart from the report id and timestamp.

use crate::model::{
    AnalysisReport, CellKind, Column, CompetitiveAnalysis, Demographics, InsightSection,
    InsightTable, Language, Persona, PersonaSection, RatingPoint, ScenarioSection, Segment,
    Sentiment, StarBucket, StarRatingSection, TableRow,
};
use crate::templates::{self as tpl, fill_all, RowTemplate, SegmentTemplate, Text};
use chrono::{DateTime, Utc};

/// Rows shown before a table's "show all" toggle
pub const DEFAULT_VISIBLE_ROWS: usize = 3;

/// Inputs of one analysis run
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub own_brand_file: String,
    pub competitor_file: Option<String>,
    pub target_category: String,
    pub language: Language,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerateError {
    #[error("targetCategory is required")]
    MissingCategory,
    #[error("ownBrandFile is required")]
    MissingOwnBrandFile,
}

/// What was read from an uploaded review file. Logged, never analyzed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadDigest {
    pub bytes: usize,
    pub lines: usize,
}

impl UploadDigest {
    pub fn from_bytes(data: &[u8]) -> Self {
        let text = String::from_utf8_lossy(data);
        let lines = text.lines().filter(|l| !l.trim().is_empty()).count();
        Self { bytes: data.len(), lines }
    }
}

// Column labels shared by the insight tables
const COL_FEATURE: Text = Text { en: "Feature", zh: "功能点" };
const COL_NEED: Text = Text { en: "Need", zh: "需求" };
const COL_DRIVER: Text = Text { en: "Purchase driver", zh: "购买动机" };
const COL_OPPORTUNITY: Text = Text { en: "Opportunity", zh: "机会点" };
const COL_MENTIONS: Text = Text { en: "Mentions", zh: "提及次数" };
const COL_SHARE: Text = Text { en: "Share", zh: "占比" };
const COL_SATISFACTION: Text = Text { en: "Satisfaction", zh: "满意度" };
const COL_URGENCY: Text = Text { en: "Urgency", zh: "紧迫度" };
const COL_INFLUENCE: Text = Text { en: "Influence", zh: "影响力" };
const COL_POTENTIAL: Text = Text { en: "Potential", zh: "潜力" };
const COL_EFFORT: Text = Text { en: "Effort", zh: "投入" };
const COL_RATING: Text = Text { en: "Rating", zh: "评分" };
const COL_REVIEWS: Text = Text { en: "Reviews", zh: "评论数" };
const COL_THEME: Text = Text { en: "Main theme", zh: "主要话题" };
const COL_DIMENSION: Text = Text { en: "Dimension", zh: "维度" };
const COL_OURS: Text = Text { en: "Your brand", zh: "本品牌" };
const COL_THEIRS: Text = Text { en: "Competitor", zh: "竞品" };
const COL_VERDICT: Text = Text { en: "Position", zh: "对比结论" };

/// Template-driven report generator
#[derive(Debug, Clone)]
pub struct Generator {
    pub visible_rows: usize,
}

impl Default for Generator {
    fn default() -> Self {
        Self::new()
    }
}

impl Generator {
    pub fn new() -> Self {
        Self { visible_rows: DEFAULT_VISIBLE_ROWS }
    }

    pub fn with_visible_rows(mut self, rows: usize) -> Self {
        self.visible_rows = rows;
        self
    }

    /// Generate a report with a fresh id and the current time
    pub fn generate(&self, request: &AnalysisRequest) -> Result<AnalysisReport, GenerateError> {
        self.generate_at(request, uuid::Uuid::new_v4().to_string(), Utc::now())
    }

    pub fn generate_at(
        &self,
        request: &AnalysisRequest,
        id: String,
        timestamp: DateTime<Utc>,
    ) -> Result<AnalysisReport, GenerateError> {
        let category = request.target_category.trim();
        if category.is_empty() {
            return Err(GenerateError::MissingCategory);
        }
        if request.own_brand_file.trim().is_empty() {
            return Err(GenerateError::MissingOwnBrandFile);
        }

        let lang = request.language;
        let has_competitor = request.competitor_file.is_some();

        Ok(AnalysisReport {
            id,
            timestamp,
            target_category: category.to_string(),
            language: lang,
            has_competitor_data: has_competitor,
            own_brand_file: request.own_brand_file.clone(),
            competitor_file: request.competitor_file.clone(),
            persona: Some(personas(lang, category)),
            scenario: Some(ScenarioSection {
                summary: tpl::SCENARIO_SUMMARY.fill(lang, category),
                moments: segments(tpl::MOMENTS, lang, category, 0),
                locations: segments(tpl::LOCATIONS, lang, category, 1),
                behaviors: segments(tpl::BEHAVIORS, lang, category, 2),
            }),
            love: Some(self.insight(
                tpl::LOVE_SUMMARY,
                [(COL_FEATURE, CellKind::Text), (COL_MENTIONS, CellKind::Number), (COL_SHARE, CellKind::Percentage), (COL_SATISFACTION, CellKind::Badge)],
                tpl::LOVE_ROWS,
                lang,
                category,
            )),
            unmet_needs: Some(self.insight(
                tpl::UNMET_SUMMARY,
                [(COL_NEED, CellKind::Text), (COL_MENTIONS, CellKind::Number), (COL_SHARE, CellKind::Progress), (COL_URGENCY, CellKind::Badge)],
                tpl::UNMET_ROWS,
                lang,
                category,
            )),
            purchase_intent: Some(self.insight(
                tpl::INTENT_SUMMARY,
                [(COL_DRIVER, CellKind::Text), (COL_MENTIONS, CellKind::Number), (COL_SHARE, CellKind::Percentage), (COL_INFLUENCE, CellKind::Badge)],
                tpl::INTENT_ROWS,
                lang,
                category,
            )),
            star_rating: Some(self.star_rating(lang, category)),
            opportunities: Some(self.insight(
                tpl::OPPORTUNITY_SUMMARY,
                [(COL_OPPORTUNITY, CellKind::Text), (COL_MENTIONS, CellKind::Number), (COL_EFFORT, CellKind::Progress), (COL_POTENTIAL, CellKind::Badge)],
                tpl::OPPORTUNITY_ROWS,
                lang,
                category,
            )),
            competitive_analysis: has_competitor.then(|| self.competitive(lang, category)),
        })
    }

    /// Build a four-column insight table. Column keys are fixed by position:
    /// title, mentions, share, score.
    fn insight(
        &self,
        summary: Text,
        columns: [(Text, CellKind); 4],
        rows: &[RowTemplate],
        lang: Language,
        category: &str,
    ) -> InsightSection {
        let keys = ["title", "mentions", "share", "score"];
        let columns = keys
            .iter()
            .zip(columns.iter())
            .map(|(key, (label, kind))| Column::new(*key, label.pick(lang), *kind))
            .collect();

        let rows = rows
            .iter()
            .map(|r| {
                TableRow::new(r.id)
                    .with("title", r.title.fill(lang, category))
                    .with("mentions", r.mentions)
                    .with("share", r.share)
                    .with("score", r.score)
                    .with_details(r.details.fill(lang, category))
                    .with_quotes(fill_all(r.quotes, lang, category))
            })
            .collect();

        InsightSection {
            summary: summary.fill(lang, category),
            table: InsightTable { columns, rows, visible_rows: Some(self.visible_rows) },
        }
    }

    fn star_rating(&self, lang: Language, category: &str) -> StarRatingSection {
        let total = tpl::MOCK_TOTAL_REVIEWS;
        let count_for = |pct: f64| (pct * total as f64 / 100.0).round() as u32;

        let points = tpl::STARS
            .iter()
            .map(|s| RatingPoint {
                rating: s.stars,
                count: count_for(s.percentage),
                sentiment: sentiment_for(s.stars),
                label: s.theme.fill(lang, category),
            })
            .collect();

        let rows = tpl::STARS
            .iter()
            .map(|s| {
                TableRow::new(format!("stars-{}", s.stars))
                    .with("rating", format!("{} ★", s.stars))
                    .with("share", s.percentage)
                    .with("reviews", count_for(s.percentage))
                    .with("theme", s.theme.fill(lang, category))
            })
            .collect();

        let average = tpl::STARS.iter().map(|s| s.stars as f64 * s.percentage).sum::<f64>() / 100.0;

        StarRatingSection {
            summary: tpl::RATING_SUMMARY.fill(lang, category),
            average_rating: (average * 100.0).round() / 100.0,
            total_reviews: total,
            distribution: tpl::STARS
                .iter()
                .map(|s| StarBucket { stars: s.stars, percentage: s.percentage })
                .collect(),
            points,
            breakdown: Some(InsightTable {
                columns: vec![
                    Column::new("rating", COL_RATING.pick(lang), CellKind::Text),
                    Column::new("share", COL_SHARE.pick(lang), CellKind::Percentage),
                    Column::new("reviews", COL_REVIEWS.pick(lang), CellKind::Number),
                    Column::new("theme", COL_THEME.pick(lang), CellKind::Text),
                ],
                rows,
                visible_rows: None,
            }),
            positive_themes: fill_all(tpl::POSITIVE_THEMES, lang, category),
            negative_themes: fill_all(tpl::NEGATIVE_THEMES, lang, category),
        }
    }

    fn competitive(&self, lang: Language, category: &str) -> CompetitiveAnalysis {
        let rows = tpl::COMPARISON_ROWS
            .iter()
            .map(|c| {
                TableRow::new(c.id)
                    .with("dimension", c.dimension.fill(lang, category))
                    .with("own", c.own)
                    .with("competitor", c.competitor)
                    .with("verdict", c.verdict.fill(lang, category))
            })
            .collect();

        CompetitiveAnalysis {
            competitor_label: tpl::COMPETITOR_LABEL.fill(lang, category),
            summary: tpl::COMPETITOR_SUMMARY.fill(lang, category),
            comparison: InsightTable {
                columns: vec![
                    Column::new("dimension", COL_DIMENSION.pick(lang), CellKind::Text),
                    Column::new("own", COL_OURS.pick(lang), CellKind::Percentage),
                    Column::new("competitor", COL_THEIRS.pick(lang), CellKind::Percentage),
                    Column::new("verdict", COL_VERDICT.pick(lang), CellKind::Text),
                ],
                rows,
                visible_rows: None,
            },
            advantages: fill_all(tpl::COMPETITOR_ADVANTAGES, lang, category),
            gaps: fill_all(tpl::COMPETITOR_GAPS, lang, category),
        }
    }
}

fn sentiment_for(stars: u8) -> Sentiment {
    match stars {
        4..=5 => Sentiment::Positive,
        3 => Sentiment::Neutral,
        _ => Sentiment::Negative,
    }
}

fn personas(lang: Language, category: &str) -> PersonaSection {
    let personas = tpl::PERSONAS
        .iter()
        .enumerate()
        .map(|(i, p)| Persona {
            id: p.id.to_string(),
            name: p.name.fill(lang, category),
            description: p.description.fill(lang, category),
            percentage: p.percentage,
            color: tpl::PALETTE[i % tpl::PALETTE.len()].to_string(),
            demographics: Demographics {
                age: p.age.fill(lang, category),
                gender: p.gender.fill(lang, category),
                income: p.income.fill(lang, category),
                occupation: p.occupation.fill(lang, category),
            },
            traits: fill_all(p.traits, lang, category),
            quotes: fill_all(p.quotes, lang, category),
        })
        .collect();

    PersonaSection { summary: tpl::PERSONA_SUMMARY.fill(lang, category), personas }
}

/// `offset` rotates the palette so neighbouring charts don't share colours
fn segments(templates: &[SegmentTemplate], lang: Language, category: &str, offset: usize) -> Vec<Segment> {
    templates
        .iter()
        .enumerate()
        .map(|(i, s)| Segment {
            name: s.name.fill(lang, category),
            percentage: s.percentage,
            color: tpl::PALETTE[(i + offset) % tpl::PALETTE.len()].to_string(),
            details: fill_all(s.details, lang, category),
            quotes: fill_all(s.quotes, lang, category),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn request(category: &str, language: Language, competitor: bool) -> AnalysisRequest {
        AnalysisRequest {
            own_brand_file: "ownBrand-1-reviews.csv".to_string(),
            competitor_file: competitor.then(|| "competitor-1-rival.csv".to_string()),
            target_category: category.to_string(),
            language,
        }
    }

    fn fixed(req: &AnalysisRequest) -> AnalysisReport {
        let ts = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();
        Generator::new().generate_at(req, "fixed-id".to_string(), ts).unwrap()
    }

    // ==========================================================================
    // VALIDATION
    // ==========================================================================

    #[test]
    fn test_blank_category_rejected() {
        let err = Generator::new().generate(&request("   ", Language::En, false)).unwrap_err();
        assert_eq!(err, GenerateError::MissingCategory);
    }

    #[test]
    fn test_missing_own_brand_file_rejected() {
        let mut req = request("Kettle", Language::En, false);
        req.own_brand_file.clear();
        assert_eq!(Generator::new().generate(&req).unwrap_err(), GenerateError::MissingOwnBrandFile);
    }

    // ==========================================================================
    // TEMPLATE SUBSTITUTION
    // ==========================================================================
    //
    // The analysis is category-templated. The same inputs must produce the
    // same report apart from id and timestamp, and the category must appear
    // verbatim in both languages.
    // ==========================================================================

    #[test]
    fn test_deterministic_apart_from_id_and_time() {
        let req = request("Kettle", Language::En, true);
        let a = Generator::new().generate(&req).unwrap();
        let mut b = Generator::new().generate(&req).unwrap();
        assert_ne!(a.id, b.id);
        b.id = a.id.clone();
        b.timestamp = a.timestamp;
        assert_eq!(a, b);
    }

    #[test]
    fn test_chinese_templates_interpolate_category_literally() {
        let report = fixed(&request("Smart Watch", Language::Zh, false));
        let json = serde_json::to_string(&report).unwrap();

        assert!(json.contains("Smart Watch日常重度用户"));
        assert!(json.contains("提升Smart Watch耐用性"));
        assert!(!json.contains(tpl::CATEGORY));
    }

    #[test]
    fn test_category_is_trimmed() {
        let report = fixed(&request("  Blender ", Language::En, false));
        assert_eq!(report.target_category, "Blender");
        assert_eq!(report.persona.unwrap().personas[0].name, "Daily Blender Power User");
    }

    // ==========================================================================
    // COMPETITOR BLOCK
    // ==========================================================================

    #[test]
    fn test_competitor_block_only_with_competitor_file() {
        let without = fixed(&request("Kettle", Language::En, false));
        assert!(without.competitive_analysis.is_none());
        assert!(!without.has_competitor_data);
        let value = serde_json::to_value(&without).unwrap();
        assert!(value.get("competitiveAnalysis").is_none());

        let with = fixed(&request("Kettle", Language::En, true));
        assert!(with.has_competitor_data);
        let block = with.competitive_analysis.unwrap();
        assert_eq!(block.comparison.rows.len(), tpl::COMPARISON_ROWS.len());
    }

    // ==========================================================================
    // STAR RATING
    // ==========================================================================

    #[test]
    fn test_star_rating_breakdown() {
        let rating = fixed(&request("Kettle", Language::En, false)).star_rating.unwrap();

        let pcts: Vec<f64> = rating.distribution.iter().map(|b| b.percentage).collect();
        assert_eq!(pcts, vec![45.0, 30.0, 15.0, 7.0, 3.0]);

        let counts: Vec<u32> = rating.points.iter().map(|p| p.count).collect();
        assert_eq!(counts, vec![450, 300, 150, 70, 30]);

        assert_eq!(rating.points[0].sentiment, Sentiment::Positive);
        assert_eq!(rating.points[2].sentiment, Sentiment::Neutral);
        assert_eq!(rating.points[4].sentiment, Sentiment::Negative);
        assert!((rating.average_rating - 4.07).abs() < 1e-9);
    }

    #[test]
    fn test_tables_carry_collapse_threshold() {
        let report = Generator::new()
            .with_visible_rows(2)
            .generate(&request("Kettle", Language::En, false))
            .unwrap();
        let love = report.love.unwrap();
        assert_eq!(love.table.visible_rows, Some(2));
        assert_eq!(love.table.collapsible_count(), tpl::LOVE_ROWS.len() - 2);
    }

    #[test]
    fn test_upload_digest_counts_non_empty_lines() {
        let digest = UploadDigest::from_bytes(b"rating,text\n5,great\n\n1,bad\n");
        assert_eq!(digest, UploadDigest { bytes: 27, lines: 3 });
    }
}
