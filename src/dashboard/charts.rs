//! Chart renderers
//!
//! Five renderers turn report data into chart specs for the page script:
//! four donuts (personas, usage moments, locations, behaviours) and the
//! star-rating scatter. They map fields, nothing more; every number is
//! precomputed by the generator.
//!
//! A renderer whose container is not mounted, or whose data path is absent
//! or empty, returns `None` and draws nothing. That is not an error:
//! partial reports are expected.

use super::View;
use crate::model::{AnalysisReport, RatingPoint, Segment, Sentiment};
use serde::Serialize;

pub const PERSONA_CHART: &str = "persona-chart";
pub const MOMENT_CHART: &str = "moment-chart";
pub const LOCATION_CHART: &str = "location-chart";
pub const BEHAVIOR_CHART: &str = "behavior-chart";
pub const RATING_CHART: &str = "rating-chart";

pub const CONTAINERS: [&str; 5] = [PERSONA_CHART, MOMENT_CHART, LOCATION_CHART, BEHAVIOR_CHART, RATING_CHART];

pub const POSITIVE_COLOR: &str = "#4CAF50";
pub const NEGATIVE_COLOR: &str = "#F44336";
pub const NEUTRAL_COLOR: &str = "#FFC107";

/// Smallest scatter radius that stays visible
pub const MIN_POINT_RADIUS: f64 = 5.0;
/// Reviews per pixel of scatter radius
pub const RADIUS_DIVISOR: f64 = 15.0;

pub type Renderer = fn(&View, &AnalysisReport) -> Option<ChartSpec>;

/// All renderers, in page order
pub const RENDERERS: [Renderer; 5] = [persona_chart, moment_chart, location_chart, behavior_chart, rating_chart];

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ChartSpec {
    Donut(DonutChart),
    Scatter(ScatterChart),
}

impl ChartSpec {
    pub fn container(&self) -> &str {
        match self {
            ChartSpec::Donut(d) => &d.container,
            ChartSpec::Scatter(s) => &s.container,
        }
    }

    pub fn as_donut(&self) -> Option<&DonutChart> {
        match self {
            ChartSpec::Donut(d) => Some(d),
            ChartSpec::Scatter(_) => None,
        }
    }

    pub fn as_scatter(&self) -> Option<&ScatterChart> {
        match self {
            ChartSpec::Scatter(s) => Some(s),
            ChartSpec::Donut(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tooltip {
    pub title: String,
    pub value: String,
    pub details: Vec<String>,
    pub quotes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DonutSlice {
    pub name: String,
    pub value: f64,
    pub color: String,
    pub tooltip: Tooltip,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LegendEntry {
    pub name: String,
    pub percentage: String,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DonutChart {
    pub container: String,
    pub slices: Vec<DonutSlice>,
    pub legend: Vec<LegendEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScatterPoint {
    pub x: u8,
    pub y: u32,
    pub radius: f64,
    pub fill: String,
    pub border: String,
    pub sentiment: Sentiment,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScatterChart {
    pub container: String,
    pub points: Vec<ScatterPoint>,
    pub x_domain: [u8; 2],
}

/// Percentage label exactly as stored: `35.5` → `35.5%`, `40` → `40%`
pub fn format_percentage(value: f64) -> String {
    format!("{}%", value)
}

pub fn sentiment_color(sentiment: Sentiment) -> &'static str {
    match sentiment {
        Sentiment::Positive => POSITIVE_COLOR,
        Sentiment::Negative => NEGATIVE_COLOR,
        Sentiment::Neutral => NEUTRAL_COLOR,
    }
}

/// Border colour for a scatter point. Only the three sentiment colours
/// have a darker variant; anything else is returned unchanged.
pub fn border_color(fill: &str) -> String {
    match fill {
        POSITIVE_COLOR => "#388E3C",
        NEGATIVE_COLOR => "#D32F2F",
        NEUTRAL_COLOR => "#FFA000",
        other => other,
    }
    .to_string()
}

pub fn point_radius(count: u32) -> f64 {
    (count as f64 / RADIUS_DIVISOR).max(MIN_POINT_RADIUS)
}

/// One donut slice's source fields
struct SliceSource<'a> {
    name: &'a str,
    percentage: f64,
    color: &'a str,
    details: &'a [String],
    quotes: &'a [String],
}

fn donut<'a>(container: &str, sources: impl Iterator<Item = SliceSource<'a>>) -> Option<ChartSpec> {
    let mut slices = Vec::new();
    let mut legend = Vec::new();
    for s in sources {
        let label = format_percentage(s.percentage);
        legend.push(LegendEntry {
            name: s.name.to_string(),
            percentage: label.clone(),
            color: s.color.to_string(),
        });
        slices.push(DonutSlice {
            name: s.name.to_string(),
            value: s.percentage,
            color: s.color.to_string(),
            tooltip: Tooltip {
                title: s.name.to_string(),
                value: label,
                details: s.details.to_vec(),
                quotes: s.quotes.to_vec(),
            },
        });
    }
    if slices.is_empty() {
        return None;
    }
    Some(ChartSpec::Donut(DonutChart { container: container.to_string(), slices, legend }))
}

fn segment_donut(view: &View, container: &str, segments: Option<&Vec<Segment>>) -> Option<ChartSpec> {
    if !view.has(container) {
        return None;
    }
    donut(
        container,
        segments?.iter().map(|s| SliceSource {
            name: &s.name,
            percentage: s.percentage,
            color: &s.color,
            details: &s.details,
            quotes: &s.quotes,
        }),
    )
}

pub fn persona_chart(view: &View, report: &AnalysisReport) -> Option<ChartSpec> {
    if !view.has(PERSONA_CHART) {
        return None;
    }
    let personas = &report.persona.as_ref()?.personas;
    donut(
        PERSONA_CHART,
        personas.iter().map(|p| SliceSource {
            name: &p.name,
            percentage: p.percentage,
            color: &p.color,
            details: &p.traits,
            quotes: &p.quotes,
        }),
    )
}

pub fn moment_chart(view: &View, report: &AnalysisReport) -> Option<ChartSpec> {
    segment_donut(view, MOMENT_CHART, report.scenario.as_ref().map(|s| &s.moments))
}

pub fn location_chart(view: &View, report: &AnalysisReport) -> Option<ChartSpec> {
    segment_donut(view, LOCATION_CHART, report.scenario.as_ref().map(|s| &s.locations))
}

pub fn behavior_chart(view: &View, report: &AnalysisReport) -> Option<ChartSpec> {
    segment_donut(view, BEHAVIOR_CHART, report.scenario.as_ref().map(|s| &s.behaviors))
}

fn scatter_point(p: &RatingPoint) -> ScatterPoint {
    let fill = sentiment_color(p.sentiment);
    ScatterPoint {
        x: p.rating,
        y: p.count,
        radius: point_radius(p.count),
        fill: fill.to_string(),
        border: border_color(fill),
        sentiment: p.sentiment,
        label: p.label.clone(),
    }
}

pub fn rating_chart(view: &View, report: &AnalysisReport) -> Option<ChartSpec> {
    if !view.has(RATING_CHART) {
        return None;
    }
    let points = &report.star_rating.as_ref()?.points;
    if points.is_empty() {
        return None;
    }
    Some(ChartSpec::Scatter(ScatterChart {
        container: RATING_CHART.to_string(),
        points: points.iter().map(scatter_point).collect(),
        x_domain: [1, 5],
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::{AnalysisRequest, Generator};
    use crate::model::{Language, ScenarioSection};

    fn report() -> AnalysisReport {
        Generator::new()
            .generate(&AnalysisRequest {
                own_brand_file: "ownBrand-1-a.csv".to_string(),
                competitor_file: None,
                target_category: "Kettle".to_string(),
                language: Language::En,
            })
            .unwrap()
    }

    fn segment(name: &str, percentage: f64) -> Segment {
        Segment {
            name: name.to_string(),
            percentage,
            color: "#123456".to_string(),
            details: vec![format!("{} detail", name)],
            quotes: vec![format!("\"{}\" quote", name)],
        }
    }

    // ==========================================================================
    // LEGEND FIDELITY
    // ==========================================================================
    //
    // Legend and tooltip must show exactly what the report holds. No
    // rounding, no renormalising to 100.
    // ==========================================================================

    #[test]
    fn test_legend_percentages_match_input_exactly() {
        let mut r = report();
        r.scenario = Some(ScenarioSection {
            summary: String::new(),
            moments: vec![segment("A", 33.3), segment("B", 33.3), segment("C", 33.4)],
            locations: vec![],
            behaviors: vec![],
        });

        let spec = moment_chart(&View::report_page(), &r).unwrap();
        let donut = spec.as_donut().unwrap();

        let labels: Vec<&str> = donut.legend.iter().map(|l| l.percentage.as_str()).collect();
        assert_eq!(labels, vec!["33.3%", "33.3%", "33.4%"]);
        let values: Vec<f64> = donut.slices.iter().map(|s| s.value).collect();
        assert_eq!(values, vec![33.3, 33.3, 33.4]);
    }

    #[test]
    fn test_tooltip_carries_details_and_quotes_verbatim() {
        let mut r = report();
        r.scenario.as_mut().unwrap().locations = vec![segment("Home", 100.0)];

        let spec = location_chart(&View::report_page(), &r).unwrap();
        let slice = &spec.as_donut().unwrap().slices[0];
        assert_eq!(slice.tooltip.value, "100%");
        assert_eq!(slice.tooltip.details, vec!["Home detail".to_string()]);
        assert_eq!(slice.tooltip.quotes, vec!["\"Home\" quote".to_string()]);
    }

    #[test]
    fn test_format_percentage() {
        assert_eq!(format_percentage(45.0), "45%");
        assert_eq!(format_percentage(22.5), "22.5%");
        assert_eq!(format_percentage(0.0), "0%");
    }

    #[test]
    fn test_persona_chart_uses_personas() {
        let r = report();
        let spec = persona_chart(&View::report_page(), &r).unwrap();
        let donut = spec.as_donut().unwrap();
        let personas = &r.persona.as_ref().unwrap().personas;

        assert_eq!(donut.slices.len(), personas.len());
        assert_eq!(donut.slices[0].name, personas[0].name);
        assert_eq!(donut.slices[0].tooltip.details, personas[0].traits);
    }

    // ==========================================================================
    // SILENT SKIP
    // ==========================================================================

    #[test]
    fn test_absent_container_skips() {
        let view = View::from_containers([PERSONA_CHART]);
        assert!(rating_chart(&view, &report()).is_none());
        assert!(persona_chart(&view, &report()).is_some());
    }

    #[test]
    fn test_absent_or_empty_data_skips() {
        let view = View::report_page();
        let mut r = report();
        r.persona = None;
        r.star_rating.as_mut().unwrap().points.clear();
        r.scenario.as_mut().unwrap().behaviors.clear();

        assert!(persona_chart(&view, &r).is_none());
        assert!(rating_chart(&view, &r).is_none());
        assert!(behavior_chart(&view, &r).is_none());
        assert!(moment_chart(&view, &r).is_some());

        r.scenario = None;
        assert!(moment_chart(&view, &r).is_none());
    }

    // ==========================================================================
    // RATING SCATTER
    // ==========================================================================

    #[test]
    fn test_border_color_substitutions() {
        assert_eq!(border_color("#4CAF50"), "#388E3C");
        assert_eq!(border_color("#F44336"), "#D32F2F");
        assert_eq!(border_color("#FFC107"), "#FFA000");
        assert_eq!(border_color("#123456"), "#123456");
        assert_eq!(border_color("#4caf50"), "#4caf50");
    }

    #[test]
    fn test_point_radius_has_minimum() {
        assert_eq!(point_radius(0), MIN_POINT_RADIUS);
        assert_eq!(point_radius(30), MIN_POINT_RADIUS);
        assert_eq!(point_radius(450), 30.0);
        assert!(point_radius(300) > point_radius(150));
    }

    #[test]
    fn test_rating_scatter_maps_points() {
        let spec = rating_chart(&View::report_page(), &report()).unwrap();
        let scatter = spec.as_scatter().unwrap();

        assert_eq!(scatter.x_domain, [1, 5]);
        let five = &scatter.points[0];
        assert_eq!((five.x, five.y), (5, 450));
        assert_eq!(five.fill, POSITIVE_COLOR);
        assert_eq!(five.border, "#388E3C");

        let one = scatter.points.iter().find(|p| p.x == 1).unwrap();
        assert_eq!(one.fill, NEGATIVE_COLOR);
        assert_eq!(one.radius, MIN_POINT_RADIUS);
    }

    #[test]
    fn test_spec_serializes_with_type_tag() {
        let spec = rating_chart(&View::report_page(), &report()).unwrap();
        let value = serde_json::to_value(&spec).unwrap();
        assert_eq!(value["type"], "scatter");
        assert_eq!(value["container"], RATING_CHART);
    }
}
