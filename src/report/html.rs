//! HTML dashboard with D3.js charts
//!
//! Tables, cards and navigation are rendered here in Rust; the chart specs
//! and interaction constants are embedded as JSON and drawn by a small
//! script in the page.

use crate::dashboard::charts::{self, ChartSpec};
use crate::dashboard::collapse::{STAGGER_MS, TRANSITION_MS};
use crate::dashboard::nav::{BACK_TO_TOP_OFFSET, ROOT_MARGIN, VISIBILITY_THRESHOLD};
use crate::dashboard::table::{render_table, COMPETITOR_TABLE_ID};
use crate::dashboard::{escape_html, DashboardContext, View};
use crate::model::{AnalysisReport, InsightTable, Language, ReportSummary, SectionId};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::io::{self, Write};

struct Labels {
    brand: &'static str,
    category: &'static str,
    generated: &'static str,
    competitor: &'static str,
    own_only: &'static str,
    average: &'static str,
    total: &'static str,
    positive: &'static str,
    negative: &'static str,
    advantages: &'static str,
    gaps: &'static str,
    back_to_top: &'static str,
    moments: &'static str,
    locations: &'static str,
    behaviors: &'static str,
    less: &'static str,
    reports: &'static str,
    no_reports: &'static str,
}

const EN: Labels = Labels {
    brand: "Review Insights",
    category: "Category",
    generated: "Generated",
    competitor: "Includes competitor data",
    own_only: "Own brand only",
    average: "Average rating",
    total: "Total reviews",
    positive: "Positive themes",
    negative: "Negative themes",
    advantages: "Where we lead",
    gaps: "Where we trail",
    back_to_top: "Back to top",
    moments: "Usage moments",
    locations: "Locations",
    behaviors: "Behaviours",
    less: "Show fewer",
    reports: "Reports",
    no_reports: "No reports yet. Upload review files and run an analysis.",
};

const ZH: Labels = Labels {
    brand: "评论洞察",
    category: "品类",
    generated: "生成时间",
    competitor: "包含竞品数据",
    own_only: "仅本品数据",
    average: "平均评分",
    total: "评论总数",
    positive: "正面主题",
    negative: "负面主题",
    advantages: "领先之处",
    gaps: "落后之处",
    back_to_top: "回到顶部",
    moments: "使用时刻",
    locations: "使用地点",
    behaviors: "使用行为",
    less: "收起",
    reports: "报告",
    no_reports: "暂无报告。请上传评论文件并运行分析。",
};

fn labels(language: Language) -> &'static Labels {
    match language {
        Language::En => &EN,
        Language::Zh => &ZH,
    }
}

#[derive(Serialize)]
struct QuoteEntry<'a> {
    title: String,
    quotes: &'a [String],
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PageData<'a> {
    charts: Vec<&'a ChartSpec>,
    sections: Vec<&'static str>,
    threshold: f64,
    root_margin: &'static str,
    back_to_top_offset: f64,
    stagger_ms: u64,
    transition_ms: u64,
    quotes: BTreeMap<String, QuoteEntry<'a>>,
}

/// JSON safe to place inside a `<script>` element
fn script_json<T: Serialize>(value: &T) -> io::Result<String> {
    Ok(serde_json::to_string(value)?.replace("</", "<\\/"))
}

fn collect_quotes<'a>(table_id: &str, table: &'a InsightTable, out: &mut BTreeMap<String, QuoteEntry<'a>>) {
    for row in table.rows.iter().filter(|r| !r.quotes.is_empty()) {
        out.insert(
            format!("{}-table:{}", table_id, row.id),
            QuoteEntry { title: row.title(&table.columns), quotes: &row.quotes },
        );
    }
}

fn list(out: &mut String, heading: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    let _ = write!(out, "<div class=\"theme-list\"><h4>{}</h4><ul>", escape_html(heading));
    for item in items {
        let _ = write!(out, "<li>{}</li>", escape_html(item));
    }
    out.push_str("</ul></div>");
}

fn table_block(out: &mut String, ctx: &DashboardContext, table_id: &str, table: &InsightTable) {
    out.push_str(&render_table(table_id, table, &ctx.expansion, ctx.language()));
    if let Some(toggle) = ctx.toggles.get(table_id) {
        let label = toggle.label(ctx.language());
        let _ = write!(
            out,
            "<button class=\"collapse-toggle\" data-table=\"{}\" data-more-label=\"{}\" data-less-label=\"{}\">{}</button>",
            escape_html(table_id),
            escape_html(&label),
            labels(ctx.language()).less,
            escape_html(&label)
        );
    }
}

fn section_body(report: &AnalysisReport, ctx: &DashboardContext, section: SectionId) -> Option<String> {
    let l = labels(report.language);
    let mut out = String::new();

    match section {
        SectionId::Persona => {
            let block = report.persona.as_ref()?;
            let _ = write!(out, "<p class=\"summary\">{}</p>", escape_html(&block.summary));
            let _ = write!(out, "<div class=\"chart\" id=\"{}\"></div><div class=\"cards\">", charts::PERSONA_CHART);
            for p in &block.personas {
                let _ = write!(
                    out,
                    "<div class=\"card\" style=\"border-top-color:{}\"><h4>{} <span class=\"dim\">{}%</span></h4><p>{}</p><p class=\"dim\">{} · {} · {} · {}</p><ul>",
                    escape_html(&p.color),
                    escape_html(&p.name),
                    p.percentage,
                    escape_html(&p.description),
                    escape_html(&p.demographics.age),
                    escape_html(&p.demographics.gender),
                    escape_html(&p.demographics.income),
                    escape_html(&p.demographics.occupation)
                );
                for t in &p.traits {
                    let _ = write!(out, "<li>{}</li>", escape_html(t));
                }
                out.push_str("</ul>");
                if let Some(q) = p.quotes.first() {
                    let _ = write!(out, "<blockquote>{}</blockquote>", escape_html(q));
                }
                out.push_str("</div>");
            }
            out.push_str("</div>");
        }
        SectionId::Scenario => {
            let block = report.scenario.as_ref()?;
            let _ = write!(out, "<p class=\"summary\">{}</p><div class=\"chart-grid\">", escape_html(&block.summary));
            for (title, id) in [
                (l.moments, charts::MOMENT_CHART),
                (l.locations, charts::LOCATION_CHART),
                (l.behaviors, charts::BEHAVIOR_CHART),
            ] {
                let _ = write!(out, "<div class=\"chart-card\"><h4>{}</h4><div class=\"chart\" id=\"{}\"></div></div>", title, id);
            }
            out.push_str("</div>");
        }
        SectionId::StarRating => {
            let block = report.star_rating.as_ref()?;
            let _ = write!(
                out,
                "<p class=\"summary\">{}</p><div class=\"stats\"><div class=\"stat\"><div class=\"stat-value\">{:.2}</div><div class=\"stat-label\">{}</div></div><div class=\"stat\"><div class=\"stat-value\">{}</div><div class=\"stat-label\">{}</div></div></div>",
                escape_html(&block.summary),
                block.average_rating,
                l.average,
                crate::dashboard::table::group_digits(block.total_reviews as f64),
                l.total
            );
            let _ = write!(out, "<div class=\"chart wide\" id=\"{}\"></div>", charts::RATING_CHART);
            if let Some(table) = &block.breakdown {
                table_block(&mut out, ctx, section.as_str(), table);
            }
            out.push_str("<div class=\"themes\">");
            list(&mut out, l.positive, &block.positive_themes);
            list(&mut out, l.negative, &block.negative_themes);
            out.push_str("</div>");
        }
        SectionId::Love | SectionId::UnmetNeeds | SectionId::PurchaseIntent | SectionId::Opportunities => {
            let block = match section {
                SectionId::Love => report.love.as_ref(),
                SectionId::UnmetNeeds => report.unmet_needs.as_ref(),
                SectionId::PurchaseIntent => report.purchase_intent.as_ref(),
                _ => report.opportunities.as_ref(),
            }?;
            let _ = write!(out, "<p class=\"summary\">{}</p>", escape_html(&block.summary));
            table_block(&mut out, ctx, section.as_str(), &block.table);
        }
    }
    Some(out)
}

fn competitor_block(report: &AnalysisReport, ctx: &DashboardContext) -> String {
    let Some(block) = &report.competitive_analysis else {
        return String::new();
    };
    let l = labels(report.language);
    let mut out = format!(
        "<section class=\"section\" id=\"{}\"><h2>{}</h2><p class=\"summary\">{}</p>",
        COMPETITOR_TABLE_ID,
        escape_html(&block.competitor_label),
        escape_html(&block.summary)
    );
    table_block(&mut out, ctx, COMPETITOR_TABLE_ID, &block.comparison);
    out.push_str("<div class=\"themes\">");
    list(&mut out, l.advantages, &block.advantages);
    list(&mut out, l.gaps, &block.gaps);
    out.push_str("</div></section>");
    out
}

/// Write the full dashboard page for one report
pub fn write<W: Write>(writer: &mut W, report: &AnalysisReport) -> io::Result<()> {
    let mut ctx = DashboardContext::new(View::report_page(), report.language);
    ctx.render(report);
    let l = labels(report.language);

    let mut quotes = BTreeMap::new();
    for section in SectionId::ALL {
        if let Some(table) = report.table_for(section) {
            collect_quotes(section.as_str(), table, &mut quotes);
        }
    }
    if let Some(block) = &report.competitive_analysis {
        collect_quotes(COMPETITOR_TABLE_ID, &block.comparison, &mut quotes);
    }

    let data = script_json(&PageData {
        charts: ctx.charts().collect(),
        sections: SectionId::ALL.iter().map(|s| s.as_str()).collect(),
        threshold: VISIBILITY_THRESHOLD,
        root_margin: ROOT_MARGIN,
        back_to_top_offset: BACK_TO_TOP_OFFSET,
        stagger_ms: STAGGER_MS,
        transition_ms: TRANSITION_MS,
        quotes,
    })?;

    let mut nav = String::new();
    for entry in ctx.nav.entries(report.language) {
        let _ = write!(
            nav,
            "<a class=\"nav-item{}\" href=\"#{}\">{}</a>",
            if entry.active { " active" } else { "" },
            entry.id,
            entry.label
        );
    }

    let mut body = String::new();
    for section in SectionId::ALL {
        let content = section_body(report, &ctx, section).unwrap_or_default();
        let _ = write!(
            body,
            "<section class=\"section\" id=\"{}\"><h2>{}</h2>{}</section>",
            section.as_str(),
            section.label(report.language),
            content
        );
    }
    body.push_str(&competitor_block(report, &ctx));

    let summary = report.summary();
    let scope = if report.has_competitor_data { l.competitor } else { l.own_only };

    write!(
        writer,
        r#"<!DOCTYPE html>
<html lang="{lang}">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <script src="https://d3js.org/d3.v7.min.js"></script>
    <style>{style}</style>
</head>
<body>
    <div class="progress"><div class="progress-fill" id="progress-fill" style="width:{progress}%"></div></div>
    <nav class="side-nav">{nav}</nav>
    <div class="container">
        <div class="header">
            <div class="logo">{brand}</div>
            <div>
                <h1>{title}</h1>
                <div class="subtitle">{category_label}: <strong>{category}</strong> · {generated_label}: {generated} · {scope}</div>
            </div>
        </div>
        {body}
    </div>
    {modal}
    <button class="back-to-top" id="back-to-top">{back_to_top}</button>
    <div class="tooltip" id="tooltip"></div>
    <script type="application/json" id="report-data">{data}</script>
    <script>{script}</script>
</body>
</html>
"#,
        lang = report.language,
        title = escape_html(&summary.title),
        style = STYLE,
        progress = ctx.nav.progress(),
        nav = nav,
        brand = l.brand,
        category_label = l.category,
        category = escape_html(&report.target_category),
        generated_label = l.generated,
        generated = report.timestamp.to_rfc3339(),
        scope = scope,
        body = body,
        modal = ctx.modal.to_html(),
        back_to_top = l.back_to_top,
        data = data,
        script = SCRIPT,
    )
}

/// Landing page listing stored reports, newest first
pub fn write_index<W: Write>(writer: &mut W, reports: &[ReportSummary], language: Language) -> io::Result<()> {
    let l = labels(language);
    let mut rows = String::new();
    for r in reports {
        let _ = write!(
            rows,
            "<tr><td><a href=\"/dashboard?id={id}\">{title}</a></td><td>{category}</td><td>{lang}</td><td>{scope}</td></tr>",
            id = escape_html(&r.id),
            title = escape_html(&r.title),
            category = escape_html(&r.target_category),
            lang = r.language,
            scope = if r.has_competitor_data { l.competitor } else { l.own_only },
        );
    }
    if reports.is_empty() {
        let _ = write!(rows, "<tr><td colspan=\"4\" class=\"dim\">{}</td></tr>", l.no_reports);
    }

    write!(
        writer,
        r#"<!DOCTYPE html>
<html lang="{lang}">
<head>
    <meta charset="UTF-8">
    <title>{brand}</title>
    <style>{style}</style>
</head>
<body>
    <div class="container">
        <div class="header"><div class="logo">{brand}</div><h1>{heading}</h1></div>
        <table class="insight-table"><tbody>{rows}</tbody></table>
    </div>
</body>
</html>
"#,
        lang = language,
        brand = l.brand,
        heading = l.reports,
        style = STYLE,
        rows = rows,
    )
}

const STYLE: &str = r#"
:root { --bg: #f6f8fa; --card: #ffffff; --border: #d0d7de; --text: #1f2328; --dim: #656d76; --accent: #0969da; --high: #1a7f37; --medium: #9a6700; --low: #cf222e; }
* { box-sizing: border-box; margin: 0; padding: 0; }
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', 'Noto Sans', 'PingFang SC', Helvetica, Arial, sans-serif; background: var(--bg); color: var(--text); line-height: 1.5; }
.container { max-width: 1200px; margin: 0 auto; padding: 2rem 2rem 2rem 14rem; }
.header { display: flex; align-items: center; gap: 1.5rem; margin-bottom: 2rem; padding-bottom: 1rem; border-bottom: 1px solid var(--border); }
.logo { font-size: 1.5rem; font-weight: 800; color: var(--accent); }
.subtitle, .dim { color: var(--dim); font-size: 0.875rem; }
.progress { position: fixed; top: 0; left: 0; right: 0; height: 4px; background: var(--border); z-index: 20; }
.progress-fill { height: 100%; background: var(--accent); transition: width 0.3s; }
.side-nav { position: fixed; top: 2rem; left: 1rem; width: 12rem; display: flex; flex-direction: column; gap: 0.25rem; }
.nav-item { padding: 0.4rem 0.75rem; border-radius: 6px; color: var(--dim); text-decoration: none; font-size: 0.875rem; }
.nav-item.active { background: var(--accent); color: #fff; }
.section { background: var(--card); border: 1px solid var(--border); border-radius: 12px; padding: 1.5rem; margin-bottom: 2rem; }
.section h2 { font-size: 1.25rem; margin-bottom: 0.75rem; }
.summary { margin-bottom: 1rem; }
.chart-grid { display: grid; grid-template-columns: repeat(3, 1fr); gap: 1rem; }
.chart { display: flex; flex-direction: column; align-items: center; }
.chart.wide { width: 100%; }
.chart-legend { display: flex; flex-wrap: wrap; gap: 0.75rem; margin-top: 0.75rem; font-size: 0.8rem; }
.legend-item { display: flex; align-items: center; gap: 0.35rem; }
.legend-dot { width: 10px; height: 10px; border-radius: 50%; }
.cards { display: grid; grid-template-columns: repeat(2, 1fr); gap: 1rem; margin-top: 1rem; }
.card { border: 1px solid var(--border); border-top: 4px solid; border-radius: 8px; padding: 1rem; }
.card ul, .theme-list ul { margin: 0.5rem 0 0 1.25rem; }
blockquote { border-left: 3px solid var(--border); padding-left: 0.75rem; margin: 0.5rem 0; color: var(--dim); font-style: italic; }
.stats { display: grid; grid-template-columns: repeat(2, 1fr); gap: 1rem; margin-bottom: 1rem; }
.stat { border: 1px solid var(--border); border-radius: 8px; padding: 1rem; text-align: center; }
.stat-value { font-size: 2rem; font-weight: 700; }
.stat-label { color: var(--dim); font-size: 0.8rem; text-transform: uppercase; }
.themes { display: grid; grid-template-columns: repeat(2, 1fr); gap: 1rem; margin-top: 1rem; }
.insight-table { width: 100%; border-collapse: collapse; font-size: 0.875rem; }
.insight-table th, .insight-table td { padding: 0.5rem; border-bottom: 1px solid var(--border); text-align: left; }
.insight-table tr.collapsed, .insight-table tr.collapsed + tr.details-row { display: none; }
.insight-table tr.expanding, .insight-table tr.collapsing { transition: opacity 0.3s; opacity: 0.4; }
.details-row td { background: var(--bg); color: var(--dim); }
.row-actions button, .collapse-toggle { border: 1px solid var(--border); background: var(--card); border-radius: 6px; padding: 0.2rem 0.6rem; cursor: pointer; margin-right: 0.25rem; }
.collapse-toggle { margin-top: 0.75rem; }
.badge { padding: 0.1rem 0.5rem; border-radius: 999px; font-weight: 600; color: #fff; }
.badge-high { background: var(--high); }
.badge-medium { background: var(--medium); }
.badge-low { background: var(--low); }
.pct { position: relative; background: var(--bg); border-radius: 4px; min-width: 6rem; }
.pct-bar { position: absolute; top: 0; bottom: 0; left: 0; background: #b6e3ff; border-radius: 4px; }
.pct span { position: relative; padding: 0 0.4rem; }
.progress-cell { background: var(--bg); border-radius: 4px; height: 0.6rem; min-width: 6rem; overflow: hidden; }
.progress-cell-fill { height: 100%; background: var(--accent); border-radius: 4px; }
.modal-backdrop { position: fixed; inset: 0; background: rgba(0,0,0,0.45); display: flex; align-items: center; justify-content: center; z-index: 30; }
.modal-backdrop[hidden] { display: none; }
.modal { background: var(--card); border-radius: 12px; padding: 1.5rem; max-width: 560px; width: 90%; max-height: 80vh; overflow-y: auto; position: relative; }
.modal-close { position: absolute; top: 0.5rem; right: 0.75rem; border: none; background: none; font-size: 1.5rem; cursor: pointer; }
.back-to-top { position: fixed; right: 2rem; bottom: 2rem; padding: 0.5rem 1rem; border-radius: 999px; border: 1px solid var(--border); background: var(--card); cursor: pointer; opacity: 0; pointer-events: none; transition: opacity 0.2s; }
.back-to-top.visible { opacity: 1; pointer-events: auto; }
.tooltip { position: absolute; max-width: 320px; background: var(--text); color: #fff; font-size: 0.8rem; padding: 0.5rem 0.75rem; border-radius: 6px; pointer-events: none; opacity: 0; }
.tooltip.visible { opacity: 1; }
.tooltip div, .tooltip em { display: block; }
"#;

const SCRIPT: &str = r#"
(function () {
    const data = JSON.parse(document.getElementById('report-data').textContent);
    const tooltip = document.getElementById('tooltip');
    let active = 0;

    function showTooltip(event, tip) {
        tooltip.innerHTML = '';
        const head = document.createElement('strong');
        head.textContent = tip.title + ': ' + tip.value;
        tooltip.appendChild(head);
        tip.details.forEach(d => { const el = document.createElement('div'); el.textContent = d; tooltip.appendChild(el); });
        tip.quotes.forEach(q => { const el = document.createElement('em'); el.textContent = q; tooltip.appendChild(el); });
        tooltip.classList.add('visible');
        tooltip.style.left = (event.pageX + 10) + 'px';
        tooltip.style.top = (event.pageY - 10) + 'px';
    }

    function hideTooltip() {
        tooltip.classList.remove('visible');
    }

    function drawDonut(spec) {
        const el = document.getElementById(spec.container);
        if (!el) return;
        el.innerHTML = '';
        const width = 260, height = 260;
        const radius = Math.min(width, height) / 2;
        const svg = d3.select(el).append('svg').attr('width', width).attr('height', height)
            .append('g').attr('transform', `translate(${width / 2},${height / 2})`);
        const pie = d3.pie().value(d => d.value).sort(null);
        const arc = d3.arc().innerRadius(radius * 0.55).outerRadius(radius * 0.9);
        const arcHover = d3.arc().innerRadius(radius * 0.55).outerRadius(radius * 0.95);

        svg.selectAll('path').data(pie(spec.slices)).enter().append('path')
            .attr('d', arc)
            .attr('fill', d => d.data.color)
            .attr('stroke', '#fff')
            .attr('stroke-width', 2)
            .on('mouseover', function (event, d) {
                d3.select(this).transition().duration(100).attr('d', arcHover);
                showTooltip(event, d.data.tooltip);
            })
            .on('mouseout', function () {
                d3.select(this).transition().duration(100).attr('d', arc);
                hideTooltip();
            });

        const legend = d3.select(el).append('div').attr('class', 'chart-legend');
        spec.legend.forEach(l => {
            const item = legend.append('div').attr('class', 'legend-item');
            item.append('span').attr('class', 'legend-dot').style('background', l.color);
            item.append('span').text(l.name + ' ' + l.percentage);
        });
    }

    function drawScatter(spec) {
        const el = document.getElementById(spec.container);
        if (!el) return;
        el.innerHTML = '';
        const margin = { top: 20, right: 30, bottom: 40, left: 50 };
        const width = Math.max(el.clientWidth, 360) - margin.left - margin.right;
        const height = 280 - margin.top - margin.bottom;
        const svg = d3.select(el).append('svg')
            .attr('width', width + margin.left + margin.right)
            .attr('height', height + margin.top + margin.bottom)
            .append('g').attr('transform', `translate(${margin.left},${margin.top})`);

        const [lo, hi] = spec.xDomain;
        const x = d3.scaleLinear().domain([lo - 0.5, hi + 0.5]).range([0, width]);
        const maxY = d3.max(spec.points, p => p.y) || 1;
        const y = d3.scaleLinear().domain([0, maxY * 1.2]).nice().range([height, 0]);

        svg.append('g').attr('transform', `translate(0,${height})`)
            .call(d3.axisBottom(x).tickValues(d3.range(lo, hi + 1)).tickFormat(d => d + '★'));
        svg.append('g').call(d3.axisLeft(y).ticks(5));

        svg.selectAll('circle').data(spec.points).enter().append('circle')
            .attr('cx', p => x(p.x))
            .attr('cy', p => y(p.y))
            .attr('r', p => p.radius)
            .attr('fill', p => p.fill)
            .attr('stroke', p => p.border)
            .attr('stroke-width', 2)
            .attr('opacity', 0.85)
            .on('mouseover', (event, p) => showTooltip(event, { title: p.x + '★', value: p.y, details: [p.label], quotes: [] }))
            .on('mouseout', hideTooltip);
    }

    data.charts.forEach(spec => spec.type === 'donut' ? drawDonut(spec) : drawScatter(spec));

    // Navigation
    const navItems = Array.from(document.querySelectorAll('.nav-item'));
    const progress = document.getElementById('progress-fill');

    function setActive(i) {
        active = i;
        navItems.forEach((item, j) => item.classList.toggle('active', j === i));
        progress.style.width = ((i + 1) / data.sections.length * 100) + '%';
    }

    function goTo(i) {
        if (i < 0 || i >= data.sections.length) return;
        setActive(i);
        const target = document.getElementById(data.sections[i]);
        if (target) target.scrollIntoView({ behavior: 'smooth', block: 'start' });
    }

    navItems.forEach((item, i) => item.addEventListener('click', e => { e.preventDefault(); goTo(i); }));

    const observer = new IntersectionObserver(entries => {
        let next = -1;
        entries.forEach(entry => {
            if (entry.isIntersecting && entry.intersectionRatio >= data.threshold) {
                const i = data.sections.indexOf(entry.target.id);
                if (i >= 0) next = i;
            }
        });
        if (next >= 0) setActive(next);
    }, { threshold: data.threshold, rootMargin: data.rootMargin });
    data.sections.forEach(id => { const el = document.getElementById(id); if (el) observer.observe(el); });

    const backToTop = document.getElementById('back-to-top');
    window.addEventListener('scroll', () => backToTop.classList.toggle('visible', window.scrollY > data.backToTopOffset));
    backToTop.addEventListener('click', () => { setActive(0); window.scrollTo({ top: 0, behavior: 'smooth' }); });

    // Quote modal
    const modal = document.getElementById('quote-modal');

    function openModal(key) {
        const entry = data.quotes[key];
        if (!entry) return;
        modal.querySelector('h3').textContent = entry.title;
        const body = modal.querySelector('.modal-quotes');
        body.innerHTML = '';
        entry.quotes.forEach(q => { const b = document.createElement('blockquote'); b.textContent = q; body.appendChild(b); });
        modal.hidden = false;
    }

    function closeModal() {
        modal.hidden = true;
    }

    modal.addEventListener('click', e => { if (e.target === modal) closeModal(); });
    modal.querySelector('.modal-close').addEventListener('click', closeModal);

    document.addEventListener('keydown', e => {
        if (!modal.hidden) {
            if (e.key === 'Escape') closeModal();
            return;
        }
        if (e.key === 'ArrowLeft') goTo(Math.max(active - 1, 0));
        else if (e.key === 'ArrowRight') goTo(Math.min(active + 1, data.sections.length - 1));
    });

    // Row actions
    document.querySelectorAll('[data-action="cite"]').forEach(btn => btn.addEventListener('click', () => {
        openModal(btn.closest('table').id + ':' + btn.dataset.rowId);
    }));
    document.querySelectorAll('[data-action="expand"]').forEach(btn => btn.addEventListener('click', () => {
        const row = btn.closest('table').querySelector(`[data-details-for="${CSS.escape(btn.dataset.rowId)}"]`);
        if (row) row.hidden = !row.hidden;
    }));

    // Collapsible rows
    document.querySelectorAll('.collapse-toggle').forEach(btn => {
        let expanded = false;
        btn.addEventListener('click', () => {
            expanded = !expanded;
            const phase = expanded ? 'expanding' : 'collapsing';
            const rows = Array.from(document.querySelectorAll(`#${btn.dataset.table}-table tr.collapsible`));
            rows.forEach((row, i) => setTimeout(() => {
                row.classList.add(phase);
                row.classList.toggle('collapsed', !expanded);
                setTimeout(() => row.classList.remove(phase), data.transitionMs);
            }, i * data.staggerMs));
            btn.textContent = expanded ? btn.dataset.lessLabel : btn.dataset.moreLabel;
        });
    });
})();
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::{AnalysisRequest, Generator};

    fn render(language: Language, competitor: bool) -> String {
        let report = Generator::new()
            .generate(&AnalysisRequest {
                own_brand_file: "ownBrand-1-a.csv".to_string(),
                competitor_file: competitor.then(|| "competitor-1-b.csv".to_string()),
                target_category: "Smart Watch".to_string(),
                language,
            })
            .unwrap();
        let mut out = Vec::new();
        write(&mut out, &report).unwrap();
        String::from_utf8(out).unwrap()
    }

    // ==========================================================================
    // PAGE STRUCTURE
    // ==========================================================================

    #[test]
    fn test_page_has_every_section_and_chart_container() {
        let html = render(Language::En, false);
        for section in SectionId::ALL {
            assert!(html.contains(&format!("<section class=\"section\" id=\"{}\">", section.as_str())));
        }
        for id in charts::CONTAINERS {
            assert!(html.contains(&format!("id=\"{}\"", id)), "missing container {}", id);
        }
        assert!(html.contains("d3.v7.min.js"));
        assert!(html.contains("id=\"quote-modal\" hidden"));
    }

    #[test]
    fn test_first_nav_item_active() {
        let html = render(Language::En, false);
        assert!(html.contains("<a class=\"nav-item active\" href=\"#persona\">"));
        assert_eq!(html.matches("nav-item active").count(), 1);
    }

    #[test]
    fn test_embedded_data_parses() {
        let html = render(Language::En, true);
        let start = html.find("id=\"report-data\">").unwrap() + "id=\"report-data\">".len();
        let end = start + html[start..].find("</script>").unwrap();
        let data: serde_json::Value = serde_json::from_str(&html[start..end]).unwrap();

        assert_eq!(data["charts"].as_array().unwrap().len(), 5);
        assert_eq!(data["sections"].as_array().unwrap().len(), 7);
        assert_eq!(data["rootMargin"], ROOT_MARGIN);
        assert!(!data["quotes"].as_object().unwrap().is_empty());
    }

    #[test]
    fn test_progress_cells_stay_inside_tables() {
        let html = render(Language::En, false);
        assert_eq!(html.matches("class=\"progress\"").count(), 1);
        assert!(!html.contains("<td><div class=\"progress\">"));
        assert!(html.contains("<td><div class=\"progress-cell\">"));
        assert!(!STYLE.contains(".progress-cell { position: fixed"));
    }

    #[test]
    fn test_competitor_block_only_with_competitor_data() {
        assert!(!render(Language::En, false).contains("id=\"competitive-analysis\""));
        assert!(render(Language::En, true).contains("id=\"competitive-analysis\""));
    }

    #[test]
    fn test_chinese_page() {
        let html = render(Language::Zh, false);
        assert!(html.contains("<html lang=\"zh\">"));
        assert!(html.contains("用户画像"));
        assert!(html.contains("显示全部"));
        assert!(html.contains("Smart Watch"));
    }

    #[test]
    fn test_script_json_escapes_closing_tags() {
        let json = script_json(&"</script><script>alert(1)").unwrap();
        assert!(!json.contains("</script>"));
    }

    #[test]
    fn test_index_lists_reports() {
        let report = Generator::new()
            .generate(&AnalysisRequest {
                own_brand_file: "ownBrand-1-a.csv".to_string(),
                competitor_file: None,
                target_category: "Kettle".to_string(),
                language: Language::En,
            })
            .unwrap();
        let mut out = Vec::new();
        write_index(&mut out, &[report.summary()], Language::En).unwrap();
        let html = String::from_utf8(out).unwrap();
        assert!(html.contains(&format!("/dashboard?id={}", report.id)));

        let mut empty = Vec::new();
        write_index(&mut empty, &[], Language::En).unwrap();
        assert!(String::from_utf8(empty).unwrap().contains("No reports yet"));
    }
}
