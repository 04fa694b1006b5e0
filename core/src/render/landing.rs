use crate::determinism::json_canonical::to_canonical_string;
use crate::error::CoreResult;
use crate::html::{code, esc, link, HtmlPage};
use crate::render::gaps::detect_evidence_gaps;
use crate::render::map::{leaflet_head_tags, map_section, MAP_STYLE};
use crate::render::SITE_STYLES;
use crate::report::model::{RenderedArtifacts, ReportDocument, Row};
use crate::site::nav::{render_header_nav, AOI_REPORTS_LABEL};
use std::collections::{BTreeMap, HashSet};

/// Landing pages sit at `aoi_reports/runs/<run_id>/report.html`.
pub const RUN_PAGE_PREFIX: &str = "../../../";

const PLACEHOLDER_STATUSES: [&str; 5] = ["placeholder", "not_evaluated", "unknown", "pending", "todo"];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusBuckets {
    pub computed: usize,
    pub placeholder: usize,
    /// Count per declared status; absent or blank status is keyed as `""`.
    pub by_status: BTreeMap<String, usize>,
}

pub fn is_placeholder_status(status: Option<&str>) -> bool {
    match status.map(str::trim) {
        None | Some("") => true,
        Some(s) => PLACEHOLDER_STATUSES.contains(&s.to_ascii_lowercase().as_str()),
    }
}

pub fn status_buckets(report: &ReportDocument) -> StatusBuckets {
    let mut buckets = StatusBuckets::default();
    for result in report.results().typed() {
        let status = result.status.as_deref();
        if is_placeholder_status(status) {
            buckets.placeholder += 1;
        } else {
            buckets.computed += 1;
        }
        let key = status.map(str::trim).unwrap_or("").to_string();
        *buckets.by_status.entry(key).or_insert(0) += 1;
    }
    buckets
}

/// `(label, relpath)` for the well-known artefacts, first occurrence of
/// each relpath wins.
pub fn core_artifact_links(
    report: &ReportDocument,
    artifacts: &RenderedArtifacts,
    report_json_name: &str,
) -> Vec<(&'static str, String)> {
    let geojson = report
        .evidence_relpaths()
        .into_iter()
        .find(|p| p.ends_with(".geojson"));
    let candidates = [
        ("AOI report JSON", Some(report_json_name.to_string())),
        ("HTML summary", Some(artifacts.html_relpath.clone())),
        ("JSON summary", Some(artifacts.json_relpath.clone())),
        ("Metrics CSV", Some(artifacts.metrics_relpath.clone())),
        ("AOI GeoJSON", geojson),
    ];
    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .filter_map(|(label, relpath)| relpath.map(|r| (label, r)))
        .filter(|(_, relpath)| seen.insert(relpath.clone()))
        .collect()
}

/// The run's `report.html`. Relpaths are already relative to the run
/// directory, which is where this page lives.
pub fn render_landing_html(
    report: &ReportDocument,
    artifacts: &RenderedArtifacts,
    report_json_name: &str,
) -> CoreResult<String> {
    let aoi_id = report.aoi_id();
    let map_config = report.map_config_relpath();
    let head_extra = if map_config.is_some() {
        leaflet_head_tags()
    } else {
        Vec::new()
    };
    let mut styles: Vec<&str> = SITE_STYLES.to_vec();
    styles.push(MAP_STYLE);

    let mut page = HtmlPage::new();
    page.open_document(&format!("AOI Report — {}", aoi_id), &styles, &head_extra);
    page.line(render_header_nav(RUN_PAGE_PREFIX, Some(AOI_REPORTS_LABEL)));
    page.line("<main class=\"wrap\">");
    page.line(format!("  <h1>AOI Report: {}</h1>", esc(&aoi_id)));

    page.line("  <div class=\"card\">");
    page.line("    <h2>Identity</h2>");
    page.line("    <ul>");
    page.line(format!("      <li>AOI ID: {}</li>", code(&aoi_id)));
    page.line(format!("      <li>Bundle ID: {}</li>", code(&report.bundle_id())));
    page.line(format!("      <li>Report version: {}</li>", code(&report.report_version())));
    match report.geometry_ref() {
        Some(Row::Typed(geometry)) => {
            page.line(format!(
                "      <li>Geometry: {} {}</li>",
                esc(&geometry.kind),
                code(&geometry.value)
            ));
        }
        Some(Row::Opaque(v)) => {
            page.line(format!("      <li>Geometry: {}</li>", code(&to_canonical_string(&v)?)));
        }
        None => {}
    }
    page.line("    </ul>");
    page.line("  </div>");

    page.line("  <div class=\"card\">");
    page.line("    <h2>Core inspection artifacts</h2>");
    page.line("    <ul>");
    for (label, relpath) in core_artifact_links(report, artifacts, report_json_name) {
        page.line(format!(
            "      <li>{}: {}</li>",
            esc(label),
            link(&relpath, &relpath)
        ));
    }
    page.line("    </ul>");
    page.line("  </div>");

    if let Some(config) = &map_config {
        page.lines(map_section(config)?);
    }

    let buckets = status_buckets(report);
    page.line("  <div class=\"card\">");
    page.line("    <h2>What this example demonstrates</h2>");
    page.line("    <p>An inspection-ready AOI report: declared evidence, acceptance criteria, results and metrics, each linked to the artefact that carries it.</p>");
    page.line("    <ul>");
    page.line(format!("      <li>Computed results: {}</li>", buckets.computed));
    page.line(format!("      <li>Placeholder results: {}</li>", buckets.placeholder));
    page.line("    </ul>");
    if !buckets.by_status.is_empty() {
        page.line("    <ul class=\"muted\">");
        for (status, count) in &buckets.by_status {
            let label = if status.is_empty() { "(no status)" } else { status.as_str() };
            page.line(format!("      <li>{}: {}</li>", code(label), count));
        }
        page.line("    </ul>");
    }
    page.line("  </div>");

    let gaps = detect_evidence_gaps(report);
    page.line("  <div class=\"card\">");
    page.line("    <h2>Known evidence gaps</h2>");
    if gaps.is_empty() {
        page.line("    <p>None detected.</p>");
    } else {
        page.line("    <ul>");
        for gap in &gaps {
            page.line(format!("      <li>{}</li>", esc(gap)));
        }
        page.line("    </ul>");
    }
    page.line("  </div>");

    page.line("  <h2>Evidence artifacts</h2>");
    let mut relpaths = report.evidence_relpaths();
    relpaths.sort();
    relpaths.dedup();
    if relpaths.is_empty() {
        page.line("  <p><em>No evidence artifacts declared.</em></p>");
    } else {
        page.line("  <ul>");
        for relpath in &relpaths {
            page.line(format!("    <li>{}</li>", link(relpath, relpath)));
        }
        page.line("  </ul>");
    }

    page.line("</main>");
    page.close_document();
    Ok(page.finish())
}
