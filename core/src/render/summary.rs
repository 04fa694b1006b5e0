use crate::determinism::json_canonical::to_canonical_string;
use crate::error::CoreResult;
use crate::html::{attr, code, esc, invalid_block, link, not_declared, HtmlPage};
use crate::links::{anchor_id, link_from_page, value_text};
use crate::render::map::{leaflet_head_tags, map_section, MAP_STYLE};
use crate::report::metrics::project_metrics;
use crate::report::model::{ListSection, MapSection, ReportDocument, Row};
use crate::report::xref::{CrossRefIndex, CRITERIA_PREFIX, EVIDENCE_PREFIX, RESULT_PREFIX};
use serde_json::{Map, Value};
use std::collections::{BTreeSet, HashSet};
use std::path::Path;

const REGISTRY_GAP_STATUSES: [&str; 4] = ["missing", "absent", "unavailable", "not_found"];
const CRITERIA_GAP_STATUSES: [&str; 6] = [
    "unmet",
    "unevaluable",
    "not_evaluable",
    "missing",
    "unknown",
    "not_evaluated",
];

const MAAAMET_FIELDS: [&str; 8] = [
    "enabled",
    "parcel_layer",
    "parcel_count",
    "notes",
    "maaamet_land_area_ha_sum",
    "hansen_land_area_ha_sum",
    "land_area_diff_ha",
    "land_area_diff_pct",
];
const CROSSCHECK_FIELDS: [&str; 6] = [
    "source",
    "outcome",
    "reason",
    "reference",
    "computed",
    "comparison",
];
const TOP_PARCELS: usize = 10;

const SUMMARY_STYLES: [&str; 9] = [
    "body { font-family: ui-sans-serif, system-ui, -apple-system, Segoe UI, Roboto, Helvetica, Arial; margin: 24px; }",
    "table { border-collapse: collapse; width: 100%; }",
    "th, td { border: 1px solid #ddd; padding: 8px; vertical-align: top; }",
    "th { background: #f6f6f6; text-align: left; width: 240px; }",
    "h2 { margin-top: 28px; }",
    "code { background: #f6f6f6; padding: 1px 4px; border-radius: 4px; }",
    "tr.flag td { background: #fdecea; color: #900; }",
    ".muted { color: #666; }",
    MAP_STYLE,
];

/// The per-AOI inspection page. Section order is fixed.
pub fn render_summary_html(
    report: &ReportDocument,
    run_dir: &Path,
    html_relpath: &str,
) -> CoreResult<String> {
    let page_path = run_dir.join(html_relpath);
    let xref = CrossRefIndex::build(report);
    let aoi_id = report.aoi_id();
    let map_config = report.map_config_relpath();

    let head_extra = if map_config.is_some() {
        leaflet_head_tags()
    } else {
        Vec::new()
    };

    let mut page = HtmlPage::new();
    page.open_document(
        &format!("AOI Report Summary — {}", aoi_id),
        &SUMMARY_STYLES,
        &head_extra,
    );
    page.line("  <h1>AOI Report Summary</h1>");

    intent_and_scope(&mut page, report)?;
    regulatory_traceability(&mut page, report, &xref)?;
    evidence_registry(&mut page, report)?;
    acceptance_criteria(&mut page, report)?;
    identity(&mut page, report)?;
    inputs(&mut page, report)?;
    metrics(&mut page, report)?;
    maaamet(&mut page, report)?;
    crosscheck(&mut page, report, run_dir, &page_path)?;
    if let Some(config) = &map_config {
        let href = link_from_page(run_dir, &page_path, config);
        page.lines(map_section(&href)?);
    }
    assumptions(&mut page, report, &xref)?;
    results(&mut page, report, &xref)?;
    evidence_artifacts(&mut page, report, run_dir, &page_path);

    page.close_document();
    Ok(page.finish())
}

fn json_code(v: &Value) -> CoreResult<String> {
    Ok(code(&to_canonical_string(v)?))
}

fn opt_text(v: Option<&str>) -> String {
    esc(v.unwrap_or(""))
}

fn opaque_row(page: &mut HtmlPage, colspan: usize, v: &Value) -> CoreResult<()> {
    page.line(format!(
        "    <tr><td colspan=\"{}\">{}</td></tr>",
        colspan,
        json_code(v)?
    ));
    Ok(())
}

fn opaque_block(page: &mut HtmlPage, v: &Value) -> CoreResult<()> {
    page.line(format!("  <pre>{}</pre>", json_code(v)?));
    Ok(())
}

/// `id` attribute for the first row carrying an anchor; later duplicates get none.
fn anchor_attr(seen: &mut HashSet<String>, prefix: &str, id: Option<&str>) -> String {
    match id {
        Some(id) => {
            let anchor = anchor_id(prefix, id);
            if seen.insert(anchor.clone()) {
                attr("id", &anchor)
            } else {
                String::new()
            }
        }
        None => String::new(),
    }
}

fn sorted_entries(map: &Map<String, Value>) -> Vec<(&String, &Value)> {
    let mut entries: Vec<_> = map.iter().collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));
    entries
}

fn intent_and_scope(page: &mut HtmlPage, report: &ReportDocument) -> CoreResult<()> {
    page.line("  <h2 id=\"sec-intent-scope\">Report Intent &amp; Scope</h2>");
    match report.report_metadata() {
        MapSection::Missing => {
            page.line(format!("  {}", invalid_block("report_metadata")));
        }
        MapSection::Opaque(v) => opaque_block(page, v)?,
        MapSection::Map(meta) => {
            page.line("  <table>");
            for (k, v) in sorted_entries(meta) {
                page.line(format!(
                    "    <tr><th>{}</th><td>{}</td></tr>",
                    esc(k),
                    json_code(v)?
                ));
            }
            page.line("  </table>");
        }
    }
    Ok(())
}

fn regulatory_traceability(
    page: &mut HtmlPage,
    report: &ReportDocument,
    xref: &CrossRefIndex,
) -> CoreResult<()> {
    page.line("  <h2 id=\"sec-regulatory-traceability\">Regulatory traceability</h2>");
    match report.regulatory_traceability() {
        ListSection::Missing => {
            page.line(format!("  {}", not_declared("regulatory_traceability")));
        }
        ListSection::Opaque(v) => opaque_block(page, &v)?,
        ListSection::Rows(rows) => {
            page.line("  <table>");
            page.header_row(&[
                "Regulation",
                "Article",
                "Evidence class",
                "Acceptance criteria",
                "Result",
            ]);
            for row in rows {
                match row {
                    Row::Typed(t) => {
                        page.row(
                            "",
                            &[
                                opt_text(t.regulation.as_deref()),
                                opt_text(t.article.as_deref()),
                                xref.links(EVIDENCE_PREFIX, &t.evidence_class),
                                xref.links(CRITERIA_PREFIX, &t.acceptance_criteria),
                                xref.links(RESULT_PREFIX, &t.result_ref),
                            ],
                        );
                    }
                    Row::Opaque(v) => opaque_row(page, 5, &v)?,
                }
            }
            page.line("  </table>");
        }
    }
    Ok(())
}

fn evidence_registry(page: &mut HtmlPage, report: &ReportDocument) -> CoreResult<()> {
    page.line("  <h2 id=\"sec-evidence-registry\">Evidence Registry</h2>");
    match report.evidence_registry() {
        ListSection::Missing => {
            page.line(format!("  {}", invalid_block("evidence_registry")));
        }
        ListSection::Opaque(v) => opaque_block(page, &v)?,
        ListSection::Rows(rows) => {
            let mut seen = HashSet::new();
            page.line("  <table>");
            page.header_row(&["Evidence class", "Mandatory", "Status", "Description"]);
            for row in rows {
                match row {
                    Row::Typed(c) => {
                        let flagged = c.mandatory
                            && c.status
                                .as_deref()
                                .is_some_and(|s| REGISTRY_GAP_STATUSES.contains(&s));
                        let mut attrs =
                            anchor_attr(&mut seen, EVIDENCE_PREFIX, c.class_id.as_deref());
                        if flagged {
                            attrs.push_str(" class=\"flag\"");
                        }
                        page.row(
                            &attrs,
                            &[
                                opt_text(c.class_id.as_deref()),
                                if c.mandatory { "yes" } else { "no" }.to_string(),
                                opt_text(c.status.as_deref()),
                                opt_text(c.description.as_deref()),
                            ],
                        );
                    }
                    Row::Opaque(v) => opaque_row(page, 4, &v)?,
                }
            }
            page.line("  </table>");
        }
    }
    Ok(())
}

fn acceptance_criteria(page: &mut HtmlPage, report: &ReportDocument) -> CoreResult<()> {
    page.line("  <h2 id=\"sec-acceptance-criteria\">Acceptance Criteria</h2>");
    match report.acceptance_criteria() {
        ListSection::Missing => {
            page.line(format!("  {}", not_declared("acceptance_criteria")));
        }
        ListSection::Opaque(v) => opaque_block(page, &v)?,
        ListSection::Rows(rows) => {
            let mut seen = HashSet::new();
            page.line("  <table>");
            page.header_row(&["Criteria", "Status", "Description"]);
            for row in rows {
                match row {
                    Row::Typed(c) => {
                        let flagged = c.status.as_deref().is_some_and(|s| {
                            CRITERIA_GAP_STATUSES.contains(&s.to_ascii_lowercase().as_str())
                        });
                        let mut attrs =
                            anchor_attr(&mut seen, CRITERIA_PREFIX, c.criteria_id.as_deref());
                        if flagged {
                            attrs.push_str(" class=\"flag\"");
                        }
                        page.row(
                            &attrs,
                            &[
                                opt_text(c.criteria_id.as_deref()),
                                opt_text(c.status.as_deref()),
                                opt_text(c.description.as_deref()),
                            ],
                        );
                    }
                    Row::Opaque(v) => opaque_row(page, 3, &v)?,
                }
            }
            page.line("  </table>");
        }
    }
    Ok(())
}

fn identity(page: &mut HtmlPage, report: &ReportDocument) -> CoreResult<()> {
    page.line("  <h2 id=\"sec-identity\">Identity</h2>");
    page.line("  <table>");
    page.line(format!("    <tr><th>AOI</th><td>{}</td></tr>", esc(&report.aoi_id())));
    page.line(format!(
        "    <tr><th>Bundle</th><td>{}</td></tr>",
        esc(&report.bundle_id())
    ));
    page.line(format!(
        "    <tr><th>Report Version</th><td>{}</td></tr>",
        esc(&report.report_version())
    ));
    let geometry = match report.geometry_ref() {
        Some(Row::Typed(g)) => Some(format!("{}: {}", esc(&g.kind), esc(&g.value))),
        Some(Row::Opaque(v)) => Some(json_code(&v)?),
        None => None,
    };
    if let Some(cell) = geometry {
        page.line(format!("    <tr><th>Geometry Ref</th><td>{}</td></tr>", cell));
    }
    page.line("  </table>");
    Ok(())
}

fn inputs(page: &mut HtmlPage, report: &ReportDocument) -> CoreResult<()> {
    page.line("  <h2 id=\"sec-inputs\">Inputs</h2>");
    let rows = match report.input_sources() {
        ListSection::Opaque(v) => return opaque_block(page, &v),
        ListSection::Rows(rows) => rows,
        ListSection::Missing => Vec::new(),
    };
    page.line("  <table>");
    page.header_row(&["Source", "URI", "SHA256", "Content Type"]);
    for row in rows {
        match row {
            Row::Typed(s) => {
                page.row(
                    "",
                    &[esc(&s.source_id), esc(&s.uri), code(&s.sha256), esc(&s.content_type)],
                );
            }
            Row::Opaque(v) => opaque_row(page, 4, &v)?,
        }
    }
    page.line("  </table>");
    Ok(())
}

fn metrics(page: &mut HtmlPage, report: &ReportDocument) -> CoreResult<()> {
    page.line("  <h2 id=\"sec-metrics\">Metrics</h2>");
    if let MapSection::Opaque(v) = report.metrics() {
        return opaque_block(page, v);
    }
    page.line("  <table>");
    page.header_row(&["Metric", "Value", "Unit", "Notes", "Source", "Criteria refs"]);
    for row in project_metrics(report) {
        if let Some(raw) = &row.raw {
            page.line(format!(
                "    <tr><td>{}</td><td colspan=\"5\">{}</td></tr>",
                esc(&row.variable),
                json_code(raw)?
            ));
            continue;
        }
        page.row(
            "",
            &[
                esc(&row.variable),
                esc(&row.value),
                esc(&row.unit),
                esc(&row.notes),
                esc(&row.source),
                esc(&row.criteria_refs),
            ],
        );
    }
    page.line("  </table>");
    Ok(())
}

fn field_cell(map: &Map<String, Value>, key: &str) -> CoreResult<String> {
    match map.get(key) {
        None | Some(Value::Null) => Ok("<em>not declared</em>".to_string()),
        Some(Value::String(s)) => Ok(esc(s)),
        Some(v @ (Value::Number(_) | Value::Bool(_))) => Ok(esc(&v.to_string())),
        Some(v) => json_code(v),
    }
}

fn maaamet(page: &mut HtmlPage, report: &ReportDocument) -> CoreResult<()> {
    let section = report.validation_section("maaamet");
    if section == MapSection::Missing {
        return Ok(());
    }
    page.line("  <h2 id=\"sec-maaamet-parcels\">Maa-amet parcel validation</h2>");
    let m = match section {
        MapSection::Map(m) => m,
        MapSection::Opaque(v) => return opaque_block(page, v),
        MapSection::Missing => return Ok(()),
    };
    page.line("  <table>");
    for key in MAAAMET_FIELDS {
        page.line(format!(
            "    <tr><th>{}</th><td>{}</td></tr>",
            esc(key),
            field_cell(m, key)?
        ));
    }
    page.line("  </table>");

    let parcels = m
        .get("top_parcels")
        .or_else(|| m.get("parcels"))
        .and_then(Value::as_array);
    if let Some(parcels) = parcels {
        let top: Vec<&Value> = parcels.iter().take(TOP_PARCELS).collect();
        let columns: BTreeSet<&str> = top
            .iter()
            .filter_map(|p| p.as_object())
            .flat_map(|p| p.keys().map(String::as_str))
            .collect();
        let columns: Vec<&str> = columns.into_iter().collect();
        page.line(format!("  <h3>Top {} parcels</h3>", TOP_PARCELS));
        page.line("  <table>");
        page.header_row(&columns);
        for p in top {
            match p.as_object() {
                Some(obj) => {
                    let cells = columns
                        .iter()
                        .map(|c| field_cell(obj, c))
                        .collect::<CoreResult<Vec<_>>>()?;
                    page.row("", &cells);
                }
                None => opaque_row(page, columns.len().max(1), p)?,
            }
        }
        page.line("  </table>");
    }
    Ok(())
}

fn ref_link(run_dir: &Path, page_path: &Path, reference: &str) -> String {
    let href = if reference.starts_with("http://") || reference.starts_with("https://") {
        reference.to_string()
    } else {
        link_from_page(run_dir, page_path, reference)
    };
    link(&href, reference)
}

fn crosscheck(
    page: &mut HtmlPage,
    report: &ReportDocument,
    run_dir: &Path,
    page_path: &Path,
) -> CoreResult<()> {
    let section = report.validation_section("forest_area_crosscheck");
    if section == MapSection::Missing {
        return Ok(());
    }
    page.line("  <h2 id=\"sec-forest-crosscheck\">Hansen ↔ Maa-amet crosscheck</h2>");
    let m = match section {
        MapSection::Map(m) => m,
        MapSection::Opaque(v) => return opaque_block(page, v),
        MapSection::Missing => return Ok(()),
    };
    page.line("  <table>");
    for key in CROSSCHECK_FIELDS {
        page.line(format!(
            "    <tr><th>{}</th><td>{}</td></tr>",
            esc(key),
            field_cell(m, key)?
        ));
    }
    for key in ["csv_ref", "summary_ref"] {
        let cell = match m.get(key).and_then(value_text).filter(|s| !s.is_empty()) {
            Some(reference) => ref_link(run_dir, page_path, &reference),
            None => "<em>not declared</em>".to_string(),
        };
        page.line(format!("    <tr><th>{}</th><td>{}</td></tr>", esc(key), cell));
    }
    page.line("  </table>");
    Ok(())
}

fn assumptions(
    page: &mut HtmlPage,
    report: &ReportDocument,
    xref: &CrossRefIndex,
) -> CoreResult<()> {
    page.line("  <h2 id=\"sec-assumptions\">Assumptions &amp; Limitations</h2>");
    match report.assumptions() {
        ListSection::Missing => {
            page.line(format!("  {}", not_declared("assumptions")));
        }
        ListSection::Opaque(v) => opaque_block(page, &v)?,
        ListSection::Rows(rows) => {
            page.line("  <table>");
            page.header_row(&["Assumption", "Text", "Results"]);
            for row in rows {
                match row {
                    Row::Typed(a) => {
                        let mut text = json_code(&a.text)?;
                        if a.testable == Some(false) {
                            text.push_str(" (not testable)");
                        }
                        let links = if a.result_refs.is_empty() {
                            "<em>none declared</em>".to_string()
                        } else {
                            xref.links(RESULT_PREFIX, &Value::Array(a.result_refs.clone()))
                        };
                        page.row("", &[opt_text(a.assumption_id.as_deref()), text, links]);
                    }
                    Row::Opaque(v) => opaque_row(page, 3, &v)?,
                }
            }
            page.line("  </table>");
        }
    }
    Ok(())
}

fn results(page: &mut HtmlPage, report: &ReportDocument, xref: &CrossRefIndex) -> CoreResult<()> {
    page.line("  <h2 id=\"sec-results\">Results</h2>");
    match report.results() {
        ListSection::Missing => {
            page.line(format!("  {}", not_declared("results")));
        }
        ListSection::Opaque(v) => opaque_block(page, &v)?,
        ListSection::Rows(rows) => {
            let mut seen = HashSet::new();
            page.line("  <table>");
            page.header_row(&["Result", "Status", "Criteria"]);
            for row in rows {
                match row {
                    Row::Typed(r) => {
                        let attrs = anchor_attr(&mut seen, RESULT_PREFIX, r.result_id.as_deref());
                        let id_cell = match &r.result_id {
                            Some(id) => esc(id),
                            None => "<strong>missing</strong>".to_string(),
                        };
                        let criteria = if r.criteria_ids.is_empty() {
                            "<em>none declared</em>".to_string()
                        } else {
                            xref.links(CRITERIA_PREFIX, &Value::Array(r.criteria_ids.clone()))
                        };
                        page.row(&attrs, &[id_cell, opt_text(r.status.as_deref()), criteria]);
                    }
                    Row::Opaque(v) => opaque_row(page, 3, &v)?,
                }
            }
            page.line("  </table>");
        }
    }
    Ok(())
}

fn evidence_artifacts(page: &mut HtmlPage, report: &ReportDocument, run_dir: &Path, page_path: &Path) {
    let mut relpaths = report.evidence_relpaths();
    relpaths.sort();
    relpaths.dedup();
    page.line("  <h2 id=\"sec-evidence-artifacts\">Evidence Artifacts</h2>");
    page.line("  <ul>");
    for relpath in relpaths {
        let href = link_from_page(run_dir, page_path, &relpath);
        page.line(format!("    <li>{}</li>", link(&href, &relpath)));
    }
    page.line("  </ul>");
}
