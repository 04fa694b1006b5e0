use crate::config::{SiteLayout, DEFAULT_REPORT_JSON, RUN_LANDING_PAGE};
use crate::error::{CoreError, CoreResult};
use crate::html::{link, HtmlPage};
use crate::render::dte::{render_dte_to_site, DTE_LABEL};
use crate::render::SITE_STYLES;
use crate::site::nav::{render_header_nav, AOI_REPORTS_LABEL};
use std::fs;
use std::path::{Path, PathBuf};

pub struct RunDisplay {
    pub run_id: &'static str,
    pub label: &'static str,
    pub report_json: &'static str,
}

/// Known runs, in display order.
pub const RUN_DISPLAY_METADATA: [RunDisplay; 4] = [
    RunDisplay {
        run_id: "example",
        label: "Example with cadastre-based validation in Estonia",
        report_json: "estonia_aoi_report.json",
    },
    RunDisplay {
        run_id: "latin_america",
        label: "Example of mixed crop in Latin America",
        report_json: "latin_america_aoi_report.json",
    },
    RunDisplay {
        run_id: "se_asia",
        label: "Example of coffee in SE Asia",
        report_json: "se_asia_aoi_report.json",
    },
    RunDisplay {
        run_id: "west_africa",
        label: "Example of cocoa in West Africa",
        report_json: "west_africa_aoi_report.json",
    },
];

const EXCLUDED_JSON: [&str; 2] = ["summary.json", "manifest.json"];
const NO_REPORTS_ROW: &str = "<li><em>No AOI reports found.</em></li>";

pub fn run_display(run_id: &str) -> Option<&'static RunDisplay> {
    RUN_DISPLAY_METADATA.iter().find(|d| d.run_id == run_id)
}

/// Known runs first in table order, the rest lexically.
pub fn sort_runs(mut run_ids: Vec<String>) -> Vec<String> {
    let rank = |id: &str| {
        RUN_DISPLAY_METADATA
            .iter()
            .position(|d| d.run_id == id)
            .unwrap_or(RUN_DISPLAY_METADATA.len())
    };
    run_ids.sort_by(|a, b| rank(a).cmp(&rank(b)).then_with(|| a.cmp(b)));
    run_ids
}

fn sorted_entries(dir: &Path) -> CoreResult<Vec<PathBuf>> {
    let mut entries = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| CoreError::io_at(dir, e))? {
        entries.push(entry.map_err(|e| CoreError::io_at(dir, e))?.path());
    }
    entries.sort();
    Ok(entries)
}

/// `*.json` files in `run_dir` that could be the run report.
pub fn report_json_candidates(run_dir: &Path) -> CoreResult<Vec<String>> {
    Ok(sorted_entries(run_dir)?
        .into_iter()
        .filter(|p| p.is_file())
        .filter_map(|p| p.file_name().and_then(|n| n.to_str()).map(str::to_string))
        .filter(|name| name.ends_with(".json") && !EXCLUDED_JSON.contains(&name.as_str()))
        .collect())
}

/// Preferred name if present, else `aoi_report.json`, else the single
/// remaining `*.json` candidate.
pub fn resolve_report_json(run_dir: &Path, preferred: Option<&str>) -> CoreResult<PathBuf> {
    if let Some(name) = preferred {
        let path = run_dir.join(name);
        if path.is_file() {
            return Ok(path);
        }
        tracing::debug!(run_dir = %run_dir.display(), preferred = name, "preferred report JSON absent");
    }
    let default = run_dir.join(DEFAULT_REPORT_JSON);
    if default.is_file() {
        return Ok(default);
    }
    let candidates = report_json_candidates(run_dir)?;
    match candidates.as_slice() {
        [] => Err(CoreError::MissingInput(format!(
            "Missing run report JSON in {}",
            run_dir.display()
        ))),
        [single] => {
            tracing::debug!(run_dir = %run_dir.display(), report_json = %single, "auto-detected report JSON");
            Ok(run_dir.join(single))
        }
        many => Err(CoreError::AmbiguousInput(format!(
            "Multiple run report JSON candidates in {}: {}; pass --report-json-name to choose one",
            run_dir.display(),
            many.join(", ")
        ))),
    }
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// `<li>` rows for every run directory that has a landing page.
pub fn render_runs(runs_dir: &Path) -> CoreResult<String> {
    let run_ids: Vec<String> = sorted_entries(runs_dir)?
        .into_iter()
        .filter(|p| p.is_dir())
        .map(|p| file_name_of(&p))
        .collect();

    let mut rows = Vec::new();
    for run_id in sort_runs(run_ids) {
        let run_dir = runs_dir.join(&run_id);
        if !run_dir.join(RUN_LANDING_PAGE).is_file() {
            continue;
        }
        let (label, expected_json) = match run_display(&run_id) {
            Some(d) => (d.label.to_string(), d.report_json),
            None => (run_id.clone(), DEFAULT_REPORT_JSON),
        };
        let json_name = match resolve_report_json(&run_dir, Some(expected_json)) {
            Ok(path) => file_name_of(&path),
            Err(CoreError::MissingInput(_)) => expected_json.to_string(),
            Err(other) => return Err(other),
        };
        rows.push(format!(
            "<li>{} <span class=\"muted\">(</span>{}<span class=\"muted\">)</span></li>",
            link(&format!("runs/{}/{}", run_id, RUN_LANDING_PAGE), &label),
            link(&format!("runs/{}/{}", run_id, json_name), &json_name)
        ));
    }

    if rows.is_empty() {
        return Ok(NO_REPORTS_ROW.to_string());
    }
    Ok(rows.join("\n"))
}

pub fn build_index_page(runs_html: &str) -> String {
    let mut page = HtmlPage::new();
    page.open_document("AOI Reports", &SITE_STYLES, &[]);
    page.line(render_header_nav("../", Some(AOI_REPORTS_LABEL)));
    page.line("<main class=\"wrap\">");
    page.line("  <h1>AOI Reports</h1>");
    page.line("  <p class=\"muted\">Portable mode: links point into the bundle under <code>runs/&lt;run_id&gt;/report.html</code>.</p>");
    page.line("  <p class=\"muted\"><strong>Artefact publication contract:</strong> the run-level AOI report JSON declares every evidence artefact; each declared file must exist at its declared relative path in the bundle and be reachable via a clickable link from <code>report.html</code>. Builds fail on missing artefacts.</p>");
    page.line("  <div class=\"card\">");
    page.line("    <strong>AI/automation inspection note (mandatory):</strong>");
    page.line("    <ul>");
    page.line("      <li><strong>Do not infer or construct report URLs from run IDs.</strong></li>");
    page.line("      <li>Access reports only by clicking through the portal: <em>Home → AOI Reports → Run entry → report.html → linked JSON artefacts</em>.</li>");
    page.line("      <li>If a listed artefact cannot be opened via this click-path, record it as an <strong>Evidence gap: published artefact is inaccessible via inspection surface</strong>.</li>");
    page.line("    </ul>");
    page.line(format!("    <p>See: {}</p>", link("../dte_instructions.html", DTE_LABEL)));
    page.line("  </div>");
    page.line("  <div class=\"card\">");
    page.line("    <h2>Runs</h2>");
    page.line("    <ul>");
    page.line(runs_html);
    page.line("    </ul>");
    page.line("  </div>");
    page.line("</main>");
    page.close_document();
    page.finish()
}

/// Regenerates `aoi_reports/index.html` from the runs directory.
pub fn rebuild_aoi_index(layout: &SiteLayout) -> CoreResult<PathBuf> {
    let runs_dir = layout.runs_dir();
    if !runs_dir.is_dir() {
        return Err(CoreError::MissingInput(format!(
            "Runs dir not found: {}",
            runs_dir.display()
        )));
    }
    let page = build_index_page(&render_runs(&runs_dir)?);
    let out = layout.aoi_index_page();
    fs::write(&out, page).map_err(|e| CoreError::io_at(&out, e))?;
    tracing::info!(index = %out.display(), "rebuilt AOI reports index");
    Ok(out)
}

/// Re-renders the DTE page when `dte_source` exists, then rebuilds the
/// index that links to it.
pub fn rebuild_index_with_dte(layout: &SiteLayout, dte_source: &Path) -> CoreResult<PathBuf> {
    if dte_source.is_file() {
        render_dte_to_site(dte_source, layout)?;
    } else {
        tracing::debug!(source = %dte_source.display(), "no DTE source; keeping existing page");
    }
    rebuild_aoi_index(layout)
}
