use crate::config::{PublishOptions, SiteLayout, RUN_LANDING_PAGE};
use crate::determinism::hashing::sha256_file;
use crate::determinism::json_canonical::{to_pretty_preserving, to_pretty_sorted};
use crate::error::{CoreError, CoreResult};
use crate::links::value_text;
use crate::publish::lifecycle::{PublishLifecycle, PublishState};
use crate::render::landing::render_landing_html;
use crate::render::summary::render_summary_html;
use crate::report::metrics::{project_metrics, render_metrics_csv};
use crate::report::model::{RenderedArtifacts, ReportDocument};
use crate::site::index::{rebuild_aoi_index, resolve_report_json};
use crate::site::nav::rebuild_site_nav;
use crate::validator::validate_run;
use serde_json::Value;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Everything one render pass of a run produced.
#[derive(Debug, Clone)]
pub struct RenderOutcome {
    pub report_path: PathBuf,
    pub artifacts: RenderedArtifacts,
    pub hashes_updated: bool,
}

pub struct RunPublisher;

impl RunPublisher {
    /// An explicit `--report-json-name` must exist; otherwise the usual
    /// resolution applies.
    pub fn resolve_report(run_dir: &Path, opts: &PublishOptions) -> CoreResult<PathBuf> {
        if let Some(name) = &opts.report_json_name {
            let path = run_dir.join(name);
            if !path.is_file() {
                return Err(CoreError::MissingInput(format!(
                    "Report JSON not found: {}",
                    path.display()
                )));
            }
            return Ok(path);
        }
        resolve_report_json(run_dir, None)
    }

    /// Writes summary HTML, JSON copy, metrics CSV and the landing page,
    /// then optionally rewrites the report with fresh hashes.
    pub fn render_run(run_dir: &Path, opts: &PublishOptions) -> CoreResult<RenderOutcome> {
        if !run_dir.is_dir() {
            return Err(CoreError::MissingInput(format!(
                "Run dir not found: {}",
                run_dir.display()
            )));
        }
        let report_path = Self::resolve_report(run_dir, opts)?;
        let mut report = ReportDocument::load(&report_path)?;
        let artifacts = report.rendered_artifacts()?;
        let report_json_name = report_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        check_output_paths(&artifacts, &report_json_name)?;

        let summary = render_summary_html(&report, run_dir, &artifacts.html_relpath)?;
        let json_copy = to_pretty_sorted(&report.to_value())?;
        let metrics_csv = render_metrics_csv(&project_metrics(&report))?;
        let landing = render_landing_html(&report, &artifacts, &report_json_name)?;

        write_text(run_dir.join(&artifacts.html_relpath), &summary)?;
        write_text(run_dir.join(&artifacts.json_relpath), &json_copy)?;
        write_text(run_dir.join(&artifacts.metrics_relpath), &metrics_csv)?;
        write_text(run_dir.join(RUN_LANDING_PAGE), &landing)?;
        tracing::info!(
            run_dir = %run_dir.display(),
            html = %artifacts.html_relpath,
            json = %artifacts.json_relpath,
            metrics = %artifacts.metrics_relpath,
            "rendered run artefacts"
        );

        if opts.update_json {
            update_evidence_hashes(run_dir, &mut report)?;
            write_report(&report_path, &report)?;
        }

        Ok(RenderOutcome {
            report_path,
            artifacts,
            hashes_updated: opts.update_json,
        })
    }
}

/// Rendered outputs must not land on the source report or the landing page.
fn check_output_paths(artifacts: &RenderedArtifacts, report_json_name: &str) -> CoreResult<()> {
    if artifacts.json_relpath == report_json_name {
        return Err(CoreError::Structural(format!(
            "JSON summary relpath {} would overwrite the source report",
            artifacts.json_relpath
        )));
    }
    if artifacts.html_relpath == RUN_LANDING_PAGE {
        return Err(CoreError::Structural(format!(
            "HTML summary relpath {} would overwrite the run landing page",
            artifacts.html_relpath
        )));
    }
    Ok(())
}

/// Sets `sha256` and `size_bytes` on every declared artefact, in place.
/// Key order of the document is left untouched.
pub fn update_evidence_hashes(run_dir: &Path, report: &mut ReportDocument) -> CoreResult<usize> {
    let entries = match report
        .root_mut()
        .get_mut("evidence_artifacts")
        .and_then(Value::as_array_mut)
    {
        Some(entries) => entries,
        None => return Ok(0),
    };

    let mut updated = 0;
    for entry in entries.iter_mut() {
        let relpath = match entry.get("relpath").and_then(value_text) {
            Some(r) if !r.is_empty() => r,
            _ => continue,
        };
        let path = run_dir.join(&relpath);
        if !path.is_file() {
            return Err(CoreError::MissingInput(format!(
                "Missing declared artefact: {}",
                path.display()
            )));
        }
        let digest = sha256_file(&path)?;
        if let Some(obj) = entry.as_object_mut() {
            obj.insert("sha256".to_string(), Value::String(digest.sha256));
            obj.insert("size_bytes".to_string(), Value::from(digest.size_bytes));
            updated += 1;
        }
    }
    tracing::info!(run_dir = %run_dir.display(), updated, "updated evidence hashes");
    Ok(updated)
}

/// Indent 2, original key order, trailing newline.
pub fn write_report(path: &Path, report: &ReportDocument) -> CoreResult<()> {
    write_text(path.to_path_buf(), &to_pretty_preserving(&report.to_value())?)
}

/// Render, hash, rebuild the site index and nav, then validate.
pub fn publish_run_in_site(
    layout: &SiteLayout,
    run_id: &str,
    opts: &PublishOptions,
) -> CoreResult<RenderOutcome> {
    let run_dir = layout.run_dir(run_id);
    let mut lifecycle = PublishLifecycle::new(run_id);

    let outcome = RunPublisher::render_run(&run_dir, opts)?;
    lifecycle.transition(PublishState::RENDERED)?;
    if outcome.hashes_updated {
        lifecycle.transition(PublishState::HASHED)?;
    }

    rebuild_aoi_index(layout)?;
    rebuild_site_nav(layout, run_id)?;

    let report_json_name = outcome
        .report_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned());
    validate_run(&run_dir, report_json_name.as_deref())?;
    lifecycle.transition(PublishState::VALIDATED)?;

    tracing::info!(run_id, state = ?lifecycle.state(), "published run");
    Ok(outcome)
}

fn write_text(path: impl Into<PathBuf>, content: &str) -> CoreResult<()> {
    let path = path.into();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| CoreError::io_at(parent, e))?;
    }
    let mut f = fs::File::create(&path).map_err(|e| CoreError::io_at(&path, e))?;
    f.write_all(content.as_bytes())
        .map_err(|e| CoreError::io_at(&path, e))?;
    Ok(())
}
