pub mod dao;

use crate::config::RUN_LANDING_PAGE;
use crate::error::{CoreError, CoreResult};
use crate::html::esc;
use crate::report::model::ReportDocument;
use crate::site::index::resolve_report_json;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ValidationSummary {
    pub runs_validated: Vec<String>,
}

/// Post-publish check of one run directory: declared artefacts exist and
/// every HTML artefact is reachable from the landing page.
pub fn validate_run(run_dir: &Path, report_json_name: Option<&str>) -> CoreResult<()> {
    let report_path = resolve_report_json(run_dir, report_json_name)?;
    let report = ReportDocument::load(&report_path)?;

    let relpaths = report.evidence_relpaths();
    if relpaths.is_empty() {
        return Err(CoreError::ValidationFailure(format!(
            "No evidence_artifacts entries in {}",
            report_path.display()
        )));
    }

    let missing: Vec<&str> = relpaths
        .iter()
        .filter(|r| !run_dir.join(r.as_str()).is_file())
        .map(String::as_str)
        .collect();
    if !missing.is_empty() {
        return Err(CoreError::ValidationFailure(format!(
            "Missing declared artefacts in {}: {}",
            run_dir.display(),
            missing.join(", ")
        )));
    }

    let landing = run_dir.join(RUN_LANDING_PAGE);
    if !landing.is_file() {
        return Err(CoreError::ValidationFailure(format!(
            "Missing run report.html: {}",
            landing.display()
        )));
    }
    let landing_text = fs::read_to_string(&landing).map_err(|e| CoreError::io_at(&landing, e))?;
    for relpath in relpaths.iter().filter(|r| r.ends_with(".html")) {
        if !landing_text.contains(relpath.as_str()) && !landing_text.contains(&esc(relpath)) {
            return Err(CoreError::ValidationFailure(format!(
                "{} missing link to declared HTML artefact: {}",
                landing.display(),
                relpath
            )));
        }
    }

    tracing::info!(run_dir = %run_dir.display(), artefacts = relpaths.len(), "run validated");
    Ok(())
}

/// Validates every run directory under `runs_dir` in lexical order,
/// stopping at the first failure.
pub fn validate_runs(runs_dir: &Path) -> CoreResult<ValidationSummary> {
    if !runs_dir.is_dir() {
        return Err(CoreError::MissingInput(format!(
            "Runs directory not found: {}",
            runs_dir.display()
        )));
    }
    let mut run_dirs = Vec::new();
    for entry in fs::read_dir(runs_dir).map_err(|e| CoreError::io_at(runs_dir, e))? {
        let path = entry.map_err(|e| CoreError::io_at(runs_dir, e))?.path();
        if path.is_dir() {
            run_dirs.push(path);
        }
    }
    run_dirs.sort();

    let mut summary = ValidationSummary::default();
    for run_dir in run_dirs {
        validate_run(&run_dir, None)?;
        if let Some(name) = run_dir.file_name() {
            summary.runs_validated.push(name.to_string_lossy().into_owned());
        }
    }
    Ok(summary)
}
