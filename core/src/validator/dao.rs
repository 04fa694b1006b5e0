use crate::config::SiteLayout;
use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

pub const EXPECTED_PLOTS: [&str; 3] = ["demo_plot_01", "demo_plot_02", "demo_plot_03"];
pub const EXPECTED_ARTIFACTS: [&str; 3] = ["report.html", "report.pdf", "report.json"];

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DaoValidationReport {
    pub errors: Vec<String>,
}

impl DaoValidationReport {
    pub fn passed(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Collects every problem under `dao_reports/` instead of stopping at the first.
pub fn validate_dao_reports(layout: &SiteLayout) -> CoreResult<DaoValidationReport> {
    let mut report = DaoValidationReport::default();
    let dao_root = layout.dao_reports_dir();
    let index_file = dao_root.join("index.html");
    let runs_dir = dao_root.join("runs");

    let index_text = if index_file.is_file() {
        Some(fs::read_to_string(&index_file).map_err(|e| CoreError::io_at(&index_file, e))?)
    } else {
        report.errors.push(format!("missing index: {}", index_file.display()));
        None
    };

    if !runs_dir.is_dir() {
        report.errors.push(format!("missing runs dir: {}", runs_dir.display()));
        return Ok(report);
    }

    let mut run_dirs: Vec<PathBuf> = Vec::new();
    for entry in fs::read_dir(&runs_dir).map_err(|e| CoreError::io_at(&runs_dir, e))? {
        let path = entry.map_err(|e| CoreError::io_at(&runs_dir, e))?.path();
        if path.is_dir() {
            run_dirs.push(path);
        }
    }
    run_dirs.sort();
    if run_dirs.is_empty() {
        report
            .errors
            .push(format!("no run directories found in: {}", runs_dir.display()));
        return Ok(report);
    }

    for run_dir in &run_dirs {
        let run_id = run_dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if let Some(text) = &index_text {
            if !text.contains(&run_id) {
                report
                    .errors
                    .push(format!("run id not referenced in index.html: {}", run_id));
            }
        }

        for plot_id in EXPECTED_PLOTS {
            let plot_dir = run_dir.join(plot_id);
            if !plot_dir.is_dir() {
                report
                    .errors
                    .push(format!("missing plot folder: {}", plot_dir.display()));
                continue;
            }
            for artifact in EXPECTED_ARTIFACTS {
                let path = plot_dir.join(artifact);
                if !path.is_file() {
                    report.errors.push(format!("missing artifact: {}", path.display()));
                }
            }
        }
    }

    tracing::info!(runs = run_dirs.len(), errors = report.errors.len(), "DAO reports checked");
    Ok(report)
}
