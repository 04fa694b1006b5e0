use std::path::{Path, PathBuf};

pub const DEFAULT_SITE_ROOT: &str = "docs/site";
pub const DEFAULT_RUNS_DIR: &str = "docs/site/aoi_reports/runs";
pub const DEFAULT_DTE_SOURCE: &str = "docs/dte_instructions.md";

pub const DEFAULT_REPORT_JSON: &str = "aoi_report.json";
pub const RUN_LANDING_PAGE: &str = "report.html";

/// Fixed site-relative locations of everything the publisher touches.
#[derive(Debug, Clone)]
pub struct SiteLayout {
    root: PathBuf,
}

impl SiteLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn home_page(&self) -> PathBuf {
        self.root.join("index.html")
    }

    pub fn aoi_reports_dir(&self) -> PathBuf {
        self.root.join("aoi_reports")
    }

    pub fn aoi_index_page(&self) -> PathBuf {
        self.aoi_reports_dir().join("index.html")
    }

    pub fn runs_dir(&self) -> PathBuf {
        self.aoi_reports_dir().join("runs")
    }

    pub fn run_dir(&self, run_id: &str) -> PathBuf {
        self.runs_dir().join(run_id)
    }

    pub fn run_landing_page(&self, run_id: &str) -> PathBuf {
        self.run_dir(run_id).join(RUN_LANDING_PAGE)
    }

    pub fn dte_instructions_page(&self) -> PathBuf {
        self.root.join("dte_instructions.html")
    }

    pub fn dao_reports_dir(&self) -> PathBuf {
        self.root.join("dao_reports")
    }
}

impl Default for SiteLayout {
    fn default() -> Self {
        Self::new(DEFAULT_SITE_ROOT)
    }
}

/// Per-run publish switches.
#[derive(Debug, Clone, Default)]
pub struct PublishOptions {
    pub report_json_name: Option<String>,
    pub update_json: bool,
}

#[cfg(test)]
mod tests {
    use super::SiteLayout;
    use std::path::Path;

    #[test]
    fn run_paths_hang_off_runs_dir() {
        let layout = SiteLayout::new("site");
        assert_eq!(
            layout.run_landing_page("example"),
            Path::new("site/aoi_reports/runs/example/report.html")
        );
        assert_eq!(layout.aoi_index_page(), Path::new("site/aoi_reports/index.html"));
    }
}
