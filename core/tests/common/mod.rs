#![allow(dead_code)]

use aoi_site_core::config::SiteLayout;
use aoi_site_core::site::nav::NAV_ITEMS;
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};

pub const SUMMARY_HTML: &str = "reports/v1/x.html";
pub const SUMMARY_JSON: &str = "reports/v1/x.json";
pub const METRICS_CSV: &str = "reports/v1/x/metrics.csv";

pub fn minimal_report() -> Value {
    json!({
        "aoi_id": "x",
        "bundle_id": "b",
        "report_version": "v1",
        "evidence_artifacts": [
            {"relpath": SUMMARY_HTML},
            {"relpath": SUMMARY_JSON},
            {"relpath": METRICS_CSV}
        ],
        "metrics": {"a": {"value": 1, "unit": "m"}}
    })
}

/// A report exercising every summary section, with one dangling reference.
pub fn full_report() -> Value {
    json!({
        "aoi_id": "aoi-ee-001",
        "bundle_id": "bundle-7",
        "report_version": "aoi_report.v2",
        "aoi_geometry_ref": {"kind": "geojson", "value": "inputs/aoi.geojson"},
        "report_metadata": {
            "intent": "EUDR inspection",
            "regulatory_context": {"in_scope_articles": ["Art. 3", "Art. 9"]}
        },
        "policy_mapping_refs": ["pm-1"],
        "evidence_registry": {
            "evidence_classes": [
                {"class_id": "EC 1", "mandatory": true, "status": "present", "description": "Boundary"},
                {"class": "EC2", "mandatory": true, "status": "missing"}
            ]
        },
        "acceptance_criteria": [
            {"criteria_id": "AC-1", "status": "met", "description": "No loss"},
            {"id": "AC-2", "status": "UNMET"}
        ],
        "regulatory_traceability": [
            {"regulation": "EUDR", "article": "3", "evidence_class": "EC 1",
             "acceptance_criteria": ["AC-1", "AC-2"], "result_ref": "r1"},
            {"regulation": "EUDR", "article": "9", "evidence_class_ref": "EC2",
             "criteria_ref": "AC-2", "result_ref": "r99"}
        ],
        "assumptions": [
            {"assumption_id": "A1", "text": "Hansen is authoritative", "testable": false,
             "result_refs": ["r1"]}
        ],
        "results": [
            {"result_id": "r1", "status": "pass", "criteria_ids": ["AC-1"]},
            {"result_id": "r2", "status": "pending", "criteria_ids": ["AC-3"]}
        ],
        "inputs": {"sources": [
            {"source_id": "s2", "uri": "https://example.org/hansen", "sha256": "ab", "content_type": "image/tiff"},
            {"source_id": "s1", "uri": "inputs/aoi.geojson", "sha256": "cd", "content_type": "application/geo+json"}
        ]},
        "metrics": {
            "zeta": {"value": 2.5, "unit": "ha", "criteria_refs": ["AC-1"]},
            "alpha": {"value": 10, "unit": "%", "notes": "a,b"}
        },
        "extensions": {"metrics_rows_v1": [{"variable": "alpha", "source": "hansen"}]},
        "external_dependencies": [{
            "tile_source": "local",
            "tiles_used": [
                {"tile_id": "t1", "layer": "L", "source_url": ""},
                {"tile_id": "t1", "layer": "L", "source_url": ""}
            ]
        }],
        "evidence_artifacts": [
            {"relpath": SUMMARY_HTML, "sha256": "placeholder"},
            {"relpath": SUMMARY_JSON, "sha256": "placeholder"},
            {"relpath": METRICS_CSV, "sha256": "placeholder"},
            {"relpath": "inputs/aoi.geojson", "sha256": "placeholder"}
        ]
    })
}

pub fn write_json(path: &Path, value: &Value) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, serde_json::to_string_pretty(value).unwrap()).unwrap();
}

/// A run dir holding `aoi_report.json` plus any non-rendered inputs it declares.
pub fn seed_run(run_dir: &Path, report: &Value) -> PathBuf {
    let inputs = run_dir.join("inputs");
    fs::create_dir_all(&inputs).unwrap();
    fs::write(inputs.join("aoi.geojson"), "{\"type\":\"FeatureCollection\",\"features\":[]}\n").unwrap();
    let path = run_dir.join("aoi_report.json");
    write_json(&path, report);
    path
}

/// A site tree where every nav target exists, plus one seeded run.
pub fn seed_site(site_root: &Path, run_id: &str, report: &Value) -> SiteLayout {
    let layout = SiteLayout::new(site_root);
    for item in NAV_ITEMS.iter() {
        let page = site_root.join(item.href);
        fs::create_dir_all(page.parent().unwrap()).unwrap();
        fs::write(&page, "<!doctype html>\n<html>\n<body>\n<p>stub</p>\n</body>\n</html>\n").unwrap();
    }
    seed_run(&layout.run_dir(run_id), report);
    layout
}

pub fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap()
}
