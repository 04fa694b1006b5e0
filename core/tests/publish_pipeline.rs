mod common;

use aoi_site_core::config::PublishOptions;
use aoi_site_core::determinism::hashing::sha256_file;
use aoi_site_core::publish::builder::{publish_run_in_site, update_evidence_hashes, write_report, RunPublisher};
use aoi_site_core::report::model::ReportDocument;
use aoi_site_core::site::nav::unresolved_nav_targets;
use aoi_site_core::validator::{validate_run, validate_runs};
use common::*;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn render(run_dir: &Path, update_json: bool) {
    let opts = PublishOptions {
        report_json_name: None,
        update_json,
    };
    RunPublisher::render_run(run_dir, &opts).unwrap();
}

#[test]
fn minimal_report_writes_three_artefacts_and_exact_csv() {
    let dir = tempdir().unwrap();
    seed_run(dir.path(), &minimal_report());
    render(dir.path(), false);

    assert!(dir.path().join(SUMMARY_HTML).is_file());
    assert!(dir.path().join(SUMMARY_JSON).is_file());
    assert_eq!(
        read(&dir.path().join(METRICS_CSV)),
        "variable,value,unit,notes,source\na,1,m,,\n"
    );
    assert!(dir.path().join("report.html").is_file());
}

#[test]
fn missing_metadata_renders_invalid_block() {
    let dir = tempdir().unwrap();
    seed_run(dir.path(), &minimal_report());
    render(dir.path(), false);

    let html = read(&dir.path().join(SUMMARY_HTML));
    assert!(html.contains("INVALID FOR INSPECTION: report_metadata is missing."));
    assert!(html.contains("border:2px solid #c00"));
    assert!(html.contains("INVALID FOR INSPECTION: evidence_registry is missing."));
}

#[test]
fn json_copy_is_sorted_pretty_with_trailing_newline() {
    let dir = tempdir().unwrap();
    seed_run(dir.path(), &full_report());
    render(dir.path(), false);

    let text = read(&dir.path().join(SUMMARY_JSON));
    assert!(text.ends_with("}\n"));
    assert!(text.starts_with("{\n  \"acceptance_criteria\""));
    let parsed: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(parsed["aoi_id"], "aoi-ee-001");
}

#[test]
fn publishing_twice_in_separate_trees_is_byte_identical() {
    let a = tempdir().unwrap();
    let b = tempdir().unwrap();
    for dir in [a.path(), b.path()] {
        seed_run(dir, &full_report());
        render(dir, true);
    }
    for rel in [SUMMARY_HTML, SUMMARY_JSON, METRICS_CSV, "report.html", "aoi_report.json"] {
        assert_eq!(
            fs::read(a.path().join(rel)).unwrap(),
            fs::read(b.path().join(rel)).unwrap(),
            "{} differs",
            rel
        );
    }
}

#[test]
fn every_declared_artefact_exists_after_publish() {
    let dir = tempdir().unwrap();
    seed_run(dir.path(), &full_report());
    render(dir.path(), false);

    let report = ReportDocument::load(&dir.path().join("aoi_report.json")).unwrap();
    for relpath in report.evidence_relpaths() {
        assert!(dir.path().join(&relpath).is_file(), "{} missing", relpath);
    }
}

#[test]
fn hash_update_matches_bytes_on_disk() {
    let dir = tempdir().unwrap();
    seed_run(dir.path(), &full_report());
    render(dir.path(), true);

    let report: Value = serde_json::from_str(&read(&dir.path().join("aoi_report.json"))).unwrap();
    for entry in report["evidence_artifacts"].as_array().unwrap() {
        let path = dir.path().join(entry["relpath"].as_str().unwrap());
        let digest = sha256_file(&path).unwrap();
        assert_eq!(entry["sha256"], digest.sha256.as_str());
        assert_eq!(entry["size_bytes"], digest.size_bytes);
        assert_eq!(digest.size_bytes, fs::metadata(&path).unwrap().len());
    }
}

#[test]
fn hash_update_twice_reads_back_identical() {
    let dir = tempdir().unwrap();
    let report_path = seed_run(dir.path(), &full_report());
    render(dir.path(), false);

    for _ in 0..2 {
        let mut report = ReportDocument::load(&report_path).unwrap();
        update_evidence_hashes(dir.path(), &mut report).unwrap();
        write_report(&report_path, &report).unwrap();
    }
    let first = read(&report_path);
    let mut report = ReportDocument::load(&report_path).unwrap();
    update_evidence_hashes(dir.path(), &mut report).unwrap();
    write_report(&report_path, &report).unwrap();
    assert_eq!(first, read(&report_path));
    assert!(first.ends_with("}\n"));
    assert!(!first.contains("placeholder"));
}

#[test]
fn hash_update_keeps_source_key_order() {
    let dir = tempdir().unwrap();
    let report_path = seed_run(dir.path(), &full_report());
    render(dir.path(), true);

    let text = read(&report_path);
    let aoi = text.find("\"aoi_id\"").unwrap();
    let evidence = text.find("\"evidence_artifacts\"").unwrap();
    let metrics = text.find("\"metrics\"").unwrap();
    assert!(aoi < metrics && metrics < evidence);
}

#[test]
fn html_artefacts_are_linked_from_landing_page() {
    let dir = tempdir().unwrap();
    seed_run(dir.path(), &full_report());
    render(dir.path(), false);

    let landing = read(&dir.path().join("report.html"));
    let report = ReportDocument::load(&dir.path().join("aoi_report.json")).unwrap();
    for relpath in report.evidence_relpaths().iter().filter(|r| r.ends_with(".html")) {
        assert!(landing.contains(relpath.as_str()));
    }
    validate_run(dir.path(), None).unwrap();
}

#[test]
fn missing_suffix_aborts_before_writing() {
    let dir = tempdir().unwrap();
    let mut report = minimal_report();
    report["evidence_artifacts"] = serde_json::json!([{"relpath": "only.html"}]);
    seed_run(dir.path(), &report);
    let err = RunPublisher::render_run(dir.path(), &PublishOptions::default()).unwrap_err();
    assert_eq!(err.kind(), "suffix_miss");
    assert!(!dir.path().join("only.html").exists());
    assert!(!dir.path().join("report.html").exists());
}

#[test]
fn full_site_publish_leaves_consistent_nav_and_valid_runs() {
    let site = tempdir().unwrap();
    let layout = seed_site(site.path(), "example", &full_report());
    let opts = PublishOptions {
        report_json_name: None,
        update_json: true,
    };
    publish_run_in_site(&layout, "example", &opts).unwrap();

    let index = read(&layout.aoi_index_page());
    assert!(index.contains("href=\"runs/example/report.html\""));
    assert!(index.contains("href=\"runs/example/aoi_report.json\""));
    assert!(read(&layout.home_page()).contains("<header>"));
    assert!(read(&layout.run_landing_page("example")).contains("href=\"../../../index.html\""));

    assert!(unresolved_nav_targets(layout.root()).unwrap().is_empty());
    let summary = validate_runs(&layout.runs_dir()).unwrap();
    assert_eq!(summary.runs_validated, vec!["example".to_string()]);
}
