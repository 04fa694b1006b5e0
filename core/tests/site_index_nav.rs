mod common;

use aoi_site_core::config::{PublishOptions, SiteLayout};
use aoi_site_core::publish::builder::RunPublisher;
use aoi_site_core::render::dte::render_dte_to_site;
use aoi_site_core::site::index::{rebuild_aoi_index, rebuild_index_with_dte};
use aoi_site_core::site::nav::{check_nav_links, rebuild_site_nav, unresolved_nav_targets};
use common::*;
use std::fs;
use tempfile::tempdir;

fn publish_runs(layout: &SiteLayout, run_ids: &[&str]) {
    for run_id in run_ids {
        seed_run(&layout.run_dir(run_id), &full_report());
        RunPublisher::render_run(&layout.run_dir(run_id), &PublishOptions::default()).unwrap();
    }
}

#[test]
fn ambiguous_report_json_names_candidates() {
    let dir = tempdir().unwrap();
    write_json(&dir.path().join("a.json"), &minimal_report());
    write_json(&dir.path().join("b.json"), &minimal_report());
    write_json(&dir.path().join("summary.json"), &minimal_report());

    let err = RunPublisher::render_run(dir.path(), &PublishOptions::default()).unwrap_err();
    assert_eq!(err.kind(), "ambiguous_input");
    let msg = err.to_string();
    assert!(msg.contains("a.json, b.json"));
    assert!(msg.contains("--report-json-name"));

    let opts = PublishOptions {
        report_json_name: Some("b.json".to_string()),
        update_json: true,
    };
    RunPublisher::render_run(dir.path(), &opts).unwrap();
    assert!(read(&dir.path().join("b.json")).contains("\"size_bytes\""));
    assert!(!read(&dir.path().join("a.json")).contains("\"size_bytes\""));
}

#[test]
fn index_lists_known_runs_first_then_lexical() {
    let site = tempdir().unwrap();
    let layout = seed_site(site.path(), "west_africa", &full_report());
    publish_runs(&layout, &["west_africa", "zz_custom", "example", "aa_custom"]);
    fs::create_dir_all(layout.run_dir("unrendered")).unwrap();

    rebuild_aoi_index(&layout).unwrap();
    let index = read(&layout.aoi_index_page());
    let pos = |run: &str| index.find(&format!("runs/{}/report.html", run)).unwrap();
    assert!(pos("example") < pos("west_africa"));
    assert!(pos("west_africa") < pos("aa_custom"));
    assert!(pos("aa_custom") < pos("zz_custom"));
    assert!(!index.contains("runs/unrendered/"));
    assert!(index.contains(">Example of cocoa in West Africa</a>"));
    assert!(index.contains(">zz_custom</a>"));
    assert!(index.contains("href=\"../dte_instructions.html\""));
}

#[test]
fn index_without_runs_dir_is_missing_input() {
    let site = tempdir().unwrap();
    let err = rebuild_aoi_index(&SiteLayout::new(site.path())).unwrap_err();
    assert_eq!(err.kind(), "missing_input");
}

#[test]
fn nav_rebuild_is_idempotent_and_checks_pass() {
    let site = tempdir().unwrap();
    let layout = seed_site(site.path(), "example", &full_report());
    publish_runs(&layout, &["example"]);
    rebuild_aoi_index(&layout).unwrap();

    rebuild_site_nav(&layout, "example").unwrap();
    let first = read(&layout.home_page());
    rebuild_site_nav(&layout, "example").unwrap();
    assert_eq!(first, read(&layout.home_page()));
    assert_eq!(first.matches("<header>").count(), 1);
    assert!(first.contains("<a href=\"index.html\" class=\"active\">Home</a>"));

    check_nav_links(&layout, "example").unwrap();
    assert!(unresolved_nav_targets(layout.root()).unwrap().is_empty());
}

#[test]
fn nav_rebuild_without_body_is_structural() {
    let site = tempdir().unwrap();
    let layout = seed_site(site.path(), "example", &full_report());
    publish_runs(&layout, &["example"]);
    rebuild_aoi_index(&layout).unwrap();
    fs::write(layout.home_page(), "<p>fragment</p>").unwrap();

    let err = rebuild_site_nav(&layout, "example").unwrap_err();
    assert_eq!(err.kind(), "structural");
}

#[test]
fn unresolved_nav_targets_are_reported() {
    let site = tempdir().unwrap();
    let layout = seed_site(site.path(), "example", &full_report());
    publish_runs(&layout, &["example"]);
    rebuild_aoi_index(&layout).unwrap();
    fs::remove_file(site.path().join("views/index.html")).unwrap();

    let unresolved = unresolved_nav_targets(layout.root()).unwrap();
    assert!(unresolved.contains(&"aoi_reports/index.html -> ../views/index.html".to_string()));
    check_nav_links(&layout, "example").unwrap();
}

#[test]
fn check_nav_fails_on_stale_index() {
    let site = tempdir().unwrap();
    let layout = seed_site(site.path(), "example", &full_report());
    publish_runs(&layout, &["example"]);
    fs::write(layout.aoi_index_page(), "<html><body></body></html>").unwrap();

    let err = check_nav_links(&layout, "example").unwrap_err();
    assert_eq!(err.kind(), "validation_failure");
}

#[test]
fn landing_reports_single_tile_gap_line() {
    let dir = tempdir().unwrap();
    seed_run(dir.path(), &full_report());
    RunPublisher::render_run(dir.path(), &PublishOptions::default()).unwrap();

    let landing = read(&dir.path().join("report.html"));
    let line = "Missing tile source URLs in external_dependencies.tiles_used: t1:L";
    assert_eq!(landing.matches(line).count(), 1);
    assert!(landing.contains(&format!("{}</li>", line)));
    assert!(landing.contains("Computed results: 1"));
    assert!(landing.contains("Placeholder results: 1"));
    assert!(landing.contains("<a href=\"inputs/aoi.geojson\">inputs/aoi.geojson</a>"));
}

#[test]
fn dte_page_renders_into_site_root() {
    let site = tempdir().unwrap();
    let layout = SiteLayout::new(site.path().join("site"));
    let source = site.path().join("dte.md");
    fs::write(&source, "# DTE\n\n1. Open **Home**\n2. See [index](aoi_reports/index.html)\n").unwrap();

    let out = render_dte_to_site(&source, &layout).unwrap();
    let html = read(&out);
    assert_eq!(out, layout.dte_instructions_page());
    assert!(html.contains("<h1>DTE</h1>"));
    assert!(html.contains("<li>Open <strong>Home</strong></li>"));
    assert!(html.contains("<a href=\"aoi_reports/index.html\">index</a>"));
    assert!(html.contains("<a href=\"index.html\">Home</a>"));

    let err = render_dte_to_site(&site.path().join("absent.md"), &layout).unwrap_err();
    assert_eq!(err.kind(), "missing_input");
}

#[test]
fn index_rebuild_renders_linked_dte_page() {
    let site = tempdir().unwrap();
    let layout = seed_site(site.path(), "example", &full_report());
    publish_runs(&layout, &["example"]);
    let dte_page = layout.dte_instructions_page();
    let _ = fs::remove_file(&dte_page);

    let absent = site.path().join("absent.md");
    rebuild_index_with_dte(&layout, &absent).unwrap();
    assert!(!dte_page.exists());

    let source = site.path().join("dte.md");
    fs::write(&source, "# DTE\n").unwrap();
    rebuild_index_with_dte(&layout, &source).unwrap();
    assert!(read(&dte_page).contains("<h1>DTE</h1>"));
    assert!(read(&layout.aoi_index_page()).contains("href=\"../dte_instructions.html\""));
}
