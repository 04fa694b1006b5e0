mod common;

use aoi_site_core::render::summary::render_summary_html;
use aoi_site_core::report::metrics::{project_metrics, render_metrics_csv};
use aoi_site_core::report::model::ReportDocument;
use common::*;
use regex::Regex;
use std::collections::HashSet;
use std::path::Path;

fn summary(report: serde_json::Value) -> String {
    let report = ReportDocument::from_value(report).unwrap();
    render_summary_html(&report, Path::new("/site/runs/example"), SUMMARY_HTML).unwrap()
}

#[test]
fn dangling_result_ref_is_marked_not_linked() {
    let html = summary(full_report());
    assert!(html.contains("<strong>missing-link</strong> r99"));
    assert!(!html.contains("href=\"#result-r99\""));
    assert!(html.contains("<a href=\"#result-r1\">r1</a>"));
}

#[test]
fn every_fragment_link_targets_an_emitted_id() {
    let html = summary(full_report());
    let ids: HashSet<String> = Regex::new(r#"id="([^"]+)""#)
        .unwrap()
        .captures_iter(&html)
        .map(|c| c[1].to_string())
        .collect();
    let hrefs: Vec<String> = Regex::new(r##"href="#([^"]+)""##)
        .unwrap()
        .captures_iter(&html)
        .map(|c| c[1].to_string())
        .collect();
    assert!(!hrefs.is_empty());
    for href in hrefs {
        assert!(ids.contains(&href), "#{} has no target", href);
    }
    // AC-3 is referenced by r2 but never declared
    assert!(html.contains("<strong>missing-link</strong> AC-3"));
}

#[test]
fn duplicate_ids_emit_one_anchor() {
    let mut report = full_report();
    report["results"] = serde_json::json!([
        {"result_id": "r1", "status": "pass"},
        {"result_id": "r1", "status": "fail"}
    ]);
    let html = summary(report);
    assert_eq!(html.matches("id=\"result-r1\"").count(), 1);
}

#[test]
fn registry_and_criteria_gaps_are_flagged() {
    let html = summary(full_report());
    assert!(html.contains("<tr id=\"evidence-EC2\" class=\"flag\">") || html.contains("class=\"flag\" id=\"evidence-EC2\""));
    assert!(html.contains("id=\"evidence-EC-1\""));
    assert_eq!(html.matches("class=\"flag\"").count(), 2);
}

#[test]
fn metrics_rows_ascend_in_csv_and_html() {
    let report = ReportDocument::from_value(full_report()).unwrap();
    let csv = render_metrics_csv(&project_metrics(&report)).unwrap();
    let vars: Vec<&str> = csv.lines().skip(1).map(|l| l.split(',').next().unwrap()).collect();
    assert_eq!(vars, vec!["alpha", "zeta"]);
    assert!(csv.contains("alpha,10,%,\"a,b\",hansen\n"));

    let html = summary(full_report());
    let alpha = html.find("<td>alpha</td>").unwrap();
    let zeta = html.find("<td>zeta</td>").unwrap();
    assert!(alpha < zeta);
}

#[test]
fn sections_keep_fixed_order() {
    let html = summary(full_report());
    let order = [
        "sec-intent-scope",
        "sec-regulatory-traceability",
        "sec-evidence-registry",
        "sec-acceptance-criteria",
        "sec-identity",
        "sec-inputs",
        "sec-metrics",
        "sec-assumptions",
        "sec-results",
        "sec-evidence-artifacts",
    ];
    let positions: Vec<usize> = order.iter().map(|id| html.find(id).unwrap()).collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn evidence_links_are_relative_to_summary_page() {
    let html = summary(full_report());
    assert!(html.contains("<a href=\"../../inputs/aoi.geojson\">inputs/aoi.geojson</a>"));
    assert!(html.contains("<a href=\"x/metrics.csv\">reports/v1/x/metrics.csv</a>"));
}

fn section<'a>(html: &'a str, id: &str) -> &'a str {
    let start = html.find(&format!("id=\"{}\"", id)).unwrap();
    let rest = &html[start..];
    let end = rest[1..].find("<h2").map(|i| i + 1).unwrap_or(rest.len());
    &rest[..end]
}

#[test]
fn list_valued_metrics_render_as_json_block() {
    let mut report = minimal_report();
    report["metrics"] = serde_json::json!([{"variable": "forest_ha", "value": 12}]);
    let html = summary(report);
    let metrics = section(&html, "sec-metrics");
    assert!(metrics.contains("<pre><code>"));
    assert!(metrics.contains("forest_ha"));
    assert!(metrics.contains("12"));
}

#[test]
fn scalar_metric_entry_keeps_its_value() {
    let mut report = minimal_report();
    report["metrics"] = serde_json::json!({"forest_ha": 12.5});
    let html = summary(report.clone());
    let metrics = section(&html, "sec-metrics");
    assert!(metrics.contains("<td>forest_ha</td><td colspan=\"5\"><code>12.5</code></td>"));

    let doc = ReportDocument::from_value(report).unwrap();
    let csv = render_metrics_csv(&project_metrics(&doc)).unwrap();
    assert!(csv.contains("forest_ha,12.5,"));
}

#[test]
fn list_valued_inputs_render_as_json_block() {
    let mut report = minimal_report();
    report["inputs"] = serde_json::json!([{"source_id": "s1"}]);
    let html = summary(report);
    let inputs = section(&html, "sec-inputs");
    assert!(inputs.contains("<pre><code>"));
    assert!(inputs.contains("s1"));
}

#[test]
fn non_object_geometry_ref_stays_visible() {
    let mut report = minimal_report();
    report["aoi_geometry_ref"] = serde_json::json!("inputs/aoi.geojson");
    let html = summary(report);
    let identity = section(&html, "sec-identity");
    assert!(identity.contains("<tr><th>Geometry Ref</th><td><code>"));
    assert!(identity.contains("inputs/aoi.geojson"));
}
