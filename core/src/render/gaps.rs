use crate::links::value_text;
use crate::report::model::{MapSection, ReportDocument};
use serde_json::Value;
use std::collections::BTreeSet;

/// Declared-but-unresolved expectations, sorted and de-duplicated.
pub fn detect_evidence_gaps(report: &ReportDocument) -> Vec<String> {
    let mut gaps: BTreeSet<String> = BTreeSet::new();

    let mut missing_tiles: BTreeSet<String> = BTreeSet::new();
    for dep in report.external_dependencies() {
        if dep.get("tile_source").and_then(Value::as_str) != Some("local") {
            continue;
        }
        let tiles = dep.get("tiles_used").and_then(Value::as_array);
        for tile in tiles.into_iter().flatten() {
            let url = tile.get("source_url").and_then(value_text).unwrap_or_default();
            if !url.trim().is_empty() {
                continue;
            }
            let tile_id = tile.get("tile_id").and_then(value_text).unwrap_or_default();
            let layer = tile.get("layer").and_then(value_text).unwrap_or_default();
            missing_tiles.insert(format!("{}:{}", tile_id, layer));
        }
    }
    if !missing_tiles.is_empty() {
        gaps.insert(format!(
            "Missing tile source URLs in external_dependencies.tiles_used: {}",
            missing_tiles.into_iter().collect::<Vec<_>>().join(", ")
        ));
    }

    if let MapSection::Map(crosscheck) = report.validation_section("forest_area_crosscheck") {
        if crosscheck.get("outcome").and_then(Value::as_str) == Some("not_comparable") {
            let reason = crosscheck
                .get("reason")
                .and_then(value_text)
                .filter(|r| !r.trim().is_empty())
                .unwrap_or_else(|| "reason_not_declared".to_string());
            gaps.insert(format!("Maa-amet crosscheck not comparable: {}", reason));
        }
    }

    if report.in_scope_articles_empty() {
        gaps.insert("regulatory_context.in_scope_articles is empty".to_string());
    }
    if report.policy_mapping_refs_empty() {
        gaps.insert("policy_mapping_refs is empty".to_string());
    }

    gaps.into_iter().collect()
}
