use crate::error::CoreResult;
use crate::links::value_text;
use crate::report::model::{MapSection, ReportDocument};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

pub const METRICS_CSV_HEADER: [&str; 5] = ["variable", "value", "unit", "notes", "source"];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MetricsRow {
    pub variable: String,
    pub value: String,
    pub unit: String,
    pub notes: String,
    pub source: String,
    pub criteria_refs: String,
    /// Set when the metric entry is not an object; `value` then holds its text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<Value>,
}

/// `metrics` joined with `extensions.metrics_rows_v1`, ascending by variable.
pub fn project_metrics(report: &ReportDocument) -> Vec<MetricsRow> {
    let mut sources: BTreeMap<String, String> = BTreeMap::new();
    for row in report.metrics_rows_source() {
        let variable = row.get("variable").and_then(value_text).unwrap_or_default();
        if variable.is_empty() {
            continue;
        }
        let source = row.get("source").and_then(value_text).unwrap_or_default();
        sources.insert(variable, source);
    }

    let metrics = match report.metrics() {
        MapSection::Map(m) => m,
        MapSection::Opaque(_) | MapSection::Missing => return Vec::new(),
    };
    let mut keys: Vec<&String> = metrics.keys().collect();
    keys.sort();

    keys.into_iter()
        .map(|key| {
            let source = sources.get(key.as_str()).cloned().unwrap_or_default();
            let entry = match metrics.get(key) {
                Some(Value::Object(entry)) => Some(entry),
                Some(other) if !other.is_null() => {
                    return MetricsRow {
                        variable: key.clone(),
                        value: value_text(other).unwrap_or_default(),
                        unit: String::new(),
                        notes: String::new(),
                        source,
                        criteria_refs: format_criteria_refs(None),
                        raw: Some(other.clone()),
                    };
                }
                _ => None,
            };
            let field = |name: &str| {
                entry
                    .and_then(|e| e.get(name))
                    .and_then(value_text)
                    .unwrap_or_default()
            };
            let refs = entry.and_then(|e| {
                e.get("criteria_refs")
                    .filter(|v| !v.is_null())
                    .or_else(|| e.get("acceptance_criteria").filter(|v| !v.is_null()))
            });
            MetricsRow {
                variable: key.clone(),
                value: field("value"),
                unit: field("unit"),
                notes: field("notes"),
                source,
                criteria_refs: format_criteria_refs(refs),
                raw: None,
            }
        })
        .collect()
}

fn format_criteria_refs(refs: Option<&Value>) -> String {
    match refs {
        None => "Not declared".to_string(),
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(value_text)
            .collect::<Vec<_>>()
            .join(", "),
        Some(other) => value_text(other).unwrap_or_else(|| "Not declared".to_string()),
    }
}

/// Metrics table as CSV: fixed header, LF line endings, minimal quoting.
pub fn render_metrics_csv(rows: &[MetricsRow]) -> CoreResult<String> {
    let mut wtr = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .quote_style(csv::QuoteStyle::Necessary)
        .from_writer(vec![]);
    wtr.write_record(METRICS_CSV_HEADER)?;
    for r in rows {
        wtr.write_record([&r.variable, &r.value, &r.unit, &r.notes, &r.source])?;
    }
    let bytes = wtr.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8_lossy(&bytes).to_string())
}
