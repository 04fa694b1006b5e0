use crate::html::esc;
use crate::links::{anchor_id, value_text};
use crate::report::model::ReportDocument;
use serde_json::Value;
use std::collections::BTreeSet;

pub const EVIDENCE_PREFIX: &str = "evidence";
pub const CRITERIA_PREFIX: &str = "criteria";
pub const RESULT_PREFIX: &str = "result";

/// Anchors the summary page declares, computed once before rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrossRefIndex {
    pub evidence: BTreeSet<String>,
    pub criteria: BTreeSet<String>,
    pub results: BTreeSet<String>,
}

impl CrossRefIndex {
    pub fn build(report: &ReportDocument) -> Self {
        let evidence = report
            .evidence_registry()
            .typed()
            .filter_map(|c| c.class_id.as_deref())
            .map(|id| anchor_id(EVIDENCE_PREFIX, id))
            .collect();
        let criteria = report
            .acceptance_criteria()
            .typed()
            .filter_map(|c| c.criteria_id.as_deref())
            .map(|id| anchor_id(CRITERIA_PREFIX, id))
            .collect();
        let results = report
            .results()
            .typed()
            .filter_map(|r| r.result_id.as_deref())
            .map(|id| anchor_id(RESULT_PREFIX, id))
            .collect();
        Self {
            evidence,
            criteria,
            results,
        }
    }

    pub fn anchors_for(&self, prefix: &str) -> &BTreeSet<String> {
        match prefix {
            EVIDENCE_PREFIX => &self.evidence,
            CRITERIA_PREFIX => &self.criteria,
            _ => &self.results,
        }
    }

    pub fn link(&self, prefix: &str, value: &Value) -> String {
        link_or_missing(prefix, value, self.anchors_for(prefix))
    }

    /// Scalars link once; lists link per element, joined with `, `.
    pub fn links(&self, prefix: &str, value: &Value) -> String {
        match value {
            Value::Array(items) if !items.is_empty() => items
                .iter()
                .map(|v| self.link(prefix, v))
                .collect::<Vec<_>>()
                .join(", "),
            Value::Array(_) => link_or_missing(prefix, &Value::Null, self.anchors_for(prefix)),
            other => self.link(prefix, other),
        }
    }
}

/// Link to a declared anchor, or an inline marker when the reference
/// is absent or dangling.
pub fn link_or_missing(prefix: &str, value: &Value, anchors: &BTreeSet<String>) -> String {
    let text = match value_text(value) {
        Some(t) => t,
        None => return "<strong>missing</strong>".to_string(),
    };
    let anchor = anchor_id(prefix, &text);
    if anchors.contains(&anchor) {
        format!("<a href=\"#{}\">{}</a>", esc(&anchor), esc(&text))
    } else {
        format!("<strong>missing-link</strong> {}", esc(&text))
    }
}
