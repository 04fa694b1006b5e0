use crate::error::{CoreError, CoreResult};
use crate::links::{find_by_suffix, value_text};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;

type Object = Map<String, Value>;

/// A section entry: either the shape we understand or the raw value.
#[derive(Debug, Clone, PartialEq)]
pub enum Row<T> {
    Typed(T),
    Opaque(Value),
}

/// A list-valued section after fallback resolution.
#[derive(Debug, Clone, PartialEq)]
pub enum ListSection<T> {
    Missing,
    Rows(Vec<Row<T>>),
    Opaque(Value),
}

impl<T> ListSection<T> {
    pub fn typed(&self) -> impl Iterator<Item = &T> {
        let rows: &[Row<T>] = match self {
            ListSection::Rows(rows) => rows,
            _ => &[],
        };
        rows.iter().filter_map(|r| match r {
            Row::Typed(t) => Some(t),
            Row::Opaque(_) => None,
        })
    }
}

/// A dict-valued section after fallback resolution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MapSection<'a> {
    Missing,
    Map(&'a Object),
    Opaque(&'a Value),
}

/// Builds a typed entry from a JSON object, encoding the key preference chain.
pub trait Accept: Sized {
    fn accept(entry: &Object) -> Self;
}

fn list_section<T: Accept>(value: Option<&Value>) -> ListSection<T> {
    match value {
        None | Some(Value::Null) => ListSection::Missing,
        Some(Value::Array(items)) => ListSection::Rows(
            items
                .iter()
                .map(|item| match item.as_object() {
                    Some(obj) => Row::Typed(T::accept(obj)),
                    None => Row::Opaque(item.clone()),
                })
                .collect(),
        ),
        Some(other) => ListSection::Opaque(other.clone()),
    }
}

/// First present, non-null key in `keys`, stringified.
fn first_text(entry: &Object, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|k| entry.get(*k))
        .find(|v| !v.is_null())
        .and_then(value_text)
}

fn first_value(entry: &Object, keys: &[&str]) -> Value {
    keys.iter()
        .filter_map(|k| entry.get(*k))
        .find(|v| !v.is_null())
        .cloned()
        .unwrap_or(Value::Null)
}

fn value_list(v: Value) -> Vec<Value> {
    match v {
        Value::Null => Vec::new(),
        Value::Array(items) => items,
        other => vec![other],
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EvidenceClass {
    pub class_id: Option<String>,
    pub mandatory: bool,
    pub status: Option<String>,
    pub description: Option<String>,
}

impl Accept for EvidenceClass {
    fn accept(entry: &Object) -> Self {
        Self {
            class_id: first_text(entry, &["class_id", "class", "evidence_class", "id"]),
            mandatory: entry.get("mandatory").and_then(Value::as_bool) == Some(true),
            status: first_text(entry, &["status"]),
            description: first_text(entry, &["description", "notes"]),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AcceptanceCriterion {
    pub criteria_id: Option<String>,
    pub status: Option<String>,
    pub description: Option<String>,
}

impl Accept for AcceptanceCriterion {
    fn accept(entry: &Object) -> Self {
        Self {
            criteria_id: first_text(entry, &["criteria_id", "id", "name", "criteria"]),
            status: first_text(entry, &["status"]),
            description: first_text(entry, &["description", "text", "statement"]),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResultEntry {
    pub result_id: Option<String>,
    pub status: Option<String>,
    pub criteria_ids: Vec<Value>,
}

impl Accept for ResultEntry {
    fn accept(entry: &Object) -> Self {
        Self {
            result_id: first_text(entry, &["result_id"]),
            status: first_text(entry, &["status"]),
            criteria_ids: value_list(first_value(entry, &["criteria_ids"])),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TraceRow {
    pub regulation: Option<String>,
    pub article: Option<String>,
    pub evidence_class: Value,
    pub acceptance_criteria: Value,
    pub result_ref: Value,
}

impl Accept for TraceRow {
    fn accept(entry: &Object) -> Self {
        Self {
            regulation: first_text(entry, &["regulation"]),
            article: first_text(entry, &["article"]),
            evidence_class: first_value(entry, &["evidence_class", "evidence_class_ref"]),
            acceptance_criteria: first_value(
                entry,
                &["acceptance_criteria", "criteria_ref", "criteria_id"],
            ),
            result_ref: first_value(entry, &["result_ref", "result_id"]),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Assumption {
    pub assumption_id: Option<String>,
    pub text: Value,
    pub testable: Option<bool>,
    pub result_refs: Vec<Value>,
}

impl Accept for Assumption {
    fn accept(entry: &Object) -> Self {
        Self {
            assumption_id: first_text(entry, &["assumption_id", "id"]),
            text: first_value(entry, &["text", "assumption", "statement", "description"]),
            testable: entry.get("testable").and_then(Value::as_bool),
            result_refs: value_list(first_value(
                entry,
                &["result_refs", "result_ids", "related_results"],
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InputSource {
    pub source_id: String,
    pub uri: String,
    pub sha256: String,
    pub content_type: String,
}

impl Accept for InputSource {
    fn accept(entry: &Object) -> Self {
        let text = |k: &str| first_text(entry, &[k]).unwrap_or_default();
        Self {
            source_id: text("source_id"),
            uri: text("uri"),
            sha256: text("sha256"),
            content_type: text("content_type"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeometryRef {
    pub kind: String,
    pub value: String,
}

/// The three artefacts the renderer owns, selected by suffix from
/// `evidence_artifacts`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedArtifacts {
    pub html_relpath: String,
    pub json_relpath: String,
    pub metrics_relpath: String,
}

/// The upstream report document. Reads go through typed accessors that
/// apply each section's fallback chain; the raw value is kept intact so
/// the hash update can rewrite it without reordering keys.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportDocument {
    root: Object,
}

impl ReportDocument {
    pub fn from_value(root: Value) -> CoreResult<Self> {
        match root {
            Value::Object(root) => Ok(Self { root }),
            _ => Err(CoreError::InvalidInput(
                "report document root must be a JSON object".to_string(),
            )),
        }
    }

    pub fn load(path: &Path) -> CoreResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| CoreError::io_at(path, e))?;
        let root: Value = serde_json::from_str(&text).map_err(|e| {
            CoreError::InvalidInput(format!("{} is not valid JSON: {}", path.display(), e))
        })?;
        Self::from_value(root)
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.root.clone())
    }

    pub(crate) fn root_mut(&mut self) -> &mut Object {
        &mut self.root
    }

    fn get(&self, key: &str) -> Option<&Value> {
        self.root.get(key).filter(|v| !v.is_null())
    }

    /// Root key, else the same key under `report_metadata`.
    fn get_with_metadata_fallback(&self, key: &str) -> Option<&Value> {
        self.get(key).or_else(|| {
            self.get("report_metadata")
                .and_then(Value::as_object)
                .and_then(|m| m.get(key))
                .filter(|v| !v.is_null())
        })
    }

    fn text(&self, key: &str) -> String {
        self.get(key).and_then(value_text).unwrap_or_default()
    }

    pub fn aoi_id(&self) -> String {
        self.text("aoi_id")
    }

    pub fn bundle_id(&self) -> String {
        self.text("bundle_id")
    }

    pub fn report_version(&self) -> String {
        self.text("report_version")
    }

    /// `aoi_geometry_ref` as `kind`/`value`; any non-object value is kept opaque.
    pub fn geometry_ref(&self) -> Option<Row<GeometryRef>> {
        match self.get("aoi_geometry_ref")? {
            Value::Object(g) if g.is_empty() => None,
            Value::Object(g) => Some(Row::Typed(GeometryRef {
                kind: first_text(g, &["kind"]).unwrap_or_default(),
                value: first_text(g, &["value"]).unwrap_or_default(),
            })),
            other => Some(Row::Opaque(other.clone())),
        }
    }

    pub fn report_metadata(&self) -> MapSection<'_> {
        map_section(self.get("report_metadata"))
    }

    /// Dict with `evidence_classes`, or a flat list of classes.
    pub fn evidence_registry(&self) -> ListSection<EvidenceClass> {
        match self.get_with_metadata_fallback("evidence_registry") {
            Some(Value::Object(reg)) => match reg.get("evidence_classes") {
                Some(classes @ Value::Array(_)) => list_section(Some(classes)),
                _ => ListSection::Opaque(Value::Object(reg.clone())),
            },
            other => list_section(other),
        }
    }

    pub fn acceptance_criteria(&self) -> ListSection<AcceptanceCriterion> {
        list_section(self.get_with_metadata_fallback("acceptance_criteria"))
    }

    pub fn results(&self) -> ListSection<ResultEntry> {
        list_section(self.get("results"))
    }

    pub fn regulatory_traceability(&self) -> ListSection<TraceRow> {
        list_section(self.get("regulatory_traceability"))
    }

    pub fn assumptions(&self) -> ListSection<Assumption> {
        list_section(self.get_with_metadata_fallback("assumptions"))
    }

    pub fn map_config_relpath(&self) -> Option<String> {
        self.get("map_assets")
            .and_then(Value::as_object)
            .and_then(|m| first_text(m, &["config_relpath"]))
            .filter(|s| !s.trim().is_empty())
    }

    /// `inputs.sources`, ascending by `source_id`. A non-object `inputs`
    /// or a non-list `sources` comes back opaque.
    pub fn input_sources(&self) -> ListSection<InputSource> {
        let sources = match self.get("inputs") {
            None => return ListSection::Missing,
            Some(Value::Object(inputs)) => inputs.get("sources"),
            Some(other) => return ListSection::Opaque(other.clone()),
        };
        match list_section::<InputSource>(sources) {
            ListSection::Rows(mut rows) => {
                rows.sort_by(|a, b| source_sort_key(a).cmp(source_sort_key(b)));
                ListSection::Rows(rows)
            }
            other => other,
        }
    }

    pub fn metrics(&self) -> MapSection<'_> {
        map_section(self.get("metrics"))
    }

    pub fn metrics_rows_source(&self) -> Vec<&Value> {
        self.get("extensions")
            .and_then(|e| e.get("metrics_rows_v1"))
            .and_then(Value::as_array)
            .map(|a| a.iter().collect())
            .unwrap_or_default()
    }

    /// Declared, non-empty `evidence_artifacts[].relpath` in declaration order.
    pub fn evidence_relpaths(&self) -> Vec<String> {
        self.get("evidence_artifacts")
            .and_then(Value::as_array)
            .map(|entries| {
                entries
                    .iter()
                    .filter_map(|e| e.get("relpath").and_then(value_text))
                    .filter(|p| !p.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn validation_section(&self, name: &str) -> MapSection<'_> {
        map_section(self.get("validation").and_then(|v| v.get(name)))
    }

    pub fn external_dependencies(&self) -> Vec<&Value> {
        self.get("external_dependencies")
            .and_then(Value::as_array)
            .map(|a| a.iter().collect())
            .unwrap_or_default()
    }

    pub fn policy_mapping_refs_empty(&self) -> bool {
        is_empty_value(self.get("policy_mapping_refs"))
    }

    pub fn in_scope_articles_empty(&self) -> bool {
        is_empty_value(
            self.get("report_metadata")
                .and_then(|m| m.pointer("/regulatory_context/in_scope_articles")),
        )
    }

    pub fn rendered_artifacts(&self) -> CoreResult<RenderedArtifacts> {
        let relpaths = self.evidence_relpaths();
        let pick = |suffix: &str| {
            find_by_suffix(relpaths.iter().map(String::as_str), suffix)
                .map(str::to_string)
                .ok_or_else(|| {
                    CoreError::SuffixMiss(format!(
                        "no evidence_artifacts entry ends with {}",
                        suffix
                    ))
                })
        };
        Ok(RenderedArtifacts {
            html_relpath: pick(".html")?,
            json_relpath: pick(".json")?,
            metrics_relpath: pick("metrics.csv")?,
        })
    }
}

fn map_section(value: Option<&Value>) -> MapSection<'_> {
    match value {
        None | Some(Value::Null) => MapSection::Missing,
        Some(Value::Object(m)) => MapSection::Map(m),
        Some(other) => MapSection::Opaque(other),
    }
}

fn source_sort_key(row: &Row<InputSource>) -> &str {
    match row {
        Row::Typed(s) => &s.source_id,
        Row::Opaque(_) => "",
    }
}

fn is_empty_value(v: Option<&Value>) -> bool {
    match v {
        None | Some(Value::Null) => true,
        Some(Value::Array(a)) => a.is_empty(),
        Some(Value::Object(o)) => o.is_empty(),
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(_) => false,
    }
}
