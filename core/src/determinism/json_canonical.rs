use crate::error::CoreResult;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

// Rendered copies of the report:
// - UTF-8, non-ASCII characters written as-is
// - object keys sorted lexicographically at every depth
// - array order preserved
pub fn sorted_value<T: Serialize>(value: &T) -> CoreResult<Value> {
    let v = serde_json::to_value(value)?;
    Ok(normalize_value(v))
}

/// Compact sorted-key JSON, used inside `<code>` cells.
pub fn to_canonical_string<T: Serialize>(value: &T) -> CoreResult<String> {
    Ok(serde_json::to_string(&sorted_value(value)?)?)
}

/// 2-space indented, sorted keys, trailing newline.
pub fn to_pretty_sorted(value: &Value) -> CoreResult<String> {
    let mut s = serde_json::to_string_pretty(&normalize_value(value.clone()))?;
    s.push('\n');
    Ok(s)
}

/// 2-space indented, key order as loaded, trailing newline.
pub fn to_pretty_preserving(value: &Value) -> CoreResult<String> {
    let mut s = serde_json::to_string_pretty(value)?;
    s.push('\n');
    Ok(s)
}

fn normalize_value(v: Value) -> Value {
    match v {
        Value::Object(map) => {
            let mut btm: BTreeMap<String, Value> = BTreeMap::new();
            for (k, vv) in map {
                btm.insert(k, normalize_value(vv));
            }
            // preserve_order keeps insertion order, so rebuild from the sorted map.
            let mut out = serde_json::Map::new();
            for (k, vv) in btm {
                out.insert(k, vv);
            }
            Value::Object(out)
        }
        Value::Array(arr) => Value::Array(arr.into_iter().map(normalize_value).collect()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn pretty_sorted_orders_nested_keys() {
        let v: Value = serde_json::from_str(r#"{"b":1,"a":{"y":"é","x":[3,1]}}"#).unwrap();
        let s = to_pretty_sorted(&v).unwrap();
        assert_eq!(
            s,
            "{\n  \"a\": {\n    \"x\": [\n      3,\n      1\n    ],\n    \"y\": \"é\"\n  },\n  \"b\": 1\n}\n"
        );
    }

    #[test]
    fn preserving_keeps_load_order() {
        let v: Value = serde_json::from_str(r#"{"b":1,"a":2}"#).unwrap();
        assert_eq!(to_pretty_preserving(&v).unwrap(), "{\n  \"b\": 1,\n  \"a\": 2\n}\n");
    }

    #[test]
    fn canonical_string_is_stable_for_key_order() {
        let a = json!({"b": 1, "a": {"y": 2, "x": 3}});
        let b = json!({"a": {"x": 3, "y": 2}, "b": 1});
        assert_eq!(to_canonical_string(&a).unwrap(), to_canonical_string(&b).unwrap());
        assert_eq!(to_canonical_string(&a).unwrap(), r#"{"a":{"x":3,"y":2},"b":1}"#);
    }
}
