use crate::error::{CoreError, CoreResult};
use serde::Serialize;
use serde_json::{Map, Value};

/// Canonical bytes used for every content hash:
/// UTF-8 JSON, object keys sorted, no insignificant whitespace, and integer
/// numbers only.
pub fn to_canonical_bytes<T: Serialize>(value: &T) -> CoreResult<Vec<u8>> {
    let canonical = canonicalize(serde_json::to_value(value)?, "$")?;
    Ok(serde_json::to_vec(&canonical)?)
}

fn canonicalize(v: Value, at: &str) -> CoreResult<Value> {
    match v {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            let mut out = Map::new();
            for (k, child) in entries {
                let child = canonicalize(child, &format!("{}.{}", at, k))?;
                out.insert(k, child);
            }
            Ok(Value::Object(out))
        }
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(i, child)| canonicalize(child, &format!("{}[{}]", at, i)))
            .collect::<CoreResult<Vec<_>>>()
            .map(Value::Array),
        Value::Number(n) if n.is_f64() => Err(CoreError::DeterminismViolation(format!(
            "non-integer number at {}",
            at
        ))),
        other => Ok(other),
    }
}
