use serde_json::{Map, Value};

/// Keep only the entries of `source` named in `allowed_keys`, in `allowed_keys` order.
///
/// Keys missing from `source` are skipped. An explicit JSON `null` counts as present
/// and is kept, so a client can still clear a nullable column.
pub fn project(source: &Map<String, Value>, allowed_keys: &[&str]) -> Map<String, Value> {
    let mut projected = Map::new();
    for key in allowed_keys {
        if let Some(value) = source.get(*key) {
            projected.insert((*key).to_string(), value.clone());
        }
    }
    projected
}
