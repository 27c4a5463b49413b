//! Dotted-path lookup into JSON payloads.
//!
//! Provider responses are loosely shaped, so resource owners read their fields
//! through these helpers instead of deserializing into strict structs. A
//! missing or mistyped field is `None`, never an error.

use serde_json::Value;

/// Resolve `key` inside `data`.
///
/// A key present literally on the top-level object wins. Otherwise the key is
/// split on `.` and walked one level at a time: objects are indexed by name,
/// arrays by numeric index. Anything else ends the walk with `None`, as does
/// a `null` leaf.
pub fn value_by_key<'a>(data: &'a Value, key: &str) -> Option<&'a Value> {
    if let Some(value) = data.as_object().and_then(|object| object.get(key)) {
        return non_null(value);
    }

    if !key.contains('.') {
        return None;
    }

    key.split('.')
        .try_fold(data, descend)
        .and_then(non_null)
}

/// String field at `key`, `None` if absent or not a string.
pub fn str_by_key<'a>(data: &'a Value, key: &str) -> Option<&'a str> {
    value_by_key(data, key).and_then(Value::as_str)
}

/// Integer field at `key`, `None` if absent or not an integer.
pub fn i64_by_key(data: &Value, key: &str) -> Option<i64> {
    value_by_key(data, key).and_then(Value::as_i64)
}

fn descend<'a>(current: &'a Value, segment: &str) -> Option<&'a Value> {
    match current {
        Value::Object(object) => object.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    }
}

fn non_null(value: &Value) -> Option<&Value> {
    if value.is_null() { None } else { Some(value) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_nested_lookup() {
        let data = json!({"response": {"id": 4821, "name": "n1"}});

        assert_eq!(i64_by_key(&data, "response.id"), Some(4821));
        assert_eq!(str_by_key(&data, "response.name"), Some("n1"));
        assert_eq!(value_by_key(&data, "response.missing"), None);
    }

    #[test]
    fn test_literal_key_wins_over_path() {
        let data = json!({"response.id": 1, "response": {"id": 2}});
        assert_eq!(i64_by_key(&data, "response.id"), Some(1));
    }

    #[test]
    fn test_array_index_segments() {
        let data = json!({"users": [{"name": "a"}, {"name": "b"}]});

        assert_eq!(str_by_key(&data, "users.1.name"), Some("b"));
        assert_eq!(str_by_key(&data, "users.2.name"), None);
        assert_eq!(str_by_key(&data, "users.first.name"), None);
    }

    #[test]
    fn test_walk_stops_on_scalars_and_nulls() {
        let data = json!({"response": "not an object", "gone": null});

        assert_eq!(value_by_key(&data, "response.id"), None);
        assert_eq!(value_by_key(&data, "gone"), None);
        assert_eq!(value_by_key(&json!(42), "response.id"), None);
    }

    #[test]
    fn test_type_mismatch_is_absent() {
        let data = json!({"response": {"id": "4821", "name": 7}});

        assert_eq!(i64_by_key(&data, "response.id"), None);
        assert_eq!(str_by_key(&data, "response.name"), None);
    }
}
