// Field path extraction and lookup over arbitrary JSON payloads
use serde_json::{Map, Value};

/// List the dotted field paths of a payload.
///
/// Objects are walked in key insertion order; array-valued keys are terminal
/// leaves and never descended into. Anything other than an object at the top
/// level yields no fields.
pub fn extract_fields(data: &Value) -> Vec<String> {
    let mut fields = Vec::new();
    if let Value::Object(map) = data {
        collect_fields(map, "", &mut fields);
    }
    fields
}

fn collect_fields(map: &Map<String, Value>, prefix: &str, out: &mut Vec<String>) {
    for (key, value) in map {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };

        match value {
            // Arrays are leaves
            Value::Array(_) => out.push(path),
            Value::Object(nested) => collect_fields(nested, &path, out),
            _ => out.push(path),
        }
    }
}

/// Resolve a dotted field path against a payload.
///
/// Returns `None` when any segment is missing or an intermediate value is not
/// an object; never errors.
pub fn extract_field_value<'a>(data: &'a Value, field_path: &str) -> Option<&'a Value> {
    if field_path.is_empty() {
        return None;
    }

    let mut current = data;
    for key in field_path.split('.') {
        current = current.as_object()?.get(key)?;
    }
    Some(current)
}

/// Human-readable label for a field path: the last segment with camelCase
/// words split apart.
pub fn field_display_name(field_path: &str) -> String {
    let last = field_path.rsplit('.').next().unwrap_or(field_path);
    let mut name = String::with_capacity(last.len() + 4);
    for ch in last.chars() {
        if ch.is_ascii_uppercase() && !name.is_empty() {
            name.push(' ');
        }
        name.push(ch);
    }
    name.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_fields_nested_objects() {
        let data = json!({
            "symbol": "AAPL",
            "quote": {
                "price": 187.4,
                "volume": 1200
            }
        });

        assert_eq!(
            extract_fields(&data),
            vec!["symbol", "quote.price", "quote.volume"]
        );
    }

    #[test]
    fn test_extract_fields_arrays_are_terminal() {
        let data = json!({
            "result": {
                "list": [{"p": 1}, {"p": 2}],
                "meta": {"count": 2}
            }
        });

        assert_eq!(extract_fields(&data), vec!["result.list", "result.meta.count"]);
    }

    #[test]
    fn test_extract_fields_non_object_top_level() {
        assert!(extract_fields(&json!([1, 2, 3])).is_empty());
        assert!(extract_fields(&json!(42)).is_empty());
        assert!(extract_fields(&json!(null)).is_empty());
        assert!(extract_fields(&json!({})).is_empty());
    }

    #[test]
    fn test_extract_field_value() {
        let data = json!({"a": {"b": 5}});

        assert_eq!(extract_field_value(&data, "a.b"), Some(&json!(5)));
        assert_eq!(extract_field_value(&data, "a.c"), None);
        assert_eq!(extract_field_value(&json!({}), "x"), None);
        assert_eq!(extract_field_value(&data, ""), None);
    }

    #[test]
    fn test_extract_field_value_through_scalar() {
        let data = json!({"a": 5});
        assert_eq!(extract_field_value(&data, "a.b"), None);
    }

    #[test]
    fn test_field_display_name() {
        assert_eq!(field_display_name("quote.usdRate"), "usd Rate");
        assert_eq!(field_display_name("price"), "price");
        assert_eq!(field_display_name("MarketCap"), "Market Cap");
    }
}
