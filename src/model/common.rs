use serde_json::Value;
use std::collections::BTreeMap;
use uuid::Uuid;

pub type Id = String;

/// Property values of one cluster object, keyed by `/`-delimited field path.
/// Ordered so that every pass over the map is deterministic.
pub type PropertyMap = BTreeMap<String, Value>;

/// Namespace reserved for free-form auxiliary properties.
pub const AUX_NAMESPACE: &str = "Aux";

pub fn generate_id() -> Id {
    Uuid::new_v4().to_string()
}

/// Build a `PropertyMap` from plain string pairs.
pub fn property_map<K, V, I>(pairs: I) -> PropertyMap
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), Value::String(v.into())))
        .collect()
}

/// Truthiness of a loosely typed property value: `null`, `false`, `0`, `NaN`
/// and the empty string are false, everything else is true.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(false),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// True for `null` and the empty string, the two values a form treats as "no input".
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

/// Render a field value the way the property store expects it. `null` has no
/// string form and yields `None`.
pub fn value_to_property_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        other => Some(other.to_string()),
    }
}

/// Interpret a value as a number, accepting numeric strings.
pub fn value_as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Convert a catalog key such as `stor_pool-name` or `autoPlace` into PascalCase.
pub fn to_pascal_case(key: &str) -> String {
    key.split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}
