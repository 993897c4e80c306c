pub mod kalshi;
pub mod polymarket;

use serde_json::Value;

/// Numbers arrive as JSON numbers or as decimal strings depending on the endpoint.
pub(crate) fn json_f64(v: &Value) -> Option<f64> {
    v.as_f64()
        .or_else(|| v.as_str().and_then(|s| s.trim().parse::<f64>().ok()))
}

pub(crate) fn json_i64(v: &Value) -> Option<i64> {
    v.as_i64()
        .or_else(|| v.as_f64().map(|f| f as i64))
        .or_else(|| v.as_str().and_then(|s| s.trim().parse::<i64>().ok()))
}

/// String field lookup that treats absent, null and non-string values alike.
pub(crate) fn field_str<'a>(obj: &'a Value, key: &str) -> Option<&'a str> {
    obj.get(key).and_then(|v| v.as_str())
}

/// Ids show up as strings or bare integers.
pub(crate) fn json_id(v: &Value) -> Option<String> {
    match v {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numbers_from_strings_and_numbers() {
        assert_eq!(json_f64(&json!(0.52)), Some(0.52));
        assert_eq!(json_f64(&json!("0.48")), Some(0.48));
        assert_eq!(json_f64(&json!(null)), None);
        assert_eq!(json_i64(&json!("12")), Some(12));
        assert_eq!(json_i64(&json!(12.0)), Some(12));
    }

    #[test]
    fn ids_from_strings_and_numbers() {
        assert_eq!(json_id(&json!("111")), Some("111".to_string()));
        assert_eq!(json_id(&json!(222)), Some("222".to_string()));
        assert_eq!(json_id(&json!("")), None);
        assert_eq!(json_id(&json!(null)), None);
    }
}
