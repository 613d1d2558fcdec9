//! Deserialization helpers for persisted form values.

use serde::{Deserialize, Deserializer};

/// Separator used by multi-value form inputs.
pub const MULTI_VALUE_SEPARATOR: char = ';';

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrList {
    String(String),
    List(Vec<String>),
}

/// Accept either a JSON array of strings or a `;`-separated string.
/// Blank items are dropped.
pub fn string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let items = match Option::<StringOrList>::deserialize(deserializer)? {
        None => return Ok(Vec::new()),
        Some(StringOrList::String(s)) => split_multi_value(&s),
        Some(StringOrList::List(list)) => list
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
    };
    Ok(items)
}

pub fn split_multi_value(s: &str) -> Vec<String> {
    s.split(MULTI_VALUE_SEPARATOR)
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Deserialize)]
    struct Holder {
        #[serde(default, deserialize_with = "string_list")]
        items: Vec<String>,
    }

    #[test]
    fn test_semicolon_string() {
        let h: Holder = serde_json::from_value(json!({ "items": "clb; cdn;;waf" })).unwrap();
        assert_eq!(h.items, vec!["clb", "cdn", "waf"]);
    }

    #[test]
    fn test_array_and_absent() {
        let h: Holder = serde_json::from_value(json!({ "items": ["cos", " "] })).unwrap();
        assert_eq!(h.items, vec!["cos"]);

        let h: Holder = serde_json::from_value(json!({})).unwrap();
        assert!(h.items.is_empty());

        let h: Holder = serde_json::from_value(json!({ "items": null })).unwrap();
        assert!(h.items.is_empty());
    }

    #[test]
    fn test_wrong_shape_fails() {
        assert!(serde_json::from_value::<Holder>(json!({ "items": 3 })).is_err());
    }
}
