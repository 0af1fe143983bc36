use serde_json::{Map, Value};

/// Read-only accessor over a record's untyped `content` object.
///
/// Every lookup degrades instead of failing: a missing key or a value of the
/// wrong JSON type reads as `None`, `""` or `false`.
#[derive(Debug, Clone, Copy)]
pub struct ContentView<'a> {
    map: &'a Map<String, Value>,
}

impl<'a> ContentView<'a> {
    pub fn new(map: &'a Map<String, Value>) -> Self {
        Self { map }
    }

    /// The value under `key` when it is a JSON string.
    pub fn string(&self, key: &str) -> Option<&'a str> {
        self.map.get(key).and_then(Value::as_str)
    }

    /// The string under `key`, or `""`.
    pub fn text(&self, key: &str) -> &'a str {
        self.string(key).unwrap_or_default()
    }

    /// True when `key` holds any non-null value.
    pub fn present(&self, key: &str) -> bool {
        matches!(self.map.get(key), Some(v) if !v.is_null())
    }

    pub fn flag(&self, key: &str) -> bool {
        self.map
            .get(key)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// String entries of a nested object, sorted by key. Non-string values are skipped.
    pub fn string_pairs(&self, key: &str) -> Vec<(String, String)> {
        let mut pairs: Vec<(String, String)> = match self.map.get(key) {
            Some(Value::Object(inner)) => inner
                .iter()
                .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
                .collect(),
            _ => Vec::new(),
        };
        // Map iteration order depends on serde_json's `preserve_order` feature.
        pairs.sort();
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected a JSON object"),
        }
    }

    #[test]
    fn wrong_types_degrade_to_defaults() {
        let map = object(json!({"ssid": 42, "hidden": "yes", "name": null}));
        let view = ContentView::new(&map);

        assert_eq!(view.string("ssid"), None);
        assert_eq!(view.text("ssid"), "");
        assert!(!view.flag("hidden"));
        assert!(!view.present("name"));
        assert!(view.present("ssid"));
        assert!(!view.present("missing"));
    }

    #[test]
    fn string_pairs_skip_non_strings() {
        let map = object(json!({
            "social_links": {"twitter": "@acme", "likes": 10, "github": "acme"},
            "contact_info": "not an object"
        }));
        let view = ContentView::new(&map);

        assert_eq!(
            view.string_pairs("social_links"),
            vec![
                ("github".to_string(), "acme".to_string()),
                ("twitter".to_string(), "@acme".to_string()),
            ]
        );
        assert!(view.string_pairs("contact_info").is_empty());
    }
}
