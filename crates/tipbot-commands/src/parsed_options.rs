use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
/// Value bound to one usage-grammar key.
pub enum OptionValue {
    /// Commands and valueless `--flags`.
    Flag(bool),
    /// `<argument>`s and `--option=<value>`s.
    Text(Option<String>),
    /// Arguments that may repeat (`<receiver>...`).
    List(Vec<String>),
}

impl OptionValue {
    pub fn is_set(&self) -> bool {
        match self {
            Self::Flag(value) => *value,
            Self::Text(value) => value.is_some(),
            Self::List(values) => !values.is_empty(),
        }
    }
}

/// Complete key/value map produced by matching argv against the grammar.
///
/// Every key the grammar knows is present: unmatched commands and flags are
/// `false`, unmatched arguments are empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ParsedOptions {
    values: BTreeMap<String, OptionValue>,
}

impl ParsedOptions {
    pub fn new(values: BTreeMap<String, OptionValue>) -> Self {
        Self { values }
    }

    pub fn get(&self, key: &str) -> Option<&OptionValue> {
        self.values.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &OptionValue)> {
        self.values.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn flag(&self, key: &str) -> bool {
        matches!(self.values.get(key), Some(OptionValue::Flag(true)))
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        match self.values.get(key) {
            Some(OptionValue::Text(Some(value))) => Some(value.as_str()),
            _ => None,
        }
    }

    pub fn list(&self, key: &str) -> Vec<String> {
        match self.values.get(key) {
            Some(OptionValue::List(values)) => values.clone(),
            Some(OptionValue::Text(Some(value))) => vec![value.clone()],
            _ => Vec::new(),
        }
    }

    pub fn int(&self, key: &str) -> Option<i64> {
        self.text(key).and_then(|value| value.trim().parse().ok())
    }

    /// JSON object holding only the keys that were actually matched.
    pub fn set_entries(&self) -> Value {
        let entries = self
            .values
            .iter()
            .filter(|(_, value)| value.is_set())
            .map(|(key, value)| {
                (
                    key.clone(),
                    serde_json::to_value(value).unwrap_or(Value::Null),
                )
            })
            .collect::<Map<String, Value>>();
        Value::Object(entries)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn sample() -> ParsedOptions {
        ParsedOptions::new(BTreeMap::from([
            ("send".to_string(), OptionValue::Flag(true)),
            ("tip".to_string(), OptionValue::Flag(false)),
            (
                "<satoshis>".to_string(),
                OptionValue::Text(Some(" 21 ".to_string())),
            ),
            ("<lnurl>".to_string(), OptionValue::Text(None)),
            (
                "<receiver>".to_string(),
                OptionValue::List(vec!["@alice".to_string(), "thanks".to_string()]),
            ),
        ]))
    }

    #[test]
    fn unit_accessors_read_typed_values() {
        let options = sample();
        assert!(options.flag("send"));
        assert!(!options.flag("tip"));
        assert!(!options.flag("<satoshis>"));
        assert_eq!(options.int("<satoshis>"), Some(21));
        assert_eq!(options.text("<lnurl>"), None);
        assert_eq!(options.list("<receiver>"), vec!["@alice", "thanks"]);
        assert_eq!(options.list("<satoshis>"), vec![" 21 "]);
        assert!(options.list("<missing>").is_empty());
    }

    #[test]
    fn unit_set_entries_skips_defaults() {
        assert_eq!(
            sample().set_entries(),
            json!({"send": true, "<satoshis>": " 21 ", "<receiver>": ["@alice", "thanks"]})
        );
    }
}
