//! Deep merge of multi-document YAML streams.
//!
//! The collector emits one YAML document per fragment. Decoding folds those
//! documents together field by field, so a stage override only has to name
//! the keys it changes. Sequences are replaced entirely, not concatenated.

use crate::error::Result;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_yaml::Value;

/// Deep merge two YAML values, with `overlay` taking precedence over `base`.
///
/// - Mappings are merged recursively: keys in overlay override keys in base
/// - Sequences, strings, numbers, booleans and tagged values are replaced entirely
/// - If overlay is null, the base value is preserved (an empty document changes nothing)
///
/// # Example
/// ```
/// use stage_config::config::deep_merge;
///
/// let base: serde_yaml::Value =
///     serde_yaml::from_str("log: {level: warn, format: json}\nhosts: [a, b]").unwrap();
/// let overlay: serde_yaml::Value =
///     serde_yaml::from_str("log: {level: debug}\nhosts: [c]").unwrap();
/// let merged = deep_merge(base, overlay);
/// assert_eq!(merged["log"]["level"].as_str(), Some("debug"));
/// assert_eq!(merged["log"]["format"].as_str(), Some("json"));
/// assert_eq!(merged["hosts"].as_sequence().map(Vec::len), Some(1));
/// ```
pub fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Mapping(mut base_map), Value::Mapping(overlay_map)) => {
            for (key, overlay_value) in overlay_map {
                // Merge in place so existing keys keep their position
                match base_map.get_mut(&key) {
                    Some(slot) => {
                        let base_value = std::mem::replace(slot, Value::Null);
                        *slot = deep_merge(base_value, overlay_value);
                    }
                    None => {
                        base_map.insert(key, overlay_value);
                    }
                }
            }
            Value::Mapping(base_map)
        }
        (base, Value::Null) => base,
        (_, overlay) => overlay,
    }
}

/// Merge multiple values in order, with later values taking precedence.
pub fn deep_merge_all(values: impl IntoIterator<Item = Value>) -> Value {
    values.into_iter().fold(Value::Null, deep_merge)
}

/// Parse every document in a YAML stream and fold them with [`deep_merge`].
///
/// Empty input yields `Value::Null`. A later document cannot clear a key:
/// `key: null` (or `key: ~`) in an override keeps the earlier value, so a
/// stage that needs to unset a key must replace its parent mapping or use
/// an explicit empty value such as `""` or `[]`.
pub fn merge_documents(bytes: &[u8]) -> Result<Value> {
    let mut documents = Vec::new();
    for document in serde_yaml::Deserializer::from_slice(bytes) {
        documents.push(Value::deserialize(document)?);
    }
    Ok(deep_merge_all(documents))
}

/// Decode a merged stream into the caller's type.
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    let merged = merge_documents(bytes)?;
    Ok(serde_yaml::from_value(merged)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn yaml(text: &str) -> Value {
        serde_yaml::from_str(text).unwrap()
    }

    #[test]
    fn test_merge_simple_mappings() {
        let result = deep_merge(yaml("{a: 1, b: 2}"), yaml("{b: 3, c: 4}"));
        assert_eq!(result, yaml("{a: 1, b: 3, c: 4}"));
    }

    #[test]
    fn test_merge_nested_mappings() {
        let base = yaml("server: {host: localhost, port: 8080}\ndebug: true");
        let overlay = yaml("server: {port: 9000}");
        let result = deep_merge(base, overlay);
        assert_eq!(
            result,
            yaml("server: {host: localhost, port: 9000}\ndebug: true")
        );
    }

    #[test]
    fn test_sequences_replaced_not_merged() {
        let result = deep_merge(yaml("items: [1, 2, 3]"), yaml("items: [4, 5]"));
        assert_eq!(result, yaml("items: [4, 5]"));
    }

    #[test]
    fn test_null_preserves_base() {
        let result = deep_merge(yaml("{a: 1, b: {c: 2}}"), yaml("{a: null, b: {c: ~}}"));
        assert_eq!(result, yaml("{a: 1, b: {c: 2}}"));
    }

    #[test]
    fn test_overlay_replaces_scalar_with_mapping() {
        let result = deep_merge(yaml("value: 42"), yaml("value: {nested: true}"));
        assert_eq!(result, yaml("value: {nested: true}"));
    }

    #[test]
    fn test_merge_keeps_key_order() {
        let result = deep_merge(yaml("{first: 1, second: 2, third: 3}"), yaml("{first: 9}"));
        let keys: Vec<_> = result
            .as_mapping()
            .unwrap()
            .keys()
            .map(|k| k.as_str().unwrap().to_string())
            .collect();
        assert_eq!(keys, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_merge_all() {
        let result = deep_merge_all(vec![yaml("a: 1"), yaml("b: 2"), yaml("{a: 3, c: 4}")]);
        assert_eq!(result, yaml("{a: 3, b: 2, c: 4}"));
    }

    #[test]
    fn test_merge_documents_later_wins() {
        let stream = b"log:\n  level: warn\n  format: json\n---\nlog:\n  level: debug\n";
        let merged = merge_documents(stream).unwrap();
        assert_eq!(merged, yaml("log: {level: debug, format: json}"));
    }

    #[test]
    fn test_merge_documents_empty_input() {
        assert_eq!(merge_documents(b"").unwrap(), Value::Null);
    }

    #[test]
    fn test_merge_documents_skips_empty_documents() {
        let stream = b"a: 1\n---\n# only a comment\n---\nb: 2\n";
        assert_eq!(merge_documents(stream).unwrap(), yaml("{a: 1, b: 2}"));
    }

    #[test]
    fn test_merge_documents_null_override_keeps_base() {
        let stream = b"db:\n  password: secret\n---\ndb:\n  password: null\n";
        let merged = merge_documents(stream).unwrap();
        assert_eq!(merged, yaml("db: {password: secret}"));

        let stream = b"db:\n  password: secret\n---\ndb:\n  password: \"\"\n";
        let merged = merge_documents(stream).unwrap();
        assert_eq!(merged, yaml("db: {password: ''}"));
    }

    #[test]
    fn test_decode_invalid_yaml() {
        let err = merge_documents(b"a: [unclosed\n").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decode);
    }

    #[test]
    fn test_decode_into_struct() {
        #[derive(Debug, serde::Deserialize, PartialEq)]
        struct Server {
            host: String,
            port: u16,
        }

        let server: Server = decode(b"host: a\nport: 1\n---\nport: 2\n").unwrap();
        assert_eq!(
            server,
            Server {
                host: "a".to_string(),
                port: 2
            }
        );
    }
}
