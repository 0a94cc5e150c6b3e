//! Vibe entry definitions - rows of the mapping tables.

use apparel_catalog::{AttributeKey, AttributeMap, AttributeValue};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One vibe-to-attribute mapping.
///
/// A vibe key is a short free-text phrase ("summer brunch") mapped to a
/// concrete attribute bundle. Entries are immutable after load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VibeEntry {
    /// The canonical phrase used as a lookup key.
    pub key: String,

    /// Name of the mapping table (file) this entry came from.
    pub source_table: String,

    /// Attributes implied by the vibe.
    pub attributes: AttributeMap,
}

impl VibeEntry {
    /// Build an entry from one key/value pair of a mapping file.
    ///
    /// Attribute names outside the closed key set and values that are neither
    /// a string, an array of strings, nor a number are dropped with a
    /// diagnostic. Returns `None` when nothing usable remains.
    pub fn from_json(key: &str, table: &str, raw: &Value) -> Option<VibeEntry> {
        let object = raw.as_object()?;
        let mut attributes = AttributeMap::new();

        for (name, value) in object {
            let Some(attr_key) = AttributeKey::parse(name) else {
                tracing::debug!(table, vibe = key, attribute = %name, "unknown attribute name, dropped");
                continue;
            };
            match json_to_value(value) {
                Some(attr_value) if !attr_value.is_empty() => {
                    attributes.insert(attr_key, attr_value);
                }
                _ => {
                    tracing::debug!(table, vibe = key, attribute = %name, "unusable attribute value, dropped");
                }
            }
        }

        if attributes.is_empty() {
            return None;
        }

        Some(VibeEntry {
            key: key.to_string(),
            source_table: table.to_string(),
            attributes,
        })
    }
}

/// Convert a JSON value from a mapping file into an attribute value.
pub(crate) fn json_to_value(value: &Value) -> Option<AttributeValue> {
    match value {
        Value::String(s) => Some(AttributeValue::scalar(s.clone())),
        Value::Number(n) => n.as_f64().map(AttributeValue::Number),
        Value::Array(items) => {
            let strings: Vec<String> = items
                .iter()
                .filter_map(|item| item.as_str().map(str::to_string))
                .collect();
            if strings.is_empty() {
                None
            } else {
                Some(AttributeValue::List(strings))
            }
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_entry_from_json() {
        let raw = json!({
            "fit": "Relaxed",
            "fabric": ["Linen", "Cotton"],
            "budget": 75,
        });

        let entry = VibeEntry::from_json("summer brunch", "seasonal", &raw).unwrap();
        assert_eq!(entry.key, "summer brunch");
        assert_eq!(entry.source_table, "seasonal");
        assert_eq!(
            entry.attributes.get(&AttributeKey::Fit),
            Some(&AttributeValue::scalar("Relaxed"))
        );
        assert_eq!(
            entry.attributes.get(&AttributeKey::Fabric),
            Some(&AttributeValue::list(["Linen", "Cotton"]))
        );
        assert_eq!(
            entry.attributes.get(&AttributeKey::Budget),
            Some(&AttributeValue::Number(75.0))
        );
    }

    #[test]
    fn test_unknown_attributes_dropped() {
        let raw = json!({
            "fit": "Flowy",
            "spirit_animal": "capuchin",
        });

        let entry = VibeEntry::from_json("boho", "styles", &raw).unwrap();
        assert_eq!(entry.attributes.len(), 1);
    }

    #[test]
    fn test_entry_with_nothing_usable() {
        let raw = json!({ "spirit_animal": "capuchin" });
        assert!(VibeEntry::from_json("weird", "styles", &raw).is_none());

        let raw = json!("not an object");
        assert!(VibeEntry::from_json("weird", "styles", &raw).is_none());
    }
}
