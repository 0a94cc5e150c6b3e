//! Knowledge base store and loader.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;

use super::VibeEntry;

/// Immutable, load-once store of vibe-to-attribute mapping tables.
///
/// Keys are not guaranteed unique across tables; when two tables define the
/// same key, the entry loaded last wins. Load order is made deterministic by
/// sorting the directory listing, so lookups are stable across reloads.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct KnowledgeBase {
    entries: Vec<VibeEntry>,

    /// Lowercased key -> index into `entries` (last loaded wins).
    by_key: HashMap<String, usize>,

    /// Names of the tables that loaded successfully.
    table_names: Vec<String>,
}

impl KnowledgeBase {
    /// Create an empty knowledge base.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every `*.json` mapping file in a directory.
    ///
    /// Fails softly: a missing directory or an unparsable file is skipped
    /// with a diagnostic, never aborting the whole load.
    pub fn load(directory: impl AsRef<Path>) -> Self {
        let directory = directory.as_ref();
        let mut kb = Self::new();

        let read_dir = match std::fs::read_dir(directory) {
            Ok(read_dir) => read_dir,
            Err(err) => {
                tracing::warn!(
                    directory = %directory.display(),
                    error = %err,
                    "vibes data directory unavailable, knowledge base is empty"
                );
                return kb;
            }
        };

        let mut paths: Vec<_> = read_dir
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
            .collect();
        paths.sort();

        for path in paths {
            let table = path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_default();

            let raw = match std::fs::read_to_string(&path) {
                Ok(raw) => raw,
                Err(err) => {
                    tracing::warn!(file = %path.display(), error = %err, "skipping unreadable mapping file");
                    continue;
                }
            };
            let parsed: Value = match serde_json::from_str(&raw) {
                Ok(parsed) => parsed,
                Err(err) => {
                    tracing::warn!(file = %path.display(), error = %err, "skipping unparsable mapping file");
                    continue;
                }
            };

            kb.add_table(&table, &parsed);
        }

        tracing::info!(
            tables = kb.table_names.len(),
            entries = kb.entries.len(),
            "knowledge base loaded"
        );
        kb
    }

    /// Add one parsed mapping table. Used by `load` and by tests.
    pub fn add_table(&mut self, table: &str, parsed: &Value) {
        let Some(object) = parsed.as_object() else {
            tracing::warn!(table, "mapping table is not a JSON object, skipped");
            return;
        };

        let mut added = 0usize;
        for (key, raw) in object {
            if let Some(entry) = VibeEntry::from_json(key, table, raw) {
                let index = self.entries.len();
                self.entries.push(entry);
                // Last loaded silently wins on duplicate keys.
                self.by_key.insert(key.trim().to_lowercase(), index);
                added += 1;
            }
        }

        tracing::debug!(table, entries = added, "mapping table loaded");
        self.table_names.push(table.to_string());
    }

    /// All entries, in load order.
    pub fn all_entries(&self) -> impl Iterator<Item = &VibeEntry> {
        self.entries.iter()
    }

    /// Entries as a slice, indexable by load position.
    pub fn entries(&self) -> &[VibeEntry] {
        &self.entries
    }

    /// Look up an entry by case-insensitive key equality.
    pub fn entry_by_key(&self, key: &str) -> Option<&VibeEntry> {
        self.by_key
            .get(&key.trim().to_lowercase())
            .and_then(|&index| self.entries.get(index))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether any entries loaded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Names of the loaded tables, in load order.
    pub fn table_names(&self) -> &[String] {
        &self.table_names
    }

    /// Table-grouped attribute context for inference oracle requests.
    pub fn oracle_context(&self) -> HashMap<String, HashMap<String, Value>> {
        let mut context: HashMap<String, HashMap<String, Value>> = HashMap::new();
        for entry in &self.entries {
            let attributes: serde_json::Map<String, Value> = entry
                .attributes
                .iter()
                .map(|(key, value)| {
                    (key.as_str().to_string(), serde_json::to_value(value).unwrap_or(Value::Null))
                })
                .collect();
            context
                .entry(entry.source_table.clone())
                .or_default()
                .insert(entry.key.clone(), Value::Object(attributes));
        }
        context
    }
}
