//! Embedded cross-browser compatibility database.
//!
//! A pruned snapshot of Baseline support data keyed by canonical dotted
//! compatibility keys, parsed once per process. A malformed snapshot
//! degrades to an empty database rather than aborting (lookups then resolve
//! to the "no data" status).

use crate::core::{BaselineTier, SupportLevel};
use once_cell::sync::Lazy;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};

const EMBEDDED_SNAPSHOT: &str = include_str!("web_features.json");

#[derive(Debug, Clone, Deserialize)]
pub struct FeatureRecord {
    pub name: String,
    pub baseline: BaselineTier,
    #[serde(default)]
    pub baseline_low_date: Option<String>,
    #[serde(default)]
    pub baseline_high_date: Option<String>,
    #[serde(default)]
    pub support: BTreeMap<String, SupportLevel>,
    #[serde(default)]
    pub discouraged: bool,
}

pub struct CompatDatabase {
    records: HashMap<String, FeatureRecord>,
}

static EMBEDDED: Lazy<CompatDatabase> = Lazy::new(|| {
    match serde_json::from_str::<HashMap<String, FeatureRecord>>(EMBEDDED_SNAPSHOT) {
        Ok(records) => CompatDatabase { records },
        Err(err) => {
            log::warn!("embedded compatibility snapshot failed to parse: {err}");
            CompatDatabase {
                records: HashMap::new(),
            }
        }
    }
});

impl CompatDatabase {
    pub fn embedded() -> &'static CompatDatabase {
        &EMBEDDED
    }

    pub fn from_records(records: HashMap<String, FeatureRecord>) -> Self {
        Self { records }
    }

    pub fn lookup(&self, key: &str) -> Option<&FeatureRecord> {
        self.records.get(key)
    }

    /// Exact lookup, then ancestor fallback: strip trailing dotted segments
    /// until a record is found. `css.properties.text-wrap.balance` falls
    /// back to `css.properties.text-wrap`, and so on.
    pub fn lookup_with_ancestors(&self, key: &str) -> Option<&FeatureRecord> {
        let mut candidate = key;
        loop {
            if let Some(record) = self.records.get(candidate) {
                return Some(record);
            }
            match candidate.rfind('.') {
                // Stop before degenerating into top-level namespaces like
                // bare "css".
                Some(dot) if candidate[..dot].contains('.') => candidate = &candidate[..dot],
                _ => return None,
            }
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_snapshot_parses() {
        let db = CompatDatabase::embedded();
        assert!(!db.is_empty());
        let record = db.lookup("css.properties.view-transition-name").unwrap();
        assert_eq!(record.baseline, BaselineTier::False);
        assert!(record.support.contains_key("chrome"));
    }

    #[test]
    fn every_catalog_compat_key_resolves() {
        // Each key the detectors can emit must reach a record, directly or
        // through an ancestor.
        let db = CompatDatabase::embedded();
        for entry in crate::detectors::catalog::CATALOG {
            for key in entry.compat_keys {
                let normalized = crate::baseline::resolver::normalize_key(key);
                assert!(
                    db.lookup_with_ancestors(normalized).is_some(),
                    "no record reachable for {key}"
                );
            }
        }
    }

    #[test]
    fn ancestor_fallback_strips_segments() {
        let db = CompatDatabase::embedded();
        let record = db
            .lookup_with_ancestors("css.selectors.has.unknown-subfeature")
            .unwrap();
        assert_eq!(record.name, ":has()");
    }

    #[test]
    fn ancestor_fallback_stops_at_namespaces() {
        let db = CompatDatabase::embedded();
        assert!(db.lookup_with_ancestors("css.nonexistent").is_none());
    }

    #[test]
    fn discouraged_flag_survives_parsing() {
        let db = CompatDatabase::embedded();
        assert!(db.lookup("api.Document.execCommand").unwrap().discouraged);
    }
}
