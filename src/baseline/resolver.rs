//! Maps compatibility keys to resolved Baseline support data, with an
//! instance-owned cache.

use crate::baseline::data::{CompatDatabase, FeatureRecord};
use crate::core::{BaselineStatus, BaselineTier, SupportLevel, Target};
use std::collections::HashMap;

/// Known non-canonical sub-keys and their nearest resolvable ancestor.
static KEY_NORMALIZATIONS: &[(&str, &str)] = &[
    (
        "javascript.operators.import.options_parameter",
        "javascript.operators.import",
    ),
    (
        "javascript.statements.import.import_attributes",
        "javascript.statements.import",
    ),
    ("api.Clipboard.readText", "api.Clipboard"),
    ("api.Clipboard.writeText", "api.Clipboard"),
];

pub fn normalize_key(key: &str) -> &str {
    KEY_NORMALIZATIONS
        .iter()
        .find(|(from, _)| *from == key)
        .map(|(_, to)| *to)
        .unwrap_or(key)
}

fn tier_rank(tier: BaselineTier) -> u8 {
    match tier {
        BaselineTier::False => 0,
        BaselineTier::Low => 1,
        BaselineTier::High => 2,
    }
}

fn major_version(level: &SupportLevel) -> Option<f64> {
    match level {
        SupportLevel::Version(v) => v.split('.').next()?.parse().ok(),
        SupportLevel::Supported(_) => None,
    }
}

/// Resolves sets of compatibility keys against the compatibility database.
/// Results are cached per (normalized key set, target) for the lifetime of
/// the resolver; the cache is cleared only by [`BaselineResolver::reset`].
pub struct BaselineResolver {
    db: &'static CompatDatabase,
    cache: HashMap<String, BaselineStatus>,
}

impl Default for BaselineResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl BaselineResolver {
    pub fn new() -> Self {
        Self {
            db: CompatDatabase::embedded(),
            cache: HashMap::new(),
        }
    }

    pub fn with_database(db: &'static CompatDatabase) -> Self {
        Self {
            db,
            cache: HashMap::new(),
        }
    }

    pub fn resolve(&mut self, compat_keys: &[String], target: Target) -> BaselineStatus {
        if compat_keys.is_empty() {
            return BaselineStatus::no_data();
        }

        let mut keys: Vec<&str> = compat_keys.iter().map(|k| normalize_key(k)).collect();
        keys.sort_unstable();
        keys.dedup();
        let cache_key = format!("{}::{target}", keys.join("|"));

        if let Some(cached) = self.cache.get(&cache_key) {
            return cached.clone();
        }

        let statuses: Vec<BaselineStatus> = keys
            .iter()
            .filter_map(|key| {
                let record = self.db.lookup_with_ancestors(key);
                if record.is_none() {
                    log::debug!("no compatibility data for {key}");
                }
                record.map(status_from_record)
            })
            .collect();

        let status = combine(statuses);
        self.cache.insert(cache_key, status.clone());
        status
    }

    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    /// Drop every cached status.
    pub fn reset(&mut self) {
        self.cache.clear();
    }
}

fn status_from_record(record: &FeatureRecord) -> BaselineStatus {
    BaselineStatus {
        baseline: record.baseline,
        baseline_low_date: record.baseline_low_date.clone(),
        baseline_high_date: record.baseline_high_date.clone(),
        support: record.support.clone(),
        discouraged: record.discouraged,
    }
}

/// Conservative combination over a key set: the lowest tier wins and
/// carries its dates; support merges per browser, keeping the highest
/// version any key requires; discouraged if any key is.
fn combine(statuses: Vec<BaselineStatus>) -> BaselineStatus {
    let mut statuses = statuses.into_iter();
    let Some(first) = statuses.next() else {
        return BaselineStatus::no_data();
    };

    statuses.fold(first, |mut acc, status| {
        if tier_rank(status.baseline) < tier_rank(acc.baseline) {
            acc.baseline = status.baseline;
            acc.baseline_low_date = status.baseline_low_date.clone();
            acc.baseline_high_date = status.baseline_high_date.clone();
        }
        for (browser, level) in status.support {
            match acc.support.get(&browser) {
                Some(existing) => {
                    let keep_new = match (major_version(existing), major_version(&level)) {
                        (Some(old), Some(new)) => new > old,
                        (None, Some(_)) => true,
                        _ => false,
                    };
                    if keep_new {
                        acc.support.insert(browser, level);
                    }
                }
                None => {
                    acc.support.insert(browser, level);
                }
            }
        }
        acc.discouraged |= status.discouraged;
        acc
    })
}
