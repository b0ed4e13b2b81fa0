//! Look up the baseline standing of a single feature by id or compat key.

use crate::baseline::BaselineResolver;
use crate::core::{BaselineStatus, Target};
use crate::detectors::catalog::CATALOG;

#[derive(Debug, Clone)]
pub struct FeatureStatus {
    pub name: String,
    pub compat_keys: Vec<String>,
    pub status: BaselineStatus,
}

/// Resolve `query` as a known feature id (e.g. `css-has-selector`) or, when
/// no catalog entry matches, as a raw compat key (e.g. `css.properties.zoom`).
pub fn resolve_feature(query: &str, target: Target) -> FeatureStatus {
    let mut resolver = BaselineResolver::new();

    if let Some(entry) = CATALOG.iter().find(|e| e.id == query) {
        let compat_keys: Vec<String> = entry.compat_keys.iter().map(|k| k.to_string()).collect();
        let status = resolver.resolve(&compat_keys, target);
        return FeatureStatus {
            name: entry.name.to_string(),
            compat_keys,
            status,
        };
    }

    let compat_keys = vec![query.to_string()];
    let status = resolver.resolve(&compat_keys, target);
    FeatureStatus {
        name: query.to_string(),
        compat_keys,
        status,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::BaselineTier;

    #[test]
    fn catalog_ids_resolve_to_named_features() {
        let status = resolve_feature("css-has-selector", Target::Widely);
        assert_eq!(status.name, ":has()");
        assert!(status.status.has_any_support());
    }

    #[test]
    fn raw_compat_keys_pass_straight_through() {
        let status = resolve_feature("css.properties.view-transition-name", Target::Widely);
        assert_eq!(status.status.baseline, BaselineTier::False);
        assert!(status.status.has_any_support());
    }

    #[test]
    fn unknown_queries_yield_no_data() {
        let status = resolve_feature("not-a-feature", Target::Widely);
        assert_eq!(status.status, crate::core::BaselineStatus::no_data());
    }
}
