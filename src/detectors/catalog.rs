//! Static catalog of web-platform features the detectors know about.
//!
//! Each entry ties a syntax token to its canonical compatibility keys and an
//! "available-by" level. The rule engines scan for entries with a `token`;
//! entries that also (or only) carry a `pattern` are covered by the fallback
//! regex strategy.

use crate::core::{ConstructKind, FileKind, Target};

/// How broadly available a construct is, as known to the detection side.
/// The authoritative tier for reporting comes from the baseline resolver;
/// this level only decides whether the active rule configuration flags the
/// construct at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability {
    Widely,
    Newly,
    Limited,
}

impl Availability {
    /// Whether a construct at this level is acceptable for the given target.
    /// Flagging happens when this returns false.
    pub fn meets(&self, target: Target) -> bool {
        match target {
            Target::Widely => matches!(self, Availability::Widely),
            Target::Newly => matches!(self, Availability::Widely | Availability::Newly),
        }
    }
}

pub struct CatalogEntry {
    pub id: &'static str,
    pub name: &'static str,
    pub kind: FileKind,
    pub construct: ConstructKind,
    /// Token the rule engine scans for; empty for pattern-only entries.
    pub token: &'static str,
    pub compat_keys: &'static [&'static str],
    pub availability: Availability,
    /// Fallback regex, matched line by line.
    pub pattern: Option<&'static str>,
}

pub static CATALOG: &[CatalogEntry] = &[
    // Stylesheet family
    CatalogEntry {
        id: "css-container-queries",
        name: "Container queries",
        kind: FileKind::Stylesheet,
        construct: ConstructKind::AtRule,
        token: "container",
        compat_keys: &["css.at-rules.container"],
        availability: Availability::Newly,
        pattern: Some(r"@container[\s(]"),
    },
    CatalogEntry {
        id: "css-cascade-layers",
        name: "Cascade layers",
        kind: FileKind::Stylesheet,
        construct: ConstructKind::AtRule,
        token: "layer",
        compat_keys: &["css.at-rules.layer"],
        availability: Availability::Widely,
        pattern: Some(r"@layer[\s{]"),
    },
    CatalogEntry {
        id: "css-scope",
        name: "Scoped styles",
        kind: FileKind::Stylesheet,
        construct: ConstructKind::AtRule,
        token: "scope",
        compat_keys: &["css.at-rules.scope"],
        availability: Availability::Limited,
        pattern: None,
    },
    CatalogEntry {
        id: "css-starting-style",
        name: "@starting-style",
        kind: FileKind::Stylesheet,
        construct: ConstructKind::AtRule,
        token: "starting-style",
        compat_keys: &["css.at-rules.starting-style"],
        availability: Availability::Newly,
        pattern: None,
    },
    CatalogEntry {
        id: "css-registered-properties",
        name: "@property",
        kind: FileKind::Stylesheet,
        construct: ConstructKind::AtRule,
        token: "property",
        compat_keys: &["css.at-rules.property"],
        availability: Availability::Newly,
        pattern: None,
    },
    CatalogEntry {
        id: "css-has-selector",
        name: ":has()",
        kind: FileKind::Stylesheet,
        construct: ConstructKind::Selector,
        token: ":has",
        compat_keys: &["css.selectors.has"],
        availability: Availability::Newly,
        pattern: Some(r":has\s*\("),
    },
    CatalogEntry {
        id: "css-user-valid",
        name: ":user-valid and :user-invalid",
        kind: FileKind::Stylesheet,
        construct: ConstructKind::Selector,
        token: ":user-valid",
        compat_keys: &["css.selectors.user-valid"],
        availability: Availability::Newly,
        pattern: None,
    },
    CatalogEntry {
        id: "css-focus-visible",
        name: ":focus-visible",
        kind: FileKind::Stylesheet,
        construct: ConstructKind::Selector,
        token: ":focus-visible",
        compat_keys: &["css.selectors.focus-visible"],
        availability: Availability::Widely,
        pattern: None,
    },
    CatalogEntry {
        id: "css-view-transitions",
        name: "View transitions",
        kind: FileKind::Stylesheet,
        construct: ConstructKind::Property,
        token: "view-transition-name",
        compat_keys: &["css.properties.view-transition-name"],
        availability: Availability::Limited,
        pattern: Some(r"view-transition-name\s*:"),
    },
    CatalogEntry {
        id: "css-anchor-positioning",
        name: "Anchor positioning",
        kind: FileKind::Stylesheet,
        construct: ConstructKind::Property,
        token: "anchor-name",
        compat_keys: &["css.properties.anchor-name"],
        availability: Availability::Limited,
        pattern: None,
    },
    CatalogEntry {
        id: "css-field-sizing",
        name: "field-sizing",
        kind: FileKind::Stylesheet,
        construct: ConstructKind::Property,
        token: "field-sizing",
        compat_keys: &["css.properties.field-sizing"],
        availability: Availability::Limited,
        pattern: None,
    },
    CatalogEntry {
        id: "css-oklch",
        name: "oklch() color",
        kind: FileKind::Stylesheet,
        construct: ConstructKind::Function,
        token: "oklch",
        compat_keys: &["css.types.color.oklch"],
        availability: Availability::Newly,
        pattern: None,
    },
    CatalogEntry {
        id: "css-color-mix",
        name: "color-mix()",
        kind: FileKind::Stylesheet,
        construct: ConstructKind::Function,
        token: "color-mix",
        compat_keys: &["css.types.color.color-mix"],
        availability: Availability::Newly,
        pattern: None,
    },
    // Value-level features are only reachable by the fallback strategy.
    CatalogEntry {
        id: "css-subgrid",
        name: "Subgrid",
        kind: FileKind::Stylesheet,
        construct: ConstructKind::Value,
        token: "",
        compat_keys: &[
            "css.properties.grid-template-columns.subgrid",
            "css.properties.grid-template-rows.subgrid",
        ],
        availability: Availability::Newly,
        pattern: Some(r"grid-template-(?:rows|columns)\s*:[^;]*\bsubgrid\b"),
    },
    CatalogEntry {
        id: "css-text-wrap-balance",
        name: "text-wrap: balance",
        kind: FileKind::Stylesheet,
        construct: ConstructKind::Value,
        token: "",
        compat_keys: &["css.properties.text-wrap.balance"],
        availability: Availability::Newly,
        pattern: Some(r"text-wrap\s*:\s*balance"),
    },
    // Markup family
    CatalogEntry {
        id: "html-search-element",
        name: "<search> element",
        kind: FileKind::Markup,
        construct: ConstructKind::Element,
        token: "search",
        compat_keys: &["html.elements.search"],
        availability: Availability::Newly,
        pattern: Some(r"<search[\s>/]"),
    },
    CatalogEntry {
        id: "html-dialog-element",
        name: "<dialog> element",
        kind: FileKind::Markup,
        construct: ConstructKind::Element,
        token: "dialog",
        compat_keys: &["html.elements.dialog"],
        availability: Availability::Widely,
        pattern: Some(r"<dialog[\s>/]"),
    },
    CatalogEntry {
        id: "html-details-element",
        name: "<details> element",
        kind: FileKind::Markup,
        construct: ConstructKind::Element,
        token: "details",
        compat_keys: &["html.elements.details"],
        availability: Availability::Widely,
        pattern: None,
    },
    CatalogEntry {
        id: "html-popover",
        name: "popover attribute",
        kind: FileKind::Markup,
        construct: ConstructKind::Attribute,
        token: "popover",
        compat_keys: &["html.global_attributes.popover"],
        availability: Availability::Newly,
        pattern: None,
    },
    CatalogEntry {
        id: "html-inert",
        name: "inert attribute",
        kind: FileKind::Markup,
        construct: ConstructKind::Attribute,
        token: "inert",
        compat_keys: &["html.global_attributes.inert"],
        availability: Availability::Widely,
        pattern: None,
    },
    CatalogEntry {
        id: "html-lazy-loading",
        name: "Lazy loading",
        kind: FileKind::Markup,
        construct: ConstructKind::Attribute,
        token: "",
        compat_keys: &["html.elements.img.loading"],
        availability: Availability::Widely,
        pattern: Some(r#"loading\s*=\s*["']?lazy"#),
    },
    // Script family (legacy mode, pattern strategy only)
    CatalogEntry {
        id: "js-optional-chaining",
        name: "Optional chaining",
        kind: FileKind::Script,
        construct: ConstructKind::Pattern,
        token: "",
        compat_keys: &["javascript.operators.optional_chaining"],
        availability: Availability::Widely,
        pattern: Some(r"\?\.[A-Za-z_$\[(]"),
    },
    CatalogEntry {
        id: "js-nullish-coalescing",
        name: "Nullish coalescing",
        kind: FileKind::Script,
        construct: ConstructKind::Pattern,
        token: "",
        compat_keys: &["javascript.operators.nullish_coalescing"],
        availability: Availability::Widely,
        pattern: Some(r"\?\?[^=?]"),
    },
    CatalogEntry {
        id: "js-structured-clone",
        name: "structuredClone()",
        kind: FileKind::Script,
        construct: ConstructKind::Pattern,
        token: "",
        compat_keys: &["api.structuredClone"],
        availability: Availability::Widely,
        pattern: Some(r"\bstructuredClone\s*\("),
    },
    CatalogEntry {
        id: "js-array-fromasync",
        name: "Array.fromAsync()",
        kind: FileKind::Script,
        construct: ConstructKind::Pattern,
        token: "",
        compat_keys: &["javascript.builtins.Array.fromAsync"],
        availability: Availability::Newly,
        pattern: Some(r"\bArray\.fromAsync\s*\("),
    },
    CatalogEntry {
        id: "js-promise-withresolvers",
        name: "Promise.withResolvers()",
        kind: FileKind::Script,
        construct: ConstructKind::Pattern,
        token: "",
        compat_keys: &["javascript.builtins.Promise.withResolvers"],
        availability: Availability::Newly,
        pattern: Some(r"\bPromise\.withResolvers\s*\("),
    },
    CatalogEntry {
        id: "js-object-groupby",
        name: "Object.groupBy()",
        kind: FileKind::Script,
        construct: ConstructKind::Pattern,
        token: "",
        compat_keys: &["javascript.builtins.Object.groupBy"],
        availability: Availability::Newly,
        pattern: Some(r"\bObject\.groupBy\s*\("),
    },
    CatalogEntry {
        id: "js-async-clipboard",
        name: "Async Clipboard API",
        kind: FileKind::Script,
        construct: ConstructKind::Pattern,
        token: "",
        compat_keys: &["api.Clipboard"],
        availability: Availability::Newly,
        pattern: Some(r"\bnavigator\.clipboard\b"),
    },
    CatalogEntry {
        id: "js-import-attributes",
        name: "Import attributes",
        kind: FileKind::Script,
        construct: ConstructKind::Pattern,
        token: "",
        compat_keys: &["javascript.operators.import.options_parameter"],
        availability: Availability::Limited,
        pattern: Some(r"import\s*\([^)]*,\s*\{"),
    },
    CatalogEntry {
        id: "js-exec-command",
        name: "document.execCommand()",
        kind: FileKind::Script,
        construct: ConstructKind::Pattern,
        token: "",
        compat_keys: &["api.Document.execCommand"],
        availability: Availability::Limited,
        pattern: Some(r"\bdocument\.execCommand\s*\("),
    },
];

/// Look up the catalog entry for a token the rule engine matched.
pub fn entry_for_token(kind: FileKind, construct: ConstructKind, token: &str) -> Option<&'static CatalogEntry> {
    CATALOG
        .iter()
        .find(|e| e.kind == kind && e.construct == construct && !e.token.is_empty() && e.token == token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn availability_meets_targets() {
        assert!(Availability::Widely.meets(Target::Widely));
        assert!(!Availability::Newly.meets(Target::Widely));
        assert!(Availability::Newly.meets(Target::Newly));
        assert!(!Availability::Limited.meets(Target::Newly));
    }

    #[test]
    fn catalog_entries_are_well_formed() {
        for entry in CATALOG {
            assert!(!entry.id.is_empty());
            assert!(!entry.name.is_empty());
            assert!(
                !entry.token.is_empty() || entry.pattern.is_some(),
                "{} is reachable by neither strategy",
                entry.id
            );
        }
    }

    #[test]
    fn catalog_ids_are_unique() {
        let mut ids: Vec<_> = CATALOG.iter().map(|e| e.id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), CATALOG.len());
    }

    #[test]
    fn token_lookup_finds_stylesheet_properties() {
        let entry = entry_for_token(
            FileKind::Stylesheet,
            ConstructKind::Property,
            "view-transition-name",
        )
        .unwrap();
        assert_eq!(entry.id, "css-view-transitions");
    }

    #[test]
    fn token_lookup_misses_unknown_tokens() {
        assert!(entry_for_token(FileKind::Stylesheet, ConstructKind::Property, "color").is_none());
    }
}
