//! Structured diagnostic contract between rule engines and the detector.
//!
//! Rule engines emit free-text diagnostics. All text-pattern matching over
//! those messages is confined to this adapter; the rest of the pipeline only
//! ever sees `IdentifiedFeature` records.

use crate::core::{Confidence, ConstructKind, FeatureLocation, FileKind, IdentifiedFeature};
use crate::detectors::catalog;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

/// One finding from a rule engine, before identification.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub message: String,
    /// 1-based; 0 means unknown and defaults to 1.
    pub line: usize,
    /// 1-based; 0 means unknown and defaults to 1.
    pub column: usize,
}

/// A pluggable static-analysis rule engine. The active rule set is fixed at
/// construction time from the audit target.
pub trait RuleEngine {
    fn scan(&self, content: &str) -> anyhow::Result<Vec<Diagnostic>>;
}

/// Construct kind and literal token recovered from a diagnostic message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedDiagnostic {
    pub construct: ConstructKind,
    pub token: String,
}

/// Ordered extraction patterns. First match wins, so the more specific
/// at-rule form is tried before the generic quoting forms.
static EXTRACTORS: Lazy<Vec<(Regex, ConstructKind)>> = Lazy::new(|| {
    [
        (r"At-rule '@([^']+)'", ConstructKind::AtRule),
        (r"Property '([^']+)'", ConstructKind::Property),
        (r"Selector '([^']+)'", ConstructKind::Selector),
        (r"Function '([^']+)'", ConstructKind::Function),
        (r"Element '([^']+)'", ConstructKind::Element),
        (r"Attribute '([^']+)'", ConstructKind::Attribute),
        (r"Value '([^']+)'", ConstructKind::Value),
    ]
    .into_iter()
    .filter_map(|(pattern, construct)| Regex::new(pattern).ok().map(|re| (re, construct)))
    .collect()
});

pub fn parse_diagnostic(message: &str) -> Option<ParsedDiagnostic> {
    EXTRACTORS.iter().find_map(|(re, construct)| {
        re.captures(message).map(|caps| ParsedDiagnostic {
            construct: *construct,
            token: caps[1].to_string(),
        })
    })
}

/// Turn an engine diagnostic into an identified feature. Tokens without a
/// catalog mapping still produce a feature, with empty compat keys and a
/// name derived from the token.
pub fn identify(
    diagnostic: &Diagnostic,
    kind: FileKind,
    file: &Path,
    lines: &[&str],
) -> Option<IdentifiedFeature> {
    let parsed = parse_diagnostic(&diagnostic.message)?;
    let line = diagnostic.line.max(1);
    let column = diagnostic.column.max(1);
    let context = lines.get(line - 1).copied().unwrap_or_default();
    let location = FeatureLocation::new(file.to_path_buf(), line, column, context);

    let feature = match catalog::entry_for_token(kind, parsed.construct, &parsed.token) {
        Some(entry) => IdentifiedFeature {
            name: entry.name.to_string(),
            id: entry.id.to_string(),
            compat_keys: entry.compat_keys.iter().map(|k| k.to_string()).collect(),
            token: parsed.token,
            construct: parsed.construct,
            confidence: Confidence::High,
            location,
        },
        None => IdentifiedFeature {
            name: derived_name(parsed.construct, &parsed.token),
            id: derived_id(parsed.construct, &parsed.token),
            compat_keys: Vec::new(),
            token: parsed.token,
            construct: parsed.construct,
            confidence: Confidence::High,
            location,
        },
    };
    Some(feature)
}

fn derived_name(construct: ConstructKind, token: &str) -> String {
    match construct {
        ConstructKind::Property => format!("CSS property '{token}'"),
        ConstructKind::AtRule => format!("CSS at-rule '@{token}'"),
        ConstructKind::Selector => format!("CSS selector '{token}'"),
        ConstructKind::Function => format!("CSS function '{token}()'"),
        ConstructKind::Value => format!("CSS value '{token}'"),
        ConstructKind::Element => format!("HTML element '<{token}>'"),
        ConstructKind::Attribute => format!("HTML attribute '{token}'"),
        ConstructKind::Pattern => format!("Syntax pattern '{token}'"),
    }
}

fn derived_id(construct: ConstructKind, token: &str) -> String {
    let prefix = match construct {
        ConstructKind::Element | ConstructKind::Attribute => "html",
        ConstructKind::Pattern => "js",
        _ => "css",
    };
    let slug: String = token
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
        .collect();
    format!("{prefix}-{}", slug.trim_matches('-'))
}
