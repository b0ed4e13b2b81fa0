//! Fallback pattern strategy: line-oriented regex checks for known feature
//! syntaxes. Runs on its own when a rule engine is unavailable, and always
//! runs for features outside engine coverage.

use crate::core::{Confidence, FeatureLocation, FileKind, IdentifiedFeature, Target};
use crate::detectors::catalog::{CatalogEntry, CATALOG};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

static COMPILED: Lazy<Vec<(&'static CatalogEntry, Regex)>> = Lazy::new(|| {
    CATALOG
        .iter()
        .filter_map(|entry| {
            let pattern = entry.pattern?;
            match Regex::new(pattern) {
                Ok(re) => Some((entry, re)),
                Err(err) => {
                    log::warn!("invalid fallback pattern for {}: {err}", entry.id);
                    None
                }
            }
        })
        .collect()
});

/// Scan `content` with the pattern catalog for one file kind.
///
/// With `engine_covered` set, entries the rule engine already checks (those
/// with a token) are skipped so the two strategies do not double-report.
/// `line_offset` shifts reported line numbers for embedded blocks.
pub fn scan(
    file: &Path,
    content: &str,
    kind: FileKind,
    target: Target,
    engine_covered: bool,
    line_offset: usize,
) -> Vec<IdentifiedFeature> {
    let mut features = Vec::new();

    for (entry, re) in COMPILED.iter() {
        if entry.kind != kind || entry.availability.meets(target) {
            continue;
        }
        if engine_covered && !entry.token.is_empty() {
            continue;
        }
        for (idx, line) in content.lines().enumerate() {
            for m in re.find_iter(line) {
                features.push(IdentifiedFeature {
                    name: entry.name.to_string(),
                    id: entry.id.to_string(),
                    compat_keys: entry.compat_keys.iter().map(|k| k.to_string()).collect(),
                    token: m.as_str().trim().to_string(),
                    construct: entry.construct,
                    confidence: Confidence::High,
                    location: FeatureLocation::new(
                        file.to_path_buf(),
                        line_offset + idx + 1,
                        m.start() + 1,
                        line,
                    ),
                });
            }
        }
    }

    features
}

/// Replace `//` and `/* */` comments with blanks, preserving line and
/// column positions for everything else.
pub fn strip_script_comments(content: &str) -> String {
    let mut out = String::with_capacity(content.len());
    let mut chars = content.chars().peekable();
    let mut in_line = false;
    let mut in_block = false;
    let mut in_string: Option<char> = None;

    while let Some(c) = chars.next() {
        if in_line {
            if c == '\n' {
                in_line = false;
                out.push('\n');
            } else {
                out.push(' ');
            }
            continue;
        }
        if in_block {
            if c == '*' && matches!(chars.peek(), Some('/')) {
                chars.next();
                out.push_str("  ");
                in_block = false;
            } else {
                out.push(if c == '\n' { '\n' } else { ' ' });
            }
            continue;
        }
        if let Some(quote) = in_string {
            out.push(c);
            if c == '\\' {
                if let Some(next) = chars.next() {
                    out.push(next);
                }
            } else if c == quote {
                in_string = None;
            }
            continue;
        }
        match c {
            '"' | '\'' | '`' => {
                in_string = Some(c);
                out.push(c);
            }
            '/' => match chars.peek() {
                Some('/') => {
                    chars.next();
                    out.push_str("  ");
                    in_line = true;
                }
                Some('*') => {
                    chars.next();
                    out.push_str("  ");
                    in_block = true;
                }
                _ => out.push(c),
            },
            _ => out.push(c),
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    #[test]
    fn subgrid_is_pattern_only_coverage() {
        let css = ".grid { grid-template-columns: subgrid; }";
        let feats = scan(
            Path::new("a.css"),
            css,
            FileKind::Stylesheet,
            Target::Widely,
            true,
            0,
        );
        assert_eq!(feats.len(), 1);
        assert_eq!(feats[0].id, "css-subgrid");
        assert_eq!(feats[0].compat_keys.len(), 2);
    }

    #[test]
    fn engine_covered_entries_are_skipped_when_engine_ran() {
        let css = ".card { view-transition-name: card; }";
        let feats = scan(
            Path::new("a.css"),
            css,
            FileKind::Stylesheet,
            Target::Widely,
            true,
            0,
        );
        assert!(feats.is_empty());

        // When the engine is unavailable, the fallback picks it up.
        let feats = scan(
            Path::new("a.css"),
            css,
            FileKind::Stylesheet,
            Target::Widely,
            false,
            0,
        );
        assert_eq!(feats.len(), 1);
        assert_eq!(feats[0].id, "css-view-transitions");
    }

    #[test]
    fn newly_target_narrows_the_active_set() {
        let js = "const x = a ?? b; import('m.json', { with: { type: 'json' } });";
        let widely = scan(Path::new("a.js"), js, FileKind::Script, Target::Widely, false, 0);
        // Nullish coalescing is widely available: never flagged.
        assert!(widely.iter().all(|f| f.id != "js-nullish-coalescing"));
        assert!(widely.iter().any(|f| f.id == "js-import-attributes"));

        let newly = scan(Path::new("a.js"), js, FileKind::Script, Target::Newly, false, 0);
        assert_eq!(newly.len(), 1);
        assert_eq!(newly[0].id, "js-import-attributes");
    }

    #[test]
    fn line_offset_shifts_embedded_blocks() {
        let css = "text-wrap: balance;";
        let feats = scan(
            Path::new("page.html"),
            css,
            FileKind::Stylesheet,
            Target::Widely,
            true,
            10,
        );
        assert_eq!(feats.len(), 1);
        assert_eq!(feats[0].location.line, 11);
    }

    #[test]
    fn strip_script_comments_preserves_positions() {
        let src = indoc! {"
            // leading comment
            const a = b?.c; /* inline */ const d = e ?? f;
        "};
        let stripped = strip_script_comments(src);
        assert_eq!(stripped.lines().count(), src.lines().count());
        assert!(!stripped.contains("leading"));
        assert!(!stripped.contains("inline"));
        let line2 = stripped.lines().nth(1).unwrap();
        assert_eq!(line2.find("b?.c"), src.lines().nth(1).unwrap().find("b?.c"));
    }

    #[test]
    fn strip_script_comments_leaves_strings_alone() {
        let src = "const url = \"https://example.com\"; // trailing";
        let stripped = strip_script_comments(src);
        assert!(stripped.contains("https://example.com"));
        assert!(!stripped.contains("trailing"));
    }

    #[test]
    fn comment_hidden_features_are_not_detected() {
        let js = "// const v = structuredClone(x);\nconst w = document.execCommand('copy');";
        let stripped = strip_script_comments(js);
        let feats = scan(
            Path::new("a.js"),
            &stripped,
            FileKind::Script,
            Target::Widely,
            false,
            0,
        );
        assert_eq!(feats.len(), 1);
        assert_eq!(feats[0].id, "js-exec-command");
        assert_eq!(feats[0].location.line, 2);
    }
}
