pub mod catalog;
pub mod diagnostics;
pub mod patterns;
pub mod rules;

use crate::core::{FileKind, IdentifiedFeature, ParseContext, Target};
use diagnostics::RuleEngine;
use once_cell::sync::Lazy;
use once_cell::unsync::OnceCell;
use regex::Regex;
use rules::{MarkupRuleEngine, StylesheetRuleEngine};
use std::path::Path;

static STYLE_BLOCK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<style[^>]*>(.*?)</style>").expect("static regex"));
static SCRIPT_BLOCK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<script[^>]*>(.*?)</script>").expect("static regex"));

/// Line and column offsets of an embedded block that starts at byte
/// `start` of `content`. The column shift applies only to the block's
/// first line; later lines start at column 1 of the enclosing file.
fn block_offsets(content: &str, start: usize) -> (usize, usize) {
    let before = &content[..start];
    let line_offset = before.matches('\n').count();
    let column_shift = start - before.rfind('\n').map_or(0, |i| i + 1);
    (line_offset, column_shift)
}

fn shift_first_line(
    features: &mut [IdentifiedFeature],
    first_line: usize,
    column_shift: usize,
) {
    for feature in features {
        if feature.location.line == first_line {
            feature.location.column += column_shift;
        }
    }
}

/// Per-file feature detection, dispatching on file kind to a rule-engine
/// strategy plus a fallback pattern strategy.
///
/// Rule engines are built lazily on first use and memoized for the lifetime
/// of the detector. Detection never fails: engine problems degrade to the
/// fallback strategy for that file.
pub struct FeatureDetector {
    target: Target,
    include_scripts: bool,
    stylesheet_engine: OnceCell<Option<StylesheetRuleEngine>>,
    markup_engine: OnceCell<Option<MarkupRuleEngine>>,
}

impl FeatureDetector {
    pub fn new(target: Target) -> Self {
        Self {
            target,
            include_scripts: false,
            stylesheet_engine: OnceCell::new(),
            markup_engine: OnceCell::new(),
        }
    }

    /// Legacy configuration: also detect features in script files and
    /// embedded script blocks.
    pub fn with_scripts(mut self, include_scripts: bool) -> Self {
        self.include_scripts = include_scripts;
        self
    }

    pub fn detect(&self, ctx: &ParseContext) -> Vec<IdentifiedFeature> {
        let mut features = match ctx.kind {
            FileKind::Stylesheet => self.detect_stylesheet(&ctx.path, &ctx.content, 0),
            FileKind::Markup => self.detect_markup(ctx),
            FileKind::Script => {
                if self.include_scripts {
                    self.detect_script(&ctx.path, &ctx.content, 0)
                } else {
                    Vec::new()
                }
            }
        };
        // Source order within the file, regardless of which strategy found
        // the feature first.
        features.sort_by_key(|f| (f.location.line, f.location.column));
        features
    }

    fn stylesheet_engine(&self) -> Option<&StylesheetRuleEngine> {
        self.stylesheet_engine
            .get_or_init(|| match StylesheetRuleEngine::new(self.target) {
                Ok(engine) => Some(engine),
                Err(err) => {
                    log::warn!("stylesheet rule engine failed to initialize: {err}");
                    None
                }
            })
            .as_ref()
    }

    fn markup_engine(&self) -> Option<&MarkupRuleEngine> {
        self.markup_engine
            .get_or_init(|| match MarkupRuleEngine::new(self.target) {
                Ok(engine) => Some(engine),
                Err(err) => {
                    log::warn!("markup rule engine failed to initialize: {err}");
                    None
                }
            })
            .as_ref()
    }

    fn detect_stylesheet(
        &self,
        file: &Path,
        content: &str,
        line_offset: usize,
    ) -> Vec<IdentifiedFeature> {
        let lines: Vec<&str> = content.lines().collect();
        let mut features = Vec::new();

        let engine_ran = match self.stylesheet_engine() {
            Some(engine) => match engine.scan(content) {
                Ok(diags) => {
                    for diag in &diags {
                        if let Some(mut feature) =
                            diagnostics::identify(diag, FileKind::Stylesheet, file, &lines)
                        {
                            feature.location.line += line_offset;
                            features.push(feature);
                        }
                    }
                    true
                }
                Err(err) => {
                    log::warn!("stylesheet analysis failed for {}: {err}", file.display());
                    false
                }
            },
            None => false,
        };

        features.extend(patterns::scan(
            file,
            content,
            FileKind::Stylesheet,
            self.target,
            engine_ran,
            line_offset,
        ));
        features
    }

    fn detect_markup(&self, ctx: &ParseContext) -> Vec<IdentifiedFeature> {
        let lines: Vec<&str> = ctx.content.lines().collect();
        let mut features = Vec::new();

        let engine_ran = match self.markup_engine() {
            Some(engine) => match engine.scan(&ctx.content) {
                Ok(diags) => {
                    for diag in &diags {
                        if let Some(feature) =
                            diagnostics::identify(diag, FileKind::Markup, &ctx.path, &lines)
                        {
                            features.push(feature);
                        }
                    }
                    true
                }
                Err(err) => {
                    log::warn!("markup analysis failed for {}: {err}", ctx.path.display());
                    false
                }
            },
            None => false,
        };

        features.extend(patterns::scan(
            &ctx.path,
            &ctx.content,
            FileKind::Markup,
            self.target,
            engine_ran,
            0,
        ));

        // Embedded stylesheet blocks get the full stylesheet strategy pair.
        for caps in STYLE_BLOCK_RE.captures_iter(&ctx.content) {
            if let Some(inner) = caps.get(1) {
                let (line_offset, column_shift) = block_offsets(&ctx.content, inner.start());
                let mut embedded =
                    self.detect_stylesheet(&ctx.path, inner.as_str(), line_offset);
                shift_first_line(&mut embedded, line_offset + 1, column_shift);
                features.extend(embedded);
            }
        }

        if self.include_scripts {
            for caps in SCRIPT_BLOCK_RE.captures_iter(&ctx.content) {
                if let Some(inner) = caps.get(1) {
                    let (line_offset, column_shift) = block_offsets(&ctx.content, inner.start());
                    let mut embedded = self.detect_script(&ctx.path, inner.as_str(), line_offset);
                    shift_first_line(&mut embedded, line_offset + 1, column_shift);
                    features.extend(embedded);
                }
            }
        }

        features
    }

    fn detect_script(
        &self,
        file: &Path,
        content: &str,
        line_offset: usize,
    ) -> Vec<IdentifiedFeature> {
        let stripped = patterns::strip_script_comments(content);
        patterns::scan(
            file,
            &stripped,
            FileKind::Script,
            self.target,
            false,
            line_offset,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use std::path::PathBuf;

    fn ctx(path: &str, content: &str, kind: FileKind) -> ParseContext {
        ParseContext::new(PathBuf::from(path), content.to_string(), kind)
    }

    #[test]
    fn stylesheet_detection_reports_view_transitions() {
        let detector = FeatureDetector::new(Target::Widely);
        let css = indoc! {"
            .card {
              view-transition-name: card;
            }
        "};
        let features = detector.detect(&ctx("a.css", css, FileKind::Stylesheet));
        assert_eq!(features.len(), 1);
        assert!(features[0].name.contains("View transitions"));
        assert_eq!(features[0].location.line, 2);
        assert_eq!(features[0].location.context, "view-transition-name: card;");
    }

    #[test]
    fn plain_stylesheet_yields_no_features() {
        let detector = FeatureDetector::new(Target::Widely);
        let features = detector.detect(&ctx("a.css", ".basic { color: red; }", FileKind::Stylesheet));
        assert!(features.is_empty());
    }

    #[test]
    fn markup_detection_reports_search_element_once() {
        let detector = FeatureDetector::new(Target::Widely);
        let html = "<search><input type=\"search\"></search>";
        let features = detector.detect(&ctx("page.html", html, FileKind::Markup));
        assert_eq!(features.len(), 1);
        assert_eq!(features[0].id, "html-search-element");
    }

    #[test]
    fn script_detection_requires_legacy_mode() {
        let js = "const v = structuredClone(x); document.execCommand('copy');";

        let detector = FeatureDetector::new(Target::Widely);
        assert!(detector.detect(&ctx("a.js", js, FileKind::Script)).is_empty());

        let detector = FeatureDetector::new(Target::Widely).with_scripts(true);
        let features = detector.detect(&ctx("a.js", js, FileKind::Script));
        assert_eq!(features.len(), 1);
        assert_eq!(features[0].id, "js-exec-command");
    }

    #[test]
    fn embedded_style_blocks_are_scanned_with_offsets() {
        let detector = FeatureDetector::new(Target::Widely);
        let html = indoc! {"
            <html>
            <style>
              .card { view-transition-name: card; }
            </style>
            <body><p>hi</p></body>
            </html>
        "};
        let features = detector.detect(&ctx("page.html", html, FileKind::Markup));
        assert_eq!(features.len(), 1);
        assert_eq!(features[0].id, "css-view-transitions");
        assert_eq!(features[0].location.line, 3);
    }

    #[test]
    fn single_line_style_blocks_report_file_columns() {
        let detector = FeatureDetector::new(Target::Widely);
        let html = "<div></div><style>.a { view-transition-name: x; }</style>";
        let features = detector.detect(&ctx("page.html", html, FileKind::Markup));
        assert_eq!(features.len(), 1);
        assert_eq!(features[0].location.line, 1);
        assert_eq!(
            features[0].location.column,
            html.find("view-transition-name").unwrap() + 1
        );
    }

    #[test]
    fn embedded_script_blocks_only_in_legacy_mode() {
        let html = "<script>const v = document.execCommand('bold');</script>";

        let detector = FeatureDetector::new(Target::Widely);
        assert!(detector.detect(&ctx("p.html", html, FileKind::Markup)).is_empty());

        let detector = FeatureDetector::new(Target::Widely).with_scripts(true);
        let features = detector.detect(&ctx("p.html", html, FileKind::Markup));
        assert_eq!(features.len(), 1);
        assert_eq!(features[0].id, "js-exec-command");
    }

    #[test]
    fn detections_are_in_source_order() {
        let detector = FeatureDetector::new(Target::Widely);
        let css = indoc! {"
            .grid { grid-template-columns: subgrid; }
            .card { view-transition-name: card; }
            .x:has(.y) { color: red; }
        "};
        let features = detector.detect(&ctx("a.css", css, FileKind::Stylesheet));
        let lines: Vec<usize> = features.iter().map(|f| f.location.line).collect();
        let mut sorted = lines.clone();
        sorted.sort();
        assert_eq!(lines, sorted);
        assert_eq!(features.len(), 3);
    }
}
