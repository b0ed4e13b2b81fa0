//! Built-in rule engines for the stylesheet and markup families.
//!
//! An engine is configured from the audit target at construction time: only
//! constructs whose availability fails the target become active checks, so
//! the target changes what gets flagged rather than filtering afterwards.

use crate::core::{ConstructKind, FileKind, Target};
use crate::detectors::catalog::{Availability, CatalogEntry, CATALOG};
use crate::detectors::diagnostics::{Diagnostic, RuleEngine};
use anyhow::Result;
use regex::Regex;
use std::collections::HashMap;

fn active_entries(kind: FileKind, target: Target) -> Vec<&'static CatalogEntry> {
    CATALOG
        .iter()
        .filter(|e| e.kind == kind && !e.token.is_empty() && !e.availability.meets(target))
        .collect()
}

fn message(construct: ConstructKind, token: &str, availability: Availability) -> String {
    let label = match construct {
        ConstructKind::Property => "Property",
        ConstructKind::AtRule => "At-rule",
        ConstructKind::Selector => "Selector",
        ConstructKind::Function => "Function",
        ConstructKind::Value => "Value",
        ConstructKind::Element => "Element",
        ConstructKind::Attribute => "Attribute",
        ConstructKind::Pattern => "Pattern",
    };
    let token = if construct == ConstructKind::AtRule {
        format!("@{token}")
    } else {
        token.to_string()
    };
    match availability {
        Availability::Newly => {
            format!("{label} '{token}' is newly available and not yet widely supported")
        }
        _ => format!("{label} '{token}' has limited browser availability"),
    }
}

/// Blank out comment interiors so positions stay stable but matches inside
/// comments are suppressed.
fn mask_comments(content: &str, open: &str, close: &str) -> String {
    let mut out = String::with_capacity(content.len());
    let mut rest = content;
    while let Some(start) = rest.find(open) {
        out.push_str(&rest[..start]);
        let after = &rest[start..];
        let end = after.find(close).map(|i| i + close.len()).unwrap_or(after.len());
        for c in after[..end].chars() {
            out.push(if c == '\n' { '\n' } else { ' ' });
        }
        rest = &after[end..];
    }
    out.push_str(rest);
    out
}

pub struct StylesheetRuleEngine {
    properties: HashMap<&'static str, &'static CatalogEntry>,
    at_rules: HashMap<&'static str, &'static CatalogEntry>,
    functions: HashMap<&'static str, &'static CatalogEntry>,
    selectors: Vec<&'static CatalogEntry>,
    property_re: Regex,
    at_rule_re: Regex,
    function_re: Regex,
}

impl StylesheetRuleEngine {
    pub fn new(target: Target) -> Result<Self> {
        let mut properties = HashMap::new();
        let mut at_rules = HashMap::new();
        let mut functions = HashMap::new();
        let mut selectors = Vec::new();

        for entry in active_entries(FileKind::Stylesheet, target) {
            match entry.construct {
                ConstructKind::Property => {
                    properties.insert(entry.token, entry);
                }
                ConstructKind::AtRule => {
                    at_rules.insert(entry.token, entry);
                }
                ConstructKind::Function => {
                    functions.insert(entry.token, entry);
                }
                ConstructKind::Selector => selectors.push(entry),
                _ => {}
            }
        }

        Ok(Self {
            properties,
            at_rules,
            functions,
            selectors,
            property_re: Regex::new(r"(?:^|[;{\s])([A-Za-z-]+)\s*:")?,
            at_rule_re: Regex::new(r"@([A-Za-z-]+)")?,
            function_re: Regex::new(r"([A-Za-z][A-Za-z-]*)\s*\(")?,
        })
    }
}

impl RuleEngine for StylesheetRuleEngine {
    fn scan(&self, content: &str) -> Result<Vec<Diagnostic>> {
        let masked = mask_comments(content, "/*", "*/");
        let mut diagnostics = Vec::new();

        for (idx, line) in masked.lines().enumerate() {
            for caps in self.property_re.captures_iter(line) {
                let m = caps.get(1).ok_or_else(|| anyhow::anyhow!("missing capture"))?;
                if let Some(entry) = self.properties.get(m.as_str()) {
                    diagnostics.push(Diagnostic {
                        message: message(entry.construct, entry.token, entry.availability),
                        line: idx + 1,
                        column: m.start() + 1,
                    });
                }
            }
            for caps in self.at_rule_re.captures_iter(line) {
                let m = caps.get(1).ok_or_else(|| anyhow::anyhow!("missing capture"))?;
                if let Some(entry) = self.at_rules.get(m.as_str()) {
                    diagnostics.push(Diagnostic {
                        message: message(entry.construct, entry.token, entry.availability),
                        line: idx + 1,
                        column: m.start(),
                    });
                }
            }
            for caps in self.function_re.captures_iter(line) {
                let m = caps.get(1).ok_or_else(|| anyhow::anyhow!("missing capture"))?;
                if let Some(entry) = self.functions.get(m.as_str()) {
                    diagnostics.push(Diagnostic {
                        message: message(entry.construct, entry.token, entry.availability),
                        line: idx + 1,
                        column: m.start() + 1,
                    });
                }
            }
            for entry in &self.selectors {
                for (pos, _) in line.match_indices(entry.token) {
                    // Reject prefixes of longer pseudo-class names.
                    let next = line[pos + entry.token.len()..].chars().next();
                    if matches!(next, Some(c) if c.is_ascii_alphanumeric() || c == '-') {
                        continue;
                    }
                    diagnostics.push(Diagnostic {
                        message: message(entry.construct, entry.token, entry.availability),
                        line: idx + 1,
                        column: pos + 1,
                    });
                }
            }
        }

        Ok(diagnostics)
    }
}

pub struct MarkupRuleEngine {
    elements: HashMap<&'static str, &'static CatalogEntry>,
    attributes: Vec<&'static CatalogEntry>,
    element_re: Regex,
    tag_re: Regex,
    attribute_re: Option<Regex>,
}

impl MarkupRuleEngine {
    pub fn new(target: Target) -> Result<Self> {
        let mut elements = HashMap::new();
        let mut attributes = Vec::new();

        for entry in active_entries(FileKind::Markup, target) {
            match entry.construct {
                ConstructKind::Element => {
                    elements.insert(entry.token, entry);
                }
                ConstructKind::Attribute => attributes.push(entry),
                _ => {}
            }
        }

        let attribute_re = if attributes.is_empty() {
            None
        } else {
            let alternation = attributes
                .iter()
                .map(|e| regex::escape(e.token))
                .collect::<Vec<_>>()
                .join("|");
            Some(Regex::new(&format!(r"\b({alternation})\b"))?)
        };

        Ok(Self {
            elements,
            attributes,
            element_re: Regex::new(r"<([A-Za-z][A-Za-z0-9-]*)")?,
            tag_re: Regex::new(r"<[A-Za-z][^<>]*")?,
            attribute_re,
        })
    }
}

/// An attribute name match counts only when it sits between whitespace and
/// an attribute terminator, so tag text like `class="popover"` is not a
/// popover attribute.
fn is_attribute_position(tag: &str, start: usize, end: usize) -> bool {
    let preceded = tag[..start]
        .chars()
        .next_back()
        .is_some_and(char::is_whitespace);
    let followed = match tag[end..].chars().next() {
        None => true,
        Some(c) => c.is_whitespace() || c == '=' || c == '/',
    };
    preceded && followed
}

impl RuleEngine for MarkupRuleEngine {
    fn scan(&self, content: &str) -> Result<Vec<Diagnostic>> {
        let masked = mask_comments(content, "<!--", "-->");
        let mut diagnostics = Vec::new();

        for (idx, line) in masked.lines().enumerate() {
            for caps in self.element_re.captures_iter(line) {
                let m = caps.get(1).ok_or_else(|| anyhow::anyhow!("missing capture"))?;
                let tag = m.as_str().to_ascii_lowercase();
                if let Some(entry) = self.elements.get(tag.as_str()) {
                    diagnostics.push(Diagnostic {
                        message: message(entry.construct, entry.token, entry.availability),
                        line: idx + 1,
                        column: m.start(),
                    });
                }
            }
            // Attributes exist only inside opening tags; prose mentioning
            // an attribute name must not be flagged.
            if let Some(re) = &self.attribute_re {
                for tag in self.tag_re.find_iter(line) {
                    for caps in re.captures_iter(tag.as_str()) {
                        let m = caps.get(1).ok_or_else(|| anyhow::anyhow!("missing capture"))?;
                        if !is_attribute_position(tag.as_str(), m.start(), m.end()) {
                            continue;
                        }
                        if let Some(entry) = self.attributes.iter().find(|e| e.token == m.as_str())
                        {
                            diagnostics.push(Diagnostic {
                                message: message(entry.construct, entry.token, entry.availability),
                                line: idx + 1,
                                column: tag.start() + m.start() + 1,
                            });
                        }
                    }
                }
            }
        }

        Ok(diagnostics)
    }
}
