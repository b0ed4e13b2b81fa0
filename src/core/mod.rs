pub mod errors;

pub use errors::{AuditError, AuditResult};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Supported source kinds, each bound to its own detection strategy pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FileKind {
    Stylesheet,
    Markup,
    Script,
}

impl FileKind {
    pub fn from_extension(ext: &str) -> Option<Self> {
        static EXTENSION_MAP: &[(&[&str], FileKind)] = &[
            (&["css", "scss", "sass", "less"], FileKind::Stylesheet),
            (&["html", "htm"], FileKind::Markup),
            (&["js", "jsx", "mjs", "cjs", "ts", "tsx"], FileKind::Script),
        ];

        let ext = ext.to_ascii_lowercase();
        EXTENSION_MAP
            .iter()
            .find(|(exts, _)| exts.contains(&ext.as_str()))
            .map(|(_, kind)| *kind)
    }

    pub fn from_path(path: &std::path::Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            FileKind::Stylesheet => "Stylesheet",
            FileKind::Markup => "Markup",
            FileKind::Script => "Script",
        }
    }
}

/// Audit target: the support maturity a project wants to rely on.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum Target {
    /// Only features interoperable across browsers for 30+ months
    #[default]
    Widely,
    /// Features available in all current browser engines
    Newly,
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Target::Widely => write!(f, "widely"),
            Target::Newly => write!(f, "newly"),
        }
    }
}

/// One file selected for auditing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileDescriptor {
    pub path: PathBuf,
    pub relative_path: PathBuf,
    pub kind: FileKind,
    pub size: u64,
}

/// Read-only per-file input to detection.
#[derive(Debug, Clone)]
pub struct ParseContext {
    pub path: PathBuf,
    pub content: String,
    pub kind: FileKind,
}

impl ParseContext {
    pub fn new(path: PathBuf, content: String, kind: FileKind) -> Self {
        Self {
            path,
            content,
            kind,
        }
    }
}

/// Where a feature was detected. Line and column are 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FeatureLocation {
    pub file: PathBuf,
    pub line: usize,
    pub column: usize,
    pub context: String,
}

impl FeatureLocation {
    pub fn new(file: PathBuf, line: usize, column: usize, context: &str) -> Self {
        Self {
            file,
            line,
            column,
            context: context.trim().to_string(),
        }
    }
}

/// The syntactic construct a detection was anchored to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConstructKind {
    Property,
    AtRule,
    Selector,
    Function,
    Value,
    Element,
    Attribute,
    Pattern,
}

/// Detection confidence tier. Both strategies currently report `High`;
/// graduated scoring would populate the lower tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

/// A single feature usage identified in one file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentifiedFeature {
    pub name: String,
    pub id: String,
    pub compat_keys: Vec<String>,
    pub token: String,
    pub construct: ConstructKind,
    pub confidence: Confidence,
    pub location: FeatureLocation,
}

/// Baseline maturity of a feature's cross-browser support.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BaselineTier {
    #[serde(rename = "high")]
    High,
    #[serde(rename = "low")]
    Low,
    #[serde(rename = "false")]
    False,
}

impl std::fmt::Display for BaselineTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            BaselineTier::High => "high",
            BaselineTier::Low => "low",
            BaselineTier::False => "false",
        };
        write!(f, "{s}")
    }
}

/// Initial browser support: a version string where the data has version
/// granularity, a bare boolean otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SupportLevel {
    Version(String),
    Supported(bool),
}

impl SupportLevel {
    /// Truthy support: a non-empty version string or an explicit `true`.
    pub fn is_supported(&self) -> bool {
        match self {
            SupportLevel::Version(v) => !v.is_empty(),
            SupportLevel::Supported(b) => *b,
        }
    }
}

impl std::fmt::Display for SupportLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SupportLevel::Version(v) => write!(f, "since {v}"),
            SupportLevel::Supported(true) => write!(f, "supported"),
            SupportLevel::Supported(false) => write!(f, "unsupported"),
        }
    }
}

/// Resolved cross-browser support data for one feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaselineStatus {
    pub baseline: BaselineTier,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub baseline_low_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub baseline_high_date: Option<String>,
    pub support: BTreeMap<String, SupportLevel>,
    pub discouraged: bool,
}

impl BaselineStatus {
    /// The deterministic "no data" status used for unmapped features and
    /// failed lookups.
    pub fn no_data() -> Self {
        Self {
            baseline: BaselineTier::False,
            baseline_low_date: None,
            baseline_high_date: None,
            support: BTreeMap::new(),
            discouraged: false,
        }
    }

    /// Whether any resolved browser entry is truthy.
    pub fn has_any_support(&self) -> bool {
        self.support.values().any(SupportLevel::is_supported)
    }
}

/// Reporting-level aggregate: one feature, all its merged locations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureDetection {
    pub feature: String,
    pub locations: Vec<FeatureLocation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<BaselineStatus>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditSummary {
    pub total_features: usize,
    pub widely: usize,
    pub newly: usize,
    pub limited: usize,
    pub unsupported: usize,
    pub baseline_violations: usize,
    pub files_scanned: usize,
}

/// Final, immutable output of one audit pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditReport {
    pub project_path: PathBuf,
    pub target: Target,
    pub timestamp: DateTime<Utc>,
    pub features_detected: Vec<FeatureDetection>,
    pub summary: AuditSummary,
    pub browser_coverage: BTreeMap<String, f64>,
    pub recommendations: Vec<String>,
}

/// The fixed browser set coverage is computed over.
pub const BROWSERS: &[&str] = &["chrome", "edge", "firefox", "safari"];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_kind_from_extension_covers_families() {
        assert_eq!(FileKind::from_extension("css"), Some(FileKind::Stylesheet));
        assert_eq!(FileKind::from_extension("scss"), Some(FileKind::Stylesheet));
        assert_eq!(FileKind::from_extension("HTML"), Some(FileKind::Markup));
        assert_eq!(FileKind::from_extension("tsx"), Some(FileKind::Script));
        assert_eq!(FileKind::from_extension("rs"), None);
    }

    #[test]
    fn file_kind_from_path() {
        assert_eq!(
            FileKind::from_path(std::path::Path::new("a/b/site.less")),
            Some(FileKind::Stylesheet)
        );
        assert_eq!(FileKind::from_path(std::path::Path::new("README")), None);
    }

    #[test]
    fn support_level_truthiness() {
        assert!(SupportLevel::Version("111".into()).is_supported());
        assert!(SupportLevel::Supported(true).is_supported());
        assert!(!SupportLevel::Supported(false).is_supported());
        assert!(!SupportLevel::Version(String::new()).is_supported());
    }

    #[test]
    fn no_data_status_is_empty_and_false() {
        let status = BaselineStatus::no_data();
        assert_eq!(status.baseline, BaselineTier::False);
        assert!(status.support.is_empty());
        assert!(!status.discouraged);
        assert!(!status.has_any_support());
    }

    #[test]
    fn baseline_tier_serializes_as_lowercase_strings() {
        assert_eq!(
            serde_json::to_string(&BaselineTier::High).unwrap(),
            "\"high\""
        );
        assert_eq!(
            serde_json::to_string(&BaselineTier::False).unwrap(),
            "\"false\""
        );
    }

    #[test]
    fn location_context_is_trimmed() {
        let loc = FeatureLocation::new("a.css".into(), 3, 5, "   .a { }   ");
        assert_eq!(loc.context, ".a { }");
    }
}
