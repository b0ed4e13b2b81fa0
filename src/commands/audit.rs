//! Audit orchestration: collect, detect, resolve, aggregate.
//!
//! Files run strictly sequentially; one file is fully processed before the
//! next begins. A file that cannot be read or analyzed contributes zero
//! features and never fails the audit.

use crate::baseline::BaselineResolver;
use crate::core::errors::{AuditError, AuditResult};
use crate::core::{
    AuditReport, FeatureDetection, FileDescriptor, FileKind, ParseContext, Target,
};
use crate::detectors::FeatureDetector;
use crate::io::FileCollector;
use crate::report;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct AuditOptions {
    pub target: Target,
    pub max_files: usize,
    pub ignore_patterns: Vec<String>,
    /// Legacy mode: also audit script files and embedded script blocks.
    pub include_scripts: bool,
}

impl Default for AuditOptions {
    fn default() -> Self {
        Self {
            target: crate::config::default_target(),
            max_files: crate::config::default_max_files(),
            ignore_patterns: Vec::new(),
            include_scripts: false,
        }
    }
}

/// Audit every supported file under `path`.
pub fn audit_project(path: &Path, options: &AuditOptions) -> AuditResult<AuditReport> {
    if !path.exists() {
        return Err(AuditError::PathNotFound(path.to_path_buf()));
    }
    if !path.is_dir() {
        return Err(AuditError::NotADirectory(path.to_path_buf()));
    }

    let mut kinds = vec![FileKind::Stylesheet, FileKind::Markup];
    if options.include_scripts {
        kinds.push(FileKind::Script);
    }

    let files = FileCollector::new(path.to_path_buf())
        .with_max_files(options.max_files)
        .with_kinds(kinds)
        .with_ignore_patterns(options.ignore_patterns.clone())
        .collect();

    log::debug!("collected {} files under {}", files.len(), path.display());
    Ok(run_pipeline(path, &files, options))
}

/// Audit one file. The path must exist, be a regular file, and have a
/// supported extension.
pub fn audit_file(path: &Path, options: &AuditOptions) -> AuditResult<AuditReport> {
    if !path.exists() {
        return Err(AuditError::PathNotFound(path.to_path_buf()));
    }
    if !path.is_file() {
        return Err(AuditError::NotAFile(path.to_path_buf()));
    }
    let unsupported = || AuditError::UnsupportedExtension {
        path: path.to_path_buf(),
        extension: path
            .extension()
            .map(|e| e.to_string_lossy().into_owned())
            .unwrap_or_default(),
    };
    let kind = FileKind::from_path(path).ok_or_else(unsupported)?;
    // Script files are only auditable in legacy mode; without it the
    // pipeline has no script engine and the report would be empty.
    if kind == FileKind::Script && !options.include_scripts {
        return Err(unsupported());
    }

    let size = std::fs::metadata(path)
        .map_err(|source| AuditError::Read {
            path: path.to_path_buf(),
            source,
        })?
        .len();
    let descriptor = FileDescriptor {
        path: path.to_path_buf(),
        relative_path: path
            .file_name()
            .map(Into::into)
            .unwrap_or_else(|| path.to_path_buf()),
        kind,
        size,
    };

    let root = path.parent().unwrap_or(path);
    Ok(run_pipeline(root, &[descriptor], options))
}

fn run_pipeline(root: &Path, files: &[FileDescriptor], options: &AuditOptions) -> AuditReport {
    let detector = FeatureDetector::new(options.target).with_scripts(options.include_scripts);
    let mut resolver = BaselineResolver::new();
    let mut detections: Vec<FeatureDetection> = Vec::new();

    for descriptor in files {
        let content = match std::fs::read(&descriptor.path) {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(err) => {
                log::warn!("could not read {}: {err}", descriptor.path.display());
                continue;
            }
        };

        let ctx = ParseContext::new(descriptor.relative_path.clone(), content, descriptor.kind);
        for feature in detector.detect(&ctx) {
            let status = resolver.resolve(&feature.compat_keys, options.target);
            detections.push(report::to_detection(&feature, Some(status)));
        }
    }

    report::build_report(root, options.target, detections, files.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn options() -> AuditOptions {
        AuditOptions {
            target: Target::Widely,
            max_files: 100,
            ignore_patterns: Vec::new(),
            include_scripts: false,
        }
    }

    #[test]
    fn missing_path_is_rejected_before_any_work() {
        let err = audit_project(Path::new("/no/such/project"), &options()).unwrap_err();
        assert!(matches!(err, AuditError::PathNotFound(_)));
    }

    #[test]
    fn file_path_is_not_a_project() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("a.css");
        fs::write(&file, ".a {}").unwrap();
        let err = audit_project(&file, &options()).unwrap_err();
        assert!(matches!(err, AuditError::NotADirectory(_)));
    }

    #[test]
    fn audit_file_rejects_unsupported_extensions() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("notes.txt");
        fs::write(&file, "hello").unwrap();
        let err = audit_file(&file, &options()).unwrap_err();
        assert!(matches!(err, AuditError::UnsupportedExtension { .. }));
    }

    #[test]
    fn audit_file_rejects_scripts_unless_legacy() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("app.js");
        fs::write(&file, "document.execCommand('copy');").unwrap();

        let err = audit_file(&file, &options()).unwrap_err();
        assert!(matches!(err, AuditError::UnsupportedExtension { .. }));

        let mut legacy = options();
        legacy.include_scripts = true;
        let report = audit_file(&file, &legacy).unwrap();
        assert_eq!(report.summary.files_scanned, 1);
        assert_eq!(report.summary.total_features, 1);
    }

    #[test]
    fn clean_stylesheet_scores_perfectly() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("basic.css"), ".basic { color: red; }").unwrap();

        let report = audit_project(tmp.path(), &options()).unwrap();
        assert_eq!(report.summary.total_features, 0);
        assert_eq!(report.summary.files_scanned, 1);
        assert_eq!(crate::report::compatibility_score(&report.summary), 100.0);
    }

    #[test]
    fn detected_features_carry_resolved_statuses() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("card.css"),
            ".card { view-transition-name: card; }",
        )
        .unwrap();

        let report = audit_project(tmp.path(), &options()).unwrap();
        assert_eq!(report.summary.total_features, 1);
        let detection = &report.features_detected[0];
        assert!(detection.feature.contains("View transitions"));
        let status = detection.status.as_ref().unwrap();
        assert!(status.support.contains_key("chrome"));
        assert_eq!(report.summary.limited, 1);
        assert_eq!(report.summary.baseline_violations, 1);
    }

    #[test]
    fn script_files_are_excluded_unless_legacy() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("app.js"), "document.execCommand('copy');").unwrap();

        let report = audit_project(tmp.path(), &options()).unwrap();
        assert_eq!(report.summary.files_scanned, 0);

        let mut legacy = options();
        legacy.include_scripts = true;
        let report = audit_project(tmp.path(), &legacy).unwrap();
        assert_eq!(report.summary.files_scanned, 1);
        assert_eq!(report.summary.total_features, 1);
    }

    #[test]
    fn audit_file_builds_a_single_file_report() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("page.html");
        fs::write(&file, "<search><input type=\"search\"></search>").unwrap();

        let report = audit_file(&file, &options()).unwrap();
        assert_eq!(report.summary.files_scanned, 1);
        assert_eq!(report.summary.total_features, 1);
        assert_eq!(report.features_detected[0].feature, "<search> element");
    }
}
