//! Aggregation and report assembly: deduplication, tier classification,
//! browser coverage, scoring and recommendations.

use crate::core::{
    AuditReport, AuditSummary, BaselineStatus, BaselineTier, FeatureDetection, FeatureLocation,
    IdentifiedFeature, Target, BROWSERS,
};
use chrono::Utc;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};

/// Support maturity of one detection, derived from its resolved status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupportTier {
    Widely,
    Newly,
    Limited,
    Unsupported,
}

pub fn classify(status: Option<&BaselineStatus>) -> SupportTier {
    match status {
        Some(s) => match s.baseline {
            BaselineTier::High => SupportTier::Widely,
            BaselineTier::Low => SupportTier::Newly,
            BaselineTier::False => {
                if s.has_any_support() {
                    SupportTier::Limited
                } else {
                    SupportTier::Unsupported
                }
            }
        },
        None => SupportTier::Unsupported,
    }
}

fn violates(tier: SupportTier, target: Target) -> bool {
    match target {
        Target::Widely => tier != SupportTier::Widely,
        Target::Newly => matches!(tier, SupportTier::Limited | SupportTier::Unsupported),
    }
}

pub fn to_detection(feature: &IdentifiedFeature, status: Option<BaselineStatus>) -> FeatureDetection {
    FeatureDetection {
        feature: feature.name.clone(),
        locations: vec![feature.location.clone()],
        status,
    }
}

fn merge_key(detection: &FeatureDetection) -> (PathBuf, usize, String) {
    let (file, line) = detection
        .locations
        .first()
        .map(|loc| (loc.file.clone(), loc.line))
        .unwrap_or_default();
    (file, line, detection.feature.clone())
}

/// Merge detections sharing (file, line, feature name). Location lists are
/// unioned with exact (file, line, column) duplicates suppressed; the first
/// non-empty status wins. First-seen order is preserved, which makes the
/// operation idempotent.
pub fn dedupe(detections: Vec<FeatureDetection>) -> Vec<FeatureDetection> {
    let mut merged: Vec<FeatureDetection> = Vec::new();
    let mut index: HashMap<(PathBuf, usize, String), usize> = HashMap::new();
    let mut seen: HashSet<(PathBuf, usize, usize, String)> = HashSet::new();

    for detection in detections {
        let key = merge_key(&detection);
        let slot = *index.entry(key).or_insert_with(|| {
            merged.push(FeatureDetection {
                feature: detection.feature.clone(),
                locations: Vec::new(),
                status: None,
            });
            merged.len() - 1
        });

        for location in detection.locations {
            let loc_key = (
                location.file.clone(),
                location.line,
                location.column,
                detection.feature.clone(),
            );
            if seen.insert(loc_key) {
                merged[slot].locations.push(location);
            }
        }
        if merged[slot].status.is_none() {
            merged[slot].status = detection.status;
        }
    }

    merged
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Percentage of detections each fixed browser supports. Vacuously 100 for
/// every browser when nothing was detected.
pub fn browser_coverage(detections: &[FeatureDetection]) -> BTreeMap<String, f64> {
    let total = detections.len();
    BROWSERS
        .iter()
        .map(|browser| {
            let coverage = if total == 0 {
                100.0
            } else {
                let supported = detections
                    .iter()
                    .filter(|d| {
                        d.status
                            .as_ref()
                            .and_then(|s| s.support.get(*browser))
                            .map(|level| level.is_supported())
                            .unwrap_or(false)
                    })
                    .count();
                round1(supported as f64 / total as f64 * 100.0)
            };
            (browser.to_string(), coverage)
        })
        .collect()
}

pub fn summarize(
    detections: &[FeatureDetection],
    target: Target,
    files_scanned: usize,
) -> AuditSummary {
    let mut summary = AuditSummary {
        total_features: detections.len(),
        widely: 0,
        newly: 0,
        limited: 0,
        unsupported: 0,
        baseline_violations: 0,
        files_scanned,
    };

    for detection in detections {
        let tier = classify(detection.status.as_ref());
        match tier {
            SupportTier::Widely => summary.widely += 1,
            SupportTier::Newly => summary.newly += 1,
            SupportTier::Limited => summary.limited += 1,
            SupportTier::Unsupported => summary.unsupported += 1,
        }
        if violates(tier, target) {
            summary.baseline_violations += 1;
        }
    }

    summary
}

/// Weighted compatibility score on a 0-100 scale, one decimal place.
/// Defined as 100 when nothing was detected.
pub fn compatibility_score(summary: &AuditSummary) -> f64 {
    if summary.total_features == 0 {
        return 100.0;
    }
    let weighted = summary.widely as f64 * 1.0
        + summary.newly as f64 * 0.8
        + summary.limited as f64 * 0.4;
    round1(weighted / summary.total_features as f64 * 100.0)
}

pub fn recommendations(
    summary: &AuditSummary,
    coverage: &BTreeMap<String, f64>,
) -> Vec<String> {
    let mut actions = Vec::new();

    if summary.limited + summary.unsupported > 0 {
        actions.push(
            "Add polyfills or fallback implementations for features with limited support"
                .to_string(),
        );
        actions.push("Test in older browser versions before shipping".to_string());
    }
    if summary.newly > 0 {
        actions.push(
            "Monitor browser releases and consider progressive enhancement for newly available features"
                .to_string(),
        );
    }

    // Call out the weakest browser when it drops below 80%.
    if let Some((browser, worst)) = coverage
        .iter()
        .min_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal))
    {
        if *worst < 80.0 {
            actions.push(format!(
                "Weakest support is {browser} at {worst:.1}% coverage; verify affected pages there"
            ));
        }
    }

    if actions.is_empty() {
        actions.push("No compatibility issues detected".to_string());
    }

    actions
}

/// Assemble the final immutable report from raw per-file detections.
pub fn build_report(
    project_path: &Path,
    target: Target,
    detections: Vec<FeatureDetection>,
    files_scanned: usize,
) -> AuditReport {
    let features_detected = dedupe(detections);
    let summary = summarize(&features_detected, target, files_scanned);
    let browser_coverage = browser_coverage(&features_detected);
    let recommendations = recommendations(&summary, &browser_coverage);

    AuditReport {
        project_path: project_path.to_path_buf(),
        target,
        timestamp: Utc::now(),
        features_detected,
        summary,
        browser_coverage,
        recommendations,
    }
}
