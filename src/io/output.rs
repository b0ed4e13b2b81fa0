use crate::core::errors::{AuditError, AuditResult};
use crate::core::AuditReport;
use crate::report::compatibility_score;
use colored::*;
use std::io::Write;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Terminal,
    Json,
}

pub trait ReportWriter {
    fn write_report(&mut self, report: &AuditReport) -> anyhow::Result<()>;
}

pub struct JsonWriter<W: Write> {
    writer: W,
}

impl<W: Write> JsonWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write> ReportWriter for JsonWriter<W> {
    fn write_report(&mut self, report: &AuditReport) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(report)?;
        self.writer.write_all(json.as_bytes())?;
        writeln!(self.writer)?;
        Ok(())
    }
}

pub struct TerminalWriter<W: Write> {
    writer: W,
}

impl<W: Write> TerminalWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write> ReportWriter for TerminalWriter<W> {
    fn write_report(&mut self, report: &AuditReport) -> anyhow::Result<()> {
        let score = compatibility_score(&report.summary);
        let score_str = format!("{score:.1}%");
        let colored_score = if score >= 80.0 {
            score_str.green()
        } else if score >= 60.0 {
            score_str.yellow()
        } else {
            score_str.red()
        };

        writeln!(self.writer, "{}", "Baseline Compatibility Report".bold())?;
        writeln!(self.writer, "  Project: {}", report.project_path.display())?;
        writeln!(self.writer, "  Target:  {}", report.target)?;
        writeln!(self.writer, "  Score:   {colored_score}")?;
        writeln!(self.writer)?;

        let s = &report.summary;
        writeln!(
            self.writer,
            "Features: {} across {} files ({} baseline violations)",
            s.total_features, s.files_scanned, s.baseline_violations
        )?;
        writeln!(
            self.writer,
            "  widely {}  newly {}  limited {}  no data {}",
            s.widely, s.newly, s.limited, s.unsupported
        )?;
        writeln!(self.writer)?;

        writeln!(self.writer, "Browser coverage:")?;
        for (browser, coverage) in &report.browser_coverage {
            let line = format!("  {browser:<8} {coverage:.1}%");
            if *coverage >= 90.0 {
                writeln!(self.writer, "{}", line.green())?;
            } else if *coverage >= 80.0 {
                writeln!(self.writer, "{line}")?;
            } else {
                writeln!(self.writer, "{}", line.red())?;
            }
        }

        if !report.features_detected.is_empty() {
            writeln!(self.writer)?;
            writeln!(self.writer, "Detections:")?;
            for detection in &report.features_detected {
                let tier = detection
                    .status
                    .as_ref()
                    .map(|s| match crate::report::classify(Some(s)) {
                        crate::report::SupportTier::Widely => "widely",
                        crate::report::SupportTier::Newly => "newly",
                        crate::report::SupportTier::Limited => "limited",
                        crate::report::SupportTier::Unsupported => "no data",
                    })
                    .unwrap_or("no data");
                writeln!(
                    self.writer,
                    "  {} [{}] x{}",
                    detection.feature.bold(),
                    tier,
                    detection.locations.len()
                )?;
                for location in &detection.locations {
                    writeln!(
                        self.writer,
                        "    {}:{}:{}  {}",
                        location.file.display(),
                        location.line,
                        location.column,
                        location.context.dimmed()
                    )?;
                }
            }
        }

        writeln!(self.writer)?;
        writeln!(self.writer, "Recommendations:")?;
        for action in &report.recommendations {
            writeln!(self.writer, "  - {action}")?;
        }

        Ok(())
    }
}

pub fn create_writer<W: Write + 'static>(writer: W, format: OutputFormat) -> Box<dyn ReportWriter> {
    match format {
        OutputFormat::Json => Box::new(JsonWriter::new(writer)),
        OutputFormat::Terminal => Box::new(TerminalWriter::new(writer)),
    }
}

/// Serialize the report as indented JSON to `path`, creating parent
/// directories. Failure never disturbs the in-memory report.
pub fn export_report(report: &AuditReport, path: &Path) -> AuditResult<()> {
    let to_export_err = |source: std::io::Error| AuditError::Export {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(to_export_err)?;
        }
    }
    let json = serde_json::to_string_pretty(report)
        .map_err(|err| to_export_err(std::io::Error::other(err)))?;
    std::fs::write(path, json).map_err(to_export_err)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Target;
    use crate::report::build_report;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn sample_report() -> AuditReport {
        build_report(Path::new("/proj"), Target::Widely, Vec::new(), 0)
    }

    #[test]
    fn json_writer_emits_valid_report_json() {
        let mut buffer = Vec::new();
        JsonWriter::new(&mut buffer)
            .write_report(&sample_report())
            .unwrap();
        let parsed: AuditReport = serde_json::from_slice(&buffer).unwrap();
        assert_eq!(parsed.summary.total_features, 0);
    }

    #[test]
    fn terminal_writer_mentions_score_and_recommendations() {
        let mut buffer = Vec::new();
        TerminalWriter::new(&mut buffer)
            .write_report(&sample_report())
            .unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert!(text.contains("100.0%"));
        assert!(text.contains("Recommendations"));
    }

    #[test]
    fn export_creates_parent_directories() {
        let tmp = TempDir::new().unwrap();
        let target = tmp.path().join("nested/deeper/report.json");
        export_report(&sample_report(), &target).unwrap();
        let written = std::fs::read_to_string(&target).unwrap();
        let parsed: AuditReport = serde_json::from_str(&written).unwrap();
        assert_eq!(parsed.project_path, PathBuf::from("/proj"));
    }

    #[test]
    fn export_to_unwritable_path_surfaces_the_path() {
        let report = sample_report();
        let err = export_report(&report, Path::new("/dev/null/not-a-dir/report.json"))
            .unwrap_err();
        assert!(err.to_string().contains("report.json"));
    }
}
