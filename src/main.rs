use anyhow::Result;
use baseliner::baseline;
use baseliner::cli::{self, Commands};
use baseliner::commands::{self, AuditOptions};
use baseliner::config;
use baseliner::core::{AuditReport, Target};
use baseliner::io::{create_writer, export_report, OutputFormat};
use std::fs::File;
use std::path::Path;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = cli::parse_args();

    match cli.command {
        Commands::Audit {
            path,
            target,
            max_files,
            ignore,
            legacy_scripts,
            format,
            output,
            export,
        } => {
            let options = AuditOptions {
                target: target.unwrap_or_else(config::default_target),
                max_files: max_files.unwrap_or_else(config::default_max_files),
                ignore_patterns: ignore,
                include_scripts: legacy_scripts,
            };
            let report = commands::audit_project(&path, &options)?;
            write_report(&report, format, output.as_deref())?;
            if let Some(export_path) = export {
                export_report(&report, &export_path)?;
            }
            Ok(())
        }
        Commands::AuditFile {
            path,
            target,
            legacy_scripts,
            format,
            output,
        } => {
            let options = AuditOptions {
                target: target.unwrap_or_else(config::default_target),
                include_scripts: legacy_scripts,
                ..AuditOptions::default()
            };
            let report = commands::audit_file(&path, &options)?;
            write_report(&report, format, output.as_deref())
        }
        Commands::Status { feature, target } => {
            print_status(&feature, target.unwrap_or_else(config::default_target))
        }
    }
}

fn write_report(report: &AuditReport, format: OutputFormat, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            let file = File::create(path)?;
            create_writer(file, format).write_report(report)?;
            println!("Report written to {}", path.display());
        }
        None => {
            create_writer(std::io::stdout(), format).write_report(report)?;
        }
    }
    Ok(())
}

fn print_status(feature: &str, target: Target) -> Result<()> {
    let resolved = commands::resolve_feature(feature, target);
    println!("{}", resolved.name);
    println!("  compat keys: {}", resolved.compat_keys.join(", "));
    println!("  baseline: {}", resolved.status.baseline);
    if let Some(date) = &resolved.status.baseline_low_date {
        println!("  newly available since: {date}");
    }
    if let Some(date) = &resolved.status.baseline_high_date {
        println!("  widely available since: {date}");
    }
    for (browser, level) in &resolved.status.support {
        println!("  {browser}: {level}");
    }
    println!("  {}", baseline::interpretation(&resolved.status));
    Ok(())
}
