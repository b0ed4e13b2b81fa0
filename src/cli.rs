use crate::core::Target;
use crate::io::OutputFormat;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "baseliner")]
#[command(about = "Audit web projects for Baseline browser compatibility", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Audit every stylesheet and markup file under a project directory
    Audit {
        /// Project directory to audit
        path: PathBuf,

        /// Baseline target the project should meet
        #[arg(long, short, value_enum)]
        target: Option<Target>,

        /// Maximum number of files to audit
        #[arg(long)]
        max_files: Option<usize>,

        /// Additional ignore patterns (repeatable)
        #[arg(long, short)]
        ignore: Vec<String>,

        /// Also audit script files and embedded script blocks
        #[arg(long)]
        legacy_scripts: bool,

        /// Output format
        #[arg(long, short, value_enum, default_value = "terminal")]
        format: OutputFormat,

        /// Write the report to a file instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Additionally export the report as JSON to this path
        #[arg(long)]
        export: Option<PathBuf>,
    },

    /// Audit a single file
    AuditFile {
        /// File to audit (.css, .html, or script extensions with --legacy-scripts)
        path: PathBuf,

        /// Baseline target the file should meet
        #[arg(long, short, value_enum)]
        target: Option<Target>,

        /// Allow script files and embedded script blocks
        #[arg(long)]
        legacy_scripts: bool,

        /// Output format
        #[arg(long, short, value_enum, default_value = "terminal")]
        format: OutputFormat,

        /// Write the report to a file instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Show the baseline standing of a feature id or compat key
    Status {
        /// Feature id (e.g. css-has-selector) or compat key (e.g. css.properties.zoom)
        feature: String,

        /// Baseline target to evaluate against
        #[arg(long, short, value_enum)]
        target: Option<Target>,
    },
}

pub fn parse_args() -> Cli {
    Cli::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn audit_accepts_target_and_ignores() {
        let cli = Cli::try_parse_from([
            "baseliner", "audit", "web/", "--target", "newly", "-i", "*.gen.css", "-i", "legacy",
        ])
        .unwrap();
        match cli.command {
            Commands::Audit { path, target, ignore, .. } => {
                assert_eq!(path, PathBuf::from("web/"));
                assert_eq!(target, Some(Target::Newly));
                assert_eq!(ignore, vec!["*.gen.css".to_string(), "legacy".to_string()]);
            }
            _ => panic!("expected audit subcommand"),
        }
    }

    #[test]
    fn status_takes_a_feature_query() {
        let cli = Cli::try_parse_from(["baseliner", "status", "css-has-selector"]).unwrap();
        match cli.command {
            Commands::Status { feature, target } => {
                assert_eq!(feature, "css-has-selector");
                assert_eq!(target, None);
            }
            _ => panic!("expected status subcommand"),
        }
    }
}
