pub mod output;
pub mod walker;

pub use output::{create_writer, export_report, OutputFormat, ReportWriter};
pub use walker::FileCollector;
