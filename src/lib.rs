pub mod baseline;
pub mod cli;
pub mod commands;
pub mod config;
pub mod core;
pub mod detectors;
pub mod io;
pub mod report;

pub use crate::commands::{audit_file, audit_project, AuditOptions};
pub use crate::core::{AuditReport, AuditSummary, FeatureDetection, Target};
