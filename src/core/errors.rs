//! Error taxonomy for audit operations.
//!
//! Only invalid input and export failures are allowed to fail an audit.
//! Per-file analysis errors and compatibility-data lookup failures are
//! logged and degrade to empty results inside the pipeline.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuditError {
    #[error("path does not exist: {0}")]
    PathNotFound(PathBuf),

    #[error("path is not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("path is not a file: {0}")]
    NotAFile(PathBuf),

    #[error("file type '{extension}' is not auditable: {path}")]
    UnsupportedExtension { path: PathBuf, extension: String },

    #[error("failed to export report to {path}: {source}")]
    Export {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type AuditResult<T> = Result<T, AuditError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_include_the_offending_path() {
        let err = AuditError::PathNotFound(PathBuf::from("/no/such/dir"));
        assert!(err.to_string().contains("/no/such/dir"));

        let err = AuditError::UnsupportedExtension {
            path: PathBuf::from("notes.txt"),
            extension: "txt".into(),
        };
        assert!(err.to_string().contains("notes.txt"));
        assert!(err.to_string().contains("'txt'"));
    }
}
