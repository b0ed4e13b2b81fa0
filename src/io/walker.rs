//! Project file collection: recursive traversal with ignore rules and a
//! file-count ceiling.

use crate::config::MAX_FILE_SIZE;
use crate::core::{FileDescriptor, FileKind};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Always-ignored path segments and globs: version control, build output,
/// vendored dependencies, caches, minified assets.
pub static DEFAULT_IGNORES: &[&str] = &[
    ".git",
    ".hg",
    ".svn",
    "node_modules",
    "bower_components",
    "vendor",
    "dist",
    "build",
    "out",
    ".next",
    ".nuxt",
    ".output",
    "coverage",
    ".cache",
    "tmp",
    "*.min.js",
    "*.min.css",
];

/// Exact path-segment/filename equality, or trailing-glob suffix matching
/// (`*.ext`). No other pattern forms are supported.
fn matches_pattern(pattern: &str, name: &str) -> bool {
    if let Some(suffix) = pattern.strip_prefix('*') {
        return name.ends_with(suffix);
    }
    glob::Pattern::new(pattern)
        .map(|p| p.matches(name))
        .unwrap_or(pattern == name)
}

pub struct FileCollector {
    root: PathBuf,
    max_files: usize,
    allowed_kinds: Vec<FileKind>,
    ignore_patterns: Vec<String>,
}

impl FileCollector {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            max_files: crate::config::DEFAULT_MAX_FILES,
            allowed_kinds: vec![FileKind::Stylesheet, FileKind::Markup, FileKind::Script],
            ignore_patterns: DEFAULT_IGNORES.iter().map(|p| p.to_string()).collect(),
        }
    }

    pub fn with_max_files(mut self, max_files: usize) -> Self {
        self.max_files = max_files;
        self
    }

    pub fn with_kinds(mut self, kinds: Vec<FileKind>) -> Self {
        self.allowed_kinds = kinds;
        self
    }

    /// Union caller patterns with the default ignore set.
    pub fn with_ignore_patterns(mut self, patterns: Vec<String>) -> Self {
        self.ignore_patterns.extend(patterns);
        self
    }

    fn is_ignored(&self, name: &str) -> bool {
        self.ignore_patterns.iter().any(|p| matches_pattern(p, name))
    }

    /// Depth-first collection, stopping silently at the file ceiling.
    /// Unreadable directories are logged and skipped, never fatal.
    pub fn collect(&self) -> Vec<FileDescriptor> {
        let mut files = Vec::new();
        let walker = WalkDir::new(&self.root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                let name = entry.file_name().to_string_lossy();
                // Never prune the root itself.
                entry.depth() == 0 || !self.is_ignored(&name)
            });

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    log::warn!("skipping unreadable entry: {err}");
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            if files.len() >= self.max_files {
                log::warn!("file ceiling of {} reached, truncating scan", self.max_files);
                break;
            }
            if let Some(descriptor) = self.describe(entry.path()) {
                files.push(descriptor);
            }
        }

        files
    }

    fn describe(&self, path: &Path) -> Option<FileDescriptor> {
        let kind = FileKind::from_path(path)?;
        if !self.allowed_kinds.contains(&kind) {
            return None;
        }

        let size = match std::fs::metadata(path) {
            Ok(meta) => meta.len(),
            Err(err) => {
                log::warn!("skipping {}: {err}", path.display());
                return None;
            }
        };
        if size == 0 || size > MAX_FILE_SIZE {
            log::debug!("skipping {} ({size} bytes)", path.display());
            return None;
        }

        let relative_path = path
            .strip_prefix(&self.root)
            .map(Path::to_path_buf)
            .or_else(|_| {
                pathdiff::diff_paths(path, &self.root)
                    .ok_or(())
            })
            .unwrap_or_else(|_| path.to_path_buf());

        Some(FileDescriptor {
            path: path.to_path_buf(),
            relative_path,
            kind,
            size,
        })
    }
}
