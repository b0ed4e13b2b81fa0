//! Defaults and environment overrides for audit runs.

use crate::core::Target;

pub const DEFAULT_MAX_FILES: usize = 10_000;
pub const MAX_FILES_CEILING: usize = 100_000;

/// Files larger than this are skipped during collection.
pub const MAX_FILE_SIZE: u64 = 2 * 1024 * 1024;

/// Default target, overridable via `BASELINER_TARGET=widely|newly`.
/// Unrecognized values fall back to the built-in default with a warning.
pub fn default_target() -> Target {
    match std::env::var("BASELINER_TARGET") {
        Ok(value) => match value.to_ascii_lowercase().as_str() {
            "widely" => Target::Widely,
            "newly" => Target::Newly,
            other => {
                log::warn!("unknown BASELINER_TARGET '{other}', using 'widely'");
                Target::default()
            }
        },
        Err(_) => Target::default(),
    }
}

/// Default file ceiling, overridable via `BASELINER_MAX_FILES`. Values
/// outside [1, MAX_FILES_CEILING] are clamped.
pub fn default_max_files() -> usize {
    std::env::var("BASELINER_MAX_FILES")
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .map(|n| n.clamp(1, MAX_FILES_CEILING))
        .unwrap_or(DEFAULT_MAX_FILES)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_env() {
        // Env-dependent branches are covered implicitly; the built-in
        // defaults are the contract.
        assert_eq!(DEFAULT_MAX_FILES, 10_000);
        assert_eq!(Target::default(), Target::Widely);
    }
}
