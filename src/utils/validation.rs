//! Centralized validation and helper functions.

use std::path::Path;

use crate::delinking::DelinkingConfig;

/// Check that delinking parameters are usable.
///
/// # Errors
///
/// Returns a message naming the first offending parameter.
pub fn validate_config(config: &DelinkingConfig) -> Result<(), String> {
    if config.window_size == 0 {
        return Err("window size must be at least 1".to_string());
    }
    if !(config.outlier_percentile > 0.0 && config.outlier_percentile <= 100.0) {
        return Err(format!(
            "outlier percentile must be in (0, 100], got {}",
            config.outlier_percentile
        ));
    }
    if config.threads == Some(0) {
        return Err("thread count must be at least 1".to_string());
    }
    Ok(())
}

/// Check if the path is a gzipped file
#[must_use]
#[allow(clippy::case_sensitive_file_extension_comparisons)] // Already lowercased
pub fn is_gzipped(path: &Path) -> bool {
    let path_str = path.to_string_lossy().to_lowercase();
    path_str.ends_with(".gz") || path_str.ends_with(".bgz")
}

/// Strip a FASTA-style description from a contig id (`NODE_1 len=5` -> `NODE_1`)
#[must_use]
pub fn normalize_contig_id(raw: &str) -> &str {
    raw.split_whitespace().next().unwrap_or("")
}
