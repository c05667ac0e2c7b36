//! Build Output
//!
//! Checks and tidies the production bundle in `build.output_dir`:
//! `index.html` at the root, sub-assets under `assets_dir`, and no source
//! maps unless `production_source_map` is set.

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::BuildConfig;

/// Errors from inspecting the build output
#[derive(Error, Debug)]
pub enum DistError {
    #[error("Build output not found: {0}")]
    MissingOutput(PathBuf),

    #[error("Build output has no index.html: {0}")]
    MissingIndex(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// What `finalize` found and did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DistReport {
    /// Files left in the output directory
    pub files: usize,
    /// Files under the assets directory
    pub assets: usize,
    /// Total size of the remaining files
    pub total_bytes: u64,
    /// Source maps deleted
    pub removed_source_maps: Vec<PathBuf>,
}

fn is_source_map(path: &Path) -> bool {
    path.extension().map(|ext| ext == "map").unwrap_or(false)
}

fn walk(dir: &Path, files: &mut Vec<PathBuf>) -> std::io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            walk(&path, files)?;
        } else {
            files.push(path);
        }
    }
    Ok(())
}

/// Verify the bundle layout and strip source maps when they are disabled
pub fn finalize(config: &BuildConfig) -> Result<DistReport, DistError> {
    let output = &config.output_dir;
    if !output.is_dir() {
        return Err(DistError::MissingOutput(output.clone()));
    }
    if !output.join("index.html").is_file() {
        return Err(DistError::MissingIndex(output.clone()));
    }

    let mut files = Vec::new();
    walk(output, &mut files)?;
    files.sort();

    let assets_path = config.assets_path();
    let mut report = DistReport::default();

    for path in files {
        if is_source_map(&path) && !config.production_source_map {
            fs::remove_file(&path)?;
            tracing::debug!(path = %path.display(), "Removed source map");
            report.removed_source_maps.push(path);
            continue;
        }

        report.files += 1;
        report.total_bytes += fs::metadata(&path)?.len();
        if path.starts_with(&assets_path) {
            report.assets += 1;
        }
    }

    tracing::info!(
        files = report.files,
        assets = report.assets,
        removed_source_maps = report.removed_source_maps.len(),
        "Build output checked"
    );

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn bundle(dir: &Path) {
        fs::write(dir.join("index.html"), "<div id=\"app\"></div>").unwrap();
        fs::create_dir_all(dir.join("static")).unwrap();
        fs::write(dir.join("static/app.js"), "main()").unwrap();
        fs::write(dir.join("static/app.js.map"), "{}").unwrap();
        fs::write(dir.join("static/app.wasm"), [0u8, 97, 115, 109]).unwrap();
    }

    #[test]
    fn test_removes_source_maps_by_default() {
        let dir = tempdir().unwrap();
        bundle(dir.path());
        let config = BuildConfig {
            output_dir: dir.path().to_path_buf(),
            ..Default::default()
        };

        let report = finalize(&config).unwrap();

        assert_eq!(report.files, 3);
        assert_eq!(report.assets, 2);
        assert_eq!(report.removed_source_maps.len(), 1);
        assert!(!dir.path().join("static/app.js.map").exists());
    }

    #[test]
    fn test_keeps_source_maps_when_enabled() {
        let dir = tempdir().unwrap();
        bundle(dir.path());
        let config = BuildConfig {
            output_dir: dir.path().to_path_buf(),
            production_source_map: true,
            ..Default::default()
        };

        let report = finalize(&config).unwrap();

        assert_eq!(report.files, 4);
        assert!(report.removed_source_maps.is_empty());
        assert!(dir.path().join("static/app.js.map").exists());
    }

    #[test]
    fn test_missing_index() {
        let dir = tempdir().unwrap();
        let config = BuildConfig {
            output_dir: dir.path().to_path_buf(),
            ..Default::default()
        };

        assert!(matches!(finalize(&config), Err(DistError::MissingIndex(_))));
    }

    #[test]
    fn test_missing_output() {
        let config = BuildConfig {
            output_dir: PathBuf::from("/no/such/dist"),
            ..Default::default()
        };

        assert!(matches!(finalize(&config), Err(DistError::MissingOutput(_))));
    }
}
