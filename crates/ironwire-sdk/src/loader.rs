//! Reads configuration and metadata files and writes generated artifacts.
//!
//! Files ending in `.json` are parsed as JSON; anything else as YAML.

use std::path::{Path, PathBuf};

use ironwire_common::config::CompilerConfig;
use ironwire_common::error::{IronwireError, Result};
use ironwire_compiler::CompiledContainer;
use ironwire_core::metadata::StaticMetadata;

/// Loads a compiler configuration file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a valid configuration.
pub fn load_config(path: &Path) -> Result<CompilerConfig> {
    tracing::info!(path = %path.display(), "loading configuration");
    let content = read(path)?;
    if is_json(path) {
        CompilerConfig::from_json(&content)
    } else {
        CompilerConfig::from_yaml(&content)
    }
}

/// Loads a static metadata map.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a valid metadata map.
pub fn load_metadata(path: &Path) -> Result<StaticMetadata> {
    tracing::info!(path = %path.display(), "loading metadata");
    let content = read(path)?;
    let metadata = if is_json(path) {
        StaticMetadata::from_json(&content)?
    } else {
        StaticMetadata::from_yaml(&content)?
    };
    tracing::debug!(types = metadata.len(), "metadata loaded");
    Ok(metadata)
}

/// Writes every artifact below `dir`, creating directories as needed.
///
/// Returns the written paths, main artifact first.
///
/// # Errors
///
/// Returns an error if a directory or file cannot be written.
pub fn write_artifacts(compiled: &CompiledContainer, dir: &Path) -> Result<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(compiled.len());
    for (relative, source) in compiled.artifacts() {
        let path = dir.join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| IronwireError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        std::fs::write(&path, source).map_err(|e| IronwireError::Io {
            path: path.clone(),
            source: e,
        })?;
        tracing::debug!(path = %path.display(), "artifact written");
        written.push(path);
    }
    tracing::info!(count = written.len(), dir = %dir.display(), "artifacts written");
    Ok(written)
}

fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| IronwireError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_reports_path() {
        let err = load_config(Path::new("/nonexistent/ironwire.yaml")).unwrap_err();
        assert!(
            matches!(err, IronwireError::Io { ref path, .. } if path.ends_with("ironwire.yaml")),
            "got: {err}"
        );
    }

    #[test]
    fn json_is_chosen_by_extension() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("ironwire.JSON");
        std::fs::write(&path, r#"{"entry_points":[{"class":"app::Service"}]}"#).expect("write");
        let config = load_config(&path).expect("load");
        assert_eq!(config.entry_points.len(), 1);
    }

    #[test]
    fn invalid_yaml_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("ironwire.metadata.yaml");
        std::fs::write(&path, "app::Service: [not, a, type]").expect("write");
        assert!(matches!(load_metadata(&path), Err(IronwireError::Yaml { .. })));
    }
}
