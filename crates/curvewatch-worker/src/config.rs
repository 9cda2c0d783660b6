//! Configuration loading.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use curvewatch_traits::WorkerConfig;

use crate::cli::Cli;

/// Read when `--config` is not given and the file exists.
pub const DEFAULT_CONFIG_PATH: &str = "config/curvewatch.toml";

/// Parses a TOML document.
pub fn from_file(path: &Path) -> Result<WorkerConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("parsing config {}", path.display()))
}

/// File, then environment and flags, then validation.
///
/// Returns the merged configuration and the file it came from, if any.
pub fn load(cli: &Cli) -> Result<(WorkerConfig, Option<PathBuf>)> {
    let path = match &cli.config {
        Some(path) => Some(path.clone()),
        None => Some(PathBuf::from(DEFAULT_CONFIG_PATH)).filter(|p| p.exists()),
    };

    let mut config = match &path {
        Some(path) => from_file(path)?,
        None => WorkerConfig::default(),
    };
    cli.overrides.apply(&mut config);
    config.validate().context("invalid configuration")?;
    Ok((config, path))
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::io::Write;

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_file_then_flags() {
        let file = write_config(
            r#"
            worker_id = "from-file"

            [stream]
            path = "curves.jsonl"

            [risk]
            bump_size = 0.0005
            "#,
        );
        let path = file.path().to_string_lossy().to_string();
        let cli =
            Cli::try_parse_from(["curvewatch", "--config", &path, "--worker-id", "from-flag"])
                .unwrap();

        let (config, source) = load(&cli).unwrap();
        assert_eq!(config.worker_id, "from-flag");
        assert_eq!(config.risk.bump_size, 0.0005);
        assert_eq!(source.as_deref(), Some(file.path()));
    }

    #[test]
    fn test_invalid_merged_config() {
        let file = write_config("[stream]\npath = \"curves.jsonl\"\n");
        let path = file.path().to_string_lossy().to_string();
        let cli = Cli::try_parse_from(["curvewatch", "-c", &path, "--bump-size=-1"]).unwrap();
        let err = format!("{:#}", load(&cli).unwrap_err());
        assert!(err.contains("bump_size"), "{err}");
    }

    #[test]
    fn test_missing_and_malformed_files() {
        let cli = Cli::try_parse_from(["curvewatch", "-c", "/nonexistent/curvewatch.toml"]).unwrap();
        assert!(load(&cli).is_err());

        let file = write_config("worker_id = [");
        let err = format!("{:#}", from_file(file.path()).unwrap_err());
        assert!(err.contains("parsing config"), "{err}");
    }
}
