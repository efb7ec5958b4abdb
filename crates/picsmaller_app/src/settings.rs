use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use picsmaller_core::CompressOptions;
use picsmaller_engine::{ArchiveOptions, DEFAULT_ARCHIVE_NAME, DEFAULT_COMPRESSION_LEVEL};
use picsmaller_logging::{pipeline_info, pipeline_warn};
use serde::{Deserialize, Serialize};

use crate::cli::Cli;

/// Looked up in the working directory when `--settings` is not given.
pub const DEFAULT_SETTINGS_FILE: &str = "picsmaller.ron";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub compress: CompressOptions,
    pub archive_name: String,
    pub compression_level: i64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            compress: CompressOptions::default(),
            archive_name: DEFAULT_ARCHIVE_NAME.to_string(),
            compression_level: DEFAULT_COMPRESSION_LEVEL,
        }
    }
}

impl Settings {
    /// Applies command-line overrides and validates the result.
    pub fn resolve(mut self, cli: &Cli) -> anyhow::Result<(CompressOptions, ArchiveOptions)> {
        if let Some(quality) = cli.quality {
            self.compress.quality = quality;
        }
        if cli.max_width.is_some() {
            self.compress.max_width = cli.max_width;
        }
        if cli.max_height.is_some() {
            self.compress.max_height = cli.max_height;
        }
        if let Some(name) = &cli.archive_name {
            self.archive_name = name.clone();
        }
        if let Some(level) = cli.level {
            self.compression_level = level;
        }

        self.compress
            .validate()
            .context("invalid compression settings")?;
        anyhow::ensure!(
            (0..=9).contains(&self.compression_level),
            "archive compression level must be within 0..=9, got {}",
            self.compression_level
        );

        Ok((
            self.compress,
            ArchiveOptions {
                archive_name: self.archive_name,
                compression_level: self.compression_level,
            },
        ))
    }
}

/// Reads settings from `explicit`, or from [`DEFAULT_SETTINGS_FILE`] if it
/// exists. An explicit path must exist and parse; a broken default file is
/// ignored with a warning.
pub fn load(explicit: Option<&Path>) -> anyhow::Result<Settings> {
    let (path, required) = match explicit {
        Some(path) => (path.to_path_buf(), true),
        None => (PathBuf::from(DEFAULT_SETTINGS_FILE), false),
    };

    let content = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound && !required => {
            return Ok(Settings::default());
        }
        Err(err) => {
            return Err(err).with_context(|| format!("failed to read settings from {path:?}"));
        }
    };

    match ron::from_str::<Settings>(&content) {
        Ok(settings) => {
            pipeline_info!("Loaded settings from {:?}", path);
            Ok(settings)
        }
        Err(err) if !required => {
            pipeline_warn!("Failed to parse settings from {:?}: {}", path, err);
            Ok(Settings::default())
        }
        Err(err) => Err(err).with_context(|| format!("failed to parse settings from {path:?}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use pretty_assertions::assert_eq;

    #[test]
    fn explicit_file_is_parsed() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("settings.ron");
        fs::write(
            &path,
            "(compress: (quality: 55, max_width: Some(1024)), archive_name: \"out.zip\")",
        )
        .unwrap();

        let settings = load(Some(&path)).unwrap();
        assert_eq!(settings.compress.quality, 55);
        assert_eq!(settings.compress.max_width, Some(1024));
        assert_eq!(settings.compress.max_height, None);
        assert_eq!(settings.archive_name, "out.zip");
        assert_eq!(settings.compression_level, DEFAULT_COMPRESSION_LEVEL);
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempfile::TempDir::new().unwrap();
        assert!(load(Some(&dir.path().join("nope.ron"))).is_err());
    }

    #[test]
    fn flags_override_file_values() {
        let cli = Cli::try_parse_from(["picsmaller", "a.png", "--quality", "20", "--level", "9"])
            .unwrap();
        let settings = Settings {
            compress: CompressOptions {
                quality: 80,
                max_width: Some(640),
                max_height: None,
            },
            ..Settings::default()
        };

        let (compress, archive) = settings.resolve(&cli).unwrap();
        assert_eq!(compress.quality, 20);
        assert_eq!(compress.max_width, Some(640));
        assert_eq!(archive.compression_level, 9);
        assert_eq!(archive.archive_name, DEFAULT_ARCHIVE_NAME);
    }

    #[test]
    fn invalid_file_values_are_reported() {
        let cli = Cli::try_parse_from(["picsmaller", "a.png"]).unwrap();
        let settings = Settings {
            compression_level: 42,
            ..Settings::default()
        };
        assert!(settings.resolve(&cli).is_err());
    }
}
