//! `.billsplit.toml` configuration files

use anyhow::{Context, Result};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration file name, looked up in the home and current directories.
pub const CONFIG_FILE_NAME: &str = ".billsplit.toml";

/// Configuration file structure for .billsplit.toml
///
/// Configuration files can be placed in:
/// - User home directory: ~/.billsplit.toml (user defaults)
/// - Project directory: ./.billsplit.toml (project defaults)
///
/// Precedence order (highest to lowest):
/// 1. Command-line arguments (--max-pages, --format, etc.)
/// 2. Project config (./.billsplit.toml)
/// 3. User config (~/.billsplit.toml)
/// 4. Built-in defaults
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Page extraction settings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pipeline: Option<PipelineConfig>,

    /// Archive traversal settings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archive: Option<ArchiveConfig>,

    /// Output settings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<OutputConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Visible page separator in the joined text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_separator: Option<bool>,

    /// Maximum pages per document
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_pages: Option<usize>,

    /// Per-fragment diagnostics
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchiveConfig {
    /// Deepest nested ZIP level that is opened
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_depth: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Default output format (text or json)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

impl Config {
    /// Load configuration from file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| {
            // TOML errors include line/column information, preserve it
            anyhow::anyhow!("{e}")
        })
    }

    /// Find and load configuration files
    /// Returns (`user_config`, `project_config`)
    pub fn discover_configs() -> (Option<Self>, Option<Self>) {
        let user_config = dirs::home_dir()
            .map(|home| home.join(CONFIG_FILE_NAME))
            .and_then(|path| Self::load_optional(&path, "user"));
        let project_config = Self::load_optional(&PathBuf::from(CONFIG_FILE_NAME), "project");
        (user_config, project_config)
    }

    fn load_optional(path: &Path, label: &str) -> Option<Self> {
        if !path.exists() {
            return None;
        }
        match Self::load_from_file(path) {
            Ok(config) => {
                log::debug!("Loaded {label} config from {}", path.display());
                Some(config)
            }
            Err(e) => {
                eprintln!(
                    "{} Failed to load {label} config from {}: {e:#}",
                    "Warning:".yellow().bold(),
                    path.display()
                );
                None
            }
        }
    }

    /// Merge multiple configs with precedence
    /// CLI args > project config > user config > defaults
    pub fn merge(user_config: Option<Self>, project_config: Option<Self>) -> Self {
        let mut merged = user_config.unwrap_or_default();

        if let Some(project) = project_config {
            if let Some(pipeline) = project.pipeline {
                let mut merged_pipeline = merged.pipeline.unwrap_or_default();
                if let Some(include_separator) = pipeline.include_separator {
                    merged_pipeline.include_separator = Some(include_separator);
                }
                if let Some(max_pages) = pipeline.max_pages {
                    merged_pipeline.max_pages = Some(max_pages);
                }
                if let Some(debug) = pipeline.debug {
                    merged_pipeline.debug = Some(debug);
                }
                merged.pipeline = Some(merged_pipeline);
            }

            if let Some(archive) = project.archive {
                let mut merged_archive = merged.archive.unwrap_or_default();
                if let Some(max_depth) = archive.max_depth {
                    merged_archive.max_depth = Some(max_depth);
                }
                merged.archive = Some(merged_archive);
            }

            if let Some(output) = project.output {
                let mut merged_output = merged.output.unwrap_or_default();
                if let Some(format) = output.format {
                    merged_output.format = Some(format);
                }
                merged.output = Some(merged_output);
            }
        }

        merged
    }

    /// Pipeline section, or defaults
    pub fn pipeline(&self) -> PipelineConfig {
        self.pipeline.clone().unwrap_or_default()
    }

    /// Configured archive depth, if any
    pub fn max_depth(&self) -> Option<usize> {
        self.archive.as_ref().and_then(|archive| archive.max_depth)
    }

    /// Configured output format, if any
    pub fn output_format(&self) -> Option<&str> {
        self.output.as_ref().and_then(|output| output.format.as_deref())
    }
}
