//! Configuration loading
//!
//! `defaults/declsplice.default.toml` is embedded into the binary so that docs
//! and runtime behavior stay in sync. Users layer their own files on top of
//! those defaults via [`Loader`] before deserializing into [`SpliceConfig`].

use crate::splice::directive::parse_define;
use crate::splice::error::ExtractionError;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use serde::Deserialize;
use std::path::{Path, PathBuf};

const DEFAULT_TOML: &str = include_str!("../../defaults/declsplice.default.toml");

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SpliceConfig {
    pub template: TemplateConfig,
    pub query: QueryConfig,
}

/// Template format markers.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TemplateConfig {
    pub block_start: String,
    pub block_end: String,
    pub continuation: String,
    #[serde(default)]
    pub inert: Vec<InertRegion>,
}

/// Delimiters of a region the scanner must not look into.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct InertRegion {
    pub open: String,
    pub close: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QueryConfig {
    #[serde(default)]
    pub include_paths: Vec<PathBuf>,
    #[serde(default)]
    pub largefile_defines: Vec<String>,
}

impl QueryConfig {
    /// `largefile_defines` split into name/value pairs.
    pub fn largefile_defines(&self) -> Result<Vec<(String, String)>, ExtractionError> {
        self.largefile_defines
            .iter()
            .map(|define| parse_define(define))
            .collect()
    }
}

/// Helper for layering user overrides over the built-in defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Start a loader seeded with the embedded defaults.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a configuration file. Missing files trigger an error.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Apply a single key/value override (useful for CLI settings).
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Finalize the builder and deserialize the resulting configuration.
    pub fn build(self) -> Result<SpliceConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<SpliceConfig, ConfigError> {
    Loader::new().build()
}
