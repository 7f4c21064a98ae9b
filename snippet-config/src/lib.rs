//! Shared configuration loader for snippet-runner.
//!
//! `defaults/snippets.default.toml` is embedded into the binary so the
//! documented defaults and the runtime behavior cannot drift apart. User files
//! are layered on top via [`Loader`] before deserializing into
//! [`SnippetConfig`].

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use serde::Deserialize;
use std::path::{Path, PathBuf};

const DEFAULT_TOML: &str = include_str!("../defaults/snippets.default.toml");

/// File picked up from the working directory when present.
pub const PROJECT_FILE: &str = "snippets.toml";

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SnippetConfig {
    pub document: DocumentConfig,
    pub extract: ExtractConfig,
    pub artifacts: ArtifactsConfig,
    pub toolchain: ToolchainConfig,
    pub run: RunConfig,
    pub tasks: TasksConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DocumentConfig {
    pub path: PathBuf,
}

/// Which tags hold snippets.
#[derive(Debug, Clone, Deserialize)]
pub struct ExtractConfig {
    pub language: String,
    /// Full pattern override; takes precedence over `language`.
    #[serde(default)]
    pub pattern: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ArtifactsConfig {
    pub prefix: String,
    pub extension: String,
    pub object_extension: String,
}

/// Compiler and the library snippets link against.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolchainConfig {
    pub compiler: String,
    pub include_flag: String,
    pub include_paths: Vec<String>,
    pub libraries: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RunConfig {
    pub fail_on_error: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TasksConfig {
    pub default: String,
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

    /// Layer an optional configuration file (ignored if the file is absent).
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer `snippets.toml` from `dir` if it exists.
    pub fn with_project_dir(self, dir: impl AsRef<Path>) -> Self {
        self.with_optional_file(dir.as_ref().join(PROJECT_FILE))
    }

    /// Apply a single key/value override.
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Finalize the builder and deserialize the resulting configuration.
    pub fn build(self) -> Result<SnippetConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<SnippetConfig, ConfigError> {
    Loader::new().build()
}
