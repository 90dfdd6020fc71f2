//! Engine configuration.
//!
//! `defaults/commands.default.toml` is compiled in and always forms the bottom layer; a
//! user file and command-line style `key=value` overrides go on top through [`Loader`].

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat};
use serde::Deserialize;
use std::path::Path;

const DEFAULT_TOML: &str = include_str!("../../defaults/commands.default.toml");

/// Top-level configuration of a command tree.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CommandsConfig {
    pub parsing: ParsingConfig,
    pub suggestions: SuggestionsConfig,
    pub diagnostics: DiagnosticsConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ParsingConfig {
    pub validity_cache: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SuggestionsConfig {
    pub duplicates: DuplicatePolicy,
    pub limit: usize,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DiagnosticsConfig {
    pub unknown_command: String,
}

/// Which suggestion survives when two share the same text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DuplicatePolicy {
    KeepFirst,
    KeepLast,
}

/// Mirrors `defaults/commands.default.toml`.
impl Default for CommandsConfig {
    fn default() -> Self {
        Self {
            parsing: ParsingConfig {
                validity_cache: true,
            },
            suggestions: SuggestionsConfig {
                duplicates: DuplicatePolicy::KeepFirst,
                limit: 0,
            },
            diagnostics: DiagnosticsConfig {
                unknown_command: "Unknown or incomplete command.".to_string(),
            },
        }
    }
}

/// Builds a [`CommandsConfig`]: embedded defaults, then an optional TOML file, then
/// `key=value` overrides such as `suggestions.limit=5`.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    pub fn new() -> Self {
        Self {
            builder: Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml)),
        }
    }

    /// Layer a TOML file over the defaults; building fails if it is missing.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).format(FileFormat::Toml).required(true));
        self
    }

    /// Apply `key=value` pairs on top of everything else. Values are strings and get coerced
    /// to the field type when the config is built.
    pub fn with_overrides<'a>(mut self, pairs: impl IntoIterator<Item = &'a str>) -> Result<Self, ConfigError> {
        for pair in pairs {
            let (key, value) = pair
                .split_once('=')
                .ok_or_else(|| ConfigError::Message(format!("expected key=value, got '{}'", pair)))?;
            self.builder = self.builder.set_override(key.trim(), value.trim())?;
        }
        Ok(self)
    }

    pub fn build(self) -> Result<CommandsConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}
