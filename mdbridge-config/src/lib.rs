//! Layered configuration for the mdbridge dialects.
//!
//! `defaults/mdbridge.default.toml` is embedded into every binary so that docs and
//! runtime behavior stay in sync. Applications layer user-specific files on top
//! of those defaults via [`Loader`] before deserializing into [`BridgeConfig`],
//! then resolve the dialect tables with [`BridgeConfig::dialects`].

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use mdbridge::{ConvertError, DialectConfig};
use serde::Deserialize;
use std::path::Path;

const DEFAULT_TOML: &str = include_str!("../defaults/mdbridge.default.toml");

/// Errors raised while loading or resolving configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A dialect table names an unknown syntax, family, extension or soft break mode.
    #[error("Invalid [dialects.{table}] table: {source}")]
    Dialect {
        table: String,
        #[source]
        source: ConvertError,
    },
}

/// Top-level configuration consumed by mdbridge applications.
#[derive(Debug, Clone, Deserialize)]
pub struct BridgeConfig {
    pub parse: ParseConfig,
    pub convert: ConvertConfig,
    pub dialects: DialectsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ParseConfig {
    pub max_depth: usize,
}

/// Syntaxes used when the command line does not name one.
#[derive(Debug, Clone, Deserialize)]
pub struct ConvertConfig {
    pub from: String,
    pub to: String,
}

/// One table per built-in Markdown dialect.
#[derive(Debug, Clone, Deserialize)]
pub struct DialectsConfig {
    pub commonmark: DialectTable,
    pub markdown10: DialectTable,
    pub markdown11: DialectTable,
    pub markdown12: DialectTable,
    pub github: DialectTable,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DialectTable {
    pub syntax: String,
    pub family: String,
    pub extensions: Vec<String>,
    pub soft_break: String,
}

impl DialectTable {
    fn resolve(&self, max_depth: usize) -> Result<DialectConfig, ConvertError> {
        Ok(DialectConfig::for_syntax(&self.syntax)?
            .with_family(self.family.parse()?)
            .with_extensions(&self.extensions)?
            .with_soft_break(self.soft_break.parse()?)
            .with_max_depth(max_depth))
    }
}

impl BridgeConfig {
    /// Resolve every dialect table, in registration order.
    pub fn dialects(&self) -> Result<Vec<DialectConfig>, ConfigLoadError> {
        let tables = [
            ("commonmark", &self.dialects.commonmark),
            ("markdown10", &self.dialects.markdown10),
            ("markdown11", &self.dialects.markdown11),
            ("markdown12", &self.dialects.markdown12),
            ("github", &self.dialects.github),
        ];
        tables
            .into_iter()
            .map(|(name, table)| {
                table
                    .resolve(self.parse.max_depth)
                    .map_err(|source| ConfigLoadError::Dialect {
                        table: name.to_string(),
                        source,
                    })
            })
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

    /// Layer an optional configuration file (ignored if the file is absent).
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Apply a single key/value override (useful for CLI settings).
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigLoadError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Finalize the builder and deserialize the resulting configuration.
    pub fn build(self) -> Result<BridgeConfig, ConfigLoadError> {
        Ok(self.builder.build()?.try_deserialize()?)
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<BridgeConfig, ConfigLoadError> {
    Loader::new().build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use mdbridge::{EmulationFamily, Extension, SoftBreak};
    use std::io::Write;

    #[test]
    fn defaults_match_builtin_dialects() {
        let config = load_defaults().expect("defaults to deserialize");
        assert_eq!(config.parse.max_depth, 256);
        assert_eq!(config.convert.from, "markdown/1.2");
        assert_eq!(
            config.dialects().expect("defaults to resolve"),
            DialectConfig::builtin()
        );
    }

    #[test]
    fn supports_overrides() {
        let config = Loader::new()
            .set_override("dialects.markdown10.extensions", vec!["tables", "macros"])
            .expect("override to apply")
            .set_override("dialects.markdown10.soft_break", "space")
            .expect("override to apply")
            .set_override("parse.max_depth", 16)
            .expect("override to apply")
            .build()
            .expect("config to build");

        let dialects = config.dialects().expect("dialects to resolve");
        let markdown10 = &dialects[1];
        assert!(markdown10.has(Extension::Macros));
        assert!(!markdown10.has(Extension::Autolink));
        assert_eq!(markdown10.soft_break, SoftBreak::Space);
        assert!(dialects.iter().all(|dialect| dialect.max_depth == 16));
    }

    #[test]
    fn user_file_is_layered_over_defaults() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .expect("temp file");
        writeln!(file, "[dialects.commonmark]\nfamily = \"kramdown\"").expect("write config");

        let config = Loader::new()
            .with_file(file.path())
            .build()
            .expect("config to build");
        let dialects = config.dialects().expect("dialects to resolve");
        assert_eq!(dialects[0].family, EmulationFamily::Kramdown);
        assert!(dialects[0].extensions.is_empty());
    }

    #[test]
    fn unknown_extension_names_the_table() {
        let config = Loader::new()
            .set_override("dialects.github.extensions", vec!["footnotes"])
            .expect("override to apply")
            .build()
            .expect("config to build");

        let err = config.dialects().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid [dialects.github] table: Unknown Markdown extension 'footnotes'"
        );
    }

    #[test]
    fn missing_required_file_fails() {
        let result = Loader::new()
            .with_file("/definitely/not/here/mdbridge.toml")
            .build();
        assert!(matches!(result, Err(ConfigLoadError::Config(_))));
    }

    #[test]
    fn missing_optional_file_is_ignored() {
        assert!(Loader::new()
            .with_optional_file("/definitely/not/here/mdbridge.toml")
            .build()
            .is_ok());
    }
}
