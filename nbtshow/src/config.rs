//! CLI configuration management
//!
//! Handles loading and saving viewer settings and resolving them against
//! environment variables and command-line flags.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use nbtview_core::DEFAULT_MAX_DEPTH;

/// Largest accepted indent width for pretty output
const MAX_INDENT: usize = 16;

/// Largest accepted nesting limit
///
/// Decoding any depth is safe, but rendering and dropping a decoded tree
/// still recurse once per level.
const MAX_DEPTH_LIMIT: usize = 1024;

/// CLI configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CliConfig {
    /// Default output format: snbt, json or yaml
    pub output_format: String,

    /// Spread output over multiple lines
    pub pretty: bool,

    /// Indent width for pretty output
    pub indent: usize,

    /// Deepest nesting of lists and compounds accepted when decoding
    pub max_depth: usize,

    /// Enable verbose logging by default
    pub verbose: bool,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            output_format: "snbt".to_string(),
            pretty: false,
            indent: 2,
            max_depth: DEFAULT_MAX_DEPTH,
            verbose: false,
        }
    }
}

impl CliConfig {
    /// Default configuration file location
    pub fn default_path() -> PathBuf {
        nbtview_core::default_config_path()
    }

    /// Load configuration from `path`, or the defaults if it does not exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read CLI config file {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse CLI config file {}", path.display()))
    }

    /// Save configuration to `path`
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Create parent directory if it doesn't exist
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize CLI config")?;
        std::fs::write(path, content).context("Failed to write CLI config file")?;

        Ok(())
    }

    /// Update one setting by name, validating the new value
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "output_format" => {
                ConfigBuilder::validate_output_format(value)?;
                self.output_format = value.to_string();
            }
            "pretty" => self.pretty = parse_bool(value)?,
            "indent" => {
                let indent = value
                    .parse()
                    .map_err(|_| anyhow::anyhow!("Invalid indent value. Must be a number"))?;
                ConfigBuilder::validate_indent(indent)?;
                self.indent = indent;
            }
            "max_depth" => {
                let depth = value
                    .parse()
                    .map_err(|_| anyhow::anyhow!("Invalid max_depth value. Must be a number"))?;
                ConfigBuilder::validate_max_depth(depth)?;
                self.max_depth = depth;
            }
            "verbose" => self.verbose = parse_bool(value)?,
            _ => return Err(anyhow::anyhow!("Unknown config key: {}", key)),
        }
        Ok(())
    }

    /// Create a new builder for constructing configuration
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }
}

fn parse_bool(value: &str) -> Result<bool> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(anyhow::anyhow!(
            "Invalid boolean '{}'. Use true or false",
            value
        )),
    }
}

/// Builder for CLI configuration with validation and priority chain support
///
/// Priority chain (lowest to highest):
/// 1. Defaults
/// 2. Config file
/// 3. Environment variables
/// 4. CLI arguments
///
/// Setters applied later in the chain win, so CLI arguments are applied last.
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    output_format: Option<String>,
    pretty: Option<bool>,
    indent: Option<usize>,
    max_depth: Option<usize>,
    verbose: Option<bool>,
}

impl ConfigBuilder {
    /// Create a new configuration builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set output format (with validation)
    pub fn with_output_format(mut self, format: impl Into<String>) -> Result<Self> {
        let format = format.into();
        Self::validate_output_format(&format)?;
        self.output_format = Some(format);
        Ok(self)
    }

    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = Some(pretty);
        self
    }

    /// Set indent width (with validation)
    pub fn with_indent(mut self, indent: usize) -> Result<Self> {
        Self::validate_indent(indent)?;
        self.indent = Some(indent);
        Ok(self)
    }

    /// Set decoding depth limit (with validation)
    pub fn with_max_depth(mut self, max_depth: usize) -> Result<Self> {
        Self::validate_max_depth(max_depth)?;
        self.max_depth = Some(max_depth);
        Ok(self)
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = Some(verbose);
        self
    }

    /// Load settings from a config file
    ///
    /// A missing file leaves the builder unchanged; an unreadable or invalid
    /// one is an error.
    pub fn with_config_file(self, path: &Path) -> Result<Self> {
        let config = CliConfig::load_from(path)?;
        Self::validate_output_format(&config.output_format)
            .with_context(|| format!("In config file {}", path.display()))?;

        Ok(Self {
            output_format: Some(config.output_format),
            pretty: Some(config.pretty),
            indent: Some(config.indent),
            max_depth: Some(config.max_depth),
            verbose: Some(config.verbose),
        })
    }

    /// Apply environment variable overrides
    ///
    /// Invalid values are ignored.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(format) = std::env::var("NBTVIEW_FORMAT") {
            if Self::validate_output_format(&format).is_ok() {
                self.output_format = Some(format);
            }
        }

        if let Ok(pretty) = std::env::var("NBTVIEW_PRETTY") {
            if let Ok(pretty) = parse_bool(&pretty) {
                self.pretty = Some(pretty);
            }
        }

        if let Ok(indent) = std::env::var("NBTVIEW_INDENT") {
            if let Ok(indent) = indent.parse() {
                if Self::validate_indent(indent).is_ok() {
                    self.indent = Some(indent);
                }
            }
        }

        if let Ok(depth) = std::env::var("NBTVIEW_MAX_DEPTH") {
            if let Ok(depth) = depth.parse() {
                if Self::validate_max_depth(depth).is_ok() {
                    self.max_depth = Some(depth);
                }
            }
        }

        if let Ok(verbose) = std::env::var("NBTVIEW_VERBOSE") {
            if let Ok(verbose) = parse_bool(&verbose) {
                self.verbose = Some(verbose);
            }
        }

        self
    }

    /// Build the final configuration with validation
    pub fn build(self) -> Result<CliConfig> {
        let defaults = CliConfig::default();

        let output_format = self.output_format.unwrap_or(defaults.output_format);
        let indent = self.indent.unwrap_or(defaults.indent);
        let max_depth = self.max_depth.unwrap_or(defaults.max_depth);

        // Validate final values
        Self::validate_output_format(&output_format)?;
        Self::validate_indent(indent)?;
        Self::validate_max_depth(max_depth)?;

        Ok(CliConfig {
            output_format,
            pretty: self.pretty.unwrap_or(defaults.pretty),
            indent,
            max_depth,
            verbose: self.verbose.unwrap_or(defaults.verbose),
        })
    }

    fn validate_output_format(format: &str) -> Result<()> {
        match format {
            "snbt" | "json" | "yaml" => Ok(()),
            _ => Err(anyhow::anyhow!(
                "Invalid output format '{}'. Must be 'snbt', 'json' or 'yaml'",
                format
            )),
        }
    }

    fn validate_indent(indent: usize) -> Result<()> {
        if indent > MAX_INDENT {
            return Err(anyhow::anyhow!(
                "Indent must be at most {} spaces",
                MAX_INDENT
            ));
        }
        Ok(())
    }

    fn validate_max_depth(max_depth: usize) -> Result<()> {
        if max_depth == 0 {
            return Err(anyhow::anyhow!("max_depth must be greater than 0"));
        }
        if max_depth > MAX_DEPTH_LIMIT {
            return Err(anyhow::anyhow!(
                "max_depth must be less than or equal to {}",
                MAX_DEPTH_LIMIT
            ));
        }
        Ok(())
    }
}
