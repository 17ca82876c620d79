//! Configuration management for `news-view.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # Configuration section definitions
//! │   ├── content    # [content], [template]
//! │   ├── feed       # [feed]
//! │   └── serve      # [serve]
//! ├── error          # ConfigError, ConfigDiagnostics
//! ├── util           # Config file lookup
//! └── mod.rs         # NewsViewConfig (this file)
//! ```
//!
//! # Sections
//!
//! | Section      | Purpose                                    |
//! |--------------|--------------------------------------------|
//! | `[content]`  | Page tree content file                     |
//! | `[feed]`     | Feed subsystem (enable, file name, format) |
//! | `[template]` | Template override directory                |
//! | `[serve]`    | HTTP server (interface, port, workers)     |

mod error;
mod section;
mod util;

pub use error::{ConfigDiagnostics, ConfigError};
pub use section::{ContentConfig, FeedConfig, FeedFormat, ServeConfig, TemplateConfig};

use crate::{
    cli::{Cli, Commands},
    log,
};
use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use util::find_config_file;

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing news-view.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewsViewConfig {
    /// Absolute path to the config file (internal use only)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Project root directory - parent of config file (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    /// Page tree source
    #[serde(default)]
    pub content: ContentConfig,

    /// Feed subsystem
    #[serde(default)]
    pub feed: FeedConfig,

    /// Template lookup
    #[serde(default)]
    pub template: TemplateConfig,

    /// HTTP server settings
    #[serde(default)]
    pub serve: ServeConfig,
}

impl NewsViewConfig {
    /// Load configuration from CLI arguments.
    ///
    /// Searches upward from cwd to find the config file. The project root is
    /// the config file's parent directory.
    pub fn load(cli: &Cli) -> Result<Self> {
        let Some(config_path) = find_config_file(&cli.config) else {
            bail!(
                "Config file '{}' not found in the current directory or any parent",
                cli.config.display()
            );
        };

        let mut config = Self::from_path(&config_path)?;
        config.root = config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        config.config_path = config_path;
        config.apply_command_options(cli);
        config.validate()?;

        Ok(config)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;
        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    /// Print warning about unknown fields.
    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {}, ignoring:", display_path);
        for field in fields {
            eprintln!("- {}", field);
        }
    }

    /// Apply command-specific overrides.
    fn apply_command_options(&mut self, cli: &Cli) {
        if let Commands::Serve { interface, port } = &cli.command {
            Self::update_option(&mut self.serve.interface, interface.as_ref());
            Self::update_option(&mut self.serve.port, port.as_ref());
        }
    }

    /// Overwrite `target` when the CLI provided a value.
    fn update_option<T: Clone>(target: &mut T, value: Option<&T>) {
        if let Some(v) = value {
            *target = v.clone();
        }
    }

    /// Check values serde cannot rule out on its own.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut diag = ConfigDiagnostics::new();

        let feed_file = self.feed.path.to_string_lossy();
        if feed_file.trim().is_empty() {
            diag.error("feed.path", "feed file name is empty");
        } else if feed_file.contains(['/', '\\']) {
            diag.error_with_hint(
                "feed.path",
                format!("`{feed_file}` is not a plain file name"),
                "feeds live next to each page, use a name such as `feed.xml`",
            );
        }

        if self.serve.port == 0 {
            diag.error("serve.port", "port must be between 1 and 65535");
        }
        if self.serve.workers == 0 {
            diag.error("serve.workers", "at least one worker thread is required");
        }

        diag.into_result()
    }

    /// Join a path with the root directory.
    pub fn root_join(&self, path: impl AsRef<Path>) -> PathBuf {
        self.root.join(path)
    }

    /// Absolute path of the content file.
    pub fn content_path(&self) -> PathBuf {
        self.root_join(&self.content.path)
    }

    /// Absolute path of the template directory.
    pub fn template_dir(&self) -> PathBuf {
        self.root_join(&self.template.dir)
    }
}

/// Parse a config snippet for tests, rejecting unknown fields.
#[cfg(test)]
pub fn test_parse_config(content: &str) -> NewsViewConfig {
    let (parsed, ignored) = NewsViewConfig::parse_with_ignored(content).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}

// ============================================================================
// tests
// ============================================================================
