//! `[content]` and `[template]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [content]
//! path = "content.toml"   # Page tree definition
//!
//! [template]
//! dir = "templates"       # Overrides for view templates
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Page tree source.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentConfig {
    /// Content file, relative to the config file.
    pub path: PathBuf,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            path: "content.toml".into(),
        }
    }
}

/// Template lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateConfig {
    /// Template directory, relative to the config file.
    pub dir: PathBuf,
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            dir: "templates".into(),
        }
    }
}
