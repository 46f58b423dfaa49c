//! Usage rendering configuration.
//!
//! Optional; loaded from a TOML file such as:
//!
//! ```toml
//! line_width = 100
//! column_width = 12
//! ```

use serde::Deserialize;
use std::path::Path;

/// Layout knobs for usage text.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// A command's header and doc share one line when together they fit
    /// in this many columns.
    pub line_width: usize,
    /// Width of the positional name column.
    pub column_width: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            line_width: 76,
            column_width: 10,
        }
    }
}

impl RenderConfig {
    /// Load config from a specific path.
    /// Returns the default config if the file doesn't exist or is invalid.
    pub fn load_from_path(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "failed to parse render config");
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to read render config");
                Self::default()
            }
        }
    }
}
