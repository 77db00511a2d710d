//! Object system configuration
//!
//! Loaded from TOML:
//!
//! ```toml
//! [dispatch]
//! max_dispatch_depth = 256
//! record_warnings = true
//! max_recorded_warnings = 1024
//!
//! [classes]
//! extra_base_types = ["Date"]
//! ```
//!
//! Every section and key is optional.

use crate::error::{ObjectError, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Default limit on nested dispatches into one system on one thread
pub const DEFAULT_MAX_DISPATCH_DEPTH: usize = 256;
/// Default number of ambiguity warnings kept until `take_warnings`
pub const DEFAULT_MAX_RECORDED_WARNINGS: usize = 1024;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SystemConfig {
    pub dispatch: DispatchConfig,
    pub classes: ClassConfig,
}

/// Settings from the `[dispatch]` section
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DispatchConfig {
    /// Nested `invoke` and next-method calls allowed before `DispatchLoop`
    pub max_dispatch_depth: usize,
    /// Keep ambiguity warnings for `take_warnings` in addition to logging them
    pub record_warnings: bool,
    /// Oldest recorded warnings are dropped past this many
    pub max_recorded_warnings: usize,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            max_dispatch_depth: DEFAULT_MAX_DISPATCH_DEPTH,
            record_warnings: true,
            max_recorded_warnings: DEFAULT_MAX_RECORDED_WARNINGS,
        }
    }
}

/// Settings from the `[classes]` section
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClassConfig {
    /// Additional zero-slot base classes registered alongside the built-ins
    pub extra_base_types: Vec<String>,
}

impl SystemConfig {
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: SystemConfig = toml::from_str(source).map_err(|e| ObjectError::Config {
            message: e.to_string(),
        })?;
        config.check()?;
        Ok(config)
    }

    /// Read and parse a TOML configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let source = fs::read_to_string(path).map_err(|e| ObjectError::Config {
            message: format!("Failed to read {}: {}", path.display(), e),
        })?;
        Self::from_toml_str(&source)
    }

    fn check(&self) -> Result<()> {
        if self.dispatch.max_dispatch_depth == 0 {
            return Err(ObjectError::Config {
                message: "max_dispatch_depth must be at least 1".to_string(),
            });
        }
        if let Some(name) = self
            .classes
            .extra_base_types
            .iter()
            .find(|name| name.is_empty() || crate::class::is_reserved_name(name))
        {
            return Err(ObjectError::Config {
                message: format!("'{name}' cannot be used as an extra base type"),
            });
        }
        Ok(())
    }
}
