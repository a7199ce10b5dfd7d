//! Rule file path resolution.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Environment variable naming the rule file.
pub const RULES_ENV_VAR: &str = "INTAKE_RULES";

/// Rule file looked up in the working directory when nothing else is given.
pub const DEFAULT_CONFIG_FILE: &str = "intake.toml";

/// Where a rule file path came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigOrigin {
    Flag,
    Environment,
    Default,
}

/// Serialization format of a rule file, chosen by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Json,
}

impl ConfigFormat {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => ConfigFormat::Json,
            _ => ConfigFormat::Toml,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigLocation {
    pub path: PathBuf,
    pub origin: ConfigOrigin,
}

impl ConfigLocation {
    pub fn format(&self) -> ConfigFormat {
        ConfigFormat::from_path(&self.path)
    }
}

/// Resolve the rule file.
///
/// Resolution order:
/// 1. explicit path (`--rules`)
/// 2. `INTAKE_RULES` environment variable
/// 3. `intake.toml` in the working directory
pub fn locate_config(explicit: Option<&Path>) -> ConfigLocation {
    locate_config_with(explicit, std::env::var_os(RULES_ENV_VAR))
}

fn locate_config_with(explicit: Option<&Path>, env_value: Option<OsString>) -> ConfigLocation {
    if let Some(path) = explicit {
        return ConfigLocation {
            path: path.to_path_buf(),
            origin: ConfigOrigin::Flag,
        };
    }
    if let Some(value) = env_value.filter(|value| !value.is_empty()) {
        return ConfigLocation {
            path: PathBuf::from(value),
            origin: ConfigOrigin::Environment,
        };
    }
    ConfigLocation {
        path: PathBuf::from(DEFAULT_CONFIG_FILE),
        origin: ConfigOrigin::Default,
    }
}
