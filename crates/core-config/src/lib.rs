//! Configuration loading and parsing.
//!
//! Reads `refind.toml` (or an override path provided by the binary). Every
//! field has a default, so a missing file, a missing table or an unreadable
//! file all yield a usable configuration. Unknown fields are ignored to allow
//! forward evolution.
//!
//! ```toml
//! [results]
//! buffer_name = "Find Results"
//! path_style = "auto"          # "auto" | "posix" | "windows"
//!
//! [replace]
//! save_and_close = false
//! annotation_key = "FindResultsReplaceChanges"
//! ```

use anyhow::Result;
use core_results::PathStyle;
use serde::Deserialize;
use std::{fs, path::PathBuf};
use tracing::{info, warn};

pub const DEFAULT_BUFFER_NAME: &str = "Find Results";
pub const DEFAULT_ANNOTATION_KEY: &str = "FindResultsReplaceChanges";

/// Path grammar selection; `Auto` follows the host platform.
#[derive(Debug, Deserialize, Default, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PathStyleSetting {
    #[default]
    Auto,
    Posix,
    Windows,
}

impl PathStyleSetting {
    pub fn resolve(self) -> PathStyle {
        match self {
            PathStyleSetting::Auto => PathStyle::native(),
            PathStyleSetting::Posix => PathStyle::Posix,
            PathStyleSetting::Windows => PathStyle::Windows,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ResultsConfig {
    #[serde(default = "ResultsConfig::default_buffer_name")]
    pub buffer_name: String,
    #[serde(default)]
    pub path_style: PathStyleSetting,
}

impl Default for ResultsConfig {
    fn default() -> Self {
        Self {
            buffer_name: Self::default_buffer_name(),
            path_style: PathStyleSetting::default(),
        }
    }
}

impl ResultsConfig {
    fn default_buffer_name() -> String {
        DEFAULT_BUFFER_NAME.to_string()
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReplaceConfig {
    #[serde(default)]
    pub save_and_close: bool,
    #[serde(default = "ReplaceConfig::default_annotation_key")]
    pub annotation_key: String,
}

impl Default for ReplaceConfig {
    fn default() -> Self {
        Self {
            save_and_close: false,
            annotation_key: Self::default_annotation_key(),
        }
    }
}

impl ReplaceConfig {
    fn default_annotation_key() -> String {
        DEFAULT_ANNOTATION_KEY.to_string()
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct ConfigFile {
    #[serde(default)]
    pub results: ResultsConfig,
    #[serde(default)]
    pub replace: ReplaceConfig,
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub source: Option<PathBuf>, // file the values came from, if any
    pub file: ConfigFile,        // parsed (or default) data
}

/// Best-effort config path following platform conventions (XDG / AppData Roaming).
pub fn discover() -> PathBuf {
    let local = PathBuf::from("refind.toml");
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("refind").join("refind.toml");
    }
    PathBuf::from("refind.toml")
}

pub fn load_from(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(discover);
    let Ok(content) = fs::read_to_string(&path) else {
        return Ok(Config::default());
    };
    match toml::from_str::<ConfigFile>(&content) {
        Ok(file) => {
            info!(target: "config", path = %path.display(), "config_loaded");
            Ok(Config {
                source: Some(path),
                file,
            })
        }
        Err(e) => {
            warn!(target: "config", path = %path.display(), error = %e, "config_parse_failed");
            Ok(Config::default())
        }
    }
}

impl Config {
    pub fn path_style(&self) -> PathStyle {
        self.file.results.path_style.resolve()
    }

    pub fn buffer_name(&self) -> &str {
        &self.file.results.buffer_name
    }

    pub fn annotation_key(&self) -> &str {
        &self.file.replace.annotation_key
    }

    pub fn save_and_close(&self) -> bool {
        self.file.replace.save_and_close
    }
}
