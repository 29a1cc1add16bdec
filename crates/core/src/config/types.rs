use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub tools: ToolsConfig,
    #[serde(default)]
    pub batch: BatchConfig,
}

/// Locations of the external programs driven by the converter
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ToolsConfig {
    #[serde(default = "default_flac")]
    pub flac: PathBuf,
    #[serde(default = "default_metaflac")]
    pub metaflac: PathBuf,
    #[serde(default = "default_lame")]
    pub lame: PathBuf,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            flac: default_flac(),
            metaflac: default_metaflac(),
            lame: default_lame(),
        }
    }
}

fn default_flac() -> PathBuf {
    PathBuf::from("flac")
}

fn default_metaflac() -> PathBuf {
    PathBuf::from("metaflac")
}

fn default_lame() -> PathBuf {
    PathBuf::from("lame")
}

/// Batch behaviour defaults; command-line flags take precedence
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BatchConfig {
    /// Worker count (default: number of available cores)
    #[serde(default = "default_workers")]
    pub workers: usize,
    /// Replace existing output files instead of skipping them
    #[serde(default)]
    pub overwrite: bool,
    /// Characters removed from generated output path components
    #[serde(default = "default_strip_chars")]
    pub strip_chars: String,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            overwrite: false,
            strip_chars: default_strip_chars(),
        }
    }
}

fn default_workers() -> usize {
    num_cpus::get()
}

fn default_strip_chars() -> String {
    ":".to_string()
}
