//! Encoder quality selection.
//!
//! Exactly one quality mode is active per run. `EncodingOptions::from_flags`
//! is the only constructor, so an `EncodingOptions` value always holds a
//! valid, unambiguous mode.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Highest accepted VBR level (`-V9`, smallest files).
pub const MAX_VBR_LEVEL: u8 = 9;

/// VBR level used when no quality flag is given.
pub const DEFAULT_VBR_LEVEL: u8 = 2;

/// Errors raised while validating quality flags.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodingError {
    /// More than one quality mode was requested.
    #[error("Conflicting quality options: {modes} (choose at most one)")]
    ConflictingModes { modes: String },

    /// VBR level outside 0..=9.
    #[error("VBR level must be between 0 and {max}, got: {level}")]
    VbrOutOfRange { level: u8, max: u8 },
}

/// The encoder quality mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "value", rename_all = "snake_case")]
pub enum QualityMode {
    /// Fixed algorithm quality / VBR pair (`-q0 -V2`).
    Default,
    /// VBR with the given level.
    Vbr(u8),
    /// Named lame preset, passed through verbatim.
    Preset(String),
}

impl fmt::Display for QualityMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default => write!(f, "default (V{})", DEFAULT_VBR_LEVEL),
            Self::Vbr(level) => write!(f, "V{}", level),
            Self::Preset(name) => write!(f, "preset {}", name),
        }
    }
}

/// Raw quality flags as supplied by the user.
#[derive(Debug, Clone, Default)]
pub struct QualityFlags {
    /// Explicit request for the default quality.
    pub default_quality: bool,
    /// `-V` level.
    pub vbr: Option<u8>,
    /// `--preset` name.
    pub preset: Option<String>,
}

/// Validated encoding options shared by every job in a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodingOptions {
    mode: QualityMode,
    overwrite: bool,
}

impl EncodingOptions {
    /// Validates the quality flags and builds the options.
    pub fn from_flags(flags: QualityFlags, overwrite: bool) -> Result<Self, EncodingError> {
        let mut requested = Vec::new();
        if flags.default_quality {
            requested.push("--default-quality".to_string());
        }
        if let Some(level) = flags.vbr {
            requested.push(format!("-V{}", level));
        }
        if let Some(ref preset) = flags.preset {
            requested.push(format!("--preset {}", preset));
        }

        if requested.len() > 1 {
            return Err(EncodingError::ConflictingModes {
                modes: requested.join(", "),
            });
        }

        let mode = match (flags.vbr, flags.preset) {
            (Some(level), _) if level > MAX_VBR_LEVEL => {
                return Err(EncodingError::VbrOutOfRange {
                    level,
                    max: MAX_VBR_LEVEL,
                })
            }
            (Some(level), _) => QualityMode::Vbr(level),
            (None, Some(preset)) => QualityMode::Preset(preset),
            (None, None) => QualityMode::Default,
        };

        Ok(Self { mode, overwrite })
    }

    pub fn mode(&self) -> &QualityMode {
        &self.mode
    }

    pub fn overwrite(&self) -> bool {
        self.overwrite
    }

    /// Arguments passed to `lame` ahead of the input/output operands.
    pub fn encoder_args(&self) -> Vec<String> {
        match &self.mode {
            QualityMode::Default => vec!["-q0".to_string(), format!("-V{}", DEFAULT_VBR_LEVEL)],
            QualityMode::Vbr(level) => vec!["-q0".to_string(), format!("-V{}", level)],
            QualityMode::Preset(name) => vec!["--preset".to_string(), name.clone()],
        }
    }
}

impl Default for EncodingOptions {
    fn default() -> Self {
        Self {
            mode: QualityMode::Default,
            overwrite: false,
        }
    }
}
