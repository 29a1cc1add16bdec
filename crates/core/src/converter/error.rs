//! Error types for the converter module.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Pipeline stage a failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// `flac` decoding to PCM.
    Decode,
    /// `lame` encoding to MP3 and embedding the ID3 tag.
    Encode,
    /// `metaflac` listing the Vorbis comments.
    ReadTags,
    /// Moving the finished file into place.
    Store,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Decode => "decode",
            Self::Encode => "encode",
            Self::ReadTags => "read tags",
            Self::Store => "store",
        };
        f.write_str(name)
    }
}

/// Errors that can occur during conversion.
#[derive(Debug, Error)]
pub enum ConverterError {
    /// External program could not be started because it does not exist.
    #[error("{tool} not found at path: {path}")]
    ToolNotFound { tool: String, path: PathBuf },

    /// A pipeline stage failed.
    #[error("{stage} failed{}: {stderr}", exit_label(.status))]
    StageFailed {
        stage: Stage,
        status: Option<i32>,
        stderr: String,
    },

    /// I/O error outside of a specific stage.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConverterError {
    /// Creates a stage failure from a process exit.
    pub fn stage_failed(stage: Stage, status: Option<i32>, stderr: impl Into<String>) -> Self {
        Self::StageFailed {
            stage,
            status,
            stderr: stderr.into(),
        }
    }

    /// Creates a stage failure from an error that has no exit status.
    pub fn stage_error(stage: Stage, error: impl fmt::Display) -> Self {
        Self::StageFailed {
            stage,
            status: None,
            stderr: error.to_string(),
        }
    }

    /// The stage that failed, if any.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Self::StageFailed { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}

fn exit_label(status: &Option<i32>) -> String {
    status.map_or_else(String::new, |code| format!(" (exit status {})", code))
}
