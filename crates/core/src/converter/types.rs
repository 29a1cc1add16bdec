//! Types for the converter module.

use std::path::{Path, PathBuf};

use crate::discovery::InputFile;
use crate::encoding::EncodingOptions;

/// One file to convert. Created by the dispatcher, consumed by exactly one
/// worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionJob {
    /// Source FLAC file.
    pub input: InputFile,
    /// Destination MP3 path.
    pub output_path: PathBuf,
    /// Options shared by the whole batch.
    pub options: EncodingOptions,
}

impl ConversionJob {
    pub fn new(input: InputFile, output_path: PathBuf, options: EncodingOptions) -> Self {
        Self {
            input,
            output_path,
            options,
        }
    }

    pub fn input_path(&self) -> &Path {
        self.input.path()
    }
}

/// Result of a successful conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionReport {
    /// Source file.
    pub input_path: PathBuf,
    /// File written.
    pub output_path: PathBuf,
    /// Size of the written file, tag included.
    pub output_size_bytes: u64,
    /// Number of ID3 fields written.
    pub tag_fields: usize,
    /// Wall-clock time spent in milliseconds.
    pub duration_ms: u64,
}
