//! Trait definitions for the converter module.

use async_trait::async_trait;

use super::error::ConverterError;
use super::types::{ConversionJob, ConversionReport};

/// Converts one FLAC file into a tagged MP3.
#[async_trait]
pub trait Converter: Send + Sync {
    /// Returns the name of this converter implementation.
    fn name(&self) -> &str;

    /// Checks that every external program can be started.
    async fn validate(&self) -> Result<(), ConverterError>;

    /// Converts one job. Output appears at `job.output_path` only on success.
    ///
    /// Dropping the returned future aborts the conversion and removes any
    /// partial output.
    async fn convert(&self, job: &ConversionJob) -> Result<ConversionReport, ConverterError>;
}
