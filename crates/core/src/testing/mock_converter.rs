//! Mock converter for testing.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::converter::{ConversionJob, ConversionReport, Converter, ConverterError, Stage};

/// Bytes written to every output file.
const MOCK_OUTPUT: &[u8] = b"ID3\x04\x00\x00\x00\x00\x00\x00mock";

/// A recorded conversion job for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedConversion {
    /// The job that was submitted.
    pub job: ConversionJob,
    /// Whether the conversion succeeded.
    pub success: bool,
}

/// Mock implementation of the Converter trait.
///
/// Provides controllable behavior for testing:
/// - Track conversion jobs for assertions
/// - Fail jobs whose input file name matches
/// - Simulate slow conversions
/// - Observe how many conversions ran at once
///
/// Successful conversions write a small placeholder file at the job's output
/// path, after the simulated delay.
#[derive(Debug)]
pub struct MockConverter {
    /// Recorded conversions.
    conversions: Arc<RwLock<Vec<RecordedConversion>>>,
    /// Input file names whose conversion fails at the decode stage.
    failing: Arc<RwLock<HashSet<String>>>,
    /// If set, the next `validate` call fails with this error.
    validate_error: Arc<RwLock<Option<ConverterError>>>,
    /// Simulated conversion duration.
    delay: Arc<RwLock<Duration>>,
    active: AtomicUsize,
    peak: AtomicUsize,
}

impl Default for MockConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl MockConverter {
    /// Create a new mock converter.
    pub fn new() -> Self {
        Self {
            conversions: Arc::new(RwLock::new(Vec::new())),
            failing: Arc::new(RwLock::new(HashSet::new())),
            validate_error: Arc::new(RwLock::new(None)),
            delay: Arc::new(RwLock::new(Duration::ZERO)),
            active: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        }
    }

    /// Get all recorded conversions.
    pub async fn recorded_conversions(&self) -> Vec<RecordedConversion> {
        self.conversions.read().await.clone()
    }

    /// Get the number of conversions attempted.
    pub async fn conversion_count(&self) -> usize {
        self.conversions.read().await.len()
    }

    /// Make conversions of files with this name fail.
    pub async fn fail_on(&self, file_name: impl Into<String>) {
        self.failing.write().await.insert(file_name.into());
    }

    /// Configure the next `validate` call to fail with the given error.
    pub async fn set_validate_error(&self, error: ConverterError) {
        *self.validate_error.write().await = Some(error);
    }

    /// Set the simulated conversion duration.
    pub async fn set_delay(&self, delay: Duration) {
        *self.delay.write().await = delay;
    }

    /// Highest number of conversions that were in progress at once.
    pub fn peak_concurrency(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    async fn should_fail(&self, job: &ConversionJob) -> bool {
        let name = job
            .input_path()
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.failing.read().await.contains(&name)
    }
}

/// Decrements the active counter even when the conversion future is dropped.
struct ActiveGuard<'a>(&'a AtomicUsize);

impl Drop for ActiveGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl Converter for MockConverter {
    fn name(&self) -> &str {
        "mock"
    }

    async fn validate(&self) -> Result<(), ConverterError> {
        match self.validate_error.write().await.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    async fn convert(&self, job: &ConversionJob) -> Result<ConversionReport, ConverterError> {
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        let _guard = ActiveGuard(&self.active);
        self.peak.fetch_max(now, Ordering::SeqCst);

        let delay = *self.delay.read().await;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        if self.should_fail(job).await {
            self.conversions.write().await.push(RecordedConversion {
                job: job.clone(),
                success: false,
            });
            return Err(ConverterError::stage_failed(
                Stage::Decode,
                Some(1),
                "mock decoder failure",
            ));
        }

        if let Some(parent) = job.output_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&job.output_path, MOCK_OUTPUT).await?;

        self.conversions.write().await.push(RecordedConversion {
            job: job.clone(),
            success: true,
        });

        Ok(ConversionReport {
            input_path: job.input_path().to_path_buf(),
            output_path: job.output_path.clone(),
            output_size_bytes: MOCK_OUTPUT.len() as u64,
            tag_fields: 0,
            duration_ms: delay.as_millis() as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::InputFile;
    use crate::encoding::EncodingOptions;
    use crate::testing::fixtures::flac_tree;
    use tempfile::TempDir;

    fn create_test_job(tmp: &TempDir, name: &str) -> ConversionJob {
        let paths = flac_tree(tmp.path(), &[name]).unwrap();
        let input = InputFile::new(&paths[0]).unwrap();
        let output = tmp.path().join("out").join(name).with_extension("mp3");
        ConversionJob::new(input, output, EncodingOptions::default())
    }

    #[tokio::test]
    async fn test_basic_conversion_writes_output() {
        let tmp = TempDir::new().unwrap();
        let converter = MockConverter::new();
        let job = create_test_job(&tmp, "a.flac");

        let report = converter.convert(&job).await.unwrap();
        assert_eq!(report.output_path, job.output_path);
        assert!(job.output_path.exists());
        assert_eq!(converter.conversion_count().await, 1);
    }

    #[tokio::test]
    async fn test_fail_on_name() {
        let tmp = TempDir::new().unwrap();
        let converter = MockConverter::new();
        converter.fail_on("bad.flac").await;

        let job = create_test_job(&tmp, "bad.flac");
        let err = converter.convert(&job).await.unwrap_err();
        assert_eq!(err.stage(), Some(Stage::Decode));
        assert!(!job.output_path.exists());

        let conversions = converter.recorded_conversions().await;
        assert_eq!(conversions.len(), 1);
        assert!(!conversions[0].success);
    }

    #[tokio::test]
    async fn test_validate_error_consumed() {
        let converter = MockConverter::new();
        converter
            .set_validate_error(ConverterError::ToolNotFound {
                tool: "lame".into(),
                path: "lame".into(),
            })
            .await;
        assert!(converter.validate().await.is_err());
        assert!(converter.validate().await.is_ok());
    }

    #[tokio::test]
    async fn test_dropped_conversion_writes_nothing() {
        let tmp = TempDir::new().unwrap();
        let converter = MockConverter::new();
        converter.set_delay(Duration::from_secs(10)).await;
        let job = create_test_job(&tmp, "slow.flac");

        let result =
            tokio::time::timeout(Duration::from_millis(20), converter.convert(&job)).await;
        assert!(result.is_err());
        assert!(!job.output_path.exists());
        assert_eq!(converter.active.load(Ordering::SeqCst), 0);
    }
}
