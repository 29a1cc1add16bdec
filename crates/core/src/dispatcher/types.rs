//! Types for the dispatcher module.

use std::path::PathBuf;
use std::time::Duration;

use crate::converter::ConversionJob;

/// Exit status of a batch with nothing wrong (skips included).
pub const EXIT_SUCCESS: u8 = 0;
/// At least one job failed or an input was rejected.
pub const EXIT_FAILURE: u8 = 1;
/// Invalid configuration; nothing was dispatched.
pub const EXIT_CONFIG: u8 = 2;
/// The batch was interrupted.
pub const EXIT_INTERRUPTED: u8 = 3;

/// Copy of a companion file into the output tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyJob {
    pub source: PathBuf,
    pub target: PathBuf,
    pub overwrite: bool,
}

/// Unit of work handed to a worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Task {
    Convert(ConversionJob),
    Copy(CopyJob),
}

impl Task {
    /// The file this task reads.
    pub fn source(&self) -> &std::path::Path {
        match self {
            Self::Convert(job) => job.input_path(),
            Self::Copy(copy) => &copy.source,
        }
    }
}

/// A file that could not be processed, with the reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobFailure {
    pub path: PathBuf,
    pub error: String,
}

impl JobFailure {
    pub fn new(path: impl Into<PathBuf>, error: impl ToString) -> Self {
        Self {
            path: path.into(),
            error: error.to_string(),
        }
    }
}

/// What happened to a single task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    Converted { output: PathBuf, elapsed: Duration },
    Skipped { output: PathBuf },
    Copied { target: PathBuf },
    Failed(JobFailure),
}

/// Outcomes gathered by one worker; merged once at the end of the batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkerReport {
    pub converted: Vec<PathBuf>,
    pub skipped: Vec<PathBuf>,
    pub copied: Vec<PathBuf>,
    pub failures: Vec<JobFailure>,
    /// Task that was running when the batch was cancelled.
    pub interrupted: usize,
    pub busy: Duration,
}

impl WorkerReport {
    pub fn record(&mut self, outcome: JobOutcome) {
        match outcome {
            JobOutcome::Converted { output, elapsed } => {
                self.converted.push(output);
                self.busy += elapsed;
            }
            JobOutcome::Skipped { output } => self.skipped.push(output),
            JobOutcome::Copied { target } => self.copied.push(target),
            JobOutcome::Failed(failure) => self.failures.push(failure),
        }
    }
}

/// Totals for a whole batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub converted: Vec<PathBuf>,
    pub skipped: Vec<PathBuf>,
    pub copied: Vec<PathBuf>,
    /// Tasks that ran and failed.
    pub failures: Vec<JobFailure>,
    /// Inputs rejected before dispatch (discovery or layout errors).
    pub rejected: Vec<JobFailure>,
    /// Tasks dropped because of cancellation, running or queued.
    pub interrupted: usize,
    /// Whether cancellation was requested during the batch.
    pub cancelled: bool,
    /// Time spent converting, summed over workers.
    pub busy: Duration,
}

impl BatchSummary {
    pub fn merge(&mut self, report: WorkerReport) {
        self.converted.extend(report.converted);
        self.skipped.extend(report.skipped);
        self.copied.extend(report.copied);
        self.failures.extend(report.failures);
        self.interrupted += report.interrupted;
        self.busy += report.busy;
    }

    pub fn reject(&mut self, failure: JobFailure) {
        self.rejected.push(failure);
    }

    /// Task failures and rejected inputs, sorted by path.
    pub fn all_failures(&self) -> Vec<&JobFailure> {
        let mut all: Vec<&JobFailure> = self.rejected.iter().chain(&self.failures).collect();
        all.sort_by(|a, b| a.path.cmp(&b.path));
        all
    }

    pub fn failed_count(&self) -> usize {
        self.failures.len() + self.rejected.len()
    }

    pub fn exit_code(&self) -> u8 {
        if self.cancelled {
            EXIT_INTERRUPTED
        } else if self.failed_count() > 0 {
            EXIT_FAILURE
        } else {
            EXIT_SUCCESS
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_sums_reports() {
        let mut a = WorkerReport::default();
        a.record(JobOutcome::Converted {
            output: PathBuf::from("/out/1.mp3"),
            elapsed: Duration::from_secs(2),
        });
        a.record(JobOutcome::Skipped {
            output: PathBuf::from("/out/2.mp3"),
        });

        let mut b = WorkerReport::default();
        b.record(JobOutcome::Converted {
            output: PathBuf::from("/out/3.mp3"),
            elapsed: Duration::from_secs(3),
        });
        b.record(JobOutcome::Failed(JobFailure::new("/in/4.flac", "boom")));
        b.interrupted = 1;

        let mut summary = BatchSummary::default();
        summary.merge(a);
        summary.merge(b);

        assert_eq!(summary.converted.len(), 2);
        assert_eq!(summary.skipped.len(), 1);
        assert_eq!(summary.failures.len(), 1);
        assert_eq!(summary.interrupted, 1);
        assert_eq!(summary.busy, Duration::from_secs(5));
    }

    #[test]
    fn test_all_skipped_exits_zero() {
        let mut report = WorkerReport::default();
        report.record(JobOutcome::Skipped {
            output: PathBuf::from("/out/1.mp3"),
        });
        let mut summary = BatchSummary::default();
        summary.merge(report);
        assert_eq!(summary.exit_code(), EXIT_SUCCESS);
    }

    #[test]
    fn test_failure_or_rejection_exits_one() {
        let mut summary = BatchSummary::default();
        summary.reject(JobFailure::new("/in/notes.txt", "not a FLAC file"));
        assert_eq!(summary.exit_code(), EXIT_FAILURE);
        assert_eq!(summary.failed_count(), 1);
    }

    #[test]
    fn test_cancelled_wins() {
        let mut summary = BatchSummary::default();
        summary.reject(JobFailure::new("/in/x", "bad"));
        summary.cancelled = true;
        assert_eq!(summary.exit_code(), EXIT_INTERRUPTED);
    }

    #[test]
    fn test_all_failures_sorted() {
        let mut summary = BatchSummary::default();
        summary.failures.push(JobFailure::new("/b.flac", "x"));
        summary.reject(JobFailure::new("/a.flac", "y"));
        let paths: Vec<_> = summary.all_failures().iter().map(|f| f.path.clone()).collect();
        assert_eq!(paths, vec![PathBuf::from("/a.flac"), PathBuf::from("/b.flac")]);
    }
}
