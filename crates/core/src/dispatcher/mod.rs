//! Bounded worker pool for conversion batches.
//!
//! `N` workers pull tasks from one shared queue, so each task runs exactly
//! once. A failing task is recorded and the worker moves on. Each worker
//! keeps its own `WorkerReport`; reports are merged into a `BatchSummary`
//! after every worker has finished.
//!
//! Cancellation is signalled through a `watch` channel. The running task's
//! future is dropped (which kills its child processes and removes its temp
//! files) and queued tasks are counted as interrupted.

mod plan;
mod types;

pub use plan::{plan_tasks, Plan};
pub use types::{
    BatchSummary, CopyJob, JobFailure, JobOutcome, Task, WorkerReport, EXIT_CONFIG, EXIT_FAILURE,
    EXIT_INTERRUPTED, EXIT_SUCCESS,
};

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::converter::{ConversionJob, Converter};
use crate::staging;

type Queue = Arc<Mutex<VecDeque<Task>>>;

/// Runs a batch of tasks on a fixed number of workers.
pub struct Dispatcher<C>
where
    C: Converter + 'static,
{
    converter: Arc<C>,
    workers: usize,
    cancel: watch::Receiver<bool>,
    // Keeps `cancel` open when no external channel is attached.
    _cancel_tx: Option<watch::Sender<bool>>,
}

impl<C> Dispatcher<C>
where
    C: Converter + 'static,
{
    /// Creates a dispatcher with `workers` workers (at least one).
    pub fn new(converter: Arc<C>, workers: usize) -> Self {
        let (tx, rx) = watch::channel(false);
        Self {
            converter,
            workers: workers.max(1),
            cancel: rx,
            _cancel_tx: Some(tx),
        }
    }

    /// Stops the batch once `true` is sent on the channel.
    pub fn with_cancellation(mut self, cancel: watch::Receiver<bool>) -> Self {
        self.cancel = cancel;
        self._cancel_tx = None;
        self
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Runs every task and returns the merged summary.
    pub async fn run(&self, tasks: Vec<Task>) -> BatchSummary {
        let mut summary = BatchSummary::default();
        if tasks.is_empty() {
            return summary;
        }

        let workers = self.workers.min(tasks.len());
        info!(
            "Dispatching {} tasks to {} workers using {}",
            tasks.len(),
            workers,
            self.converter.name()
        );

        let queue: Queue = Arc::new(Mutex::new(tasks.into()));
        let mut set = JoinSet::new();
        for id in 0..workers {
            let converter = Arc::clone(&self.converter);
            let queue = Arc::clone(&queue);
            let cancel = self.cancel.clone();
            set.spawn(run_worker(id, converter, queue, cancel));
        }

        while let Some(joined) = set.join_next().await {
            match joined {
                Ok(report) => summary.merge(report),
                Err(e) => {
                    error!("Worker terminated abnormally: {}", e);
                    summary.failures.push(JobFailure::new("<worker>", e));
                }
            }
        }

        let left = queue.lock().await.len();
        summary.interrupted += left;
        summary.cancelled = *self.cancel.borrow();
        if summary.cancelled {
            warn!("Batch interrupted; {} tasks not completed", summary.interrupted);
        }

        summary
    }
}

async fn run_worker<C: Converter>(
    id: usize,
    converter: Arc<C>,
    queue: Queue,
    mut cancel: watch::Receiver<bool>,
) -> WorkerReport {
    let mut report = WorkerReport::default();
    debug!("Worker {} started", id);

    loop {
        if *cancel.borrow() {
            break;
        }
        let Some(task) = queue.lock().await.pop_front() else {
            break;
        };

        tokio::select! {
            biased;
            _ = cancelled(&mut cancel) => {
                info!("Worker {} abandoning {:?}", id, task.source());
                report.interrupted += 1;
                break;
            }
            outcome = run_task(converter.as_ref(), &task) => report.record(outcome),
        }
    }

    debug!("Worker {} finished", id);
    report
}

/// Resolves once cancellation is requested; never resolves if the sender
/// is gone without having requested it.
async fn cancelled(cancel: &mut watch::Receiver<bool>) {
    loop {
        if *cancel.borrow_and_update() {
            return;
        }
        if cancel.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

async fn run_task<C: Converter + ?Sized>(converter: &C, task: &Task) -> JobOutcome {
    match task {
        Task::Convert(job) => convert_one(converter, job).await,
        Task::Copy(copy) => copy_one(copy).await,
    }
}

async fn convert_one<C: Converter + ?Sized>(converter: &C, job: &ConversionJob) -> JobOutcome {
    if !job.options.overwrite() && exists(&job.output_path).await {
        info!("Skipping {:?}: {:?} already exists", job.input_path(), job.output_path);
        return JobOutcome::Skipped {
            output: job.output_path.clone(),
        };
    }

    info!("Converting {:?}", job.input_path());
    let start = Instant::now();
    match converter.convert(job).await {
        Ok(report) => {
            let elapsed = start.elapsed();
            info!(
                "Finished {:?} -> {:?} in {:.1}s",
                report.input_path,
                report.output_path,
                elapsed.as_secs_f64()
            );
            JobOutcome::Converted {
                output: report.output_path,
                elapsed,
            }
        }
        Err(e) => {
            error!("Failed to convert {:?}: {}", job.input_path(), e);
            JobOutcome::Failed(JobFailure::new(job.input_path(), e))
        }
    }
}

async fn copy_one(copy: &CopyJob) -> JobOutcome {
    if !copy.overwrite && exists(&copy.target).await {
        info!("Skipping copy of {:?}: target exists", copy.source);
        return JobOutcome::Skipped {
            output: copy.target.clone(),
        };
    }

    let result = async {
        let dir = staging::parent_dir(&copy.target);
        tokio::fs::create_dir_all(&dir).await?;
        let staged = staging::temp_file(&dir, ".part")?;
        tokio::fs::copy(&copy.source, staged.path()).await?;
        staging::persist(staged, &copy.target, copy.overwrite)
    }
    .await;

    match result {
        Ok(_) => {
            info!("Copied {:?} -> {:?}", copy.source, copy.target);
            JobOutcome::Copied {
                target: copy.target.clone(),
            }
        }
        Err(e) => {
            error!("Failed to copy {:?}: {}", copy.source, e);
            JobOutcome::Failed(JobFailure::new(&copy.source, e))
        }
    }
}

async fn exists(path: &std::path::Path) -> bool {
    tokio::fs::try_exists(path).await.unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_cancelled_ignores_closed_false_channel() {
        let (tx, mut rx) = watch::channel(false);
        drop(tx);
        let waited =
            tokio::time::timeout(std::time::Duration::from_millis(20), cancelled(&mut rx)).await;
        assert!(waited.is_err());
    }

    #[tokio::test]
    async fn test_cancelled_resolves_on_true() {
        let (tx, mut rx) = watch::channel(false);
        let handle = tokio::spawn(async move { cancelled(&mut rx).await });
        tx.send(true).unwrap();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_copy_one_skips_existing() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("cover.jpg");
        let target = tmp.path().join("out/cover.jpg");
        std::fs::write(&source, b"new").unwrap();
        std::fs::create_dir_all(target.parent().unwrap()).unwrap();
        std::fs::write(&target, b"old").unwrap();

        let copy = CopyJob {
            source: source.clone(),
            target: target.clone(),
            overwrite: false,
        };
        assert!(matches!(copy_one(&copy).await, JobOutcome::Skipped { .. }));
        assert_eq!(std::fs::read(&target).unwrap(), b"old");

        let copy = CopyJob {
            overwrite: true,
            ..copy
        };
        assert!(matches!(copy_one(&copy).await, JobOutcome::Copied { .. }));
        assert_eq!(std::fs::read(&target).unwrap(), b"new");
        assert_eq!(std::fs::read_dir(target.parent().unwrap()).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn test_failed_copy_leaves_no_partial_target() {
        let tmp = tempfile::TempDir::new().unwrap();
        let out = tmp.path().join("out");
        let copy = CopyJob {
            source: tmp.path().join("missing.jpg"),
            target: out.join("cover.jpg"),
            overwrite: false,
        };

        assert!(matches!(copy_one(&copy).await, JobOutcome::Failed(_)));
        assert!(!copy.target.exists());
        assert_eq!(std::fs::read_dir(&out).unwrap().count(), 0);
    }
}
