//! Batch dispatch integration tests.
//!
//! These tests drive discovery, layout and the dispatcher with a mock
//! converter:
//! - Output tree mirrors the input tree below the common root
//! - Existing outputs are skipped on a second run
//! - One failing file does not stop its siblings
//! - Cancellation drops queued work and leaves no partial output
//! - The worker count bounds concurrency

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;
use tokio::sync::watch;

use flac2mp3_core::{
    discover,
    dispatcher::{EXIT_FAILURE, EXIT_INTERRUPTED, EXIT_SUCCESS},
    plan_tasks,
    testing::{fixtures::flac_tree, MockConverter},
    BatchSummary, Dispatcher, EncodingOptions, OutputLayout, QualityFlags,
};

/// Test helper holding a source tree, an output directory and a mock.
struct TestHarness {
    converter: Arc<MockConverter>,
    source_dir: TempDir,
    output_dir: TempDir,
}

impl TestHarness {
    fn new() -> Self {
        Self {
            converter: Arc::new(MockConverter::new()),
            source_dir: TempDir::new().expect("Failed to create source dir"),
            output_dir: TempDir::new().expect("Failed to create output dir"),
        }
    }

    fn album(&self, tracks: &[&str]) -> PathBuf {
        let album = self.source_dir.path().join("album");
        flac_tree(&album, tracks).expect("Failed to create tracks");
        album
    }

    fn options(&self, overwrite: bool) -> EncodingOptions {
        EncodingOptions::from_flags(QualityFlags::default(), overwrite).unwrap()
    }

    async fn run(&self, inputs: &[PathBuf], overwrite: bool, workers: usize) -> BatchSummary {
        self.run_with(inputs, overwrite, Dispatcher::new(Arc::clone(&self.converter), workers))
            .await
    }

    async fn run_with(
        &self,
        inputs: &[PathBuf],
        overwrite: bool,
        dispatcher: Dispatcher<MockConverter>,
    ) -> BatchSummary {
        let discovery = discover(inputs, None);
        let layout = OutputLayout::plan(
            Some(self.output_dir.path().to_path_buf()),
            None,
            &discovery.anchors,
        );
        let plan = plan_tasks(discovery, &layout, &self.options(overwrite));
        let mut summary = dispatcher.run(plan.tasks).await;
        for failure in plan.rejected {
            summary.reject(failure);
        }
        summary
    }

    fn out(&self, relative: &str) -> PathBuf {
        self.output_dir.path().join(relative)
    }
}

// =============================================================================
// Layout
// =============================================================================

#[tokio::test]
async fn test_album_directory_mirrors_below_root() {
    let harness = TestHarness::new();
    let album = harness.album(&["disc1/track1.flac", "disc1/track2.flac"]);

    let summary = harness.run(&[album], false, 2).await;

    assert_eq!(summary.converted.len(), 2);
    assert!(harness.out("disc1/track1.mp3").exists());
    assert!(harness.out("disc1/track2.mp3").exists());
    assert_eq!(summary.exit_code(), EXIT_SUCCESS);
}

#[tokio::test]
async fn test_same_names_in_sibling_dirs_do_not_collide() {
    let harness = TestHarness::new();
    let album = harness.album(&["cd1/01.flac", "cd2/01.flac"]);

    let summary = harness.run(&[album], false, 4).await;

    assert_eq!(summary.converted.len(), 2);
    assert!(harness.out("cd1/01.mp3").exists());
    assert!(harness.out("cd2/01.mp3").exists());
}

#[tokio::test]
async fn test_every_output_relative_path_matches_input() {
    let harness = TestHarness::new();
    let tracks = ["a/1.flac", "a/b/2.flac", "c/3.flac", "4.flac"];
    let album = harness.album(&tracks);

    let summary = harness.run(&[album], false, 3).await;

    assert_eq!(summary.converted.len(), tracks.len());
    for track in tracks {
        let expected = harness.out(track).with_extension("mp3");
        assert!(summary.converted.contains(&expected), "missing {:?}", expected);
    }
}

// =============================================================================
// Idempotence
// =============================================================================

#[tokio::test]
async fn test_second_run_skips_everything() {
    let harness = TestHarness::new();
    let album = harness.album(&["1.flac", "2.flac", "3.flac"]);

    let first = harness.run(&[album.clone()], false, 2).await;
    assert_eq!(first.converted.len(), 3);

    let second = harness.run(&[album], false, 2).await;
    assert_eq!(second.converted.len(), 0);
    assert_eq!(second.skipped.len(), 3);
    assert_eq!(second.exit_code(), EXIT_SUCCESS);
    assert_eq!(harness.converter.conversion_count().await, 3);
}

#[tokio::test]
async fn test_overwrite_converts_again() {
    let harness = TestHarness::new();
    let album = harness.album(&["1.flac"]);

    harness.run(&[album.clone()], false, 1).await;
    let second = harness.run(&[album], true, 1).await;

    assert_eq!(second.converted.len(), 1);
    assert!(second.skipped.is_empty());
}

// =============================================================================
// Failure isolation
// =============================================================================

#[tokio::test]
async fn test_one_failure_does_not_stop_siblings() {
    let harness = TestHarness::new();
    let album = harness.album(&["1.flac", "2.flac", "broken.flac", "4.flac"]);
    harness.converter.fail_on("broken.flac").await;

    let summary = harness.run(&[album], false, 2).await;

    assert_eq!(summary.converted.len(), 3);
    assert_eq!(summary.failures.len(), 1);
    assert!(summary.failures[0].path.ends_with("broken.flac"));
    assert!(summary.failures[0].error.contains("mock decoder failure"));
    assert!(!harness.out("broken.mp3").exists());
    assert_eq!(summary.exit_code(), EXIT_FAILURE);
}

#[tokio::test]
async fn test_rejected_inputs_make_run_fail() {
    let harness = TestHarness::new();
    let album = harness.album(&["1.flac"]);
    let missing = harness.source_dir.path().join("missing.flac");

    let summary = harness.run(&[album, missing], false, 1).await;

    assert_eq!(summary.converted.len(), 1);
    assert_eq!(summary.rejected.len(), 1);
    assert_eq!(summary.exit_code(), EXIT_FAILURE);
}

// =============================================================================
// Concurrency and cancellation
// =============================================================================

#[tokio::test]
async fn test_worker_count_bounds_concurrency() {
    let harness = TestHarness::new();
    let names: Vec<String> = (0..8).map(|i| format!("{:02}.flac", i)).collect();
    let refs: Vec<&str> = names.iter().map(String::as_str).collect();
    let album = harness.album(&refs);
    harness.converter.set_delay(Duration::from_millis(30)).await;

    let summary = harness.run(&[album], false, 3).await;

    assert_eq!(summary.converted.len(), 8);
    assert!(harness.converter.peak_concurrency() <= 3);
    assert!(harness.converter.peak_concurrency() >= 2);
}

#[tokio::test]
async fn test_each_job_runs_once() {
    let harness = TestHarness::new();
    let names: Vec<String> = (0..20).map(|i| format!("{:02}.flac", i)).collect();
    let refs: Vec<&str> = names.iter().map(String::as_str).collect();
    let album = harness.album(&refs);

    harness.run(&[album], false, 6).await;

    let recorded = harness.converter.recorded_conversions().await;
    let mut inputs: Vec<PathBuf> = recorded
        .iter()
        .map(|r| r.job.input_path().to_path_buf())
        .collect();
    inputs.sort();
    inputs.dedup();
    assert_eq!(inputs.len(), 20);
    assert_eq!(recorded.len(), 20);
}

#[tokio::test]
async fn test_cancellation_drops_queued_work() {
    let harness = TestHarness::new();
    let album = harness.album(&["1.flac", "2.flac", "3.flac", "4.flac"]);
    harness.converter.set_delay(Duration::from_secs(30)).await;

    let (cancel_tx, cancel_rx) = watch::channel(false);
    let dispatcher =
        Dispatcher::new(Arc::clone(&harness.converter), 2).with_cancellation(cancel_rx);

    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        let _ = cancel_tx.send(true);
    });

    let summary = tokio::time::timeout(
        Duration::from_secs(5),
        harness.run_with(&[album], false, dispatcher),
    )
    .await
    .expect("cancellation should stop the batch promptly");

    assert!(summary.cancelled);
    assert_eq!(summary.converted.len(), 0);
    assert_eq!(summary.interrupted, 4);
    assert_eq!(summary.exit_code(), EXIT_INTERRUPTED);
    assert!(!harness.out("1.mp3").exists());
}
