use std::fmt::Write;

use flac2mp3_core::BatchSummary;

/// Renders the end-of-run report: counts first, then one line per failure.
pub fn render(summary: &BatchSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Converted: {}  Skipped: {}  Copied: {}  Failed: {}",
        summary.converted.len(),
        summary.skipped.len(),
        summary.copied.len(),
        summary.failed_count()
    );
    if !summary.busy.is_zero() {
        let _ = writeln!(out, "Encoding time: {:.1}s", summary.busy.as_secs_f64());
    }
    if summary.cancelled {
        let _ = writeln!(out, "Interrupted: {} tasks not completed", summary.interrupted);
    }

    let failures = summary.all_failures();
    if !failures.is_empty() {
        let _ = writeln!(out, "Failures:");
        for failure in failures {
            let _ = writeln!(out, "  {}: {}", failure.path.display(), failure.error);
        }
    }
    out
}
