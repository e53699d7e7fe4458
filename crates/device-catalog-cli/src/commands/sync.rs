use anyhow::Result;
use device_catalog::{Feedback, SyncPipeline, SyncReport};

use super::format;

/// Print feedback items to stderr.
pub fn print_feedback(feedback: &[Feedback]) {
    for item in feedback {
        eprintln!("{item}");
    }
}

/// Run one sync and print the created devices to stdout, diagnostics to stderr.
pub async fn run(pipeline: &SyncPipeline) -> Result<SyncReport> {
    println!("Syncing devices from {}...", pipeline.provider_label());

    let report = pipeline.run().await?;

    print_feedback(&report.feedback);
    format::print_device_table(&report.created);

    println!(
        "Created {} devices ({} duplicates skipped, {} rejected).",
        report.created.len(),
        report.dropped_duplicates,
        report.failed
    );

    Ok(report)
}
