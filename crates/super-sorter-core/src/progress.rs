use crate::engine::{FileOutcome, OrganizeReport};

/// Trait for reporting organize progress.
///
/// The CLI implements it with indicatif. All methods have default no-op implementations.
pub trait ProgressReporter: Send + Sync {
    fn on_scan_start(&self, _root: &str) {}
    fn on_scan_complete(&self, _total_files: usize, _duration_secs: f64) {}
    fn on_organize_start(&self, _total_files: usize) {}
    fn on_file_complete(&self, _outcome: &FileOutcome, _processed: usize, _total_files: usize) {}
    fn on_organize_complete(&self, _report: &OrganizeReport) {}
}

/// No-op progress reporter for silent operation.
pub struct SilentReporter;

impl ProgressReporter for SilentReporter {}
