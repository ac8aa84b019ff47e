//! Concurrent upload coordinator
//!
//! Imports several files for one owner at the same time. Each file gets its
//! own worker thread that reads, classifies and stores that file as one unit;
//! the coordinator waits for all of them and reports, per filename, what went
//! wrong. Files that succeeded stay stored even when a sibling fails.

use std::collections::BTreeMap;
use std::io::Read;
use std::sync::mpsc;
use std::thread;

use crate::error::{YabaError, YabaResult};
use crate::import::{import_expenditures, ImportOptions};
use crate::models::OwnerId;
use crate::storage::PersistenceGateway;

use super::classification::ClassificationService;

/// One uploaded file
pub struct UploadedFile<R> {
    pub filename: String,
    pub reader: R,
}

impl<R: Read> UploadedFile<R> {
    pub fn new(filename: impl Into<String>, reader: R) -> Self {
        Self {
            filename: filename.into(),
            reader,
        }
    }
}

/// Outcome of an upload request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadReport {
    /// Rows stored, per successful filename
    pub imported: BTreeMap<String, usize>,
    /// Error message, per failed filename
    pub failures: BTreeMap<String, String>,
}

impl UploadReport {
    /// True when no file failed
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Total rows stored across all successful files
    pub fn total_rows(&self) -> usize {
        self.imported.values().sum()
    }

    fn record(&mut self, filename: String, outcome: YabaResult<usize>) {
        match outcome {
            Ok(rows) => *self.imported.entry(filename).or_insert(0) += rows,
            Err(err) => self.record_failure(filename, err.to_string()),
        }
    }

    pub(crate) fn record_failure(&mut self, filename: String, message: String) {
        tracing::warn!(file = %filename, error = %message, "upload failed");
        self.failures
            .entry(filename)
            .and_modify(|existing| {
                existing.push_str("; ");
                existing.push_str(&message);
            })
            .or_insert(message);
    }
}

/// Runs one import per uploaded file, concurrently
pub struct UploadCoordinator<'a> {
    gateway: &'a dyn PersistenceGateway,
    options: ImportOptions,
}

impl<'a> UploadCoordinator<'a> {
    /// Create a new upload coordinator
    pub fn new(gateway: &'a dyn PersistenceGateway, options: ImportOptions) -> Self {
        Self { gateway, options }
    }

    /// Import and store every file, returning per-file outcomes
    ///
    /// Never fails as a whole; a failed file shows up in
    /// [`UploadReport::failures`]. An empty `files` list gives an empty,
    /// successful report.
    pub fn upload<R>(&self, owner: OwnerId, files: Vec<UploadedFile<R>>) -> UploadReport
    where
        R: Read + Send,
    {
        let mut report = UploadReport::default();
        let (tx, rx) = mpsc::channel();

        thread::scope(|scope| {
            let mut workers = Vec::with_capacity(files.len());
            for file in files {
                let tx = tx.clone();
                let filename = file.filename.clone();
                let worker = scope.spawn(move || {
                    // The receiver lives until the scope ends
                    let _ = tx.send(self.process(owner, file));
                });
                workers.push((filename, worker));
            }
            drop(tx);

            for (filename, outcome) in rx.iter() {
                report.record(filename, outcome);
            }

            for (filename, worker) in workers {
                if worker.join().is_err() {
                    report.record_failure(filename, "import worker panicked".to_string());
                }
            }
        });

        tracing::info!(
            %owner,
            succeeded = report.imported.len(),
            failed = report.failures.len(),
            rows = report.total_rows(),
            "upload finished"
        );
        report
    }

    fn process<R: Read>(&self, owner: OwnerId, file: UploadedFile<R>) -> (String, YabaResult<usize>) {
        let UploadedFile { filename, reader } = file;

        let outcome = import_expenditures(owner, &filename, reader, &self.options).and_then(|rows| {
            ClassificationService::new(self.gateway)
                .persist(owner, rows)
                .map_err(|e| YabaError::persist(&filename, e))
        });

        (filename, outcome)
    }
}
