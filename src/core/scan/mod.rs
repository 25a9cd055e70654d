//! # Scan Module
//!
//! Runs the duplicate detector for one directory at a time on a
//! background thread.
//!
//! Every [`DirectoryScanSession::start`] bumps the scan epoch. Results are
//! tagged with the epoch they were started under, and only results for
//! the current epoch are ever handed out, so a slow scan of an old
//! directory can never overwrite the list of a newer one.

use crate::core::detector::DuplicateDetector;
use crate::core::model::{flatten_groups, DuplicateGroup, Entry};
use crate::error::ScanError;
use crate::events::{null_sender, Event, EventSender, ScanEvent};
use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Monotonic scan counter
pub type ScanEpoch = u64;

struct ScanReport {
    epoch: ScanEpoch,
    directory: PathBuf,
    result: Result<Vec<DuplicateGroup>, ScanError>,
}

/// Result of the current scan, ready to replace the list
#[derive(Debug)]
pub struct ScanOutcome {
    pub epoch: ScanEpoch,
    pub directory: PathBuf,
    pub groups: usize,
    pub entries: Vec<Entry>,
}

/// Background scan runner with epoch-based staleness
pub struct DirectoryScanSession {
    detector: Arc<dyn DuplicateDetector>,
    epoch: ScanEpoch,
    directory: Option<PathBuf>,
    busy: bool,
    sender: Sender<ScanReport>,
    receiver: Receiver<ScanReport>,
    events: EventSender,
}

impl DirectoryScanSession {
    pub fn new(detector: Arc<dyn DuplicateDetector>) -> Self {
        let (sender, receiver) = unbounded();
        Self {
            detector,
            epoch: 0,
            directory: None,
            busy: false,
            sender,
            receiver,
            events: null_sender(),
        }
    }

    pub fn with_events(mut self, events: EventSender) -> Self {
        self.events = events;
        self
    }

    /// Start scanning `directory`, superseding any scan in progress
    pub fn start(&mut self, directory: &Path) -> ScanEpoch {
        self.epoch = self.epoch.wrapping_add(1);
        self.directory = Some(directory.to_path_buf());
        self.busy = true;

        let epoch = self.epoch;
        info!("Scanning {} (epoch {})", directory.display(), epoch);
        self.events.send(Event::Scan(ScanEvent::Started {
            directory: directory.to_path_buf(),
            epoch,
        }));

        let detector = Arc::clone(&self.detector);
        let sender = self.sender.clone();
        let worker_dir = directory.to_path_buf();
        let spawned = thread::Builder::new()
            .name(format!("scan-{}", epoch))
            .spawn(move || {
                let result = catch_unwind(AssertUnwindSafe(|| detector.find_duplicates(&worker_dir)))
                    .unwrap_or(Err(ScanError::Disconnected));
                let _ = sender.send(ScanReport {
                    epoch,
                    directory: worker_dir,
                    result,
                });
            });

        if let Err(e) = spawned {
            warn!("Could not start scan thread: {}", e);
            let _ = self.sender.send(ScanReport {
                epoch,
                directory: directory.to_path_buf(),
                result: Err(ScanError::Disconnected),
            });
        }

        epoch
    }

    /// Take the current scan's result if it has landed.
    ///
    /// Results from superseded scans are dropped along the way.
    pub fn poll(&mut self) -> Option<ScanOutcome> {
        while let Ok(report) = self.receiver.try_recv() {
            if let Some(outcome) = self.accept(report) {
                return Some(outcome);
            }
        }
        None
    }

    /// Block until the current scan lands or `timeout` passes
    pub fn wait(&mut self, timeout: Duration) -> Option<ScanOutcome> {
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.receiver.recv_timeout(remaining) {
                Ok(report) => {
                    if let Some(outcome) = self.accept(report) {
                        return Some(outcome);
                    }
                }
                Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => {
                    return None
                }
            }
        }
    }

    fn accept(&mut self, report: ScanReport) -> Option<ScanOutcome> {
        if report.epoch != self.epoch {
            debug!(
                "Dropping result of superseded scan {} (current {})",
                report.epoch, self.epoch
            );
            self.events.send(Event::Scan(ScanEvent::Superseded {
                epoch: report.epoch,
                current: self.epoch,
            }));
            return None;
        }

        self.busy = false;
        let groups = match report.result {
            Ok(groups) => groups,
            Err(e) => {
                warn!("Scan of {} failed: {}", report.directory.display(), e);
                self.events.send(Event::Scan(ScanEvent::Failed {
                    directory: report.directory.clone(),
                    message: e.to_string(),
                }));
                Vec::new()
            }
        };

        let entries = flatten_groups(&groups);
        info!(
            "Scan of {} found {} groups ({} files)",
            report.directory.display(),
            groups.len(),
            entries.len()
        );
        self.events.send(Event::Scan(ScanEvent::Completed {
            directory: report.directory.clone(),
            epoch: report.epoch,
            groups: groups.len(),
            entries: entries.len(),
        }));

        Some(ScanOutcome {
            epoch: report.epoch,
            directory: report.directory,
            groups: groups.len(),
            entries,
        })
    }

    pub fn epoch(&self) -> ScanEpoch {
        self.epoch
    }

    /// Directory of the most recent scan
    pub fn directory(&self) -> Option<&Path> {
        self.directory.as_deref()
    }

    /// Whether the current scan is still running
    pub fn is_busy(&self) -> bool {
        self.busy
    }
}
