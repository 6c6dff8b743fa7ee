/// Upload admission queue
///
/// Uploads run over a small fixed pool of simultaneous transfers fed
/// from a FIFO queue: picking twenty files enqueues twenty entries but
/// only three requests leave the machine at once, and every completed
/// or failed transfer admits the next. This is admission control, not
/// backpressure; the queue itself is unbounded in memory.

use std::collections::VecDeque;
use std::path::PathBuf;

/// Simultaneous transfer limit
pub const MAX_CONCURRENT_UPLOADS: usize = 3;

#[derive(Debug, Default)]
pub struct UploadQueue {
    queued: VecDeque<PathBuf>,
    active: usize,
    succeeded: usize,
    failed: usize,
}

impl UploadQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add files to the back of the queue (does not start them;
    /// call `admit` afterwards)
    pub fn enqueue(&mut self, files: Vec<PathBuf>) {
        self.queued.extend(files);
    }

    /// Pop as many queued files as free transfer slots allow
    pub fn admit(&mut self) -> Vec<PathBuf> {
        let mut admitted = Vec::new();
        while self.active < MAX_CONCURRENT_UPLOADS {
            match self.queued.pop_front() {
                Some(path) => {
                    self.active += 1;
                    admitted.push(path);
                }
                None => break,
            }
        }
        admitted
    }

    /// One transfer finished; frees its slot for the next `admit`
    pub fn finish(&mut self, success: bool) {
        debug_assert!(self.active > 0, "finish without matching admit");
        self.active = self.active.saturating_sub(1);
        if success {
            self.succeeded += 1;
        } else {
            self.failed += 1;
        }
    }

    pub fn in_flight(&self) -> usize {
        self.active
    }

    pub fn queued_len(&self) -> usize {
        self.queued.len()
    }

    /// True while any transfer is running or waiting
    pub fn is_busy(&self) -> bool {
        self.active > 0 || !self.queued.is_empty()
    }

    /// When the whole batch has drained, return `(succeeded, failed)`
    /// and reset the tallies for the next batch
    pub fn take_batch_summary(&mut self) -> Option<(usize, usize)> {
        if self.is_busy() || (self.succeeded == 0 && self.failed == 0) {
            return None;
        }
        let summary = (self.succeeded, self.failed);
        self.succeeded = 0;
        self.failed = 0;
        Some(summary)
    }
}
