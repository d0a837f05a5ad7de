//! Per-document processing tokens and the deferred tag queue.
//!
//! A scan is synchronous, but hosts run them from editor events and file
//! watchers. [`ProcessingRegistry`] keeps two scans of the same note from
//! overlapping; [`TagQueue`] collects tag-writing requests from many scans
//! and hands them to a [`TagSink`] in coalesced batches.

use std::collections::{BTreeMap, HashSet};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use relative_path::{RelativePath, RelativePathBuf};

use crate::scan::ScanResult;

/// Tracks which documents are currently being processed.
#[derive(Debug, Clone, Default)]
pub struct ProcessingRegistry {
    active: Arc<Mutex<HashSet<RelativePathBuf>>>,
}

/// Proof that the holder is the only one processing `id`.
///
/// Dropping the token releases the document.
#[derive(Debug)]
pub struct ProcessingToken {
    id: RelativePathBuf,
    active: Arc<Mutex<HashSet<RelativePathBuf>>>,
}

impl ProcessingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A token for `id`, or `None` while another token for it is alive.
    pub fn try_acquire(&self, id: &RelativePath) -> Option<ProcessingToken> {
        let mut active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        if !active.insert(id.to_relative_path_buf()) {
            log::debug!("{id} is already being processed");
            return None;
        }
        Some(ProcessingToken {
            id: id.to_relative_path_buf(),
            active: Arc::clone(&self.active),
        })
    }

    pub fn is_processing(&self, id: &RelativePath) -> bool {
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(id)
    }
}

impl ProcessingToken {
    pub fn id(&self) -> &RelativePath {
        &self.id
    }
}

impl Drop for ProcessingToken {
    fn drop(&mut self) {
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.id);
    }
}

/// Tags one scan wants written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagRequest {
    pub source: RelativePathBuf,
    /// Tags for the source note itself.
    pub source_tags: Vec<String>,
    /// Target note name to tag.
    pub target_tags: BTreeMap<String, String>,
}

impl TagRequest {
    /// The tag work a scan produced, if any.
    pub fn from_scan(source: &RelativePath, result: &ScanResult) -> Option<Self> {
        if result.source_tags.is_empty() && result.pending_tag_requests.is_empty() {
            return None;
        }
        Some(Self {
            source: source.to_relative_path_buf(),
            source_tags: result.source_tags.clone(),
            target_tags: result.pending_tag_requests.clone(),
        })
    }

    fn merge(&mut self, other: TagRequest) {
        for tag in other.source_tags {
            if !self.source_tags.contains(&tag) {
                self.source_tags.push(tag);
            }
        }
        self.target_tags.extend(other.target_tags);
    }
}

/// Writes tags into notes. Implemented by whoever owns the vault.
pub trait TagSink {
    fn apply_tag_requests(
        &self,
        source: &RelativePath,
        source_tags: &[String],
        target_tags: &BTreeMap<String, String>,
    ) -> anyhow::Result<()>;
}

/// Sending half of the tag queue. Cheap to clone.
#[derive(Debug, Clone)]
pub struct TagSender {
    tx: Sender<TagRequest>,
}

impl TagSender {
    /// Queues `request`. Returns false once the queue has been dropped.
    pub fn send(&self, request: TagRequest) -> bool {
        self.tx.send(request).is_ok()
    }
}

/// Receiving half of the tag queue.
#[derive(Debug)]
pub struct TagQueue {
    rx: Receiver<TagRequest>,
}

impl TagQueue {
    pub fn channel() -> (TagSender, TagQueue) {
        let (tx, rx) = mpsc::channel();
        (TagSender { tx }, TagQueue { rx })
    }

    /// Blocks for the first request, then keeps collecting until `window`
    /// passes without another one. Requests are merged per source note and
    /// returned in arrival order of their first request.
    ///
    /// Returns an empty batch once every sender is gone and the queue is
    /// empty.
    pub fn drain_coalesced(&self, window: Duration) -> Vec<TagRequest> {
        let Ok(first) = self.rx.recv() else {
            return Vec::new();
        };
        let mut batch = vec![first];
        loop {
            match self.rx.recv_timeout(window) {
                Ok(request) => batch.push(request),
                Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => break,
            }
        }
        coalesce(batch)
    }

    /// Drains one coalesced batch into `sink`. Failed writes are logged and
    /// dropped; the number of requests written is returned.
    pub fn flush_into(&self, sink: &dyn TagSink, window: Duration) -> usize {
        let mut written = 0;
        for request in self.drain_coalesced(window) {
            match sink.apply_tag_requests(
                &request.source,
                &request.source_tags,
                &request.target_tags,
            ) {
                Ok(()) => written += 1,
                Err(e) => log::warn!("Failed to write tags for {}: {e:#}", request.source),
            }
        }
        written
    }
}

fn coalesce(batch: Vec<TagRequest>) -> Vec<TagRequest> {
    let mut merged: Vec<TagRequest> = Vec::new();
    for request in batch {
        match merged.iter_mut().find(|r| r.source == request.source) {
            Some(existing) => existing.merge(request),
            None => merged.push(request),
        }
    }
    merged
}
