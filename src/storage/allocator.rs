//! Segment allocation for concurrent document writes.
//!
//! The allocator owns a table of known segments, each either
//! [`SegmentState::Free`] or [`SegmentState::Locked`]. A writer claims one
//! segment exclusively and receives a [`SegmentLease`]; dropping the lease
//! frees the segment again, whichever way the write ends. When every known
//! segment is locked the writer reserves a brand-new segment name instead, so
//! up to N writes proceed in parallel, one per segment.
//!
//! The table lives in process memory only. It offers no protection against a
//! second process writing to the same directory.

use std::collections::BTreeMap;
use std::sync::Arc;

use log::debug;
use parking_lot::Mutex;

/// Write state of one segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentState {
    /// No write in flight.
    Free,
    /// Exclusively claimed by one writer.
    Locked,
}

type SegmentTable = Arc<Mutex<BTreeMap<String, SegmentState>>>;

/// Table of known segments and their write state.
#[derive(Debug, Default, Clone)]
pub struct SegmentAllocator {
    segments: SegmentTable,
}

impl SegmentAllocator {
    /// Create an allocator that knows no segments.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an existing segment as free. Known segments are left untouched.
    pub fn register<S: Into<String>>(&self, segment: S) {
        self.segments
            .lock()
            .entry(segment.into())
            .or_insert(SegmentState::Free);
    }

    /// Claim the first free segment in name order.
    pub fn try_claim_free(&self) -> Option<SegmentLease> {
        let mut segments = self.segments.lock();
        let (name, state) = segments
            .iter_mut()
            .find(|(_, state)| **state == SegmentState::Free)?;
        *state = SegmentState::Locked;
        debug!("claimed segment {name}");
        Some(SegmentLease::new(self.segments.clone(), name.clone(), false))
    }

    /// Reserve a segment name that is not yet known, already locked.
    ///
    /// Returns `None` when the name is taken. The caller is expected to create
    /// the segment's files and to [`SegmentLease::discard`] the lease if that
    /// fails.
    pub fn reserve<S: Into<String>>(&self, segment: S) -> Option<SegmentLease> {
        let segment = segment.into();
        let mut segments = self.segments.lock();
        if segments.contains_key(&segment) {
            return None;
        }
        segments.insert(segment.clone(), SegmentState::Locked);
        debug!("reserved new segment {segment}");
        Some(SegmentLease::new(self.segments.clone(), segment, true))
    }

    /// Names of every known segment, sorted.
    pub fn segments(&self) -> Vec<String> {
        self.segments.lock().keys().cloned().collect()
    }

    /// Number of known segments.
    pub(crate) fn len(&self) -> usize {
        self.segments.lock().len()
    }

    #[cfg(test)]
    pub(crate) fn state(&self, segment: &str) -> Option<SegmentState> {
        self.segments.lock().get(segment).copied()
    }
}

/// Exclusive claim on one segment, released on drop.
#[derive(Debug)]
pub struct SegmentLease {
    segments: SegmentTable,
    segment: String,
    fresh: bool,
}

impl SegmentLease {
    fn new(segments: SegmentTable, segment: String, fresh: bool) -> Self {
        SegmentLease {
            segments,
            segment,
            fresh,
        }
    }

    /// Name of the claimed segment.
    pub fn segment(&self) -> &str {
        &self.segment
    }

    /// Whether the segment was reserved by this lease and has no files yet.
    pub fn is_fresh(&self) -> bool {
        self.fresh
    }

    /// Forget a fresh segment entirely instead of freeing it.
    ///
    /// Only a lease from [`SegmentAllocator::reserve`] may be discarded; a
    /// claimed segment already has files on disk.
    pub fn discard(self) {
        debug_assert!(self.fresh, "discarding existing segment {}", self.segment);
        self.segments.lock().remove(&self.segment);
        debug!("discarded segment {}", self.segment);
        // Drop finds no entry left to free.
    }
}

impl Drop for SegmentLease {
    fn drop(&mut self) {
        if let Some(state) = self.segments.lock().get_mut(&self.segment) {
            *state = SegmentState::Free;
        }
    }
}
