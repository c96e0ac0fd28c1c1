//! Replacement policies for victim selection.
//!
//! All policies share one eligibility rule: a frame with a non-zero pin
//! count is never selected. Ties break toward the lowest frame index.
//! When every frame is pinned no victim exists and selection fails with
//! [`HeapDbError::AllFramesPinned`].

use parking_lot::RwLock;

use crate::error::{HeapDbError, Result};
use crate::storage::buffer_pool::frame::Frame;

/// Page replacement policy of a buffer pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReplacementPolicy {
    /// Evict the page loaded longest ago.
    #[default]
    Fifo,
    /// Evict the page pinned least recently.
    Lru,
    /// Second-chance clock sweep over reference bits.
    Clock,
    /// Evict the page pinned least often since it was loaded.
    Lfu,
}

impl ReplacementPolicy {
    /// Selects a victim frame index among the evictable frames.
    ///
    /// # Errors
    ///
    /// Returns `AllFramesPinned` if no frame is evictable.
    pub(crate) fn select_victim(
        self,
        frames: &[RwLock<Frame>],
        clock_hand: &mut usize,
    ) -> Result<usize> {
        match self {
            ReplacementPolicy::Fifo => min_by_key(frames, |f| f.loaded_at),
            ReplacementPolicy::Lru => min_by_key(frames, |f| f.last_access),
            ReplacementPolicy::Lfu => min_by_key(frames, |f| f.use_count),
            ReplacementPolicy::Clock => clock_sweep(frames, clock_hand),
        }
    }
}

/// Picks the evictable frame with the smallest key; strict comparison
/// keeps the lowest index on ties.
fn min_by_key(frames: &[RwLock<Frame>], key: impl Fn(&Frame) -> u64) -> Result<usize> {
    let mut victim: Option<(usize, u64)> = None;
    for (idx, frame_lock) in frames.iter().enumerate() {
        let frame = frame_lock.read();
        if !frame.is_evictable() {
            continue;
        }
        let k = key(&frame);
        if victim.map_or(true, |(_, best)| k < best) {
            victim = Some((idx, k));
        }
    }
    victim.map(|(idx, _)| idx).ok_or(HeapDbError::AllFramesPinned)
}

/// Advances the shared hand through the frames, clearing reference bits,
/// and selects the first evictable frame whose bit is already clear. Two
/// full sweeps visit every frame with and without its reference bit, so
/// a third is never needed.
fn clock_sweep(frames: &[RwLock<Frame>], clock_hand: &mut usize) -> Result<usize> {
    for _ in 0..frames.len() * 2 {
        let idx = *clock_hand;
        *clock_hand = (idx + 1) % frames.len();

        let mut frame = frames[idx].write();
        if !frame.is_evictable() {
            continue;
        }
        if frame.referenced {
            frame.referenced = false;
        } else {
            return Ok(idx);
        }
    }
    Err(HeapDbError::AllFramesPinned)
}
