//! Buffer pool management for page caching.
//!
//! This module implements a fixed-capacity cache of page frames bound to
//! one page file. It provides:
//! - Page pinning and unpinning with reference counting
//! - Dirty tracking with write-back before any frame reuse
//! - Pluggable replacement policies (FIFO, LRU, CLOCK, LFU)
//! - RAII guards (`PageHandle`) for safe page access
//! - Physical I/O counters and per-frame introspection
//!
//! All disk traffic of the record manager flows through a pool; a frame
//! with a non-zero pin count is never evicted, and a dirty frame is never
//! discarded without being written back first.
//!
//! # Example
//!
//! ```ignore
//! let pool = BufferPool::new(&path, 16, ReplacementPolicy::Lru)?;
//! let mut handle = pool.pin(3)?;
//! handle.data_mut()[0] = 42; // marks the page dirty
//! drop(handle);              // unpins
//! pool.flush_all()?;
//! ```

mod frame;
mod replacement;

pub use frame::Frame;
pub use replacement::ReplacementPolicy;

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::{Mutex, RwLock};

use crate::error::{HeapDbError, Result};
use crate::storage::page::{PageFile, PageNum, PAGE_SIZE};

/// Buffer pool for managing an in-memory page cache over one page file.
#[derive(Debug)]
pub struct BufferPool {
    /// Buffer frames holding cached pages.
    frames: Vec<RwLock<Frame>>,
    /// Maps resident page numbers to frame indices.
    page_table: RwLock<HashMap<PageNum, usize>>,
    /// The page file all frames are bound to.
    page_file: Mutex<PageFile>,
    /// Replacement policy used for victim selection.
    policy: ReplacementPolicy,
    /// Shared hand for the clock policy.
    clock_hand: Mutex<usize>,
    /// Monotonically increasing counter stamped on pins and loads.
    tick: AtomicU64,
    /// Completed physical page reads.
    reads: AtomicU64,
    /// Completed physical page write-backs.
    writes: AtomicU64,
}

impl BufferPool {
    /// Opens a buffer pool of `capacity` frames over the page file at
    /// `path`.
    ///
    /// # Errors
    ///
    /// Returns `FileNotFound` if the file cannot be opened, or an error
    /// if `capacity` is zero.
    pub fn new(path: &Path, capacity: usize, policy: ReplacementPolicy) -> Result<Self> {
        if capacity == 0 {
            return Err(HeapDbError::BufferPoolError(
                "Buffer pool capacity must be greater than 0".into(),
            ));
        }

        let page_file = PageFile::open(path)?;
        let frames = (0..capacity).map(|_| RwLock::new(Frame::new())).collect();

        Ok(Self {
            frames,
            page_table: RwLock::new(HashMap::with_capacity(capacity)),
            page_file: Mutex::new(page_file),
            policy,
            clock_hand: Mutex::new(0),
            tick: AtomicU64::new(0),
            reads: AtomicU64::new(0),
            writes: AtomicU64::new(0),
        })
    }

    /// Returns the number of frames in the pool.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.frames.len()
    }

    /// Returns the replacement policy the pool was opened with.
    #[must_use]
    pub fn policy(&self) -> ReplacementPolicy {
        self.policy
    }

    /// Returns the total number of pages in the underlying file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file metadata cannot be read.
    pub fn total_pages(&self) -> Result<PageNum> {
        self.page_file.lock().total_pages()
    }

    fn next_tick(&self) -> u64 {
        self.tick.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Pins a page, loading it from disk if it is not resident.
    ///
    /// A resident hit bumps the pin count and the policy counters without
    /// any I/O. A miss takes a free frame (or evicts a victim, writing it
    /// back first if dirty), extends the file so the page exists, and
    /// reads it; short reads are zero-padded by the page file.
    ///
    /// # Errors
    ///
    /// Returns an error if every frame is pinned or an I/O operation
    /// fails. A failed victim write-back leaves the victim frame resident
    /// and dirty.
    pub fn pin(&self, page_num: PageNum) -> Result<PageHandle<'_>> {
        // Resident hit
        {
            let page_table = self.page_table.read();
            if let Some(&frame_idx) = page_table.get(&page_num) {
                let mut frame = self.frames[frame_idx].write();
                frame.pin(self.next_tick());
                return Ok(PageHandle {
                    pool: self,
                    frame_idx,
                    page_num,
                });
            }
        }

        let frame_idx = self.find_or_evict_frame()?;

        // Load from disk, creating the page if the file is short
        let mut data = [0u8; PAGE_SIZE];
        {
            let mut pf = self.page_file.lock();
            pf.ensure_capacity(page_num + 1)?;
            pf.read_page(page_num, &mut data)?;
        }
        self.reads.fetch_add(1, Ordering::Relaxed);

        {
            let mut frame = self.frames[frame_idx].write();
            frame.load(page_num, data, false, self.next_tick());
        }
        self.page_table.write().insert(page_num, frame_idx);

        Ok(PageHandle {
            pool: self,
            frame_idx,
            page_num,
        })
    }

    /// Appends a new zeroed page to the file and pins it.
    ///
    /// The frame starts dirty; no physical read is performed, so only the
    /// eventual write-back shows up in the I/O counters.
    ///
    /// # Errors
    ///
    /// Returns an error if every frame is pinned or the file cannot be
    /// extended.
    pub fn new_page(&self) -> Result<PageHandle<'_>> {
        let frame_idx = self.find_or_evict_frame()?;

        let page_num = self.page_file.lock().append_page()?;

        {
            let mut frame = self.frames[frame_idx].write();
            frame.load(page_num, [0u8; PAGE_SIZE], true, self.next_tick());
        }
        self.page_table.write().insert(page_num, frame_idx);

        Ok(PageHandle {
            pool: self,
            frame_idx,
            page_num,
        })
    }

    /// Writes a resident page back to disk if it is dirty.
    ///
    /// A clean page is a no-op and does not touch the write counter. The
    /// pin count is unchanged either way.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub fn flush_page(&self, page_num: PageNum) -> Result<()> {
        let frame_idx = {
            let page_table = self.page_table.read();
            match page_table.get(&page_num) {
                Some(&idx) => idx,
                None => return Ok(()), // Not resident, nothing to flush
            }
        };

        let mut frame = self.frames[frame_idx].write();
        if frame.dirty {
            self.page_file.lock().write_page(page_num, &frame.data)?;
            self.writes.fetch_add(1, Ordering::Relaxed);
            frame.dirty = false;
        }
        Ok(())
    }

    /// Writes back every dirty frame whose pin count is zero.
    ///
    /// # Errors
    ///
    /// Returns an error if any write fails.
    pub fn flush_all(&self) -> Result<()> {
        for frame_lock in &self.frames {
            let mut frame = frame_lock.write();
            if frame.dirty && frame.pin_count == 0 {
                if let Some(page_num) = frame.page_num {
                    self.page_file.lock().write_page(page_num, &frame.data)?;
                    self.writes.fetch_add(1, Ordering::Relaxed);
                    frame.dirty = false;
                }
            }
        }
        Ok(())
    }

    /// Flushes all unpinned dirty frames and verifies no pins remain.
    ///
    /// # Errors
    ///
    /// Returns `PoolHasPinnedPages` if any client still holds a pin; the
    /// pool is left intact in that case.
    pub fn shutdown(&self) -> Result<()> {
        self.flush_all()?;

        for frame_lock in &self.frames {
            if frame_lock.read().pin_count > 0 {
                return Err(HeapDbError::PoolHasPinnedPages);
            }
        }

        self.page_file.lock().sync()
    }

    /// Internal: unpins a frame (called when a `PageHandle` drops).
    fn unpin(&self, frame_idx: usize) {
        self.frames[frame_idx].write().unpin();
    }

    /// Internal: marks a frame dirty.
    fn mark_dirty(&self, frame_idx: usize) {
        self.frames[frame_idx].write().dirty = true;
    }

    /// Internal: finds an empty frame or evicts one.
    fn find_or_evict_frame(&self) -> Result<usize> {
        for (idx, frame_lock) in self.frames.iter().enumerate() {
            if frame_lock.read().is_empty() {
                return Ok(idx);
            }
        }
        self.evict_frame()
    }

    /// Internal: selects a victim, writes it back if dirty, and empties
    /// the frame. On write-back failure the frame keeps its page and
    /// dirty bit and the error propagates.
    fn evict_frame(&self) -> Result<usize> {
        let victim = {
            let mut hand = self.clock_hand.lock();
            self.policy.select_victim(&self.frames, &mut hand)?
        };

        let mut frame = self.frames[victim].write();
        if let Some(page_num) = frame.page_num {
            if frame.dirty {
                self.page_file.lock().write_page(page_num, &frame.data)?;
                self.writes.fetch_add(1, Ordering::Relaxed);
                frame.dirty = false;
            }
            self.page_table.write().remove(&page_num);
        }
        frame.page_num = None;

        Ok(victim)
    }

    // ---- Introspection -------------------------------------------------

    /// Returns the resident page number of each frame, `None` where the
    /// frame is empty.
    #[must_use]
    pub fn frame_contents(&self) -> Vec<Option<PageNum>> {
        self.frames.iter().map(|f| f.read().page_num).collect()
    }

    /// Returns the dirty flag of each frame.
    #[must_use]
    pub fn dirty_flags(&self) -> Vec<bool> {
        self.frames.iter().map(|f| f.read().dirty).collect()
    }

    /// Returns the pin count of each frame.
    #[must_use]
    pub fn pin_counts(&self) -> Vec<u32> {
        self.frames.iter().map(|f| f.read().pin_count).collect()
    }

    /// Returns the number of completed physical page reads.
    #[must_use]
    pub fn num_read_io(&self) -> u64 {
        self.reads.load(Ordering::Relaxed)
    }

    /// Returns the number of completed physical page write-backs.
    #[must_use]
    pub fn num_write_io(&self) -> u64 {
        self.writes.load(Ordering::Relaxed)
    }
}

/// RAII guard for a pinned page.
///
/// The guard borrows one frame's buffer; it stays valid until the guard
/// drops, which unpins the page.
#[derive(Debug)]
pub struct PageHandle<'a> {
    pool: &'a BufferPool,
    frame_idx: usize,
    page_num: PageNum,
}

impl PageHandle<'_> {
    /// Returns the page number this handle is pinned to.
    #[must_use]
    pub fn page_num(&self) -> PageNum {
        self.page_num
    }

    /// Returns a read-only view of the page data.
    #[must_use]
    #[allow(unsafe_code)]
    pub fn data(&self) -> &[u8] {
        let frame = self.pool.frames[self.frame_idx].read();
        // SAFETY: the buffer lives as long as the frame, and the frame
        // cannot be evicted or reloaded while this handle keeps it pinned
        unsafe { std::slice::from_raw_parts(frame.data.as_ptr(), PAGE_SIZE) }
    }

    /// Returns a mutable view of the page data and marks the page dirty.
    #[allow(unsafe_code)]
    pub fn data_mut(&mut self) -> &mut [u8] {
        let mut frame = self.pool.frames[self.frame_idx].write();
        frame.dirty = true;
        // SAFETY: same as `data` - the frame is pinned for the lifetime
        // of this handle
        unsafe { std::slice::from_raw_parts_mut(frame.data.as_mut_ptr(), PAGE_SIZE) }
    }

    /// Marks the page dirty without touching its bytes.
    pub fn mark_dirty(&self) {
        self.pool.mark_dirty(self.frame_idx);
    }

    /// Writes the page back to disk now if it is dirty.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub fn force(&self) -> Result<()> {
        self.pool.flush_page(self.page_num)
    }
}

impl Drop for PageHandle<'_> {
    fn drop(&mut self) {
        self.pool.unpin(self.frame_idx);
    }
}
