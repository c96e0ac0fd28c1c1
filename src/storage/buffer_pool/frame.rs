//! Buffer frame for holding a single cached page.

use crate::storage::page::{PageNum, PAGE_SIZE};

/// A frame in the buffer pool that holds a single page.
///
/// Each frame tracks:
/// - The page currently loaded (if any)
/// - Whether the page has been modified (dirty)
/// - How many clients are currently using the page (pin count)
/// - The replacement-policy metadata (`last_access`, `use_count`,
///   `loaded_at`, `referenced`)
#[derive(Debug)]
pub struct Frame {
    /// The page currently loaded in this frame, if any.
    pub page_num: Option<PageNum>,
    /// Raw page data.
    pub data: [u8; PAGE_SIZE],
    /// Number of active pins on this page.
    pub pin_count: u32,
    /// Whether the page has been modified since load or last write-back.
    pub dirty: bool,
    /// Tick of the most recent pin, for LRU ordering.
    pub last_access: u64,
    /// Number of pins since the page was loaded, for LFU ordering.
    pub use_count: u64,
    /// Tick at which the page was loaded, for FIFO ordering.
    pub loaded_at: u64,
    /// Reference bit for the clock policy; set on every pin.
    pub referenced: bool,
}

impl Frame {
    /// Creates a new empty buffer frame.
    #[must_use]
    pub fn new() -> Self {
        Self {
            page_num: None,
            data: [0u8; PAGE_SIZE],
            pin_count: 0,
            dirty: false,
            last_access: 0,
            use_count: 0,
            loaded_at: 0,
            referenced: false,
        }
    }

    /// Increments the pin count and stamps the policy metadata.
    pub fn pin(&mut self, tick: u64) {
        self.pin_count = self.pin_count.saturating_add(1);
        self.last_access = tick;
        self.use_count += 1;
        self.referenced = true;
    }

    /// Decrements the pin count, saturating at zero.
    pub fn unpin(&mut self) {
        self.pin_count = self.pin_count.saturating_sub(1);
    }

    /// Loads page contents into the frame, resetting all bookkeeping.
    pub fn load(&mut self, page_num: PageNum, data: [u8; PAGE_SIZE], dirty: bool, tick: u64) {
        self.page_num = Some(page_num);
        self.data = data;
        self.pin_count = 1;
        self.dirty = dirty;
        self.last_access = tick;
        self.use_count = 1;
        self.loaded_at = tick;
        self.referenced = true;
    }

    /// Returns whether this frame may be chosen as a replacement victim.
    ///
    /// A frame is eligible only if it holds a page and no client has it
    /// pinned.
    #[must_use]
    pub fn is_evictable(&self) -> bool {
        self.page_num.is_some() && self.pin_count == 0
    }

    /// Returns whether this frame is empty (no page loaded).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.page_num.is_none()
    }
}

impl Default for Frame {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_frame() {
        let frame = Frame::new();
        assert!(frame.is_empty());
        assert!(!frame.is_evictable());
        assert_eq!(frame.pin_count, 0);
        assert!(!frame.dirty);
    }

    #[test]
    fn test_pin_unpin() {
        let mut frame = Frame::new();
        frame.load(3, [0u8; PAGE_SIZE], false, 1);
        assert_eq!(frame.pin_count, 1);
        assert!(!frame.is_evictable());

        frame.pin(2);
        assert_eq!(frame.pin_count, 2);
        assert_eq!(frame.use_count, 2);
        assert_eq!(frame.last_access, 2);
        // Load tick is not disturbed by later pins
        assert_eq!(frame.loaded_at, 1);

        frame.unpin();
        frame.unpin();
        assert!(frame.is_evictable());

        // Saturates at zero
        frame.unpin();
        assert_eq!(frame.pin_count, 0);
    }

    #[test]
    fn test_load_resets_bookkeeping() {
        let mut frame = Frame::new();
        frame.load(1, [0u8; PAGE_SIZE], false, 1);
        frame.pin(2);
        frame.pin(3);
        frame.dirty = true;
        frame.pin_count = 0;

        frame.load(9, [5u8; PAGE_SIZE], false, 10);
        assert_eq!(frame.page_num, Some(9));
        assert_eq!(frame.pin_count, 1);
        assert!(!frame.dirty);
        assert_eq!(frame.use_count, 1);
        assert_eq!(frame.loaded_at, 10);
        assert_eq!(frame.data[0], 5);
    }
}
