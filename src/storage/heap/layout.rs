//! Slotted-page layout for fixed-width records.
//!
//! Data pages (page numbers >= 1) hold records of one fixed size `R`:
//!
//! ```text
//! [0..4)           slots_used: u32 LE
//! [4..4+N)         slot usage bytes (0 = free, 1 = used)
//! [4+N..4+N+N*R)   record payloads, indexed by slot
//! ```
//!
//! where `N = (PAGE_SIZE - 4) / (R + 1)` is the slot capacity of a page.
//! The `slots_used` header is redundant with the usage array but lets a
//! full-page check skip the flag scan.

use crate::storage::page::PAGE_SIZE;

/// Byte size of the `slots_used` page header.
const HEADER_SIZE: usize = 4;

/// Computed slotted-page geometry for one record size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordLayout {
    record_size: usize,
    slots_per_page: usize,
}

impl RecordLayout {
    /// Computes the layout for records of `record_size` bytes.
    #[must_use]
    pub fn new(record_size: usize) -> Self {
        Self {
            record_size,
            slots_per_page: (PAGE_SIZE - HEADER_SIZE) / (record_size + 1),
        }
    }

    /// Returns the fixed record size in bytes.
    #[must_use]
    pub fn record_size(&self) -> usize {
        self.record_size
    }

    /// Returns how many records fit in one page.
    #[must_use]
    pub fn slots_per_page(&self) -> usize {
        self.slots_per_page
    }

    /// Reads the `slots_used` header.
    #[must_use]
    pub fn slots_used(&self, page: &[u8]) -> u32 {
        u32::from_le_bytes(page[0..HEADER_SIZE].try_into().unwrap_or([0; 4]))
    }

    /// Writes the `slots_used` header.
    pub fn set_slots_used(&self, page: &mut [u8], count: u32) {
        page[0..HEADER_SIZE].copy_from_slice(&count.to_le_bytes());
    }

    /// Returns whether the given slot's usage byte marks it used.
    #[must_use]
    pub fn slot_in_use(&self, page: &[u8], slot: usize) -> bool {
        page[HEADER_SIZE + slot] != 0
    }

    /// Sets or clears the given slot's usage byte.
    pub fn set_slot_in_use(&self, page: &mut [u8], slot: usize, used: bool) {
        page[HEADER_SIZE + slot] = u8::from(used);
    }

    /// Returns the payload bytes of the given slot.
    #[must_use]
    pub fn record<'a>(&self, page: &'a [u8], slot: usize) -> &'a [u8] {
        let start = self.record_offset(slot);
        &page[start..start + self.record_size]
    }

    /// Returns the mutable payload bytes of the given slot.
    pub fn record_mut<'a>(&self, page: &'a mut [u8], slot: usize) -> &'a mut [u8] {
        let start = self.record_offset(slot);
        &mut page[start..start + self.record_size]
    }

    /// Returns the lowest free slot, or `None` if the page is full.
    #[must_use]
    pub fn find_free_slot(&self, page: &[u8]) -> Option<usize> {
        (0..self.slots_per_page).find(|&slot| !self.slot_in_use(page, slot))
    }

    /// Zeroes a page and writes an empty header, making every slot free.
    pub fn init_page(&self, page: &mut [u8]) {
        page.fill(0);
        self.set_slots_used(page, 0);
    }

    fn record_offset(&self, slot: usize) -> usize {
        HEADER_SIZE + self.slots_per_page + slot * self.record_size
    }
}
