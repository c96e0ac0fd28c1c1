//! Heap-file tables: the record manager.

use std::path::{Path, PathBuf};

use crate::catalog::Schema;
use crate::error::{HeapDbError, Result};
use crate::expr::Expr;
use crate::storage::buffer_pool::{BufferPool, ReplacementPolicy};
use crate::storage::heap::layout::RecordLayout;
use crate::storage::heap::table_meta::{self, TableMeta};
use crate::storage::heap::TableScan;
use crate::storage::page::{PageFile, PageNum};
use crate::types::{Record, Rid};

/// Options for opening a table's buffer pool.
///
/// Record operations pin at most one page at a time, so the default pool
/// is tiny; larger pools only improve locality for re-visited pages.
#[derive(Debug, Clone, Copy)]
pub struct TableOptions {
    /// Number of frames in the per-table buffer pool.
    pub pool_capacity: usize,
    /// Replacement policy of the per-table buffer pool.
    pub policy: ReplacementPolicy,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            pool_capacity: 3,
            policy: ReplacementPolicy::Fifo,
        }
    }
}

/// An open heap-file table.
///
/// One file per table: page 0 holds the text catalog, pages >= 1 hold
/// slotted record data. All page traffic goes through the table's buffer
/// pool. Records are fixed width (`schema.record_size()`), addressed by
/// stable [`Rid`]s, and never moved.
pub struct Table {
    path: PathBuf,
    schema: Schema,
    layout: RecordLayout,
    meta: TableMeta,
    pub(crate) pool: BufferPool,
}

impl Table {
    /// Creates a new table file with the given schema and an empty
    /// catalog, then releases it again.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or the catalog
    /// cannot be written.
    pub fn create(path: &Path, schema: &Schema) -> Result<()> {
        PageFile::create(path)?;
        let options = TableOptions::default();
        let pool = BufferPool::new(path, options.pool_capacity, options.policy)?;
        write_catalog(&pool, &TableMeta::empty(), schema)?;
        pool.shutdown()
    }

    /// Opens an existing table with default pool options.
    ///
    /// The persisted catalog stores attribute metadata but no key
    /// indices; a single key attribute at index 0 is assumed.
    ///
    /// # Errors
    ///
    /// Returns `FileNotFound` if the file does not exist, or a catalog
    /// error if page 0 cannot be parsed.
    pub fn open(path: &Path) -> Result<Self> {
        Self::open_with(path, TableOptions::default())
    }

    /// Opens an existing table with explicit pool options.
    ///
    /// # Errors
    ///
    /// See [`Table::open`].
    pub fn open_with(path: &Path, options: TableOptions) -> Result<Self> {
        let pool = BufferPool::new(path, options.pool_capacity, options.policy)?;
        let (meta, schema) = {
            let handle = pool.pin(0)?;
            table_meta::decode(handle.data())?
        };
        let layout = RecordLayout::new(schema.record_size());

        Ok(Self {
            path: path.to_path_buf(),
            schema,
            layout,
            meta,
            pool,
        })
    }

    /// Persists the catalog back to page 0 and shuts the pool down.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog write or the shutdown fails.
    pub fn close(self) -> Result<()> {
        write_catalog(&self.pool, &self.meta, &self.schema)?;
        self.pool.shutdown()
    }

    /// Removes a table file from disk.
    ///
    /// # Errors
    ///
    /// Returns `FileNotFound` if the file does not exist.
    pub fn destroy(path: &Path) -> Result<()> {
        PageFile::destroy(path)
    }

    /// Returns the table file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the table schema.
    #[must_use]
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Returns the slotted-page layout of this table.
    #[must_use]
    pub fn layout(&self) -> RecordLayout {
        self.layout
    }

    /// Returns the number of live records.
    #[must_use]
    pub fn num_tuples(&self) -> u64 {
        self.meta.num_tuples
    }

    /// Inserts a record, assigning it the identifier of the slot it
    /// landed in.
    ///
    /// The record keeps its identifier until deleted; records are never
    /// moved. At most two placement attempts are needed: if the page the
    /// free-page hint names turns out to be full, the hint is cleared and
    /// the retry appends a fresh page.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload length does not match the schema
    /// or an I/O operation fails.
    pub fn insert(&mut self, record: &mut Record) -> Result<Rid> {
        if record.data().len() != self.layout.record_size() {
            return Err(HeapDbError::SchemaError(format!(
                "Record payload is {} bytes, schema requires {}",
                record.data().len(),
                self.layout.record_size()
            )));
        }

        for _ in 0..2 {
            let page_num = match self.meta.next_free_page {
                Some(page) => page,
                None => {
                    let page = self.append_data_page()?;
                    self.meta.next_free_page = Some(page);
                    page
                }
            };

            let mut handle = self.pool.pin(page_num)?;
            let Some(slot) = self.layout.find_free_slot(handle.data()) else {
                // Bookkeeping drifted: the hinted page is full
                drop(handle);
                self.meta.next_free_page = None;
                continue;
            };

            let data = handle.data_mut();
            self.layout.record_mut(data, slot).copy_from_slice(record.data());
            self.layout.set_slot_in_use(data, slot, true);
            let used = self.layout.slots_used(data) + 1;
            self.layout.set_slots_used(data, used);
            drop(handle);

            self.meta.num_tuples += 1;
            self.meta.next_free_page = if used as usize == self.layout.slots_per_page() {
                None
            } else {
                Some(page_num)
            };

            let rid = Rid::new(page_num, slot as u32);
            record.set_id(rid);
            return Ok(rid);
        }

        Err(HeapDbError::StorageError(
            "Insert failed to place a record on a fresh page".into(),
        ))
    }

    /// Deletes the record at `rid`. Deleting an already-free slot is a
    /// silent no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if an I/O operation fails.
    pub fn delete(&mut self, rid: Rid) -> Result<()> {
        if !self.rid_in_file(rid)? {
            return Ok(());
        }

        let mut handle = self.pool.pin(rid.page)?;
        let slot = rid.slot as usize;
        if !self.layout.slot_in_use(handle.data(), slot) {
            return Ok(());
        }

        let data = handle.data_mut();
        self.layout.set_slot_in_use(data, slot, false);
        let used = self.layout.slots_used(data) - 1;
        self.layout.set_slots_used(data, used);
        drop(handle);

        self.meta.num_tuples -= 1;
        // A full page just gained a free slot; remember it
        if used as usize == self.layout.slots_per_page() - 1 {
            self.meta.next_free_page = Some(rid.page);
        }
        Ok(())
    }

    /// Overwrites the payload of an existing record in place. The
    /// identifier is preserved.
    ///
    /// # Errors
    ///
    /// Returns an error if the record has no identifier, the target slot
    /// is free, or an I/O operation fails.
    pub fn update(&mut self, record: &Record) -> Result<()> {
        let rid = record.id().ok_or_else(|| {
            HeapDbError::SchemaError("Record has no identifier; insert it first".into())
        })?;
        if record.data().len() != self.layout.record_size() {
            return Err(HeapDbError::SchemaError(format!(
                "Record payload is {} bytes, schema requires {}",
                record.data().len(),
                self.layout.record_size()
            )));
        }
        if !self.rid_in_file(rid)? {
            return Err(HeapDbError::NonExistingRecord(rid));
        }

        let mut handle = self.pool.pin(rid.page)?;
        let slot = rid.slot as usize;
        if !self.layout.slot_in_use(handle.data(), slot) {
            return Err(HeapDbError::NonExistingRecord(rid));
        }

        self.layout
            .record_mut(handle.data_mut(), slot)
            .copy_from_slice(record.data());
        Ok(())
    }

    /// Fetches the record at `rid`.
    ///
    /// # Errors
    ///
    /// Returns `RecordNotFound` if the slot is free or the identifier
    /// lies outside the table.
    pub fn get(&self, rid: Rid) -> Result<Record> {
        if !self.rid_in_file(rid)? {
            return Err(HeapDbError::RecordNotFound(rid));
        }

        let handle = self.pool.pin(rid.page)?;
        let slot = rid.slot as usize;
        if !self.layout.slot_in_use(handle.data(), slot) {
            return Err(HeapDbError::RecordNotFound(rid));
        }

        let payload = self.layout.record(handle.data(), slot).to_vec();
        Ok(Record::from_parts(rid, payload))
    }

    /// Starts a sequential scan over all live records, optionally
    /// filtered by a predicate.
    ///
    /// Records come back in ascending page order, slots ascending within
    /// a page. The scan observes a live view of the table.
    #[must_use]
    pub fn scan(&self, predicate: Option<Expr>) -> TableScan<'_> {
        TableScan::new(self, predicate)
    }

    fn append_data_page(&mut self) -> Result<PageNum> {
        let mut handle = self.pool.new_page()?;
        self.layout.init_page(handle.data_mut());
        Ok(handle.page_num())
    }

    /// Whether `rid` names a data-page slot that exists in the file.
    fn rid_in_file(&self, rid: Rid) -> Result<bool> {
        Ok(rid.page >= 1
            && (rid.slot as usize) < self.layout.slots_per_page()
            && rid.page < self.pool.total_pages()?)
    }
}

/// Writes the catalog to page 0 and forces it to disk.
fn write_catalog(pool: &BufferPool, meta: &TableMeta, schema: &Schema) -> Result<()> {
    let mut handle = pool.pin(0)?;
    table_meta::encode(meta, schema, handle.data_mut())?;
    handle.force()
}
