//! Fixed-block file I/O provider.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::error::{HeapDbError, Result};
use crate::storage::page::{PageNum, PAGE_SIZE};

/// A page file: a named file read and written in `PAGE_SIZE` blocks.
///
/// The file handle stays open for the lifetime of the `PageFile`; all
/// reads and writes are positioned at `page * PAGE_SIZE` offsets. The
/// file length is always a multiple of the page size.
#[derive(Debug)]
pub struct PageFile {
    path: PathBuf,
    file: File,
}

impl PageFile {
    /// Creates (or truncates) a page file containing exactly one zeroed
    /// page.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or written.
    pub fn create(path: &Path) -> Result<()> {
        let mut file = File::create(path).map_err(|e| {
            HeapDbError::StorageError(format!("Failed to create page file: {e}"))
        })?;
        file.write_all(&[0u8; PAGE_SIZE])
            .map_err(|e| HeapDbError::StorageError(format!("Failed to write first page: {e}")))?;
        file.sync_all()
            .map_err(|e| HeapDbError::StorageError(format!("Failed to sync page file: {e}")))?;
        Ok(())
    }

    /// Removes a page file from disk.
    ///
    /// # Errors
    ///
    /// Returns `FileNotFound` if the file does not exist, or a storage
    /// error if removal fails.
    pub fn destroy(path: &Path) -> Result<()> {
        std::fs::remove_file(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                HeapDbError::FileNotFound(path.display().to_string())
            } else {
                HeapDbError::StorageError(format!("Failed to remove page file: {e}"))
            }
        })
    }

    /// Opens an existing page file.
    ///
    /// # Errors
    ///
    /// Returns `FileNotFound` if the file does not exist.
    pub fn open(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    HeapDbError::FileNotFound(path.display().to_string())
                } else {
                    HeapDbError::StorageError(format!("Failed to open page file: {e}"))
                }
            })?;

        Ok(Self {
            path: path.to_path_buf(),
            file,
        })
    }

    /// Returns the path of the page file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the number of pages in the file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file metadata cannot be read.
    pub fn total_pages(&self) -> Result<PageNum> {
        let len = self
            .file
            .metadata()
            .map_err(|e| HeapDbError::StorageError(format!("Failed to get file metadata: {e}")))?
            .len();
        Ok(len.div_ceil(PAGE_SIZE as u64) as PageNum)
    }

    /// Extends the file with zeroed pages so it holds at least
    /// `num_pages` pages. Does nothing if the file is already large
    /// enough.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be extended.
    pub fn ensure_capacity(&mut self, num_pages: PageNum) -> Result<()> {
        if self.total_pages()? >= num_pages {
            return Ok(());
        }
        self.file
            .set_len(u64::from(num_pages) * PAGE_SIZE as u64)
            .map_err(|e| HeapDbError::StorageError(format!("Failed to extend file: {e}")))
    }

    /// Reads one page into `buf`.
    ///
    /// A short read (the page lies partly or wholly past the end of the
    /// file) zero-fills the remainder of the buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if the seek or read fails.
    pub fn read_page(&mut self, page: PageNum, buf: &mut [u8; PAGE_SIZE]) -> Result<()> {
        self.file
            .seek(SeekFrom::Start(u64::from(page) * PAGE_SIZE as u64))
            .map_err(|e| HeapDbError::StorageError(format!("Failed to seek to page {page}: {e}")))?;

        let mut filled = 0;
        while filled < PAGE_SIZE {
            match self.file.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {}
                Err(e) => {
                    return Err(HeapDbError::StorageError(format!(
                        "Failed to read page {page}: {e}"
                    )));
                }
            }
        }
        buf[filled..].fill(0);
        Ok(())
    }

    /// Writes one page from `buf`.
    ///
    /// # Errors
    ///
    /// Returns an error if the seek or write fails.
    pub fn write_page(&mut self, page: PageNum, buf: &[u8; PAGE_SIZE]) -> Result<()> {
        self.file
            .seek(SeekFrom::Start(u64::from(page) * PAGE_SIZE as u64))
            .map_err(|e| HeapDbError::StorageError(format!("Failed to seek to page {page}: {e}")))?;
        self.file
            .write_all(buf)
            .map_err(|e| HeapDbError::StorageError(format!("Failed to write page {page}: {e}")))
    }

    /// Appends a zeroed page to the file and returns its page number.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be extended.
    pub fn append_page(&mut self) -> Result<PageNum> {
        let page = self.total_pages()?;
        self.ensure_capacity(page + 1)?;
        Ok(page)
    }

    /// Flushes all buffered writes to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the sync fails.
    pub fn sync(&mut self) -> Result<()> {
        self.file
            .sync_all()
            .map_err(|e| HeapDbError::StorageError(format!("Failed to sync file: {e}")))
    }
}
