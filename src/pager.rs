//! Page cache over the backing file.
//!
//! Pages are loaded on demand into a fixed arena of `TABLE_MAX_PAGES` slots and
//! written back only when the caller asks for it. There is no eviction policy.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use tracing::debug;

use crate::error::{Error, Result};
use crate::{PAGE_SIZE, TABLE_MAX_PAGES};

pub type Page = [u8; PAGE_SIZE];

pub struct Pager {
    file: File,
    file_length: u64,
    pages: Vec<Option<Box<Page>>>,
}

impl Pager {
    /// Opens `path` for reading and writing, creating it if absent.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;
        let file_length = file.metadata()?.len();
        debug!(path = %path.display(), file_length, "opened pager");

        Ok(Self {
            file,
            file_length,
            pages: (0..TABLE_MAX_PAGES).map(|_| None).collect(),
        })
    }

    /// File length as recorded at open time.
    pub fn file_length(&self) -> u64 {
        self.file_length
    }

    /// Number of pages backed by file content at open time, counting a
    /// partial trailing page.
    pub fn num_file_pages(&self) -> usize {
        self.file_length.div_ceil(PAGE_SIZE as u64) as usize
    }

    pub fn is_cached(&self, page_num: usize) -> bool {
        matches!(self.pages.get(page_num), Some(Some(_)))
    }

    /// Returns the cached page, loading it from the file on a miss.
    ///
    /// Pages beyond the end of the file come back zeroed; a short read leaves
    /// the rest of the page zeroed.
    pub fn get_page(&mut self, page_num: usize) -> Result<&mut Page> {
        if page_num >= TABLE_MAX_PAGES {
            return Err(Error::PageOutOfBounds {
                page_num,
                max: TABLE_MAX_PAGES,
            });
        }

        if self.pages[page_num].is_none() {
            debug!(page_num, "page cache miss");
            let page = self.load_page(page_num)?;
            self.pages[page_num] = Some(page);
        }

        let page = self.pages[page_num].get_or_insert_with(|| Box::new([0u8; PAGE_SIZE]));
        Ok(&mut **page)
    }

    fn load_page(&self, page_num: usize) -> Result<Box<Page>> {
        let mut page = Box::new([0u8; PAGE_SIZE]);
        if page_num >= self.num_file_pages() {
            return Ok(page);
        }

        let mut file = &self.file;
        file.seek(SeekFrom::Start(page_offset(page_num)))?;
        let mut bytes = Vec::with_capacity(PAGE_SIZE);
        file.take(PAGE_SIZE as u64).read_to_end(&mut bytes)?;
        page[..bytes.len()].copy_from_slice(&bytes);
        debug!(page_num, loaded = bytes.len(), "loaded page from file");
        Ok(page)
    }

    /// Writes the first `bytes` bytes of a cached page to its place in the file.
    ///
    /// The page stays cached.
    pub fn flush(&mut self, page_num: usize, bytes: usize) -> Result<()> {
        let Some(Some(page)) = self.pages.get(page_num) else {
            return Err(Error::NullPageFlush { page_num });
        };
        if bytes == 0 || bytes > PAGE_SIZE {
            return Err(Error::InvalidFlushSize { page_num, bytes });
        }

        self.file.seek(SeekFrom::Start(page_offset(page_num)))?;
        self.file.write_all(&page[..bytes])?;
        debug!(page_num, bytes, "flushed page");
        Ok(())
    }

    /// Drops a cached page without writing it.
    pub fn evict(&mut self, page_num: usize) {
        if let Some(slot) = self.pages.get_mut(page_num) {
            *slot = None;
        }
    }

    /// Syncs file contents to disk and closes the file.
    pub fn close(self) -> Result<()> {
        self.file.sync_all()?;
        debug!("pager closed");
        Ok(())
    }
}

fn page_offset(page_num: usize) -> u64 {
    page_num as u64 * PAGE_SIZE as u64
}
