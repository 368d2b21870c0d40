use tracing::{debug, warn};

use crate::error::Result;
use crate::pager::{Page, Pager};
use crate::{PAGE_SIZE, ROW_SIZE, ROWS_PER_PAGE};

/// A flat sequence of fixed-width rows stored `ROWS_PER_PAGE` to a page.
pub struct Table {
    pager: Pager,
    num_rows: usize,
}

impl Table {
    /// Wraps an open pager, recovering the row count from the file length.
    ///
    /// Every page before the last was flushed whole, so it holds
    /// `ROWS_PER_PAGE` rows; the tail page holds as many whole rows as fit in
    /// its length.
    pub fn new(pager: Pager) -> Self {
        let num_rows = rows_in_file(pager.file_length());
        Self { pager, num_rows }
    }

    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    /// Maps a row number to its page number and byte offset within that page.
    pub fn row_slot(row_num: usize) -> (usize, usize) {
        let page_num = row_num / ROWS_PER_PAGE;
        let byte_offset = (row_num % ROWS_PER_PAGE) * ROW_SIZE;
        (page_num, byte_offset)
    }

    pub(crate) fn page(&mut self, page_num: usize) -> Result<&mut Page> {
        self.pager.get_page(page_num)
    }

    pub(crate) fn increment_rows(&mut self) {
        self.num_rows += 1;
    }

    /// Writes every cached page holding rows back to the file, then syncs and
    /// closes it.
    ///
    /// Full pages are written whole; the last partial page only up to its
    /// final row.
    pub fn close(mut self) -> Result<()> {
        let num_full_pages = self.num_rows / ROWS_PER_PAGE;
        for page_num in 0..num_full_pages {
            if self.pager.is_cached(page_num) {
                self.pager.flush(page_num, PAGE_SIZE)?;
                self.pager.evict(page_num);
            }
        }

        let num_additional_rows = self.num_rows % ROWS_PER_PAGE;
        if num_additional_rows > 0 && self.pager.is_cached(num_full_pages) {
            self.pager.flush(num_full_pages, num_additional_rows * ROW_SIZE)?;
            self.pager.evict(num_full_pages);
        }

        debug!(num_rows = self.num_rows, "table flushed");
        self.pager.close()
    }
}

fn rows_in_file(file_length: u64) -> usize {
    let full_pages = (file_length / PAGE_SIZE as u64) as usize;
    let tail = (file_length % PAGE_SIZE as u64) as usize;
    if tail % ROW_SIZE != 0 {
        warn!(
            file_length,
            row_size = ROW_SIZE,
            "file does not end on a row boundary, ignoring trailing bytes"
        );
    }
    full_pages * ROWS_PER_PAGE + tail / ROW_SIZE
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::NamedTempFile;

    use super::*;
    use crate::row::Row;

    #[test]
    fn row_slot_maps_rows_onto_pages() {
        assert_eq!(Table::row_slot(0), (0, 0));
        assert_eq!(Table::row_slot(1), (0, ROW_SIZE));
        assert_eq!(Table::row_slot(ROWS_PER_PAGE - 1), (0, (ROWS_PER_PAGE - 1) * ROW_SIZE));
        assert_eq!(Table::row_slot(ROWS_PER_PAGE), (1, 0));
        assert_eq!(Table::row_slot(2 * ROWS_PER_PAGE + 3), (2, 3 * ROW_SIZE));
    }

    #[test]
    fn new_recovers_row_count_from_file_length() {
        let file = NamedTempFile::new().unwrap();
        fs::write(file.path(), vec![0u8; 5 * ROW_SIZE]).unwrap();

        let table = Table::new(Pager::open(file.path()).unwrap());

        assert_eq!(table.num_rows(), 5);
    }

    #[test]
    fn new_counts_full_pages_by_rows_per_page() {
        let file = NamedTempFile::new().unwrap();
        fs::write(file.path(), vec![0u8; 20 * PAGE_SIZE + 3 * ROW_SIZE]).unwrap();

        let table = Table::new(Pager::open(file.path()).unwrap());

        assert_eq!(table.num_rows(), 20 * ROWS_PER_PAGE + 3);
    }

    #[test]
    fn new_ignores_partial_trailing_row() {
        let file = NamedTempFile::new().unwrap();
        fs::write(file.path(), vec![0u8; 2 * ROW_SIZE + 10]).unwrap();

        let table = Table::new(Pager::open(file.path()).unwrap());

        assert_eq!(table.num_rows(), 2);
    }

    #[test]
    fn close_writes_only_stored_rows_of_tail_page() {
        let file = NamedTempFile::new().unwrap();
        let mut table = Table::new(Pager::open(file.path()).unwrap());
        let row = Row::new(9, "tail", "tail@example.com").unwrap();

        let page = table.page(1).unwrap();
        row.encode(page, 0);
        row.encode(page, ROW_SIZE);
        let page = table.page(0).unwrap();
        for i in 0..ROWS_PER_PAGE {
            row.encode(page, i * ROW_SIZE);
        }
        table.num_rows = ROWS_PER_PAGE + 2;
        table.close().unwrap();

        let contents = fs::read(file.path()).unwrap();
        assert_eq!(contents.len(), PAGE_SIZE + 2 * ROW_SIZE);
        let (decoded, _) = Row::decode(&contents, PAGE_SIZE + ROW_SIZE);
        assert_eq!(decoded, row);
    }

    #[test]
    fn close_skips_pages_never_loaded() {
        let file = NamedTempFile::new().unwrap();
        fs::write(file.path(), vec![7u8; 3 * ROW_SIZE]).unwrap();
        let table = Table::new(Pager::open(file.path()).unwrap());

        table.close().unwrap();

        assert_eq!(fs::read(file.path()).unwrap(), vec![7u8; 3 * ROW_SIZE]);
    }
}
