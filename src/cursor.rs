use crate::error::{Error, Result};
use crate::pager::Page;
use crate::row::Row;
use crate::table::Table;

/// A forward-only position within a table.
///
/// The cursor borrows its table mutably, so at most one cursor is active at a
/// time and none outlives the table.
pub struct Cursor<'t> {
    table: &'t mut Table,
    row_num: usize,
}

impl<'t> Cursor<'t> {
    pub fn table_start(table: &'t mut Table) -> Self {
        Self { table, row_num: 0 }
    }

    /// Positions the cursor one past the last row, where the next row is appended.
    pub fn table_end(table: &'t mut Table) -> Self {
        let row_num = table.num_rows();
        Self { table, row_num }
    }

    pub fn row_num(&self) -> usize {
        self.row_num
    }

    pub fn end_of_table(&self) -> bool {
        self.row_num >= self.table.num_rows()
    }

    pub fn advance(&mut self) {
        self.row_num += 1;
    }

    fn value(&mut self) -> Result<(&mut Page, usize)> {
        let num_rows = self.table.num_rows();
        if self.row_num > num_rows {
            return Err(Error::InvalidPosition {
                row_num: self.row_num,
                num_rows,
            });
        }

        let (page_num, byte_offset) = Table::row_slot(self.row_num);
        let page = self.table.page(page_num)?;
        Ok((page, byte_offset))
    }

    /// Reads the row under the cursor, or `None` once past the last row.
    pub fn read(&mut self) -> Result<Option<Row>> {
        if self.end_of_table() {
            return Ok(None);
        }
        let (page, offset) = self.value()?;
        let (row, _) = Row::decode(page, offset);
        Ok(Some(row))
    }

    /// Overwrites the row under the cursor, or appends when positioned at the
    /// end of the table.
    pub fn write(&mut self, row: &Row) -> Result<()> {
        let appending = self.row_num == self.table.num_rows();
        let (page, offset) = self.value()?;
        row.encode(page, offset);

        if appending {
            self.table.increment_rows();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tempfile::NamedTempFile;

    use super::*;
    use crate::pager::Pager;
    use crate::{ROWS_PER_PAGE, TABLE_MAX_ROWS};

    fn open_table(file: &NamedTempFile) -> Table {
        Table::new(Pager::open(file.path()).unwrap())
    }

    fn user(i: u32) -> Row {
        Row::new(i, &format!("user{i}"), &format!("person{i}@example.com")).unwrap()
    }

    #[test]
    fn empty_table_start_is_end_of_table() {
        let file = NamedTempFile::new().unwrap();
        let mut table = open_table(&file);

        let mut cursor = Cursor::table_start(&mut table);

        assert!(cursor.end_of_table());
        assert_eq!(cursor.read().unwrap(), None);
    }

    #[test]
    fn write_at_end_appends_row() {
        let file = NamedTempFile::new().unwrap();
        let mut table = open_table(&file);

        Cursor::table_end(&mut table).write(&user(1)).unwrap();
        Cursor::table_end(&mut table).write(&user(2)).unwrap();

        assert_eq!(table.num_rows(), 2);
        let mut cursor = Cursor::table_start(&mut table);
        assert_eq!(cursor.read().unwrap(), Some(user(1)));
        cursor.advance();
        assert_eq!(cursor.read().unwrap(), Some(user(2)));
        cursor.advance();
        assert!(cursor.end_of_table());
        assert_eq!(cursor.read().unwrap(), None);
    }

    #[test]
    fn write_inside_table_overwrites_without_growing() {
        let file = NamedTempFile::new().unwrap();
        let mut table = open_table(&file);
        Cursor::table_end(&mut table).write(&user(1)).unwrap();

        Cursor::table_start(&mut table).write(&user(5)).unwrap();

        assert_eq!(table.num_rows(), 1);
        assert_eq!(Cursor::table_start(&mut table).read().unwrap(), Some(user(5)));
    }

    #[test]
    fn write_past_end_is_rejected() {
        let file = NamedTempFile::new().unwrap();
        let mut table = open_table(&file);

        let mut cursor = Cursor::table_end(&mut table);
        cursor.advance();
        let err = cursor.write(&user(1)).unwrap_err();

        assert!(matches!(
            err,
            Error::InvalidPosition { row_num: 1, num_rows: 0 }
        ));
        assert_eq!(table.num_rows(), 0);
    }

    #[test]
    fn rows_cross_page_boundaries() {
        let file = NamedTempFile::new().unwrap();
        let mut table = open_table(&file);
        let count = ROWS_PER_PAGE as u32 + 3;

        for i in 0..count {
            Cursor::table_end(&mut table).write(&user(i)).unwrap();
        }

        let mut cursor = Cursor::table_start(&mut table);
        for _ in 0..ROWS_PER_PAGE {
            cursor.advance();
        }
        assert_eq!(cursor.row_num(), ROWS_PER_PAGE);
        assert_eq!(cursor.read().unwrap(), Some(user(ROWS_PER_PAGE as u32)));
    }

    #[test]
    fn append_beyond_capacity_fails_without_counting() {
        let file = NamedTempFile::new().unwrap();
        let mut table = open_table(&file);
        for i in 0..TABLE_MAX_ROWS as u32 {
            Cursor::table_end(&mut table).write(&user(i)).unwrap();
        }

        let err = Cursor::table_end(&mut table).write(&user(0)).unwrap_err();

        assert!(matches!(err, Error::PageOutOfBounds { .. }));
        assert_eq!(table.num_rows(), TABLE_MAX_ROWS);
    }
}
