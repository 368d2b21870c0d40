use std::path::Path;

use tracing::info;

use crate::cursor::Cursor;
use crate::error::{Error, Result};
use crate::pager::Pager;
use crate::row::Row;
use crate::table::Table;
use crate::TABLE_MAX_ROWS;

/// A single-table database backed by one file.
pub struct Database {
    table: Table,
}

impl Database {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let table = Table::new(Pager::open(path)?);
        info!(path = %path.display(), rows = table.num_rows(), "database opened");
        Ok(Self { table })
    }

    pub fn num_rows(&self) -> usize {
        self.table.num_rows()
    }

    /// Appends a row. Fails with [`Error::TableFull`] once the table holds
    /// `TABLE_MAX_ROWS` rows.
    pub fn insert(&mut self, row: &Row) -> Result<()> {
        if self.table.num_rows() >= TABLE_MAX_ROWS {
            return Err(Error::TableFull {
                max_rows: TABLE_MAX_ROWS,
            });
        }
        Cursor::table_end(&mut self.table).write(row)
    }

    /// Returns every stored row in insertion order.
    pub fn select_all(&mut self) -> Result<Vec<Row>> {
        let mut rows = Vec::with_capacity(self.table.num_rows());
        let mut cursor = Cursor::table_start(&mut self.table);
        while let Some(row) = cursor.read()? {
            rows.push(row);
            cursor.advance();
        }
        Ok(rows)
    }

    /// Flushes cached pages and closes the file.
    pub fn close(self) -> Result<()> {
        let rows = self.table.num_rows();
        self.table.close()?;
        info!(rows, "database closed");
        Ok(())
    }
}
