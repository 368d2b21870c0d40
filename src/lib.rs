pub mod cursor;
pub mod database;
pub mod error;
pub mod pager;
pub mod row;
pub mod statement;
pub mod table;

pub use cursor::Cursor;
pub use database::Database;
pub use error::{Error, PrepareError, Result};
pub use pager::Pager;
pub use row::Row;
pub use statement::{Outcome, Statement};
pub use table::Table;

pub const COLUMN_USERNAME_SIZE: usize = 32;
pub const COLUMN_EMAIL_SIZE: usize = 255;
pub const ID_SIZE: usize = size_of::<u32>();
pub const USERNAME_SIZE: usize = COLUMN_USERNAME_SIZE;
pub const EMAIL_SIZE: usize = COLUMN_EMAIL_SIZE;

pub const ID_OFFSET: usize = 0;
pub const USERNAME_OFFSET: usize = ID_OFFSET + ID_SIZE;
pub const EMAIL_OFFSET: usize = USERNAME_OFFSET + USERNAME_SIZE;
pub const ROW_SIZE: usize = ID_SIZE + USERNAME_SIZE + EMAIL_SIZE;

pub const PAGE_SIZE: usize = 4096;
pub const TABLE_MAX_PAGES: usize = 100;
pub const ROWS_PER_PAGE: usize = PAGE_SIZE / ROW_SIZE;
pub const TABLE_MAX_ROWS: usize = ROWS_PER_PAGE * TABLE_MAX_PAGES;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_constants_match_on_disk_format() {
        assert_eq!(ROW_SIZE, 291);
        assert_eq!(EMAIL_OFFSET, 36);
        assert_eq!(ROWS_PER_PAGE, 14);
        assert_eq!(TABLE_MAX_ROWS, 1400);
    }
}
