use thiserror::Error;

/// Failures raised by the storage layer.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Tried to fetch page number out of bounds: {page_num} (max: {max})")]
    PageOutOfBounds { page_num: usize, max: usize },

    #[error("Tried to flush null page {page_num}")]
    NullPageFlush { page_num: usize },

    #[error("Invalid flush size for page {page_num}: {bytes} bytes")]
    InvalidFlushSize { page_num: usize, bytes: usize },

    #[error("Table full.")]
    TableFull { max_rows: usize },

    #[error("Invalid cursor position {row_num} (rows: {num_rows})")]
    InvalidPosition { row_num: usize, num_rows: usize },
}

pub type Result<T> = std::result::Result<T, Error>;

/// Failures turning an input line into a statement.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum PrepareError {
    #[error("Syntax error. Could not parse statement.")]
    Syntax,

    #[error("String is too long.")]
    StringTooLong,

    #[error("ID must be positive.")]
    NegativeId,

    #[error("Unrecognized command: {0}")]
    Unrecognized(String),
}
