use std::fmt;

use byteorder::{ByteOrder, LittleEndian};

use crate::error::PrepareError;
use crate::{EMAIL_OFFSET, EMAIL_SIZE, ID_OFFSET, ROW_SIZE, USERNAME_OFFSET, USERNAME_SIZE};

/// A fixed-width record: `id | username[32] | email[255]`.
///
/// The text columns are raw byte buffers, left-justified and zero padded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub id: u32,
    pub username: [u8; USERNAME_SIZE],
    pub email: [u8; EMAIL_SIZE],
}

impl Row {
    /// Builds a row, rejecting text that does not fit its column.
    pub fn new(id: u32, username: &str, email: &str) -> Result<Self, PrepareError> {
        Ok(Self {
            id,
            username: fixed_bytes(username)?,
            email: fixed_bytes(email)?,
        })
    }

    /// Writes the row into `buf` at `offset` and returns the offset just past it.
    ///
    /// `buf` must hold at least `offset + ROW_SIZE` bytes.
    pub fn encode(&self, buf: &mut [u8], offset: usize) -> usize {
        LittleEndian::write_u32(&mut buf[offset + ID_OFFSET..offset + USERNAME_OFFSET], self.id);
        buf[offset + USERNAME_OFFSET..offset + EMAIL_OFFSET].copy_from_slice(&self.username);
        buf[offset + EMAIL_OFFSET..offset + ROW_SIZE].copy_from_slice(&self.email);
        offset + ROW_SIZE
    }

    /// Reads the row stored in `buf` at `offset`.
    pub fn decode(buf: &[u8], offset: usize) -> (Self, usize) {
        let id = LittleEndian::read_u32(&buf[offset + ID_OFFSET..offset + USERNAME_OFFSET]);

        let mut username = [0u8; USERNAME_SIZE];
        username.copy_from_slice(&buf[offset + USERNAME_OFFSET..offset + EMAIL_OFFSET]);

        let mut email = [0u8; EMAIL_SIZE];
        email.copy_from_slice(&buf[offset + EMAIL_OFFSET..offset + ROW_SIZE]);

        (Self { id, username, email }, offset + ROW_SIZE)
    }

    pub fn username(&self) -> String {
        text(&self.username)
    }

    pub fn email(&self) -> String {
        text(&self.email)
    }
}

impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.id, self.username(), self.email())
    }
}

fn fixed_bytes<const N: usize>(input: &str) -> Result<[u8; N], PrepareError> {
    let bytes = input.as_bytes();
    if bytes.len() > N {
        return Err(PrepareError::StringTooLong);
    }
    let mut buffer = [0u8; N];
    buffer[..bytes.len()].copy_from_slice(bytes);
    Ok(buffer)
}

// Column text ends at the first zero byte.
fn text(column: &[u8]) -> String {
    let end = column.iter().position(|&b| b == 0).unwrap_or(column.len());
    String::from_utf8_lossy(&column[..end]).into_owned()
}
