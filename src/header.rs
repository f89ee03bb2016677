/*
The 100-byte database file header (page 1 only). This engine only reads the
fields it needs: the page size at offset 16 and the reserved-space byte at
offset 20. The file change counter, schema cookie, and the rest of the
header are not validated or honored (spec §1: "does not honor the file
change counter; it trusts the file").
*/

use anyhow::{bail, Context, Result};
use std::convert::TryInto;
use std::io::Read;

use crate::error::EngineError;

pub const HEADER_SIZE: usize = 100;
const MAGIC: &[u8; 16] = b"SQLite format 3\0";

#[derive(Debug, Clone, Copy)]
pub struct DatabaseHeader {
    // the literal bytes at offset 16..18; the "1 means 65536" convention is
    // not decoded, per the acknowledged scope limitation.
    pub page_size: u16,
    pub reserved_bytes_per_page: u8,
}

impl DatabaseHeader {
    pub fn read_from(reader: &mut impl Read) -> Result<Self> {
        let mut buffer = [0u8; HEADER_SIZE];
        reader
            .read_exact(&mut buffer)
            .map_err(EngineError::Io)
            .context("reading database header")?;

        if &buffer[0..16] != MAGIC {
            bail!("not a SQLite database file");
        }

        let page_size = u16::from_be_bytes(buffer[16..18].try_into()?);
        let reserved_bytes_per_page = buffer[20];

        Ok(DatabaseHeader {
            page_size,
            reserved_bytes_per_page,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn header_bytes(page_size: u16, reserved: u8) -> Vec<u8> {
        let mut buf = vec![0u8; HEADER_SIZE];
        buf[0..16].copy_from_slice(MAGIC);
        buf[16..18].copy_from_slice(&page_size.to_be_bytes());
        buf[20] = reserved;
        buf
    }

    #[test]
    fn reads_page_size_and_reserved_bytes() {
        let bytes = header_bytes(4096, 0);
        let header = DatabaseHeader::read_from(&mut Cursor::new(bytes)).unwrap();
        assert_eq!(header.page_size, 4096);
        assert_eq!(header.reserved_bytes_per_page, 0);
    }

    #[test]
    fn reads_nonzero_reserved_bytes() {
        let bytes = header_bytes(512, 12);
        let header = DatabaseHeader::read_from(&mut Cursor::new(bytes)).unwrap();
        assert_eq!(header.page_size, 512);
        assert_eq!(header.reserved_bytes_per_page, 12);
    }

    #[test]
    fn rejects_bad_magic() {
        let mut bytes = header_bytes(4096, 0);
        bytes[0] = b'X';
        assert!(DatabaseHeader::read_from(&mut Cursor::new(bytes)).is_err());
    }
}
