/*
Opens a database file read-only, exposing pages by 1-based page number.
Page 1 carries the 100-byte database header before its b-tree page header;
every other page's b-tree header starts at byte 0.

The pager performs no write-back and keeps no long-lived page cache of its
own — callers that need to memoize reads within a single traversal (the
point-lookup path) layer their own cache on top of `read_page`, per the
per-lookup memoization the traversal design calls for.
*/

use anyhow::{Context, Result};
use log::debug;
use std::cell::RefCell;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};

use crate::error::EngineError;
use crate::header::DatabaseHeader;
use crate::page::Page;

pub struct Pager {
    file: RefCell<File>,
    pub page_size: u16,
    pub reserved_bytes_per_page: u8,
    // cell count of page 1, exposed as the number of schema entries; this
    // over-counts indexes and any internal objects, matching the CLI's
    // documented ".dbinfo" behavior rather than a true table-only count.
    pub tables_count: u16,
}

impl Pager {
    pub fn open(path: &str) -> Result<Self> {
        let mut file = File::open(path)
            .map_err(EngineError::Io)
            .with_context(|| format!("opening {path}"))?;
        let header = DatabaseHeader::read_from(&mut file)?;

        let mut pager = Pager {
            file: RefCell::new(file),
            page_size: header.page_size,
            reserved_bytes_per_page: header.reserved_bytes_per_page,
            tables_count: 0,
        };

        let page_one = pager.read_page(1)?;
        pager.tables_count = page_one.num_cells();

        Ok(pager)
    }

    pub fn read_page(&self, number: u32) -> Result<Page> {
        let offset = (number as u64 - 1) * self.page_size as u64;
        let mut buffer = vec![0u8; self.page_size as usize];

        let mut file = self.file.borrow_mut();
        file.seek(SeekFrom::Start(offset))
            .map_err(EngineError::Io)
            .with_context(|| format!("seeking to page {number}"))?;
        file.read_exact(&mut buffer)
            .map_err(EngineError::Io)
            .with_context(|| format!("reading page {number}"))?;
        drop(file);

        debug!("read page {number} ({} bytes)", buffer.len());

        let header_offset = if number == 1 { crate::header::HEADER_SIZE } else { 0 };
        Page::parse(number, buffer, header_offset)
    }

    // explicit close, matching the "owns the file handle for the session
    // and is explicitly closed" lifecycle. Dropping a `Pager` closes the
    // file regardless; this just makes the intent visible at call sites.
    pub fn close(self) {
        drop(self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_missing_file_surfaces_engine_io_error() {
        let err = Pager::open("/nonexistent/path/does-not-exist.db").unwrap_err();
        assert!(err.downcast_ref::<EngineError>().is_some());
    }
}
