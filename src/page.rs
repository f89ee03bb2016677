/*
A b-tree page is divided into regions in the following order:
  the 100-byte database file header (page 1 only)
  the 8- or 12-byte b-tree page header
  the cell pointer array
  unallocated space
  the cell content area
  the reserved region

The b-tree page header is 8 bytes for leaf pages and 12 bytes for interior
pages. All multibyte values are big-endian.

Offset  Size  Description
0       1     page type (2 interior-index, 5 interior-table, 10 leaf-index, 13 leaf-table)
1       2     start of first freeblock, or 0
3       2     number of cells
5       2     start of cell content area (0 means 65536)
7       1     number of fragmented free bytes
8       4     right-most pointer (interior pages only)

On page 1, this header starts at byte 100 (after the database header); cell
offsets recorded in the cell-pointer array remain relative to byte 0 of the
page, not to the header offset.
*/

use anyhow::{anyhow, bail, Result};
use std::convert::TryInto;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageType {
    InteriorIndex,
    InteriorTable,
    LeafIndex,
    LeafTable,
}

impl PageType {
    pub fn from_u8(val: u8) -> Option<Self> {
        match val {
            2 => Some(PageType::InteriorIndex),
            5 => Some(PageType::InteriorTable),
            10 => Some(PageType::LeafIndex),
            13 => Some(PageType::LeafTable),
            _ => None,
        }
    }

    pub fn is_interior(&self) -> bool {
        matches!(self, PageType::InteriorIndex | PageType::InteriorTable)
    }
}

#[derive(Debug, Clone)]
pub struct PageHeader {
    pub page_type: PageType,
    pub num_cells: u16,
    pub start_of_cell_content_area: u16,
    // present for interior pages only
    pub right_most_pointer: Option<u32>,
}

impl PageHeader {
    fn from_buffer(buffer: &[u8], offset: usize) -> Result<Self> {
        let page_type = PageType::from_u8(buffer[offset])
            .ok_or_else(|| anyhow!("invalid b-tree page type byte {}", buffer[offset]))?;

        let num_cells = u16::from_be_bytes(buffer[offset + 3..offset + 5].try_into()?);
        let start_of_cell_content_area =
            u16::from_be_bytes(buffer[offset + 5..offset + 7].try_into()?);

        let right_most_pointer = if page_type.is_interior() {
            Some(u32::from_be_bytes(
                buffer[offset + 8..offset + 12].try_into()?,
            ))
        } else {
            None
        };

        Ok(PageHeader {
            page_type,
            num_cells,
            start_of_cell_content_area,
            right_most_pointer,
        })
    }

    fn header_size(&self) -> usize {
        if self.page_type.is_interior() {
            12
        } else {
            8
        }
    }
}

#[derive(Debug, Clone)]
pub struct Page {
    pub header: PageHeader,
    pub number: u32,
    buffer: Vec<u8>,
    // where the b-tree page header begins within `buffer` (100 on page 1, 0 otherwise)
    header_offset: usize,
}

impl Page {
    pub fn parse(number: u32, buffer: Vec<u8>, header_offset: usize) -> Result<Self> {
        let header = PageHeader::from_buffer(&buffer, header_offset)?;
        Ok(Page {
            header,
            number,
            buffer,
            header_offset,
        })
    }

    pub fn page_type(&self) -> PageType {
        self.header.page_type
    }

    pub fn num_cells(&self) -> u16 {
        self.header.num_cells
    }

    fn cell_pointer_array_start(&self) -> usize {
        self.header_offset + self.header.header_size()
    }

    // returns the byte offset (from byte 0 of the page) of the i-th cell.
    pub fn cell_offset(&self, i: u16) -> Result<usize> {
        if i >= self.header.num_cells {
            bail!(
                "cell index {} out of range (page has {} cells)",
                i,
                self.header.num_cells
            );
        }

        let start = self.cell_pointer_array_start() + i as usize * 2;
        let offset = u16::from_be_bytes(self.buffer[start..start + 2].try_into()?);
        Ok(offset as usize)
    }

    // returns the cell content starting at the i-th cell pointer, running to
    // the end of the page buffer (cell decoders consume only as many bytes
    // as they need).
    pub fn cell_content(&self, i: u16) -> Result<&[u8]> {
        let offset = self.cell_offset(i)?;
        Ok(&self.buffer[offset..])
    }

    pub fn right_most_pointer(&self) -> Option<u32> {
        self.header.right_most_pointer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf_table_page_with_two_cells() -> Vec<u8> {
        let mut buf = vec![0u8; 512];
        buf[0] = 13; // leaf table
        buf[3..5].copy_from_slice(&2u16.to_be_bytes());
        buf[5..7].copy_from_slice(&500u16.to_be_bytes());
        // cell pointer array right after the 8-byte header
        buf[8..10].copy_from_slice(&500u16.to_be_bytes());
        buf[10..12].copy_from_slice(&480u16.to_be_bytes());
        buf
    }

    #[test]
    fn parses_leaf_table_header() {
        let page = Page::parse(2, leaf_table_page_with_two_cells(), 0).unwrap();
        assert_eq!(page.page_type(), PageType::LeafTable);
        assert_eq!(page.num_cells(), 2);
        assert_eq!(page.right_most_pointer(), None);
    }

    #[test]
    fn cell_offsets_resolve_correctly() {
        let page = Page::parse(2, leaf_table_page_with_two_cells(), 0).unwrap();
        assert_eq!(page.cell_offset(0).unwrap(), 500);
        assert_eq!(page.cell_offset(1).unwrap(), 480);
    }

    #[test]
    fn rejects_invalid_page_type() {
        let mut buf = vec![0u8; 512];
        buf[0] = 7; // not a valid b-tree page type
        assert!(Page::parse(1, buf, 0).is_err());
    }

    #[test]
    fn interior_page_has_right_most_pointer() {
        let mut buf = vec![0u8; 512];
        buf[0] = 5; // interior table
        buf[3..5].copy_from_slice(&0u16.to_be_bytes());
        buf[8..12].copy_from_slice(&99u32.to_be_bytes());
        let page = Page::parse(3, buf, 0).unwrap();
        assert_eq!(page.right_most_pointer(), Some(99));
    }

    #[test]
    fn page_one_header_offset_is_100() {
        let mut buf = vec![0u8; 612];
        buf[100] = 13; // leaf table, header begins at byte 100
        buf[103..105].copy_from_slice(&1u16.to_be_bytes());
        buf[105..107].copy_from_slice(&600u16.to_be_bytes());
        buf[108..110].copy_from_slice(&600u16.to_be_bytes());
        let page = Page::parse(1, buf, 100).unwrap();
        assert_eq!(page.num_cells(), 1);
        assert_eq!(page.cell_offset(0).unwrap(), 600);
    }
}
