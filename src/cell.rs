/*
The format of a cell depends on which kind of b-tree page it appears on.

Table B-Tree Leaf Cell (page type 13):
  varint payload length
  varint row-id
  record (the payload)

Table B-Tree Interior Cell (page type 5):
  4-byte big-endian left child page number
  varint key (the maximum row-id in the left subtree)

Index B-Tree Leaf Cell (page type 10):
  varint payload length
  record, whose trailing column is the row-id pointer

Index B-Tree Interior Cell (page type 2):
  4-byte big-endian left child page number
  varint payload length
  record, whose trailing column is the row-id pointer into the table b-tree

Overflow pages are not honored: a cell whose declared payload length would
require spilling onto an overflow page is decoded as if fully inline, an
acknowledged limitation of this engine's scope.
*/

use anyhow::{bail, Context, Result};
use std::convert::TryInto;

use crate::record::Record;
use crate::value::Value;
use crate::varint::VarInt;

#[derive(Debug, Clone)]
pub struct TableLeafCell {
    pub rowid: i64,
    pub record: Record,
}

impl TableLeafCell {
    pub fn from_be_bytes(bytes: &[u8]) -> Result<Self> {
        let payload_len = VarInt::from_be_bytes(bytes).context("table-leaf payload length")?;
        let mut offset = payload_len.1;

        let rowid_varint = VarInt::from_be_bytes(&bytes[offset..]).context("table-leaf rowid")?;
        offset += rowid_varint.1;

        let (record, _) = Record::from_be_bytes(&bytes[offset..]).context("table-leaf record")?;

        Ok(TableLeafCell {
            rowid: rowid_varint.0,
            record,
        })
    }
}

#[derive(Debug, Clone)]
pub struct TableInteriorCell {
    pub left_child_page: u32,
    pub key: i64,
}

impl TableInteriorCell {
    pub fn from_be_bytes(bytes: &[u8]) -> Result<Self> {
        let left_child_page = u32::from_be_bytes(bytes[..4].try_into()?);
        let key = VarInt::from_be_bytes(&bytes[4..]).context("table-interior key")?;

        Ok(TableInteriorCell {
            left_child_page,
            key: key.0,
        })
    }
}

#[derive(Debug, Clone)]
pub struct IndexLeafCell {
    pub record: Record,
}

impl IndexLeafCell {
    pub fn from_be_bytes(bytes: &[u8]) -> Result<Self> {
        let payload_len = VarInt::from_be_bytes(bytes).context("index-leaf payload length")?;
        let offset = payload_len.1;

        let (record, _) = Record::from_be_bytes(&bytes[offset..]).context("index-leaf record")?;

        Ok(IndexLeafCell { record })
    }

    // the key columns, excluding the trailing row-id pointer.
    pub fn key(&self) -> &[Value] {
        let len = self.record.values.len();
        &self.record.values[..len.saturating_sub(1)]
    }

    pub fn rowid(&self) -> Result<i64> {
        trailing_rowid(&self.record)
    }
}

#[derive(Debug, Clone)]
pub struct IndexInteriorCell {
    pub left_child_page: u32,
    pub record: Record,
}

impl IndexInteriorCell {
    pub fn from_be_bytes(bytes: &[u8]) -> Result<Self> {
        let left_child_page = u32::from_be_bytes(bytes[..4].try_into()?);

        let payload_len =
            VarInt::from_be_bytes(&bytes[4..]).context("index-interior payload length")?;
        let offset = 4 + payload_len.1;

        let (record, _) =
            Record::from_be_bytes(&bytes[offset..]).context("index-interior record")?;

        Ok(IndexInteriorCell {
            left_child_page,
            record,
        })
    }

    pub fn key(&self) -> &[Value] {
        let len = self.record.values.len();
        &self.record.values[..len.saturating_sub(1)]
    }

    pub fn rowid(&self) -> Result<i64> {
        trailing_rowid(&self.record)
    }
}

fn trailing_rowid(record: &Record) -> Result<i64> {
    match record.values.last() {
        Some(Value::Integer(n)) => Ok(*n),
        Some(other) => bail!("index record's trailing row-id column is not an integer: {other:?}"),
        None => bail!("index record has no columns"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_leaf_cell_bytes() -> Vec<u8> {
        // payload_len=7, rowid=1, record header_len=4 [Integer,1][Text,3] body=[42]['f','o','o']
        vec![7, 1, 4, 1, 19, 42, b'f', b'o', b'o']
    }

    #[test]
    fn decodes_table_leaf_cell() {
        let cell = TableLeafCell::from_be_bytes(&table_leaf_cell_bytes()).unwrap();
        assert_eq!(cell.rowid, 1);
        assert_eq!(cell.record.values[0], Value::Integer(42));
        assert_eq!(cell.record.values[1], Value::Text("foo".to_string()));
    }

    #[test]
    fn decodes_table_interior_cell() {
        let mut bytes = 7u32.to_be_bytes().to_vec();
        bytes.push(100); // key varint = 100
        let cell = TableInteriorCell::from_be_bytes(&bytes).unwrap();
        assert_eq!(cell.left_child_page, 7);
        assert_eq!(cell.key, 100);
    }

    #[test]
    fn index_leaf_cell_exposes_key_and_rowid() {
        // record: [Text,3]['R','e','d'][Integer,1]=2, trailing column is the rowid
        let record_bytes = vec![4, 19, 1, b'R', b'e', b'd', 2];
        let mut bytes = vec![record_bytes.len() as u8];
        bytes.extend(record_bytes);
        let cell = IndexLeafCell::from_be_bytes(&bytes).unwrap();
        assert_eq!(cell.key(), &[Value::Text("Red".to_string())]);
        assert_eq!(cell.rowid().unwrap(), 2);
    }

    #[test]
    fn index_interior_cell_exposes_key_and_rowid() {
        let record_bytes = vec![4, 19, 1, b'R', b'e', b'd', 2];
        let mut bytes = 3u32.to_be_bytes().to_vec();
        bytes.push(record_bytes.len() as u8);
        bytes.extend(record_bytes);
        let cell = IndexInteriorCell::from_be_bytes(&bytes).unwrap();
        assert_eq!(cell.left_child_page, 3);
        assert_eq!(cell.key(), &[Value::Text("Red".to_string())]);
        assert_eq!(cell.rowid().unwrap(), 2);
    }
}
