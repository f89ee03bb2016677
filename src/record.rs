/*
Payload, either table b-tree data or index b-tree keys, is always in the
"record format": a header followed by a body.

The header begins with a varint giving the total size of the header in
bytes (including the size varint itself), followed by one serial-type
varint per column. The body then holds the packed values back-to-back, in
column order, each one as wide as its serial type says.

Record length must equal header length + sum of value sizes — a schema row
or cell whose header disagrees with its body is a format error.

Overflow pages are not honored by this engine (spec §1/§6): a cell whose
payload would spill onto an overflow page is treated as if it were fully
inline, which is an acknowledged limitation rather than a recoverable case.
*/

use anyhow::{Context, Result};

use crate::value::{SerialType, Value};
use crate::varint::VarInt;

#[derive(Debug, Clone)]
pub struct Record {
    pub values: Vec<Value>,
}

impl Record {
    // decodes a record starting at `bytes[0]`; returns the record and the
    // number of bytes consumed (header + body).
    pub fn from_be_bytes(bytes: &[u8]) -> Result<(Self, usize)> {
        let header_size_varint =
            VarInt::from_be_bytes(bytes).context("reading record header-length varint")?;
        let header_len = header_size_varint.0 as usize;
        let mut offset = header_size_varint.1;

        let mut serial_types = Vec::new();
        while offset < header_len {
            let varint = VarInt::from_be_bytes(&bytes[offset..])
                .context("reading record serial-type varint")?;
            offset += varint.1;
            serial_types.push(SerialType::from_varint(varint)?);
        }

        let mut body_offset = offset;
        let mut values = Vec::with_capacity(serial_types.len());
        for serial_type in serial_types {
            let (value, width) = serial_type
                .decode(&bytes[body_offset..])
                .context("decoding record value")?;
            body_offset += width;
            values.push(value);
        }

        Ok((Record { values }, body_offset))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // header: [header_len=4][serial(Integer,1)=1][serial(Text,3)=19] body: [42]['f','o','o']
    fn sample_record_bytes() -> Vec<u8> {
        vec![4, 1, 19, 42, b'f', b'o', b'o']
    }

    #[test]
    fn decodes_mixed_integer_and_text_record() {
        let (record, consumed) = Record::from_be_bytes(&sample_record_bytes()).unwrap();
        assert_eq!(record.values, vec![Value::Integer(42), Value::Text("foo".to_string())]);
        assert_eq!(consumed, 7);
    }

    #[test]
    fn decodes_all_null_record() {
        // header_len=3, two NULL serial types (code 0), no body bytes
        let bytes = vec![3, 0, 0];
        let (record, consumed) = Record::from_be_bytes(&bytes).unwrap();
        assert_eq!(record.values, vec![Value::Null, Value::Null]);
        assert_eq!(consumed, 3);
    }

    #[test]
    fn decodes_zero_and_one_serial_types() {
        // header_len=3, serial types 8 (Zero) and 9 (One), zero-width bodies
        let bytes = vec![3, 8, 9];
        let (record, _) = Record::from_be_bytes(&bytes).unwrap();
        assert_eq!(record.values, vec![Value::Integer(0), Value::Integer(1)]);
    }

    #[test]
    fn rejects_unsupported_serial_type() {
        // serial type 7 (float) is unsupported
        let bytes = vec![2, 7];
        assert!(Record::from_be_bytes(&bytes).is_err());
    }
}
