/*
Serial Type Codes Of The Record Format (subset this engine understands)
Serial Type    Content Size    Meaning
0              0               NULL
1..4           code bytes      big-endian twos-complement integer
5              6               big-endian 48-bit twos-complement integer
6              8               big-endian 64-bit twos-complement integer (unsupported, see below)
7              8               IEEE 754 float (unsupported)
8              0               the integer 0
9              0               the integer 1
N>=12 even     (N-12)/2        blob (unsupported)
N>=13 odd      (N-13)/2        UTF-8 text, (N-13)/2 bytes
*/

use std::cmp::Ordering;
use thiserror::Error;

use crate::varint::VarInt;

#[derive(Debug, Error)]
pub enum ValueError {
    #[error("unsupported serial type code {0}")]
    UnsupportedSerialType(i64),
    #[error("value body too short for serial type")]
    OutOfBounds,
    #[error("text value is not valid utf-8: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SerialType {
    Null,
    Integer(usize), // byte width: 1, 2, 3, 4, or 6
    Zero,
    One,
    Text(usize), // byte width
}

impl SerialType {
    pub fn from_code(code: i64) -> Result<Self, ValueError> {
        match code {
            0 => Ok(SerialType::Null),
            1..=4 => Ok(SerialType::Integer(code as usize)),
            5 => Ok(SerialType::Integer(6)),
            8 => Ok(SerialType::Zero),
            9 => Ok(SerialType::One),
            n if n >= 13 && n % 2 == 1 => Ok(SerialType::Text(((n - 13) / 2) as usize)),
            // serial type 6 (64-bit int), 7 (float), and even n>=12 (blob) are
            // deliberately unsupported per the scope of this engine.
            other => Err(ValueError::UnsupportedSerialType(other)),
        }
    }

    pub fn from_varint(varint: VarInt) -> Result<Self, ValueError> {
        Self::from_code(varint.0)
    }

    // number of body bytes this serial type occupies.
    pub fn width(&self) -> usize {
        match self {
            SerialType::Null | SerialType::Zero | SerialType::One => 0,
            SerialType::Integer(w) => *w,
            SerialType::Text(w) => *w,
        }
    }

    pub fn decode(&self, body: &[u8]) -> Result<(Value, usize), ValueError> {
        let width = self.width();
        if width > body.len() {
            return Err(ValueError::OutOfBounds);
        }

        let value = match self {
            SerialType::Null => Value::Null,
            SerialType::Zero => Value::Integer(0),
            SerialType::One => Value::Integer(1),
            SerialType::Integer(width) => Value::Integer(decode_signed_be(&body[..*width])),
            SerialType::Text(width) => {
                Value::Text(String::from_utf8(body[..*width].to_vec())?)
            }
        };

        Ok((value, width))
    }
}

// sign-extends a 1, 2, 3, 4, or 6 byte big-endian twos-complement integer into an i64.
fn decode_signed_be(bytes: &[u8]) -> i64 {
    let negative = bytes[0] & 0x80 != 0;
    let mut buf = [if negative { 0xFF } else { 0x00 }; 8];
    let start = buf.len() - bytes.len();
    buf[start..].copy_from_slice(bytes);
    i64::from_be_bytes(buf)
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Integer(i64),
    Text(String),
}

impl Value {
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => write!(f, ""),
            Value::Integer(n) => write!(f, "{n}"),
            Value::Text(s) => write!(f, "{s}"),
        }
    }
}

// total order used for index key comparison (spec §4.6):
//   NULL < any non-NULL, NULL = NULL
//   same kind: natural `<`
//   integer < text across kinds
impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Eq for Value {}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Value::Null, Value::Null) => Ordering::Equal,
            (Value::Null, _) => Ordering::Less,
            (_, Value::Null) => Ordering::Greater,
            (Value::Integer(a), Value::Integer(b)) => a.cmp(b),
            (Value::Text(a), Value::Text(b)) => a.as_bytes().cmp(b.as_bytes()),
            (Value::Integer(_), Value::Text(_)) => Ordering::Less,
            (Value::Text(_), Value::Integer(_)) => Ordering::Greater,
        }
    }
}

// lexicographic comparison over the common prefix length only; components
// beyond the shorter side's length do not participate (spec §4.6).
pub fn compare_prefix(key: &[Value], probe: &[Value]) -> Ordering {
    let len = key.len().min(probe.len());
    for i in 0..len {
        match key[i].cmp(&probe[i]) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    Ordering::Equal
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serial_type_mapping() {
        assert_eq!(SerialType::from_code(0).unwrap(), SerialType::Null);
        assert_eq!(SerialType::from_code(1).unwrap(), SerialType::Integer(1));
        assert_eq!(SerialType::from_code(4).unwrap(), SerialType::Integer(4));
        assert_eq!(SerialType::from_code(5).unwrap(), SerialType::Integer(6));
        assert_eq!(SerialType::from_code(8).unwrap(), SerialType::Zero);
        assert_eq!(SerialType::from_code(9).unwrap(), SerialType::One);
        assert_eq!(SerialType::from_code(13).unwrap(), SerialType::Text(0));
        assert_eq!(SerialType::from_code(23).unwrap(), SerialType::Text(5));
    }

    #[test]
    fn serial_type_6_and_8_and_float_and_blob_unsupported() {
        assert!(SerialType::from_code(6).is_err());
        assert!(SerialType::from_code(7).is_err());
        assert!(SerialType::from_code(12).is_err());
        assert!(SerialType::from_code(14).is_err());
    }

    #[test]
    fn decode_negative_integer() {
        let st = SerialType::Integer(2);
        let (v, n) = st.decode(&[0xFF, 0xFE]).unwrap();
        assert_eq!(v, Value::Integer(-2));
        assert_eq!(n, 2);
    }

    #[test]
    fn decode_positive_integer_one_byte() {
        let st = SerialType::Integer(1);
        let (v, n) = st.decode(&[0x7F]).unwrap();
        assert_eq!(v, Value::Integer(127));
        assert_eq!(n, 1);
    }

    #[test]
    fn decode_text() {
        let st = SerialType::Text(5);
        let (v, n) = st.decode(b"Hello").unwrap();
        assert_eq!(v, Value::Text("Hello".to_string()));
        assert_eq!(n, 5);
    }

    #[test]
    fn ordering_null_lowest() {
        assert!(Value::Null < Value::Integer(-100));
        assert_eq!(Value::Null.cmp(&Value::Null), Ordering::Equal);
    }

    #[test]
    fn ordering_integer_before_text() {
        assert!(Value::Integer(1000) < Value::Text("a".to_string()));
    }

    #[test]
    fn ordering_text_bytewise() {
        assert!(Value::Text("Apple".to_string()) < Value::Text("Banana".to_string()));
    }

    #[test]
    fn prefix_comparison_ignores_trailing_components() {
        let key = vec![Value::Text("Red".to_string())];
        let cell_key = vec![Value::Text("Red".to_string()), Value::Integer(42)];
        assert_eq!(compare_prefix(&cell_key, &key), Ordering::Equal);
    }
}
