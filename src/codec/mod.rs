//! Canonical argument encoding
//!
//! Staged programs receive their arguments as one opaque byte buffer: the
//! concatenation, in declaration order, of each argument's encoding. There
//! are no separators and no instruction-level length prefix; the runtime
//! knows the buffer's shape from the out-of-band instruction name.
//!
//! Encodings are little-endian and fixed width unless noted:
//!
//! | type | encoding |
//! |---|---|
//! | `bool`, `u8`, `i8` | 1 byte |
//! | `u16`/`i16`, `u32`/`i32`, `u64`/`i64` | 2 / 4 / 8 bytes |
//! | `f32`, `f64` | 4 / 8 bytes |
//! | `string`, `bytes` | u32 length prefix + raw bytes |
//! | `publicKey` | raw 32 bytes, no prefix |
//! | `array[T; N]` | N encodings of T, no prefix |
//! | `vec[T]` | u32 element count + encodings of T |

use crate::error::{Error, Result};
use crate::idl::{IdlField, IdlType};
use solana_sdk::pubkey::Pubkey;
use std::fmt;

/// A runtime argument value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Boolean value
    Bool(bool),
    /// Unsigned 8-bit integer
    U8(u8),
    /// Signed 8-bit integer
    I8(i8),
    /// Unsigned 16-bit integer
    U16(u16),
    /// Signed 16-bit integer
    I16(i16),
    /// Unsigned 32-bit integer
    U32(u32),
    /// Signed 32-bit integer
    I32(i32),
    /// Unsigned 64-bit integer
    U64(u64),
    /// Signed 64-bit integer
    I64(i64),
    /// 32-bit float
    F32(f32),
    /// 64-bit float
    F64(f64),
    /// UTF-8 string
    String(String),
    /// Raw byte string
    Bytes(Vec<u8>),
    /// 32-byte identity value
    Pubkey(Pubkey),
    /// Element list, for both arrays and vectors
    List(Vec<Value>),
}

impl Value {
    /// Name of this value's type, for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::U8(_) => "u8",
            Value::I8(_) => "i8",
            Value::U16(_) => "u16",
            Value::I16(_) => "i16",
            Value::U32(_) => "u32",
            Value::I32(_) => "i32",
            Value::U64(_) => "u64",
            Value::I64(_) => "i64",
            Value::F32(_) => "f32",
            Value::F64(_) => "f64",
            Value::String(_) => "string",
            Value::Bytes(_) => "bytes",
            Value::Pubkey(_) => "publicKey",
            Value::List(_) => "list",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(v) => write!(f, "{}", v),
            Value::U8(v) => write!(f, "{}", v),
            Value::I8(v) => write!(f, "{}", v),
            Value::U16(v) => write!(f, "{}", v),
            Value::I16(v) => write!(f, "{}", v),
            Value::U32(v) => write!(f, "{}", v),
            Value::I32(v) => write!(f, "{}", v),
            Value::U64(v) => write!(f, "{}", v),
            Value::I64(v) => write!(f, "{}", v),
            Value::F32(v) => write!(f, "{}", v),
            Value::F64(v) => write!(f, "{}", v),
            Value::String(v) => write!(f, "{:?}", v),
            Value::Bytes(v) => write!(f, "bytes[{}]", v.len()),
            Value::Pubkey(v) => write!(f, "{}", v),
            Value::List(v) => write!(f, "list[{}]", v.len()),
        }
    }
}

macro_rules! value_from {
    ($($t:ty => $variant:ident),* $(,)?) => {
        $(impl From<$t> for Value {
            fn from(v: $t) -> Self {
                Value::$variant(v)
            }
        })*
    };
}

value_from! {
    bool => Bool,
    u8 => U8,
    i8 => I8,
    u16 => U16,
    i16 => I16,
    u32 => U32,
    i32 => I32,
    u64 => U64,
    i64 => I64,
    f32 => F32,
    f64 => F64,
    String => String,
    Pubkey => Pubkey,
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

fn mismatch(ty: &IdlType, value: &Value) -> Error {
    Error::TypeMismatch {
        expected: ty.display_name(),
        got: value.type_name().to_string(),
    }
}

/// Encode one value of the declared type, appending to `out`
pub fn encode_into(ty: &IdlType, value: &Value, out: &mut Vec<u8>) -> Result<()> {
    match ty {
        IdlType::Primitive(name) => encode_primitive(name, ty, value, out),
        IdlType::Array { array: (elem, len) } => match value {
            Value::List(items) => {
                if items.len() != *len {
                    return Err(Error::ArrayLength {
                        expected: *len,
                        got: items.len(),
                    });
                }
                for item in items {
                    encode_into(elem, item, out)?;
                }
                Ok(())
            }
            _ => Err(mismatch(ty, value)),
        },
        IdlType::Vec { vec: elem } => match value {
            Value::List(items) => {
                out.extend_from_slice(&(items.len() as u32).to_le_bytes());
                for item in items {
                    encode_into(elem, item, out)?;
                }
                Ok(())
            }
            _ => Err(mismatch(ty, value)),
        },
    }
}

fn encode_primitive(name: &str, ty: &IdlType, value: &Value, out: &mut Vec<u8>) -> Result<()> {
    match (name, value) {
        ("bool", Value::Bool(v)) => out.push(*v as u8),
        ("u8", Value::U8(v)) => out.push(*v),
        ("i8", Value::I8(v)) => out.extend_from_slice(&v.to_le_bytes()),
        ("u16", Value::U16(v)) => out.extend_from_slice(&v.to_le_bytes()),
        ("i16", Value::I16(v)) => out.extend_from_slice(&v.to_le_bytes()),
        ("u32", Value::U32(v)) => out.extend_from_slice(&v.to_le_bytes()),
        ("i32", Value::I32(v)) => out.extend_from_slice(&v.to_le_bytes()),
        ("u64", Value::U64(v)) => out.extend_from_slice(&v.to_le_bytes()),
        ("i64", Value::I64(v)) => out.extend_from_slice(&v.to_le_bytes()),
        ("f32", Value::F32(v)) => out.extend_from_slice(&v.to_le_bytes()),
        ("f64", Value::F64(v)) => out.extend_from_slice(&v.to_le_bytes()),
        ("string", Value::String(v)) => {
            out.extend_from_slice(&(v.len() as u32).to_le_bytes());
            out.extend_from_slice(v.as_bytes());
        }
        ("bytes", Value::Bytes(v)) => {
            out.extend_from_slice(&(v.len() as u32).to_le_bytes());
            out.extend_from_slice(v);
        }
        ("publicKey", Value::Pubkey(v)) => out.extend_from_slice(v.as_ref()),
        (name, _) if !crate::idl::SUPPORTED_PRIMITIVES.contains(&name) => {
            return Err(Error::UnsupportedType {
                type_name: name.to_string(),
            })
        }
        _ => return Err(mismatch(ty, value)),
    }
    Ok(())
}

/// Encode one value of the declared type
pub fn encode(ty: &IdlType, value: &Value) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    encode_into(ty, value, &mut out)?;
    Ok(out)
}

/// Decode one value of the declared type from the front of `bytes`.
///
/// Returns the value and the number of bytes consumed.
pub fn decode(ty: &IdlType, bytes: &[u8]) -> Result<(Value, usize)> {
    match ty {
        IdlType::Primitive(name) => decode_primitive(name, bytes),
        IdlType::Array { array: (elem, len) } => {
            let mut items = Vec::with_capacity(*len);
            let mut consumed = 0;
            for _ in 0..*len {
                let (item, n) = decode(elem, &bytes[consumed..])?;
                items.push(item);
                consumed += n;
            }
            Ok((Value::List(items), consumed))
        }
        IdlType::Vec { vec: elem } => {
            let count = read_u32(bytes)? as usize;
            // cap the pre-allocation; a lying count still fails below
            let mut items = Vec::with_capacity(count.min(bytes.len()));
            let mut consumed = 4;
            for _ in 0..count {
                let (item, n) = decode(elem, &bytes[consumed..])?;
                items.push(item);
                consumed += n;
            }
            Ok((Value::List(items), consumed))
        }
    }
}

fn decode_primitive(name: &str, bytes: &[u8]) -> Result<(Value, usize)> {
    match name {
        "bool" => {
            let b = take(bytes, 1)?[0];
            match b {
                0 => Ok((Value::Bool(false), 1)),
                1 => Ok((Value::Bool(true), 1)),
                other => Err(Error::TypeMismatch {
                    expected: "bool".to_string(),
                    got: format!("byte 0x{:02x}", other),
                }),
            }
        }
        "u8" => Ok((Value::U8(take(bytes, 1)?[0]), 1)),
        "i8" => Ok((Value::I8(take(bytes, 1)?[0] as i8), 1)),
        "u16" => Ok((Value::U16(u16::from_le_bytes(fixed(bytes)?)), 2)),
        "i16" => Ok((Value::I16(i16::from_le_bytes(fixed(bytes)?)), 2)),
        "u32" => Ok((Value::U32(u32::from_le_bytes(fixed(bytes)?)), 4)),
        "i32" => Ok((Value::I32(i32::from_le_bytes(fixed(bytes)?)), 4)),
        "u64" => Ok((Value::U64(u64::from_le_bytes(fixed(bytes)?)), 8)),
        "i64" => Ok((Value::I64(i64::from_le_bytes(fixed(bytes)?)), 8)),
        "f32" => Ok((Value::F32(f32::from_le_bytes(fixed(bytes)?)), 4)),
        "f64" => Ok((Value::F64(f64::from_le_bytes(fixed(bytes)?)), 8)),
        "string" => {
            let len = read_u32(bytes)? as usize;
            let raw = take(&bytes[4..], len)?;
            let s = std::str::from_utf8(raw).map_err(|_| Error::InvalidUtf8)?;
            Ok((Value::String(s.to_string()), 4 + len))
        }
        "bytes" => {
            let len = read_u32(bytes)? as usize;
            let raw = take(&bytes[4..], len)?;
            Ok((Value::Bytes(raw.to_vec()), 4 + len))
        }
        "publicKey" => {
            let raw: [u8; 32] = fixed(bytes)?;
            Ok((Value::Pubkey(Pubkey::new_from_array(raw)), 32))
        }
        other => Err(Error::UnsupportedType {
            type_name: other.to_string(),
        }),
    }
}

fn take(bytes: &[u8], n: usize) -> Result<&[u8]> {
    bytes.get(..n).ok_or(Error::BufferUnderflow {
        needed: n,
        remaining: bytes.len(),
    })
}

fn fixed<const N: usize>(bytes: &[u8]) -> Result<[u8; N]> {
    let slice = take(bytes, N)?;
    let mut out = [0u8; N];
    out.copy_from_slice(slice);
    Ok(out)
}

fn read_u32(bytes: &[u8]) -> Result<u32> {
    Ok(u32::from_le_bytes(fixed(bytes)?))
}

/// Encode an instruction's full argument buffer: each value in declaration
/// order, concatenated with no separators.
pub fn args_buffer(instruction: &str, fields: &[IdlField], values: &[Value]) -> Result<Vec<u8>> {
    if fields.len() != values.len() {
        return Err(Error::ArgumentCount {
            instruction: instruction.to_string(),
            expected: fields.len(),
            got: values.len(),
        });
    }
    let mut out = Vec::new();
    for (field, value) in fields.iter().zip(values) {
        encode_into(&field.ty, value, &mut out)?;
    }
    Ok(out)
}

/// Decode a full argument buffer back into values, in declaration order
pub fn decode_args(fields: &[IdlField], bytes: &[u8]) -> Result<Vec<Value>> {
    let mut values = Vec::with_capacity(fields.len());
    let mut offset = 0;
    for field in fields {
        let (value, n) = decode(&field.ty, &bytes[offset..])?;
        values.push(value);
        offset += n;
    }
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prim(name: &str) -> IdlType {
        IdlType::Primitive(name.to_string())
    }

    fn roundtrip(ty: &IdlType, value: Value) {
        let encoded = encode(ty, &value).unwrap();
        let (decoded, consumed) = decode(ty, &encoded).unwrap();
        assert_eq!(decoded, value);
        assert_eq!(consumed, encoded.len());
    }

    #[test]
    fn test_scalar_roundtrips() {
        roundtrip(&prim("bool"), Value::Bool(true));
        roundtrip(&prim("u8"), Value::U8(0xff));
        roundtrip(&prim("i8"), Value::I8(-7));
        roundtrip(&prim("u16"), Value::U16(0xbeef));
        roundtrip(&prim("i16"), Value::I16(-12345));
        roundtrip(&prim("u32"), Value::U32(0xdead_beef));
        roundtrip(&prim("i32"), Value::I32(i32::MIN));
        roundtrip(&prim("u64"), Value::U64(u64::MAX));
        roundtrip(&prim("i64"), Value::I64(-1));
        roundtrip(&prim("f32"), Value::F32(1.5));
        roundtrip(&prim("f64"), Value::F64(-2.25e10));
    }

    #[test]
    fn test_variable_length_roundtrips() {
        roundtrip(&prim("string"), Value::String("hello λ".to_string()));
        roundtrip(&prim("string"), Value::String(String::new()));
        roundtrip(&prim("bytes"), Value::Bytes(vec![1, 2, 3, 4]));
        roundtrip(&prim("publicKey"), Value::Pubkey(Pubkey::new_unique()));
    }

    #[test]
    fn test_compound_roundtrips() {
        let arr = IdlType::Array {
            array: (Box::new(prim("u16")), 3),
        };
        roundtrip(
            &arr,
            Value::List(vec![Value::U16(1), Value::U16(2), Value::U16(3)]),
        );

        let vec_ty = IdlType::Vec {
            vec: Box::new(prim("string")),
        };
        roundtrip(
            &vec_ty,
            Value::List(vec![Value::String("a".into()), Value::String("bb".into())]),
        );
    }

    #[test]
    fn test_wire_layout() {
        // u32 little-endian length prefix, then UTF-8 bytes
        let encoded = encode(&prim("string"), &Value::String("ab".into())).unwrap();
        assert_eq!(encoded, vec![2, 0, 0, 0, b'a', b'b']);

        // vectors carry an element count, arrays do not
        let vec_ty = IdlType::Vec {
            vec: Box::new(prim("u8")),
        };
        let encoded = encode(&vec_ty, &Value::List(vec![Value::U8(9)])).unwrap();
        assert_eq!(encoded, vec![1, 0, 0, 0, 9]);

        let arr_ty = IdlType::Array {
            array: (Box::new(prim("u8")), 2),
        };
        let encoded = encode(&arr_ty, &Value::List(vec![Value::U8(7), Value::U8(8)])).unwrap();
        assert_eq!(encoded, vec![7, 8]);
    }

    #[test]
    fn test_args_buffer_concatenation() {
        let fields = vec![
            IdlField {
                name: "count".to_string(),
                ty: prim("u8"),
            },
            IdlField {
                name: "amount".to_string(),
                ty: prim("u64"),
            },
        ];
        let buf = args_buffer("Foo", &fields, &[Value::U8(7), Value::U64(42)]).unwrap();
        assert_eq!(buf.len(), 9);
        assert_eq!(buf[0], 7);
        assert_eq!(u64::from_le_bytes(buf[1..9].try_into().unwrap()), 42);

        let values = decode_args(&fields, &buf).unwrap();
        assert_eq!(values, vec![Value::U8(7), Value::U64(42)]);
    }

    #[test]
    fn test_argument_count_checked() {
        let fields = vec![IdlField {
            name: "x".to_string(),
            ty: prim("u8"),
        }];
        let err = args_buffer("Foo", &fields, &[]).unwrap_err();
        assert!(matches!(
            err,
            Error::ArgumentCount {
                expected: 1,
                got: 0,
                ..
            }
        ));
    }

    #[test]
    fn test_type_mismatch() {
        let err = encode(&prim("u64"), &Value::String("nope".into())).unwrap_err();
        assert!(matches!(err, Error::TypeMismatch { .. }));

        let arr = IdlType::Array {
            array: (Box::new(prim("u8")), 4),
        };
        let err = encode(&arr, &Value::List(vec![Value::U8(1)])).unwrap_err();
        assert!(matches!(
            err,
            Error::ArrayLength {
                expected: 4,
                got: 1
            }
        ));
    }

    #[test]
    fn test_truncated_buffer() {
        let err = decode(&prim("u64"), &[1, 2, 3]).unwrap_err();
        assert!(matches!(
            err,
            Error::BufferUnderflow {
                needed: 8,
                remaining: 3
            }
        ));

        // length prefix promises more bytes than exist
        let err = decode(&prim("string"), &[10, 0, 0, 0, b'x']).unwrap_err();
        assert!(matches!(err, Error::BufferUnderflow { .. }));
    }

    #[test]
    fn test_invalid_bool_byte() {
        let err = decode(&prim("bool"), &[2]).unwrap_err();
        assert!(matches!(err, Error::TypeMismatch { .. }));
    }

    #[test]
    fn test_invalid_utf8() {
        let err = decode(&prim("string"), &[2, 0, 0, 0, 0xff, 0xfe]).unwrap_err();
        assert!(matches!(err, Error::InvalidUtf8));
    }
}
