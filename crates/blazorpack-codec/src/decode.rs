//! Single-pass BlazorPack decoder.
//!
//! One leading tag byte selects the case; multi-byte scalars and length
//! fields are big-endian. Every error carries the byte offset it was
//! detected at. Declared lengths are checked against the remaining input
//! before any allocation, so an adversarial claim fails fast.

use bytes::Bytes;

use crate::error::DecodeError;
use crate::value::{
    ArrayValue, BinFormat, BinValue, ExtFormat, ExtValue, FloatValue, IntFormat, IntValue,
    MapValue, SeqFormat, StrFormat, StrValue, Value,
};

/// Maximum container nesting depth accepted by the decoder.
pub const MAX_DEPTH: usize = 128;

type Result<T> = std::result::Result<T, DecodeError>;

/// Decode exactly one top-level value from the start of `bytes`.
///
/// Returns the value and the number of bytes consumed, so the caller can
/// advance their read cursor.
pub fn decode(bytes: &[u8]) -> Result<(Value, usize)> {
    decode_at(bytes, 0, 0)
}

/// Decode every concatenated top-level value in a frame body.
///
/// One WebSocket payload routinely carries several independent invocation
/// records back to back; this driver consumes the slice until it is empty.
pub fn decode_body(body: &[u8]) -> Result<Vec<Value>> {
    let mut values = Vec::new();
    let mut pos = 0usize;
    while pos < body.len() {
        let (value, next) = decode_at(body, pos, 0)?;
        values.push(value);
        pos = next;
    }
    Ok(values)
}

fn decode_at(buf: &[u8], pos: usize, depth: usize) -> Result<(Value, usize)> {
    if depth > MAX_DEPTH {
        return Err(DecodeError::RecursionLimitExceeded {
            offset: pos,
            limit: MAX_DEPTH,
        });
    }
    let tag = *buf.get(pos).ok_or(DecodeError::TruncatedInput {
        offset: pos,
        expected: "a tag byte",
    })?;
    let p = pos + 1;
    match tag {
        // positive fixint
        0x00..=0x7f => Ok((int(i128::from(tag), IntFormat::FixPos), p)),

        // fixmap / fixarray / fixstr
        0x80..=0x8f => decode_map(buf, p, usize::from(tag & 0x0f), SeqFormat::Fix, depth),
        0x90..=0x9f => decode_array(buf, p, usize::from(tag & 0x0f), SeqFormat::Fix, depth),
        0xa0..=0xbf => decode_str(buf, p, usize::from(tag & 0x1f), StrFormat::Fix),

        0xc0 => Ok((Value::Nil, p)),
        0xc1 => Err(DecodeError::MalformedTag { offset: pos, tag }),
        0xc2 => Ok((Value::Bool(false), p)),
        0xc3 => Ok((Value::Bool(true), p)),

        // bin8/16/32
        0xc4 => {
            let len = usize::from(read_u8(buf, p, "bin8 length")?);
            decode_bin(buf, p + 1, len, BinFormat::Bin8)
        }
        0xc5 => {
            let len = usize::from(read_u16(buf, p, "bin16 length")?);
            decode_bin(buf, p + 2, len, BinFormat::Bin16)
        }
        0xc6 => {
            let len = read_u32(buf, p, "bin32 length")? as usize;
            decode_bin(buf, p + 4, len, BinFormat::Bin32)
        }

        // ext8/16/32
        0xc7 => {
            let len = usize::from(read_u8(buf, p, "ext8 length")?);
            decode_ext(buf, p + 1, len, ExtFormat::Ext8)
        }
        0xc8 => {
            let len = usize::from(read_u16(buf, p, "ext16 length")?);
            decode_ext(buf, p + 2, len, ExtFormat::Ext16)
        }
        0xc9 => {
            let len = read_u32(buf, p, "ext32 length")? as usize;
            decode_ext(buf, p + 4, len, ExtFormat::Ext32)
        }

        // float32 is widened to f64; the width class is remembered
        0xca => {
            let b = need(buf, p, 4, "4-byte float payload")?;
            let v = f32::from_be_bytes(b.try_into().unwrap());
            Ok((Value::Float(FloatValue::widened(v)), p + 4))
        }
        0xcb => {
            let b = need(buf, p, 8, "8-byte float payload")?;
            let v = f64::from_be_bytes(b.try_into().unwrap());
            Ok((Value::Float(FloatValue::new(v)), p + 8))
        }

        // uint8-64
        0xcc => {
            let v = read_u8(buf, p, "uint8 payload")?;
            Ok((int(i128::from(v), IntFormat::Uint8), p + 1))
        }
        0xcd => {
            let v = read_u16(buf, p, "uint16 payload")?;
            Ok((int(i128::from(v), IntFormat::Uint16), p + 2))
        }
        0xce => {
            let v = read_u32(buf, p, "uint32 payload")?;
            Ok((int(i128::from(v), IntFormat::Uint32), p + 4))
        }
        0xcf => {
            let b = need(buf, p, 8, "uint64 payload")?;
            let v = u64::from_be_bytes(b.try_into().unwrap());
            Ok((int(i128::from(v), IntFormat::Uint64), p + 8))
        }

        // int8-64
        0xd0 => {
            let v = read_u8(buf, p, "int8 payload")? as i8;
            Ok((int(i128::from(v), IntFormat::Int8), p + 1))
        }
        0xd1 => {
            let b = need(buf, p, 2, "int16 payload")?;
            let v = i16::from_be_bytes(b.try_into().unwrap());
            Ok((int(i128::from(v), IntFormat::Int16), p + 2))
        }
        0xd2 => {
            let b = need(buf, p, 4, "int32 payload")?;
            let v = i32::from_be_bytes(b.try_into().unwrap());
            Ok((int(i128::from(v), IntFormat::Int32), p + 4))
        }
        0xd3 => {
            let b = need(buf, p, 8, "int64 payload")?;
            let v = i64::from_be_bytes(b.try_into().unwrap());
            Ok((int(i128::from(v), IntFormat::Int64), p + 8))
        }

        // fixext1/2/4/8/16
        0xd4 => decode_ext(buf, p, 1, ExtFormat::Fix1),
        0xd5 => decode_ext(buf, p, 2, ExtFormat::Fix2),
        0xd6 => decode_ext(buf, p, 4, ExtFormat::Fix4),
        0xd7 => decode_ext(buf, p, 8, ExtFormat::Fix8),
        0xd8 => decode_ext(buf, p, 16, ExtFormat::Fix16),

        // str8/16/32
        0xd9 => {
            let len = usize::from(read_u8(buf, p, "str8 length")?);
            decode_str(buf, p + 1, len, StrFormat::Str8)
        }
        0xda => {
            let len = usize::from(read_u16(buf, p, "str16 length")?);
            decode_str(buf, p + 2, len, StrFormat::Str16)
        }
        0xdb => {
            let len = read_u32(buf, p, "str32 length")? as usize;
            decode_str(buf, p + 4, len, StrFormat::Str32)
        }

        // array16/32, map16/32
        0xdc => {
            let count = usize::from(read_u16(buf, p, "array16 length")?);
            decode_array(buf, p + 2, count, SeqFormat::Len16, depth)
        }
        0xdd => {
            let count = read_u32(buf, p, "array32 length")? as usize;
            decode_array(buf, p + 4, count, SeqFormat::Len32, depth)
        }
        0xde => {
            let count = usize::from(read_u16(buf, p, "map16 length")?);
            decode_map(buf, p + 2, count, SeqFormat::Len16, depth)
        }
        0xdf => {
            let count = read_u32(buf, p, "map32 length")? as usize;
            decode_map(buf, p + 4, count, SeqFormat::Len32, depth)
        }

        // negative fixint
        0xe0..=0xff => Ok((int(i128::from(tag as i8), IntFormat::FixNeg), p)),
    }
}

fn int(value: i128, format: IntFormat) -> Value {
    Value::Int(IntValue::with_format(value, format))
}

fn decode_str(buf: &[u8], pos: usize, len: usize, format: StrFormat) -> Result<(Value, usize)> {
    let bytes = need(buf, pos, len, "string payload")?;
    // Invalid UTF-8 is kept verbatim; StrValue reports it via as_str/is_utf8.
    let value = StrValue::from_wire(Bytes::copy_from_slice(bytes), format);
    Ok((Value::Str(value), pos + len))
}

fn decode_bin(buf: &[u8], pos: usize, len: usize, format: BinFormat) -> Result<(Value, usize)> {
    let bytes = need(buf, pos, len, "binary payload")?;
    let value = BinValue::from_wire(Bytes::copy_from_slice(bytes), format);
    Ok((Value::Bin(value), pos + len))
}

fn decode_ext(buf: &[u8], pos: usize, len: usize, format: ExtFormat) -> Result<(Value, usize)> {
    let code = read_u8(buf, pos, "extension type code")?;
    let start = pos + 1;
    let payload = need(buf, start, len, "extension payload")?;
    let value = ExtValue::from_wire(code, Bytes::copy_from_slice(payload), format);
    Ok((Value::Ext(value), start + len))
}

fn decode_array(
    buf: &[u8],
    pos: usize,
    count: usize,
    format: SeqFormat,
    depth: usize,
) -> Result<(Value, usize)> {
    // Every element takes at least one byte; reject inflated counts before
    // allocating.
    if count > buf.len().saturating_sub(pos) {
        return Err(DecodeError::TruncatedInput {
            offset: pos,
            expected: "array elements",
        });
    }
    let mut items = Vec::with_capacity(count);
    let mut cur = pos;
    for _ in 0..count {
        let (value, next) = decode_at(buf, cur, depth + 1)?;
        items.push(value);
        cur = next;
    }
    Ok((Value::Array(ArrayValue::from_wire(items, format)), cur))
}

fn decode_map(
    buf: &[u8],
    pos: usize,
    count: usize,
    format: SeqFormat,
    depth: usize,
) -> Result<(Value, usize)> {
    if count.saturating_mul(2) > buf.len().saturating_sub(pos) {
        return Err(DecodeError::TruncatedInput {
            offset: pos,
            expected: "map entries",
        });
    }
    let mut entries = Vec::with_capacity(count);
    let mut cur = pos;
    for _ in 0..count {
        let (key, after_key) = decode_at(buf, cur, depth + 1)?;
        let (value, after_value) = decode_at(buf, after_key, depth + 1)?;
        entries.push((key, value));
        cur = after_value;
    }
    Ok((Value::Map(MapValue::from_wire(entries, format)), cur))
}

fn need<'a>(buf: &'a [u8], pos: usize, count: usize, expected: &'static str) -> Result<&'a [u8]> {
    buf.get(pos..pos + count)
        .ok_or(DecodeError::TruncatedInput {
            offset: pos,
            expected,
        })
}

fn read_u8(buf: &[u8], pos: usize, expected: &'static str) -> Result<u8> {
    Ok(need(buf, pos, 1, expected)?[0])
}

fn read_u16(buf: &[u8], pos: usize, expected: &'static str) -> Result<u16> {
    let b = need(buf, pos, 2, expected)?;
    Ok(u16::from_be_bytes(b.try_into().unwrap()))
}

fn read_u32(buf: &[u8], pos: usize, expected: &'static str) -> Result<u32> {
    let b = need(buf, pos, 4, expected)?;
    Ok(u32::from_be_bytes(b.try_into().unwrap()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::FloatFormat;

    fn one(bytes: &[u8]) -> Value {
        let (value, consumed) = decode(bytes).unwrap();
        assert_eq!(consumed, bytes.len(), "all bytes consumed");
        value
    }

    #[test]
    fn scalars() {
        assert_eq!(one(&[0xc0]), Value::Nil);
        assert_eq!(one(&[0xc2]), Value::Bool(false));
        assert_eq!(one(&[0xc3]), Value::Bool(true));
        assert_eq!(one(&[0x00]), Value::uint(0));
        assert_eq!(one(&[0x7f]), Value::uint(127));
        assert_eq!(one(&[0xff]), Value::int(-1));
        assert_eq!(one(&[0xe0]), Value::int(-32));
    }

    #[test]
    fn sized_integers() {
        assert_eq!(one(&[0xcc, 0x80]), Value::uint(128));
        assert_eq!(one(&[0xcd, 0x01, 0x00]), Value::uint(256));
        assert_eq!(one(&[0xce, 0x00, 0x01, 0x00, 0x00]), Value::uint(0x10000));
        assert_eq!(
            one(&[0xcf, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff]),
            Value::uint(u64::MAX)
        );
        assert_eq!(one(&[0xd0, 0xdf]), Value::int(-33));
        assert_eq!(one(&[0xd1, 0x80, 0x00]), Value::int(-32768));
        assert_eq!(
            one(&[0xd3, 0x80, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00]),
            Value::int(i64::MIN)
        );
    }

    #[test]
    fn signed_tag_with_non_negative_payload() {
        // Non-canonical but legal; the width class must survive.
        let value = one(&[0xd0, 0x05]);
        assert_eq!(value, Value::uint(5));
        match value {
            Value::Int(v) => assert_eq!(v.format, IntFormat::Int8),
            other => panic!("expected Int, got {other:?}"),
        }
    }

    #[test]
    fn floats_widen_and_remember_width() {
        let single = one(&[0xca, 0x3f, 0x80, 0x00, 0x00]); // 1.0f32
        match single {
            Value::Float(f) => {
                assert_eq!(f.value, 1.0);
                assert_eq!(f.format, FloatFormat::F32);
            }
            other => panic!("expected Float, got {other:?}"),
        }
        let double = one(&[0xcb, 0x40, 0x09, 0x21, 0xfb, 0x54, 0x44, 0x2d, 0x18]);
        assert_eq!(double, Value::float(std::f64::consts::PI));
    }

    #[test]
    fn strings() {
        assert_eq!(one(&[0xa0]), Value::str(""));
        assert_eq!(one(&[0xa3, b'a', b'b', b'c']), Value::str("abc"));
        assert_eq!(one(&[0xd9, 0x03, b'x', b'y', b'z']), Value::str("xyz"));
    }

    #[test]
    fn invalid_utf8_string_is_not_an_error() {
        let value = one(&[0xa2, 0xff, 0xfe]);
        match value {
            Value::Str(s) => {
                assert!(!s.is_utf8());
                assert_eq!(s.as_bytes(), &[0xff, 0xfe]);
            }
            other => panic!("expected Str, got {other:?}"),
        }
    }

    #[test]
    fn binary() {
        assert_eq!(one(&[0xc4, 0x03, 1, 2, 3]), Value::bin(vec![1, 2, 3]));
        assert_eq!(one(&[0xc4, 0x00]), Value::bin(vec![]));
    }

    #[test]
    fn arrays_and_maps() {
        assert_eq!(
            one(&[0x92, 0x01, 0xa1, b'a']),
            Value::array(vec![Value::uint(1), Value::str("a")])
        );
        assert_eq!(
            one(&[0x81, 0xa1, b'k', 0x07]),
            Value::map(vec![(Value::str("k"), Value::uint(7))])
        );
    }

    #[test]
    fn duplicate_map_keys_are_retained_in_order() {
        let value = one(&[0x82, 0xa1, b'k', 0x01, 0xa1, b'k', 0x02]);
        let entries = value.as_map().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0], (Value::str("k"), Value::uint(1)));
        assert_eq!(entries[1], (Value::str("k"), Value::uint(2)));
    }

    #[test]
    fn extensions_pass_through_opaquely() {
        // fixext4, type 0x01
        let value = one(&[0xd6, 0x01, 0xde, 0xad, 0xbe, 0xef]);
        match &value {
            Value::Ext(e) => {
                assert_eq!(e.code, 0x01);
                assert_eq!(e.payload.as_ref(), &[0xde, 0xad, 0xbe, 0xef]);
                assert_eq!(e.format, ExtFormat::Fix4);
            }
            other => panic!("expected Ext, got {other:?}"),
        }
        // ext8 with the msgpack timestamp code survives uninterpreted
        let value = one(&[0xc7, 0x02, 0xff, 0xaa, 0xbb]);
        assert_eq!(value, Value::ext(0xff, vec![0xaa, 0xbb]));
    }

    #[test]
    fn reserved_tag_is_malformed() {
        assert_eq!(
            decode(&[0xc1]).unwrap_err(),
            DecodeError::MalformedTag { offset: 0, tag: 0xc1 }
        );
    }

    #[test]
    fn malformed_tag_offset_is_reported_inside_containers() {
        let err = decode(&[0x91, 0xc1]).unwrap_err();
        assert_eq!(err, DecodeError::MalformedTag { offset: 1, tag: 0xc1 });
    }

    #[test]
    fn empty_input_is_truncated() {
        assert!(matches!(
            decode(&[]).unwrap_err(),
            DecodeError::TruncatedInput { offset: 0, .. }
        ));
    }

    #[test]
    fn every_truncation_errors_without_panicking() {
        let wire: Vec<u8> = vec![
            0x93, // [
            0xcd, 0x01, 0x2c, // 300
            0x82, 0xa1, b'k', 0xc4, 0x02, 0xaa, 0xbb, 0xa1, b'k', 0xca, 0x3f, 0x80, 0x00,
            0x00, // {"k": bin, "k": 1.0f32}
            0xd6, 0x01, 0x01, 0x02, 0x03, 0x04, // fixext4
        ];
        assert!(decode(&wire).is_ok());
        for cut in 0..wire.len() {
            assert!(matches!(
                decode(&wire[..cut]).unwrap_err(),
                DecodeError::TruncatedInput { .. }
            ));
        }
    }

    #[test]
    fn inflated_length_claims_fail_fast() {
        // bin32 claiming 4 GiB backed by 2 bytes
        let err = decode(&[0xc6, 0xff, 0xff, 0xff, 0xff, 0x00, 0x00]).unwrap_err();
        assert!(matches!(err, DecodeError::TruncatedInput { .. }));
        // array32 claiming u32::MAX elements
        let err = decode(&[0xdd, 0xff, 0xff, 0xff, 0xff, 0x01]).unwrap_err();
        assert!(matches!(err, DecodeError::TruncatedInput { .. }));
        // map16 claiming more pairs than bytes remain
        let err = decode(&[0xde, 0xff, 0xff, 0x01]).unwrap_err();
        assert!(matches!(err, DecodeError::TruncatedInput { .. }));
    }

    #[test]
    fn nesting_beyond_cap_is_rejected() {
        let mut wire = vec![0x91; MAX_DEPTH + 2];
        wire.push(0x01);
        assert!(matches!(
            decode(&wire).unwrap_err(),
            DecodeError::RecursionLimitExceeded { limit: MAX_DEPTH, .. }
        ));
    }

    #[test]
    fn nesting_at_cap_is_accepted() {
        let mut wire = vec![0x91; MAX_DEPTH];
        wire.push(0x01);
        assert!(decode(&wire).is_ok());
    }

    #[test]
    fn body_with_concatenated_values() {
        let body = [0x91, 0xa3, b'a', b'b', b'c', 0x07, 0xc0];
        let values = decode_body(&body).unwrap();
        assert_eq!(
            values,
            vec![
                Value::array(vec![Value::str("abc")]),
                Value::uint(7),
                Value::Nil,
            ]
        );
    }

    #[test]
    fn body_truncated_mid_value() {
        let body = [0x07, 0x91];
        assert!(matches!(
            decode_body(&body).unwrap_err(),
            DecodeError::TruncatedInput { .. }
        ));
    }
}
