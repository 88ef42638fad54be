//! BlazorPack encoder.
//!
//! A remembered wire width class is re-emitted exactly, which is what makes
//! `encode_frame(decode_body(..))` byte-identical for untouched trees even
//! when the source used a non-canonical width. Values carrying `Auto` (the
//! freshly-constructed default) get the most compact legal tag.

use blazorpack_frame::encode_prefix;
use bytes::{BufMut, BytesMut};

use crate::error::EncodeError;
use crate::value::{
    BinFormat, BinValue, ExtFormat, ExtValue, FloatFormat, FloatValue, IntFormat, IntValue,
    SeqFormat, StrFormat, StrValue, Value,
};

type Result<T> = std::result::Result<T, EncodeError>;

/// Serialize one value into `dst`.
pub fn encode(value: &Value, dst: &mut BytesMut) -> Result<()> {
    match value {
        Value::Nil => dst.put_u8(0xc0),
        Value::Bool(false) => dst.put_u8(0xc2),
        Value::Bool(true) => dst.put_u8(0xc3),
        Value::Int(v) => encode_int(v, dst)?,
        Value::Float(v) => encode_float(v, dst),
        Value::Str(v) => encode_str(v, dst)?,
        Value::Bin(v) => encode_bin(v, dst)?,
        Value::Array(v) => {
            seq_header(v.items.len(), v.format, 0x90, 0xdc, 0xdd, "array length", dst)?;
            for item in &v.items {
                encode(item, dst)?;
            }
        }
        Value::Map(v) => {
            seq_header(v.entries.len(), v.format, 0x80, 0xde, 0xdf, "map length", dst)?;
            for (key, val) in &v.entries {
                encode(key, dst)?;
                encode(val, dst)?;
            }
        }
        Value::Ext(v) => encode_ext(v, dst)?,
    }
    Ok(())
}

/// Serialize concatenated top-level values into one frame body (no prefix).
pub fn encode_body(values: &[Value]) -> Result<Vec<u8>> {
    let mut dst = BytesMut::new();
    for value in values {
        encode(value, &mut dst)?;
    }
    Ok(dst.to_vec())
}

/// Serialize one frame: varint length prefix followed by the body.
pub fn encode_frame(values: &[Value]) -> Result<Vec<u8>> {
    let body = encode_body(values)?;
    if body.len() > u32::MAX as usize {
        return Err(overflow(body.len(), "32-bit frame length"));
    }
    let mut dst = BytesMut::with_capacity(body.len() + blazorpack_frame::MAX_PREFIX_SIZE);
    encode_prefix(body.len() as u32, &mut dst);
    dst.put_slice(&body);
    Ok(dst.to_vec())
}

fn encode_int(v: &IntValue, dst: &mut BytesMut) -> Result<()> {
    let value = v.as_i128();
    match v.format {
        IntFormat::Auto => {
            if value < 0 {
                let value = value as i64;
                if value >= -32 {
                    dst.put_u8(value as i8 as u8);
                } else if value >= i64::from(i8::MIN) {
                    dst.put_u8(0xd0);
                    dst.put_i8(value as i8);
                } else if value >= i64::from(i16::MIN) {
                    dst.put_u8(0xd1);
                    dst.put_i16(value as i16);
                } else if value >= i64::from(i32::MIN) {
                    dst.put_u8(0xd2);
                    dst.put_i32(value as i32);
                } else {
                    dst.put_u8(0xd3);
                    dst.put_i64(value);
                }
            } else {
                let value = value as u64;
                if value <= 127 {
                    dst.put_u8(value as u8);
                } else if value <= 0xff {
                    dst.put_u8(0xcc);
                    dst.put_u8(value as u8);
                } else if value <= 0xffff {
                    dst.put_u8(0xcd);
                    dst.put_u16(value as u16);
                } else if value <= u64::from(u32::MAX) {
                    dst.put_u8(0xce);
                    dst.put_u32(value as u32);
                } else {
                    dst.put_u8(0xcf);
                    dst.put_u64(value);
                }
            }
            Ok(())
        }
        IntFormat::FixPos => {
            fit((0..=127).contains(&value), value, "positive fixint")?;
            dst.put_u8(value as u8);
            Ok(())
        }
        IntFormat::FixNeg => {
            fit((-32..=-1).contains(&value), value, "negative fixint")?;
            dst.put_u8(value as i8 as u8);
            Ok(())
        }
        IntFormat::Uint8 => {
            fit((0..=0xff).contains(&value), value, "uint8")?;
            dst.put_u8(0xcc);
            dst.put_u8(value as u8);
            Ok(())
        }
        IntFormat::Uint16 => {
            fit((0..=0xffff).contains(&value), value, "uint16")?;
            dst.put_u8(0xcd);
            dst.put_u16(value as u16);
            Ok(())
        }
        IntFormat::Uint32 => {
            fit((0..=i128::from(u32::MAX)).contains(&value), value, "uint32")?;
            dst.put_u8(0xce);
            dst.put_u32(value as u32);
            Ok(())
        }
        IntFormat::Uint64 => {
            fit(value >= 0, value, "uint64")?;
            dst.put_u8(0xcf);
            dst.put_u64(value as u64);
            Ok(())
        }
        IntFormat::Int8 => {
            fit(
                (i128::from(i8::MIN)..=i128::from(i8::MAX)).contains(&value),
                value,
                "int8",
            )?;
            dst.put_u8(0xd0);
            dst.put_i8(value as i8);
            Ok(())
        }
        IntFormat::Int16 => {
            fit(
                (i128::from(i16::MIN)..=i128::from(i16::MAX)).contains(&value),
                value,
                "int16",
            )?;
            dst.put_u8(0xd1);
            dst.put_i16(value as i16);
            Ok(())
        }
        IntFormat::Int32 => {
            fit(
                (i128::from(i32::MIN)..=i128::from(i32::MAX)).contains(&value),
                value,
                "int32",
            )?;
            dst.put_u8(0xd2);
            dst.put_i32(value as i32);
            Ok(())
        }
        IntFormat::Int64 => {
            fit(
                (i128::from(i64::MIN)..=i128::from(i64::MAX)).contains(&value),
                value,
                "int64",
            )?;
            dst.put_u8(0xd3);
            dst.put_i64(value as i64);
            Ok(())
        }
    }
}

fn encode_float(v: &FloatValue, dst: &mut BytesMut) {
    match v.format {
        // Widening on decode was exact, so the narrowing cast is too.
        FloatFormat::F32 => {
            dst.put_u8(0xca);
            dst.put_f32(v.value as f32);
        }
        FloatFormat::F64 => {
            dst.put_u8(0xcb);
            dst.put_f64(v.value);
        }
    }
}

fn encode_str(v: &StrValue, dst: &mut BytesMut) -> Result<()> {
    let bytes = v.as_bytes();
    let len = bytes.len();
    match v.format {
        StrFormat::Auto => {
            if len <= 31 {
                dst.put_u8(0xa0 | len as u8);
            } else if len <= 0xff {
                dst.put_u8(0xd9);
                dst.put_u8(len as u8);
            } else if len <= 0xffff {
                dst.put_u8(0xda);
                dst.put_u16(len as u16);
            } else if len <= u32::MAX as usize {
                dst.put_u8(0xdb);
                dst.put_u32(len as u32);
            } else {
                return Err(overflow(len, "str32 length"));
            }
        }
        StrFormat::Fix => {
            fit(len <= 31, len, "fixstr length")?;
            dst.put_u8(0xa0 | len as u8);
        }
        StrFormat::Str8 => {
            fit(len <= 0xff, len, "str8 length")?;
            dst.put_u8(0xd9);
            dst.put_u8(len as u8);
        }
        StrFormat::Str16 => {
            fit(len <= 0xffff, len, "str16 length")?;
            dst.put_u8(0xda);
            dst.put_u16(len as u16);
        }
        StrFormat::Str32 => {
            fit(len <= u32::MAX as usize, len, "str32 length")?;
            dst.put_u8(0xdb);
            dst.put_u32(len as u32);
        }
    }
    dst.put_slice(bytes);
    Ok(())
}

fn encode_bin(v: &BinValue, dst: &mut BytesMut) -> Result<()> {
    let bytes = v.as_bytes();
    let len = bytes.len();
    match v.format {
        BinFormat::Auto => {
            if len <= 0xff {
                dst.put_u8(0xc4);
                dst.put_u8(len as u8);
            } else if len <= 0xffff {
                dst.put_u8(0xc5);
                dst.put_u16(len as u16);
            } else if len <= u32::MAX as usize {
                dst.put_u8(0xc6);
                dst.put_u32(len as u32);
            } else {
                return Err(overflow(len, "bin32 length"));
            }
        }
        BinFormat::Bin8 => {
            fit(len <= 0xff, len, "bin8 length")?;
            dst.put_u8(0xc4);
            dst.put_u8(len as u8);
        }
        BinFormat::Bin16 => {
            fit(len <= 0xffff, len, "bin16 length")?;
            dst.put_u8(0xc5);
            dst.put_u16(len as u16);
        }
        BinFormat::Bin32 => {
            fit(len <= u32::MAX as usize, len, "bin32 length")?;
            dst.put_u8(0xc6);
            dst.put_u32(len as u32);
        }
    }
    dst.put_slice(bytes);
    Ok(())
}

fn seq_header(
    len: usize,
    format: SeqFormat,
    fix_base: u8,
    tag16: u8,
    tag32: u8,
    what: &'static str,
    dst: &mut BytesMut,
) -> Result<()> {
    match format {
        SeqFormat::Auto => {
            if len <= 15 {
                dst.put_u8(fix_base | len as u8);
            } else if len <= 0xffff {
                dst.put_u8(tag16);
                dst.put_u16(len as u16);
            } else if len <= u32::MAX as usize {
                dst.put_u8(tag32);
                dst.put_u32(len as u32);
            } else {
                return Err(overflow(len, what));
            }
        }
        SeqFormat::Fix => {
            fit(len <= 15, len, what)?;
            dst.put_u8(fix_base | len as u8);
        }
        SeqFormat::Len16 => {
            fit(len <= 0xffff, len, what)?;
            dst.put_u8(tag16);
            dst.put_u16(len as u16);
        }
        SeqFormat::Len32 => {
            fit(len <= u32::MAX as usize, len, what)?;
            dst.put_u8(tag32);
            dst.put_u32(len as u32);
        }
    }
    Ok(())
}

fn encode_ext(v: &ExtValue, dst: &mut BytesMut) -> Result<()> {
    let len = v.payload.len();
    match v.format {
        ExtFormat::Auto => match len {
            1 => dst.put_u8(0xd4),
            2 => dst.put_u8(0xd5),
            4 => dst.put_u8(0xd6),
            8 => dst.put_u8(0xd7),
            16 => dst.put_u8(0xd8),
            _ if len <= 0xff => {
                dst.put_u8(0xc7);
                dst.put_u8(len as u8);
            }
            _ if len <= 0xffff => {
                dst.put_u8(0xc8);
                dst.put_u16(len as u16);
            }
            _ if len <= u32::MAX as usize => {
                dst.put_u8(0xc9);
                dst.put_u32(len as u32);
            }
            _ => return Err(overflow(len, "ext32 length")),
        },
        ExtFormat::Fix1 => {
            fit(len == 1, len, "fixext1 payload")?;
            dst.put_u8(0xd4);
        }
        ExtFormat::Fix2 => {
            fit(len == 2, len, "fixext2 payload")?;
            dst.put_u8(0xd5);
        }
        ExtFormat::Fix4 => {
            fit(len == 4, len, "fixext4 payload")?;
            dst.put_u8(0xd6);
        }
        ExtFormat::Fix8 => {
            fit(len == 8, len, "fixext8 payload")?;
            dst.put_u8(0xd7);
        }
        ExtFormat::Fix16 => {
            fit(len == 16, len, "fixext16 payload")?;
            dst.put_u8(0xd8);
        }
        ExtFormat::Ext8 => {
            fit(len <= 0xff, len, "ext8 length")?;
            dst.put_u8(0xc7);
            dst.put_u8(len as u8);
        }
        ExtFormat::Ext16 => {
            fit(len <= 0xffff, len, "ext16 length")?;
            dst.put_u8(0xc8);
            dst.put_u16(len as u16);
        }
        ExtFormat::Ext32 => {
            fit(len <= u32::MAX as usize, len, "ext32 length")?;
            dst.put_u8(0xc9);
            dst.put_u32(len as u32);
        }
    }
    dst.put_u8(v.code);
    dst.put_slice(&v.payload);
    Ok(())
}

fn fit(ok: bool, value: impl ToString, format: &'static str) -> Result<()> {
    if ok {
        Ok(())
    } else {
        Err(overflow(value, format))
    }
}

fn overflow(value: impl ToString, format: &'static str) -> EncodeError {
    EncodeError::NumericOverflow {
        value: value.to_string(),
        format,
    }
}
