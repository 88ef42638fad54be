use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde_json::{json, Map, Number, Value as Json};

use blazorpack_codec::{IntValue, StrValue, Value};

use crate::error::{JsonError, Result};

/// Integers with a magnitude above 2^53 lose precision in a JSON number;
/// they cross the bridge as `{"$int": "<decimal>"}` instead.
const SAFE_INT_MAGNITUDE: u128 = 1 << 53;

/// Convert a value tree to its editable JSON form.
pub fn to_json(value: &Value) -> Json {
    match value {
        Value::Nil => Json::Null,
        Value::Bool(b) => Json::Bool(*b),
        Value::Int(v) => int_to_json(v),
        Value::Float(v) => float_to_json(v.value),
        Value::Str(s) => match s.as_str() {
            Some(text) => Json::String(text.to_owned()),
            None => json!({ "$raw": BASE64.encode(s.as_bytes()) }),
        },
        Value::Bin(b) => json!({ "$bin": BASE64.encode(b.as_bytes()) }),
        Value::Array(a) => Json::Array(a.items.iter().map(to_json).collect()),
        Value::Map(m) => {
            let pairs: Vec<Json> = m
                .entries
                .iter()
                .map(|(k, v)| Json::Array(vec![to_json(k), to_json(v)]))
                .collect();
            json!({ "$map": pairs })
        }
        Value::Ext(e) => json!({
            "$ext": { "code": e.code, "data": BASE64.encode(&e.payload) }
        }),
    }
}

/// Pretty-printed [`to_json`], the form handed to the editor.
pub fn to_json_text(value: &Value) -> Result<String> {
    Ok(serde_json::to_string_pretty(&to_json(value))?)
}

/// Convert editable JSON back into a value tree.
///
/// The result carries no wire width classes; re-encoding picks the most
/// compact legal form for every node.
pub fn from_json(json: &Json) -> Result<Value> {
    match json {
        Json::Null => Ok(Value::Nil),
        Json::Bool(b) => Ok(Value::Bool(*b)),
        Json::Number(n) => number_to_value(n),
        Json::String(s) => Ok(Value::str(s.clone())),
        Json::Array(items) => items
            .iter()
            .map(from_json)
            .collect::<Result<Vec<_>>>()
            .map(Value::array),
        Json::Object(obj) => tagged_to_value(obj),
    }
}

/// Parse JSON text and convert it with [`from_json`].
pub fn from_json_text(text: &str) -> Result<Value> {
    let json: Json = serde_json::from_str(text)?;
    from_json(&json)
}

fn int_to_json(v: &IntValue) -> Json {
    let value = v.as_i128();
    if value.unsigned_abs() > SAFE_INT_MAGNITUDE {
        return json!({ "$int": value.to_string() });
    }
    if value < 0 {
        Json::Number(Number::from(value as i64))
    } else {
        Json::Number(Number::from(value as u64))
    }
}

fn float_to_json(value: f64) -> Json {
    match Number::from_f64(value) {
        Some(n) => Json::Number(n),
        None if value.is_nan() => json!({ "$f64": "NaN" }),
        None if value == f64::INFINITY => json!({ "$f64": "Infinity" }),
        None => json!({ "$f64": "-Infinity" }),
    }
}

fn number_to_value(n: &Number) -> Result<Value> {
    if let Some(u) = n.as_u64() {
        Ok(Value::uint(u))
    } else if let Some(i) = n.as_i64() {
        Ok(Value::int(i))
    } else if let Some(f) = n.as_f64() {
        Ok(Value::float(f))
    } else {
        Err(mismatch(format!("unrepresentable number {n}")))
    }
}

fn tagged_to_value(obj: &Map<String, Json>) -> Result<Value> {
    let mut iter = obj.iter();
    let (tag, payload) = match (iter.next(), iter.next()) {
        (Some(entry), None) => entry,
        _ => {
            return Err(mismatch(format!(
                "objects must hold exactly one $-tag, found {} keys",
                obj.len()
            )))
        }
    };
    match tag.as_str() {
        "$bin" => Ok(Value::bin(decode_base64(payload, "$bin")?)),
        "$raw" => Ok(Value::Str(StrValue::from_bytes(decode_base64(
            payload, "$raw",
        )?))),
        "$int" => {
            let text = expect_str(payload, "$int")?;
            let value: i128 = text
                .parse()
                .map_err(|_| mismatch(format!("$int is not a decimal integer: {text:?}")))?;
            IntValue::from_i128(value)
                .map(Value::Int)
                .ok_or_else(|| mismatch(format!("$int is outside the 64-bit range: {text}")))
        }
        "$f64" => match expect_str(payload, "$f64")? {
            "NaN" => Ok(Value::float(f64::NAN)),
            "Infinity" => Ok(Value::float(f64::INFINITY)),
            "-Infinity" => Ok(Value::float(f64::NEG_INFINITY)),
            other => Err(mismatch(format!(
                "$f64 must be NaN, Infinity or -Infinity, found {other:?}"
            ))),
        },
        "$map" => {
            let pairs = payload
                .as_array()
                .ok_or_else(|| mismatch("$map payload must be an array of pairs".into()))?;
            let mut entries = Vec::with_capacity(pairs.len());
            for pair in pairs {
                let pair = pair
                    .as_array()
                    .filter(|p| p.len() == 2)
                    .ok_or_else(|| mismatch("$map entries must be [key, value] pairs".into()))?;
                entries.push((from_json(&pair[0])?, from_json(&pair[1])?));
            }
            Ok(Value::map(entries))
        }
        "$ext" => {
            let ext = payload
                .as_object()
                .filter(|o| o.len() == 2)
                .ok_or_else(|| mismatch("$ext payload must be {code, data}".into()))?;
            let code = ext
                .get("code")
                .and_then(Json::as_u64)
                .filter(|c| *c <= 255)
                .ok_or_else(|| mismatch("$ext code must be an integer in 0..=255".into()))?;
            let data = ext
                .get("data")
                .ok_or_else(|| mismatch("$ext is missing its data field".into()))?;
            Ok(Value::ext(code as u8, decode_base64(data, "$ext data")?))
        }
        other => Err(mismatch(format!("unknown tag {other:?}"))),
    }
}

fn decode_base64(json: &Json, what: &str) -> Result<Vec<u8>> {
    let text = expect_str(json, what)?;
    BASE64
        .decode(text)
        .map_err(|e| mismatch(format!("{what} is not valid base64: {e}")))
}

fn expect_str<'a>(json: &'a Json, what: &str) -> Result<&'a str> {
    json.as_str()
        .ok_or_else(|| mismatch(format!("{what} payload must be a string")))
}

fn mismatch(detail: String) -> JsonError {
    JsonError::SchemaMismatch { detail }
}
