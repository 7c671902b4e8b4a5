//! Scalar conversion between JSON values and protobuf values.

use base64::prelude::*;
use prost::bytes::Bytes;
use prost_reflect::{Kind, MapKey, Value as ProtoValue};
use serde_json::{Number, Value, json};

use crate::{BytesEncoding, ErrorKind};

/// Encode a bytes field value as JSON.
pub(crate) fn bytes_to_json(bytes: &[u8], encoding: BytesEncoding) -> Value {
    match encoding {
        BytesEncoding::Auto => match simdutf8::basic::from_utf8(bytes) {
            Ok(s) if s.chars().all(|c| !c.is_control()) => Value::String(s.to_string()),
            _ => Value::String(BASE64_STANDARD.encode(bytes)),
        },
        BytesEncoding::Base64 => Value::String(BASE64_STANDARD.encode(bytes)),
        BytesEncoding::ByteArray => {
            json!(bytes)
        }
        #[cfg(feature = "stfu8")]
        BytesEncoding::Stfu8 => Value::String(stfu8::encode_u8(bytes)),
        BytesEncoding::StringLossy => {
            let s = String::from_utf8_lossy(bytes);
            Value::String(s.to_string())
        }
    }
}

fn bytes_from_json(json: &Value, encoding: BytesEncoding) -> Option<Bytes> {
    match (encoding, json) {
        (BytesEncoding::ByteArray, Value::Array(items)) => items
            .iter()
            .map(|item| item.as_u64().and_then(|b| u8::try_from(b).ok()))
            .collect::<Option<Vec<u8>>>()
            .map(Bytes::from),
        (BytesEncoding::Base64, Value::String(s)) => BASE64_STANDARD.decode(s).ok().map(Bytes::from),
        #[cfg(feature = "stfu8")]
        (BytesEncoding::Stfu8, Value::String(s)) => stfu8::decode_u8(s).ok().map(Bytes::from),
        (BytesEncoding::Auto | BytesEncoding::StringLossy, Value::String(s)) => {
            Some(Bytes::from(s.clone().into_bytes()))
        }
        _ => None,
    }
}

/// Finite floats become JSON numbers; the others become `"NaN"`,
/// `"Infinity"` or `"-Infinity"`.
pub(crate) fn f64_to_json(v: f64) -> Value {
    match Number::from_f64(v) {
        Some(n) => Value::Number(n),
        None if v.is_nan() => Value::String("NaN".to_string()),
        None if v > 0.0 => Value::String("Infinity".to_string()),
        None => Value::String("-Infinity".to_string()),
    }
}

/// Widen through the shortest decimal form so `0.1f32` is written as `0.1`.
pub(crate) fn f32_to_json(v: f32) -> Value {
    let widened = v.to_string().parse::<f64>().unwrap_or(f64::from(v));
    f64_to_json(widened)
}

/// Value of a JSON number with no fractional part, such as `3` or `3.0`.
pub(crate) fn integral_number(json: &Value) -> Option<i128> {
    let Value::Number(n) = json else {
        return None;
    };
    n.as_i64()
        .map(i128::from)
        .or_else(|| n.as_u64().map(i128::from))
        .or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && f.fract() == 0.0)
                .map(|f| f as i128)
        })
}

fn integer(json: &Value) -> Option<i128> {
    match json {
        Value::String(s) => s.trim().parse().ok(),
        _ => integral_number(json),
    }
}

fn float(json: &Value) -> Option<f64> {
    match json {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => match s.as_str() {
            "NaN" => Some(f64::NAN),
            "Infinity" => Some(f64::INFINITY),
            "-Infinity" => Some(f64::NEG_INFINITY),
            other => other.trim().parse().ok(),
        },
        _ => None,
    }
}

fn expected(kind: &Kind) -> &'static str {
    match kind {
        Kind::Bool => "boolean",
        Kind::String => "string",
        Kind::Bytes => "bytes",
        Kind::Float | Kind::Double => "number",
        Kind::Message(_) => "object",
        Kind::Enum(_) => "enum",
        _ => "integer",
    }
}

/// Convert a JSON scalar to a protobuf value of the given scalar `kind`.
///
/// `target` names the field being read, for error reporting.
pub(crate) fn scalar_from_json(
    json: &Value,
    kind: &Kind,
    encoding: BytesEncoding,
    target: &str,
) -> Result<ProtoValue, ErrorKind> {
    let value = match kind {
        Kind::Bool => json.as_bool().map(ProtoValue::Bool),
        Kind::String => json.as_str().map(|s| ProtoValue::String(s.to_string())),
        Kind::Bytes => bytes_from_json(json, encoding).map(ProtoValue::Bytes),
        Kind::Int32 | Kind::Sint32 | Kind::Sfixed32 => integer(json)
            .and_then(|n| i32::try_from(n).ok())
            .map(ProtoValue::I32),
        Kind::Int64 | Kind::Sint64 | Kind::Sfixed64 => integer(json)
            .and_then(|n| i64::try_from(n).ok())
            .map(ProtoValue::I64),
        Kind::Uint32 | Kind::Fixed32 => integer(json)
            .and_then(|n| u32::try_from(n).ok())
            .map(ProtoValue::U32),
        Kind::Uint64 | Kind::Fixed64 => integer(json)
            .and_then(|n| u64::try_from(n).ok())
            .map(ProtoValue::U64),
        Kind::Float => float(json).map(|v| ProtoValue::F32(v as f32)),
        Kind::Double => float(json).map(ProtoValue::F64),
        Kind::Message(_) | Kind::Enum(_) => None,
    };
    value.ok_or_else(|| ErrorKind::malformed(target, expected(kind), json))
}

pub(crate) fn map_key_to_string(key: &MapKey) -> String {
    match key {
        MapKey::Bool(v) => v.to_string(),
        MapKey::I32(v) => v.to_string(),
        MapKey::I64(v) => v.to_string(),
        MapKey::U32(v) => v.to_string(),
        MapKey::U64(v) => v.to_string(),
        MapKey::String(s) => s.clone(),
    }
}

pub(crate) fn map_key_from_str(key: &str, kind: &Kind, target: &str) -> Result<MapKey, ErrorKind> {
    let parsed = match kind {
        Kind::Bool => key.parse().ok().map(MapKey::Bool),
        Kind::Int32 | Kind::Sint32 | Kind::Sfixed32 => key.parse().ok().map(MapKey::I32),
        Kind::Int64 | Kind::Sint64 | Kind::Sfixed64 => key.parse().ok().map(MapKey::I64),
        Kind::Uint32 | Kind::Fixed32 => key.parse().ok().map(MapKey::U32),
        Kind::Uint64 | Kind::Fixed64 => key.parse().ok().map(MapKey::U64),
        Kind::String => Some(MapKey::String(key.to_string())),
        _ => None,
    };
    parsed.ok_or_else(|| ErrorKind::MalformedInput {
        target: target.to_string(),
        expected: expected(kind),
        found: "string",
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read(json: Value, kind: Kind) -> Result<ProtoValue, ErrorKind> {
        scalar_from_json(&json, &kind, BytesEncoding::Base64, "test.field")
    }

    #[test]
    fn test_bytes_encodings() {
        let data = b"\x00\x01hi";
        assert_eq!(bytes_to_json(data, BytesEncoding::Base64), json!("AAFoaQ=="));
        assert_eq!(bytes_to_json(data, BytesEncoding::ByteArray), json!([0, 1, 104, 105]));
        assert_eq!(bytes_to_json(data, BytesEncoding::Auto), json!("AAFoaQ=="));
        assert_eq!(bytes_to_json(b"hello", BytesEncoding::Auto), json!("hello"));
        assert_eq!(
            bytes_to_json(b"a\xffb", BytesEncoding::StringLossy),
            json!("a\u{fffd}b")
        );
    }

    #[test]
    fn test_bytes_from_json() {
        assert_eq!(
            bytes_from_json(&json!("AAFoaQ=="), BytesEncoding::Base64).unwrap(),
            Bytes::from_static(b"\x00\x01hi")
        );
        assert_eq!(
            bytes_from_json(&json!([0, 1, 255]), BytesEncoding::ByteArray).unwrap(),
            Bytes::from_static(b"\x00\x01\xff")
        );
        assert!(bytes_from_json(&json!([256]), BytesEncoding::ByteArray).is_none());
        assert!(bytes_from_json(&json!("not base64!"), BytesEncoding::Base64).is_none());
        assert!(bytes_from_json(&json!([1, 2]), BytesEncoding::Base64).is_none());
        assert_eq!(
            bytes_from_json(&json!("hello"), BytesEncoding::Auto).unwrap(),
            Bytes::from_static(b"hello")
        );
    }

    #[cfg(feature = "stfu8")]
    #[test]
    fn test_stfu8_round_trip() {
        let data = b"ok\x00\xfe";
        let json = bytes_to_json(data, BytesEncoding::Stfu8);
        assert_eq!(
            bytes_from_json(&json, BytesEncoding::Stfu8).unwrap(),
            Bytes::from_static(data)
        );
    }

    #[test]
    fn test_floats() {
        assert_eq!(f64_to_json(1.5), json!(1.5));
        assert_eq!(f64_to_json(f64::NAN), json!("NaN"));
        assert_eq!(f64_to_json(f64::INFINITY), json!("Infinity"));
        assert_eq!(f64_to_json(f64::NEG_INFINITY), json!("-Infinity"));
        assert_eq!(f32_to_json(0.1), json!(0.1));

        assert_eq!(read(json!(0.1), Kind::Float).unwrap(), ProtoValue::F32(0.1));
        assert_eq!(read(json!("Infinity"), Kind::Double).unwrap(), ProtoValue::F64(f64::INFINITY));
        assert!(matches!(read(json!("NaN"), Kind::Double).unwrap(), ProtoValue::F64(v) if v.is_nan()));
        assert!(read(json!(true), Kind::Double).is_err());
    }

    #[test]
    fn test_integers() {
        assert_eq!(read(json!(-7), Kind::Int32).unwrap(), ProtoValue::I32(-7));
        assert_eq!(read(json!("42"), Kind::Sint64).unwrap(), ProtoValue::I64(42));
        assert_eq!(read(json!(3.0), Kind::Uint32).unwrap(), ProtoValue::U32(3));
        assert_eq!(
            read(json!(u64::MAX), Kind::Fixed64).unwrap(),
            ProtoValue::U64(u64::MAX)
        );

        let err = read(json!(-1), Kind::Uint32).unwrap_err();
        assert!(matches!(
            err,
            ErrorKind::MalformedInput { expected: "integer", found: "number", .. }
        ));
        assert!(read(json!(1.5), Kind::Int64).is_err());
        assert!(read(json!(i64::from(i32::MAX) + 1), Kind::Int32).is_err());
        assert!(read(json!([1]), Kind::Int32).is_err());
    }

    #[test]
    fn test_strict_bool_and_string() {
        assert_eq!(read(json!(true), Kind::Bool).unwrap(), ProtoValue::Bool(true));
        assert!(read(json!("true"), Kind::Bool).is_err());
        assert!(read(json!(1), Kind::String).is_err());
    }

    #[test]
    fn test_map_keys() {
        assert_eq!(map_key_to_string(&MapKey::Bool(true)), "true");
        assert_eq!(map_key_to_string(&MapKey::I64(-3)), "-3");
        assert_eq!(
            map_key_from_str("-3", &Kind::Int64, "test.map").unwrap(),
            MapKey::I64(-3)
        );
        assert_eq!(
            map_key_from_str("false", &Kind::Bool, "test.map").unwrap(),
            MapKey::Bool(false)
        );
        assert!(map_key_from_str("x", &Kind::Uint32, "test.map").is_err());
    }
}
