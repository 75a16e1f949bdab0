//! Self-describing JSON values for payload fields with no fixed schema.

use std::collections::BTreeMap;
use std::fmt;

use serde::de::{self, MapAccess, SeqAccess, Visitor};
use serde::ser::{self, SerializeMap, SerializeSeq};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Number, Value};

use crate::error::{ProtocolError, Result};

/// Largest magnitude at which every integer is exactly representable in `f64`.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// A JSON subtree carried verbatim through decode and encode.
///
/// Numbers are held as `f64`; integral values are written back as JSON
/// integers. Object keys are kept sorted.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum DynamicValue {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<DynamicValue>),
    Object(BTreeMap<String, DynamicValue>),
}

impl DynamicValue {
    /// Convert a parsed JSON tree. Never fails.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => DynamicValue::Null,
            Value::Bool(b) => DynamicValue::Bool(*b),
            Value::Number(n) => DynamicValue::Number(number_to_f64(n)),
            Value::String(s) => DynamicValue::String(s.clone()),
            Value::Array(items) => DynamicValue::Array(items.iter().map(Self::from_json).collect()),
            Value::Object(map) => DynamicValue::Object(
                map.iter()
                    .map(|(key, value)| (key.clone(), Self::from_json(value)))
                    .collect(),
            ),
        }
    }

    /// Convert back into a JSON tree.
    ///
    /// Fails with [`ProtocolError::Encoding`] when the tree holds a NaN or
    /// infinite number.
    pub fn to_json(&self) -> Result<Value> {
        Ok(match self {
            DynamicValue::Null => Value::Null,
            DynamicValue::Bool(b) => Value::Bool(*b),
            DynamicValue::Number(n) => Value::Number(json_number(*n).ok_or_else(|| {
                ProtocolError::Encoding(format!("{n} is not representable in JSON"))
            })?),
            DynamicValue::String(s) => Value::String(s.clone()),
            DynamicValue::Array(items) => {
                Value::Array(items.iter().map(Self::to_json).collect::<Result<_>>()?)
            }
            DynamicValue::Object(map) => Value::Object(
                map.iter()
                    .map(|(key, value)| Ok((key.clone(), value.to_json()?)))
                    .collect::<Result<_>>()?,
            ),
        })
    }

    /// True for [`DynamicValue::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, DynamicValue::Null)
    }

    /// The boolean, if this is one.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            DynamicValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// The number as a float.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            DynamicValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// The number as an integer, if it has no fractional part.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            DynamicValue::Number(n) if is_exact_integer(*n) => Some(*n as i64),
            _ => None,
        }
    }

    /// The string, if this is one.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            DynamicValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// The elements, if this is an array.
    pub fn as_array(&self) -> Option<&[DynamicValue]> {
        match self {
            DynamicValue::Array(items) => Some(items),
            _ => None,
        }
    }

    /// The members, if this is an object.
    pub fn as_object(&self) -> Option<&BTreeMap<String, DynamicValue>> {
        match self {
            DynamicValue::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Look up `key` when this value is an object.
    pub fn get(&self, key: &str) -> Option<&DynamicValue> {
        self.as_object().and_then(|map| map.get(key))
    }
}

fn number_to_f64(n: &Number) -> f64 {
    if let Some(i) = n.as_i64() {
        i as f64
    } else if let Some(u) = n.as_u64() {
        u as f64
    } else {
        n.as_f64().unwrap_or_default()
    }
}

fn is_exact_integer(n: f64) -> bool {
    n.is_finite() && n.fract() == 0.0 && n.abs() <= MAX_EXACT_INTEGER
}

fn json_number(n: f64) -> Option<Number> {
    if is_exact_integer(n) {
        Some(Number::from(n as i64))
    } else {
        Number::from_f64(n)
    }
}

impl Serialize for DynamicValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            DynamicValue::Null => serializer.serialize_unit(),
            DynamicValue::Bool(b) => serializer.serialize_bool(*b),
            DynamicValue::Number(n) if is_exact_integer(*n) => serializer.serialize_i64(*n as i64),
            DynamicValue::Number(n) if n.is_finite() => serializer.serialize_f64(*n),
            DynamicValue::Number(n) => Err(ser::Error::custom(format_args!(
                "{n} is not representable in JSON"
            ))),
            DynamicValue::String(s) => serializer.serialize_str(s),
            DynamicValue::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            DynamicValue::Object(map) => {
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (key, value) in map {
                    out.serialize_entry(key, value)?;
                }
                out.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for DynamicValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_any(DynamicValueVisitor)
    }
}

struct DynamicValueVisitor;

impl<'de> Visitor<'de> for DynamicValueVisitor {
    type Value = DynamicValue;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("any JSON value")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> std::result::Result<DynamicValue, E> {
        Ok(DynamicValue::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<DynamicValue, E> {
        Ok(DynamicValue::Number(v as f64))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<DynamicValue, E> {
        Ok(DynamicValue::Number(v as f64))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> std::result::Result<DynamicValue, E> {
        Ok(DynamicValue::Number(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<DynamicValue, E> {
        Ok(DynamicValue::String(v.to_owned()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> std::result::Result<DynamicValue, E> {
        Ok(DynamicValue::String(v))
    }

    fn visit_unit<E: de::Error>(self) -> std::result::Result<DynamicValue, E> {
        Ok(DynamicValue::Null)
    }

    fn visit_none<E: de::Error>(self) -> std::result::Result<DynamicValue, E> {
        Ok(DynamicValue::Null)
    }

    fn visit_some<D: Deserializer<'de>>(
        self,
        deserializer: D,
    ) -> std::result::Result<DynamicValue, D::Error> {
        DynamicValue::deserialize(deserializer)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> std::result::Result<DynamicValue, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(DynamicValue::Array(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> std::result::Result<DynamicValue, A::Error> {
        let mut entries = BTreeMap::new();
        while let Some((key, value)) = map.next_entry::<String, DynamicValue>()? {
            entries.insert(key, value);
        }
        Ok(DynamicValue::Object(entries))
    }
}

impl From<bool> for DynamicValue {
    fn from(value: bool) -> Self {
        DynamicValue::Bool(value)
    }
}

impl From<f64> for DynamicValue {
    fn from(value: f64) -> Self {
        DynamicValue::Number(value)
    }
}

impl From<i64> for DynamicValue {
    fn from(value: i64) -> Self {
        DynamicValue::Number(value as f64)
    }
}

impl From<&str> for DynamicValue {
    fn from(value: &str) -> Self {
        DynamicValue::String(value.to_owned())
    }
}

impl From<String> for DynamicValue {
    fn from(value: String) -> Self {
        DynamicValue::String(value)
    }
}

impl From<Vec<DynamicValue>> for DynamicValue {
    fn from(value: Vec<DynamicValue>) -> Self {
        DynamicValue::Array(value)
    }
}

impl From<BTreeMap<String, DynamicValue>> for DynamicValue {
    fn from(value: BTreeMap<String, DynamicValue>) -> Self {
        DynamicValue::Object(value)
    }
}

impl From<&Value> for DynamicValue {
    fn from(value: &Value) -> Self {
        DynamicValue::from_json(value)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn nested_tree_roundtrips() {
        let original = json!({
            "program": "/bin/app",
            "args": ["--flag", 3, 2.5, true, null],
            "env": {"DEBUG": "1", "nested": {"depth": [[], {}]}},
            "stopOnEntry": false
        });

        let dynamic = DynamicValue::from_json(&original);
        assert_eq!(dynamic.to_json().unwrap(), original);
    }

    #[test]
    fn integral_floats_normalize_to_integers() {
        let dynamic = DynamicValue::from_json(&json!(4.0));
        assert_eq!(dynamic, DynamicValue::Number(4.0));
        assert_eq!(dynamic.to_json().unwrap(), json!(4));
        assert_eq!(serde_json::to_string(&dynamic).unwrap(), "4");
    }

    #[test]
    fn fractional_numbers_stay_fractional() {
        let dynamic = DynamicValue::from(0.25);
        assert_eq!(dynamic.to_json().unwrap(), json!(0.25));
        assert_eq!(dynamic.as_i64(), None);
    }

    #[test]
    fn non_finite_numbers_fail_to_encode() {
        let err = DynamicValue::Number(f64::NAN).to_json().unwrap_err();
        assert!(matches!(err, ProtocolError::Encoding(_)));

        let nested = DynamicValue::Array(vec![DynamicValue::Number(f64::INFINITY)]);
        assert!(serde_json::to_string(&nested).is_err());
    }

    #[test]
    fn deserialize_matches_from_json() {
        let text = r#"{"a":[1,"two",{"three":3.5}],"b":null,"c":true}"#;
        let via_serde: DynamicValue = serde_json::from_str(text).unwrap();
        let via_tree = DynamicValue::from_json(&serde_json::from_str(text).unwrap());

        assert_eq!(via_serde, via_tree);
        assert_eq!(serde_json::to_string(&via_serde).unwrap(), text);
    }

    #[test]
    fn json_token_type_decides_variant() {
        assert_eq!(DynamicValue::from_json(&json!(true)), DynamicValue::Bool(true));
        assert_eq!(DynamicValue::from_json(&json!(1)), DynamicValue::Number(1.0));
        assert_eq!(
            DynamicValue::from_json(&json!("true")),
            DynamicValue::String("true".into())
        );
        assert_eq!(DynamicValue::from_json(&json!(null)), DynamicValue::Null);
    }

    #[test]
    fn accessors() {
        let value = DynamicValue::from_json(&json!({"port": 9229, "host": "localhost"}));

        assert_eq!(value.get("port").and_then(DynamicValue::as_i64), Some(9229));
        assert_eq!(value.get("host").and_then(DynamicValue::as_str), Some("localhost"));
        assert!(value.get("missing").is_none());
        assert!(DynamicValue::default().is_null());
        assert_eq!(DynamicValue::from(false).as_bool(), Some(false));
        let items = DynamicValue::from(vec![DynamicValue::from(1i64)]);
        assert_eq!(items.as_array().map(|items| items.len()), Some(1));
    }

    #[test]
    fn large_unsigned_integers_survive_as_floats() {
        let dynamic = DynamicValue::from_json(&json!(u64::MAX));
        assert_eq!(dynamic.as_f64(), Some(u64::MAX as f64));
        assert!(dynamic.to_json().unwrap().is_f64());
    }
}
