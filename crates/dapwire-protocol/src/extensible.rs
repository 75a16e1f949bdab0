//! Payloads with a fixed schema plus caller-defined extension keys.

use std::collections::BTreeMap;

use serde::de::{self, DeserializeOwned};
use serde::ser;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::value::DynamicValue;

/// A record whose wire keys are known up front.
pub trait FixedFields: Serialize + DeserializeOwned {
    /// Wire names of every fixed field.
    const FIELDS: &'static [&'static str];
}

/// Fixed fields `F` merged with arbitrary extra keys in one JSON object.
///
/// Decoding routes every key listed in `F::FIELDS` to `F` and keeps the rest
/// in `extra`. Encoding writes the fixed fields and then every extra key not
/// named in `F::FIELDS`. An extra key that shadows a fixed field is never
/// written, even when that field is absent, so it cannot come back as a
/// fixed value on the next decode.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Extensible<F> {
    pub fields: F,
    pub extra: BTreeMap<String, DynamicValue>,
}

impl<F> Extensible<F> {
    pub fn new(fields: F) -> Self {
        Self {
            fields,
            extra: BTreeMap::new(),
        }
    }

    /// Add an extension key. Keys naming a fixed field are dropped on encode.
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<DynamicValue>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

impl<F: FixedFields> Serialize for Extensible<F> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut object = match serde_json::to_value(&self.fields).map_err(ser::Error::custom)? {
            Value::Object(map) => map,
            other => {
                return Err(ser::Error::custom(format_args!(
                    "fixed fields must serialize to an object, got {other}"
                )))
            }
        };

        for (key, value) in &self.extra {
            if F::FIELDS.contains(&key.as_str()) || object.contains_key(key) {
                continue;
            }
            let value = serde_json::to_value(value).map_err(ser::Error::custom)?;
            object.insert(key.clone(), value);
        }

        object.serialize(serializer)
    }
}

impl<'de, F: FixedFields> Deserialize<'de> for Extensible<F> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let object = Map::<String, Value>::deserialize(deserializer)?;

        let mut fixed = Map::new();
        let mut extra = BTreeMap::new();
        for (key, value) in object {
            if F::FIELDS.contains(&key.as_str()) {
                fixed.insert(key, value);
            } else {
                extra.insert(key, DynamicValue::from_json(&value));
            }
        }

        let fields = F::deserialize(Value::Object(fixed)).map_err(de::Error::custom)?;
        Ok(Self { fields, extra })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Target {
        host: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        port_hint: Option<u16>,
    }

    impl FixedFields for Target {
        const FIELDS: &'static [&'static str] = &["host", "portHint"];
    }

    #[test]
    fn unknown_keys_land_in_extra() {
        let decoded: Extensible<Target> = serde_json::from_value(json!({
            "host": "localhost",
            "portHint": 9000,
            "trace": true,
            "env": {"A": "1"}
        }))
        .unwrap();

        assert_eq!(decoded.fields.host, "localhost");
        assert_eq!(decoded.fields.port_hint, Some(9000));
        assert_eq!(decoded.extra.len(), 2);
        assert_eq!(decoded.extra["trace"], DynamicValue::Bool(true));
        assert!(!decoded.extra.contains_key("host"));
    }

    #[test]
    fn encode_merges_extra_as_siblings() {
        let value = Extensible::new(Target {
            host: "h".into(),
            port_hint: None,
        })
        .with_extra("cwd", "/tmp")
        .with_extra("retries", 3i64);

        assert_eq!(
            serde_json::to_value(&value).unwrap(),
            json!({"host": "h", "cwd": "/tmp", "retries": 3})
        );
    }

    #[test]
    fn fixed_field_wins_collision() {
        let value = Extensible::new(Target {
            host: "fixed".into(),
            port_hint: None,
        })
        .with_extra("host", "extra");

        let encoded = serde_json::to_value(&value).unwrap();
        assert_eq!(encoded["host"], json!("fixed"));
    }

    #[test]
    fn extra_never_shadows_absent_fixed_field() {
        let value = Extensible::new(Target {
            host: "h".into(),
            port_hint: None,
        })
        .with_extra("portHint", 1i64)
        .with_extra("trace", true);

        let encoded = serde_json::to_value(&value).unwrap();
        assert_eq!(encoded, json!({"host": "h", "trace": true}));

        let decoded: Extensible<Target> = serde_json::from_value(encoded).unwrap();
        assert_eq!(decoded.fields.port_hint, None);
        assert!(!decoded.extra.contains_key("portHint"));
    }

    #[test]
    fn missing_required_fixed_field_fails() {
        let result: Result<Extensible<Target>, _> =
            serde_json::from_value(json!({"portHint": 1, "x": 2}));
        assert!(result.is_err());
    }

    #[test]
    fn roundtrip_preserves_extension_tree() {
        let wire = json!({"host": "h", "args": ["a", 1, null], "nested": {"k": [true]}});
        let decoded: Extensible<Target> = serde_json::from_value(wire.clone()).unwrap();
        assert_eq!(serde_json::to_value(&decoded).unwrap(), wire);
    }
}
