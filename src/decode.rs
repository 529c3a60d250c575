//! Decoding with an overflow bag.
//!
//! A structure declares its known keys through its serde derive; everything
//! else in the JSON object lands in an [`Extra`] map so no data is lost.

use serde::de::{self, DeserializeOwned, Deserializer};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// Keys the target structure did not declare, with their raw values.
pub type Extra = Map<String, Value>;

/// A typed record plus every key its schema did not claim.
///
/// `T` takes the keys it declares first; the remainder goes to `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WithExtra<T> {
    #[serde(flatten)]
    pub inner: T,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Decode a JSON object into `T`, returning the unmatched keys alongside.
///
/// Fails with [`Error::Decode`] when `value` is not an object or when a
/// declared field has an incompatible type.
pub fn decode_with_extra<T: DeserializeOwned>(value: Value) -> Result<(T, Extra)> {
    if !value.is_object() {
        return Err(Error::Decode(de::Error::invalid_type(
            unexpected(&value),
            &"a JSON object",
        )));
    }
    let WithExtra { inner, extra } = serde_json::from_value::<WithExtra<T>>(value)?;
    Ok((inner, extra))
}

/// Field adapter: JSON `null` decodes to the type's default.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn unexpected(value: &Value) -> de::Unexpected<'_> {
    match value {
        Value::Null => de::Unexpected::Unit,
        Value::Bool(b) => de::Unexpected::Bool(*b),
        Value::Number(_) => de::Unexpected::Other("number"),
        Value::String(s) => de::Unexpected::Str(s),
        Value::Array(_) => de::Unexpected::Seq,
        Value::Object(_) => de::Unexpected::Map,
    }
}

// ---------------------------------------------------------------------------
// Data
// ---------------------------------------------------------------------------

/// An enriched reference such as an activity's actor or object.
///
/// Only `id` is guaranteed; every other key is user-defined and kept in
/// `extra`. The service sends a bare string when the reference was not
/// enriched, which decodes to a `Data` with that ID and no extra keys.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Data {
    pub id: String,
    pub extra: Extra,
}

#[derive(Deserialize)]
struct DataId {
    #[serde(default)]
    id: String,
}

impl Data {
    pub fn new(id: impl Into<String>) -> Self {
        Data {
            id: id.into(),
            extra: Extra::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }

    /// Decode from a JSON object, keeping undeclared keys in `extra`.
    pub fn decode(value: Value) -> Result<Self> {
        match value {
            Value::String(id) => Ok(Data::new(id)),
            other => {
                let (DataId { id }, extra) = decode_with_extra::<DataId>(other)?;
                Ok(Data { id, extra })
            }
        }
    }
}

impl Serialize for Data {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.extra.len() + 1))?;
        map.serialize_entry("id", &self.id)?;
        for (k, v) in &self.extra {
            if k != "id" {
                map.serialize_entry(k, v)?;
            }
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Data {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Data::decode(value).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    struct IdOnly {
        id: String,
    }

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Pet {
        id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        age: Option<u32>,
    }

    #[test]
    fn test_decode_with_extra_keeps_unmatched_keys() {
        let input = json!({"id": "1", "name": "Juniper", "hobbies": ["playing", "sleeping"]});
        let (rec, extra) = decode_with_extra::<IdOnly>(input).unwrap();
        assert_eq!(rec.id, "1");
        assert_eq!(extra.len(), 2);
        assert_eq!(extra["name"], json!("Juniper"));
        assert_eq!(extra["hobbies"], json!(["playing", "sleeping"]));
        assert!(!extra.contains_key("id"));
    }

    #[test]
    fn test_decode_with_extra_optional_field_missing() {
        let (pet, extra) = decode_with_extra::<Pet>(json!({"id": "7", "color": "grey"})).unwrap();
        assert_eq!(pet, Pet { id: "7".into(), age: None });
        assert_eq!(extra["color"], json!("grey"));
    }

    #[test]
    fn test_decode_with_extra_rejects_non_object() {
        assert!(matches!(decode_with_extra::<IdOnly>(json!(["id"])), Err(Error::Decode(_))));
        assert!(matches!(decode_with_extra::<IdOnly>(json!("1")), Err(Error::Decode(_))));
        assert!(matches!(decode_with_extra::<IdOnly>(json!(null)), Err(Error::Decode(_))));
    }

    #[test]
    fn test_decode_with_extra_rejects_type_mismatch() {
        let err = decode_with_extra::<IdOnly>(json!({"id": ["not", "a", "string"]}));
        assert!(matches!(err, Err(Error::Decode(_))));
    }

    #[test]
    fn test_data_decode_from_object() {
        let data = Data::decode(json!({"id": "u1", "name": "Ruby", "age": 4})).unwrap();
        assert_eq!(data.id, "u1");
        assert_eq!(data.get("name"), Some(&json!("Ruby")));
        assert_eq!(data.get("age"), Some(&json!(4)));
    }

    #[test]
    fn test_data_decode_from_plain_id() {
        let data: Data = serde_json::from_value(json!("user:42")).unwrap();
        assert_eq!(data, Data::new("user:42"));
    }

    #[test]
    fn test_data_serializes_flat() {
        let mut data = Data::new("1");
        data.extra.insert("name".into(), json!("Juniper"));
        assert_eq!(serde_json::to_string(&data).unwrap(), r#"{"id":"1","name":"Juniper"}"#);
    }

    #[test]
    fn test_with_extra_serializes_back_flat() {
        let rec: WithExtra<Pet> =
            serde_json::from_value(json!({"id": "7", "age": 2, "color": "grey"})).unwrap();
        assert_eq!(rec.inner.age, Some(2));
        let back = serde_json::to_value(&rec).unwrap();
        assert_eq!(back, json!({"id": "7", "age": 2, "color": "grey"}));
    }
}
