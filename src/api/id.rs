//! Wire types that tolerate the shapes different server versions send.

use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{
    de::{self, DeserializeOwned, Visitor},
    Deserialize, Deserializer, Serialize, Serializer,
};
use serde_json::Value;

/// A server-assigned identifier.
///
/// Servers have sent ids both as JSON numbers and as strings; both decode to the string
/// form, and the id always serializes as a string. Ids order numerically so cursors
/// compare the way the server pages them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Id(String);

impl Id {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// Numeric value used for ordering. The empty id is zero; `None` for opaque ids.
    fn numeric(&self) -> Option<u64> {
        if self.0.is_empty() {
            Some(0)
        } else {
            self.0.parse().ok()
        }
    }
}

impl Ord for Id {
    /// Numeric ids first, by value; opaque ids after them. Ties fall back to the string
    /// so that only equal strings compare equal.
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.numeric(), other.numeric()) {
            (Some(a), Some(b)) => a.cmp(&b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
        .then_with(|| self.0.cmp(&other.0))
    }
}

impl PartialOrd for Id {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Id {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Id {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Id {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&String> for Id {
    fn from(s: &String) -> Self {
        Self(s.clone())
    }
}

impl From<u64> for Id {
    fn from(n: u64) -> Self {
        Self(n.to_string())
    }
}

impl PartialEq<str> for Id {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Id {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl Serialize for Id {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Id {
    fn deserialize<D>(deserializer: D) -> Result<Id, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(IdVisitor)
    }
}

struct IdVisitor;
impl<'de> Visitor<'de> for IdVisitor {
    type Value = Id;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("an id as a string or an integer")
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
        Ok(Id(value.to_string()))
    }

    fn visit_string<E: de::Error>(self, value: String) -> Result<Self::Value, E> {
        Ok(Id(value))
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Self::Value, E> {
        Ok(Id(value.to_string()))
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Self::Value, E> {
        Ok(Id(value.to_string()))
    }
}

/// A boolean that may arrive as `true` or as `"true"`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct TolerantBool(pub bool);

impl TolerantBool {
    fn parse(s: &str) -> Option<bool> {
        match s.to_ascii_lowercase().as_str() {
            "1" | "t" | "true" => Some(true),
            "0" | "f" | "false" => Some(false),
            _ => None,
        }
    }
}

impl From<TolerantBool> for bool {
    fn from(b: TolerantBool) -> Self {
        b.0
    }
}

impl From<bool> for TolerantBool {
    fn from(b: bool) -> Self {
        Self(b)
    }
}

impl Serialize for TolerantBool {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_bool(self.0)
    }
}

impl<'de> Deserialize<'de> for TolerantBool {
    fn deserialize<D>(deserializer: D) -> Result<TolerantBool, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(TolerantBoolVisitor)
    }
}

struct TolerantBoolVisitor;
impl<'de> Visitor<'de> for TolerantBoolVisitor {
    type Value = TolerantBool;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a boolean or a string that can be parsed into a boolean")
    }

    fn visit_bool<E: de::Error>(self, value: bool) -> Result<Self::Value, E> {
        Ok(TolerantBool(value))
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
        TolerantBool::parse(value)
            .map(TolerantBool)
            .ok_or_else(|| E::custom(format!("could not parse {value:?} as a boolean")))
    }
}

/// Deserialize a count sent either as a number or as a numeric string.
pub(crate) fn tolerant_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    struct CountVisitor;
    impl<'de> Visitor<'de> for CountVisitor {
        type Value = u64;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a non-negative integer or a string holding one")
        }

        fn visit_u64<E: de::Error>(self, value: u64) -> Result<Self::Value, E> {
            Ok(value)
        }

        fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
            value
                .trim()
                .parse()
                .map_err(|e| E::custom(format!("could not parse {value:?}: {e}")))
        }
    }
    deserializer.deserialize_any(CountVisitor)
}

/// Deserialize a nullable timestamp; `null` becomes the zero time.
pub(crate) fn nullable_time<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<DateTime<Utc>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Decode a JSON document, matching object keys case-insensitively.
///
/// `{"Username": ..}` fills `username`. A key already in lower case wins over its
/// capitalized twin.
pub fn from_json<T: DeserializeOwned>(bytes: &[u8]) -> serde_json::Result<T> {
    let mut value: Value = serde_json::from_slice(bytes)?;
    fold_keys(&mut value);
    serde_json::from_value(value)
}

fn fold_keys(value: &mut Value) {
    match value {
        Value::Object(map) => {
            let capitalized: Vec<String> = map
                .keys()
                .filter(|k| k.chars().any(char::is_uppercase))
                .cloned()
                .collect();
            for key in capitalized {
                let lower = key.to_lowercase();
                if map.contains_key(&lower) {
                    continue;
                }
                if let Some(v) = map.remove(&key) {
                    map.insert(lower, v);
                }
            }
            map.values_mut().for_each(fold_keys);
        }
        Value::Array(items) => items.iter_mut().for_each(fold_keys),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_decodes_from_string_and_number() {
        let from_str: Id = serde_json::from_str(r#""123""#).unwrap();
        let from_num: Id = serde_json::from_str("123").unwrap();
        assert_eq!(from_str, from_num);
        assert_eq!(from_num.as_str(), "123");
    }

    #[test]
    fn id_round_trips_digit_strings() {
        for s in ["0", "1", "103", "1234567", "9999999999999999999", "18446744073709551615"] {
            let id = Id::from(s);
            let json = serde_json::to_string(&id).unwrap();
            assert_eq!(json, format!("\"{s}\""));
            let back: Id = serde_json::from_str(&json).unwrap();
            assert_eq!(back, id);
        }
    }

    #[test]
    fn id_rejects_other_json_kinds() {
        for bad in ["true", "null", "1.5", "[1]", r#"{"id":1}"#] {
            assert!(serde_json::from_str::<Id>(bad).is_err(), "{bad}");
        }
    }

    #[test]
    fn id_sorts_numerically() {
        let mut ids: Vec<Id> = ["123", "103", "", "0", "103", "122"]
            .into_iter()
            .map(Id::from)
            .collect();
        ids.sort();
        let sorted: Vec<&str> = ids.iter().map(Id::as_str).collect();
        assert_eq!(sorted, ["", "0", "103", "103", "122", "123"]);
    }

    #[test]
    fn id_orders_by_value_not_length() {
        assert!(Id::from("99") < Id::from("100"));
        assert!(Id::from("110000000000000000") > Id::from("99999999999999999"));
    }

    #[test]
    fn opaque_ids_sort_after_numeric_ones() {
        let mut ids = vec![Id::from("abc"), Id::from("5"), Id::from("aaa")];
        ids.sort();
        assert_eq!(ids, vec![Id::from("5"), Id::from("aaa"), Id::from("abc")]);
    }

    #[test]
    fn tolerant_bool_truth_table() {
        for t in ["true", r#""true""#, r#""True""#, r#""1""#, r#""t""#, r#""TRUE""#] {
            let b: TolerantBool = serde_json::from_str(t).unwrap();
            assert!(b.0, "{t}");
        }
        for f in ["false", r#""false""#, r#""0""#, r#""F""#] {
            let b: TolerantBool = serde_json::from_str(f).unwrap();
            assert!(!b.0, "{f}");
        }
        for bad in [r#""yes""#, "1", "null", "[]", r#""""#] {
            assert!(serde_json::from_str::<TolerantBool>(bad).is_err(), "{bad}");
        }
    }

    #[test]
    fn tolerant_bool_encodes_as_bool() {
        assert_eq!(serde_json::to_string(&TolerantBool(true)).unwrap(), "true");
    }
}
