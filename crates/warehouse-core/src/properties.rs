//! # Variant Properties
//!
//! The open-ended attribute bag attached to every `ProductVariant`
//! (size, color, material, ...).
//!
//! ## Storage Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Rust                                  PostgreSQL (jsonb)               │
//! │  ────                                  ──────────────────               │
//! │                                                                         │
//! │  Properties {                          {                                │
//! │    "color" => String("green"),   ──►     "color": "green",              │
//! │    "size"  => String("L"),               "size": "L",                   │
//! │    "dims"  => Map {                      "dims": {                      │
//! │       "width" => Number(30)                "width": 30                  │
//! │    }                                     }                              │
//! │  }                                     }                                │
//! │                                                                         │
//! │  PropertyPath "dims.width"       ──►   properties #>> '{dims,width}'    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `PropertyValue` is a closed tagged union rather than a raw
//! `serde_json::Value`, so callers match on known shapes.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

use crate::error::ValidationError;
use crate::validation::ValidationResult;
use crate::MAX_PROPERTY_PATH_DEPTH;

// =============================================================================
// Property Value
// =============================================================================

/// A JSON-representable property value.
///
/// Serialized untagged, so `PropertyValue::String("L")` is just `"L"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    List(Vec<PropertyValue>),
    Map(BTreeMap<String, PropertyValue>),
}

impl PropertyValue {
    /// Short name of the variant, used in log fields and error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            PropertyValue::Null => "null",
            PropertyValue::Bool(_) => "bool",
            PropertyValue::Number(_) => "number",
            PropertyValue::String(_) => "string",
            PropertyValue::List(_) => "list",
            PropertyValue::Map(_) => "map",
        }
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, PropertyValue::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropertyValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            PropertyValue::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            PropertyValue::Number(n) => n.as_f64(),
            _ => None,
        }
    }

    /// Looks up a key when this value is a map.
    pub fn get(&self, key: &str) -> Option<&PropertyValue> {
        match self {
            PropertyValue::Map(map) => map.get(key),
            _ => None,
        }
    }

    /// Renders the value the way PostgreSQL's `->>` / `#>>` operators do:
    /// strings come back unquoted, `null` becomes SQL NULL (`None`), and
    /// everything else is its JSON text.
    pub fn to_text(&self) -> Option<String> {
        match self {
            PropertyValue::Null => None,
            PropertyValue::String(s) => Some(s.clone()),
            other => Some(Value::from(other.clone()).to_string()),
        }
    }
}

impl Default for PropertyValue {
    fn default() -> Self {
        PropertyValue::Null
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::String(s) => f.write_str(s),
            other => write!(f, "{}", Value::from(other.clone())),
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self {
        PropertyValue::String(s.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(s: String) -> Self {
        PropertyValue::String(s)
    }
}

impl From<bool> for PropertyValue {
    fn from(b: bool) -> Self {
        PropertyValue::Bool(b)
    }
}

impl From<i64> for PropertyValue {
    fn from(n: i64) -> Self {
        PropertyValue::Number(n.into())
    }
}

impl From<i32> for PropertyValue {
    fn from(n: i32) -> Self {
        PropertyValue::Number(n.into())
    }
}

impl From<u64> for PropertyValue {
    fn from(n: u64) -> Self {
        PropertyValue::Number(n.into())
    }
}

/// Non-finite floats have no JSON form and become `Null`.
impl From<f64> for PropertyValue {
    fn from(n: f64) -> Self {
        Number::from_f64(n)
            .map(PropertyValue::Number)
            .unwrap_or(PropertyValue::Null)
    }
}

impl<T: Into<PropertyValue>> From<Vec<T>> for PropertyValue {
    fn from(items: Vec<T>) -> Self {
        PropertyValue::List(items.into_iter().map(Into::into).collect())
    }
}

impl From<Properties> for PropertyValue {
    fn from(props: Properties) -> Self {
        PropertyValue::Map(props.0)
    }
}

impl From<Value> for PropertyValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => PropertyValue::Null,
            Value::Bool(b) => PropertyValue::Bool(b),
            Value::Number(n) => PropertyValue::Number(n),
            Value::String(s) => PropertyValue::String(s),
            Value::Array(items) => {
                PropertyValue::List(items.into_iter().map(PropertyValue::from).collect())
            }
            Value::Object(map) => PropertyValue::Map(
                map.into_iter()
                    .map(|(k, v)| (k, PropertyValue::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<PropertyValue> for Value {
    fn from(value: PropertyValue) -> Self {
        match value {
            PropertyValue::Null => Value::Null,
            PropertyValue::Bool(b) => Value::Bool(b),
            PropertyValue::Number(n) => Value::Number(n),
            PropertyValue::String(s) => Value::String(s),
            PropertyValue::List(items) => {
                Value::Array(items.into_iter().map(Value::from).collect())
            }
            PropertyValue::Map(map) => Value::Object(
                map.into_iter().map(|(k, v)| (k, Value::from(v))).collect(),
            ),
        }
    }
}

// =============================================================================
// Properties
// =============================================================================

/// String-keyed property bag, stored as a single `jsonb` object.
///
/// Keys are kept sorted so the stored JSON and debug output are stable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Properties(BTreeMap<String, PropertyValue>);

impl Properties {
    pub fn new() -> Self {
        Properties(BTreeMap::new())
    }

    /// Builder-style insert.
    ///
    /// ## Example
    /// ```rust
    /// use warehouse_core::Properties;
    ///
    /// let props = Properties::new().with("color", "red").with("size", "X");
    /// assert_eq!(props.len(), 2);
    /// ```
    pub fn with(mut self, key: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Inserts a value, returning the previous one for that key.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<PropertyValue>,
    ) -> Option<PropertyValue> {
        self.0.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&PropertyValue> {
        self.0.get(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<PropertyValue> {
        self.0.remove(key)
    }

    /// Follows a path through nested maps.
    ///
    /// ## Example
    /// ```rust
    /// use warehouse_core::{Properties, PropertyPath, PropertyValue};
    ///
    /// let dims = Properties::new().with("width", 30);
    /// let props = Properties::new().with("dims", dims);
    /// let path: PropertyPath = "dims.width".parse().unwrap();
    ///
    /// assert_eq!(props.get_path(&path), Some(&PropertyValue::from(30)));
    /// ```
    pub fn get_path(&self, path: &PropertyPath) -> Option<&PropertyValue> {
        let mut segments = path.segments().iter();
        let first = segments.next()?;
        let mut current = self.0.get(first)?;
        for segment in segments {
            current = current.get(segment)?;
        }
        Some(current)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &PropertyValue)> {
        self.0.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }
}

impl From<BTreeMap<String, PropertyValue>> for Properties {
    fn from(map: BTreeMap<String, PropertyValue>) -> Self {
        Properties(map)
    }
}

impl<K, V> FromIterator<(K, V)> for Properties
where
    K: Into<String>,
    V: Into<PropertyValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Properties(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl IntoIterator for Properties {
    type Item = (String, PropertyValue);
    type IntoIter = std::collections::btree_map::IntoIter<String, PropertyValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

// =============================================================================
// Property Path
// =============================================================================

/// A key path into `Properties`, written dotted (`dims.width`).
///
/// ## Rules
/// - At least one segment
/// - No empty segments (`a..b`, `.a`, `a.` are rejected)
/// - At most `MAX_PROPERTY_PATH_DEPTH` segments
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PropertyPath(Vec<String>);

impl PropertyPath {
    /// Builds a path from pre-split segments (keys may then contain dots).
    pub fn from_segments<I, S>(segments: I) -> ValidationResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segments: Vec<String> = segments.into_iter().map(Into::into).collect();

        if segments.is_empty() {
            return Err(ValidationError::Required {
                field: "property path".to_string(),
            });
        }

        if segments.len() > MAX_PROPERTY_PATH_DEPTH {
            return Err(ValidationError::InvalidFormat {
                field: "property path".to_string(),
                reason: format!("deeper than {} segments", MAX_PROPERTY_PATH_DEPTH),
            });
        }

        if segments.iter().any(|s| s.is_empty()) {
            return Err(ValidationError::InvalidFormat {
                field: "property path".to_string(),
                reason: "empty segment".to_string(),
            });
        }

        Ok(PropertyPath(segments))
    }

    /// Single-key path.
    pub fn key(key: impl Into<String>) -> ValidationResult<Self> {
        Self::from_segments([key.into()])
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }
}

impl FromStr for PropertyPath {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Err(ValidationError::Required {
                field: "property path".to_string(),
            });
        }
        Self::from_segments(s.split('.'))
    }
}

impl fmt::Display for PropertyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("."))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_properties_serialize_as_plain_object() {
        let props = Properties::new()
            .with("color", "green")
            .with("size", "L")
            .with("stock", 12)
            .with("discontinued", false);

        let value = serde_json::to_value(&props).unwrap();
        assert_eq!(
            value,
            json!({"color": "green", "size": "L", "stock": 12, "discontinued": false})
        );
    }

    #[test]
    fn test_property_value_deserializes_every_shape() {
        let props: Properties = serde_json::from_value(json!({
            "none": null,
            "flag": true,
            "count": 3,
            "ratio": 0.5,
            "label": "x",
            "tags": ["a", "b"],
            "dims": {"width": 30}
        }))
        .unwrap();

        assert!(props.get("none").unwrap().is_null());
        assert_eq!(props.get("flag").unwrap().as_bool(), Some(true));
        assert_eq!(props.get("count").unwrap().as_i64(), Some(3));
        assert_eq!(props.get("ratio").unwrap().as_f64(), Some(0.5));
        assert_eq!(props.get("label").unwrap().as_str(), Some("x"));
        assert_eq!(props.get("tags").unwrap().kind(), "list");
        assert_eq!(props.get("dims").unwrap().kind(), "map");
    }

    #[test]
    fn test_get_path_walks_nested_maps() {
        let props = Properties::new().with("dims", Properties::new().with("width", 30));

        let path: PropertyPath = "dims.width".parse().unwrap();
        assert_eq!(props.get_path(&path).and_then(|v| v.as_i64()), Some(30));

        let missing: PropertyPath = "dims.height".parse().unwrap();
        assert!(props.get_path(&missing).is_none());

        // Walking into a scalar stops the lookup
        let through_scalar: PropertyPath = "dims.width.unit".parse().unwrap();
        assert!(props.get_path(&through_scalar).is_none());
    }

    #[test]
    fn test_to_text_matches_postgres_text_extraction() {
        assert_eq!(PropertyValue::from("L").to_text().as_deref(), Some("L"));
        assert_eq!(PropertyValue::from(42).to_text().as_deref(), Some("42"));
        assert_eq!(PropertyValue::from(true).to_text().as_deref(), Some("true"));
        assert_eq!(PropertyValue::Null.to_text(), None);
    }

    #[test]
    fn test_non_finite_float_becomes_null() {
        assert!(PropertyValue::from(f64::NAN).is_null());
    }

    #[test]
    fn test_property_path_parsing() {
        let path: PropertyPath = "size".parse().unwrap();
        assert_eq!(path.segments(), ["size".to_string()]);
        assert_eq!(path.to_string(), "size");

        assert!("".parse::<PropertyPath>().is_err());
        assert!("a..b".parse::<PropertyPath>().is_err());
        assert!(".a".parse::<PropertyPath>().is_err());
        assert!("a.b.c.d.e.f.g.h.i".parse::<PropertyPath>().is_err());

        let dotted_key = PropertyPath::from_segments(["v1.2"]).unwrap();
        assert_eq!(dotted_key.depth(), 1);
    }

    #[test]
    fn test_json_value_conversion_is_lossless() {
        let original = json!({"a": [1, "two", null, {"b": false}]});
        let value = PropertyValue::from(original.clone());
        assert_eq!(Value::from(value), original);
    }
}
