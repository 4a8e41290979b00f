//! Render values: the tagged union carried by render elements.
//!
//! Every property that flows through the pipeline (field sources, settings,
//! context properties, attribute values) is a [`RenderValue`]. Keyed
//! collections preserve insertion order.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};

use crate::attributes::Attributes;
use crate::element::RenderElement;

/// Ordered mapping from property name to value.
pub type RenderMap = IndexMap<String, RenderValue>;

/// A single render value.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
#[serde(untagged)]
pub enum RenderValue {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    List(Vec<RenderValue>),
    Map(RenderMap),
    Attributes(Attributes),
    /// A nested render node, e.g. a multi-source destination.
    Element(Box<RenderElement>),
}

impl RenderValue {
    /// Emptiness in the template engine's sense: null, `false`, zero, `""`,
    /// `"0"` and empty collections are all empty.
    pub fn is_empty(&self) -> bool {
        match self {
            RenderValue::Null => true,
            RenderValue::Bool(b) => !b,
            RenderValue::Int(i) => *i == 0,
            RenderValue::Float(f) => *f == 0.0,
            RenderValue::String(s) => s.is_empty() || s == "0",
            RenderValue::List(items) => items.is_empty(),
            RenderValue::Map(map) => map.is_empty(),
            RenderValue::Attributes(attrs) => attrs.is_empty(),
            RenderValue::Element(_) => false,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, RenderValue::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            RenderValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            RenderValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[RenderValue]> {
        match self {
            RenderValue::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&RenderMap> {
        match self {
            RenderValue::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_attributes(&self) -> Option<&Attributes> {
        match self {
            RenderValue::Attributes(attrs) => Some(attrs),
            _ => None,
        }
    }

    pub fn as_element(&self) -> Option<&RenderElement> {
        match self {
            RenderValue::Element(element) => Some(element),
            _ => None,
        }
    }

    /// String form of a scalar value. Collections and nodes have none.
    pub fn to_plain_string(&self) -> Option<String> {
        match self {
            RenderValue::Bool(true) => Some("1".to_string()),
            RenderValue::Bool(false) => Some(String::new()),
            RenderValue::Int(i) => Some(i.to_string()),
            RenderValue::Float(f) => Some(f.to_string()),
            RenderValue::String(s) => Some(s.clone()),
            _ => None,
        }
    }

    /// Short name of the variant, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            RenderValue::Null => "null",
            RenderValue::Bool(_) => "bool",
            RenderValue::Int(_) => "int",
            RenderValue::Float(_) => "float",
            RenderValue::String(_) => "string",
            RenderValue::List(_) => "list",
            RenderValue::Map(_) => "map",
            RenderValue::Attributes(_) => "attributes",
            RenderValue::Element(_) => "element",
        }
    }
}

impl<'de> Deserialize<'de> for RenderValue {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        serde_json::Value::deserialize(deserializer).map(RenderValue::from)
    }
}

impl From<serde_json::Value> for RenderValue {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => RenderValue::Null,
            Value::Bool(b) => RenderValue::Bool(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => RenderValue::Int(i),
                None => RenderValue::Float(n.as_f64().unwrap_or_default()),
            },
            Value::String(s) => RenderValue::String(s),
            Value::Array(items) => {
                RenderValue::List(items.into_iter().map(RenderValue::from).collect())
            }
            Value::Object(map) => RenderValue::Map(
                map.into_iter()
                    .map(|(k, v)| (k, RenderValue::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<&str> for RenderValue {
    fn from(value: &str) -> Self {
        RenderValue::String(value.to_string())
    }
}

impl From<String> for RenderValue {
    fn from(value: String) -> Self {
        RenderValue::String(value)
    }
}

impl From<bool> for RenderValue {
    fn from(value: bool) -> Self {
        RenderValue::Bool(value)
    }
}

impl From<i64> for RenderValue {
    fn from(value: i64) -> Self {
        RenderValue::Int(value)
    }
}

impl From<f64> for RenderValue {
    fn from(value: f64) -> Self {
        RenderValue::Float(value)
    }
}

impl From<Vec<RenderValue>> for RenderValue {
    fn from(value: Vec<RenderValue>) -> Self {
        RenderValue::List(value)
    }
}

impl From<RenderMap> for RenderValue {
    fn from(value: RenderMap) -> Self {
        RenderValue::Map(value)
    }
}

impl From<Attributes> for RenderValue {
    fn from(value: Attributes) -> Self {
        RenderValue::Attributes(value)
    }
}

impl From<RenderElement> for RenderValue {
    fn from(value: RenderElement) -> Self {
        RenderValue::Element(Box::new(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn emptiness_follows_template_engine_rules() {
        assert!(RenderValue::Null.is_empty());
        assert!(RenderValue::from(false).is_empty());
        assert!(RenderValue::from(0i64).is_empty());
        assert!(RenderValue::from("").is_empty());
        assert!(RenderValue::from("0").is_empty());
        assert!(RenderValue::List(vec![]).is_empty());
        assert!(RenderValue::Map(RenderMap::new()).is_empty());

        assert!(!RenderValue::from("entity").is_empty());
        assert!(!RenderValue::from(true).is_empty());
        assert!(!RenderValue::from(vec![RenderValue::Null]).is_empty());
    }

    #[test]
    fn json_conversion_keeps_key_order() {
        let value = RenderValue::from(json!({"z": 1, "a": [true, "x"], "m": 1.5}));
        let map = value.as_map().unwrap();
        let keys: Vec<_> = map.keys().cloned().collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
        assert_eq!(map["z"], RenderValue::Int(1));
        assert_eq!(map["m"], RenderValue::Float(1.5));
        assert_eq!(
            map["a"],
            RenderValue::List(vec![RenderValue::Bool(true), RenderValue::from("x")])
        );
    }

    #[test]
    fn deserializes_from_yaml() {
        let value: RenderValue = serde_yaml_ng::from_str("label: Preview\ncount: 3\n").unwrap();
        assert_eq!(value.as_map().unwrap()["label"], RenderValue::from("Preview"));
        assert_eq!(value.as_map().unwrap()["count"], RenderValue::Int(3));
    }

    #[test]
    fn serializes_untagged() {
        let value = RenderValue::from(json!({"a": [1, "b", null]}));
        assert_eq!(
            serde_json::to_string(&value).unwrap(),
            r#"{"a":[1,"b",null]}"#
        );
    }

    #[test]
    fn plain_string_only_for_scalars() {
        assert_eq!(RenderValue::from(7i64).to_plain_string().as_deref(), Some("7"));
        assert_eq!(RenderValue::from("x").to_plain_string().as_deref(), Some("x"));
        assert_eq!(RenderValue::List(vec![]).to_plain_string(), None);
    }
}
