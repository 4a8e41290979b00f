//! HTML attribute sets attached to render elements.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::value::{RenderMap, RenderValue};

/// An ordered set of HTML attributes.
///
/// `class` is always stored as a list so classes can be appended without
/// re-parsing. Rendering via [`fmt::Display`] produces ` name="value"` pairs
/// ready to be spliced into a start tag.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Attributes {
    values: IndexMap<String, RenderValue>,
}

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn get(&self, name: &str) -> Option<&RenderValue> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Set an attribute, replacing any previous value.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<RenderValue>) -> &mut Self {
        let name = name.into();
        let value = value.into();
        let value = if name == "class" {
            normalize_class(value)
        } else {
            value
        };
        self.values.insert(name, value);
        self
    }

    pub fn remove(&mut self, name: &str) -> Option<RenderValue> {
        self.values.shift_remove(name)
    }

    /// Append a class unless it is already present.
    pub fn add_class(&mut self, class: impl Into<String>) -> &mut Self {
        let class = class.into();
        if self.has_class(&class) {
            return self;
        }
        let entry = self
            .values
            .entry("class".to_string())
            .or_insert_with(|| RenderValue::List(Vec::new()));
        if let RenderValue::List(items) = entry {
            items.push(RenderValue::String(class));
        }
        self
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.values
            .get("class")
            .and_then(RenderValue::as_list)
            .is_some_and(|items| items.iter().any(|item| item.as_str() == Some(class)))
    }

    /// Union with `existing`; on a name collision the value from `existing` wins.
    ///
    /// Names keep the order in which they first appear in `self`, followed by
    /// names only present in `existing`.
    pub fn merge_under(&self, existing: &Attributes) -> Attributes {
        let mut merged = self.clone();
        for (name, value) in &existing.values {
            merged.values.insert(name.clone(), value.clone());
        }
        merged
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &RenderValue)> {
        self.values.iter()
    }

    pub fn to_map(&self) -> RenderMap {
        self.values.clone()
    }
}

impl From<RenderMap> for Attributes {
    fn from(map: RenderMap) -> Self {
        let mut attributes = Attributes::new();
        for (name, value) in map {
            attributes.set(name, value);
        }
        attributes
    }
}

impl fmt::Display for Attributes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, value) in &self.values {
            let rendered = match value {
                RenderValue::Null | RenderValue::Bool(false) => continue,
                RenderValue::Bool(true) => {
                    write!(f, " {}", html_escape::encode_double_quoted_attribute(name))?;
                    continue;
                }
                RenderValue::List(items) => items
                    .iter()
                    .filter_map(RenderValue::to_plain_string)
                    .filter(|s| !s.is_empty())
                    .collect::<Vec<_>>()
                    .join(" "),
                other => match other.to_plain_string() {
                    Some(s) => s,
                    None => continue,
                },
            };
            write!(
                f,
                " {}=\"{}\"",
                html_escape::encode_double_quoted_attribute(name),
                html_escape::encode_double_quoted_attribute(&rendered)
            )?;
        }
        Ok(())
    }
}

fn normalize_class(value: RenderValue) -> RenderValue {
    match value {
        RenderValue::String(classes) => RenderValue::List(
            classes
                .split_whitespace()
                .map(|c| RenderValue::String(c.to_string()))
                .collect(),
        ),
        other => other,
    }
}
