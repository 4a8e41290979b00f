//! PatternContext: ambient render-time information for one pattern render.
//!
//! A context has a type (`entity`, `empty`, ...) and an ordered property bag.
//! The pipeline stamps `pattern` and `field` onto copies handed to
//! multi-source destinations; source plugins read `entity_type`, `bundle`
//! and `field_name` from it.

use serde::{Deserialize, Serialize};

use crate::value::{RenderMap, RenderValue};

/// Context type used when the caller supplies no usable context.
pub const EMPTY_CONTEXT: &str = "empty";

/// Property holding the entity being rendered.
pub const ENTITY_PROPERTY: &str = "entity";

/// Property stamped with the pattern id on destination contexts.
pub const PATTERN_PROPERTY: &str = "pattern";

/// Property stamped with the field slot name on destination contexts.
pub const FIELD_PROPERTY: &str = "field";

/// Typed context plus mutable property bag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternContext {
    #[serde(rename = "type")]
    context_type: String,
    #[serde(default)]
    properties: RenderMap,
}

impl PatternContext {
    pub fn new(context_type: impl Into<String>, properties: RenderMap) -> Self {
        Self {
            context_type: context_type.into(),
            properties,
        }
    }

    /// The untyped context.
    pub fn empty() -> Self {
        Self::new(EMPTY_CONTEXT, RenderMap::new())
    }

    /// Build a context from the raw array a caller put on the element.
    ///
    /// The raw `type` must be a non-empty scalar; anything else yields the
    /// empty context. The raw map, `type` included, becomes the property bag.
    pub fn from_raw(raw: RenderMap) -> Self {
        let context_type = raw
            .get("type")
            .filter(|t| !t.is_empty())
            .and_then(RenderValue::to_plain_string);
        match context_type {
            Some(context_type) => Self::new(context_type, raw),
            None => Self::empty(),
        }
    }

    pub fn context_type(&self) -> &str {
        &self.context_type
    }

    pub fn is_empty_context(&self) -> bool {
        self.context_type == EMPTY_CONTEXT
    }

    pub fn property(&self, name: &str) -> Option<&RenderValue> {
        self.properties.get(name)
    }

    /// String value of a property, if it holds a scalar.
    pub fn property_str(&self, name: &str) -> Option<String> {
        self.properties
            .get(name)
            .and_then(RenderValue::to_plain_string)
    }

    pub fn set_property(&mut self, name: impl Into<String>, value: impl Into<RenderValue>) {
        self.properties.insert(name.into(), value.into());
    }

    pub fn properties(&self) -> &RenderMap {
        &self.properties
    }
}

impl Default for PatternContext {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: serde_json::Value) -> RenderMap {
        match RenderValue::from(value) {
            RenderValue::Map(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn missing_type_yields_empty_context() {
        let context = PatternContext::from_raw(RenderMap::new());
        assert_eq!(context.context_type(), EMPTY_CONTEXT);
        assert!(context.properties().is_empty());
    }

    #[test]
    fn falsy_type_yields_empty_context() {
        for t in [json!(""), json!(null), json!(false), json!("0")] {
            let context = PatternContext::from_raw(raw(json!({"type": t, "entity": 1})));
            assert!(context.is_empty_context());
            assert!(context.property("entity").is_none());
        }
    }

    #[test]
    fn typed_context_keeps_raw_data() {
        let context = PatternContext::from_raw(raw(json!({
            "type": "entity",
            "entity_type": "node",
            "bundle": "article"
        })));
        assert_eq!(context.context_type(), "entity");
        assert_eq!(context.property_str("bundle").as_deref(), Some("article"));
        assert_eq!(context.property_str("type").as_deref(), Some("entity"));
    }

    #[test]
    fn properties_are_mutable() {
        let mut context = PatternContext::empty();
        context.set_property(PATTERN_PROPERTY, "card");
        context.set_property(FIELD_PROPERTY, "title");
        assert_eq!(context.property_str("pattern").as_deref(), Some("card"));
        assert_eq!(context.property_str("field").as_deref(), Some("title"));
    }
}
