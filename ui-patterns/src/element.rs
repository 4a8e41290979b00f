//! Render elements: the record threaded through the element pipeline.
//!
//! Recognized render properties are struct fields. Slot outputs (`#title`,
//! `#variant`, ...) live in the ordered `outputs` bucket and top-level
//! properties without a `#` prefix (regions injected by layout systems) live
//! in `extra`. `fields` and `settings` are pipeline-internal and are empty
//! once the pipeline has run.
//!
//! Serialized, outputs are nested under `#outputs` so a slot may share its
//! name with a recognized property (a `theme` setting next to the `#theme`
//! hook).

use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, Serializer};
use tracing::warn;

use crate::attributes::Attributes;
use crate::context::PatternContext;
use crate::value::{RenderMap, RenderValue};

/// Element type marker for pattern render elements.
pub const PATTERN_ELEMENT_TYPE: &str = "pattern";

/// Render-array key holding the slot outputs.
pub const OUTPUTS_KEY: &str = "#outputs";

/// Property names (without `#`) read into typed fields.
pub const RECOGNIZED_PROPERTIES: [&str; 13] = [
    "id",
    "type",
    "context",
    "attributes",
    "theme",
    "markup",
    "use",
    "sources",
    "multiple_sources",
    "fields",
    "settings",
    "attached",
    "outputs",
];

/// Context as supplied by the caller, or resolved by the pipeline.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ElementContext {
    #[default]
    None,
    Raw(RenderMap),
    Resolved(PatternContext),
}

/// Sources offered to a field slot, or the effective output once resolved.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldSlot {
    Sources(Vec<RenderValue>),
    Resolved(RenderValue),
}

impl FieldSlot {
    /// The value promoted to the slot's output property.
    ///
    /// A single unresolved source is unwrapped; several are passed through
    /// as the list they were supplied as.
    pub fn into_output(self) -> RenderValue {
        match self {
            FieldSlot::Resolved(value) => value,
            FieldSlot::Sources(mut sources) if sources.len() == 1 => sources.remove(0),
            FieldSlot::Sources(sources) => RenderValue::List(sources),
        }
    }
}

impl Serialize for FieldSlot {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            FieldSlot::Sources(sources) => sources.serialize(serializer),
            FieldSlot::Resolved(value) => value.serialize(serializer),
        }
    }
}

/// Assets attached to an element.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Attached {
    pub library: Vec<String>,
}

/// A render element (render array) for one pattern, or a nested render node.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RenderElement {
    pub id: Option<String>,
    pub element_type: Option<String>,
    pub context: ElementContext,
    pub attributes: Option<RenderValue>,
    pub theme: Option<String>,
    pub attached: Attached,
    pub markup: Option<String>,
    pub use_template: Option<String>,
    pub sources: Option<Vec<RenderValue>>,
    pub multiple_sources: bool,
    pub fields: IndexMap<String, FieldSlot>,
    pub settings: RenderMap,
    pub outputs: RenderMap,
    pub extra: RenderMap,
}

impl RenderElement {
    /// A fresh pattern element referencing `pattern_id`.
    pub fn pattern(pattern_id: impl Into<String>) -> Self {
        Self {
            id: Some(pattern_id.into()),
            element_type: Some(PATTERN_ELEMENT_TYPE.to_string()),
            ..Self::default()
        }
    }

    /// Read a render array: `#`-prefixed keys are render properties, other
    /// keys go to `extra`.
    pub fn from_render_array(array: RenderMap) -> Self {
        let mut element = RenderElement::default();
        for (key, value) in array {
            if !key.starts_with('#') {
                element.extra.insert(key, value);
                continue;
            }
            match (&key[1..], value) {
                ("id", RenderValue::String(id)) => element.id = Some(id),
                ("type", RenderValue::String(t)) => element.element_type = Some(t),
                ("context", RenderValue::Map(raw)) => element.context = ElementContext::Raw(raw),
                ("attributes", value) => element.attributes = Some(value),
                ("theme", RenderValue::String(theme)) => element.theme = Some(theme),
                ("markup", RenderValue::String(markup)) => element.markup = Some(markup),
                ("use", RenderValue::String(template)) => element.use_template = Some(template),
                ("sources", RenderValue::List(sources)) => element.sources = Some(sources),
                ("multiple_sources", value) => {
                    element.multiple_sources = value.as_bool() == Some(true)
                }
                ("fields", RenderValue::Map(fields)) => {
                    for (slot, sources) in fields {
                        element.fields.insert(slot, sources_of(sources));
                    }
                }
                ("settings", RenderValue::Map(settings)) => element.settings = settings,
                ("outputs", RenderValue::Map(outputs)) => element.outputs.extend(outputs),
                ("attached", RenderValue::Map(attached)) => {
                    if let Some(RenderValue::List(libraries)) = attached.get("library") {
                        element.attached.library.extend(
                            libraries
                                .iter()
                                .filter_map(RenderValue::as_str)
                                .map(str::to_string),
                        );
                    }
                }
                (name, value) if RECOGNIZED_PROPERTIES.contains(&name) => {
                    warn!(
                        property = %key,
                        kind = value.kind(),
                        "discarding malformed render property"
                    );
                }
                (name, value) => {
                    element.outputs.insert(name.to_string(), value);
                }
            }
        }
        element
    }

    // --- Builders ---

    pub fn with_field(mut self, slot: impl Into<String>, sources: Vec<RenderValue>) -> Self {
        self.fields.insert(slot.into(), FieldSlot::Sources(sources));
        self
    }

    pub fn with_setting(mut self, name: impl Into<String>, value: impl Into<RenderValue>) -> Self {
        self.settings.insert(name.into(), value.into());
        self
    }

    pub fn with_context(mut self, raw: RenderMap) -> Self {
        self.context = ElementContext::Raw(raw);
        self
    }

    pub fn with_attributes(mut self, attributes: impl Into<RenderValue>) -> Self {
        self.attributes = Some(attributes.into());
        self
    }

    pub fn with_multiple_sources(mut self, multiple: bool) -> Self {
        self.multiple_sources = multiple;
        self
    }

    pub fn with_output(mut self, name: impl Into<String>, value: impl Into<RenderValue>) -> Self {
        self.outputs.insert(name.into(), value.into());
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<RenderValue>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    // --- Accessors ---

    pub fn pattern_context(&self) -> Option<&PatternContext> {
        match &self.context {
            ElementContext::Resolved(context) => Some(context),
            _ => None,
        }
    }

    pub fn attributes(&self) -> Option<&Attributes> {
        self.attributes.as_ref().and_then(RenderValue::as_attributes)
    }

    pub fn output(&self, name: &str) -> Option<&RenderValue> {
        self.outputs.get(name)
    }

    /// True when the element renders as explicit empty markup.
    pub fn is_empty_markup(&self) -> bool {
        self.markup.as_deref() == Some("")
    }
}

fn sources_of(value: RenderValue) -> FieldSlot {
    match value {
        RenderValue::List(sources) => FieldSlot::Sources(sources),
        other => FieldSlot::Sources(vec![other]),
    }
}

impl Serialize for RenderElement {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        if let Some(id) = &self.id {
            map.serialize_entry("#id", id)?;
        }
        if let Some(element_type) = &self.element_type {
            map.serialize_entry("#type", element_type)?;
        }
        if let Some(theme) = &self.theme {
            map.serialize_entry("#theme", theme)?;
        }
        match &self.context {
            ElementContext::None => {}
            ElementContext::Raw(raw) => map.serialize_entry("#context", raw)?,
            ElementContext::Resolved(context) => map.serialize_entry("#context", context)?,
        }
        if let Some(attributes) = &self.attributes {
            map.serialize_entry("#attributes", attributes)?;
        }
        if !self.attached.library.is_empty() {
            let mut attached = IndexMap::new();
            attached.insert("library", &self.attached.library);
            map.serialize_entry("#attached", &attached)?;
        }
        if let Some(markup) = &self.markup {
            map.serialize_entry("#markup", markup)?;
        }
        if let Some(template) = &self.use_template {
            map.serialize_entry("#use", template)?;
        }
        if let Some(sources) = &self.sources {
            map.serialize_entry("#sources", sources)?;
        }
        if self.multiple_sources {
            map.serialize_entry("#multiple_sources", &true)?;
        }
        if !self.fields.is_empty() {
            map.serialize_entry("#fields", &self.fields)?;
        }
        if !self.settings.is_empty() {
            map.serialize_entry("#settings", &self.settings)?;
        }
        if !self.outputs.is_empty() {
            map.serialize_entry(OUTPUTS_KEY, &self.outputs)?;
        }
        for (key, value) in &self.extra {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}
