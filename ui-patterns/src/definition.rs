//! Pattern definitions and their declarative document form.
//!
//! A [`PatternDefinition`] is built once from a declarative document (usually
//! one entry of a `*.ui_patterns.yml` file) and shared read-only by every
//! render of that pattern. Slot maps keep declaration order.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{PatternsError, Result};
use crate::value::{RenderMap, RenderValue};

/// Prefix of theme hooks derived from pattern ids.
pub const THEME_HOOK_PREFIX: &str = "pattern_";

/// Owner of libraries declared inline by a pattern.
pub const LIBRARY_PROVIDER: &str = "ui_patterns";

/// A field slot declared by a pattern.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDefinition {
    pub name: String,
    pub label: String,
    pub type_: Option<String>,
    pub description: Option<String>,
    pub preview: Option<RenderValue>,
}

impl FieldDefinition {
    pub fn new(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            type_: None,
            description: None,
            preview: None,
        }
    }
}

/// A setting slot declared by a pattern.
#[derive(Debug, Clone, PartialEq)]
pub struct SettingDefinition {
    pub name: String,
    pub label: String,
    pub type_: Option<String>,
    pub description: Option<String>,
    /// Used when a render supplies no value for this setting.
    pub default_value: Option<RenderValue>,
    /// Allowed values (value → label), offered by settings forms.
    pub options: IndexMap<String, String>,
}

impl SettingDefinition {
    pub fn new(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            type_: None,
            description: None,
            default_value: None,
            options: IndexMap::new(),
        }
    }

    pub fn with_default(mut self, value: impl Into<RenderValue>) -> Self {
        self.default_value = Some(value.into());
        self
    }
}

/// An asset library attached whenever the pattern renders.
#[derive(Debug, Clone, PartialEq)]
pub enum LibraryDefinition {
    /// A library owned by another extension, referenced by full name.
    External(String),
    /// A library declared inline by the pattern itself.
    Local { name: String, assets: RenderValue },
}

impl LibraryDefinition {
    /// Parse one entry of a declarative `libraries` list.
    ///
    /// A mapping entry may declare several inline libraries at once.
    fn from_document(entry: RenderValue) -> Result<Vec<Self>> {
        match entry {
            RenderValue::String(name) => Ok(vec![LibraryDefinition::External(name)]),
            RenderValue::Map(map) => Ok(map
                .into_iter()
                .map(|(name, assets)| LibraryDefinition::Local { name, assets })
                .collect()),
            other => Err(PatternsError::InvalidDefinition {
                message: format!("library entries must be names or mappings, got {}", other.kind()),
            }),
        }
    }

    fn to_document(&self) -> RenderValue {
        match self {
            LibraryDefinition::External(name) => RenderValue::String(name.clone()),
            LibraryDefinition::Local { name, assets } => {
                let mut map = RenderMap::new();
                map.insert(name.clone(), assets.clone());
                RenderValue::Map(map)
            }
        }
    }
}

/// Declarative form of a slot: a bare label or a full mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SlotDocument {
    Label(String),
    Full(SlotSpec),
}

/// Full declarative form of a field or setting slot.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SlotSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview: Option<RenderValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<RenderValue>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub options: IndexMap<String, String>,
}

impl SlotDocument {
    /// Split into the effective slot name and its spec.
    fn resolve(self, key: &str) -> (String, SlotSpec) {
        let spec = match self {
            SlotDocument::Label(label) => SlotSpec {
                label: Some(label),
                ..SlotSpec::default()
            },
            SlotDocument::Full(spec) => spec,
        };
        let name = spec.name.clone().unwrap_or_else(|| key.to_string());
        (name, spec)
    }
}

/// Declarative document describing one pattern.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PatternDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(default, rename = "use", skip_serializing_if = "Option::is_none")]
    pub use_template: Option<String>,
    #[serde(default, rename = "theme hook", skip_serializing_if = "Option::is_none")]
    pub theme_hook: Option<String>,
    #[serde(default, rename = "custom theme hook")]
    pub custom_theme_hook: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    #[serde(default, rename = "file name", skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
    #[serde(default, rename = "base path", skip_serializing_if = "Option::is_none")]
    pub base_path: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub libraries: Vec<RenderValue>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub fields: IndexMap<String, SlotDocument>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub settings: IndexMap<String, SlotDocument>,
}

/// Immutable-after-build description of one pattern.
#[derive(Debug, Clone, PartialEq)]
pub struct PatternDefinition {
    id: String,
    label: Option<String>,
    description: Option<String>,
    provider: Option<String>,
    template: Option<String>,
    class: Option<String>,
    base_path: Option<String>,
    file_name: Option<String>,
    tags: Vec<String>,
    use_template: Option<String>,
    theme_hook: Option<String>,
    custom_theme_hook: bool,
    libraries: Vec<LibraryDefinition>,
    fields: IndexMap<String, FieldDefinition>,
    settings: IndexMap<String, SettingDefinition>,
}

impl PatternDefinition {
    /// A definition with only an id; every optional attribute is unset.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: None,
            description: None,
            provider: None,
            template: None,
            class: None,
            base_path: None,
            file_name: None,
            tags: Vec::new(),
            use_template: None,
            theme_hook: None,
            custom_theme_hook: false,
            libraries: Vec::new(),
            fields: IndexMap::new(),
            settings: IndexMap::new(),
        }
    }

    /// Build from a declarative document.
    ///
    /// `fallback_id` is used when the document carries no `id`, which is the
    /// case for entries of a multi-pattern file keyed by id.
    pub fn from_document(document: PatternDocument, fallback_id: Option<&str>) -> Result<Self> {
        let id = document
            .id
            .clone()
            .or_else(|| fallback_id.map(str::to_string))
            .filter(|id| !id.is_empty())
            .ok_or_else(|| PatternsError::InvalidDefinition {
                message: "pattern has no id".to_string(),
            })?;

        let mut definition = PatternDefinition::new(id);
        definition.label = document.label;
        definition.description = document.description;
        definition.provider = document.provider;
        definition.template = document.template;
        definition.class = document.class;
        definition.base_path = document.base_path;
        definition.file_name = document.file_name;
        definition.tags = document.tags;
        definition.use_template = document.use_template;
        definition.theme_hook = document.theme_hook;
        definition.custom_theme_hook = document.custom_theme_hook;
        for entry in document.libraries {
            definition
                .libraries
                .extend(LibraryDefinition::from_document(entry)?);
        }
        definition.set_fields(document.fields)?;
        definition.set_settings(document.settings)?;
        Ok(definition)
    }

    /// Parse a single pattern document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let document: PatternDocument = serde_yaml_ng::from_str(yaml)?;
        Self::from_document(document, None)
    }

    // --- Builders ---

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    pub fn with_use(mut self, template: impl Into<String>) -> Self {
        self.use_template = Some(template.into());
        self
    }

    pub fn with_custom_theme_hook(mut self, hook: impl Into<String>) -> Self {
        self.theme_hook = Some(hook.into());
        self.custom_theme_hook = true;
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn with_library(mut self, library: LibraryDefinition) -> Self {
        self.libraries.push(library);
        self
    }

    /// Add a field slot, failing if the name is already declared.
    pub fn with_field(mut self, field: FieldDefinition) -> Result<Self> {
        self.add_field(field)?;
        Ok(self)
    }

    /// Add a setting slot, failing if the name is already declared.
    pub fn with_setting(mut self, setting: SettingDefinition) -> Result<Self> {
        self.add_setting(setting)?;
        Ok(self)
    }

    // --- Accessors ---

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn provider(&self) -> Option<&str> {
        self.provider.as_deref()
    }

    pub fn template(&self) -> Option<&str> {
        self.template.as_deref()
    }

    pub fn class(&self) -> Option<&str> {
        self.class.as_deref()
    }

    pub fn base_path(&self) -> Option<&str> {
        self.base_path.as_deref()
    }

    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    pub fn has_use(&self) -> bool {
        self.use_template.is_some()
    }

    pub fn use_template(&self) -> Option<&str> {
        self.use_template.as_deref()
    }

    pub fn has_custom_theme_hook(&self) -> bool {
        self.custom_theme_hook
    }

    /// Theme hook as declared, before derivation.
    pub fn declared_theme_hook(&self) -> Option<&str> {
        self.theme_hook.as_deref()
    }

    /// The custom hook when one is declared, else `pattern_{id}`.
    pub fn theme_hook(&self) -> String {
        match (&self.theme_hook, self.custom_theme_hook) {
            (Some(hook), true) => hook.clone(),
            _ => format!("{THEME_HOOK_PREFIX}{}", self.id),
        }
    }

    pub fn libraries(&self) -> &[LibraryDefinition] {
        &self.libraries
    }

    /// Library identifiers to attach, in declaration order.
    pub fn libraries_names(&self) -> Vec<String> {
        self.libraries
            .iter()
            .map(|library| match library {
                LibraryDefinition::External(name) => name.clone(),
                LibraryDefinition::Local { name, .. } => {
                    format!("{LIBRARY_PROVIDER}/{}.{}", self.id, name)
                }
            })
            .collect()
    }

    // --- Slots ---

    pub fn fields(&self) -> &IndexMap<String, FieldDefinition> {
        &self.fields
    }

    pub fn has_fields(&self) -> bool {
        !self.fields.is_empty()
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn field(&self, name: &str) -> Result<&FieldDefinition> {
        self.fields
            .get(name)
            .ok_or_else(|| PatternsError::FieldNotFound {
                pattern: self.id.clone(),
                name: name.to_string(),
            })
    }

    pub fn field_mut(&mut self, name: &str) -> Result<&mut FieldDefinition> {
        let pattern = &self.id;
        self.fields
            .get_mut(name)
            .ok_or_else(|| PatternsError::FieldNotFound {
                pattern: pattern.clone(),
                name: name.to_string(),
            })
    }

    pub fn add_field(&mut self, field: FieldDefinition) -> Result<&mut Self> {
        if self.fields.contains_key(&field.name) {
            return Err(self.duplicate("field", &field.name));
        }
        self.fields.insert(field.name.clone(), field);
        Ok(self)
    }

    /// Replace all field slots from declarative data.
    ///
    /// On error the existing slots are left untouched.
    pub fn set_fields(&mut self, fields: IndexMap<String, SlotDocument>) -> Result<&mut Self> {
        let mut resolved = IndexMap::new();
        for (key, document) in fields {
            let (name, spec) = document.resolve(&key);
            if resolved.contains_key(&name) {
                return Err(self.duplicate("field", &name));
            }
            let field = FieldDefinition {
                label: spec.label.unwrap_or_else(|| name.clone()),
                name: name.clone(),
                type_: spec.type_,
                description: spec.description,
                preview: spec.preview,
            };
            resolved.insert(name, field);
        }
        self.fields = resolved;
        Ok(self)
    }

    pub fn settings(&self) -> &IndexMap<String, SettingDefinition> {
        &self.settings
    }

    pub fn has_settings(&self) -> bool {
        !self.settings.is_empty()
    }

    pub fn setting(&self, name: &str) -> Result<&SettingDefinition> {
        self.settings
            .get(name)
            .ok_or_else(|| PatternsError::SettingNotFound {
                pattern: self.id.clone(),
                name: name.to_string(),
            })
    }

    pub fn setting_mut(&mut self, name: &str) -> Result<&mut SettingDefinition> {
        let pattern = &self.id;
        self.settings
            .get_mut(name)
            .ok_or_else(|| PatternsError::SettingNotFound {
                pattern: pattern.clone(),
                name: name.to_string(),
            })
    }

    pub fn add_setting(&mut self, setting: SettingDefinition) -> Result<&mut Self> {
        if self.settings.contains_key(&setting.name) {
            return Err(self.duplicate("setting", &setting.name));
        }
        self.settings.insert(setting.name.clone(), setting);
        Ok(self)
    }

    /// Replace all setting slots from declarative data.
    ///
    /// On error the existing slots are left untouched.
    pub fn set_settings(&mut self, settings: IndexMap<String, SlotDocument>) -> Result<&mut Self> {
        let mut resolved = IndexMap::new();
        for (key, document) in settings {
            let (name, spec) = document.resolve(&key);
            if resolved.contains_key(&name) {
                return Err(self.duplicate("setting", &name));
            }
            let setting = SettingDefinition {
                label: spec.label.unwrap_or_else(|| name.clone()),
                name: name.clone(),
                type_: spec.type_,
                description: spec.description,
                default_value: spec.default_value,
                options: spec.options,
            };
            resolved.insert(name, setting);
        }
        self.settings = resolved;
        Ok(self)
    }

    /// Loader-provided attributes, only filled where the document left them unset.
    pub(crate) fn stamp_origin(&mut self, provider: Option<&str>, file_name: Option<&str>) {
        if self.provider.is_none() {
            self.provider = provider.map(str::to_string);
        }
        if self.file_name.is_none() {
            self.file_name = file_name.map(str::to_string);
        }
        if self.base_path.is_none() {
            self.base_path = self
                .file_name
                .as_deref()
                .and_then(|f| std::path::Path::new(f).parent())
                .map(|p| p.to_string_lossy().into_owned())
                .filter(|p| !p.is_empty());
        }
    }

    /// Declarative form of this definition.
    pub fn to_document(&self) -> PatternDocument {
        PatternDocument {
            id: Some(self.id.clone()),
            label: self.label.clone(),
            description: self.description.clone(),
            provider: self.provider.clone(),
            use_template: self.use_template.clone(),
            theme_hook: self.theme_hook.clone(),
            custom_theme_hook: self.custom_theme_hook,
            template: self.template.clone(),
            file_name: self.file_name.clone(),
            class: self.class.clone(),
            base_path: self.base_path.clone(),
            tags: self.tags.clone(),
            libraries: self
                .libraries
                .iter()
                .map(LibraryDefinition::to_document)
                .collect(),
            fields: self
                .fields
                .iter()
                .map(|(name, field)| {
                    let spec = SlotSpec {
                        name: Some(field.name.clone()),
                        label: Some(field.label.clone()),
                        type_: field.type_.clone(),
                        description: field.description.clone(),
                        preview: field.preview.clone(),
                        ..SlotSpec::default()
                    };
                    (name.clone(), SlotDocument::Full(spec))
                })
                .collect(),
            settings: self
                .settings
                .iter()
                .map(|(name, setting)| {
                    let spec = SlotSpec {
                        name: Some(setting.name.clone()),
                        label: Some(setting.label.clone()),
                        type_: setting.type_.clone(),
                        description: setting.description.clone(),
                        default_value: setting.default_value.clone(),
                        options: setting.options.clone(),
                        ..SlotSpec::default()
                    };
                    (name.clone(), SlotDocument::Full(spec))
                })
                .collect(),
        }
    }

    fn duplicate(&self, kind: &'static str, name: &str) -> PatternsError {
        PatternsError::DuplicateSlot {
            pattern: self.id.clone(),
            kind,
            name: name.to_string(),
        }
    }
}

/// Parse a multi-pattern document keyed by pattern id.
///
/// `provider` and `file_name` are stamped onto definitions that do not
/// declare them; the base path is derived from the file name.
pub fn definitions_from_yaml(
    yaml: &str,
    provider: Option<&str>,
    file_name: Option<&str>,
) -> Result<Vec<PatternDefinition>> {
    let documents: IndexMap<String, PatternDocument> = serde_yaml_ng::from_str(yaml)?;
    documents
        .into_iter()
        .map(|(key, document)| {
            let mut definition = PatternDefinition::from_document(document, Some(&key))?;
            definition.stamp_origin(provider, file_name);
            Ok(definition)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn definition_with(key: &str, value: &str) -> PatternDefinition {
        let yaml = format!("id: pattern_id\n{key}: {value}\n");
        PatternDefinition::from_yaml_str(&yaml).unwrap()
    }

    #[rstest]
    #[case("provider", "my_module")]
    #[case("label", "Pattern label")]
    #[case("description", "Pattern description.")]
    #[case("use", "template.twig")]
    #[case("template", "my-template.html.twig")]
    #[case("file name", "/path/to/filename.ui_patterns.yml")]
    #[case("class", "MyClass")]
    #[case("base path", "/path/to")]
    fn getters_return_declared_values(#[case] key: &str, #[case] value: &str) {
        let definition = definition_with(key, &format!("'{value}'"));
        let actual = match key {
            "provider" => definition.provider(),
            "label" => definition.label(),
            "description" => definition.description(),
            "use" => definition.use_template(),
            "template" => definition.template(),
            "file name" => definition.file_name(),
            "class" => definition.class(),
            "base path" => definition.base_path(),
            _ => unreachable!(),
        };
        assert_eq!(actual, Some(value));
    }

    #[test]
    fn missing_optional_attributes_are_none() {
        let definition = PatternDefinition::from_yaml_str("id: bare").unwrap();
        assert_eq!(definition.id(), "bare");
        assert_eq!(definition.label(), None);
        assert_eq!(definition.description(), None);
        assert_eq!(definition.provider(), None);
        assert_eq!(definition.template(), None);
        assert_eq!(definition.class(), None);
        assert_eq!(definition.base_path(), None);
        assert_eq!(definition.file_name(), None);
        assert_eq!(definition.use_template(), None);
        assert!(!definition.has_use());
        assert!(!definition.has_custom_theme_hook());
        assert!(definition.tags().is_empty());
        assert!(definition.libraries_names().is_empty());
        assert!(definition.fields().is_empty());
        assert!(definition.settings().is_empty());
    }

    #[test]
    fn missing_id_is_rejected() {
        let err = PatternDefinition::from_yaml_str("label: Nameless").unwrap_err();
        assert!(matches!(err, PatternsError::InvalidDefinition { .. }));
    }

    #[test]
    fn tags_keep_order() {
        let definition = PatternDefinition::from_yaml_str("id: p\ntags: [b, a]").unwrap();
        assert_eq!(definition.tags(), ["b", "a"]);
        assert!(definition.has_tag("a"));
    }

    #[test]
    fn theme_hook_derived_from_id() {
        let definition = PatternDefinition::new("card");
        assert_eq!(definition.theme_hook(), "pattern_card");
    }

    #[test]
    fn custom_theme_hook_returned_verbatim() {
        let definition = PatternDefinition::from_yaml_str(
            "id: card\ntheme hook: custom_my_theme_hook\ncustom theme hook: true",
        )
        .unwrap();
        assert!(definition.has_custom_theme_hook());
        assert_eq!(definition.theme_hook(), "custom_my_theme_hook");
    }

    #[test]
    fn declared_hook_without_custom_flag_is_ignored() {
        let definition =
            PatternDefinition::from_yaml_str("id: card\ntheme hook: something_else").unwrap();
        assert_eq!(definition.declared_theme_hook(), Some("something_else"));
        assert_eq!(definition.theme_hook(), "pattern_card");
    }

    #[test]
    fn field_slot_observes_mutations() {
        let mut definition = PatternDefinition::from_yaml_str(
            "id: p\nfields:\n  name:\n    name: name\n    label: Label\n",
        )
        .unwrap();

        let field = definition.field("name").unwrap();
        assert_eq!(field.label, "Label");
        assert_eq!(field.name, "name");
        assert_eq!(field.type_, None);
        assert_eq!(field.description, None);
        assert_eq!(field.preview, None);

        definition.field_mut("name").unwrap().type_ = Some("type".into());
        definition.field_mut("name").unwrap().preview = Some("preview".into());
        definition.field_mut("name").unwrap().description = Some("description".into());

        let field = definition.field("name").unwrap();
        assert_eq!(field.type_.as_deref(), Some("type"));
        assert_eq!(field.description.as_deref(), Some("description"));
        assert_eq!(field.preview, Some(RenderValue::from("preview")));
    }

    #[test]
    fn setting_slot_observes_mutations() {
        let mut definition = PatternDefinition::from_yaml_str(
            "id: p\nsettings:\n  name:\n    name: name\n    label: Label\n",
        )
        .unwrap();
        assert_eq!(definition.setting("name").unwrap().type_, None);

        definition.setting_mut("name").unwrap().type_ = Some("type".into());
        definition.setting_mut("name").unwrap().description = Some("description".into());

        let setting = definition.setting("name").unwrap();
        assert_eq!(setting.label, "Label");
        assert_eq!(setting.type_.as_deref(), Some("type"));
        assert_eq!(setting.description.as_deref(), Some("description"));
    }

    #[test]
    fn unknown_slots_are_not_found() {
        let mut definition = PatternDefinition::new("p");
        assert!(matches!(
            definition.field("missing"),
            Err(PatternsError::FieldNotFound { .. })
        ));
        assert!(matches!(
            definition.setting_mut("missing"),
            Err(PatternsError::SettingNotFound { .. })
        ));
    }

    #[test]
    fn slot_shorthand_and_defaults() {
        let definition = PatternDefinition::from_yaml_str(
            "id: p\nfields:\n  title: Title\n  body: {}\nsettings:\n  variant:\n    default_value: wide\n",
        )
        .unwrap();
        assert_eq!(definition.field("title").unwrap().label, "Title");
        assert_eq!(definition.field("body").unwrap().label, "body");
        assert_eq!(
            definition.setting("variant").unwrap().default_value,
            Some(RenderValue::from("wide"))
        );
        let names: Vec<_> = definition.fields().keys().cloned().collect();
        assert_eq!(names, vec!["title", "body"]);
    }

    #[test]
    fn duplicate_slot_names_rejected() {
        let err = PatternDefinition::from_yaml_str(
            "id: p\nfields:\n  a:\n    name: same\n  b:\n    name: same\n",
        )
        .unwrap_err();
        assert!(matches!(
            err,
            PatternsError::DuplicateSlot { kind: "field", .. }
        ));

        let mut definition = PatternDefinition::new("p")
            .with_setting(SettingDefinition::new("size", "Size"))
            .unwrap();
        assert!(definition
            .add_setting(SettingDefinition::new("size", "Other"))
            .is_err());
        assert_eq!(definition.setting("size").unwrap().label, "Size");
    }

    #[test]
    fn failed_set_fields_keeps_previous_slots() {
        let mut definition = PatternDefinition::new("p")
            .with_field(FieldDefinition::new("title", "Title"))
            .unwrap();
        let mut fields = IndexMap::new();
        fields.insert("a".to_string(), SlotDocument::Label("A".into()));
        fields.insert(
            "b".to_string(),
            SlotDocument::Full(SlotSpec {
                name: Some("a".into()),
                ..SlotSpec::default()
            }),
        );
        assert!(definition.set_fields(fields).is_err());
        assert!(definition.has_field("title"));
    }

    #[test]
    fn library_names() {
        let definition = PatternDefinition::from_yaml_str(
            "id: card\nlibraries:\n  - base/reset.css\n  - card_styles:\n      css:\n        theme:\n          card.css: {}\n  - card/card.js\n",
        )
        .unwrap();
        assert_eq!(
            definition.libraries_names(),
            vec!["base/reset.css", "ui_patterns/card.card_styles", "card/card.js"]
        );
    }

    #[test]
    fn invalid_library_entry_rejected() {
        let err = PatternDefinition::from_yaml_str("id: p\nlibraries: [42]").unwrap_err();
        assert!(matches!(err, PatternsError::InvalidDefinition { .. }));
    }

    #[test]
    fn multi_pattern_documents_stamp_origin() {
        let yaml = "card:\n  label: Card\nbutton:\n  label: Button\n  provider: buttons\n";
        let definitions =
            definitions_from_yaml(yaml, Some("my_theme"), Some("themes/my/my.ui_patterns.yml"))
                .unwrap();
        assert_eq!(definitions.len(), 2);
        assert_eq!(definitions[0].id(), "card");
        assert_eq!(definitions[0].provider(), Some("my_theme"));
        assert_eq!(definitions[0].base_path(), Some("themes/my"));
        assert_eq!(definitions[1].id(), "button");
        assert_eq!(definitions[1].provider(), Some("buttons"));
    }

    #[test]
    fn document_survives_yaml_dump() {
        let definition = PatternDefinition::from_yaml_str(
            "id: card\nlabel: Card\ntags: [layout]\nlibraries: [card/card.css]\nfields:\n  title:\n    label: Title\n    type: text\nsettings:\n  theme:\n    label: Theme\n    default_value: default\n",
        )
        .unwrap();
        let yaml = serde_yaml_ng::to_string(&definition.to_document()).unwrap();
        let reparsed = PatternDefinition::from_yaml_str(&yaml).unwrap();
        assert_eq!(reparsed, definition);
    }
}
