//! Layout settings form fragments.
//!
//! Form elements are render maps keyed by `#`-prefixed properties, the same
//! shape render elements use.

use std::sync::Arc;

use tracing::{debug, trace};
use ui_patterns::{
    PatternDefinition, PatternRegistry, RenderMap, RenderValue, Result, SettingDefinition,
};

/// Key of the fieldset holding one element per declared setting.
pub const PATTERN_FIELDSET: &str = "pattern";

/// Alters a pattern's layout settings form before it is shown.
pub trait LayoutFormAlter: Send + Sync {
    fn alter(&self, form: &mut RenderMap, definition: &PatternDefinition, configuration: &RenderMap);
}

impl<F> LayoutFormAlter for F
where
    F: Fn(&mut RenderMap, &PatternDefinition, &RenderMap) + Send + Sync,
{
    fn alter(&self, form: &mut RenderMap, definition: &PatternDefinition, configuration: &RenderMap) {
        self(form, definition, configuration)
    }
}

/// Builds settings forms and runs the registered alter hooks.
#[derive(Default, Clone)]
pub struct LayoutSettingsForm {
    alters: Vec<Arc<dyn LayoutFormAlter>>,
}

impl LayoutSettingsForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hooks run in registration order.
    pub fn register_alter(&mut self, alter: impl LayoutFormAlter + 'static) -> &mut Self {
        self.alters.push(Arc::new(alter));
        self
    }

    /// Build the form for `definition`.
    ///
    /// `configuration` holds previously saved setting values; they become the
    /// elements' default values, falling back to each setting's own default.
    pub fn build(&self, definition: &PatternDefinition, configuration: &RenderMap) -> RenderMap {
        let mut fieldset = RenderMap::new();
        fieldset.insert("#type".into(), "fieldset".into());
        fieldset.insert(
            "#title".into(),
            definition.label().unwrap_or(definition.id()).into(),
        );
        for (name, setting) in definition.settings() {
            fieldset.insert(name.clone(), setting_element(setting, configuration.get(name)));
        }

        let mut form = RenderMap::new();
        form.insert(PATTERN_FIELDSET.into(), RenderValue::Map(fieldset));

        for alter in &self.alters {
            alter.alter(&mut form, definition, configuration);
        }
        debug!(
            pattern = definition.id(),
            settings = definition.settings().len(),
            alters = self.alters.len(),
            "built layout settings form"
        );
        form
    }

    /// Look `pattern_id` up in `registry` and build its form.
    pub fn build_for(
        &self,
        registry: &PatternRegistry,
        pattern_id: &str,
        configuration: &RenderMap,
    ) -> Result<RenderMap> {
        let definition = registry.get(pattern_id)?;
        Ok(self.build(&definition, configuration))
    }
}

fn setting_element(setting: &SettingDefinition, configured: Option<&RenderValue>) -> RenderValue {
    let mut element = RenderMap::new();
    let widget = if setting.options.is_empty() {
        "textfield"
    } else {
        "select"
    };
    element.insert("#type".into(), widget.into());
    element.insert("#title".into(), setting.label.clone().into());
    if let Some(description) = &setting.description {
        element.insert("#description".into(), description.clone().into());
    }

    let default_value = configured
        .filter(|value| !value.is_null())
        .or(setting.default_value.as_ref());
    if let Some(value) = default_value {
        element.insert("#default_value".into(), value.clone());
    }

    if !setting.options.is_empty() {
        let options: RenderMap = setting
            .options
            .iter()
            .map(|(key, label)| (key.clone(), RenderValue::from(label.as_str())))
            .collect();
        element.insert("#options".into(), RenderValue::Map(options));
    }
    trace!(setting = %setting.name, widget, "built setting element");
    RenderValue::Map(element)
}

impl std::fmt::Debug for LayoutSettingsForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayoutSettingsForm")
            .field("alters", &self.alters.len())
            .finish()
    }
}
