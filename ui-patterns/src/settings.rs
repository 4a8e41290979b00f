//! Settings preprocessing: declared defaults plus per-pattern hooks.
//!
//! Hooks are registered once at startup and then shared read-only across
//! renders. A hook receives the settings computed so far and returns the
//! next version; the caller's raw settings are never mutated.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::trace;

use crate::definition::PatternDefinition;
use crate::value::{RenderMap, RenderValue};

/// A settings transform contributed by an extension.
pub trait SettingsHook: Send + Sync {
    fn preprocess(
        &self,
        settings: RenderMap,
        definition: &PatternDefinition,
        entity: Option<&RenderValue>,
    ) -> RenderMap;
}

impl<F> SettingsHook for F
where
    F: Fn(RenderMap, &PatternDefinition, Option<&RenderValue>) -> RenderMap + Send + Sync,
{
    fn preprocess(
        &self,
        settings: RenderMap,
        definition: &PatternDefinition,
        entity: Option<&RenderValue>,
    ) -> RenderMap {
        self(settings, definition, entity)
    }
}

/// Resolves the settings of one render.
#[derive(Default, Clone)]
pub struct SettingsPreprocessor {
    global_hooks: Vec<Arc<dyn SettingsHook>>,
    pattern_hooks: HashMap<String, Vec<Arc<dyn SettingsHook>>>,
}

impl SettingsPreprocessor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a hook that runs for every pattern.
    pub fn register_global_hook(&mut self, hook: impl SettingsHook + 'static) -> &mut Self {
        self.global_hooks.push(Arc::new(hook));
        self
    }

    /// Register a hook that runs only for `pattern_id`.
    pub fn register_hook(
        &mut self,
        pattern_id: impl Into<String>,
        hook: impl SettingsHook + 'static,
    ) -> &mut Self {
        self.pattern_hooks
            .entry(pattern_id.into())
            .or_default()
            .push(Arc::new(hook));
        self
    }

    pub fn has_hooks_for(&self, pattern_id: &str) -> bool {
        !self.global_hooks.is_empty()
            || self
                .pattern_hooks
                .get(pattern_id)
                .is_some_and(|hooks| !hooks.is_empty())
    }

    /// Compute the settings for one render of `definition`.
    ///
    /// Declared defaults fill settings the caller left absent or null, then
    /// global hooks run, then hooks registered for the pattern id, each in
    /// registration order.
    pub fn preprocess(
        &self,
        definition: &PatternDefinition,
        raw: &RenderMap,
        entity: Option<&RenderValue>,
    ) -> RenderMap {
        let mut settings = raw.clone();

        for (name, setting) in definition.settings() {
            let Some(default) = &setting.default_value else {
                continue;
            };
            let supplied = settings.get(name).is_some_and(|v| !v.is_null());
            if !supplied {
                settings.insert(name.clone(), default.clone());
            }
        }

        let pattern_hooks = self
            .pattern_hooks
            .get(definition.id())
            .map(Vec::as_slice)
            .unwrap_or_default();
        for hook in self.global_hooks.iter().chain(pattern_hooks) {
            settings = hook.preprocess(settings, definition, entity);
        }

        trace!(
            pattern = definition.id(),
            hooks = self.global_hooks.len() + pattern_hooks.len(),
            settings = settings.len(),
            "preprocessed settings"
        );
        settings
    }
}

impl std::fmt::Debug for SettingsPreprocessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettingsPreprocessor")
            .field("global_hooks", &self.global_hooks.len())
            .field(
                "pattern_hooks",
                &self.pattern_hooks.keys().collect::<Vec<_>>(),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::SettingDefinition;

    fn card() -> PatternDefinition {
        PatternDefinition::new("card")
            .with_setting(SettingDefinition::new("theme", "Theme").with_default("default"))
            .unwrap()
            .with_setting(SettingDefinition::new("size", "Size"))
            .unwrap()
    }

    #[test]
    fn no_defaults_no_hooks_returns_raw() {
        let definition = PatternDefinition::new("plain");
        let mut raw = RenderMap::new();
        raw.insert("anything".into(), RenderValue::from(1i64));

        let resolved = SettingsPreprocessor::new().preprocess(&definition, &raw, None);

        assert_eq!(resolved, raw);
    }

    #[test]
    fn defaults_fill_missing_and_null_settings() {
        let definition = card();
        let preprocessor = SettingsPreprocessor::new();

        let resolved = preprocessor.preprocess(&definition, &RenderMap::new(), None);
        assert_eq!(resolved["theme"], RenderValue::from("default"));
        assert!(!resolved.contains_key("size"));

        let mut raw = RenderMap::new();
        raw.insert("theme".into(), RenderValue::Null);
        let resolved = preprocessor.preprocess(&definition, &raw, None);
        assert_eq!(resolved["theme"], RenderValue::from("default"));
    }

    #[test]
    fn caller_value_beats_default() {
        let mut raw = RenderMap::new();
        raw.insert("theme".into(), RenderValue::from("dark"));

        let resolved = SettingsPreprocessor::new().preprocess(&card(), &raw, None);

        assert_eq!(resolved["theme"], RenderValue::from("dark"));
    }

    #[test]
    fn hooks_run_global_first_then_per_pattern() {
        let mut preprocessor = SettingsPreprocessor::new();
        preprocessor
            .register_hook(
                "card",
                |mut s: RenderMap, _: &PatternDefinition, _: Option<&RenderValue>| {
                    let order = s.get("order").and_then(RenderValue::as_str).unwrap_or("");
                    let order = format!("{order}pattern;");
                    s.insert("order".into(), order.into());
                    s
                },
            )
            .register_global_hook(
                |mut s: RenderMap, _: &PatternDefinition, _: Option<&RenderValue>| {
                    s.insert("order".into(), "global;".into());
                    s
                },
            );

        let resolved = preprocessor.preprocess(&card(), &RenderMap::new(), None);
        assert_eq!(resolved["order"], RenderValue::from("global;pattern;"));

        let other = PatternDefinition::new("other");
        let resolved = preprocessor.preprocess(&other, &RenderMap::new(), None);
        assert_eq!(resolved["order"], RenderValue::from("global;"));
    }

    #[test]
    fn hooks_see_the_entity() {
        let mut preprocessor = SettingsPreprocessor::new();
        preprocessor.register_hook(
            "card",
            |mut s: RenderMap, _: &PatternDefinition, entity: Option<&RenderValue>| {
                if let Some(label) = entity
                    .and_then(RenderValue::as_map)
                    .and_then(|e| e.get("label"))
                {
                    s.insert("size".into(), label.clone());
                }
                s
            },
        );
        let mut entity = RenderMap::new();
        entity.insert("label".into(), "Node 1".into());
        let entity = RenderValue::Map(entity);

        let raw = RenderMap::new();
        let resolved = preprocessor.preprocess(&card(), &raw, Some(&entity));

        assert_eq!(resolved["size"], RenderValue::from("Node 1"));
        assert!(raw.is_empty());
        assert!(preprocessor.has_hooks_for("card"));
        assert!(!preprocessor.has_hooks_for("other"));
    }
}
