//! Pattern source plugins: enumerating the data sources a slot may use.
//!
//! A source plugin inspects a [`PatternContext`] and lists the
//! [`SourceField`]s that may be mapped onto a pattern's field slots. Plugins
//! are registered explicitly on a [`SourceRegistry`] as factories; nothing is
//! discovered at runtime. Source listing feeds mapping UIs and performs no
//! rendering.

use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::context::PatternContext;
use crate::error::{PatternsError, Result};

/// Static description of a source plugin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourcePluginDefinition {
    pub id: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl SourcePluginDefinition {
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

/// One data source that can fill a field slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceField {
    pub name: String,
    pub label: String,
    pub plugin: String,
    pub plugin_label: String,
}

impl SourceField {
    /// Machine name unique across plugins: `{plugin}:{name}`.
    pub fn field_key(&self) -> String {
        format!("{}:{}", self.plugin, self.name)
    }
}

/// A source plugin instance.
pub trait PatternSource: Send + Sync {
    fn definition(&self) -> &SourcePluginDefinition;

    /// Sources available under `context`. An empty list is a valid answer.
    fn source_fields(&self, context: &PatternContext) -> Vec<SourceField>;

    /// Build a source entry owned by this plugin.
    fn source_field(&self, name: String, label: String) -> SourceField {
        let definition = self.definition();
        SourceField {
            name,
            label,
            plugin: definition.id.clone(),
            plugin_label: definition.label.clone(),
        }
    }
}

/// Storage-level description of an entity field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityFieldDefinition {
    pub label: String,
    /// Storage column names, in storage order.
    #[serde(default)]
    pub columns: Vec<String>,
}

impl EntityFieldDefinition {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            columns: Vec::new(),
        }
    }

    pub fn with_column(mut self, column: impl Into<String>) -> Self {
        self.columns.push(column.into());
        self
    }
}

/// Read-only access to the host's entity field definitions.
pub trait FieldDefinitionProvider: Send + Sync {
    fn field_definitions(
        &self,
        entity_type: &str,
        bundle: &str,
    ) -> IndexMap<String, EntityFieldDefinition>;
}

/// Creates a plugin instance.
pub type SourceFactory = Arc<dyn Fn() -> Box<dyn PatternSource> + Send + Sync>;

/// Explicit registry of source plugins, keyed by plugin id.
#[derive(Default, Clone)]
pub struct SourceRegistry {
    plugins: IndexMap<String, (SourcePluginDefinition, SourceFactory)>,
}

impl SourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&mut self, definition: SourcePluginDefinition, factory: F) -> &mut Self
    where
        F: Fn() -> Box<dyn PatternSource> + Send + Sync + 'static,
    {
        debug!(plugin = %definition.id, "registered pattern source");
        self.plugins
            .insert(definition.id.clone(), (definition, Arc::new(factory)));
        self
    }

    pub fn definition(&self, id: &str) -> Option<&SourcePluginDefinition> {
        self.plugins.get(id).map(|(definition, _)| definition)
    }

    pub fn definitions(&self) -> impl Iterator<Item = &SourcePluginDefinition> {
        self.plugins.values().map(|(definition, _)| definition)
    }

    /// Plugin definitions carrying `tag`, in registration order.
    pub fn definitions_by_tag<'a>(
        &'a self,
        tag: &'a str,
    ) -> impl Iterator<Item = &'a SourcePluginDefinition> + 'a {
        self.definitions().filter(move |d| d.has_tag(tag))
    }

    pub fn create(&self, id: &str) -> Result<Box<dyn PatternSource>> {
        self.plugins
            .get(id)
            .map(|(_, factory)| factory())
            .ok_or_else(|| PatternsError::SourceNotFound { id: id.to_string() })
    }

    /// Sources of every plugin carrying `tag`, plugin by plugin.
    pub fn source_fields_by_tag(&self, tag: &str, context: &PatternContext) -> Vec<SourceField> {
        self.plugins
            .values()
            .filter(|(definition, _)| definition.has_tag(tag))
            .flat_map(|(_, factory)| factory().source_fields(context))
            .collect()
    }
}

impl std::fmt::Debug for SourceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceRegistry")
            .field("plugins", &self.plugins.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StaticSource {
        definition: SourcePluginDefinition,
        names: Vec<&'static str>,
    }

    impl PatternSource for StaticSource {
        fn definition(&self) -> &SourcePluginDefinition {
            &self.definition
        }

        fn source_fields(&self, _context: &PatternContext) -> Vec<SourceField> {
            self.names
                .iter()
                .map(|n| self.source_field(n.to_string(), n.to_uppercase()))
                .collect()
        }
    }

    fn plugin(id: &str, tags: &[&str]) -> SourcePluginDefinition {
        SourcePluginDefinition {
            id: id.to_string(),
            label: format!("{id} label"),
            provider: None,
            tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }

    fn registry() -> SourceRegistry {
        let mut registry = SourceRegistry::new();
        let a = plugin("a", &["entity_display"]);
        let b = plugin("b", &["views_row"]);
        let c = plugin("c", &["entity_display"]);
        registry
            .register(a.clone(), move || {
                Box::new(StaticSource {
                    definition: a.clone(),
                    names: vec!["x", "y"],
                })
            })
            .register(b.clone(), move || {
                Box::new(StaticSource {
                    definition: b.clone(),
                    names: vec!["z"],
                })
            })
            .register(c.clone(), move || {
                Box::new(StaticSource {
                    definition: c.clone(),
                    names: vec!["w"],
                })
            });
        registry
    }

    #[test]
    fn unknown_plugin_is_an_error() {
        assert!(matches!(
            registry().create("missing"),
            Err(PatternsError::SourceNotFound { .. })
        ));
    }

    #[test]
    fn created_plugins_stamp_their_id() {
        let source = registry().create("a").unwrap();
        let fields = source.source_fields(&PatternContext::empty());
        assert_eq!(fields[0].plugin, "a");
        assert_eq!(fields[0].plugin_label, "a label");
        assert_eq!(fields[0].field_key(), "a:x");
    }

    #[test]
    fn sources_by_tag_follow_registration_order() {
        let registry = registry();
        let ids: Vec<_> = registry
            .definitions_by_tag("entity_display")
            .map(|d| d.id.as_str())
            .collect();
        assert_eq!(ids, vec!["a", "c"]);

        let names: Vec<_> = registry
            .source_fields_by_tag("entity_display", &PatternContext::empty())
            .into_iter()
            .map(|f| f.field_key())
            .collect();
        assert_eq!(names, vec!["a:x", "a:y", "c:w"]);
    }
}
