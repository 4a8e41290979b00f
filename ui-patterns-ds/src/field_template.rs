//! The `ds_field_template` source plugin.

use std::sync::Arc;

use tracing::{debug, trace};
use ui_patterns::{
    FieldDefinitionProvider, PatternContext, PatternSource, SourceField, SourcePluginDefinition,
    SourceRegistry,
};

pub const PLUGIN_ID: &str = "ds_field_template";
pub const PLUGIN_LABEL: &str = "Field template";
pub const PLUGIN_PROVIDER: &str = "ds";

/// Context properties read by the plugin.
pub const FIELD_NAME_PROPERTY: &str = "field_name";
pub const ENTITY_TYPE_PROPERTY: &str = "entity_type";
pub const BUNDLE_PROPERTY: &str = "bundle";

/// Column sources are keyed `{field}__{column}`.
const COLUMN_SEPARATOR: &str = "__";

/// Lists a field template's entity field, then one source per storage column.
pub struct DsFieldTemplateSource {
    definition: SourcePluginDefinition,
    fields: Arc<dyn FieldDefinitionProvider>,
}

impl DsFieldTemplateSource {
    pub fn new(fields: Arc<dyn FieldDefinitionProvider>) -> Self {
        Self {
            definition: plugin_definition(),
            fields,
        }
    }
}

impl PatternSource for DsFieldTemplateSource {
    fn definition(&self) -> &SourcePluginDefinition {
        &self.definition
    }

    fn source_fields(&self, context: &PatternContext) -> Vec<SourceField> {
        let (Some(field_name), Some(entity_type), Some(bundle)) = (
            context.property_str(FIELD_NAME_PROPERTY),
            context.property_str(ENTITY_TYPE_PROPERTY),
            context.property_str(BUNDLE_PROPERTY),
        ) else {
            trace!(context_type = context.context_type(), "incomplete field template context");
            return Vec::new();
        };

        let definitions = self.fields.field_definitions(&entity_type, &bundle);
        let Some(field) = definitions.get(&field_name) else {
            debug!(%entity_type, %bundle, field = %field_name, "field not found on bundle");
            return Vec::new();
        };

        let mut sources = Vec::with_capacity(field.columns.len() + 1);
        sources.push(self.source_field(field_name.clone(), field.label.clone()));
        for column in &field.columns {
            sources.push(self.source_field(
                format!("{field_name}{COLUMN_SEPARATOR}{column}"),
                format!("{}: {column}", field.label),
            ));
        }
        sources
    }
}

fn plugin_definition() -> SourcePluginDefinition {
    SourcePluginDefinition {
        id: PLUGIN_ID.to_string(),
        label: PLUGIN_LABEL.to_string(),
        provider: Some(PLUGIN_PROVIDER.to_string()),
        tags: vec![PLUGIN_ID.to_string()],
    }
}

/// Register the plugin, injecting `fields` into every instance.
pub fn register(registry: &mut SourceRegistry, fields: Arc<dyn FieldDefinitionProvider>) {
    registry.register(plugin_definition(), move || {
        Box::new(DsFieldTemplateSource::new(Arc::clone(&fields)))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;
    use ui_patterns::{EntityFieldDefinition, RenderMap};

    struct OneField;

    impl FieldDefinitionProvider for OneField {
        fn field_definitions(
            &self,
            entity_type: &str,
            bundle: &str,
        ) -> IndexMap<String, EntityFieldDefinition> {
            let mut fields = IndexMap::new();
            if (entity_type, bundle) == ("node", "page") {
                fields.insert(
                    "field_link".to_string(),
                    EntityFieldDefinition::new("Link")
                        .with_column("uri")
                        .with_column("title")
                        .with_column("options"),
                );
            }
            fields
        }
    }

    fn context(field_name: &str) -> PatternContext {
        let mut properties = RenderMap::new();
        properties.insert(FIELD_NAME_PROPERTY.into(), field_name.into());
        properties.insert(ENTITY_TYPE_PROPERTY.into(), "node".into());
        properties.insert(BUNDLE_PROPERTY.into(), "page".into());
        PatternContext::new("ds_field_template", properties)
    }

    #[test]
    fn whole_field_then_columns_in_storage_order() {
        let source = DsFieldTemplateSource::new(Arc::new(OneField));

        let fields = source.source_fields(&context("field_link"));

        let pairs: Vec<_> = fields
            .iter()
            .map(|f| (f.name.as_str(), f.label.as_str()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("field_link", "Link"),
                ("field_link__uri", "Link: uri"),
                ("field_link__title", "Link: title"),
                ("field_link__options", "Link: options"),
            ]
        );
        assert!(fields.iter().all(|f| f.plugin == PLUGIN_ID));
        assert!(fields.iter().all(|f| f.plugin_label == PLUGIN_LABEL));
    }

    #[test]
    fn unknown_field_yields_no_sources() {
        let source = DsFieldTemplateSource::new(Arc::new(OneField));
        assert!(source.source_fields(&context("field_missing")).is_empty());
    }

    #[test]
    fn empty_context_yields_no_sources() {
        let source = DsFieldTemplateSource::new(Arc::new(OneField));
        assert!(source.source_fields(&PatternContext::empty()).is_empty());
    }

    #[test]
    fn definition_is_tagged_for_field_templates() {
        let definition = plugin_definition();
        assert_eq!(definition.provider.as_deref(), Some("ds"));
        assert!(definition.has_tag("ds_field_template"));
    }
}
