//! Display Suite integration for UI Patterns
//!
//! Provides the `ds_field_template` source plugin, which offers an entity
//! field and each of its storage columns as pattern field sources.

pub mod field_template;

pub use field_template::{
    register, DsFieldTemplateSource, BUNDLE_PROPERTY, ENTITY_TYPE_PROPERTY, FIELD_NAME_PROPERTY,
    PLUGIN_ID,
};
