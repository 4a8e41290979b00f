//! Pattern definitions and the render-time element pipeline
//!
//! `ui-patterns` owns the definition model for reusable UI patterns (fields,
//! settings, libraries, template overrides) and the pipeline that turns a
//! pattern render element into something a template engine can consume.
//!
//! # Architecture
//!
//! - **Definitions**: [`PatternDefinition`] values, built in code or read from YAML
//! - **Registry**: [`PatternRegistry`] is shared read-mostly across renders
//! - **Pipeline**: [`ElementPipeline`] runs seven fixed stages per element
//! - **Sources**: [`SourceRegistry`] lists the data sources a slot may be mapped to
//! - **Extension points**: settings hooks and the slot fallback are registered explicitly

pub mod attributes;
pub mod config;
pub mod context;
pub mod definition;
pub mod element;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod registry;
pub mod settings;
pub mod source;
pub mod value;

pub use attributes::Attributes;
pub use config::PatternsConfig;
pub use context::PatternContext;
pub use definition::{
    definitions_from_yaml, FieldDefinition, LibraryDefinition, PatternDefinition,
    PatternDocument, SettingDefinition, SlotDocument, SlotSpec,
};
pub use element::{Attached, ElementContext, FieldSlot, RenderElement};
pub use error::{PatternsError, Result};
pub use logging::Pretty;
pub use pipeline::{ElementPipeline, SlotFallback, TopLevelSlotFallback};
pub use registry::PatternRegistry;
pub use settings::{SettingsHook, SettingsPreprocessor};
pub use source::{
    EntityFieldDefinition, FieldDefinitionProvider, PatternSource, SourceField,
    SourcePluginDefinition, SourceRegistry,
};
pub use value::{RenderMap, RenderValue};
