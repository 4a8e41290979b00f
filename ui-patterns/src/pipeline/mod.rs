//! The element pipeline: turns a raw pattern render element into a render
//! tree the template engine can consume.
//!
//! Every element runs through the same seven stages, in this order:
//!
//! 1. context resolution
//! 2. base render array (theme hook, attributes, type marker)
//! 3. library attachment
//! 4. multi-source fan-out
//! 5. field placement
//! 6. settings resolution
//! 7. template `use` override
//!
//! Stages are plain functions over an owned [`RenderElement`]. The pattern
//! definition is looked up once, before the first stage; a missing definition
//! is the only failure a render can report.

pub mod stages;

use std::sync::Arc;

use tracing::{debug, trace};

use crate::config::PatternsConfig;
use crate::definition::PatternDefinition;
use crate::element::RenderElement;
use crate::error::{PatternsError, Result};
use crate::logging::Pretty;
use crate::registry::PatternRegistry;
use crate::settings::SettingsPreprocessor;
use crate::value::{RenderMap, RenderValue};

/// Everything a stage may consult besides the element itself.
pub struct StageInput<'a> {
    pub definition: &'a PatternDefinition,
    pub settings: &'a SettingsPreprocessor,
    pub config: &'a PatternsConfig,
    pub fallback: &'a dyn SlotFallback,
}

/// One pipeline stage.
pub type Stage = for<'a, 'b> fn(RenderElement, &'a StageInput<'b>) -> RenderElement;

/// The stages, in execution order.
pub const STAGES: [(&str, Stage); 7] = [
    ("context", stages::process_context),
    ("render_array", stages::process_render_array),
    ("libraries", stages::process_libraries),
    ("multiple_sources", stages::process_multiple_sources),
    ("fields", stages::process_fields),
    ("settings", stages::process_settings),
    ("use", stages::process_use),
];

/// Supplies field content for renders whose `fields` bag is empty.
///
/// Layout systems put region content straight onto the element instead of
/// into `fields`; the field placement stage asks this extension point for
/// each declared field slot.
pub trait SlotFallback: Send + Sync {
    /// Remove and return the content for `slot`, if the element carries any.
    fn take_slot(&self, element: &mut RenderElement, slot: &str) -> Option<RenderValue>;
}

/// Takes slot content from top-level (non-`#`) properties of the element.
#[derive(Debug, Default, Clone, Copy)]
pub struct TopLevelSlotFallback;

impl SlotFallback for TopLevelSlotFallback {
    fn take_slot(&self, element: &mut RenderElement, slot: &str) -> Option<RenderValue> {
        match element.extra.get(slot) {
            Some(value) if !value.is_null() => element.extra.shift_remove(slot),
            _ => None,
        }
    }
}

/// Runs render elements through the stages against a shared registry.
#[derive(Clone)]
pub struct ElementPipeline {
    registry: Arc<PatternRegistry>,
    settings: Arc<SettingsPreprocessor>,
    config: PatternsConfig,
    fallback: Arc<dyn SlotFallback>,
}

impl ElementPipeline {
    pub fn new(registry: Arc<PatternRegistry>) -> Self {
        Self {
            registry,
            settings: Arc::new(SettingsPreprocessor::new()),
            config: PatternsConfig::default(),
            fallback: Arc::new(TopLevelSlotFallback),
        }
    }

    pub fn with_settings(mut self, settings: Arc<SettingsPreprocessor>) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_config(mut self, config: PatternsConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_slot_fallback(mut self, fallback: impl SlotFallback + 'static) -> Self {
        self.fallback = Arc::new(fallback);
        self
    }

    pub fn registry(&self) -> &Arc<PatternRegistry> {
        &self.registry
    }

    pub fn config(&self) -> &PatternsConfig {
        &self.config
    }

    /// Run all stages over `element`.
    pub fn process(&self, element: RenderElement) -> Result<RenderElement> {
        let id = element
            .id
            .clone()
            .ok_or(PatternsError::MissingPatternId)?;
        let definition = self.registry.get(&id)?;
        debug!(pattern = %id, "processing pattern element");

        let input = StageInput {
            definition: &definition,
            settings: &self.settings,
            config: &self.config,
            fallback: self.fallback.as_ref(),
        };
        let element = STAGES.iter().fold(element, |element, (name, stage)| {
            trace!(pattern = %id, stage = name, "applying stage");
            stage(element, &input)
        });

        trace!(pattern = %id, "resolved element: {}", Pretty(&element));
        Ok(element)
    }

    /// Read a render array and run it through the stages.
    pub fn process_render_array(&self, array: RenderMap) -> Result<RenderElement> {
        self.process(RenderElement::from_render_array(array))
    }
}

impl std::fmt::Debug for ElementPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElementPipeline")
            .field("registry", &self.registry)
            .field("settings", &self.settings)
            .field("config", &self.config)
            .finish()
    }
}
