//! Test utilities for UI Patterns crates
//!
//! Shared fixtures so integration tests across the workspace describe the same
//! patterns and entity fields:
//!
//! - [`card_definition`]: the `card` pattern used throughout the scenarios
//! - [`InMemoryFieldProvider`]: a [`FieldDefinitionProvider`] backed by a map
//! - [`PatternFixtureDir`]: a temporary directory of pattern definition files
//! - [`render_map`]: build render maps from `serde_json::json!` literals
//!
//! ```no_run
//! use ui_patterns_test_utils::{card_definition, render_map};
//! use serde_json::json;
//!
//! let card = card_definition();
//! let context = render_map(json!({"type": "entity"}));
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use tempfile::TempDir;
use ui_patterns::{
    EntityFieldDefinition, FieldDefinition, FieldDefinitionProvider, LibraryDefinition,
    PatternDefinition, RenderMap, RenderValue, SettingDefinition,
};

/// The `card` pattern: `title` and `body` fields, a `theme` setting that
/// defaults to `"default"`, and the external `card/card.css` library.
pub fn card_definition() -> PatternDefinition {
    PatternDefinition::new("card")
        .with_label("Card")
        .with_library(LibraryDefinition::External("card/card.css".into()))
        .with_field(FieldDefinition::new("title", "Title"))
        .and_then(|card| card.with_field(FieldDefinition::new("body", "Body")))
        .and_then(|card| {
            card.with_setting(SettingDefinition::new("theme", "Theme").with_default("default"))
        })
        .expect("card fixture is well formed")
}

/// YAML for a document declaring `card` and `hero`, as a module would ship it.
pub const PATTERNS_YAML: &str = r#"
card:
  label: Card
  fields:
    title:
      type: text
      label: Title
    body:
      type: text
      label: Body
  settings:
    theme:
      type: select
      label: Theme
      default_value: default
      options:
        default: Default
        dark: Dark
  libraries:
    - card/card.css
hero:
  label: Hero
  use: "@my_theme/hero.html.twig"
  fields:
    image: Image
    heading: Heading
"#;

/// Build a [`RenderMap`] from a JSON object literal.
///
/// Panics when `value` is not an object.
pub fn render_map(value: serde_json::Value) -> RenderMap {
    match RenderValue::from(value) {
        RenderValue::Map(map) => map,
        other => panic!("expected a JSON object, got {}", other.kind()),
    }
}

/// Entity field definitions keyed by `(entity_type, bundle)`.
#[derive(Debug, Default, Clone)]
pub struct InMemoryFieldProvider {
    bundles: IndexMap<(String, String), IndexMap<String, EntityFieldDefinition>>,
}

impl InMemoryFieldProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a field on a bundle.
    pub fn with_field(
        mut self,
        entity_type: &str,
        bundle: &str,
        name: &str,
        definition: EntityFieldDefinition,
    ) -> Self {
        self.bundles
            .entry((entity_type.to_string(), bundle.to_string()))
            .or_default()
            .insert(name.to_string(), definition);
        self
    }

    /// `node/article` with a single-column `title` and a two-column `body`.
    pub fn article() -> Self {
        Self::new()
            .with_field(
                "node",
                "article",
                "title",
                EntityFieldDefinition::new("Title").with_column("value"),
            )
            .with_field(
                "node",
                "article",
                "body",
                EntityFieldDefinition::new("Body")
                    .with_column("value")
                    .with_column("summary"),
            )
    }
}

impl FieldDefinitionProvider for InMemoryFieldProvider {
    fn field_definitions(
        &self,
        entity_type: &str,
        bundle: &str,
    ) -> IndexMap<String, EntityFieldDefinition> {
        self.bundles
            .get(&(entity_type.to_string(), bundle.to_string()))
            .cloned()
            .unwrap_or_default()
    }
}

/// A temporary directory holding pattern definition files.
///
/// Removed on drop.
pub struct PatternFixtureDir {
    temp_dir: TempDir,
}

impl PatternFixtureDir {
    pub fn new() -> std::io::Result<Self> {
        Ok(Self {
            temp_dir: TempDir::new()?,
        })
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Write `contents` to `relative` inside the directory, creating parents.
    pub fn write(&self, relative: &str, contents: &str) -> std::io::Result<PathBuf> {
        let path = self.temp_dir.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, contents)?;
        Ok(path)
    }
}
