//! PatternRegistry: the shared, read-mostly store of pattern definitions.
//!
//! Definitions are registered explicitly, either built up front or as a
//! factory that runs on first lookup. Built definitions are cached as `Arc`s
//! and handed out to any number of concurrent renders.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use dashmap::DashMap;
use tracing::{debug, warn};

use crate::definition::{definitions_from_yaml, PatternDefinition};
use crate::error::{PatternsError, Result};

/// Builds a definition on first lookup.
pub type DefinitionFactory = Arc<dyn Fn() -> Result<PatternDefinition> + Send + Sync>;

/// Registry of pattern definitions keyed by pattern id.
#[derive(Default)]
pub struct PatternRegistry {
    definitions: DashMap<String, Arc<PatternDefinition>>,
    factories: DashMap<String, DefinitionFactory>,
}

impl PatternRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a built definition, replacing any previous one with that id.
    pub fn register(&self, definition: PatternDefinition) -> Arc<PatternDefinition> {
        let id = definition.id().to_string();
        let definition = Arc::new(definition);
        self.factories.remove(&id);
        if self
            .definitions
            .insert(id.clone(), Arc::clone(&definition))
            .is_some()
        {
            warn!(pattern = %id, "pattern definition replaced");
        } else {
            debug!(pattern = %id, "registered pattern definition");
        }
        definition
    }

    /// Register a factory; it runs on the first `get` for `id`.
    pub fn register_factory<F>(&self, id: impl Into<String>, factory: F)
    where
        F: Fn() -> Result<PatternDefinition> + Send + Sync + 'static,
    {
        let id = id.into();
        self.definitions.remove(&id);
        debug!(pattern = %id, "registered pattern factory");
        self.factories.insert(id, Arc::new(factory));
    }

    /// Register every pattern of a multi-pattern YAML document.
    ///
    /// Nothing is registered if any entry fails to parse.
    pub fn register_yaml(
        &self,
        yaml: &str,
        provider: Option<&str>,
        file_name: Option<&str>,
    ) -> Result<usize> {
        let definitions = definitions_from_yaml(yaml, provider, file_name)?;
        let count = definitions.len();
        for definition in definitions {
            self.register(definition);
        }
        debug!(count, ?file_name, "registered patterns from document");
        Ok(count)
    }

    /// Register every pattern of a `*.ui_patterns.yml` file.
    ///
    /// The file's path is stamped as each definition's file name.
    pub fn register_file(&self, path: impl AsRef<Path>, provider: Option<&str>) -> Result<usize> {
        let path = path.as_ref();
        let yaml = fs::read_to_string(path).map_err(|source| PatternsError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let file_name = path.to_string_lossy();
        self.register_yaml(&yaml, provider, Some(&*file_name))
    }

    /// Look up a definition, building it from its factory if needed.
    pub fn get(&self, id: &str) -> Result<Arc<PatternDefinition>> {
        if let Some(definition) = self.definitions.get(id) {
            return Ok(Arc::clone(definition.value()));
        }

        let factory = self
            .factories
            .get(id)
            .map(|factory| Arc::clone(factory.value()))
            .ok_or_else(|| PatternsError::PatternNotFound { id: id.to_string() })?;

        let definition = factory()?;
        if definition.id() != id {
            return Err(PatternsError::InvalidDefinition {
                message: format!(
                    "factory for '{id}' produced pattern '{}'",
                    definition.id()
                ),
            });
        }
        debug!(pattern = %id, "built pattern definition from factory");

        let cached = self
            .definitions
            .entry(id.to_string())
            .or_insert_with(|| Arc::new(definition));
        Ok(Arc::clone(cached.value()))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.definitions.contains_key(id) || self.factories.contains_key(id)
    }

    /// All known pattern ids, sorted.
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .definitions
            .iter()
            .map(|entry| entry.key().clone())
            .chain(self.factories.iter().map(|entry| entry.key().clone()))
            .collect();
        ids.sort();
        ids.dedup();
        ids
    }

    /// Definitions carrying `tag`, in id order. Pending factories are built.
    pub fn definitions_by_tag(&self, tag: &str) -> Result<Vec<Arc<PatternDefinition>>> {
        let mut tagged = Vec::new();
        for id in self.ids() {
            let definition = self.get(&id)?;
            if definition.has_tag(tag) {
                tagged.push(definition);
            }
        }
        Ok(tagged)
    }

    pub fn len(&self) -> usize {
        self.ids().len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty() && self.factories.is_empty()
    }
}

impl std::fmt::Debug for PatternRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PatternRegistry")
            .field("ids", &self.ids())
            .finish()
    }
}
