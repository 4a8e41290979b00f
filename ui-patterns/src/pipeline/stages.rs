//! The seven element pipeline stages.
//!
//! Each stage takes the element by value and returns it; a stage only touches
//! the properties it is responsible for.

use std::mem;

use tracing::{debug, trace, warn};

use crate::attributes::Attributes;
use crate::context::{PatternContext, ENTITY_PROPERTY, FIELD_PROPERTY, PATTERN_PROPERTY};
use crate::element::{ElementContext, FieldSlot, RenderElement};
use crate::pipeline::StageInput;
use crate::value::{RenderMap, RenderValue};

/// Stage 1: wrap the raw context into a [`PatternContext`].
///
/// A raw context without a non-empty `type` becomes the empty context. An
/// already resolved context is kept.
pub fn process_context(mut element: RenderElement, _input: &StageInput<'_>) -> RenderElement {
    let context = match mem::take(&mut element.context) {
        ElementContext::Raw(raw) => PatternContext::from_raw(raw),
        ElementContext::Resolved(context) => context,
        ElementContext::None => PatternContext::empty(),
    };
    trace!(context_type = context.context_type(), "resolved context");
    element.context = ElementContext::Resolved(context);
    element
}

/// Stage 2: theme hook, attribute object, and removal of the type marker.
pub fn process_render_array(mut element: RenderElement, input: &StageInput<'_>) -> RenderElement {
    element.theme = Some(input.definition.theme_hook());

    let attributes = match element.attributes.take() {
        Some(RenderValue::Map(map)) => Attributes::from(map),
        Some(RenderValue::Attributes(attributes)) => attributes,
        _ => Attributes::new(),
    };
    element.attributes = Some(RenderValue::Attributes(attributes));

    element.element_type = None;
    element
}

/// Stage 3: append the definition's libraries, duplicates included.
pub fn process_libraries(mut element: RenderElement, input: &StageInput<'_>) -> RenderElement {
    element
        .attached
        .library
        .extend(input.definition.libraries_names());
    element
}

/// Stage 4: resolve multi-source field slots.
///
/// Only runs for elements that opted into multiple sources. The first source
/// of a slot is its output; a slot with several sources is wrapped in a
/// destination node whose context names the pattern and the slot.
pub fn process_multiple_sources(mut element: RenderElement, input: &StageInput<'_>) -> RenderElement {
    if element.fields.is_empty() || !element.multiple_sources {
        return element;
    }

    let base_context = match &element.context {
        ElementContext::Resolved(context) => context.clone(),
        _ => PatternContext::empty(),
    };
    let pattern_id = input.definition.id();

    for (name, slot) in element.fields.iter_mut() {
        let FieldSlot::Sources(sources) = slot else {
            continue;
        };
        let resolved = match sources.len() {
            0 => continue,
            1 => sources.remove(0),
            count => {
                debug!(pattern = pattern_id, field = %name, count, "wrapping multiple sources");
                let mut context = base_context.clone();
                context.set_property(PATTERN_PROPERTY, pattern_id);
                context.set_property(FIELD_PROPERTY, name.as_str());
                let destination = RenderElement {
                    theme: Some(input.config.destination_theme_hook.clone()),
                    sources: Some(mem::take(sources)),
                    context: ElementContext::Resolved(context),
                    ..RenderElement::default()
                };
                RenderValue::from(destination)
            }
        };
        *slot = FieldSlot::Resolved(resolved);
    }
    element
}

/// Stage 5: promote field slots to output properties.
///
/// With an empty `fields` bag, declared field slots are offered to the slot
/// fallback instead; when that yields nothing the element renders as empty
/// markup.
pub fn process_fields(mut element: RenderElement, input: &StageInput<'_>) -> RenderElement {
    if !element.fields.is_empty() {
        for (name, slot) in mem::take(&mut element.fields) {
            element.outputs.insert(name, slot.into_output());
        }
        return element;
    }

    let mut populated = false;
    for slot in input.definition.fields().keys() {
        if let Some(value) = input.fallback.take_slot(&mut element, slot) {
            trace!(field = %slot, "promoted fallback slot content");
            element.outputs.insert(slot.clone(), value);
            populated = true;
        }
    }

    if !populated {
        debug!(
            pattern = input.definition.id(),
            "no field content, rendering empty markup"
        );
        element.markup = Some(input.config.empty_markup.clone());
    }
    element
}

/// Stage 6: resolve settings and merge them into the output properties.
///
/// Raw settings are always consumed. A caller-supplied output wins over the
/// computed setting: attribute sets and keyed collections (a list counts as
/// keyed by index) are merged with the caller's entries winning, two lists are
/// concatenated, and any other combination keeps the caller's value.
pub fn process_settings(mut element: RenderElement, input: &StageInput<'_>) -> RenderElement {
    let raw = mem::take(&mut element.settings);
    let definition = input.definition;
    if !definition.has_settings() {
        if !raw.is_empty() {
            debug!(
                pattern = definition.id(),
                "pattern declares no settings, ignoring supplied settings"
            );
        }
        return element;
    }

    let entity = match &element.context {
        ElementContext::Resolved(context) => context.property(ENTITY_PROPERTY),
        _ => None,
    };
    let resolved = input.settings.preprocess(definition, &raw, entity);

    for (name, computed) in resolved {
        let value = match element.outputs.get(&name) {
            Some(existing) if !existing.is_null() => match merge_setting(existing, &computed) {
                Some(merged) => merged,
                None => {
                    if input.config.warn_on_dropped_settings {
                        warn!(
                            pattern = definition.id(),
                            setting = %name,
                            existing = existing.kind(),
                            computed = computed.kind(),
                            "setting dropped: caller value kept"
                        );
                    } else {
                        debug!(pattern = definition.id(), setting = %name, "setting dropped");
                    }
                    continue;
                }
            },
            _ => computed,
        };
        element.outputs.insert(name, value);
    }
    element
}

/// Merge a computed setting under a caller-supplied value.
///
/// A list merged with a keyed collection is keyed by item index. Returns
/// `None` when the two cannot be merged.
fn merge_setting(existing: &RenderValue, computed: &RenderValue) -> Option<RenderValue> {
    match (existing, computed) {
        (RenderValue::Attributes(existing), RenderValue::Attributes(computed)) => {
            Some(RenderValue::Attributes(computed.merge_under(existing)))
        }
        (RenderValue::List(existing), RenderValue::List(computed)) => Some(RenderValue::List(
            existing.iter().chain(computed).cloned().collect(),
        )),
        (RenderValue::Map(_) | RenderValue::List(_), RenderValue::Map(_) | RenderValue::List(_)) => {
            let mut merged = keyed(existing)?;
            for (key, value) in keyed(computed)? {
                merged.entry(key).or_insert(value);
            }
            Some(RenderValue::Map(merged))
        }
        _ => None,
    }
}

fn keyed(value: &RenderValue) -> Option<RenderMap> {
    match value {
        RenderValue::Map(map) => Some(map.clone()),
        RenderValue::List(items) => Some(
            items
                .iter()
                .enumerate()
                .map(|(index, item)| (index.to_string(), item.clone()))
                .collect(),
        ),
        _ => None,
    }
}

/// Stage 7: expose the definition's template override.
pub fn process_use(mut element: RenderElement, input: &StageInput<'_>) -> RenderElement {
    if let Some(template) = input.definition.use_template() {
        element.use_template = Some(template.to_string());
    }
    element
}
