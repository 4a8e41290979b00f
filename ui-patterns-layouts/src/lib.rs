//! Layout integration for UI Patterns
//!
//! Builds the pattern settings fragment of a layout configuration form and
//! lets extensions alter it through [`LayoutFormAlter`] hooks.

pub mod form;

pub use form::{LayoutFormAlter, LayoutSettingsForm, PATTERN_FIELDSET};
