//! Logging helpers.

use serde::Serialize;
use std::fmt::Debug;

/// Wrapper for printing render elements and definitions in logs as YAML
///
/// ```ignore
/// use ui_patterns::Pretty;
/// use tracing::trace;
///
/// trace!("resolved element: {}", Pretty(&element));
/// ```
///
/// Falls back to the `Debug` form if YAML serialization fails.
pub struct Pretty<T>(pub T);

impl<T: Serialize + Debug> std::fmt::Display for Pretty<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match serde_yaml_ng::to_string(&self.0) {
            Ok(yaml) => write!(f, "\n{}", yaml),
            Err(_) => write!(f, "\n{:#?}", self.0),
        }
    }
}

impl<T: Serialize + Debug> std::fmt::Debug for Pretty<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(self, f)
    }
}
