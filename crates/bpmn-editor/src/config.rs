//! Modeler configuration.

use serde::Deserialize;

use crate::error::ModelingError;

// ─── Config ───────────────────────────────────────────────────────────────

/// Tunables of a [`Modeler`](crate::Modeler).
///
/// Every field has a default, so a partial JSON document is enough to
/// override a single value.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ModelerConfig {
    /// Transactions kept on the undo stack. Oldest are dropped first.
    pub max_undo_depth: usize,

    /// Priority of interceptors registered without one.
    pub default_priority: i32,

    /// Offset of lanes from the participant header: along x in horizontal
    /// pools, along y in vertical ones.
    pub lane_indentation: f64,

    /// Thickness of a lane created by `lane.add`: its height in a
    /// horizontal pool, its width in a vertical one.
    pub lane_height: f64,

    /// Gap between an element and its adaptively positioned label.
    pub label_distance: f64,

    /// Size of a freshly created external label.
    pub external_label_width: f64,
    pub external_label_height: f64,

    /// Revert already executed actions when a command fails midway.
    /// Default: **true**.
    pub rollback_on_error: bool,
}

impl Default for ModelerConfig {
    fn default() -> Self {
        Self {
            max_undo_depth: 1000,
            default_priority: 1000,
            lane_indentation: 30.0,
            lane_height: 120.0,
            label_distance: 10.0,
            external_label_width: 90.0,
            external_label_height: 20.0,
            rollback_on_error: true,
        }
    }
}

impl ModelerConfig {
    /// Parse a (partial) JSON configuration.
    ///
    /// # Errors
    /// Returns [`ModelingError::InvalidArgument`] for malformed JSON.
    pub fn from_json(text: &str) -> Result<Self, ModelingError> {
        serde_json::from_str(text).map_err(|e| ModelingError::InvalidArgument(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn partial_json_keeps_defaults() {
        let config = ModelerConfig::from_json(r#"{ "maxUndoDepth": 5 }"#).unwrap();
        assert_eq!(config.max_undo_depth, 5);
        assert_eq!(config.lane_indentation, 30.0);
        assert!(config.rollback_on_error);
    }

    #[test]
    fn malformed_json_is_rejected() {
        assert!(matches!(
            ModelerConfig::from_json("{ nope"),
            Err(ModelingError::InvalidArgument(_))
        ));
    }
}
