//! Editor configuration.
//!
//! Hosts either build an [`EditorConfig`] directly or deserialize one from
//! JSON; every field has a default so partial documents are accepted.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// How `merge_cells` treats a selection that does not fill its bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MergePolicy {
    /// Reject the merge.
    #[default]
    Strict,
    /// Merge the whole bounding box, covering unselected cells inside it.
    BoundingBox,
}

/// Tunables for the merge engine and the sync surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EditorConfig {
    pub merge_policy: MergePolicy,
    /// Reject merges that intersect an existing merge rectangle.
    pub reject_overlapping_merges: bool,
    /// Quiescence window before a keystroke edit is committed.
    pub debounce_ms: u64,
    /// Header label used by `add_column`.
    pub default_header_label: String,
    pub seed_columns: usize,
    pub seed_rows: usize,
    /// Color given to links that carry no explicit style.
    pub link_color: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            merge_policy: MergePolicy::Strict,
            reject_overlapping_merges: true,
            debounce_ms: 100,
            default_header_label: "Nouvelle colonne".to_string(),
            seed_columns: 3,
            seed_rows: 2,
            link_color: "#2563eb".to_string(),
        }
    }
}

impl EditorConfig {
    /// Parse a (possibly partial) JSON configuration.
    ///
    /// # Errors
    /// Returns an error if the JSON is malformed or a field has the wrong type.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Inline style applied to links lacking one.
    pub fn link_style(&self) -> String {
        format!("color: {}; text-decoration: underline;", self.link_color)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = EditorConfig::from_json(r#"{"debounceMs": 250, "mergePolicy": "boundingBox"}"#)
            .unwrap();
        assert_eq!(config.debounce_ms, 250);
        assert_eq!(config.merge_policy, MergePolicy::BoundingBox);
        assert!(config.reject_overlapping_merges);
        assert_eq!(config.default_header_label, "Nouvelle colonne");
    }

    #[test]
    fn test_link_style() {
        let config = EditorConfig::default();
        assert_eq!(
            config.link_style(),
            "color: #2563eb; text-decoration: underline;"
        );
    }
}
