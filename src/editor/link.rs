//! Link dialog lifecycle.
//!
//! Opening the dialog captures the region's selection into a [`LinkDraft`].
//! The host shows its modal, lets the user edit `url`/`new_tab`, and hands
//! the draft back to `apply_link` or `remove_link`. Whatever happened to the
//! live selection in the meantime, the captured range is what gets linked.

use serde::Serialize;

use super::surface::RegionId;
use crate::error::GridsyncError;
use crate::rich_text::TextRange;

/// State of an open link dialog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkDraft {
    #[serde(skip)]
    pub region: RegionId,
    /// Selection captured when the dialog opened.
    pub range: TextRange,
    pub url: String,
    pub new_tab: bool,
    /// True when the range sits inside an existing link.
    pub existing: bool,
}

impl LinkDraft {
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn with_new_tab(mut self, new_tab: bool) -> Self {
        self.new_tab = new_tab;
        self
    }
}

/// Guidance shown instead of performing an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Prompt {
    SelectTextFirst,
}

impl Prompt {
    pub fn message(self) -> &'static str {
        match self {
            Self::SelectTextFirst => "Veuillez sélectionner du texte avant d'ajouter un lien",
        }
    }

    /// Prompt matching an error, if the error is user guidance rather than
    /// a fault.
    pub fn for_error(error: &GridsyncError) -> Option<Self> {
        match error {
            GridsyncError::CollapsedSelection => Some(Self::SelectTextFirst),
            _ => None,
        }
    }
}
