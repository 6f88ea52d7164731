//! Rich-text sync surface.
//!
//! Owns the editable regions of one editor instance and keeps each one
//! consistent with the stored string it was bound to. Content flows two
//! ways:
//! - stored -> region through [`SyncSurface::bind`] and [`SyncSurface::load`],
//!   repairing corrupted content and preserving the cursor
//! - region -> stored through [`Commit`] values, produced immediately for
//!   commands, deletions and blur, or after the debounce window for typing
//!
//! The surface never touches the grid itself. Callers apply a commit between
//! [`SyncSurface::begin_commit`] and [`SyncSurface::finish_commit`]; while a
//! region is inside that window its write-backs and reloads are suppressed.

use std::collections::HashMap;
use std::fmt;

use super::debounce::Debouncer;
use super::link::LinkDraft;
use crate::config::EditorConfig;
use crate::error::{GridsyncError, Result};
use crate::format::{self, Command};
use crate::rich_text::{FontSize, Link, RichText, RunStyle, TextRange};
use crate::sanitize::{normalize_content, sanitize_stored};
use crate::types::CellCoord;

/// Stable identity of an editable region.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RegionId {
    Cell(CellCoord),
    Block(String),
}

impl RegionId {
    pub fn cell(row: usize, col: usize) -> Self {
        Self::Cell(CellCoord::new(row, col))
    }

    pub fn block(id: impl Into<String>) -> Self {
        Self::Block(id.into())
    }
}

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cell(coord) => write!(f, "cell-{}", coord.key()),
            Self::Block(id) => write!(f, "block-{id}"),
        }
    }
}

/// Content to write back to the store for one region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    pub region: RegionId,
    /// Normalized HTML: empty placeholder markup is `""`.
    pub content: String,
}

#[derive(Debug, Clone, Default)]
struct Region {
    content: RichText,
    /// Live selection, `None` until the region has been focused or clicked.
    selection: Option<TextRange>,
    focused: bool,
    initialized: bool,
    /// Set while a commit of this region is being applied.
    updating: bool,
    /// Style for the next typed text after an inline command on a caret.
    typing_style: Option<RunStyle>,
}

impl Region {
    fn caret_at_end(&self) -> TextRange {
        TextRange::caret(self.content.len())
    }

    /// Selection to operate on, falling back to a caret at the end.
    fn working_range(&self) -> TextRange {
        self.selection
            .map_or_else(|| self.caret_at_end(), |r| r.clamped(self.content.len()))
    }

    fn html(&self) -> String {
        normalize_content(&self.content.to_html())
    }

    /// Replace content programmatically, keeping the cursor where it was if
    /// it still lies inside the new content.
    fn rewrite(&mut self, content: RichText) {
        let saved = self.selection.filter(|_| self.focused);
        self.content = content;
        self.typing_style = None;
        let len = self.content.len();
        self.selection = match saved {
            Some(range) if range.end <= len => Some(range),
            Some(_) => Some(self.caret_at_end()),
            None => self.selection.map(|r| r.clamped(len)),
        };
    }
}

/// Editable regions of one editor instance.
#[derive(Debug, Clone)]
pub struct SyncSurface {
    regions: HashMap<RegionId, Region>,
    debounce: Debouncer<RegionId>,
    link_style: String,
}

impl Default for SyncSurface {
    fn default() -> Self {
        Self::new(&EditorConfig::default())
    }
}

impl SyncSurface {
    pub fn new(config: &EditorConfig) -> Self {
        Self {
            regions: HashMap::new(),
            debounce: Debouncer::new(config.debounce_ms),
            link_style: config.link_style(),
        }
    }

    fn region(&self, id: &RegionId) -> Result<&Region> {
        self.regions
            .get(id)
            .ok_or_else(|| GridsyncError::UnknownRegion(id.to_string()))
    }

    fn region_mut(&mut self, id: &RegionId) -> Result<&mut Region> {
        self.regions
            .get_mut(id)
            .ok_or_else(|| GridsyncError::UnknownRegion(id.to_string()))
    }

    pub fn is_bound(&self, id: &RegionId) -> bool {
        self.regions.contains_key(id)
    }

    pub fn region_ids(&self) -> impl Iterator<Item = &RegionId> {
        self.regions.keys()
    }

    /// Bind a region to stored content.
    ///
    /// The first binding loads the (sanitized) stored content if the region
    /// is empty, or seeds an empty paragraph when there is nothing stored.
    /// Later bindings of the same identity leave the region alone so an edit
    /// in progress is never overwritten. Returns whether content was loaded.
    pub fn bind(&mut self, id: RegionId, stored: &str) -> bool {
        let region = self.regions.entry(id.clone()).or_default();
        if region.initialized {
            return false;
        }
        region.initialized = true;

        let stored = sanitize_stored(stored);
        if region.content.is_empty() && !stored.is_empty() {
            log::debug!("region {id}: loading stored content");
            region.content = RichText::from_html(&stored);
            true
        } else {
            if region.content.is_empty() {
                region.content = RichText::empty_paragraph();
            }
            false
        }
    }

    /// Forget a region and any pending commit for it.
    pub fn unbind(&mut self, id: &RegionId) {
        self.debounce.cancel(id);
        self.regions.remove(id);
    }

    /// Reconcile a region with stored content that changed elsewhere.
    ///
    /// Skipped while the region's own commit is being applied and when the
    /// region already shows the same content. Returns whether the region
    /// was rewritten.
    ///
    /// # Errors
    /// `UnknownRegion` if `id` was never bound.
    pub fn load(&mut self, id: &RegionId, stored: &str) -> Result<bool> {
        let region = self.region_mut(id)?;
        if region.updating {
            log::debug!("region {id}: reload suppressed during write-back");
            return Ok(false);
        }
        let stored = sanitize_stored(stored);
        if region.html() == stored {
            return Ok(false);
        }
        let content = if stored.is_empty() {
            RichText::empty_paragraph()
        } else {
            RichText::from_html(&stored)
        };
        region.rewrite(content);
        Ok(true)
    }

    /// Serialized, normalized content of a region.
    pub fn content(&self, id: &RegionId) -> Option<String> {
        self.regions.get(id).map(Region::html)
    }

    /// Unnormalized region markup, placeholder included.
    pub fn markup(&self, id: &RegionId) -> Option<String> {
        self.regions.get(id).map(|r| r.content.to_html())
    }

    pub fn rich_text(&self, id: &RegionId) -> Option<&RichText> {
        self.regions.get(id).map(|r| &r.content)
    }

    pub fn selection(&self, id: &RegionId) -> Option<TextRange> {
        self.regions.get(id).and_then(|r| r.selection)
    }

    pub fn is_focused(&self, id: &RegionId) -> bool {
        self.regions.get(id).is_some_and(|r| r.focused)
    }

    pub fn is_updating(&self, id: &RegionId) -> bool {
        self.regions.get(id).is_some_and(|r| r.updating)
    }

    /// Focus a region; other regions lose focus. A region without a
    /// selection gets a caret at the end.
    ///
    /// # Errors
    /// `UnknownRegion` if `id` was never bound.
    pub fn focus(&mut self, id: &RegionId) -> Result<()> {
        self.region(id)?;
        for (other, region) in &mut self.regions {
            region.focused = other == id;
        }
        let region = self.region_mut(id)?;
        if region.selection.is_none() {
            region.selection = Some(region.caret_at_end());
        }
        Ok(())
    }

    /// Blur a region: any pending debounced commit is replaced by an
    /// immediate one.
    ///
    /// # Errors
    /// `UnknownRegion` if `id` was never bound.
    pub fn blur(&mut self, id: &RegionId) -> Result<Option<Commit>> {
        let region = self.region_mut(id)?;
        region.focused = false;
        region.typing_style = None;
        self.debounce.cancel(id);
        Ok(self.commit(id))
    }

    /// # Errors
    /// `UnknownRegion` if `id` was never bound.
    pub fn set_selection(&mut self, id: &RegionId, range: TextRange) -> Result<()> {
        let region = self.region_mut(id)?;
        region.selection = Some(range.clamped(region.content.len()));
        region.typing_style = None;
        Ok(())
    }

    /// Keystroke-level edit: take the region's new markup and selection
    /// and (re)arm its debounce timer.
    ///
    /// # Errors
    /// `UnknownRegion` if `id` was never bound.
    pub fn input(
        &mut self,
        id: &RegionId,
        html: &str,
        selection: TextRange,
        now_ms: u64,
    ) -> Result<()> {
        self.replace_from_input(id, html, selection)?;
        self.debounce.schedule(id.clone(), now_ms);
        let due = now_ms.saturating_add(self.debounce.window_ms());
        log::trace!("region {id}: commit scheduled at {due}");
        Ok(())
    }

    /// Backspace/Delete edit: committed immediately, cancelling any pending
    /// debounced commit.
    ///
    /// # Errors
    /// `UnknownRegion` if `id` was never bound.
    pub fn key_delete(
        &mut self,
        id: &RegionId,
        html: &str,
        selection: TextRange,
    ) -> Result<Option<Commit>> {
        self.replace_from_input(id, html, selection)?;
        self.debounce.cancel(id);
        Ok(self.commit(id))
    }

    fn replace_from_input(
        &mut self,
        id: &RegionId,
        html: &str,
        selection: TextRange,
    ) -> Result<()> {
        let region = self.region_mut(id)?;
        region.content = RichText::from_html(html);
        region.selection = Some(selection.clamped(region.content.len()));
        region.focused = true;
        region.initialized = true;
        Ok(())
    }

    /// Commits whose debounce window elapsed by `now_ms`.
    pub fn poll(&mut self, now_ms: u64) -> Vec<Commit> {
        self.debounce
            .take_due(now_ms)
            .into_iter()
            .filter_map(|id| self.commit(&id))
            .collect()
    }

    /// Commits for every region with a pending debounce, due or not.
    pub fn flush(&mut self) -> Vec<Commit> {
        self.debounce
            .drain()
            .into_iter()
            .filter_map(|id| self.commit(&id))
            .collect()
    }

    /// Earliest pending debounce deadline.
    pub fn next_deadline(&self) -> Option<u64> {
        self.debounce.next_deadline()
    }

    pub fn has_pending(&self, id: &RegionId) -> bool {
        self.debounce.is_pending(id)
    }

    /// Apply a toolbar formatting command to the region's selection.
    ///
    /// The region is focused first and a missing selection falls back to a
    /// caret at the end. Inline commands on a caret only change the style
    /// of the next typed text and produce no commit.
    ///
    /// # Errors
    /// `UnknownRegion`, or `UnsupportedFormat` when the command cannot be
    /// applied (content left untouched).
    pub fn execute(&mut self, id: &RegionId, command: &Command) -> Result<Option<Commit>> {
        self.focus(id)?;
        let region = self.region_mut(id)?;
        let range = region.working_range();

        if command.is_inline() && range.is_collapsed() {
            let mut style = region
                .typing_style
                .take()
                .unwrap_or_else(|| region.content.style_at(range.start));
            format::apply_to_style(&mut style, command)?;
            region.typing_style = Some(style);
            return Ok(None);
        }

        let range = format::apply(&mut region.content, range, command)?;
        region.selection = Some(range);
        self.debounce.cancel(id);
        Ok(self.commit(id))
    }

    /// Insert text at the cursor, replacing any selected text.
    ///
    /// # Errors
    /// `UnknownRegion` if `id` was never bound.
    pub fn insert_text(&mut self, id: &RegionId, text: &str) -> Result<Option<Commit>> {
        self.focus(id)?;
        let region = self.region_mut(id)?;
        let range = region.working_range();
        let style = region
            .typing_style
            .take()
            .unwrap_or_else(|| region.content.style_at(range.start));
        if region.content.paragraphs.is_empty() {
            region.content = RichText::empty_paragraph();
        }
        let caret = format::replace(&mut region.content, range, text, style);
        region.selection = Some(caret);
        self.debounce.cancel(id);
        Ok(self.commit(id))
    }

    /// Enter inserts a line break inside the paragraph.
    ///
    /// # Errors
    /// `UnknownRegion` if `id` was never bound.
    pub fn insert_line_break(&mut self, id: &RegionId) -> Result<Option<Commit>> {
        self.insert_text(id, "\n")
    }

    /// Insert an emoji followed by a space.
    ///
    /// # Errors
    /// `UnknownRegion` if `id` was never bound.
    pub fn insert_emoji(&mut self, id: &RegionId, emoji: &str) -> Result<Option<Commit>> {
        self.insert_text(id, &format!("{emoji} "))
    }

    /// Font size level in effect at the cursor, `None` for the default size
    /// (or a size that has no level).
    pub fn current_font_size(&self, id: &RegionId) -> Option<u8> {
        let region = self.regions.get(id)?;
        if let Some(style) = &region.typing_style {
            return style.font_size.as_ref().and_then(FontSize::level);
        }
        let range = region.selection?;
        let size = if range.is_collapsed() {
            region.content.style_at(range.start).font_size
        } else {
            region
                .content
                .styles_in(range)
                .first()
                .and_then(|s| s.font_size.clone())
        };
        size.as_ref().and_then(FontSize::level)
    }

    /// Capture the selection for the link dialog.
    ///
    /// # Errors
    /// `CollapsedSelection` when no text is selected (show
    /// [`super::link::Prompt::SelectTextFirst`]), `UnknownRegion` otherwise.
    pub fn open_link_dialog(&mut self, id: &RegionId) -> Result<LinkDraft> {
        self.focus(id)?;
        let region = self.region(id)?;
        let range = region.working_range();
        if range.is_collapsed() {
            return Err(GridsyncError::CollapsedSelection);
        }
        let existing = format::link_at(&region.content, range).map(|(_, link)| link);
        Ok(LinkDraft {
            region: id.clone(),
            range,
            url: existing.as_ref().map(|l| l.href.clone()).unwrap_or_default(),
            new_tab: existing.as_ref().is_some_and(|l| l.new_tab),
            existing: existing.is_some(),
        })
    }

    /// Confirm the link dialog: restore the captured range, then edit the
    /// link under it in place or link the selected text.
    ///
    /// An empty URL leaves the content untouched.
    ///
    /// # Errors
    /// `UnknownRegion`, or `CollapsedSelection` if the captured range no
    /// longer selects text.
    pub fn apply_link(&mut self, draft: &LinkDraft) -> Result<Option<Commit>> {
        let id = &draft.region;
        let url = draft.url.trim();
        let link_style = self.link_style.clone();
        let region = self.region_mut(id)?;
        region.selection = Some(draft.range.clamped(region.content.len()));
        if url.is_empty() {
            return Ok(None);
        }

        let edited = if draft.existing {
            format::edit_link(&mut region.content, draft.range, url, draft.new_tab)
        } else {
            None
        };
        if edited.is_none() {
            let link = Link {
                href: url.to_string(),
                new_tab: draft.new_tab,
                style: Some(link_style),
            };
            let range = format::insert_link(&mut region.content, draft.range, &link)?;
            region.selection = Some(range);
        }
        self.debounce.cancel(id);
        Ok(self.commit(id))
    }

    /// Unwrap the link under the captured range into plain text.
    ///
    /// # Errors
    /// `UnknownRegion` if the draft's region is gone.
    pub fn remove_link(&mut self, draft: &LinkDraft) -> Result<Option<Commit>> {
        let id = &draft.region;
        let region = self.region_mut(id)?;
        if format::remove_link(&mut region.content, draft.range).is_none() {
            return Ok(None);
        }
        self.debounce.cancel(id);
        Ok(self.commit(id))
    }

    /// Mark a region's commit as being applied.
    pub fn begin_commit(&mut self, id: &RegionId) {
        if let Some(region) = self.regions.get_mut(id) {
            region.updating = true;
        }
    }

    pub fn finish_commit(&mut self, id: &RegionId) {
        if let Some(region) = self.regions.get_mut(id) {
            region.updating = false;
        }
    }

    /// Serialize a region for write-back. Links without a visible style get
    /// the default one first. Suppressed while the region is updating.
    fn commit(&mut self, id: &RegionId) -> Option<Commit> {
        let link_style = &self.link_style;
        let region = self.regions.get_mut(id)?;
        if region.updating {
            log::debug!("region {id}: nested write-back suppressed");
            return None;
        }
        let all = TextRange::new(0, region.content.len());
        region.content.map_style(all, |s| {
            if let Some(link) = s.link.as_mut() {
                if link.style.as_deref().map_or(true, |css| !css.contains("color")) {
                    link.style = Some(link_style.clone());
                }
            }
        });
        Some(Commit {
            region: id.clone(),
            content: region.html(),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn bound(html: &str) -> (SyncSurface, RegionId) {
        let mut surface = SyncSurface::default();
        let id = RegionId::cell(0, 0);
        surface.bind(id.clone(), html);
        (surface, id)
    }

    #[test]
    fn test_bind_seeds_placeholder_when_empty() {
        let (surface, id) = bound("");
        assert_eq!(surface.markup(&id).unwrap(), "<p><br></p>");
        assert_eq!(surface.content(&id).unwrap(), "");
    }

    #[test]
    fn test_rebind_keeps_edit_in_progress() {
        let (mut surface, id) = bound("<p>stored</p>");
        surface.input(&id, "<p>typing</p>", TextRange::caret(6), 0).unwrap();
        assert!(!surface.bind(id.clone(), "<p>stored</p>"));
        assert_eq!(surface.content(&id).unwrap(), "<p>typing</p>");
    }

    #[test]
    fn test_flush_commits_pending_input_early() {
        let (mut surface, id) = bound("<p>stored</p>");
        surface.input(&id, "<p>typing</p>", TextRange::caret(6), 0).unwrap();
        let commits = surface.flush();
        assert_eq!(commits.len(), 1);
        assert_eq!(commits[0].content, "<p>typing</p>");
        assert!(!surface.has_pending(&id));
        assert!(surface.poll(u64::MAX).is_empty());
    }

    #[test]
    fn test_load_preserves_cursor_or_falls_back_to_end() {
        let (mut surface, id) = bound("<p>hello world</p>");
        surface.focus(&id).unwrap();
        surface.set_selection(&id, TextRange::caret(3)).unwrap();
        assert!(surface.load(&id, "<p>hello there</p>").unwrap());
        assert_eq!(surface.selection(&id), Some(TextRange::caret(3)));

        surface.set_selection(&id, TextRange::caret(10)).unwrap();
        assert!(surface.load(&id, "<p>hi</p>").unwrap());
        assert_eq!(surface.selection(&id), Some(TextRange::caret(2)));
    }

    #[test]
    fn test_load_skipped_while_updating() {
        let (mut surface, id) = bound("<p>a</p>");
        surface.begin_commit(&id);
        assert!(!surface.load(&id, "<p>b</p>").unwrap());
        surface.finish_commit(&id);
        assert!(surface.load(&id, "<p>b</p>").unwrap());
    }

    #[test]
    fn test_caret_command_sets_typing_style() {
        let (mut surface, id) = bound("<p>ab</p>");
        assert_eq!(surface.execute(&id, &Command::Bold).unwrap(), None);
        let commit = surface.insert_text(&id, "c").unwrap().unwrap();
        assert_eq!(commit.content, "<p>ab<b>c</b></p>");
    }

    #[test]
    fn test_unknown_region() {
        let mut surface = SyncSurface::default();
        assert!(matches!(
            surface.focus(&RegionId::block("missing")),
            Err(GridsyncError::UnknownRegion(_))
        ));
    }
}
