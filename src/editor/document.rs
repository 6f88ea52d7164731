//! Prose document editing session.

use super::link::LinkDraft;
use super::mutation;
use super::surface::{Commit, RegionId, SyncSurface};
use super::rejected;
use crate::config::EditorConfig;
use crate::document::{Direction, ImageFile, ImageUploader};
use crate::error::Result;
use crate::format::Command;
use crate::render::wrap_block;
use crate::rich_text::TextRange;
use crate::types::{BlockKind, BlockStyle, BlockType, Document, TableData};

/// Persistence collaborator receiving the whole document after each change.
pub trait DocumentSink {
    fn document_changed(&mut self, document: &Document);
}

impl<F: FnMut(&Document)> DocumentSink for F {
    fn document_changed(&mut self, document: &Document) {
        self(document);
    }
}

/// Editing session over a prose document. Text and subheading blocks get a
/// sync surface region keyed by block id.
pub struct DocumentEditor {
    document: Document,
    surface: SyncSurface,
    config: EditorConfig,
    sink: Option<Box<dyn DocumentSink>>,
}

impl DocumentEditor {
    pub fn new(document: Document, config: EditorConfig) -> Self {
        let mut editor = Self {
            document,
            surface: SyncSurface::new(&config),
            config,
            sink: None,
        };
        editor.bind_regions();
        editor
    }

    /// # Errors
    /// Malformed document JSON.
    pub fn from_json(json: &str, config: EditorConfig) -> Result<Self> {
        Ok(Self::new(Document::from_json(json)?, config))
    }

    pub fn set_sink(&mut self, sink: impl DocumentSink + 'static) {
        self.sink = Some(Box::new(sink));
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn surface(&self) -> &SyncSurface {
        &self.surface
    }

    fn bind_regions(&mut self) {
        let blocks: Vec<(String, String)> = self
            .document
            .sections
            .iter()
            .filter_map(|s| s.blocks())
            .flatten()
            .filter_map(|b| match &b.kind {
                BlockKind::Text { content, .. } => Some((b.id.clone(), content.clone())),
                BlockKind::Subheading { text } => Some((b.id.clone(), text.clone())),
                BlockKind::Table { .. } => None,
            })
            .collect();
        for (id, stored) in blocks {
            self.surface.bind(RegionId::Block(id), &stored);
        }
    }

    fn notify(&mut self) {
        if let Some(sink) = self.sink.as_mut() {
            sink.document_changed(&self.document);
        }
    }

    fn changed<T>(&mut self, op: &str, result: Result<T>) -> Option<T> {
        match result {
            Ok(value) => {
                self.notify();
                Some(value)
            }
            Err(e) => {
                rejected(op, &e);
                None
            }
        }
    }

    // ---- Sections ----

    pub fn add_section(&mut self) -> String {
        let id = self.document.add_section();
        self.notify();
        id
    }

    pub fn add_image(&mut self) -> String {
        let id = self.document.add_image();
        self.notify();
        id
    }

    pub fn add_sources(&mut self) -> String {
        let id = self.document.add_sources();
        self.notify();
        id
    }

    pub fn update_section_title(&mut self, id: &str, title: &str) -> bool {
        let result = self.document.update_section_title(id, title);
        self.changed("section title", result).is_some()
    }

    pub fn update_image_alt(&mut self, id: &str, alt: &str) -> bool {
        let result = self.document.update_image_alt(id, alt);
        self.changed("image alt", result).is_some()
    }

    pub fn delete_section(&mut self, id: &str) -> bool {
        let result = self.document.delete_section(id);
        let done = self.changed("delete section", result).is_some();
        if done {
            self.prune_regions();
        }
        done
    }

    pub fn move_section(&mut self, id: &str, direction: Direction) -> bool {
        match self.document.move_section(id, direction) {
            Ok(true) => {
                self.notify();
                true
            }
            Ok(false) => false,
            Err(e) => rejected("move section", &e),
        }
    }

    /// Upload an image for an image section and store its URL.
    pub fn upload_image(
        &mut self,
        section_id: &str,
        file: &ImageFile,
        uploader: &mut dyn ImageUploader,
    ) -> Option<String> {
        let result = self.document.upload_image(section_id, file, uploader);
        if let Err(e) = &result {
            log::warn!("image upload for {section_id} failed: {e}");
        }
        self.changed("upload image", result)
    }

    // ---- Blocks ----

    pub fn add_block(&mut self, section_id: &str, kind: BlockType) -> Option<String> {
        let result = self.document.add_block(section_id, kind);
        let id = self.changed("add block", result)?;
        self.bind_regions();
        Some(id)
    }

    pub fn delete_block(&mut self, section_id: &str, block_id: &str) -> bool {
        let result = self.document.delete_block(section_id, block_id);
        let done = self.changed("delete block", result).is_some();
        if done {
            self.surface.unbind(&RegionId::block(block_id));
        }
        done
    }

    pub fn move_block(&mut self, section_id: &str, block_id: &str, direction: Direction) -> bool {
        match self.document.move_block(section_id, block_id, direction) {
            Ok(true) => {
                self.notify();
                true
            }
            Ok(false) => false,
            Err(e) => rejected("move block", &e),
        }
    }

    /// Programmatic content update; the block's region is reloaded.
    pub fn update_block_content(
        &mut self,
        section_id: &str,
        block_id: &str,
        content: &str,
    ) -> bool {
        match self.document.update_block_content(section_id, block_id, content) {
            Ok(true) => {
                self.notify();
                if let Err(e) = self.surface.load(&RegionId::block(block_id), content) {
                    log::debug!("reload {block_id}: {e}");
                }
                true
            }
            Ok(false) => false,
            Err(e) => rejected("update block", &e),
        }
    }

    pub fn set_block_style(
        &mut self,
        section_id: &str,
        block_id: &str,
        style: Option<BlockStyle>,
    ) -> bool {
        let result = self.document.set_block_style(section_id, block_id, style);
        self.changed("block style", result).is_some()
    }

    /// Store a table block's grid, typically from a `TableEditor` sink.
    pub fn replace_table(&mut self, section_id: &str, block_id: &str, table: TableData) -> bool {
        let slot = match self.document.table_mut(section_id, block_id) {
            Ok(slot) => slot,
            Err(e) => return rejected("replace table", &e),
        };
        if *slot == table {
            return false;
        }
        *slot = table;
        self.notify();
        true
    }

    /// Block content wrapped in its presentation wrapper, for display.
    pub fn block_html(&self, block_id: &str) -> Option<String> {
        match &self.document.block(block_id)?.kind {
            BlockKind::Text { content, style } => Some(wrap_block(content, style.as_ref())),
            BlockKind::Subheading { text } => Some(text.clone()),
            BlockKind::Table { table } => Some(crate::render::table_html(table)),
        }
    }

    fn prune_regions(&mut self) {
        let stale: Vec<RegionId> = self
            .surface
            .region_ids()
            .filter(|id| match id {
                RegionId::Block(block) => self.document.block(block).is_none(),
                RegionId::Cell(_) => true,
            })
            .cloned()
            .collect();
        for id in stale {
            self.surface.unbind(&id);
        }
    }

    // ---- Region sync ----

    pub fn apply_commit(&mut self, commit: &Commit) -> bool {
        self.surface.begin_commit(&commit.region);
        let changed = match mutation::apply_block_commit(&mut self.document, commit) {
            Ok(changed) => changed,
            Err(e) => rejected("commit", &e),
        };
        if changed {
            self.notify();
        }
        self.surface.finish_commit(&commit.region);
        changed
    }

    fn apply_result(&mut self, op: &str, result: Result<Option<Commit>>) -> bool {
        match result {
            Ok(Some(commit)) => self.apply_commit(&commit),
            Ok(None) => false,
            Err(e) => rejected(op, &e),
        }
    }

    pub fn focus(&mut self, block_id: &str) -> bool {
        match self.surface.focus(&RegionId::block(block_id)) {
            Ok(()) => true,
            Err(e) => rejected("focus", &e),
        }
    }

    pub fn blur(&mut self, block_id: &str) -> bool {
        let result = self.surface.blur(&RegionId::block(block_id));
        self.apply_result("blur", result)
    }

    pub fn set_text_selection(&mut self, block_id: &str, range: TextRange) -> bool {
        match self.surface.set_selection(&RegionId::block(block_id), range) {
            Ok(()) => true,
            Err(e) => rejected("select text", &e),
        }
    }

    pub fn input(&mut self, block_id: &str, html: &str, selection: TextRange, now_ms: u64) -> bool {
        match self.surface.input(&RegionId::block(block_id), html, selection, now_ms) {
            Ok(()) => true,
            Err(e) => rejected("input", &e),
        }
    }

    pub fn key_delete(&mut self, block_id: &str, html: &str, selection: TextRange) -> bool {
        let result = self.surface.key_delete(&RegionId::block(block_id), html, selection);
        self.apply_result("delete", result)
    }

    pub fn poll(&mut self, now_ms: u64) -> bool {
        let commits = self.surface.poll(now_ms);
        commits
            .iter()
            .fold(false, |any, commit| self.apply_commit(commit) || any)
    }

    pub fn execute(&mut self, block_id: &str, command: &Command) -> bool {
        let result = self.surface.execute(&RegionId::block(block_id), command);
        self.apply_result("format", result)
    }

    pub fn insert_emoji(&mut self, block_id: &str, emoji: &str) -> bool {
        let result = self.surface.insert_emoji(&RegionId::block(block_id), emoji);
        self.apply_result("insert emoji", result)
    }

    pub fn insert_line_break(&mut self, block_id: &str) -> bool {
        let result = self.surface.insert_line_break(&RegionId::block(block_id));
        self.apply_result("line break", result)
    }

    pub fn current_font_size(&self, block_id: &str) -> Option<u8> {
        self.surface.current_font_size(&RegionId::block(block_id))
    }

    /// # Errors
    /// `CollapsedSelection` or `UnknownRegion`.
    pub fn open_link_dialog(&mut self, block_id: &str) -> Result<LinkDraft> {
        self.surface.open_link_dialog(&RegionId::block(block_id))
    }

    pub fn apply_link(&mut self, draft: &LinkDraft) -> bool {
        let result = self.surface.apply_link(draft);
        self.apply_result("link", result)
    }

    pub fn remove_link(&mut self, draft: &LinkDraft) -> bool {
        let result = self.surface.remove_link(draft);
        self.apply_result("unlink", result)
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }
}
