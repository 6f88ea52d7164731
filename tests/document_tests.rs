//! Tests for prose document operations.
//!
//! Persisted document shape:
//! ```json
//! {"sections": [
//!   {"id": "s1", "position": 1, "type": "section", "titre": "Intro", "blocs": [
//!     {"id": "b1", "type": "texte", "contenu": "<p>...</p>", "style": {"type": "box", "color": "blue"}},
//!     {"id": "b2", "type": "tableau", "table_data": {"headers": [...], "rows": [...]}}
//!   ]},
//!   {"id": "img", "position": 2, "type": "image", "image_url": "", "alt": ""},
//!   {"id": "src", "position": 3, "type": "sources", "titre": "SOURCES ET RÉFÉRENCES", "sources": []}
//! ]}
//! ```
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::panic
)]

use gridsync::document::{Direction, ImageFile, SOURCES_TITLE};
use gridsync::{
    BlockKind, BlockStyle, BlockType, CalloutColor, Document, GridsyncError, SectionKind,
    WrapperKind,
};

fn ids(doc: &Document) -> Vec<String> {
    doc.sections.iter().map(|s| s.id.clone()).collect()
}

fn positions(doc: &Document) -> Vec<usize> {
    doc.sections.iter().map(|s| s.position).collect()
}

fn png() -> ImageFile {
    ImageFile {
        name: "photo.png".into(),
        mime: "image/png".into(),
        bytes: vec![0x89, b'P', b'N', b'G'],
    }
}

const STORED: &str = r#"{"sections": [
    {"id": "s1", "position": 1, "type": "section", "titre": "Intro", "blocs": [
        {"id": "b1", "type": "sous-titre", "texte": "Contexte"},
        {"id": "b2", "type": "texte", "contenu": "<p>Bonjour</p>", "style": {"type": "box", "color": "blue"}},
        {"id": "b3", "type": "tableau", "table_data": {"headers": ["A"], "rows": [["1"]]}}
    ]},
    {"id": "img", "position": 2, "type": "image", "image_url": "", "alt": ""},
    {"id": "src", "position": 3, "type": "sources", "titre": "SOURCES ET RÉFÉRENCES",
     "sources": [{"nom": "Rapport", "lien": "https://r.test"}]}
]}"#;

#[test]
fn test_stored_document_parses() {
    let doc = Document::from_json(STORED).unwrap();
    assert_eq!(ids(&doc), vec!["s1", "img", "src"]);
    let blocks = doc.sections[0].blocks().unwrap();
    assert!(matches!(&blocks[0].kind, BlockKind::Subheading { text } if text == "Contexte"));
    match &blocks[1].kind {
        BlockKind::Text { content, style } => {
            assert_eq!(content, "<p>Bonjour</p>");
            let style = style.as_ref().unwrap();
            assert_eq!(style.kind, WrapperKind::Box);
            assert_eq!(style.color, Some(CalloutColor::Blue));
        }
        other => panic!("unexpected block {other:?}"),
    }
    assert!(matches!(&blocks[2].kind, BlockKind::Table { table } if table.rows[0][0] == "1"));

    let again = Document::from_json(&doc.to_json().unwrap()).unwrap();
    assert_eq!(again, doc);
}

#[test]
fn test_malformed_document_json_is_an_error() {
    assert!(matches!(
        Document::from_json(r#"{"sections": [{"id": "s1"}]}"#),
        Err(GridsyncError::Json(_))
    ));
    assert!(matches!(Document::from_json("not json"), Err(GridsyncError::Json(_))));
}

#[test]
fn test_block_json_tags() {
    let doc = Document::from_json(STORED).unwrap();
    let json: serde_json::Value = serde_json::from_str(&doc.to_json().unwrap()).unwrap();
    let blocks = &json["sections"][0]["blocs"];
    assert_eq!(blocks[0]["type"], "sous-titre");
    assert_eq!(blocks[1]["type"], "texte");
    assert_eq!(blocks[1]["style"]["type"], "box");
    assert_eq!(blocks[2]["type"], "tableau");
    assert_eq!(json["sections"][2]["sources"][0]["nom"], "Rapport");
}

// ============================================================================
// Sections
// ============================================================================

#[test]
fn test_new_sections_go_before_sources() {
    let mut doc = Document::default();
    let a = doc.add_section();
    let src = doc.add_sources();
    let b = doc.add_section();
    let img = doc.add_image();
    assert_eq!(ids(&doc), vec![a, b, img, src.clone()]);
    assert_eq!(positions(&doc), vec![1, 2, 3, 4]);

    let sources = doc.section(&src).unwrap();
    assert!(matches!(&sources.kind, SectionKind::Sources { title, .. } if title == SOURCES_TITLE));
}

#[test]
fn test_move_section_renumbers() {
    let mut doc = Document::default();
    let a = doc.add_section();
    let b = doc.add_section();
    let c = doc.add_section();
    assert!(doc.move_section(&c, Direction::Up).unwrap());
    assert_eq!(ids(&doc), vec![a.clone(), c.clone(), b.clone()]);
    assert_eq!(positions(&doc), vec![1, 2, 3]);

    assert!(!doc.move_section(&a, Direction::Up).unwrap());
    assert!(!doc.move_section(&b, Direction::Down).unwrap());
}

#[test]
fn test_sources_never_move() {
    let mut doc = Document::default();
    let a = doc.add_section();
    let src = doc.add_sources();
    assert!(!doc.move_section(&src, Direction::Up).unwrap());
    assert!(!doc.move_section(&a, Direction::Down).unwrap());
    assert_eq!(ids(&doc), vec![a, src]);
}

#[test]
fn test_delete_section_renumbers() {
    let mut doc = Document::default();
    let a = doc.add_section();
    let b = doc.add_section();
    doc.delete_section(&a).unwrap();
    assert_eq!(ids(&doc), vec![b]);
    assert_eq!(positions(&doc), vec![1]);
    assert!(matches!(
        doc.delete_section(&a),
        Err(GridsyncError::UnknownSection(_))
    ));
}

#[test]
fn test_titles_and_alt_text() {
    let mut doc = Document::default();
    let s = doc.add_section();
    let img = doc.add_image();
    doc.update_section_title(&s, "Analyse").unwrap();
    doc.update_image_alt(&img, "Graphique").unwrap();
    assert!(doc.update_section_title(&img, "x").is_err());
    assert!(doc.update_image_alt(&s, "x").is_err());

    assert!(matches!(&doc.section(&s).unwrap().kind, SectionKind::Section { title, .. } if title == "Analyse"));
    assert!(matches!(&doc.section(&img).unwrap().kind, SectionKind::Image { alt, .. } if alt == "Graphique"));
}

// ============================================================================
// Blocks
// ============================================================================

#[test]
fn test_add_blocks_of_each_kind() {
    let mut doc = Document::default();
    let s = doc.add_section();
    let h = doc.add_block(&s, BlockType::Subheading).unwrap();
    let t = doc.add_block(&s, BlockType::Text).unwrap();
    let g = doc.add_block(&s, BlockType::Table).unwrap();

    assert!(matches!(&doc.block(&h).unwrap().kind, BlockKind::Subheading { text } if text.is_empty()));
    assert!(matches!(&doc.block(&t).unwrap().kind, BlockKind::Text { content, style: None } if content.is_empty()));
    match &doc.block(&g).unwrap().kind {
        BlockKind::Table { table } => {
            assert_eq!(table.column_count(), 3);
            assert_eq!(table.row_count(), 2);
            assert_eq!(table.headers[0], "Colonne 1");
        }
        other => panic!("unexpected block {other:?}"),
    }
}

#[test]
fn test_blocks_only_in_content_sections() {
    let mut doc = Document::default();
    let img = doc.add_image();
    assert!(matches!(
        doc.add_block(&img, BlockType::Text),
        Err(GridsyncError::UnknownSection(_))
    ));
}

#[test]
fn test_update_block_content_normalizes() {
    let mut doc = Document::default();
    let s = doc.add_section();
    let t = doc.add_block(&s, BlockType::Text).unwrap();
    assert!(doc.update_block_content(&s, &t, "<p>Texte</p>").unwrap());
    assert!(!doc.update_block_content(&s, &t, "<p>Texte</p>").unwrap());
    assert!(doc.update_block_content(&s, &t, "<p><br></p>").unwrap());
    assert!(matches!(&doc.block(&t).unwrap().kind, BlockKind::Text { content, .. } if content.is_empty()));

    let g = doc.add_block(&s, BlockType::Table).unwrap();
    assert!(doc.update_block_content(&s, &g, "x").is_err());
}

#[test]
fn test_block_style_only_on_text() {
    let mut doc = Document::default();
    let s = doc.add_section();
    let t = doc.add_block(&s, BlockType::Text).unwrap();
    let h = doc.add_block(&s, BlockType::Subheading).unwrap();
    let style = BlockStyle::new(WrapperKind::InfoBox, CalloutColor::Orange).with_emoji("ℹ️");

    doc.set_block_style(&s, &t, Some(style.clone())).unwrap();
    assert!(matches!(&doc.block(&t).unwrap().kind, BlockKind::Text { style: Some(st), .. } if *st == style));
    assert!(doc.set_block_style(&s, &h, Some(style)).is_err());

    doc.set_block_style(&s, &t, None).unwrap();
    assert!(matches!(&doc.block(&t).unwrap().kind, BlockKind::Text { style: None, .. }));
}

#[test]
fn test_move_and_delete_blocks() {
    let mut doc = Document::default();
    let s = doc.add_section();
    let a = doc.add_block(&s, BlockType::Text).unwrap();
    let b = doc.add_block(&s, BlockType::Subheading).unwrap();

    assert!(doc.move_block(&s, &b, Direction::Up).unwrap());
    let order: Vec<_> = doc.section(&s).unwrap().blocks().unwrap().iter().map(|b| b.id.clone()).collect();
    assert_eq!(order, vec![b.clone(), a.clone()]);
    assert!(!doc.move_block(&s, &b, Direction::Up).unwrap());

    doc.delete_block(&s, &a).unwrap();
    assert!(doc.block(&a).is_none());
    assert!(matches!(
        doc.delete_block(&s, &a),
        Err(GridsyncError::UnknownBlock(_))
    ));
}

#[test]
fn test_table_block_grid_is_editable() {
    let mut doc = Document::default();
    let s = doc.add_section();
    let g = doc.add_block(&s, BlockType::Table).unwrap();
    doc.table_mut(&s, &g).unwrap().add_row();
    assert!(matches!(&doc.block(&g).unwrap().kind, BlockKind::Table { table } if table.row_count() == 3));
}

// ============================================================================
// Image upload
// ============================================================================

#[test]
fn test_upload_stores_url() {
    let mut doc = Document::default();
    let img = doc.add_image();
    let mut targets = Vec::new();
    let mut uploader = |file: &ImageFile, target: &str| -> gridsync::Result<String> {
        targets.push(target.to_string());
        Ok(format!("https://cdn.test/{}", file.name))
    };
    let url = doc.upload_image(&img, &png(), &mut uploader).unwrap();
    assert_eq!(url, "https://cdn.test/photo.png");
    assert_eq!(targets, vec![img.clone()]);
    assert!(matches!(
        &doc.section(&img).unwrap().kind,
        SectionKind::Image { image_url, .. } if image_url == "https://cdn.test/photo.png"
    ));
}

#[test]
fn test_failed_upload_leaves_section() {
    let mut doc = Document::default();
    let img = doc.add_image();
    let before = doc.clone();
    let mut uploader = |_: &ImageFile, _: &str| -> gridsync::Result<String> {
        Err(GridsyncError::Other("quota exceeded".into()))
    };
    let err = doc.upload_image(&img, &png(), &mut uploader).unwrap_err();
    assert!(matches!(err, GridsyncError::Upload(msg) if msg.contains("quota")));
    assert_eq!(doc, before);
}

#[test]
fn test_upload_needs_image_section() {
    let mut doc = Document::default();
    let s = doc.add_section();
    let mut uploader = |_: &ImageFile, _: &str| -> gridsync::Result<String> { Ok("u".into()) };
    assert!(matches!(
        doc.upload_image(&s, &png(), &mut uploader),
        Err(GridsyncError::UnknownSection(_))
    ));
}
