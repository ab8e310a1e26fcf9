//! Layout-tree ingestion from pdfminer-style XML.
//!
//! The upstream extraction step emits a tree of `<page>` elements whose
//! `<text>` descendants carry `size`, `bbox` (`x,y,x2,y2`) and `font`
//! attributes with one glyph run per element. The first `<figure>` of a
//! page is the designated table container: its direct children are
//! recorded in document order, with non-text elements becoming boundary
//! markers for the block builder.
//!
//! Ingestion is lenient about individual elements: fragments with missing
//! or unparseable attributes are dropped, not fatal. Only a structurally
//! broken document errors out.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::Result;
use crate::model::{Fragment, LayoutTree, Page, PageItem};

struct PendingText {
    font: Option<String>,
    size: f32,
    x: f32,
    y: f32,
    x2: f32,
    text: String,
    in_container: bool,
}

/// Parse a layout XML document into a fragment tree.
pub fn tree_from_xml(xml: &str) -> Result<LayoutTree> {
    let mut reader = Reader::from_str(xml);
    reader.check_end_names(false);

    let mut pages: Vec<Page> = Vec::new();
    let mut page: Option<Page> = None;
    let mut depth: usize = 0;
    let mut container_depth: Option<usize> = None;
    let mut container_seen = false;
    let mut pending: Option<PendingText> = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                handle_open(
                    &e,
                    depth,
                    &mut pages,
                    &mut page,
                    &mut container_depth,
                    &mut container_seen,
                    &mut pending,
                );
                depth += 1;
            }
            Event::Empty(e) => {
                // Self-closing elements carry no text; only their boundary
                // role matters.
                if e.local_name().as_ref() != b"text" {
                    push_boundary(depth, container_depth, &mut page);
                }
            }
            Event::Text(t) => {
                if let Some(p) = pending.as_mut() {
                    if let Ok(text) = t.unescape() {
                        p.text.push_str(&text);
                    }
                }
            }
            Event::End(e) => {
                depth = depth.saturating_sub(1);
                match e.local_name().as_ref() {
                    b"text" => {
                        if let (Some(p), Some(current)) = (pending.take(), page.as_mut()) {
                            finish_fragment(p, current);
                        }
                    }
                    b"figure" => {
                        if container_depth == Some(depth) {
                            container_depth = None;
                        }
                    }
                    b"page" => {
                        if let Some(done) = page.take() {
                            pages.push(done);
                        }
                        container_depth = None;
                    }
                    _ => {}
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    // A page left open by a truncated document still counts.
    if let Some(done) = page.take() {
        pages.push(done);
    }

    log::debug!("ingested {} pages from layout XML", pages.len());

    Ok(LayoutTree { pages })
}

fn handle_open(
    e: &BytesStart<'_>,
    depth: usize,
    pages: &mut Vec<Page>,
    page: &mut Option<Page>,
    container_depth: &mut Option<usize>,
    container_seen: &mut bool,
    pending: &mut Option<PendingText>,
) {
    match e.local_name().as_ref() {
        b"page" => {
            if let Some(done) = page.take() {
                pages.push(done);
            }
            *page = Some(Page::new(pages.len()));
            *container_depth = None;
            *container_seen = false;
        }
        b"figure" => {
            if page.is_some() && !*container_seen {
                *container_seen = true;
                *container_depth = Some(depth);
            } else {
                push_boundary(depth, *container_depth, page);
            }
        }
        b"text" => {
            if page.is_some() {
                let in_container = container_depth.map(|d| depth == d + 1).unwrap_or(false);
                *pending = parse_text_attributes(e, in_container);
            }
        }
        _ => {
            push_boundary(depth, *container_depth, page);
        }
    }
}

/// Record a boundary marker when a non-text element sits directly inside
/// the designated table container.
fn push_boundary(depth: usize, container_depth: Option<usize>, page: &mut Option<Page>) {
    let direct_child = container_depth.map(|d| depth == d + 1).unwrap_or(false);
    if direct_child {
        if let Some(current) = page.as_mut() {
            current.table_items.push(PageItem::Boundary);
        }
    }
}

fn parse_text_attributes(e: &BytesStart<'_>, in_container: bool) -> Option<PendingText> {
    let mut font: Option<String> = None;
    let mut size: Option<f32> = None;
    let mut bbox: Option<(f32, f32, f32)> = None;

    for attribute in e.attributes().flatten() {
        let value = match attribute.unescape_value() {
            Ok(v) => v,
            Err(_) => continue,
        };
        match attribute.key.as_ref() {
            b"font" => font = Some(font_suffix(&value)),
            b"size" => size = value.trim().parse().ok(),
            b"bbox" => {
                let parts: Vec<f32> = value
                    .split(',')
                    .filter_map(|p| p.trim().parse().ok())
                    .collect();
                if parts.len() >= 3 {
                    bbox = Some((parts[0], parts[1], parts[2]));
                }
            }
            _ => {}
        }
    }

    let (x, y, x2) = bbox?;
    Some(PendingText {
        font,
        size: size?,
        x,
        y,
        x2,
        text: String::new(),
        in_container,
    })
}

/// Reduce a namespaced font name (`ABCDEF+MetaBoldLF-Roman`) to its
/// meaningful suffix.
fn font_suffix(font: &str) -> String {
    font.rsplit('+').next().unwrap_or(font).to_string()
}

fn finish_fragment(pending: PendingText, page: &mut Page) {
    if pending.text.is_empty() {
        return;
    }
    let fragment = Fragment {
        page: page.number,
        x: pending.x,
        x2: pending.x2,
        y: pending.y,
        font: pending.font,
        size: pending.size,
        text: pending.text,
    };
    if pending.in_container {
        page.table_items.push(PageItem::Text(fragment.clone()));
    }
    page.fragments.push(fragment);
}
