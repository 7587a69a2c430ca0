//! DOCX → HTML fragment conversion.
//!
//! A DOCX file is a ZIP archive. The parts read here:
//! - `word/document.xml`: body content (paragraphs, runs, tables, drawings)
//! - `word/_rels/document.xml.rels`: relationship ids → image and link targets
//! - `word/styles.xml`: style ids → display names (heading detection)
//! - `word/numbering.xml`: list definitions (bullet vs numbered)
//!
//! The body is walked as an event stream and written out as HTML directly;
//! no document tree is built. Images are inlined as base64 data URIs so the
//! fragment stays self-contained.

use base64::Engine;
use image::ImageFormat;
use log::debug;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::HashMap;
use std::io::{Cursor, Read, Seek};
use thiserror::Error;
use zip::ZipArchive;

use crate::backend::{DocxToHtmlBackend, HtmlOutput};
use crate::error::ConversionError;
use crate::html::escape;

const DOCUMENT_PART: &str = "word/document.xml";
const RELS_PART: &str = "word/_rels/document.xml.rels";
const STYLES_PART: &str = "word/styles.xml";
const NUMBERING_PART: &str = "word/numbering.xml";

/// Paragraph styles rendered as plain `<p>` without a warning.
const PLAIN_STYLES: &[&str] = &["normal", "list paragraph", "body text", "no spacing", "default"];

#[derive(Error, Debug)]
pub enum DocxError {
    #[error("not a valid DOCX archive: {0}")]
    Archive(#[from] zip::result::ZipError),
    #[error("missing {0} in DOCX archive")]
    MissingPart(&'static str),
    #[error("malformed XML in {part}: {source}")]
    Xml {
        part: &'static str,
        source: quick_xml::Error,
    },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Built-in DOCX reader.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocxHtmlConverter;

impl DocxToHtmlBackend for DocxHtmlConverter {
    fn convert(&self, docx: &[u8]) -> Result<HtmlOutput, ConversionError> {
        Ok(docx_to_html(docx)?)
    }
}

pub fn docx_to_html(bytes: &[u8]) -> Result<HtmlOutput, DocxError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;

    let document = read_part(&mut archive, DOCUMENT_PART)?.ok_or(DocxError::MissingPart(DOCUMENT_PART))?;
    let relationships = match read_part(&mut archive, RELS_PART)? {
        Some(xml) => parse_relationships(&xml)?,
        None => HashMap::new(),
    };
    let styles = match read_part(&mut archive, STYLES_PART)? {
        Some(xml) => parse_styles(&xml)?,
        None => HashMap::new(),
    };
    let numbering = match read_part(&mut archive, NUMBERING_PART)? {
        Some(xml) => Numbering::parse(&xml)?,
        None => Numbering::default(),
    };

    let mut writer = BodyWriter::new(&mut archive, &relationships, &styles, &numbering);
    writer.walk(&document)?;
    let output = writer.finish();
    debug!(
        "DOCX converted to {} bytes of HTML with {} warnings",
        output.html.len(),
        output.warnings.len()
    );
    Ok(output)
}

fn read_part<R: Read + Seek>(archive: &mut ZipArchive<R>, name: &'static str) -> Result<Option<String>, DocxError> {
    let mut file = match archive.by_name(name) {
        Ok(file) => file,
        Err(zip::result::ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let mut content = String::new();
    file.read_to_string(&mut content)?;
    Ok(Some(content))
}

// ========================================================================
// XML Attribute Helpers
// ========================================================================

fn get_attr(e: &BytesStart, key: &[u8]) -> Option<String> {
    e.attributes()
        .find(|a| a.as_ref().ok().map(|x| x.key.as_ref()) == Some(key))
        .and_then(Result::ok)
        .map(|attr| match attr.unescape_value() {
            Ok(value) => value.into_owned(),
            Err(_) => String::from_utf8_lossy(&attr.value).to_string(),
        })
}

/// `w:val` explicitly switches the property off ("0" or "false").
fn check_val_off(e: &BytesStart) -> bool {
    matches!(get_attr(e, b"w:val").as_deref(), Some("0") | Some("false"))
}

// ========================================================================
// Auxiliary Parts
// ========================================================================

fn parse_relationships(xml: &str) -> Result<HashMap<String, String>, DocxError> {
    let mut relationships = HashMap::new();
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Empty(e)) | Ok(Event::Start(e)) if e.name().as_ref() == b"Relationship" => {
                if let (Some(id), Some(target)) = (get_attr(&e, b"Id"), get_attr(&e, b"Target")) {
                    relationships.insert(id, target);
                }
            }
            Ok(Event::Eof) => break,
            Err(source) => return Err(DocxError::Xml { part: RELS_PART, source }),
            _ => {}
        }
        buf.clear();
    }
    Ok(relationships)
}

/// Style id → display name (e.g. `Heading1` → `heading 1`).
fn parse_styles(xml: &str) -> Result<HashMap<String, String>, DocxError> {
    let mut styles = HashMap::new();
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();
    let mut current: Option<String> = None;
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) if e.name().as_ref() == b"w:style" => {
                let is_paragraph = get_attr(&e, b"w:type").map_or(true, |t| t == "paragraph");
                current = if is_paragraph { get_attr(&e, b"w:styleId") } else { None };
            }
            Ok(Event::Empty(e)) if e.name().as_ref() == b"w:name" => {
                if let (Some(id), Some(name)) = (current.as_ref(), get_attr(&e, b"w:val")) {
                    styles.insert(id.clone(), name);
                }
            }
            Ok(Event::End(e)) if e.name().as_ref() == b"w:style" => current = None,
            Ok(Event::Eof) => break,
            Err(source) => return Err(DocxError::Xml { part: STYLES_PART, source }),
            _ => {}
        }
        buf.clear();
    }
    Ok(styles)
}

/// List formats from numbering.xml.
#[derive(Debug, Default)]
struct Numbering {
    /// (abstractNumId, ilvl) → numFmt
    formats: HashMap<(String, usize), String>,
    /// numId → abstractNumId
    instances: HashMap<String, String>,
}

impl Numbering {
    fn parse(xml: &str) -> Result<Self, DocxError> {
        let mut numbering = Numbering::default();
        let mut reader = Reader::from_str(xml);
        let mut buf = Vec::new();
        let mut abstract_id: Option<String> = None;
        let mut level: Option<usize> = None;
        let mut num_id: Option<String> = None;
        loop {
            let event = reader
                .read_event_into(&mut buf)
                .map_err(|source| DocxError::Xml { part: NUMBERING_PART, source })?;
            match event {
                Event::Start(e) | Event::Empty(e) => match e.name().as_ref() {
                    b"w:abstractNum" => abstract_id = get_attr(&e, b"w:abstractNumId"),
                    b"w:lvl" => level = get_attr(&e, b"w:ilvl").and_then(|v| v.parse().ok()),
                    b"w:numFmt" => {
                        if let (Some(id), Some(lvl), Some(fmt)) = (abstract_id.as_ref(), level, get_attr(&e, b"w:val")) {
                            numbering.formats.insert((id.clone(), lvl), fmt);
                        }
                    }
                    b"w:num" => num_id = get_attr(&e, b"w:numId"),
                    b"w:abstractNumId" => {
                        if let (Some(id), Some(target)) = (num_id.as_ref(), get_attr(&e, b"w:val")) {
                            numbering.instances.insert(id.clone(), target);
                        }
                    }
                    _ => {}
                },
                Event::End(e) => match e.name().as_ref() {
                    b"w:abstractNum" => abstract_id = None,
                    b"w:lvl" => level = None,
                    b"w:num" => num_id = None,
                    _ => {}
                },
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }
        Ok(numbering)
    }

    fn is_ordered(&self, num_id: &str, level: usize) -> bool {
        self.instances
            .get(num_id)
            .and_then(|abstract_id| self.formats.get(&(abstract_id.clone(), level)))
            .map_or(false, |fmt| fmt != "bullet" && fmt != "none")
    }
}

/// `heading 1`..`heading 6` (or the id form `Heading1`) and `Title`.
fn heading_level(style_name: &str) -> Option<u8> {
    let lower = style_name.to_ascii_lowercase();
    if lower == "title" {
        return Some(1);
    }
    let level: u8 = lower.strip_prefix("heading")?.trim().parse().ok()?;
    (1..=6).contains(&level).then_some(level)
}

/// Archive path of a relationship target relative to `word/`.
fn part_path(target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        absolute.to_string()
    } else if let Some(parent) = target.strip_prefix("../") {
        parent.to_string()
    } else {
        format!("word/{}", target)
    }
}

// ========================================================================
// Body Walker
// ========================================================================

#[derive(Debug, Default)]
struct Paragraph {
    style_id: Option<String>,
    num_id: Option<String>,
    level: usize,
    content: String,
}

#[derive(Debug, Default, Clone, Copy)]
struct RunFormat {
    bold: bool,
    italic: bool,
    strike: bool,
    superscript: bool,
    subscript: bool,
}

impl RunFormat {
    fn wrap(&self, content: &str) -> String {
        let mut tags = Vec::new();
        if self.bold {
            tags.push("strong");
        }
        if self.italic {
            tags.push("em");
        }
        if self.strike {
            tags.push("s");
        }
        if self.superscript {
            tags.push("sup");
        } else if self.subscript {
            tags.push("sub");
        }

        let mut out = String::with_capacity(content.len() + tags.len() * 10);
        for tag in &tags {
            out.push('<');
            out.push_str(tag);
            out.push('>');
        }
        out.push_str(content);
        for tag in tags.iter().rev() {
            out.push_str("</");
            out.push_str(tag);
            out.push('>');
        }
        out
    }
}

/// An open `w:tc`.
struct Cell {
    /// Offset of its `<td` in the output.
    start: usize,
    column: usize,
    span: usize,
    merge: Option<VMerge>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum VMerge {
    Restart,
    Continue,
}

/// An open `w:tbl`.
#[derive(Default)]
struct Table {
    /// Grid column of the next cell in the current row.
    column: usize,
    /// Grid column → index into `rowspans` of the merge still running there.
    merging: HashMap<usize, usize>,
    /// `<td` offset and row count of each vertical merge.
    rowspans: Vec<(usize, usize)>,
}

struct BodyWriter<'a, R> {
    archive: &'a mut ZipArchive<R>,
    relationships: &'a HashMap<String, String>,
    styles: &'a HashMap<String, String>,
    numbering: &'a Numbering,

    html: String,
    warnings: Vec<String>,

    paragraph: Option<Paragraph>,
    in_run: bool,
    in_run_props: bool,
    in_text: bool,
    format: RunFormat,
    run_content: String,

    drawing_depth: usize,
    fallback_depth: usize,
    image_alt: Option<String>,

    /// Open lists, innermost last; `true` for `<ol>`.
    lists: Vec<bool>,
    /// Whether each open `w:hyperlink` produced an `<a>`.
    links: Vec<bool>,
    cells: Vec<Cell>,
    tables: Vec<Table>,
}

impl<'a, R: Read + Seek> BodyWriter<'a, R> {
    fn new(
        archive: &'a mut ZipArchive<R>,
        relationships: &'a HashMap<String, String>,
        styles: &'a HashMap<String, String>,
        numbering: &'a Numbering,
    ) -> Self {
        Self {
            archive,
            relationships,
            styles,
            numbering,
            html: String::new(),
            warnings: Vec::new(),
            paragraph: None,
            in_run: false,
            in_run_props: false,
            in_text: false,
            format: RunFormat::default(),
            run_content: String::new(),
            drawing_depth: 0,
            fallback_depth: 0,
            image_alt: None,
            lists: Vec::new(),
            links: Vec::new(),
            cells: Vec::new(),
            tables: Vec::new(),
        }
    }

    fn walk(&mut self, xml: &str) -> Result<(), DocxError> {
        let mut reader = Reader::from_str(xml);
        let mut buf = Vec::new();
        loop {
            let event = reader
                .read_event_into(&mut buf)
                .map_err(|source| DocxError::Xml { part: DOCUMENT_PART, source })?;
            match event {
                Event::Start(e) => self.open(&e, false),
                Event::Empty(e) => self.open(&e, true),
                Event::End(e) => self.close(e.name().as_ref()),
                Event::Text(e) if self.accepts_text() => {
                    let text = e
                        .unescape()
                        .map_err(|source| DocxError::Xml { part: DOCUMENT_PART, source })?;
                    self.run_content.push_str(&escape(&text));
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }
        Ok(())
    }

    fn finish(mut self) -> HtmlOutput {
        self.close_lists();
        HtmlOutput {
            html: self.html,
            warnings: self.warnings,
        }
    }

    fn accepts_text(&self) -> bool {
        self.in_text && self.in_run && self.drawing_depth == 0 && self.fallback_depth == 0
    }

    fn warn(&mut self, message: String) {
        if !self.warnings.contains(&message) {
            self.warnings.push(message);
        }
    }

    /// Handle `Event::Start` and `Event::Empty`. Containers only react to
    /// non-empty starts; properties react to both.
    fn open(&mut self, e: &BytesStart<'_>, empty: bool) {
        let qname = e.name();
        let name = qname.as_ref();

        if name == b"mc:Fallback" {
            if !empty {
                self.fallback_depth += 1;
            }
            return;
        }
        if self.fallback_depth > 0 {
            return;
        }

        // Drawings: only image references and alt text are of interest.
        match name {
            b"w:drawing" | b"w:pict" | b"w:object" => {
                if !empty {
                    self.drawing_depth += 1;
                }
                return;
            }
            b"wp:docPr" if self.drawing_depth > 0 => {
                self.image_alt = get_attr(e, b"descr")
                    .or_else(|| get_attr(e, b"title"))
                    .filter(|alt| !alt.trim().is_empty());
                return;
            }
            b"a:blip" if self.drawing_depth > 0 => {
                if let Some(rel_id) = get_attr(e, b"r:embed") {
                    self.embed_image(&rel_id);
                }
                return;
            }
            b"v:imagedata" if self.drawing_depth > 0 => {
                if self.image_alt.is_none() {
                    self.image_alt = get_attr(e, b"o:title").filter(|alt| !alt.trim().is_empty());
                }
                if let Some(rel_id) = get_attr(e, b"r:id") {
                    self.embed_image(&rel_id);
                }
                return;
            }
            _ => {}
        }
        if self.drawing_depth > 0 {
            return;
        }

        match name {
            b"w:p" if !empty => {
                self.paragraph = Some(Paragraph::default());
            }
            b"w:pStyle" if self.paragraph.is_some() && !self.in_run => {
                if let Some(paragraph) = self.paragraph.as_mut() {
                    paragraph.style_id = get_attr(e, b"w:val");
                }
            }
            b"w:numId" if self.paragraph.is_some() && !self.in_run => {
                if let Some(paragraph) = self.paragraph.as_mut() {
                    paragraph.num_id = get_attr(e, b"w:val");
                }
            }
            b"w:ilvl" if self.paragraph.is_some() && !self.in_run => {
                if let Some(paragraph) = self.paragraph.as_mut() {
                    paragraph.level = get_attr(e, b"w:val").and_then(|v| v.parse().ok()).unwrap_or(0);
                }
            }
            b"w:r" if !empty && self.paragraph.is_some() => {
                self.in_run = true;
                self.format = RunFormat::default();
                self.run_content.clear();
            }
            b"w:rPr" if !empty && self.in_run => {
                self.in_run_props = true;
            }
            b"w:b" if self.in_run_props => self.format.bold = !check_val_off(e),
            b"w:i" if self.in_run_props => self.format.italic = !check_val_off(e),
            b"w:strike" | b"w:dstrike" if self.in_run_props => self.format.strike = !check_val_off(e),
            b"w:vertAlign" if self.in_run_props => match get_attr(e, b"w:val").as_deref() {
                Some("superscript") => self.format.superscript = true,
                Some("subscript") => self.format.subscript = true,
                _ => {}
            },
            b"w:t" if !empty && self.in_run => {
                self.in_text = true;
            }
            b"w:tab" if self.in_run && !self.in_run_props => {
                self.run_content.push('\t');
            }
            b"w:br" if self.in_run => {
                if !matches!(get_attr(e, b"w:type").as_deref(), Some("page") | Some("column")) {
                    self.run_content.push_str("<br />");
                }
            }
            b"w:hyperlink" if !empty && self.paragraph.is_some() => {
                let href = get_attr(e, b"r:id")
                    .and_then(|id| self.relationships.get(&id).cloned())
                    .or_else(|| get_attr(e, b"w:anchor").map(|anchor| format!("#{}", anchor)));
                let opened = href.is_some();
                if let (Some(href), Some(paragraph)) = (href, self.paragraph.as_mut()) {
                    paragraph.content.push_str(&format!("<a href=\"{}\">", escape(&href)));
                }
                self.links.push(opened);
            }
            b"w:tbl" if !empty => {
                self.close_lists();
                self.tables.push(Table::default());
                self.html.push_str("<table>");
            }
            b"w:tr" if !empty => {
                if let Some(table) = self.tables.last_mut() {
                    table.column = 0;
                }
                self.html.push_str("<tr>");
            }
            b"w:tc" if !empty => {
                self.cells.push(Cell {
                    start: self.html.len(),
                    column: self.tables.last().map_or(0, |t| t.column),
                    span: 1,
                    merge: None,
                });
                self.html.push_str("<td>");
            }
            b"w:gridSpan" if self.paragraph.is_none() => {
                let span = get_attr(e, b"w:val").and_then(|v| v.parse::<usize>().ok()).unwrap_or(1);
                if let (true, Some(cell)) = (span > 1, self.cells.last_mut()) {
                    cell.span = span;
                    self.html.insert_str(cell.start + "<td".len(), &format!(" colspan=\"{}\"", span));
                }
            }
            b"w:vMerge" if self.paragraph.is_none() => {
                if let Some(cell) = self.cells.last_mut() {
                    cell.merge = Some(match get_attr(e, b"w:val").as_deref() {
                        Some("restart") => VMerge::Restart,
                        _ => VMerge::Continue,
                    });
                }
            }
            _ => {}
        }
    }

    fn close(&mut self, name: &[u8]) {
        if name == b"mc:Fallback" {
            self.fallback_depth = self.fallback_depth.saturating_sub(1);
            return;
        }
        if self.fallback_depth > 0 {
            return;
        }
        if matches!(name, b"w:drawing" | b"w:pict" | b"w:object") {
            self.drawing_depth = self.drawing_depth.saturating_sub(1);
            if self.drawing_depth == 0 {
                self.image_alt = None;
            }
            return;
        }
        if self.drawing_depth > 0 {
            return;
        }

        match name {
            b"w:t" => self.in_text = false,
            b"w:rPr" => self.in_run_props = false,
            b"w:r" if self.in_run => self.finish_run(),
            b"w:hyperlink" => {
                if self.links.pop() == Some(true) {
                    if let Some(paragraph) = self.paragraph.as_mut() {
                        paragraph.content.push_str("</a>");
                    }
                }
            }
            b"w:p" => self.finish_paragraph(),
            b"w:tc" => {
                self.close_lists();
                if let Some(cell) = self.cells.pop() {
                    self.finish_cell(cell);
                }
            }
            b"w:tr" => self.html.push_str("</tr>"),
            b"w:tbl" => self.finish_table(),
            b"w:body" => self.close_lists(),
            _ => {}
        }
    }

    /// A cell continuing a vertical merge is dropped and counted towards the
    /// `rowspan` of the cell that started it.
    fn finish_cell(&mut self, cell: Cell) {
        let Some(table) = self.tables.last_mut() else {
            self.html.push_str("</td>");
            return;
        };
        table.column = cell.column + cell.span;

        let running = table.merging.get(&cell.column).copied();
        match (cell.merge, running) {
            (Some(VMerge::Continue), Some(index)) => {
                self.html.truncate(cell.start);
                table.rowspans[index].1 += 1;
                return;
            }
            (Some(VMerge::Restart), _) => {
                table.merging.insert(cell.column, table.rowspans.len());
                table.rowspans.push((cell.start, 1));
            }
            _ => {
                for column in cell.column..cell.column + cell.span {
                    table.merging.remove(&column);
                }
            }
        }
        self.html.push_str("</td>");
    }

    fn finish_table(&mut self) {
        if let Some(table) = self.tables.pop() {
            for (start, rows) in table.rowspans.into_iter().rev() {
                if rows > 1 {
                    self.html.insert_str(start + "<td".len(), &format!(" rowspan=\"{}\"", rows));
                }
            }
        }
        self.html.push_str("</table>");
    }

    fn finish_run(&mut self) {
        self.in_run = false;
        self.in_run_props = false;
        self.in_text = false;
        let content = std::mem::take(&mut self.run_content);
        if content.is_empty() {
            return;
        }
        let wrapped = self.format.wrap(&content);
        if let Some(paragraph) = self.paragraph.as_mut() {
            paragraph.content.push_str(&wrapped);
        }
    }

    fn finish_paragraph(&mut self) {
        let Some(paragraph) = self.paragraph.take() else {
            return;
        };
        if paragraph.content.trim().is_empty() {
            return;
        }

        let style_name = paragraph
            .style_id
            .as_ref()
            .map(|id| self.styles.get(id).cloned().unwrap_or_else(|| id.clone()));

        if let Some(level) = style_name.as_deref().and_then(heading_level) {
            self.close_lists();
            self.html
                .push_str(&format!("<h{0}>{1}</h{0}>", level, paragraph.content));
            return;
        }

        if let Some(num_id) = paragraph.num_id.as_deref().filter(|id| *id != "0") {
            let ordered = self.numbering.is_ordered(num_id, paragraph.level);
            self.open_list_item(ordered, paragraph.level);
            self.html.push_str(&paragraph.content);
            return;
        }

        if let (Some(id), Some(name)) = (paragraph.style_id.as_ref(), style_name.as_ref()) {
            if !PLAIN_STYLES.contains(&name.to_ascii_lowercase().as_str()) {
                self.warn(format!("Unrecognised paragraph style: '{}' (Style ID: {})", name, id));
            }
        }
        self.close_lists();
        self.html.push_str("<p>");
        self.html.push_str(&paragraph.content);
        self.html.push_str("</p>");
    }

    /// Every open list holds an open `<li>`; content follows the call.
    fn open_list_item(&mut self, ordered: bool, level: usize) {
        let depth = level + 1;
        while self.lists.len() > depth {
            self.close_list();
        }
        if self.lists.len() == depth {
            if self.lists.last() == Some(&ordered) {
                self.html.push_str("</li><li>");
                return;
            }
            self.close_list();
        }
        while self.lists.len() < depth {
            self.html.push_str(if ordered { "<ol>" } else { "<ul>" });
            self.html.push_str("<li>");
            self.lists.push(ordered);
        }
    }

    fn close_list(&mut self) {
        if let Some(ordered) = self.lists.pop() {
            self.html.push_str("</li>");
            self.html.push_str(if ordered { "</ol>" } else { "</ul>" });
        }
    }

    fn close_lists(&mut self) {
        while !self.lists.is_empty() {
            self.close_list();
        }
    }

    fn embed_image(&mut self, rel_id: &str) {
        let Some(target) = self.relationships.get(rel_id).cloned() else {
            self.warn(format!("Image relationship {} has no target", rel_id));
            return;
        };
        let part = part_path(&target);

        let Ok(format) = ImageFormat::from_path(&part) else {
            self.warn(format!("Image {} is in a format that cannot be displayed", part));
            return;
        };

        let mut bytes = Vec::new();
        let read = self
            .archive
            .by_name(&part)
            .map_err(DocxError::from)
            .and_then(|mut file| file.read_to_end(&mut bytes).map_err(DocxError::from));
        if let Err(e) = read {
            self.warn(format!("Image {} could not be read: {}", part, e));
            return;
        }

        let data = base64::engine::general_purpose::STANDARD.encode(&bytes);
        let alt = self
            .image_alt
            .as_deref()
            .map(|alt| format!(" alt=\"{}\"", escape(alt)))
            .unwrap_or_default();
        self.run_content.push_str(&format!(
            "<img src=\"data:{};base64,{}\"{} />",
            format.to_mime_type(),
            data,
            alt
        ));
    }
}
