//! Page layout for the built-in PDF backend.
//!
//! Markdown is flattened into blocks, blocks are word-wrapped and stacked onto
//! A4 pages, and every page gets a "Page N of M" label. The result is a list of
//! positioned draw operations; nothing here touches a PDF library, so the
//! geometry is testable on its own. Sizes and colours follow the stylesheet in
//! `template.rs`.

use crate::markdown::{heading_level, headings, TocEntry, TOC_MARKER};
use crate::template::{COPYRIGHT, TAGLINE};
use pulldown_cmark::{Event, Parser, Tag, TagEnd};
use unicode_normalization::UnicodeNormalization;

pub const PAGE_WIDTH_MM: f32 = 210.0;
pub const PAGE_HEIGHT_MM: f32 = 297.0;
pub const MARGIN_MM: f32 = 25.4;

const CONTENT_TOP: f32 = PAGE_HEIGHT_MM - MARGIN_MM;
const CONTENT_BOTTOM: f32 = MARGIN_MM;
const CONTENT_LEFT: f32 = MARGIN_MM;
const CONTENT_WIDTH: f32 = PAGE_WIDTH_MM - 2.0 * MARGIN_MM;
const LINE_HEIGHT: f32 = 1.6;

const BODY_PX: f32 = 11.0;
const SMALL_PX: f32 = 10.0;
const LIST_INDENT_PX: f32 = 30.0;

/// CSS pixels to millimetres.
pub fn px(v: f32) -> f32 {
    v * 25.4 / 96.0
}

fn px_to_pt(v: f32) -> f32 {
    v * 0.75
}

fn pt_to_mm(v: f32) -> f32 {
    v * 25.4 / 72.0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Face {
    Regular,
    Bold,
    Italic,
    BoldItalic,
    Mono,
}

impl Face {
    fn styled(bold: bool, italic: bool) -> Self {
        match (bold, italic) {
            (false, false) => Face::Regular,
            (true, false) => Face::Bold,
            (false, true) => Face::Italic,
            (true, true) => Face::BoldItalic,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    const fn hex(v: u32) -> Self {
        Self {
            r: ((v >> 16) & 0xff) as u8,
            g: ((v >> 8) & 0xff) as u8,
            b: (v & 0xff) as u8,
        }
    }
}

pub const TEXT: Color = Color::hex(0x333333);
pub const H1: Color = Color::hex(0x2c3e50);
pub const H2: Color = Color::hex(0x34495e);
pub const H3: Color = Color::hex(0x7f8c8d);
pub const ACCENT: Color = Color::hex(0x3498db);
pub const MUTED: Color = Color::hex(0x666666);
pub const BORDER: Color = Color::hex(0xcccccc);
pub const QUOTE: Color = Color::hex(0x555555);

/// Coordinates are millimetres from the bottom-left corner; `y` of text is its baseline.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Text {
        x: f32,
        y: f32,
        size_pt: f32,
        face: Face,
        color: Color,
        text: String,
    },
    Rule {
        x1: f32,
        x2: f32,
        y: f32,
        thickness_pt: f32,
        color: Color,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LaidOutPage {
    pub ops: Vec<DrawOp>,
}

impl LaidOutPage {
    /// All text on the page in draw order, space separated.
    pub fn text(&self) -> String {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { text, .. } => Some(text.as_str()),
                DrawOp::Rule { .. } => None,
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Run {
    pub face: Face,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Heading {
        level: u8,
        runs: Vec<Run>,
    },
    Paragraph {
        runs: Vec<Run>,
        indent_mm: f32,
        marker: Option<String>,
        quoted: bool,
        in_list: bool,
    },
    Code {
        text: String,
        indent_mm: f32,
    },
    Rule,
    Gap(f32),
}

/// Lay out a full document: header, body, footer and page labels.
pub fn layout_document(title: &str, markdown: &str, generated_on: &str) -> Vec<LaidOutPage> {
    let blocks = blocks_from_markdown(markdown);

    let mut l = Layout::new();
    l.header(title);
    for block in &blocks {
        l.block(block);
    }
    l.footer(generated_on);
    l.finish()
}

pub fn blocks_from_markdown(markdown: &str) -> Vec<Block> {
    let mut b = BlockBuilder {
        toc: headings(markdown),
        ..BlockBuilder::default()
    };
    for ev in Parser::new_ext(markdown, crate::markdown::options()) {
        b.event(ev);
    }
    b.flush();
    b.blocks
}

#[derive(Default)]
struct BlockBuilder {
    blocks: Vec<Block>,
    runs: Vec<Run>,
    strong: u32,
    emphasis: u32,
    quote: u32,
    heading: Option<u8>,
    lists: Vec<Option<u64>>,
    pending_marker: Option<String>,
    code: Option<String>,
    links: Vec<(String, String)>,
    table_head: bool,
    table_cell: usize,
    toc: Vec<TocEntry>,
}

impl BlockBuilder {
    fn event(&mut self, ev: Event<'_>) {
        match ev {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),
            Event::Text(t) => match self.code.as_mut() {
                Some(code) => code.push_str(&t),
                None => self.push_text(&t, false),
            },
            Event::Code(t) => self.push_text(&t, true),
            Event::SoftBreak => self.push_text(" ", false),
            Event::HardBreak => self.push_text("\n", false),
            Event::Rule => {
                self.flush();
                self.blocks.push(Block::Rule);
            }
            Event::TaskListMarker(done) => {
                self.push_text(if done { "[x] " } else { "[ ] " }, false)
            }
            Event::FootnoteReference(label) => self.push_text(&format!("[{label}]"), false),
            _ => {}
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Heading { level, .. } => {
                self.flush();
                self.heading = Some(heading_level(level));
            }
            Tag::BlockQuote { .. } => {
                self.flush();
                self.quote += 1;
            }
            Tag::List(start) => {
                self.flush();
                self.lists.push(start);
            }
            Tag::Item => {
                self.flush();
                let marker = match self.lists.last_mut() {
                    Some(Some(n)) => {
                        let m = format!("{n}.");
                        *n += 1;
                        m
                    }
                    _ => "-".to_string(),
                };
                self.pending_marker = Some(marker);
            }
            Tag::CodeBlock { .. } => {
                self.flush();
                self.code = Some(String::new());
            }
            Tag::Emphasis => self.emphasis += 1,
            Tag::Strong => self.strong += 1,
            Tag::Link { dest_url, .. } => self.links.push((dest_url.to_string(), String::new())),
            Tag::Table { .. } => self.flush(),
            Tag::TableHead => {
                self.table_head = true;
                self.table_cell = 0;
            }
            Tag::TableRow => self.table_cell = 0,
            Tag::TableCell => {
                if self.table_cell > 0 {
                    self.push_text("  |  ", false);
                }
                self.table_cell += 1;
            }
            Tag::FootnoteDefinition(label) => {
                self.flush();
                self.pending_marker = Some(format!("[{label}]"));
            }
            _ => {}
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph if self.holds_toc_marker() => {
                self.runs.clear();
                self.push_toc();
            }
            TagEnd::Paragraph => self.flush(),
            TagEnd::Heading { .. } => {
                let level = self.heading.take().unwrap_or(1);
                let runs = std::mem::take(&mut self.runs);
                self.blocks.push(Block::Heading { level, runs });
            }
            TagEnd::BlockQuote { .. } => {
                self.flush();
                self.quote = self.quote.saturating_sub(1);
            }
            TagEnd::List { .. } => {
                self.flush();
                self.lists.pop();
                if self.lists.is_empty() {
                    self.blocks.push(Block::Gap(px(6.0)));
                }
            }
            TagEnd::Item => self.flush(),
            TagEnd::CodeBlock => {
                if let Some(text) = self.code.take() {
                    self.blocks.push(Block::Code {
                        text,
                        indent_mm: self.indent_mm(),
                    });
                }
            }
            TagEnd::Emphasis => self.emphasis = self.emphasis.saturating_sub(1),
            TagEnd::Strong => self.strong = self.strong.saturating_sub(1),
            TagEnd::Link => {
                if let Some((dest, text)) = self.links.pop() {
                    let bare = dest.strip_prefix("mailto:").unwrap_or(&dest);
                    if !dest.is_empty() && !dest.starts_with('#') && bare != text.trim() {
                        self.push_text(&format!(" ({bare})"), false);
                    }
                }
            }
            TagEnd::TableHead => {
                self.flush();
                self.table_head = false;
            }
            TagEnd::TableRow => self.flush(),
            TagEnd::Table => {
                self.flush();
                self.blocks.push(Block::Gap(px(6.0)));
            }
            TagEnd::FootnoteDefinition => self.flush(),
            _ => {}
        }
    }

    fn holds_toc_marker(&self) -> bool {
        self.pending_marker.is_none()
            && self.runs.iter().all(|r| r.face != Face::Mono)
            && self.runs.iter().map(|r| r.text.as_str()).collect::<String>().trim() == TOC_MARKER
    }

    /// Headings as an indented bullet list, nested by level.
    fn push_toc(&mut self) {
        let base = self.toc.iter().map(|e| e.level).min().unwrap_or(1);
        let indent = self.indent_mm();
        for entry in &self.toc {
            let depth = f32::from(entry.level - base + 1);
            self.blocks.push(Block::Paragraph {
                runs: vec![Run {
                    face: Face::Regular,
                    text: to_pdf_text(&entry.text),
                }],
                indent_mm: indent + px(LIST_INDENT_PX) * depth,
                marker: Some("-".to_string()),
                quoted: self.quote > 0,
                in_list: true,
            });
        }
        if !self.toc.is_empty() {
            self.blocks.push(Block::Gap(px(6.0)));
        }
    }

    fn indent_mm(&self) -> f32 {
        px(LIST_INDENT_PX) * (self.lists.len() as f32) + px(20.0) * (self.quote as f32)
    }

    fn push_text(&mut self, text: &str, mono: bool) {
        for (_, link_text) in self.links.iter_mut() {
            link_text.push_str(text);
        }
        let face = if mono {
            Face::Mono
        } else {
            Face::styled(
                self.strong > 0 || self.heading.is_some() || self.table_head,
                self.emphasis > 0 || self.quote > 0,
            )
        };
        let text = to_pdf_text(text);
        if let Some(last) = self.runs.last_mut() {
            if last.face == face {
                last.text.push_str(&text);
                return;
            }
        }
        self.runs.push(Run { face, text });
    }

    fn flush(&mut self) {
        let runs = std::mem::take(&mut self.runs);
        let blank = runs.iter().all(|r| r.text.trim().is_empty());
        if blank && self.pending_marker.is_none() {
            return;
        }
        let marker = self.pending_marker.take();
        self.blocks.push(Block::Paragraph {
            runs,
            indent_mm: self.indent_mm(),
            marker,
            quoted: self.quote > 0,
            in_list: !self.lists.is_empty(),
        });
    }
}

/// Reduce text to what the built-in PDF fonts can draw.
pub fn to_pdf_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '\u{2018}' | '\u{2019}' | '\u{201a}' | '\u{2032}' => out.push('\''),
            '\u{201c}' | '\u{201d}' | '\u{201e}' | '\u{2033}' => out.push('"'),
            '\u{2010}'..='\u{2015}' | '\u{2212}' => out.push('-'),
            '\u{2026}' => out.push_str("..."),
            '\u{2022}' | '\u{25cf}' => out.push('-'),
            '\u{a9}' => out.push_str("(c)"),
            '\u{ae}' => out.push_str("(R)"),
            '\u{2122}' => out.push_str("(TM)"),
            '\u{20ac}' => out.push_str("EUR"),
            '\u{a0}' | '\u{2002}'..='\u{200a}' => out.push(' '),
            '\u{200b}' | '\u{feff}' => {}
            '\t' => out.push_str("    "),
            c if c.is_ascii() => out.push(c),
            c => {
                let folded: String = c.to_string().nfkd().filter(char::is_ascii).collect();
                if folded.is_empty() {
                    out.push('?');
                } else {
                    out.push_str(&folded);
                }
            }
        }
    }
    out
}

fn char_width_em(c: char, face: Face) -> f32 {
    if face == Face::Mono {
        return 0.6;
    }
    let base = match c {
        ' ' => 0.25,
        'i' | 'j' | 'l' | '.' | ',' | ':' | ';' | '\'' | '!' | '|' => 0.28,
        'f' | 'r' | 't' | 'I' | '(' | ')' | '-' | '[' | ']' | '/' => 0.33,
        'm' | 'M' | 'W' | '@' => 0.89,
        'w' | '%' => 0.72,
        'A'..='Z' => 0.67,
        '0'..='9' => 0.5,
        _ => 0.47,
    };
    match face {
        Face::Bold | Face::BoldItalic => base * 1.06,
        _ => base,
    }
}

/// Width in millimetres of `text` set in `face` at `size_pt`.
pub fn text_width(text: &str, face: Face, size_pt: f32) -> f32 {
    let em = pt_to_mm(size_pt);
    text.chars().map(|c| char_width_em(c, face) * em).sum()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Align {
    Left,
    Center,
    Justify,
}

#[derive(Debug, Clone)]
struct Word {
    face: Face,
    text: String,
    space_before: f32,
    width: f32,
}

#[derive(Debug, Clone, Default)]
struct Line {
    words: Vec<Word>,
    width: f32,
    forced_end: bool,
}

enum Token {
    Word(Face, String),
    Space(Face),
    Break,
}

fn tokenize(runs: &[Run]) -> Vec<Token> {
    let mut out = Vec::new();
    for run in runs {
        let mut word = String::new();
        for ch in run.text.chars() {
            if ch.is_whitespace() {
                if !word.is_empty() {
                    out.push(Token::Word(run.face, std::mem::take(&mut word)));
                }
                out.push(if ch == '\n' {
                    Token::Break
                } else {
                    Token::Space(run.face)
                });
            } else {
                word.push(ch);
            }
        }
        if !word.is_empty() {
            out.push(Token::Word(run.face, word));
        }
    }
    out
}

fn wrap(runs: &[Run], size_pt: f32, width: f32) -> Vec<Line> {
    let mut lines = Vec::new();
    let mut cur = Line::default();
    let mut pending_space: Option<Face> = None;

    for tok in tokenize(runs) {
        match tok {
            Token::Break => {
                cur.forced_end = true;
                lines.push(std::mem::take(&mut cur));
                pending_space = None;
            }
            Token::Space(face) => {
                if !cur.words.is_empty() {
                    pending_space = Some(face);
                }
            }
            Token::Word(face, text) => {
                let space = pending_space
                    .take()
                    .map(|f| text_width(" ", f, size_pt))
                    .unwrap_or(0.0);
                let w = text_width(&text, face, size_pt);

                if !cur.words.is_empty() && cur.width + space + w > width {
                    lines.push(std::mem::take(&mut cur));
                    place_word(&mut lines, &mut cur, face, text, 0.0, size_pt, width);
                } else {
                    let space = if cur.words.is_empty() { 0.0 } else { space };
                    place_word(&mut lines, &mut cur, face, text, space, size_pt, width);
                }
            }
        }
    }
    if !cur.words.is_empty() {
        lines.push(cur);
    }
    lines
}

/// Append a word to `cur`, splitting it across lines when it alone exceeds `width`.
fn place_word(
    lines: &mut Vec<Line>,
    cur: &mut Line,
    face: Face,
    text: String,
    space_before: f32,
    size_pt: f32,
    width: f32,
) {
    let w = text_width(&text, face, size_pt);
    if w <= width || !cur.words.is_empty() {
        cur.width += space_before + w;
        cur.words.push(Word {
            face,
            text,
            space_before,
            width: w,
        });
        return;
    }

    let mut piece = String::new();
    let mut piece_w = 0.0;
    for ch in text.chars() {
        let cw = char_width_em(ch, face) * pt_to_mm(size_pt);
        if !piece.is_empty() && piece_w + cw > width {
            cur.width = piece_w;
            cur.words.push(Word {
                face,
                text: std::mem::take(&mut piece),
                space_before: 0.0,
                width: piece_w,
            });
            lines.push(std::mem::take(cur));
            piece_w = 0.0;
        }
        piece.push(ch);
        piece_w += cw;
    }
    if !piece.is_empty() {
        cur.width = piece_w;
        cur.words.push(Word {
            face,
            text: piece,
            space_before: 0.0,
            width: piece_w,
        });
    }
}

#[derive(Debug, Clone, Copy)]
struct Style {
    size_pt: f32,
    color: Color,
    align: Align,
}

impl Style {
    fn line_height(&self) -> f32 {
        pt_to_mm(self.size_pt) * LINE_HEIGHT
    }
}

fn heading_style(level: u8) -> (Style, f32, f32) {
    // (style, margin-top px, margin-bottom px)
    match level {
        1 => (
            Style {
                size_pt: px_to_pt(18.0),
                color: H1,
                align: Align::Center,
            },
            12.0,
            20.0,
        ),
        2 => (
            Style {
                size_pt: px_to_pt(14.0),
                color: H2,
                align: Align::Left,
            },
            25.0,
            10.0,
        ),
        3 => (
            Style {
                size_pt: px_to_pt(12.0),
                color: H3,
                align: Align::Left,
            },
            15.0,
            8.0,
        ),
        _ => (
            Style {
                size_pt: px_to_pt(BODY_PX),
                color: TEXT,
                align: Align::Left,
            },
            12.0,
            6.0,
        ),
    }
}

fn body_style() -> Style {
    Style {
        size_pt: px_to_pt(BODY_PX),
        color: TEXT,
        align: Align::Justify,
    }
}

struct Layout {
    done: Vec<LaidOutPage>,
    current: LaidOutPage,
    y: f32,
}

impl Layout {
    fn new() -> Self {
        Self {
            done: Vec::new(),
            current: LaidOutPage::default(),
            y: CONTENT_TOP,
        }
    }

    fn at_page_top(&self) -> bool {
        self.y >= CONTENT_TOP
    }

    fn new_page(&mut self) {
        self.done.push(std::mem::take(&mut self.current));
        self.y = CONTENT_TOP;
    }

    /// Start a new page unless `h` more millimetres fit on this one.
    fn ensure(&mut self, h: f32) {
        if self.y - h < CONTENT_BOTTOM && !self.at_page_top() {
            self.new_page();
        }
    }

    /// Vertical margin; collapses at the top of a page.
    fn space(&mut self, h: f32) {
        if self.at_page_top() {
            return;
        }
        if self.y - h < CONTENT_BOTTOM {
            self.new_page();
        } else {
            self.y -= h;
        }
    }

    fn lines(&mut self, lines: &[Line], style: Style, x: f32, width: f32, marker: Option<&str>) {
        let lh = style.line_height();
        let em = pt_to_mm(style.size_pt);
        for (i, line) in lines.iter().enumerate() {
            self.ensure(lh);
            let baseline = self.y - 1.05 * em;

            if i == 0 {
                if let Some(marker) = marker {
                    let mw = text_width(marker, Face::Regular, style.size_pt);
                    self.current.ops.push(DrawOp::Text {
                        x: x - mw - px(6.0),
                        y: baseline,
                        size_pt: style.size_pt,
                        face: Face::Regular,
                        color: style.color,
                        text: marker.to_string(),
                    });
                }
            }

            let last = i + 1 == lines.len();
            let gaps = line.words.iter().filter(|w| w.space_before > 0.0).count();
            let extra = if style.align == Align::Justify && !last && !line.forced_end && gaps > 0
            {
                ((width - line.width) / gaps as f32).max(0.0)
            } else {
                0.0
            };
            let mut cx = match style.align {
                Align::Center => x + ((width - line.width) / 2.0).max(0.0),
                Align::Left | Align::Justify => x,
            };
            for word in &line.words {
                if word.space_before > 0.0 {
                    cx += word.space_before + extra;
                }
                self.current.ops.push(DrawOp::Text {
                    x: cx,
                    y: baseline,
                    size_pt: style.size_pt,
                    face: word.face,
                    color: style.color,
                    text: word.text.clone(),
                });
                cx += word.width;
            }
            self.y -= lh;
        }
    }

    fn rule(&mut self, thickness_px: f32, color: Color) {
        let t = px(thickness_px);
        self.ensure(t);
        self.y -= t / 2.0;
        self.current.ops.push(DrawOp::Rule {
            x1: CONTENT_LEFT,
            x2: CONTENT_LEFT + CONTENT_WIDTH,
            y: self.y,
            thickness_pt: px_to_pt(thickness_px),
            color,
        });
        self.y -= t / 2.0;
    }

    fn h1(&mut self, runs: &[Run], margin_top: bool) {
        let (style, top, bottom) = heading_style(1);
        let lines = wrap(runs, style.size_pt, CONTENT_WIDTH);
        if margin_top {
            self.space(px(top));
        }
        self.ensure(style.line_height() * lines.len() as f32 + px(12.0));
        self.lines(&lines, style, CONTENT_LEFT, CONTENT_WIDTH, None);
        self.space(px(10.0));
        self.rule(2.0, ACCENT);
        self.space(px(bottom));
    }

    fn header(&mut self, title: &str) {
        let runs = vec![Run {
            face: Face::Bold,
            text: to_pdf_text(title),
        }];
        self.h1(&runs, false);

        let tagline = vec![Run {
            face: Face::Bold,
            text: to_pdf_text(TAGLINE),
        }];
        let style = Style {
            align: Align::Center,
            ..body_style()
        };
        let lines = wrap(&tagline, style.size_pt, CONTENT_WIDTH);
        self.lines(&lines, style, CONTENT_LEFT, CONTENT_WIDTH, None);
        self.space(px(10.0 + 30.0));
    }

    fn block(&mut self, block: &Block) {
        match block {
            Block::Heading { level: 1, runs } => self.h1(runs, true),
            Block::Heading { level, runs } => {
                let (style, top, bottom) = heading_style(*level);
                let lines = wrap(runs, style.size_pt, CONTENT_WIDTH);
                self.space(px(top));
                // Keep the heading with the first line that follows it.
                self.ensure(
                    style.line_height() * lines.len() as f32
                        + px(bottom)
                        + body_style().line_height(),
                );
                self.lines(&lines, style, CONTENT_LEFT, CONTENT_WIDTH, None);
                self.space(px(bottom));
            }
            Block::Paragraph {
                runs,
                indent_mm,
                marker,
                quoted,
                in_list,
            } => {
                let style = if *quoted {
                    Style {
                        color: QUOTE,
                        ..body_style()
                    }
                } else {
                    body_style()
                };
                let x = CONTENT_LEFT + indent_mm;
                let width = CONTENT_WIDTH - indent_mm;
                let lines = wrap(runs, style.size_pt, width);
                self.lines(&lines, style, x, width, marker.as_deref());
                self.space(px(if *in_list { 4.0 } else { 10.0 }));
            }
            Block::Code { text, indent_mm } => {
                let style = Style {
                    size_pt: px_to_pt(SMALL_PX),
                    color: TEXT,
                    align: Align::Left,
                };
                let x = CONTENT_LEFT + indent_mm + px(10.0);
                let width = CONTENT_WIDTH - indent_mm - px(10.0);
                let lines: Vec<Line> = text
                    .trim_end_matches('\n')
                    .split('\n')
                    .flat_map(|src| code_line(src, style.size_pt, width))
                    .collect();
                self.lines(&lines, style, x, width, None);
                self.space(px(10.0));
            }
            Block::Rule => {
                self.space(px(10.0));
                self.rule(1.0, BORDER);
                self.space(px(10.0));
            }
            Block::Gap(h) => self.space(*h),
        }
    }

    fn footer(&mut self, generated_on: &str) {
        let style = Style {
            size_pt: px_to_pt(SMALL_PX),
            color: MUTED,
            align: Align::Center,
        };
        let copyright = wrap(
            &[Run {
                face: Face::Regular,
                text: to_pdf_text(COPYRIGHT),
            }],
            style.size_pt,
            CONTENT_WIDTH,
        );
        let stamp = wrap(
            &[Run {
                face: Face::Regular,
                text: to_pdf_text(&format!("Generated on: {generated_on}")),
            }],
            style.size_pt,
            CONTENT_WIDTH,
        );

        self.space(px(30.0));
        self.ensure(
            px(1.0) + px(20.0) + style.line_height() * (copyright.len() + stamp.len()) as f32,
        );
        self.rule(1.0, BORDER);
        self.space(px(20.0));
        self.lines(&copyright, style, CONTENT_LEFT, CONTENT_WIDTH, None);
        self.space(px(10.0));
        self.lines(&stamp, style, CONTENT_LEFT, CONTENT_WIDTH, None);
    }

    fn finish(mut self) -> Vec<LaidOutPage> {
        self.done.push(self.current);
        let total = self.done.len();
        let size_pt = px_to_pt(SMALL_PX);
        for (i, page) in self.done.iter_mut().enumerate() {
            let label = format!("Page {} of {}", i + 1, total);
            let w = text_width(&label, Face::Regular, size_pt);
            page.ops.push(DrawOp::Text {
                x: (PAGE_WIDTH_MM - w) / 2.0,
                y: MARGIN_MM / 2.0,
                size_pt,
                face: Face::Regular,
                color: MUTED,
                text: label,
            });
        }
        self.done
    }
}

fn code_line(src: &str, size_pt: f32, width: f32) -> Vec<Line> {
    let src = to_pdf_text(src);
    let cw = char_width_em('m', Face::Mono) * pt_to_mm(size_pt);
    let per_line = ((width / cw).floor() as usize).max(1);
    let chars: Vec<char> = src.chars().collect();
    if chars.is_empty() {
        return vec![Line {
            forced_end: true,
            ..Line::default()
        }];
    }
    chars
        .chunks(per_line)
        .map(|chunk| {
            let text: String = chunk.iter().collect();
            let w = cw * chunk.len() as f32;
            Line {
                words: vec![Word {
                    face: Face::Mono,
                    text,
                    space_before: 0.0,
                    width: w,
                }],
                width: w,
                forced_end: true,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(text: &str) -> Vec<Run> {
        vec![Run {
            face: Face::Regular,
            text: text.to_string(),
        }]
    }

    #[test]
    fn wrap_respects_width() {
        let size = px_to_pt(BODY_PX);
        let text = "lorem ipsum dolor sit amet ".repeat(40);
        let lines = wrap(&plain(&text), size, 60.0);
        assert!(lines.len() > 5);
        for line in &lines {
            assert!(line.width <= 60.0 + 0.01, "line too wide: {}", line.width);
        }
    }

    #[test]
    fn overlong_word_is_split() {
        let size = px_to_pt(BODY_PX);
        let lines = wrap(&plain(&"x".repeat(400)), size, 40.0);
        assert!(lines.len() > 1);
        let rejoined: String = lines
            .iter()
            .flat_map(|l| l.words.iter().map(|w| w.text.as_str()))
            .collect();
        assert_eq!(rejoined.len(), 400);
    }

    #[test]
    fn hard_break_forces_new_line() {
        let lines = wrap(&plain("first\nsecond"), 8.0, 150.0);
        assert_eq!(lines.len(), 2);
        assert!(lines[0].forced_end);
    }

    #[test]
    fn pdf_text_transliterates() {
        assert_eq!(to_pdf_text("“Quoted” — it’s © café"), "\"Quoted\" - it's (c) cafe");
    }
}
