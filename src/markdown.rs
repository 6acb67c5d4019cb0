//! Markdown to HTML conversion.
//!
//! Headings receive slug ids and a paragraph holding only `[TOC]` expands into
//! a nested table of contents, the same output shape as Python-Markdown's
//! `toc` extension produces.

use pulldown_cmark::{html, CowStr, Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;
use unicode_normalization::UnicodeNormalization;

pub(crate) const TOC_MARKER: &str = "[TOC]";

pub fn options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_HEADING_ATTRIBUTES
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TocEntry {
    pub level: u8,
    pub id: String,
    pub text: String,
}

pub fn to_html(md: &str) -> String {
    let mut events: Vec<Event<'_>> = Parser::new_ext(md, options()).collect();
    let toc = assign_heading_ids(&mut events);
    let events = expand_toc_marker(events, &toc);

    let mut out = String::with_capacity(md.len() * 3 / 2);
    html::push_html(&mut out, events.into_iter());
    out
}

/// Headings in document order, with the ids `to_html` gives them.
pub fn headings(md: &str) -> Vec<TocEntry> {
    let mut events: Vec<Event<'_>> = Parser::new_ext(md, options()).collect();
    assign_heading_ids(&mut events)
}

fn assign_heading_ids(events: &mut [Event<'_>]) -> Vec<TocEntry> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut toc = Vec::new();

    for i in 0..events.len() {
        let Event::Start(Tag::Heading { level, id, .. }) = &events[i] else {
            continue;
        };
        let level = *level;
        let text = heading_text(&events[i + 1..]);

        let id = match id {
            Some(explicit) => {
                seen.insert(explicit.to_string());
                explicit.to_string()
            }
            None => unique_slug(&slugify(&text), &mut seen),
        };
        if let Event::Start(Tag::Heading { id: slot, .. }) = &mut events[i] {
            if slot.is_none() {
                *slot = Some(CowStr::from(id.clone()));
            }
        }

        toc.push(TocEntry {
            level: heading_level(level),
            id,
            text,
        });
    }
    toc
}

fn heading_text(rest: &[Event<'_>]) -> String {
    let mut text = String::new();
    for ev in rest {
        match ev {
            Event::End(TagEnd::Heading(_)) => break,
            Event::Text(t) | Event::Code(t) => text.push_str(t),
            Event::SoftBreak | Event::HardBreak => text.push(' '),
            _ => {}
        }
    }
    text.trim().to_string()
}

pub(crate) fn heading_level(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

pub fn slugify(text: &str) -> String {
    static STRIP: OnceLock<Regex> = OnceLock::new();
    static COLLAPSE: OnceLock<Regex> = OnceLock::new();
    let strip = STRIP.get_or_init(|| Regex::new(r"[^\w\s-]").expect("static regex"));
    let collapse = COLLAPSE.get_or_init(|| Regex::new(r"[-\s]+").expect("static regex"));

    let ascii: String = text.nfkd().filter(char::is_ascii).collect();
    let stripped = strip.replace_all(&ascii, "");
    let lowered = stripped.trim().to_lowercase();
    collapse.replace_all(&lowered, "-").into_owned()
}

/// An empty slug is never used as is: it becomes `_1`, `_2`, ...
fn unique_slug(base: &str, seen: &mut HashSet<String>) -> String {
    let mut candidate = base.to_string();
    let mut n = 0u32;
    while candidate.is_empty() || seen.contains(&candidate) {
        n += 1;
        candidate = format!("{base}_{n}");
    }
    seen.insert(candidate.clone());
    candidate
}

fn expand_toc_marker<'a>(events: Vec<Event<'a>>, toc: &[TocEntry]) -> Vec<Event<'a>> {
    let mut out = Vec::with_capacity(events.len());
    let mut i = 0;
    while i < events.len() {
        if let Event::Start(Tag::Paragraph) = &events[i] {
            if let Some(end) = toc_paragraph_end(&events[i + 1..]) {
                out.push(Event::Html(CowStr::from(render_toc(toc))));
                i += end + 2;
                continue;
            }
        }
        out.push(events[i].clone());
        i += 1;
    }
    out
}

/// Offset of the paragraph's closing event when the paragraph holds only the marker.
fn toc_paragraph_end(rest: &[Event<'_>]) -> Option<usize> {
    let mut text = String::new();
    for (offset, ev) in rest.iter().enumerate() {
        match ev {
            Event::Text(t) => text.push_str(t),
            Event::End(TagEnd::Paragraph) => {
                return (text.trim() == TOC_MARKER).then_some(offset);
            }
            _ => return None,
        }
    }
    None
}

pub fn render_toc(toc: &[TocEntry]) -> String {
    let mut out = String::from("<div class=\"toc\">\n");
    if toc.is_empty() {
        out.push_str("</div>\n");
        return out;
    }

    let base = toc.iter().map(|e| e.level).min().unwrap_or(1);
    let mut depth = 0usize;
    let mut open_item = vec![false];

    for entry in toc {
        let want = usize::from(entry.level - base) + 1;
        while depth < want {
            out.push_str("<ul>\n");
            depth += 1;
            open_item.push(false);
        }
        while depth > want {
            close_item(&mut out, &mut open_item);
            out.push_str("</ul>\n");
            open_item.pop();
            depth -= 1;
        }
        close_item(&mut out, &mut open_item);
        out.push_str(&format!(
            "<li><a href=\"#{}\">{}</a>",
            crate::template::escape_html(&entry.id),
            crate::template::escape_html(&entry.text)
        ));
        if let Some(last) = open_item.last_mut() {
            *last = true;
        }
    }
    while depth > 0 {
        close_item(&mut out, &mut open_item);
        out.push_str("</ul>\n");
        open_item.pop();
        depth -= 1;
    }
    out.push_str("</div>\n");
    out
}

fn close_item(out: &mut String, open_item: &mut [bool]) {
    if let Some(open) = open_item.last_mut() {
        if *open {
            out.push_str("</li>\n");
            *open = false;
        }
    }
}
