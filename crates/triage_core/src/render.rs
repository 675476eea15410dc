//! Report text renderer.
//!
//! Specialist reports arrive as a loose mix of plain prose and lightweight
//! markup: `Section: X` headers, `**X**` / `### X` headings, `*bold*` spans,
//! `-`/`*`/`•` bullets, and blank-line paragraph breaks. The pipeline here
//! turns that into a [`RenderedDocument`] in a fixed stage order: scrub
//! separators, classify lines, group runs into blocks. The stages are not
//! independent; later ones rely on what earlier ones already consumed.

use crate::document::{Block, Inline, RenderedDocument};

const BULLET_MARKERS: [char; 3] = ['-', '*', '•'];

/// Render raw report text into a structured document.
///
/// Total and deterministic: input that matches no markup convention degrades
/// to plain paragraphs instead of failing.
pub fn render(raw: &str) -> RenderedDocument {
    let scrubbed = strip_separators(raw);
    let mut lines = Vec::new();
    for line in scrubbed.lines() {
        classify_line(line, &mut lines);
    }
    RenderedDocument {
        blocks: group_blocks(lines),
    }
}

/// One classified source line. A single raw line can expand to several of
/// these when an embedded `**span**` is promoted to a heading.
#[derive(Debug, PartialEq, Eq)]
enum Line {
    Blank,
    Heading { level: u8, text: String },
    Item(Vec<Inline>),
    Text(Vec<Inline>),
}

/// Remove `---` separator markers. A marker that ends its line takes the
/// newline with it, so a rule line vanishes without leaving a blank line.
fn strip_separators(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(idx) = rest.find("---") {
        out.push_str(&rest[..idx]);
        let after = &rest[idx + 3..];
        let trimmed = after.trim_start_matches([' ', '\t']);
        rest = match trimmed.strip_prefix('\n') {
            Some(next_line) => next_line,
            None => after,
        };
    }
    out.push_str(rest);
    out
}

fn classify_line(line: &str, out: &mut Vec<Line>) {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        out.push(Line::Blank);
        return;
    }
    if let Some(rest) = trimmed.strip_prefix("Section:") {
        let title = rest.trim();
        if !title.is_empty() {
            out.push(Line::Heading {
                level: 3,
                text: title.to_string(),
            });
            return;
        }
    }
    if let Some(rest) = trimmed.strip_prefix("### ") {
        out.push(Line::Heading {
            level: 3,
            text: rest.trim().to_string(),
        });
        return;
    }
    if let Some(rest) = trimmed.strip_prefix("## ") {
        out.push(Line::Heading {
            level: 4,
            text: rest.trim().to_string(),
        });
        return;
    }
    if let Some(spans) = parse_list_item(trimmed) {
        out.push(Line::Item(spans));
        return;
    }
    promote_headings(trimmed, out);
}

/// A line starting with a bullet marker plus whitespace is a list item.
/// `*text*` is not a bullet: the marker must be followed by whitespace.
fn parse_list_item(trimmed: &str) -> Option<Vec<Inline>> {
    let rest = BULLET_MARKERS
        .iter()
        .find_map(|marker| trimmed.strip_prefix(*marker))?;
    let body = rest.strip_prefix(char::is_whitespace)?.trim_start();
    if body.is_empty() {
        return None;
    }
    Some(parse_item_spans(body))
}

/// Item bodies keep their emphasis inline: a leading `**label**` becomes a
/// bold label with the remainder as plain text, and any other closed
/// emphasis span renders bold. Bullet lines are the one place a double
/// marker is not promoted to a heading.
fn parse_item_spans(body: &str) -> Vec<Inline> {
    if let Some((label, after)) = take_delimited(body, "**") {
        let tail = after.trim_start();
        let mut spans = vec![Inline::Bold(label.to_string())];
        if !tail.is_empty() {
            spans.extend(parse_spans(&format!(" {tail}"), true));
        }
        return spans;
    }
    parse_spans(body, true)
}

/// Promote every closed `**span**` on a non-bullet line to a level-3
/// heading. A span used mid-sentence still becomes a heading, splitting the
/// surrounding text into its own lines; emphasis and headings are written
/// identically by the reporting service, so all double spans are treated as
/// headings.
fn promote_headings(line: &str, out: &mut Vec<Line>) {
    let mut rest = line;
    while let Some((start, content, resume)) = find_double_span(rest) {
        let before = rest[..start].trim();
        if !before.is_empty() {
            out.push(Line::Text(parse_spans(before, false)));
        }
        out.push(Line::Heading {
            level: 3,
            text: content.to_string(),
        });
        rest = &rest[resume..];
    }
    let tail = rest.trim();
    if !tail.is_empty() {
        out.push(Line::Text(parse_spans(tail, false)));
    }
}

/// Find the first closed `**content**` span. Content must be non-empty and
/// may not itself contain `*`.
fn find_double_span(text: &str) -> Option<(usize, &str, usize)> {
    let mut search = 0;
    while let Some(found) = text[search..].find("**") {
        let start = search + found;
        let body = &text[start + 2..];
        if let Some(end) = body.find('*') {
            if end > 0 && body[end..].starts_with("**") {
                return Some((start, &body[..end], start + 2 + end + 2));
            }
        }
        search = start + 1;
    }
    None
}

/// Split text into plain and bold spans. `*text*` always closes as bold;
/// `**text**` does too when `double_as_bold` is set (inside list items).
/// Unmatched markers stay literal.
fn parse_spans(text: &str, double_as_bold: bool) -> Vec<Inline> {
    let mut spans = Vec::new();
    let mut plain = String::new();
    let mut rest = text;
    while let Some(idx) = rest.find('*') {
        let (before, at) = rest.split_at(idx);
        plain.push_str(before);
        if double_as_bold {
            if let Some((content, after)) = take_delimited(at, "**") {
                flush_plain(&mut spans, &mut plain);
                spans.push(Inline::Bold(content.to_string()));
                rest = after;
                continue;
            }
        }
        if let Some((content, after)) = take_delimited(at, "*") {
            flush_plain(&mut spans, &mut plain);
            spans.push(Inline::Bold(content.to_string()));
            rest = after;
            continue;
        }
        plain.push('*');
        rest = &at[1..];
    }
    plain.push_str(rest);
    flush_plain(&mut spans, &mut plain);
    spans
}

fn flush_plain(spans: &mut Vec<Inline>, plain: &mut String) {
    if !plain.is_empty() {
        spans.push(Inline::Plain(std::mem::take(plain)));
    }
}

/// Take a `{delim}content{delim}` prefix off `s`. Content must be non-empty
/// and free of `*`.
fn take_delimited<'a>(s: &'a str, delim: &str) -> Option<(&'a str, &'a str)> {
    let body = s.strip_prefix(delim)?;
    let end = body.find('*')?;
    if end == 0 || !body[end..].starts_with(delim) {
        return None;
    }
    Some((&body[..end], &body[end + delim.len()..]))
}

/// Group classified lines into blocks: maximal runs of adjacent items form
/// one list, consecutive text lines join into one paragraph with soft
/// breaks, and blank runs separate paragraphs.
fn group_blocks(lines: Vec<Line>) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut paragraph: Vec<Inline> = Vec::new();
    let mut items: Vec<Vec<Inline>> = Vec::new();
    for line in lines {
        match line {
            Line::Blank => {
                flush_items(&mut blocks, &mut items);
                flush_paragraph(&mut blocks, &mut paragraph);
            }
            Line::Heading { level, text } => {
                flush_items(&mut blocks, &mut items);
                flush_paragraph(&mut blocks, &mut paragraph);
                blocks.push(Block::Heading { level, text });
            }
            Line::Item(spans) => {
                flush_paragraph(&mut blocks, &mut paragraph);
                items.push(spans);
            }
            Line::Text(spans) => {
                flush_items(&mut blocks, &mut items);
                if !paragraph.is_empty() {
                    paragraph.push(Inline::LineBreak);
                }
                paragraph.extend(spans);
            }
        }
    }
    flush_items(&mut blocks, &mut items);
    flush_paragraph(&mut blocks, &mut paragraph);
    blocks
}

fn flush_paragraph(blocks: &mut Vec<Block>, paragraph: &mut Vec<Inline>) {
    if paragraph.is_empty() {
        return;
    }
    let spans = std::mem::take(paragraph);
    if spans.iter().all(|span| matches!(span, Inline::LineBreak)) {
        return;
    }
    blocks.push(Block::Paragraph(spans));
}

fn flush_items(blocks: &mut Vec<Block>, items: &mut Vec<Vec<Inline>>) {
    if !items.is_empty() {
        blocks.push(Block::List(std::mem::take(items)));
    }
}
