use std::fmt::Write as _;

/// Inline content inside a paragraph or list item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline {
    Plain(String),
    Bold(String),
    /// Soft break produced by a single newline inside a paragraph.
    LineBreak,
}

/// One block of a rendered report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Heading { level: u8, text: String },
    Paragraph(Vec<Inline>),
    List(Vec<Vec<Inline>>),
}

/// Structured form of a specialist report, independent of output syntax.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RenderedDocument {
    pub blocks: Vec<Block>,
}

impl RenderedDocument {
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Emit the document as HTML. Every opened tag is closed, whatever the
    /// input looked like, and text content is escaped.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        for (index, block) in self.blocks.iter().enumerate() {
            match block {
                Block::Heading { level, text } => {
                    let _ = write!(out, "<h{level}>");
                    push_escaped(&mut out, text);
                    let _ = write!(out, "</h{level}>");
                    // A heading directly followed by content gets one soft
                    // break so the two never run together visually.
                    if matches!(
                        self.blocks.get(index + 1),
                        Some(Block::Paragraph(_)) | Some(Block::List(_))
                    ) {
                        out.push_str("<br>");
                    }
                }
                Block::Paragraph(spans) => {
                    out.push_str("<p>");
                    push_spans(&mut out, spans);
                    out.push_str("</p>");
                }
                Block::List(items) => {
                    out.push_str("<ul>");
                    for item in items {
                        out.push_str("<li>");
                        push_spans(&mut out, item);
                        out.push_str("</li>");
                    }
                    out.push_str("</ul>");
                }
            }
        }
        out
    }
}

fn push_spans(out: &mut String, spans: &[Inline]) {
    for span in spans {
        match span {
            Inline::Plain(text) => push_escaped(out, text),
            Inline::Bold(text) => {
                out.push_str("<strong>");
                push_escaped(out, text);
                out.push_str("</strong>");
            }
            Inline::LineBreak => out.push_str("<br>"),
        }
    }
}

fn push_escaped(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
}
