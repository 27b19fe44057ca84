//! Minimal formatted-text renderer for assistant replies.
//!
//! Supports paragraphs, `**bold**`/`__bold__`, `*italic*`/`_italic_`,
//! unordered (`-`, `*`, `+`) and ordered (`1.`, `1)`) lists. Headings are
//! shown as bold paragraphs. Anything else passes through as plain text.

use std::sync::OnceLock;

use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use regex::Regex;

static INLINE: OnceLock<Regex> = OnceLock::new();
static UNORDERED: OnceLock<Regex> = OnceLock::new();
static ORDERED: OnceLock<Regex> = OnceLock::new();

fn inline_re() -> &'static Regex {
    INLINE.get_or_init(|| {
        Regex::new(r"\*\*(.+?)\*\*|__(.+?)__|\*([^*\s](?:[^*]*[^*\s])?)\*|\b_([^_\s](?:[^_]*[^_\s])?)_\b")
            .expect("inline pattern is valid")
    })
}

fn unordered_re() -> &'static Regex {
    UNORDERED.get_or_init(|| Regex::new(r"^(\s*)[-*+]\s+(.*)$").expect("list pattern is valid"))
}

fn ordered_re() -> &'static Regex {
    ORDERED.get_or_init(|| Regex::new(r"^(\s*)(\d+)[.)]\s+(.*)$").expect("list pattern is valid"))
}

#[derive(Debug, PartialEq)]
enum Block {
    Paragraph(String),
    Heading(String),
    Item { indent: usize, marker: String, text: String },
}

/// Render `text` into styled lines. Blocks are separated by an empty line,
/// consecutive list items are not.
pub fn render_markdown(text: &str, base: Style) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    let mut previous_was_item = false;

    for block in parse_blocks(text) {
        let is_item = matches!(block, Block::Item { .. });
        if !lines.is_empty() && !(is_item && previous_was_item) {
            lines.push(Line::default());
        }
        previous_was_item = is_item;

        match block {
            Block::Paragraph(text) => lines.push(Line::from(render_inline(&text, base))),
            Block::Heading(text) => {
                lines.push(Line::from(render_inline(
                    &text,
                    base.add_modifier(Modifier::BOLD),
                )))
            }
            Block::Item {
                indent,
                marker,
                text,
            } => {
                let mut spans = vec![Span::styled(
                    format!("{}{} ", "  ".repeat(indent), marker),
                    base,
                )];
                spans.extend(render_inline(&text, base));
                lines.push(Line::from(spans));
            }
        }
    }
    lines
}

fn parse_blocks(text: &str) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut paragraph: Vec<&str> = Vec::new();

    for raw in text.lines() {
        let line = raw.trim_end();
        if line.trim().is_empty() {
            flush(&mut paragraph, &mut blocks);
            continue;
        }

        if let Some(caps) = ordered_re().captures(line) {
            flush(&mut paragraph, &mut blocks);
            blocks.push(Block::Item {
                indent: caps[1].len() / 2,
                marker: format!("{}.", &caps[2]),
                text: caps[3].trim().to_string(),
            });
        } else if let Some(caps) = unordered_re().captures(line) {
            flush(&mut paragraph, &mut blocks);
            blocks.push(Block::Item {
                indent: caps[1].len() / 2,
                marker: "•".to_string(),
                text: caps[2].trim().to_string(),
            });
        } else if let Some(heading) = heading_text(line) {
            flush(&mut paragraph, &mut blocks);
            blocks.push(Block::Heading(heading.to_string()));
        } else {
            paragraph.push(line.trim());
        }
    }
    flush(&mut paragraph, &mut blocks);
    blocks
}

fn flush(paragraph: &mut Vec<&str>, blocks: &mut Vec<Block>) {
    if !paragraph.is_empty() {
        blocks.push(Block::Paragraph(paragraph.join(" ")));
        paragraph.clear();
    }
}

fn heading_text(line: &str) -> Option<&str> {
    let trimmed = line.trim_start();
    let rest = trimmed.trim_start_matches('#');
    let level = trimmed.len() - rest.len();
    if (1..=6).contains(&level) && rest.starts_with(' ') {
        Some(rest.trim())
    } else {
        None
    }
}

/// Split one line of text into spans for bold and italic runs.
pub fn render_inline(text: &str, base: Style) -> Vec<Span<'static>> {
    let mut spans = Vec::new();
    let mut cursor = 0;

    for caps in inline_re().captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        if whole.start() > cursor {
            spans.push(Span::styled(text[cursor..whole.start()].to_string(), base));
        }
        let (inner, modifier) = match (caps.get(1), caps.get(2), caps.get(3), caps.get(4)) {
            (Some(m), _, _, _) | (_, Some(m), _, _) => (m.as_str(), Modifier::BOLD),
            (_, _, Some(m), _) | (_, _, _, Some(m)) => (m.as_str(), Modifier::ITALIC),
            _ => (whole.as_str(), Modifier::empty()),
        };
        spans.push(Span::styled(inner.to_string(), base.add_modifier(modifier)));
        cursor = whole.end();
    }

    if cursor < text.len() {
        spans.push(Span::styled(text[cursor..].to_string(), base));
    }
    spans
}
