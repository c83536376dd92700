use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};
use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockKind {
    Paragraph,
    Heading,
    ListItem,
    Code,
    Quote,
    Rule,
}

#[derive(Debug)]
struct TextBlock {
    kind: BlockKind,
    prefix: String,
    text: String,
}

struct BlockCollector {
    blocks: Vec<TextBlock>,
    current: String,
    kind: BlockKind,
    prefix: String,
}

impl BlockCollector {
    fn new() -> Self {
        Self {
            blocks: Vec::new(),
            current: String::new(),
            kind: BlockKind::Paragraph,
            prefix: String::new(),
        }
    }

    fn flush(&mut self) {
        let text = std::mem::take(&mut self.current);
        if text.trim().is_empty() {
            return;
        }
        self.blocks.push(TextBlock {
            kind: self.kind,
            prefix: self.prefix.clone(),
            text,
        });
        // Further paragraphs of the same list item hang under the bullet.
        if self.kind == BlockKind::ListItem {
            self.prefix = " ".repeat(self.prefix.chars().count());
        }
    }

    fn push_block(&mut self, kind: BlockKind, text: String) {
        self.blocks.push(TextBlock {
            kind,
            prefix: self.prefix.clone(),
            text,
        });
    }
}

/// Render an answer written in Markdown into styled, wrapped lines.
///
/// Inline markup is flattened; block structure (headings, lists, code,
/// quotes, rules) is kept and colored.
pub fn render_markdown(source: &str, width: usize) -> Vec<Line<'static>> {
    let width = width.max(8);
    let mut collector = BlockCollector::new();
    let mut lists: Vec<Option<u64>> = Vec::new();
    let mut quote_depth = 0usize;

    for event in Parser::new_ext(source, Options::ENABLE_STRIKETHROUGH) {
        match event {
            Event::Start(Tag::Heading { .. }) => {
                collector.flush();
                collector.kind = BlockKind::Heading;
            }
            Event::Start(Tag::List(start)) => {
                collector.flush();
                lists.push(start);
            }
            Event::End(TagEnd::List { .. }) => {
                collector.flush();
                lists.pop();
                collector.kind = if lists.is_empty() {
                    BlockKind::Paragraph
                } else {
                    BlockKind::ListItem
                };
                collector.prefix = "  ".repeat(lists.len());
            }
            Event::Start(Tag::Item) => {
                collector.flush();
                let indent = "  ".repeat(lists.len().saturating_sub(1));
                let marker = match lists.last_mut() {
                    Some(Some(n)) => {
                        let marker = format!("{n}. ");
                        *n += 1;
                        marker
                    }
                    _ => "• ".to_string(),
                };
                collector.kind = BlockKind::ListItem;
                collector.prefix = format!("{indent}{marker}");
            }
            Event::Start(Tag::CodeBlock { .. }) => {
                collector.flush();
                collector.kind = BlockKind::Code;
            }
            Event::Start(Tag::BlockQuote { .. }) => {
                collector.flush();
                quote_depth += 1;
                collector.kind = BlockKind::Quote;
                collector.prefix = "│ ".repeat(quote_depth);
            }
            Event::End(TagEnd::BlockQuote { .. }) => {
                collector.flush();
                quote_depth = quote_depth.saturating_sub(1);
                collector.kind = if quote_depth == 0 {
                    BlockKind::Paragraph
                } else {
                    BlockKind::Quote
                };
                collector.prefix = "│ ".repeat(quote_depth);
            }
            Event::End(TagEnd::Heading { .. }) | Event::End(TagEnd::CodeBlock { .. }) => {
                collector.flush();
                collector.kind = if lists.is_empty() {
                    BlockKind::Paragraph
                } else {
                    BlockKind::ListItem
                };
            }
            Event::End(TagEnd::Paragraph) | Event::End(TagEnd::Item) | Event::HardBreak => {
                collector.flush();
            }
            Event::Text(text) if collector.kind == BlockKind::Code => {
                for line in text.lines() {
                    collector.push_block(BlockKind::Code, line.to_string());
                }
            }
            Event::Text(text) | Event::Html(text) | Event::InlineHtml(text) => {
                collector.current.push_str(&text);
            }
            Event::Code(code) => {
                collector.current.push('`');
                collector.current.push_str(&code);
                collector.current.push('`');
            }
            Event::SoftBreak => collector.current.push(' '),
            Event::Rule => {
                collector.flush();
                collector.push_block(BlockKind::Rule, "─".repeat(width));
            }
            _ => {}
        }
    }
    collector.flush();

    let mut lines = Vec::new();
    for block in collector.blocks {
        let style = block_style(block.kind);
        if matches!(block.kind, BlockKind::Code | BlockKind::Rule) {
            lines.push(Line::from(Span::styled(
                format!("{}{}", block.prefix, block.text),
                style,
            )));
            continue;
        }

        let hanging = " ".repeat(block.prefix.chars().count());
        let options = textwrap::Options::new(width)
            .initial_indent(&block.prefix)
            .subsequent_indent(&hanging);
        for wrapped in textwrap::wrap(block.text.trim(), options) {
            lines.push(Line::from(Span::styled(wrapped.into_owned(), style)));
        }
    }
    lines
}

fn block_style(kind: BlockKind) -> Style {
    match kind {
        BlockKind::Paragraph => Style::default(),
        BlockKind::Heading => Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
        BlockKind::ListItem => Style::default().fg(Color::Green),
        BlockKind::Code => Style::default().fg(Color::Cyan),
        BlockKind::Quote => Style::default().fg(Color::Gray),
        BlockKind::Rule => Style::default().fg(Color::DarkGray),
    }
}

#[cfg(test)]
mod tests {
    use super::render_markdown;

    fn plain(source: &str, width: usize) -> Vec<String> {
        render_markdown(source, width)
            .into_iter()
            .map(|line| line.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    #[test]
    fn renders_headings_and_bullets() {
        let lines = plain("# Summary\n\n- first point\n- second point\n", 40);
        assert_eq!(lines, vec!["Summary", "• first point", "• second point"]);
    }

    #[test]
    fn numbers_ordered_lists() {
        let lines = plain("1. alpha\n2. beta\n", 40);
        assert_eq!(lines, vec!["1. alpha", "2. beta"]);
    }

    #[test]
    fn wraps_long_paragraphs_with_hanging_indent() {
        let lines = plain("- one two three four five six", 12);
        assert_eq!(lines, vec!["• one two", "  three four", "  five six"]);
    }

    #[test]
    fn keeps_code_lines_and_inline_code() {
        let lines = plain("Run `cargo`:\n\n```\nfn main() {}\nlet x = 1;\n```\n", 40);
        assert_eq!(lines, vec!["Run `cargo`:", "fn main() {}", "let x = 1;"]);
    }

    #[test]
    fn plain_text_stays_plain() {
        let lines = plain("The speaker explains A-Frame.", 80);
        assert_eq!(lines, vec!["The speaker explains A-Frame."]);
    }
}
