use crate::core::{ChatMessage, Role};
use crate::tui::components::render_markdown;
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

const THINKING_FRAMES: [&str; 4] = ["", ".", "..", "..."];

/// Scrollable view over a session transcript. Sticks to the newest message
/// until the user scrolls up.
#[derive(Debug, Default)]
pub struct ChatLog {
    scroll: usize,
    follow: bool,
    total_lines: usize,
    page_size: usize,
}

impl ChatLog {
    pub fn new() -> Self {
        Self {
            follow: true,
            ..Self::default()
        }
    }

    /// Jump back to the newest message and keep following.
    pub fn follow(&mut self) {
        self.follow = true;
    }

    fn max_scroll(&self) -> usize {
        self.total_lines.saturating_sub(self.page_size)
    }

    pub fn scroll_up(&mut self, lines: usize) {
        if self.follow {
            self.scroll = self.max_scroll();
        }
        self.scroll = self.scroll.saturating_sub(lines);
        self.follow = self.scroll >= self.max_scroll();
    }

    pub fn scroll_down(&mut self, lines: usize) {
        self.scroll = (self.scroll + lines).min(self.max_scroll());
        self.follow = self.scroll >= self.max_scroll();
    }

    pub fn page_up(&mut self) {
        self.scroll_up(self.page_size.max(1));
    }

    pub fn page_down(&mut self) {
        self.scroll_down(self.page_size.max(1));
    }

    pub fn render(
        &mut self,
        f: &mut Frame,
        area: Rect,
        messages: &[ChatMessage],
        thinking: Option<usize>,
    ) {
        let inner_width = area.width.saturating_sub(2) as usize;
        let mut lines = transcript_lines(messages, inner_width);

        if let Some(tick) = thinking {
            let dots = THINKING_FRAMES[tick % THINKING_FRAMES.len()];
            lines.push(Line::from(Span::styled(
                format!("VidQuery is thinking{dots}"),
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::ITALIC),
            )));
        }

        self.total_lines = lines.len();
        self.page_size = area.height.saturating_sub(2) as usize;
        if self.follow {
            self.scroll = self.max_scroll();
        } else {
            self.scroll = self.scroll.min(self.max_scroll());
        }

        let title = if self.follow || self.total_lines <= self.page_size {
            "Conversation".to_string()
        } else {
            format!(
                "Conversation (line {}-{} of {})",
                self.scroll + 1,
                (self.scroll + self.page_size).min(self.total_lines),
                self.total_lines
            )
        };

        let visible: Vec<Line> = lines
            .into_iter()
            .skip(self.scroll)
            .take(self.page_size)
            .collect();

        let paragraph =
            Paragraph::new(visible).block(Block::default().borders(Borders::ALL).title(title));
        f.render_widget(paragraph, area);
    }
}

/// Lay out every message as a header line, its wrapped body, and a spacer.
pub fn transcript_lines(messages: &[ChatMessage], width: usize) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for message in messages {
        lines.push(header_line(message));
        lines.extend(body_lines(message, width));
        lines.push(Line::default());
    }
    lines
}

fn header_line(message: &ChatMessage) -> Line<'static> {
    let time = message.sent_at.format("%H:%M").to_string();
    let (label, style) = match (message.role, message.is_error) {
        (Role::User, _) => ("You", Style::default().fg(Color::Red)),
        (Role::Bot, false) => ("VidQuery", Style::default().fg(Color::Cyan)),
        (Role::Bot, true) => ("⚠ VidQuery", Style::default().fg(Color::LightRed)),
    };

    Line::from(vec![
        Span::styled(label, style.add_modifier(Modifier::BOLD)),
        Span::styled(format!(" {time}"), Style::default().fg(Color::DarkGray)),
    ])
}

pub fn body_lines(message: &ChatMessage, width: usize) -> Vec<Line<'static>> {
    if message.role == Role::Bot && !message.is_error {
        return render_markdown(&message.content, width);
    }

    let style = if message.is_error {
        Style::default().fg(Color::LightRed)
    } else {
        Style::default()
    };

    textwrap::wrap(&message.content, width.max(1))
        .into_iter()
        .map(|line| Line::from(Span::styled(line.into_owned(), style)))
        .collect()
}
