use crate::core::{INVALID_VIDEO_HINT, VideoId};
use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

pub const PREVIEW_PLACEHOLDER: &str = "Video preview will appear here";

/// Side panel describing the player for the resolved video, or a placeholder.
pub fn render_preview(f: &mut Frame, area: Rect, video_id: Option<&VideoId>, input: &str) {
    let block = Block::default().borders(Borders::ALL).title("Video Preview");

    let lines = match video_id {
        Some(id) => vec![
            Line::from(vec![
                Span::styled("Video ID  ", Style::default().fg(Color::Gray)),
                Span::styled(
                    id.as_str().to_string(),
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                ),
            ]),
            Line::default(),
            Line::from(Span::styled("Player", Style::default().fg(Color::Gray))),
            Line::from(Span::styled(
                id.embed_url(),
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::UNDERLINED),
            )),
        ],
        None => {
            let mut lines = vec![
                Line::default(),
                Line::from(Span::styled("▶", Style::default().fg(Color::Red)))
                    .alignment(Alignment::Center),
                Line::from(Span::styled(
                    PREVIEW_PLACEHOLDER,
                    Style::default().fg(Color::DarkGray),
                ))
                .alignment(Alignment::Center),
            ];
            if !input.is_empty() {
                lines.push(Line::default());
                lines.push(
                    Line::from(Span::styled(
                        INVALID_VIDEO_HINT,
                        Style::default().fg(Color::LightRed),
                    ))
                    .alignment(Alignment::Center),
                );
            }
            lines
        }
    };

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false });
    f.render_widget(paragraph, area);
}
