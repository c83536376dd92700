use crate::core::Role;
use crate::tui::app::{App, AppState, HOME_OPTIONS};
use crate::tui::components::{body_lines, render_preview};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
};

pub fn draw(f: &mut Frame, app: &mut App) {
    match app.state {
        AppState::Home => draw_home(f, app),
        AppState::Chat => draw_chat(f, app),
        AppState::Ask => draw_ask(f, app),
    }
}

fn title_bar(text: &str) -> Paragraph<'_> {
    Paragraph::new(Line::from(vec![
        Span::styled(
            "Vid",
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            "Query",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!("  {text}"), Style::default().fg(Color::Gray)),
    ]))
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::ALL))
}

fn help_bar(text: &str) -> Paragraph<'_> {
    Paragraph::new(text)
        .style(Style::default().fg(Color::Gray))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL))
}

fn draw_home(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title
            Constraint::Length(4), // Tagline
            Constraint::Min(1),    // Menu
            Constraint::Length(3), // Help
        ])
        .split(f.area());

    f.render_widget(title_bar("Chat with any YouTube video"), chunks[0]);

    let tagline = Paragraph::new(vec![
        Line::from("Paste a YouTube link, ask a question, and get answers"),
        Line::from("grounded in the video's transcript."),
    ])
    .style(Style::default().fg(Color::White))
    .alignment(Alignment::Center);
    f.render_widget(tagline, chunks[1]);

    let menu_items: Vec<ListItem> = HOME_OPTIONS
        .iter()
        .enumerate()
        .map(|(i, option)| {
            let (marker, style) = if i == app.selected_option {
                (
                    "●",
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                )
            } else {
                ("○", Style::default().fg(Color::White))
            };
            ListItem::new(Line::from(Span::styled(format!("{marker} {option}"), style)))
        })
        .collect();

    let menu = List::new(menu_items).block(Block::default().borders(Borders::ALL).title("Mode"));
    f.render_widget(menu, chunks[2]);

    f.render_widget(
        help_bar("[↑↓] Navigate  [Enter] Select  [q] Exit"),
        chunks[3],
    );
}

/// Splits the screen into the main column and the preview panel.
fn question_layout(area: Rect) -> (Rect, Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
        .split(area);
    (columns[0], columns[1])
}

fn draw_inputs(f: &mut Frame, app: &App, video_area: Rect, question_area: Rect) {
    app.video_input.render(f, video_area);
    app.question_input.render(f, question_area);
}

fn status_line(app: &App) -> Paragraph<'_> {
    let line = match &app.status {
        Some(status) => Line::from(Span::styled(
            status.as_str(),
            Style::default().fg(Color::Yellow),
        )),
        None if app.session.is_in_flight() => Line::from(Span::styled(
            "Waiting for the backend...",
            Style::default().fg(Color::DarkGray),
        )),
        None => Line::default(),
    };
    Paragraph::new(line)
}

fn draw_chat(f: &mut Frame, app: &mut App) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title
            Constraint::Min(1),    // Body
            Constraint::Length(3), // Help
        ])
        .split(f.area());

    f.render_widget(title_bar("Chat"), rows[0]);

    let (main, side) = question_layout(rows[1]);
    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),    // Conversation
            Constraint::Length(1), // Status
            Constraint::Length(3), // Video input
            Constraint::Length(3), // Question input
        ])
        .split(main);

    let thinking = app.session.is_in_flight().then_some(app.tick);
    app.chat_log
        .render(f, main_chunks[0], app.session.messages(), thinking);
    f.render_widget(status_line(app), main_chunks[1]);
    draw_inputs(f, app, main_chunks[2], main_chunks[3]);

    let video_id = app.video_id();
    render_preview(f, side, video_id.as_ref(), &app.video_input.value);

    f.render_widget(
        help_bar("[Enter] Send  [Tab] Switch field  [PgUp/PgDn] Scroll  [Ctrl+N] New chat  [Esc] Back"),
        rows[2],
    );
}

fn draw_ask(f: &mut Frame, app: &mut App) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title
            Constraint::Min(1),    // Body
            Constraint::Length(3), // Help
        ])
        .split(f.area());

    f.render_widget(title_bar("Ask a question"), rows[0]);

    let (main, side) = question_layout(rows[1]);
    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Video input
            Constraint::Length(3), // Question input
            Constraint::Length(1), // Status
            Constraint::Min(3),    // Answer
        ])
        .split(main);

    draw_inputs(f, app, main_chunks[0], main_chunks[1]);
    f.render_widget(status_line(app), main_chunks[2]);
    draw_answer(f, app, main_chunks[3]);

    let video_id = app.video_id();
    render_preview(f, side, video_id.as_ref(), &app.video_input.value);

    f.render_widget(
        help_bar("[Enter] Ask  [Tab] Switch field  [Esc] Back"),
        rows[2],
    );
}

/// Latest reply of the session, or the input error, shown as an answer or
/// an error panel.
fn draw_answer(f: &mut Frame, app: &App, area: Rect) {
    let width = area.width.saturating_sub(2) as usize;
    let reply = app
        .session
        .messages()
        .iter()
        .rev()
        .find(|m| m.role == Role::Bot);

    let (title, border, lines) = if let Some(error) = app.ask_error {
        (
            "Error",
            Color::Red,
            vec![Line::from(Span::styled(
                error,
                Style::default().fg(Color::LightRed),
            ))],
        )
    } else if app.session.is_in_flight() {
        (
            "Answer",
            Color::Gray,
            vec![Line::from(Span::styled(
                "Thinking...",
                Style::default().fg(Color::DarkGray),
            ))],
        )
    } else {
        match reply {
            Some(reply) if reply.is_error => ("Error", Color::Red, body_lines(reply, width)),
            Some(reply) => ("Answer", Color::Green, body_lines(reply, width)),
            None => ("Answer", Color::Gray, Vec::new()),
        }
    };

    let panel = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(title)
            .border_style(Style::default().fg(border)),
    );
    f.render_widget(panel, area);
}
