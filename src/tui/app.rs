use crate::core::{
    BackendError, ChatBackend, ChatRequest, ChatSession, INVALID_VIDEO_HINT, Submission, VideoId,
};
use crate::error::Result;
use crate::tui::components::{ChatLog, InputField};
use crate::tui::events::AppEvent;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::debug;

pub const HOME_OPTIONS: [&str; 3] = ["Chat with a video", "Ask a single question", "Quit"];

const BUSY_STATUS: &str = "Still waiting for the previous answer...";
const MOUSE_SCROLL_LINES: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Home,
    /// Multi-turn conversation.
    Chat,
    /// One question at a time; only the latest reply is shown.
    Ask,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Video,
    Question,
}

/// Outcome of a backend call, tagged with the conversation it belongs to.
#[derive(Debug)]
pub struct BackendReply {
    pub conversation: u64,
    pub outcome: std::result::Result<String, BackendError>,
}

pub struct App {
    pub state: AppState,
    pub should_quit: bool,

    // Home screen
    pub selected_option: usize,

    // Question screens
    pub video_input: InputField,
    pub question_input: InputField,
    pub focus: Focus,
    pub chat_log: ChatLog,
    pub status: Option<String>,
    /// Error panel text on the single-question screen.
    pub ask_error: Option<&'static str>,
    pub tick: usize,

    // Conversation
    pub session: ChatSession,
    conversation: u64,
    backend: Arc<dyn ChatBackend>,

    // Async communication
    reply_tx: mpsc::UnboundedSender<BackendReply>,
    reply_rx: mpsc::UnboundedReceiver<BackendReply>,
}

impl App {
    pub fn new(backend: Arc<dyn ChatBackend>) -> Self {
        let (reply_tx, reply_rx) = mpsc::unbounded_channel();

        Self {
            state: AppState::Home,
            should_quit: false,

            selected_option: 0,

            video_input: InputField::new("YouTube URL or Video ID", "https://youtu.be/..."),
            question_input: InputField::new("Question", "Ask your question..."),
            focus: Focus::Video,
            chat_log: ChatLog::new(),
            status: None,
            ask_error: None,
            tick: 0,

            session: ChatSession::new(),
            conversation: 0,
            backend,

            reply_tx,
            reply_rx,
        }
    }

    /// Open the chat screen straight away with the video field filled in.
    pub fn open_chat(&mut self, video: Option<&str>) {
        if let Some(video) = video {
            self.video_input.set_value(video);
        }
        self.enter_question_screen(AppState::Chat);
        if video.is_some() {
            self.set_focus(Focus::Question);
        }
    }

    /// Resolved from the video field on every call; never cached.
    pub fn video_id(&self) -> Option<VideoId> {
        VideoId::resolve(&self.video_input.value)
    }

    pub fn handle_event(&mut self, event: AppEvent) -> Result<()> {
        self.apply_replies();
        match event {
            AppEvent::Key(key) => self.handle_key(key),
            AppEvent::Mouse(mouse) => self.handle_mouse(mouse),
            AppEvent::Tick => self.handle_tick(),
        }
        Ok(())
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        match self.state {
            AppState::Home => self.handle_home_key(key),
            AppState::Chat | AppState::Ask => self.handle_question_key(key),
        }
    }

    fn handle_home_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Up => {
                self.selected_option = self.selected_option.saturating_sub(1);
            }
            KeyCode::Down => {
                if self.selected_option + 1 < HOME_OPTIONS.len() {
                    self.selected_option += 1;
                }
            }
            KeyCode::Char('1') => self.selected_option = 0,
            KeyCode::Char('2') => self.selected_option = 1,
            KeyCode::Char('3') => self.selected_option = 2,
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Enter => match self.selected_option {
                0 => self.enter_question_screen(AppState::Chat),
                1 => self.enter_question_screen(AppState::Ask),
                _ => self.should_quit = true,
            },
            _ => {}
        }
    }

    fn handle_question_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('n') {
            self.new_conversation();
            return;
        }

        match key.code {
            KeyCode::Esc => {
                self.state = AppState::Home;
            }
            KeyCode::Tab | KeyCode::BackTab => {
                let next = match self.focus {
                    Focus::Video => Focus::Question,
                    Focus::Question => Focus::Video,
                };
                self.set_focus(next);
            }
            KeyCode::Enter => match self.focus {
                Focus::Video => self.set_focus(Focus::Question),
                Focus::Question => self.submit_question(),
            },
            KeyCode::PageUp => self.chat_log.page_up(),
            KeyCode::PageDown => self.chat_log.page_down(),
            _ => {
                let input = match self.focus {
                    Focus::Video => &mut self.video_input,
                    Focus::Question => &mut self.question_input,
                };
                input.handle_key(key);
            }
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        if self.state == AppState::Home {
            return;
        }
        match mouse.kind {
            MouseEventKind::ScrollUp => self.chat_log.scroll_up(MOUSE_SCROLL_LINES),
            MouseEventKind::ScrollDown => self.chat_log.scroll_down(MOUSE_SCROLL_LINES),
            _ => {}
        }
    }

    fn handle_tick(&mut self) {
        self.tick = self.tick.wrapping_add(1);
    }

    /// Settle the session with every reply that has arrived so far.
    fn apply_replies(&mut self) {
        while let Ok(reply) = self.reply_rx.try_recv() {
            if reply.conversation != self.conversation {
                debug!(
                    conversation = reply.conversation,
                    "discarding reply for an abandoned conversation"
                );
                continue;
            }
            if self.session.settle(reply.outcome) {
                self.chat_log.follow();
            }
        }
    }

    fn set_focus(&mut self, focus: Focus) {
        self.focus = focus;
        self.video_input.focused = focus == Focus::Video;
        self.question_input.focused = focus == Focus::Question;
    }

    fn enter_question_screen(&mut self, state: AppState) {
        if self.state != state {
            self.new_conversation();
        }
        self.state = state;
        self.set_focus(if self.video_id().is_some() {
            Focus::Question
        } else {
            Focus::Video
        });
    }

    /// Start over with an empty transcript. Replies still on the way for the
    /// old conversation are dropped when they arrive.
    pub fn new_conversation(&mut self) {
        self.conversation += 1;
        self.session = ChatSession::new();
        self.chat_log = ChatLog::new();
        self.status = None;
        self.ask_error = None;
    }

    fn submit_question(&mut self) {
        if !self.question_input.is_valid() {
            return;
        }

        let video_id = self.video_id();
        let question = self.question_input.value.clone();

        if self.state == AppState::Ask && video_id.is_none() && !self.session.is_in_flight() {
            self.ask_error = Some(INVALID_VIDEO_HINT);
            self.set_focus(Focus::Video);
            return;
        }

        match self.session.begin(video_id.as_ref(), &question) {
            Submission::Dispatched(request) => {
                // The single-question form keeps the question for editing.
                if self.state == AppState::Chat {
                    self.question_input.clear();
                }
                self.ask_error = None;
                self.status = None;
                self.chat_log.follow();
                self.dispatch(request);
            }
            Submission::Unresolved => {
                self.status = None;
                self.chat_log.follow();
                self.set_focus(Focus::Video);
            }
            Submission::Busy => {
                self.status = Some(BUSY_STATUS.to_string());
            }
        }
    }

    fn dispatch(&self, request: ChatRequest) {
        let backend = Arc::clone(&self.backend);
        let tx = self.reply_tx.clone();
        let conversation = self.conversation;

        tokio::spawn(async move {
            let outcome = backend.ask(&request).await;
            let _ = tx.send(BackendReply {
                conversation,
                outcome,
            });
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{INVALID_VIDEO_GUIDANCE, Role};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct EchoBackend {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ChatBackend for EchoBackend {
        async fn ask(&self, request: &ChatRequest) -> std::result::Result<String, BackendError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if request.query == "fail" {
                Err(BackendError::Rejected {
                    status: 500,
                    message: "bad video".into(),
                })
            } else {
                Ok(format!("{} -> {}", request.video_id, request.query))
            }
        }
    }

    fn app() -> (App, Arc<EchoBackend>) {
        let backend = Arc::new(EchoBackend {
            calls: AtomicUsize::new(0),
        });
        (App::new(backend.clone()), backend)
    }

    fn key(app: &mut App, code: KeyCode) {
        app.handle_event(AppEvent::Key(KeyEvent::new(code, KeyModifiers::NONE)))
            .expect("event handled");
    }

    fn ctrl(app: &mut App, c: char) {
        app.handle_event(AppEvent::Key(KeyEvent::new(
            KeyCode::Char(c),
            KeyModifiers::CONTROL,
        )))
        .expect("event handled");
    }

    fn type_str(app: &mut App, text: &str) {
        for c in text.chars() {
            key(app, KeyCode::Char(c));
        }
    }

    /// Tick until the session settles.
    async fn settle(app: &mut App) {
        for _ in 0..100 {
            app.handle_event(AppEvent::Tick).expect("tick");
            if !app.session.is_in_flight() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("reply never arrived");
    }

    #[test]
    fn home_menu_navigation() {
        let (mut app, _) = app();
        key(&mut app, KeyCode::Down);
        key(&mut app, KeyCode::Down);
        key(&mut app, KeyCode::Down);
        assert_eq!(app.selected_option, 2);
        key(&mut app, KeyCode::Char('2'));
        key(&mut app, KeyCode::Enter);
        assert_eq!(app.state, AppState::Ask);
        assert_eq!(app.focus, Focus::Video);

        key(&mut app, KeyCode::Esc);
        assert_eq!(app.state, AppState::Home);
        key(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit);
    }

    #[test]
    fn unresolved_video_appends_guidance_without_calling_backend() {
        let (mut app, backend) = app();
        app.open_chat(None);
        type_str(&mut app, "not a url");
        key(&mut app, KeyCode::Tab);
        type_str(&mut app, "what?");
        key(&mut app, KeyCode::Enter);

        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
        assert_eq!(app.session.len(), 1);
        let msg = app.session.last_message().expect("message");
        assert_eq!(msg.content, INVALID_VIDEO_GUIDANCE);
        assert!(msg.is_error);
        assert_eq!(app.focus, Focus::Video);
        // question is kept so the user can retry
        assert_eq!(app.question_input.value, "what?");
    }

    #[test]
    fn blank_question_is_not_submitted() {
        let (mut app, _) = app();
        app.open_chat(Some("dQw4w9WgXcQ"));
        type_str(&mut app, "   ");
        key(&mut app, KeyCode::Enter);
        assert!(app.session.is_empty());
    }

    #[tokio::test]
    async fn answer_arrives_through_tick() {
        let (mut app, backend) = app();
        app.open_chat(Some("https://youtu.be/dQw4w9WgXcQ"));
        assert_eq!(app.focus, Focus::Question);

        type_str(&mut app, "summary please");
        key(&mut app, KeyCode::Enter);

        assert!(app.session.is_in_flight());
        assert!(app.question_input.value.is_empty());
        assert_eq!(app.session.messages()[0].role, Role::User);

        settle(&mut app).await;

        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
        let reply = app.session.last_message().expect("reply");
        assert_eq!(reply.content, "dQw4w9WgXcQ -> summary please");
        assert!(!reply.is_error);
    }

    #[tokio::test]
    async fn second_question_while_waiting_is_held_back() {
        let (mut app, _) = app();
        app.open_chat(Some("dQw4w9WgXcQ"));

        type_str(&mut app, "first");
        key(&mut app, KeyCode::Enter);
        type_str(&mut app, "second");
        key(&mut app, KeyCode::Enter);

        assert_eq!(app.status.as_deref(), Some(BUSY_STATUS));
        assert_eq!(app.question_input.value, "second");
        assert_eq!(app.session.len(), 1);

        settle(&mut app).await;
        assert_eq!(app.session.len(), 2);
    }

    #[tokio::test]
    async fn rejection_is_shown_as_error() {
        let (mut app, _) = app();
        app.open_chat(Some("dQw4w9WgXcQ"));
        type_str(&mut app, "fail");
        key(&mut app, KeyCode::Enter);

        settle(&mut app).await;

        let reply = app.session.last_message().expect("reply");
        assert_eq!(reply.content, "bad video");
        assert!(reply.is_error);
    }

    #[tokio::test]
    async fn new_conversation_discards_late_reply() {
        let (mut app, _) = app();
        app.open_chat(Some("dQw4w9WgXcQ"));
        type_str(&mut app, "first");
        key(&mut app, KeyCode::Enter);

        ctrl(&mut app, 'n');
        assert!(app.session.is_empty());

        type_str(&mut app, "second");
        key(&mut app, KeyCode::Enter);
        settle(&mut app).await;

        let contents: Vec<&str> = app
            .session
            .messages()
            .iter()
            .map(|m| m.content.as_str())
            .collect();
        assert_eq!(contents, vec!["second", "dQw4w9WgXcQ -> second"]);
    }

    #[tokio::test]
    async fn reply_is_applied_while_typing() {
        let (mut app, _) = app();
        app.open_chat(Some("dQw4w9WgXcQ"));
        type_str(&mut app, "first");
        key(&mut app, KeyCode::Enter);

        for _ in 0..100 {
            if !app.session.is_in_flight() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
            key(&mut app, KeyCode::Char('x'));
        }

        assert!(!app.session.is_in_flight());
        assert_eq!(app.tick, 0);
        assert_eq!(app.session.len(), 2);
    }

    #[test]
    fn ask_screen_shows_invalid_input_hint() {
        let (mut app, backend) = app();
        key(&mut app, KeyCode::Char('2'));
        key(&mut app, KeyCode::Enter);
        type_str(&mut app, "not a url");
        key(&mut app, KeyCode::Tab);
        type_str(&mut app, "what?");
        key(&mut app, KeyCode::Enter);

        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
        assert_eq!(app.ask_error, Some(INVALID_VIDEO_HINT));
        assert!(app.session.is_empty());
        assert_eq!(app.focus, Focus::Video);
        assert_eq!(app.question_input.value, "what?");
    }

    #[tokio::test]
    async fn ask_screen_keeps_question_after_answer() {
        let (mut app, _) = app();
        key(&mut app, KeyCode::Char('2'));
        key(&mut app, KeyCode::Enter);
        type_str(&mut app, "not a url");
        key(&mut app, KeyCode::Tab);
        type_str(&mut app, "what?");
        key(&mut app, KeyCode::Enter);
        assert!(app.ask_error.is_some());

        app.video_input.set_value("dQw4w9WgXcQ");
        key(&mut app, KeyCode::Tab);
        key(&mut app, KeyCode::Enter);

        assert_eq!(app.ask_error, None);
        assert_eq!(app.question_input.value, "what?");
        settle(&mut app).await;
        let reply = app.session.last_message().expect("reply");
        assert_eq!(reply.content, "dQw4w9WgXcQ -> what?");
    }

    #[test]
    fn ctrl_c_quits_from_anywhere() {
        let (mut app, _) = app();
        app.open_chat(None);
        ctrl(&mut app, 'c');
        assert!(app.should_quit);
    }
}
