use crate::core::{BackendError, ChatBackend, ChatRequest, VideoId};
use chrono::{DateTime, Local};
use tracing::{debug, info};

/// Bot reply appended when a question is submitted without a usable video.
pub const INVALID_VIDEO_GUIDANCE: &str = "Please enter a valid YouTube URL or Video ID first.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Bot,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    pub is_error: bool,
    pub sent_at: DateTime<Local>,
}

impl ChatMessage {
    fn new(role: Role, content: impl Into<String>, is_error: bool) -> Self {
        Self {
            role,
            content: content.into(),
            is_error,
            sent_at: Local::now(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content, false)
    }

    pub fn bot(content: impl Into<String>) -> Self {
        Self::new(Role::Bot, content, false)
    }

    pub fn bot_error(content: impl Into<String>) -> Self {
        Self::new(Role::Bot, content, true)
    }
}

/// What happened when a question was handed to [`ChatSession::begin`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// The question was recorded and must now be sent; pass the outcome to
    /// [`ChatSession::settle`].
    Dispatched(ChatRequest),
    /// No video was resolved; a guidance error was recorded instead.
    Unresolved,
    /// Another question is still waiting for its answer; nothing was recorded.
    Busy,
}

/// One conversation: the append-only transcript plus the in-flight flag.
#[derive(Debug, Default)]
pub struct ChatSession {
    messages: Vec<ChatMessage>,
    in_flight: bool,
}

impl ChatSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn last_message(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    /// Record a question and mark the session busy.
    ///
    /// Only a [`Submission::Dispatched`] result means the caller owes the
    /// session a matching [`settle`](Self::settle).
    pub fn begin(&mut self, video_id: Option<&VideoId>, question: &str) -> Submission {
        if self.in_flight {
            debug!("question rejected, previous one still in flight");
            return Submission::Busy;
        }

        let Some(video_id) = video_id else {
            self.messages.push(ChatMessage::bot_error(INVALID_VIDEO_GUIDANCE));
            return Submission::Unresolved;
        };

        self.in_flight = true;
        self.messages.push(ChatMessage::user(question));
        info!(%video_id, "question dispatched");

        Submission::Dispatched(ChatRequest {
            video_id: video_id.clone(),
            query: question.to_string(),
        })
    }

    /// Record the outcome of the in-flight question. Returns `false`, leaving
    /// the transcript untouched, when nothing is in flight.
    pub fn settle(&mut self, outcome: Result<String, BackendError>) -> bool {
        if !self.in_flight {
            debug!("dropping outcome with no question in flight");
            return false;
        }

        let message = match outcome {
            Ok(answer) => ChatMessage::bot(answer),
            Err(e) => ChatMessage::bot_error(e.to_string()),
        };
        self.messages.push(message);
        self.in_flight = false;
        true
    }

    /// Begin, ask the backend once, and settle.
    pub async fn submit(
        &mut self,
        backend: &dyn ChatBackend,
        video_id: Option<&VideoId>,
        question: &str,
    ) -> Submission {
        let submission = self.begin(video_id, question);
        if let Submission::Dispatched(request) = &submission {
            let outcome = backend.ask(request).await;
            self.settle(outcome);
        }
        submission
    }
}
