use derive_more::Display;
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

/// Number of characters in a YouTube video token.
pub const VIDEO_ID_LEN: usize = 11;

const EMBED_BASE_URL: &str = "https://www.youtube.com/embed/";

/// Shown wherever input fails to resolve outside of a chat transcript.
pub const INVALID_VIDEO_HINT: &str = "Invalid YouTube URL or Video ID.";

/// Matches watch, short-link, embed, `/v/`, `/e/` and channel/user-prefixed
/// YouTube URLs. Group 1 is the video token.
static YOUTUBE_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?:https?://)?(?:www\.)?(?:youtube\.com/(?:[^/\n\s]+/\S+/|(?:v|e(?:mbed)?)/|\S*?[?&]v=)|youtu\.be/)([a-zA-Z0-9_-]{11})",
    )
    .expect("YouTube URL pattern is a valid regex")
});

/// An 11-character YouTube video token. Only its shape has been checked, not
/// whether the video exists.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display, Serialize)]
#[serde(transparent)]
pub struct VideoId(String);

impl VideoId {
    /// See [`resolve_video_id`].
    pub fn resolve(input: &str) -> Option<Self> {
        resolve_video_id(input)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Address of the embeddable player for this video.
    pub fn embed_url(&self) -> String {
        format!("{EMBED_BASE_URL}{}", self.0)
    }
}

/// Resolve user input into a video token.
///
/// Input mentioning `youtube.com` or `youtu.be` must match the URL pattern;
/// anything else is accepted verbatim when it is exactly eleven characters
/// long. Everything else resolves to `None`.
pub fn resolve_video_id(input: &str) -> Option<VideoId> {
    if input.contains("youtube.com") || input.contains("youtu.be") {
        return YOUTUBE_URL
            .captures(input)
            .and_then(|caps| caps.get(1))
            .map(|m| VideoId(m.as_str().to_string()));
    }

    if input.chars().count() == VIDEO_ID_LEN {
        return Some(VideoId(input.to_string()));
    }

    None
}

#[cfg(test)]
mod tests {
    use super::{VideoId, resolve_video_id};

    fn resolved(input: &str) -> Option<String> {
        resolve_video_id(input).map(|id| id.as_str().to_string())
    }

    #[test]
    fn passes_bare_token_through() {
        assert_eq!(resolved("dQw4w9WgXcQ").as_deref(), Some("dQw4w9WgXcQ"));
    }

    #[test]
    fn bare_branch_skips_character_validation() {
        assert_eq!(resolved("abc def!?#$").as_deref(), Some("abc def!?#$"));
        assert_eq!(resolved("ñandúñandúx").as_deref(), Some("ñandúñandúx"));
    }

    #[test]
    fn bare_branch_does_not_trim() {
        assert_eq!(resolved(" dQw4w9WgXcQ"), None);
        assert_eq!(resolved("dQw4w9WgXc "), Some("dQw4w9WgXc ".to_string()));
    }

    #[test]
    fn resolves_watch_url() {
        assert_eq!(
            resolved("https://www.youtube.com/watch?v=dQw4w9WgXcQ").as_deref(),
            Some("dQw4w9WgXcQ")
        );
    }

    #[test]
    fn resolves_watch_url_with_extra_params() {
        assert_eq!(
            resolved("https://www.youtube.com/watch?feature=share&v=dQw4w9WgXcQ").as_deref(),
            Some("dQw4w9WgXcQ")
        );
        assert_eq!(
            resolved("https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=42s&list=PL123").as_deref(),
            Some("dQw4w9WgXcQ")
        );
    }

    #[test]
    fn resolves_short_link() {
        assert_eq!(
            resolved("https://youtu.be/dQw4w9WgXcQ").as_deref(),
            Some("dQw4w9WgXcQ")
        );
        assert_eq!(
            resolved("youtu.be/dQw4w9WgXcQ?si=abc").as_deref(),
            Some("dQw4w9WgXcQ")
        );
    }

    #[test]
    fn resolves_embed_v_and_e_paths() {
        for url in [
            "https://www.youtube.com/embed/dQw4w9WgXcQ",
            "https://www.youtube.com/v/dQw4w9WgXcQ",
            "https://www.youtube.com/e/dQw4w9WgXcQ",
            "http://youtube.com/embed/dQw4w9WgXcQ?autoplay=1",
        ] {
            assert_eq!(resolved(url).as_deref(), Some("dQw4w9WgXcQ"), "{url}");
        }
    }

    #[test]
    fn resolves_user_prefixed_path() {
        assert_eq!(
            resolved("https://www.youtube.com/user/SomeChannel#p/u/1/dQw4w9WgXcQ").as_deref(),
            Some("dQw4w9WgXcQ")
        );
    }

    #[test]
    fn resolves_mobile_host() {
        assert_eq!(
            resolved("https://m.youtube.com/watch?v=dQw4w9WgXcQ").as_deref(),
            Some("dQw4w9WgXcQ")
        );
    }

    #[test]
    fn keeps_first_eleven_characters_of_longer_token() {
        assert_eq!(
            resolved("https://youtu.be/dQw4w9WgXcQextra").as_deref(),
            Some("dQw4w9WgXcQ")
        );
    }

    #[test]
    fn rejects_non_urls() {
        assert_eq!(resolved("not a url"), None);
        assert_eq!(resolved("short"), None);
        assert_eq!(resolved(""), None);
        assert_eq!(resolved("twelve chars"), None);
    }

    #[test]
    fn bare_length_counts_characters_not_utf16_units() {
        // ten scalar values, eleven UTF-16 units
        assert_eq!(resolved("😀123456789"), None);
        // eleven scalar values, twelve UTF-16 units
        assert_eq!(resolved("😀1234567890").as_deref(), Some("😀1234567890"));
    }

    #[test]
    fn trigger_substring_without_match_is_rejected() {
        assert_eq!(resolved("https://youtube.com/watch?v=short"), None);
        assert_eq!(resolved("youtube.com"), None);
        // eleven characters long, but the URL branch wins
        assert_eq!(resolved("youtu.be/ab"), None);
    }

    #[test]
    fn resolution_is_repeatable() {
        let input = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";
        let first = resolve_video_id(input);
        for _ in 0..3 {
            assert_eq!(resolve_video_id(input), first);
        }
    }

    #[test]
    fn builds_embed_url() {
        let id = VideoId::resolve("dQw4w9WgXcQ").expect("valid ID");
        assert_eq!(id.embed_url(), "https://www.youtube.com/embed/dQw4w9WgXcQ");
        assert_eq!(id.to_string(), "dQw4w9WgXcQ");
    }

    #[test]
    fn serializes_as_plain_string() {
        let id = VideoId::resolve("dQw4w9WgXcQ").expect("valid ID");
        assert_eq!(
            serde_json::to_string(&id).expect("serializable"),
            "\"dQw4w9WgXcQ\""
        );
    }
}
