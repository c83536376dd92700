use crate::core::INVALID_VIDEO_HINT;
use derive_more::{Display, From};

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, Display, From)]
pub enum Error {
    #[display("{_0}")]
    Custom(String),

    #[display("configuration error: {_0}")]
    #[from(skip)]
    Config(String),

    /// The video field or argument did not resolve to a video token.
    #[display("{}", INVALID_VIDEO_HINT)]
    #[from(skip)]
    InvalidVideo,

    // -- Externals
    #[display("I/O error: {_0}")]
    Io(std::io::Error),

    #[display("JSON error: {_0}")]
    Json(serde_json::Error),

    #[display("HTTP client error: {_0}")]
    Http(reqwest::Error),
}

impl Error {
    pub fn custom(val: impl std::fmt::Display) -> Self {
        Self::Custom(val.to_string())
    }

    pub fn config(val: impl std::fmt::Display) -> Self {
        Self::Config(val.to_string())
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Json(e) => Some(e),
            Self::Http(e) => Some(e),
            Self::Custom(_) | Self::Config(_) | Self::InvalidVideo => None,
        }
    }
}
