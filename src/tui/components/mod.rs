pub mod chat_log;
pub mod input;
pub mod markdown;
pub mod preview;

pub use chat_log::*;
pub use input::*;
pub use markdown::*;
pub use preview::*;
