pub mod backend;
pub mod session;
pub mod video_id;

pub use backend::*;
pub use session::*;
pub use video_id::*;
