//! State management module
//!
//! Plain data carried by a review session:
//! - Category: comment classification and its label/color registry
//! - Comment: timestamped annotations and drafts
//! - Library: reusable snippets and their scopes
//! - Player: the last sampled playback position
//! - Session: the initialization payload from the host page

mod category;
mod comment;
mod library;
mod player;
mod session;

pub use category::*;
pub use comment::*;
pub use library::*;
pub use player::*;
pub use session::*;
