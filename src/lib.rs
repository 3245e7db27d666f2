//! Video Feedback Timeline
//!
//! Timestamped, categorized grader feedback anchored to an embedded video
//! player's timeline, with a reusable personal/course comment library.

pub mod components;
pub mod constants;
pub mod core;
pub mod error;
pub mod logging;
pub mod providers;
pub mod state;
pub mod timeline;
pub mod utils;

pub use crate::core::{ReviewSession, SessionHandle};
pub use crate::error::ReviewError;
pub use crate::state::SessionConfig;
