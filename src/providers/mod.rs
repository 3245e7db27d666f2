//! Remote collaborators the review core talks to.

pub mod memory;
pub mod moodle_ajax;
pub mod service;

pub use memory::InMemoryFeedbackService;
pub use moodle_ajax::{AjaxEndpoint, MoodleAjaxService};
pub use service::*;
