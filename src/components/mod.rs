//! UI components grouped by feature domain.
mod comment_list;
mod library_panel;
mod review_panel;

pub use comment_list::{CommentCardItem, CommentList};
pub use library_panel::{LibraryPanel, ScopePrompt};
pub use review_panel::ReviewPanel;
