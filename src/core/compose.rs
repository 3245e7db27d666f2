use crate::state::{CommentCategory, CommentDraft};

/// The grader's in-progress comment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComposeForm {
    pub body: String,
    pub category: CommentCategory,
    /// Manual timestamp; overridden by the live player position on submit
    pub timestamp: u64,
    pub attachment_ref: i64,
}

impl ComposeForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draft(&self) -> CommentDraft {
        CommentDraft {
            timestamp: self.timestamp,
            category: self.category,
            body: self.body.clone(),
            attachment_ref: self.attachment_ref,
        }
    }

    /// Cleared after a successful submit; the draft attachment area is consumed.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Inserting a library item replaces body and category, nothing else.
    pub fn replace_with(&mut self, body: &str, category: CommentCategory) {
        self.body = body.to_string();
        self.category = category;
    }
}
