//! Local mirror of the submission's comments.
//!
//! Entries are only added or removed after the remote service confirms the
//! write, and are kept in the order the server handed them out.

use crate::error::ReviewError;
use crate::state::{CategoryRegistry, Comment, CommentId};
use crate::utils::{format_time, is_blank_markup};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommentStore {
    comments: Vec<Comment>,
}

impl CommentStore {
    pub fn new(comments: Vec<Comment>) -> Self {
        Self { comments }
    }

    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    pub fn len(&self) -> usize {
        self.comments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.comments.is_empty()
    }

    pub fn get(&self, comment_id: CommentId) -> Option<&Comment> {
        self.comments.iter().find(|comment| comment.id == comment_id)
    }

    pub fn append(&mut self, comment: Comment) {
        self.comments.push(comment);
    }

    pub fn remove(&mut self, comment_id: CommentId) -> Option<Comment> {
        let index = self.comments.iter().position(|comment| comment.id == comment_id)?;
        Some(self.comments.remove(index))
    }

    /// Card models for every comment, in store order.
    pub fn cards(&self, registry: &CategoryRegistry, read_only: bool) -> Vec<CommentCard> {
        self.comments
            .iter()
            .map(|comment| CommentCard::build(comment, registry, read_only))
            .collect()
    }
}

/// Rejects rich text with no visible characters.
pub fn validate_body(body: &str) -> Result<(), ReviewError> {
    if is_blank_markup(body) {
        return Err(ReviewError::Validation("Please enter a comment.".to_string()));
    }
    Ok(())
}

/// Presentation model for one comment, used for initial and incremental rendering alike.
#[derive(Debug, Clone, PartialEq)]
pub struct CommentCard {
    pub comment_id: CommentId,
    pub timestamp: u64,
    pub time_display: String,
    pub category_key: &'static str,
    pub category_label: String,
    pub category_color: String,
    pub body_html: String,
    pub author: String,
    pub created: String,
    pub can_delete: bool,
}

impl CommentCard {
    pub fn build(comment: &Comment, registry: &CategoryRegistry, read_only: bool) -> Self {
        let info = registry.info(comment.category);
        Self {
            comment_id: comment.id,
            timestamp: comment.timestamp,
            time_display: format_time(comment.timestamp),
            category_key: comment.category.key(),
            category_label: info.label,
            category_color: info.color,
            body_html: comment.body.clone(),
            author: comment.author_display_name.clone(),
            created: comment.created_display.clone(),
            can_delete: !read_only,
        }
    }

    pub fn dom_id(&self) -> String {
        format!("feedback-comment-{}", self.comment_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::CommentCategory;

    fn comment(id: CommentId, timestamp: u64) -> Comment {
        Comment {
            id,
            timestamp,
            category: CommentCategory::Question,
            body: "<p>Why this angle?</p>".to_string(),
            author_display_name: "Ada".to_string(),
            created_display: "Monday".to_string(),
        }
    }

    #[test]
    fn test_keeps_server_order() {
        let mut store = CommentStore::new(vec![comment(3, 90), comment(1, 10)]);
        store.append(comment(2, 5));
        let ids: Vec<CommentId> = store.comments().iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![3, 1, 2]);
    }

    #[test]
    fn test_remove_unknown_is_none() {
        let mut store = CommentStore::new(vec![comment(1, 10)]);
        assert!(store.remove(9).is_none());
        assert_eq!(store.remove(1).map(|c| c.id), Some(1));
        assert!(store.is_empty());
    }

    #[test]
    fn test_blank_markup_rejected() {
        assert!(matches!(validate_body("<p><br></p>"), Err(ReviewError::Validation(_))));
        assert!(validate_body("<p>&nbsp;</p>").is_err());
        assert!(validate_body("<p>Great work</p>").is_ok());
    }

    #[test]
    fn test_card_hides_delete_when_read_only() {
        let registry = CategoryRegistry::builtin();
        let card = CommentCard::build(&comment(4, 3725), &registry, true);
        assert_eq!(card.time_display, "01:02:05");
        assert_eq!(card.category_label, "Question");
        assert!(!card.can_delete);
        assert_eq!(card.dom_id(), "feedback-comment-4");
    }
}
