use serde::{Deserialize, Serialize};

use super::CommentCategory;

/// Server-assigned comment identifier.
pub type CommentId = i64;

/// A timestamped annotation on the submitted video.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Comment {
    /// Unique identifier assigned by the remote store
    pub id: CommentId,
    /// Position on the video's time axis, in whole seconds
    pub timestamp: u64,
    #[serde(rename = "commenttype", default)]
    pub category: CommentCategory,
    /// Sanitized rich text
    #[serde(rename = "comment")]
    pub body: String,
    #[serde(rename = "gradername", default)]
    pub author_display_name: String,
    #[serde(rename = "timecreated", default)]
    pub created_display: String,
}

/// What the grader is about to submit.
#[derive(Debug, Clone, PartialEq)]
pub struct CommentDraft {
    pub timestamp: u64,
    pub category: CommentCategory,
    pub body: String,
    /// Draft attachment area reference, 0 when nothing is attached
    pub attachment_ref: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comment_wire_names() {
        let json = r#"{
            "id": 7,
            "timestamp": 125,
            "comment": "<p>Great work</p>",
            "commenttype": "praise",
            "gradername": "Ada Grader",
            "timecreated": "19 October 2026, 10:00 AM"
        }"#;
        let comment: Comment = serde_json::from_str(json).unwrap();
        assert_eq!(comment.id, 7);
        assert_eq!(comment.category, CommentCategory::Praise);
        assert_eq!(comment.author_display_name, "Ada Grader");
    }

    #[test]
    fn test_comment_defaults_when_fields_missing() {
        let comment: Comment =
            serde_json::from_str(r#"{"id": 1, "timestamp": 3, "comment": "x", "commenttype": "odd"}"#)
                .unwrap();
        assert_eq!(comment.category, CommentCategory::General);
        assert!(comment.created_display.is_empty());
    }
}
