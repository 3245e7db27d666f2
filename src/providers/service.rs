//! Remote feedback service boundary.
//!
//! The review core never persists anything itself; every write goes through
//! a [`FeedbackService`] and local state only changes once it answers.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ServiceError;
use crate::state::{
    AssignmentId, Comment, CommentCategory, CommentId, CourseId, LibraryItemId, LibraryListing,
    SubmissionId,
};

/// Arguments for creating a comment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AddCommentRequest {
    #[serde(rename = "submissionid")]
    pub submission_id: SubmissionId,
    #[serde(rename = "assignmentid")]
    pub assignment_id: AssignmentId,
    pub timestamp: u64,
    #[serde(rename = "comment")]
    pub body: String,
    #[serde(rename = "commenttype")]
    pub category: CommentCategory,
    #[serde(rename = "draftitemid")]
    pub draft_attachment_ref: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddCommentResponse {
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub comment: Option<Comment>,
}

impl AddCommentResponse {
    /// The authoritative comment, or the service's refusal.
    pub fn into_comment(self) -> Result<Comment, ServiceError> {
        match (self.success, self.comment) {
            (true, Some(comment)) => Ok(comment),
            (true, None) => Err(ServiceError::Transport(
                "add comment response carried no comment".to_string(),
            )),
            (false, _) => Err(ServiceError::rejected(non_empty_or(
                self.message,
                "Failed to add comment.",
            ))),
        }
    }
}

/// `{success, message}` result shared by simple writes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusResponse {
    pub success: bool,
    #[serde(default)]
    pub message: String,
}

impl StatusResponse {
    pub fn into_result(self, fallback: &str) -> Result<(), ServiceError> {
        if self.success {
            Ok(())
        } else {
            Err(ServiceError::rejected(non_empty_or(self.message, fallback)))
        }
    }
}

/// Arguments for inserting (`existing_item_id == 0`) or updating a library item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SaveLibraryItemRequest {
    #[serde(rename = "assignmentid")]
    pub assignment_id: AssignmentId,
    #[serde(rename = "commenttext")]
    pub body: String,
    #[serde(rename = "commenttype")]
    pub category: CommentCategory,
    /// 0 saves to the personal library
    #[serde(rename = "courseid")]
    pub course_id: CourseId,
    #[serde(rename = "itemid")]
    pub existing_item_id: LibraryItemId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveLibraryItemResponse {
    pub success: bool,
    #[serde(rename = "itemid", default)]
    pub item_id: LibraryItemId,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct DeleteCommentArgs {
    #[serde(rename = "commentid")]
    pub comment_id: CommentId,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct LibraryArgs {
    #[serde(rename = "assignmentid")]
    pub assignment_id: AssignmentId,
    #[serde(rename = "courseid")]
    pub course_id: CourseId,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct DeleteLibraryItemArgs {
    #[serde(rename = "assignmentid")]
    pub assignment_id: AssignmentId,
    #[serde(rename = "itemid")]
    pub item_id: LibraryItemId,
}

/// The five remote operations the review core depends on.
#[async_trait]
pub trait FeedbackService: Send + Sync {
    async fn add_comment(&self, request: AddCommentRequest) -> Result<AddCommentResponse, ServiceError>;

    async fn delete_comment(&self, comment_id: CommentId) -> Result<StatusResponse, ServiceError>;

    async fn get_library(
        &self,
        assignment_id: AssignmentId,
        course_id: CourseId,
    ) -> Result<LibraryListing, ServiceError>;

    async fn save_library_item(
        &self,
        request: SaveLibraryItemRequest,
    ) -> Result<SaveLibraryItemResponse, ServiceError>;

    async fn delete_library_item(
        &self,
        assignment_id: AssignmentId,
        item_id: LibraryItemId,
    ) -> Result<StatusResponse, ServiceError>;
}

fn non_empty_or(message: String, fallback: &str) -> String {
    if message.trim().is_empty() {
        fallback.to_string()
    } else {
        message
    }
}
