//! In-process feedback service with the same rules as the hosted one.
//!
//! Used for offline previews and as the collaborator in tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use super::service::{
    AddCommentRequest, AddCommentResponse, FeedbackService, SaveLibraryItemRequest,
    SaveLibraryItemResponse, StatusResponse,
};
use crate::error::ServiceError;
use crate::state::{
    AssignmentId, Comment, CommentCategory, CommentId, CourseId, LibraryItem, LibraryItemId,
    LibraryListing, LibraryScope, SubmissionId,
};

pub type UserId = i64;

const PLUGINFILE_PLACEHOLDER: &str = "@@PLUGINFILE@@";

#[derive(Debug, Clone)]
struct StoredComment {
    submission_id: SubmissionId,
    comment: Comment,
}

#[derive(Debug, Clone)]
struct StoredLibraryItem {
    id: LibraryItemId,
    user_id: UserId,
    course_id: CourseId,
    text: String,
    category: CommentCategory,
    created_seq: u64,
}

#[derive(Debug, Default)]
struct Inner {
    current_user: UserId,
    users: HashMap<UserId, String>,
    assignments: HashMap<AssignmentId, CourseId>,
    comments: Vec<StoredComment>,
    library: Vec<StoredLibraryItem>,
    next_comment_id: CommentId,
    next_item_id: LibraryItemId,
    seq: u64,
    fail_next: Option<ServiceError>,
}

pub struct InMemoryFeedbackService {
    inner: Mutex<Inner>,
    calls: AtomicUsize,
}

impl InMemoryFeedbackService {
    /// A service acting on behalf of `user_id`.
    pub fn new(user_id: UserId, display_name: impl Into<String>) -> Self {
        let mut users = HashMap::new();
        users.insert(user_id, display_name.into());
        Self {
            inner: Mutex::new(Inner {
                current_user: user_id,
                users,
                next_comment_id: 1,
                next_item_id: 1,
                ..Default::default()
            }),
            calls: AtomicUsize::new(0),
        }
    }

    /// Makes an assignment (and its course) known to the service.
    pub fn with_assignment(self, assignment_id: AssignmentId, course_id: CourseId) -> Self {
        self.lock().assignments.insert(assignment_id, course_id);
        self
    }

    /// Registers another grader and acts as them from now on.
    pub fn switch_user(&self, user_id: UserId, display_name: impl Into<String>) {
        let mut inner = self.lock();
        inner.users.insert(user_id, display_name.into());
        inner.current_user = user_id;
    }

    /// The next call fails with `error` instead of running.
    pub fn fail_next(&self, error: ServiceError) {
        self.lock().fail_next = Some(error);
    }

    /// Number of remote calls received so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Comments on a submission, ordered by timestamp as the server lists them.
    pub fn comments_for(&self, submission_id: SubmissionId) -> Vec<Comment> {
        let inner = self.lock();
        let mut comments: Vec<Comment> = inner
            .comments
            .iter()
            .filter(|stored| stored.submission_id == submission_id)
            .map(|stored| stored.comment.clone())
            .collect();
        comments.sort_by_key(|comment| comment.timestamp);
        comments
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn begin_call(&self) -> Result<std::sync::MutexGuard<'_, Inner>, ServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut inner = self.lock();
        match inner.fail_next.take() {
            Some(error) => Err(error),
            None => Ok(inner),
        }
    }
}

impl Inner {
    fn require_assignment(&self, assignment_id: AssignmentId) -> Result<CourseId, ServiceError> {
        self.assignments
            .get(&assignment_id)
            .copied()
            .ok_or_else(|| ServiceError::Rejected {
                message: format!("Assignment {} not found", assignment_id),
                error_code: Some("invalidrecord".to_string()),
            })
    }

    fn display_name(&self) -> String {
        self.users
            .get(&self.current_user)
            .cloned()
            .unwrap_or_default()
    }

    fn to_library_item(&self, stored: &StoredLibraryItem) -> LibraryItem {
        LibraryItem {
            id: stored.id,
            text: stored.text.clone(),
            category: stored.category,
            scope: LibraryScope::from_course_id(stored.course_id),
            owned_by_current_user: stored.user_id == self.current_user,
        }
    }

    fn next_seq(&mut self) -> u64 {
        self.seq += 1;
        self.seq
    }
}

fn created_display() -> String {
    chrono::Local::now().format("%A, %-d %B %Y, %-I:%M %p").to_string()
}

fn pluginfile_base(comment_id: CommentId) -> String {
    format!("/pluginfile.php/assignsubmission_ytsubmission/commentfiles/{}", comment_id)
}

#[async_trait]
impl FeedbackService for InMemoryFeedbackService {
    async fn add_comment(&self, request: AddCommentRequest) -> Result<AddCommentResponse, ServiceError> {
        let mut inner = self.begin_call()?;
        if let Err(err) = inner.require_assignment(request.assignment_id) {
            return Ok(AddCommentResponse {
                success: false,
                message: format!("Error adding comment: {}", err),
                comment: None,
            });
        }

        let id = inner.next_comment_id;
        inner.next_comment_id += 1;

        let mut body = request.body.trim().to_string();
        if request.draft_attachment_ref > 0 {
            body = body.replace(PLUGINFILE_PLACEHOLDER, &pluginfile_base(id));
        }

        let comment = Comment {
            id,
            timestamp: request.timestamp,
            category: request.category,
            body,
            author_display_name: inner.display_name(),
            created_display: created_display(),
        };
        inner.comments.push(StoredComment {
            submission_id: request.submission_id,
            comment: comment.clone(),
        });

        Ok(AddCommentResponse {
            success: true,
            message: "Comment added successfully.".to_string(),
            comment: Some(comment),
        })
    }

    async fn delete_comment(&self, comment_id: CommentId) -> Result<StatusResponse, ServiceError> {
        let mut inner = self.begin_call()?;
        let before = inner.comments.len();
        inner.comments.retain(|stored| stored.comment.id != comment_id);
        if inner.comments.len() == before {
            return Ok(StatusResponse {
                success: false,
                message: "Error deleting comment: comment not found".to_string(),
            });
        }
        Ok(StatusResponse {
            success: true,
            message: "Comment deleted successfully.".to_string(),
        })
    }

    async fn get_library(
        &self,
        assignment_id: AssignmentId,
        course_id: CourseId,
    ) -> Result<LibraryListing, ServiceError> {
        let inner = self.begin_call()?;
        inner.require_assignment(assignment_id)?;

        let mut personal: Vec<&StoredLibraryItem> = inner
            .library
            .iter()
            .filter(|item| item.user_id == inner.current_user && item.course_id == 0)
            .collect();
        let mut shared: Vec<&StoredLibraryItem> = if course_id > 0 {
            inner
                .library
                .iter()
                .filter(|item| item.course_id == course_id)
                .collect()
        } else {
            Vec::new()
        };
        personal.sort_by(|a, b| b.created_seq.cmp(&a.created_seq));
        shared.sort_by(|a, b| b.created_seq.cmp(&a.created_seq));

        Ok(LibraryListing {
            personal: personal.into_iter().map(|item| inner.to_library_item(item)).collect(),
            shared: shared.into_iter().map(|item| inner.to_library_item(item)).collect(),
        })
    }

    async fn save_library_item(
        &self,
        request: SaveLibraryItemRequest,
    ) -> Result<SaveLibraryItemResponse, ServiceError> {
        let mut inner = self.begin_call()?;
        inner.require_assignment(request.assignment_id)?;
        let text = request.body.trim().to_string();

        if request.existing_item_id > 0 {
            let current_user = inner.current_user;
            let existing = inner
                .library
                .iter_mut()
                .find(|item| item.id == request.existing_item_id)
                .ok_or_else(|| ServiceError::rejected("Library comment not found"))?;
            if existing.user_id != current_user {
                return Err(ServiceError::Rejected {
                    message: "You do not have permission to edit this library comment".to_string(),
                    error_code: Some("nopermission".to_string()),
                });
            }
            existing.text = text;
            existing.category = request.category;
            return Ok(SaveLibraryItemResponse {
                success: true,
                item_id: request.existing_item_id,
            });
        }

        let id = inner.next_item_id;
        inner.next_item_id += 1;
        let created_seq = inner.next_seq();
        let user_id = inner.current_user;
        inner.library.push(StoredLibraryItem {
            id,
            user_id,
            course_id: request.course_id.max(0),
            text,
            category: request.category,
            created_seq,
        });
        Ok(SaveLibraryItemResponse {
            success: true,
            item_id: id,
        })
    }

    async fn delete_library_item(
        &self,
        assignment_id: AssignmentId,
        item_id: LibraryItemId,
    ) -> Result<StatusResponse, ServiceError> {
        let mut inner = self.begin_call()?;
        inner.require_assignment(assignment_id)?;
        let item = inner
            .library
            .iter()
            .find(|item| item.id == item_id)
            .ok_or_else(|| ServiceError::rejected("Library comment not found"))?;
        // Shared items may be removed by any grader of the course.
        if item.course_id == 0 && item.user_id != inner.current_user {
            return Err(ServiceError::Rejected {
                message: "You do not have permission to delete this library comment".to_string(),
                error_code: Some("nopermission".to_string()),
            });
        }
        inner.library.retain(|item| item.id != item_id);
        Ok(StatusResponse {
            success: true,
            message: String::new(),
        })
    }
}
