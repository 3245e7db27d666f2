//! HTTP client for the grading plug-in's AJAX web services.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::service::{
    AddCommentRequest, AddCommentResponse, DeleteCommentArgs, DeleteLibraryItemArgs,
    FeedbackService, LibraryArgs, SaveLibraryItemRequest, SaveLibraryItemResponse, StatusResponse,
};
use crate::error::ServiceError;
use crate::state::{AssignmentId, CommentId, CourseId, LibraryItemId, LibraryListing};

const AJAX_PATH: &str = "lib/ajax/service.php";
const METHOD_PREFIX: &str = "assignsubmission_ytsubmission_";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Where and as whom to call the AJAX endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AjaxEndpoint {
    /// Site root, e.g. `https://lms.example.edu`
    pub base_url: String,
    /// Session key of the logged-in grader
    pub sesskey: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl AjaxEndpoint {
    pub fn new(base_url: impl Into<String>, sesskey: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            sesskey: sesskey.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    fn service_url(&self) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), AJAX_PATH)
    }
}

#[derive(Debug, Deserialize)]
struct AjaxException {
    #[serde(default)]
    message: String,
    #[serde(default)]
    errorcode: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AjaxReply {
    error: bool,
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    exception: Option<AjaxException>,
}

/// Session-level failures (expired sesskey etc.) come back as a bare object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum AjaxEnvelope {
    Batch(Vec<AjaxReply>),
    Failure {
        error: String,
        #[serde(default)]
        errorcode: Option<String>,
    },
}

/// [`FeedbackService`] backed by `lib/ajax/service.php`.
pub struct MoodleAjaxService {
    client: reqwest::Client,
    endpoint: AjaxEndpoint,
}

impl MoodleAjaxService {
    pub fn new(endpoint: AjaxEndpoint) -> Result<Self, ServiceError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(endpoint.timeout_secs.max(1)))
            .build()?;
        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &AjaxEndpoint {
        &self.endpoint
    }

    async fn call<A, R>(&self, method: &str, args: A) -> Result<R, ServiceError>
    where
        A: Serialize,
        R: DeserializeOwned,
    {
        let methodname = format!("{}{}", METHOD_PREFIX, method);
        let body = request_body(&methodname, &args)?;
        tracing::debug!(method = %methodname, "calling feedback service");

        let response = self
            .client
            .post(self.endpoint.service_url())
            .query(&[
                ("sesskey", self.endpoint.sesskey.as_str()),
                ("info", methodname.as_str()),
            ])
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ServiceError::Transport(format!(
                "{} returned HTTP {}",
                methodname, status
            )));
        }
        let text = response.text().await?;
        decode_reply(&text)
    }
}

fn request_body<A: Serialize>(methodname: &str, args: &A) -> Result<Value, ServiceError> {
    let args = serde_json::to_value(args)
        .map_err(|err| ServiceError::Transport(format!("Failed to encode arguments: {}", err)))?;
    Ok(json!([{ "index": 0, "methodname": methodname, "args": args }]))
}

/// Unwraps the single-call batch the AJAX endpoint answers with.
fn decode_reply<R: DeserializeOwned>(text: &str) -> Result<R, ServiceError> {
    let envelope: AjaxEnvelope = serde_json::from_str(text)
        .map_err(|err| ServiceError::Transport(format!("Invalid service response: {}", err)))?;

    let reply = match envelope {
        AjaxEnvelope::Failure { error, errorcode } => {
            return Err(ServiceError::Rejected {
                message: error,
                error_code: errorcode,
            })
        }
        AjaxEnvelope::Batch(replies) => replies
            .into_iter()
            .next()
            .ok_or_else(|| ServiceError::Transport("Empty service response".to_string()))?,
    };

    if reply.error {
        let exception = reply.exception.unwrap_or(AjaxException {
            message: "Unknown service error".to_string(),
            errorcode: None,
        });
        return Err(ServiceError::Rejected {
            message: exception.message,
            error_code: exception.errorcode,
        });
    }

    let data = reply.data.unwrap_or(Value::Null);
    serde_json::from_value(data)
        .map_err(|err| ServiceError::Transport(format!("Unexpected response shape: {}", err)))
}

#[async_trait]
impl FeedbackService for MoodleAjaxService {
    async fn add_comment(&self, request: AddCommentRequest) -> Result<AddCommentResponse, ServiceError> {
        self.call("add_comment", request).await
    }

    async fn delete_comment(&self, comment_id: CommentId) -> Result<StatusResponse, ServiceError> {
        self.call("delete_comment", DeleteCommentArgs { comment_id }).await
    }

    async fn get_library(
        &self,
        assignment_id: AssignmentId,
        course_id: CourseId,
    ) -> Result<LibraryListing, ServiceError> {
        let listing: LibraryListing = self
            .call("get_library", LibraryArgs { assignment_id, course_id })
            .await?;
        Ok(listing.with_scopes(course_id))
    }

    async fn save_library_item(
        &self,
        request: SaveLibraryItemRequest,
    ) -> Result<SaveLibraryItemResponse, ServiceError> {
        self.call("save_library_comment", request).await
    }

    async fn delete_library_item(
        &self,
        assignment_id: AssignmentId,
        item_id: LibraryItemId,
    ) -> Result<StatusResponse, ServiceError> {
        self.call(
            "delete_library_comment",
            DeleteLibraryItemArgs { assignment_id, item_id },
        )
        .await
    }
}
