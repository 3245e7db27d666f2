//! Initialization payload handed over by the hosting page.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::{CategoryInfo, CategoryRegistry, Comment, CourseId};
use crate::constants::{PLAYER_HOST_ID_PREFIX, PLAYER_POLL_INTERVAL_MS};
use crate::error::ReviewError;

pub type SubmissionId = i64;
pub type AssignmentId = i64;

/// Everything a review session needs, delivered once at startup.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionConfig {
    /// Player-platform media identifier
    #[serde(alias = "videoId")]
    pub media_id: String,
    #[serde(default)]
    pub submission_id: SubmissionId,
    #[serde(default, alias = "assignId")]
    pub assignment_id: Option<AssignmentId>,
    /// Existing comments in server order
    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(default, alias = "commentTypes")]
    pub category_definitions: HashMap<String, CategoryInfo>,
    #[serde(default)]
    pub read_only: bool,
    /// Course for shared library items, 0 when none
    #[serde(default)]
    pub course_id: CourseId,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

fn default_poll_interval_ms() -> u64 {
    PLAYER_POLL_INTERVAL_MS
}

/// Runtime knobs derived from the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReviewSettings {
    pub poll_interval: Duration,
}

impl Default for ReviewSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(PLAYER_POLL_INTERVAL_MS),
        }
    }
}

impl SessionConfig {
    /// Minimal grading payload, mostly for tests and embedding hosts.
    pub fn new(media_id: impl Into<String>, submission_id: SubmissionId, assignment_id: AssignmentId) -> Self {
        Self {
            media_id: media_id.into(),
            submission_id,
            assignment_id: Some(assignment_id),
            comments: Vec::new(),
            category_definitions: HashMap::new(),
            read_only: false,
            course_id: 0,
            poll_interval_ms: default_poll_interval_ms(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, ReviewError> {
        let config: SessionConfig = serde_json::from_str(json)
            .map_err(|err| ReviewError::Config(format!("invalid initialization payload: {}", err)))?;
        config.validate()?;
        Ok(config)
    }

    /// Writes cannot be attributed without an assignment.
    pub fn validate(&self) -> Result<(), ReviewError> {
        if !self.read_only && self.assignment().is_none() {
            return Err(ReviewError::Config(
                "Assignment ID missing. Cannot add comments.".to_string(),
            ));
        }
        Ok(())
    }

    pub fn assignment(&self) -> Option<AssignmentId> {
        self.assignment_id.filter(|id| *id > 0)
    }

    pub fn has_course(&self) -> bool {
        self.course_id > 0
    }

    pub fn settings(&self) -> ReviewSettings {
        ReviewSettings {
            poll_interval: Duration::from_millis(self.poll_interval_ms.max(1)),
        }
    }

    /// Empty definitions fall back to the stock registry.
    pub fn category_registry(&self) -> CategoryRegistry {
        if self.category_definitions.is_empty() {
            CategoryRegistry::builtin()
        } else {
            CategoryRegistry::from_definitions(&self.category_definitions)
        }
    }

    /// Element id the page is expected to render for the player.
    pub fn player_host_id(&self) -> String {
        format!("{}{}", PLAYER_HOST_ID_PREFIX, self.media_id)
    }
}
