//! Reusable comment snippets.

use serde::{Deserialize, Serialize};

use super::CommentCategory;

pub type LibraryItemId = i64;
pub type CourseId = i64;

/// Where a library item lives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "course_id", rename_all = "snake_case")]
pub enum LibraryScope {
    /// Visible only to its owner.
    #[default]
    Personal,
    /// Visible to every grader of the course.
    Course(CourseId),
}

impl LibraryScope {
    /// Course id as sent on the wire; 0 means personal.
    pub fn course_id(self) -> CourseId {
        match self {
            LibraryScope::Personal => 0,
            LibraryScope::Course(id) => id,
        }
    }

    pub fn from_course_id(course_id: CourseId) -> Self {
        if course_id > 0 {
            LibraryScope::Course(course_id)
        } else {
            LibraryScope::Personal
        }
    }
}

/// A saved snippet as returned by the library listing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LibraryItem {
    pub id: LibraryItemId,
    #[serde(rename = "commenttext")]
    pub text: String,
    #[serde(rename = "commenttype", default)]
    pub category: CommentCategory,
    /// Implied by the list the item arrived in
    #[serde(skip)]
    pub scope: LibraryScope,
    #[serde(rename = "isowner", default)]
    pub owned_by_current_user: bool,
}

/// Personal and shared items fetched together and cached as one unit.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LibraryListing {
    #[serde(default)]
    pub personal: Vec<LibraryItem>,
    #[serde(default)]
    pub shared: Vec<LibraryItem>,
}

impl LibraryListing {
    /// Stamps each item with the scope implied by its list.
    pub fn with_scopes(mut self, course_id: CourseId) -> Self {
        for item in self.personal.iter_mut() {
            item.scope = LibraryScope::Personal;
        }
        let shared_scope = LibraryScope::from_course_id(course_id);
        for item in self.shared.iter_mut() {
            item.scope = shared_scope;
        }
        self
    }

    pub fn len(&self) -> usize {
        self.personal.len() + self.shared.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn find(&self, item_id: LibraryItemId) -> Option<&LibraryItem> {
        self.personal
            .iter()
            .chain(self.shared.iter())
            .find(|item| item.id == item_id)
    }
}
