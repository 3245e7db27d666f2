//! Comment library: fetch-once cache, panel snapshot and client-side filtering.
//!
//! The listing is fetched the first time the panel opens and reused until a
//! library write invalidates it. Filtering never touches the cache; it runs
//! over the entries currently rendered in the panel.

use std::time::{Duration, Instant};

use crate::constants::{
    EMPTY_PERSONAL_LIBRARY_TEXT, EMPTY_SHARED_LIBRARY_TEXT, LIBRARY_PREVIEW_CHARS,
    SAVE_SCOPE_PROMPT_TIMEOUT_SECS,
};
use crate::error::ReviewError;
use crate::state::{
    CategoryRegistry, CommentCategory, CourseId, LibraryItem, LibraryItemId, LibraryListing,
    LibraryScope,
};
use crate::utils::{is_blank_markup, strip_markup, truncate_chars};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LibrarySectionKind {
    /// "My Comments"
    Personal,
    /// "Course Comments"
    Course,
}

impl LibrarySectionKind {
    pub fn title(self) -> &'static str {
        match self {
            LibrarySectionKind::Personal => "My Comments",
            LibrarySectionKind::Course => "Course Comments",
        }
    }

    pub fn empty_text(self) -> &'static str {
        match self {
            LibrarySectionKind::Personal => EMPTY_PERSONAL_LIBRARY_TEXT,
            LibrarySectionKind::Course => EMPTY_SHARED_LIBRARY_TEXT,
        }
    }
}

/// Presentation model for one library item.
#[derive(Debug, Clone, PartialEq)]
pub struct LibraryEntry {
    pub item_id: LibraryItemId,
    pub scope: LibraryScope,
    pub section: LibrarySectionKind,
    /// Full rich text, inserted into the compose form as-is
    pub body: String,
    pub preview: String,
    pub category: CommentCategory,
    pub category_label: String,
    pub category_color: String,
    pub can_delete: bool,
}

impl LibraryEntry {
    pub fn build(
        item: &LibraryItem,
        section: LibrarySectionKind,
        registry: &CategoryRegistry,
        read_only: bool,
    ) -> Self {
        let info = registry.info(item.category);
        Self {
            item_id: item.id,
            scope: item.scope,
            section,
            body: item.text.clone(),
            preview: truncate_chars(&strip_markup(&item.text), LIBRARY_PREVIEW_CHARS),
            category: item.category,
            category_label: info.label,
            category_color: info.color,
            can_delete: !read_only && item.owned_by_current_user,
        }
    }

    /// Text the search box matches against: badge label plus preview.
    pub fn rendered_text(&self) -> String {
        format!("{} {}", self.category_label, self.preview)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LibrarySection {
    pub kind: LibrarySectionKind,
    pub entries: Vec<LibraryEntry>,
}

impl LibrarySection {
    pub fn title(&self) -> &'static str {
        self.kind.title()
    }

    pub fn empty_text(&self) -> &'static str {
        self.kind.empty_text()
    }
}

/// Category half of the panel filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(CommentCategory),
}

impl CategoryFilter {
    /// `"all"` or a category key; unknown keys select general.
    pub fn from_key(key: &str) -> Self {
        if key.trim().eq_ignore_ascii_case("all") {
            CategoryFilter::All
        } else {
            CategoryFilter::Only(CommentCategory::from_key(key))
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LibraryFilter {
    pub category: CategoryFilter,
    pub query: String,
}

impl LibraryFilter {
    pub fn new(category: CategoryFilter, query: impl Into<String>) -> Self {
        Self {
            category,
            query: query.into(),
        }
    }

    pub fn matches(&self, entry: &LibraryEntry) -> bool {
        let category_match = match self.category {
            CategoryFilter::All => true,
            CategoryFilter::Only(category) => entry.category == category,
        };
        let query = self.query.trim().to_lowercase();
        let text_match = query.is_empty() || entry.rendered_text().to_lowercase().contains(&query);
        category_match && text_match
    }
}

/// Result of pressing the library button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelToggle {
    Closed,
    /// Opened from the cached listing.
    Opened,
    /// Nothing cached; the caller must fetch before the panel can open.
    NeedsFetch,
}

/// A save waiting for the grader to pick a scope.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingSave {
    pub body: String,
    pub category: CommentCategory,
    opened_at: Instant,
}

impl PendingSave {
    pub fn is_expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.opened_at) >= Duration::from_secs(SAVE_SCOPE_PROMPT_TIMEOUT_SECS)
    }
}

#[derive(Debug, Clone)]
pub struct LibraryCache {
    registry: CategoryRegistry,
    course_id: CourseId,
    read_only: bool,
    cached: Option<LibraryListing>,
    open: bool,
    sections: Vec<LibrarySection>,
    filter: LibraryFilter,
    pending_save: Option<PendingSave>,
}

impl LibraryCache {
    pub fn new(registry: CategoryRegistry, course_id: CourseId, read_only: bool) -> Self {
        Self {
            registry,
            course_id,
            read_only,
            cached: None,
            open: false,
            sections: Vec::new(),
            filter: LibraryFilter::default(),
            pending_save: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn has_course(&self) -> bool {
        self.course_id > 0
    }

    pub fn course_id(&self) -> CourseId {
        self.course_id
    }

    pub fn cached(&self) -> Option<&LibraryListing> {
        self.cached.as_ref()
    }

    pub fn invalidate(&mut self) {
        if self.cached.take().is_some() {
            tracing::debug!("library cache invalidated");
        }
    }

    pub fn toggle(&mut self) -> PanelToggle {
        if self.open {
            self.close();
            return PanelToggle::Closed;
        }
        match self.cached.clone() {
            Some(listing) => {
                self.render(&listing);
                self.open = true;
                PanelToggle::Opened
            }
            None => PanelToggle::NeedsFetch,
        }
    }

    /// Caches a fresh listing and opens the panel on it.
    pub fn fetched(&mut self, listing: LibraryListing) {
        self.render(&listing);
        self.cached = Some(listing);
        self.open = true;
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    fn render(&mut self, listing: &LibraryListing) {
        let mut sections = vec![LibrarySection {
            kind: LibrarySectionKind::Personal,
            entries: self.entries_for(&listing.personal, LibrarySectionKind::Personal),
        }];
        if self.has_course() {
            sections.push(LibrarySection {
                kind: LibrarySectionKind::Course,
                entries: self.entries_for(&listing.shared, LibrarySectionKind::Course),
            });
        }
        self.sections = sections;
        self.filter = LibraryFilter::default();
    }

    fn entries_for(&self, items: &[LibraryItem], section: LibrarySectionKind) -> Vec<LibraryEntry> {
        items
            .iter()
            .map(|item| LibraryEntry::build(item, section, &self.registry, self.read_only))
            .collect()
    }

    /// Sections as rendered, ignoring the filter.
    pub fn sections(&self) -> &[LibrarySection] {
        &self.sections
    }

    pub fn rendered_entry(&self, item_id: LibraryItemId) -> Option<&LibraryEntry> {
        self.sections
            .iter()
            .flat_map(|section| section.entries.iter())
            .find(|entry| entry.item_id == item_id)
    }

    pub fn filter(&self) -> &LibraryFilter {
        &self.filter
    }

    pub fn set_filter(&mut self, filter: LibraryFilter) {
        self.filter = filter;
    }

    /// Rendered entries that pass `filter`, in panel order.
    pub fn apply_filter(&self, filter: &LibraryFilter) -> Vec<&LibraryEntry> {
        self.sections
            .iter()
            .flat_map(|section| section.entries.iter())
            .filter(|entry| filter.matches(entry))
            .collect()
    }

    /// Entries visible under the panel's current filter.
    pub fn visible_entries(&self) -> Vec<&LibraryEntry> {
        self.apply_filter(&self.filter)
    }

    /// Drops an entry from the rendered panel only; the cache is handled separately.
    pub fn remove_rendered(&mut self, item_id: LibraryItemId) -> bool {
        let mut removed = false;
        for section in self.sections.iter_mut() {
            let before = section.entries.len();
            section.entries.retain(|entry| entry.item_id != item_id);
            removed |= section.entries.len() != before;
        }
        removed
    }

    /// Scopes the save prompt offers.
    pub fn scope_choices(&self) -> Vec<LibraryScope> {
        let mut choices = vec![LibraryScope::Personal];
        if self.has_course() {
            choices.push(LibraryScope::Course(self.course_id));
        }
        choices
    }

    /// Opens the scope prompt for `body`, replacing any earlier prompt.
    pub fn request_save(&mut self, body: &str, category: CommentCategory, now: Instant) -> Result<(), ReviewError> {
        if is_blank_markup(body) {
            return Err(ReviewError::Validation("Please enter a comment to save.".to_string()));
        }
        self.pending_save = Some(PendingSave {
            body: body.to_string(),
            category,
            opened_at: now,
        });
        Ok(())
    }

    /// The open prompt, if it has not timed out.
    pub fn pending_save(&self, now: Instant) -> Option<&PendingSave> {
        self.pending_save.as_ref().filter(|pending| !pending.is_expired(now))
    }

    /// Drops an expired prompt. Returns true when one was removed.
    pub fn expire_prompt(&mut self, now: Instant) -> bool {
        if self.pending_save.as_ref().is_some_and(|pending| pending.is_expired(now)) {
            self.pending_save = None;
            return true;
        }
        false
    }

    pub fn dismiss_prompt(&mut self) {
        self.pending_save = None;
    }

    /// Consumes the prompt with the grader's scope choice.
    pub fn choose_scope(&mut self, scope: LibraryScope, now: Instant) -> Result<PendingSave, ReviewError> {
        let pending = self.pending_save.take().ok_or(ReviewError::Cancelled)?;
        if pending.is_expired(now) {
            tracing::debug!("save scope prompt expired");
            return Err(ReviewError::Cancelled);
        }
        if !self.scope_choices().contains(&scope) {
            return Err(ReviewError::Validation(
                "This comment cannot be shared with the course.".to_string(),
            ));
        }
        Ok(pending)
    }
}
