//! One review session per grading view.
//!
//! Every remote action is split into a synchronous `begin_*` (validation,
//! in-flight flag, request snapshot), the awaited service call, and a
//! synchronous `finish_*` that applies the answer. [`SessionHandle`] chains
//! the three without holding the session lock across the network call.

use std::collections::HashSet;
use std::ops::ControlFlow;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;

use uuid::Uuid;

use super::comment_store::{validate_body, CommentCard, CommentStore};
use super::compose::ComposeForm;
use super::library_cache::{LibraryCache, LibraryFilter, PanelToggle};
use super::notify::{Notice, Notifier};
use super::player::{AttachOutcome, PlayerAdapter, PlayerEvent, PlayerPlatform, SdkLoader};
use super::ticker::PollingTicker;
use crate::error::{ActionKind, ReviewError, ServiceError};
use crate::providers::{
    AddCommentRequest, AddCommentResponse, FeedbackService, SaveLibraryItemRequest,
    SaveLibraryItemResponse, StatusResponse,
};
use crate::state::{
    AssignmentId, CategoryRegistry, Comment, CommentId, CourseId, LibraryItemId, LibraryListing,
    LibraryScope, ReviewSettings, SessionConfig,
};
use crate::timeline::{ClickTarget, SeekRequest, TimelineRenderer};
use crate::utils::format_time;

const DELETE_COMMENT_QUESTION: &str = "Are you sure you want to delete this comment?";
const DELETE_LIBRARY_ITEM_QUESTION: &str = "Delete this library comment?";

/// Identifies the session generation a request was issued in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestTicket {
    generation: u64,
    kind: ActionKind,
}

impl RequestTicket {
    pub fn kind(&self) -> ActionKind {
        self.kind
    }
}

#[derive(Debug, Clone)]
pub struct AddCommentOp {
    pub ticket: RequestTicket,
    pub request: AddCommentRequest,
}

#[derive(Debug, Clone)]
pub struct DeleteCommentOp {
    pub ticket: RequestTicket,
    pub comment_id: CommentId,
}

#[derive(Debug, Clone)]
pub struct FetchLibraryOp {
    pub ticket: RequestTicket,
    pub assignment_id: AssignmentId,
    pub course_id: CourseId,
}

#[derive(Debug, Clone)]
pub struct SaveLibraryOp {
    pub ticket: RequestTicket,
    pub request: SaveLibraryItemRequest,
}

#[derive(Debug, Clone)]
pub struct DeleteLibraryOp {
    pub ticket: RequestTicket,
    pub assignment_id: AssignmentId,
    pub item_id: LibraryItemId,
}

pub struct ReviewSession {
    id: Uuid,
    config: SessionConfig,
    settings: ReviewSettings,
    registry: CategoryRegistry,
    player: PlayerAdapter,
    timeline: TimelineRenderer,
    store: CommentStore,
    compose: ComposeForm,
    library: LibraryCache,
    service: Arc<dyn FeedbackService>,
    notifier: Arc<dyn Notifier>,
    generation: u64,
    in_flight: HashSet<ActionKind>,
    time_display: String,
    ticker: PollingTicker,
    torn_down: bool,
}

impl ReviewSession {
    /// Builds a session from the host payload. An unusable payload is
    /// reported to the grader and aborts initialization.
    pub fn new(
        config: SessionConfig,
        service: Arc<dyn FeedbackService>,
        notifier: Box<dyn Notifier>,
    ) -> Result<Self, ReviewError> {
        if let Err(err) = config.validate() {
            tracing::error!(error = %err, "review session not started");
            if let Some(notice) = Notice::from_error(&err) {
                notifier.notify(notice);
            }
            return Err(err);
        }

        let registry = config.category_registry();
        let session = Self {
            id: Uuid::new_v4(),
            settings: config.settings(),
            player: PlayerAdapter::new(config.media_id.clone(), config.player_host_id()),
            timeline: TimelineRenderer::new(registry.clone()),
            store: CommentStore::new(config.comments.clone()),
            compose: ComposeForm::new(),
            library: LibraryCache::new(registry.clone(), config.course_id, config.read_only),
            registry,
            config,
            service,
            notifier: Arc::from(notifier),
            generation: 0,
            in_flight: HashSet::new(),
            time_display: format_time(0),
            ticker: PollingTicker::new(),
            torn_down: false,
        };
        tracing::info!(
            session = %session.id,
            media_id = %session.config.media_id,
            comments = session.store.len(),
            read_only = session.config.read_only,
            "review session started"
        );
        Ok(session)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn registry(&self) -> &CategoryRegistry {
        &self.registry
    }

    pub fn is_read_only(&self) -> bool {
        self.config.read_only
    }

    pub fn timeline(&self) -> &TimelineRenderer {
        &self.timeline
    }

    pub fn store(&self) -> &CommentStore {
        &self.store
    }

    pub fn compose(&self) -> &ComposeForm {
        &self.compose
    }

    pub fn compose_mut(&mut self) -> &mut ComposeForm {
        &mut self.compose
    }

    pub fn library(&self) -> &LibraryCache {
        &self.library
    }

    pub fn player(&self) -> &PlayerAdapter {
        &self.player
    }

    /// Current playback position as shown next to the player.
    pub fn time_display(&self) -> &str {
        &self.time_display
    }

    pub fn service(&self) -> Arc<dyn FeedbackService> {
        Arc::clone(&self.service)
    }

    pub fn notifier(&self) -> Arc<dyn Notifier> {
        Arc::clone(&self.notifier)
    }

    pub fn is_in_flight(&self, kind: ActionKind) -> bool {
        self.in_flight.contains(&kind)
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    pub fn comment_cards(&self) -> Vec<CommentCard> {
        self.store.cards(&self.registry, self.config.read_only)
    }

    /// True when the comment list shows its placeholder.
    pub fn show_empty_state(&self) -> bool {
        self.store.is_empty()
    }

    // Player and timeline.

    pub fn attach_player(&mut self, platform: &mut dyn PlayerPlatform, loader: &SdkLoader) -> AttachOutcome {
        self.player.initialize(platform, loader)
    }

    pub fn on_sdk_ready(&mut self, platform: &mut dyn PlayerPlatform) -> AttachOutcome {
        self.player.on_sdk_ready(platform)
    }

    pub fn handle_player_event(&mut self, event: PlayerEvent) {
        self.player.handle_event(event);
    }

    /// One polling step. Returns false when the player had nothing to report.
    pub fn on_tick(&mut self) -> bool {
        let Some(sample) = self.player.sample() else {
            return false;
        };
        let duration = sample.state.duration_seconds;
        if sample.duration_discovered {
            if self.timeline.initialize(duration, self.store.comments()) {
                tracing::debug!(session = %self.id, duration, markers = self.timeline.markers().len(), "timeline initialized");
            }
        } else if sample.duration_changed {
            self.timeline.set_duration(duration);
            tracing::debug!(session = %self.id, duration, "timeline rescaled");
        }
        self.time_display = sample.time_display;
        self.timeline.set_playhead(sample.state.current_time_seconds);
        true
    }

    /// Starts the polling loop for `handle`. The loop holds only a weak
    /// reference and ends with the session.
    pub fn start_polling(handle: &SessionHandle) -> bool {
        let weak = Arc::downgrade(&handle.inner);
        let mut session = handle.lock();
        if session.torn_down {
            return false;
        }
        let interval = session.settings.poll_interval;
        let started = session.ticker.start(interval, move || {
            let Some(inner) = weak.upgrade() else {
                return ControlFlow::Break(());
            };
            let mut session = inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            if session.torn_down {
                return ControlFlow::Break(());
            }
            session.on_tick();
            ControlFlow::Continue(())
        });
        if started {
            tracing::debug!(session = %session.id, ?interval, "player polling started");
        }
        started
    }

    pub fn is_polling(&self) -> bool {
        self.ticker.is_running()
    }

    pub fn seek(&mut self, request: SeekRequest) -> bool {
        self.player.seek(request.seconds, request.autoplay)
    }

    /// Timeline click: a marker seeks and plays, the bare track only seeks.
    pub fn click_timeline(&mut self, target: ClickTarget) -> Option<SeekRequest> {
        let request = self.timeline.click(target)?;
        self.seek(request);
        Some(request)
    }

    /// Timestamp link on a comment card.
    pub fn seek_to_comment(&mut self, comment_id: CommentId) -> bool {
        let Some(timestamp) = self.store.get(comment_id).map(|comment| comment.timestamp) else {
            return false;
        };
        self.seek(SeekRequest {
            seconds: timestamp,
            autoplay: true,
        })
    }

    // Lifecycle.

    /// Stops polling, drops visual state and orphans every outstanding request.
    pub fn teardown(&mut self) {
        self.generation += 1;
        self.in_flight.clear();
        self.ticker = PollingTicker::new();
        self.timeline.reset();
        self.library.close();
        self.library.dismiss_prompt();
        self.torn_down = true;
        tracing::debug!(session = %self.id, generation = self.generation, "review session torn down");
    }

    /// Re-runs initialization with a new payload; responses to earlier requests are discarded.
    pub fn reinitialize(&mut self, config: SessionConfig) -> Result<(), ReviewError> {
        config.validate().map_err(|err| self.report(err))?;
        self.teardown();
        let registry = config.category_registry();
        self.settings = config.settings();
        self.player = PlayerAdapter::new(config.media_id.clone(), config.player_host_id());
        self.timeline = TimelineRenderer::new(registry.clone());
        self.store = CommentStore::new(config.comments.clone());
        self.compose = ComposeForm::new();
        self.library = LibraryCache::new(registry.clone(), config.course_id, config.read_only);
        self.registry = registry;
        self.config = config;
        self.time_display = format_time(0);
        self.torn_down = false;
        tracing::info!(session = %self.id, generation = self.generation, "review session reinitialized");
        Ok(())
    }

    // Request bookkeeping.

    fn issue(&mut self, kind: ActionKind) -> Result<RequestTicket, ReviewError> {
        if !self.in_flight.insert(kind) {
            return Err(ReviewError::Busy(kind));
        }
        Ok(RequestTicket {
            generation: self.generation,
            kind,
        })
    }

    /// Clears the in-flight flag, or rejects a response from an earlier generation.
    fn settle(&mut self, ticket: RequestTicket) -> Result<(), ReviewError> {
        if ticket.generation != self.generation {
            tracing::warn!(
                session = %self.id,
                action = ticket.kind.label(),
                "discarding response for a torn down session"
            );
            return Err(ReviewError::Stale);
        }
        self.in_flight.remove(&ticket.kind);
        Ok(())
    }

    fn ensure_writable(&self) -> Result<AssignmentId, ReviewError> {
        if self.config.read_only || self.torn_down {
            return Err(ReviewError::ReadOnly);
        }
        self.config
            .assignment()
            .ok_or_else(|| ReviewError::Config("Assignment ID missing. Cannot add comments.".to_string()))
    }

    fn report(&self, err: ReviewError) -> ReviewError {
        match &err {
            ReviewError::Transport(detail) => {
                tracing::warn!(session = %self.id, detail = %detail, "remote call failed")
            }
            ReviewError::Rejected(message) => {
                tracing::warn!(session = %self.id, message = %message, "remote call rejected")
            }
            ReviewError::Cancelled | ReviewError::Stale => {}
            other => tracing::debug!(session = %self.id, error = %other, "action refused"),
        }
        if let Some(notice) = Notice::from_error(&err) {
            self.notifier.notify(notice);
        }
        err
    }

    // Comments.

    pub fn begin_add_comment(&mut self) -> Result<AddCommentOp, ReviewError> {
        let op = self.prepare_add_comment();
        op.map_err(|err| self.report(err))
    }

    fn prepare_add_comment(&mut self) -> Result<AddCommentOp, ReviewError> {
        let assignment_id = self.ensure_writable()?;
        let draft = self.compose.draft();
        validate_body(&draft.body)?;
        let timestamp = self.player.live_position().unwrap_or(draft.timestamp);
        let ticket = self.issue(ActionKind::AddComment)?;
        Ok(AddCommentOp {
            ticket,
            request: AddCommentRequest {
                submission_id: self.config.submission_id,
                assignment_id,
                timestamp,
                body: draft.body,
                category: draft.category,
                draft_attachment_ref: draft.attachment_ref,
            },
        })
    }

    pub fn finish_add_comment(
        &mut self,
        op: AddCommentOp,
        result: Result<AddCommentResponse, ServiceError>,
    ) -> Result<Comment, ReviewError> {
        self.settle(op.ticket)?;
        let comment = match result.and_then(AddCommentResponse::into_comment) {
            Ok(comment) => comment,
            Err(err) => return Err(self.report(err.into())),
        };
        self.timeline.add_marker(&comment);
        self.store.append(comment.clone());
        self.compose.reset();
        tracing::info!(session = %self.id, comment_id = comment.id, timestamp = comment.timestamp, "comment added");
        Ok(comment)
    }

    /// Checks a delete can go ahead and returns the question to put to the grader.
    /// Ask it without holding the session lock, then call [`begin_delete_comment`](Self::begin_delete_comment).
    pub fn delete_comment_question(&mut self, comment_id: CommentId) -> Result<&'static str, ReviewError> {
        let checked = self.check_delete_comment(comment_id);
        checked
            .map(|()| DELETE_COMMENT_QUESTION)
            .map_err(|err| self.report(err))
    }

    /// Issues an already confirmed delete.
    pub fn begin_delete_comment(&mut self, comment_id: CommentId) -> Result<DeleteCommentOp, ReviewError> {
        let op = self
            .check_delete_comment(comment_id)
            .and_then(|()| self.issue(ActionKind::DeleteComment));
        match op {
            Ok(ticket) => Ok(DeleteCommentOp { ticket, comment_id }),
            Err(err) => Err(self.report(err)),
        }
    }

    fn check_delete_comment(&self, comment_id: CommentId) -> Result<(), ReviewError> {
        self.ensure_writable()?;
        if self.store.get(comment_id).is_none() {
            return Err(ReviewError::Validation("Comment not found.".to_string()));
        }
        if self.in_flight.contains(&ActionKind::DeleteComment) {
            return Err(ReviewError::Busy(ActionKind::DeleteComment));
        }
        Ok(())
    }

    pub fn finish_delete_comment(
        &mut self,
        op: DeleteCommentOp,
        result: Result<StatusResponse, ServiceError>,
    ) -> Result<(), ReviewError> {
        self.settle(op.ticket)?;
        if let Err(err) = result.and_then(|status| status.into_result("Failed to delete comment.")) {
            return Err(self.report(err.into()));
        }
        self.timeline.remove_marker(op.comment_id);
        self.store.remove(op.comment_id);
        tracing::info!(session = %self.id, comment_id = op.comment_id, remaining = self.store.len(), "comment deleted");
        Ok(())
    }

    // Library.

    /// Opens or closes the library panel. Returns a fetch to run when nothing is cached.
    pub fn begin_toggle_library(&mut self) -> Result<Option<FetchLibraryOp>, ReviewError> {
        let op = self.prepare_toggle_library();
        op.map_err(|err| self.report(err))
    }

    fn prepare_toggle_library(&mut self) -> Result<Option<FetchLibraryOp>, ReviewError> {
        let assignment_id = self.ensure_writable()?;
        if self.in_flight.contains(&ActionKind::FetchLibrary) {
            return Err(ReviewError::Busy(ActionKind::FetchLibrary));
        }
        match self.library.toggle() {
            PanelToggle::Closed | PanelToggle::Opened => Ok(None),
            PanelToggle::NeedsFetch => {
                let ticket = self.issue(ActionKind::FetchLibrary)?;
                Ok(Some(FetchLibraryOp {
                    ticket,
                    assignment_id,
                    course_id: self.library.course_id(),
                }))
            }
        }
    }

    pub fn finish_fetch_library(
        &mut self,
        op: FetchLibraryOp,
        result: Result<LibraryListing, ServiceError>,
    ) -> Result<(), ReviewError> {
        self.settle(op.ticket)?;
        let listing = result.map_err(|err| self.report(err.into()))?;
        let listing = listing.with_scopes(op.course_id);
        tracing::debug!(
            session = %self.id,
            personal = listing.personal.len(),
            shared = listing.shared.len(),
            "library loaded"
        );
        self.library.fetched(listing);
        Ok(())
    }

    pub fn close_library(&mut self) {
        self.library.close();
    }

    pub fn set_library_filter(&mut self, filter: LibraryFilter) {
        self.library.set_filter(filter);
    }

    /// Copies a library item into the compose form and closes the panel.
    pub fn insert_library_item(&mut self, item_id: LibraryItemId) -> bool {
        let Some(entry) = self.library.rendered_entry(item_id) else {
            return false;
        };
        let (body, category) = (entry.body.clone(), entry.category);
        self.compose.replace_with(&body, category);
        self.library.close();
        true
    }

    /// Opens the scope prompt for the current compose body.
    pub fn request_library_save(&mut self) -> Result<(), ReviewError> {
        let result = self.ensure_writable().and_then(|_| {
            let body = self.compose.body.clone();
            let category = self.compose.category;
            self.library.request_save(&body, category, Instant::now())
        });
        result.map_err(|err| self.report(err))
    }

    pub fn dismiss_scope_prompt(&mut self) {
        self.library.dismiss_prompt();
    }

    pub fn scope_choices(&self) -> Vec<LibraryScope> {
        self.library.scope_choices()
    }

    /// Hides the scope prompt once it has been open too long.
    pub fn expire_scope_prompt(&mut self) -> bool {
        self.library.expire_prompt(Instant::now())
    }

    pub fn begin_save_library(&mut self, scope: LibraryScope) -> Result<SaveLibraryOp, ReviewError> {
        let op = self.prepare_save_library(scope, Instant::now());
        op.map_err(|err| self.report(err))
    }

    fn prepare_save_library(&mut self, scope: LibraryScope, now: Instant) -> Result<SaveLibraryOp, ReviewError> {
        let assignment_id = self.ensure_writable()?;
        if self.in_flight.contains(&ActionKind::SaveLibraryItem) {
            return Err(ReviewError::Busy(ActionKind::SaveLibraryItem));
        }
        let pending = self.library.choose_scope(scope, now)?;
        let ticket = self.issue(ActionKind::SaveLibraryItem)?;
        Ok(SaveLibraryOp {
            ticket,
            request: SaveLibraryItemRequest {
                assignment_id,
                body: pending.body,
                category: pending.category,
                course_id: scope.course_id(),
                existing_item_id: 0,
            },
        })
    }

    pub fn finish_save_library(
        &mut self,
        op: SaveLibraryOp,
        result: Result<SaveLibraryItemResponse, ServiceError>,
    ) -> Result<LibraryItemId, ReviewError> {
        self.settle(op.ticket)?;
        let response = result.map_err(|err| self.report(err.into()))?;
        if !response.success {
            let err = ReviewError::Rejected("Failed to save comment to library.".to_string());
            return Err(self.report(err));
        }
        self.library.invalidate();
        tracing::info!(session = %self.id, item_id = response.item_id, course_id = op.request.course_id, "library item saved");
        self.notifier
            .notify(Notice::info("Saved", "Comment saved to library."));
        Ok(response.item_id)
    }

    /// Checks a library delete can go ahead and returns the confirmation question.
    pub fn delete_library_item_question(&mut self, item_id: LibraryItemId) -> Result<&'static str, ReviewError> {
        let checked = self.check_delete_library_item(item_id);
        checked
            .map(|_| DELETE_LIBRARY_ITEM_QUESTION)
            .map_err(|err| self.report(err))
    }

    /// Issues an already confirmed library delete.
    pub fn begin_delete_library_item(&mut self, item_id: LibraryItemId) -> Result<DeleteLibraryOp, ReviewError> {
        let op = self.check_delete_library_item(item_id).and_then(|assignment_id| {
            let ticket = self.issue(ActionKind::DeleteLibraryItem)?;
            Ok(DeleteLibraryOp {
                ticket,
                assignment_id,
                item_id,
            })
        });
        op.map_err(|err| self.report(err))
    }

    fn check_delete_library_item(&self, item_id: LibraryItemId) -> Result<AssignmentId, ReviewError> {
        let assignment_id = self.ensure_writable()?;
        let entry = self
            .library
            .rendered_entry(item_id)
            .ok_or_else(|| ReviewError::Validation("Library comment not found.".to_string()))?;
        if !entry.can_delete {
            return Err(ReviewError::Validation(
                "Only your own library comments can be deleted.".to_string(),
            ));
        }
        if self.in_flight.contains(&ActionKind::DeleteLibraryItem) {
            return Err(ReviewError::Busy(ActionKind::DeleteLibraryItem));
        }
        Ok(assignment_id)
    }

    pub fn finish_delete_library_item(
        &mut self,
        op: DeleteLibraryOp,
        result: Result<StatusResponse, ServiceError>,
    ) -> Result<(), ReviewError> {
        self.settle(op.ticket)?;
        if let Err(err) = result.and_then(|status| status.into_result("Failed to delete library comment.")) {
            return Err(self.report(err.into()));
        }
        self.library.invalidate();
        self.library.remove_rendered(op.item_id);
        tracing::info!(session = %self.id, item_id = op.item_id, "library item deleted");
        Ok(())
    }
}

/// Shared handle used by the view and the polling loop.
#[derive(Clone)]
pub struct SessionHandle {
    inner: Arc<Mutex<ReviewSession>>,
}

impl SessionHandle {
    pub fn new(session: ReviewSession) -> Self {
        Self {
            inner: Arc::new(Mutex::new(session)),
        }
    }

    pub fn lock(&self) -> MutexGuard<'_, ReviewSession> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn start_polling(&self) -> bool {
        ReviewSession::start_polling(self)
    }

    pub fn teardown(&self) {
        self.lock().teardown();
    }

    pub async fn add_comment(&self) -> Result<Comment, ReviewError> {
        let (op, service) = {
            let mut session = self.lock();
            (session.begin_add_comment()?, session.service())
        };
        let result = service.add_comment(op.request.clone()).await;
        self.lock().finish_add_comment(op, result)
    }

    pub async fn delete_comment(&self, comment_id: CommentId) -> Result<(), ReviewError> {
        let (question, notifier) = {
            let mut session = self.lock();
            (session.delete_comment_question(comment_id)?, session.notifier())
        };
        if !notifier.confirm(question) {
            return Err(ReviewError::Cancelled);
        }
        let (op, service) = {
            let mut session = self.lock();
            (session.begin_delete_comment(comment_id)?, session.service())
        };
        let result = service.delete_comment(op.comment_id).await;
        self.lock().finish_delete_comment(op, result)
    }

    pub async fn toggle_library(&self) -> Result<bool, ReviewError> {
        let (op, service) = {
            let mut session = self.lock();
            match session.begin_toggle_library()? {
                Some(op) => (op, session.service()),
                None => return Ok(session.library().is_open()),
            }
        };
        let result = service.get_library(op.assignment_id, op.course_id).await;
        let mut session = self.lock();
        session.finish_fetch_library(op, result)?;
        Ok(session.library().is_open())
    }

    pub async fn save_to_library(&self, scope: LibraryScope) -> Result<LibraryItemId, ReviewError> {
        let (op, service) = {
            let mut session = self.lock();
            (session.begin_save_library(scope)?, session.service())
        };
        let result = service.save_library_item(op.request.clone()).await;
        self.lock().finish_save_library(op, result)
    }

    pub async fn delete_library_item(&self, item_id: LibraryItemId) -> Result<(), ReviewError> {
        let (question, notifier) = {
            let mut session = self.lock();
            (session.delete_library_item_question(item_id)?, session.notifier())
        };
        if !notifier.confirm(question) {
            return Err(ReviewError::Cancelled);
        }
        let (op, service) = {
            let mut session = self.lock();
            (session.begin_delete_library_item(item_id)?, session.service())
        };
        let result = service.delete_library_item(op.assignment_id, op.item_id).await;
        self.lock().finish_delete_library_item(op, result)
    }
}

impl PartialEq for SessionHandle {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::library_cache::CategoryFilter;
    use crate::core::notify::NoticeLevel;
    use crate::core::test_support::{RecordingNotifier, ScriptedPlatform, ScriptedPlayer};
    use crate::providers::InMemoryFeedbackService;
    use crate::state::CommentCategory;
    use std::sync::Weak;
    use std::time::Duration;

    const SUBMISSION: i64 = 10;
    const ASSIGNMENT: i64 = 2;
    const COURSE: i64 = 5;

    struct Harness {
        handle: SessionHandle,
        service: Arc<InMemoryFeedbackService>,
        player: ScriptedPlayer,
        notifier: RecordingNotifier,
    }

    fn config() -> SessionConfig {
        let mut config = SessionConfig::new("dQw4w9WgXcQ", SUBMISSION, ASSIGNMENT);
        config.course_id = COURSE;
        config
    }

    fn harness_with(config: SessionConfig, duration: f64) -> Harness {
        let service = Arc::new(InMemoryFeedbackService::new(1, "Ada Grader").with_assignment(ASSIGNMENT, COURSE));
        let notifier = RecordingNotifier::answering(true);
        let shared: Arc<dyn FeedbackService> = service.clone();
        let mut session = ReviewSession::new(config, shared, Box::new(notifier.clone())).unwrap();

        let player = ScriptedPlayer::new(duration);
        let mut platform = ScriptedPlatform::ready_with(player.clone());
        assert_eq!(
            session.attach_player(&mut platform, &SdkLoader::new()),
            AttachOutcome::Attached
        );
        session.handle_player_event(PlayerEvent::Ready);
        session.on_tick();

        Harness {
            handle: SessionHandle::new(session),
            service,
            player,
            notifier,
        }
    }

    /// Records whether the session lock was free each time a confirmation was asked.
    #[derive(Clone, Default)]
    struct LockCheckingNotifier {
        session: Arc<Mutex<Weak<Mutex<ReviewSession>>>>,
        unlocked_on_confirm: Arc<Mutex<Vec<bool>>>,
    }

    impl Notifier for LockCheckingNotifier {
        fn notify(&self, _notice: Notice) {}

        fn confirm(&self, _question: &str) -> bool {
            let session = self.session.lock().unwrap().upgrade();
            let unlocked = session.map(|inner| inner.try_lock().is_ok()).unwrap_or(false);
            self.unlocked_on_confirm.lock().unwrap().push(unlocked);
            true
        }
    }

    fn harness() -> Harness {
        harness_with(config(), 300.0)
    }

    fn write_body(harness: &Harness, body: &str) {
        harness.handle.lock().compose_mut().body = body.to_string();
    }

    #[tokio::test]
    async fn test_blank_body_rejected_without_network_call() {
        let h = harness();
        write_body(&h, "<p><br></p>");
        let result = h.handle.add_comment().await;
        assert!(matches!(result, Err(ReviewError::Validation(_))));
        assert_eq!(h.service.calls(), 0);
        assert_eq!(h.notifier.notices()[0].message, "Please enter a comment.");
        assert!(!h.handle.lock().is_in_flight(ActionKind::AddComment));
    }

    #[tokio::test]
    async fn test_add_uses_live_player_time() {
        let h = harness();
        h.player.set_time(125.7);
        {
            let mut session = h.handle.lock();
            session.compose_mut().body = "Great work".to_string();
            session.compose_mut().timestamp = 3;
        }
        let comment = h.handle.add_comment().await.unwrap();
        assert_eq!(comment.timestamp, 125);
        assert_eq!(comment.category, CommentCategory::General);
        assert_eq!(comment.author_display_name, "Ada Grader");
        assert_eq!(h.service.comments_for(SUBMISSION).len(), 1);

        let session = h.handle.lock();
        let marker = session.timeline().marker(comment.id).unwrap();
        assert!((marker.percent - 125.0 / 300.0 * 100.0).abs() < 1e-9);
        assert_eq!(session.store().len(), 1);
        assert_eq!(*session.compose(), ComposeForm::new());
        assert!(!session.show_empty_state());
    }

    #[tokio::test]
    async fn test_add_falls_back_to_form_timestamp_before_ready() {
        let service = Arc::new(InMemoryFeedbackService::new(1, "Ada").with_assignment(ASSIGNMENT, COURSE));
        let shared: Arc<dyn FeedbackService> = service.clone();
        let session = ReviewSession::new(config(), shared, Box::new(RecordingNotifier::answering(true))).unwrap();
        let handle = SessionHandle::new(session);
        {
            let mut session = handle.lock();
            session.compose_mut().body = "Audio drops here".to_string();
            session.compose_mut().timestamp = 42;
        }
        let comment = handle.add_comment().await.unwrap();
        assert_eq!(comment.timestamp, 42);
        // Timeline never initialized, so no marker yet.
        assert!(handle.lock().timeline().markers().is_empty());
    }

    #[tokio::test]
    async fn test_rejection_leaves_state_unchanged() {
        let h = harness();
        write_body(&h, "Keep this text");
        h.service.fail_next(ServiceError::rejected("Permission denied"));
        let result = h.handle.add_comment().await;
        assert_eq!(result, Err(ReviewError::Rejected("Permission denied".to_string())));

        let session = h.handle.lock();
        assert!(session.store().is_empty());
        assert!(session.timeline().markers().is_empty());
        assert_eq!(session.compose().body, "Keep this text");
        let notices = h.notifier.notices();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].level, NoticeLevel::Error);
        assert_eq!(notices[0].message, "Permission denied");
    }

    #[tokio::test]
    async fn test_transport_failure_shows_generic_message() {
        let h = harness();
        write_body(&h, "Nice");
        h.service.fail_next(ServiceError::Transport("connection reset".to_string()));
        assert!(matches!(h.handle.add_comment().await, Err(ReviewError::Transport(_))));
        assert_eq!(
            h.notifier.notices()[0].message,
            "Could not reach the server. Please try again."
        );
        assert!(!h.handle.lock().is_in_flight(ActionKind::AddComment));
    }

    #[tokio::test]
    async fn test_deleting_last_comment_shows_empty_state() {
        let h = harness();
        write_body(&h, "Only comment");
        let comment = h.handle.add_comment().await.unwrap();

        h.handle.delete_comment(comment.id).await.unwrap();
        let session = h.handle.lock();
        assert!(session.show_empty_state());
        assert!(session.timeline().markers().is_empty());
        assert_eq!(
            h.notifier.questions(),
            vec!["Are you sure you want to delete this comment?".to_string()]
        );
    }

    #[tokio::test]
    async fn test_declined_delete_makes_no_call() {
        let h = harness();
        write_body(&h, "Stay");
        let comment = h.handle.add_comment().await.unwrap();
        let calls = h.service.calls();

        h.notifier.set_answer(false);
        assert_eq!(h.handle.delete_comment(comment.id).await, Err(ReviewError::Cancelled));
        assert_eq!(h.service.calls(), calls);
        assert_eq!(h.handle.lock().store().len(), 1);
        assert!(h.notifier.notices().is_empty());
    }

    #[tokio::test]
    async fn test_delete_confirmation_runs_without_session_lock() {
        let service = Arc::new(InMemoryFeedbackService::new(1, "Ada").with_assignment(ASSIGNMENT, COURSE));
        let shared: Arc<dyn FeedbackService> = service.clone();
        let notifier = LockCheckingNotifier::default();
        let session = ReviewSession::new(config(), shared, Box::new(notifier.clone())).unwrap();
        let handle = SessionHandle::new(session);
        *notifier.session.lock().unwrap() = Arc::downgrade(&handle.inner);

        handle.lock().compose_mut().body = "Remove me".to_string();
        let comment = handle.add_comment().await.unwrap();
        handle.delete_comment(comment.id).await.unwrap();

        assert_eq!(*notifier.unlocked_on_confirm.lock().unwrap(), vec![true]);
        assert!(handle.lock().store().is_empty());
    }

    #[tokio::test]
    async fn test_failed_delete_keeps_marker() {
        let h = harness();
        write_body(&h, "Stay");
        let comment = h.handle.add_comment().await.unwrap();
        h.service.fail_next(ServiceError::rejected("Error deleting comment: locked"));
        assert!(h.handle.delete_comment(comment.id).await.is_err());
        let session = h.handle.lock();
        assert_eq!(session.store().len(), 1);
        assert!(session.timeline().marker(comment.id).is_some());
    }

    #[test]
    fn test_second_add_is_busy() {
        let h = harness();
        write_body(&h, "First");
        let mut session = h.handle.lock();
        let first = session.begin_add_comment().unwrap();
        assert_eq!(
            session.begin_add_comment().unwrap_err(),
            ReviewError::Busy(ActionKind::AddComment)
        );
        assert!(session.is_in_flight(ActionKind::AddComment));

        let response = AddCommentResponse {
            success: false,
            message: "nope".to_string(),
            comment: None,
        };
        assert!(session.finish_add_comment(first, Ok(response)).is_err());
        assert!(session.begin_add_comment().is_ok());
    }

    #[test]
    fn test_response_after_teardown_is_discarded() {
        let h = harness();
        write_body(&h, "Late");
        let mut session = h.handle.lock();
        let op = session.begin_add_comment().unwrap();
        session.teardown();

        let comment = Comment {
            id: 99,
            timestamp: 1,
            category: CommentCategory::General,
            body: "Late".to_string(),
            author_display_name: String::new(),
            created_display: String::new(),
        };
        let response = AddCommentResponse {
            success: true,
            message: String::new(),
            comment: Some(comment),
        };
        assert_eq!(session.finish_add_comment(op, Ok(response)), Err(ReviewError::Stale));
        assert!(session.store().is_empty());
        assert!(h.notifier.notices().is_empty());
    }

    #[test]
    fn test_response_after_reinitialize_is_discarded() {
        let h = harness();
        write_body(&h, "Before reload");
        let mut session = h.handle.lock();
        let op = session.begin_add_comment().unwrap();

        let mut reloaded = config();
        reloaded.comments = vec![Comment {
            id: 7,
            timestamp: 20,
            category: CommentCategory::Question,
            body: "Why here?".to_string(),
            author_display_name: "Bo".to_string(),
            created_display: String::new(),
        }];
        session.reinitialize(reloaded).unwrap();

        let late = Comment {
            id: 98,
            timestamp: 3,
            category: CommentCategory::General,
            body: "Before reload".to_string(),
            author_display_name: String::new(),
            created_display: String::new(),
        };
        let response = AddCommentResponse {
            success: true,
            message: String::new(),
            comment: Some(late),
        };
        assert_eq!(session.finish_add_comment(op, Ok(response)), Err(ReviewError::Stale));

        assert_eq!(session.store().len(), 1);
        assert!(session.store().get(7).is_some());
        assert!(session.store().get(98).is_none());
        assert_eq!(*session.compose(), ComposeForm::new());
        assert!(!session.is_torn_down());
        assert!(!session.is_in_flight(ActionKind::AddComment));

        session.compose_mut().body = "After reload".to_string();
        assert!(session.begin_add_comment().is_ok());
        assert!(h.notifier.notices().is_empty());
    }

    #[tokio::test]
    async fn test_read_only_rejects_writes() {
        let mut config = config();
        config.read_only = true;
        config.assignment_id = None;
        config.comments = vec![Comment {
            id: 1,
            timestamp: 30,
            category: CommentCategory::Praise,
            body: "Nice".to_string(),
            author_display_name: "Ada".to_string(),
            created_display: String::new(),
        }];
        let h = harness_with(config, 60.0);
        write_body(&h, "Nope");
        assert_eq!(h.handle.add_comment().await, Err(ReviewError::ReadOnly));
        assert_eq!(h.handle.delete_comment(1).await, Err(ReviewError::ReadOnly));
        assert_eq!(h.service.calls(), 0);

        let session = h.handle.lock();
        assert_eq!(session.timeline().markers().len(), 1);
        assert!(session.comment_cards().iter().all(|card| !card.can_delete));
    }

    #[test]
    fn test_missing_assignment_is_reported() {
        let mut config = config();
        config.assignment_id = Some(0);
        let notifier = RecordingNotifier::answering(true);
        let service: Arc<dyn FeedbackService> = Arc::new(InMemoryFeedbackService::new(1, "Ada"));
        let result = ReviewSession::new(config, service, Box::new(notifier.clone()));
        assert!(matches!(result, Err(ReviewError::Config(_))));
        assert!(notifier.notices()[0].message.contains("Assignment ID missing"));
    }

    #[test]
    fn test_unknown_category_falls_back_everywhere() {
        let comment: Comment = serde_json::from_str(
            r#"{"id": 4, "timestamp": 65, "comment": "<p>Hmm</p>", "commenttype": "rant", "gradername": "Bo"}"#,
        )
        .unwrap();
        let mut config = config();
        config.comments = vec![comment];
        let h = harness_with(config, 130.0);

        let session = h.handle.lock();
        let marker = session.timeline().marker(4).unwrap();
        assert_eq!(marker.tooltip, "[General] 01:05 - Hmm");
        assert_eq!(marker.color, "#6c757d");
        let card = &session.comment_cards()[0];
        assert_eq!(card.category_label, "General");
        assert_eq!(card.category_color, "#6c757d");
    }

    #[test]
    fn test_tick_initializes_timeline_and_playhead() {
        let h = harness_with(config(), 0.0);
        let mut session = h.handle.lock();
        assert!(!session.timeline().is_initialized());

        h.player.set_duration(200.0);
        h.player.set_time(50.0);
        assert!(session.on_tick());
        assert!(session.timeline().is_initialized());
        assert_eq!(session.timeline().playhead_percent(), Some(25.0));
        assert_eq!(session.time_display(), "00:50");
    }

    #[test]
    fn test_duration_change_moves_markers() {
        let mut config = config();
        config.comments = vec![Comment {
            id: 3,
            timestamp: 50,
            category: CommentCategory::Praise,
            body: "Halfway".to_string(),
            author_display_name: "Ada".to_string(),
            created_display: String::new(),
        }];
        let h = harness_with(config, 100.0);
        assert!((h.handle.lock().timeline().marker(3).unwrap().percent - 50.0).abs() < 1e-9);

        h.player.set_duration(200.0);
        let mut session = h.handle.lock();
        assert!(session.on_tick());
        assert_eq!(session.timeline().duration(), 200.0);
        assert!((session.timeline().marker(3).unwrap().percent - 25.0).abs() < 1e-9);

        assert!(session.on_tick());
        assert_eq!(session.timeline().markers().len(), 1);
    }

    #[test]
    fn test_timeline_clicks_seek_player() {
        let mut config = config();
        config.comments = vec![Comment {
            id: 7,
            timestamp: 90,
            category: CommentCategory::Suggestion,
            body: "Trim".to_string(),
            author_display_name: String::new(),
            created_display: String::new(),
        }];
        let h = harness_with(config, 300.0);
        let mut session = h.handle.lock();

        let seek = session
            .click_timeline(ClickTarget::Track { x: 500.0, width: 1000.0 })
            .unwrap();
        assert_eq!(seek, SeekRequest { seconds: 150, autoplay: false });
        assert!(!h.player.is_playing());

        session.click_timeline(ClickTarget::Marker(7)).unwrap();
        assert!(h.player.is_playing());
        assert!(session.seek_to_comment(7));
        assert_eq!(h.player.seeks(), vec![150.0, 90.0, 90.0]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_polling_updates_display_until_teardown() {
        let h = harness();
        assert!(h.handle.start_polling());
        assert!(!h.handle.start_polling());

        h.player.set_time(65.0);
        tokio::time::sleep(Duration::from_millis(600)).await;
        assert_eq!(h.handle.lock().time_display(), "01:05");

        h.handle.lock().teardown();
        h.player.set_time(120.0);
        tokio::time::sleep(Duration::from_millis(600)).await;
        let session = h.handle.lock();
        assert_eq!(session.time_display(), "01:05");
        assert!(!session.is_polling());
    }

    #[tokio::test]
    async fn test_library_open_uses_cache() {
        let h = harness();
        assert!(h.handle.toggle_library().await.unwrap());
        assert_eq!(h.service.calls(), 1);
        assert!(!h.handle.toggle_library().await.unwrap());
        assert!(h.handle.toggle_library().await.unwrap());
        assert_eq!(h.service.calls(), 1);

        let session = h.handle.lock();
        let titles: Vec<&str> = session.library().sections().iter().map(|s| s.title()).collect();
        assert_eq!(titles, vec!["My Comments", "Course Comments"]);
    }

    #[tokio::test]
    async fn test_failed_library_fetch_keeps_panel_closed() {
        let h = harness();
        h.service.fail_next(ServiceError::Transport("timeout".to_string()));
        assert!(h.handle.toggle_library().await.is_err());
        let session = h.handle.lock();
        assert!(!session.library().is_open());
        assert!(session.library().cached().is_none());
        assert!(!session.is_in_flight(ActionKind::FetchLibrary));
    }

    #[tokio::test]
    async fn test_save_invalidates_cache_so_next_open_refetches() {
        let h = harness();
        h.handle.toggle_library().await.unwrap();
        h.handle.lock().close_library();

        {
            let mut session = h.handle.lock();
            session.compose_mut().body = "Nice framing".to_string();
            session.compose_mut().category = CommentCategory::Praise;
            session.request_library_save().unwrap();
            assert_eq!(
                session.scope_choices(),
                vec![LibraryScope::Personal, LibraryScope::Course(COURSE)]
            );
        }
        let item_id = h.handle.save_to_library(LibraryScope::Personal).await.unwrap();
        assert!(item_id > 0);
        assert!(h.handle.lock().library().cached().is_none());
        let notices = h.notifier.notices();
        assert_eq!(notices.last().map(|n| n.title.as_str()), Some("Saved"));

        let calls = h.service.calls();
        assert!(h.handle.toggle_library().await.unwrap());
        assert_eq!(h.service.calls(), calls + 1);

        let session = h.handle.lock();
        let entry = session.library().rendered_entry(item_id).unwrap();
        assert_eq!(entry.preview, "Nice framing");
        assert!(entry.can_delete);
    }

    #[tokio::test]
    async fn test_save_without_prompt_is_cancelled() {
        let h = harness();
        assert_eq!(
            h.handle.save_to_library(LibraryScope::Personal).await,
            Err(ReviewError::Cancelled)
        );
        assert_eq!(h.service.calls(), 0);
    }

    #[tokio::test]
    async fn test_insert_and_delete_library_item() {
        let h = harness();
        {
            let mut session = h.handle.lock();
            session.compose_mut().body = "<p>Fix this</p>".to_string();
            session.compose_mut().category = CommentCategory::Correction;
            session.request_library_save().unwrap();
        }
        let item_id = h
            .handle
            .save_to_library(LibraryScope::Course(COURSE))
            .await
            .unwrap();
        h.handle.toggle_library().await.unwrap();

        {
            let mut session = h.handle.lock();
            session.set_library_filter(LibraryFilter::new(CategoryFilter::All, "fix"));
            assert_eq!(session.library().visible_entries().len(), 1);
            session.compose_mut().reset();
            assert!(session.insert_library_item(item_id));
            assert_eq!(session.compose().body, "<p>Fix this</p>");
            assert_eq!(session.compose().category, CommentCategory::Correction);
            assert!(!session.library().is_open());
        }

        h.handle.toggle_library().await.unwrap();
        h.handle.delete_library_item(item_id).await.unwrap();
        let session = h.handle.lock();
        assert!(session.library().rendered_entry(item_id).is_none());
        assert!(session.library().cached().is_none());
    }
}
