//! Timeline geometry: markers, playhead and click-to-seek.
//!
//! Nothing is drawn until the video duration is known. Markers sharing a
//! timestamp overlap; later markers stack on top.

use super::marker::Marker;
use crate::state::{CategoryRegistry, Comment, CommentId};

/// What a click on the timeline landed on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClickTarget {
    /// Bare track area; seeks by horizontal position.
    Track { x: f64, width: f64 },
    /// A marker; its own handler wins and the track never sees the click.
    Marker(CommentId),
}

/// Seek produced by a timeline interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeekRequest {
    pub seconds: u64,
    pub autoplay: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimelineRenderer {
    registry: CategoryRegistry,
    duration: f64,
    initialized: bool,
    markers: Vec<Marker>,
    playhead_percent: Option<f64>,
}

impl TimelineRenderer {
    pub fn new(registry: CategoryRegistry) -> Self {
        Self {
            registry,
            duration: 0.0,
            initialized: false,
            markers: Vec::new(),
            playhead_percent: None,
        }
    }

    pub fn registry(&self) -> &CategoryRegistry {
        &self.registry
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn marker(&self, comment_id: CommentId) -> Option<&Marker> {
        self.markers.iter().find(|marker| marker.comment_id == comment_id)
    }

    pub fn playhead_percent(&self) -> Option<f64> {
        self.playhead_percent
    }

    /// Rebuild every marker for a known duration. No-op while `duration <= 0`.
    pub fn initialize(&mut self, duration: f64, comments: &[Comment]) -> bool {
        if !(duration > 0.0) {
            return false;
        }
        self.duration = duration;
        self.initialized = true;
        self.markers = comments
            .iter()
            .map(|comment| Marker::project(comment, duration, &self.registry))
            .collect();
        true
    }

    /// Reposition existing markers when the duration changes after initialization.
    pub fn set_duration(&mut self, duration: f64) {
        if !self.initialized || !(duration > 0.0) || duration == self.duration {
            return;
        }
        self.duration = duration;
        for marker in self.markers.iter_mut() {
            marker.reposition(duration);
        }
    }

    /// Add one marker. No-op before initialization.
    pub fn add_marker(&mut self, comment: &Comment) -> bool {
        if !self.initialized || !(self.duration > 0.0) {
            return false;
        }
        self.markers
            .push(Marker::project(comment, self.duration, &self.registry));
        true
    }

    /// Remove a marker; removing an unknown id is a no-op.
    pub fn remove_marker(&mut self, comment_id: CommentId) -> bool {
        let before = self.markers.len();
        self.markers.retain(|marker| marker.comment_id != comment_id);
        self.markers.len() != before
    }

    pub fn set_playhead(&mut self, current_time: f64) {
        if !self.initialized || !current_time.is_finite() {
            return;
        }
        self.playhead_percent = Some(marker_ratio_f(current_time, self.duration) * 100.0);
    }

    /// Translate a click into a seek.
    pub fn click(&self, target: ClickTarget) -> Option<SeekRequest> {
        if !self.initialized {
            return None;
        }
        match target {
            ClickTarget::Marker(comment_id) => self.marker(comment_id).map(|marker| SeekRequest {
                seconds: marker.timestamp,
                autoplay: true,
            }),
            ClickTarget::Track { x, width } => {
                if !(width > 0.0) || !x.is_finite() {
                    return None;
                }
                let ratio = (x / width).clamp(0.0, 1.0);
                Some(SeekRequest {
                    seconds: (ratio * self.duration).floor() as u64,
                    autoplay: false,
                })
            }
        }
    }

    /// Drop all visual state, e.g. when the view is torn down.
    pub fn reset(&mut self) {
        self.duration = 0.0;
        self.initialized = false;
        self.markers.clear();
        self.playhead_percent = None;
    }
}

fn marker_ratio_f(seconds: f64, duration: f64) -> f64 {
    (seconds.max(0.0) / duration).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::CommentCategory;

    fn comment(id: CommentId, timestamp: u64) -> Comment {
        Comment {
            id,
            timestamp,
            category: CommentCategory::General,
            body: format!("comment {}", id),
            author_display_name: "Ada".to_string(),
            created_display: String::new(),
        }
    }

    fn renderer() -> TimelineRenderer {
        TimelineRenderer::new(CategoryRegistry::builtin())
    }

    #[test]
    fn test_no_markers_before_duration_known() {
        let mut timeline = renderer();
        assert!(!timeline.initialize(0.0, &[comment(1, 10)]));
        assert!(!timeline.add_marker(&comment(2, 20)));
        assert!(timeline.markers().is_empty());
        timeline.set_playhead(5.0);
        assert_eq!(timeline.playhead_percent(), None);
    }

    #[test]
    fn test_initialize_projects_all_comments() {
        let mut timeline = renderer();
        assert!(timeline.initialize(200.0, &[comment(1, 50), comment(2, 50), comment(3, 400)]));
        let percents: Vec<f64> = timeline.markers().iter().map(|marker| marker.percent).collect();
        assert_eq!(percents, vec![25.0, 25.0, 100.0]);
    }

    #[test]
    fn test_remove_marker_is_idempotent() {
        let mut timeline = renderer();
        timeline.initialize(100.0, &[comment(1, 10), comment(2, 20)]);
        assert!(timeline.remove_marker(1));
        assert!(!timeline.remove_marker(1));
        assert_eq!(timeline.markers().len(), 1);
        assert!(!timeline.remove_marker(99));
    }

    #[test]
    fn test_duration_change_repositions() {
        let mut timeline = renderer();
        timeline.initialize(100.0, &[comment(1, 50)]);
        timeline.set_duration(200.0);
        assert_eq!(timeline.markers()[0].percent, 25.0);
    }

    #[test]
    fn test_track_click_seeks_by_ratio() {
        let mut timeline = renderer();
        timeline.initialize(300.0, &[comment(1, 125)]);
        let seek = timeline.click(ClickTarget::Track { x: 250.0, width: 1000.0 }).unwrap();
        assert_eq!(seek, SeekRequest { seconds: 75, autoplay: false });
        let seek = timeline.click(ClickTarget::Track { x: 1200.0, width: 1000.0 }).unwrap();
        assert_eq!(seek.seconds, 300);
        assert!(timeline.click(ClickTarget::Track { x: 10.0, width: 0.0 }).is_none());
    }

    #[test]
    fn test_marker_click_seeks_and_plays() {
        let mut timeline = renderer();
        timeline.initialize(300.0, &[comment(1, 125)]);
        let seek = timeline.click(ClickTarget::Marker(1)).unwrap();
        assert_eq!(seek, SeekRequest { seconds: 125, autoplay: true });
        assert!(timeline.click(ClickTarget::Marker(2)).is_none());
    }

    #[test]
    fn test_playhead_clamped() {
        let mut timeline = renderer();
        timeline.initialize(100.0, &[]);
        timeline.set_playhead(150.0);
        assert_eq!(timeline.playhead_percent(), Some(100.0));
        timeline.set_playhead(25.0);
        assert_eq!(timeline.playhead_percent(), Some(25.0));
    }
}
