use crate::constants::TOOLTIP_TEXT_CHARS;
use crate::state::{CategoryRegistry, Comment, CommentCategory, CommentId};
use crate::utils::{format_time, strip_markup, truncate_chars};

/// Normalized position of `timestamp` on a timeline of `duration` seconds.
/// Callers must check `duration > 0` first.
pub fn marker_ratio(timestamp: u64, duration: f64) -> f64 {
    (timestamp as f64 / duration).clamp(0.0, 1.0)
}

/// Visual projection of a comment onto the timeline.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub comment_id: CommentId,
    pub timestamp: u64,
    pub category: CommentCategory,
    /// Left offset in percent, always within `[0, 100]`
    pub percent: f64,
    pub color: String,
    pub tooltip: String,
}

impl Marker {
    pub fn project(comment: &Comment, duration: f64, registry: &CategoryRegistry) -> Self {
        let info = registry.info(comment.category);
        Self {
            comment_id: comment.id,
            timestamp: comment.timestamp,
            category: comment.category,
            percent: marker_ratio(comment.timestamp, duration) * 100.0,
            tooltip: tooltip_text(&info.label, comment.timestamp, &comment.body),
            color: info.color,
        }
    }

    pub(crate) fn reposition(&mut self, duration: f64) {
        self.percent = marker_ratio(self.timestamp, duration) * 100.0;
    }

    /// Element id used by the view; stable for a given comment.
    pub fn dom_id(&self) -> String {
        format!("feedback-timeline-marker-{}", self.comment_id)
    }
}

/// `[label] MM:SS - text`, with the text stripped of markup and shortened.
pub fn tooltip_text(label: &str, timestamp: u64, body: &str) -> String {
    let text = truncate_chars(&strip_markup(body), TOOLTIP_TEXT_CHARS);
    format!("[{}] {} - {}", label, format_time(timestamp), text)
}
