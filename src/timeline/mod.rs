//! Timeline module
//!
//! Geometry lives in `marker` and `renderer`; the rest are Dioxus views over it.

mod marker;
mod marker_element;
mod panel;
mod renderer;
mod ruler;

pub use marker::{marker_ratio, tooltip_text, Marker};
pub use marker_element::MarkerElement;
pub use panel::TimelinePanel;
pub use renderer::{ClickTarget, SeekRequest, TimelineRenderer};
