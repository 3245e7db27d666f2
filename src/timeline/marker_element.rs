use dioxus::prelude::*;

use crate::constants::{MARKER_BORDER_COLOR, TIMELINE_MARKER_SIZE};
use crate::state::CommentId;

use super::marker::Marker;

/// One comment dot on the timeline bar. Clicking it seeks and plays; the
/// click never reaches the bar's own seek handler.
#[component]
pub fn MarkerElement(marker: Marker, on_click: EventHandler<CommentId>) -> Element {
    let comment_id = marker.comment_id;
    let dom_id = marker.dom_id();
    let size = TIMELINE_MARKER_SIZE;
    let half = size / 2.0;
    let percent = marker.percent;
    let color = marker.color.clone();
    let tooltip = marker.tooltip.clone();
    let category = marker.category.key();

    rsx! {
        div {
            id: "{dom_id}",
            class: "feedback-marker feedback-marker-{category}",
            title: "{tooltip}",
            style: "
                position: absolute;
                left: {percent}%;
                top: 50%;
                width: {size}px;
                height: {size}px;
                margin-left: -{half}px;
                margin-top: -{half}px;
                border-radius: 50%;
                background-color: {color};
                border: 2px solid {MARKER_BORDER_COLOR};
                box-sizing: border-box;
                box-shadow: 0 0 0 1px rgba(0,0,0,0.25);
                cursor: pointer;
            ",
            onclick: move |e| {
                e.stop_propagation();
                on_click.call(comment_id);
            },
        }
    }
}
