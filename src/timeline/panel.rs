use dioxus::prelude::*;

use crate::constants::{
    BG_ELEVATED, BG_SURFACE, BORDER_DEFAULT, PLAYHEAD_COLOR, TEXT_MUTED, TEXT_SECONDARY,
    TIMELINE_BAR_HEIGHT, TIMELINE_HOST_ID, TIMELINE_WIDTH_SCRIPT,
};

use super::marker::Marker;
use super::marker_element::MarkerElement;
use super::renderer::ClickTarget;
use super::ruler::TimeRuler;

/// Timeline bar under the player: ruler, comment markers and playhead.
///
/// Renders nothing until the duration is known. Clicks are reported as
/// [`ClickTarget`]s; the owner decides how to seek.
#[component]
pub fn TimelinePanel(
    markers: Vec<Marker>,
    duration: f64,
    playhead_percent: Option<f64>,
    time_display: String,
    on_click: EventHandler<ClickTarget>,
) -> Element {
    let mut bar_width = use_signal(|| None::<f64>);
    let mut width_eval = use_signal(|| None::<document::Eval>);

    use_effect(move || {
        if width_eval().is_some() {
            return;
        }
        let eval = document::eval(TIMELINE_WIDTH_SCRIPT);
        width_eval.set(Some(eval));
    });

    use_future(move || {
        let width_eval = width_eval.clone();
        async move {
            loop {
                let Some(eval) = width_eval() else {
                    tokio::time::sleep(std::time::Duration::from_millis(100)).await;
                    continue;
                };
                let mut eval = eval;
                loop {
                    match eval.recv::<f64>().await {
                        Ok(width) => {
                            let width = width.max(0.0);
                            if bar_width() != Some(width) {
                                bar_width.set(Some(width));
                            }
                        }
                        Err(_) => break,
                    }
                }
                tokio::time::sleep(std::time::Duration::from_millis(100)).await;
            }
        }
    });

    let ready = duration > 0.0;
    let bar_height = TIMELINE_BAR_HEIGHT;

    rsx! {
        div {
            style: "
                display: flex; flex-direction: column; gap: 4px;
                padding: 6px 10px;
                background-color: {BG_ELEVATED};
                border: 1px solid {BORDER_DEFAULT};
                border-radius: 6px;
            ",

            div {
                style: "display: flex; justify-content: space-between; font-size: 11px; color: {TEXT_MUTED};",
                span { style: "text-transform: uppercase; letter-spacing: 0.5px;", "Feedback timeline" }
                span {
                    style: "font-family: 'SF Mono', Consolas, monospace; color: {TEXT_SECONDARY};",
                    "{time_display}"
                }
            }

            div {
                id: "{TIMELINE_HOST_ID}",
                style: "
                    position: relative;
                    height: {bar_height}px;
                    background-color: {BG_SURFACE};
                    border-radius: 4px;
                    cursor: pointer;
                    overflow: visible;
                ",
                onclick: move |e| {
                    if !ready {
                        return;
                    }
                    // element_coordinates is relative to the bar; children ignore pointer events.
                    let x = e.element_coordinates().x;
                    if let Some(width) = bar_width() {
                        on_click.call(ClickTarget::Track { x, width });
                    }
                },

                if ready {
                    TimeRuler { duration }

                    for marker in markers.iter() {
                        MarkerElement {
                            key: "{marker.comment_id}",
                            marker: marker.clone(),
                            on_click: move |comment_id| on_click.call(ClickTarget::Marker(comment_id)),
                        }
                    }

                    if let Some(percent) = playhead_percent {
                        div {
                            style: "
                                position: absolute;
                                left: {percent}%;
                                top: 0;
                                width: 2px;
                                height: 100%;
                                margin-left: -1px;
                                background-color: {PLAYHEAD_COLOR};
                                pointer-events: none;
                            ",
                        }
                    }
                }
            }
        }
    }
}
