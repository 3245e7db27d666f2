use dioxus::prelude::*;
use crate::constants::{BORDER_DEFAULT, TEXT_DIM};
use crate::utils::format_time;

/// Roughly how many labelled ticks the bar should carry.
const TARGET_TICKS: f64 = 8.0;

/// Picks a readable tick spacing, in seconds, for a video of `duration` seconds.
pub(crate) fn tick_spacing(duration: f64) -> u64 {
    let nice_ticks = [1, 2, 5, 10, 15, 30, 60, 120, 300, 600, 900, 1800, 3600];
    let target = duration / TARGET_TICKS;
    nice_ticks
        .into_iter()
        .find(|tick| *tick as f64 >= target)
        .unwrap_or(3600)
}

/// Tick marks and time labels laid out in percent of the bar width.
/// All elements use pointer-events: none so clicks pass through to the bar.
#[component]
pub(crate) fn TimeRuler(duration: f64) -> Element {
    if !(duration > 0.0) {
        return rsx! {};
    }
    let spacing = tick_spacing(duration);
    let last = duration.floor() as u64;

    rsx! {
        div {
            style: "position: absolute; left: 0; top: 0; width: 100%; height: 100%; pointer-events: none;",
            for t in (0..=last).step_by(spacing as usize) {
                {
                    let percent = t as f64 / duration * 100.0;
                    let label = format_time(t);
                    // Right-align labels near the end so they stay inside the bar.
                    let shift = if percent > 90.0 { "translateX(-100%)" } else { "none" };
                    rsx! {
                        div {
                            key: "tick-{t}",
                            div {
                                style: "
                                    position: absolute;
                                    left: {percent}%;
                                    bottom: 0;
                                    width: 1px;
                                    height: 6px;
                                    background-color: {BORDER_DEFAULT};
                                    pointer-events: none;
                                ",
                            }
                            div {
                                style: "
                                    position: absolute;
                                    left: {percent}%;
                                    top: 1px;
                                    padding: 0 3px;
                                    font-size: 9px;
                                    color: {TEXT_DIM};
                                    font-family: 'SF Mono', Consolas, monospace;
                                    user-select: none;
                                    pointer-events: none;
                                    transform: {shift};
                                ",
                                "{label}"
                            }
                        }
                    }
                }
            }
        }
    }
}
