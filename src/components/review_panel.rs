use std::time::Instant;

use dioxus::prelude::*;

use crate::constants::*;
use crate::core::comment_store::CommentCard;
use crate::core::library_cache::{LibraryFilter, LibrarySection};
use crate::core::{ReviewSession, SessionHandle};
use crate::error::ActionKind;
use crate::state::{CategoryInfo, CommentCategory, CommentId, LibraryItemId, LibraryScope};
use crate::timeline::{ClickTarget, Marker, TimelinePanel};
use crate::utils::{format_time, parse_time};

use super::comment_list::CommentList;
use super::library_panel::{LibraryPanel, ScopePrompt};

/// What the view needs from the session for one render.
#[derive(Debug, Clone, PartialEq)]
struct ReviewSnapshot {
    markers: Vec<Marker>,
    duration: f64,
    playhead_percent: Option<f64>,
    time_display: String,
    cards: Vec<CommentCard>,
    read_only: bool,
    categories: Vec<(CommentCategory, CategoryInfo)>,
    body: String,
    category: CommentCategory,
    timestamp: u64,
    adding: bool,
    library_open: bool,
    sections: Vec<LibrarySection>,
    filter: LibraryFilter,
    scope_choices: Option<Vec<LibraryScope>>,
}

impl ReviewSnapshot {
    fn capture(session: &ReviewSession) -> Self {
        let timeline = session.timeline();
        let compose = session.compose();
        let library = session.library();
        Self {
            markers: timeline.markers().to_vec(),
            duration: timeline.duration(),
            playhead_percent: timeline.playhead_percent(),
            time_display: session.time_display().to_string(),
            cards: session.comment_cards(),
            read_only: session.is_read_only(),
            categories: session.registry().entries().to_vec(),
            body: compose.body.clone(),
            category: compose.category,
            timestamp: compose.timestamp,
            adding: session.is_in_flight(ActionKind::AddComment),
            library_open: library.is_open(),
            sections: library.sections().to_vec(),
            filter: library.filter().clone(),
            scope_choices: library
                .pending_save(Instant::now())
                .map(|_| library.scope_choices()),
        }
    }
}

fn bump(mut revision: Signal<u64>) {
    let next = revision() + 1;
    revision.set(next);
}

/// Grading view for one submission: timeline, compose form, library and comment list.
#[component]
pub fn ReviewPanel(session: SessionHandle) -> Element {
    let revision = use_signal(|| 0u64);

    let polling = session.clone();
    use_hook(move || polling.start_polling());

    let dropped = session.clone();
    use_drop(move || dropped.teardown());

    // Re-read the session on the polling cadence so playhead and prompt timeout show.
    let refresh = session.clone();
    use_future(move || {
        let session = refresh.clone();
        async move {
            let interval = session.lock().config().settings().poll_interval;
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                session.lock().expire_scope_prompt();
                bump(revision);
            }
        }
    });

    let _ = revision();
    let snapshot = ReviewSnapshot::capture(&session.lock());

    let on_timeline_click = {
        let session = session.clone();
        move |target: ClickTarget| {
            session.lock().click_timeline(target);
            bump(revision);
        }
    };

    let on_seek_comment = {
        let session = session.clone();
        move |comment_id: CommentId| {
            session.lock().seek_to_comment(comment_id);
        }
    };

    let on_delete_comment = {
        let session = session.clone();
        move |comment_id: CommentId| {
            let session = session.clone();
            spawn(async move {
                if let Err(err) = session.delete_comment(comment_id).await {
                    tracing::debug!(error = %err, "delete comment not applied");
                }
                bump(revision);
            });
        }
    };

    let on_body_input = {
        let session = session.clone();
        move |e: FormEvent| {
            session.lock().compose_mut().body = e.value();
            bump(revision);
        }
    };

    let on_category_change = {
        let session = session.clone();
        move |e: FormEvent| {
            session.lock().compose_mut().category = CommentCategory::from_key(&e.value());
            bump(revision);
        }
    };

    let on_timestamp_change = {
        let session = session.clone();
        move |e: FormEvent| {
            if let Some(seconds) = parse_time(&e.value()) {
                session.lock().compose_mut().timestamp = seconds;
            }
            bump(revision);
        }
    };

    let on_submit = {
        let session = session.clone();
        move |_: MouseEvent| {
            let session = session.clone();
            spawn(async move {
                if let Err(err) = session.add_comment().await {
                    tracing::debug!(error = %err, "add comment not applied");
                }
                bump(revision);
            });
        }
    };

    let on_toggle_library = {
        let session = session.clone();
        move |_: MouseEvent| {
            let session = session.clone();
            spawn(async move {
                if let Err(err) = session.toggle_library().await {
                    tracing::debug!(error = %err, "library panel not opened");
                }
                bump(revision);
            });
        }
    };

    let on_request_save = {
        let session = session.clone();
        move |_: MouseEvent| {
            let _ = session.lock().request_library_save();
            bump(revision);
        }
    };

    let on_choose_scope = {
        let session = session.clone();
        move |scope: LibraryScope| {
            let session = session.clone();
            spawn(async move {
                if let Err(err) = session.save_to_library(scope).await {
                    tracing::debug!(error = %err, "library save not applied");
                }
                bump(revision);
            });
        }
    };

    let on_dismiss_scope = {
        let session = session.clone();
        move |_: ()| {
            session.lock().dismiss_scope_prompt();
            bump(revision);
        }
    };

    let on_filter = {
        let session = session.clone();
        move |filter: LibraryFilter| {
            session.lock().set_library_filter(filter);
            bump(revision);
        }
    };

    let on_insert = {
        let session = session.clone();
        move |item_id: LibraryItemId| {
            session.lock().insert_library_item(item_id);
            bump(revision);
        }
    };

    let on_delete_item = {
        let session = session.clone();
        move |item_id: LibraryItemId| {
            let session = session.clone();
            spawn(async move {
                if let Err(err) = session.delete_library_item(item_id).await {
                    tracing::debug!(error = %err, "library delete not applied");
                }
                bump(revision);
            });
        }
    };

    let on_close_library = {
        let session = session.clone();
        move |_: ()| {
            session.lock().close_library();
            bump(revision);
        }
    };

    let category_key = snapshot.category.key();
    let timestamp_text = format_time(snapshot.timestamp);
    let submit_label = if snapshot.adding { "Adding..." } else { "Add comment" };

    rsx! {
        div {
            style: "
                display: flex; flex-direction: column; gap: 12px;
                padding: 12px;
                background-color: {BG_SURFACE};
                color: {TEXT_PRIMARY};
                font-family: system-ui, sans-serif;
            ",

            TimelinePanel {
                markers: snapshot.markers.clone(),
                duration: snapshot.duration,
                playhead_percent: snapshot.playhead_percent,
                time_display: snapshot.time_display.clone(),
                on_click: on_timeline_click,
            }

            if !snapshot.read_only {
                div {
                    style: "
                        display: flex; flex-direction: column; gap: 8px;
                        padding: 10px;
                        background-color: {BG_ELEVATED};
                        border: 1px solid {BORDER_SUBTLE};
                        border-radius: 6px;
                    ",
                    textarea {
                        rows: "3",
                        placeholder: "Write feedback...",
                        value: "{snapshot.body}",
                        style: "
                            width: 100%; box-sizing: border-box; resize: vertical;
                            padding: 6px 8px; font-size: 12px;
                            background-color: {BG_SURFACE}; color: {TEXT_PRIMARY};
                            border: 1px solid {BORDER_DEFAULT}; border-radius: 4px;
                            outline: none; user-select: text;
                        ",
                        oninput: on_body_input,
                    }
                    div {
                        style: "display: flex; align-items: center; gap: 8px; flex-wrap: wrap;",
                        select {
                            value: "{category_key}",
                            style: "padding: 4px 6px; font-size: 12px; background-color: {BG_SURFACE}; color: {TEXT_PRIMARY}; border: 1px solid {BORDER_DEFAULT}; border-radius: 4px;",
                            onchange: on_category_change,
                            for (category, info) in snapshot.categories.iter() {
                                option {
                                    key: "{category.key()}",
                                    value: "{category.key()}",
                                    selected: *category == snapshot.category,
                                    "{info.label}"
                                }
                            }
                        }
                        input {
                            r#type: "text",
                            title: "Timestamp (used when the player is not ready)",
                            value: "{timestamp_text}",
                            style: "width: 72px; padding: 4px 6px; font-size: 12px; font-family: 'SF Mono', Consolas, monospace; background-color: {BG_SURFACE}; color: {TEXT_PRIMARY}; border: 1px solid {BORDER_DEFAULT}; border-radius: 4px;",
                            onchange: on_timestamp_change,
                        }
                        button {
                            disabled: snapshot.adding,
                            style: "padding: 4px 12px; font-size: 12px; background-color: {BORDER_ACCENT}; color: #fff; border: none; border-radius: 4px; cursor: pointer;",
                            onclick: on_submit,
                            "{submit_label}"
                        }
                        button {
                            style: "padding: 4px 10px; font-size: 12px; background: transparent; color: {TEXT_SECONDARY}; border: 1px solid {BORDER_DEFAULT}; border-radius: 4px; cursor: pointer;",
                            onclick: on_toggle_library,
                            "Comment library"
                        }
                        button {
                            style: "padding: 4px 10px; font-size: 12px; background: transparent; color: {TEXT_SECONDARY}; border: 1px solid {BORDER_DEFAULT}; border-radius: 4px; cursor: pointer;",
                            onclick: on_request_save,
                            "Save to library"
                        }
                    }
                    if let Some(choices) = snapshot.scope_choices.clone() {
                        ScopePrompt {
                            choices,
                            on_choose: on_choose_scope,
                            on_dismiss: on_dismiss_scope,
                        }
                    }
                    if snapshot.library_open {
                        LibraryPanel {
                            sections: snapshot.sections.clone(),
                            categories: snapshot.categories.clone(),
                            filter: snapshot.filter.clone(),
                            on_filter,
                            on_insert,
                            on_delete: on_delete_item,
                            on_close: on_close_library,
                        }
                    }
                }
            }

            CommentList {
                cards: snapshot.cards.clone(),
                on_seek: on_seek_comment,
                on_delete: on_delete_comment,
            }
        }
    }
}
