use dioxus::prelude::*;

use crate::constants::*;
use crate::core::comment_store::CommentCard;
use crate::state::CommentId;

#[component]
pub fn CommentList(
    cards: Vec<CommentCard>,
    on_seek: EventHandler<CommentId>,
    on_delete: EventHandler<CommentId>,
) -> Element {
    rsx! {
        div {
            id: "feedback-comments-list",
            style: "display: flex; flex-direction: column; gap: 8px;",
            if cards.is_empty() {
                p { style: "font-size: 12px; color: {TEXT_MUTED}; margin: 0;", "{EMPTY_COMMENTS_TEXT}" }
            }
            for card in cards.iter() {
                CommentCardItem {
                    key: "{card.comment_id}",
                    card: card.clone(),
                    on_seek,
                    on_delete,
                }
            }
        }
    }
}

/// Single comment: timestamp link, category badge, author line and body.
#[component]
pub fn CommentCardItem(
    card: CommentCard,
    on_seek: EventHandler<CommentId>,
    on_delete: EventHandler<CommentId>,
) -> Element {
    let comment_id = card.comment_id;
    let dom_id = card.dom_id();

    rsx! {
        div {
            id: "{dom_id}",
            style: "
                display: flex; align-items: flex-start; gap: 10px;
                padding: 10px 12px;
                background-color: {BG_SURFACE};
                border: 1px solid {BORDER_DEFAULT};
                border-radius: 6px;
            ",
            div {
                style: "flex: 1; min-width: 0; display: flex; flex-direction: column; gap: 4px;",
                div {
                    style: "display: flex; align-items: center; gap: 6px; flex-wrap: wrap;",
                    span {
                        class: "feedback-timestamp-link",
                        style: "
                            padding: 2px 6px; border-radius: 4px;
                            font-size: 11px; font-family: 'SF Mono', Consolas, monospace;
                            background-color: {card.category_color}; color: #fff;
                            cursor: pointer;
                        ",
                        onclick: move |_| on_seek.call(comment_id),
                        "{card.time_display}"
                    }
                    span {
                        class: "feedback-badge-{card.category_key}",
                        style: "
                            padding: 2px 6px; border-radius: 4px; font-size: 10px;
                            background-color: {card.category_color}; color: #fff;
                        ",
                        "{card.category_label}"
                    }
                    span { style: "font-size: 11px; color: {TEXT_SECONDARY};", "{card.author}" }
                    if !card.created.is_empty() {
                        span { style: "font-size: 10px; color: {TEXT_DIM};", "{card.created}" }
                    }
                }
                div {
                    style: "font-size: 12px; color: {TEXT_PRIMARY}; overflow-wrap: anywhere;",
                    dangerous_inner_html: "{card.body_html}",
                }
            }
            if card.can_delete {
                button {
                    style: "
                        padding: 2px 8px; font-size: 11px;
                        background: transparent; color: {ACCENT_DANGER};
                        border: 1px solid {ACCENT_DANGER}; border-radius: 4px;
                        cursor: pointer; flex-shrink: 0;
                    ",
                    title: "Delete comment",
                    onclick: move |_| on_delete.call(comment_id),
                    "Delete"
                }
            }
        }
    }
}
