use dioxus::prelude::*;

use crate::constants::*;
use crate::core::library_cache::{CategoryFilter, LibraryEntry, LibraryFilter, LibrarySection};
use crate::state::{CategoryInfo, CommentCategory, LibraryItemId, LibraryScope};

/// Comment library: search box, category pills and the personal/course sections.
///
/// Filtering hides rendered entries without touching the cached listing.
#[component]
pub fn LibraryPanel(
    sections: Vec<LibrarySection>,
    categories: Vec<(CommentCategory, CategoryInfo)>,
    filter: LibraryFilter,
    on_filter: EventHandler<LibraryFilter>,
    on_insert: EventHandler<LibraryItemId>,
    on_delete: EventHandler<LibraryItemId>,
    on_close: EventHandler<()>,
) -> Element {
    let query = filter.query.clone();
    let active = filter.category;

    rsx! {
        div {
            id: "feedback-library-panel",
            style: "
                display: flex; flex-direction: column; gap: 10px;
                padding: 12px;
                background-color: {BG_ELEVATED};
                border: 1px solid {BORDER_DEFAULT};
                border-radius: 6px;
            ",

            div {
                style: "display: flex; align-items: center; justify-content: space-between;",
                span { style: "font-size: 13px; font-weight: 500; color: {TEXT_PRIMARY};", "Comment Library" }
                button {
                    class: "collapse-btn",
                    style: "width: 22px; height: 22px; border: none; border-radius: 3px; background: transparent; color: {TEXT_MUTED}; cursor: pointer;",
                    onclick: move |_| on_close.call(()),
                    "✕"
                }
            }

            input {
                r#type: "text",
                placeholder: "Search comments...",
                value: "{query}",
                style: "
                    width: 100%; box-sizing: border-box;
                    padding: 6px 8px; font-size: 12px;
                    background-color: {BG_SURFACE}; color: {TEXT_PRIMARY};
                    border: 1px solid {BORDER_DEFAULT}; border-radius: 4px;
                    outline: none;
                ",
                oninput: move |e| on_filter.call(LibraryFilter::new(active, e.value())),
            }

            div {
                style: "display: flex; flex-wrap: wrap; gap: 4px;",
                FilterPill {
                    label: "All".to_string(),
                    color: BG_HOVER.to_string(),
                    active: active == CategoryFilter::All,
                    on_click: {
                        let query = query.clone();
                        move |_: MouseEvent| on_filter.call(LibraryFilter::new(CategoryFilter::All, query.clone()))
                    },
                }
                for (category, info) in categories.iter() {
                    {
                        let category = *category;
                        let query = query.clone();
                        rsx! {
                            FilterPill {
                                key: "{category.key()}",
                                label: info.label.clone(),
                                color: info.color.clone(),
                                active: active == CategoryFilter::Only(category),
                                on_click: move |_: MouseEvent| {
                                    on_filter.call(LibraryFilter::new(CategoryFilter::Only(category), query.clone()))
                                },
                            }
                        }
                    }
                }
            }

            for section in sections.iter() {
                div {
                    key: "{section.title()}",
                    style: "display: flex; flex-direction: column; gap: 4px;",
                    span { style: "font-size: 11px; font-weight: 600; color: {TEXT_SECONDARY};", "{section.title()}" }
                    if section.entries.is_empty() {
                        p { style: "font-size: 11px; color: {TEXT_MUTED}; margin: 0;", "{section.empty_text()}" }
                    }
                    for entry in section.entries.iter().filter(|entry| filter.matches(entry)) {
                        LibraryEntryRow {
                            key: "{entry.item_id}",
                            entry: entry.clone(),
                            on_insert,
                            on_delete,
                        }
                    }
                }
            }
        }
    }
}

#[component]
fn FilterPill(label: String, color: String, active: bool, on_click: EventHandler<MouseEvent>) -> Element {
    let outline = if active { TEXT_PRIMARY } else { "transparent" };
    rsx! {
        span {
            role: "button",
            style: "
                padding: 2px 8px; border-radius: 10px; font-size: 10px;
                background-color: {color}; color: #fff;
                border: 1px solid {outline};
                cursor: pointer; user-select: none;
            ",
            onclick: move |e| on_click.call(e),
            "{label}"
        }
    }
}

#[component]
fn LibraryEntryRow(
    entry: LibraryEntry,
    on_insert: EventHandler<LibraryItemId>,
    on_delete: EventHandler<LibraryItemId>,
) -> Element {
    let item_id = entry.item_id;
    rsx! {
        div {
            style: "
                display: flex; align-items: flex-start; gap: 8px;
                padding: 6px 8px;
                background-color: {BG_SURFACE};
                border-radius: 4px;
            ",
            span {
                style: "
                    min-width: 72px; text-align: center;
                    padding: 2px 6px; border-radius: 4px; font-size: 10px;
                    background-color: {entry.category_color}; color: #fff;
                ",
                "{entry.category_label}"
            }
            span {
                role: "button",
                title: "Insert into comment",
                style: "flex: 1; min-width: 0; font-size: 12px; color: {TEXT_PRIMARY}; cursor: pointer;",
                onclick: move |_| on_insert.call(item_id),
                "{entry.preview}"
            }
            if entry.can_delete {
                button {
                    style: "
                        padding: 1px 6px; font-size: 10px;
                        background: transparent; color: {ACCENT_DANGER};
                        border: 1px solid {ACCENT_DANGER}; border-radius: 4px;
                        cursor: pointer;
                    ",
                    title: "Delete library comment",
                    onclick: move |_| on_delete.call(item_id),
                    "Delete"
                }
            }
        }
    }
}

/// Scope choice shown after "Save to library"; offers the course only when there is one.
#[component]
pub fn ScopePrompt(
    choices: Vec<LibraryScope>,
    on_choose: EventHandler<LibraryScope>,
    on_dismiss: EventHandler<()>,
) -> Element {
    rsx! {
        div {
            style: "
                display: flex; align-items: center; gap: 8px;
                padding: 8px 10px;
                background-color: {BG_ELEVATED};
                border: 1px solid {BORDER_ACCENT};
                border-radius: 6px;
                font-size: 12px; color: {TEXT_SECONDARY};
            ",
            span { "Save this comment to:" }
            for scope in choices.iter().copied() {
                {
                    let label = match scope {
                        LibraryScope::Personal => "My Library",
                        LibraryScope::Course(_) => "Course Library",
                    };
                    rsx! {
                        button {
                            key: "{scope.course_id()}",
                            style: "
                                padding: 4px 10px; font-size: 11px;
                                background-color: {BORDER_ACCENT}; color: #fff;
                                border: none; border-radius: 4px; cursor: pointer;
                            ",
                            onclick: move |_| on_choose.call(scope),
                            "{label}"
                        }
                    }
                }
            }
            button {
                style: "padding: 4px 8px; font-size: 11px; background: transparent; color: {TEXT_MUTED}; border: none; cursor: pointer;",
                onclick: move |_| on_dismiss.call(()),
                "Cancel"
            }
        }
    }
}
