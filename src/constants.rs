//! Shared constants: colors, sizing, timing and truncation lengths.

pub const BG_ELEVATED: &str = "#141414";
pub const BG_SURFACE: &str = "#1a1a1a";
pub const BG_HOVER: &str = "#262626";

pub const BORDER_SUBTLE: &str = "#1f1f1f";
pub const BORDER_DEFAULT: &str = "#27272a";
pub const BORDER_ACCENT: &str = "#3b82f6";

pub const TEXT_PRIMARY: &str = "#fafafa";
pub const TEXT_SECONDARY: &str = "#a1a1aa";
pub const TEXT_MUTED: &str = "#71717a";
pub const TEXT_DIM: &str = "#52525b";

pub const ACCENT_DANGER: &str = "#ef4444";
pub const PLAYHEAD_COLOR: &str = "#f97316";
pub const MARKER_BORDER_COLOR: &str = "#ffffff";

/// Fallback category presentation when a registry has no "general" entry.
pub const GENERAL_LABEL: &str = "General";
pub const GENERAL_COLOR: &str = "#6c757d";

pub const TIMELINE_BAR_HEIGHT: f64 = 28.0;
pub const TIMELINE_MARKER_SIZE: f64 = 12.0;

/// Reference cadence for sampling the player's current time.
pub const PLAYER_POLL_INTERVAL_MS: u64 = 500;

/// Characters of plain text kept in a marker tooltip.
pub const TOOLTIP_TEXT_CHARS: usize = 80;
/// Characters of plain text shown for a library entry.
pub const LIBRARY_PREVIEW_CHARS: usize = 120;
/// How long an unanswered save-to-library scope prompt stays open.
pub const SAVE_SCOPE_PROMPT_TIMEOUT_SECS: u64 = 10;

pub const PLAYER_HOST_ID_PREFIX: &str = "feedback-player-";
pub const TIMELINE_HOST_ID: &str = "feedback-timeline-container";

pub const EMPTY_COMMENTS_TEXT: &str = "No comments yet.";
pub const EMPTY_PERSONAL_LIBRARY_TEXT: &str = "No personal comments saved.";
pub const EMPTY_SHARED_LIBRARY_TEXT: &str = "No shared comments yet.";

/// Streams the timeline container width back to Rust so clicks can be mapped to a ratio.
pub const TIMELINE_WIDTH_SCRIPT: &str = r#"
const hostId = "feedback-timeline-container";
let lastWidth = null;

function sendWidth() {
    const host = document.getElementById(hostId);
    if (!host) {
        return;
    }
    const width = host.clientWidth || 0;
    if (lastWidth !== null && Math.abs(lastWidth - width) < 0.5) {
        return;
    }
    lastWidth = width;
    dioxus.send(width);
}

function attach() {
    const host = document.getElementById(hostId);
    if (!host) {
        setTimeout(attach, 100);
        return;
    }
    const observer = new ResizeObserver(() => sendWidth());
    observer.observe(host);
    window.addEventListener("resize", sendWidth, { passive: true });
    sendWidth();
}

attach();
await new Promise(() => {});
"#;
