use once_cell::sync::Lazy;
use regex::Regex;

static MARKUP_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("static tag pattern"));

static VIDEO_ID: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)(?:youtube\.com/(?:[^/]+/.+/|(?:v|e(?:mbed)?)/|.*[?&]v=)|youtu\.be/)([^"&?/ ]{11})"#)
        .expect("static video id pattern")
});

/// Formats whole seconds as `MM:SS`, or `HH:MM:SS` once the hour is non-zero.
pub fn format_time(total_seconds: u64) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    if hours > 0 {
        format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{:02}:{:02}", minutes, seconds)
    }
}

/// Parses a display string produced by [`format_time`] back into seconds.
///
/// Accepts `SS`, `MM:SS` and `HH:MM:SS`. Minutes and seconds after the
/// leading field must be below 60.
pub fn parse_time(display: &str) -> Option<u64> {
    let parts: Vec<&str> = display.trim().split(':').collect();
    let mut fields = Vec::with_capacity(parts.len());
    for part in parts.iter() {
        if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        fields.push(part.parse::<u64>().ok()?);
    }
    match fields.as_slice() {
        [seconds] => Some(*seconds),
        [minutes, seconds] if *seconds < 60 => Some(minutes * 60 + seconds),
        [hours, minutes, seconds] if *minutes < 60 && *seconds < 60 => {
            Some(hours * 3600 + minutes * 60 + seconds)
        }
        _ => None,
    }
}

/// Removes markup tags and non-breaking space entities, leaving trimmed text.
pub fn strip_markup(html: &str) -> String {
    MARKUP_TAG
        .replace_all(html, "")
        .replace("&nbsp;", " ")
        .trim()
        .to_string()
}

/// True when rich text carries no visible characters (e.g. `<p><br></p>`).
pub fn is_blank_markup(html: &str) -> bool {
    strip_markup(html).is_empty()
}

/// Keeps at most `max_chars` characters.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

/// Pulls the 11-character video id out of the common YouTube URL shapes.
pub fn extract_video_id(url: &str) -> Option<String> {
    VIDEO_ID
        .captures(url.trim())
        .and_then(|captures| captures.get(1))
        .map(|id| id.as_str().to_string())
}
