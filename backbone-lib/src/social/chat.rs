//! Chat line wrapping. Word-boundary wrap at
//! a pixel width supplied by the rendering collaborator's measurement
//! interface — this module has no idea what a pixel actually looks like, it
//! only calls back into whatever measures text width.

/// Measures rendered text width. Implemented by the rendering collaborator;
/// this crate only depends on the trait.
pub trait TextMeasure {
    fn width(&self, text: &str) -> f32;
}

/// Wraps `text` to `max_width`, prefixing the first segment of a non-system
/// line with `[timestamp] name: ` and leaving subsequent segments bare.
pub fn wrap_chat_line(
    measure: &dyn TextMeasure,
    name: &str,
    timestamp_label: &str,
    text: &str,
    system: bool,
    max_width: f32,
) -> Vec<String> {
    let prefix = if system {
        String::new()
    } else {
        format!("[{timestamp_label}] {name}: ")
    };

    let mut segments: Vec<String> = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let bare_candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{current} {word}")
        };
        let full_candidate = if segments.is_empty() {
            format!("{prefix}{bare_candidate}")
        } else {
            bare_candidate.clone()
        };
        if current.is_empty() || measure.width(&full_candidate) <= max_width {
            current = bare_candidate;
        } else {
            segments.push(finish_segment(&prefix, segments.is_empty(), &current));
            current = word.to_string();
        }
    }
    if !current.is_empty() || segments.is_empty() {
        segments.push(finish_segment(&prefix, segments.is_empty(), &current));
    }
    segments
}

fn finish_segment(prefix: &str, is_first: bool, body: &str) -> String {
    if is_first {
        format!("{prefix}{body}")
    } else {
        body.to_string()
    }
}
