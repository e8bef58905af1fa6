//! Session title inference from the first user message.

/// Characters of the first message kept in an inferred title.
const TITLE_PREFIX_CHARS: usize = 30;

/// Derive a session title: the first 30 characters of the message, with
/// `...` appended when anything was cut.
pub fn infer_title(first_message: &str) -> String {
    let mut chars = first_message.chars();
    let prefix: String = chars.by_ref().take(TITLE_PREFIX_CHARS).collect();
    if chars.next().is_some() {
        format!("{prefix}...")
    } else {
        prefix
    }
}
