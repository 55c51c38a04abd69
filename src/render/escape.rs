//! HTML Escaping
//!
//! Chat usernames and message bodies are attacker-controlled and must
//! pass through here before rendering.

/// Escape user-supplied text for HTML-ish feed output.
///
/// Escapes the original five characters: `& < > " '`.
pub fn escape_html(unsafe_text: &str) -> String {
    html_escape::encode_safe(unsafe_text).into_owned()
}

/// [`escape_html`] for an optional field; missing input yields `""`.
pub fn escape_html_opt(unsafe_text: Option<&str>) -> String {
    unsafe_text.map(escape_html).unwrap_or_default()
}
