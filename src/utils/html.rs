// src/utils/html.rs

/// Sanitizes free-form HTML with ammonia's whitelist: safe tags survive,
/// scripts, iframes and event-handler attributes are stripped.
///
/// Description fields are stored sanitized so downstream renderers can
/// embed them without re-escaping.
pub fn clean_html(input: &str) -> String {
    ammonia::clean(input)
}
