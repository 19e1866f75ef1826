//! Deterministic, language-independent cleanup of raw backend output.

/// Clean a raw translation before it is stored.
///
/// Backends sometimes prefix the answer with a restated instruction or a
/// label ("Dutch: ..."), so everything up to and including the first colon is
/// discarded. Stray wrapping quotes and irregular whitespace are normalized.
/// Idempotent once no colon or quote remains.
pub fn clean(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let text = match text.split_once(':') {
        Some((_, rest)) => rest.trim(),
        None => text,
    };

    let text = text
        .trim()
        .trim_matches('"')
        .trim_matches('\'')
        .trim();

    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
