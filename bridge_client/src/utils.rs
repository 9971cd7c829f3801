use std::error::Error;

/// Longest diagnostic text copied back to the extension.
pub const MAX_DETAIL_CHARS: usize = 500;

/// First `max_chars` characters of `text`, never splitting a code point.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((index, _)) => &text[..index],
        None => text,
    }
}

/// Renders an error followed by its whole source chain, `outer: inner: root`.
pub fn describe_error(err: &(dyn Error + 'static)) -> String {
    let mut description = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let cause_text = cause.to_string();
        // reqwest repeats the inner message in its own display now and then
        if !description.ends_with(&cause_text) {
            description.push_str(": ");
            description.push_str(&cause_text);
        }
        source = cause.source();
    }
    description
}
