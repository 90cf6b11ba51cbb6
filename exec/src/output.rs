/// Byte budget for child stderr carried inside an error.
pub(crate) const STDERR_TAIL_BYTES: usize = 8 * 1024;

/// Last `max_bytes` of `text`, cut at a char boundary and trimmed.
///
/// Tools print the actionable part of a failure last, so the head is what
/// gets dropped.
pub(crate) fn stderr_tail(text: &str, max_bytes: usize) -> &str {
    let text = text.trim_end();
    if text.len() <= max_bytes {
        return text;
    }
    let mut start = text.len() - max_bytes;
    while !text.is_char_boundary(start) {
        start += 1;
    }
    text[start..].trim_start()
}
