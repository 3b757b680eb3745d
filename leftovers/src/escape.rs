//! Character escaping for text content and attribute values.

use std::borrow::Cow;

/// Escape text so it can be embedded in HTML markup or a double-quoted attribute.
///
/// Replaces `&`, `<`, `>`, `"` and `'`. Input is scanned once, so an
/// ampersand is never escaped twice.
pub fn escape_html(text: &str) -> Cow<'_, str> {
    let Some(first) = text.find(['&', '<', '>', '"', '\'']) else {
        return Cow::Borrowed(text);
    };

    let mut out = String::with_capacity(text.len() + 8);
    out.push_str(&text[..first]);
    for c in text[first..].chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    Cow::Owned(out)
}
