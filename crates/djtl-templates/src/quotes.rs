/// Find positions of a delimiter character in `s`, skipping occurrences inside
/// single- or double-quoted regions. A `\` inside a quoted region escapes the
/// next character.
///
/// The callback receives the byte index of each unquoted delimiter found.
/// Return `true` from the callback to stop early.
pub(crate) fn for_each_unquoted(
    s: &str,
    delimiter: impl Fn(char) -> bool,
    mut cb: impl FnMut(usize) -> bool,
) {
    let mut quote: Option<char> = None;
    let mut escape = false;

    for (idx, ch) in s.char_indices() {
        if escape {
            escape = false;
            continue;
        }
        match ch {
            '\\' if quote.is_some() => escape = true,
            '"' | '\'' if quote == Some(ch) => quote = None,
            '"' | '\'' if quote.is_none() => quote = Some(ch),
            _ if quote.is_some() => {}
            _ if delimiter(ch) => {
                if cb(idx) {
                    return;
                }
            }
            _ => {}
        }
    }
}

/// Split tag content on whitespace while keeping quoted regions intact.
///
/// `for x in "a b"` yields `["for", "x", "in", "\"a b\""]`.
#[must_use]
pub fn smart_split(s: &str) -> Vec<String> {
    let mut pieces = Vec::with_capacity((s.len() / 8).clamp(2, 8));
    let mut start = None;

    let mut quote: Option<char> = None;
    let mut escape = false;
    for (idx, ch) in s.char_indices() {
        if escape {
            escape = false;
            continue;
        }
        match ch {
            '\\' if quote.is_some() => escape = true,
            '"' | '\'' if quote == Some(ch) => quote = None,
            '"' | '\'' if quote.is_none() => {
                quote = Some(ch);
                start.get_or_insert(idx);
            }
            _ if quote.is_some() => {}
            c if c.is_whitespace() => {
                if let Some(begin) = start.take() {
                    pieces.push(s[begin..idx].to_owned());
                }
            }
            _ => {
                start.get_or_insert(idx);
            }
        }
    }
    if let Some(begin) = start {
        pieces.push(s[begin..].to_owned());
    }
    pieces
}
