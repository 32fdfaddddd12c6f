//! Line-level helpers: indentation, key/value splitting, quotes, folding.

/// Returns the width of the leading space run.
///
/// `None` means the line is blank or its indentation contains a tab; the
/// dialect only measures space indentation.
pub(super) fn indentation(line: &str) -> Option<usize> {
    let trimmed = line.trim_start();
    if trimmed.is_empty() {
        return None;
    }
    let lead = &line[..line.len() - trimmed.len()];
    if lead.contains('\t') {
        return None;
    }
    Some(lead.chars().count())
}

/// Removes one matching pair of surrounding single or double quotes.
pub(super) fn strip_quotes(value: &str) -> &str {
    let bytes = value.as_bytes();
    if bytes.len() >= 2 {
        let first = bytes[0];
        let last = bytes[bytes.len() - 1];
        if first == last && (first == b'"' || first == b'\'') {
            return &value[1..value.len() - 1];
        }
    }
    value
}

/// Splits `key: value` at the first colon.
///
/// The key is trimmed; the value is trimmed and quote-stripped.
pub(super) fn key_value(trimmed: &str) -> Option<(&str, &str)> {
    let (key, value) = trimmed.split_once(':')?;
    Some((key.trim(), strip_quotes(value.trim())))
}

/// Returns the content after a `- ` list marker, trimmed.
///
/// A bare `-` is an empty item.
pub(super) fn list_item(trimmed: &str) -> Option<&str> {
    if trimmed == "-" {
        return Some("");
    }
    trimmed.strip_prefix("- ").map(str::trim)
}

/// Returns the quote-stripped name of a `name: ...` list item.
pub(super) fn named_item(item: &str) -> Option<&str> {
    item.strip_prefix("name:")
        .map(|name| strip_quotes(name.trim()))
}

/// Joins continuation lines onto a scalar that started at `start`.
///
/// Every following line indented deeper than `base_indent` that contains no
/// colon is trimmed, quote-stripped and appended with a single space.
/// Deeper comment lines are consumed without contributing text. A blank
/// line, a colon or a shallower line ends the run.
///
/// Returns the folded text and the index of the first line not consumed.
pub(super) fn fold_continuation(
    lines: &[&str],
    start: usize,
    base_indent: usize,
    head: &str,
) -> (String, usize) {
    let mut folded = head.to_string();
    let mut next = start + 1;

    while let Some(line) = lines.get(next) {
        match indentation(line) {
            Some(indent) if indent > base_indent => {}
            _ => break,
        }
        let fragment = line.trim();
        if fragment.starts_with('#') {
            next += 1;
            continue;
        }
        if fragment.contains(':') {
            break;
        }
        if !folded.is_empty() {
            folded.push(' ');
        }
        folded.push_str(strip_quotes(fragment));
        next += 1;
    }

    (folded, next)
}
