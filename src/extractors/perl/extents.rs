/// Block-extent resolution by brace counting
///
/// Only Outline parses call into this module. Lines are expected to come from
/// the shallow preprocessor, so braces inside strings are already gone.
use super::helpers::PACKAGE_START_RE;
use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;

/// `$opts = {}` in a signature is a default value, not a block
static DEFAULT_ARG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\$@%]\w+\s*=\s*\{\s*\}").unwrap());

/// Last line of the block opened at `start`
///
/// - a `;`-terminated first line with no `{` is a forward declaration: `start`
/// - no `{` on the first or second line: `start`
/// - unterminated block: the last line
pub(crate) fn sub_end_line(lines: &[String], start: usize, filter: Option<&Regex>) -> usize {
    let last = lines.len().saturating_sub(1);
    let mut depth = 0usize;
    let mut opened = false;

    for (offset, line) in lines.iter().enumerate().skip(start) {
        let mut text = Cow::Borrowed(line.as_str());
        if offset == start {
            if let Some(filter) = filter {
                text = Cow::Owned(filter.replace_all(&text, "").into_owned());
            }
            text = Cow::Owned(DEFAULT_ARG_RE.replace_all(&text, "").into_owned());
            if text.trim_end().ends_with(';') && !text.contains('{') {
                return start;
            }
        }

        for c in text.chars() {
            match c {
                '{' => {
                    depth += 1;
                    opened = true;
                }
                '}' if opened => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return offset;
                    }
                }
                _ => {}
            }
        }

        if !opened && offset > start {
            return start;
        }
    }

    if opened {
        last
    } else {
        start
    }
}

/// Last line of the package/class/role declared at `start`
pub(crate) fn package_end_line(lines: &[String], start: usize) -> usize {
    let Some(line) = lines.get(start) else {
        return start;
    };
    let last = lines.len().saturating_sub(1);

    // `{ package Foo; ... }`
    if line.starts_with('{') {
        return sub_end_line(lines, start, None);
    }

    let brace = line.find('{');
    let semicolon = line.find(';');
    let statement_form = match (semicolon, brace) {
        (Some(s), Some(b)) => s < b,
        (Some(_), None) => true,
        (None, _) => false,
    };
    if !statement_form {
        return sub_end_line(lines, start, None);
    }

    if start > 0 && lines[start - 1].trim_end().ends_with('{') {
        return sub_end_line(lines, start - 1, None);
    }

    lines
        .iter()
        .enumerate()
        .skip(start + 1)
        .find(|(_, text)| PACKAGE_START_RE.is_match(text))
        .map(|(index, _)| index - 1)
        .unwrap_or(last)
}
