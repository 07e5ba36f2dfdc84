//! Comment removal passes built on the string scanner.
//!
//! Neither pass tokenizes the language: a comment marker counts unless the
//! scanner places it inside a string literal.

use crate::language::{CommentPair, LanguageRule};
use crate::scanner::{StringMap, StringScanner};
use crate::whitespace;

/// Run the full pipeline for one language: single-line comments, then
/// multi-line comments, then (unless `preserve_whitespace`) blank-line tidying.
pub fn strip_comments(content: &str, rule: &LanguageRule, preserve_whitespace: bool) -> String {
    let mut text = content.to_owned();

    if !rule.single_line.is_empty() {
        text = strip_single_line(&text, &rule.single_line, &rule.string_delimiters);
    }

    if !rule.multi_line.is_empty() {
        text = strip_multi_line(&text, &rule.multi_line, &rule.string_delimiters);
    }

    if preserve_whitespace {
        text
    } else {
        whitespace::normalize(&text)
    }
}

/// Truncate every line at its first comment marker that is not inside a
/// string, trimming the whitespace left in front of it.
///
/// Each line is scanned on its own: a string left open on one line does not
/// extend into the next. Markers are tried in order and the first one with a
/// real occurrence decides the cut.
pub fn strip_single_line<M, D>(content: &str, markers: &[M], delimiters: &[D]) -> String
where
    M: AsRef<str>,
    D: AsRef<str>,
{
    content
        .split('\n')
        .map(|line| strip_line(line, markers, delimiters))
        .collect::<Vec<_>>()
        .join("\n")
}

fn strip_line<'a, M, D>(line: &'a str, markers: &[M], delimiters: &[D]) -> &'a str
where
    M: AsRef<str>,
    D: AsRef<str>,
{
    let mut strings: Option<StringMap> = None;

    for marker in markers {
        let marker = marker.as_ref();
        if marker.is_empty() {
            continue;
        }

        let mut from = 0;
        while let Some(found) = line[from..].find(marker) {
            let pos = from + found;
            let strings = strings.get_or_insert_with(|| StringMap::new(line, delimiters));
            if !strings.contains(pos) {
                return line[..pos].trim_end();
            }
            // Retry one character further on; occurrences may overlap.
            from = pos + line[pos..].chars().next().map_or(1, char::len_utf8);
        }
    }

    line
}

/// Remove `start ... end` comment spans across the whole text.
///
/// Pairs are handled one after another. Within a pair, openers are visited
/// left to right; an opener inside a string is skipped and left as it is.
/// There is no nesting: the first `end` after an opener closes it. An opener
/// with no `end` after it cuts the text off at the opener.
pub fn strip_multi_line<D: AsRef<str>>(
    content: &str,
    pairs: &[CommentPair],
    delimiters: &[D],
) -> String {
    let mut text = content.to_owned();

    for pair in pairs {
        if pair.start.is_empty() || pair.end.is_empty() {
            continue;
        }

        let mut scanner = StringScanner::new(delimiters);
        let mut cursor = 0;

        while let Some(found) = text[cursor..].find(&pair.start) {
            let start = cursor + found;
            let quoted = scanner.advance_to(&text, start);

            // The scanner only overshoots when the opener overlaps a string
            // delimiter it already consumed; treat that as quoted too.
            if quoted || scanner.position() > start {
                cursor = start + pair.start.len();
                continue;
            }

            let body = start + pair.start.len();
            match text[body..].find(&pair.end) {
                Some(offset) => {
                    let end = body + offset + pair.end.len();
                    text.replace_range(start..end, "");

                    // The splice can join the text on both sides into a new
                    // opener that starts just before the cut.
                    let back = start.saturating_sub(pair.start.len() - 1);
                    cursor = floor_char_boundary(&text, back);
                    if text[cursor..]
                        .find(&pair.start)
                        .is_some_and(|offset| cursor + offset < start)
                    {
                        scanner = StringScanner::new(delimiters);
                    }
                }
                None => {
                    text.truncate(start);
                    break;
                }
            }
        }
    }

    text
}

fn floor_char_boundary(text: &str, mut index: usize) -> usize {
    while !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}
