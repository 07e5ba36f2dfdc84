//! String-literal boundary tracking.
//!
//! The only question answered here is whether a byte offset lies inside a
//! string literal. Nothing else about the language is tokenized.

use std::ops::Range;

/// Forward-only scanner over a text, tracking whether the current position is
/// inside a string literal.
///
/// A backslash escapes the following character both inside and outside
/// strings. Delimiters are tried in listed order and consumed whole once
/// matched, so a string opened with `"""` only closes on `"""`.
///
/// The scanner does not hold the text. Each call to [`advance_to`] must be
/// given a text whose prefix up to [`position`] is the one already scanned;
/// the part beyond it may have changed between calls.
///
/// [`advance_to`]: StringScanner::advance_to
/// [`position`]: StringScanner::position
#[derive(Debug, Clone)]
pub struct StringScanner<'d, D> {
    delimiters: &'d [D],
    pos: usize,
    escaped: bool,
    open: Option<usize>,
}

impl<'d, D: AsRef<str>> StringScanner<'d, D> {
    pub fn new(delimiters: &'d [D]) -> Self {
        Self {
            delimiters,
            pos: 0,
            escaped: false,
            open: None,
        }
    }

    /// Byte offset of the next unscanned character.
    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn in_string(&self) -> bool {
        self.open.is_some()
    }

    /// Consume everything before `target` and report whether a string is open
    /// at that point. Targets behind the current position are a no-op.
    pub fn advance_to(&mut self, content: &str, target: usize) -> bool {
        let target = target.min(content.len());
        while self.pos < target {
            self.step(content);
        }
        self.in_string()
    }

    /// Consume one token (a character, an escape, or a whole delimiter).
    fn step(&mut self, content: &str) {
        let rest = &content[self.pos..];
        let Some(ch) = rest.chars().next() else {
            return;
        };

        if self.escaped {
            self.escaped = false;
            self.pos += ch.len_utf8();
            return;
        }

        if ch == '\\' {
            self.escaped = true;
            self.pos += 1;
            return;
        }

        match self.open {
            None => {
                if let Some(idx) = self
                    .delimiters
                    .iter()
                    .position(|d| rest.starts_with(d.as_ref()))
                {
                    self.open = Some(idx);
                    self.pos += self.delimiters[idx].as_ref().len();
                    return;
                }
            }
            Some(idx) => {
                let active = self.delimiters[idx].as_ref();
                if rest.starts_with(active) {
                    self.open = None;
                    self.pos += active.len();
                    return;
                }
            }
        }

        self.pos += ch.len_utf8();
    }
}

/// Whether `position` falls inside an open string literal of `content`.
///
/// Scans from the start of `content` on every call. Use [`StringScanner`] or
/// [`StringMap`] when querying many positions of the same text.
pub fn is_inside_string<D: AsRef<str>>(content: &str, position: usize, delimiters: &[D]) -> bool {
    StringScanner::new(delimiters).advance_to(content, position)
}

/// String-literal ranges of a text, computed in one forward pass.
///
/// Each range runs from the first byte of the opening delimiter to the first
/// byte of the closing delimiter (or the end of the text when the literal is
/// never closed). A position `p` is inside a literal when
/// `range.start < p <= range.end`, which matches [`is_inside_string`].
#[derive(Debug, Clone)]
pub struct StringMap {
    literals: Vec<Range<usize>>,
}

impl StringMap {
    pub fn new<D: AsRef<str>>(content: &str, delimiters: &[D]) -> Self {
        let mut scanner = StringScanner::new(delimiters);
        let mut literals = Vec::new();
        let mut opened_at = None;

        while scanner.position() < content.len() {
            let before = scanner.position();
            let was_open = scanner.in_string();
            scanner.step(content);

            match (was_open, scanner.in_string()) {
                (false, true) => opened_at = Some(before),
                (true, false) => {
                    if let Some(start) = opened_at.take() {
                        literals.push(start..before);
                    }
                }
                _ => {}
            }
        }

        if let Some(start) = opened_at {
            literals.push(start..content.len());
        }

        Self { literals }
    }

    pub fn contains(&self, position: usize) -> bool {
        let idx = self.literals.partition_point(|r| r.start < position);
        idx > 0 && position <= self.literals[idx - 1].end
    }
}
