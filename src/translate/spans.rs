//! Tagged spans over the token sequence.
//!
//! The translator records each consumed range of tokens as a `Span` carrying
//! its replacement text; rendering walks the tokens once and lets the first
//! span starting at a position win over any span overlapping it.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    /// First token index covered
    pub start: usize,
    /// One past the last token index covered
    pub end: usize,
    pub replacement: String,
}

impl Span {
    pub fn new(start: usize, end: usize, replacement: impl Into<String>) -> Self {
        Self {
            start,
            end,
            replacement: replacement.into(),
        }
    }
}

/// Join the rendered pieces with single spaces. Tokens not covered by any
/// span are emitted verbatim; spans that are empty, out of range, or start
/// inside an earlier span are ignored.
pub fn render(tokens: &[String], spans: &[Span]) -> String {
    let mut ordered: Vec<&Span> = spans
        .iter()
        .filter(|s| s.start < s.end && s.end <= tokens.len())
        .collect();
    ordered.sort_by_key(|s| s.start);

    let mut pending = ordered.into_iter().peekable();
    let mut pieces: Vec<&str> = Vec::with_capacity(tokens.len());
    let mut pos = 0;

    while pos < tokens.len() {
        while pending.peek().is_some_and(|s| s.start < pos) {
            pending.next();
        }
        match pending.peek() {
            Some(&span) if span.start == pos => {
                pieces.push(&span.replacement);
                pos = span.end;
                pending.next();
            }
            _ => {
                pieces.push(&tokens[pos]);
                pos += 1;
            }
        }
    }

    pieces.join(" ")
}
