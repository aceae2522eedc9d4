//! Naive positional reinsertion of the source punctuation.
//!
//! Offsets come from the original input and are applied to a translated
//! string of a different length, so placement is approximate. Clients depend
//! on this exact behaviour; only the presence of each mark is guaranteed.
//!
//! The backtick is also the apostrophe placeholder, so a literal backtick in
//! the input is reinserted here and then denormalized into an apostrophe.

const PUNCTUATION: &[char] = &[
    '.', ',', '/', '#', '!', '$', '%', '^', '&', '*', ';', ':', '{', '}', '=', '-', '_', '`',
    '~', '(', ')', '¿', '?', '¡',
];

pub fn is_punctuation(c: char) -> bool {
    PUNCTUATION.contains(&c)
}

/// Insert every punctuation mark of `original` into `translated` at the
/// character offset it had in `original`, clamped to the end of the string.
/// Marks are applied left to right against the growing result.
pub fn reinsert(original: &str, translated: &str) -> String {
    let mut out: Vec<char> = translated.chars().collect();

    for (offset, c) in original.chars().enumerate() {
        if is_punctuation(c) {
            let at = offset.min(out.len());
            out.insert(at, c);
        }
    }

    out.into_iter().collect()
}
