//! Word-boundary helpers for word-wise deletion.
//!
//! These work on the visible characters walked outward from the caret, so
//! struck content never counts toward a word.

/// Characters that make up a word.
pub fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// How many characters before the caret a word-wise backspace removes.
///
/// `chars` runs from the caret backward. Whitespace and punctuation right
/// before the caret go first, then the word before them.
pub fn word_extent_backward(chars: impl IntoIterator<Item = char>) -> usize {
    let mut chars = chars.into_iter().peekable();
    let mut count = 0;

    // Skip any whitespace/punctuation immediately before cursor.
    while chars.next_if(|c| !is_word_char(*c)).is_some() {
        count += 1;
    }

    // Skip the word characters.
    while chars.next_if(|c| is_word_char(*c)).is_some() {
        count += 1;
    }

    count
}

/// How many characters after the caret a word-wise delete removes.
///
/// `chars` runs from the caret forward. The rest of the current word goes
/// first, then the whitespace and punctuation after it.
pub fn word_extent_forward(chars: impl IntoIterator<Item = char>) -> usize {
    let mut chars = chars.into_iter().peekable();
    let mut count = 0;

    while chars.next_if(|c| is_word_char(*c)).is_some() {
        count += 1;
    }

    while chars.next_if(|c| !is_word_char(*c)).is_some() {
        count += 1;
    }

    count
}
