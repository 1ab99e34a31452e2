#![forbid(unsafe_code)]

//! Fixed key-sequence matcher.
//!
//! [`SequenceMatcher`] keeps a sliding window of the last `N` key
//! identifiers, where `N` is the target length, and fires when the window
//! equals the target exactly.
//!
//! # Invariants
//!
//! 1. `buffer().len() <= target().len()` after every [`push`](SequenceMatcher::push).
//! 2. The buffer is empty immediately after a match.
//! 3. The target never changes after construction.
//!
//! Comparison is order- and case-sensitive (`"B"` does not match `"b"`).
//! The whole window is re-compared on every keystroke; targets are short.

use std::collections::VecDeque;

/// Key identifiers of the classic Konami code, as reported by
/// `KeyboardEvent.key`.
pub const KONAMI_CODE: [&str; 10] = [
    "ArrowUp",
    "ArrowUp",
    "ArrowDown",
    "ArrowDown",
    "ArrowLeft",
    "ArrowRight",
    "ArrowLeft",
    "ArrowRight",
    "b",
    "a",
];

#[derive(Debug, Clone)]
pub struct SequenceMatcher {
    target: Vec<String>,
    buffer: VecDeque<String>,
}

impl SequenceMatcher {
    #[must_use]
    pub fn new<I, S>(target: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let target: Vec<String> = target.into_iter().map(Into::into).collect();
        let buffer = VecDeque::with_capacity(target.len() + 1);
        Self { target, buffer }
    }

    #[must_use]
    pub fn konami() -> Self {
        Self::new(KONAMI_CODE)
    }

    /// Feed one key. Returns `true` exactly when the window now equals the
    /// target; the window is cleared in that case.
    pub fn push(&mut self, key: &str) -> bool {
        if self.target.is_empty() {
            return false;
        }
        self.buffer.push_back(key.to_owned());
        while self.buffer.len() > self.target.len() {
            self.buffer.pop_front();
        }
        if self.buffer.iter().eq(self.target.iter()) {
            self.buffer.clear();
            return true;
        }
        false
    }

    /// Keys seen since the last match, oldest first.
    pub fn buffer(&self) -> impl Iterator<Item = &str> + '_ {
        self.buffer.iter().map(String::as_str)
    }

    #[must_use]
    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }

    pub fn reset(&mut self) {
        self.buffer.clear();
    }
}

impl Default for SequenceMatcher {
    fn default() -> Self {
        Self::konami()
    }
}
