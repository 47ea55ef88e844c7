//! Incremental multi-character operator recognition.
//!
//! An [`OperatorTable`] is a snapshot of operator texts grouped by their
//! first character, each group ordered by full text. A [`Matcher`] is
//! started from one character and narrowed one character at a time:
//!
//! ```text
//! start('<')   candidates: <  <<  <=
//! consume('<') candidates: <<
//! matched()    Some(<<)
//! ```
//!
//! Several operators may be textual prefixes of each other (`<`, `<<`).
//! While a longer candidate is still alive the match is ambiguous and
//! [`Matcher::matched`] reports nothing; once the caller sees that the next
//! character cannot extend the token it calls [`Matcher::complete`].

use alloc::collections::BTreeMap;

use crate::Vec;

/// No operator in the table starts with the given character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("no operator starts with '{0}'")]
pub struct NoMatcherFound(pub char);

impl From<NoMatcherFound> for crate::Error {
    fn from(e: NoMatcherFound) -> Self {
        crate::Error::NoMatcherFound { ch: e.0 }
    }
}

/// Operators grouped by first character, each group ordered by full text.
#[derive(Debug, Clone)]
pub struct OperatorTable<T> {
    by_first_char: BTreeMap<char, BTreeMap<&'static str, T>>,
}

impl<T: Copy> OperatorTable<T> {
    pub fn new(entries: impl IntoIterator<Item = (&'static str, T)>) -> Self {
        let mut table = Self {
            by_first_char: BTreeMap::new(),
        };
        for (text, op) in entries {
            table.insert(text, op);
        }
        table
    }

    /// Register an operator. A later registration of the same text replaces
    /// the earlier one; empty texts are ignored.
    pub fn insert(&mut self, text: &'static str, op: T) {
        let Some(first) = text.chars().next() else {
            return;
        };
        self.by_first_char
            .entry(first)
            .or_default()
            .insert(text, op);
    }

    /// Remove an operator, returning it if it was registered.
    pub fn remove(&mut self, text: &str) -> Option<T> {
        let first = text.chars().next()?;
        let group = self.by_first_char.get_mut(&first)?;
        let removed = group.remove(text);
        if group.is_empty() {
            self.by_first_char.remove(&first);
        }
        removed
    }

    /// Exact lookup by full operator text.
    pub fn get(&self, text: &str) -> Option<T> {
        let first = text.chars().next()?;
        self.by_first_char.get(&first)?.get(text).copied()
    }

    pub fn starts_operator(&self, ch: char) -> bool {
        self.by_first_char.contains_key(&ch)
    }

    /// Begin matching an operator whose first character is `ch`.
    pub fn start(&self, ch: char) -> Result<Matcher<T>, NoMatcherFound> {
        let group = self.by_first_char.get(&ch).ok_or(NoMatcherFound(ch))?;
        let candidates = group
            .iter()
            .map(|(text, op)| Candidate {
                text: *text,
                len: text.chars().count(),
                op: *op,
            })
            .collect();
        Ok(Matcher {
            candidates,
            consumed: 1,
        })
    }
}

#[derive(Debug, Clone, Copy)]
struct Candidate<T> {
    text: &'static str,
    len: usize,
    op: T,
}

impl<T> Candidate<T> {
    fn char_at(&self, position: usize) -> Option<char> {
        self.text.chars().nth(position)
    }
}

/// Single-use matching state for one operator token.
#[derive(Debug, Clone)]
pub struct Matcher<T> {
    /// Surviving candidates, in table order.
    candidates: Vec<Candidate<T>>,
    /// Characters consumed so far, including the starting one.
    consumed: usize,
}

impl<T: Copy> Matcher<T> {
    /// Whether some surviving candidate accepts `ch` as its next character.
    pub fn has_next(&self, ch: char) -> bool {
        self.candidates
            .iter()
            .any(|c| c.char_at(self.consumed) == Some(ch))
    }

    /// Advance by one character, dropping every candidate that disagrees.
    pub fn consume(&mut self, ch: char) {
        let position = self.consumed;
        self.candidates.retain(|c| c.char_at(position) == Some(ch));
        self.consumed += 1;
    }

    /// The operator matched so far, if it is unambiguous.
    ///
    /// Returns `None` while a longer candidate is still alive, or when no
    /// candidate is exactly as long as the consumed text.
    pub fn matched(&self) -> Option<T> {
        let mut exact = None;
        for candidate in &self.candidates {
            if candidate.len == self.consumed {
                exact.get_or_insert(candidate.op);
            } else {
                return None;
            }
        }
        exact
    }

    /// Finish the token at the consumed text.
    ///
    /// Longer candidates are abandoned; among exact-length candidates the
    /// first in table order wins.
    pub fn complete(&self) -> Option<T> {
        self.candidates
            .iter()
            .find(|c| c.len == self.consumed)
            .map(|c| c.op)
    }

    /// Number of characters consumed, including the starting one.
    pub fn consumed(&self) -> usize {
        self.consumed
    }

    /// Whether any candidate survives.
    pub fn is_alive(&self) -> bool {
        !self.candidates.is_empty()
    }
}
