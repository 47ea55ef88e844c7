//! Reserved words.
//!
//! An identifier found here is replaced by its operand instead of becoming
//! a reference. Embedders may add their own, e.g. `PI` as a constant or
//! `self` as an alias for another reference.

use hashbrown::HashMap;

use crate::{
    String,
    operand::{Constant, Operand},
};

#[derive(Debug, Clone)]
pub struct Keywords {
    table: HashMap<String, Operand>,
}

impl Keywords {
    /// `true`, `false` and `null`.
    pub fn new() -> Self {
        Self::empty()
            .with("true", Constant::Boolean(true))
            .with("false", Constant::Boolean(false))
            .with("null", Constant::Null)
    }

    pub fn empty() -> Self {
        Self {
            table: HashMap::new(),
        }
    }

    pub fn with(mut self, word: impl Into<String>, value: impl Into<Operand>) -> Self {
        self.insert(word, value);
        self
    }

    pub fn insert(&mut self, word: impl Into<String>, value: impl Into<Operand>) -> Option<Operand> {
        self.table.insert(word.into(), value.into())
    }

    pub fn remove(&mut self, word: &str) -> Option<Operand> {
        self.table.remove(word)
    }

    pub fn get(&self, word: &str) -> Option<&Operand> {
        self.table.get(word)
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

impl Default for Keywords {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_keywords() {
        let keywords = Keywords::new();
        assert_eq!(keywords.len(), 3);
        assert_eq!(keywords.get("true"), Some(&Operand::from(true)));
        assert_eq!(keywords.get("null"), Some(&Operand::Constant(Constant::Null)));
        assert_eq!(keywords.get("True"), None);
    }

    #[test]
    fn test_embedder_keywords() {
        let mut keywords = Keywords::new().with("answer", 42);
        keywords.insert("me", Operand::reference("self"));
        assert_eq!(keywords.get("answer"), Some(&Operand::from(42)));
        assert_eq!(keywords.remove("null"), Some(Operand::Constant(Constant::Null)));
        assert!(Keywords::empty().is_empty());
    }
}
