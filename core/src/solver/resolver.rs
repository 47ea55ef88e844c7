//! Variable resolution for evaluation mode.

use hashbrown::HashMap;

use crate::{
    Error, Result, String,
    operand::{Constant, Operand},
};

/// Supplies values for references while an expression is evaluated.
///
/// Called at most once per reference occurrence that evaluation actually
/// reaches; the solver never memoizes. May have side effects.
pub trait Resolver {
    fn resolve(&mut self, name: &str) -> Result<Operand>;
}

impl<F> Resolver for F
where
    F: FnMut(&str) -> Result<Operand>,
{
    fn resolve(&mut self, name: &str) -> Result<Operand> {
        self(name)
    }
}

/// A fixed name → operand table.
#[derive(Debug, Clone, Default)]
pub struct Variables {
    bindings: HashMap<String, Operand>,
}

impl Variables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`Variables::insert`].
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Operand>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Operand>) {
        self.bindings.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&Operand> {
        self.bindings.get(name)
    }
}

impl Resolver for Variables {
    fn resolve(&mut self, name: &str) -> Result<Operand> {
        self.bindings
            .get(name)
            .cloned()
            .ok_or_else(|| Error::unknown_reference(name))
    }
}

/// Resolves nothing; every reference is unknown.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoVariables;

impl Resolver for NoVariables {
    fn resolve(&mut self, name: &str) -> Result<Operand> {
        Err(Error::unknown_reference(name))
    }
}

impl FromIterator<(String, Constant)> for Variables {
    fn from_iter<I: IntoIterator<Item = (String, Constant)>>(iter: I) -> Self {
        Self {
            bindings: iter
                .into_iter()
                .map(|(name, value)| (name, Operand::Constant(value)))
                .collect(),
        }
    }
}
