//! Local variable table supplied by the embedder before compilation.

use hashbrown::HashMap;

use crate::{Error, Result, String, compiler::StaticType};

/// A named, typed storage slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Local {
    pub slot: u16,
    pub ty: StaticType,
}

/// Name → [`Local`] table. Read-only while an expression is compiled.
#[derive(Debug, Clone, Default)]
pub struct LocalMap {
    locals: HashMap<String, Local>,
    /// First slot not covered by any local.
    next_slot: u32,
}

impl LocalMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a local at an explicit slot. Replaces any local of the same name.
    pub fn insert(&mut self, name: impl Into<String>, slot: u16, ty: StaticType) {
        let end = slot as u32 + ty.slot_width() as u32;
        self.next_slot = self.next_slot.max(end);
        self.locals.insert(name.into(), Local { slot, ty });
    }

    /// Register a local at the next free slot and return that slot.
    ///
    /// Primitive `long` and `double` take two slots.
    pub fn declare(&mut self, name: impl Into<String>, ty: StaticType) -> Result<u16> {
        let slot = u16::try_from(self.next_slot).map_err(|_| Error::TooManyLocals)?;
        let end = self.next_slot + ty.slot_width() as u32;
        if end > u16::MAX as u32 + 1 {
            return Err(Error::TooManyLocals);
        }
        self.insert(name, slot, ty);
        Ok(slot)
    }

    /// Builder-style [`LocalMap::declare`].
    pub fn with(mut self, name: impl Into<String>, ty: StaticType) -> Result<Self> {
        self.declare(name, ty)?;
        Ok(self)
    }

    pub fn get(&self, name: &str) -> Result<&Local> {
        self.locals
            .get(name)
            .ok_or_else(|| Error::unknown_reference(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.locals.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.locals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locals.is_empty()
    }

    /// Number of slots spanned by the declared locals.
    pub fn slots_used(&self) -> u32 {
        self.next_slot
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Local)> {
        self.locals.iter().map(|(name, local)| (name.as_str(), local))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::TypeKind;

    #[test]
    fn test_declare_assigns_consecutive_slots() {
        let mut locals = LocalMap::new();
        assert_eq!(locals.declare("a", StaticType::INT).unwrap(), 0);
        assert_eq!(locals.declare("b", StaticType::LONG).unwrap(), 1);
        assert_eq!(locals.declare("c", StaticType::boxed(TypeKind::Double)).unwrap(), 3);
        assert_eq!(locals.declare("d", StaticType::DOUBLE).unwrap(), 4);
        assert_eq!(locals.slots_used(), 6);
        assert_eq!(locals.get("b").unwrap().ty, StaticType::LONG);
    }

    #[test]
    fn test_insert_moves_next_slot_past_explicit_slot() {
        let mut locals = LocalMap::new();
        locals.insert("this", 5, StaticType::object("Point"));
        assert_eq!(locals.declare("x", StaticType::INT).unwrap(), 6);
    }

    #[test]
    fn test_unknown_local() {
        let locals = LocalMap::new();
        assert_eq!(locals.get("x"), Err(Error::unknown_reference("x")));
    }

    #[test]
    fn test_too_many_locals() {
        let mut locals = LocalMap::new();
        locals.insert("high", u16::MAX - 1, StaticType::INT);
        assert_eq!(locals.declare("last", StaticType::INT).unwrap(), u16::MAX);
        assert_eq!(locals.declare("overflow", StaticType::INT), Err(Error::TooManyLocals));

        let mut locals = LocalMap::new();
        locals.insert("high", u16::MAX - 1, StaticType::INT);
        assert_eq!(locals.declare("wide", StaticType::LONG), Err(Error::TooManyLocals));
    }
}
