//! Static member lookup for `owner.name` expressions.

use hashbrown::HashMap;

use crate::{Error, Result, String, compiler::StaticType, format};

/// Answers the static type of a member of a host class.
///
/// Implementations report unknown members themselves, usually as
/// [`Error::UnknownReference`].
pub trait MemberTypes {
    fn member_type(&self, owner: &'static str, name: &str) -> Result<StaticType>;
}

impl<F> MemberTypes for F
where
    F: Fn(&'static str, &str) -> Result<StaticType>,
{
    fn member_type(&self, owner: &'static str, name: &str) -> Result<StaticType> {
        self(owner, name)
    }
}

/// No class has members.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoMembers;

impl MemberTypes for NoMembers {
    fn member_type(&self, owner: &'static str, name: &str) -> Result<StaticType> {
        Err(Error::unknown_reference(format!("{}.{}", owner, name)))
    }
}

/// A fixed class → member → type table.
#[derive(Debug, Clone, Default)]
pub struct MemberTable {
    classes: HashMap<&'static str, HashMap<String, StaticType>>,
}

impl MemberTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, owner: &'static str, name: impl Into<String>, ty: StaticType) -> Self {
        self.insert(owner, name, ty);
        self
    }

    pub fn insert(&mut self, owner: &'static str, name: impl Into<String>, ty: StaticType) {
        self.classes.entry(owner).or_default().insert(name.into(), ty);
    }
}

impl MemberTypes for MemberTable {
    fn member_type(&self, owner: &'static str, name: &str) -> Result<StaticType> {
        self.classes
            .get(owner)
            .and_then(|members| members.get(name))
            .copied()
            .ok_or_else(|| Error::unknown_reference(format!("{}.{}", owner, name)))
    }
}
