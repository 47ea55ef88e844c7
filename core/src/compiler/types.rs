//! Static types seen by the compiler.
//!
//! A primitive kind and its boxed wrapper share one [`TypeKind`]; the
//! `nullable` flag tells them apart. Reference kinds (`Str`, `Object`,
//! `Null`) may carry either flag.

use core::fmt;
use core::str::FromStr;

use crate::{
    String,
    operand::{Constant, Kind, NumericKind},
    vm::Primitive,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Int,
    Long,
    Float,
    Double,
    Boolean,
    Str,
    /// Host object of the named class.
    Object(&'static str),
    /// Type of the `null` literal.
    Null,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StaticType {
    pub kind: TypeKind,
    /// On a primitive kind: the boxed wrapper. On a reference kind: may be null.
    pub nullable: bool,
}

impl StaticType {
    pub const INT: StaticType = StaticType::primitive(TypeKind::Int);
    pub const LONG: StaticType = StaticType::primitive(TypeKind::Long);
    pub const FLOAT: StaticType = StaticType::primitive(TypeKind::Float);
    pub const DOUBLE: StaticType = StaticType::primitive(TypeKind::Double);
    pub const BOOLEAN: StaticType = StaticType::primitive(TypeKind::Boolean);
    pub const STRING: StaticType = StaticType::primitive(TypeKind::Str);
    pub const NULL: StaticType = StaticType {
        kind: TypeKind::Null,
        nullable: true,
    };

    pub const fn primitive(kind: TypeKind) -> Self {
        StaticType {
            kind,
            nullable: false,
        }
    }

    /// The wrapper (or nullable reference) form of `kind`.
    pub const fn boxed(kind: TypeKind) -> Self {
        StaticType {
            kind,
            nullable: true,
        }
    }

    pub const fn object(class: &'static str) -> Self {
        StaticType::boxed(TypeKind::Object(class))
    }

    /// Intrinsic type of a literal.
    pub fn of_constant(constant: &Constant) -> Self {
        match constant {
            Constant::Int(_) => StaticType::INT,
            Constant::Long(_) => StaticType::LONG,
            Constant::Float(_) => StaticType::FLOAT,
            Constant::Double(_) => StaticType::DOUBLE,
            Constant::Boolean(_) => StaticType::BOOLEAN,
            Constant::Str(_) => StaticType::STRING,
            Constant::Null => StaticType::NULL,
            Constant::Object(o) => StaticType::primitive(TypeKind::Object(o.class_name())),
        }
    }

    /// The same kind without the wrapper.
    pub fn unboxed(self) -> Self {
        StaticType::primitive(self.kind)
    }

    /// Primitive kind, if this is a primitive or its wrapper.
    pub fn primitive_kind(self) -> Option<Primitive> {
        match self.kind {
            TypeKind::Int => Some(Primitive::Int),
            TypeKind::Long => Some(Primitive::Long),
            TypeKind::Float => Some(Primitive::Float),
            TypeKind::Double => Some(Primitive::Double),
            TypeKind::Boolean => Some(Primitive::Boolean),
            _ => None,
        }
    }

    /// A boxed primitive, which must be unboxed before arithmetic.
    pub fn is_wrapper(self) -> bool {
        self.nullable && self.primitive_kind().is_some()
    }

    pub fn numeric_kind(self) -> Option<NumericKind> {
        match self.kind {
            TypeKind::Int => Some(NumericKind::Int),
            TypeKind::Long => Some(NumericKind::Long),
            TypeKind::Float => Some(NumericKind::Float),
            TypeKind::Double => Some(NumericKind::Double),
            _ => None,
        }
    }

    pub fn is_boolean(self) -> bool {
        self.kind == TypeKind::Boolean
    }

    pub fn is_string(self) -> bool {
        self.kind == TypeKind::Str
    }

    /// Values of this type live on the stack as references and may be
    /// compared by identity against `null`.
    pub fn is_reference(self) -> bool {
        matches!(self.kind, TypeKind::Str | TypeKind::Object(_) | TypeKind::Null) || self.nullable
    }

    /// Number of local slots a variable of this type occupies.
    pub fn slot_width(self) -> u16 {
        match (self.kind, self.nullable) {
            (TypeKind::Long | TypeKind::Double, false) => 2,
            _ => 1,
        }
    }

    /// Runtime kind of a value of this type, as reported by evaluation.
    pub fn runtime_kind(self) -> Kind {
        match self.kind {
            TypeKind::Int => Kind::Int,
            TypeKind::Long => Kind::Long,
            TypeKind::Float => Kind::Float,
            TypeKind::Double => Kind::Double,
            TypeKind::Boolean => Kind::Boolean,
            TypeKind::Str => Kind::String,
            TypeKind::Object(_) | TypeKind::Null => Kind::Object,
        }
    }
}

impl From<NumericKind> for TypeKind {
    fn from(kind: NumericKind) -> Self {
        match kind {
            NumericKind::Int => TypeKind::Int,
            NumericKind::Long => TypeKind::Long,
            NumericKind::Float => TypeKind::Float,
            NumericKind::Double => TypeKind::Double,
        }
    }
}

impl fmt::Display for StaticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match (self.kind, self.nullable) {
            (TypeKind::Int, false) => "int",
            (TypeKind::Long, false) => "long",
            (TypeKind::Float, false) => "float",
            (TypeKind::Double, false) => "double",
            (TypeKind::Boolean, false) => "boolean",
            (TypeKind::Str, false) => "String",
            (TypeKind::Str, true) => "String?",
            (TypeKind::Object(class), _) => class,
            (TypeKind::Null, _) => "null",
            _ => match self.primitive_kind() {
                Some(p) => p.wrapper_name(),
                None => "?",
            },
        };
        f.write_str(name)
    }
}

/// A type name that [`StaticType::from_str`] does not know.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown type '{0}'")]
pub struct UnknownTypeName(pub String);

/// Parses the names [`StaticType`] displays as, except host classes.
impl FromStr for StaticType {
    type Err = UnknownTypeName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "int" => StaticType::INT,
            "long" => StaticType::LONG,
            "float" => StaticType::FLOAT,
            "double" => StaticType::DOUBLE,
            "boolean" => StaticType::BOOLEAN,
            "String" => StaticType::STRING,
            "String?" => StaticType::boxed(TypeKind::Str),
            "Integer" => StaticType::boxed(TypeKind::Int),
            "Long" => StaticType::boxed(TypeKind::Long),
            "Float" => StaticType::boxed(TypeKind::Float),
            "Double" => StaticType::boxed(TypeKind::Double),
            "Boolean" => StaticType::boxed(TypeKind::Boolean),
            other => return Err(UnknownTypeName(other.into())),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn test_display_round_trips_through_from_str() {
        for name in [
            "int", "long", "float", "double", "boolean", "String", "String?", "Integer", "Long",
            "Float", "Double", "Boolean",
        ] {
            let ty: StaticType = name.parse().unwrap();
            assert_eq!(ty.to_string(), name);
        }
        assert_eq!(
            "Point".parse::<StaticType>(),
            Err(UnknownTypeName("Point".into()))
        );
    }

    #[test]
    fn test_slot_width() {
        assert_eq!(StaticType::LONG.slot_width(), 2);
        assert_eq!(StaticType::DOUBLE.slot_width(), 2);
        assert_eq!(StaticType::boxed(TypeKind::Long).slot_width(), 1);
        assert_eq!(StaticType::INT.slot_width(), 1);
        assert_eq!(StaticType::object("Point").slot_width(), 1);
    }

    #[test]
    fn test_wrapper_and_reference() {
        let integer = StaticType::boxed(TypeKind::Int);
        assert!(integer.is_wrapper());
        assert!(integer.is_reference());
        assert!(!StaticType::INT.is_wrapper());
        assert!(!StaticType::INT.is_reference());
        assert!(StaticType::STRING.is_reference());
        assert!(!StaticType::STRING.is_wrapper());
        assert_eq!(integer.unboxed(), StaticType::INT);
    }
}
