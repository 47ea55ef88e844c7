//! Operand model.
//!
//! An [`Operand`] is either a [`Constant`] carrying a concrete value or a
//! [`Reference`] naming a variable. Constants know how to combine with each
//! other under every operator (see `apply.rs`); references only know how to
//! ask a [`Resolver`](crate::solver::Resolver) for their value.

mod apply;
mod number;


pub use number::{Number, NumericKind};

use alloc::rc::Rc;
use core::fmt;

use crate::{Result, String, format, solver::Resolver};

/// Runtime kind of a constant. `null` has kind `Object`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Int,
    Long,
    Float,
    Double,
    Boolean,
    String,
    Object,
}

impl Kind {
    pub fn is_numeric(self) -> bool {
        NumericKind::from_kind(self).is_some()
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Kind::Int => "Int",
            Kind::Long => "Long",
            Kind::Float => "Float",
            Kind::Double => "Double",
            Kind::Boolean => "Boolean",
            Kind::String => "String",
            Kind::Object => "Object",
        })
    }
}

/// A value owned by the embedder that expressions can select members from.
pub trait HostObject {
    /// Name reported in diagnostics and used as the object's static type.
    fn class_name(&self) -> &'static str;

    /// Value of the named member, or `None` if the object has no such member.
    fn member(&self, name: &str) -> Option<Constant>;

    /// Text used when the object takes part in string concatenation.
    fn to_text(&self) -> String {
        crate::format!("{}@object", self.class_name())
    }
}

/// Shared handle to a host object. Two handles are equal only if they point
/// at the same object.
#[derive(Clone)]
pub struct ObjectRef(Rc<dyn HostObject>);

impl ObjectRef {
    pub fn new(object: impl HostObject + 'static) -> Self {
        ObjectRef(Rc::new(object))
    }

    pub fn class_name(&self) -> &'static str {
        self.0.class_name()
    }

    /// Identity of the referenced object, stable while any handle lives.
    pub(crate) fn addr(&self) -> usize {
        Rc::as_ptr(&self.0) as *const () as usize
    }

    pub fn member(&self, name: &str) -> Option<Constant> {
        self.0.member(name)
    }

    pub fn to_text(&self) -> String {
        self.0.to_text()
    }
}

impl PartialEq for ObjectRef {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Object({})", self.class_name())
    }
}

/// A concrete value. Its kind never changes after creation.
#[derive(Debug, Clone, PartialEq)]
pub enum Constant {
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Boolean(bool),
    Str(String),
    Null,
    Object(ObjectRef),
}

impl Constant {
    pub fn str(value: impl Into<String>) -> Self {
        Constant::Str(value.into())
    }

    pub fn kind(&self) -> Kind {
        match self {
            Constant::Int(_) => Kind::Int,
            Constant::Long(_) => Kind::Long,
            Constant::Float(_) => Kind::Float,
            Constant::Double(_) => Kind::Double,
            Constant::Boolean(_) => Kind::Boolean,
            Constant::Str(_) => Kind::String,
            Constant::Null | Constant::Object(_) => Kind::Object,
        }
    }

    pub fn is_number(&self) -> bool {
        self.kind().is_numeric()
    }

    pub fn is_string(&self) -> bool {
        matches!(self, Constant::Str(_))
    }

    pub fn is_boolean(&self) -> bool {
        matches!(self, Constant::Boolean(_))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Constant::Null)
    }

    pub fn to_number(&self) -> Option<Number> {
        match self {
            Constant::Int(v) => Some(Number::Int(*v)),
            Constant::Long(v) => Some(Number::Long(*v)),
            Constant::Float(v) => Some(Number::Float(*v)),
            Constant::Double(v) => Some(Number::Double(*v)),
            _ => None,
        }
    }

    pub fn to_boolean(&self) -> Option<bool> {
        match self {
            Constant::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Constant::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl From<Number> for Constant {
    fn from(n: Number) -> Self {
        match n {
            Number::Int(v) => Constant::Int(v),
            Number::Long(v) => Constant::Long(v),
            Number::Float(v) => Constant::Float(v),
            Number::Double(v) => Constant::Double(v),
        }
    }
}

impl From<i32> for Constant {
    fn from(v: i32) -> Self {
        Constant::Int(v)
    }
}

impl From<i64> for Constant {
    fn from(v: i64) -> Self {
        Constant::Long(v)
    }
}

impl From<f32> for Constant {
    fn from(v: f32) -> Self {
        Constant::Float(v)
    }
}

impl From<f64> for Constant {
    fn from(v: f64) -> Self {
        Constant::Double(v)
    }
}

impl From<bool> for Constant {
    fn from(v: bool) -> Self {
        Constant::Boolean(v)
    }
}

impl From<&str> for Constant {
    fn from(v: &str) -> Self {
        Constant::Str(v.into())
    }
}

/// Java string conversion: the text a value contributes to `+` concatenation.
impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constant::Int(v) => write!(f, "{}", v),
            Constant::Long(v) => write!(f, "{}", v),
            Constant::Float(v) => fmt_float(f, *v as f64, v),
            Constant::Double(v) => fmt_float(f, *v, v),
            Constant::Boolean(b) => write!(f, "{}", b),
            Constant::Str(s) => f.write_str(s),
            Constant::Null => f.write_str("null"),
            Constant::Object(o) => f.write_str(&o.to_text()),
        }
    }
}

/// Java's `Double.toString`/`Float.toString`: plain decimal for magnitudes
/// in `[1e-3, 1e7)`, otherwise `d.dddE±n`, always with a fractional digit.
/// `digits` supplies the shortest round-trip digits of the original width.
fn fmt_float(f: &mut fmt::Formatter<'_>, value: f64, digits: &dyn fmt::LowerExp) -> fmt::Result {
    if value.is_nan() {
        return f.write_str("NaN");
    }
    if value.is_infinite() {
        return f.write_str(if value > 0.0 { "Infinity" } else { "-Infinity" });
    }
    if value == 0.0 {
        return f.write_str(if value.is_sign_negative() { "-0.0" } else { "0.0" });
    }

    // e.g. `-1.25e-5`
    let scientific = format!("{:e}", digits);
    let (mantissa, exponent) = scientific.split_once('e').unwrap_or((&scientific, "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);
    let (sign, mantissa) = match mantissa.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", mantissa),
    };
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();

    f.write_str(sign)?;
    let magnitude = if value < 0.0 { -value } else { value };
    if !(1e-3..1e7).contains(&magnitude) {
        let (first, rest) = digits.split_at(1);
        let rest = if rest.is_empty() { "0" } else { rest };
        return write!(f, "{}.{}E{}", first, rest, exponent);
    }

    if exponent < 0 {
        f.write_str("0.")?;
        for _ in 1..-exponent {
            f.write_str("0")?;
        }
        return f.write_str(&digits);
    }
    let point = exponent as usize + 1;
    if digits.len() > point {
        write!(f, "{}.{}", &digits[..point], &digits[point..])
    } else {
        f.write_str(&digits)?;
        for _ in digits.len()..point {
            f.write_str("0")?;
        }
        f.write_str(".0")
    }
}

/// A variable name, resolved to a value only during evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Reference {
    name: String,
}

impl Reference {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// One level of resolution: whatever the resolver returns, which may
    /// itself be another reference.
    pub fn solve(&self, resolver: &mut dyn Resolver) -> Result<Operand> {
        resolver.resolve(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Constant(Constant),
    Reference(Reference),
}

impl Operand {
    pub fn reference(name: impl Into<String>) -> Self {
        Operand::Reference(Reference::new(name))
    }

    pub fn as_constant(&self) -> Option<&Constant> {
        match self {
            Operand::Constant(c) => Some(c),
            Operand::Reference(_) => None,
        }
    }
}

impl From<Constant> for Operand {
    fn from(constant: Constant) -> Self {
        Operand::Constant(constant)
    }
}

macro_rules! operand_from {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Operand {
                fn from(value: $ty) -> Self {
                    Operand::Constant(value.into())
                }
            }
        )*
    };
}

operand_from!(i32, i64, f32, f64, bool, &str);

impl From<Reference> for Operand {
    fn from(reference: Reference) -> Self {
        Operand::Reference(reference)
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Constant(c) => fmt::Display::fmt(c, f),
            Operand::Reference(r) => f.write_str(r.name()),
        }
    }
}
