//! Infix - parse, evaluate and compile infix expressions
//!
//! # Overview
//!
//! Infix reads Java-flavoured infix expressions (arithmetic, bitwise,
//! logical, comparison and member access) and either:
//!
//! - **evaluates** them against a variable resolver, short-circuiting `&&`
//!   and `||` so that references on the skipped side are never resolved, or
//! - **compiles** them, given the static types of the locals they read, to
//!   instructions for a stack machine with numeric promotion, boxing and
//!   slot addressing.
//!
//! # Quick Start
//!
//! ```
//! use infix::{Constant, Engine, LocalMap, NoMembers, StaticType, Variables};
//!
//! let engine = Engine::default();
//!
//! let mut vars = Variables::new().with("price", 20).with("qty", 3i64);
//! let total = engine.evaluate("price * qty", &mut vars).unwrap();
//! assert_eq!(total, Constant::Long(60));
//!
//! let locals = LocalMap::new()
//!     .with("price", StaticType::INT).unwrap()
//!     .with("qty", StaticType::LONG).unwrap();
//! let code = engine.compile("price * qty", &locals, &NoMembers).unwrap();
//! assert_eq!(code.result_type, StaticType::LONG);
//! ```

mod error_renderer;

pub use error_renderer::{ExpressionError, render_error, render_error_to_string_no_color};

// Re-export public API from infix_core
pub use infix_core::api::{Engine, EngineOptions};
pub use infix_core::{Error, Result};

pub use infix_core::compiler::{LocalMap, MemberTable, MemberTypes, NoMembers, StaticType, TypeKind};
pub use infix_core::operand::{Constant, HostObject, Kind, ObjectRef, Operand};
pub use infix_core::solver::{NoVariables, Resolver, Token, TokenStream, Variables};
pub use infix_core::syntax::Keywords;
pub use infix_core::vm::{Code, Instruction};

pub use infix_core::{api, compiler, operand, operators, solver, syntax, vm};
