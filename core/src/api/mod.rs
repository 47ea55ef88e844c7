//! Public API: one entry point from source text to a value or to code.
//!
//! # Example
//!
//! ```
//! use infix_core::api::{Engine, EngineOptions};
//! use infix_core::compiler::{LocalMap, NoMembers, StaticType};
//! use infix_core::operand::Constant;
//! use infix_core::solver::Variables;
//!
//! let engine = Engine::new(EngineOptions::default());
//!
//! let mut vars = Variables::new().with("x", 20);
//! assert_eq!(engine.evaluate("x * 2 + 2", &mut vars).unwrap(), Constant::Int(42));
//!
//! let locals = LocalMap::new().with("x", StaticType::INT).unwrap();
//! let code = engine.compile("x * 2L", &locals, &NoMembers).unwrap();
//! assert_eq!(code.result_type, StaticType::LONG);
//! ```

pub mod engine;
pub mod options;

pub use engine::Engine;
pub use options::EngineOptions;
