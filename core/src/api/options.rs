//! Configuration options for the engine.

use crate::solver::DEFAULT_MAX_DEPTH;

/// Configuration options for the [`Engine`](super::Engine).
///
/// # Example
///
/// ```
/// use infix_core::api::EngineOptions;
///
/// let options = EngineOptions { max_depth: 64 };
/// assert_eq!(EngineOptions::default().max_depth, 1000);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineOptions {
    /// Maximum nesting depth, applied while parsing, evaluating and
    /// compiling. Also bounds reference chains during evaluation.
    ///
    /// Default: 1000
    pub max_depth: usize,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}
