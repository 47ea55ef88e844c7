//! The expression engine.

use super::EngineOptions;
use crate::{
    Result,
    compiler::{self, LocalMap, MemberTypes},
    operand::Constant,
    operators::Catalog,
    solver::{self, Resolver, TokenStream},
    syntax::{Keywords, Parser},
    vm::Code,
};

/// Parses source text and hands the token stream to the solver or the
/// compiler.
///
/// The engine owns the operator catalog and the keyword table. Both are
/// read-only once the engine is built, so a single engine can serve any
/// number of expressions.
///
/// # Example
///
/// ```
/// use infix_core::api::{Engine, EngineOptions};
/// use infix_core::operand::Constant;
/// use infix_core::solver::NoVariables;
/// use infix_core::syntax::Keywords;
///
/// let engine = Engine::new(EngineOptions::default())
///     .with_keywords(Keywords::new().with("answer", 42));
///
/// let value = engine.evaluate("answer / 2", &mut NoVariables).unwrap();
/// assert_eq!(value, Constant::Int(21));
/// ```
#[derive(Debug, Clone)]
pub struct Engine {
    catalog: Catalog,
    keywords: Keywords,
    options: EngineOptions,
}

impl Engine {
    /// Create an engine with the default operators and keywords.
    pub fn new(options: EngineOptions) -> Self {
        Self {
            catalog: Catalog::new(),
            keywords: Keywords::new(),
            options,
        }
    }

    /// Replace the keyword table.
    pub fn with_keywords(mut self, keywords: Keywords) -> Self {
        self.keywords = keywords;
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn keywords(&self) -> &Keywords {
        &self.keywords
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// Parse an expression into the token stream the solver and the
    /// compiler consume.
    pub fn parse(&self, source: &str) -> Result<TokenStream> {
        Parser::new(source, &self.catalog, &self.keywords)
            .with_max_depth(self.options.max_depth)
            .parse()
    }

    /// Parse and evaluate an expression.
    ///
    /// The resolver is asked only for references evaluation actually
    /// reaches: a short-circuited operand is never resolved.
    pub fn evaluate(&self, source: &str, resolver: &mut dyn Resolver) -> Result<Constant> {
        let stream = self.parse(source)?;
        solver::solve_with_limits(stream, resolver, self.options.max_depth)
    }

    /// Parse and compile an expression against typed locals.
    pub fn compile(
        &self,
        source: &str,
        locals: &LocalMap,
        members: &dyn MemberTypes,
    ) -> Result<Code> {
        let stream = self.parse(source)?;
        compiler::compile_with_limits(stream, locals, members, self.options.max_depth)
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(EngineOptions::default())
    }
}
