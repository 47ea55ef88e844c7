//! Operator-precedence parser from source text to a prefix [`TokenStream`].
//!
//! Operands and pending operators are kept on two explicit stacks
//! (shunting-yard), so neither parentheses nor long operator chains grow
//! the call stack. Reduced sub-expressions are nodes of a small index tree
//! that is finally walked in pre-order to give the order the solver and
//! the compiler pop.
//!
//! ```text
//! a - b * c    =>    - a * b c
//! -x.y         =>    -u . x y
//! ```
//!
//! Binary operators are left-associative. Prefix operators bind tighter
//! than every binary operator except `.`, whose right operand must be a
//! bare member name.
//!
//! Depth is the height of the resulting tree: parentheses add nothing,
//! while every operator adds one level, so `1 + 2 + 3` is three deep. The
//! solver and the compiler count the same way.

use crate::{
    Error, Result, Vec, format,
    operand::Operand,
    operators::{BinaryOp, Catalog, UnaryOp},
    solver::{DEFAULT_MAX_DEPTH, Token, TokenStream},
    syntax::{Keywords, Lexer},
};

/// Parse `source` with the default operators and keywords.
pub fn parse(source: &str) -> Result<TokenStream> {
    Parser::new(source, &Catalog::new(), &Keywords::new()).parse()
}

pub struct Parser<'s, 'c> {
    lexer: Lexer<'s>,
    catalog: &'c Catalog,
    keywords: &'c Keywords,
    max_depth: usize,
    /// Every reduced sub-expression, children by index.
    nodes: Vec<Node>,
    /// Sub-expressions not yet claimed by an operator.
    operands: Vec<usize>,
    /// Operators and open parentheses not yet reduced.
    pending: Vec<Pending>,
}

struct Node {
    token: Option<Token>,
    left: Option<usize>,
    right: Option<usize>,
    height: usize,
}

#[derive(Debug, Clone, Copy)]
enum Pending {
    Unary { op: UnaryOp, offset: usize },
    Binary { op: BinaryOp, offset: usize },
    Group { offset: usize },
}

impl Pending {
    /// Whether this operator takes its operands before `next` does.
    fn binds_before(self, next: BinaryOp) -> bool {
        match self {
            Pending::Unary { .. } => UnaryOp::PRECEDENCE >= next.precedence(),
            Pending::Binary { op, .. } => op.precedence() >= next.precedence(),
            Pending::Group { .. } => false,
        }
    }
}

impl<'s, 'c> Parser<'s, 'c> {
    pub fn new(source: &'s str, catalog: &'c Catalog, keywords: &'c Keywords) -> Self {
        Self {
            lexer: Lexer::new(source),
            catalog,
            keywords,
            max_depth: DEFAULT_MAX_DEPTH,
            nodes: Vec::new(),
            operands: Vec::new(),
            pending: Vec::new(),
        }
    }

    /// Limit on the height of the expression tree.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Parse the whole source as one expression.
    pub fn parse(mut self) -> Result<TokenStream> {
        loop {
            self.parse_operand()?;
            if !self.parse_operator()? {
                break;
            }
        }

        // End of input: everything still pending applies now
        while let Some(pending) = self.pending.pop() {
            if let Pending::Group { offset } = pending {
                return Err(Error::syntax(offset, "unclosed '('"));
            }
            self.reduce(pending)?;
        }
        let root = self.pop_operand()?;

        let stream = self.emit(root)?;
        tracing::debug!(
            tokens = stream.len(),
            source_len = self.lexer.source().len(),
            "parsed expression"
        );
        Ok(stream)
    }

    /// An operand, preceded by any prefix operators and open parentheses.
    fn parse_operand(&mut self) -> Result<()> {
        loop {
            self.lexer.skip_whitespace();
            let offset = self.lexer.offset();

            if self.lexer.starts_number() {
                let value = self.lexer.number(false)?;
                return self.leaf(Token::from(value), offset);
            }
            if self.lexer.peek() == Some('"') {
                let value = self.lexer.string()?;
                return self.leaf(Token::from(value), offset);
            }
            if let Some(name) = self.lexer.identifier() {
                let operand = match self.keywords.get(name) {
                    Some(operand) => operand.clone(),
                    None => Operand::reference(name),
                };
                return self.leaf(Token::Operand(operand), offset);
            }
            if self.lexer.eat('(') {
                self.pending.push(Pending::Group { offset });
                continue;
            }

            match self.lexer.operator(&self.catalog.unary)? {
                // `-2147483648` is only representable as a single literal
                Some(UnaryOp::Neg) if self.lexer.starts_number() => {
                    let value = self.lexer.number(true)?;
                    return self.leaf(Token::from(value), offset);
                }
                Some(op) => {
                    tracing::trace!(%op, offset, "prefix operator");
                    self.pending.push(Pending::Unary { op, offset });
                }
                None => return Err(self.lexer.unexpected("an operand")),
            }
        }
    }

    /// Closing parentheses and member selections up to the next binary
    /// operator. Returns false at the end of the input.
    fn parse_operator(&mut self) -> Result<bool> {
        loop {
            self.lexer.skip_whitespace();
            let offset = self.lexer.offset();

            match self.lexer.peek() {
                None => return Ok(false),
                Some(')') => {
                    self.lexer.eat(')');
                    self.close_group(offset)?;
                    continue;
                }
                Some(_) => {}
            }

            let Some(op) = self.lexer.operator(&self.catalog.binary)? else {
                return Err(self.lexer.unexpected("an operator"));
            };
            tracing::trace!(%op, offset, "binary operator");

            while let Some(&top) = self.pending.last() {
                if !top.binds_before(op) {
                    break;
                }
                self.pending.pop();
                self.reduce(top)?;
            }

            if op == BinaryOp::Member {
                // Highest precedence: the selection applies right away
                let owner = self.pop_operand()?;
                let name = self.member_name()?;
                self.push_node(Token::Binary(op), Some(owner), Some(name), offset)?;
                continue;
            }

            self.pending.push(Pending::Binary { op, offset });
            return Ok(true);
        }
    }

    fn close_group(&mut self, offset: usize) -> Result<()> {
        while let Some(pending) = self.pending.pop() {
            if let Pending::Group { .. } = pending {
                return Ok(());
            }
            self.reduce(pending)?;
        }
        Err(Error::syntax(offset, "unmatched ')'"))
    }

    /// The right operand of `.`: an identifier, never a keyword.
    fn member_name(&mut self) -> Result<usize> {
        self.lexer.skip_whitespace();
        let offset = self.lexer.offset();
        match self.lexer.identifier() {
            Some(name) => {
                self.leaf(Token::Operand(Operand::reference(name)), offset)?;
                self.pop_operand()
            }
            None => Err(self.lexer.unexpected("a member name")),
        }
    }

    fn reduce(&mut self, pending: Pending) -> Result<()> {
        match pending {
            Pending::Unary { op, offset } => {
                let operand = self.pop_operand()?;
                self.push_node(Token::Unary(op), Some(operand), None, offset)
            }
            Pending::Binary { op, offset } => {
                let right = self.pop_operand()?;
                let left = self.pop_operand()?;
                self.push_node(Token::Binary(op), Some(left), Some(right), offset)
            }
            Pending::Group { offset } => Err(Error::syntax(offset, "unclosed '('")),
        }
    }

    fn leaf(&mut self, token: Token, offset: usize) -> Result<()> {
        self.push_node(token, None, None, offset)
    }

    fn push_node(
        &mut self,
        token: Token,
        left: Option<usize>,
        right: Option<usize>,
        offset: usize,
    ) -> Result<()> {
        let height = 1 + [left, right]
            .into_iter()
            .flatten()
            .map(|child| self.nodes[child].height)
            .max()
            .unwrap_or(0);
        if height > self.max_depth {
            return Err(Error::syntax(
                offset,
                format!("expression nested deeper than {}", self.max_depth),
            ));
        }

        self.operands.push(self.nodes.len());
        self.nodes.push(Node {
            token: Some(token),
            left,
            right,
            height,
        });
        Ok(())
    }

    fn pop_operand(&mut self) -> Result<usize> {
        self.operands
            .pop()
            .ok_or_else(|| Error::malformed("operator is missing an operand"))
    }

    /// Walk the tree from `root` in pre-order into a stream.
    fn emit(&mut self, root: usize) -> Result<TokenStream> {
        let mut prefix = Vec::with_capacity(self.nodes.len());
        let mut stack = Vec::from([root]);
        while let Some(index) = stack.pop() {
            let node = &mut self.nodes[index];
            let token = node
                .token
                .take()
                .ok_or_else(|| Error::malformed("sub-expression used twice"))?;
            prefix.push(token);
            stack.extend(node.right);
            stack.extend(node.left);
        }
        Ok(TokenStream::from_prefix(prefix))
    }
}
