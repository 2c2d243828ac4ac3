// ABOUTME: Syntax tree model: expression and statement variants built by the parser

use crate::token::{LiteralValue, Token};
use std::rc::Rc;

/// Identity of a name-use site. The resolver keys scope distances on these,
/// so the evaluator can find a local without walking the chain dynamically.
pub type ExprId = usize;

#[derive(Debug, Clone)]
pub enum Expr {
    Literal {
        value: LiteralValue,
    },
    Variable {
        name: Token,
        id: ExprId,
    },
    Assign {
        name: Token,
        value: Box<Expr>,
        id: ExprId,
    },
    Binary {
        left: Box<Expr>,
        operator: Token,
        right: Box<Expr>,
    },
    /// Short-circuiting `&&` / `||`.
    Logical {
        left: Box<Expr>,
        operator: Token,
        right: Box<Expr>,
    },
    Unary {
        operator: Token,
        operand: Box<Expr>,
    },
    /// `++x`, `x++`, `--x`, `x--`. The target must be a variable, index, or
    /// member expression; anything else is rejected at evaluation time.
    DeIncrement {
        operator: Token,
        target: Box<Expr>,
        prefix: bool,
    },
    Grouping {
        inner: Box<Expr>,
    },
    Call {
        callee: Box<Expr>,
        paren: Token,
        args: Vec<Argument>,
    },
    MemberAccess {
        object: Box<Expr>,
        name: Token,
    },
    MemberSet {
        object: Box<Expr>,
        name: Token,
        value: Box<Expr>,
    },
    Index {
        bracket: Token,
        object: Box<Expr>,
        index: Box<Expr>,
    },
    IndexSet {
        bracket: Token,
        object: Box<Expr>,
        index: Box<Expr>,
        value: Box<Expr>,
    },
    Array {
        bracket: Token,
        elements: Vec<Expr>,
    },
    Dict {
        brace: Token,
        pairs: Vec<(Token, Expr)>,
    },
    Lambda {
        keyword: Token,
        params: Rc<Vec<Parameter>>,
        body: Rc<Vec<Stmt>>,
    },
}

/// A call-site argument: positional when `name` is `None`, named otherwise.
#[derive(Debug, Clone)]
pub struct Argument {
    pub name: Option<Token>,
    pub value: Expr,
}

/// A declared parameter. Optional parameters default to null (`x?`) or to an
/// expression (`x = e`) evaluated in the call frame.
#[derive(Debug, Clone)]
pub struct Parameter {
    pub name: Token,
    pub optional: bool,
    pub default: Option<Expr>,
}

#[derive(Debug, Clone)]
pub enum Stmt {
    Block {
        statements: Vec<Stmt>,
    },
    Expression {
        expr: Expr,
    },
    Var {
        name: Token,
        initializer: Option<Expr>,
    },
    Const {
        name: Token,
        initializer: Expr,
    },
    /// Parameter list and body are shared so that constructing a closure on
    /// every evaluation of the declaration stays cheap.
    Function {
        name: Token,
        params: Rc<Vec<Parameter>>,
        body: Rc<Vec<Stmt>>,
    },
    If {
        condition: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },
    /// `post` holds the step statement of a lowered `for` loop. It runs after
    /// every iteration, including ones cut short by `continue`.
    While {
        condition: Expr,
        body: Box<Stmt>,
        post: Option<Box<Stmt>>,
    },
    Break {
        keyword: Token,
    },
    Continue {
        keyword: Token,
    },
    Return {
        keyword: Token,
        value: Option<Expr>,
    },
    Enum {
        name: Token,
        members: Vec<Token>,
    },
}
