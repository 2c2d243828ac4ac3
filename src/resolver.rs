// ABOUTME: Static scope analysis assigning lexical distances to every name use

use crate::ast::{Argument, Expr, ExprId, Parameter, Stmt};
use crate::error::SyntaxError;
use crate::token::Token;
use std::collections::HashMap;

/// What kind of callable body the walk is currently inside. Gates `return`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FunctionKind {
    None,
    Function,
    Lambda,
}

/// Pre-order AST walk over a scope stack. Produces, for every local name use,
/// the number of frames to ascend at runtime; global uses get no entry and
/// fall back to the global environment dynamically. Also enforces the static
/// rules: no self-referential initializers, no same-scope redeclaration, and
/// `return`/`break`/`continue` only in valid contexts.
pub struct Resolver {
    scopes: Vec<HashMap<String, bool>>,
    locals: HashMap<ExprId, usize>,
    errors: Vec<SyntaxError>,
    function_kind: FunctionKind,
    in_loop: bool,
}

/// Convenience entry point: resolve a whole program.
pub fn resolve(statements: &[Stmt]) -> (HashMap<ExprId, usize>, Vec<SyntaxError>) {
    let mut resolver = Resolver::new();
    resolver.resolve_statements(statements);
    resolver.into_result()
}

impl Resolver {
    pub fn new() -> Self {
        Resolver {
            scopes: Vec::new(),
            locals: HashMap::new(),
            errors: Vec::new(),
            function_kind: FunctionKind::None,
            in_loop: false,
        }
    }

    pub fn resolve_statements(&mut self, statements: &[Stmt]) {
        for statement in statements {
            self.resolve_stmt(statement);
        }
    }

    pub fn into_result(self) -> (HashMap<ExprId, usize>, Vec<SyntaxError>) {
        (self.locals, self.errors)
    }

    fn resolve_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Block { statements } => {
                self.begin_scope();
                self.resolve_statements(statements);
                self.end_scope();
            }
            Stmt::Expression { expr } => self.resolve_expr(expr),
            Stmt::Var { name, initializer } => {
                self.declare(name);
                if let Some(init) = initializer {
                    self.resolve_expr(init);
                }
                self.define(name);
            }
            Stmt::Const { name, initializer } => {
                self.declare(name);
                self.resolve_expr(initializer);
                self.define(name);
            }
            Stmt::Function { name, params, body } => {
                // Declared and defined before the body resolves, so the
                // function can call itself.
                self.declare(name);
                self.define(name);
                self.resolve_function(params, body, FunctionKind::Function);
            }
            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                self.resolve_expr(condition);
                self.resolve_stmt(then_branch);
                if let Some(branch) = else_branch {
                    self.resolve_stmt(branch);
                }
            }
            Stmt::While {
                condition,
                body,
                post,
            } => {
                self.resolve_expr(condition);
                let enclosing = self.in_loop;
                self.in_loop = true;
                self.resolve_stmt(body);
                if let Some(post) = post {
                    self.resolve_stmt(post);
                }
                self.in_loop = enclosing;
            }
            Stmt::Break { keyword } => {
                if !self.in_loop {
                    self.error(keyword, "'break' outside of a loop");
                }
            }
            Stmt::Continue { keyword } => {
                if !self.in_loop {
                    self.error(keyword, "'continue' outside of a loop");
                }
            }
            Stmt::Return { keyword, value } => {
                if self.function_kind == FunctionKind::None {
                    self.error(keyword, "'return' outside of a function");
                }
                if let Some(value) = value {
                    self.resolve_expr(value);
                }
            }
            Stmt::Enum { name, .. } => {
                self.declare(name);
                self.define(name);
            }
        }
    }

    fn resolve_expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Literal { .. } => {}
            Expr::Variable { name, id } => {
                let own_initializer = self
                    .scopes
                    .last()
                    .map(|scope| scope.get(&name.lexeme) == Some(&false))
                    .unwrap_or(false);
                if own_initializer {
                    self.error(name, "cannot read a variable in its own initializer");
                }
                self.resolve_local(*id, name);
            }
            Expr::Assign { name, value, id } => {
                self.resolve_expr(value);
                self.resolve_local(*id, name);
            }
            Expr::Binary { left, right, .. } => {
                self.resolve_expr(left);
                self.resolve_expr(right);
            }
            Expr::Logical { left, right, .. } => {
                self.resolve_expr(left);
                self.resolve_expr(right);
            }
            Expr::Unary { operand, .. } => self.resolve_expr(operand),
            Expr::DeIncrement { target, .. } => self.resolve_expr(target),
            Expr::Grouping { inner } => self.resolve_expr(inner),
            Expr::Call { callee, args, .. } => {
                self.resolve_expr(callee);
                for Argument { value, .. } in args {
                    self.resolve_expr(value);
                }
            }
            Expr::MemberAccess { object, .. } => self.resolve_expr(object),
            Expr::MemberSet { object, value, .. } => {
                self.resolve_expr(object);
                self.resolve_expr(value);
            }
            Expr::Index { object, index, .. } => {
                self.resolve_expr(object);
                self.resolve_expr(index);
            }
            Expr::IndexSet {
                object,
                index,
                value,
                ..
            } => {
                self.resolve_expr(object);
                self.resolve_expr(index);
                self.resolve_expr(value);
            }
            Expr::Array { elements, .. } => {
                for element in elements {
                    self.resolve_expr(element);
                }
            }
            Expr::Dict { pairs, .. } => {
                for (_, value) in pairs {
                    self.resolve_expr(value);
                }
            }
            Expr::Lambda { params, body, .. } => {
                self.resolve_function(params, body, FunctionKind::Lambda);
            }
        }
    }

    fn resolve_function(&mut self, params: &[Parameter], body: &[Stmt], kind: FunctionKind) {
        let enclosing_kind = std::mem::replace(&mut self.function_kind, kind);
        let enclosing_loop = std::mem::replace(&mut self.in_loop, false);

        self.begin_scope();
        for param in params {
            self.declare(&param.name);
            self.define(&param.name);
            if let Some(default) = &param.default {
                self.resolve_expr(default);
            }
        }
        self.resolve_statements(body);
        self.end_scope();

        self.function_kind = enclosing_kind;
        self.in_loop = enclosing_loop;
    }

    // ------------------------------------------------------------------
    // Scope bookkeeping
    // ------------------------------------------------------------------

    fn begin_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    fn end_scope(&mut self) {
        self.scopes.pop();
    }

    /// Marks the name as existing-but-unusable. Globals are not tracked here;
    /// duplicate globals are caught by the environment when defined.
    fn declare(&mut self, name: &Token) {
        let duplicate = self
            .scopes
            .last()
            .map(|scope| scope.contains_key(&name.lexeme))
            .unwrap_or(false);
        if duplicate {
            let message = format!("'{}' is already declared in this scope", name.lexeme);
            self.error(name, message);
            return;
        }
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.lexeme.clone(), false);
        }
    }

    fn define(&mut self, name: &Token) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.lexeme.clone(), true);
        }
    }

    fn resolve_local(&mut self, id: ExprId, name: &Token) {
        for (depth, scope) in self.scopes.iter().rev().enumerate() {
            if scope.contains_key(&name.lexeme) {
                self.locals.insert(id, depth);
                return;
            }
        }
        // Not found: assumed global, resolved dynamically at runtime.
    }

    fn error(&mut self, token: &Token, message: impl Into<String>) {
        self.errors.push(SyntaxError::at_token(token, message));
    }
}

impl Default for Resolver {
    fn default() -> Self {
        Resolver::new()
    }
}
