// ABOUTME: Recursive-descent parser with precedence climbing and panic-mode recovery

use crate::ast::{Argument, Expr, ExprId, Parameter, Stmt};
use crate::error::SyntaxError;
use crate::token::{LiteralValue, Token, TokenKind};
use std::rc::Rc;

/// Upper bound on call arguments and declared parameters.
const MAX_ARITY: usize = 255;

/// Outcome of a parse: the best-effort AST together with every diagnostic.
/// Statements are usable for further analysis even when errors are present,
/// but execution must not start if `errors` is non-empty.
pub struct ParseResult {
    pub statements: Vec<Stmt>,
    pub errors: Vec<SyntaxError>,
    /// First unused expression id; a REPL threads this into the next parse so
    /// resolver annotations from different lines never collide.
    pub next_id: ExprId,
}

pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
    errors: Vec<SyntaxError>,
    next_id: ExprId,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Parser::with_first_id(tokens, 0)
    }

    /// Error tokens were already reported by the lexer; dropping them here
    /// lets the grammar resume at the next well-formed token.
    pub fn with_first_id(tokens: Vec<Token>, first_id: ExprId) -> Self {
        let tokens = tokens
            .into_iter()
            .filter(|t| t.kind != TokenKind::Error)
            .collect();
        Parser {
            tokens,
            current: 0,
            errors: Vec::new(),
            next_id: first_id,
        }
    }

    pub fn parse(mut self) -> ParseResult {
        let mut statements = Vec::new();
        while !self.is_at_end() {
            self.declaration(&mut statements);
        }
        ParseResult {
            statements,
            errors: self.errors,
            next_id: self.next_id,
        }
    }

    // ------------------------------------------------------------------
    // Declarations and statements
    // ------------------------------------------------------------------

    /// Parses one declaration into `out`. Multi-name `var`/`const` forms
    /// expand to several statements, which is why this appends instead of
    /// returning. On a syntax error the parser records it and synchronizes.
    fn declaration(&mut self, out: &mut Vec<Stmt>) {
        let result = if self.matches(&[TokenKind::Var]) {
            self.var_declaration(out)
        } else if self.matches(&[TokenKind::Const]) {
            self.const_declaration(out)
        } else if self.matches(&[TokenKind::Func]) {
            self.function_declaration().map(|s| out.push(s))
        } else if self.matches(&[TokenKind::Enum]) {
            self.enum_declaration().map(|s| out.push(s))
        } else {
            self.statement().map(|s| out.push(s))
        };

        if let Err(err) = result {
            self.errors.push(err);
            self.synchronize();
        }
    }

    /// `var a, b, c [= expr];` — one statement per name, sharing the
    /// initializer expression.
    fn var_declaration(&mut self, out: &mut Vec<Stmt>) -> Result<(), SyntaxError> {
        let names = self.declaration_names()?;
        let initializer = if self.matches(&[TokenKind::Equal]) {
            Some(self.expression()?)
        } else {
            None
        };
        self.end_statement()?;

        for name in names {
            out.push(Stmt::Var {
                name,
                initializer: initializer.clone(),
            });
        }
        Ok(())
    }

    fn const_declaration(&mut self, out: &mut Vec<Stmt>) -> Result<(), SyntaxError> {
        let names = self.declaration_names()?;
        self.consume(TokenKind::Equal, "expected '=' after constant name")?;
        let initializer = self.expression()?;
        self.end_statement()?;

        for name in names {
            out.push(Stmt::Const {
                name,
                initializer: initializer.clone(),
            });
        }
        Ok(())
    }

    fn declaration_names(&mut self) -> Result<Vec<Token>, SyntaxError> {
        let mut names = vec![self.consume(TokenKind::Identifier, "expected a name")?];
        while self.matches(&[TokenKind::Comma]) {
            names.push(self.consume(TokenKind::Identifier, "expected a name after ','")?);
        }
        Ok(names)
    }

    fn function_declaration(&mut self) -> Result<Stmt, SyntaxError> {
        let name = self.consume(TokenKind::Identifier, "expected function name")?;
        let params = self.parameter_list("function")?;
        self.consume(TokenKind::LeftBrace, "expected '{' before function body")?;
        let body = self.block_statements()?;
        Ok(Stmt::Function {
            name,
            params: Rc::new(params),
            body: Rc::new(body),
        })
    }

    /// `(` params `)` with the required-before-optional ordering check and the
    /// arity cap. Ordering and cap violations are recorded without entering
    /// panic mode so the rest of the list still parses.
    fn parameter_list(&mut self, kind: &str) -> Result<Vec<Parameter>, SyntaxError> {
        self.consume(
            TokenKind::LeftParen,
            format!("expected '(' to begin {kind} parameters"),
        )?;
        let mut params: Vec<Parameter> = Vec::new();
        if !self.check(TokenKind::RightParen) {
            loop {
                if params.len() >= MAX_ARITY {
                    let token = self.peek().clone();
                    self.report(SyntaxError::at_token(
                        &token,
                        format!("cannot declare more than {MAX_ARITY} parameters"),
                    ));
                }
                let name = self.consume(TokenKind::Identifier, "expected parameter name")?;
                let param = if self.matches(&[TokenKind::Question]) {
                    Parameter {
                        name,
                        optional: true,
                        default: None,
                    }
                } else if self.matches(&[TokenKind::Equal]) {
                    let default = self.expression()?;
                    Parameter {
                        name,
                        optional: true,
                        default: Some(default),
                    }
                } else {
                    if params.iter().any(|p| p.optional) {
                        self.report(SyntaxError::at_token(
                            &name,
                            "required parameter cannot follow an optional parameter",
                        ));
                    }
                    Parameter {
                        name,
                        optional: false,
                        default: None,
                    }
                };
                params.push(param);
                if !self.matches(&[TokenKind::Comma]) {
                    break;
                }
            }
        }
        self.consume(TokenKind::RightParen, "expected ')' after parameters")?;
        Ok(params)
    }

    fn enum_declaration(&mut self) -> Result<Stmt, SyntaxError> {
        let name = self.consume(TokenKind::Identifier, "expected enum name")?;
        self.consume(TokenKind::LeftBrace, "expected '{' after enum name")?;
        let mut members = Vec::new();
        if !self.check(TokenKind::RightBrace) {
            loop {
                members.push(self.consume(TokenKind::Identifier, "expected enum member name")?);
                if !self.matches(&[TokenKind::Comma]) {
                    break;
                }
            }
        }
        self.consume(TokenKind::RightBrace, "expected '}' after enum members")?;
        Ok(Stmt::Enum { name, members })
    }

    fn statement(&mut self) -> Result<Stmt, SyntaxError> {
        if self.matches(&[TokenKind::LeftBrace]) {
            let statements = self.block_statements()?;
            return Ok(Stmt::Block { statements });
        }
        if self.matches(&[TokenKind::If]) {
            return self.if_statement();
        }
        if self.matches(&[TokenKind::While]) {
            return self.while_statement();
        }
        if self.matches(&[TokenKind::For]) {
            return self.for_statement();
        }
        if self.matches(&[TokenKind::Break]) {
            let keyword = self.previous().clone();
            self.end_statement()?;
            return Ok(Stmt::Break { keyword });
        }
        if self.matches(&[TokenKind::Continue]) {
            let keyword = self.previous().clone();
            self.end_statement()?;
            return Ok(Stmt::Continue { keyword });
        }
        if self.matches(&[TokenKind::Return]) {
            return self.return_statement();
        }

        let expr = self.expression()?;
        self.end_statement()?;
        Ok(Stmt::Expression { expr })
    }

    fn block_statements(&mut self) -> Result<Vec<Stmt>, SyntaxError> {
        let mut statements = Vec::new();
        while !self.check(TokenKind::RightBrace) && !self.is_at_end() {
            self.declaration(&mut statements);
        }
        self.consume(TokenKind::RightBrace, "expected '}' after block")?;
        Ok(statements)
    }

    /// `( expr )` when parenthesized, bare expression otherwise. Parsing the
    /// paren pair here keeps a following parenthesized statement from being
    /// swallowed as a call on the condition.
    fn condition(&mut self) -> Result<Expr, SyntaxError> {
        if self.matches(&[TokenKind::LeftParen]) {
            let inner = self.expression()?;
            self.consume(TokenKind::RightParen, "expected ')' after condition")?;
            return Ok(Expr::Grouping {
                inner: Box::new(inner),
            });
        }
        self.expression()
    }

    fn if_statement(&mut self) -> Result<Stmt, SyntaxError> {
        let condition = self.condition()?;
        let then_branch = Box::new(self.statement()?);
        let else_branch = if self.matches(&[TokenKind::Else]) {
            Some(Box::new(self.statement()?))
        } else {
            None
        };
        Ok(Stmt::If {
            condition,
            then_branch,
            else_branch,
        })
    }

    fn while_statement(&mut self) -> Result<Stmt, SyntaxError> {
        let condition = self.condition()?;
        let body = Box::new(self.statement()?);
        Ok(Stmt::While {
            condition,
            body,
            post: None,
        })
    }

    /// `for (init; cond; step) body` lowers to init + while. The step lands
    /// on the While node's `post` slot so `continue` still reaches it.
    fn for_statement(&mut self) -> Result<Stmt, SyntaxError> {
        self.consume(TokenKind::LeftParen, "expected '(' after 'for'")?;

        let initializer = if self.matches(&[TokenKind::Semicolon]) {
            None
        } else if self.matches(&[TokenKind::Var]) {
            let name = self.consume(TokenKind::Identifier, "expected a name")?;
            if self.check(TokenKind::Comma) {
                return Err(SyntaxError::at_token(
                    self.peek(),
                    "'for' initializer must declare a single variable",
                ));
            }
            let init_expr = if self.matches(&[TokenKind::Equal]) {
                Some(self.expression()?)
            } else {
                None
            };
            self.consume(TokenKind::Semicolon, "expected ';' after 'for' initializer")?;
            Some(Stmt::Var {
                name,
                initializer: init_expr,
            })
        } else {
            let expr = self.expression()?;
            self.consume(TokenKind::Semicolon, "expected ';' after 'for' initializer")?;
            Some(Stmt::Expression { expr })
        };

        let condition = if self.check(TokenKind::Semicolon) {
            Expr::Literal {
                value: LiteralValue::Bool(true),
            }
        } else {
            self.expression()?
        };
        self.consume(TokenKind::Semicolon, "expected ';' after 'for' condition")?;

        let step = if self.check(TokenKind::RightParen) {
            None
        } else {
            Some(self.expression()?)
        };
        self.consume(TokenKind::RightParen, "expected ')' after 'for' clauses")?;

        let body = Box::new(self.statement()?);
        let while_stmt = Stmt::While {
            condition,
            body,
            post: step.map(|expr| Box::new(Stmt::Expression { expr })),
        };

        Ok(match initializer {
            Some(init) => Stmt::Block {
                statements: vec![init, while_stmt],
            },
            None => while_stmt,
        })
    }

    fn return_statement(&mut self) -> Result<Stmt, SyntaxError> {
        let keyword = self.previous().clone();
        let value = if self.check(TokenKind::Semicolon) || self.check(TokenKind::RightBrace) {
            None
        } else {
            Some(self.expression()?)
        };
        self.end_statement()?;
        Ok(Stmt::Return { keyword, value })
    }

    /// Statement terminator: a semicolon, optional when the statement already
    /// ended with `}` (blocks, function literals, and friends).
    fn end_statement(&mut self) -> Result<(), SyntaxError> {
        if self.matches(&[TokenKind::Semicolon]) {
            return Ok(());
        }
        if self.previous().kind == TokenKind::RightBrace {
            return Ok(());
        }
        Err(SyntaxError::at_token(self.peek(), "expected ';' after statement"))
    }

    // ------------------------------------------------------------------
    // Expressions, precedence low to high
    // ------------------------------------------------------------------

    fn expression(&mut self) -> Result<Expr, SyntaxError> {
        self.assignment()
    }

    fn assignment(&mut self) -> Result<Expr, SyntaxError> {
        let expr = self.logic_or()?;

        if self.matches(&[TokenKind::Equal]) {
            let equals = self.previous().clone();
            let value = self.assignment()?;
            return Ok(self.rewrite_assignment(expr, value, &equals));
        }

        if self.matches(&[
            TokenKind::PlusEqual,
            TokenKind::MinusEqual,
            TokenKind::StarEqual,
            TokenKind::SlashEqual,
            TokenKind::PercentEqual,
            TokenKind::StarStarEqual,
        ]) {
            let op = self.previous().clone();
            let rhs = self.assignment()?;
            let binary_kind = match op.kind {
                TokenKind::PlusEqual => TokenKind::Plus,
                TokenKind::MinusEqual => TokenKind::Minus,
                TokenKind::StarEqual => TokenKind::Star,
                TokenKind::SlashEqual => TokenKind::Slash,
                TokenKind::PercentEqual => TokenKind::Percent,
                _ => TokenKind::StarStar,
            };
            let operator = Token::new(binary_kind, op.lexeme.clone(), op.line, op.column, None);
            let value = Expr::Binary {
                left: Box::new(expr.clone()),
                operator,
                right: Box::new(rhs),
            };
            return Ok(self.rewrite_assignment(expr, value, &op));
        }

        Ok(expr)
    }

    /// Rewrites `target = value` into the matching setter node. An invalid
    /// target is reported without entering panic mode; the parse continues
    /// with the untouched expression.
    fn rewrite_assignment(&mut self, target: Expr, value: Expr, equals: &Token) -> Expr {
        match target {
            Expr::Variable { name, .. } => Expr::Assign {
                name,
                value: Box::new(value),
                id: self.fresh_id(),
            },
            Expr::MemberAccess { object, name } => Expr::MemberSet {
                object,
                name,
                value: Box::new(value),
            },
            Expr::Index {
                bracket,
                object,
                index,
            } => Expr::IndexSet {
                bracket,
                object,
                index,
                value: Box::new(value),
            },
            other => {
                self.report(SyntaxError::at_token(equals, "invalid assignment target"));
                other
            }
        }
    }

    fn logic_or(&mut self) -> Result<Expr, SyntaxError> {
        let mut expr = self.logic_and()?;
        while self.matches(&[TokenKind::PipePipe]) {
            let operator = self.previous().clone();
            let right = self.logic_and()?;
            expr = Expr::Logical {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            };
        }
        Ok(expr)
    }

    fn logic_and(&mut self) -> Result<Expr, SyntaxError> {
        let mut expr = self.equality()?;
        while self.matches(&[TokenKind::AmpAmp]) {
            let operator = self.previous().clone();
            let right = self.equality()?;
            expr = Expr::Logical {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            };
        }
        Ok(expr)
    }

    fn equality(&mut self) -> Result<Expr, SyntaxError> {
        let mut expr = self.comparison()?;
        while self.matches(&[TokenKind::EqualEqual, TokenKind::BangEqual]) {
            let operator = self.previous().clone();
            let right = self.comparison()?;
            expr = Expr::Binary {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            };
        }
        Ok(expr)
    }

    fn comparison(&mut self) -> Result<Expr, SyntaxError> {
        let mut expr = self.range()?;
        while self.matches(&[
            TokenKind::Less,
            TokenKind::LessEqual,
            TokenKind::Greater,
            TokenKind::GreaterEqual,
        ]) {
            let operator = self.previous().clone();
            let right = self.range()?;
            expr = Expr::Binary {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            };
        }
        Ok(expr)
    }

    /// `a..b`, non-associative: at most one range operator per level.
    fn range(&mut self) -> Result<Expr, SyntaxError> {
        let expr = self.term()?;
        if self.matches(&[TokenKind::Range]) {
            let operator = self.previous().clone();
            let right = self.term()?;
            return Ok(Expr::Binary {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            });
        }
        Ok(expr)
    }

    fn term(&mut self) -> Result<Expr, SyntaxError> {
        let mut expr = self.factor()?;
        while self.matches(&[TokenKind::Plus, TokenKind::Minus]) {
            let operator = self.previous().clone();
            let right = self.factor()?;
            expr = Expr::Binary {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            };
        }
        Ok(expr)
    }

    fn factor(&mut self) -> Result<Expr, SyntaxError> {
        let mut expr = self.exponent()?;
        while self.matches(&[TokenKind::Star, TokenKind::Slash, TokenKind::Percent]) {
            let operator = self.previous().clone();
            let right = self.exponent()?;
            expr = Expr::Binary {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            };
        }
        Ok(expr)
    }

    /// `**` binds tighter than `* / %` and associates to the right.
    fn exponent(&mut self) -> Result<Expr, SyntaxError> {
        let expr = self.unary()?;
        if self.matches(&[TokenKind::StarStar]) {
            let operator = self.previous().clone();
            let right = self.exponent()?;
            return Ok(Expr::Binary {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            });
        }
        Ok(expr)
    }

    fn unary(&mut self) -> Result<Expr, SyntaxError> {
        if self.matches(&[TokenKind::Bang, TokenKind::Minus]) {
            let operator = self.previous().clone();
            let operand = self.unary()?;
            return Ok(Expr::Unary {
                operator,
                operand: Box::new(operand),
            });
        }
        if self.matches(&[TokenKind::PlusPlus, TokenKind::MinusMinus]) {
            let operator = self.previous().clone();
            let target = self.unary()?;
            return Ok(Expr::DeIncrement {
                operator,
                target: Box::new(target),
                prefix: true,
            });
        }
        if self.matches(&[TokenKind::Fn]) {
            return self.lambda();
        }
        self.postfix()
    }

    fn lambda(&mut self) -> Result<Expr, SyntaxError> {
        let keyword = self.previous().clone();
        let params = self.parameter_list("lambda")?;
        self.consume(TokenKind::LeftBrace, "expected '{' before lambda body")?;
        let body = self.block_statements()?;
        Ok(Expr::Lambda {
            keyword,
            params: Rc::new(params),
            body: Rc::new(body),
        })
    }

    fn postfix(&mut self) -> Result<Expr, SyntaxError> {
        let mut expr = self.primary()?;
        loop {
            if self.matches(&[TokenKind::LeftParen]) {
                expr = self.finish_call(expr)?;
            } else if self.matches(&[TokenKind::LeftBracket]) {
                let bracket = self.previous().clone();
                let index = self.expression()?;
                self.consume(TokenKind::RightBracket, "expected ']' after index")?;
                expr = Expr::Index {
                    bracket,
                    object: Box::new(expr),
                    index: Box::new(index),
                };
            } else if self.matches(&[TokenKind::Dot]) {
                let name = self.consume(TokenKind::Identifier, "expected property name after '.'")?;
                expr = Expr::MemberAccess {
                    object: Box::new(expr),
                    name,
                };
            } else if self.matches(&[TokenKind::PlusPlus, TokenKind::MinusMinus]) {
                let operator = self.previous().clone();
                expr = Expr::DeIncrement {
                    operator,
                    target: Box::new(expr),
                    prefix: false,
                };
            } else {
                break;
            }
        }
        Ok(expr)
    }

    fn finish_call(&mut self, callee: Expr) -> Result<Expr, SyntaxError> {
        let mut args: Vec<Argument> = Vec::new();
        let mut seen_named = false;
        if !self.check(TokenKind::RightParen) {
            loop {
                if args.len() >= MAX_ARITY {
                    let token = self.peek().clone();
                    self.report(SyntaxError::at_token(
                        &token,
                        format!("cannot pass more than {MAX_ARITY} arguments"),
                    ));
                }
                let arg = self.argument()?;
                if arg.name.is_some() {
                    seen_named = true;
                } else if seen_named {
                    self.report(SyntaxError::at_token(
                        self.previous(),
                        "positional argument cannot follow a named argument",
                    ));
                }
                args.push(arg);
                if !self.matches(&[TokenKind::Comma]) {
                    break;
                }
            }
        }
        let paren = self.consume(TokenKind::RightParen, "expected ')' after arguments")?;
        Ok(Expr::Call {
            callee: Box::new(callee),
            paren,
            args,
        })
    }

    /// `IDENT = expr` in argument position is a named argument, never an
    /// assignment expression.
    fn argument(&mut self) -> Result<Argument, SyntaxError> {
        if self.check(TokenKind::Identifier) && self.check_next(TokenKind::Equal) {
            let name = self.advance().clone();
            self.advance(); // consume '='
            let value = self.expression()?;
            return Ok(Argument {
                name: Some(name),
                value,
            });
        }
        let value = self.expression()?;
        Ok(Argument { name: None, value })
    }

    fn primary(&mut self) -> Result<Expr, SyntaxError> {
        if self.matches(&[
            TokenKind::True,
            TokenKind::False,
            TokenKind::Null,
            TokenKind::Int,
            TokenKind::Float,
            TokenKind::Str,
        ]) {
            let token = self.previous();
            let value = token
                .literal
                .clone()
                .unwrap_or(LiteralValue::Null);
            return Ok(Expr::Literal { value });
        }

        if self.matches(&[TokenKind::Identifier]) {
            let name = self.previous().clone();
            let id = self.fresh_id();
            return Ok(Expr::Variable { name, id });
        }

        if self.matches(&[TokenKind::LeftParen]) {
            let inner = self.expression()?;
            self.consume(TokenKind::RightParen, "expected ')' after expression")?;
            return Ok(Expr::Grouping {
                inner: Box::new(inner),
            });
        }

        if self.matches(&[TokenKind::LeftBracket]) {
            return self.array_literal();
        }

        if self.matches(&[TokenKind::LeftBrace]) {
            return self.dict_literal();
        }

        Err(SyntaxError::at_token(self.peek(), "expected expression"))
    }

    fn array_literal(&mut self) -> Result<Expr, SyntaxError> {
        let bracket = self.previous().clone();
        let mut elements = Vec::new();
        if !self.check(TokenKind::RightBracket) {
            loop {
                elements.push(self.expression()?);
                if !self.matches(&[TokenKind::Comma]) {
                    break;
                }
            }
        }
        self.consume(TokenKind::RightBracket, "expected ']' after array elements")?;
        Ok(Expr::Array { bracket, elements })
    }

    /// `{ key: value, ... }` with identifier or string keys. Key uniqueness
    /// and reserved-name checks happen at evaluation time, where the key
    /// string is known.
    fn dict_literal(&mut self) -> Result<Expr, SyntaxError> {
        let brace = self.previous().clone();
        let mut pairs = Vec::new();
        if !self.check(TokenKind::RightBrace) {
            loop {
                let key = if self.check(TokenKind::Identifier) || self.check(TokenKind::Str) {
                    self.advance().clone()
                } else {
                    return Err(SyntaxError::at_token(
                        self.peek(),
                        "expected identifier or string as dictionary key",
                    ));
                };
                self.consume(TokenKind::Colon, "expected ':' after dictionary key")?;
                let value = self.expression()?;
                pairs.push((key, value));
                if !self.matches(&[TokenKind::Comma]) {
                    break;
                }
            }
        }
        self.consume(TokenKind::RightBrace, "expected '}' after dictionary entries")?;
        Ok(Expr::Dict { brace, pairs })
    }

    // ------------------------------------------------------------------
    // Token plumbing
    // ------------------------------------------------------------------

    fn fresh_id(&mut self) -> ExprId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Records a non-fatal diagnostic without entering panic mode.
    fn report(&mut self, error: SyntaxError) {
        self.errors.push(error);
    }

    fn matches(&mut self, kinds: &[TokenKind]) -> bool {
        for kind in kinds {
            if self.check(*kind) {
                self.advance();
                return true;
            }
        }
        false
    }

    fn consume(
        &mut self,
        kind: TokenKind,
        message: impl Into<String>,
    ) -> Result<Token, SyntaxError> {
        if self.check(kind) {
            return Ok(self.advance().clone());
        }
        Err(SyntaxError::at_token(self.peek(), message))
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    fn check_next(&self, kind: TokenKind) -> bool {
        self.tokens
            .get(self.current + 1)
            .map(|t| t.kind == kind)
            .unwrap_or(false)
    }

    fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.previous()
    }

    fn is_at_end(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    fn previous(&self) -> &Token {
        &self.tokens[self.current - 1]
    }

    /// Panic-mode recovery: discard tokens until a likely statement boundary
    /// so one error does not cascade into dozens.
    fn synchronize(&mut self) {
        self.advance();
        while !self.is_at_end() {
            if self.previous().kind == TokenKind::Semicolon {
                return;
            }
            match self.peek().kind {
                TokenKind::Func
                | TokenKind::Var
                | TokenKind::Const
                | TokenKind::For
                | TokenKind::While
                | TokenKind::If
                | TokenKind::Return
                | TokenKind::Enum => return,
                _ => {}
            }
            self.advance();
        }
    }
}
