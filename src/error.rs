// ABOUTME: Error types for lexing, parsing, resolution, and runtime failures

use crate::token::{Token, TokenKind};
use std::fmt;
use thiserror::Error;

/// A front-end diagnostic from the lexer, parser, or resolver.
///
/// These are collected rather than aborting: panic-mode recovery lets a single
/// pass report as many distinct problems as possible.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("[{line}:{column}] Syntax error{}: {message}", if .lexeme.is_empty() { String::new() } else { format!(" at '{}'", .lexeme) })]
pub struct SyntaxError {
    pub line: usize,
    pub column: usize,
    pub lexeme: String,
    pub message: String,
}

impl SyntaxError {
    pub fn new(
        line: usize,
        column: usize,
        lexeme: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        SyntaxError {
            line,
            column,
            lexeme: lexeme.into(),
            message: message.into(),
        }
    }

    /// Diagnostic anchored on a token's position and lexeme.
    pub fn at_token(token: &Token, message: impl Into<String>) -> Self {
        let lexeme = if token.kind == TokenKind::Eof {
            "end".to_string()
        } else {
            token.lexeme.clone()
        };
        SyntaxError::new(token.line, token.column, lexeme, message)
    }
}

/// What went wrong at runtime, without position information.
///
/// Modules that have no token context (the environment chain, the property
/// protocol helpers) return these; the evaluator wraps them into a
/// [`RuntimeError`] carrying the originating token.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ErrorKind {
    #[error("unsupported operand types for '{operator}': {left} and {right}")]
    BadOperands {
        operator: String,
        left: String,
        right: String,
    },

    #[error("unsupported operand type for '{operator}': {operand}")]
    BadOperand { operator: String, operand: String },

    #[error("division by zero")]
    DivisionByZero,

    #[error("string repetition count cannot be negative")]
    NegativeRepeat,

    #[error("undefined name '{0}'")]
    Undefined(String),

    #[error("'{0}' was declared but never initialized")]
    Uninitialized(String),

    #[error("cannot reassign constant '{0}'")]
    ConstReassignment(String),

    #[error("cannot reassign built-in '{0}'")]
    BuiltInReassignment(String),

    #[error("cannot reassign function '{0}'")]
    FunctionReassignment(String),

    #[error("'{0}' is already declared in this scope")]
    AlreadyDeclared(String),

    #[error("{callee} expected {expected} argument{}, got {got}", if .expected == "1" { "" } else { "s" })]
    Arity {
        callee: String,
        expected: String,
        got: usize,
    },

    #[error("value of type {0} is not callable")]
    NotCallable(String),

    #[error("array index out of range: {index} (length {length})")]
    IndexOutOfRange { index: i64, length: usize },

    #[error("array index must be an Int, got {0}")]
    BadIndex(String),

    #[error("cannot index into a value of type {0}")]
    NotIndexable(String),

    #[error("type {type_name} has no property '{property}'")]
    UnknownProperty { type_name: String, property: String },

    #[error("cannot set property '{property}' on a value of type {type_name}")]
    NotSettable { type_name: String, property: String },

    #[error("'{0}' is a reserved dictionary member")]
    ReservedKey(String),

    #[error("duplicate dictionary key '{0}'")]
    DuplicateKey(String),

    #[error("duplicate enum member '{0}'")]
    DuplicateMember(String),

    #[error("{callee} has no parameter named '{name}'")]
    UnknownParameter { callee: String, name: String },

    #[error("parameter '{name}' of {callee} was bound more than once")]
    DuplicateBinding { callee: String, name: String },

    #[error("invalid target for '{0}'")]
    InvalidTarget(String),

    #[error("cannot pop from an empty array")]
    PopFromEmpty,

    #[error("'{builtin}' requires the {flag} permission")]
    PermissionDenied { builtin: String, flag: String },

    #[error("I/O error: {0}")]
    Io(String),
}

impl ErrorKind {
    /// Arity diagnostic naming the expected count (or window) against the
    /// supplied count.
    pub fn arity(callee: impl Into<String>, min: usize, max: usize, got: usize) -> Self {
        let expected = if min == max {
            min.to_string()
        } else {
            format!("{min} to {max}")
        };
        ErrorKind::Arity {
            callee: callee.into(),
            expected,
            got,
        }
    }
}

/// A runtime failure carrying the originating token for source positions.
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeError {
    pub token: Token,
    pub kind: ErrorKind,
}

impl RuntimeError {
    pub fn new(token: &Token, kind: ErrorKind) -> Self {
        RuntimeError {
            token: token.clone(),
            kind,
        }
    }
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}:{}] Runtime error: {}",
            self.token.line, self.token.column, self.kind
        )
    }
}

impl std::error::Error for RuntimeError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_syntax_error_display() {
        let err = SyntaxError::new(3, 14, ";", "expected expression");
        assert_eq!(
            format!("{}", err),
            "[3:14] Syntax error at ';': expected expression"
        );
    }

    #[test]
    fn test_syntax_error_without_lexeme() {
        let err = SyntaxError::new(1, 1, "", "unterminated string");
        assert_eq!(format!("{}", err), "[1:1] Syntax error: unterminated string");
    }

    #[test]
    fn test_arity_singular_and_plural() {
        let one = ErrorKind::arity("print", 1, 1, 3);
        assert_eq!(format!("{}", one), "print expected 1 argument, got 3");

        let window = ErrorKind::arity("greet", 1, 3, 0);
        assert_eq!(
            format!("{}", window),
            "greet expected 1 to 3 arguments, got 0"
        );
    }

    #[test]
    fn test_runtime_error_carries_position() {
        let token = Token::new(TokenKind::Identifier, "k", 2, 5, None);
        let err = RuntimeError::new(&token, ErrorKind::ConstReassignment("k".to_string()));
        let rendered = format!("{}", err);
        assert!(rendered.starts_with("[2:5]"));
        assert!(rendered.contains("constant"));
    }
}
