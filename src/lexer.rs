// ABOUTME: Hand-written scanner converting source text into a token stream

use crate::error::SyntaxError;
use crate::token::{LiteralValue, Token, TokenKind};

/// Scanner over a source string. Produces the full token sequence (terminated
/// by a single EOF token) plus every lexical diagnostic encountered along the
/// way; an invalid character or unterminated literal yields an `Error` token
/// and scanning continues.
pub struct Lexer {
    source: Vec<char>,
    tokens: Vec<Token>,
    errors: Vec<SyntaxError>,
    start: usize,
    current: usize,
    line: usize,
    column: usize,
    start_line: usize,
    start_column: usize,
}

/// Keyword table. Word-form operators map onto the symbolic kinds.
fn keyword_kind(ident: &str) -> Option<TokenKind> {
    let kind = match ident {
        "var" => TokenKind::Var,
        "const" => TokenKind::Const,
        "func" => TokenKind::Func,
        "fn" => TokenKind::Fn,
        "if" => TokenKind::If,
        "else" => TokenKind::Else,
        "while" => TokenKind::While,
        "for" => TokenKind::For,
        "break" => TokenKind::Break,
        "continue" => TokenKind::Continue,
        "return" => TokenKind::Return,
        "true" => TokenKind::True,
        "false" => TokenKind::False,
        "null" => TokenKind::Null,
        "enum" => TokenKind::Enum,
        "in" => TokenKind::In,
        "is" => TokenKind::Is,
        "as" => TokenKind::As,
        "and" => TokenKind::AmpAmp,
        "or" => TokenKind::PipePipe,
        "not" => TokenKind::Bang,
        "equals" => TokenKind::EqualEqual,
        _ => return None,
    };
    Some(kind)
}

impl Lexer {
    pub fn new(source: &str) -> Self {
        Lexer {
            source: source.chars().collect(),
            tokens: Vec::new(),
            errors: Vec::new(),
            start: 0,
            current: 0,
            line: 1,
            column: 1,
            start_line: 1,
            start_column: 1,
        }
    }

    /// Consume the whole source and return the token stream with diagnostics.
    pub fn scan_tokens(mut self) -> (Vec<Token>, Vec<SyntaxError>) {
        while !self.is_at_end() {
            self.start = self.current;
            self.start_line = self.line;
            self.start_column = self.column;
            self.scan_token();
        }

        self.tokens
            .push(Token::new(TokenKind::Eof, "", self.line, self.column, None));
        (self.tokens, self.errors)
    }

    fn scan_token(&mut self) {
        let c = self.advance();
        match c {
            ' ' | '\t' | '\r' | '\n' => {}

            '(' => self.add_token(TokenKind::LeftParen),
            ')' => self.add_token(TokenKind::RightParen),
            '{' => self.add_token(TokenKind::LeftBrace),
            '}' => self.add_token(TokenKind::RightBrace),
            '[' => self.add_token(TokenKind::LeftBracket),
            ']' => self.add_token(TokenKind::RightBracket),
            ':' => self.add_token(TokenKind::Colon),
            ';' => self.add_token(TokenKind::Semicolon),
            ',' => self.add_token(TokenKind::Comma),
            '?' => self.add_token(TokenKind::Question),
            '^' => self.add_token(TokenKind::Caret),
            '~' => self.add_token(TokenKind::Tilde),

            '.' => {
                if self.matches('.') {
                    self.add_token(TokenKind::Range);
                } else if self.peek().is_ascii_digit() {
                    self.number_from_dot();
                } else {
                    self.add_token(TokenKind::Dot);
                }
            }

            '+' => {
                if self.matches('+') {
                    self.add_token(TokenKind::PlusPlus);
                } else if self.matches('=') {
                    self.add_token(TokenKind::PlusEqual);
                } else {
                    self.add_token(TokenKind::Plus);
                }
            }
            '-' => {
                if self.matches('-') {
                    self.add_token(TokenKind::MinusMinus);
                } else if self.matches('=') {
                    self.add_token(TokenKind::MinusEqual);
                } else if self.matches('>') {
                    self.add_token(TokenKind::Arrow);
                } else {
                    self.add_token(TokenKind::Minus);
                }
            }
            '*' => {
                if self.matches('*') {
                    if self.matches('=') {
                        self.add_token(TokenKind::StarStarEqual);
                    } else {
                        self.add_token(TokenKind::StarStar);
                    }
                } else if self.matches('=') {
                    self.add_token(TokenKind::StarEqual);
                } else {
                    self.add_token(TokenKind::Star);
                }
            }
            '%' => {
                if self.matches('=') {
                    self.add_token(TokenKind::PercentEqual);
                } else {
                    self.add_token(TokenKind::Percent);
                }
            }
            '/' => {
                if self.matches('/') {
                    while self.peek() != '\n' && !self.is_at_end() {
                        self.advance();
                    }
                } else if self.matches('*') {
                    self.block_comment();
                } else if self.matches('=') {
                    self.add_token(TokenKind::SlashEqual);
                } else {
                    self.add_token(TokenKind::Slash);
                }
            }

            '=' => {
                if self.matches('=') {
                    self.add_token(TokenKind::EqualEqual);
                } else {
                    self.add_token(TokenKind::Equal);
                }
            }
            '!' => {
                if self.matches('=') {
                    self.add_token(TokenKind::BangEqual);
                } else {
                    self.add_token(TokenKind::Bang);
                }
            }
            '<' => {
                if self.matches('=') {
                    self.add_token(TokenKind::LessEqual);
                } else if self.matches('<') {
                    self.add_token(TokenKind::ShiftLeft);
                } else {
                    self.add_token(TokenKind::Less);
                }
            }
            '>' => {
                if self.matches('=') {
                    self.add_token(TokenKind::GreaterEqual);
                } else if self.matches('>') {
                    self.add_token(TokenKind::ShiftRight);
                } else {
                    self.add_token(TokenKind::Greater);
                }
            }
            '&' => {
                if self.matches('&') {
                    self.add_token(TokenKind::AmpAmp);
                } else {
                    self.add_token(TokenKind::Amp);
                }
            }
            '|' => {
                if self.matches('|') {
                    self.add_token(TokenKind::PipePipe);
                } else {
                    self.add_token(TokenKind::Pipe);
                }
            }

            '"' => self.string(),

            c if c.is_ascii_digit() => self.number(),
            c if c.is_ascii_alphabetic() || c == '_' => self.identifier(),

            c => self.error_token(format!("unexpected character '{c}'")),
        }
    }

    // ------------------------------------------------------------------
    // Literals
    // ------------------------------------------------------------------

    fn string(&mut self) {
        let mut value = String::new();
        loop {
            if self.is_at_end() {
                self.error_token("unterminated string".to_string());
                return;
            }
            match self.advance() {
                '"' => break,
                '\\' => {
                    if self.is_at_end() {
                        self.error_token("unterminated string".to_string());
                        return;
                    }
                    let escaped = self.advance();
                    value.push(match escaped {
                        'n' => '\n',
                        't' => '\t',
                        'r' => '\r',
                        'b' => '\u{0008}',
                        '\\' => '\\',
                        '"' => '"',
                        other => other,
                    });
                }
                c => value.push(c),
            }
        }
        self.add_literal_token(TokenKind::Str, LiteralValue::Str(value));
    }

    fn number(&mut self) {
        // Prefixed integers: 0x.., 0o.., 0b..
        if self.source[self.start] == '0' && matches!(self.peek(), 'x' | 'o' | 'b') {
            let radix = match self.advance() {
                'x' => 16,
                'o' => 8,
                _ => 2,
            };
            while self.peek().is_ascii_alphanumeric() || self.peek() == '_' {
                self.advance();
            }
            let digits: String = self.source[self.start + 2..self.current]
                .iter()
                .filter(|c| **c != '_')
                .collect();
            match i64::from_str_radix(&digits, radix) {
                Ok(n) => self.add_literal_token(TokenKind::Int, LiteralValue::Int(n)),
                Err(_) => self.error_token(format!(
                    "invalid base-{radix} integer literal '{}'",
                    self.current_lexeme()
                )),
            }
            return;
        }

        while self.peek().is_ascii_digit() || self.peek() == '_' {
            self.advance();
        }

        // A '.' continues the literal only when followed by a digit; `1..5`
        // must lex as Int, Range, Int.
        let mut is_float = false;
        if self.peek() == '.' && self.peek_next().is_ascii_digit() {
            is_float = true;
            self.advance();
            while self.peek().is_ascii_digit() || self.peek() == '_' {
                self.advance();
            }
        }

        self.finish_number(is_float);
    }

    /// A float written with a leading dot, like `.5`. The dot is already
    /// consumed.
    fn number_from_dot(&mut self) {
        while self.peek().is_ascii_digit() || self.peek() == '_' {
            self.advance();
        }
        self.finish_number(true);
    }

    fn finish_number(&mut self, is_float: bool) {
        let digits: String = self
            .current_lexeme()
            .chars()
            .filter(|c| *c != '_')
            .collect();
        if is_float {
            match digits.parse::<f64>() {
                Ok(f) => self.add_literal_token(TokenKind::Float, LiteralValue::Float(f)),
                Err(_) => self.error_token(format!(
                    "invalid float literal '{}'",
                    self.current_lexeme()
                )),
            }
        } else {
            match digits.parse::<i64>() {
                Ok(n) => self.add_literal_token(TokenKind::Int, LiteralValue::Int(n)),
                Err(_) => self.error_token(format!(
                    "integer literal '{}' out of range",
                    self.current_lexeme()
                )),
            }
        }
    }

    fn identifier(&mut self) {
        while self.peek().is_ascii_alphanumeric() || self.peek() == '_' {
            self.advance();
        }
        let lexeme = self.current_lexeme();
        match keyword_kind(&lexeme) {
            Some(TokenKind::True) => self.add_literal_token(TokenKind::True, LiteralValue::Bool(true)),
            Some(TokenKind::False) => {
                self.add_literal_token(TokenKind::False, LiteralValue::Bool(false))
            }
            Some(TokenKind::Null) => self.add_literal_token(TokenKind::Null, LiteralValue::Null),
            Some(kind) => self.add_token(kind),
            None => self.add_token(TokenKind::Identifier),
        }
    }

    fn block_comment(&mut self) {
        // Non-nesting: the first */ closes the comment.
        loop {
            if self.is_at_end() {
                self.error_token("unterminated block comment".to_string());
                return;
            }
            if self.advance() == '*' && self.peek() == '/' {
                self.advance();
                return;
            }
        }
    }

    // ------------------------------------------------------------------
    // Cursor primitives
    // ------------------------------------------------------------------

    fn is_at_end(&self) -> bool {
        self.current >= self.source.len()
    }

    fn advance(&mut self) -> char {
        let c = self.source[self.current];
        self.current += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        c
    }

    fn matches(&mut self, expected: char) -> bool {
        if self.is_at_end() || self.source[self.current] != expected {
            return false;
        }
        self.advance();
        true
    }

    fn peek(&self) -> char {
        if self.is_at_end() {
            '\0'
        } else {
            self.source[self.current]
        }
    }

    fn peek_next(&self) -> char {
        if self.current + 1 >= self.source.len() {
            '\0'
        } else {
            self.source[self.current + 1]
        }
    }

    fn current_lexeme(&self) -> String {
        self.source[self.start..self.current].iter().collect()
    }

    fn add_token(&mut self, kind: TokenKind) {
        let lexeme = self.current_lexeme();
        self.tokens.push(Token::new(
            kind,
            lexeme,
            self.start_line,
            self.start_column,
            None,
        ));
    }

    fn add_literal_token(&mut self, kind: TokenKind, literal: LiteralValue) {
        let lexeme = self.current_lexeme();
        self.tokens.push(Token::new(
            kind,
            lexeme,
            self.start_line,
            self.start_column,
            Some(literal),
        ));
    }

    /// Record a diagnostic and emit an `Error` token so the stream stays
    /// aligned with the source; scanning continues afterwards.
    fn error_token(&mut self, message: String) {
        let lexeme = self.current_lexeme();
        self.errors.push(SyntaxError::new(
            self.start_line,
            self.start_column,
            lexeme.clone(),
            message,
        ));
        self.tokens.push(Token::new(
            TokenKind::Error,
            lexeme,
            self.start_line,
            self.start_column,
            None,
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        let (tokens, errors) = Lexer::new(source).scan_tokens();
        assert!(errors.is_empty(), "unexpected errors: {:?}", errors);
        tokens.into_iter().map(|t| t.kind).collect()
    }

    fn literals(source: &str) -> Vec<LiteralValue> {
        let (tokens, errors) = Lexer::new(source).scan_tokens();
        assert!(errors.is_empty(), "unexpected errors: {:?}", errors);
        tokens.into_iter().filter_map(|t| t.literal).collect()
    }

    #[test]
    fn test_maximal_munch() {
        assert_eq!(
            kinds("** * == = .. . -> - ++ + **="),
            vec![
                TokenKind::StarStar,
                TokenKind::Star,
                TokenKind::EqualEqual,
                TokenKind::Equal,
                TokenKind::Range,
                TokenKind::Dot,
                TokenKind::Arrow,
                TokenKind::Minus,
                TokenKind::PlusPlus,
                TokenKind::Plus,
                TokenKind::StarStarEqual,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_integer_range_does_not_lex_as_float() {
        assert_eq!(
            kinds("1..5"),
            vec![
                TokenKind::Int,
                TokenKind::Range,
                TokenKind::Int,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_numeric_literals() {
        assert_eq!(
            literals("42 1_000_000 3.14 .5 0xff 0o17 0b1010"),
            vec![
                LiteralValue::Int(42),
                LiteralValue::Int(1_000_000),
                LiteralValue::Float(3.14),
                LiteralValue::Float(0.5),
                LiteralValue::Int(255),
                LiteralValue::Int(15),
                LiteralValue::Int(10),
            ]
        );
    }

    #[test]
    fn test_string_escapes() {
        assert_eq!(
            literals(r#""a\nb\t\"c\"\\""#),
            vec![LiteralValue::Str("a\nb\t\"c\"\\".to_string())]
        );
    }

    #[test]
    fn test_unterminated_string_reports_error() {
        let (tokens, errors) = Lexer::new("\"abc").scan_tokens();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("unterminated string"));
        assert_eq!(tokens[0].kind, TokenKind::Error);
        assert_eq!(tokens.last().map(|t| t.kind), Some(TokenKind::Eof));
    }

    #[test]
    fn test_comments_are_skipped() {
        assert_eq!(
            kinds("1 // line\n/* block\nstill block */ 2"),
            vec![TokenKind::Int, TokenKind::Int, TokenKind::Eof]
        );
    }

    #[test]
    fn test_keywords_and_word_operators() {
        assert_eq!(
            kinds("var const func fn enum and or not equals in is as"),
            vec![
                TokenKind::Var,
                TokenKind::Const,
                TokenKind::Func,
                TokenKind::Fn,
                TokenKind::Enum,
                TokenKind::AmpAmp,
                TokenKind::PipePipe,
                TokenKind::Bang,
                TokenKind::EqualEqual,
                TokenKind::In,
                TokenKind::Is,
                TokenKind::As,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_invalid_character_continues() {
        let (tokens, errors) = Lexer::new("1 @ 2").scan_tokens();
        assert_eq!(errors.len(), 1);
        let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Int,
                TokenKind::Error,
                TokenKind::Int,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_position_round_trip() {
        let source = "var x = 10;\n  x += 2;\n";
        let lines: Vec<&str> = source.lines().collect();
        let (tokens, errors) = Lexer::new(source).scan_tokens();
        assert!(errors.is_empty());
        for token in &tokens {
            if token.kind == TokenKind::Eof {
                continue;
            }
            let line = lines[token.line - 1];
            let chars: Vec<char> = line.chars().collect();
            let from = token.column - 1;
            let slice: String = chars[from..from + token.lexeme.chars().count()]
                .iter()
                .collect();
            assert_eq!(slice, token.lexeme, "mismatch for {:?}", token);
        }
    }

    #[test]
    fn test_bool_and_null_payloads() {
        assert_eq!(
            literals("true false null"),
            vec![
                LiteralValue::Bool(true),
                LiteralValue::Bool(false),
                LiteralValue::Null,
            ]
        );
    }
}
