//! Lexer (tokenizer) for the C subset
//!
//! Converts raw source text into [`Token`]s, one at a time.  The parser pulls
//! tokens on demand via [`Lexer::next_token`] rather than tokenizing the whole
//! input up front, so a lexical error surfaces exactly when the parse reaches
//! the malformed text.

use std::fmt;
use thiserror::Error;

/// Source position (1-based line and column) attached to every token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub line: usize,
    pub column: usize,
}

impl Span {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// All token variants produced by the lexer.
///
/// Every variant carries a [`Span`] so that parse errors can report an
/// accurate line and column without a separate token→span table.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Literals
    IntLiteral(i32, Span),
    FloatLiteral(f64, Span),
    CharLiteral(i8, Span),
    StringLiteral(String, Span),

    // Identifiers
    Ident(String, Span),

    // Keywords
    Int(Span),
    Float(Span),
    Char(Span),
    Void(Span),
    Const(Span),
    If(Span),
    Else(Span),
    While(Span),
    For(Span),

    // Arithmetic
    Plus(Span),    // +
    Minus(Span),   // -
    Star(Span),    // *
    Slash(Span),   // /
    Percent(Span), // %

    // Comparison
    EqEq(Span),  // ==
    NotEq(Span), // !=
    Lt(Span),    // <
    Le(Span),    // <=
    Gt(Span),    // >
    Ge(Span),    // >=

    // Logical
    AndAnd(Span), // &&
    OrOr(Span),   // ||
    Bang(Span),   // !

    // Address-of
    Amp(Span), // &

    // Assignment
    Eq(Span), // =

    // Punctuation
    LParen(Span),    // (
    RParen(Span),    // )
    LBrace(Span),    // {
    RBrace(Span),    // }
    LBracket(Span),  // [
    RBracket(Span),  // ]
    Semicolon(Span), // ;
    Comma(Span),     // ,

    // End of input
    Eof(Span),
}

impl Token {
    /// Returns the source span where this token starts.
    pub fn span(&self) -> Span {
        match self {
            Token::IntLiteral(_, span)
            | Token::FloatLiteral(_, span)
            | Token::CharLiteral(_, span)
            | Token::StringLiteral(_, span)
            | Token::Ident(_, span)
            | Token::Int(span)
            | Token::Float(span)
            | Token::Char(span)
            | Token::Void(span)
            | Token::Const(span)
            | Token::If(span)
            | Token::Else(span)
            | Token::While(span)
            | Token::For(span)
            | Token::Plus(span)
            | Token::Minus(span)
            | Token::Star(span)
            | Token::Slash(span)
            | Token::Percent(span)
            | Token::EqEq(span)
            | Token::NotEq(span)
            | Token::Lt(span)
            | Token::Le(span)
            | Token::Gt(span)
            | Token::Ge(span)
            | Token::AndAnd(span)
            | Token::OrOr(span)
            | Token::Bang(span)
            | Token::Amp(span)
            | Token::Eq(span)
            | Token::LParen(span)
            | Token::RParen(span)
            | Token::LBrace(span)
            | Token::RBrace(span)
            | Token::LBracket(span)
            | Token::RBracket(span)
            | Token::Semicolon(span)
            | Token::Comma(span)
            | Token::Eof(span) => *span,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::IntLiteral(n, _) => write!(f, "int literal {}", n),
            Token::FloatLiteral(x, _) => write!(f, "float literal {}", x),
            Token::CharLiteral(c, _) => {
                let byte = *c as u8;
                if byte.is_ascii_graphic() || byte == b' ' {
                    write!(f, "char literal '{}'", byte as char)
                } else {
                    write!(f, "char literal '\\x{:02x}'", byte)
                }
            }
            Token::StringLiteral(s, _) => write!(f, "string literal \"{}\"", s),
            Token::Ident(s, _) => write!(f, "identifier '{}'", s),
            Token::Int(_) => write!(f, "'int'"),
            Token::Float(_) => write!(f, "'float'"),
            Token::Char(_) => write!(f, "'char'"),
            Token::Void(_) => write!(f, "'void'"),
            Token::Const(_) => write!(f, "'const'"),
            Token::If(_) => write!(f, "'if'"),
            Token::Else(_) => write!(f, "'else'"),
            Token::While(_) => write!(f, "'while'"),
            Token::For(_) => write!(f, "'for'"),
            Token::Plus(_) => write!(f, "'+'"),
            Token::Minus(_) => write!(f, "'-'"),
            Token::Star(_) => write!(f, "'*'"),
            Token::Slash(_) => write!(f, "'/'"),
            Token::Percent(_) => write!(f, "'%'"),
            Token::EqEq(_) => write!(f, "'=='"),
            Token::NotEq(_) => write!(f, "'!='"),
            Token::Lt(_) => write!(f, "'<'"),
            Token::Le(_) => write!(f, "'<='"),
            Token::Gt(_) => write!(f, "'>'"),
            Token::Ge(_) => write!(f, "'>='"),
            Token::AndAnd(_) => write!(f, "'&&'"),
            Token::OrOr(_) => write!(f, "'||'"),
            Token::Bang(_) => write!(f, "'!'"),
            Token::Amp(_) => write!(f, "'&'"),
            Token::Eq(_) => write!(f, "'='"),
            Token::LParen(_) => write!(f, "'('"),
            Token::RParen(_) => write!(f, "')'"),
            Token::LBrace(_) => write!(f, "'{{'"),
            Token::RBrace(_) => write!(f, "'}}'"),
            Token::LBracket(_) => write!(f, "'['"),
            Token::RBracket(_) => write!(f, "']'"),
            Token::Semicolon(_) => write!(f, "';'"),
            Token::Comma(_) => write!(f, "','"),
            Token::Eof(_) => write!(f, "end of input"),
        }
    }
}

/// Lexical errors: malformed source text detected before any token boundary
/// is established.  Distinct from the parser's "unexpected token" errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LexError {
    #[error("unterminated string literal at {0}")]
    UnterminatedString(Span),

    #[error("unterminated character literal at {0}")]
    UnterminatedChar(Span),

    #[error("unterminated block comment at {0}")]
    UnterminatedComment(Span),

    #[error("unknown escape sequence '\\{escape}' at {span}")]
    UnknownEscape { escape: char, span: Span },

    #[error("invalid integer literal '{text}' at {span}")]
    InvalidIntLiteral { text: String, span: Span },

    #[error("invalid float literal '{text}' at {span}")]
    InvalidFloatLiteral { text: String, span: Span },

    #[error("invalid hex escape sequence '\\x{text}' at {span}")]
    InvalidHexEscape { text: String, span: Span },

    #[error("unexpected character '{ch}' at {span}")]
    UnexpectedChar { ch: char, span: Span },
}

impl LexError {
    /// Returns the source span where the error occurred.
    pub fn span(&self) -> Span {
        match self {
            LexError::UnterminatedString(span)
            | LexError::UnterminatedChar(span)
            | LexError::UnterminatedComment(span)
            | LexError::UnknownEscape { span, .. }
            | LexError::InvalidIntLiteral { span, .. }
            | LexError::InvalidFloatLiteral { span, .. }
            | LexError::InvalidHexEscape { span, .. }
            | LexError::UnexpectedChar { span, .. } => *span,
        }
    }
}

/// Pull-based lexer over an owned character buffer.
///
/// Independent instances over the same input produce identical token
/// sequences; there is no state outside the struct.
pub struct Lexer {
    input: Vec<char>,
    position: usize,
    line: usize,
    column: usize,
}

impl Lexer {
    /// Create a new lexer for the given source string.
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
            line: 1,
            column: 1,
        }
    }

    /// Produce the next token, skipping whitespace and comments.
    ///
    /// Once the input is exhausted every further call returns [`Token::Eof`].
    pub fn next_token(&mut self) -> Result<Token, LexError> {
        self.skip_whitespace_and_comments()?;

        let span = self.current_span();
        let ch = match self.advance() {
            Some(ch) => ch,
            None => return Ok(Token::Eof(span)),
        };

        match ch {
            '"' => self.string_literal(span),
            '\'' => self.char_literal(span),
            '0'..='9' => self.number_literal(ch, span),
            'a'..='z' | 'A'..='Z' | '_' => Ok(self.identifier_or_keyword(ch, span)),

            '+' => Ok(Token::Plus(span)),
            '-' => Ok(Token::Minus(span)),
            '*' => Ok(Token::Star(span)),
            '/' => Ok(Token::Slash(span)),
            '%' => Ok(Token::Percent(span)),
            '=' => {
                if self.peek() == Some('=') {
                    self.advance();
                    Ok(Token::EqEq(span))
                } else {
                    Ok(Token::Eq(span))
                }
            }
            '!' => {
                if self.peek() == Some('=') {
                    self.advance();
                    Ok(Token::NotEq(span))
                } else {
                    Ok(Token::Bang(span))
                }
            }
            '<' => {
                if self.peek() == Some('=') {
                    self.advance();
                    Ok(Token::Le(span))
                } else {
                    Ok(Token::Lt(span))
                }
            }
            '>' => {
                if self.peek() == Some('=') {
                    self.advance();
                    Ok(Token::Ge(span))
                } else {
                    Ok(Token::Gt(span))
                }
            }
            '&' => {
                if self.peek() == Some('&') {
                    self.advance();
                    Ok(Token::AndAnd(span))
                } else {
                    Ok(Token::Amp(span))
                }
            }
            '|' => {
                if self.peek() == Some('|') {
                    self.advance();
                    Ok(Token::OrOr(span))
                } else {
                    Err(LexError::UnexpectedChar { ch, span })
                }
            }
            '(' => Ok(Token::LParen(span)),
            ')' => Ok(Token::RParen(span)),
            '{' => Ok(Token::LBrace(span)),
            '}' => Ok(Token::RBrace(span)),
            '[' => Ok(Token::LBracket(span)),
            ']' => Ok(Token::RBracket(span)),
            ';' => Ok(Token::Semicolon(span)),
            ',' => Ok(Token::Comma(span)),

            _ => Err(LexError::UnexpectedChar { ch, span }),
        }
    }

    /// Parse string literal (opening quote already consumed)
    fn string_literal(&mut self, span: Span) -> Result<Token, LexError> {
        let mut string = String::new();

        while let Some(ch) = self.peek() {
            if ch == '"' {
                self.advance(); // consume closing quote
                return Ok(Token::StringLiteral(string, span));
            }

            if ch == '\\' {
                self.advance();
                let escaped = self
                    .advance()
                    .ok_or(LexError::UnterminatedString(span))?;
                string.push(self.unescape(escaped, span)?);
            } else {
                string.push(ch);
                self.advance();
            }
        }

        Err(LexError::UnterminatedString(span))
    }

    /// Parse character literal (opening quote already consumed)
    fn char_literal(&mut self, span: Span) -> Result<Token, LexError> {
        let ch = self.advance().ok_or(LexError::UnterminatedChar(span))?;

        let value = if ch == '\\' {
            let escaped = self.advance().ok_or(LexError::UnterminatedChar(span))?;
            if escaped == 'x' {
                // Hex escape: \xHH
                let hex1 = self.advance().ok_or(LexError::UnterminatedChar(span))?;
                let hex2 = self.advance().ok_or(LexError::UnterminatedChar(span))?;
                let hex_str = format!("{}{}", hex1, hex2);
                u8::from_str_radix(&hex_str, 16)
                    .map(|v| v as i8)
                    .map_err(|_| LexError::InvalidHexEscape {
                        text: hex_str,
                        span,
                    })?
            } else {
                self.unescape(escaped, span)? as i8
            }
        } else {
            ch as i8
        };

        if self.advance() != Some('\'') {
            return Err(LexError::UnterminatedChar(span));
        }

        Ok(Token::CharLiteral(value, span))
    }

    /// Resolve a single-character escape sequence.
    fn unescape(&self, escaped: char, span: Span) -> Result<char, LexError> {
        match escaped {
            'n' => Ok('\n'),
            't' => Ok('\t'),
            'r' => Ok('\r'),
            '\\' => Ok('\\'),
            '"' => Ok('"'),
            '\'' => Ok('\''),
            '0' => Ok('\0'),
            _ => Err(LexError::UnknownEscape {
                escape: escaped,
                span,
            }),
        }
    }

    /// Parse numeric literal: a digit run, optionally with a decimal point
    fn number_literal(&mut self, first_digit: char, span: Span) -> Result<Token, LexError> {
        let mut num_str = String::new();
        num_str.push(first_digit);

        while let Some(ch) = self.peek() {
            if ch.is_ascii_digit() {
                num_str.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        // A '.' followed by a digit makes this a float literal
        if self.peek() == Some('.')
            && self
                .peek_ahead(1)
                .map(|c| c.is_ascii_digit())
                .unwrap_or(false)
        {
            num_str.push('.');
            self.advance();
            while let Some(ch) = self.peek() {
                if ch.is_ascii_digit() {
                    num_str.push(ch);
                    self.advance();
                } else {
                    break;
                }
            }

            let value = num_str
                .parse::<f64>()
                .map_err(|_| LexError::InvalidFloatLiteral {
                    text: num_str.clone(),
                    span,
                })?;
            return Ok(Token::FloatLiteral(value, span));
        }

        let value = num_str
            .parse::<i32>()
            .map_err(|_| LexError::InvalidIntLiteral {
                text: num_str.clone(),
                span,
            })?;

        Ok(Token::IntLiteral(value, span))
    }

    /// Parse identifier or keyword (first character already consumed)
    fn identifier_or_keyword(&mut self, first_char: char, span: Span) -> Token {
        let mut ident = String::new();
        ident.push(first_char);

        while let Some(ch) = self.peek() {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                ident.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        match ident.as_str() {
            "int" => Token::Int(span),
            "float" => Token::Float(span),
            "char" => Token::Char(span),
            "void" => Token::Void(span),
            "const" => Token::Const(span),
            "if" => Token::If(span),
            "else" => Token::Else(span),
            "while" => Token::While(span),
            "for" => Token::For(span),
            _ => Token::Ident(ident, span),
        }
    }

    /// Skip whitespace and comments
    fn skip_whitespace_and_comments(&mut self) -> Result<(), LexError> {
        loop {
            match self.peek() {
                Some(' ') | Some('\t') | Some('\r') | Some('\n') => {
                    self.advance();
                }
                Some('/') => {
                    if self.peek_ahead(1) == Some('/') {
                        self.skip_line_comment();
                    } else if self.peek_ahead(1) == Some('*') {
                        self.skip_block_comment()?;
                    } else {
                        break;
                    }
                }
                _ => break,
            }
        }
        Ok(())
    }

    /// Skip single-line comment (// ...)
    fn skip_line_comment(&mut self) {
        while let Some(ch) = self.peek() {
            self.advance();
            if ch == '\n' {
                break;
            }
        }
    }

    /// Skip multi-line comment (/* ... */)
    fn skip_block_comment(&mut self) -> Result<(), LexError> {
        let start = self.current_span();
        self.advance(); // skip '/'
        self.advance(); // skip '*'

        while !self.is_at_end() {
            if self.peek() == Some('*') && self.peek_ahead(1) == Some('/') {
                self.advance(); // skip '*'
                self.advance(); // skip '/'
                return Ok(());
            }
            self.advance();
        }

        Err(LexError::UnterminatedComment(start))
    }

    /// Peek at current character without consuming
    fn peek(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    /// Peek ahead n characters
    fn peek_ahead(&self, n: usize) -> Option<char> {
        self.input.get(self.position + n).copied()
    }

    /// Advance to next character, tracking line and column
    fn advance(&mut self) -> Option<char> {
        let ch = self.input.get(self.position).copied()?;
        self.position += 1;

        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }

        Some(ch)
    }

    /// Check if at end of input
    fn is_at_end(&self) -> bool {
        self.position >= self.input.len()
    }

    /// Current source span
    fn current_span(&self) -> Span {
        Span::new(self.line, self.column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(source: &str) -> Vec<Token> {
        let mut lexer = Lexer::new(source);
        let mut tokens = Vec::new();
        loop {
            let token = lexer.next_token().unwrap();
            let done = matches!(token, Token::Eof(_));
            tokens.push(token);
            if done {
                break;
            }
        }
        tokens
    }

    #[test]
    fn test_simple_tokens() {
        let tokens = collect("int x = 0;");

        assert!(matches!(tokens[0], Token::Int(_)));
        assert!(matches!(tokens[1], Token::Ident(ref s, _) if s == "x"));
        assert!(matches!(tokens[2], Token::Eq(_)));
        assert!(matches!(tokens[3], Token::IntLiteral(0, _)));
        assert!(matches!(tokens[4], Token::Semicolon(_)));
        assert!(matches!(tokens[5], Token::Eof(_)));
    }

    #[test]
    fn test_operators() {
        let tokens = collect("== != <= >= && || < > ! & =");

        assert!(matches!(tokens[0], Token::EqEq(_)));
        assert!(matches!(tokens[1], Token::NotEq(_)));
        assert!(matches!(tokens[2], Token::Le(_)));
        assert!(matches!(tokens[3], Token::Ge(_)));
        assert!(matches!(tokens[4], Token::AndAnd(_)));
        assert!(matches!(tokens[5], Token::OrOr(_)));
        assert!(matches!(tokens[6], Token::Lt(_)));
        assert!(matches!(tokens[7], Token::Gt(_)));
        assert!(matches!(tokens[8], Token::Bang(_)));
        assert!(matches!(tokens[9], Token::Amp(_)));
        assert!(matches!(tokens[10], Token::Eq(_)));
    }

    #[test]
    fn test_keywords() {
        let tokens = collect("if else while for const void float iffy");

        assert!(matches!(tokens[0], Token::If(_)));
        assert!(matches!(tokens[1], Token::Else(_)));
        assert!(matches!(tokens[2], Token::While(_)));
        assert!(matches!(tokens[3], Token::For(_)));
        assert!(matches!(tokens[4], Token::Const(_)));
        assert!(matches!(tokens[5], Token::Void(_)));
        assert!(matches!(tokens[6], Token::Float(_)));
        assert!(matches!(tokens[7], Token::Ident(ref s, _) if s == "iffy"));
    }

    #[test]
    fn test_float_literal() {
        let tokens = collect("3.25 7");

        assert!(matches!(tokens[0], Token::FloatLiteral(x, _) if (x - 3.25).abs() < 1e-9));
        assert!(matches!(tokens[1], Token::IntLiteral(7, _)));
    }

    #[test]
    fn test_comments() {
        let tokens = collect("int x; // comment\nint y; /* block\ncomment */ int z;");

        assert!(matches!(tokens[0], Token::Int(_)));
        assert!(matches!(tokens[1], Token::Ident(ref s, _) if s == "x"));
        assert!(matches!(tokens[2], Token::Semicolon(_)));
        assert!(matches!(tokens[3], Token::Int(_)));
        assert!(matches!(tokens[4], Token::Ident(ref s, _) if s == "y"));
        assert!(matches!(tokens[5], Token::Semicolon(_)));
        assert!(matches!(tokens[6], Token::Int(_)));
        assert!(matches!(tokens[7], Token::Ident(ref s, _) if s == "z"));
    }

    #[test]
    fn test_string_literal() {
        let tokens = collect(r#""hello\nworld""#);

        match &tokens[0] {
            Token::StringLiteral(s, _) => assert_eq!(s, "hello\nworld"),
            other => panic!("expected string literal, got {:?}", other),
        }
    }

    #[test]
    fn test_char_literal_escapes() {
        let tokens = collect(r"'a' '\n' '\x41'");

        assert!(matches!(tokens[0], Token::CharLiteral(c, _) if c == b'a' as i8));
        assert!(matches!(tokens[1], Token::CharLiteral(c, _) if c == b'\n' as i8));
        assert!(matches!(tokens[2], Token::CharLiteral(c, _) if c == b'A' as i8));
    }

    #[test]
    fn test_unterminated_string_is_lexical_error() {
        let mut lexer = Lexer::new("\"abc");
        assert!(matches!(
            lexer.next_token(),
            Err(LexError::UnterminatedString(_))
        ));
    }

    #[test]
    fn test_unknown_escape_is_lexical_error() {
        let mut lexer = Lexer::new(r#""\q""#);
        assert!(matches!(
            lexer.next_token(),
            Err(LexError::UnknownEscape { escape: 'q', .. })
        ));
    }

    #[test]
    fn test_unterminated_block_comment() {
        let mut lexer = Lexer::new("/* never closed");
        assert!(matches!(
            lexer.next_token(),
            Err(LexError::UnterminatedComment(_))
        ));
    }

    #[test]
    fn test_span_tracking() {
        let tokens = collect("int\n  x;");

        assert_eq!(tokens[0].span(), Span::new(1, 1));
        assert_eq!(tokens[1].span(), Span::new(2, 3));
        assert_eq!(tokens[2].span(), Span::new(2, 4));
    }

    #[test]
    fn test_independent_lexers_agree() {
        let source = "for (int i = 0; i < 10; i = i + 1) { x = x * 2.5; }";
        assert_eq!(collect(source), collect(source));
    }

    #[test]
    fn test_eof_is_sticky() {
        let mut lexer = Lexer::new("x");
        assert!(matches!(lexer.next_token().unwrap(), Token::Ident(_, _)));
        assert!(matches!(lexer.next_token().unwrap(), Token::Eof(_)));
        assert!(matches!(lexer.next_token().unwrap(), Token::Eof(_)));
    }
}
