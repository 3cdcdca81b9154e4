//! Lexer: OXPL source text to a flat token stream with span tracking.

use std::fmt;
use std::iter::Peekable;
use std::str::CharIndices;

use super::error::{SyntaxError, SyntaxResult};

/// Byte-level source span for error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl From<Span> for miette::SourceSpan {
    fn from(span: Span) -> Self {
        (span.start, span.end.saturating_sub(span.start)).into()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Ident(String),
    Int(i64),
    Float(f64),
    Str(String),

    // Keywords
    Fn,
    Class,
    Var,
    If,
    Else,
    While,
    For,
    In,
    Return,
    Break,
    Continue,

    // Punctuation
    LParen,
    RParen,
    LBrace,
    RBrace,
    Comma,
    Semi,
    Colon,
    PathSep,
    Dot,
    Question,

    /// Operator, one or two characters.
    Op(&'static str),

    Eof,
}

impl TokenKind {
    fn keyword(word: &str) -> Option<Self> {
        Some(match word {
            "fn" => Self::Fn,
            "class" => Self::Class,
            "var" => Self::Var,
            "if" => Self::If,
            "else" => Self::Else,
            "while" => Self::While,
            "for" => Self::For,
            "in" => Self::In,
            "return" => Self::Return,
            "break" => Self::Break,
            "continue" => Self::Continue,
            _ => return None,
        })
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ident(name) => write!(f, "identifier `{name}`"),
            Self::Int(v) => write!(f, "integer {v}"),
            Self::Float(v) => write!(f, "float {v}"),
            Self::Str(s) => write!(f, "string {s:?}"),
            Self::Fn => f.write_str("`fn`"),
            Self::Class => f.write_str("`class`"),
            Self::Var => f.write_str("`var`"),
            Self::If => f.write_str("`if`"),
            Self::Else => f.write_str("`else`"),
            Self::While => f.write_str("`while`"),
            Self::For => f.write_str("`for`"),
            Self::In => f.write_str("`in`"),
            Self::Return => f.write_str("`return`"),
            Self::Break => f.write_str("`break`"),
            Self::Continue => f.write_str("`continue`"),
            Self::LParen => f.write_str("`(`"),
            Self::RParen => f.write_str("`)`"),
            Self::LBrace => f.write_str("`{`"),
            Self::RBrace => f.write_str("`}`"),
            Self::Comma => f.write_str("`,`"),
            Self::Semi => f.write_str("`;`"),
            Self::Colon => f.write_str("`:`"),
            Self::PathSep => f.write_str("`::`"),
            Self::Dot => f.write_str("`.`"),
            Self::Question => f.write_str("`?`"),
            Self::Op(op) => write!(f, "`{op}`"),
            Self::Eof => f.write_str("end of input"),
        }
    }
}

/// A single lexical token.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// Source position in input.
    pub span: Span,
    /// One-based line of the first character.
    pub line: usize,
    /// One-based column of the first character.
    pub column: usize,
}

const TWO_CHAR_OPS: [&str; 10] = ["==", "!=", "&&", "||", "<=", ">=", "<<", ">>", "++", "--"];
const ONE_CHAR_OPS: [&str; 11] = ["+", "-", "*", "/", "%", "=", "&", "|", "^", "<", ">"];

struct Lexer<'a> {
    source: &'a str,
    chars: Peekable<CharIndices<'a>>,
    line: usize,
    column: usize,
}

impl<'a> Lexer<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.char_indices().peekable(),
            line: 1,
            column: 1,
        }
    }

    fn offset(&mut self) -> usize {
        self.chars.peek().map_or(self.source.len(), |&(i, _)| i)
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().map(|&(_, c)| c)
    }

    fn peek_second(&self) -> Option<char> {
        let mut ahead = self.chars.clone();
        ahead.next();
        ahead.next().map(|(_, c)| c)
    }

    fn bump(&mut self) -> Option<char> {
        let (_, c) = self.chars.next()?;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn skip_trivia(&mut self) {
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() => {
                    self.bump();
                }
                Some('#') => self.skip_line(),
                Some('/') if self.peek_second() == Some('/') => self.skip_line(),
                _ => return,
            }
        }
    }

    fn skip_line(&mut self) {
        while let Some(c) = self.bump() {
            if c == '\n' {
                break;
            }
        }
    }

    fn next_token(&mut self) -> SyntaxResult<Token> {
        self.skip_trivia();
        let (line, column) = (self.line, self.column);
        let start = self.offset();
        let Some(c) = self.peek() else {
            return Ok(Token {
                kind: TokenKind::Eof,
                span: Span { start, end: start },
                line,
                column,
            });
        };

        let kind = if c.is_ascii_alphabetic() || c == '_' {
            self.identifier()
        } else if c.is_ascii_digit() {
            self.number(start, line, column)?
        } else if c == '"' {
            self.string(start, line, column)?
        } else {
            self.punct(c, start, line, column)?
        };

        let end = self.offset();
        Ok(Token {
            kind,
            span: Span { start, end },
            line,
            column,
        })
    }

    fn identifier(&mut self) -> TokenKind {
        let mut word = String::new();
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || c == '_' {
                word.push(c);
                self.bump();
            } else {
                break;
            }
        }
        TokenKind::keyword(&word).unwrap_or(TokenKind::Ident(word))
    }

    fn number(&mut self, start: usize, line: usize, column: usize) -> SyntaxResult<TokenKind> {
        let mut text = String::new();
        while let Some(c) = self.peek().filter(char::is_ascii_digit) {
            text.push(c);
            self.bump();
        }
        let fractional = self.peek() == Some('.') && self.peek_second().is_some_and(|c| c.is_ascii_digit());
        if fractional {
            text.push('.');
            self.bump();
            while let Some(c) = self.peek().filter(char::is_ascii_digit) {
                text.push(c);
                self.bump();
            }
            // Digits with one dot always parse as f64.
            return Ok(TokenKind::Float(text.parse().unwrap_or(f64::NAN)));
        }
        text.parse().map(TokenKind::Int).map_err(|_| SyntaxError::IntegerOutOfRange {
            span: Span {
                start,
                end: start + text.len(),
            }
            .into(),
            literal: text,
            line,
            column,
        })
    }

    fn string(&mut self, start: usize, line: usize, column: usize) -> SyntaxResult<TokenKind> {
        self.bump();
        let mut text = String::new();
        loop {
            let at = self.offset();
            match self.bump() {
                None | Some('\n') => {
                    return Err(SyntaxError::UnterminatedString {
                        line,
                        column,
                        span: Span { start, end: at }.into(),
                    });
                }
                Some('"') => return Ok(TokenKind::Str(text)),
                Some('\\') => {
                    let (esc_line, esc_column) = (self.line, self.column - 1);
                    let escaped = match self.bump() {
                        Some('n') => '\n',
                        Some('t') => '\t',
                        Some('\\') => '\\',
                        Some('"') => '"',
                        other => {
                            return Err(SyntaxError::InvalidEscape {
                                escape: other.unwrap_or(' '),
                                line: esc_line,
                                column: esc_column,
                                span: Span {
                                    start: at,
                                    end: self.offset(),
                                }
                                .into(),
                            });
                        }
                    };
                    text.push(escaped);
                }
                Some(c) => text.push(c),
            }
        }
    }

    fn punct(&mut self, c: char, start: usize, line: usize, column: usize) -> SyntaxResult<TokenKind> {
        let single = match c {
            '(' => Some(TokenKind::LParen),
            ')' => Some(TokenKind::RParen),
            '{' => Some(TokenKind::LBrace),
            '}' => Some(TokenKind::RBrace),
            ',' => Some(TokenKind::Comma),
            ';' => Some(TokenKind::Semi),
            '.' => Some(TokenKind::Dot),
            '?' => Some(TokenKind::Question),
            _ => None,
        };
        if let Some(kind) = single {
            self.bump();
            return Ok(kind);
        }

        if let Some(second) = self.peek_second() {
            if c == ':' && second == ':' {
                self.bump();
                self.bump();
                return Ok(TokenKind::PathSep);
            }
            let pair: String = [c, second].iter().collect();
            if let Some(op) = TWO_CHAR_OPS.iter().copied().find(|op| *op == pair) {
                self.bump();
                self.bump();
                return Ok(TokenKind::Op(op));
            }
        }
        if c == ':' {
            self.bump();
            return Ok(TokenKind::Colon);
        }
        let mut buf = [0u8; 4];
        let text: &str = c.encode_utf8(&mut buf);
        if let Some(op) = ONE_CHAR_OPS.iter().copied().find(|op| *op == text) {
            self.bump();
            return Ok(TokenKind::Op(op));
        }

        Err(SyntaxError::UnexpectedChar {
            ch: c,
            line,
            column,
            span: Span {
                start,
                end: start + c.len_utf8(),
            }
            .into(),
        })
    }
}

/// Tokenize OXPL source. The returned stream always ends with [`TokenKind::Eof`].
pub fn tokenize(source: &str) -> SyntaxResult<Vec<Token>> {
    let mut lexer = Lexer::new(source);
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token()?;
        let done = token.kind == TokenKind::Eof;
        tokens.push(token);
        if done {
            return Ok(tokens);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn keywords_and_identifiers() {
        assert_eq!(
            kinds("fn main classy"),
            vec![
                TokenKind::Fn,
                TokenKind::Ident("main".into()),
                TokenKind::Ident("classy".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn numbers() {
        assert_eq!(
            kinds("42 3.25 7.x"),
            vec![
                TokenKind::Int(42),
                TokenKind::Float(3.25),
                TokenKind::Int(7),
                TokenKind::Dot,
                TokenKind::Ident("x".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn integer_overflow_is_an_error() {
        let err = tokenize("99999999999999999999").unwrap_err();
        assert!(matches!(err, SyntaxError::IntegerOutOfRange { .. }));
        assert!(err.is_lexical());
    }

    #[test]
    fn strings_with_escapes() {
        assert_eq!(
            kinds(r#""a\tb\n\"q\"""#),
            vec![TokenKind::Str("a\tb\n\"q\"".into()), TokenKind::Eof]
        );
    }

    #[test]
    fn unterminated_string_reports_start() {
        let err = tokenize("\n  \"open").unwrap_err();
        assert!(matches!(err, SyntaxError::UnterminatedString { .. }));
        assert_eq!(err.position(), (2, 3));
    }

    #[test]
    fn invalid_escape() {
        assert!(matches!(
            tokenize(r#""\q""#),
            Err(SyntaxError::InvalidEscape { escape: 'q', .. })
        ));
    }

    #[test]
    fn operators_prefer_two_characters() {
        assert_eq!(
            kinds("a<=b<c::d++"),
            vec![
                TokenKind::Ident("a".into()),
                TokenKind::Op("<="),
                TokenKind::Ident("b".into()),
                TokenKind::Op("<"),
                TokenKind::Ident("c".into()),
                TokenKind::PathSep,
                TokenKind::Ident("d".into()),
                TokenKind::Op("++"),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn comments_are_skipped() {
        assert_eq!(
            kinds("// line\n# hash\nx / y"),
            vec![
                TokenKind::Ident("x".into()),
                TokenKind::Op("/"),
                TokenKind::Ident("y".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn spans_and_positions() {
        let tokens = tokenize("fn\n  main").unwrap();
        assert_eq!(tokens[1].span, Span { start: 5, end: 9 });
        assert_eq!((tokens[1].line, tokens[1].column), (2, 3));
    }

    #[test]
    fn unexpected_character() {
        let err = tokenize("x @ y").unwrap_err();
        assert!(matches!(err, SyntaxError::UnexpectedChar { ch: '@', .. }));
        assert_eq!(err.position(), (1, 3));
    }
}
