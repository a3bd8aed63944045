//! Cypher lexer: tokenizes a construction script.

use crate::{Error, Result};

/// A token from the lexer.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    pub text: String,
}

/// Source span (byte offsets).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

/// Token kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    // Keywords
    Create, Null, True, False,
    /// Any clause keyword the engine recognises but does not execute
    /// (MATCH, MERGE, RETURN, ...).
    Clause,

    // Literals
    Integer, Float, StringLiteral,

    // Identifiers and parameters
    Identifier, Parameter,

    // Punctuation
    LParen, RParen, LBracket, RBracket, LBrace, RBrace,
    Comma, Colon, Semicolon,
    Arrow,      // ->
    LeftArrow,  // <-
    Dash,       // -

    Eof,
}

impl TokenKind {
    /// Keywords double as names in label, type and key position.
    pub fn is_word(self) -> bool {
        matches!(
            self,
            TokenKind::Identifier | TokenKind::Create | TokenKind::Null
                | TokenKind::True | TokenKind::False | TokenKind::Clause
        )
    }
}

/// Tokenize a Cypher script.
pub fn tokenize(input: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some(&(pos, ch)) = chars.peek() {
        match ch {
            c if c.is_whitespace() => { chars.next(); }

            // Block comments /* ... */
            '/' if matches!(chars.clone().nth(1), Some((_, '*'))) => {
                chars.next();
                chars.next();
                loop {
                    match chars.next() {
                        Some((_, '*')) if matches!(chars.peek(), Some(&(_, '/'))) => {
                            chars.next();
                            break;
                        }
                        Some(_) => {}
                        None => {
                            return Err(Error::SyntaxError {
                                position: pos,
                                message: "Unterminated block comment".into(),
                            });
                        }
                    }
                }
            }

            // Line comments
            '/' if matches!(chars.clone().nth(1), Some((_, '/'))) => {
                while chars.peek().is_some_and(|&(_, c)| c != '\n') {
                    chars.next();
                }
            }

            // String literals
            '\'' | '"' => {
                let quote = ch;
                chars.next();
                let mut s = String::new();
                let mut end = None;
                while let Some((i, c)) = chars.next() {
                    match c {
                        '\\' => match chars.next() {
                            Some((_, 'n')) => s.push('\n'),
                            Some((_, 't')) => s.push('\t'),
                            Some((_, 'r')) => s.push('\r'),
                            Some((_, 'b')) => s.push('\u{8}'),
                            Some((_, 'f')) => s.push('\u{c}'),
                            Some((_, c @ ('\\' | '\'' | '"'))) => s.push(c),
                            Some((_, c)) => {
                                return Err(Error::SyntaxError {
                                    position: i,
                                    message: format!("Invalid escape sequence '\\{c}'"),
                                });
                            }
                            None => break,
                        },
                        c if c == quote => {
                            end = Some(i + 1);
                            break;
                        }
                        c => s.push(c),
                    }
                }
                let Some(end) = end else {
                    return Err(Error::SyntaxError {
                        position: pos,
                        message: "Unterminated string literal".into(),
                    });
                };
                tokens.push(Token {
                    kind: TokenKind::StringLiteral,
                    span: Span { start: pos, end },
                    text: s,
                });
            }

            // Numbers: 12, 1.5, 6.02e23, 1E-3
            c if c.is_ascii_digit() => {
                let mut num = String::new();
                let mut is_float = false;
                while let Some(&(_, c)) = chars.peek() {
                    if c.is_ascii_digit() {
                        num.push(c);
                        chars.next();
                    } else if c == '.'
                        && !is_float
                        && matches!(chars.clone().nth(1), Some((_, d)) if d.is_ascii_digit())
                    {
                        is_float = true;
                        num.push(c);
                        chars.next();
                    } else if c == 'e' || c == 'E' {
                        let mut ahead = chars.clone();
                        ahead.next();
                        let signed = matches!(ahead.peek(), Some(&(_, '+' | '-')));
                        if signed {
                            ahead.next();
                        }
                        if !matches!(ahead.peek(), Some(&(_, d)) if d.is_ascii_digit()) {
                            break;
                        }
                        is_float = true;
                        num.push(c);
                        chars.next();
                        if signed {
                            if let Some((_, sign)) = chars.next() {
                                num.push(sign);
                            }
                        }
                        while let Some(&(_, d)) = chars.peek() {
                            if !d.is_ascii_digit() {
                                break;
                            }
                            num.push(d);
                            chars.next();
                        }
                        break;
                    } else {
                        break;
                    }
                }
                tokens.push(Token {
                    kind: if is_float { TokenKind::Float } else { TokenKind::Integer },
                    span: Span { start: pos, end: pos + num.len() },
                    text: num,
                });
            }

            // Parameter: $name
            '$' => {
                chars.next();
                let name = take_word(&mut chars);
                if name.is_empty() {
                    return Err(Error::SyntaxError {
                        position: pos,
                        message: "Expected parameter name after '$'".into(),
                    });
                }
                tokens.push(Token {
                    kind: TokenKind::Parameter,
                    span: Span { start: pos, end: pos + name.len() + 1 },
                    text: name,
                });
            }

            // Back-ticked identifier; `` inside stands for one backtick
            '`' => {
                chars.next();
                let mut name = String::new();
                let end = loop {
                    match chars.next() {
                        Some((i, '`')) => {
                            if matches!(chars.peek(), Some(&(_, '`'))) {
                                chars.next();
                                name.push('`');
                            } else {
                                break i + 1;
                            }
                        }
                        Some((_, c)) => name.push(c),
                        None => {
                            return Err(Error::SyntaxError {
                                position: pos,
                                message: "Unterminated quoted identifier".into(),
                            });
                        }
                    }
                };
                tokens.push(Token {
                    kind: TokenKind::Identifier,
                    span: Span { start: pos, end },
                    text: name,
                });
            }

            // Identifiers and keywords
            c if c.is_alphabetic() || c == '_' => {
                let ident = take_word(&mut chars);
                tokens.push(Token {
                    kind: keyword_or_ident(&ident),
                    span: Span { start: pos, end: pos + ident.len() },
                    text: ident,
                });
            }

            '(' => { chars.next(); tokens.push(punct(TokenKind::LParen, pos, "(")); }
            ')' => { chars.next(); tokens.push(punct(TokenKind::RParen, pos, ")")); }
            '[' => { chars.next(); tokens.push(punct(TokenKind::LBracket, pos, "[")); }
            ']' => { chars.next(); tokens.push(punct(TokenKind::RBracket, pos, "]")); }
            '{' => { chars.next(); tokens.push(punct(TokenKind::LBrace, pos, "{")); }
            '}' => { chars.next(); tokens.push(punct(TokenKind::RBrace, pos, "}")); }
            ',' => { chars.next(); tokens.push(punct(TokenKind::Comma, pos, ",")); }
            ':' => { chars.next(); tokens.push(punct(TokenKind::Colon, pos, ":")); }
            ';' => { chars.next(); tokens.push(punct(TokenKind::Semicolon, pos, ";")); }
            '<' => {
                chars.next();
                if matches!(chars.peek(), Some(&(_, '-'))) {
                    chars.next();
                    tokens.push(punct(TokenKind::LeftArrow, pos, "<-"));
                } else {
                    return Err(Error::SyntaxError {
                        position: pos,
                        message: "Unexpected character: '<'".into(),
                    });
                }
            }
            '-' => {
                chars.next();
                if matches!(chars.peek(), Some(&(_, '>'))) {
                    chars.next();
                    tokens.push(punct(TokenKind::Arrow, pos, "->"));
                } else {
                    tokens.push(punct(TokenKind::Dash, pos, "-"));
                }
            }

            other => {
                return Err(Error::SyntaxError {
                    position: pos,
                    message: format!("Unexpected character: '{other}'"),
                });
            }
        }
    }

    tokens.push(Token {
        kind: TokenKind::Eof,
        span: Span { start: input.len(), end: input.len() },
        text: String::new(),
    });

    Ok(tokens)
}

fn take_word(chars: &mut std::iter::Peekable<std::str::CharIndices<'_>>) -> String {
    let mut word = String::new();
    while let Some(&(_, c)) = chars.peek() {
        if c.is_alphanumeric() || c == '_' {
            word.push(c);
            chars.next();
        } else {
            break;
        }
    }
    word
}

fn punct(kind: TokenKind, pos: usize, text: &str) -> Token {
    Token {
        kind,
        span: Span { start: pos, end: pos + text.len() },
        text: text.to_string(),
    }
}

fn keyword_or_ident(s: &str) -> TokenKind {
    match s.to_uppercase().as_str() {
        "CREATE" => TokenKind::Create,
        "NULL" => TokenKind::Null,
        "TRUE" => TokenKind::True,
        "FALSE" => TokenKind::False,
        "MATCH" | "OPTIONAL" | "MERGE" | "WITH" | "UNWIND" | "WHERE" | "RETURN" | "SET"
        | "REMOVE" | "DELETE" | "DETACH" | "CALL" | "FOREACH" | "LOAD" | "UNION" => {
            TokenKind::Clause
        }
        _ => TokenKind::Identifier,
    }
}
