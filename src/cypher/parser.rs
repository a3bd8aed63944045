//! Cypher recursive descent parser for construction scripts.
//!
//! Accepts one or more `;`-separated statements made of CREATE clauses:
//! - node patterns with labels and a property map
//! - directed, typed relationship patterns with a property map
//! - literal, list and `$parameter` property values
//!
//! Other clause keywords are recognised only to be rejected.

use crate::{Error, Result};
use super::ast::*;
use super::lexer::{Span, Token, TokenKind};

/// Parser state: wraps a token slice with cursor.
struct Parser<'t> {
    tokens: &'t [Token],
    pos: usize,
}

impl<'t> Parser<'t> {
    fn new(tokens: &'t [Token]) -> Self {
        Self { tokens, pos: 0 }
    }

    fn peek(&self) -> &'t Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek_kind(&self) -> TokenKind {
        self.peek().kind
    }

    fn advance(&mut self) -> &'t Token {
        let tok = &self.tokens[self.pos.min(self.tokens.len() - 1)];
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn expect(&mut self, kind: TokenKind) -> Result<&'t Token> {
        let tok = self.peek();
        if tok.kind == kind {
            Ok(self.advance())
        } else {
            Err(self.error(format!("Expected {:?}, got {:?} '{}'", kind, tok.kind, tok.text)))
        }
    }

    /// A label, type or property key. Keywords are allowed here.
    fn expect_name(&mut self, what: &str) -> Result<String> {
        if self.peek_kind().is_word() {
            Ok(self.advance().text.clone())
        } else {
            let tok = self.peek();
            Err(self.error(format!("Expected {what}, got {:?} '{}'", tok.kind, tok.text)))
        }
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.peek_kind() == kind
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.at(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn error(&self, msg: String) -> Error {
        Error::SyntaxError {
            position: self.peek().span.start,
            message: msg,
        }
    }

    fn span_from(&self, start: usize) -> Span {
        let end = self.tokens[self.pos.saturating_sub(1)].span.end;
        Span { start, end }
    }
}

/// Parse a complete script from tokens.
///
/// An empty script (or one holding only comments and semicolons) parses to
/// an empty [`Script`], as does an empty token slice.
pub fn parse_script(tokens: &[Token]) -> Result<Script> {
    if tokens.is_empty() {
        return Ok(Script::default());
    }
    let mut p = Parser::new(tokens);
    let mut script = Script::default();

    loop {
        while p.eat(TokenKind::Semicolon) {}
        match p.peek_kind() {
            TokenKind::Eof => break,
            TokenKind::Create => {
                p.advance();
                let patterns = parse_pattern_list(&mut p)?;
                script.clauses.push(CreateClause { patterns });
            }
            TokenKind::Clause => {
                return Err(Error::SemanticError(format!(
                    "Unsupported clause {}: construction scripts may only CREATE",
                    p.peek().text.to_uppercase()
                )));
            }
            kind => {
                return Err(p.error(format!(
                    "Unexpected token {:?} '{}', expected CREATE",
                    kind,
                    p.peek().text
                )));
            }
        }
    }

    Ok(script)
}

// ============================================================================
// Pattern parsing
// ============================================================================

fn parse_pattern_list(p: &mut Parser) -> Result<Vec<Pattern>> {
    let mut patterns = Vec::new();
    patterns.push(parse_pattern(p)?);
    while p.eat(TokenKind::Comma) {
        patterns.push(parse_pattern(p)?);
    }
    Ok(patterns)
}

fn parse_pattern(p: &mut Parser) -> Result<Pattern> {
    let mut elements = Vec::new();

    // A pattern starts with a node
    elements.push(PatternElement::Node(parse_node_pattern(p)?));

    // Then alternating: relationship, node, relationship, node, ...
    while p.at(TokenKind::Dash) || p.at(TokenKind::LeftArrow) {
        elements.push(PatternElement::Relationship(parse_rel_pattern(p)?));
        elements.push(PatternElement::Node(parse_node_pattern(p)?));
    }

    Ok(Pattern { elements })
}

fn parse_node_pattern(p: &mut Parser) -> Result<NodePattern> {
    let start = p.expect(TokenKind::LParen)?.span.start;

    let mut alias = None;
    let mut labels = Vec::new();
    let mut properties = Vec::new();

    if p.at(TokenKind::Identifier) {
        alias = Some(p.advance().text.clone());
    }

    // Labels: :Label1:Label2
    while p.eat(TokenKind::Colon) {
        labels.push(p.expect_name("label")?);
    }

    if p.at(TokenKind::LBrace) {
        properties = parse_map_literal_inner(p)?;
    }

    p.expect(TokenKind::RParen)?;

    Ok(NodePattern { alias, labels, properties, span: p.span_from(start) })
}

fn parse_rel_pattern(p: &mut Parser) -> Result<RelPattern> {
    let start = p.peek().span.start;

    // <-[...]- or -[...]-> or -[...]-
    let left_arrow = p.eat(TokenKind::LeftArrow);
    if !left_arrow {
        p.expect(TokenKind::Dash)?;
    }

    let mut alias = None;
    let mut rel_type = None;
    let mut properties = Vec::new();

    // Optional [details]
    if p.eat(TokenKind::LBracket) {
        if p.at(TokenKind::Identifier) {
            alias = Some(p.advance().text.clone());
        }
        if p.eat(TokenKind::Colon) {
            rel_type = Some(p.expect_name("relationship type")?);
        }
        if p.at(TokenKind::LBrace) {
            properties = parse_map_literal_inner(p)?;
        }
        p.expect(TokenKind::RBracket)?;
    }

    let direction = if left_arrow {
        if p.eat(TokenKind::Arrow) {
            PatternDirection::Both
        } else {
            p.expect(TokenKind::Dash)?;
            PatternDirection::Left
        }
    } else if p.eat(TokenKind::Arrow) {
        PatternDirection::Right
    } else {
        p.expect(TokenKind::Dash)?;
        PatternDirection::Both
    };

    Ok(RelPattern { alias, rel_type, direction, properties, span: p.span_from(start) })
}

// ============================================================================
// Values
// ============================================================================

fn parse_expr(p: &mut Parser) -> Result<Expr> {
    match p.peek_kind() {
        TokenKind::Integer => {
            let tok = p.advance();
            parse_int(&tok.text, tok.span.start).map(|i| Expr::Literal(Literal::Int(i)))
        }
        TokenKind::Float => {
            let tok = p.advance();
            parse_float(&tok.text, tok.span.start).map(|f| Expr::Literal(Literal::Float(f)))
        }
        // Negative number literal
        TokenKind::Dash => {
            let dash = p.advance();
            let tok = p.peek();
            let negated = format!("-{}", tok.text);
            match tok.kind {
                TokenKind::Integer => {
                    p.advance();
                    parse_int(&negated, dash.span.start).map(|i| Expr::Literal(Literal::Int(i)))
                }
                TokenKind::Float => {
                    p.advance();
                    parse_float(&negated, dash.span.start)
                        .map(|f| Expr::Literal(Literal::Float(f)))
                }
                _ => Err(p.error(format!("Expected a number after '-', got '{}'", tok.text))),
            }
        }
        TokenKind::StringLiteral => {
            let tok = p.advance();
            Ok(Expr::Literal(Literal::String(tok.text.clone())))
        }
        TokenKind::True => {
            p.advance();
            Ok(Expr::Literal(Literal::Bool(true)))
        }
        TokenKind::False => {
            p.advance();
            Ok(Expr::Literal(Literal::Bool(false)))
        }
        TokenKind::Null => {
            p.advance();
            Ok(Expr::Literal(Literal::Null))
        }
        TokenKind::Parameter => {
            let tok = p.advance();
            Ok(Expr::Parameter(tok.text.clone()))
        }

        // List literal
        TokenKind::LBracket => {
            p.advance();
            let mut items = Vec::new();
            if !p.at(TokenKind::RBracket) {
                items.push(parse_expr(p)?);
                while p.eat(TokenKind::Comma) {
                    items.push(parse_expr(p)?);
                }
            }
            p.expect(TokenKind::RBracket)?;
            Ok(Expr::List(items))
        }

        _ => Err(p.error(format!(
            "Unexpected token in property value: {:?} '{}'",
            p.peek_kind(),
            p.peek().text
        ))),
    }
}

fn parse_int(text: &str, position: usize) -> Result<i64> {
    text.parse::<i64>().map_err(|_| Error::SyntaxError {
        position,
        message: format!("Integer literal out of range: {text}"),
    })
}

fn parse_float(text: &str, position: usize) -> Result<f64> {
    text.parse::<f64>().map_err(|_| Error::SyntaxError {
        position,
        message: format!("Invalid float literal: {text}"),
    })
}

fn parse_map_literal_inner(p: &mut Parser) -> Result<Vec<(String, Expr)>> {
    p.expect(TokenKind::LBrace)?;
    let mut map = Vec::new();
    if !p.at(TokenKind::RBrace) {
        loop {
            let key = p.expect_name("property key")?;
            p.expect(TokenKind::Colon)?;
            let value = parse_expr(p)?;
            map.push((key, value));
            if !p.eat(TokenKind::Comma) {
                break;
            }
        }
    }
    p.expect(TokenKind::RBrace)?;
    Ok(map)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cypher::lexer::tokenize;

    fn parse(script: &str) -> Result<Script> {
        let tokens = tokenize(script)?;
        parse_script(&tokens)
    }

    fn node(element: &PatternElement) -> &NodePattern {
        match element {
            PatternElement::Node(n) => n,
            other => panic!("expected node, got {other:?}"),
        }
    }

    fn rel(element: &PatternElement) -> &RelPattern {
        match element {
            PatternElement::Relationship(r) => r,
            other => panic!("expected relationship, got {other:?}"),
        }
    }

    #[test]
    fn test_create_node() {
        let script = parse("CREATE (n:Person:Human {name: 'Ada', age: 3})").unwrap();
        assert_eq!(script.clauses.len(), 1);
        let n = node(&script.clauses[0].patterns[0].elements[0]);
        assert_eq!(n.alias.as_deref(), Some("n"));
        assert_eq!(n.labels, vec!["Person", "Human"]);
        assert_eq!(n.properties, vec![
            ("name".to_string(), Expr::Literal(Literal::String("Ada".into()))),
            ("age".to_string(), Expr::Literal(Literal::Int(3))),
        ]);
    }

    #[test]
    fn test_relationship_chain() {
        let script = parse(
            "CREATE (blue {name:'Blue'})<-[:REL]-(red1 {name:'Red'})-[r:REL {w: 1.5}]->(black1)",
        )
        .unwrap();
        let elements = &script.clauses[0].patterns[0].elements;
        assert_eq!(elements.len(), 5);
        let left = rel(&elements[1]);
        assert_eq!(left.direction, PatternDirection::Left);
        assert_eq!(left.rel_type.as_deref(), Some("REL"));
        let right = rel(&elements[3]);
        assert_eq!(right.direction, PatternDirection::Right);
        assert_eq!(right.alias.as_deref(), Some("r"));
        assert_eq!(right.properties[0].1, Expr::Literal(Literal::Float(1.5)));
    }

    #[test]
    fn test_undirected_and_untyped_parse() {
        let script = parse("CREATE (a)-[:R]-(b), (a)-->(b)").unwrap();
        let patterns = &script.clauses[0].patterns;
        assert_eq!(rel(&patterns[0].elements[1]).direction, PatternDirection::Both);
        let untyped = rel(&patterns[1].elements[1]);
        assert_eq!(untyped.direction, PatternDirection::Right);
        assert!(untyped.rel_type.is_none());
    }

    #[test]
    fn test_multiple_statements() {
        let script = parse("CREATE (a); CREATE (b) CREATE (c);;").unwrap();
        assert_eq!(script.clauses.len(), 3);
        assert!(parse("").unwrap().clauses.is_empty());
        assert!(parse("// nothing here\n;").unwrap().clauses.is_empty());
        assert!(parse_script(&[]).unwrap().clauses.is_empty());
    }

    #[test]
    fn test_negative_numbers_and_lists() {
        let script = parse("CREATE ({a: -9223372036854775808, b: -0.5, c: [1, 2], d: [], e: null})")
            .unwrap();
        let props = &node(&script.clauses[0].patterns[0].elements[0]).properties;
        assert_eq!(props[0].1, Expr::Literal(Literal::Int(i64::MIN)));
        assert_eq!(props[1].1, Expr::Literal(Literal::Float(-0.5)));
        assert_eq!(
            props[2].1,
            Expr::List(vec![Expr::Literal(Literal::Int(1)), Expr::Literal(Literal::Int(2))])
        );
        assert_eq!(props[3].1, Expr::List(vec![]));
        assert_eq!(props[4].1, Expr::Literal(Literal::Null));
    }

    #[test]
    fn test_keywords_as_names() {
        let script = parse("CREATE (n:Match {true: 1})-[:CREATE]->(m)").unwrap();
        let elements = &script.clauses[0].patterns[0].elements;
        assert_eq!(node(&elements[0]).labels, vec!["Match"]);
        assert_eq!(node(&elements[0]).properties[0].0, "true");
        assert_eq!(rel(&elements[1]).rel_type.as_deref(), Some("CREATE"));
    }

    #[test]
    fn test_unsupported_clause() {
        let err = parse("MATCH (n) RETURN n").unwrap_err();
        assert!(matches!(err, Error::SemanticError(ref m) if m.contains("MATCH")));
        let err = parse("CREATE (n) RETURN n").unwrap_err();
        assert!(matches!(err, Error::SemanticError(ref m) if m.contains("RETURN")));
    }

    #[test]
    fn test_syntax_errors() {
        assert!(matches!(parse("CREATE (n"), Err(Error::SyntaxError { position: 9, .. })));
        assert!(matches!(parse("CREATE"), Err(Error::SyntaxError { .. })));
        assert!(matches!(parse("(n)"), Err(Error::SyntaxError { position: 0, .. })));
        assert!(matches!(parse("CREATE ({n: 99999999999999999999})"), Err(Error::SyntaxError { .. })));
        assert!(matches!(parse("CREATE ({n: -x})"), Err(Error::SyntaxError { .. })));
    }
}
