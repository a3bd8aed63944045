//! Cypher AST for construction scripts.
//!
//! These types represent parsed scripts. They are pure data:
//! no behavior, no storage references, no execution logic.

use super::lexer::Span;

/// A whole script: every CREATE clause of every `;`-separated statement,
/// in source order. All clauses share one variable scope.
#[derive(Debug, Clone, Default)]
pub struct Script {
    pub clauses: Vec<CreateClause>,
}

/// CREATE clause.
#[derive(Debug, Clone)]
pub struct CreateClause {
    pub patterns: Vec<Pattern>,
}

/// A pattern: (a:Person)-[:KNOWS]->(b:Person)
#[derive(Debug, Clone)]
pub struct Pattern {
    pub elements: Vec<PatternElement>,
}

/// Element of a pattern: a node or a relationship.
#[derive(Debug, Clone)]
pub enum PatternElement {
    Node(NodePattern),
    Relationship(RelPattern),
}

/// Node pattern: (alias:Label1:Label2 {prop: value})
#[derive(Debug, Clone)]
pub struct NodePattern {
    pub alias: Option<String>,
    pub labels: Vec<String>,
    /// Properties in source order.
    pub properties: Vec<(String, Expr)>,
    pub span: Span,
}

/// Relationship pattern: -[alias:TYPE {props}]->
#[derive(Debug, Clone)]
pub struct RelPattern {
    pub alias: Option<String>,
    pub rel_type: Option<String>,
    pub direction: PatternDirection,
    pub properties: Vec<(String, Expr)>,
    pub span: Span,
}

/// Pattern direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternDirection {
    /// ->
    Right,
    /// <-
    Left,
    /// - (undirected)
    Both,
}

// ============================================================================
// Expressions
// ============================================================================

/// Property value expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Literal),
    /// Parameter: `$name`
    Parameter(String),
    /// List: `[1, 2, 3]`
    List(Vec<Expr>),
}

/// Literal values.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}
