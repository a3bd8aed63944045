//! # Cypher construction scripts
//!
//! The script-engine collaborator: turns a CREATE-only Cypher script into
//! nodes and relationships in any [`StorageBackend`].
//!
//! ```text
//! script ──tokenize──▶ tokens ──parse_script──▶ Script ──execute──▶ backend
//! ```
//!
//! Parsing is a pure function. Execution writes through the caller's
//! transaction and never commits it.

pub mod ast;
pub mod lexer;
pub mod parser;
mod engine;

use async_trait::async_trait;

use crate::model::{PropertyMap, Value};
use crate::storage::StorageBackend;
use crate::Result;
use ast::Script;

/// Parse a construction script into an AST.
pub fn parse(script: &str) -> Result<Script> {
    let tokens = lexer::tokenize(script)?;
    parser::parse_script(&tokens)
}

/// What a script run wrote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScriptSummary {
    pub nodes_created: u64,
    pub relationships_created: u64,
    pub properties_set: u64,
    pub labels_added: u64,
}

/// Executes a construction script against a store.
///
/// Errors from an invalid script propagate unchanged; implementations must
/// not swallow them.
#[async_trait]
pub trait ScriptEngine: Send + Sync {
    async fn execute<B: StorageBackend>(
        &self,
        backend: &B,
        tx: &mut B::Tx,
        script: &str,
    ) -> Result<ScriptSummary>;
}

/// Executes the CREATE subset of Cypher.
#[derive(Debug, Clone, Default)]
pub struct CypherEngine {
    parameters: PropertyMap,
}

impl CypherEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Values for `$name` references in scripts.
    pub fn with_parameters(mut self, parameters: PropertyMap) -> Self {
        self.parameters = parameters;
        self
    }

    pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.parameters.insert(name.into(), value.into());
        self
    }
}

#[async_trait]
impl ScriptEngine for CypherEngine {
    async fn execute<B: StorageBackend>(
        &self,
        backend: &B,
        tx: &mut B::Tx,
        script: &str,
    ) -> Result<ScriptSummary> {
        let ast = parse(script)?;
        let summary = engine::execute(backend, tx, &ast, &self.parameters).await?;
        tracing::debug!(
            nodes = summary.nodes_created,
            relationships = summary.relationships_created,
            properties = summary.properties_set,
            "executed construction script"
        );
        Ok(summary)
    }
}
