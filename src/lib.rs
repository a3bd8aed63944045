//! # graphunit: property-graph equivalence assertions
//!
//! Compare the graph held by a store with a graph described by a Cypher
//! `CREATE` script, ignoring element identity.
//!
//! ## Operations
//!
//! 1. **`assert_same_graph`**: the store (through the policies) is isomorphic
//!    to the script's graph, labels and properties included
//! 2. **`assert_subgraph`**: the script's graph embeds injectively into the store
//! 3. **`clear_graph`**: delete everything the policies admit
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use graphunit::{Graph, InclusionPolicies};
//!
//! # async fn example() -> graphunit::Result<()> {
//! let graph = Graph::open_memory().await?;
//! graph.mutate("CREATE (:Person {name: 'Ada'})-[:WORKS_FOR]->(:Company)").await?;
//!
//! let all = InclusionPolicies::include_all();
//! graph.assert_same_graph("CREATE (:Company)<-[:WORKS_FOR]-(:Person {name: 'Ada'})", &all).await?;
//! graph.assert_subgraph("CREATE (:Company)", &all).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Layers
//!
//! | Module | Role |
//! |--------|------|
//! | `snapshot` | Policy-filtered, id-sorted copy of a store |
//! | `signature` | Relationship buckets per ordered node pair |
//! | `matcher` | Backtracking search for an id-independent mapping |
//! | `cypher` | CREATE-only script engine used to build reference graphs |
//! | `storage` | Store contract plus the in-memory backend |

// ============================================================================
// Modules
// ============================================================================

pub mod model;
pub mod storage;
pub mod tx;
pub mod cypher;
pub mod equality;
pub mod policy;
pub mod snapshot;
pub mod signature;
pub mod matcher;
pub mod clear;
pub mod export;
pub mod unit;

// ============================================================================
// Re-exports: Model (the DTOs)
// ============================================================================

pub use model::{
    Node, Relationship, Value, PrimitiveArray, PropertyMap,
    NodeId, RelId, Direction,
};

// ============================================================================
// Re-exports: Storage & Transactions
// ============================================================================

pub use storage::{StorageBackend, BackendConfig, MemoryBackend};
pub use tx::{Transaction, TxMode, TxId};

// ============================================================================
// Re-exports: Comparison core
// ============================================================================

pub use equality::{values_equal, properties_equal};
pub use policy::{
    InclusionPolicies, NodeInclusionPolicy, RelationshipInclusionPolicy,
    IncludeAllNodes, IncludeAllRelationships,
    IncludeAllBusinessNodes, IncludeAllBusinessRelationships, INTERNAL_PREFIX,
};
pub use snapshot::GraphSnapshot;
pub use matcher::{MatchMode, Mapping, GraphMismatch, MismatchReason};
pub use clear::ClearSummary;
pub use export::{render_cypher, export_cypher_dump};
pub use cypher::{ScriptEngine, CypherEngine, ScriptSummary};
pub use unit::{GraphUnit, assert_same_graph, assert_subgraph, clear_graph};

// ============================================================================
// Top-level Graph handle
// ============================================================================

/// A store plus the assertion entry points. Every method opens and finishes
/// its own transaction.
pub struct Graph<B: StorageBackend> {
    backend: B,
    unit: GraphUnit,
}

impl<B: StorageBackend> Graph<B> {
    /// Create a Graph with the given backend.
    pub fn with_backend(backend: B) -> Self {
        Self { backend, unit: GraphUnit::new() }
    }

    /// Replace the assertion settings (e.g. to turn off rendered diagnostics).
    pub fn with_unit(mut self, unit: GraphUnit) -> Self {
        self.unit = unit;
        self
    }

    /// Access the underlying backend (for advanced use).
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Run a construction script in a write transaction.
    pub async fn mutate(&self, script: &str) -> Result<ScriptSummary> {
        self.mutate_with(script, PropertyMap::new()).await
    }

    /// Run a construction script with `$name` parameters.
    pub async fn mutate_with<P>(&self, script: &str, params: P) -> Result<ScriptSummary>
    where
        P: Into<PropertyMap>,
    {
        let engine = CypherEngine::new().with_parameters(params.into());
        let mut tx = self.backend.begin_tx(TxMode::ReadWrite).await?;
        match engine.execute(&self.backend, &mut tx, script).await {
            Ok(summary) => {
                self.backend.commit_tx(tx).await?;
                Ok(summary)
            }
            Err(e) => {
                self.backend.rollback_tx(tx).await?;
                Err(e)
            }
        }
    }

    pub async fn assert_same_graph(&self, script: &str, policies: &InclusionPolicies) -> Result<()> {
        let tx = self.backend.begin_tx(TxMode::ReadOnly).await?;
        let outcome = self.unit.assert_same_graph(&self.backend, &tx, script, policies).await;
        self.backend.commit_tx(tx).await?;
        outcome
    }

    pub async fn assert_subgraph(&self, script: &str, policies: &InclusionPolicies) -> Result<()> {
        let tx = self.backend.begin_tx(TxMode::ReadOnly).await?;
        let outcome = self.unit.assert_subgraph(&self.backend, &tx, script, policies).await;
        self.backend.commit_tx(tx).await?;
        outcome
    }

    /// Delete everything `policies` admits.
    pub async fn clear(&self, policies: &InclusionPolicies) -> Result<ClearSummary> {
        let mut tx = self.backend.begin_tx(TxMode::ReadWrite).await?;
        match clear::clear_graph(&self.backend, &mut tx, policies).await {
            Ok(summary) => {
                self.backend.commit_tx(tx).await?;
                Ok(summary)
            }
            Err(e) => {
                self.backend.rollback_tx(tx).await?;
                Err(e)
            }
        }
    }

    /// Policy-filtered copy of the current store contents.
    pub async fn snapshot(&self, policies: &InclusionPolicies) -> Result<GraphSnapshot> {
        let tx = self.backend.begin_tx(TxMode::ReadOnly).await?;
        let graph = GraphSnapshot::capture(&self.backend, &tx, policies).await?;
        self.backend.commit_tx(tx).await?;
        Ok(graph)
    }

    pub async fn node_count(&self) -> Result<u64> {
        let tx = self.backend.begin_tx(TxMode::ReadOnly).await?;
        let count = self.backend.node_count(&tx).await?;
        self.backend.commit_tx(tx).await?;
        Ok(count)
    }

    pub async fn relationship_count(&self) -> Result<u64> {
        let tx = self.backend.begin_tx(TxMode::ReadOnly).await?;
        let count = self.backend.relationship_count(&tx).await?;
        self.backend.commit_tx(tx).await?;
        Ok(count)
    }
}

/// In-memory graph for testing and embedding.
impl Graph<MemoryBackend> {
    pub async fn open_memory() -> Result<Self> {
        Ok(Self::with_backend(MemoryBackend::new()))
    }

    pub async fn open(config: BackendConfig) -> Result<Self> {
        match config {
            BackendConfig::Memory => Self::open_memory().await,
        }
    }
}

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Cypher syntax error at position {position}: {message}")]
    SyntaxError { position: usize, message: String },

    #[error("Semantic error: {0}")]
    SemanticError(String),

    #[error("Transaction error: {0}")]
    TxError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    /// The graphs differ. Carries the full comparison report.
    #[error("{0}")]
    Mismatch(Box<GraphMismatch>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// True when the error is a failed comparison rather than a broken script or store.
    pub fn is_mismatch(&self) -> bool {
        matches!(self, Error::Mismatch(_))
    }

    pub fn mismatch(&self) -> Option<&GraphMismatch> {
        match self {
            Error::Mismatch(m) => Some(m),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
