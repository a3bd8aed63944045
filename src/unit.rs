//! Graph assertions.
//!
//! The reference graph is built by running the construction script in a
//! fresh [`MemoryBackend`] owned by the call. Both graphs are then read
//! through the same [`InclusionPolicies`] and handed to the matcher.

use crate::clear;
use crate::cypher::{CypherEngine, ScriptEngine};
use crate::export::render_cypher;
use crate::matcher::{match_graphs, Mapping, MatchMode};
use crate::policy::InclusionPolicies;
use crate::snapshot::GraphSnapshot;
use crate::storage::{MemoryBackend, StorageBackend};
use crate::tx::TxMode;
use crate::{Error, Result};

/// Assertion entry points, parameterised by the engine that runs
/// construction scripts.
#[derive(Debug, Clone)]
pub struct GraphUnit<E: ScriptEngine = CypherEngine> {
    engine: E,
    rendered_diagnostics: bool,
}

impl GraphUnit<CypherEngine> {
    pub fn new() -> Self {
        Self::with_engine(CypherEngine::new())
    }
}

impl Default for GraphUnit<CypherEngine> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: ScriptEngine> GraphUnit<E> {
    pub fn with_engine(engine: E) -> Self {
        Self { engine, rendered_diagnostics: true }
    }

    /// Attach rendered scripts of both graphs to mismatches (on by default).
    pub fn with_rendered_diagnostics(mut self, enabled: bool) -> Self {
        self.rendered_diagnostics = enabled;
        self
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Succeeds iff the store and the script describe the same graph.
    pub async fn assert_same_graph<B: StorageBackend>(
        &self,
        backend: &B,
        tx: &B::Tx,
        script: &str,
        policies: &InclusionPolicies,
    ) -> Result<()> {
        self.compare(backend, tx, script, policies, MatchMode::Exact).await.map(|_| ())
    }

    /// Succeeds iff the script's graph is contained in the store.
    pub async fn assert_subgraph<B: StorageBackend>(
        &self,
        backend: &B,
        tx: &B::Tx,
        script: &str,
        policies: &InclusionPolicies,
    ) -> Result<()> {
        self.compare(backend, tx, script, policies, MatchMode::Embedded).await.map(|_| ())
    }

    /// Boolean form of [`Self::assert_same_graph`]. Script and store errors
    /// still propagate.
    pub async fn is_same_graph<B: StorageBackend>(
        &self,
        backend: &B,
        tx: &B::Tx,
        script: &str,
        policies: &InclusionPolicies,
    ) -> Result<bool> {
        mismatch_as_false(self.assert_same_graph(backend, tx, script, policies).await)
    }

    /// Boolean form of [`Self::assert_subgraph`].
    pub async fn is_subgraph<B: StorageBackend>(
        &self,
        backend: &B,
        tx: &B::Tx,
        script: &str,
        policies: &InclusionPolicies,
    ) -> Result<bool> {
        mismatch_as_false(self.assert_subgraph(backend, tx, script, policies).await)
    }

    pub async fn clear_graph<B: StorageBackend>(
        &self,
        backend: &B,
        tx: &mut B::Tx,
        policies: &InclusionPolicies,
    ) -> Result<()> {
        clear::clear_graph(backend, tx, policies).await.map(|_| ())
    }

    /// Run `script` in a throwaway store and read it back through `policies`.
    pub async fn reference_graph(
        &self,
        script: &str,
        policies: &InclusionPolicies,
    ) -> Result<GraphSnapshot> {
        let store = MemoryBackend::new();
        let mut tx = store.begin_tx(TxMode::ReadWrite).await?;
        self.engine.execute(&store, &mut tx, script).await?;
        let graph = GraphSnapshot::capture(&store, &tx, policies).await?;
        store.commit_tx(tx).await?;
        Ok(graph)
    }

    /// Compare the store with the script under `mode`, returning the node
    /// mapping that proves the match.
    pub async fn compare<B: StorageBackend>(
        &self,
        backend: &B,
        tx: &B::Tx,
        script: &str,
        policies: &InclusionPolicies,
        mode: MatchMode,
    ) -> Result<Mapping> {
        let reference = self.reference_graph(script, policies).await?;
        let subject = GraphSnapshot::capture(backend, tx, policies).await?;

        match match_graphs(&reference, &subject, mode) {
            Ok(mapping) => Ok(mapping),
            Err(mismatch) => {
                let mismatch = if self.rendered_diagnostics {
                    mismatch.with_scripts(render_cypher(&reference), render_cypher(&subject))
                } else {
                    mismatch
                };
                Err(Error::Mismatch(Box::new(mismatch)))
            }
        }
    }
}

fn mismatch_as_false(result: Result<()>) -> Result<bool> {
    match result {
        Ok(()) => Ok(true),
        Err(Error::Mismatch(_)) => Ok(false),
        Err(e) => Err(e),
    }
}

// ============================================================================
// Free functions (default engine)
// ============================================================================

/// [`GraphUnit::assert_same_graph`] with the default [`CypherEngine`].
pub async fn assert_same_graph<B: StorageBackend>(
    backend: &B,
    tx: &B::Tx,
    script: &str,
    policies: &InclusionPolicies,
) -> Result<()> {
    GraphUnit::new().assert_same_graph(backend, tx, script, policies).await
}

/// [`GraphUnit::assert_subgraph`] with the default [`CypherEngine`].
pub async fn assert_subgraph<B: StorageBackend>(
    backend: &B,
    tx: &B::Tx,
    script: &str,
    policies: &InclusionPolicies,
) -> Result<()> {
    GraphUnit::new().assert_subgraph(backend, tx, script, policies).await
}

/// Delete everything `policies` admits from `backend`.
pub async fn clear_graph<B: StorageBackend>(
    backend: &B,
    tx: &mut B::Tx,
    policies: &InclusionPolicies,
) -> Result<()> {
    clear::clear_graph(backend, tx, policies).await.map(|_| ())
}
