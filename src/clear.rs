//! Policy-governed deletion.
//!
//! Relationships go first, then nodes. A node the policy includes is only
//! deleted once it has no relationships left; one that still carries a
//! relationship the policy protected is kept, because deleting it would
//! leave that relationship dangling.

use serde::Serialize;

use crate::model::Direction;
use crate::policy::InclusionPolicies;
use crate::storage::StorageBackend;
use crate::tx::Transaction;
use crate::{Error, Result};

/// What a clear removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ClearSummary {
    pub relationships_deleted: u64,
    pub nodes_deleted: u64,
    /// Included nodes kept because a protected relationship is attached.
    pub nodes_kept: u64,
}

/// Delete every relationship and node of `backend` that `policies` admits.
///
/// Runs inside the caller's transaction, which must be writable. Running it
/// again on the result is a no-op.
pub async fn clear_graph<B: StorageBackend>(
    backend: &B,
    tx: &mut B::Tx,
    policies: &InclusionPolicies,
) -> Result<ClearSummary> {
    if !tx.is_writable() {
        return Err(Error::TxError(format!(
            "cannot clear inside read-only transaction {}",
            tx.id()
        )));
    }

    let mut summary = ClearSummary::default();

    for rel in backend.all_relationships(tx).await? {
        if policies.includes_relationship(&rel) && backend.delete_relationship(tx, rel.id).await? {
            summary.relationships_deleted += 1;
        }
    }

    for node in backend.all_nodes(tx).await? {
        if !policies.includes_node(&node) {
            continue;
        }
        let attached = backend.get_relationships(tx, node.id, Direction::Both, None).await?;
        if attached.is_empty() {
            if backend.delete_node(tx, node.id).await? {
                summary.nodes_deleted += 1;
            }
        } else {
            tracing::warn!(
                node = %node.id,
                relationships = attached.len(),
                "keeping included node: protected relationships are still attached"
            );
            summary.nodes_kept += 1;
        }
    }

    tracing::info!(
        relationships = summary.relationships_deleted,
        nodes = summary.nodes_deleted,
        kept = summary.nodes_kept,
        "cleared graph"
    );
    Ok(summary)
}
