//! Graph snapshots.
//!
//! A [`GraphSnapshot`] is one consistent, policy-filtered read of a store,
//! frozen into memory. It never holds a relationship whose endpoints are
//! not both present.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::model::{Node, NodeId, Relationship};
use crate::policy::InclusionPolicies;
use crate::storage::StorageBackend;
use crate::{Error, Result};

/// Immutable in-memory graph.
#[derive(Debug, Clone, Default, Serialize)]
pub struct GraphSnapshot {
    nodes: Vec<Node>,
    relationships: Vec<Relationship>,
    #[serde(skip)]
    positions: HashMap<NodeId, usize>,
}

impl GraphSnapshot {
    /// Build a snapshot from parts. Elements are ordered by id.
    ///
    /// Fails with `ConstraintViolation` on a dangling relationship or a
    /// duplicate node id.
    pub fn new(mut nodes: Vec<Node>, mut relationships: Vec<Relationship>) -> Result<Self> {
        nodes.sort_by_key(|n| n.id);
        relationships.sort_by_key(|r| r.id);

        let mut positions = HashMap::with_capacity(nodes.len());
        for (i, node) in nodes.iter().enumerate() {
            if positions.insert(node.id, i).is_some() {
                return Err(Error::ConstraintViolation(format!("duplicate node {}", node.id)));
            }
        }
        if let Some(rel) = relationships
            .iter()
            .find(|r| !positions.contains_key(&r.src) || !positions.contains_key(&r.dst))
        {
            return Err(Error::ConstraintViolation(format!(
                "relationship {} ({} -> {}) has an endpoint outside the graph",
                rel.id, rel.src, rel.dst
            )));
        }

        Ok(Self { nodes, relationships, positions })
    }

    /// Read every live element of `backend` that `policies` admits.
    ///
    /// A relationship is kept only when the relationship predicate holds and
    /// both of its endpoints were kept.
    pub async fn capture<B: StorageBackend>(
        backend: &B,
        tx: &B::Tx,
        policies: &InclusionPolicies,
    ) -> Result<Self> {
        let nodes: Vec<Node> = backend
            .all_nodes(tx)
            .await?
            .into_iter()
            .filter(|n| policies.includes_node(n))
            .collect();
        let included: HashSet<NodeId> = nodes.iter().map(|n| n.id).collect();

        let relationships: Vec<Relationship> = backend
            .all_relationships(tx)
            .await?
            .into_iter()
            .filter(|r| included.contains(&r.src) && included.contains(&r.dst))
            .filter(|r| policies.includes_relationship(r))
            .collect();

        tracing::debug!(
            nodes = nodes.len(),
            relationships = relationships.len(),
            "captured graph snapshot"
        );
        Self::new(nodes, relationships)
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn relationships(&self) -> &[Relationship] {
        &self.relationships
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn relationship_count(&self) -> usize {
        self.relationships.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Dense position of a node in [`Self::nodes`].
    pub fn position(&self, id: NodeId) -> Option<usize> {
        self.positions.get(&id).copied()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.position(id).map(|i| &self.nodes[i])
    }

    /// Pretty JSON dump of the snapshot.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{PropertyMap, RelId, Value};
    use crate::storage::MemoryBackend;
    use crate::tx::TxMode;

    #[test]
    fn test_new_rejects_dangling_relationship() {
        let nodes = vec![Node::new(NodeId(0))];
        let rels = vec![Relationship::new(RelId(0), NodeId(0), NodeId(1), "R")];
        assert!(matches!(GraphSnapshot::new(nodes, rels), Err(Error::ConstraintViolation(_))));
    }

    #[tokio::test]
    async fn test_capture_drops_relationships_of_excluded_nodes() {
        let db = MemoryBackend::new();
        let mut tx = db.begin_tx(TxMode::ReadWrite).await.unwrap();
        let a = db.create_node(&mut tx, &["Keep"], PropertyMap::new()).await.unwrap();
        let b = db.create_node(&mut tx, &["Skip"], PropertyMap::new()).await.unwrap();
        let c = db.create_node(&mut tx, &["Keep"], PropertyMap::new()).await.unwrap();
        db.create_relationship(&mut tx, a, b, "R", PropertyMap::new()).await.unwrap();
        db.create_relationship(&mut tx, a, c, "R", PropertyMap::new()).await.unwrap();
        db.create_relationship(&mut tx, c, a, "NEXT", PropertyMap::new()).await.unwrap();

        let policies = InclusionPolicies::include_all()
            .with_nodes(|n: &Node| n.has_label("Keep"))
            .with_relationships(|r: &Relationship| r.rel_type != "NEXT");
        let snapshot = GraphSnapshot::capture(&db, &tx, &policies).await.unwrap();

        assert_eq!(snapshot.node_count(), 2);
        assert_eq!(snapshot.relationship_count(), 1);
        let rel = &snapshot.relationships()[0];
        assert_eq!((rel.src, rel.dst), (a, c));
    }

    #[tokio::test]
    async fn test_capture_orders_by_id_and_serializes() {
        let db = MemoryBackend::new();
        let mut tx = db.begin_tx(TxMode::ReadWrite).await.unwrap();
        for i in 0..3 {
            let mut props = PropertyMap::new();
            props.insert("i".into(), Value::Int(i));
            db.create_node(&mut tx, &[], props).await.unwrap();
        }

        let snapshot = GraphSnapshot::capture(&db, &tx, &InclusionPolicies::include_all()).await.unwrap();
        let ids: Vec<u64> = snapshot.nodes().iter().map(|n| n.id.0).collect();
        assert_eq!(ids, vec![0, 1, 2]);
        assert_eq!(snapshot.position(NodeId(2)), Some(2));

        let json = snapshot.to_json().unwrap();
        assert!(json.contains("\"nodes\""));
        assert!(!json.contains("positions"));
    }
}
