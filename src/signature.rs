//! Relationship signatures and per-node-pair buckets.
//!
//! Two relationships between the same ordered node pair that share a type
//! and a (semantically equal) property map are interchangeable: a matcher
//! may pair either of them with a reference relationship. Grouping them
//! into counted buckets lets the matcher reserve capacity instead of
//! picking individual relationship identities.

use hashbrown::HashMap;
use smallvec::SmallVec;

use crate::equality::properties_equal;
use crate::model::{NodeId, PropertyMap, Relationship};
use crate::snapshot::GraphSnapshot;

/// The `(type, properties)` key of a relationship.
#[derive(Debug, Clone)]
pub struct RelSignature {
    pub rel_type: String,
    pub properties: PropertyMap,
}

impl RelSignature {
    pub fn of(rel: &Relationship) -> Self {
        Self {
            rel_type: rel.rel_type.clone(),
            properties: rel.properties.clone(),
        }
    }

    /// Semantic equality: same type and [`properties_equal`] maps.
    pub fn matches(&self, other: &RelSignature) -> bool {
        self.rel_type == other.rel_type && properties_equal(&self.properties, &other.properties)
    }

    fn matches_rel(&self, rel: &Relationship) -> bool {
        self.rel_type == rel.rel_type && properties_equal(&self.properties, &rel.properties)
    }
}

/// Signature → count for one ordered node pair.
#[derive(Debug, Clone, Default)]
pub struct SignatureBucket {
    entries: SmallVec<[(RelSignature, usize); 2]>,
}

impl SignatureBucket {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, rel: &Relationship) {
        match self.entries.iter_mut().find(|(sig, _)| sig.matches_rel(rel)) {
            Some((_, count)) => *count += 1,
            None => self.entries.push((RelSignature::of(rel), 1)),
        }
    }

    /// Position of the entry whose signature matches `sig`.
    pub fn find(&self, sig: &RelSignature) -> Option<usize> {
        self.entries.iter().position(|(own, _)| own.matches(sig))
    }

    /// Count of relationships with a signature matching `sig`.
    pub fn count(&self, sig: &RelSignature) -> usize {
        self.find(sig).map_or(0, |i| self.entries[i].1)
    }

    pub fn entries(&self) -> &[(RelSignature, usize)] {
        &self.entries
    }

    /// Total relationships across all signatures.
    pub fn total(&self) -> usize {
        self.entries.iter().map(|(_, n)| n).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Bucket of relationships from `a` to `b` in `graph`.
pub fn signature_bucket(graph: &GraphSnapshot, a: NodeId, b: NodeId) -> SignatureBucket {
    let mut bucket = SignatureBucket::new();
    for rel in graph.relationships().iter().filter(|r| r.src == a && r.dst == b) {
        bucket.add(rel);
    }
    bucket
}

/// Every non-empty bucket of a snapshot, keyed by dense node positions,
/// plus per-node degree and adjacency used to order and prune the search.
#[derive(Debug, Clone)]
pub struct SignatureIndex {
    buckets: HashMap<(usize, usize), SignatureBucket>,
    out_degree: Vec<usize>,
    in_degree: Vec<usize>,
    neighbours: Vec<SmallVec<[usize; 4]>>,
    relationships: usize,
}

impl SignatureIndex {
    pub fn build(graph: &GraphSnapshot) -> Self {
        let n = graph.node_count();
        let mut buckets: HashMap<(usize, usize), SignatureBucket> = HashMap::new();
        let mut out_degree = vec![0; n];
        let mut in_degree = vec![0; n];
        let mut neighbours: Vec<SmallVec<[usize; 4]>> = vec![SmallVec::new(); n];

        for rel in graph.relationships() {
            // Snapshots never hold dangling relationships.
            let (Some(a), Some(b)) = (graph.position(rel.src), graph.position(rel.dst)) else {
                continue;
            };
            buckets.entry((a, b)).or_default().add(rel);
            out_degree[a] += 1;
            in_degree[b] += 1;
            if !neighbours[a].contains(&b) {
                neighbours[a].push(b);
            }
            if !neighbours[b].contains(&a) {
                neighbours[b].push(a);
            }
        }

        Self {
            buckets,
            out_degree,
            in_degree,
            neighbours,
            relationships: graph.relationship_count(),
        }
    }

    pub fn bucket(&self, a: usize, b: usize) -> Option<&SignatureBucket> {
        self.buckets.get(&(a, b))
    }

    pub fn relationship_count(&self) -> usize {
        self.relationships
    }

    pub fn out_degree(&self, a: usize) -> usize {
        self.out_degree[a]
    }

    pub fn in_degree(&self, a: usize) -> usize {
        self.in_degree[a]
    }

    pub fn degree(&self, a: usize) -> usize {
        self.out_degree[a] + self.in_degree[a]
    }

    /// Nodes sharing at least one relationship with `a`, in either direction
    /// (`a` itself when it has a self-loop).
    pub fn neighbours(&self, a: usize) -> &[usize] {
        &self.neighbours[a]
    }

    pub fn is_adjacent(&self, a: usize, b: usize) -> bool {
        self.neighbours[a].contains(&b)
    }
}
