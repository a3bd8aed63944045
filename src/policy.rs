//! Inclusion policies.
//!
//! A policy decides which nodes and relationships take part in a snapshot
//! or are eligible for deletion. Policies are plain values handed to every
//! call; a missing predicate means "include everything".

use std::fmt;
use std::sync::Arc;

use crate::model::{Node, Relationship};

/// Label/type prefix reserved for infrastructure elements that live in the
/// same store as application data.
pub const INTERNAL_PREFIX: &str = "_GA_";

/// Decides whether a node participates.
pub trait NodeInclusionPolicy: Send + Sync {
    fn include(&self, node: &Node) -> bool;
}

/// Decides whether a relationship participates.
pub trait RelationshipInclusionPolicy: Send + Sync {
    fn include(&self, relationship: &Relationship) -> bool;
}

impl<F> NodeInclusionPolicy for F
where
    F: Fn(&Node) -> bool + Send + Sync,
{
    fn include(&self, node: &Node) -> bool {
        self(node)
    }
}

impl<F> RelationshipInclusionPolicy for F
where
    F: Fn(&Relationship) -> bool + Send + Sync,
{
    fn include(&self, relationship: &Relationship) -> bool {
        self(relationship)
    }
}

/// Includes every node.
#[derive(Debug, Clone, Copy, Default)]
pub struct IncludeAllNodes;

impl NodeInclusionPolicy for IncludeAllNodes {
    fn include(&self, _node: &Node) -> bool {
        true
    }
}

/// Includes every relationship.
#[derive(Debug, Clone, Copy, Default)]
pub struct IncludeAllRelationships;

impl RelationshipInclusionPolicy for IncludeAllRelationships {
    fn include(&self, _relationship: &Relationship) -> bool {
        true
    }
}

/// Includes application nodes and skips infrastructure ones, i.e. nodes
/// carrying any label that starts with the internal prefix.
#[derive(Debug, Clone)]
pub struct IncludeAllBusinessNodes {
    prefix: String,
}

impl IncludeAllBusinessNodes {
    pub fn new() -> Self {
        Self { prefix: INTERNAL_PREFIX.to_string() }
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self { prefix: prefix.into() }
    }
}

impl Default for IncludeAllBusinessNodes {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeInclusionPolicy for IncludeAllBusinessNodes {
    fn include(&self, node: &Node) -> bool {
        !node.labels.iter().any(|l| l.starts_with(&self.prefix))
    }
}

/// Relationship counterpart of [`IncludeAllBusinessNodes`]: skips types
/// starting with the internal prefix.
#[derive(Debug, Clone)]
pub struct IncludeAllBusinessRelationships {
    prefix: String,
}

impl IncludeAllBusinessRelationships {
    pub fn new() -> Self {
        Self { prefix: INTERNAL_PREFIX.to_string() }
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self { prefix: prefix.into() }
    }
}

impl Default for IncludeAllBusinessRelationships {
    fn default() -> Self {
        Self::new()
    }
}

impl RelationshipInclusionPolicy for IncludeAllBusinessRelationships {
    fn include(&self, relationship: &Relationship) -> bool {
        !relationship.rel_type.starts_with(&self.prefix)
    }
}

/// The pair of predicates governing one snapshot or clear call.
///
/// `None` on either side is the permissive default, never an error.
#[derive(Clone, Default)]
pub struct InclusionPolicies {
    nodes: Option<Arc<dyn NodeInclusionPolicy>>,
    relationships: Option<Arc<dyn RelationshipInclusionPolicy>>,
}

impl InclusionPolicies {
    /// Include everything.
    pub fn include_all() -> Self {
        Self::default()
    }

    pub fn new(
        nodes: Option<Arc<dyn NodeInclusionPolicy>>,
        relationships: Option<Arc<dyn RelationshipInclusionPolicy>>,
    ) -> Self {
        Self { nodes, relationships }
    }

    pub fn with_nodes(mut self, policy: impl NodeInclusionPolicy + 'static) -> Self {
        self.nodes = Some(Arc::new(policy));
        self
    }

    pub fn with_relationships(mut self, policy: impl RelationshipInclusionPolicy + 'static) -> Self {
        self.relationships = Some(Arc::new(policy));
        self
    }

    pub fn includes_node(&self, node: &Node) -> bool {
        self.nodes.as_ref().is_none_or(|p| p.include(node))
    }

    /// Relationship predicate alone; endpoint inclusion is the snapshot's job.
    pub fn includes_relationship(&self, relationship: &Relationship) -> bool {
        self.relationships.as_ref().is_none_or(|p| p.include(relationship))
    }

    pub fn is_include_all(&self) -> bool {
        self.nodes.is_none() && self.relationships.is_none()
    }
}

impl fmt::Debug for InclusionPolicies {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InclusionPolicies")
            .field("nodes", &self.nodes.as_ref().map_or("all", |_| "custom"))
            .field("relationships", &self.relationships.as_ref().map_or("all", |_| "custom"))
            .finish()
    }
}
