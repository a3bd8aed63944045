//! Mismatch diagnostics.

use std::fmt;

use serde::Serialize;

use super::MatchMode;

/// Why no mapping exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "kind")]
pub enum MismatchReason {
    #[error("node count differs: reference has {reference}, subject has {subject}")]
    NodeCount { reference: usize, subject: usize },

    #[error("relationship count differs: reference has {reference}, subject has {subject}")]
    RelationshipCount { reference: usize, subject: usize },

    #[error("no subject node can stand in for reference node {node}")]
    UnmatchedNode { node: String },

    /// A signature bucket between two placed nodes could not be satisfied.
    /// `start` and `end` describe the reference nodes.
    #[error("{start}-{relationship}->{end}: reference requires {required}, subject has {available}")]
    Bucket {
        start: String,
        end: String,
        relationship: String,
        required: usize,
        available: usize,
    },

    #[error("{unmatched_relationships} subject relationship(s) left unmatched")]
    SubjectNotCovered { unmatched_relationships: usize },
}

/// A failed graph assertion.
#[derive(Debug, Clone, Serialize)]
pub struct GraphMismatch {
    pub mode: MatchMode,
    pub reference_nodes: usize,
    pub reference_relationships: usize,
    pub subject_nodes: usize,
    pub subject_relationships: usize,
    pub reason: MismatchReason,
    /// Rendered reference graph, when diagnostics rendering is on.
    pub expected: Option<String>,
    /// Rendered subject graph, when diagnostics rendering is on.
    pub actual: Option<String>,
}

impl GraphMismatch {
    /// Attach rendered scripts of both graphs.
    pub fn with_scripts(mut self, expected: String, actual: String) -> Self {
        self.expected = Some(expected);
        self.actual = Some(actual);
        self
    }
}

impl fmt::Display for GraphMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let headline = match self.mode {
            MatchMode::Exact => "graphs are not the same",
            MatchMode::Embedded => "reference graph is not a subgraph of the subject",
        };
        write!(f, "{headline}: {}", self.reason)?;
        write!(
            f,
            "\n  reference: {} nodes, {} relationships\n  subject:   {} nodes, {} relationships",
            self.reference_nodes,
            self.reference_relationships,
            self.subject_nodes,
            self.subject_relationships,
        )?;
        if let (Some(expected), Some(actual)) = (&self.expected, &self.actual) {
            write!(f, "\nexpected:\n{expected}\nactual:\n{actual}")?;
        }
        Ok(())
    }
}

impl std::error::Error for GraphMismatch {}
