//! # Graph Matcher
//!
//! Backtracking search for a structure-preserving node mapping from a
//! reference graph into a subject graph.
//!
//! ```text
//! reference ─┐                        ┌─ Exact:    bijection, nothing left over
//!            ├─ candidates ─▶ search ─┤
//! subject ───┘                        └─ Embedded: injection, subject may have more
//! ```
//!
//! Relationships are never paired one by one. Placing a reference node
//! checks, for every already-placed partner, the [`SignatureBucket`]s
//! between the two reference nodes against the buckets between their
//! images, and reserves capacity there. Reservations are journaled in
//! [`state::MappingState`] and released on backtrack, so a subject
//! relationship can never be claimed twice.
//!
//! [`SignatureBucket`]: crate::signature::SignatureBucket

mod mismatch;
pub(crate) mod state;

use serde::Serialize;

use crate::equality::properties_equal;
use crate::export::{node_pattern, signature_pattern};
use crate::model::{Node, NodeId};
use crate::signature::{RelSignature, SignatureIndex};
use crate::snapshot::GraphSnapshot;

pub use mismatch::{GraphMismatch, MismatchReason};
use state::{BucketSlot, MappingState};

/// Comparison mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum MatchMode {
    /// Bijection over all nodes and relationships of both graphs.
    Exact,
    /// Injection of the reference into the subject.
    Embedded,
}

impl std::fmt::Display for MatchMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchMode::Exact => write!(f, "exact"),
            MatchMode::Embedded => write!(f, "embedded"),
        }
    }
}

/// A successful mapping, reference node → subject node, ordered by
/// reference id.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Mapping {
    pairs: Vec<(NodeId, NodeId)>,
}

impl Mapping {
    pub fn get(&self, reference: NodeId) -> Option<NodeId> {
        self.pairs
            .binary_search_by_key(&reference, |(r, _)| *r)
            .ok()
            .map(|i| self.pairs[i].1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, NodeId)> + '_ {
        self.pairs.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Label sets equal as sets and property maps semantically equal.
pub fn node_predicate_matches(reference: &Node, subject: &Node) -> bool {
    reference.label_set() == subject.label_set()
        && properties_equal(&reference.properties, &subject.properties)
}

/// Find a mapping of `reference` into `subject` under `mode`.
///
/// The returned [`GraphMismatch`] carries no rendered scripts; callers
/// attach them with [`GraphMismatch::with_scripts`].
pub fn match_graphs(
    reference: &GraphSnapshot,
    subject: &GraphSnapshot,
    mode: MatchMode,
) -> std::result::Result<Mapping, GraphMismatch> {
    let fail = |reason: MismatchReason| GraphMismatch {
        mode,
        reference_nodes: reference.node_count(),
        reference_relationships: reference.relationship_count(),
        subject_nodes: subject.node_count(),
        subject_relationships: subject.relationship_count(),
        reason,
        expected: None,
        actual: None,
    };

    if let Some(reason) = cardinality_gate(reference, subject, mode) {
        tracing::debug!(%mode, %reason, "rejected before search");
        return Err(fail(reason));
    }

    let mut search = Search::new(reference, subject, mode);
    if let Some(r) = search.candidates.iter().position(Vec::is_empty) {
        let reason = MismatchReason::UnmatchedNode { node: describe(&reference.nodes()[r]) };
        tracing::debug!(%mode, %reason, "reference node has no candidates");
        return Err(fail(reason));
    }

    tracing::debug!(
        %mode,
        reference_nodes = reference.node_count(),
        subject_nodes = subject.node_count(),
        "starting mapping search"
    );
    let found = search.extend(0);
    tracing::debug!(%mode, found, placements = search.placements, "mapping search finished");

    if found {
        let mut pairs: Vec<(NodeId, NodeId)> = search
            .state
            .pairs()
            .map(|(r, s)| (reference.nodes()[r].id, subject.nodes()[s].id))
            .collect();
        pairs.sort_unstable();
        Ok(Mapping { pairs })
    } else {
        let reason = search.deepest.map(|(_, reason)| reason).unwrap_or_else(|| {
            MismatchReason::SubjectNotCovered {
                unmatched_relationships: subject.relationship_count(),
            }
        });
        Err(fail(reason))
    }
}

/// Count checks that need no search. Exact needs equal sizes; an injection
/// needs a subject at least as large as the reference.
fn cardinality_gate(
    reference: &GraphSnapshot,
    subject: &GraphSnapshot,
    mode: MatchMode,
) -> Option<MismatchReason> {
    let (rn, sn) = (reference.node_count(), subject.node_count());
    let (rr, sr) = (reference.relationship_count(), subject.relationship_count());
    let nodes_ok = match mode {
        MatchMode::Exact => rn == sn,
        MatchMode::Embedded => rn <= sn,
    };
    if !nodes_ok {
        return Some(MismatchReason::NodeCount { reference: rn, subject: sn });
    }
    let rels_ok = match mode {
        MatchMode::Exact => rr == sr,
        MatchMode::Embedded => rr <= sr,
    };
    if !rels_ok {
        return Some(MismatchReason::RelationshipCount { reference: rr, subject: sr });
    }
    None
}

fn describe(node: &Node) -> String {
    node_pattern("", node)
}

// ============================================================================
// Search
// ============================================================================

struct Search<'g> {
    mode: MatchMode,
    reference: &'g GraphSnapshot,
    ref_index: SignatureIndex,
    sub_index: SignatureIndex,
    /// Reference position → subject positions passing the node predicate
    /// and the degree bound.
    candidates: Vec<Vec<usize>>,
    /// Reference positions in placement order.
    order: Vec<usize>,
    state: MappingState,
    /// Failure recorded at the deepest placement depth.
    deepest: Option<(usize, MismatchReason)>,
    placements: u64,
}

impl<'g> Search<'g> {
    fn new(reference: &'g GraphSnapshot, subject: &'g GraphSnapshot, mode: MatchMode) -> Self {
        let ref_index = SignatureIndex::build(reference);
        let sub_index = SignatureIndex::build(subject);

        let candidates: Vec<Vec<usize>> = reference
            .nodes()
            .iter()
            .enumerate()
            .map(|(r, rn)| {
                subject
                    .nodes()
                    .iter()
                    .enumerate()
                    .filter(|(s, sn)| {
                        degrees_fit(mode, &ref_index, r, &sub_index, *s)
                            && node_predicate_matches(rn, sn)
                    })
                    .map(|(s, _)| s)
                    .collect()
            })
            .collect();

        let order = placement_order(&ref_index, &candidates);

        Self {
            mode,
            reference,
            ref_index,
            sub_index,
            candidates,
            order,
            state: MappingState::new(reference.node_count(), subject.node_count()),
            deepest: None,
            placements: 0,
        }
    }

    fn extend(&mut self, depth: usize) -> bool {
        if depth == self.order.len() {
            return self.complete(depth);
        }

        let r = self.order[depth];
        let mut tried = false;
        for i in 0..self.candidates[r].len() {
            let s = self.candidates[r][i];
            if self.state.is_used(s) {
                continue;
            }
            tried = true;
            self.placements += 1;

            let mark = self.state.mark();
            self.state.place(r, s);
            match self.connect(depth, r, s) {
                Ok(()) => {
                    if self.extend(depth + 1) {
                        return true;
                    }
                }
                Err(reason) => {
                    tracing::trace!(depth, r, s, %reason, "candidate rejected");
                    self.record(depth, reason);
                }
            }
            self.state.rollback(mark);
            self.state.unplace(r, s);
        }

        if !tried {
            let node = describe(&self.reference.nodes()[r]);
            self.record(depth, MismatchReason::UnmatchedNode { node });
        }
        tracing::trace!(depth, r, "backtracking");
        false
    }

    /// Check and reserve every bucket between `r` (just placed on `s`) and
    /// the reference nodes placed before it, including `r` itself for
    /// self-loops.
    fn connect(&mut self, depth: usize, r: usize, s: usize) -> Result<(), MismatchReason> {
        for k in 0..=depth {
            let partner = self.order[k];
            // Embedded leaves unrelated subject pairs alone; Exact must also
            // see subject relationships the reference does not have.
            if self.mode == MatchMode::Embedded && !self.ref_index.is_adjacent(r, partner) {
                continue;
            }
            let Some(image) = self.state.assigned(partner) else {
                continue;
            };
            self.check_pair((partner, r), (image, s))?;
            if partner != r {
                self.check_pair((r, partner), (s, image))?;
            }
        }
        Ok(())
    }

    fn check_pair(
        &mut self,
        (a, b): (usize, usize),
        (x, y): (usize, usize),
    ) -> Result<(), MismatchReason> {
        let subject_bucket = self.sub_index.bucket(x, y);

        if let Some(reference_bucket) = self.ref_index.bucket(a, b) {
            for (sig, required) in reference_bucket.entries() {
                let found = subject_bucket
                    .and_then(|bucket| bucket.find(sig).map(|e| (e, bucket.entries()[e].1)));
                let Some((entry, total)) = found else {
                    return Err(bucket_failure(self.reference, (a, b), sig, *required, 0));
                };
                let slot = BucketSlot { pair: (x, y), entry };
                let available = total - self.state.consumed(slot);
                let fits = match self.mode {
                    MatchMode::Exact => available == *required,
                    MatchMode::Embedded => available >= *required,
                };
                if !fits {
                    return Err(bucket_failure(self.reference, (a, b), sig, *required, available));
                }
                self.state.reserve(slot, *required);
            }
        }

        if self.mode == MatchMode::Exact {
            if let Some(bucket) = subject_bucket {
                for (entry, (sig, total)) in bucket.entries().iter().enumerate() {
                    let left = total - self.state.consumed(BucketSlot { pair: (x, y), entry });
                    if left > 0 {
                        return Err(bucket_failure(self.reference, (a, b), sig, 0, left));
                    }
                }
            }
        }
        Ok(())
    }

    fn complete(&mut self, depth: usize) -> bool {
        if self.mode == MatchMode::Exact {
            let total = self.sub_index.relationship_count();
            let reserved = self.state.reserved_total();
            if reserved != total {
                self.record(
                    depth,
                    MismatchReason::SubjectNotCovered { unmatched_relationships: total - reserved },
                );
                return false;
            }
        }
        true
    }

    fn record(&mut self, depth: usize, reason: MismatchReason) {
        if self.deepest.as_ref().is_none_or(|(d, _)| depth > *d) {
            self.deepest = Some((depth, reason));
        }
    }
}

fn degrees_fit(
    mode: MatchMode,
    reference: &SignatureIndex,
    r: usize,
    subject: &SignatureIndex,
    s: usize,
) -> bool {
    match mode {
        MatchMode::Exact => {
            reference.out_degree(r) == subject.out_degree(s)
                && reference.in_degree(r) == subject.in_degree(s)
        }
        MatchMode::Embedded => {
            reference.out_degree(r) <= subject.out_degree(s)
                && reference.in_degree(r) <= subject.in_degree(s)
        }
    }
}

fn bucket_failure(
    reference: &GraphSnapshot,
    (a, b): (usize, usize),
    sig: &RelSignature,
    required: usize,
    available: usize,
) -> MismatchReason {
    MismatchReason::Bucket {
        start: describe(&reference.nodes()[a]),
        end: describe(&reference.nodes()[b]),
        relationship: signature_pattern(&sig.rel_type, &sig.properties),
        required,
        available,
    }
}

/// Greedy connectivity order: start from the most constrained node, then
/// repeatedly take the node with the most edges into the placed set, so
/// bucket checks prune as early as possible.
fn placement_order(index: &SignatureIndex, candidates: &[Vec<usize>]) -> Vec<usize> {
    let n = candidates.len();
    let mut placed = vec![false; n];
    let mut order = Vec::with_capacity(n);

    while order.len() < n {
        let next = (0..n)
            .filter(|&r| !placed[r])
            .max_by_key(|&r| {
                let links = index.neighbours(r).iter().filter(|&&p| placed[p]).count();
                (
                    links,
                    std::cmp::Reverse(candidates[r].len()),
                    index.degree(r),
                    std::cmp::Reverse(r),
                )
            });
        let Some(r) = next else { break };
        placed[r] = true;
        order.push(r);
    }
    order
}
