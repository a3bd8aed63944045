//! Backtracking state: the partial node mapping and bucket reservations.
//!
//! Node assignments live in fixed slots indexed by reference position.
//! Bucket reservations are appended to a journal so that backtracking is a
//! truncation back to a saved mark; nothing is undone implicitly.

use hashbrown::HashMap;

/// One entry of a subject bucket: `(start, end)` positions plus the entry
/// index inside that pair's [`SignatureBucket`](crate::signature::SignatureBucket).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct BucketSlot {
    pub pair: (usize, usize),
    pub entry: usize,
}

#[derive(Debug, Clone, Copy)]
struct Reservation {
    slot: BucketSlot,
    units: usize,
}

/// Journal position returned by [`MappingState::mark`].
#[derive(Debug, Clone, Copy)]
pub(crate) struct Mark(usize);

pub(crate) struct MappingState {
    /// Reference position → subject position.
    assigned: Vec<Option<usize>>,
    /// Subject position → taken.
    used: Vec<bool>,
    consumed: HashMap<BucketSlot, usize>,
    journal: Vec<Reservation>,
    reserved_total: usize,
}

impl MappingState {
    pub(crate) fn new(reference_nodes: usize, subject_nodes: usize) -> Self {
        Self {
            assigned: vec![None; reference_nodes],
            used: vec![false; subject_nodes],
            consumed: HashMap::new(),
            journal: Vec::new(),
            reserved_total: 0,
        }
    }

    pub(crate) fn assigned(&self, r: usize) -> Option<usize> {
        self.assigned[r]
    }

    pub(crate) fn is_used(&self, s: usize) -> bool {
        self.used[s]
    }

    pub(crate) fn place(&mut self, r: usize, s: usize) {
        debug_assert!(self.assigned[r].is_none() && !self.used[s]);
        self.assigned[r] = Some(s);
        self.used[s] = true;
    }

    pub(crate) fn unplace(&mut self, r: usize, s: usize) {
        debug_assert_eq!(self.assigned[r], Some(s));
        self.assigned[r] = None;
        self.used[s] = false;
    }

    pub(crate) fn consumed(&self, slot: BucketSlot) -> usize {
        self.consumed.get(&slot).copied().unwrap_or(0)
    }

    pub(crate) fn reserve(&mut self, slot: BucketSlot, units: usize) {
        *self.consumed.entry(slot).or_insert(0) += units;
        self.reserved_total += units;
        self.journal.push(Reservation { slot, units });
    }

    pub(crate) fn mark(&self) -> Mark {
        Mark(self.journal.len())
    }

    /// Release every reservation made after `mark`.
    pub(crate) fn rollback(&mut self, mark: Mark) {
        while self.journal.len() > mark.0 {
            let Some(Reservation { slot, units }) = self.journal.pop() else { break };
            if let Some(count) = self.consumed.get_mut(&slot) {
                *count -= units;
                if *count == 0 {
                    self.consumed.remove(&slot);
                }
            }
            self.reserved_total -= units;
        }
    }

    /// Relationship units reserved so far, across all buckets.
    pub(crate) fn reserved_total(&self) -> usize {
        self.reserved_total
    }

    /// `(reference, subject)` position pairs of the current mapping.
    pub(crate) fn pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.assigned.iter().enumerate().filter_map(|(r, s)| s.map(|s| (r, s)))
    }
}
