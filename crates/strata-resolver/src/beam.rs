//! Bounded set of live states.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::state::StateId;

/// Keeps at most `width` states, evicting the lowest-scoring one on overflow.
///
/// Among equal scores the state created later is evicted first, so pruning
/// is stable with respect to creation order. The worst entry sits at the top
/// of the heap, so a push on a full beam costs `O(log width)`.
#[derive(Debug)]
pub struct Beam {
    width: usize,
    entries: BinaryHeap<Slot>,
}

#[derive(Debug, Clone, Copy)]
struct Slot {
    id: StateId,
    score: f64,
}

/// Worse slots compare greater: lower score, then later creation.
impl Ord for Slot {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .score
            .total_cmp(&self.score)
            .then_with(|| self.id.cmp(&other.id))
    }
}

impl PartialOrd for Slot {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Slot {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Slot {}

impl Beam {
    pub fn new(width: usize) -> Self {
        Self {
            width,
            entries: BinaryHeap::with_capacity(width.min(1024)),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Insert a state. Returns the state evicted to make room, which may be
    /// the one just offered.
    pub fn push(&mut self, id: StateId, score: f64) -> Option<StateId> {
        if self.width == 0 {
            return Some(id);
        }
        let slot = Slot { id, score };
        if self.entries.len() < self.width {
            self.entries.push(slot);
            return None;
        }
        let mut worst = self.entries.peek_mut()?;
        if slot >= *worst {
            return Some(id);
        }
        let evicted = std::mem::replace(&mut *worst, slot);
        Some(evicted.id)
    }

    /// Remove and return every live state, best first.
    pub fn take(&mut self) -> Vec<StateId> {
        std::mem::take(&mut self.entries)
            .into_sorted_vec()
            .into_iter()
            .map(|slot| slot.id)
            .collect()
    }

    pub fn contains(&self, id: StateId) -> bool {
        self.entries.iter().any(|slot| slot.id == id)
    }

    pub fn ids(&self) -> impl Iterator<Item = StateId> + '_ {
        self.entries.iter().map(|slot| slot.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::StateArena;

    fn ids(n: usize) -> Vec<StateId> {
        let mut arena = StateArena::new();
        (0..n).map(|_| arena.root(Vec::new())).collect()
    }

    #[test]
    fn evicts_lowest_score() {
        let ids = ids(3);
        let mut beam = Beam::new(2);
        assert_eq!(beam.push(ids[0], 1.0), None);
        assert_eq!(beam.push(ids[1], 3.0), None);
        assert_eq!(beam.push(ids[2], 2.0), Some(ids[0]));
        assert_eq!(beam.take(), vec![ids[1], ids[2]]);
    }

    #[test]
    fn rejects_newcomer_that_is_worst() {
        let ids = ids(3);
        let mut beam = Beam::new(2);
        beam.push(ids[0], 1.0);
        beam.push(ids[1], 1.0);
        assert_eq!(beam.push(ids[2], 1.0), Some(ids[2]));
        assert!(beam.contains(ids[0]));
        assert!(beam.contains(ids[1]));
    }

    #[test]
    fn ties_prefer_earlier_states() {
        let ids = ids(3);
        let mut beam = Beam::new(2);
        beam.push(ids[1], 0.0);
        beam.push(ids[2], 0.0);
        assert_eq!(beam.push(ids[0], 0.0), Some(ids[2]));
        assert_eq!(beam.take(), vec![ids[0], ids[1]]);
    }

    #[test]
    fn never_exceeds_width() {
        let ids = ids(50);
        let mut beam = Beam::new(7);
        for (i, id) in ids.iter().enumerate() {
            beam.push(*id, (i % 5) as f64);
            assert!(beam.len() <= 7);
        }
        assert_eq!(beam.len(), 7);
    }

    #[test]
    fn keeps_best_states_of_a_long_run() {
        let ids = ids(200);
        let score = |i: usize| ((i * 37) % 101) as f64;
        let mut beam = Beam::new(10);
        for (i, id) in ids.iter().enumerate() {
            beam.push(*id, score(i));
        }

        let mut expected: Vec<usize> = (0..ids.len()).collect();
        expected.sort_by(|&a, &b| score(b).total_cmp(&score(a)).then(a.cmp(&b)));
        let expected: Vec<StateId> = expected.into_iter().take(10).map(|i| ids[i]).collect();
        assert_eq!(beam.take(), expected);
        assert!(beam.is_empty());
    }
}
