use std::{
    cmp::Ordering,
    fmt,
    sync::Arc,
};

use anyhow::Result;
use num::{
    BigInt,
    BigRational,
    One,
};

use crate::error::illegal_usage;

/// A comparable token belonging to an [`OrderKeySequence`].
///
/// Keys compare by their numeric position, so they can be used directly as sort keys. A new key can
/// always be inserted strictly between two existing neighbors, so existing keys never need to be
/// renumbered.
#[derive(Clone)]
pub struct OrderKey {
    sequence: Arc<()>,
    index: usize,
    value: Arc<BigRational>,
}

impl OrderKey {
    /// The numeric position of the key.
    pub fn value(&self) -> &BigRational {
        &self.value
    }
}

impl PartialEq for OrderKey {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl Eq for OrderKey {}

impl Ord for OrderKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.value.cmp(&other.value)
    }
}

impl PartialOrd for OrderKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Debug for OrderKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OrderKey({})", self.value)
    }
}

struct Node {
    value: Arc<BigRational>,
    prev: Option<usize>,
    next: Option<usize>,
}

/// A dense, insertable total order of [`OrderKey`]s.
///
/// Nodes form a doubly-linked list in ascending order, so inserting next to an existing key is
/// constant time. Positions are exact rationals: the key between two neighbors is their average,
/// and a key past either end is one step beyond it.
pub struct OrderKeySequence {
    token: Arc<()>,
    nodes: Vec<Node>,
    first: Option<usize>,
    last: Option<usize>,
}

impl OrderKeySequence {
    /// Creates a new empty sequence.
    pub fn new() -> Self {
        Self {
            token: Arc::new(()),
            nodes: Vec::new(),
            first: None,
            last: None,
        }
    }

    /// Number of keys in the sequence.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Is the sequence empty?
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Checks if the key was created by this sequence.
    pub fn contains(&self, key: &OrderKey) -> bool {
        Arc::ptr_eq(&self.token, &key.sequence)
            && self
                .nodes
                .get(key.index)
                .is_some_and(|node| node.value == key.value)
    }

    /// The smallest key, if any.
    pub fn first(&self) -> Option<OrderKey> {
        self.first.map(|index| self.key_at(index))
    }

    /// The largest key, if any.
    pub fn last(&self) -> Option<OrderKey> {
        self.last.map(|index| self.key_at(index))
    }

    /// Iterates over all keys in ascending order.
    ///
    /// The iterator is double-ended, so `.rev()` iterates in descending order.
    pub fn iter(&self) -> OrderKeyIter<'_> {
        OrderKeyIter {
            sequence: self,
            front: self.first,
            back: self.last,
            remaining: self.nodes.len(),
        }
    }

    /// Creates a key before every existing key.
    pub fn new_first(&mut self) -> OrderKey {
        match self.first {
            Some(first) => {
                let value = self.nodes[first].value.as_ref() - BigRational::one();
                self.insert(value, None, Some(first))
            }
            None => self.insert(BigRational::from_integer(BigInt::from(0)), None, None),
        }
    }

    /// Creates a key after every existing key.
    pub fn new_last(&mut self) -> OrderKey {
        match self.last {
            Some(last) => {
                let value = self.nodes[last].value.as_ref() + BigRational::one();
                self.insert(value, Some(last), None)
            }
            None => self.insert(BigRational::from_integer(BigInt::from(0)), None, None),
        }
    }

    /// Creates a key immediately before the given key.
    pub fn new_before(&mut self, key: &OrderKey) -> Result<OrderKey> {
        self.check_contains(key)?;
        let next = key.index;
        Ok(match self.nodes[next].prev {
            Some(prev) => {
                let value = self.midpoint(prev, next);
                self.insert(value, Some(prev), Some(next))
            }
            None => self.new_first(),
        })
    }

    /// Creates a key immediately after the given key.
    pub fn new_after(&mut self, key: &OrderKey) -> Result<OrderKey> {
        self.check_contains(key)?;
        let prev = key.index;
        Ok(match self.nodes[prev].next {
            Some(next) => {
                let value = self.midpoint(prev, next);
                self.insert(value, Some(prev), Some(next))
            }
            None => self.new_last(),
        })
    }

    /// Creates a key strictly between two keys, where `lower < upper`.
    ///
    /// The new key is placed immediately after `lower`.
    pub fn new_between(&mut self, lower: &OrderKey, upper: &OrderKey) -> Result<OrderKey> {
        self.check_contains(upper)?;
        if lower >= upper {
            return Err(illegal_usage(format!(
                "cannot insert between {lower:?} and {upper:?}"
            )));
        }
        self.new_after(lower)
    }

    fn check_contains(&self, key: &OrderKey) -> Result<()> {
        if self.contains(key) {
            Ok(())
        } else {
            Err(illegal_usage(format!("{key:?} does not belong to this sequence")))
        }
    }

    fn midpoint(&self, a: usize, b: usize) -> BigRational {
        (self.nodes[a].value.as_ref() + self.nodes[b].value.as_ref())
            / BigRational::from_integer(BigInt::from(2))
    }

    fn key_at(&self, index: usize) -> OrderKey {
        OrderKey {
            sequence: self.token.clone(),
            index,
            value: self.nodes[index].value.clone(),
        }
    }

    fn insert(&mut self, value: BigRational, prev: Option<usize>, next: Option<usize>) -> OrderKey {
        let index = self.nodes.len();
        self.nodes.push(Node {
            value: Arc::new(value),
            prev,
            next,
        });
        match prev {
            Some(prev) => self.nodes[prev].next = Some(index),
            None => self.first = Some(index),
        }
        match next {
            Some(next) => self.nodes[next].prev = Some(index),
            None => self.last = Some(index),
        }
        self.key_at(index)
    }
}

impl Default for OrderKeySequence {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over the keys of an [`OrderKeySequence`].
pub struct OrderKeyIter<'s> {
    sequence: &'s OrderKeySequence,
    front: Option<usize>,
    back: Option<usize>,
    remaining: usize,
}

impl Iterator for OrderKeyIter<'_> {
    type Item = OrderKey;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let index = self.front?;
        self.front = self.sequence.nodes[index].next;
        self.remaining -= 1;
        Some(self.sequence.key_at(index))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl DoubleEndedIterator for OrderKeyIter<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let index = self.back?;
        self.back = self.sequence.nodes[index].prev;
        self.remaining -= 1;
        Some(self.sequence.key_at(index))
    }
}

impl ExactSizeIterator for OrderKeyIter<'_> {}

#[cfg(test)]
mod order_key_test {
    use itertools::Itertools;

    use crate::common::OrderKeySequence;

    #[test]
    fn first_key_is_zero() {
        let mut sequence = OrderKeySequence::new();
        let key = sequence.new_first();
        assert_eq!(key.value().to_string(), "0");
        assert!(sequence.contains(&key));
        assert_eq!(sequence.len(), 1);
    }

    #[test]
    fn keys_at_ends_step_by_one() {
        let mut sequence = OrderKeySequence::new();
        let middle = sequence.new_last();
        let last = sequence.new_last();
        let first = sequence.new_first();
        assert_eq!(first.value().to_string(), "-1");
        assert_eq!(middle.value().to_string(), "0");
        assert_eq!(last.value().to_string(), "1");
        assert!(first < middle);
        assert!(middle < last);
    }

    #[test]
    fn inserts_between_neighbors() {
        let mut sequence = OrderKeySequence::new();
        let a = sequence.new_last();
        let c = sequence.new_last();
        let b = sequence.new_after(&a).unwrap();
        assert_eq!(b.value().to_string(), "1/2");
        let b2 = sequence.new_before(&b).unwrap();
        assert_eq!(b2.value().to_string(), "1/4");
        assert!(a < b2 && b2 < b && b < c);
    }

    #[test]
    fn iterates_in_both_directions() {
        let mut sequence = OrderKeySequence::new();
        let a = sequence.new_last();
        let c = sequence.new_last();
        let b = sequence.new_between(&a, &c).unwrap();
        let z = sequence.new_first();
        pretty_assertions::assert_eq!(
            sequence.iter().collect::<Vec<_>>(),
            vec![z.clone(), a.clone(), b.clone(), c.clone()]
        );
        pretty_assertions::assert_eq!(sequence.iter().rev().collect::<Vec<_>>(), vec![c, b, a, z]);
        assert_eq!(sequence.iter().len(), 4);
    }

    #[test]
    fn bisection_preserves_order_forever() {
        let mut sequence = OrderKeySequence::new();
        let a = sequence.new_last();
        let c = sequence.new_last();
        let b = sequence.new_between(&a, &c).unwrap();
        let mut lower = a.clone();
        // Repeated bisection in the same gap never collapses, unlike fixed-width numbers.
        for _ in 0..200 {
            lower = sequence.new_after(&lower).unwrap();
            sequence.new_before(&c).unwrap();
            sequence.new_first();
            sequence.new_last();
            assert!(a < b && b < c);
        }
        assert!(a < lower && lower < b);
        assert!(sequence.iter().tuple_windows().all(|(x, y)| x < y));
    }

    #[test]
    fn rejects_foreign_keys() {
        let mut sequence = OrderKeySequence::new();
        let mut other = OrderKeySequence::new();
        let foreign = other.new_last();
        let local = sequence.new_last();
        assert_eq!(foreign, local);
        assert!(!sequence.contains(&foreign));
        assert!(sequence.new_after(&foreign).is_err());
        assert!(sequence.new_between(&local, &local).is_err());
    }
}
