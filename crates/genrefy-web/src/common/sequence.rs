use std::{
    cell::{Cell, RefCell},
    collections::HashMap,
    hash::Hash,
};

/// Monotonic request counter for one control. Only the latest issued ticket is current.
#[derive(Debug, Default)]
pub struct RequestSequence {
    latest: Cell<u64>,
}

impl RequestSequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&self) -> u64 {
        let next = self.latest.get() + 1;
        self.latest.set(next);
        next
    }

    pub fn is_current(&self, ticket: u64) -> bool {
        self.latest.get() == ticket
    }
}

/// One [`RequestSequence`] per key, for controls that share a handler.
#[derive(Debug)]
pub struct SequenceMap<K> {
    latest: RefCell<HashMap<K, u64>>,
}

impl<K> Default for SequenceMap<K> {
    fn default() -> Self {
        Self {
            latest: RefCell::new(HashMap::new()),
        }
    }
}

impl<K: Eq + Hash + Clone> SequenceMap<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&self, key: &K) -> u64 {
        let mut latest = self.latest.borrow_mut();
        let ticket = latest.entry(key.clone()).or_insert(0);
        *ticket += 1;
        *ticket
    }

    pub fn is_current(&self, key: &K, ticket: u64) -> bool {
        self.latest.borrow().get(key).copied() == Some(ticket)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_sequence_latest_wins() {
        let seq = RequestSequence::new();
        let first = seq.issue();
        let second = seq.issue();

        assert!(second > first);
        assert!(!seq.is_current(first));
        assert!(seq.is_current(second));
    }

    #[test]
    fn test_sequence_map_keys_are_independent() {
        let map = SequenceMap::new();
        let a1 = map.issue(&"a");
        let b1 = map.issue(&"b");
        let a2 = map.issue(&"a");

        assert!(!map.is_current(&"a", a1));
        assert!(map.is_current(&"a", a2));
        assert!(map.is_current(&"b", b1));
        assert!(!map.is_current(&"c", 1));
    }
}
