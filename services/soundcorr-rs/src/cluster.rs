//! Union-Find over arbitrary keys, used to link clusters into spanning forests.

use ahash::AHashMap;
use std::hash::Hash;

/// Disjoint-set forest keyed by `K`.
///
/// Keys are registered as singleton components on first reference. `find`
/// compresses paths iteratively, so deep chains never recurse.
#[derive(Debug, Clone)]
pub struct UnionFind<K> {
    parent: Vec<usize>,
    rank: Vec<usize>,
    index: AHashMap<K, usize>,
    keys: Vec<K>,
}

impl<K: Hash + Eq + Clone> UnionFind<K> {
    /// Create an empty structure.
    pub fn new() -> Self {
        Self {
            parent: Vec::new(),
            rank: Vec::new(),
            index: AHashMap::new(),
            keys: Vec::new(),
        }
    }

    /// Number of registered keys.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    fn slot(&mut self, key: &K) -> usize {
        if let Some(&idx) = self.index.get(key) {
            return idx;
        }
        let idx = self.keys.len();
        self.parent.push(idx);
        self.rank.push(0);
        self.keys.push(key.clone());
        self.index.insert(key.clone(), idx);
        idx
    }

    fn find_root(&mut self, mut node: usize) -> usize {
        let mut root = node;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        while self.parent[node] != root {
            let next = self.parent[node];
            self.parent[node] = root;
            node = next;
        }
        root
    }

    /// Representative of the component containing `key`.
    pub fn find(&mut self, key: &K) -> K {
        let idx = self.slot(key);
        let root = self.find_root(idx);
        self.keys[root].clone()
    }

    /// Union by rank. Returns `false` when both keys were already connected.
    pub fn union(&mut self, a: &K, b: &K) -> bool {
        let slot_a = self.slot(a);
        let slot_b = self.slot(b);
        let root_a = self.find_root(slot_a);
        let root_b = self.find_root(slot_b);

        if root_a == root_b {
            return false;
        }

        match self.rank[root_a].cmp(&self.rank[root_b]) {
            std::cmp::Ordering::Less => {
                self.parent[root_a] = root_b;
            }
            std::cmp::Ordering::Greater => {
                self.parent[root_b] = root_a;
            }
            std::cmp::Ordering::Equal => {
                self.parent[root_b] = root_a;
                self.rank[root_a] += 1;
            }
        }
        true
    }

    pub fn connected(&mut self, a: &K, b: &K) -> bool {
        let slot_a = self.slot(a);
        let slot_b = self.slot(b);
        self.find_root(slot_a) == self.find_root(slot_b)
    }
}

impl<K: Hash + Eq + Clone> Default for UnionFind<K> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_union_find() {
        let mut uf = UnionFind::new();
        uf.union(&0, &1);
        uf.union(&2, &3);
        uf.union(&1, &2);

        assert_eq!(uf.find(&0), uf.find(&3));
        assert_ne!(uf.find(&0), uf.find(&4));
    }

    #[test]
    fn test_auto_initializes() {
        let mut uf: UnionFind<String> = UnionFind::new();
        assert_eq!(uf.find(&"a".to_string()), "a");
        assert_eq!(uf.len(), 1);
    }

    #[test]
    fn test_union_reports_merge() {
        let mut uf = UnionFind::new();
        assert!(uf.union(&"x", &"y"));
        assert!(!uf.union(&"y", &"x"));
        assert!(uf.connected(&"x", &"y"));
    }

    #[test]
    fn test_long_chain_does_not_recurse() {
        let mut uf = UnionFind::new();
        for i in 0..100_000usize {
            uf.union(&i, &(i + 1));
        }
        assert!(uf.connected(&0, &100_000));
    }
}
