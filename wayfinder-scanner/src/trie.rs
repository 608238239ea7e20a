//! Ordered prefix index keyed by segment paths.
//!
//! Children keep insertion order, so listing a trie built from a document
//! walk yields entries in document order.

#[derive(Debug, Clone)]
struct TrieNode<K, V> {
    value: Option<V>,
    children: Vec<(K, TrieNode<K, V>)>,
}

impl<K, V> TrieNode<K, V> {
    fn new() -> Self {
        Self {
            value: None,
            children: Vec::new(),
        }
    }
}

impl<K: PartialEq, V> TrieNode<K, V> {
    fn child(&self, key: &K) -> Option<&TrieNode<K, V>> {
        self.children
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, node)| node)
    }

    fn child_mut(&mut self, key: &K) -> Option<&mut TrieNode<K, V>> {
        self.children
            .iter_mut()
            .find(|(k, _)| k == key)
            .map(|(_, node)| node)
    }

    fn is_empty(&self) -> bool {
        self.value.is_none() && self.children.is_empty()
    }

    fn remove(&mut self, path: &[K]) -> Option<V> {
        let Some((head, rest)) = path.split_first() else {
            return self.value.take();
        };

        let idx = self.children.iter().position(|(k, _)| k == head)?;
        let removed = self.children[idx].1.remove(rest);
        if removed.is_some() && self.children[idx].1.is_empty() {
            self.children.remove(idx);
        }
        removed
    }
}

#[derive(Debug, Clone)]
pub struct Trie<K, V> {
    root: TrieNode<K, V>,
    len: usize,
}

impl<K: Clone + PartialEq, V> Trie<K, V> {
    pub fn new() -> Self {
        Self {
            root: TrieNode::new(),
            len: 0,
        }
    }

    /// Store `value` at `path`, returning whatever was there before.
    ///
    /// # Panics
    ///
    /// Panics if `path` is empty. Values always live below the root.
    pub fn insert(&mut self, path: &[K], value: V) -> Option<V> {
        assert!(!path.is_empty(), "trie paths must have at least one segment");

        let mut node = &mut self.root;
        for key in path {
            let idx = match node.children.iter().position(|(k, _)| k == key) {
                Some(idx) => idx,
                None => {
                    node.children.push((key.clone(), TrieNode::new()));
                    node.children.len() - 1
                }
            };
            node = &mut node.children[idx].1;
        }

        let previous = node.value.replace(value);
        if previous.is_none() {
            self.len += 1;
        }
        previous
    }

    pub fn get(&self, path: &[K]) -> Option<&V> {
        let mut node = &self.root;
        for key in path {
            node = node.child(key)?;
        }
        node.value.as_ref()
    }

    pub fn get_mut(&mut self, path: &[K]) -> Option<&mut V> {
        let mut node = &mut self.root;
        for key in path {
            node = node.child_mut(key)?;
        }
        node.value.as_mut()
    }

    /// Remove the value at `path`, pruning branches left without values.
    pub fn remove(&mut self, path: &[K]) -> Option<V> {
        let removed = self.root.remove(path);
        if removed.is_some() {
            self.len -= 1;
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Every stored `(path, value)` pair, depth-first in insertion order.
    pub fn list_all(&self) -> Vec<(Vec<K>, &V)> {
        collect(&self.root)
    }

}

fn collect<K: Clone, V>(root: &TrieNode<K, V>) -> Vec<(Vec<K>, &V)> {
    let mut out = Vec::new();
    let mut stack = vec![(root, Vec::new())];

    while let Some((node, path)) = stack.pop() {
        if let Some(value) = node.value.as_ref() {
            out.push((path.clone(), value));
        }
        // Reversed so the first child is popped first.
        for (key, child) in node.children.iter().rev() {
            let mut child_path = path.clone();
            child_path.push(key.clone());
            stack.push((child, child_path));
        }
    }

    out
}

impl<K: Clone + PartialEq, V> Default for Trie<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(segments: &[&str]) -> Vec<String> {
        segments.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn insert_and_get() {
        let mut trie = Trie::new();
        trie.insert(&path(&["com", "example"]), "task1");
        trie.insert(&path(&["com", "google"]), "task2");

        assert_eq!(trie.get(&path(&["com", "example"])), Some(&"task1"));
        assert_eq!(trie.get(&path(&["com", "google"])), Some(&"task2"));
        assert_eq!(trie.get(&path(&["com"])), None);
        assert_eq!(trie.get(&path(&["org"])), None);
        assert_eq!(trie.len(), 2);
    }

    #[test]
    fn exact_path_overwrite_keeps_last_value() {
        let mut trie = Trie::new();
        assert_eq!(trie.insert(&path(&["a", "b"]), 1), None);
        assert_eq!(trie.insert(&path(&["a", "b"]), 2), Some(1));

        assert_eq!(trie.get(&path(&["a", "b"])), Some(&2));
        assert_eq!(trie.len(), 1);
        assert_eq!(trie.list_all().len(), 1);
    }

    #[test]
    fn list_all_follows_insertion_order() {
        let mut trie = Trie::new();
        trie.insert(&path(&["Products"]), 1);
        trie.insert(&path(&["Products", "Phones"]), 2);
        trie.insert(&path(&["About"]), 3);
        trie.insert(&path(&["Products", "Laptops"]), 4);

        let listed: Vec<(Vec<String>, i32)> =
            trie.list_all().into_iter().map(|(p, v)| (p, *v)).collect();
        assert_eq!(
            listed,
            vec![
                (path(&["Products"]), 1),
                (path(&["Products", "Phones"]), 2),
                (path(&["Products", "Laptops"]), 4),
                (path(&["About"]), 3),
            ]
        );
    }

    #[test]
    fn remove_prunes_empty_branches() {
        let mut trie = Trie::new();
        trie.insert(&path(&["a", "b", "c"]), 1);
        trie.insert(&path(&["a", "x"]), 2);

        assert_eq!(trie.remove(&path(&["a", "b", "c"])), Some(1));
        assert_eq!(trie.remove(&path(&["a", "b", "c"])), None);
        assert_eq!(trie.remove(&path(&["a"])), None);
        assert_eq!(trie.len(), 1);
        assert_eq!(trie.get(&path(&["a", "x"])), Some(&2));
        let remaining: Vec<Vec<String>> = trie.list_all().into_iter().map(|(p, _)| p).collect();
        assert_eq!(remaining, vec![path(&["a", "x"])]);
    }

    #[test]
    fn get_mut_updates_in_place() {
        let mut trie = Trie::new();
        trie.insert(&path(&["k"]), vec![1]);
        if let Some(values) = trie.get_mut(&path(&["k"])) {
            values.push(2);
        }
        assert_eq!(trie.get(&path(&["k"])), Some(&vec![1, 2]));
    }

    #[test]
    #[should_panic(expected = "at least one segment")]
    fn empty_path_is_rejected() {
        let mut trie: Trie<String, i32> = Trie::new();
        trie.insert(&[], 1);
    }
}
