//! Generic dotted-address override tree
//!
//! One tree type backs both parameter payload shapes. Nodes live in an
//! arena with index links; the free list recycles slots after removals.
//! Addressing: the empty string is the root, "2.1" is the first child of
//! the second top-level sibling. Unresolved names yield `None` rather than
//! an error.

/// Handle to a node slot. Valid until the node is removed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NodeId(usize);

#[derive(Clone, Debug)]
struct Node<T> {
    data: T,
    parent: Option<usize>,
    child: Option<usize>,
    next_sibling: Option<usize>,
    prev_sibling: Option<usize>,
}

impl<T> Node<T> {
    fn new(data: T) -> Self {
        Self {
            data,
            parent: None,
            child: None,
            next_sibling: None,
            prev_sibling: None,
        }
    }
}

/// Tree of override nodes addressed by dotted decimal strings.
#[derive(Clone, Debug)]
pub struct OverrideTree<T> {
    nodes: Vec<Option<Node<T>>>,
    free: Vec<usize>,
    root: Option<usize>,
}

impl<T> Default for OverrideTree<T> {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            free: Vec::new(),
            root: None,
        }
    }
}

impl<T: Default> OverrideTree<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create (or recreate) the root node, dropping any existing tree.
    pub fn create_root(&mut self) -> NodeId {
        self.reset();
        let id = self.alloc(T::default());
        self.root = Some(id);
        NodeId(id)
    }

    /// Splice a new node as the first child of the named node.
    /// Returns `None` if the name does not resolve.
    pub fn add_child(&mut self, name: &str) -> Option<NodeId> {
        let parent = self.resolve(name)?;
        let id = self.alloc(T::default());
        let first = self.node(parent).and_then(|n| n.child);
        {
            let node = self.node_mut(id);
            node.parent = Some(parent);
            node.next_sibling = first;
        }
        if let Some(first) = first {
            self.node_mut(first).prev_sibling = Some(id);
        }
        self.node_mut(parent).child = Some(id);
        Some(NodeId(id))
    }

    /// Splice a new node as the next sibling of the named node.
    /// The root has no siblings; the empty name does not resolve here.
    pub fn add_sibling(&mut self, name: &str) -> Option<NodeId> {
        if name.is_empty() {
            return None;
        }
        let at = self.resolve(name)?;
        let id = self.alloc(T::default());
        let next = self.node(at).and_then(|n| n.next_sibling);
        let parent = self.node(at).and_then(|n| n.parent);
        {
            let node = self.node_mut(id);
            node.parent = parent;
            node.prev_sibling = Some(at);
            node.next_sibling = next;
        }
        if let Some(next) = next {
            self.node_mut(next).prev_sibling = Some(id);
        }
        self.node_mut(at).next_sibling = Some(id);
        Some(NodeId(id))
    }
}

impl<T> OverrideTree<T> {
    pub fn has_root(&self) -> bool {
        self.root.is_some()
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root.map(NodeId)
    }

    /// Drop every node.
    pub fn reset(&mut self) {
        self.nodes.clear();
        self.free.clear();
        self.root = None;
    }

    /// Resolve a dotted name to a node handle.
    pub fn get(&self, name: &str) -> Option<NodeId> {
        self.resolve(name).map(NodeId)
    }

    pub fn data(&self, name: &str) -> Option<&T> {
        let id = self.resolve(name)?;
        self.node(id).map(|n| &n.data)
    }

    pub fn data_mut(&mut self, name: &str) -> Option<&mut T> {
        let id = self.resolve(name)?;
        self.nodes.get_mut(id)?.as_mut().map(|n| &mut n.data)
    }

    pub fn node_data(&self, id: NodeId) -> Option<&T> {
        self.node(id.0).map(|n| &n.data)
    }

    pub fn node_data_mut(&mut self, id: NodeId) -> Option<&mut T> {
        self.nodes.get_mut(id.0)?.as_mut().map(|n| &mut n.data)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id.0)?.parent.map(NodeId)
    }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.node(id.0)?.child.map(NodeId)
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.node(id.0)?.next_sibling.map(NodeId)
    }

    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.node(id.0)?.prev_sibling.map(NodeId)
    }

    /// Unlink the named node and free its subtree. Removing the root (the
    /// empty name) resets the whole tree. Returns false for unresolved
    /// names.
    pub fn remove(&mut self, name: &str) -> bool {
        if self.root.is_none() {
            return false;
        }
        if name.is_empty() {
            self.reset();
            return true;
        }
        let Some(id) = self.resolve(name) else {
            return false;
        };

        let Some((parent, prev, next)) = self
            .node(id)
            .map(|n| (n.parent, n.prev_sibling, n.next_sibling))
        else {
            return false;
        };
        if let Some(prev) = prev {
            self.node_mut(prev).next_sibling = next;
        }
        if let Some(next) = next {
            self.node_mut(next).prev_sibling = prev;
        }
        if let Some(parent) = parent {
            if self.node(parent).and_then(|n| n.child) == Some(id) {
                self.node_mut(parent).child = next;
            }
        }
        self.free_subtree(id);
        true
    }

    /// Every valid dotted address, depth first in sibling order.
    pub fn names(&self) -> Vec<String> {
        let mut names = Vec::new();
        if let Some(root) = self.root {
            let child = self.node(root).and_then(|n| n.child);
            self.collect_names(&mut names, "", child);
        }
        names
    }

    fn collect_names(&self, names: &mut Vec<String>, prefix: &str, mut node: Option<usize>) {
        let mut count = 0;
        while let Some(id) = node {
            count += 1;
            let name = format!("{prefix}{count}");
            names.push(name.clone());
            let child = self.node(id).and_then(|n| n.child);
            self.collect_names(names, &format!("{name}."), child);
            node = self.node(id).and_then(|n| n.next_sibling);
        }
    }

    fn alloc(&mut self, data: T) -> usize {
        if let Some(index) = self.free.pop() {
            self.nodes[index] = Some(Node::new(data));
            index
        } else {
            self.nodes.push(Some(Node::new(data)));
            self.nodes.len() - 1
        }
    }

    fn free_subtree(&mut self, id: usize) {
        let mut child = self.node(id).and_then(|n| n.child);
        while let Some(c) = child {
            let next = self.node(c).and_then(|n| n.next_sibling);
            self.free_subtree(c);
            child = next;
        }
        self.nodes[id] = None;
        self.free.push(id);
    }

    fn node(&self, id: usize) -> Option<&Node<T>> {
        self.nodes.get(id)?.as_ref()
    }

    fn node_mut(&mut self, id: usize) -> &mut Node<T> {
        self.nodes[id].as_mut().expect("live node")
    }

    fn resolve(&self, name: &str) -> Option<usize> {
        let root = self.root?;
        if name.is_empty() {
            return Some(root);
        }
        let mut current = self.node(root).and_then(|n| n.child);
        let mut parts = name.split('.').peekable();
        while let Some(part) = parts.next() {
            let offset: usize = part.parse().ok().filter(|&n| n >= 1)?;
            let mut id = current?;
            for _ in 1..offset {
                id = self.node(id)?.next_sibling?;
            }
            if parts.peek().is_none() {
                return Some(id);
            }
            current = self.node(id)?.child;
        }
        None
    }

    fn subtree_eq(&self, other: &Self, a: Option<usize>, b: Option<usize>) -> bool
    where
        T: PartialEq,
    {
        match (a, b) {
            (None, None) => true,
            (Some(a), Some(b)) => {
                let (Some(na), Some(nb)) = (self.node(a), other.node(b)) else {
                    return false;
                };
                na.data == nb.data
                    && self.subtree_eq(other, na.child, nb.child)
                    && self.subtree_eq(other, na.next_sibling, nb.next_sibling)
            }
            _ => false,
        }
    }
}

/// Structural equality: traversal order and payloads, independent of slot
/// layout or reuse history.
impl<T: PartialEq> PartialEq for OverrideTree<T> {
    fn eq(&self, other: &Self) -> bool {
        self.subtree_eq(other, self.root, other.root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Tree = OverrideTree<i32>;

    fn set(tree: &mut Tree, name: &str, value: i32) {
        *tree.data_mut(name).unwrap() = value;
    }

    fn sorted(mut names: Vec<String>) -> Vec<String> {
        names.sort();
        names
    }

    #[test]
    fn test_names() {
        let mut tree = Tree::new();
        tree.create_root();
        tree.add_child("").unwrap();
        tree.add_sibling("1").unwrap();
        tree.add_child("2").unwrap();
        tree.add_sibling("2.1").unwrap();
        tree.add_sibling("2.1").unwrap();

        let names = sorted(tree.names());
        assert_eq!(names, vec!["1", "2", "2.1", "2.2", "2.3"]);

        assert!(tree.remove("2.1"));
        let names = sorted(tree.names());
        assert_eq!(names, vec!["1", "2", "2.1", "2.2"]);

        assert!(tree.remove("2"));
        assert_eq!(tree.names(), vec!["1"]);

        tree.reset();
        assert!(tree.names().is_empty());
    }

    #[test]
    fn test_add_round_trip() {
        let mut tree = Tree::new();
        tree.create_root();
        tree.add_child("").unwrap();
        tree.add_sibling("1").unwrap();
        tree.add_child("1").unwrap();
        let names = sorted(tree.names());
        assert_eq!(names, vec!["1", "1.1", "2"]);
    }

    #[test]
    fn test_structure() {
        let mut tree = Tree::new();
        tree.create_root();
        let node1 = tree.add_child("").unwrap();
        let node2 = tree.add_sibling("1").unwrap();
        let node1_1 = tree.add_child("1").unwrap();
        let node1_2 = tree.add_sibling("1.1").unwrap();

        assert_eq!(tree.prev_sibling(node2), Some(node1));
        assert_eq!(tree.next_sibling(node2), None);

        assert_eq!(tree.prev_sibling(node1_1), None);
        assert_eq!(tree.next_sibling(node1_1), Some(node1_2));
        assert_eq!(tree.parent(node1_1), Some(node1));
        assert_eq!(tree.first_child(node1_1), None);

        assert_eq!(tree.prev_sibling(node1_2), Some(node1_1));
        assert_eq!(tree.next_sibling(node1_2), None);
        assert_eq!(tree.parent(node1_2), Some(node1));
    }

    #[test]
    fn test_add_child_splices_first() {
        let mut tree = Tree::new();
        tree.create_root();
        tree.add_child("").unwrap();
        set(&mut tree, "1", 10);
        // A second top-level child lands in front, renumbering the first.
        tree.add_child("").unwrap();
        set(&mut tree, "1", 20);

        assert_eq!(tree.data("1"), Some(&20));
        assert_eq!(tree.data("2"), Some(&10));
        assert_eq!(tree.names().len(), 2);
    }

    #[test]
    fn test_nonexistent() {
        let mut tree = Tree::new();
        tree.create_root();
        assert!(tree.add_child("2").is_none());
        assert!(tree.add_sibling("1.1").is_none());
        assert!(!tree.remove("3.2"));
        assert!(tree.get("junk").is_none());
        assert!(tree.data("0").is_none());
    }

    #[test]
    fn test_remove_middle_sibling_relinks() {
        let mut tree = Tree::new();
        tree.create_root();
        tree.add_child("").unwrap();
        tree.add_child("1").unwrap();
        tree.add_sibling("1.1").unwrap();
        tree.add_sibling("1.2").unwrap();
        set(&mut tree, "1.1", 1);
        set(&mut tree, "1.2", 2);
        set(&mut tree, "1.3", 3);

        assert!(tree.remove("1.2"));
        let names = sorted(tree.names());
        assert_eq!(names, vec!["1", "1.1", "1.2"]);
        // Renumbering follows traversal order, not stored literals.
        assert_eq!(tree.data("1.1"), Some(&1));
        assert_eq!(tree.data("1.2"), Some(&3));

        let first = tree.get("1.1").unwrap();
        let second = tree.get("1.2").unwrap();
        assert_eq!(tree.next_sibling(first), Some(second));
        assert_eq!(tree.prev_sibling(second), Some(first));
    }

    #[test]
    fn test_remove_first_sibling() {
        let mut tree = Tree::new();
        tree.create_root();
        tree.add_child("").unwrap();
        tree.add_child("1").unwrap();
        tree.add_sibling("1.1").unwrap();
        set(&mut tree, "1.2", 7);

        assert!(tree.remove("1.1"));
        assert_eq!(tree.data("1.2"), None);
        assert_eq!(tree.data("1.1"), Some(&7));
        let child = tree.get("1.1").unwrap();
        assert_eq!(tree.prev_sibling(child), None);
        assert_eq!(tree.next_sibling(child), None);
    }

    #[test]
    fn test_remove_root_resets() {
        let mut tree = Tree::new();
        tree.create_root();
        tree.add_child("").unwrap();
        assert!(tree.remove(""));
        assert!(!tree.has_root());
        assert!(tree.names().is_empty());
    }

    #[test]
    fn test_deep_copy() {
        let mut tree = Tree::new();
        tree.create_root();
        tree.add_child("").unwrap();
        tree.add_child("1").unwrap();
        set(&mut tree, "1.1", 42);

        let copy = tree.clone();
        set(&mut tree, "1.1", 0);
        assert_eq!(copy.data("1.1"), Some(&42));
    }

    #[test]
    fn test_structural_equality_ignores_slots() {
        let mut a = Tree::new();
        a.create_root();
        a.add_child("").unwrap();
        a.add_sibling("1").unwrap();
        set(&mut a, "1", 1);
        set(&mut a, "2", 2);

        // Build the same shape with a different edit history, forcing
        // different slot layouts.
        let mut b = Tree::new();
        b.create_root();
        b.add_child("").unwrap();
        b.add_sibling("1").unwrap();
        b.add_sibling("2").unwrap();
        b.remove("2");
        set(&mut b, "1", 1);
        set(&mut b, "2", 2);

        assert_eq!(a, b);

        set(&mut b, "2", 3);
        assert_ne!(a, b);
    }

    #[test]
    fn test_empty_trees_equal() {
        let a = Tree::new();
        let b = Tree::new();
        assert_eq!(a, b);

        let mut c = Tree::new();
        c.create_root();
        assert_ne!(a, c);
    }
}
