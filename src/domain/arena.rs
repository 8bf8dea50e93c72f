use generational_arena::{Arena, Index};
use tracing::instrument;

/// Tree node in the arena-based tree structure.
#[derive(Debug, Clone)]
pub struct TreeNode<T> {
    /// Payload for this node
    pub data: T,
    /// Index of parent node in the arena, None for the root
    pub parent: Option<Index>,
    /// Indices of child nodes in the arena, target before sacrifice
    pub children: Vec<Index>,
}

impl<T> TreeNode<T> {
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Arena-based tree structure.
///
/// Uses generational arena for memory-safe node references and O(1) lookups.
/// Every candidate merge tree gets its own arena; nothing is shared or reset
/// between candidates.
#[derive(Debug, Clone)]
pub struct TreeArena<T> {
    /// Arena storage for all tree nodes
    arena: Arena<TreeNode<T>>,
    /// Index of the root node, None for empty trees
    root: Option<Index>,
}

impl<T> Default for TreeArena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TreeArena<T> {
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            root: None,
        }
    }

    #[instrument(level = "trace", skip_all)]
    pub fn insert_node(&mut self, data: T, parent: Option<Index>) -> Index {
        let node = TreeNode {
            data,
            parent,
            children: Vec::new(),
        };
        let node_idx = self.arena.insert(node);

        if let Some(parent_idx) = parent {
            if let Some(parent) = self.arena.get_mut(parent_idx) {
                parent.children.push(node_idx);
            }
        } else {
            self.root = Some(node_idx);
        }

        node_idx
    }

    pub fn get_node(&self, idx: Index) -> Option<&TreeNode<T>> {
        self.arena.get(idx)
    }

    pub fn get_node_mut(&mut self, idx: Index) -> Option<&mut TreeNode<T>> {
        self.arena.get_mut(idx)
    }

    pub fn root(&self) -> Option<Index> {
        self.root
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Pre-order, left to right.
    pub fn iter(&self) -> TreeIterator<'_, T> {
        TreeIterator::new(self)
    }

    /// Post-order: both children before their parent.
    pub fn iter_postorder(&self) -> PostOrderIterator<'_, T> {
        PostOrderIterator::new(self)
    }

    /// Leaf indices in slot order (left to right, depth first).
    pub fn leaf_nodes(&self) -> Vec<Index> {
        self.iter()
            .filter(|(_, node)| node.is_leaf())
            .map(|(idx, _)| idx)
            .collect()
    }

    /// Distance from the root to every leaf, in slot order.
    pub fn leaf_depths(&self) -> Vec<usize> {
        let mut depths = Vec::new();
        if let Some(root) = self.root {
            self.collect_leaf_depths(root, 0, &mut depths);
        }
        depths
    }

    fn collect_leaf_depths(&self, node_idx: Index, depth: usize, depths: &mut Vec<usize>) {
        if let Some(node) = self.get_node(node_idx) {
            if node.is_leaf() {
                depths.push(depth);
            } else {
                for &child in &node.children {
                    self.collect_leaf_depths(child, depth + 1, depths);
                }
            }
        }
    }

    pub fn internal_count(&self) -> usize {
        self.iter().filter(|(_, node)| !node.is_leaf()).count()
    }

    /// Copy the structure into a fresh arena, converting payloads in pre-order.
    pub fn map<U>(&self, mut f: impl FnMut(&TreeNode<T>) -> U) -> TreeArena<U> {
        let mut mapped = TreeArena::new();
        if let Some(root) = self.root {
            let mut stack = vec![(root, None)];
            while let Some((idx, parent)) = stack.pop() {
                if let Some(node) = self.get_node(idx) {
                    let new_idx = mapped.insert_node(f(node), parent);
                    for &child in node.children.iter().rev() {
                        stack.push((child, Some(new_idx)));
                    }
                }
            }
        }
        mapped
    }
}

pub struct TreeIterator<'a, T> {
    arena: &'a TreeArena<T>,
    stack: Vec<Index>,
}

impl<'a, T> TreeIterator<'a, T> {
    fn new(arena: &'a TreeArena<T>) -> Self {
        let mut stack = Vec::new();
        if let Some(root) = arena.root() {
            stack.push(root);
        }
        Self { arena, stack }
    }
}

impl<'a, T> Iterator for TreeIterator<'a, T> {
    type Item = (Index, &'a TreeNode<T>);

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(current_idx) = self.stack.pop() {
            if let Some(node) = self.arena.get_node(current_idx) {
                // Push children in reverse order for left-to-right traversal
                for &child in node.children.iter().rev() {
                    self.stack.push(child);
                }
                return Some((current_idx, node));
            }
        }
        None
    }
}

pub struct PostOrderIterator<'a, T> {
    arena: &'a TreeArena<T>,
    stack: Vec<(Index, bool)>,
}

impl<'a, T> PostOrderIterator<'a, T> {
    fn new(arena: &'a TreeArena<T>) -> Self {
        let mut stack = Vec::new();
        if let Some(root) = arena.root() {
            stack.push((root, false));
        }
        Self { arena, stack }
    }
}

impl<'a, T> Iterator for PostOrderIterator<'a, T> {
    type Item = (Index, &'a TreeNode<T>);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((current_idx, visited)) = self.stack.pop() {
            if let Some(node) = self.arena.get_node(current_idx) {
                if !visited {
                    self.stack.push((current_idx, true));
                    for &child in node.children.iter().rev() {
                        self.stack.push((child, false));
                    }
                } else {
                    return Some((current_idx, node));
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TreeArena<&'static str> {
        let mut tree = TreeArena::new();
        let root = tree.insert_node("root", None);
        let left = tree.insert_node("left", Some(root));
        tree.insert_node("right", Some(root));
        tree.insert_node("left.left", Some(left));
        tree.insert_node("left.right", Some(left));
        tree
    }

    #[test]
    fn given_tree_when_iterating_preorder_then_visits_left_to_right() {
        let tree = sample();
        let order: Vec<_> = tree.iter().map(|(_, n)| n.data).collect();
        assert_eq!(order, vec!["root", "left", "left.left", "left.right", "right"]);
    }

    #[test]
    fn given_tree_when_iterating_postorder_then_children_before_parent() {
        let tree = sample();
        let order: Vec<_> = tree.iter_postorder().map(|(_, n)| n.data).collect();
        assert_eq!(order, vec!["left.left", "left.right", "left", "right", "root"]);
    }

    #[test]
    fn given_tree_when_measuring_then_reports_depths_and_counts() {
        let tree = sample();
        assert_eq!(tree.leaf_depths(), vec![2, 2, 1]);
        assert_eq!(tree.leaf_nodes().len(), 3);
        assert_eq!(tree.internal_count(), 2);
        assert_eq!(tree.len(), 5);
    }

    #[test]
    fn given_tree_when_mapped_then_structure_is_preserved() {
        let tree = sample();
        let mapped = tree.map(|n| n.data.len());
        let order: Vec<_> = mapped.iter().map(|(_, n)| n.data).collect();
        assert_eq!(order, vec![4, 4, 9, 10, 5]);
        assert_eq!(mapped.leaf_depths(), tree.leaf_depths());
    }

    #[test]
    fn given_empty_tree_when_measuring_then_zero() {
        let tree: TreeArena<()> = TreeArena::new();
        assert!(tree.leaf_depths().is_empty());
        assert!(tree.is_empty());
    }
}
