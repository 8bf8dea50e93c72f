//! Text rendering of shapes and evaluated merge trees.

use generational_arena::Index;
use termtree::Tree;

use crate::domain::{MergeNode, TreeArena};
use crate::domain::{MergeTree, Role, TreeShape};

/// Label used for one node when drawing a tree.
pub trait NodeLabel {
    fn label(&self) -> String;
}

impl NodeLabel for Role {
    fn label(&self) -> String {
        self.to_string()
    }
}

impl NodeLabel for MergeNode {
    fn label(&self) -> String {
        let item = &self.item;
        if item.is_leaf() {
            format!("{}: {}, prior work: {}", self.role, item, item.prior_work)
        } else {
            format!(
                "{}: {}, cost: {}, prior work: {}",
                self.role, item.name, item.cost, item.prior_work
            )
        }
    }
}

pub trait TreeNodeConvert {
    fn to_tree_string(&self) -> Tree<String>;
}

impl<T: NodeLabel> TreeNodeConvert for TreeArena<T> {
    fn to_tree_string(&self) -> Tree<String> {
        let Some(root_idx) = self.root() else {
            return Tree::new("Empty tree".to_string());
        };
        build_tree(self, root_idx)
    }
}

fn build_tree<T: NodeLabel>(arena: &TreeArena<T>, node_idx: Index) -> Tree<String> {
    match arena.get_node(node_idx) {
        Some(node) => {
            let leaves: Vec<_> = node
                .children
                .iter()
                .map(|&child| build_tree(arena, child))
                .collect();
            Tree::new(node.data.label()).with_leaves(leaves)
        }
        None => Tree::new(String::new()),
    }
}

/// Render a bare shape.
pub fn render_shape(shape: &TreeShape) -> String {
    shape.to_tree_string().to_string()
}

/// Render an evaluated tree.
pub fn render_tree(tree: &MergeTree) -> String {
    tree.to_tree_string().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ShapeBuilder, ShapeLayout};

    #[test]
    fn given_shape_when_rendered_then_lists_roles_indented() {
        let builder = ShapeBuilder::new(ShapeLayout::new(2).unwrap());
        let text = render_shape(builder.base());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "Final item");
        assert!(lines[1].ends_with("Target"));
        assert!(lines[2].ends_with("Sacrifice"));
    }

    #[test]
    fn given_empty_arena_when_rendered_then_placeholder() {
        let shape = TreeShape::new();
        assert_eq!(render_shape(&shape).trim(), "Empty tree");
    }
}
