/*
Rendering of a RecordTree as a termtree diagram.

Kept as a trait next to the tree so the domain types stay free of
presentation code.
 */
use std::collections::HashMap;

use termtree::Tree;
use tracing::instrument;

use crate::domain::node::Node;
use crate::domain::record::{Record, RenderMode};
use crate::domain::tree::RecordTree;

const GREATER_MARK: &str = "> ";
const LESS_MARK: &str = "< ";

/// Node levels shown before a subtree is folded into a count.
///
/// `termtree` prints and drops its trees recursively, so the view must stay
/// shallow even when the record tree is a long chain.
pub const MAX_VIEW_DEPTH: usize = 128;

pub trait TreeNodeConvert {
    fn to_tree_string(&self) -> Tree<String>;
}

fn label<R: Record>(node: &Node<R>, mark: &str) -> String {
    format!(
        "{}#{} h={} {}",
        mark,
        node.index(),
        node.height(),
        node.value().render(RenderMode::Long)
    )
}

/// Nodes strictly below `node`.
fn count_below<R: Record>(node: &Node<R>) -> usize {
    let mut count = 0;
    let mut stack: Vec<&Node<R>> = node.greater().into_iter().chain(node.less()).collect();
    while let Some(current) = stack.pop() {
        count += 1;
        stack.extend(current.greater());
        stack.extend(current.less());
    }
    count
}

impl<R: Record> TreeNodeConvert for Node<R> {
    /// Greater child listed first, matching save order. Levels past
    /// [`MAX_VIEW_DEPTH`] are folded into a "... N more node(s)" leaf.
    #[instrument(level = "debug", skip(self))]
    fn to_tree_string(&self) -> Tree<String> {
        let mut built: HashMap<u32, Tree<String>> = HashMap::new();
        let mut stack: Vec<(&Node<R>, &str, usize, bool)> = vec![(self, "", 1, false)];

        while let Some((node, mark, level, expanded)) = stack.pop() {
            if !expanded {
                if level >= MAX_VIEW_DEPTH && !node.is_leaf() {
                    let folded = Tree::new(format!("... {} more node(s)", count_below(node)));
                    built.insert(
                        node.index(),
                        Tree::new(label(node, mark)).with_leaves([folded]),
                    );
                    continue;
                }
                stack.push((node, mark, level, true));
                stack.extend(node.less().map(|c| (c, LESS_MARK, level + 1, false)));
                stack.extend(node.greater().map(|c| (c, GREATER_MARK, level + 1, false)));
                continue;
            }
            let leaves: Vec<Tree<String>> = [node.greater(), node.less()]
                .into_iter()
                .flatten()
                .filter_map(|child| built.remove(&child.index()))
                .collect();
            built.insert(
                node.index(),
                Tree::new(label(node, mark)).with_leaves(leaves),
            );
        }

        built
            .remove(&self.index())
            .unwrap_or_else(|| Tree::new(label(self, "")))
    }
}

impl<R: Record> TreeNodeConvert for RecordTree<R> {
    fn to_tree_string(&self) -> Tree<String> {
        match self.root() {
            Some(root) => root.to_tree_string(),
            None => Tree::new("Empty tree".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::contact::{Contact, PhoneNumber};

    #[test]
    fn empty_tree_renders_placeholder() {
        let tree: RecordTree<Contact> = RecordTree::new();
        assert_eq!(tree.to_tree_string().to_string().trim(), "Empty tree");
    }

    #[test]
    fn children_are_marked_by_side() {
        let mut tree = RecordTree::new();
        let phone = PhoneNumber::new(212, 555, 1234).unwrap();
        tree.insert(Contact::new("MILLER", "ANN", phone));
        tree.insert(Contact::new("ZHANG", "LI", phone));
        tree.insert(Contact::new("ADAMS", "BO", phone));

        let rendered = tree.to_tree_string().to_string();
        let lines: Vec<&str> = rendered.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("#1 h=2 "));
        assert!(lines[1].contains("> #2 h=1 "));
        assert!(lines[1].contains("ZHANG"));
        assert!(lines[2].contains("< #3 h=1 "));
    }

    #[test]
    fn long_chain_is_folded_below_view_depth() {
        let tree = crate::util::testing::chain(20_000);

        let rendered = tree.to_tree_string().to_string();

        assert_eq!(rendered.lines().count(), MAX_VIEW_DEPTH + 1);
        let last = rendered.lines().last().unwrap();
        assert!(last.ends_with(&format!("... {} more node(s)", 20_000 - MAX_VIEW_DEPTH)));
    }

    #[test]
    fn tree_at_view_depth_is_not_folded() {
        let tree = crate::util::testing::chain(MAX_VIEW_DEPTH as u32);

        let rendered = tree.to_tree_string().to_string();

        assert_eq!(rendered.lines().count(), MAX_VIEW_DEPTH);
        assert!(!rendered.contains("more node(s)"));
    }
}
