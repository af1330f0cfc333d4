//! Unbalanced ordered binary tree over [`Record`] values.
//!
//! Insertion walks from the root by [`Node::sort_cmp`] and always places the
//! new node as a leaf. Finds never use the ordering: every find is a full
//! preorder traversal, since criteria are generally unrelated to the sort key.
//!
//! Nothing here recurses over tree depth. A sorted insertion sequence
//! degenerates into a chain, so traversal, removal and drop all run on
//! explicit stacks.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::io::{Read, Write};

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::node::{Link, Node};
use crate::domain::record::{Criterion, Record};

/// Index handed to the first node of a fresh tree.
pub const FIRST_INDEX: u32 = 1;

/// What `delete` removes once the target node is located.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeleteMode {
    /// Only the matched node; its children are reattached.
    #[default]
    Splice,
    /// The matched node and everything below it.
    Subtree,
}

/// Outcome of a successful delete.
#[derive(Debug)]
pub struct Removal<R> {
    pub index: u32,
    pub value: R,
    /// Nodes released, the matched one included.
    pub released: usize,
}

#[derive(Debug)]
pub struct RecordTree<R: Record> {
    root: Link<R>,
    next_index: u32,
    len: usize,
}

impl<R: Record> Default for RecordTree<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Record> RecordTree<R> {
    pub fn new() -> Self {
        Self {
            root: None,
            next_index: FIRST_INDEX,
            len: 0,
        }
    }

    /// Rebuilds a tree by inserting every record of `input` in stream order.
    ///
    /// An empty stream yields an empty tree.
    #[instrument(level = "debug", skip(input))]
    pub fn read_from(input: &mut dyn Read) -> DomainResult<Self> {
        let mut tree = Self::new();
        loop {
            let offset = (tree.len * R::ENCODED_SIZE) as u64;
            match Node::load(input, tree.next_index) {
                Ok(Some(node)) => {
                    tree.next_index += 1;
                    tree.attach(Box::new(node));
                }
                Ok(None) => break,
                Err(DomainError::Io(e)) => return Err(DomainError::Io(e)),
                Err(e) => {
                    return Err(DomainError::CorruptRecord {
                        offset,
                        reason: e.to_string(),
                    })
                }
            }
        }
        debug!("loaded {} records", tree.len);
        Ok(tree)
    }

    /// Serializes every value in preorder. Returns the record count.
    #[instrument(level = "debug", skip(self, out))]
    pub fn write_to(&self, out: &mut dyn Write) -> DomainResult<usize> {
        match self.root.as_deref() {
            Some(root) => root.save(out),
            None => Ok(0),
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Index the next inserted node will receive.
    pub fn next_index(&self) -> u32 {
        self.next_index
    }

    pub fn root(&self) -> Option<&Node<R>> {
        self.root.as_deref()
    }

    /// Inserts `value` as a new leaf and returns its index.
    #[instrument(level = "debug", skip(self, value))]
    pub fn insert(&mut self, value: R) -> u32 {
        let index = self.next_index;
        self.next_index += 1;
        self.attach(Box::new(Node::new(value, index)));
        debug!(index, "inserted");
        index
    }

    /// Places a detached node as a leaf. No restructuring happens.
    fn attach(&mut self, mut node: Box<Node<R>>) {
        node.height = 1;

        let mut depth: u32 = 0;
        let mut cursor = self.root.as_deref();
        while let Some(current) = cursor {
            depth += 1;
            cursor = match node.sort_cmp(current) {
                Ordering::Less => current.less(),
                _ => current.greater(),
            };
        }

        let mut level: u32 = 0;
        let mut slot = &mut self.root;
        while let Some(current) = slot {
            current.height = current.height.max(depth - level + 1);
            level += 1;
            slot = match node.sort_cmp(current) {
                Ordering::Less => &mut current.less,
                _ => &mut current.greater,
            };
        }
        *slot = Some(node);
        self.len += 1;
    }

    /// First node in preorder satisfying `criterion`.
    pub fn find_first(&self, criterion: &Criterion<R::Query>) -> Option<&Node<R>> {
        self.iter().find(|node| node.matches(criterion))
    }

    /// Every node satisfying `criterion`, in preorder.
    pub fn find_all(&self, criterion: &Criterion<R::Query>) -> Vec<&Node<R>> {
        self.iter().filter(|node| node.matches(criterion)).collect()
    }

    /// Preorder: node, greater subtree, less subtree. Same order as `write_to`.
    pub fn iter(&self) -> Preorder<'_, R> {
        Preorder {
            stack: self.root.as_deref().into_iter().collect(),
        }
    }

    /// Ascending sort order.
    pub fn iter_sorted(&self) -> InOrder<'_, R> {
        let mut iter = InOrder { stack: Vec::new() };
        iter.push_less_spine(self.root.as_deref());
        iter
    }

    /// Removes the first node in preorder satisfying `criterion`.
    #[instrument(level = "debug", skip(self))]
    pub fn delete(
        &mut self,
        criterion: &Criterion<R::Query>,
        mode: DeleteMode,
    ) -> Option<Removal<R>> {
        let slot = find_slot(&mut self.root, criterion)?;
        let removal = match mode {
            DeleteMode::Splice => {
                let node = splice(slot)?;
                Removal {
                    index: node.index(),
                    value: (*node).into_value(),
                    released: 1,
                }
            }
            DeleteMode::Subtree => {
                let node = slot.take()?;
                let index = node.index();
                let (value, greater, less) = (*node).into_parts();
                let released = 1
                    + greater.map_or(0, Node::destroy_subtree)
                    + less.map_or(0, Node::destroy_subtree);
                Removal {
                    index,
                    value,
                    released,
                }
            }
        };
        self.len -= removal.released;
        self.refresh_heights();
        debug!(
            index = removal.index,
            released = removal.released,
            "deleted"
        );
        Some(removal)
    }

    /// Commits a new value for the node with `index` and returns the old one.
    ///
    /// When the sort key changed and `reposition` is set, the node is taken
    /// out and re-inserted under the same index. Without `reposition` it
    /// stays where it is and the ordering invariant may no longer hold.
    #[instrument(level = "debug", skip(self, value))]
    pub fn update(&mut self, index: u32, value: R, reposition: bool) -> Option<R> {
        let slot = find_slot(&mut self.root, &Criterion::Index(index))?;
        let key_changed = slot
            .as_deref()
            .is_some_and(|node| node.sort_key() != value.sort_key());

        if key_changed && reposition {
            let mut node = splice(slot)?;
            let previous = node.set_value(value);
            self.len -= 1;
            self.attach(node);
            self.refresh_heights();
            debug!(index, "repositioned after sort key change");
            return Some(previous);
        }

        if key_changed {
            warn!(index, "sort key changed in place; tree order may be violated");
        }
        slot.as_deref_mut().map(|node| node.set_value(value))
    }

    /// Full clear. Indices are not reused afterwards.
    pub fn clear(&mut self) -> usize {
        let released = self.root.take().map_or(0, Node::destroy_subtree);
        self.len = 0;
        released
    }

    /// Number of nodes on the longest root-to-leaf path.
    pub fn depth(&self) -> usize {
        let mut max_depth = 0;
        let mut stack: Vec<(&Node<R>, usize)> =
            self.root.as_deref().map(|root| (root, 1)).into_iter().collect();
        while let Some((node, depth)) = stack.pop() {
            max_depth = max_depth.max(depth);
            stack.extend(node.greater().map(|child| (child, depth + 1)));
            stack.extend(node.less().map(|child| (child, depth + 1)));
        }
        max_depth
    }

    /// Whether the in-order walk is strictly ascending by `sort_cmp`.
    pub fn is_ordered(&self) -> bool {
        let mut previous: Option<&Node<R>> = None;
        for node in self.iter_sorted() {
            if let Some(prev) = previous {
                if prev.sort_cmp(node) != Ordering::Less {
                    return false;
                }
            }
            previous = Some(node);
        }
        true
    }

    /// Recomputes every height after a structural removal.
    fn refresh_heights(&mut self) {
        let mut heights: HashMap<u32, u32> = HashMap::with_capacity(self.len);

        let mut stack: Vec<(&Node<R>, bool)> =
            self.root.as_deref().map(|root| (root, false)).into_iter().collect();
        while let Some((node, expanded)) = stack.pop() {
            if expanded {
                let below = |child: Option<&Node<R>>| {
                    child.map_or(0, |c| heights.get(&c.index()).copied().unwrap_or(0))
                };
                let height = 1 + below(node.greater()).max(below(node.less()));
                heights.insert(node.index(), height);
            } else {
                stack.push((node, true));
                stack.extend(node.greater().map(|child| (child, false)));
                stack.extend(node.less().map(|child| (child, false)));
            }
        }

        let mut stack: Vec<&mut Node<R>> = self.root.as_deref_mut().into_iter().collect();
        while let Some(node) = stack.pop() {
            if let Some(height) = heights.get(&node.index()) {
                node.height = *height;
            }
            let Node { greater, less, .. } = node;
            stack.extend(greater.as_deref_mut());
            stack.extend(less.as_deref_mut());
        }
    }
}

impl<R: Record> Drop for RecordTree<R> {
    fn drop(&mut self) {
        self.clear();
    }
}

/// Slot holding the first node in preorder that satisfies `criterion`.
fn find_slot<'a, R: Record>(
    root: &'a mut Link<R>,
    criterion: &Criterion<R::Query>,
) -> Option<&'a mut Link<R>> {
    let mut stack = vec![root];
    while let Some(slot) = stack.pop() {
        if slot.as_deref().is_some_and(|node| node.matches(criterion)) {
            return Some(slot);
        }
        if let Some(node) = slot.as_deref_mut() {
            let Node { greater, less, .. } = node;
            stack.push(less);
            stack.push(greater);
        }
    }
    None
}

/// Takes the node out of `slot` and puts its children back in its place.
///
/// With two children the in-order successor (least node of the greater
/// subtree) takes over both child slots. The returned node has no children.
fn splice<R: Record>(slot: &mut Link<R>) -> Option<Box<Node<R>>> {
    let mut node = slot.take()?;
    let greater = node.greater.take();
    let less = node.less.take();
    *slot = match (greater, less) {
        (None, None) => None,
        (Some(child), None) | (None, Some(child)) => Some(child),
        (Some(greater), Some(less)) => {
            let mut rest = Some(greater);
            match take_least(&mut rest) {
                Some(mut successor) => {
                    successor.greater = rest;
                    successor.less = Some(less);
                    Some(successor)
                }
                None => Some(less),
            }
        }
    };
    Some(node)
}

/// Detaches the least node under `slot`; its greater child takes its place.
fn take_least<R: Record>(slot: &mut Link<R>) -> Link<R> {
    let mut slot = slot;
    while slot.as_ref().is_some_and(|node| node.less.is_some()) {
        match slot {
            Some(node) => slot = &mut node.less,
            None => break,
        }
    }
    let mut least = slot.take()?;
    *slot = least.greater.take();
    Some(least)
}

/// Preorder traversal over shared references.
pub struct Preorder<'a, R: Record> {
    stack: Vec<&'a Node<R>>,
}

impl<'a, R: Record> Iterator for Preorder<'a, R> {
    type Item = &'a Node<R>;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        // less below greater so the greater subtree comes out first
        self.stack.extend(node.less());
        self.stack.extend(node.greater());
        Some(node)
    }
}

/// In-order traversal: less subtree, node, greater subtree.
pub struct InOrder<'a, R: Record> {
    stack: Vec<&'a Node<R>>,
}

impl<'a, R: Record> InOrder<'a, R> {
    fn push_less_spine(&mut self, mut cursor: Option<&'a Node<R>>) {
        while let Some(node) = cursor {
            self.stack.push(node);
            cursor = node.less();
        }
    }
}

impl<'a, R: Record> Iterator for InOrder<'a, R> {
    type Item = &'a Node<R>;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.push_less_spine(node.greater());
        Some(node)
    }
}
