//! Live views over a node's children.
//!
//! A [`Children`] collection is bound to one node and keeps no storage of
//! its own: `length` and `item` read the children list at call time, and a
//! [`ChildIter`] is a cursor position into that list. Structural changes
//! made while iterating shift what the cursor sees next, but never corrupt
//! the list or panic.

use super::Node;
use crate::error::DomError;

/// Indexed, iterable view over the children of a node.
///
/// # Examples
///
/// ```
/// use saxtree::tree::Node;
///
/// let root = Node::new_element("root");
/// root.append_child(&Node::new_element("a")).unwrap();
/// root.append_child(&Node::new_element("b")).unwrap();
///
/// let children = root.children();
/// assert_eq!(children.length(), 2);
/// assert_eq!(children.item(1).unwrap().map(|n| n.name()), Some("b".to_string()));
/// let names: Vec<String> = children.iter().map(|n| n.name()).collect();
/// assert_eq!(names, ["a", "b"]);
/// ```
#[derive(Debug, Clone)]
pub struct Children {
    node: Node,
}

impl Children {
    pub(crate) fn new(node: Node) -> Self {
        Self { node }
    }

    /// The node whose children this collection views.
    #[must_use]
    pub fn node(&self) -> &Node {
        &self.node
    }

    /// Number of children right now.
    #[must_use]
    pub fn length(&self) -> usize {
        self.node.child_count()
    }

    /// Returns `true` if the node currently has no children.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.length() == 0
    }

    /// Returns a new handle to the child at `index`.
    ///
    /// An index past the end yields `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns [`DomError::InvalidArgument`] for a negative index.
    pub fn item(&self, index: isize) -> Result<Option<Node>, DomError> {
        let index = usize::try_from(index)
            .map_err(|_| DomError::InvalidArgument("collection index must not be negative"))?;
        Ok(self.node.child(index))
    }

    /// Returns a cursor positioned before the first child.
    #[must_use]
    pub fn iter(&self) -> ChildIter {
        ChildIter {
            parent: self.node.clone(),
            position: 0,
        }
    }
}

impl IntoIterator for &Children {
    type Item = Node;
    type IntoIter = ChildIter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl IntoIterator for Children {
    type Item = Node;
    type IntoIter = ChildIter;

    fn into_iter(self) -> Self::IntoIter {
        ChildIter {
            parent: self.node,
            position: 0,
        }
    }
}

/// Forward cursor over a node's children.
///
/// Cloning gives an independent cursor at the same position.
#[derive(Debug, Clone)]
pub struct ChildIter {
    parent: Node,
    position: usize,
}

impl ChildIter {
    /// Moves the cursor back before the first child.
    pub fn reset(&mut self) {
        self.position = 0;
    }

    /// Advances past up to `count` children without yielding them.
    ///
    /// Returns how many were actually skipped; fewer than `count` means the
    /// end was reached.
    pub fn skip_items(&mut self, count: usize) -> usize {
        let remaining = self.parent.child_count().saturating_sub(self.position);
        let skipped = count.min(remaining);
        self.position += skipped;
        skipped
    }

    /// Index of the child the next call to `next` will yield.
    #[must_use]
    pub fn position(&self) -> usize {
        self.position
    }
}

impl Iterator for ChildIter {
    type Item = Node;

    fn next(&mut self) -> Option<Self::Item> {
        let child = self.parent.child(self.position)?;
        self.position += 1;
        Some(child)
    }
}
