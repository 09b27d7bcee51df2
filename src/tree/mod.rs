//! Reference-counted element tree.
//!
//! Every node is a [`Node`] handle: a strong, atomically reference-counted
//! pointer to shared node state. Cloning a handle grabs a reference and
//! dropping it releases one. A parent owns one strong reference to each of
//! its children through its children list, while each child only keeps a
//! weak back-reference to its parent, so a parent is never kept alive by
//! its children.
//!
//! # Architecture
//!
//! Parent/child links are kept consistent by construction: the only way
//! to attach a node is through [`Node::append_child`] and friends, which
//! first detach the node from any previous parent, and the only way to
//! detach is [`Node::remove_child`] (or the parent being released).
//! When the last handle to a node goes away its subtree is released
//! iteratively, so very deep trees do not exhaust the stack.
//!
//! Structural mutation is meant for one thread at a time. The node state
//! sits behind a lock so handles can still be shared and dropped across
//! threads; no operation ever holds two node locks at once.

mod attributes;
pub mod collection;
mod node;

pub use attributes::{Attribute, AttributeStore};
pub use collection::{ChildIter, Children};
pub use node::NodeKind;

use std::fmt::{self, Write as _};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak};

use crate::error::DomError;

/// A strong handle to a node in an element tree.
///
/// Equality is identity: two handles are equal when they point at the same
/// node.
///
/// # Examples
///
/// ```
/// use saxtree::tree::Node;
///
/// let list = Node::new_element("list");
/// let item = Node::new_element("item");
/// list.append_child(&item).unwrap();
/// item.append_child(&Node::new_text("first")).unwrap();
///
/// assert_eq!(list.child_count(), 1);
/// assert_eq!(item.parent(), Some(list.clone()));
/// assert_eq!(list.text(), "first");
/// ```
#[derive(Clone)]
pub struct Node(Arc<NodeInner>);

struct NodeInner {
    kind: NodeKind,
    state: RwLock<NodeState>,
}

#[derive(Default)]
struct NodeState {
    name: String,
    data: Option<String>,
    parent: Weak<NodeInner>,
    children: Vec<Node>,
    attributes: AttributeStore,
}

impl Drop for NodeInner {
    fn drop(&mut self) {
        let state = self.state.get_mut().unwrap_or_else(PoisonError::into_inner);
        let mut pending = std::mem::take(&mut state.children);
        // Unlink each child; children we held the last reference to are
        // drained here instead of recursing through their own drop.
        while let Some(child) = pending.pop() {
            child.write().parent = Weak::new();
            if let Some(mut inner) = Arc::into_inner(child.0) {
                let state = inner.state.get_mut().unwrap_or_else(PoisonError::into_inner);
                pending.append(&mut state.children);
            }
        }
    }
}

impl Node {
    /// Creates a detached node of the given kind with a reference count of 1.
    ///
    /// Text and comment nodes start with empty data; other kinds have none.
    #[must_use]
    pub fn create(name: &str, kind: NodeKind) -> Self {
        let state = NodeState {
            name: name.to_string(),
            data: kind.has_data().then(String::new),
            ..NodeState::default()
        };
        Self(Arc::new(NodeInner {
            kind,
            state: RwLock::new(state),
        }))
    }

    /// Creates a detached element node.
    #[must_use]
    pub fn new_element(name: &str) -> Self {
        Self::create(name, NodeKind::Element)
    }

    /// Creates a detached text node holding `data`.
    #[must_use]
    pub fn new_text(data: impl Into<String>) -> Self {
        Self::with_data(NodeKind::Text, data.into())
    }

    /// Creates a detached comment node holding `data`.
    #[must_use]
    pub fn new_comment(data: impl Into<String>) -> Self {
        Self::with_data(NodeKind::Comment, data.into())
    }

    /// Creates a detached processing instruction named `target` whose
    /// single child is a text node holding `data`.
    #[must_use]
    pub fn new_processing_instruction(target: &str, data: impl Into<String>) -> Self {
        let pi = Self::create(target, NodeKind::ProcessingInstruction);
        let payload = Self::new_text(data);
        payload.write().parent = Arc::downgrade(&pi.0);
        pi.write().children.push(payload);
        pi
    }

    fn with_data(kind: NodeKind, data: String) -> Self {
        let node = Self::create("", kind);
        node.write().data = Some(data);
        node
    }

    fn read(&self) -> RwLockReadGuard<'_, NodeState> {
        self.0.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, NodeState> {
        self.0.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    // --- Ownership ---

    /// Takes another strong reference to this node.
    ///
    /// Same as `clone()`; the returned handle has the same identity.
    #[must_use]
    pub fn grab(&self) -> Self {
        self.clone()
    }

    /// Gives up this handle's reference.
    ///
    /// Same as dropping the handle. When it was the last reference, the
    /// node and every descendant not referenced elsewhere are freed.
    pub fn release(self) {
        drop(self);
    }

    /// Number of strong references to this node: one for the parent's
    /// children list when attached, plus one per live handle.
    #[must_use]
    pub fn ref_count(&self) -> usize {
        Arc::strong_count(&self.0)
    }

    /// Returns `true` if both handles point at the same node.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    // --- Identity and content ---

    /// Returns the kind of this node.
    #[must_use]
    pub fn kind(&self) -> NodeKind {
        self.0.kind
    }

    /// Returns the name exactly as stored. Empty for text and comments.
    #[must_use]
    pub fn name(&self) -> String {
        self.read().name.clone()
    }

    /// Returns the tag name of an element or processing instruction with
    /// ASCII letters upper-cased, and `None` for other kinds.
    #[must_use]
    pub fn tag_name(&self) -> Option<String> {
        if !self.kind().is_named() {
            return None;
        }
        Some(self.read().name.to_ascii_uppercase())
    }

    /// Renames an element or processing instruction.
    ///
    /// # Errors
    ///
    /// Returns [`DomError::InvalidArgument`] for other node kinds or for an
    /// empty name.
    pub fn set_tag_name(&self, name: &str) -> Result<(), DomError> {
        if !self.kind().is_named() {
            return Err(DomError::InvalidArgument("only elements and processing instructions have a tag name"));
        }
        if name.is_empty() {
            return Err(DomError::InvalidArgument("tag name must not be empty"));
        }
        self.write().name = name.to_string();
        Ok(())
    }

    /// Returns the literal data of a text or comment node.
    #[must_use]
    pub fn data(&self) -> Option<String> {
        self.read().data.clone()
    }

    /// Returns the text of this node.
    ///
    /// For elements this is the concatenation, in document order, of the
    /// data of every descendant text node; comments and processing
    /// instructions below the element do not contribute. For text and
    /// comment nodes it is their literal data, and for a processing
    /// instruction its data payload.
    #[must_use]
    pub fn text(&self) -> String {
        match self.kind() {
            NodeKind::Text | NodeKind::Comment => self.data().unwrap_or_default(),
            NodeKind::ProcessingInstruction => {
                let children = self.read().children.clone();
                children
                    .iter()
                    .filter(|c| c.kind() == NodeKind::Text)
                    .filter_map(Node::data)
                    .collect()
            }
            NodeKind::Element | NodeKind::Other => {
                let mut out = String::new();
                let mut stack: Vec<Node> = self.read().children.iter().rev().cloned().collect();
                while let Some(node) = stack.pop() {
                    match node.kind() {
                        NodeKind::Text => {
                            if let Some(data) = &node.read().data {
                                out.push_str(data);
                            }
                        }
                        NodeKind::Element | NodeKind::Other => {
                            stack.extend(node.read().children.iter().rev().cloned());
                        }
                        NodeKind::Comment | NodeKind::ProcessingInstruction => {}
                    }
                }
                out
            }
        }
    }

    /// Replaces the text of a leaf node.
    ///
    /// Text and comment nodes get new data; a processing instruction gets a
    /// new data payload.
    ///
    /// # Errors
    ///
    /// Returns [`DomError::InvalidArgument`] for elements, whose text is
    /// derived from their descendants.
    pub fn set_text(&self, text: &str) -> Result<(), DomError> {
        match self.kind() {
            NodeKind::Text | NodeKind::Comment => {
                self.write().data = Some(text.to_string());
                Ok(())
            }
            NodeKind::ProcessingInstruction => {
                let payload = self.first_child().filter(|c| c.kind() == NodeKind::Text);
                match payload {
                    Some(payload) => payload.set_text(text),
                    None => self.append_child(&Self::new_text(text)),
                }
            }
            NodeKind::Element | NodeKind::Other => Err(DomError::InvalidArgument(
                "element text is derived from its descendants",
            )),
        }
    }

    // --- Attributes ---

    /// Returns the value of the attribute `name` (ASCII case-insensitive).
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<String> {
        self.read().attributes.get(name).map(str::to_string)
    }

    /// Sets the attribute `name` to `value`, replacing an existing value in
    /// place.
    ///
    /// # Errors
    ///
    /// Returns [`DomError::InvalidArgument`] if this is not an element or
    /// the name is empty, and [`DomError::OutOfMemory`] if the attribute
    /// list cannot grow.
    pub fn set_attribute(&self, name: &str, value: &str) -> Result<(), DomError> {
        if self.kind() != NodeKind::Element {
            return Err(DomError::InvalidArgument("only elements carry attributes"));
        }
        self.write().attributes.set(name, value)?;
        Ok(())
    }

    /// Removes the attribute `name`. Returns `true` if it existed.
    pub fn remove_attribute(&self, name: &str) -> bool {
        self.write().attributes.remove(name).is_some()
    }

    /// Returns a copy of this node's attributes in insertion order.
    #[must_use]
    pub fn attributes(&self) -> Vec<Attribute> {
        self.read().attributes.as_slice().to_vec()
    }

    /// Number of attributes on this node.
    #[must_use]
    pub fn attribute_count(&self) -> usize {
        self.read().attributes.len()
    }

    // --- Navigation ---

    /// Returns the parent, if this node is attached.
    #[must_use]
    pub fn parent(&self) -> Option<Node> {
        self.read().parent.upgrade().map(Node)
    }

    /// Number of immediate children.
    #[must_use]
    pub fn child_count(&self) -> usize {
        self.read().children.len()
    }

    /// Returns a new handle to the child at `index`, or `None` when out of
    /// range.
    #[must_use]
    pub fn child(&self, index: usize) -> Option<Node> {
        self.read().children.get(index).cloned()
    }

    /// Returns the first child.
    #[must_use]
    pub fn first_child(&self) -> Option<Node> {
        self.read().children.first().cloned()
    }

    /// Returns the last child.
    #[must_use]
    pub fn last_child(&self) -> Option<Node> {
        self.read().children.last().cloned()
    }

    /// Returns a live collection over this node's children.
    #[must_use]
    pub fn children(&self) -> Children {
        Children::new(self.clone())
    }

    /// Returns an iterator over this node's ancestors, nearest first.
    #[must_use]
    pub fn ancestors(&self) -> Ancestors {
        Ancestors {
            next: self.parent(),
        }
    }

    /// Returns a pre-order iterator over all descendants of this node,
    /// excluding the node itself.
    #[must_use]
    pub fn descendants(&self) -> Descendants {
        Descendants {
            stack: self.read().children.iter().rev().cloned().collect(),
        }
    }

    // --- Mutation ---

    /// Appends `child` as the last child of this node.
    ///
    /// A child that is attached elsewhere is detached first, so its
    /// reference count is unchanged overall.
    ///
    /// # Errors
    ///
    /// Returns [`DomError::InvalidArgument`] if this node cannot have
    /// children or if `child` is this node or one of its ancestors, and
    /// [`DomError::OutOfMemory`] if the children list cannot grow.
    pub fn append_child(&self, child: &Node) -> Result<(), DomError> {
        self.attach(child, None)
    }

    /// Inserts `child` as the first child of this node.
    ///
    /// # Errors
    ///
    /// Same as [`append_child`](Node::append_child).
    pub fn prepend_child(&self, child: &Node) -> Result<(), DomError> {
        self.attach(child, Some(0))
    }

    /// Inserts `child` so that it ends up at position `index`. Indices past
    /// the end append.
    ///
    /// # Errors
    ///
    /// Same as [`append_child`](Node::append_child).
    pub fn insert_child(&self, child: &Node, index: usize) -> Result<(), DomError> {
        self.attach(child, Some(index))
    }

    fn attach(&self, child: &Node, index: Option<usize>) -> Result<(), DomError> {
        if self.kind().has_data() {
            return Err(DomError::InvalidArgument("text and comment nodes cannot have children"));
        }
        if self.ptr_eq(child) || self.ancestors().any(|a| a.ptr_eq(child)) {
            return Err(DomError::InvalidArgument("a node cannot become its own descendant"));
        }
        self.write().children.try_reserve(1)?;

        if let Some(old) = child.parent() {
            old.remove_child(child)?;
        }
        child.write().parent = Arc::downgrade(&self.0);

        let mut state = self.write();
        let at = index.map_or(state.children.len(), |i| i.min(state.children.len()));
        state.children.insert(at, child.clone());
        Ok(())
    }

    /// Appends a node that was just created and has never been attached.
    ///
    /// A fresh node cannot be an ancestor of `self`, so the ancestor walk
    /// of [`append_child`](Node::append_child) is skipped. The tree builder
    /// relies on this to stay linear in document depth.
    pub(crate) fn append_detached(&self, child: &Node) -> Result<(), DomError> {
        debug_assert!(child.parent().is_none());
        debug_assert!(!self.kind().has_data());
        self.write().children.try_reserve(1)?;
        child.write().parent = Arc::downgrade(&self.0);
        self.write().children.push(child.clone());
        Ok(())
    }

    /// Detaches `child` from this node and releases the reference held by
    /// the children list.
    ///
    /// # Errors
    ///
    /// Returns [`DomError::InvalidArgument`] if `child` is not a child of
    /// this node.
    pub fn remove_child(&self, child: &Node) -> Result<(), DomError> {
        const NOT_A_CHILD: DomError = DomError::InvalidArgument("node is not a child of this parent");

        if !child.parent().is_some_and(|p| p.ptr_eq(self)) {
            return Err(NOT_A_CHILD);
        }
        let removed = {
            let mut state = self.write();
            let pos = state
                .children
                .iter()
                .position(|c| c.ptr_eq(child))
                .ok_or(NOT_A_CHILD)?;
            state.children.remove(pos)
        };
        child.write().parent = Weak::new();
        drop(removed);
        Ok(())
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for Node {}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.read();
        let mut s = f.debug_struct("Node");
        s.field("kind", &self.kind());
        if !state.name.is_empty() {
            s.field("name", &state.name);
        }
        if let Some(data) = &state.data {
            s.field("data", data);
        }
        s.field("children", &state.children.len())
            .field("attributes", &state.attributes.len())
            .finish()
    }
}

// --- Iterators ---

/// Iterator over a node's ancestors, nearest first.
pub struct Ancestors {
    next: Option<Node>,
}

impl Iterator for Ancestors {
    type Item = Node;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.take()?;
        self.next = current.parent();
        Some(current)
    }
}

/// Pre-order iterator over the descendants of a node.
///
/// Each node's children are read when the node is visited, so the
/// iterator reflects mutation of not-yet-visited subtrees.
pub struct Descendants {
    stack: Vec<Node>,
}

impl Iterator for Descendants {
    type Item = Node;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.stack.pop()?;
        self.stack
            .extend(current.read().children.iter().rev().cloned());
        Some(current)
    }
}

/// Formats a node and its subtree as an indented debug listing.
///
/// ```
/// use saxtree::tree::{format_tree, Node};
///
/// let root = Node::new_element("root");
/// root.set_attribute("id", "r").unwrap();
/// root.append_child(&Node::new_text("hi")).unwrap();
/// assert_eq!(format_tree(&root), "ELEMENT root\n  ATTRIBUTE id=\"r\"\n  TEXT \"hi\"\n");
/// ```
#[must_use]
pub fn format_tree(node: &Node) -> String {
    let mut out = String::new();
    let mut stack = vec![(node.clone(), 0usize)];
    while let Some((current, depth)) = stack.pop() {
        let indent = "  ".repeat(depth);
        let state = current.read();
        let _ = match current.kind() {
            NodeKind::Element => writeln!(out, "{indent}ELEMENT {}", state.name),
            NodeKind::ProcessingInstruction => writeln!(out, "{indent}PI {}", state.name),
            NodeKind::Text => writeln!(out, "{indent}TEXT {:?}", state.data.as_deref().unwrap_or("")),
            NodeKind::Comment => {
                writeln!(out, "{indent}COMMENT {:?}", state.data.as_deref().unwrap_or(""))
            }
            NodeKind::Other => writeln!(out, "{indent}OTHER {}", state.name),
        };
        for attr in &state.attributes {
            let _ = writeln!(out, "{indent}  ATTRIBUTE {}={:?}", attr.name, attr.value);
        }
        for child in state.children.iter().rev() {
            stack.push((child.clone(), depth + 1));
        }
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn element_with_children(name: &str, count: usize) -> (Node, Vec<Node>) {
        let parent = Node::new_element(name);
        let children: Vec<Node> = (0..count)
            .map(|i| Node::new_element(&format!("c{i}")))
            .collect();
        for child in &children {
            parent.append_child(child).unwrap();
        }
        (parent, children)
    }

    fn child_names(node: &Node) -> Vec<String> {
        node.children().iter().map(|c| c.name()).collect()
    }

    #[test]
    fn test_create_node_defaults() {
        let node = Node::create("item", NodeKind::Element);
        assert_eq!(node.ref_count(), 1);
        assert!(node.parent().is_none());
        assert_eq!(node.child_count(), 0);
        assert_eq!(node.attribute_count(), 0);
        assert_eq!(node.data(), None);

        let text = Node::create("", NodeKind::Text);
        assert_eq!(text.data(), Some(String::new()));
    }

    #[test]
    fn test_grab_and_release_adjust_refcount() {
        let node = Node::new_element("a");
        let extra = node.grab();
        assert_eq!(node.ref_count(), 2);
        assert!(extra.ptr_eq(&node));
        extra.release();
        assert_eq!(node.ref_count(), 1);
    }

    #[test]
    fn test_append_child_sets_parent_and_order() {
        let (parent, children) = element_with_children("p", 3);
        assert_eq!(child_names(&parent), ["c0", "c1", "c2"]);
        for child in &children {
            assert_eq!(child.parent(), Some(parent.clone()));
            // one for the list, one for our handle
            assert_eq!(child.ref_count(), 2);
        }
    }

    #[test]
    fn test_prepend_and_insert_child() {
        let (parent, _) = element_with_children("p", 2);
        parent.prepend_child(&Node::new_element("first")).unwrap();
        parent.insert_child(&Node::new_element("mid"), 2).unwrap();
        parent.insert_child(&Node::new_element("last"), 99).unwrap();
        assert_eq!(child_names(&parent), ["first", "c0", "mid", "c1", "last"]);
    }

    #[test]
    fn test_remove_child() {
        let (parent, children) = element_with_children("p", 3);
        parent.remove_child(&children[1]).unwrap();
        assert_eq!(child_names(&parent), ["c0", "c2"]);
        assert!(children[1].parent().is_none());
        assert_eq!(children[1].ref_count(), 1);
    }

    #[test]
    fn test_remove_child_not_a_child() {
        let (parent, _) = element_with_children("p", 1);
        let stranger = Node::new_element("x");
        assert!(matches!(
            parent.remove_child(&stranger),
            Err(DomError::InvalidArgument(_))
        ));

        let (other, other_children) = element_with_children("q", 1);
        assert!(parent.remove_child(&other_children[0]).is_err());
        assert_eq!(other.child_count(), 1);
    }

    #[test]
    fn test_append_then_remove_restores_state() {
        let (parent, _) = element_with_children("p", 2);
        let child = Node::new_element("tmp");
        parent.append_child(&child).unwrap();
        parent.remove_child(&child).unwrap();
        assert_eq!(parent.child_count(), 2);
        assert!(child.parent().is_none());
        assert_eq!(child.ref_count(), 1);
    }

    #[test]
    fn test_reparenting_moves_child() {
        let (old, children) = element_with_children("old", 2);
        let new = Node::new_element("new");
        let moved = &children[0];
        let before = moved.ref_count();

        new.append_child(moved).unwrap();

        assert_eq!(old.child_count(), 1);
        assert_eq!(new.child_count(), 1);
        assert_eq!(moved.parent(), Some(new.clone()));
        assert_eq!(moved.ref_count(), before);
    }

    #[test]
    fn test_reappend_to_same_parent_moves_to_end() {
        let (parent, children) = element_with_children("p", 3);
        parent.append_child(&children[0]).unwrap();
        assert_eq!(child_names(&parent), ["c1", "c2", "c0"]);
        assert_eq!(children[0].ref_count(), 2);
    }

    #[test]
    fn test_cycles_rejected() {
        let (parent, children) = element_with_children("p", 1);
        let grandchild = Node::new_element("g");
        children[0].append_child(&grandchild).unwrap();

        assert!(parent.append_child(&parent).is_err());
        assert!(grandchild.append_child(&parent).is_err());
        assert!(children[0].append_child(&parent).is_err());
        assert_eq!(parent.child_count(), 1);
        assert!(parent.parent().is_none());
    }

    #[test]
    fn test_leaf_nodes_cannot_have_children() {
        let text = Node::new_text("t");
        assert!(text.append_child(&Node::new_element("x")).is_err());
        let comment = Node::new_comment("c");
        assert!(comment.prepend_child(&Node::new_element("x")).is_err());
    }

    #[test]
    fn test_child_access() {
        let (parent, children) = element_with_children("p", 2);
        assert_eq!(parent.child(1), Some(children[1].clone()));
        assert_eq!(parent.child(2), None);
        assert_eq!(parent.first_child(), Some(children[0].clone()));
        assert_eq!(parent.last_child(), Some(children[1].clone()));
        assert!(Node::new_element("e").first_child().is_none());
    }

    #[test]
    fn test_release_parent_detaches_surviving_children() {
        let (parent, children) = element_with_children("p", 2);
        drop(parent);
        for child in &children {
            assert!(child.parent().is_none());
            assert_eq!(child.ref_count(), 1);
        }
    }

    #[test]
    fn test_deep_tree_release_does_not_overflow() {
        let root = Node::new_element("root");
        let mut current = root.clone();
        for _ in 0..100_000 {
            let next = Node::new_element("d");
            current.append_detached(&next).unwrap();
            current = next;
        }
        drop(current);
        drop(root);
    }

    #[test]
    fn test_tag_name_uppercased() {
        let e = Node::new_element("Item");
        assert_eq!(e.tag_name().as_deref(), Some("ITEM"));
        assert_eq!(e.name(), "Item");
        e.set_tag_name("other").unwrap();
        assert_eq!(e.tag_name().as_deref(), Some("OTHER"));

        let pi = Node::new_processing_instruction("xml-stylesheet", "href=\"a\"");
        assert_eq!(pi.tag_name().as_deref(), Some("XML-STYLESHEET"));

        // only ASCII letters change, like the doctype and attribute lookups
        let e = Node::new_element("stra\u{df}e");
        assert_eq!(e.tag_name().as_deref(), Some("STRA\u{df}E"));

        let t = Node::new_text("x");
        assert_eq!(t.tag_name(), None);
        assert!(t.set_tag_name("y").is_err());
        assert!(e.set_tag_name("").is_err());
    }

    #[test]
    fn test_text_aggregates_descendants() {
        let root = Node::new_element("root");
        let inner = Node::new_element("inner");
        root.append_child(&Node::new_text("a")).unwrap();
        root.append_child(&Node::new_comment("skip")).unwrap();
        root.append_child(&inner).unwrap();
        inner.append_child(&Node::new_text("b")).unwrap();
        root.append_child(&Node::new_processing_instruction("pi", "skip"))
            .unwrap();
        root.append_child(&Node::new_text("c")).unwrap();

        assert_eq!(root.text(), "abc");
        assert_eq!(inner.text(), "b");
    }

    #[test]
    fn test_text_of_leaf_kinds() {
        assert_eq!(Node::new_text("t").text(), "t");
        assert_eq!(Node::new_comment("c").text(), "c");
        assert_eq!(Node::new_processing_instruction("p", "d").text(), "d");
        assert_eq!(Node::new_element("e").text(), "");
    }

    #[test]
    fn test_set_text() {
        let t = Node::new_text("old");
        t.set_text("new").unwrap();
        assert_eq!(t.data().as_deref(), Some("new"));

        let pi = Node::new_processing_instruction("p", "old");
        pi.set_text("new").unwrap();
        assert_eq!(pi.text(), "new");
        assert_eq!(pi.child_count(), 1);

        let e = Node::new_element("e");
        assert!(matches!(
            e.set_text("x"),
            Err(DomError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_processing_instruction_payload_child() {
        let pi = Node::new_processing_instruction("target", "some data");
        assert_eq!(pi.kind(), NodeKind::ProcessingInstruction);
        assert_eq!(pi.name(), "target");
        assert_eq!(pi.data(), None);
        let payload = pi.first_child().unwrap();
        assert_eq!(payload.kind(), NodeKind::Text);
        assert_eq!(payload.data().as_deref(), Some("some data"));
        assert_eq!(payload.parent(), Some(pi.clone()));
    }

    #[test]
    fn test_attributes_on_node() {
        let e = Node::new_element("e");
        e.set_attribute("Name", "v1").unwrap();
        e.set_attribute("other", "v2").unwrap();
        e.set_attribute("NAME", "v3").unwrap();

        assert_eq!(e.attribute("name").as_deref(), Some("v3"));
        assert_eq!(e.attribute_count(), 2);
        assert_eq!(e.attributes()[0], Attribute::new("Name", "v3"));
        assert!(e.remove_attribute("OTHER"));
        assert!(!e.remove_attribute("other"));

        let t = Node::new_text("x");
        assert!(t.set_attribute("a", "b").is_err());
    }

    #[test]
    fn test_ancestors_and_descendants() {
        let root = Node::new_element("root");
        let a = Node::new_element("a");
        let b = Node::new_element("b");
        let c = Node::new_element("c");
        root.append_child(&a).unwrap();
        a.append_child(&b).unwrap();
        root.append_child(&c).unwrap();

        let up: Vec<String> = b.ancestors().map(|n| n.name()).collect();
        assert_eq!(up, ["a", "root"]);

        let down: Vec<String> = root.descendants().map(|n| n.name()).collect();
        assert_eq!(down, ["a", "b", "c"]);
    }

    #[test]
    fn test_equality_is_identity() {
        let a = Node::new_element("same");
        let b = Node::new_element("same");
        assert_ne!(a, b);
        assert_eq!(a, a.grab());
    }

    #[test]
    fn test_debug_output() {
        let e = Node::new_element("e");
        let dbg = format!("{e:?}");
        assert!(dbg.contains("Element"));
        assert!(dbg.contains("\"e\""));
    }

    #[test]
    fn test_format_tree() {
        let root = Node::new_element("root");
        let child = Node::new_element("child");
        root.append_child(&child).unwrap();
        child.append_child(&Node::new_text("x")).unwrap();
        root.append_child(&Node::new_comment("note")).unwrap();

        assert_eq!(
            format_tree(&root),
            "ELEMENT root\n  ELEMENT child\n    TEXT \"x\"\n  COMMENT \"note\"\n"
        );
    }

    #[test]
    fn test_handles_are_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Node>();

        let node = Node::new_element("shared");
        let handles: Vec<Node> = (0..8).map(|_| node.grab()).collect();
        std::thread::scope(|s| {
            for h in handles {
                s.spawn(move || drop(h));
            }
        });
        assert_eq!(node.ref_count(), 1);
    }
}
