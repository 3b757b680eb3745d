//! Arena-backed server tree.
//!
//! Every node of a render lives in one indextree [`Arena`]. Drivers only ever
//! see [`NodeHandle`]s; the structure itself is mutated through [`SsrTree`]
//! so the invariants below hold at every step:
//! - only elements carry attributes
//! - text nodes never have children
//! - the root is never attached beneath another node
//! - children order is exactly the order left by the last structural mutation

use compact_str::CompactString;
use indextree::{Arena, NodeId};
use smallvec::SmallVec;

use crate::error::{Result, TreeError};
use crate::trace;

/// Opaque handle to a node of an [`SsrTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeHandle(NodeId);

/// What goes in each arena slot
#[derive(Debug, Clone)]
pub struct NodeData {
    pub kind: NodeKind,
}

/// Node types
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Root of a hydratable render; its element children get the root marker.
    ElementRoot,
    /// Root of a static render; emits its children and nothing else.
    StaticRoot,
    /// Text content.
    Text(CompactString),
    /// Element with tag and attributes.
    Element(ElementData),
}

impl NodeKind {
    pub fn is_root(&self) -> bool {
        matches!(self, NodeKind::ElementRoot | NodeKind::StaticRoot)
    }

    pub fn is_text(&self) -> bool {
        matches!(self, NodeKind::Text(_))
    }
}

/// Which root a tree is built under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootKind {
    Element,
    Static,
}

/// Element data (tag + attributes)
#[derive(Debug, Clone, PartialEq)]
pub struct ElementData {
    pub tag: CompactString,

    /// Attributes in the order they were set. Duplicates are kept.
    pub attrs: SmallVec<[Attr; 4]>,
}

/// A single attribute. The value is stored raw and escaped on serialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attr {
    pub name: CompactString,
    pub value: CompactString,
}

/// The node structure a driver populates during one render.
#[derive(Debug, Clone)]
pub struct SsrTree {
    arena: Arena<NodeData>,
    root: NodeHandle,
}

impl SsrTree {
    /// Create a tree holding only its root.
    pub fn new(root_kind: RootKind) -> Self {
        let mut arena = Arena::new();
        let kind = match root_kind {
            RootKind::Element => NodeKind::ElementRoot,
            RootKind::Static => NodeKind::StaticRoot,
        };
        let root = NodeHandle(arena.new_node(NodeData { kind }));
        Self { arena, root }
    }

    pub fn root(&self) -> NodeHandle {
        self.root
    }

    /// Number of nodes ever created in this tree, root included.
    pub fn node_count(&self) -> usize {
        self.arena.count()
    }

    /// Create an unattached element node.
    pub fn create_element(&mut self, tag: impl Into<CompactString>) -> NodeHandle {
        let tag = tag.into();
        let id = self.arena.new_node(NodeData {
            kind: NodeKind::Element(ElementData {
                tag,
                attrs: SmallVec::new(),
            }),
        });
        trace!(node = ?id, "create element");
        NodeHandle(id)
    }

    /// Create an unattached text node.
    pub fn create_text(&mut self, text: impl Into<CompactString>) -> NodeHandle {
        let id = self.arena.new_node(NodeData {
            kind: NodeKind::Text(text.into()),
        });
        trace!(node = ?id, "create text");
        NodeHandle(id)
    }

    /// Get node data, failing for handles that don't belong to this tree.
    pub fn get(&self, node: NodeHandle) -> Result<&NodeData> {
        match self.arena.get(node.0) {
            Some(n) if !n.is_removed() => Ok(n.get()),
            _ => Err(TreeError::UnknownNode),
        }
    }

    /// Node data for a handle obtained from this tree's own structure.
    pub(crate) fn data(&self, node: NodeHandle) -> &NodeData {
        self.arena[node.0].get()
    }

    fn get_mut(&mut self, node: NodeHandle) -> Result<&mut NodeData> {
        match self.arena.get_mut(node.0) {
            Some(n) if !n.is_removed() => Ok(n.get_mut()),
            _ => Err(TreeError::UnknownNode),
        }
    }

    pub fn kind(&self, node: NodeHandle) -> Result<&NodeKind> {
        self.get(node).map(|d| &d.kind)
    }

    /// Tag name, for element nodes.
    pub fn tag(&self, node: NodeHandle) -> Option<&str> {
        match self.kind(node) {
            Ok(NodeKind::Element(elem)) => Some(elem.tag.as_str()),
            _ => None,
        }
    }

    /// Text content, for text nodes.
    pub fn text(&self, node: NodeHandle) -> Option<&str> {
        match self.kind(node) {
            Ok(NodeKind::Text(text)) => Some(text.as_str()),
            _ => None,
        }
    }

    /// Attributes in insertion order. Empty for anything but elements.
    pub fn attributes(&self, node: NodeHandle) -> &[Attr] {
        match self.kind(node) {
            Ok(NodeKind::Element(elem)) => &elem.attrs,
            _ => &[],
        }
    }

    pub fn parent(&self, node: NodeHandle) -> Option<NodeHandle> {
        self.arena.get(node.0)?.parent().map(NodeHandle)
    }

    /// Iterate children of a node in document order.
    pub fn children(&self, node: NodeHandle) -> impl Iterator<Item = NodeHandle> + '_ {
        node.0.children(&self.arena).map(NodeHandle)
    }

    pub fn previous_sibling(&self, node: NodeHandle) -> Option<NodeHandle> {
        self.arena.get(node.0)?.previous_sibling().map(NodeHandle)
    }

    /// Check that `child` may be placed under `parent`.
    fn check_attach(&self, parent: NodeHandle, child: NodeHandle) -> Result<()> {
        if self.kind(parent)?.is_text() {
            return Err(TreeError::LeafCannotHaveChildren);
        }
        if self.kind(child)?.is_root() {
            return Err(TreeError::RootCannotBeNested);
        }
        // `ancestors` yields the node itself first
        if parent.0.ancestors(&self.arena).any(|a| a == child.0) {
            return Err(TreeError::CyclicInsertion);
        }
        Ok(())
    }

    /// Append `child` as the last child of `parent`.
    ///
    /// A child that is already attached somewhere is moved.
    pub fn append_child(&mut self, parent: NodeHandle, child: NodeHandle) -> Result<()> {
        self.check_attach(parent, child)?;
        trace!(parent = ?parent.0, child = ?child.0, "append child");
        parent
            .0
            .checked_append(child.0, &mut self.arena)
            .map_err(|_| TreeError::CyclicInsertion)
    }

    /// Insert `child` immediately before `before`, which must be a child of `parent`.
    pub fn insert_before(
        &mut self,
        parent: NodeHandle,
        child: NodeHandle,
        before: NodeHandle,
    ) -> Result<()> {
        if self.parent(before) != Some(parent) {
            return Err(TreeError::InvalidReference);
        }
        if child == before {
            return Ok(());
        }
        self.check_attach(parent, child)?;
        trace!(parent = ?parent.0, child = ?child.0, before = ?before.0, "insert before");
        before
            .0
            .checked_insert_before(child.0, &mut self.arena)
            .map_err(|_| TreeError::CyclicInsertion)
    }

    /// Detach `child` from `parent`. The node stays valid and may be re-attached.
    ///
    /// Removing something that isn't a child of `parent` does nothing.
    pub fn remove_child(&mut self, parent: NodeHandle, child: NodeHandle) -> Result<()> {
        self.get(parent)?;
        self.get(child)?;
        if self.parent(child) != Some(parent) {
            trace!(parent = ?parent.0, child = ?child.0, "remove child: not a child, ignoring");
            return Ok(());
        }
        trace!(parent = ?parent.0, child = ?child.0, "remove child");
        child.0.detach(&mut self.arena);
        Ok(())
    }

    /// Replace the content of a text node.
    pub fn set_text(&mut self, node: NodeHandle, text: impl Into<CompactString>) -> Result<()> {
        match &mut self.get_mut(node)?.kind {
            NodeKind::Text(t) => {
                *t = text.into();
                Ok(())
            }
            _ => Err(TreeError::NotATextNode),
        }
    }

    /// Append an attribute to an element. Setting the same name twice keeps both.
    pub fn set_attribute(
        &mut self,
        node: NodeHandle,
        name: impl Into<CompactString>,
        value: impl Into<CompactString>,
    ) -> Result<()> {
        match &mut self.get_mut(node)?.kind {
            NodeKind::Element(elem) => {
                elem.attrs.push(Attr {
                    name: name.into(),
                    value: value.into(),
                });
                Ok(())
            }
            _ => Err(TreeError::NotAnElement),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use facet_testhelpers::test;

    fn tags(tree: &SsrTree, node: NodeHandle) -> Vec<String> {
        tree.children(node)
            .map(|c| {
                tree.tag(c)
                    .or_else(|| tree.text(c))
                    .unwrap_or_default()
                    .to_string()
            })
            .collect()
    }

    #[test]
    fn test_append_keeps_order() {
        let mut tree = SsrTree::new(RootKind::Element);
        let root = tree.root();
        let a = tree.create_element("a");
        let b = tree.create_element("b");
        let c = tree.create_text("c");
        tree.append_child(root, a).unwrap();
        tree.append_child(root, b).unwrap();
        tree.append_child(root, c).unwrap();
        assert_eq!(tags(&tree, root), ["a", "b", "c"]);
        assert_eq!(tree.parent(b), Some(root));
    }

    #[test]
    fn test_reappend_moves_node() {
        let mut tree = SsrTree::new(RootKind::Element);
        let root = tree.root();
        let a = tree.create_element("a");
        let b = tree.create_element("b");
        tree.append_child(root, a).unwrap();
        tree.append_child(root, b).unwrap();
        tree.append_child(root, a).unwrap();
        assert_eq!(tags(&tree, root), ["b", "a"]);
    }

    #[test]
    fn test_insert_before() {
        let mut tree = SsrTree::new(RootKind::Static);
        let root = tree.root();
        let a = tree.create_element("a");
        let c = tree.create_element("c");
        let b = tree.create_element("b");
        tree.append_child(root, a).unwrap();
        tree.append_child(root, c).unwrap();
        tree.insert_before(root, b, c).unwrap();
        assert_eq!(tags(&tree, root), ["a", "b", "c"]);
        assert_eq!(tree.previous_sibling(c), Some(b));
        assert_eq!(tree.previous_sibling(a), None);
    }

    #[test]
    fn test_insert_before_missing_reference() {
        let mut tree = SsrTree::new(RootKind::Static);
        let root = tree.root();
        let div = tree.create_element("div");
        let stray = tree.create_element("span");
        let child = tree.create_element("p");
        tree.append_child(root, div).unwrap();
        assert_eq!(
            tree.insert_before(root, child, stray),
            Err(TreeError::InvalidReference)
        );
        // reference exists, but under another parent
        tree.append_child(div, stray).unwrap();
        assert_eq!(
            tree.insert_before(root, child, stray),
            Err(TreeError::InvalidReference)
        );
        assert_eq!(tags(&tree, root), ["div"]);
    }

    #[test]
    fn test_remove_child() {
        let mut tree = SsrTree::new(RootKind::Element);
        let root = tree.root();
        let a = tree.create_element("a");
        let b = tree.create_element("b");
        tree.append_child(root, a).unwrap();
        tree.append_child(root, b).unwrap();
        tree.remove_child(root, a).unwrap();
        assert_eq!(tags(&tree, root), ["b"]);
        assert_eq!(tree.parent(a), None);

        // not a child any more: ignored
        tree.remove_child(root, a).unwrap();
        assert_eq!(tags(&tree, root), ["b"]);

        // detached nodes can come back
        tree.insert_before(root, a, b).unwrap();
        assert_eq!(tags(&tree, root), ["a", "b"]);
    }

    #[test]
    fn test_text_nodes_are_leaves() {
        let mut tree = SsrTree::new(RootKind::Element);
        let text = tree.create_text("hi");
        let span = tree.create_element("span");
        assert_eq!(
            tree.append_child(text, span),
            Err(TreeError::LeafCannotHaveChildren)
        );
        assert_eq!(
            tree.set_attribute(text, "id", "x"),
            Err(TreeError::NotAnElement)
        );
    }

    #[test]
    fn test_root_cannot_be_nested() {
        let mut tree = SsrTree::new(RootKind::Element);
        let root = tree.root();
        let div = tree.create_element("div");
        tree.append_child(root, div).unwrap();
        assert_eq!(
            tree.append_child(div, root),
            Err(TreeError::RootCannotBeNested)
        );
    }

    #[test]
    fn test_cyclic_insertion() {
        let mut tree = SsrTree::new(RootKind::Element);
        let outer = tree.create_element("div");
        let inner = tree.create_element("span");
        tree.append_child(outer, inner).unwrap();
        assert_eq!(
            tree.append_child(inner, outer),
            Err(TreeError::CyclicInsertion)
        );
        assert_eq!(
            tree.append_child(outer, outer),
            Err(TreeError::CyclicInsertion)
        );
    }

    #[test]
    fn test_set_text() {
        let mut tree = SsrTree::new(RootKind::Element);
        let text = tree.create_text("before");
        tree.set_text(text, "after").unwrap();
        assert_eq!(tree.text(text), Some("after"));

        let div = tree.create_element("div");
        assert_eq!(tree.set_text(div, "x"), Err(TreeError::NotATextNode));
    }

    #[test]
    fn test_duplicate_attributes_are_kept() {
        let mut tree = SsrTree::new(RootKind::Element);
        let div = tree.create_element("div");
        tree.set_attribute(div, "id", "a").unwrap();
        tree.set_attribute(div, "class", "b").unwrap();
        tree.set_attribute(div, "id", "c").unwrap();
        let names: Vec<_> = tree
            .attributes(div)
            .iter()
            .map(|a| (a.name.as_str(), a.value.as_str()))
            .collect();
        assert_eq!(names, [("id", "a"), ("class", "b"), ("id", "c")]);
    }
}
