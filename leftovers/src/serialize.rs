//! Markup serializer for the server tree.
//!
//! Produces exactly the markup a client-side renderer expects to find when it
//! hydrates:
//!
//! - Void elements without children self-close (`<br/>`)
//! - Text and attribute values are escaped
//! - Element children of a hydratable root carry `data-reactroot=""`
//! - Adjacent text nodes are separated by `<!-- -->` so they can be told apart
//!   on the client (hydratable markup only)

use facet::Facet;

use crate::error::Result;
use crate::escape::escape_html;
use crate::tree::{ElementData, NodeHandle, NodeKind, SsrTree};

/// Attribute added to every top-level element of hydratable markup.
pub const ROOT_ATTRIBUTE: &str = "data-reactroot";

/// Separator emitted between adjacent text nodes in hydratable markup.
pub const TEXT_SEPARATOR: &str = "<!-- -->";

/// Whether markup is meant to be hydrated on the client.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Facet)]
#[repr(u8)]
pub enum MarkupMode {
    /// Markup a client-side renderer will hydrate (separators, root marker)
    #[default]
    Hydratable,
    /// Plain markup for static export
    Static,
}

/// Options for HTML serialization.
#[derive(Clone, Debug, Default)]
pub struct SerializeOptions {
    /// Hydratable or static output (default: hydratable)
    pub mode: MarkupMode,
}

impl SerializeOptions {
    /// Create new default options (hydratable output).
    pub fn new() -> Self {
        Self::default()
    }

    /// Produce static markup: no text separators.
    pub fn static_markup(mut self) -> Self {
        self.mode = MarkupMode::Static;
        self
    }

    /// Produce hydratable markup.
    pub fn hydratable(mut self) -> Self {
        self.mode = MarkupMode::Hydratable;
        self
    }

    pub fn is_static(&self) -> bool {
        self.mode == MarkupMode::Static
    }
}

impl From<MarkupMode> for SerializeOptions {
    fn from(mode: MarkupMode) -> Self {
        Self { mode }
    }
}

/// Elements that self-close when they have no children.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "keygen", "link", "meta", "param",
    "source", "track", "wbr",
];

/// Check if a tag is a void element.
fn is_void_element(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag)
}

/// Serialize a node and its subtree to an HTML string.
pub fn serialize(tree: &SsrTree, node: NodeHandle, opts: &SerializeOptions) -> Result<String> {
    tree.get(node)?;
    let mut out = String::new();
    let mut ser = Serializer::new(&mut out, tree, opts);
    ser.write_node(node, Position::Child { after_text: false });
    Ok(out)
}

/// Where a node sits relative to its siblings.
#[derive(Clone, Copy)]
enum Position {
    /// Direct child of a hydratable root
    DocumentRoot,
    /// Anywhere else
    Child { after_text: bool },
}

struct Serializer<'a> {
    out: &'a mut String,
    tree: &'a SsrTree,
    options: &'a SerializeOptions,
}

impl<'a> Serializer<'a> {
    fn new(out: &'a mut String, tree: &'a SsrTree, options: &'a SerializeOptions) -> Self {
        Self { out, tree, options }
    }

    fn write_node(&mut self, node: NodeHandle, position: Position) {
        let tree = self.tree;
        match &tree.data(node).kind {
            NodeKind::StaticRoot => self.write_children(node),
            NodeKind::ElementRoot => {
                for child in tree.children(node) {
                    self.write_node(child, Position::DocumentRoot);
                }
            }
            NodeKind::Text(text) => {
                if !self.options.is_static()
                    && matches!(position, Position::Child { after_text: true })
                {
                    self.out.push_str(TEXT_SEPARATOR);
                }
                self.out.push_str(&escape_html(text));
            }
            NodeKind::Element(elem) => {
                self.write_element(node, elem, matches!(position, Position::DocumentRoot))
            }
        }
    }

    fn write_children(&mut self, node: NodeHandle) {
        let tree = self.tree;
        let mut after_text = false;
        for child in tree.children(node) {
            self.write_node(child, Position::Child { after_text });
            after_text = tree.data(child).kind.is_text();
        }
    }

    fn write_element(&mut self, node: NodeHandle, elem: &ElementData, is_root: bool) {
        let tag = elem.tag.as_str();
        let has_children = self.tree.children(node).next().is_some();
        let self_close = !has_children && is_void_element(tag);

        self.out.push('<');
        self.out.push_str(tag);
        for attr in &elem.attrs {
            self.out.push(' ');
            self.out.push_str(&attr.name);
            self.out.push_str("=\"");
            self.out.push_str(&escape_html(&attr.value));
            self.out.push('"');
        }
        if is_root {
            self.out.push(' ');
            self.out.push_str(ROOT_ATTRIBUTE);
            self.out.push_str("=\"\"");
        }

        if self_close {
            self.out.push_str("/>");
            return;
        }
        self.out.push('>');

        self.write_children(node);

        self.out.push_str("</");
        self.out.push_str(tag);
        self.out.push('>');
    }
}

// =============================================================================
// Convenience methods on SsrTree
// =============================================================================

impl SsrTree {
    /// Serialize the whole tree from its root.
    pub fn to_html(&self, opts: &SerializeOptions) -> String {
        let mut out = String::new();
        Serializer::new(&mut out, self, opts)
            .write_node(self.root(), Position::Child { after_text: false });
        out
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::RootKind;

    fn hydratable() -> SerializeOptions {
        SerializeOptions::new()
    }

    fn static_markup() -> SerializeOptions {
        SerializeOptions::new().static_markup()
    }

    #[test]
    fn test_void_elements_self_close() {
        let mut tree = SsrTree::new(RootKind::Static);
        let root = tree.root();
        let br = tree.create_element("br");
        let div = tree.create_element("div");
        tree.append_child(root, br).unwrap();
        tree.append_child(root, div).unwrap();
        assert_eq!(tree.to_html(&static_markup()), "<br/><div></div>");
    }

    #[test]
    fn test_void_element_with_children_is_closed() {
        let mut tree = SsrTree::new(RootKind::Static);
        let root = tree.root();
        let br = tree.create_element("br");
        let text = tree.create_text("x");
        tree.append_child(root, br).unwrap();
        tree.append_child(br, text).unwrap();
        assert_eq!(tree.to_html(&static_markup()), "<br>x</br>");
    }

    #[test]
    fn test_root_marker() {
        let mut tree = SsrTree::new(RootKind::Element);
        let root = tree.root();
        let div = tree.create_element("div");
        tree.append_child(root, div).unwrap();
        assert_eq!(tree.to_html(&hydratable()), r#"<div data-reactroot=""></div>"#);

        let mut tree = SsrTree::new(RootKind::Static);
        let root = tree.root();
        let div = tree.create_element("div");
        tree.append_child(root, div).unwrap();
        assert_eq!(tree.to_html(&static_markup()), "<div></div>");
    }

    #[test]
    fn test_root_marker_only_on_top_level_elements() {
        let mut tree = SsrTree::new(RootKind::Element);
        let root = tree.root();
        let ul = tree.create_element("ul");
        let li = tree.create_element("li");
        let img = tree.create_element("img");
        tree.set_attribute(img, "src", "a.png").unwrap();
        tree.append_child(root, ul).unwrap();
        tree.append_child(ul, li).unwrap();
        tree.append_child(root, img).unwrap();
        assert_eq!(
            tree.to_html(&hydratable()),
            r#"<ul data-reactroot=""><li></li></ul><img src="a.png" data-reactroot=""/>"#
        );
    }

    #[test]
    fn test_adjacent_text_separator() {
        let mut tree = SsrTree::new(RootKind::Element);
        let root = tree.root();
        let p = tree.create_element("p");
        let a = tree.create_text("a");
        let b = tree.create_text("b");
        tree.append_child(root, p).unwrap();
        tree.append_child(p, a).unwrap();
        tree.append_child(p, b).unwrap();
        assert_eq!(tree.to_html(&hydratable()), r#"<p data-reactroot="">a<!-- -->b</p>"#);
        assert_eq!(serialize(&tree, p, &static_markup()).unwrap(), "<p>ab</p>");
    }

    #[test]
    fn test_separator_only_between_texts() {
        let mut tree = SsrTree::new(RootKind::Static);
        let root = tree.root();
        let p = tree.create_element("p");
        tree.append_child(root, p).unwrap();
        let a = tree.create_text("a");
        let em = tree.create_element("em");
        let b = tree.create_text("b");
        let c = tree.create_text("c");
        for child in [a, em, b, c] {
            tree.append_child(p, child).unwrap();
        }
        assert_eq!(
            serialize(&tree, p, &hydratable()).unwrap(),
            "<p>a<em></em>b<!-- -->c</p>"
        );
    }

    #[test]
    fn test_top_level_texts_of_hydratable_root_are_not_separated() {
        let mut tree = SsrTree::new(RootKind::Element);
        let root = tree.root();
        let a = tree.create_text("a");
        let b = tree.create_text("b");
        tree.append_child(root, a).unwrap();
        tree.append_child(root, b).unwrap();
        assert_eq!(tree.to_html(&hydratable()), "ab");
    }

    #[test]
    fn test_static_root_children_use_sibling_rule() {
        let mut tree = SsrTree::new(RootKind::Static);
        let root = tree.root();
        let a = tree.create_text("a");
        let b = tree.create_text("b");
        tree.append_child(root, a).unwrap();
        tree.append_child(root, b).unwrap();
        assert_eq!(tree.to_html(&hydratable()), "a<!-- -->b");
        assert_eq!(tree.to_html(&static_markup()), "ab");
    }

    #[test]
    fn test_text_escaping() {
        let mut tree = SsrTree::new(RootKind::Element);
        let root = tree.root();
        let text = tree.create_text(r#"<b> & "quote""#);
        tree.append_child(root, text).unwrap();
        assert_eq!(
            tree.to_html(&hydratable()),
            "&lt;b&gt; &amp; &quot;quote&quot;"
        );
    }

    #[test]
    fn test_attribute_escaping() {
        let mut tree = SsrTree::new(RootKind::Static);
        let root = tree.root();
        let a = tree.create_element("a");
        tree.set_attribute(a, "href", "test?a=1&b=2").unwrap();
        tree.set_attribute(a, "title", r#"Say "hi" <now>"#).unwrap();
        tree.append_child(root, a).unwrap();
        assert_eq!(
            tree.to_html(&static_markup()),
            r#"<a href="test?a=1&amp;b=2" title="Say &quot;hi&quot; &lt;now&gt;"></a>"#
        );
    }

    #[test]
    fn test_attribute_order_is_insertion_order() {
        let mut tree = SsrTree::new(RootKind::Static);
        let root = tree.root();
        let div = tree.create_element("div");
        tree.set_attribute(div, "id", "x").unwrap();
        tree.set_attribute(div, "class", "y").unwrap();
        tree.append_child(root, div).unwrap();
        assert_eq!(
            tree.to_html(&static_markup()),
            r#"<div id="x" class="y"></div>"#
        );
    }

    #[test]
    fn test_serialize_is_idempotent() {
        let mut tree = SsrTree::new(RootKind::Element);
        let root = tree.root();
        let div = tree.create_element("div");
        let a = tree.create_text("a");
        let b = tree.create_text("b");
        tree.append_child(root, div).unwrap();
        tree.append_child(div, a).unwrap();
        tree.append_child(div, b).unwrap();
        let first = tree.to_html(&hydratable());
        let second = tree.to_html(&hydratable());
        assert_eq!(first, second);
    }

    #[test]
    fn test_serialize_unknown_node() {
        let tree = SsrTree::new(RootKind::Static);
        let mut other = SsrTree::new(RootKind::Static);
        let _ = other.create_element("div");
        let stray = other.create_element("span");
        assert!(serialize(&tree, stray, &hydratable()).is_err());
    }
}
