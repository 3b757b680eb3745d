//! HTML templates as [`Node`]s.
//!
//! Parsing goes through html5ever's tree builder, so templates get the same
//! error recovery a browser applies. Attributes become props verbatim and
//! comments are dropped.

use std::borrow::Cow;
use std::cell::RefCell;

use html5ever::tree_builder::{ElemName, ElementFlags, NodeOrText, QuirksMode, TreeSink};
use html5ever::{Attribute, LocalName, QualName, parse_document};
use html5ever::{local_name, namespace_url, ns};
use indextree::{Arena, NodeId};
use tendril::{StrTendril, TendrilSink};

use crate::debug;
use crate::node::{Component, Element, Node};

/// Parse an HTML fragment into nodes.
///
/// Content the parser places in `<head>` (`<title>`, `<meta>`, ...) comes
/// first, followed by the body content, each in document order.
///
/// ```rust
/// use sous::template::parse_fragment;
///
/// let nodes = parse_fragment("<p class=\"lead\">Hello</p>");
/// assert_eq!(nodes.len(), 1);
/// ```
pub fn parse_fragment(html: &str) -> Vec<Node> {
    let sink = TemplateSink::new();
    parse_document(sink, Default::default()).one(StrTendril::from(html))
}

/// A component that renders a parsed template.
///
/// The template is parsed once; each render clones the nodes.
pub fn component(name: &str, html: &str) -> Component {
    let nodes = parse_fragment(html);
    debug!(name, nodes = nodes.len(), "template parsed");
    Component::new(name, move |_| Node::Fragment(nodes.clone()))
}

/// What the sink stores per node while html5ever builds the tree
#[derive(Debug, Clone)]
enum ParseNode {
    Document,
    Element {
        name: QualName,
        attrs: Vec<Attribute>,
    },
    Text(StrTendril),
    Comment,
}

/// Owned element name wrapper
#[derive(Debug, Clone)]
struct OwnedElemName(QualName);

impl ElemName for OwnedElemName {
    fn ns(&self) -> &html5ever::Namespace {
        &self.0.ns
    }

    fn local_name(&self) -> &LocalName {
        &self.0.local
    }
}

/// TreeSink that collects a template into an arena, then converts it to nodes
struct TemplateSink {
    arena: RefCell<Arena<ParseNode>>,
    document: NodeId,
}

impl TemplateSink {
    fn new() -> Self {
        let mut arena = Arena::new();
        let document = arena.new_node(ParseNode::Document);
        TemplateSink {
            arena: RefCell::new(arena),
            document,
        }
    }

    fn new_text(arena: &mut Arena<ParseNode>, text: StrTendril) -> NodeId {
        arena.new_node(ParseNode::Text(text))
    }
}

/// Find the direct child element of `parent` named `tag`.
fn child_element(arena: &Arena<ParseNode>, parent: NodeId, tag: &str) -> Option<NodeId> {
    parent.children(arena).find(|&id| {
        matches!(arena[id].get(), ParseNode::Element { name, .. } if &*name.local == tag)
    })
}

fn to_node(arena: &Arena<ParseNode>, id: NodeId) -> Option<Node> {
    match arena[id].get() {
        ParseNode::Document | ParseNode::Comment => None,
        ParseNode::Text(text) => Some(Node::Text((&**text).into())),
        ParseNode::Element { name, attrs } => {
            let mut elem = Element::new(&*name.local);
            for attr in attrs {
                elem = elem.prop(attr.name.local.to_string(), &*attr.value);
            }
            let children = id.children(arena).filter_map(|child| to_node(arena, child));
            Some(elem.children(children).into())
        }
    }
}

impl TreeSink for TemplateSink {
    type Handle = NodeId;
    type Output = Vec<Node>;
    type ElemName<'a>
        = OwnedElemName
    where
        Self: 'a;

    fn finish(self) -> Self::Output {
        let arena = self.arena.into_inner();
        let Some(html) = child_element(&arena, self.document, "html") else {
            return Vec::new();
        };
        ["head", "body"]
            .into_iter()
            .filter_map(|section| child_element(&arena, html, section))
            .flat_map(|section| section.children(&arena))
            .filter_map(|id| to_node(&arena, id))
            .collect()
    }

    fn parse_error(&self, _msg: Cow<'static, str>) {
        // html5ever recovers on its own
    }

    fn get_document(&self) -> Self::Handle {
        self.document
    }

    fn set_quirks_mode(&self, _mode: QuirksMode) {}

    fn same_node(&self, a: &Self::Handle, b: &Self::Handle) -> bool {
        a == b
    }

    fn elem_name<'a>(&'a self, target: &'a Self::Handle) -> OwnedElemName {
        match self.arena.borrow()[*target].get() {
            ParseNode::Element { name, .. } => OwnedElemName(name.clone()),
            _ => OwnedElemName(QualName {
                prefix: None,
                ns: ns!(html),
                local: local_name!(""),
            }),
        }
    }

    fn create_element(
        &self,
        name: QualName,
        attrs: Vec<Attribute>,
        _flags: ElementFlags,
    ) -> Self::Handle {
        self.arena
            .borrow_mut()
            .new_node(ParseNode::Element { name, attrs })
    }

    fn create_comment(&self, _text: StrTendril) -> Self::Handle {
        self.arena.borrow_mut().new_node(ParseNode::Comment)
    }

    fn create_pi(&self, _target: StrTendril, _data: StrTendril) -> Self::Handle {
        self.arena.borrow_mut().new_node(ParseNode::Comment)
    }

    fn append(&self, parent: &Self::Handle, child: NodeOrText<Self::Handle>) {
        let mut arena = self.arena.borrow_mut();
        match child {
            NodeOrText::AppendNode(node) => {
                parent.append(node, &mut arena);
            }
            NodeOrText::AppendText(text) => {
                // merge into a preceding text node
                let last = parent.children(&arena).next_back();
                if let Some(last) = last
                    && let ParseNode::Text(existing) = arena[last].get_mut()
                {
                    existing.push_tendril(&text);
                    return;
                }
                let node = Self::new_text(&mut arena, text);
                parent.append(node, &mut arena);
            }
        }
    }

    fn append_before_sibling(&self, sibling: &Self::Handle, new_node: NodeOrText<Self::Handle>) {
        let mut arena = self.arena.borrow_mut();
        let node = match new_node {
            NodeOrText::AppendNode(node) => node,
            NodeOrText::AppendText(text) => Self::new_text(&mut arena, text),
        };
        sibling.insert_before(node, &mut arena);
    }

    fn append_based_on_parent_node(
        &self,
        element: &Self::Handle,
        _prev_element: &Self::Handle,
        child: NodeOrText<Self::Handle>,
    ) {
        self.append(element, child);
    }

    fn append_doctype_to_document(
        &self,
        _name: StrTendril,
        _public_id: StrTendril,
        _system_id: StrTendril,
    ) {
    }

    fn get_template_contents(&self, target: &Self::Handle) -> Self::Handle {
        // <template> content is kept inline
        *target
    }

    fn add_attrs_if_missing(&self, target: &Self::Handle, attrs: Vec<Attribute>) {
        let mut arena = self.arena.borrow_mut();
        if let ParseNode::Element { attrs: existing, .. } = arena[*target].get_mut() {
            for attr in attrs {
                if !existing.iter().any(|a| a.name == attr.name) {
                    existing.push(attr);
                }
            }
        }
    }

    fn remove_from_parent(&self, target: &Self::Handle) {
        target.detach(&mut self.arena.borrow_mut());
    }

    fn reparent_children(&self, node: &Self::Handle, new_parent: &Self::Handle) {
        let mut arena = self.arena.borrow_mut();
        let children: Vec<NodeId> = node.children(&arena).collect();
        for child in children {
            child.detach(&mut arena);
            new_parent.append(child, &mut arena);
        }
    }
}
