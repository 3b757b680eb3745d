//! The element model components are written against.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use compact_str::CompactString;
use leftovers::{Completion, EventHandler, PropValue, Props, StyleMap};

/// Property under which text content and element children travel.
pub const CHILDREN: &str = "children";

/// Something that can be mounted.
#[derive(Debug, Clone)]
pub enum Node {
    /// A host element
    Element(Element),
    /// Text content
    Text(CompactString),
    /// Several nodes without a wrapper element
    Fragment(Vec<Node>),
    /// A function of its scope, rendered during mount
    Component(Component),
    /// Renders nothing
    Empty,
}

impl From<Element> for Node {
    fn from(elem: Element) -> Self {
        Node::Element(elem)
    }
}

impl From<Component> for Node {
    fn from(component: Component) -> Self {
        Node::Component(component)
    }
}

impl From<&str> for Node {
    fn from(text: &str) -> Self {
        Node::Text(text.into())
    }
}

impl From<String> for Node {
    fn from(text: String) -> Self {
        Node::Text(text.into())
    }
}

impl From<Vec<Node>> for Node {
    fn from(nodes: Vec<Node>) -> Self {
        Node::Fragment(nodes)
    }
}

impl<T: Into<Node>> From<Option<T>> for Node {
    fn from(node: Option<T>) -> Self {
        node.map_or(Node::Empty, Into::into)
    }
}

/// A host element: tag, ordered props and child nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub tag: CompactString,
    pub props: Props,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(tag: impl Into<CompactString>) -> Self {
        Self {
            tag: tag.into(),
            props: Props::new(),
            children: Vec::new(),
        }
    }

    /// Set a property. Props are projected in the order they were first set.
    pub fn prop(mut self, name: impl Into<String>, value: impl Into<PropValue>) -> Self {
        self.props.insert(name.into(), value.into());
        self
    }

    pub fn class_name(self, class: impl Into<CompactString>) -> Self {
        self.prop("className", PropValue::Str(class.into()))
    }

    pub fn id(self, id: impl Into<CompactString>) -> Self {
        self.prop("id", PropValue::Str(id.into()))
    }

    pub fn style(self, styles: StyleMap) -> Self {
        self.prop("style", styles)
    }

    /// Attach an event handler, e.g. `on("click", ..)` sets `onClick`.
    pub fn on(self, event: &str, handler: impl Fn() + 'static) -> Self {
        let mut name = String::with_capacity(event.len() + 2);
        name.push_str("on");
        let mut chars = event.chars();
        if let Some(first) = chars.next() {
            name.push(first.to_ascii_uppercase());
            name.push_str(chars.as_str());
        }
        self.prop(name, EventHandler::new(handler))
    }

    /// Text content. The host renders it itself; child nodes are not mounted.
    pub fn text(self, text: impl Into<CompactString>) -> Self {
        self.prop(CHILDREN, PropValue::Str(text.into()))
    }

    /// Numeric content, rendered like [`text`](Self::text).
    pub fn number(self, n: f64) -> Self {
        self.prop(CHILDREN, n)
    }

    /// Append a child node. A `<textarea>` without [`text`](Self::text)
    /// takes the text of its child nodes as its value instead.
    pub fn child(mut self, child: impl Into<Node>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn children<I>(mut self, children: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Node>,
    {
        self.children.extend(children.into_iter().map(Into::into));
        self
    }
}

type Effect = Box<dyn FnOnce()>;

/// What a component sees while it renders.
#[derive(Clone, Default)]
pub struct Scope {
    completion: Option<Completion>,
    depth: usize,
    effects: Rc<RefCell<Vec<Effect>>>,
}

impl Scope {
    pub(crate) fn root(completion: Option<Completion>) -> Self {
        Self {
            completion,
            ..Default::default()
        }
    }

    pub(crate) fn nested(&self) -> Self {
        Self {
            completion: self.completion.clone(),
            depth: self.depth + 1,
            effects: Rc::clone(&self.effects),
        }
    }

    /// Completion signal of an asynchronous render; `None` for synchronous renders.
    pub fn completion(&self) -> Option<&Completion> {
        self.completion.as_ref()
    }

    /// How many components enclose this one.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Run `effect` once the whole tree is attached to the container.
    ///
    /// Effects run in registration order, after every `commit_mount`.
    pub fn after_mount(&self, effect: impl FnOnce() + 'static) {
        self.effects.borrow_mut().push(Box::new(effect));
    }

    /// Fire the completion, if any, once the tree is attached.
    pub fn complete_after_mount(&self) {
        if let Some(completion) = self.completion.clone() {
            self.after_mount(move || completion.complete());
        }
    }

    /// Run and drop registered effects, including ones they register.
    pub(crate) fn run_effects(&self) -> usize {
        let mut ran = 0;
        loop {
            let effects = std::mem::take(&mut *self.effects.borrow_mut());
            if effects.is_empty() {
                return ran;
            }
            for effect in effects {
                effect();
                ran += 1;
            }
        }
    }
}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scope")
            .field("completion", &self.completion)
            .field("depth", &self.depth)
            .field("effects", &self.effects.borrow().len())
            .finish()
    }
}

type RenderFn = dyn Fn(&Scope) -> Node;

/// A named render function.
#[derive(Clone)]
pub struct Component {
    name: CompactString,
    render: Rc<RenderFn>,
}

impl Component {
    pub fn new(name: impl Into<CompactString>, render: impl Fn(&Scope) -> Node + 'static) -> Self {
        Self {
            name: name.into(),
            render: Rc::new(render),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn render(&self, scope: &Scope) -> Node {
        (self.render)(scope)
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Component").field(&self.name).finish()
    }
}

impl PartialEq for Component {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.render, &other.render)
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Node::Element(a), Node::Element(b)) => a == b,
            (Node::Text(a), Node::Text(b)) => a == b,
            (Node::Fragment(a), Node::Fragment(b)) => a == b,
            (Node::Component(a), Node::Component(b)) => a == b,
            (Node::Empty, Node::Empty) => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_keeps_prop_order() {
        let elem = Element::new("div").id("x").class_name("y").prop("title", "t");
        let names: Vec<_> = elem.props.keys().map(String::as_str).collect();
        assert_eq!(names, ["id", "className", "title"]);
    }

    #[test]
    fn test_on_builds_listener_name() {
        let elem = Element::new("button").on("click", || {});
        assert!(elem.props.contains_key("onClick"));
    }

    #[test]
    fn test_text_goes_through_children_prop() {
        let elem = Element::new("p").text("hi");
        assert_eq!(elem.props.get(CHILDREN), Some(&PropValue::Str("hi".into())));
        assert!(elem.children.is_empty());
    }

    #[test]
    fn test_node_conversions() {
        assert_eq!(Node::from("a"), Node::Text("a".into()));
        assert_eq!(Node::from(None::<Element>), Node::Empty);
        assert_eq!(
            Node::from(vec![Node::Empty]),
            Node::Fragment(vec![Node::Empty])
        );
    }

    #[test]
    fn test_scope_nesting() {
        let root = Scope::root(None);
        let inner = root.nested().nested();
        assert_eq!(inner.depth(), 2);
        assert!(inner.completion().is_none());
    }

    #[test]
    fn test_effects_shared_and_run_in_order() {
        let root = Scope::root(None);
        let inner = root.nested();
        let log = Rc::new(RefCell::new(Vec::new()));

        let l = Rc::clone(&log);
        root.after_mount(move || l.borrow_mut().push("outer"));
        let (l, nested) = (Rc::clone(&log), inner.clone());
        inner.after_mount(move || {
            l.borrow_mut().push("inner");
            let l = Rc::clone(&l);
            nested.after_mount(move || l.borrow_mut().push("late"));
        });
        // no completion on a sync scope: nothing registered
        inner.complete_after_mount();

        assert_eq!(root.run_effects(), 3);
        assert_eq!(*log.borrow(), ["outer", "inner", "late"]);
        assert_eq!(root.run_effects(), 0);
    }
}
