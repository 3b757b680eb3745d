//! Mount pass: turns a [`Node`] tree into host-config calls.
//!
//! Mount order per element is create, mount children, finalize, and attach to
//! the parent. Top-level nodes are appended to the container between
//! `prepare_for_commit` and `reset_after_commit`; nodes whose finalization asked
//! for it get `commit_mount` after that, and component effects run last.
//!
//! Elements the host fills with text themselves never get their children
//! mounted; a `<textarea>`'s text children are passed as its `children` prop.

use std::borrow::Cow;

use compact_str::CompactString;
use leftovers::{Completion, Driver, HostConfig, PropValue, Props};

use crate::debug;
use crate::node::{CHILDREN, Element, Node, Scope};

/// A mount-only reconciler. Every render starts from an empty container.
#[derive(Debug, Default)]
pub struct Reconciler {
    mounted: usize,
    components: usize,
    effects: usize,
}

/// A node waiting for `commit_mount`.
struct PendingMount<N> {
    node: N,
    tag: CompactString,
    props: Props,
}

impl Reconciler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Host nodes created by the last render.
    pub fn mounted(&self) -> usize {
        self.mounted
    }

    /// Components rendered by the last render.
    pub fn components(&self) -> usize {
        self.components
    }

    /// Effects run after the last render's commit.
    pub fn effects(&self) -> usize {
        self.effects
    }

    /// Mount `node`, pushing the host nodes it produced to `out`.
    fn mount<H: HostConfig>(
        &mut self,
        host: &H,
        ctx: &H::HostContext,
        scope: &Scope,
        node: &Node,
        out: &mut Vec<H::Node>,
        pending: &mut Vec<PendingMount<H::Node>>,
    ) -> leftovers::Result<()> {
        match node {
            Node::Empty => {}
            Node::Text(text) => {
                out.push(host.create_text_instance(text, ctx));
                self.mounted += 1;
            }
            Node::Fragment(nodes) => {
                for node in nodes {
                    self.mount(host, ctx, scope, node, out, pending)?;
                }
            }
            Node::Component(component) => {
                self.components += 1;
                let inner = scope.nested();
                let rendered = component.render(&inner);
                self.mount(host, ctx, &inner, &rendered, out, pending)?;
            }
            Node::Element(elem) => {
                let instance = self.mount_element(host, ctx, scope, elem, pending)?;
                out.push(instance);
            }
        }
        Ok(())
    }

    fn mount_element<H: HostConfig>(
        &mut self,
        host: &H,
        ctx: &H::HostContext,
        scope: &Scope,
        elem: &Element,
        pending: &mut Vec<PendingMount<H::Node>>,
    ) -> leftovers::Result<H::Node> {
        let tag = elem.tag.as_str();
        let props = host_props(elem);
        let props: &Props = &props;
        let instance = host.create_instance(tag, props, ctx);
        self.mounted += 1;

        if !host.should_set_text_content(tag, props) {
            let child_ctx = host.child_host_context(ctx, tag);
            let mut children = Vec::new();
            for child in &elem.children {
                self.mount(host, &child_ctx, scope, child, &mut children, pending)?;
            }
            for child in children {
                host.append_initial_child(instance, child)?;
            }
        }

        if host.finalize_initial_children(instance, tag, props)? {
            pending.push(PendingMount {
                node: instance,
                tag: elem.tag.clone(),
                props: props.clone(),
            });
        }
        Ok(instance)
    }
}

/// Props handed to the host. A `<textarea>` without a `children` prop takes
/// its text children as its value, since its child nodes are never mounted.
fn host_props(elem: &Element) -> Cow<'_, Props> {
    if elem.tag != "textarea" || elem.props.contains_key(CHILDREN) {
        return Cow::Borrowed(&elem.props);
    }
    let mut value = CompactString::default();
    collect_text(&elem.children, &mut value);
    if value.is_empty() {
        return Cow::Borrowed(&elem.props);
    }
    let mut props = elem.props.clone();
    props.insert(CHILDREN.to_owned(), PropValue::Str(value));
    Cow::Owned(props)
}

fn collect_text(nodes: &[Node], out: &mut CompactString) {
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Fragment(nodes) => collect_text(nodes, out),
            _ => {}
        }
    }
}

impl Driver for Reconciler {
    type Element = Node;

    fn update_container<H: HostConfig>(
        &mut self,
        host: &H,
        container: H::Node,
        element: Node,
        completion: Option<Completion>,
    ) -> leftovers::Result<()> {
        self.mounted = 0;
        self.components = 0;
        self.effects = 0;

        let ctx = host.root_host_context(container);
        let scope = Scope::root(completion);
        let mut top_level = Vec::new();
        let mut pending = Vec::new();
        self.mount(host, &ctx, &scope, &element, &mut top_level, &mut pending)?;

        host.prepare_for_commit();
        let attached = top_level
            .into_iter()
            .try_for_each(|node| host.append_child_to_container(container, node));
        host.reset_after_commit();
        attached?;

        for PendingMount { node, tag, props } in pending {
            host.commit_mount(node, &tag, &props);
        }
        self.effects = scope.run_effects();

        debug!(
            mounted = self.mounted,
            components = self.components,
            effects = self.effects,
            "mounted"
        );
        Ok(())
    }
}
