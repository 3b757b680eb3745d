//! The host-config surface a tree-building driver calls into.
//!
//! A component reconciler decides *when* nodes are created, attached, moved and
//! finalized; the host decides *what* that means for the output. [`HostConfig`]
//! is the full callback table such a reconciler expects. [`SsrHost`] implements
//! it over an [`SsrTree`]: creation and structural calls map to tree operations,
//! finalization runs the attribute projector, and the update/commit hooks a
//! single server pass never needs are explicit no-ops.

use std::cell::{Ref, RefCell};
use std::fmt;
use std::time::Duration;

use compact_str::CompactString;

use crate::error::Result;
use crate::props::{self, Props};
use crate::serialize::{MarkupMode, SerializeOptions};
use crate::tree::{NodeHandle, RootKind, SsrTree};
use crate::{debug, trace};

/// A deferred callback handed to [`HostConfig::schedule_deferred_callback`].
pub type DeferredCallback = Box<dyn FnOnce()>;

/// Identifies a scheduled deferred callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallbackId(pub u64);

/// Callbacks a tree-building driver invokes while rendering.
///
/// All methods take `&self`; implementations use interior mutability, like an
/// html5ever `TreeSink`. Structural methods are fallible so the driver can
/// propagate tree invariant violations with `?`.
pub trait HostConfig {
    /// Handle to a node created by this host (elements and text alike).
    type Node: Copy + Eq + fmt::Debug;
    /// Context passed down from parent to child while creating nodes.
    type HostContext;
    /// Result of diffing old and new props during an update.
    type UpdatePayload;

    // --- context --------------------------------------------------------

    fn root_host_context(&self, root: Self::Node) -> Self::HostContext;

    fn child_host_context(&self, parent: &Self::HostContext, tag: &str) -> Self::HostContext;

    /// What a component ref sees for this node.
    fn public_instance(&self, node: Self::Node) -> Self::Node;

    // --- creation -------------------------------------------------------

    /// Create an element. Attributes are applied later, in `finalize_initial_children`.
    fn create_instance(&self, tag: &str, props: &Props, context: &Self::HostContext)
    -> Self::Node;

    fn create_text_instance(&self, text: &str, context: &Self::HostContext) -> Self::Node;

    /// Attach a child while its parent is still being built.
    fn append_initial_child(&self, parent: Self::Node, child: Self::Node) -> Result<()>;

    /// Apply initial properties. Returns whether `commit_mount` must run for this node.
    fn finalize_initial_children(&self, node: Self::Node, tag: &str, props: &Props)
    -> Result<bool>;

    /// Whether the host renders the element's content from its props, so the
    /// driver must not mount children for it.
    fn should_set_text_content(&self, tag: &str, props: &Props) -> bool;

    fn should_deprioritize_subtree(&self, tag: &str, props: &Props) -> bool;

    // --- update & scheduling --------------------------------------------

    fn prepare_update(
        &self,
        node: Self::Node,
        tag: &str,
        old_props: &Props,
        new_props: &Props,
    ) -> Option<Self::UpdatePayload>;

    /// Returns `None` when the callback was not scheduled.
    fn schedule_deferred_callback(&self, callback: DeferredCallback) -> Option<CallbackId>;

    fn cancel_deferred_callback(&self, id: CallbackId);

    fn prepare_for_commit(&self);

    fn reset_after_commit(&self);

    /// Current time as seen by the scheduler.
    fn now(&self) -> Duration;

    fn use_sync_scheduling(&self) -> bool;

    // --- mutation -------------------------------------------------------

    fn commit_update(
        &self,
        node: Self::Node,
        payload: Self::UpdatePayload,
        tag: &str,
        old_props: &Props,
        new_props: &Props,
    );

    fn commit_mount(&self, node: Self::Node, tag: &str, props: &Props);

    fn commit_text_update(&self, node: Self::Node, old_text: &str, new_text: &str) -> Result<()>;

    /// Clear an element's text before fresh content is set.
    fn reset_text_content(&self, node: Self::Node) -> Result<()>;

    fn append_child(&self, parent: Self::Node, child: Self::Node) -> Result<()>;

    fn append_child_to_container(&self, container: Self::Node, child: Self::Node) -> Result<()>;

    fn insert_before(&self, parent: Self::Node, child: Self::Node, before: Self::Node)
    -> Result<()>;

    fn insert_in_container_before(
        &self,
        container: Self::Node,
        child: Self::Node,
        before: Self::Node,
    ) -> Result<()>;

    fn remove_child(&self, parent: Self::Node, child: Self::Node) -> Result<()>;

    fn remove_child_from_container(&self, container: Self::Node, child: Self::Node)
    -> Result<()>;
}

/// Host that builds an [`SsrTree`] for server rendering.
#[derive(Debug)]
pub struct SsrHost {
    tree: RefCell<SsrTree>,
    mode: MarkupMode,
}

impl SsrHost {
    /// Host for hydratable markup, rooted at an element root.
    pub fn hydratable() -> Self {
        Self {
            tree: RefCell::new(SsrTree::new(RootKind::Element)),
            mode: MarkupMode::Hydratable,
        }
    }

    /// Host for static markup, rooted at a static root.
    pub fn static_markup() -> Self {
        Self {
            tree: RefCell::new(SsrTree::new(RootKind::Static)),
            mode: MarkupMode::Static,
        }
    }

    pub fn with_mode(mode: MarkupMode) -> Self {
        match mode {
            MarkupMode::Hydratable => Self::hydratable(),
            MarkupMode::Static => Self::static_markup(),
        }
    }

    pub fn mode(&self) -> MarkupMode {
        self.mode
    }

    /// The container the driver mounts top-level nodes into.
    pub fn container(&self) -> NodeHandle {
        self.tree.borrow().root()
    }

    /// Borrow the tree for inspection.
    pub fn tree(&self) -> Ref<'_, SsrTree> {
        self.tree.borrow()
    }

    /// Serialize the current tree state.
    pub fn to_html(&self) -> String {
        self.tree.borrow().to_html(&SerializeOptions::from(self.mode))
    }

    pub fn into_tree(self) -> SsrTree {
        self.tree.into_inner()
    }
}

impl HostConfig for SsrHost {
    type Node = NodeHandle;
    type HostContext = ();
    type UpdatePayload = ();

    fn root_host_context(&self, _root: NodeHandle) {}

    fn child_host_context(&self, _parent: &(), _tag: &str) {}

    fn public_instance(&self, node: NodeHandle) -> NodeHandle {
        node
    }

    fn create_instance(&self, tag: &str, _props: &Props, _context: &()) -> NodeHandle {
        self.tree.borrow_mut().create_element(tag)
    }

    fn create_text_instance(&self, text: &str, _context: &()) -> NodeHandle {
        self.tree.borrow_mut().create_text(text)
    }

    fn append_initial_child(&self, parent: NodeHandle, child: NodeHandle) -> Result<()> {
        self.tree.borrow_mut().append_child(parent, child)
    }

    fn finalize_initial_children(
        &self,
        node: NodeHandle,
        _tag: &str,
        props: &Props,
    ) -> Result<bool> {
        props::apply_props(&mut self.tree.borrow_mut(), node, props)?;
        // nothing to focus or measure on the server
        Ok(false)
    }

    fn should_set_text_content(&self, tag: &str, props: &Props) -> bool {
        props::should_set_text_content(tag, props)
    }

    fn should_deprioritize_subtree(&self, _tag: &str, _props: &Props) -> bool {
        false
    }

    /// A single server pass never re-diffs.
    fn prepare_update(
        &self,
        _node: NodeHandle,
        _tag: &str,
        _old_props: &Props,
        _new_props: &Props,
    ) -> Option<()> {
        None
    }

    /// No-op: there is no idle time to defer work into on the server.
    fn schedule_deferred_callback(&self, _callback: DeferredCallback) -> Option<CallbackId> {
        trace!("deferred callback dropped");
        None
    }

    /// No-op.
    fn cancel_deferred_callback(&self, _id: CallbackId) {}

    /// No-op: no selection or event system to pause.
    fn prepare_for_commit(&self) {}

    /// No-op.
    fn reset_after_commit(&self) {}

    /// Time stands still during a server render.
    fn now(&self) -> Duration {
        Duration::ZERO
    }

    fn use_sync_scheduling(&self) -> bool {
        true
    }

    /// No-op: props are applied once, at finalization.
    fn commit_update(
        &self,
        _node: NodeHandle,
        _payload: (),
        _tag: &str,
        _old_props: &Props,
        _new_props: &Props,
    ) {
    }

    /// No-op: `finalize_initial_children` never requests a mount hook.
    fn commit_mount(&self, _node: NodeHandle, _tag: &str, _props: &Props) {}

    fn commit_text_update(&self, node: NodeHandle, _old_text: &str, new_text: &str) -> Result<()> {
        self.tree.borrow_mut().set_text(node, new_text)
    }

    fn reset_text_content(&self, node: NodeHandle) -> Result<()> {
        self.tree.borrow_mut().set_text(node, CompactString::default())
    }

    fn append_child(&self, parent: NodeHandle, child: NodeHandle) -> Result<()> {
        self.tree.borrow_mut().append_child(parent, child)
    }

    fn append_child_to_container(&self, container: NodeHandle, child: NodeHandle) -> Result<()> {
        debug!(child = ?child, "mounting into container");
        self.tree.borrow_mut().append_child(container, child)
    }

    fn insert_before(
        &self,
        parent: NodeHandle,
        child: NodeHandle,
        before: NodeHandle,
    ) -> Result<()> {
        self.tree.borrow_mut().insert_before(parent, child, before)
    }

    fn insert_in_container_before(
        &self,
        container: NodeHandle,
        child: NodeHandle,
        before: NodeHandle,
    ) -> Result<()> {
        self.tree.borrow_mut().insert_before(container, child, before)
    }

    fn remove_child(&self, parent: NodeHandle, child: NodeHandle) -> Result<()> {
        self.tree.borrow_mut().remove_child(parent, child)
    }

    fn remove_child_from_container(&self, container: NodeHandle, child: NodeHandle) -> Result<()> {
        self.tree.borrow_mut().remove_child(container, child)
    }
}
