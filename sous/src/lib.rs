//! A small component model on top of leftovers.
//!
//! sous provides:
//! - **Nodes**: elements, text, fragments and components ([`Node`], [`Element`], [`Component`])
//! - **Reconciler**: a mount-only [`leftovers::Driver`] that calls the host config in the
//!   usual order
//! - **Templates**: HTML fragments parsed with html5ever, mounted like any other node
//!
//! # Example
//!
//! ```rust
//! use sous::{Component, Element, Node};
//!
//! let app = Component::new("App", |_scope| {
//!     Element::new("main")
//!         .class_name("app")
//!         .child(Element::new("h1").text("Hello"))
//!         .into()
//! });
//!
//! let html = sous::render_to_string(app.into()).unwrap();
//! assert_eq!(html, r#"<main class="app" data-reactroot=""><h1>Hello</h1></main>"#);
//!
//! let html = sous::render_to_static_markup(Node::from("plain")).unwrap();
//! assert_eq!(html, "plain");
//! ```
//!
//! Asynchronous renders finish when a component fires the completion from its
//! [`Scope`]:
//!
//! ```rust
//! use sous::{Component, Element};
//!
//! let loader = Component::new("Loader", |scope| {
//!     scope.complete_after_mount();
//!     Element::new("div").text("loaded").into()
//! });
//!
//! let pending = sous::render_to_static_markup_async(loader.into()).unwrap();
//! let html = futures::executor::block_on(pending).unwrap();
//! assert_eq!(html, "<div>loaded</div>");
//! ```

#[cfg(feature = "tracing")]
pub(crate) use tracing::debug;

#[cfg(not(feature = "tracing"))]
macro_rules! debug {
    ($($tt:tt)*) => {};
}
#[cfg(not(feature = "tracing"))]
pub(crate) use debug;

mod node;
mod reconciler;
pub mod template;

pub use node::{CHILDREN, Component, Element, Node, Scope};
pub use reconciler::Reconciler;

pub use leftovers::{PendingRender, Result, TreeError};

/// Render `node` to hydratable markup with a fresh [`Reconciler`].
pub fn render_to_string(node: Node) -> Result<String> {
    leftovers::render_to_string(&mut Reconciler::new(), node)
}

/// Render `node` to static markup with a fresh [`Reconciler`].
pub fn render_to_static_markup(node: Node) -> Result<String> {
    leftovers::render_to_static_markup(&mut Reconciler::new(), node)
}

/// Render `node` to hydratable markup once a component fires the completion.
pub fn render_to_string_async(node: Node) -> Result<PendingRender> {
    leftovers::render_to_string_async(&mut Reconciler::new(), node)
}

/// Render `node` to static markup once a component fires the completion.
pub fn render_to_static_markup_async(node: Node) -> Result<PendingRender> {
    leftovers::render_to_static_markup_async(&mut Reconciler::new(), node)
}
