//! Server-side markup renderer.
//!
//! leftovers turns a component tree into the exact HTML a client-side renderer
//! expects to hydrate, without a browser DOM:
//! - **Tree**: arena-backed node structure a driver populates through primitive operations
//! - **Attribute projection**: `className`, inline styles, text children, event handlers dropped
//! - **Serialization**: void elements, escaping, root marker, text separators
//! - **Host adapter**: the full `HostConfig` callback table a reconciler calls into
//! - **Entry points**: sync and async, hydratable and static
//!
//! The component model itself lives outside this crate, behind [`Driver`].
//!
//! # Example
//!
//! ```rust
//! use leftovers::{Driver, HostConfig, Completion, Props, PropValue, render_to_string};
//!
//! struct Greeting;
//!
//! impl Driver for Greeting {
//!     type Element = &'static str;
//!
//!     fn update_container<H: HostConfig>(
//!         &mut self,
//!         host: &H,
//!         container: H::Node,
//!         name: &'static str,
//!         _completion: Option<Completion>,
//!     ) -> leftovers::Result<()> {
//!         let ctx = host.root_host_context(container);
//!         let props: Props = [("children".to_owned(), PropValue::from(name))]
//!             .into_iter()
//!             .collect();
//!         let h1 = host.create_instance("h1", &props, &ctx);
//!         host.finalize_initial_children(h1, "h1", &props)?;
//!         host.append_child_to_container(container, h1)
//!     }
//! }
//!
//! let html = render_to_string(&mut Greeting, "hello").unwrap();
//! assert_eq!(html, r#"<h1 data-reactroot="">hello</h1>"#);
//! ```

mod tracing_macros;
pub(crate) use tracing_macros::{debug, trace};

mod error;
mod escape;
pub mod host;
pub mod props;
mod render;
pub mod serialize;
pub mod style;
pub mod tree;

pub use error::{Result, TreeError};
pub use escape::escape_html;

// Re-export the tree model at crate root for convenience
pub use tree::{Attr, ElementData, NodeHandle, NodeKind, RootKind, SsrTree};

pub use props::{EventHandler, PropValue, Props, apply_props};
pub use style::{StyleMap, StyleValue};

pub use serialize::{MarkupMode, SerializeOptions, serialize};

pub use host::{CallbackId, DeferredCallback, HostConfig, SsrHost};

pub use render::{
    Completion, Driver, PendingRender, render_to_static_markup, render_to_static_markup_async,
    render_to_string, render_to_string_async,
};
