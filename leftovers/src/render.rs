//! Render entry points.
//!
//! Each call builds a fresh [`SsrHost`], hands it to a [`Driver`] and returns
//! the serialized tree. The synchronous variants are done as soon as the driver
//! returns. The asynchronous variants give the driver a [`Completion`] that
//! any component may fire once its data has arrived; the markup is whatever the
//! tree looks like at that moment.

use std::cell::RefCell;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll};

use futures_channel::oneshot;

use crate::error::{Result, TreeError};
use crate::host::{HostConfig, SsrHost};
use crate::serialize::MarkupMode;
use crate::{debug, trace};

/// Something that turns an element description into [`HostConfig`] calls.
///
/// Implemented by a component reconciler. The core never sees the element
/// type; it only provides the host and collects the result.
pub trait Driver {
    /// Top-level thing the caller asks to render.
    type Element;

    /// Mount `element` into `container`.
    ///
    /// For asynchronous renders `completion` is `Some`, and the driver must make
    /// it reachable from the components it mounts.
    fn update_container<H: HostConfig>(
        &mut self,
        host: &H,
        container: H::Node,
        element: Self::Element,
        completion: Option<Completion>,
    ) -> Result<()>;
}

struct CompletionInner {
    host: Rc<SsrHost>,
    sender: RefCell<Option<oneshot::Sender<String>>>,
}

/// One-shot signal that an asynchronous render is finished.
///
/// Cheap to clone; all clones share the same state. The first call to
/// [`complete`](Self::complete) serializes the tree and resolves the
/// [`PendingRender`]; later calls do nothing.
#[derive(Clone)]
pub struct Completion {
    inner: Rc<CompletionInner>,
}

impl Completion {
    fn new(host: Rc<SsrHost>, sender: oneshot::Sender<String>) -> Self {
        Self {
            inner: Rc::new(CompletionInner {
                host,
                sender: RefCell::new(Some(sender)),
            }),
        }
    }

    /// Serialize the tree as it is now and hand the markup to the caller.
    pub fn complete(&self) {
        let Some(sender) = self.inner.sender.borrow_mut().take() else {
            trace!("completion already fired");
            return;
        };
        let html = self.inner.host.to_html();
        debug!(len = html.len(), "render complete");
        // receiver gone means nobody is waiting; nothing to do
        let _ = sender.send(html);
    }

    pub fn is_complete(&self) -> bool {
        self.inner.sender.borrow().is_none()
    }
}

impl fmt::Debug for Completion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Completion")
            .field("mode", &self.inner.host.mode())
            .field("complete", &self.is_complete())
            .finish()
    }
}

/// Markup of an asynchronous render, available once its [`Completion`] fires.
///
/// Resolves to [`TreeError::CompletionDropped`] if every clone of the
/// completion is dropped without firing. A completion that is kept alive but
/// never fired leaves this future pending forever.
#[must_use = "futures do nothing unless polled"]
#[derive(Debug)]
pub struct PendingRender {
    receiver: oneshot::Receiver<String>,
}

impl Future for PendingRender {
    type Output = Result<String>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.receiver)
            .poll(cx)
            .map(|res| res.map_err(|_| TreeError::CompletionDropped))
    }
}

/// Render to hydratable markup: top-level elements carry the root marker and
/// adjacent text nodes are separated.
pub fn render_to_string<D: Driver>(driver: &mut D, element: D::Element) -> Result<String> {
    render_sync(driver, element, MarkupMode::Hydratable)
}

/// Render to plain markup with no hydration artifacts.
pub fn render_to_static_markup<D: Driver>(driver: &mut D, element: D::Element) -> Result<String> {
    render_sync(driver, element, MarkupMode::Static)
}

/// Like [`render_to_string`], but finishes when the driver fires its [`Completion`].
pub fn render_to_string_async<D: Driver>(
    driver: &mut D,
    element: D::Element,
) -> Result<PendingRender> {
    render_async(driver, element, MarkupMode::Hydratable)
}

/// Like [`render_to_static_markup`], but finishes when the driver fires its [`Completion`].
pub fn render_to_static_markup_async<D: Driver>(
    driver: &mut D,
    element: D::Element,
) -> Result<PendingRender> {
    render_async(driver, element, MarkupMode::Static)
}

fn render_sync<D: Driver>(driver: &mut D, element: D::Element, mode: MarkupMode) -> Result<String> {
    debug!(?mode, "render");
    let host = SsrHost::with_mode(mode);
    driver.update_container(&host, host.container(), element, None)?;
    Ok(host.to_html())
}

fn render_async<D: Driver>(
    driver: &mut D,
    element: D::Element,
    mode: MarkupMode,
) -> Result<PendingRender> {
    debug!(?mode, "render (async)");
    let host = Rc::new(SsrHost::with_mode(mode));
    let (sender, receiver) = oneshot::channel();
    let completion = Completion::new(Rc::clone(&host), sender);
    driver.update_container(&*host, host.container(), element, Some(completion))?;
    Ok(PendingRender { receiver })
}
