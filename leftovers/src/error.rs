//! Errors surfaced by tree mutations and render entry points.

use facet::Facet;

/// Errors that can occur while building or rendering a server tree.
#[derive(Facet, Debug, Clone, Copy, PartialEq, Eq)]
#[facet(derive(Error))]
#[repr(u8)]
pub enum TreeError {
    /// reference node is not a child of the given parent
    InvalidReference,

    /// node handle does not belong to this tree or was removed from it
    UnknownNode,

    /// node is not a text node
    NotATextNode,

    /// node is not an element
    NotAnElement,

    /// text nodes cannot have children
    LeafCannotHaveChildren,

    /// root nodes cannot be attached beneath another node
    RootCannotBeNested,

    /// cannot insert a node into itself or one of its descendants
    CyclicInsertion,

    /// completion signal was dropped before the render completed
    CompletionDropped,
}

/// Result alias for tree operations.
pub type Result<T, E = TreeError> = std::result::Result<T, E>;
