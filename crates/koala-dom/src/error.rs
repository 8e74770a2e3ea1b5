//! Structural errors raised by tree operations.
//!
//! [§ 2.5 Exceptions](https://webidl.spec.whatwg.org/#idl-DOMException-error-names)

use koala_common::string::CapacityError;
use thiserror::Error;

use crate::NodeId;

/// Failure of a [`DomTree`](crate::DomTree) operation.
///
/// The first three variants mirror the `DOMException` names the DOM Standard
/// throws; the tree is left unchanged whenever one is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomError {
    /// "HierarchyRequestError: The operation would yield an incorrect node
    /// tree."
    #[error("HierarchyRequestError: {0}")]
    HierarchyRequest(&'static str),

    /// "NotFoundError: The object can not be found here."
    #[error("NotFoundError: {0}")]
    NotFound(&'static str),

    /// "NotSupportedError: The operation is not supported."
    #[error("NotSupportedError: {0}")]
    NotSupported(&'static str),

    /// The id refers to a slot that has been destroyed (or never existed).
    #[error("node {0} no longer exists")]
    StaleNode(NodeId),

    /// Character data could not grow.
    #[error(transparent)]
    Capacity(#[from] CapacityError),
}
