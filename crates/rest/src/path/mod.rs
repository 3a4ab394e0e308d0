//! URI path handling: segment normalization, URI templates and the routing
//! tree that maps request paths to endpoints.

use thiserror::Error;

pub mod matcher;
pub mod parameter;
pub mod router;
pub mod segment;

pub use matcher::SegmentMatcher;
pub use parameter::PathParameter;
pub use router::PathRouter;
pub use segment::{Scanner, Segment};

/// An URI template that cannot be parsed, for example an unclosed or
/// misnamed path variable.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct InvalidUriTemplate {
    message: String,
}

impl InvalidUriTemplate {
    pub(crate) fn new(message: impl Into<String>) -> InvalidUriTemplate {
        InvalidUriTemplate { message: message.into() }
    }
}

/// A path segment that does not match the segment template it was tried
/// against.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct UriTemplateMismatch {
    message: String,
}

impl UriTemplateMismatch {
    pub(crate) fn new(message: impl Into<String>) -> UriTemplateMismatch {
        UriTemplateMismatch { message: message.into() }
    }
}
