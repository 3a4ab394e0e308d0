//! Error types of the dispatch core.
//!
//! [`ApiException`] is not an error in the usual sense but a control flow
//! signal: it carries the [`Response`] that ends the current exchange. Filters
//! and endpoints raise it to intercept a request, the pipeline surfaces the
//! carried response to the client. The [`Error`] enum collects the conditions
//! that can occur outside of a running exchange, mostly during registration.

use thiserror::Error;

use crate::header::accept::InvalidAcceptHeader;
use crate::path::InvalidUriTemplate;
use crate::response::Response;

/// A control flow signal carrying the response that ends the exchange.
///
/// Raising an `ApiException` from a filter or endpoint short-circuits the
/// remaining pipeline phases and sends the carried response. It is debug
/// logged with its status, not reported as an error.
#[derive(Debug, Error)]
#[error("(HTTP {}) {}", .response.status().as_u16(), .message)]
pub struct ApiException {
    response: Response,
    message: String,
}

impl ApiException {
    pub fn new(response: Response) -> ApiException {
        ApiException { response, message: String::new() }
    }

    pub fn with_message(response: Response, message: impl Into<String>) -> ApiException {
        ApiException { response, message: message.into() }
    }

    /// The response to send for the exchange.
    pub fn response(&self) -> &Response {
        &self.response
    }

    pub fn into_response(self) -> Response {
        self.response
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Errors raised outside of a running exchange.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    InvalidUriTemplate(#[from] InvalidUriTemplate),

    #[error(transparent)]
    InvalidAcceptHeader(#[from] InvalidAcceptHeader),

    #[error(transparent)]
    Api(#[from] ApiException),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}
