//! The seam between the dispatch core and a concrete HTTP server.
//!
//! The core never talks to sockets itself. A server adapter hands in a
//! [`RawRequest`] and receives the outgoing bytes through a [`RawResponse`].
//! Anything that can answer the questions below can drive the pipeline, the
//! in-memory [`local`] pair being the smallest example.

pub mod local;

pub use local::{LocalRequest, LocalResponse};

use async_trait::async_trait;
use bytes::Bytes;

/// The inbound side of an exchange as the server adapter received it.
///
/// Values are raw wire data: the URL is unparsed, header values are still
/// RFC 2047 encoded and the path is not normalized. The core does all of
/// that itself when it builds a [`Request`](crate::request::Request).
#[async_trait]
pub trait RawRequest: Send + Sync {
    /// The HTTP method token.
    fn method(&self) -> &str;

    /// The request URL without the query part, e.g. `http://host:8080/a/b`.
    fn request_url(&self) -> &str;

    /// The raw query string, without the leading `?`.
    fn query_string(&self) -> Option<&str>;

    /// All header fields in wire order, one entry per occurrence.
    fn headers(&self) -> &[(String, String)];

    /// The path prefix under which the API is mounted, empty when it is
    /// served from the root. Requests paths are resolved relative to it.
    fn base_path(&self) -> &str;

    fn remote_host(&self) -> &str;

    fn remote_address(&self) -> &str;

    fn remote_port(&self) -> u16;

    /// Reads the whole request body. Called at most once per exchange, and
    /// only when an endpoint actually asks for the body.
    async fn read_body(&mut self) -> std::io::Result<Bytes>;
}

/// The outbound side of an exchange.
///
/// The pipeline sets the status and headers exactly once, writes the
/// produced body bytes and flushes at the end of the send phase.
#[async_trait]
pub trait RawResponse: Send {
    fn set_status(&mut self, status: u16);

    /// Adds a header field. Values arrive RFC 2047 encoded where needed.
    fn add_header(&mut self, name: &str, value: &str);

    async fn write_body(&mut self, body: &[u8]) -> std::io::Result<()>;

    async fn flush(&mut self) -> std::io::Result<()>;
}
