//! Content negotiation: representations and transfer codings.
//!
//! A [`ContentType`] decides whether it can represent a response body for a
//! given `Accept`/`Accept-Charset` pair and whether it can read a request
//! body with a given `Content-Type`. A [`ContentEncoding`] does the same for
//! the `Accept-Encoding`/`Content-Encoding` axis. Both registries are walked
//! in registration order and the first offer wins, so the registration order
//! is the server's preference order.
//!
//! The split between deciding and doing is deliberate: `producer_for`
//! returns a [`ContentProducer`] primed for one specific response, and that
//! producer is the only thing the send phase talks to.

pub mod empty;
pub mod gzip;
pub mod identity;
pub mod json;
pub mod xml;
pub mod yaml;

pub use empty::EmptyContentType;
pub use gzip::GzipEncoding;
pub use identity::IdentityEncoding;
pub use json::ApplicationJson;
pub use xml::ApplicationXml;
pub use yaml::ApplicationYaml;

use std::io::{self, Write};

use serde_json::Value;

use crate::error::ApiException;
use crate::header::accept::AcceptHeader;
use crate::header::content_type::ContentTypeHeader;
use crate::request::Request;
use crate::response::Response;

/// Serializes one response body into its wire representation.
///
/// [`prepare`](ContentProducer::prepare) runs before the headers go out and
/// sets `Content-Type` (and may snapshot or drop the body);
/// [`produce`](ContentProducer::produce) then writes the body bytes.
pub trait ContentProducer: Send {
    fn prepare(&mut self, response: &mut Response);

    fn produce(&self, out: &mut dyn Write) -> io::Result<()>;
}

/// Parses request body bytes into a body value.
pub trait ContentConsumer: Send {
    fn consume(&self, body: &[u8]) -> Result<Value, ApiException>;
}

/// Applies a transfer coding to outgoing body bytes.
pub trait ContentEncoder: Send {
    /// Runs before the headers go out, typically to set `Content-Encoding`.
    fn prepare(&self, response: &mut Response);

    /// Wraps the byte sink so that everything written to the returned writer
    /// arrives encoded in `sink`. Finishing the coding happens when the
    /// returned writer is dropped or flushed.
    fn encode<'a>(&self, sink: Box<dyn Write + 'a>) -> io::Result<Box<dyn Write + 'a>>;
}

/// Reverses a transfer coding on incoming body bytes.
pub trait ContentDecoder: Send {
    fn decode(&self, body: &[u8]) -> io::Result<Vec<u8>>;
}

/// One representation the server can speak, e.g. JSON or XML.
///
/// Both sides default to "cannot", a representation implements the
/// directions it supports.
pub trait ContentType: Send + Sync {
    /// Offers a producer for the response if this representation is
    /// acceptable to the client and applicable to the response. `request` is
    /// absent when the exchange failed before a request could be built.
    fn producer_for(
        &self,
        accept: &AcceptHeader,
        accept_charset: &AcceptHeader,
        request: Option<&Request>,
        response: &Response,
    ) -> Option<Box<dyn ContentProducer>> {
        let _ = (accept, accept_charset, request, response);
        None
    }

    /// Offers a consumer for a request body of the given `Content-Type`.
    fn consumer_from(
        &self,
        content_type: &ContentTypeHeader,
        request: &Request,
    ) -> Option<Box<dyn ContentConsumer>> {
        let _ = (content_type, request);
        None
    }
}

/// One transfer coding the server can speak, e.g. identity or gzip.
pub trait ContentEncoding: Send + Sync {
    /// Offers an encoder for the response if the coding is acceptable to the
    /// client.
    fn encoder_for(
        &self,
        accept_encoding: &AcceptHeader,
        request: Option<&Request>,
        response: &Response,
    ) -> Option<Box<dyn ContentEncoder>> {
        let _ = (accept_encoding, request, response);
        None
    }

    /// Offers a decoder for the request body's `Content-Encoding`.
    fn decoder_for(&self, request: &Request) -> Option<Box<dyn ContentDecoder>> {
        let _ = request;
        None
    }
}
