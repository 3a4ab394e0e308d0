//! The representation of bodyless responses.

use std::io::{self, Write};

use crate::content::{ContentProducer, ContentType};
use crate::header::accept::AcceptHeader;
use crate::request::Request;
use crate::response::Response;

/// Claims every response without a body, regardless of what the client
/// accepts. Registered first so that bodyless responses never enter media
/// type negotiation.
#[derive(Debug, Default)]
pub struct EmptyContentType;

impl EmptyContentType {
    pub fn new() -> EmptyContentType {
        EmptyContentType
    }
}

impl ContentType for EmptyContentType {
    fn producer_for(
        &self,
        _accept: &AcceptHeader,
        _accept_charset: &AcceptHeader,
        _request: Option<&Request>,
        response: &Response,
    ) -> Option<Box<dyn ContentProducer>> {
        response.body().is_none().then(|| {
            Box::new(EmptyProducer::new()) as Box<dyn ContentProducer>
        })
    }
}

/// Produces no bytes at all. Doubles as the last resort when negotiation
/// fails and an error response has to go out without a negotiated
/// representation.
#[derive(Debug, Default)]
pub struct EmptyProducer;

impl EmptyProducer {
    pub fn new() -> EmptyProducer {
        EmptyProducer
    }
}

impl ContentProducer for EmptyProducer {
    fn prepare(&mut self, response: &mut Response) {
        response.headers_mut().remove("Content-Type");
        response.remove_body();
    }

    fn produce(&self, _out: &mut dyn Write) -> io::Result<()> {
        Ok(())
    }
}
