//! The identity transfer coding, i.e. no coding at all.

use std::io::{self, Write};

use crate::content::{ContentDecoder, ContentEncoder, ContentEncoding};
use crate::header::accept::AcceptHeader;
use crate::request::Request;
use crate::response::Response;

/// Passes bodies through unchanged. Offered whenever the client accepts
/// `identity`, and the decoder of choice for requests without a
/// `Content-Encoding` header.
#[derive(Debug, Default)]
pub struct IdentityEncoding;

impl IdentityEncoding {
    pub fn new() -> IdentityEncoding {
        IdentityEncoding
    }
}

impl ContentEncoding for IdentityEncoding {
    fn encoder_for(
        &self,
        accept_encoding: &AcceptHeader,
        _request: Option<&Request>,
        _response: &Response,
    ) -> Option<Box<dyn ContentEncoder>> {
        accept_encoding
            .accepts("identity")
            .then(|| Box::new(IdentityEncoder::new()) as Box<dyn ContentEncoder>)
    }

    fn decoder_for(&self, request: &Request) -> Option<Box<dyn ContentDecoder>> {
        match request.header("Content-Encoding") {
            None => Some(Box::new(IdentityDecoder::new())),
            Some(header) if header.combined().trim().eq_ignore_ascii_case("identity") => {
                Some(Box::new(IdentityDecoder::new()))
            }
            Some(_) => None,
        }
    }
}

/// Leaves the byte stream alone and makes sure no stale `Content-Encoding`
/// header goes out with it.
#[derive(Debug, Default)]
pub struct IdentityEncoder;

impl IdentityEncoder {
    pub fn new() -> IdentityEncoder {
        IdentityEncoder
    }
}

impl ContentEncoder for IdentityEncoder {
    fn prepare(&self, response: &mut Response) {
        response.headers_mut().remove("Content-Encoding");
    }

    fn encode<'a>(&self, sink: Box<dyn Write + 'a>) -> io::Result<Box<dyn Write + 'a>> {
        Ok(sink)
    }
}

#[derive(Debug, Default)]
pub struct IdentityDecoder;

impl IdentityDecoder {
    pub fn new() -> IdentityDecoder {
        IdentityDecoder
    }
}

impl ContentDecoder for IdentityDecoder {
    fn decode(&self, body: &[u8]) -> io::Result<Vec<u8>> {
        Ok(body.to_vec())
    }
}
