//! The gzip transfer coding for request bodies.

use std::io::{self, Read};

use flate2::read::MultiGzDecoder;

use crate::content::{ContentDecoder, ContentEncoding};
use crate::request::Request;

/// Decodes gzip compressed request bodies. Outbound gzip is not offered,
/// responses go out with whatever coding the identity side negotiated.
#[derive(Debug, Default)]
pub struct GzipEncoding;

impl GzipEncoding {
    pub fn new() -> GzipEncoding {
        GzipEncoding
    }
}

impl ContentEncoding for GzipEncoding {
    fn decoder_for(&self, request: &Request) -> Option<Box<dyn ContentDecoder>> {
        let header = request.header("Content-Encoding")?;
        header
            .combined()
            .trim()
            .eq_ignore_ascii_case("gzip")
            .then(|| Box::new(GzipDecoder::new()) as Box<dyn ContentDecoder>)
    }
}

/// Inflates a gzip body, including multi-member streams.
#[derive(Debug, Default)]
pub struct GzipDecoder;

impl GzipDecoder {
    pub fn new() -> GzipDecoder {
        GzipDecoder
    }
}

impl ContentDecoder for GzipDecoder {
    fn decode(&self, body: &[u8]) -> io::Result<Vec<u8>> {
        let mut decoded = Vec::new();
        MultiGzDecoder::new(body).read_to_end(&mut decoded)?;
        Ok(decoded)
    }
}
