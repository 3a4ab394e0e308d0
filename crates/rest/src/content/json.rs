//! The `application/json` representation.

use std::io::{self, Write};

use http::StatusCode;
use serde_json::Value;

use crate::content::{ContentConsumer, ContentProducer, ContentType};
use crate::error::ApiException;
use crate::header::accept::AcceptHeader;
use crate::header::content_type::ContentTypeHeader;
use crate::request::Request;
use crate::response::Response;

/// JSON in UTF-8, on both sides of an exchange. The default representation
/// of every response with a body.
#[derive(Debug, Default)]
pub struct ApplicationJson;

impl ApplicationJson {
    pub fn new() -> ApplicationJson {
        ApplicationJson
    }
}

impl ContentType for ApplicationJson {
    fn producer_for(
        &self,
        accept: &AcceptHeader,
        accept_charset: &AcceptHeader,
        request: Option<&Request>,
        response: &Response,
    ) -> Option<Box<dyn ContentProducer>> {
        request?;
        response.body()?;
        if !accept.accepts(mime::APPLICATION_JSON.as_ref()) {
            return None;
        }
        if !accept_charset.accepts(mime::UTF_8.as_ref()) {
            return None;
        }
        Some(Box::new(JsonProducer::new()))
    }

    fn consumer_from(
        &self,
        content_type: &ContentTypeHeader,
        _request: &Request,
    ) -> Option<Box<dyn ContentConsumer>> {
        if content_type.media_type() != mime::APPLICATION_JSON.as_ref() {
            return None;
        }
        if let Some(charset) = content_type.charset() {
            if charset != mime::UTF_8.as_ref() {
                return None;
            }
        }
        Some(Box::new(JsonConsumer::new()))
    }
}

/// Serializes the body value as JSON. The body is snapshotted in `prepare`,
/// later body changes do not reach the wire.
#[derive(Debug, Default)]
pub struct JsonProducer {
    body: Option<Value>,
}

impl JsonProducer {
    pub fn new() -> JsonProducer {
        JsonProducer { body: None }
    }
}

impl ContentProducer for JsonProducer {
    fn prepare(&mut self, response: &mut Response) {
        self.body = response.body().cloned();
        response.set_header("Content-Type", &format!("{}; charset={}", mime::APPLICATION_JSON, mime::UTF_8));
    }

    fn produce(&self, out: &mut dyn Write) -> io::Result<()> {
        match &self.body {
            Some(body) => serde_json::to_writer(out, body).map_err(io::Error::other),
            None => Ok(()),
        }
    }
}

/// Parses a JSON request body.
#[derive(Debug, Default)]
pub struct JsonConsumer;

impl JsonConsumer {
    pub fn new() -> JsonConsumer {
        JsonConsumer
    }
}

impl ContentConsumer for JsonConsumer {
    fn consume(&self, body: &[u8]) -> Result<Value, ApiException> {
        serde_json::from_slice(body).map_err(|err| {
            ApiException::with_message(
                Response::error_with(StatusCode::BAD_REQUEST, "Unparseable JSON in request body."),
                format!("Unparseable JSON in request body: {err}"),
            )
        })
    }
}
