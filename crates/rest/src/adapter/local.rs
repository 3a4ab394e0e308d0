//! An in-memory adapter pair for tests, examples and embedding.

use async_trait::async_trait;
use bytes::Bytes;

use crate::adapter::{RawRequest, RawResponse};

/// A [`RawRequest`] built in memory. The builder-style setters cover the
/// parts an exchange needs; everything else has a plain default.
#[derive(Debug, Clone)]
pub struct LocalRequest {
    method: String,
    url: String,
    query: Option<String>,
    headers: Vec<(String, String)>,
    base_path: String,
    remote_host: String,
    remote_address: String,
    remote_port: u16,
    body: Bytes,
}

impl LocalRequest {
    pub fn new(method: &str, url: &str) -> LocalRequest {
        LocalRequest {
            method: method.to_owned(),
            url: url.to_owned(),
            query: None,
            headers: Vec::new(),
            base_path: String::new(),
            remote_host: "localhost".to_owned(),
            remote_address: "127.0.0.1".to_owned(),
            remote_port: 0,
            body: Bytes::new(),
        }
    }

    pub fn query(mut self, query: &str) -> LocalRequest {
        self.query = Some(query.to_owned());
        self
    }

    /// Adds one header field. Call repeatedly for repeated fields.
    pub fn header(mut self, name: &str, value: &str) -> LocalRequest {
        self.headers.push((name.to_owned(), value.to_owned()));
        self
    }

    pub fn base(mut self, base_path: &str) -> LocalRequest {
        self.base_path = base_path.to_owned();
        self
    }

    pub fn remote(mut self, host: &str, address: &str, port: u16) -> LocalRequest {
        self.remote_host = host.to_owned();
        self.remote_address = address.to_owned();
        self.remote_port = port;
        self
    }

    /// Sets the request body. Pair it with `Content-Type` and
    /// `Content-Length` headers for the ingestion path to pick it up.
    pub fn body(mut self, body: impl Into<Bytes>) -> LocalRequest {
        self.body = body.into();
        self
    }
}

#[async_trait]
impl RawRequest for LocalRequest {
    fn method(&self) -> &str {
        &self.method
    }

    fn request_url(&self) -> &str {
        &self.url
    }

    fn query_string(&self) -> Option<&str> {
        self.query.as_deref()
    }

    fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    fn base_path(&self) -> &str {
        &self.base_path
    }

    fn remote_host(&self) -> &str {
        &self.remote_host
    }

    fn remote_address(&self) -> &str {
        &self.remote_address
    }

    fn remote_port(&self) -> u16 {
        self.remote_port
    }

    async fn read_body(&mut self) -> std::io::Result<Bytes> {
        Ok(std::mem::take(&mut self.body))
    }
}

/// A [`RawResponse`] collecting everything in memory.
#[derive(Debug, Default)]
pub struct LocalResponse {
    status: u16,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
    flushed: bool,
}

impl LocalResponse {
    pub fn new() -> LocalResponse {
        LocalResponse::default()
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    /// All header fields in the order they were added.
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// The first value of the named header, matched case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(header, _)| header.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn body_string(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn flushed(&self) -> bool {
        self.flushed
    }
}

#[async_trait]
impl RawResponse for LocalResponse {
    fn set_status(&mut self, status: u16) {
        self.status = status;
    }

    fn add_header(&mut self, name: &str, value: &str) {
        self.headers.push((name.to_owned(), value.to_owned()));
    }

    async fn write_body(&mut self, body: &[u8]) -> std::io::Result<()> {
        self.body.extend_from_slice(body);
        Ok(())
    }

    async fn flush(&mut self) -> std::io::Result<()> {
        self.flushed = true;
        Ok(())
    }
}
