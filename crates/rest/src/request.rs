//! The incoming side of an exchange.
//!
//! A [`Request`] is built from the raw wire data during the prepare phase:
//! the URL is parsed, the path is normalized and resolved against the base
//! path, header
//! values are RFC 2047 decoded and the query string is split into pairs.
//! The body stays on the wire until an endpoint asks for it through
//! [`body_as`](Request::body_as), which runs the whole ingestion ladder of
//! length check, media type negotiation and transfer decoding.

use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use http::{Method, StatusCode, Uri};
use serde::de::DeserializeOwned;

use crate::adapter::RawRequest;
use crate::content::{ContentEncoding, ContentType};
use crate::error::ApiException;
use crate::header::content_type::ContentTypeHeader;
use crate::header::{Header, Headers};
use crate::path::parameter::PathParameter;
use crate::path::segment::Segment;
use crate::query::Query;
use crate::response::Response;
use crate::utils::strings::uniqid;

/// An HTTP request travelling through the pipeline.
pub struct Request {
    request_id: String,
    method: Method,
    path: String,
    request_uri: Uri,
    base_uri: Uri,
    parameters: Vec<PathParameter>,
    queries: Vec<Query>,
    headers: Headers,
    remote_host: String,
    remote_address: String,
    remote_port: u16,
    raw: Option<Box<dyn RawRequest>>,
    body_cache: Option<Bytes>,
    content_types: Vec<Arc<dyn ContentType>>,
    content_encodings: Vec<Arc<dyn ContentEncoding>>,
}

impl Request {
    /// Builds a request from the raw inbound data.
    ///
    /// Fails with a 400 response for an unusable method token or header
    /// values carrying control bytes, and with a 500 response when the
    /// server adapter hands in an URL that does not parse.
    pub(crate) fn from_raw(
        mut raw: Box<dyn RawRequest>,
        content_types: &[Arc<dyn ContentType>],
        content_encodings: &[Arc<dyn ContentEncoding>],
    ) -> Result<Request, ApiException> {
        let method = Method::from_bytes(raw.method().as_bytes()).map_err(|_| {
            ApiException::with_message(
                Response::error_with(
                    StatusCode::BAD_REQUEST,
                    format!("Unsupported HTTP method: {}", raw.method()),
                ),
                format!("Unsupported HTTP method: {}", raw.method()),
            )
        })?;
        let request_uri: Uri = raw.request_url().parse().map_err(|_| {
            ApiException::with_message(
                Response::internal_server_error(),
                format!("Unable to parse request URL: {}", raw.request_url()),
            )
        })?;

        let mut headers = Headers::new();
        for (name, value) in raw.headers() {
            if value.bytes().any(|b| (b < 0x20 && b != b'\t') || b == 0x7f) {
                return Err(ApiException::with_message(
                    Response::error_with(
                        StatusCode::BAD_REQUEST,
                        format!("Illegal character in header value: {name}"),
                    ),
                    format!("Illegal character in header value: {name}"),
                ));
            }
            headers.decode(name, value);
        }

        let base_path = raw.base_path().trim_end_matches('/').to_owned();
        let path = Segment::normalize_path(&strip_base(request_uri.path(), &base_path));
        let base_uri = build_base_uri(&request_uri, &base_path).ok_or_else(|| {
            ApiException::with_message(
                Response::internal_server_error(),
                format!("Unable to derive base URI from: {}", raw.request_url()),
            )
        })?;

        let queries = raw
            .query_string()
            .map(Query::parse_query_string)
            .unwrap_or_default();

        let (remote_host, remote_address, remote_port) = (
            raw.remote_host().to_owned(),
            raw.remote_address().to_owned(),
            raw.remote_port(),
        );
        Ok(Request {
            request_id: uniqid(),
            method,
            path,
            request_uri,
            base_uri,
            parameters: Vec::new(),
            queries,
            headers,
            remote_host,
            remote_address,
            remote_port,
            raw: Some(raw),
            body_cache: None,
            content_types: content_types.to_vec(),
            content_encodings: content_encodings.to_vec(),
        })
    }

    /// Builds a bare request without a wire connection behind it, for tests
    /// and for filters that assemble requests themselves.
    pub fn fabricate(method: Method, path: &str) -> Request {
        let request_uri = path.parse().unwrap_or_else(|_| Uri::from_static("/"));
        Request {
            request_id: uniqid(),
            method,
            path: path.to_owned(),
            request_uri,
            base_uri: Uri::from_static("/"),
            parameters: Vec::new(),
            queries: Vec::new(),
            headers: Headers::new(),
            remote_host: "localhost".to_owned(),
            remote_address: "127.0.0.1".to_owned(),
            remote_port: 0,
            raw: None,
            body_cache: None,
            content_types: Vec::new(),
            content_encodings: Vec::new(),
        }
    }

    pub(crate) fn attach_raw(&mut self, raw: Box<dyn RawRequest>) {
        self.raw = Some(raw);
    }

    pub(crate) fn set_negotiators(
        &mut self,
        content_types: &[Arc<dyn ContentType>],
        content_encodings: &[Arc<dyn ContentEncoding>],
    ) {
        self.content_types = content_types.to_vec();
        self.content_encodings = content_encodings.to_vec();
    }

    /// An opaque id unique to this exchange, for log correlation.
    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn set_method(&mut self, method: Method) {
        self.method = method;
    }

    /// The request path relative to the base path, as received.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn set_path(&mut self, path: &str) {
        self.path = path.to_owned();
    }

    /// The full request URI as received from the server adapter.
    pub fn request_uri(&self) -> &Uri {
        &self.request_uri
    }

    /// Scheme, authority and base path of the API mount point.
    pub fn base_uri(&self) -> &Uri {
        &self.base_uri
    }

    /// All captured path parameters in capture order.
    pub fn parameters(&self) -> &[PathParameter] {
        &self.parameters
    }

    pub(crate) fn parameters_mut(&mut self) -> &mut Vec<PathParameter> {
        &mut self.parameters
    }

    /// The first path parameter of the given name. Missing parameters are
    /// rejected with a 400 response.
    pub fn param(&self, name: &str) -> Result<&PathParameter, ApiException> {
        self.parameters.iter().find(|param| param.name() == name).ok_or_else(|| {
            ApiException::with_message(
                Response::error_with(
                    StatusCode::BAD_REQUEST,
                    format!("Missing value for path parameter '{name}'."),
                ),
                format!("Missing value for path parameter '{name}'."),
            )
        })
    }

    /// All path parameters of the given name, in capture order.
    pub fn params(&self, name: &str) -> Vec<&PathParameter> {
        self.parameters.iter().filter(|param| param.name() == name).collect()
    }

    pub fn queries(&self) -> &[Query] {
        &self.queries
    }

    /// The first query pair with the given key.
    pub fn query(&self, key: &str) -> Option<&Query> {
        self.queries.iter().find(|query| query.key() == key)
    }

    pub fn add_query(&mut self, query: Query) {
        self.queries.push(query);
    }

    /// Removes all query pairs with the given key.
    pub fn remove_query(&mut self, key: &str) {
        self.queries.retain(|query| query.key() != key);
    }

    /// The query pairs joined back into a query string.
    pub fn query_string(&self) -> Option<String> {
        if self.queries.is_empty() {
            return None;
        }
        let pairs: Vec<String> = self.queries.iter().map(Query::to_string).collect();
        Some(pairs.join("&"))
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut Headers {
        &mut self.headers
    }

    pub fn header(&self, name: &str) -> Option<&Header> {
        self.headers.get(name)
    }

    pub fn add_header(&mut self, name: &str, value: &str) {
        self.headers.add(name, value);
    }

    /// The parsed `Content-Type` header, if present and well-formed.
    pub fn content_type(&self) -> Option<ContentTypeHeader> {
        let header = self.headers.get("Content-Type")?;
        ContentTypeHeader::parse(&header.combined()).ok()
    }

    pub fn remote_host(&self) -> &str {
        &self.remote_host
    }

    pub fn remote_address(&self) -> &str {
        &self.remote_address
    }

    pub fn remote_port(&self) -> u16 {
        self.remote_port
    }

    /// Reads the raw body bytes from the wire, at most once. Repeated calls
    /// return the cached bytes.
    pub async fn read_body(&mut self) -> Result<Bytes, ApiException> {
        if let Some(body) = &self.body_cache {
            return Ok(body.clone());
        }
        let body = match &mut self.raw {
            Some(raw) => raw.read_body().await.map_err(|err| {
                ApiException::with_message(
                    Response::internal_server_error(),
                    format!("Unable to read request body: {err}"),
                )
            })?,
            None => Bytes::new(),
        };
        self.body_cache = Some(body.clone());
        Ok(body)
    }

    /// Reads and deserializes the request body.
    ///
    /// The ingestion ladder rejects requests without a `Content-Length`
    /// header (411), with an unreadable or negative length (400), without a
    /// usable `Content-Type` or without a matching consumer (415), and with
    /// a transfer coding no decoder handles (422). A declared length of zero
    /// reads as `Ok(None)`. Parse failures of the body itself map to 400.
    pub async fn body_as<T: DeserializeOwned>(&mut self) -> Result<Option<T>, ApiException> {
        let Some(length) = self.header("Content-Length") else {
            return Err(ladder_error(
                StatusCode::LENGTH_REQUIRED,
                "A Content-Length header is mandatory for requests with a request body.",
            ));
        };
        let length: i64 = length.as_string().trim().parse().map_err(|_| {
            ladder_error(StatusCode::BAD_REQUEST, "Unparseable number in Content-Length header.")
        })?;
        if length < 0 {
            return Err(ladder_error(
                StatusCode::BAD_REQUEST,
                "Unparseable number in Content-Length header.",
            ));
        }
        if length == 0 {
            return Ok(None);
        }

        let Some(content_type) = self.content_type() else {
            return Err(ladder_error(
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                "Requests with a request body need a usable Content-Type header.",
            ));
        };
        let consumer = self
            .content_types
            .iter()
            .find_map(|candidate| candidate.consumer_from(&content_type, self));
        let Some(consumer) = consumer else {
            return Err(ladder_error(
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                format!("Unsupported media type: {}", content_type.normalized()),
            ));
        };
        let decoder = self
            .content_encodings
            .iter()
            .find_map(|candidate| candidate.decoder_for(self));
        let Some(decoder) = decoder else {
            return Err(ladder_error(
                StatusCode::UNPROCESSABLE_ENTITY,
                "Unsupported content encoding in request body.",
            ));
        };

        let body = self.read_body().await?;
        let decoded = decoder.decode(&body).map_err(|err| {
            ApiException::with_message(
                Response::error_with(
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "Unable to decode request body.",
                ),
                format!("Unable to decode request body: {err}"),
            )
        })?;
        let value = consumer.consume(&decoded)?;
        match serde_json::from_value(value) {
            Ok(body) => Ok(Some(body)),
            Err(err) => Err(ApiException::with_message(
                Response::error_with(StatusCode::BAD_REQUEST, "Unable to read request body."),
                format!("Unable to read request body: {err}"),
            )),
        }
    }
}

fn ladder_error(status: StatusCode, reason: impl Into<String>) -> ApiException {
    let reason = reason.into();
    ApiException::with_message(Response::error_with(status, reason.clone()), reason)
}

/// Strips the base path prefix. The result keeps its leading separator, an
/// exhausted path reads as the root path, and a path outside the base path
/// is left alone.
fn strip_base(path: &str, base_path: &str) -> String {
    if base_path.is_empty() {
        return if path.is_empty() { "/".to_owned() } else { path.to_owned() };
    }
    match path.strip_prefix(base_path) {
        Some("") => "/".to_owned(),
        Some(stripped) if stripped.starts_with('/') => stripped.to_owned(),
        _ => path.to_owned(),
    }
}

fn build_base_uri(request_uri: &Uri, base_path: &str) -> Option<Uri> {
    let mut builder = Uri::builder();
    if let Some(scheme) = request_uri.scheme() {
        builder = builder.scheme(scheme.clone());
    }
    if let Some(authority) = request_uri.authority() {
        builder = builder.authority(authority.clone());
    }
    let base = if base_path.is_empty() { "/" } else { base_path };
    builder.path_and_query(base).build().ok()
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.path)?;
        if let Some(query) = self.query_string() {
            write!(f, "?{query}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Request")
            .field("request_id", &self.request_id)
            .field("method", &self.method)
            .field("path", &self.path)
            .field("queries", &self.queries)
            .field("parameters", &self.parameters)
            .finish_non_exhaustive()
    }
}
