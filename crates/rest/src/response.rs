//! The outgoing side of an exchange.
//!
//! A [`Response`] carries an HTTP status, headers and an optional body. The
//! body is kept as a [`serde_json::Value`] until the send phase, where the
//! negotiated content producer serializes it into the wire representation.
//! The content length is only known after that has happened.

use http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::header::{Header, Headers};

/// The canonical error body `{code, reason}` carried by error responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ApiError {
    code: u16,
    reason: String,
}

impl ApiError {
    pub fn new(code: u16, reason: impl Into<String>) -> ApiError {
        ApiError { code, reason: reason.into() }
    }

    pub fn code(&self) -> u16 {
        self.code
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    pub fn to_value(&self) -> Value {
        serde_json::json!({ "code": self.code, "reason": self.reason })
    }
}

/// An HTTP response on its way to the client.
///
/// Responses are created by endpoints, filters or the pipeline's error path
/// and stay mutable until the send phase starts.
#[derive(Debug, Clone)]
pub struct Response {
    status: StatusCode,
    headers: Headers,
    body: Option<Value>,
    content_length: Option<u64>,
}

impl Response {
    pub fn new(status: StatusCode) -> Response {
        Response { status, headers: Headers::new(), body: None, content_length: None }
    }

    /// Creates a response with a body. A body that still carries an
    /// [`ApiError`] while the status signals success is rewrapped into a
    /// fresh error tagged with this status, so stale error bodies cannot
    /// masquerade as payload.
    pub fn with_body(status: StatusCode, body: impl Into<Value>) -> Response {
        let mut body = body.into();
        if status.as_u16() < 400 && status.as_u16() >= 200 {
            if let Ok(error) = serde_json::from_value::<ApiError>(body.clone()) {
                body = ApiError::new(status.as_u16(), error.to_value().to_string()).to_value();
            }
        }
        Response { status, headers: Headers::new(), body: Some(body), content_length: None }
    }

    fn error(status: StatusCode) -> Response {
        let reason = status.canonical_reason().unwrap_or("");
        Response::with_body(status, ApiError::new(status.as_u16(), reason).to_value())
    }

    pub fn ok() -> Response {
        Response::new(StatusCode::OK)
    }

    pub fn no_content() -> Response {
        Response::new(StatusCode::NO_CONTENT)
    }

    pub fn bad_request() -> Response {
        Response::error(StatusCode::BAD_REQUEST)
    }

    pub fn not_found() -> Response {
        Response::error(StatusCode::NOT_FOUND)
    }

    pub fn method_not_allowed() -> Response {
        Response::error(StatusCode::METHOD_NOT_ALLOWED)
    }

    pub fn not_acceptable() -> Response {
        Response::error(StatusCode::NOT_ACCEPTABLE)
    }

    pub fn length_required() -> Response {
        Response::error(StatusCode::LENGTH_REQUIRED)
    }

    pub fn unsupported_media_type() -> Response {
        Response::error(StatusCode::UNSUPPORTED_MEDIA_TYPE)
    }

    pub fn unprocessable_entity() -> Response {
        Response::error(StatusCode::UNPROCESSABLE_ENTITY)
    }

    pub fn internal_server_error() -> Response {
        Response::error(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// An error response with the canonical body but a custom reason text.
    pub fn error_with(status: StatusCode, reason: impl Into<String>) -> Response {
        Response::with_body(status, ApiError::new(status.as_u16(), reason).to_value())
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn set_status(&mut self, status: StatusCode) {
        self.status = status;
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

    /// Appends a value to the named header.
    pub fn add_header(&mut self, name: &str, value: &str) {
        self.headers.add(name, value);
    }

    /// Replaces the named header.
    pub fn set_header(&mut self, name: &str, value: &str) {
        self.headers.set(name, value);
    }

    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    pub fn set_body(&mut self, body: impl Into<Value>) {
        self.body = Some(body.into());
    }

    pub fn remove_body(&mut self) {
        self.body = None;
    }

    /// The number of body bytes produced for this response. Unknown (`None`)
    /// until the response has been sent.
    pub fn content_length(&self) -> Option<u64> {
        self.content_length
    }

    pub(crate) fn set_content_length(&mut self, content_length: u64) {
        self.content_length = Some(content_length);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_body() {
        let response = Response::new(StatusCode::OK);
        assert!(response.body().is_none());
        assert_eq!(StatusCode::OK, response.status());
    }

    #[test]
    fn body_present() {
        let response = Response::with_body(StatusCode::OK, json!({"name": "Hase", "email": "hase@example.com"}));
        assert!(response.body().is_some());
    }

    #[test]
    fn api_error_body_is_rewrapped_at_success_statuses() {
        let stale = ApiError::new(404, "Not Found").to_value();
        let response = Response::with_body(StatusCode::OK, stale.clone());
        let body = response.body().unwrap();
        let rewrapped: ApiError = serde_json::from_value(body.clone()).unwrap();
        assert_eq!(200, rewrapped.code());
        assert_eq!(stale.to_string(), rewrapped.reason());
    }

    #[test]
    fn api_error_body_is_kept_at_error_statuses() {
        let error = ApiError::new(404, "Not Found").to_value();
        let response = Response::with_body(StatusCode::NOT_FOUND, error.clone());
        assert_eq!(Some(&error), response.body());
    }

    #[test]
    fn ordinary_bodies_are_kept() {
        let response = Response::with_body(StatusCode::OK, "hello");
        assert_eq!(Some(&Value::String("hello".into())), response.body());
    }

    #[test]
    fn canonical_errors_carry_code_and_reason() {
        let response = Response::not_found();
        assert_eq!(StatusCode::NOT_FOUND, response.status());
        let error: ApiError = serde_json::from_value(response.body().unwrap().clone()).unwrap();
        assert_eq!(404, error.code());
        assert_eq!("Not Found", error.reason());
    }

    #[test]
    fn bare_constructors_have_no_body() {
        assert!(Response::ok().body().is_none());
        assert!(Response::no_content().body().is_none());
    }

    #[test]
    fn content_length_unknown_before_send() {
        let mut response = Response::ok();
        assert_eq!(None, response.content_length());
        response.set_content_length(42);
        assert_eq!(Some(42), response.content_length());
    }

    #[test]
    fn headers_accumulate_values() {
        let mut response = Response::ok();
        response.add_header("Vary", "Accept");
        response.add_header("Vary", "Accept-Charset");
        assert_eq!("Accept, Accept-Charset", response.header("vary").unwrap().combined());
        response.set_header("Vary", "Accept-Encoding");
        assert_eq!("Accept-Encoding", response.header("Vary").unwrap().combined());
    }
}
