//! A minimal REST dispatch core
//!
//! This crate provides the request-dispatch machinery of a REST API without
//! binding it to a concrete HTTP server: an URI template router, a five-phase
//! filter pipeline and header-driven content negotiation. A server adapter
//! hands raw requests in through the [`adapter`] seam and receives the
//! response bytes back, everything in between is handled here.
//!
//! # Features
//!
//! - URI templates with named path variables (`/person/{id}`)
//! - Percent-encoding aware path normalization, including dot segments
//! - A routing tree tried in registration order, with backtracking
//! - Filters hooking into five pipeline phases
//! - `Accept`/`Accept-Charset`/`Accept-Encoding` negotiation with quality
//!   factors and explicit rejections
//! - JSON, XML and YAML response bodies, JSON request bodies
//! - gzip compressed request bodies
//! - RFC 2047 header value decoding and encoding
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use http::StatusCode;
//! use serde_json::json;
//! use micro_rest::adapter::{LocalRequest, LocalResponse};
//! use micro_rest::endpoint::endpoint_fn;
//! use micro_rest::filters::AccessLog;
//! use micro_rest::response::Response;
//! use micro_rest::router::Router;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let mut router = Router::new();
//!     router.filter(Arc::new(AccessLog::new()));
//!     router
//!         .get(
//!             "/person/{id}",
//!             endpoint_fn(|request| {
//!                 let id = request.param("id")?.as_int()?;
//!                 Ok(Some(Response::with_body(StatusCode::OK, json!({ "id": id }))))
//!             }),
//!         )
//!         .unwrap();
//!
//!     // any server adapter works here, the local pair keeps it self-contained
//!     let request = LocalRequest::new("GET", "http://localhost/person/876");
//!     let mut response = LocalResponse::new();
//!     router.handle(Box::new(request), &mut response).await;
//!     assert_eq!(200, response.status());
//!     assert_eq!(r#"{"id":876}"#, response.body_string());
//! }
//! ```

pub mod adapter;
pub mod codec;
pub mod content;
pub mod endpoint;
pub mod error;
pub mod filter;
pub mod filters;
pub mod header;
pub mod path;
pub mod query;
pub mod request;
pub mod response;
pub mod router;

mod utils;

pub use endpoint::{Endpoint, endpoint_fn};
pub use error::{ApiException, Error};
pub use filter::Filter;
pub use query::Query;
pub use request::Request;
pub use response::{ApiError, Response};
pub use router::Router;
