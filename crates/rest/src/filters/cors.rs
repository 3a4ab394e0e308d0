//! Cross-origin resource sharing.

use std::sync::Arc;

use async_trait::async_trait;
use http::Method;

use crate::endpoint::{Endpoint, EndpointMap, endpoint_fn};
use crate::error::ApiException;
use crate::filter::Filter;
use crate::header::Header;
use crate::request::Request;
use crate::response::Response;

/// Answers CORS preflight requests and marks ordinary responses as
/// cross-origin readable.
///
/// During the route phase, an `OPTIONS` request with an `Origin` header
/// gets a preflight endpoint planted into the candidate map, advertising
/// the methods registered for the path. Paths without any endpoint keep
/// answering 404 and endpoints registered for `OPTIONS` themselves win
/// over the planted one. During the after phase, responses to cross-origin
/// requests are stamped with the allow headers.
#[derive(Debug, Default)]
pub struct CorsFilter;

impl CorsFilter {
    pub fn new() -> CorsFilter {
        CorsFilter
    }

    fn preflight_endpoint(endpoints: &EndpointMap) -> Arc<dyn Endpoint> {
        let mut methods: Vec<String> = endpoints.keys().map(Method::to_string).collect();
        methods.push(Method::OPTIONS.to_string());
        methods.sort();
        let methods = methods.join(", ");
        endpoint_fn(move |request| {
            let mut response = Response::ok();
            response.set_header("Access-Control-Allow-Origin", &origin_of(request));
            response.set_header("Access-Control-Allow-Methods", &methods);
            let allow_headers = request
                .header("Access-Control-Request-Headers")
                .map_or_else(|| "Content-Type".to_owned(), Header::combined);
            response.set_header("Access-Control-Allow-Headers", &allow_headers);
            response.add_header("Vary", "Origin");
            Ok(Some(response))
        })
    }
}

fn origin_of(request: &Request) -> String {
    request
        .header("Origin")
        .map_or_else(|| "*".to_owned(), Header::combined)
}

#[async_trait]
impl Filter for CorsFilter {
    async fn route(
        &self,
        endpoints: &mut EndpointMap,
        request: &Request,
    ) -> Result<Option<Arc<dyn Endpoint>>, ApiException> {
        if request.method() != Method::OPTIONS || request.header("Origin").is_none() {
            return Ok(None);
        }
        if endpoints.is_empty() || endpoints.contains_key(&Method::OPTIONS) {
            return Ok(None);
        }
        let preflight = CorsFilter::preflight_endpoint(endpoints);
        endpoints.insert(Method::OPTIONS, preflight);
        Ok(None)
    }

    async fn after(
        &self,
        request: &Request,
        response: &mut Response,
    ) -> Result<Option<Response>, ApiException> {
        if request.method() == Method::OPTIONS || request.header("Origin").is_none() {
            return Ok(None);
        }
        response.set_header("Access-Control-Allow-Origin", &origin_of(request));
        if let Some(requested) = request.header("Access-Control-Request-Headers") {
            response.set_header("Access-Control-Allow-Headers", &requested.combined());
        }
        response.add_header("Vary", "Origin");
        Ok(None)
    }
}
