//! The endpoint contract.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use http::Method;

use crate::error::ApiException;
use crate::request::Request;
use crate::response::Response;

/// The endpoints reachable at one routing tree node, keyed by HTTP method.
pub type EndpointMap = HashMap<Method, Arc<dyn Endpoint>>;

/// A handler bound to a `(method, template)` pair.
///
/// The pipeline calls [`call`](Endpoint::call) once a request has been routed
/// here. Returning `None` stands for an empty `204 No Content` response.
/// Raising an [`ApiException`] sends the carried response instead; any other
/// failure should be mapped by the endpoint itself, the pipeline only knows
/// about exchanges that end in a response.
///
/// Endpoint instances are shared between exchanges and must not require
/// synchronization between them.
#[async_trait]
pub trait Endpoint: Send + Sync {
    async fn call(&self, request: &mut Request) -> Result<Option<Response>, ApiException>;
}

struct EndpointFn<F> {
    f: F,
}

#[async_trait]
impl<F> Endpoint for EndpointFn<F>
where
    F: Fn(&mut Request) -> Result<Option<Response>, ApiException> + Send + Sync,
{
    async fn call(&self, request: &mut Request) -> Result<Option<Response>, ApiException> {
        (self.f)(request)
    }
}

/// Wraps a plain function as an [`Endpoint`]. Handlers that need to await
/// something implement the trait directly.
pub fn endpoint_fn<F>(f: F) -> Arc<dyn Endpoint>
where
    F: Fn(&mut Request) -> Result<Option<Response>, ApiException> + Send + Sync + 'static,
{
    Arc::new(EndpointFn { f })
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;

    #[tokio::test]
    async fn endpoint_fn_adapts_plain_functions() {
        let endpoint = endpoint_fn(|request| {
            Ok(Some(Response::with_body(StatusCode::OK, request.path())))
        });
        let mut request = Request::fabricate(Method::GET, "/abc");
        let response = endpoint.call(&mut request).await.unwrap().unwrap();
        assert_eq!(StatusCode::OK, response.status());
        assert_eq!("/abc", response.body().unwrap().as_str().unwrap());
    }

    #[tokio::test]
    async fn endpoint_fn_propagates_exceptions() {
        let endpoint = endpoint_fn(|_| Err(ApiException::new(Response::not_found())));
        let mut request = Request::fabricate(Method::GET, "/abc");
        let err = endpoint.call(&mut request).await.unwrap_err();
        assert_eq!(StatusCode::NOT_FOUND, err.response().status());
    }
}
