//! The filter contract and its registration forms.

use std::error::Error as StdError;
use std::sync::Arc;

use async_trait::async_trait;

use crate::adapter::RawRequest;
use crate::endpoint::{Endpoint, EndpointMap};
use crate::error::ApiException;
use crate::request::Request;
use crate::response::Response;

/// A five-phase interceptor accompanying one exchange.
///
/// The pipeline calls every registered filter in registration order in each
/// phase; the same filter instance sees all five phases of one exchange. All
/// callbacks default to "no opinion", implement only the phases the filter
/// participates in.
///
/// In any phase but `finish`, a filter may raise an [`ApiException`] to
/// intercept the exchange; the carried response is sent without consulting
/// the remaining phases up to `send`.
#[async_trait]
pub trait Filter: Send + Sync {
    /// Prepare phase. A filter may build the [`Request`] itself from the raw
    /// inbound data; the first filter doing so wins and the core skips its
    /// own request construction.
    async fn parse(&self, raw: &dyn RawRequest) -> Result<Option<Request>, ApiException> {
        let _ = raw;
        Ok(None)
    }

    /// Before phase. Returning a request replaces the current one for all
    /// subsequent filters and the remaining pipeline.
    async fn before(&self, request: &mut Request) -> Result<Option<Request>, ApiException> {
        let _ = request;
        Ok(None)
    }

    /// Route phase. `endpoints` holds every endpoint registered for the
    /// request path regardless of method, and may be modified in place.
    /// Returning an endpoint dispatches the request there directly and skips
    /// the remaining route filters.
    async fn route(
        &self,
        endpoints: &mut EndpointMap,
        request: &Request,
    ) -> Result<Option<Arc<dyn Endpoint>>, ApiException> {
        let _ = (endpoints, request);
        Ok(None)
    }

    /// After phase. The response may be modified in place; returning one
    /// replaces it and skips the remaining after filters.
    async fn after(
        &self,
        request: &Request,
        response: &mut Response,
    ) -> Result<Option<Response>, ApiException> {
        let _ = (request, response);
        Ok(None)
    }

    /// Finish phase, after the response bytes are on the wire. The request
    /// is absent when the exchange failed before one could be built.
    async fn finish(&self, request: Option<&Request>, response: &Response) {
        let _ = (request, response);
    }
}

/// Builds a fresh filter for one exchange. A failure is logged and the
/// filter is skipped for that exchange.
pub type FilterFactory =
    dyn Fn() -> Result<Arc<dyn Filter>, Box<dyn StdError + Send + Sync>> + Send + Sync;

/// How a filter takes part in exchanges: either one shared instance serving
/// every exchange concurrently, or a factory producing one instance per
/// exchange.
pub enum FilterRegistration {
    /// One instance for all exchanges. Must not require synchronization
    /// between them.
    Shared(Arc<dyn Filter>),
    /// A fresh instance per exchange, for filters that keep per-exchange
    /// state across phases.
    PerExchange(Box<FilterFactory>),
}

impl std::fmt::Debug for FilterRegistration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FilterRegistration::Shared(_) => f.write_str("FilterRegistration::Shared"),
            FilterRegistration::PerExchange(_) => f.write_str("FilterRegistration::PerExchange"),
        }
    }
}
