//! The request pipeline.
//!
//! A [`Router`] owns the routing tree, the registered filters and the
//! content negotiation registries. [`handle`](Router::handle) walks one
//! exchange through the five phases: prepare builds the [`Request`], before
//! lets filters rewrite it, route resolves the path against the tree,
//! dispatch calls the endpoint and after lets filters rework the
//! [`Response`]. The response is then negotiated and sent, and the finish
//! phase runs last, whatever happened before it.
//!
//! An [`ApiException`] raised before dispatch intercepts the exchange: the
//! remaining phases up to send are skipped and the carried response goes
//! out instead. One raised by the endpoint or an after filter becomes the
//! response and still travels through the remaining after filters.

use std::fmt;
use std::io::{self, Write};
use std::sync::Arc;

use http::{Method, StatusCode};
use tracing::{debug, error, warn};

use crate::adapter::{RawRequest, RawResponse};
use crate::content::empty::EmptyProducer;
use crate::content::identity::IdentityEncoder;
use crate::content::{
    ApplicationJson, ApplicationXml, ApplicationYaml, ContentEncoder, ContentEncoding,
    ContentProducer, ContentType, EmptyContentType, GzipEncoding, IdentityEncoding,
};
use crate::endpoint::{Endpoint, EndpointMap};
use crate::error::ApiException;
use crate::filter::{Filter, FilterRegistration};
use crate::header::AcceptHeader;
use crate::path::parameter::PathParameter;
use crate::path::segment::{Scanner, Segment};
use crate::path::{InvalidUriTemplate, PathRouter, SegmentMatcher};
use crate::request::Request;
use crate::response::Response;
use crate::utils::counting::CountingWriter;

/// The dispatch core: routing tree, filters and negotiation registries.
///
/// Endpoints, filters, content types and content encodings are registered
/// up front; a configured router only hands out shared references during
/// exchanges and can serve any number of them concurrently.
pub struct Router {
    root: PathRouter,
    filters: Vec<FilterRegistration>,
    content_types: Vec<Arc<dyn ContentType>>,
    content_encodings: Vec<Arc<dyn ContentEncoding>>,
}

impl Router {
    /// A router with the stock representations (empty, JSON, XML, YAML) and
    /// transfer codings (identity, gzip) already registered, in that
    /// preference order.
    pub fn new() -> Router {
        Router {
            root: PathRouter::new(SegmentMatcher::root()),
            filters: Vec::new(),
            content_types: vec![
                Arc::new(EmptyContentType::new()),
                Arc::new(ApplicationJson::new()),
                Arc::new(ApplicationXml::new()),
                Arc::new(ApplicationYaml::new()),
            ],
            content_encodings: vec![
                Arc::new(IdentityEncoding::new()),
                Arc::new(GzipEncoding::new()),
            ],
        }
    }

    /// Registers an endpoint under an URI template for one HTTP method.
    /// Registering the same `(method, template)` pair again replaces the
    /// earlier endpoint.
    pub fn register(
        &mut self,
        method: Method,
        template: &str,
        endpoint: Arc<dyn Endpoint>,
    ) -> Result<(), InvalidUriTemplate> {
        let mut scanner = Scanner::new(template);
        loop {
            scanner = self.root.register(scanner, &method, &endpoint)?;
            if !scanner.has_next() {
                return Ok(());
            }
        }
    }

    pub fn get(&mut self, template: &str, endpoint: Arc<dyn Endpoint>) -> Result<(), InvalidUriTemplate> {
        self.register(Method::GET, template, endpoint)
    }

    pub fn post(&mut self, template: &str, endpoint: Arc<dyn Endpoint>) -> Result<(), InvalidUriTemplate> {
        self.register(Method::POST, template, endpoint)
    }

    pub fn put(&mut self, template: &str, endpoint: Arc<dyn Endpoint>) -> Result<(), InvalidUriTemplate> {
        self.register(Method::PUT, template, endpoint)
    }

    pub fn delete(&mut self, template: &str, endpoint: Arc<dyn Endpoint>) -> Result<(), InvalidUriTemplate> {
        self.register(Method::DELETE, template, endpoint)
    }

    pub fn options(&mut self, template: &str, endpoint: Arc<dyn Endpoint>) -> Result<(), InvalidUriTemplate> {
        self.register(Method::OPTIONS, template, endpoint)
    }

    /// Registers a filter shared by all exchanges.
    pub fn filter(&mut self, filter: Arc<dyn Filter>) {
        self.filters.push(FilterRegistration::Shared(filter));
    }

    /// Registers a filter built freshly for every exchange.
    pub fn filter_factory<F>(&mut self, factory: F)
    where
        F: Fn() -> Result<Arc<dyn Filter>, Box<dyn std::error::Error + Send + Sync>>
            + Send
            + Sync
            + 'static,
    {
        self.filters.push(FilterRegistration::PerExchange(Box::new(factory)));
    }

    /// Registers an additional representation, after the stock ones.
    pub fn content_type(&mut self, content_type: Arc<dyn ContentType>) {
        self.content_types.push(content_type);
    }

    /// Registers an additional transfer coding, after the stock ones.
    pub fn content_encoding(&mut self, content_encoding: Arc<dyn ContentEncoding>) {
        self.content_encodings.push(content_encoding);
    }

    /// Resolves a request path against the routing tree. The path is
    /// normalized first, so dot segments never reach the tree. Returns the
    /// endpoints of the matched node, keyed by method, along with the
    /// captured path parameters.
    pub fn route_candidates(&self, path: &str) -> (EndpointMap, Vec<PathParameter>) {
        let normalized = Segment::normalize_path(path);
        let mut scanner = Scanner::new(&normalized);
        if scanner.look_ahead().is_some_and(|segment| segment.is_root()) {
            return (self.root.endpoints().clone(), Vec::new());
        }
        let mut parameters = Vec::new();
        let endpoints = self.root.route(&mut scanner, &mut parameters);
        (endpoints, parameters)
    }

    /// Runs one exchange end to end and returns the response that went out,
    /// with its content length filled in.
    pub async fn handle(
        &self,
        raw_request: Box<dyn RawRequest>,
        raw_response: &mut dyn RawResponse,
    ) -> Response {
        let filters = self.filter_instances();
        let (request, response) = self.run_phases(&filters, raw_request).await;
        let response = self.send(request.as_ref(), response, raw_response).await;
        for filter in &filters {
            filter.finish(request.as_ref(), &response).await;
        }
        response
    }

    fn filter_instances(&self) -> Vec<Arc<dyn Filter>> {
        self.filters
            .iter()
            .filter_map(|registration| match registration {
                FilterRegistration::Shared(filter) => Some(Arc::clone(filter)),
                FilterRegistration::PerExchange(factory) => match factory() {
                    Ok(filter) => Some(filter),
                    Err(err) => {
                        warn!("skipping filter, instantiation failed: {err}");
                        None
                    }
                },
            })
            .collect()
    }

    /// Phases prepare through after. Returns the request (when one could be
    /// built) and the response to send.
    async fn run_phases(
        &self,
        filters: &[Arc<dyn Filter>],
        raw: Box<dyn RawRequest>,
    ) -> (Option<Request>, Response) {
        // prepare
        let mut request = match self.prepare(filters, raw).await {
            Ok(request) => request,
            Err(ex) => {
                debug!("request rejected during prepare: {ex}");
                return (None, ex.into_response());
            }
        };

        // before
        for filter in filters {
            match filter.before(&mut request).await {
                Ok(Some(replacement)) => request = replacement,
                Ok(None) => {}
                Err(ex) => {
                    debug!(request_id = request.request_id(), "intercepted before routing: {ex}");
                    return (Some(request), ex.into_response());
                }
            }
        }

        // route
        let (mut candidates, parameters) = self.route_candidates(request.path());
        request.parameters_mut().extend(parameters);
        let mut endpoint: Option<Arc<dyn Endpoint>> = None;
        for filter in filters {
            match filter.route(&mut candidates, &request).await {
                Ok(Some(found)) => {
                    endpoint = Some(found);
                    break;
                }
                Ok(None) => {}
                Err(ex) => {
                    debug!(request_id = request.request_id(), "intercepted during routing: {ex}");
                    return (Some(request), ex.into_response());
                }
            }
        }
        // dispatch, a missed route turns into the 404 or 405 response here
        let mut response = match endpoint.or_else(|| candidates.remove(request.method())) {
            Some(endpoint) => match endpoint.call(&mut request).await {
                Ok(Some(response)) => response,
                Ok(None) => Response::no_content(),
                Err(ex) => {
                    error!(request_id = request.request_id(), "endpoint rejected the request: {ex}");
                    ex.into_response()
                }
            },
            None if candidates.is_empty() => Response::not_found(),
            None => method_not_allowed(&candidates),
        };

        // after, an exception here replaces the response but the remaining
        // filters still get to see it
        for filter in filters {
            match filter.after(&request, &mut response).await {
                Ok(Some(replacement)) => {
                    response = replacement;
                    break;
                }
                Ok(None) => {}
                Err(ex) => {
                    debug!(request_id = request.request_id(), "response replaced after dispatch: {ex}");
                    response = ex.into_response();
                }
            }
        }
        (Some(request), response)
    }

    async fn prepare(
        &self,
        filters: &[Arc<dyn Filter>],
        raw: Box<dyn RawRequest>,
    ) -> Result<Request, ApiException> {
        for filter in filters {
            if let Some(mut request) = filter.parse(raw.as_ref()).await? {
                request.set_negotiators(&self.content_types, &self.content_encodings);
                request.attach_raw(raw);
                return Ok(request);
            }
        }
        Request::from_raw(raw, &self.content_types, &self.content_encodings)
    }

    /// The send phase. On a transmission failure the exchange is retried
    /// once with a bare 500 without body or coding.
    async fn send(
        &self,
        request: Option<&Request>,
        mut response: Response,
        raw: &mut dyn RawResponse,
    ) -> Response {
        match self.transmit(request, &mut response, raw).await {
            Ok(()) => response,
            Err(err) => {
                error!("unable to send response: {err}");
                let mut fallback = Response::internal_server_error();
                fallback.remove_body();
                fallback.set_header("Content-Length", "0");
                fallback.set_content_length(0);
                raw.set_status(StatusCode::INTERNAL_SERVER_ERROR.as_u16());
                raw.add_header("Content-Length", "0");
                if let Err(err) = raw.flush().await {
                    error!("unable to send fallback response: {err}");
                }
                fallback
            }
        }
    }

    async fn transmit(
        &self,
        request: Option<&Request>,
        response: &mut Response,
        raw: &mut dyn RawResponse,
    ) -> io::Result<()> {
        let (mut producer, encoder) = self.negotiate(request, response);
        encoder.prepare(response);
        producer.prepare(response);

        let mut buffer: Vec<u8> = Vec::new();
        let length = {
            let mut counter = CountingWriter::new(&mut buffer);
            {
                let mut sink = encoder.encode(Box::new(&mut counter))?;
                producer.produce(&mut *sink)?;
                sink.flush()?;
            }
            counter.count()
        };
        response.set_content_length(length);
        response.set_header("Content-Length", &length.to_string());

        raw.set_status(response.status().as_u16());
        for header in response.headers() {
            raw.add_header(header.name(), &header.encoded());
        }
        raw.write_body(&buffer).await?;
        raw.flush().await
    }

    /// Negotiates the representation and transfer coding for the response.
    /// When nothing fits, the response is replaced with a 406 and negotiated
    /// again; when even that fails, the empty producer with the identity
    /// coding carries the 406 out without a body. Responses without a
    /// request behind them keep their status and skip the 406 detour.
    fn negotiate(
        &self,
        request: Option<&Request>,
        response: &mut Response,
    ) -> (Box<dyn ContentProducer>, Box<dyn ContentEncoder>) {
        let (accept, accept_charset, accept_encoding) = accepts_of(request, response);
        if let Some(vary) = vary_of(request) {
            response.add_header("Vary", &vary);
        }
        for attempt in 0..2 {
            let producer = self
                .content_types
                .iter()
                .find_map(|candidate| candidate.producer_for(&accept, &accept_charset, request, response));
            let encoder = self
                .content_encodings
                .iter()
                .find_map(|candidate| candidate.encoder_for(&accept_encoding, request, response));
            match (producer, encoder) {
                (Some(producer), Some(encoder)) => return (producer, encoder),
                _ if attempt == 0 && request.is_some() => {
                    debug!("response not acceptable, renegotiating as 406");
                    let vary = response.header("Vary").cloned();
                    *response = Response::not_acceptable();
                    if let Some(vary) = vary {
                        response.headers_mut().insert(vary);
                    }
                }
                _ => break,
            }
        }
        (Box::new(EmptyProducer::new()), Box::new(IdentityEncoder::new()))
    }
}

fn method_not_allowed(candidates: &EndpointMap) -> Response {
    let mut response = Response::method_not_allowed();
    let mut methods: Vec<String> = candidates.keys().map(Method::to_string).collect();
    methods.sort();
    response.set_header("Allow", &methods.join(", "));
    response
}

/// The accept lists steering negotiation. Missing headers fall back to
/// accept-anything defaults, and `identity` is appended at `q=0.1` when the
/// client did not mention it. A header that cannot be parsed turns the whole
/// response into a 400.
fn accepts_of(
    request: Option<&Request>,
    response: &mut Response,
) -> (AcceptHeader, AcceptHeader, AcceptHeader) {
    let mut invalid = false;
    let accept = accept_list(request, "Accept", "*/*", &mut invalid);
    let accept_charset = accept_list(request, "Accept-Charset", "*", &mut invalid);
    let mut accept_encoding = accept_list(request, "Accept-Encoding", "identity", &mut invalid);
    if !accept_encoding.values().iter().any(|value| value.value().eq_ignore_ascii_case("identity")) {
        let _ = accept_encoding.add("identity;q=0.1");
    }
    if invalid {
        *response = Response::bad_request();
    }
    (accept, accept_charset, accept_encoding)
}

/// Names the negotiation headers the client actually sent, so caches know
/// which request fields picked this representation.
fn vary_of(request: Option<&Request>) -> Option<String> {
    let request = request?;
    let sent: Vec<&str> = ["Accept", "Accept-Charset", "Accept-Encoding"]
        .into_iter()
        .filter(|name| request.header(name).is_some())
        .collect();
    (!sent.is_empty()).then(|| sent.join(", "))
}

fn accept_list(request: Option<&Request>, name: &str, default: &str, invalid: &mut bool) -> AcceptHeader {
    let fallback = || AcceptHeader::parse(default).unwrap_or_default();
    let Some(header) = request.and_then(|request| request.header(name)) else {
        return fallback();
    };
    let mut accept = AcceptHeader::new();
    if let Err(err) = accept.add_header(header) {
        debug!("unusable {name} header: {err}");
        *invalid = true;
        return fallback();
    }
    accept
}

impl Default for Router {
    fn default() -> Router {
        Router::new()
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("root", &self.root)
            .field("filters", &self.filters)
            .field("content_types", &self.content_types.len())
            .field("content_encodings", &self.content_encodings.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::{LocalRequest, LocalResponse};
    use crate::endpoint::endpoint_fn;
    use async_trait::async_trait;
    use serde_json::{Value, json};

    fn person_router() -> Router {
        let mut router = Router::new();
        router
            .get("/", endpoint_fn(|_| Ok(Some(Response::with_body(StatusCode::OK, "home")))))
            .unwrap();
        router
            .get(
                "/person/{id}/item/{id2}",
                endpoint_fn(|request| {
                    let id = request.param("id")?.as_int()?;
                    let id2 = request.param("id2")?.as_int()?;
                    Ok(Some(Response::with_body(StatusCode::OK, json!({"id": id, "id2": id2}))))
                }),
            )
            .unwrap();
        router
            .get(
                "/person/{id}",
                endpoint_fn(|request| {
                    let id = request.param("id")?.as_int()?;
                    Ok(Some(Response::with_body(StatusCode::OK, json!({"id": id}))))
                }),
            )
            .unwrap();
        router
    }

    async fn exchange(router: &Router, raw: LocalRequest) -> (LocalResponse, Response) {
        let mut out = LocalResponse::new();
        let sent = router.handle(Box::new(raw), &mut out).await;
        (out, sent)
    }

    #[tokio::test]
    async fn routes_the_root_path() {
        let router = person_router();
        let (out, _) = exchange(&router, LocalRequest::new("GET", "http://localhost/")).await;
        assert_eq!(200, out.status());
        assert_eq!("\"home\"", out.body_string());
    }

    #[tokio::test]
    async fn routes_path_variables_to_the_endpoint() {
        let router = person_router();
        let (out, _) =
            exchange(&router, LocalRequest::new("GET", "http://localhost/person/876/item/543")).await;
        assert_eq!(200, out.status());
        let body: Value = serde_json::from_slice(out.body()).unwrap();
        assert_eq!(json!({"id": 876, "id2": 543}), body);
    }

    #[tokio::test]
    async fn normalizes_dot_segments_before_routing() {
        let router = person_router();
        let (out, _) = exchange(
            &router,
            LocalRequest::new("GET", "http://localhost/person/../person/876/."),
        )
        .await;
        assert_eq!(200, out.status());
        let body: Value = serde_json::from_slice(out.body()).unwrap();
        assert_eq!(json!({"id": 876}), body);
    }

    #[tokio::test]
    async fn distinguishes_unknown_paths_from_unknown_methods() {
        let router = person_router();
        let (out, _) = exchange(&router, LocalRequest::new("GET", "http://localhost/nowhere")).await;
        assert_eq!(404, out.status());

        let (out, _) = exchange(&router, LocalRequest::new("PUT", "http://localhost/person/876")).await;
        assert_eq!(405, out.status());
        assert_eq!(Some("GET"), out.header("Allow"));
    }

    #[tokio::test]
    async fn sends_json_with_content_type_and_length() {
        let router = person_router();
        let (out, sent) =
            exchange(&router, LocalRequest::new("GET", "http://localhost/person/876")).await;
        assert_eq!("application/json; charset=utf-8", out.header("Content-Type").unwrap());
        assert_eq!(out.body().len().to_string(), out.header("Content-Length").unwrap());
        assert_eq!(Some(out.body().len() as u64), sent.content_length());
        assert!(out.flushed());
    }

    #[tokio::test]
    async fn negotiates_xml_when_the_client_prefers_it() {
        let router = person_router();
        let (out, _) = exchange(
            &router,
            LocalRequest::new("GET", "http://localhost/person/876")
                .header("Accept", "application/xml"),
        )
        .await;
        assert_eq!("application/xml; charset=utf-8", out.header("Content-Type").unwrap());
        assert_eq!("<response><id>876</id></response>", out.body_string());
    }

    #[tokio::test]
    async fn unacceptable_accept_lists_fall_back_to_an_empty_406() {
        let router = person_router();
        let (out, _) = exchange(
            &router,
            LocalRequest::new("GET", "http://localhost/person/876").header("Accept", "text/plain"),
        )
        .await;
        assert_eq!(406, out.status());
        assert!(out.body().is_empty());
        assert_eq!(Some("0"), out.header("Content-Length"));
    }

    #[tokio::test]
    async fn malformed_accept_lists_are_rejected_with_400() {
        let router = person_router();
        let (out, _) = exchange(
            &router,
            LocalRequest::new("GET", "http://localhost/person/876")
                .header("Accept", "application/json;q=high"),
        )
        .await;
        assert_eq!(400, out.status());
    }

    #[tokio::test]
    async fn endpoints_returning_none_answer_with_204() {
        let mut router = Router::new();
        router.delete("/person/{id}", endpoint_fn(|_| Ok(None))).unwrap();
        let (out, _) =
            exchange(&router, LocalRequest::new("DELETE", "http://localhost/person/876")).await;
        assert_eq!(204, out.status());
        assert!(out.body().is_empty());
    }

    #[tokio::test]
    async fn endpoints_can_read_the_request_body() {
        struct Echo;

        #[async_trait]
        impl Endpoint for Echo {
            async fn call(&self, request: &mut Request) -> Result<Option<Response>, ApiException> {
                let body: Value = request.body_as().await?.unwrap_or(Value::Null);
                Ok(Some(Response::with_body(StatusCode::OK, body)))
            }
        }

        let mut router = Router::new();
        router.post("/echo", Arc::new(Echo)).unwrap();
        let body = r#"{"name": "Hase"}"#;
        let (out, _) = exchange(
            &router,
            LocalRequest::new("POST", "http://localhost/echo")
                .header("Content-Type", "application/json")
                .header("Content-Length", &body.len().to_string())
                .body(body),
        )
        .await;
        assert_eq!(200, out.status());
        let echoed: Value = serde_json::from_slice(out.body()).unwrap();
        assert_eq!(json!({"name": "Hase"}), echoed);
    }

    #[tokio::test]
    async fn exceptions_from_endpoints_intercept_the_exchange() {
        let mut router = Router::new();
        router
            .get(
                "/person/{id}",
                endpoint_fn(|request| {
                    let _ = request.param("id")?.as_int()?;
                    Ok(None)
                }),
            )
            .unwrap();
        let (out, _) =
            exchange(&router, LocalRequest::new("GET", "http://localhost/person/not-a-number")).await;
        assert_eq!(400, out.status());
    }

    #[tokio::test]
    async fn before_filters_can_intercept_the_exchange() {
        struct Gate;

        #[async_trait]
        impl Filter for Gate {
            async fn before(&self, request: &mut Request) -> Result<Option<Request>, ApiException> {
                if request.header("Authorization").is_none() {
                    return Err(ApiException::with_message(
                        Response::error_with(StatusCode::UNAUTHORIZED, "Unauthorized"),
                        "missing credentials",
                    ));
                }
                Ok(None)
            }
        }

        let mut router = person_router();
        router.filter(Arc::new(Gate));
        let (out, _) = exchange(&router, LocalRequest::new("GET", "http://localhost/person/876")).await;
        assert_eq!(401, out.status());

        let (out, _) = exchange(
            &router,
            LocalRequest::new("GET", "http://localhost/person/876").header("Authorization", "let me in"),
        )
        .await;
        assert_eq!(200, out.status());
    }

    #[tokio::test]
    async fn route_filters_can_supply_the_endpoint() {
        struct Shortcut;

        #[async_trait]
        impl Filter for Shortcut {
            async fn route(
                &self,
                _endpoints: &mut EndpointMap,
                request: &Request,
            ) -> Result<Option<Arc<dyn Endpoint>>, ApiException> {
                if request.path() == "/teapot" {
                    return Ok(Some(endpoint_fn(|_| {
                        Ok(Some(Response::new(StatusCode::IM_A_TEAPOT)))
                    })));
                }
                Ok(None)
            }
        }

        let mut router = person_router();
        router.filter(Arc::new(Shortcut));
        let (out, _) = exchange(&router, LocalRequest::new("GET", "http://localhost/teapot")).await;
        assert_eq!(418, out.status());
    }

    #[tokio::test]
    async fn failed_filter_factories_are_skipped() {
        let mut router = person_router();
        router.filter_factory(|| Err("construction failed".into()));
        let (out, _) = exchange(&router, LocalRequest::new("GET", "http://localhost/person/876")).await;
        assert_eq!(200, out.status());
    }

    #[tokio::test]
    async fn finish_runs_even_for_rejected_requests() {
        use std::sync::atomic::{AtomicU16, Ordering};

        #[derive(Default)]
        struct Recorder {
            status: AtomicU16,
        }

        #[async_trait]
        impl Filter for Recorder {
            async fn finish(&self, _request: Option<&Request>, response: &Response) {
                self.status.store(response.status().as_u16(), Ordering::SeqCst);
            }
        }

        let recorder = Arc::new(Recorder::default());
        let mut router = person_router();
        router.filter(Arc::clone(&recorder) as Arc<dyn Filter>);
        let raw = LocalRequest::new("GET", "http://localhost/person/876").header("X-Evil", "a\u{0}b");
        let (out, _) = exchange(&router, raw).await;
        assert_eq!(400, out.status());
        assert_eq!(400, recorder.status.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn duplicate_registrations_replace_the_endpoint() {
        let mut router = Router::new();
        router.get("/abc", endpoint_fn(|_| Ok(Some(Response::new(StatusCode::OK))))).unwrap();
        router
            .get("/abc", endpoint_fn(|_| Ok(Some(Response::new(StatusCode::ACCEPTED)))))
            .unwrap();
        let (out, _) = exchange(&router, LocalRequest::new("GET", "http://localhost/abc")).await;
        assert_eq!(202, out.status());
    }

    #[tokio::test]
    async fn templates_with_parent_segments_register_at_the_folded_path() {
        let mut router = Router::new();
        router
            .get("/abc/../def", endpoint_fn(|_| Ok(Some(Response::new(StatusCode::OK)))))
            .unwrap();
        let (out, _) = exchange(&router, LocalRequest::new("GET", "http://localhost/def")).await;
        assert_eq!(200, out.status());
        let (out, _) = exchange(&router, LocalRequest::new("GET", "http://localhost/abc/def")).await;
        assert_eq!(404, out.status());
    }
}
