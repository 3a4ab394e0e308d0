//! A small person API driven through the in-memory adapter.
//!
//! Run with: cargo run --example person

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use http::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use micro_rest::adapter::{LocalRequest, LocalResponse};
use micro_rest::endpoint::{Endpoint, endpoint_fn};
use micro_rest::error::ApiException;
use micro_rest::filters::{AccessLog, CorsFilter};
use micro_rest::request::Request;
use micro_rest::response::Response;
use micro_rest::router::Router;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Person {
    name: String,
    email: String,
}

#[derive(Debug, Default)]
struct Store {
    persons: Mutex<HashMap<i64, Person>>,
    next_id: Mutex<i64>,
}

struct CreatePerson {
    store: Arc<Store>,
}

#[async_trait]
impl Endpoint for CreatePerson {
    async fn call(&self, request: &mut Request) -> Result<Option<Response>, ApiException> {
        let Some(person) = request.body_as::<Person>().await? else {
            return Err(ApiException::new(Response::error_with(
                StatusCode::BAD_REQUEST,
                "A person is required in the request body.",
            )));
        };
        let id = {
            let mut next_id = self.store.next_id.lock().expect("store lock");
            *next_id += 1;
            *next_id
        };
        self.store.persons.lock().expect("store lock").insert(id, person.clone());
        Ok(Some(Response::with_body(
            StatusCode::CREATED,
            serde_json::json!({ "id": id, "name": person.name, "email": person.email }),
        )))
    }
}

struct ReadPerson {
    store: Arc<Store>,
}

#[async_trait]
impl Endpoint for ReadPerson {
    async fn call(&self, request: &mut Request) -> Result<Option<Response>, ApiException> {
        let id = request.param("id")?.as_int()?;
        let persons = self.store.persons.lock().expect("store lock");
        match persons.get(&id) {
            Some(person) => Ok(Some(Response::with_body(
                StatusCode::OK,
                serde_json::json!({ "id": id, "name": person.name, "email": person.email }),
            ))),
            None => Err(ApiException::new(Response::not_found())),
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::INFO).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let store = Arc::new(Store::default());
    let mut router = Router::new();
    router.filter(Arc::new(AccessLog::new()));
    router.filter(Arc::new(CorsFilter::new()));
    router.post("/person", Arc::new(CreatePerson { store: Arc::clone(&store) })).unwrap();
    router.get("/person/{id}", Arc::new(ReadPerson { store: Arc::clone(&store) })).unwrap();
    router
        .delete(
            "/person/{id}",
            endpoint_fn({
                let store = Arc::clone(&store);
                move |request| {
                    let id = request.param("id")?.as_int()?;
                    store.persons.lock().expect("store lock").remove(&id);
                    Ok(None)
                }
            }),
        )
        .unwrap();

    let body = r#"{"name": "Hase", "email": "hase@example.com"}"#;
    let create = LocalRequest::new("POST", "http://localhost/person")
        .header("Content-Type", "application/json")
        .header("Content-Length", &body.len().to_string())
        .body(body);
    let mut out = LocalResponse::new();
    router.handle(Box::new(create), &mut out).await;
    info!(status = out.status(), body = %out.body_string(), "created");

    let read = LocalRequest::new("GET", "http://localhost/person/1");
    let mut out = LocalResponse::new();
    router.handle(Box::new(read), &mut out).await;
    info!(status = out.status(), body = %out.body_string(), "read back");

    let read_xml =
        LocalRequest::new("GET", "http://localhost/person/1").header("Accept", "application/xml");
    let mut out = LocalResponse::new();
    router.handle(Box::new(read_xml), &mut out).await;
    info!(status = out.status(), body = %out.body_string(), "read back as xml");

    let delete = LocalRequest::new("DELETE", "http://localhost/person/1");
    let mut out = LocalResponse::new();
    router.handle(Box::new(delete), &mut out).await;
    info!(status = out.status(), "deleted");

    let missing = LocalRequest::new("GET", "http://localhost/person/1");
    let mut out = LocalResponse::new();
    router.handle(Box::new(missing), &mut out).await;
    info!(status = out.status(), body = %out.body_string(), "gone");
}
