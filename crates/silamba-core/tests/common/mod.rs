//! In-process catalog server for integration tests.
//!
//! Serves every collection at `/{resource}` with list/create/replace/delete
//! and the singular `/banner` endpoint, all backed by memory.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};

#[derive(Default)]
pub struct Db {
    collections: Mutex<HashMap<String, Vec<Value>>>,
    banner: Mutex<Option<Value>>,
    failing: Mutex<HashSet<String>>,
    list_hits: AtomicUsize,
}

impl Db {
    /// Make every request for `resource` answer 500.
    pub fn fail(&self, resource: &str) {
        self.failing.lock().unwrap().insert(resource.to_string());
    }

    pub fn recover(&self, resource: &str) {
        self.failing.lock().unwrap().remove(resource);
    }

    pub fn list_hits(&self) -> usize {
        self.list_hits.load(Ordering::SeqCst)
    }

    pub fn records(&self, resource: &str) -> Vec<Value> {
        self.collections
            .lock()
            .unwrap()
            .get(resource)
            .cloned()
            .unwrap_or_default()
    }

    fn is_failing(&self, resource: &str) -> bool {
        self.failing.lock().unwrap().contains(resource)
    }
}

type Shared = Arc<Db>;

fn failure(resource: &str) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": format!("{} store unavailable", resource) })),
    )
        .into_response()
}

async fn list(State(db): State<Shared>, Path(resource): Path<String>) -> Response {
    db.list_hits.fetch_add(1, Ordering::SeqCst);
    if db.is_failing(&resource) {
        return failure(&resource);
    }
    Json(Value::Array(db.records(&resource))).into_response()
}

async fn create(
    State(db): State<Shared>,
    Path(resource): Path<String>,
    Json(mut record): Json<Value>,
) -> Response {
    if db.is_failing(&resource) {
        return failure(&resource);
    }
    let next = db.records(&resource).len() + 1;
    if let Some(obj) = record.as_object_mut() {
        let missing = obj
            .get("id")
            .and_then(Value::as_str)
            .map_or(true, str::is_empty);
        if missing {
            obj.insert("id".to_string(), json!(next.to_string()));
        }
    }
    db.collections
        .lock()
        .unwrap()
        .entry(resource)
        .or_default()
        .push(record.clone());
    (StatusCode::CREATED, Json(record)).into_response()
}

async fn replace(
    State(db): State<Shared>,
    Path((resource, id)): Path<(String, String)>,
    Json(record): Json<Value>,
) -> Response {
    if db.is_failing(&resource) {
        return failure(&resource);
    }
    let mut collections = db.collections.lock().unwrap();
    let items = collections.entry(resource).or_default();
    match items.iter_mut().find(|r| r["id"] == id.as_str()) {
        Some(existing) => {
            *existing = record.clone();
            Json(record).into_response()
        }
        None => (StatusCode::NOT_FOUND, Json(json!({}))).into_response(),
    }
}

async fn remove(State(db): State<Shared>, Path((resource, id)): Path<(String, String)>) -> Response {
    if db.is_failing(&resource) {
        return failure(&resource);
    }
    let mut collections = db.collections.lock().unwrap();
    let items = collections.entry(resource).or_default();
    let before = items.len();
    items.retain(|r| r["id"] != id.as_str());
    if items.len() == before {
        (StatusCode::NOT_FOUND, Json(json!({}))).into_response()
    } else {
        Json(json!({})).into_response()
    }
}

async fn get_banner(State(db): State<Shared>) -> Json<Value> {
    Json(db.banner.lock().unwrap().clone().unwrap_or(Value::Null))
}

async fn put_banner(State(db): State<Shared>, Json(banner): Json<Value>) -> Json<Value> {
    *db.banner.lock().unwrap() = Some(banner.clone());
    Json(banner)
}

pub struct TestServer {
    pub base_url: String,
    pub db: Shared,
}

pub async fn start_test_server() -> TestServer {
    let db: Shared = Arc::new(Db::default());
    let app = Router::new()
        .route("/banner", get(get_banner).put(put_banner))
        .route("/{resource}", get(list).post(create))
        .route("/{resource}/{id}", axum::routing::put(replace).delete(remove))
        .with_state(Arc::clone(&db));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestServer {
        base_url: format!("http://{}", addr),
        db,
    }
}
