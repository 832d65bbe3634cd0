use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde_json::{Map, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::debug;

pub type PostId = i64;

/// A stored post plus the version its ETag is derived from.
#[derive(Clone, Debug)]
pub struct StoredPost {
    pub version: u64,
    pub body: Map<String, Value>,
}

impl StoredPost {
    pub fn etag(&self) -> String {
        format!("\"{}\"", self.version)
    }
}

#[derive(Debug, Default)]
pub struct Store {
    next_id: PostId,
    posts: BTreeMap<PostId, StoredPost>,
}

impl Store {
    /// Store `body` under a fresh id and return the stored post.
    pub fn insert(&mut self, mut body: Map<String, Value>) -> (PostId, StoredPost) {
        self.next_id += 1;
        let id = self.next_id;
        body.insert("id".to_string(), Value::from(id));
        let stored = StoredPost { version: 1, body };
        self.posts.insert(id, stored.clone());
        (id, stored)
    }

    pub fn get(&self, id: PostId) -> Option<&StoredPost> {
        self.posts.get(&id)
    }
}

pub type Db = Arc<RwLock<Store>>;

/// A store pre-populated with `posts`, ids assigned from 1 in order.
pub fn seeded(posts: impl IntoIterator<Item = Map<String, Value>>) -> Db {
    let mut store = Store::default();
    for body in posts {
        store.insert(body);
    }
    Arc::new(RwLock::new(store))
}

pub fn app() -> Router {
    app_with(Db::default())
}

pub fn app_with(db: Db) -> Router {
    Router::new()
        .route("/posts", get(list_posts).post(create_post))
        .route("/posts/{id}", get(get_post).put(replace_post))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

pub async fn run_with(listener: TcpListener, db: Db) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with(db)).await
}

async fn list_posts(State(db): State<Db>) -> Json<Vec<Value>> {
    let store = db.read().await;
    Json(
        store
            .posts
            .values()
            .map(|post| Value::Object(post.body.clone()))
            .collect(),
    )
}

async fn create_post(
    State(db): State<Db>,
    Json(body): Json<Map<String, Value>>,
) -> impl IntoResponse {
    let (id, stored) = db.write().await.insert(body);
    debug!(id, "created post");
    (
        StatusCode::CREATED,
        [(header::ETAG, stored.etag())],
        Json(Value::Object(stored.body)),
    )
}

async fn get_post(
    State(db): State<Db>,
    Path(id): Path<PostId>,
) -> Result<impl IntoResponse, StatusCode> {
    let store = db.read().await;
    let stored = store.get(id).ok_or(StatusCode::NOT_FOUND)?;
    Ok((
        [(header::ETAG, stored.etag())],
        Json(Value::Object(stored.body.clone())),
    ))
}

/// Full replace. Requires a credential, and honours `If-Match` so a writer
/// holding a stale copy gets 412 instead of clobbering newer data.
async fn replace_post(
    State(db): State<Db>,
    Path(id): Path<PostId>,
    headers: HeaderMap,
    Json(mut body): Json<Map<String, Value>>,
) -> Result<impl IntoResponse, StatusCode> {
    if !headers.contains_key(header::AUTHORIZATION) {
        return Err(StatusCode::UNAUTHORIZED);
    }
    let mut store = db.write().await;
    let stored = store.posts.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;

    if let Some(expected) = headers.get(header::IF_MATCH) {
        let expected = expected.to_str().map_err(|_| StatusCode::BAD_REQUEST)?;
        if expected.trim() != "*" && expected.trim() != stored.etag() {
            debug!(id, expected, current = %stored.etag(), "stale If-Match");
            return Err(StatusCode::PRECONDITION_FAILED);
        }
    }

    body.insert("id".to_string(), Value::from(id));
    stored.body = body;
    stored.version += 1;
    debug!(id, version = stored.version, "replaced post");
    Ok((
        [(header::ETAG, stored.etag())],
        Json(Value::Object(stored.body.clone())),
    ))
}
