//! Items service used by the end-to-end tests.
//!
//! Reads go through [`Cache::get_or_try_compute`], writes commit to the
//! in-memory table and then invalidate the item's detail key and every
//! cached variant of the listing.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
    routing::get,
};
use dashmap::DashMap;
use http::{StatusCode, Uri};
use rtcache::{ApiResponse, Cache, CachePath, InvalidationTarget};
use rtcache_backend::Backend;
use serde::{Deserialize, Serialize};
use tracing::error;

pub const ITEMS_NAMESPACE: &str = "items";

const PER_PAGE: usize = 2;

pub type SharedCache = Cache<Arc<dyn Backend + Send + 'static>>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: u64,
    pub name: String,
    pub tag: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ItemInput {
    pub name: String,
    pub tag: String,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    tag: Option<String>,
    page: Option<usize>,
}

/// Table plus counters of how often the loaders actually ran.
#[derive(Clone)]
pub struct AppState {
    pub cache: SharedCache,
    pub items: Arc<DashMap<u64, Item>>,
    detail_loads: Arc<AtomicUsize>,
    list_loads: Arc<AtomicUsize>,
}

impl AppState {
    pub fn new(cache: SharedCache) -> Self {
        Self {
            cache,
            items: Arc::new(DashMap::new()),
            detail_loads: Arc::new(AtomicUsize::new(0)),
            list_loads: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn seed(&self, items: impl IntoIterator<Item = Item>) {
        for item in items {
            self.items.insert(item.id, item);
        }
    }

    pub fn detail_loads(&self) -> usize {
        self.detail_loads.load(Ordering::SeqCst)
    }

    pub fn list_loads(&self) -> usize {
        self.list_loads.load(Ordering::SeqCst)
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/items", get(list_items))
        .route(
            "/items/{id}",
            get(get_item).put(update_item).delete(delete_item),
        )
        .with_state(state)
}

fn respond<T: Serialize>(body: ApiResponse<T>) -> Response {
    (body.status_code(), Json(body)).into_response()
}

async fn get_item(State(state): State<AppState>, Path(id): Path<u64>, uri: Uri) -> Response {
    let path = CachePath::from_uri(ITEMS_NAMESPACE, &uri);
    let result = state
        .cache
        .get_or_try_compute(&path, || async {
            state.detail_loads.fetch_add(1, Ordering::SeqCst);
            match state.items.get(&id) {
                Some(item) => Ok(ApiResponse::ok(item.clone())),
                None => Err(ApiResponse::<Item>::message(
                    StatusCode::NOT_FOUND,
                    "Item not found",
                )),
            }
        })
        .await;
    match result {
        Ok(body) | Err(body) => respond(body),
    }
}

async fn list_items(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
    uri: Uri,
) -> Response {
    let path = CachePath::from_uri(ITEMS_NAMESPACE, &uri);
    let body = state
        .cache
        .get_or_compute(&path, || async {
            state.list_loads.fetch_add(1, Ordering::SeqCst);
            let mut items: Vec<Item> = state
                .items
                .iter()
                .map(|entry| entry.value().clone())
                .filter(|item| query.tag.as_ref().is_none_or(|tag| &item.tag == tag))
                .collect();
            items.sort_by_key(|item| item.id);
            let page = query.page.unwrap_or(1).max(1);
            let items: Vec<Item> = items
                .into_iter()
                .skip((page - 1) * PER_PAGE)
                .take(PER_PAGE)
                .collect();
            ApiResponse::ok(items)
        })
        .await;
    respond(body)
}

fn targets(id: u64) -> [InvalidationTarget; 2] {
    [
        InvalidationTarget::exact(ITEMS_NAMESPACE, format!("/items/{id}")),
        InvalidationTarget::all_queries(ITEMS_NAMESPACE, "/items"),
    ]
}

async fn update_item(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(input): Json<ItemInput>,
) -> Response {
    let outcome = state
        .cache
        .commit_then_invalidate(
            || async {
                let item = Item {
                    id,
                    name: input.name,
                    tag: input.tag,
                };
                state.items.insert(id, item.clone());
                Ok::<_, ApiResponse<Item>>(item)
            },
            &targets(id),
        )
        .await;
    match outcome {
        Ok(outcome) => {
            if let Err(err) = outcome.invalidation {
                error!(id, error = %err, "item updated but cache invalidation failed");
            }
            respond(ApiResponse::ok(outcome.value))
        }
        Err(body) => respond(body),
    }
}

async fn delete_item(State(state): State<AppState>, Path(id): Path<u64>) -> Response {
    let outcome = state
        .cache
        .commit_then_invalidate(
            || async {
                state.items.remove(&id).map(|_| ()).ok_or_else(|| {
                    ApiResponse::<()>::message(StatusCode::NOT_FOUND, "Item not found")
                })
            },
            &targets(id),
        )
        .await;
    match outcome {
        Ok(outcome) => {
            if let Err(err) = outcome.invalidation {
                error!(id, error = %err, "item deleted but cache invalidation failed");
            }
            respond(ApiResponse::<()>::message(StatusCode::OK, "Item deleted"))
        }
        Err(body) => respond(body),
    }
}
