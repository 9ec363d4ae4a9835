//! HTTP routes for orchestrated resources
//!
//! [`resource_routes`] mounts the six CRUD endpoints of one resource on an
//! axum [`Router`]:
//!
//! | Method   | Path          | Operation                                  |
//! |----------|---------------|--------------------------------------------|
//! | `GET`    | `{base}`      | [`get_all`](ResourceOrchestrator::get_all)  |
//! | `POST`   | `{base}`      | [`create`](ResourceOrchestrator::create)    |
//! | `GET`    | `{base}/{id}` | [`get_single`](ResourceOrchestrator::get_single) |
//! | `PUT`    | `{base}/{id}` | [`update`](ResourceOrchestrator::update)    |
//! | `PATCH`  | `{base}/{id}` | [`update_partial`](ResourceOrchestrator::update_partial) |
//! | `DELETE` | `{base}/{id}` | [`delete`](ResourceOrchestrator::delete)    |
//!
//! Orchestrator calls run on tokio's blocking pool because repositories are
//! allowed to block.
//!
//! # Example
//!
//! ```rust,ignore
//! use acton_crud::prelude::*;
//!
//! let orchestrator = ResourceOrchestrator::new(BookAdapter::new(), InMemoryRepository::new())
//!     .with_options(ResourceOptions::from(&config.resources));
//!
//! let app = Router::new().merge(resource_routes("/books", orchestrator));
//! ```

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header, HeaderMap},
    routing::get,
    Router,
};

use crate::handlers::{
    ApiError, ApiOperation, ResourceAdapter, ResourceOrchestrator, ResourceResponse,
};
use crate::repository::Repository;

type Shared<A, R> = Arc<ResourceOrchestrator<A, R>>;
type HandlerResult = Result<ResourceResponse, ApiError>;

/// Build the routes for one resource mounted at `base_path`
///
/// The orchestrator's base path is set to `base_path` so `Location`
/// headers point at the mounted routes.
pub fn resource_routes<A, R>(base_path: &str, orchestrator: ResourceOrchestrator<A, R>) -> Router
where
    A: ResourceAdapter + 'static,
    R: Repository<A::Entity> + 'static,
{
    let base = format!("/{}", base_path.trim_matches('/'));
    let options = orchestrator.options().clone().with_base_path(base.clone());
    let orchestrator: Shared<A, R> = Arc::new(orchestrator.with_options(options));

    Router::new()
        .route(&base, get(list::<A, R>).post(create::<A, R>))
        .route(
            &format!("{base}/{{id}}"),
            get(get_one::<A, R>)
                .put(update::<A, R>)
                .patch(update_partial::<A, R>)
                .delete(delete::<A, R>),
        )
        .with_state(orchestrator)
}

async fn list<A, R>(
    State(orchestrator): State<Shared<A, R>>,
    Query(pairs): Query<Vec<(String, String)>>,
    headers: HeaderMap,
) -> HandlerResult
where
    A: ResourceAdapter + 'static,
    R: Repository<A::Entity> + 'static,
{
    let accept = accept_header(&headers);
    blocking(ApiOperation::List, move || {
        orchestrator.get_all(pairs, accept.as_deref())
    })
    .await
}

async fn get_one<A, R>(
    State(orchestrator): State<Shared<A, R>>,
    Path(raw_id): Path<String>,
    headers: HeaderMap,
) -> HandlerResult
where
    A: ResourceAdapter + 'static,
    R: Repository<A::Entity> + 'static,
{
    let operation = ApiOperation::Get;
    let id = parse_id(operation, &raw_id)?;
    let accept = accept_header(&headers);
    blocking(operation, move || {
        orchestrator.get_single(id, accept.as_deref())
    })
    .await
}

async fn create<A, R>(
    State(orchestrator): State<Shared<A, R>>,
    headers: HeaderMap,
    body: Bytes,
) -> HandlerResult
where
    A: ResourceAdapter + 'static,
    R: Repository<A::Entity> + 'static,
{
    let accept = accept_header(&headers);
    blocking(ApiOperation::Create, move || {
        orchestrator.create(&body, accept.as_deref())
    })
    .await
}

async fn update<A, R>(
    State(orchestrator): State<Shared<A, R>>,
    Path(raw_id): Path<String>,
    body: Bytes,
) -> HandlerResult
where
    A: ResourceAdapter + 'static,
    R: Repository<A::Entity> + 'static,
{
    let operation = ApiOperation::Update;
    let id = parse_id(operation, &raw_id)?;
    blocking(operation, move || orchestrator.update(id, &body)).await
}

async fn update_partial<A, R>(
    State(orchestrator): State<Shared<A, R>>,
    Path(raw_id): Path<String>,
    body: Bytes,
) -> HandlerResult
where
    A: ResourceAdapter + 'static,
    R: Repository<A::Entity> + 'static,
{
    let operation = ApiOperation::UpdatePartial;
    let id = parse_id(operation, &raw_id)?;
    blocking(operation, move || orchestrator.update_partial(id, &body)).await
}

async fn delete<A, R>(
    State(orchestrator): State<Shared<A, R>>,
    Path(raw_id): Path<String>,
) -> HandlerResult
where
    A: ResourceAdapter + 'static,
    R: Repository<A::Entity> + 'static,
{
    let operation = ApiOperation::Delete;
    let id = parse_id(operation, &raw_id)?;
    blocking(operation, move || orchestrator.delete(id)).await
}

fn parse_id(operation: ApiOperation, raw: &str) -> Result<i64, ApiError> {
    raw.parse::<i64>().map_err(|_| {
        tracing::debug!(operation = %operation, id = raw, "identifier is not an integer");
        ApiError::invalid_identifier(operation, raw)
    })
}

// Repeated `Accept` lines are one comma-separated list
fn accept_header(headers: &HeaderMap) -> Option<String> {
    let values: Vec<&str> = headers
        .get_all(header::ACCEPT)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .collect();
    (!values.is_empty()).then(|| values.join(", "))
}

/// Run an orchestrator call on the blocking pool
async fn blocking<F>(operation: ApiOperation, work: F) -> HandlerResult
where
    F: FnOnce() -> HandlerResult + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .unwrap_or_else(|err| Err(ApiError::internal(operation, format!("worker task failed: {err}"))))
}
