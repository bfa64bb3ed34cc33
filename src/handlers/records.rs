//! The generic telemetry resource controller.
//!
//! All three resource kinds (accelerometer, ecu, gps) share these five
//! handlers; the [`Resource`] carried in router state supplies the table
//! name, URL segment, and required-field schema.

use axum::{
    extract::{Path, Query, State},
    handler::Handler,
    http::StatusCode,
    middleware::from_fn,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use sqlx::PgPool;

use crate::api::page::{self, PagePosition, PAGE_SIZE};
use crate::database::RecordStore;
use crate::error::ApiError;
use crate::middleware::require_authentication;
use crate::resource::Resource;
use crate::validation::{extract_valid_fields, validate_against_schema};

#[derive(Clone)]
pub struct RecordsState {
    resource: &'static Resource,
    store: RecordStore,
}

/// Build the router for one resource kind. Write operations require
/// authentication; reads are public.
pub fn router(resource: &'static Resource, pool: PgPool) -> Router {
    let state = RecordsState {
        resource,
        store: RecordStore::new(pool),
    };

    Router::new()
        .route(
            "/",
            get(list_records).post(create_record.layer(from_fn(require_authentication))),
        )
        .route(
            "/:id",
            get(get_record)
                .put(replace_record.layer(from_fn(require_authentication)))
                .delete(delete_record.layer(from_fn(require_authentication))),
        )
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    page: Option<String>,
}

/// GET /{kind}?page=N - paginated listing ordered by id
async fn list_records(
    State(state): State<RecordsState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Value>, ApiError> {
    let resource = state.resource;

    let total_count = state.store.count(resource).await.map_err(|e| {
        tracing::error!("count query failed for {}: {}", resource.kind, e);
        fetch_failure(resource)
    })?;

    // The page query must not run until the count has resolved; the pair is
    // still non-atomic under concurrent writes.
    let requested = page::parse_page_param(query.page.as_deref());
    let position = PagePosition::resolve(requested, total_count);

    let records = state
        .store
        .select_page(resource, position.offset(), PAGE_SIZE)
        .await
        .map_err(|e| {
            tracing::error!("page query failed for {}: {}", resource.kind, e);
            fetch_failure(resource)
        })?;

    Ok(Json(page::page_envelope(resource.kind, records, &position)))
}

/// POST /{kind} - insert a validated record, id assigned by the store
async fn create_record(
    State(state): State<RecordsState>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, ApiError> {
    let resource = state.resource;

    if !validate_against_schema(&body, resource.required_fields) {
        return Err(ApiError::bad_request(format!(
            "Request body is not a valid {} object.",
            resource.kind
        )));
    }

    let fields = extract_valid_fields(&body, resource.required_fields);
    let id = state.store.insert(resource, &fields).await.map_err(|e| {
        tracing::error!("insert failed for {}: {}", resource.kind, e);
        ApiError::internal_server_error(format!(
            "Error inserting {} record into DB. Please try again later.",
            resource.kind
        ))
    })?;

    let body = json!({
        "id": id,
        "links": record_links(resource.kind, id),
    });
    Ok((StatusCode::CREATED, Json(body)))
}

/// GET /{kind}/:id - fetch a single record
async fn get_record(
    State(state): State<RecordsState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let resource = state.resource;

    // parseInt semantics: a non-numeric id matches no record
    let Ok(id) = id.parse::<i64>() else {
        return Err(record_not_found(resource));
    };

    match state.store.fetch_by_id(resource, id).await {
        Ok(Some(record)) => Ok(Json(record)),
        Ok(None) => Err(record_not_found(resource)),
        Err(e) => {
            tracing::error!("fetch failed for {} id {}: {}", resource.kind, id, e);
            Err(ApiError::internal_server_error(format!(
                "Unable to fetch {} record. Please try again later.",
                resource.kind
            )))
        }
    }
}

/// PUT /{kind}/:id - re-validate and replace the recognized columns
async fn replace_record(
    State(state): State<RecordsState>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let resource = state.resource;

    let Ok(id) = id.parse::<i64>() else {
        return Err(record_not_found(resource));
    };

    if !validate_against_schema(&body, resource.required_fields) {
        return Err(ApiError::bad_request(format!(
            "Request body is not a valid {} record object.",
            resource.kind
        )));
    }

    let fields = extract_valid_fields(&body, resource.required_fields);
    match state.store.update_by_id(resource, id, &fields).await {
        Ok(0) => Err(record_not_found(resource)),
        Ok(_) => Ok(Json(json!({ "links": record_links(resource.kind, id) }))),
        Err(e) => {
            tracing::error!("update failed for {} id {}: {}", resource.kind, id, e);
            Err(ApiError::internal_server_error(format!(
                "Unable to update specified {} record. Please try again later.",
                resource.kind
            )))
        }
    }
}

/// DELETE /{kind}/:id - remove the record, 204 on success
async fn delete_record(
    State(state): State<RecordsState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let resource = state.resource;

    let Ok(id) = id.parse::<i64>() else {
        return Err(record_not_found(resource));
    };

    match state.store.delete_by_id(resource, id).await {
        Ok(0) => Err(record_not_found(resource)),
        Ok(_) => Ok(StatusCode::NO_CONTENT),
        Err(e) => {
            tracing::error!("delete failed for {} id {}: {}", resource.kind, id, e);
            Err(ApiError::internal_server_error(format!(
                "Unable to delete {} record. Please try again later.",
                resource.kind
            )))
        }
    }
}

fn record_not_found(resource: &Resource) -> ApiError {
    ApiError::not_found(format!("Requested {} record does not exist", resource.kind))
}

fn fetch_failure(resource: &Resource) -> ApiError {
    ApiError::internal_server_error(format!(
        "Error fetching {} records. Please try again later.",
        resource.kind
    ))
}

/// Self link for a single record, keyed by resource kind.
fn record_links(kind: &str, id: i64) -> Value {
    let mut links = Map::new();
    links.insert(kind.to_string(), json!(format!("/{}/{}", kind, id)));
    Value::Object(links)
}
