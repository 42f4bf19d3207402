use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use models::machine_learning_module::Model;
use serde::Deserialize;
use service::machine_learning_module::domain::{ModuleInput, Sort};
use service::pagination::{Page, Pagination, DEFAULT_PAGE_SIZE};
use tracing::info;
use utoipa::IntoParams;

use crate::errors::JsonApiError;
use crate::state::ServerState;

type ApiResult<T> = Result<T, JsonApiError>;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    /// 0-based page index
    pub page: Option<u64>,
    /// page size, 0 selects the default, capped at 100
    pub size: Option<u64>,
    /// `field` or `field,asc|desc`; defaults to `createdAt,desc`
    pub sort: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    /// case-insensitive substring of the name
    pub name: String,
}

#[utoipa::path(
    post, path = "/api/v1/machine-learning-module", tag = "ml-module",
    request_body = crate::openapi::ModuleInputDoc,
    responses(
        (status = 201, description = "Created", body = crate::openapi::ModuleDoc),
        (status = 400, description = "Invalid payload", body = crate::openapi::ErrorDoc),
    )
)]
pub async fn create(
    State(state): State<ServerState>,
    body: Result<Json<Option<ModuleInput>>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Model>)> {
    let Json(input) = body?;
    let created = state.modules.create(input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    get, path = "/api/v1/machine-learning-module/{id}", tag = "ml-module",
    params(("id" = i64, Path, description = "record id")),
    responses(
        (status = 200, description = "Found", body = crate::openapi::ModuleDoc),
        (status = 400, description = "Malformed id", body = crate::openapi::ErrorDoc),
        (status = 404, description = "Not found", body = crate::openapi::ErrorDoc),
    )
)]
pub async fn get(State(state): State<ServerState>, id: Result<Path<i64>, PathRejection>) -> ApiResult<Json<Model>> {
    let Path(id) = id?;
    match state.modules.get(id).await? {
        Some(m) => Ok(Json(m)),
        None => Err(service::errors::ServiceError::not_found("MachineLearningModule", id).into()),
    }
}

#[utoipa::path(
    get, path = "/api/v1/machine-learning-module", tag = "ml-module",
    params(ListQuery),
    responses(
        (status = 200, description = "One page of records", body = crate::openapi::ModulePageDoc),
        (status = 400, description = "Bad paging or sort", body = crate::openapi::ErrorDoc),
    )
)]
pub async fn list(
    State(state): State<ServerState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> ApiResult<Json<Page<Model>>> {
    let Query(q) = query?;
    let sort = match q.sort.as_deref() {
        Some(s) if !s.trim().is_empty() => s.parse::<Sort>()?,
        _ => Sort::default(),
    };
    let pagination = Pagination { page: q.page.unwrap_or(0), size: q.size.unwrap_or(DEFAULT_PAGE_SIZE) };
    let page = state.modules.list(pagination, sort).await?;
    info!(count = page.items.len(), total = page.total_elements, "list ml modules");
    Ok(Json(page))
}

#[utoipa::path(
    put, path = "/api/v1/machine-learning-module/{id}", tag = "ml-module",
    params(("id" = i64, Path, description = "record id")),
    request_body = crate::openapi::ModuleInputDoc,
    responses(
        (status = 200, description = "Updated", body = crate::openapi::ModuleDoc),
        (status = 400, description = "Invalid payload", body = crate::openapi::ErrorDoc),
        (status = 404, description = "Not found", body = crate::openapi::ErrorDoc),
        (status = 409, description = "Stale version", body = crate::openapi::ErrorDoc),
    )
)]
pub async fn update(
    State(state): State<ServerState>,
    id: Result<Path<i64>, PathRejection>,
    body: Result<Json<Option<ModuleInput>>, JsonRejection>,
) -> ApiResult<Json<Model>> {
    let Path(id) = id?;
    let Json(input) = body?;
    let updated = state.modules.update(id, input).await?;
    Ok(Json(updated))
}

#[utoipa::path(
    delete, path = "/api/v1/machine-learning-module/{id}", tag = "ml-module",
    params(("id" = i64, Path, description = "record id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not found", body = crate::openapi::ErrorDoc),
    )
)]
pub async fn delete(State(state): State<ServerState>, id: Result<Path<i64>, PathRejection>) -> ApiResult<StatusCode> {
    let Path(id) = id?;
    state.modules.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get, path = "/api/v1/machine-learning-module/search", tag = "ml-module",
    params(SearchQuery),
    responses(
        (status = 200, description = "Matching records", body = [crate::openapi::ModuleDoc]),
        (status = 400, description = "Missing name", body = crate::openapi::ErrorDoc),
    )
)]
pub async fn search(
    State(state): State<ServerState>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<Model>>> {
    let Query(q) = query?;
    let found = state.modules.search_by_name(&q.name).await?;
    info!(term = %q.name, count = found.len(), "search ml modules");
    Ok(Json(found))
}
