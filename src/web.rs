//! HTTP surface for the property store.
//!
//! Every handler follows the same path: extract, validate, call into
//! `storage` with the shared connection handle, and serialize the result or
//! the `ChikaError` it produced.
use crate::errors::ChikaError;
use crate::schemas::{Property, PropertyCreate, PropertyFilter, ValidationError};
use crate::settings::Settings;
use crate::storage;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use miette::IntoDiagnostic;
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub db: DatabaseConnection,
}

impl AppState {
    pub fn new(settings: Settings, db: DatabaseConnection) -> Self {
        Self {
            settings: Arc::new(settings),
            db,
        }
    }

    /// Apply the configured default and upper bound to a requested page size.
    fn resolve_limit(&self, requested: Option<i64>) -> Result<i64, ValidationError> {
        let api = &self.settings.api;
        let limit = requested.unwrap_or(api.default_limit);
        match api.max_limit {
            Some(max) if limit > max => Err(ValidationError::single(
                &["query", "limit"],
                "less_than_equal",
                format!("Input should be less than or equal to {max}"),
            )),
            _ => Ok(limit),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/properties", get(list_properties).post(create_property))
        .route("/properties/", get(list_properties).post(create_property))
        .route("/properties/search", get(search_properties))
        .route(
            "/properties/{property_id}",
            get(get_property)
                .put(update_property)
                .delete(delete_property),
        )
        .route("/healthz", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn serve(settings: Settings, db: DatabaseConnection) -> miette::Result<()> {
    let addr: SocketAddr = settings
        .listen_addr()
        .parse()
        .map_err(|e| miette::miette!("bad listen addr: {e}"))?;

    let app = router(AppState::new(settings, db));

    tracing::info!(%addr, "Property API listening");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .into_diagnostic()?;
    axum::serve(listener, app).await.into_diagnostic()?;
    Ok(())
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    #[serde(default, alias = "offset")]
    skip: Option<i64>,
    #[serde(default)]
    limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    min_price: Option<f64>,
    #[serde(default)]
    max_price: Option<f64>,
    #[serde(default, alias = "offset")]
    skip: Option<i64>,
    #[serde(default)]
    limit: Option<i64>,
}

fn query_error(rejection: QueryRejection) -> ChikaError {
    ValidationError::single(&["query"], "query_parsing", rejection.body_text()).into()
}

fn path_error(rejection: PathRejection) -> ChikaError {
    ValidationError::single(&["path", "property_id"], "int_parsing", rejection.body_text()).into()
}

fn body_error(rejection: JsonRejection) -> ChikaError {
    ValidationError::single(&["body"], "json_invalid", rejection.body_text()).into()
}

async fn list_properties(
    State(state): State<AppState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<Vec<Property>>, ChikaError> {
    let Query(q) = query.map_err(query_error)?;
    let limit = state.resolve_limit(q.limit)?;
    let rows = storage::list_properties(&state.db, q.skip.unwrap_or(0), limit).await?;
    Ok(Json(rows))
}

async fn search_properties(
    State(state): State<AppState>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> Result<Json<Vec<Property>>, ChikaError> {
    let Query(q) = query.map_err(query_error)?;
    let limit = state.resolve_limit(q.limit)?;
    let filter = PropertyFilter {
        name: q.name,
        min_price: q.min_price,
        max_price: q.max_price,
    };
    let rows = storage::search_properties(&state.db, &filter, q.skip.unwrap_or(0), limit).await?;
    Ok(Json(rows))
}

async fn get_property(
    State(state): State<AppState>,
    path: Result<Path<i32>, PathRejection>,
) -> Result<Json<Property>, ChikaError> {
    let Path(id) = path.map_err(path_error)?;
    storage::get_property(&state.db, id)
        .await?
        .map(Json)
        .ok_or(ChikaError::NotFound(id))
}

async fn create_property(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Property>), ChikaError> {
    let Json(body) = body.map_err(body_error)?;
    let input = PropertyCreate::from_json(&body)?;
    let created = storage::create_property(&state.db, input).await?;
    tracing::info!(id = created.id, name = %created.name, "property created");
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_property(
    State(state): State<AppState>,
    path: Result<Path<i32>, PathRejection>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Property>, ChikaError> {
    let Path(id) = path.map_err(path_error)?;
    let Json(body) = body.map_err(body_error)?;
    let input = PropertyCreate::from_json(&body)?;
    storage::update_property(&state.db, id, input)
        .await?
        .map(Json)
        .ok_or(ChikaError::NotFound(id))
}

async fn delete_property(
    State(state): State<AppState>,
    path: Result<Path<i32>, PathRejection>,
) -> Result<StatusCode, ChikaError> {
    let Path(id) = path.map_err(path_error)?;
    if storage::delete_property(&state.db, id).await? {
        tracing::info!(id, "property deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ChikaError::NotFound(id))
    }
}

async fn health() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}
