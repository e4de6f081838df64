use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tracing::instrument;
use uuid::Uuid;

use crate::auth::extractors::CurrentUser;
use crate::auth::rbac::{require, Operation};
use crate::error::AppError;
use crate::inventory::dto::{CreateTire, DashboardSummary, TireView, UpdateTire};
use crate::inventory::services;
use crate::state::AppState;

pub fn inventory_routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(dashboard))
        .route("/inventory", get(list_inventory))
        .route("/tire/add", get(add_tire_form).post(add_tire))
        .route("/tire/:id/edit", get(edit_tire_form).post(edit_tire))
        .route("/tire/:id/delete", post(delete_tire))
}

// Each handler composes the chain explicitly: session extraction, then the
// role guard, then the service call. The service re-checks the guard on its
// own; the visible call here documents the contract at the call site.

#[instrument(skip(state, ctx))]
pub async fn dashboard(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
) -> Result<Json<DashboardSummary>, AppError> {
    require(ctx.role, Operation::ViewInventory)?;
    let summary = services::dashboard_summary(&state.db, &ctx).await?;
    Ok(Json(summary))
}

#[instrument(skip(state, ctx))]
pub async fn list_inventory(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
) -> Result<Json<Vec<TireView>>, AppError> {
    require(ctx.role, Operation::ViewInventory)?;
    let tires = services::list_inventory(&state.db, &ctx).await?;
    Ok(Json(tires.into_iter().map(Into::into).collect()))
}

/// Context for the add-tire form.
#[instrument(skip(ctx))]
pub async fn add_tire_form(
    CurrentUser(ctx): CurrentUser,
) -> Result<Json<serde_json::Value>, AppError> {
    require(ctx.role, Operation::AddTire)?;
    Ok(Json(json!({
        "page": "add_tire",
        "types": ["All-Season", "Winter", "Summer", "Performance"],
    })))
}

#[instrument(skip(state, ctx, payload))]
pub async fn add_tire(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
    Json(payload): Json<CreateTire>,
) -> Result<(StatusCode, Json<TireView>), AppError> {
    require(ctx.role, Operation::AddTire)?;
    let tire = services::create_tire(&state.db, &ctx, payload).await?;
    Ok((StatusCode::CREATED, Json(tire.into())))
}

/// Context for the edit form: the current record.
#[instrument(skip(state, ctx))]
pub async fn edit_tire_form(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    require(ctx.role, Operation::EditTire)?;
    let tire = services::get_tire(&state.db, &ctx, id).await?;
    Ok(Json(json!({
        "page": "edit_tire",
        "types": ["All-Season", "Winter", "Summer", "Performance"],
        "tire": TireView::from(tire),
    })))
}

#[instrument(skip(state, ctx, payload))]
pub async fn edit_tire(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateTire>,
) -> Result<Json<TireView>, AppError> {
    require(ctx.role, Operation::EditTire)?;
    let tire = services::update_tire(&state.db, &ctx, id, payload).await?;
    Ok(Json(tire.into()))
}

#[instrument(skip(state, ctx))]
pub async fn delete_tire(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    require(ctx.role, Operation::DeleteTire)?;
    services::delete_tire(&state.db, &ctx, id).await?;
    Ok(Json(json!({ "status": "deleted" })))
}
