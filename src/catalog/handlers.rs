use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use serde_json::json;
use tracing::instrument;
use uuid::Uuid;

use crate::catalog::repo;
use crate::error::AppError;
use crate::inventory::repo as inventory_repo;
use crate::inventory::repo::Tire;
use crate::state::AppState;

/// Customer-facing view of a tire: retail price and availability only, no
/// wholesale or supplier data.
#[derive(Debug, Serialize)]
pub struct TireOffer {
    pub id: Uuid,
    pub brand: String,
    pub model: String,
    pub size: String,
    #[serde(rename = "type")]
    pub tire_type: String,
    pub retail_price: f64,
    pub quantity_in_stock: i32,
    pub in_stock: bool,
    pub description: Option<String>,
    pub warranty_months: Option<i32>,
    pub speed_rating: Option<String>,
    pub load_index: Option<String>,
    pub special_order_available: bool,
}

impl From<Tire> for TireOffer {
    fn from(t: Tire) -> Self {
        Self {
            id: t.id,
            brand: t.brand,
            model: t.model,
            size: t.size,
            tire_type: t.tire_type,
            retail_price: t.retail_price,
            in_stock: t.quantity_in_stock > 0,
            quantity_in_stock: t.quantity_in_stock,
            description: t.description,
            warranty_months: t.warranty_months,
            speed_rating: t.speed_rating,
            load_index: t.load_index,
            special_order_available: t.special_order_available,
        }
    }
}

pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/api/vehicle-makes", get(vehicle_makes))
        .route("/api/vehicle-models/:make", get(vehicle_models))
        .route("/api/vehicle-years/:make/:model", get(vehicle_years))
        .route("/api/tire-size/:make/:model/:year", get(vehicle_tire_size))
        // Tire sizes contain a slash ("225/45R17"), so the tail is a wildcard.
        .route("/api/tires-by-size/*size", get(tires_by_size))
}

#[instrument(skip(state))]
pub async fn vehicle_makes(
    State(state): State<AppState>,
) -> Result<Json<Vec<String>>, AppError> {
    Ok(Json(repo::distinct_makes(&state.db).await?))
}

#[instrument(skip(state))]
pub async fn vehicle_models(
    State(state): State<AppState>,
    Path(make): Path<String>,
) -> Result<Json<Vec<String>>, AppError> {
    Ok(Json(repo::models_for_make(&state.db, &make).await?))
}

#[instrument(skip(state))]
pub async fn vehicle_years(
    State(state): State<AppState>,
    Path((make, model)): Path<(String, String)>,
) -> Result<Json<Vec<i32>>, AppError> {
    Ok(Json(repo::years_for_model(&state.db, &make, &model).await?))
}

#[instrument(skip(state))]
pub async fn vehicle_tire_size(
    State(state): State<AppState>,
    Path((make, model, year)): Path<(String, String, i32)>,
) -> Result<Json<serde_json::Value>, AppError> {
    let size = repo::size_for_vehicle(&state.db, &make, &model, year)
        .await?
        .ok_or(AppError::NotFound("vehicle"))?;
    Ok(Json(json!({ "tire_size": size })))
}

#[instrument(skip(state))]
pub async fn tires_by_size(
    State(state): State<AppState>,
    Path(size): Path<String>,
) -> Result<Json<Vec<TireOffer>>, AppError> {
    let tires = inventory_repo::find_by_size(&state.db, &size).await?;
    Ok(Json(tires.into_iter().map(Into::into).collect()))
}
