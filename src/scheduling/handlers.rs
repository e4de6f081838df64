use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use crate::error::AppError;
use crate::scheduling::dto::{
    AppointmentCreated, AvailabilityRequest, AvailabilityResponse, CreateAppointment,
    ServiceItemView,
};
use crate::scheduling::services;
use crate::state::AppState;

pub fn scheduling_routes() -> Router<AppState> {
    Router::new()
        .route("/api/service-items", get(list_service_items))
        .route("/api/check-availability", post(check_availability))
        .route("/api/appointments", post(create_appointment))
}

#[instrument(skip(state))]
pub async fn list_service_items(
    State(state): State<AppState>,
) -> Result<Json<Vec<ServiceItemView>>, AppError> {
    let items = services::list_service_items(&state.db).await?;
    Ok(Json(items.into_iter().map(Into::into).collect()))
}

#[instrument(skip(state, payload))]
pub async fn check_availability(
    State(state): State<AppState>,
    Json(payload): Json<AvailabilityRequest>,
) -> Result<Json<AvailabilityResponse>, AppError> {
    let response = services::check_availability(&state.db, payload).await?;
    Ok(Json(response))
}

#[instrument(skip(state, payload))]
pub async fn create_appointment(
    State(state): State<AppState>,
    Json(payload): Json<CreateAppointment>,
) -> Result<(StatusCode, Json<AppointmentCreated>), AppError> {
    let appointment = services::create_appointment(&state.db, payload).await?;
    Ok((StatusCode::CREATED, Json(appointment.into())))
}
