use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

/// Vehicle to tire size mapping.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct VehicleTireSize {
    pub id: Uuid,
    pub make: String,
    pub model: String,
    pub year: i32,
    pub tire_size: String,
}

pub async fn distinct_makes(db: &PgPool) -> anyhow::Result<Vec<String>> {
    let makes = sqlx::query_scalar::<_, String>(
        "SELECT DISTINCT make FROM vehicle_tire_sizes ORDER BY make",
    )
    .fetch_all(db)
    .await?;
    Ok(makes)
}

pub async fn models_for_make(db: &PgPool, make: &str) -> anyhow::Result<Vec<String>> {
    let models = sqlx::query_scalar::<_, String>(
        "SELECT DISTINCT model FROM vehicle_tire_sizes WHERE make = $1 ORDER BY model",
    )
    .bind(make)
    .fetch_all(db)
    .await?;
    Ok(models)
}

pub async fn years_for_model(db: &PgPool, make: &str, model: &str) -> anyhow::Result<Vec<i32>> {
    let years = sqlx::query_scalar::<_, i32>(
        r#"
        SELECT DISTINCT year FROM vehicle_tire_sizes
        WHERE make = $1 AND model = $2
        ORDER BY year DESC
        "#,
    )
    .bind(make)
    .bind(model)
    .fetch_all(db)
    .await?;
    Ok(years)
}

pub async fn size_for_vehicle(
    db: &PgPool,
    make: &str,
    model: &str,
    year: i32,
) -> anyhow::Result<Option<String>> {
    let size = sqlx::query_scalar::<_, String>(
        r#"
        SELECT tire_size FROM vehicle_tire_sizes
        WHERE make = $1 AND model = $2 AND year = $3
        "#,
    )
    .bind(make)
    .bind(model)
    .bind(year)
    .fetch_optional(db)
    .await?;
    Ok(size)
}
