use anyhow::Context;
use serde::{Deserialize, Serialize};
use sqlx::{Executor, FromRow, PgPool, Postgres, Transaction};
use time::{Date, OffsetDateTime, Time};
use uuid::Uuid;

/// A bookable shop service.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ServiceItem {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub duration_minutes: i32,
    pub price: f64,
    pub max_concurrent: i32,
    pub active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Appointment {
    pub id: Uuid,
    pub customer_name: String,
    pub customer_phone: String,
    pub car_make: String,
    pub car_model: String,
    pub scheduled_date: Date,
    pub scheduled_time: Time,
    pub total_duration_minutes: i32,
    pub total_price: f64,
    pub status: String,
    pub notes: Option<String>,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, FromRow)]
pub struct AppointmentItem {
    pub id: Uuid,
    pub appointment_id: Uuid,
    pub service_item_id: Uuid,
    pub quantity: i32,
    pub duration_minutes: i32,
    pub price: f64,
}

pub async fn active_service_items(db: &PgPool) -> anyhow::Result<Vec<ServiceItem>> {
    let items = sqlx::query_as::<_, ServiceItem>(
        r#"
        SELECT id, name, description, duration_minutes, price, max_concurrent, active
        FROM service_items
        WHERE active
        ORDER BY name
        "#,
    )
    .fetch_all(db)
    .await?;
    Ok(items)
}

pub async fn service_items_by_ids(db: &PgPool, ids: &[Uuid]) -> anyhow::Result<Vec<ServiceItem>> {
    let items = sqlx::query_as::<_, ServiceItem>(
        r#"
        SELECT id, name, description, duration_minutes, price, max_concurrent, active
        FROM service_items
        WHERE id = ANY($1)
        "#,
    )
    .bind(ids)
    .fetch_all(db)
    .await?;
    Ok(items)
}

/// All scheduled appointments on a date, each with its line items.
pub async fn scheduled_on(
    db: &PgPool,
    date: Date,
) -> anyhow::Result<Vec<(Appointment, Vec<AppointmentItem>)>> {
    let appointments = sqlx::query_as::<_, Appointment>(
        r#"
        SELECT id, customer_name, customer_phone, car_make, car_model,
               scheduled_date, scheduled_time, total_duration_minutes, total_price,
               status, notes, created_at
        FROM appointments
        WHERE scheduled_date = $1 AND status = 'scheduled'
        "#,
    )
    .bind(date)
    .fetch_all(db)
    .await?;

    let ids: Vec<Uuid> = appointments.iter().map(|a| a.id).collect();
    let items = sqlx::query_as::<_, AppointmentItem>(
        r#"
        SELECT id, appointment_id, service_item_id, quantity, duration_minutes, price
        FROM appointment_items
        WHERE appointment_id = ANY($1)
        "#,
    )
    .bind(&ids)
    .fetch_all(db)
    .await?;

    Ok(appointments
        .into_iter()
        .map(|a| {
            let own: Vec<AppointmentItem> = items
                .iter()
                .filter(|i| i.appointment_id == a.id)
                .cloned()
                .collect();
            (a, own)
        })
        .collect())
}

pub struct NewAppointment<'a> {
    pub customer_name: &'a str,
    pub customer_phone: &'a str,
    pub car_make: &'a str,
    pub car_model: &'a str,
    pub scheduled_date: Date,
    pub scheduled_time: Time,
    pub total_duration_minutes: i32,
    pub total_price: f64,
    pub notes: Option<&'a str>,
}

pub async fn insert_appointment_tx(
    tx: &mut Transaction<'_, Postgres>,
    new: &NewAppointment<'_>,
) -> anyhow::Result<Appointment> {
    let appointment = sqlx::query_as::<_, Appointment>(
        r#"
        INSERT INTO appointments (customer_name, customer_phone, car_make, car_model,
                                  scheduled_date, scheduled_time, total_duration_minutes,
                                  total_price, notes)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING id, customer_name, customer_phone, car_make, car_model,
                  scheduled_date, scheduled_time, total_duration_minutes, total_price,
                  status, notes, created_at
        "#,
    )
    .bind(new.customer_name)
    .bind(new.customer_phone)
    .bind(new.car_make)
    .bind(new.car_model)
    .bind(new.scheduled_date)
    .bind(new.scheduled_time)
    .bind(new.total_duration_minutes)
    .bind(new.total_price)
    .bind(new.notes)
    .fetch_one(&mut **tx)
    .await
    .context("insert appointment")?;
    Ok(appointment)
}

pub async fn insert_appointment_item_tx(
    tx: &mut Transaction<'_, Postgres>,
    appointment_id: Uuid,
    service_item_id: Uuid,
    quantity: i32,
    duration_minutes: i32,
    price: f64,
) -> anyhow::Result<()> {
    tx.execute(
        sqlx::query(
            r#"
            INSERT INTO appointment_items (appointment_id, service_item_id, quantity,
                                           duration_minutes, price)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(appointment_id)
        .bind(service_item_id)
        .bind(quantity)
        .bind(duration_minutes)
        .bind(price),
    )
    .await
    .context("insert appointment item")?;
    Ok(())
}
