use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::inventory::dto::CreateTire;

/// Tire catalog record as stored.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Tire {
    pub id: Uuid,
    pub brand: String,
    pub model: String,
    pub size: String,
    pub tire_type: String,
    pub wholesale_price: f64,
    pub retail_price: f64,
    pub supplier: String,
    pub supplier_contact: Option<String>,
    pub supplier_part_number: Option<String>,
    pub quantity_in_stock: i32,
    pub reorder_level: i32,
    pub warehouse_location: Option<String>,
    pub description: Option<String>,
    pub warranty_months: Option<i32>,
    pub speed_rating: Option<String>,
    pub load_index: Option<String>,
    pub special_order_available: bool,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl Tire {
    /// Computed on read, never stored.
    pub fn low_stock(&self) -> bool {
        self.quantity_in_stock <= self.reorder_level
    }
}

pub async fn list_all(db: &PgPool) -> anyhow::Result<Vec<Tire>> {
    let rows = sqlx::query_as::<_, Tire>(
        r#"
        SELECT id, brand, model, size, tire_type, wholesale_price, retail_price,
               supplier, supplier_contact, supplier_part_number,
               quantity_in_stock, reorder_level, warehouse_location, description,
               warranty_months, speed_rating, load_index, special_order_available,
               created_at, updated_at
        FROM tires
        ORDER BY brand, model
        "#,
    )
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn find(db: &PgPool, id: Uuid) -> anyhow::Result<Option<Tire>> {
    let tire = sqlx::query_as::<_, Tire>(
        r#"
        SELECT id, brand, model, size, tire_type, wholesale_price, retail_price,
               supplier, supplier_contact, supplier_part_number,
               quantity_in_stock, reorder_level, warehouse_location, description,
               warranty_months, speed_rating, load_index, special_order_available,
               created_at, updated_at
        FROM tires
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(db)
    .await?;
    Ok(tire)
}

pub async fn find_by_size(db: &PgPool, size: &str) -> anyhow::Result<Vec<Tire>> {
    let rows = sqlx::query_as::<_, Tire>(
        r#"
        SELECT id, brand, model, size, tire_type, wholesale_price, retail_price,
               supplier, supplier_contact, supplier_part_number,
               quantity_in_stock, reorder_level, warehouse_location, description,
               warranty_months, speed_rating, load_index, special_order_available,
               created_at, updated_at
        FROM tires
        WHERE size = $1
        ORDER BY brand, model
        "#,
    )
    .bind(size)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn insert(db: &PgPool, fields: &CreateTire) -> anyhow::Result<Tire> {
    let tire = sqlx::query_as::<_, Tire>(
        r#"
        INSERT INTO tires (brand, model, size, tire_type, wholesale_price, retail_price,
                           supplier, supplier_contact, supplier_part_number,
                           quantity_in_stock, reorder_level, warehouse_location,
                           description, warranty_months, speed_rating, load_index,
                           special_order_available)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
        RETURNING id, brand, model, size, tire_type, wholesale_price, retail_price,
                  supplier, supplier_contact, supplier_part_number,
                  quantity_in_stock, reorder_level, warehouse_location, description,
                  warranty_months, speed_rating, load_index, special_order_available,
                  created_at, updated_at
        "#,
    )
    .bind(&fields.brand)
    .bind(&fields.model)
    .bind(&fields.size)
    .bind(&fields.tire_type)
    .bind(fields.wholesale_price)
    .bind(fields.retail_price)
    .bind(&fields.supplier)
    .bind(&fields.supplier_contact)
    .bind(&fields.supplier_part_number)
    .bind(fields.quantity_in_stock)
    .bind(fields.reorder_level)
    .bind(&fields.warehouse_location)
    .bind(&fields.description)
    .bind(fields.warranty_months)
    .bind(&fields.speed_rating)
    .bind(&fields.load_index)
    .bind(fields.special_order_available)
    .fetch_one(db)
    .await?;
    Ok(tire)
}

/// Persist a fully-merged record in a single statement, so concurrent edits
/// resolve as last-write-wins at the granularity of one update call.
pub async fn update(db: &PgPool, tire: &Tire) -> anyhow::Result<Tire> {
    let tire = sqlx::query_as::<_, Tire>(
        r#"
        UPDATE tires
        SET brand = $2, model = $3, size = $4, tire_type = $5,
            wholesale_price = $6, retail_price = $7, supplier = $8,
            supplier_contact = $9, supplier_part_number = $10,
            quantity_in_stock = $11, reorder_level = $12, warehouse_location = $13,
            description = $14, warranty_months = $15, speed_rating = $16,
            load_index = $17, special_order_available = $18, updated_at = now()
        WHERE id = $1
        RETURNING id, brand, model, size, tire_type, wholesale_price, retail_price,
                  supplier, supplier_contact, supplier_part_number,
                  quantity_in_stock, reorder_level, warehouse_location, description,
                  warranty_months, speed_rating, load_index, special_order_available,
                  created_at, updated_at
        "#,
    )
    .bind(tire.id)
    .bind(&tire.brand)
    .bind(&tire.model)
    .bind(&tire.size)
    .bind(&tire.tire_type)
    .bind(tire.wholesale_price)
    .bind(tire.retail_price)
    .bind(&tire.supplier)
    .bind(&tire.supplier_contact)
    .bind(&tire.supplier_part_number)
    .bind(tire.quantity_in_stock)
    .bind(tire.reorder_level)
    .bind(&tire.warehouse_location)
    .bind(&tire.description)
    .bind(tire.warranty_months)
    .bind(&tire.speed_rating)
    .bind(&tire.load_index)
    .bind(tire.special_order_available)
    .fetch_one(db)
    .await?;
    Ok(tire)
}

/// Returns false when the id did not exist.
pub async fn delete(db: &PgPool, id: Uuid) -> anyhow::Result<bool> {
    let result = sqlx::query("DELETE FROM tires WHERE id = $1")
        .bind(id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}
