use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::inventory::repo::Tire;

/// Fields for a new tire. The presentation layer speaks "type"; the column
/// and struct field are `tire_type`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTire {
    pub brand: String,
    pub model: String,
    pub size: String,
    #[serde(rename = "type")]
    pub tire_type: String,
    pub wholesale_price: f64,
    pub retail_price: f64,
    pub supplier: String,
    #[serde(default)]
    pub supplier_contact: Option<String>,
    #[serde(default)]
    pub supplier_part_number: Option<String>,
    #[serde(default)]
    pub quantity_in_stock: i32,
    #[serde(default = "default_reorder_level")]
    pub reorder_level: i32,
    #[serde(default)]
    pub warehouse_location: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub warranty_months: Option<i32>,
    #[serde(default)]
    pub speed_rating: Option<String>,
    #[serde(default)]
    pub load_index: Option<String>,
    #[serde(default)]
    pub special_order_available: bool,
}

fn default_reorder_level() -> i32 {
    10
}

/// Partial update: absent fields keep their stored values. The merged record
/// is validated as a whole before anything is written.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTire {
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default, rename = "type")]
    pub tire_type: Option<String>,
    #[serde(default)]
    pub wholesale_price: Option<f64>,
    #[serde(default)]
    pub retail_price: Option<f64>,
    #[serde(default)]
    pub supplier: Option<String>,
    #[serde(default)]
    pub supplier_contact: Option<String>,
    #[serde(default)]
    pub supplier_part_number: Option<String>,
    #[serde(default)]
    pub quantity_in_stock: Option<i32>,
    #[serde(default)]
    pub reorder_level: Option<i32>,
    #[serde(default)]
    pub warehouse_location: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub warranty_months: Option<i32>,
    #[serde(default)]
    pub speed_rating: Option<String>,
    #[serde(default)]
    pub load_index: Option<String>,
    #[serde(default)]
    pub special_order_available: Option<bool>,
}

/// A tire as handed to the presentation layer, with the derived low-stock
/// flag attached.
#[derive(Debug, Serialize)]
pub struct TireView {
    pub id: Uuid,
    pub brand: String,
    pub model: String,
    pub size: String,
    #[serde(rename = "type")]
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
    pub low_stock: bool,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl From<Tire> for TireView {
    fn from(t: Tire) -> Self {
        let low_stock = t.low_stock();
        Self {
            id: t.id,
            brand: t.brand,
            model: t.model,
            size: t.size,
            tire_type: t.tire_type,
            wholesale_price: t.wholesale_price,
            retail_price: t.retail_price,
            supplier: t.supplier,
            supplier_contact: t.supplier_contact,
            supplier_part_number: t.supplier_part_number,
            quantity_in_stock: t.quantity_in_stock,
            reorder_level: t.reorder_level,
            warehouse_location: t.warehouse_location,
            description: t.description,
            warranty_months: t.warranty_months,
            speed_rating: t.speed_rating,
            load_index: t.load_index,
            special_order_available: t.special_order_available,
            low_stock,
            created_at: t.created_at,
            updated_at: t.updated_at,
        }
    }
}

/// Dashboard payload, computed fresh on every call.
#[derive(Debug, Serialize)]
pub struct DashboardSummary {
    pub total_items: usize,
    pub total_inventory_value: f64,
    pub low_stock_items: Vec<TireView>,
}
