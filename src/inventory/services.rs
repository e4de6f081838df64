use lazy_static::lazy_static;
use regex::Regex;
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::extractors::RequestContext;
use crate::auth::rbac::{require, Operation};
use crate::error::{AppError, FieldError};
use crate::inventory::dto::{CreateTire, DashboardSummary, UpdateTire};
use crate::inventory::repo::{self, Tire};

lazy_static! {
    static ref TIRE_SIZE_RE: Regex = Regex::new(r"^\d{3}/\d{2}R\d{2}$").unwrap();
}

/// The validated shape shared by create and update. Update merges the
/// submitted fields over the stored record first, then validates the whole.
struct Candidate<'a> {
    brand: &'a str,
    model: &'a str,
    size: &'a str,
    tire_type: &'a str,
    supplier: &'a str,
    wholesale_price: f64,
    retail_price: f64,
    quantity_in_stock: i32,
    reorder_level: i32,
    warranty_months: Option<i32>,
}

impl<'a> From<&'a CreateTire> for Candidate<'a> {
    fn from(f: &'a CreateTire) -> Self {
        Self {
            brand: &f.brand,
            model: &f.model,
            size: &f.size,
            tire_type: &f.tire_type,
            supplier: &f.supplier,
            wholesale_price: f.wholesale_price,
            retail_price: f.retail_price,
            quantity_in_stock: f.quantity_in_stock,
            reorder_level: f.reorder_level,
            warranty_months: f.warranty_months,
        }
    }
}

impl<'a> From<&'a Tire> for Candidate<'a> {
    fn from(t: &'a Tire) -> Self {
        Self {
            brand: &t.brand,
            model: &t.model,
            size: &t.size,
            tire_type: &t.tire_type,
            supplier: &t.supplier,
            wholesale_price: t.wholesale_price,
            retail_price: t.retail_price,
            quantity_in_stock: t.quantity_in_stock,
            reorder_level: t.reorder_level,
            warranty_months: t.warranty_months,
        }
    }
}

fn validate(c: &Candidate<'_>) -> Vec<FieldError> {
    let mut errors = Vec::new();

    for (field, value) in [
        ("brand", c.brand),
        ("model", c.model),
        ("size", c.size),
        ("type", c.tire_type),
        ("supplier", c.supplier),
    ] {
        if value.trim().is_empty() {
            errors.push(FieldError::new(field, format!("{field} is required")));
        }
    }

    if !c.wholesale_price.is_finite() || c.wholesale_price < 0.0 {
        errors.push(FieldError::new(
            "wholesale_price",
            "wholesale price must be a non-negative number",
        ));
    }
    if !c.retail_price.is_finite() || c.retail_price < 0.0 {
        errors.push(FieldError::new(
            "retail_price",
            "retail price must be a non-negative number",
        ));
    }
    if c.quantity_in_stock < 0 {
        errors.push(FieldError::new(
            "quantity_in_stock",
            "quantity in stock cannot be negative",
        ));
    }
    if c.reorder_level < 0 {
        errors.push(FieldError::new(
            "reorder_level",
            "reorder level cannot be negative",
        ));
    }
    if matches!(c.warranty_months, Some(w) if w < 0) {
        errors.push(FieldError::new(
            "warranty_months",
            "warranty cannot be negative",
        ));
    }

    errors
}

/// Soft business rules: logged, never rejected.
fn warn_soft_rules(c: &Candidate<'_>) {
    if c.retail_price < c.wholesale_price {
        warn!(
            brand = c.brand,
            model = c.model,
            retail = c.retail_price,
            wholesale = c.wholesale_price,
            "retail price below wholesale price"
        );
    }
    if !c.size.trim().is_empty() && !TIRE_SIZE_RE.is_match(c.size.trim()) {
        warn!(size = c.size, "unusual tire size format");
    }
}

/// Merge a partial update over the stored record. Pure; the caller validates
/// and persists the result.
pub fn apply_update(mut tire: Tire, changes: UpdateTire) -> Tire {
    if let Some(v) = changes.brand {
        tire.brand = v;
    }
    if let Some(v) = changes.model {
        tire.model = v;
    }
    if let Some(v) = changes.size {
        tire.size = v;
    }
    if let Some(v) = changes.tire_type {
        tire.tire_type = v;
    }
    if let Some(v) = changes.wholesale_price {
        tire.wholesale_price = v;
    }
    if let Some(v) = changes.retail_price {
        tire.retail_price = v;
    }
    if let Some(v) = changes.supplier {
        tire.supplier = v;
    }
    if let Some(v) = changes.supplier_contact {
        tire.supplier_contact = Some(v);
    }
    if let Some(v) = changes.supplier_part_number {
        tire.supplier_part_number = Some(v);
    }
    if let Some(v) = changes.quantity_in_stock {
        tire.quantity_in_stock = v;
    }
    if let Some(v) = changes.reorder_level {
        tire.reorder_level = v;
    }
    if let Some(v) = changes.warehouse_location {
        tire.warehouse_location = Some(v);
    }
    if let Some(v) = changes.description {
        tire.description = Some(v);
    }
    if let Some(v) = changes.warranty_months {
        tire.warranty_months = Some(v);
    }
    if let Some(v) = changes.speed_rating {
        tire.speed_rating = Some(v);
    }
    if let Some(v) = changes.load_index {
        tire.load_index = Some(v);
    }
    if let Some(v) = changes.special_order_available {
        tire.special_order_available = v;
    }
    tire
}

/// Fold the full listing into the dashboard payload. Pure.
pub fn summarize(tires: Vec<Tire>) -> DashboardSummary {
    let total_items = tires.len();
    let total_inventory_value = tires
        .iter()
        .map(|t| f64::from(t.quantity_in_stock) * t.wholesale_price)
        .sum();
    let low_stock_items = tires
        .into_iter()
        .filter(|t| t.low_stock())
        .map(Into::into)
        .collect();
    DashboardSummary {
        total_items,
        total_inventory_value,
        low_stock_items,
    }
}

// The service layer re-runs the role guard on every entry point. Handlers
// check too, but a new caller that skips the transport edge still cannot
// reach the store unguarded.

pub async fn list_inventory(db: &PgPool, ctx: &RequestContext) -> Result<Vec<Tire>, AppError> {
    require(ctx.role, Operation::ViewInventory)?;
    Ok(repo::list_all(db).await?)
}

pub async fn get_tire(db: &PgPool, ctx: &RequestContext, id: Uuid) -> Result<Tire, AppError> {
    require(ctx.role, Operation::ViewInventory)?;
    repo::find(db, id).await?.ok_or(AppError::NotFound("tire"))
}

pub async fn create_tire(
    db: &PgPool,
    ctx: &RequestContext,
    fields: CreateTire,
) -> Result<Tire, AppError> {
    require(ctx.role, Operation::AddTire)?;

    let candidate = Candidate::from(&fields);
    let errors = validate(&candidate);
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }
    warn_soft_rules(&candidate);

    let tire = repo::insert(db, &fields).await?;
    info!(
        tire_id = %tire.id,
        brand = %tire.brand,
        model = %tire.model,
        user_id = %ctx.user_id,
        "tire added"
    );
    Ok(tire)
}

pub async fn update_tire(
    db: &PgPool,
    ctx: &RequestContext,
    id: Uuid,
    changes: UpdateTire,
) -> Result<Tire, AppError> {
    require(ctx.role, Operation::EditTire)?;

    let current = repo::find(db, id).await?.ok_or(AppError::NotFound("tire"))?;
    let merged = apply_update(current, changes);

    let candidate = Candidate::from(&merged);
    let errors = validate(&candidate);
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }
    warn_soft_rules(&candidate);

    let tire = repo::update(db, &merged).await?;
    info!(tire_id = %tire.id, user_id = %ctx.user_id, "tire updated");
    Ok(tire)
}

pub async fn delete_tire(db: &PgPool, ctx: &RequestContext, id: Uuid) -> Result<(), AppError> {
    require(ctx.role, Operation::DeleteTire)?;

    if !repo::delete(db, id).await? {
        return Err(AppError::NotFound("tire"));
    }
    info!(tire_id = %id, user_id = %ctx.user_id, "tire deleted");
    Ok(())
}

pub async fn dashboard_summary(
    db: &PgPool,
    ctx: &RequestContext,
) -> Result<DashboardSummary, AppError> {
    require(ctx.role, Operation::ViewInventory)?;
    let tires = repo::list_all(db).await?;
    Ok(summarize(tires))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::rbac::Role;
    use time::OffsetDateTime;

    fn sample_tire() -> Tire {
        Tire {
            id: Uuid::new_v4(),
            brand: "Michelin".into(),
            model: "Pilot Sport 4S".into(),
            size: "245/40R18".into(),
            tire_type: "Performance".into(),
            wholesale_price: 180.0,
            retail_price: 299.99,
            supplier: "Michelin Distribution".into(),
            supplier_contact: Some("1-800-MICHELIN".into()),
            supplier_part_number: Some("MICH-PS4S-245-40-18".into()),
            quantity_in_stock: 24,
            reorder_level: 10,
            warehouse_location: None,
            description: None,
            warranty_months: Some(36),
            speed_rating: Some("Y".into()),
            load_index: Some("97".into()),
            special_order_available: false,
            created_at: OffsetDateTime::UNIX_EPOCH,
            updated_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    fn ctx(role: Role) -> RequestContext {
        RequestContext {
            session_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            username: role.as_str().into(),
            role,
        }
    }

    #[test]
    fn valid_record_passes() {
        assert!(validate(&Candidate::from(&sample_tire())).is_empty());
    }

    #[test]
    fn negative_prices_and_stock_are_rejected() {
        let mut tire = sample_tire();
        tire.wholesale_price = -1.0;
        tire.quantity_in_stock = -3;
        let errors = validate(&Candidate::from(&tire));
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert!(fields.contains(&"wholesale_price"));
        assert!(fields.contains(&"quantity_in_stock"));
    }

    #[test]
    fn non_finite_price_is_rejected() {
        let mut tire = sample_tire();
        tire.retail_price = f64::NAN;
        let errors = validate(&Candidate::from(&tire));
        assert!(errors.iter().any(|e| e.field == "retail_price"));
    }

    #[test]
    fn blank_identifying_fields_are_rejected() {
        let mut tire = sample_tire();
        tire.brand = "  ".into();
        tire.tire_type = String::new();
        let errors = validate(&Candidate::from(&tire));
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert!(fields.contains(&"brand"));
        assert!(fields.contains(&"type"));
    }

    #[test]
    fn retail_below_wholesale_is_not_an_error() {
        let mut tire = sample_tire();
        tire.retail_price = 10.0;
        assert!(validate(&Candidate::from(&tire)).is_empty());
    }

    #[test]
    fn apply_update_merges_only_submitted_fields() {
        let tire = sample_tire();
        let changes = UpdateTire {
            quantity_in_stock: Some(5),
            warehouse_location: Some("Warehouse B".into()),
            ..Default::default()
        };
        let merged = apply_update(tire.clone(), changes);
        assert_eq!(merged.quantity_in_stock, 5);
        assert_eq!(merged.warehouse_location.as_deref(), Some("Warehouse B"));
        assert_eq!(merged.brand, tire.brand);
        assert_eq!(merged.retail_price, tire.retail_price);
    }

    #[test]
    fn merged_negative_stock_fails_validation() {
        let merged = apply_update(
            sample_tire(),
            UpdateTire {
                quantity_in_stock: Some(-1),
                ..Default::default()
            },
        );
        let errors = validate(&Candidate::from(&merged));
        assert!(errors.iter().any(|e| e.field == "quantity_in_stock"));
    }

    #[test]
    fn summary_counts_value_and_low_stock() {
        let mut a = sample_tire();
        a.quantity_in_stock = 2;
        a.reorder_level = 10; // low
        a.wholesale_price = 100.0;
        let mut b = sample_tire();
        b.quantity_in_stock = 40;
        b.reorder_level = 10;
        b.wholesale_price = 50.0;
        let low_id = a.id;

        let summary = summarize(vec![a, b]);
        assert_eq!(summary.total_items, 2);
        assert_eq!(summary.total_inventory_value, 2.0 * 100.0 + 40.0 * 50.0);
        assert_eq!(summary.low_stock_items.len(), 1);
        assert_eq!(summary.low_stock_items[0].id, low_id);
    }

    #[test]
    fn stock_at_reorder_level_counts_as_low() {
        let mut tire = sample_tire();
        tire.quantity_in_stock = 10;
        tire.reorder_level = 10;
        assert!(tire.low_stock());
        tire.quantity_in_stock = 11;
        assert!(!tire.low_stock());
    }

    #[tokio::test]
    async fn sales_role_cannot_delete() {
        // The guard trips before any query, so the lazy pool never connects.
        let state = crate::state::AppState::fake();
        let err = delete_tire(&state.db, &ctx(Role::Sales), Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden));
    }

    #[tokio::test]
    async fn accounting_role_cannot_create() {
        let state = crate::state::AppState::fake();
        let fields = CreateTire {
            brand: "Pirelli".into(),
            model: "P Zero".into(),
            size: "245/40R18".into(),
            tire_type: "Performance".into(),
            wholesale_price: 175.0,
            retail_price: 289.99,
            supplier: "Pirelli Distribution".into(),
            supplier_contact: None,
            supplier_part_number: None,
            quantity_in_stock: 18,
            reorder_level: 8,
            warehouse_location: None,
            description: None,
            warranty_months: Some(30),
            speed_rating: None,
            load_index: None,
            special_order_available: false,
        };
        let err = create_tire(&state.db, &ctx(Role::Accounting), fields)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden));
    }
}
