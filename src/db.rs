use sqlx::PgPool;
use tracing::{info, warn};

use crate::auth::password::hash_password;
use crate::auth::rbac::Role;
use crate::auth::repo_types::User;
use crate::auth::services::is_valid_email;
use crate::inventory::dto::CreateTire;
use crate::inventory::repo as inventory_repo;

/// Populate an empty database with the demo accounts and sample data so a
/// fresh deployment is immediately usable.
pub async fn seed_if_empty(db: &PgPool) -> anyhow::Result<()> {
    let users: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(db)
        .await?;
    if users == 0 {
        seed_users(db).await?;
        seed_tires(db).await?;
        seed_vehicle_sizes(db).await?;
        info!("seeded demo accounts and sample inventory");
    }

    let services: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM service_items")
        .fetch_one(db)
        .await?;
    if services == 0 {
        seed_service_items(db).await?;
        info!("seeded service items");
    }

    Ok(())
}

const DEMO_ACCOUNTS: [(&str, &str, &str, Role); 3] = [
    ("admin", "admin@tirestore.com", "admin123", Role::Admin),
    ("sales", "sales@tirestore.com", "sales123", Role::Sales),
    (
        "accounting",
        "accounting@tirestore.com",
        "accounting123",
        Role::Accounting,
    ),
];

async fn seed_users(db: &PgPool) -> anyhow::Result<()> {
    for (username, email, password, role) in DEMO_ACCOUNTS {
        anyhow::ensure!(is_valid_email(email), "bad seed email {email}");
        let hash = hash_password(password)?;
        User::create(db, username, email, &hash, role).await?;
    }
    warn!("demo accounts use default passwords; rotate them outside development");
    Ok(())
}

async fn seed_tires(db: &PgPool) -> anyhow::Result<()> {
    let tires = vec![
        CreateTire {
            brand: "Michelin".into(),
            model: "Pilot Sport 4S".into(),
            size: "245/40R18".into(),
            tire_type: "Performance".into(),
            wholesale_price: 180.00,
            retail_price: 299.99,
            supplier: "Michelin Distribution".into(),
            supplier_contact: Some("1-800-MICHELIN".into()),
            supplier_part_number: Some("MICH-PS4S-245-40-18".into()),
            quantity_in_stock: 24,
            reorder_level: 10,
            warehouse_location: Some("Warehouse A - Aisle 3 - Shelf B".into()),
            description: Some("Ultra-high performance summer tire".into()),
            warranty_months: Some(36),
            speed_rating: Some("Y".into()),
            load_index: Some("97".into()),
            special_order_available: false,
        },
        CreateTire {
            brand: "Bridgestone".into(),
            model: "Blizzak WS90".into(),
            size: "225/60R17".into(),
            tire_type: "Winter".into(),
            wholesale_price: 120.00,
            retail_price: 199.99,
            supplier: "Bridgestone Wholesale".into(),
            supplier_contact: Some("1-800-BRIDGESTONE".into()),
            supplier_part_number: Some("BS-WS90-225-60-17".into()),
            quantity_in_stock: 36,
            reorder_level: 15,
            warehouse_location: Some("Warehouse B - Aisle 1 - Shelf A".into()),
            description: Some("Premium winter tire with excellent ice traction".into()),
            warranty_months: Some(48),
            speed_rating: Some("T".into()),
            load_index: Some("99".into()),
            special_order_available: false,
        },
        CreateTire {
            brand: "Goodyear".into(),
            model: "Assurance WeatherReady".into(),
            size: "215/55R17".into(),
            tire_type: "All-Season".into(),
            wholesale_price: 95.00,
            retail_price: 159.99,
            supplier: "Goodyear Direct".into(),
            supplier_contact: Some("1-800-GOODYEAR".into()),
            supplier_part_number: Some("GY-AWR-215-55-17".into()),
            quantity_in_stock: 48,
            reorder_level: 20,
            warehouse_location: Some("Warehouse A - Aisle 5 - Shelf C".into()),
            description: Some("All-weather tire for year-round performance".into()),
            warranty_months: Some(60),
            speed_rating: Some("H".into()),
            load_index: Some("94".into()),
            special_order_available: false,
        },
        CreateTire {
            brand: "Goodyear".into(),
            model: "Eagle F1 Asymmetric".into(),
            size: "225/45R18".into(),
            tire_type: "Performance".into(),
            wholesale_price: 130.00,
            retail_price: 219.99,
            supplier: "Goodyear Direct".into(),
            supplier_contact: Some("1-800-GOODYEAR".into()),
            supplier_part_number: Some("GY-EF1A-225-45-18".into()),
            quantity_in_stock: 0,
            reorder_level: 10,
            warehouse_location: Some("Warehouse A - Aisle 4 - Shelf A".into()),
            description: Some("High-performance summer tire".into()),
            warranty_months: Some(45),
            speed_rating: Some("Y".into()),
            load_index: Some("95".into()),
            special_order_available: true,
        },
        CreateTire {
            brand: "Continental".into(),
            model: "PureContact LS".into(),
            size: "235/45R18".into(),
            tire_type: "All-Season".into(),
            wholesale_price: 105.00,
            retail_price: 175.99,
            supplier: "Continental Tire".into(),
            supplier_contact: Some("1-800-CONTINENTAL".into()),
            supplier_part_number: Some("CONT-PCLS-235-45-18".into()),
            quantity_in_stock: 32,
            reorder_level: 15,
            warehouse_location: Some("Warehouse A - Aisle 2 - Shelf A".into()),
            description: Some("Premium all-season touring tire".into()),
            warranty_months: Some(70),
            speed_rating: Some("H".into()),
            load_index: Some("94".into()),
            special_order_available: false,
        },
    ];

    for tire in &tires {
        inventory_repo::insert(db, tire).await?;
    }
    Ok(())
}

const VEHICLE_TIRE_SIZES: [(&str, &str, i32, &str); 30] = [
    ("Honda", "Accord", 2023, "235/45R18"),
    ("Honda", "Accord", 2022, "235/45R18"),
    ("Honda", "Civic", 2023, "235/40R18"),
    ("Honda", "Civic", 2021, "215/55R16"),
    ("Honda", "CR-V", 2023, "235/60R18"),
    ("Toyota", "Camry", 2023, "235/45R18"),
    ("Toyota", "Camry", 2021, "215/55R17"),
    ("Toyota", "Corolla", 2023, "225/45R17"),
    ("Toyota", "RAV4", 2023, "225/65R17"),
    ("Ford", "F-150", 2023, "275/65R18"),
    ("Ford", "F-150", 2021, "265/70R17"),
    ("Ford", "Mustang", 2023, "245/40R18"),
    ("Ford", "Explorer", 2023, "255/55R20"),
    ("Chevrolet", "Silverado", 2023, "275/60R20"),
    ("Chevrolet", "Malibu", 2023, "225/55R17"),
    ("Chevrolet", "Equinox", 2023, "225/65R17"),
    ("Nissan", "Altima", 2023, "235/40R19"),
    ("Nissan", "Altima", 2021, "215/60R16"),
    ("Nissan", "Rogue", 2023, "225/65R17"),
    ("BMW", "3 Series", 2023, "225/45R18"),
    ("BMW", "3 Series", 2021, "225/50R17"),
    ("BMW", "X5", 2023, "275/40R21"),
    ("Mercedes-Benz", "C-Class", 2023, "225/50R17"),
    ("Mercedes-Benz", "GLE", 2023, "275/50R20"),
    ("Tesla", "Model 3", 2023, "235/45R18"),
    ("Tesla", "Model Y", 2023, "255/45R19"),
    ("Jeep", "Wrangler", 2023, "245/75R17"),
    ("Jeep", "Grand Cherokee", 2023, "265/60R18"),
    ("Subaru", "Outback", 2023, "225/65R17"),
    ("Subaru", "Forester", 2023, "225/55R18"),
];

async fn seed_vehicle_sizes(db: &PgPool) -> anyhow::Result<()> {
    for (make, model, year, tire_size) in VEHICLE_TIRE_SIZES {
        sqlx::query(
            r#"
            INSERT INTO vehicle_tire_sizes (make, model, year, tire_size)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(make)
        .bind(model)
        .bind(year)
        .bind(tire_size)
        .execute(db)
        .await?;
    }
    Ok(())
}

const SERVICE_ITEMS: [(&str, &str, i32, f64, i32); 5] = [
    (
        "Tire Rotation",
        "Professional tire rotation service to extend tire life",
        15,
        29.99,
        2,
    ),
    (
        "New Tires",
        "Installation of new tires (5 minutes per tire)",
        5,
        25.00,
        999,
    ),
    (
        "Alignment",
        "Wheel alignment service for optimal handling",
        60,
        79.99,
        2,
    ),
    ("Inspection", "Comprehensive vehicle inspection", 60, 49.99, 1),
    ("Emissions", "Emissions testing service", 30, 35.00, 1),
];

async fn seed_service_items(db: &PgPool) -> anyhow::Result<()> {
    for (name, description, duration_minutes, price, max_concurrent) in SERVICE_ITEMS {
        sqlx::query(
            r#"
            INSERT INTO service_items (name, description, duration_minutes, price, max_concurrent)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(name)
        .bind(description)
        .bind(duration_minutes)
        .bind(price)
        .bind(max_concurrent)
        .execute(db)
        .await?;
    }
    Ok(())
}
