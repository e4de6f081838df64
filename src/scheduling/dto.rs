use serde::{Deserialize, Serialize};
use time::{Date, Time};
use uuid::Uuid;

use crate::scheduling::repo::{Appointment, ServiceItem};

/// Service as listed to customers.
#[derive(Debug, Serialize)]
pub struct ServiceItemView {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub duration_minutes: i32,
    pub price: f64,
    pub max_concurrent: i32,
}

impl From<ServiceItem> for ServiceItemView {
    fn from(s: ServiceItem) -> Self {
        Self {
            id: s.id,
            name: s.name,
            description: s.description,
            duration_minutes: s.duration_minutes,
            price: s.price,
            max_concurrent: s.max_concurrent,
        }
    }
}

/// Date and time arrive as strings ("2024-03-09", "10:30") from the booking
/// form and are parsed at the service boundary.
#[derive(Debug, Deserialize)]
pub struct AvailabilityRequest {
    pub date: String,
    pub time: String,
    pub service_ids: Vec<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct AvailabilityResponse {
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl AvailabilityResponse {
    pub fn available() -> Self {
        Self {
            available: true,
            reason: None,
        }
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            available: false,
            reason: Some(reason.into()),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ServiceSelection {
    pub id: Uuid,
    #[serde(default = "default_quantity")]
    pub quantity: i32,
}

fn default_quantity() -> i32 {
    1
}

#[derive(Debug, Deserialize)]
pub struct CreateAppointment {
    pub customer_name: String,
    pub customer_phone: String,
    pub car_make: String,
    pub car_model: String,
    pub date: String,
    pub time: String,
    pub service_items: Vec<ServiceSelection>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AppointmentCreated {
    pub id: Uuid,
    pub scheduled_date: Date,
    pub scheduled_time: Time,
    pub total_duration_minutes: i32,
    pub total_price: f64,
}

impl From<Appointment> for AppointmentCreated {
    fn from(a: Appointment) -> Self {
        Self {
            id: a.id,
            scheduled_date: a.scheduled_date,
            scheduled_time: a.scheduled_time,
            total_duration_minutes: a.total_duration_minutes,
            total_price: a.total_price,
        }
    }
}
