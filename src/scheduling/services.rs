use std::collections::HashMap;

use sqlx::PgPool;
use time::macros::{format_description, time};
use time::{Date, Duration, PrimitiveDateTime, Time, Weekday};
use tracing::info;
use uuid::Uuid;

use crate::error::{AppError, FieldError};
use crate::scheduling::dto::{
    AvailabilityRequest, AvailabilityResponse, CreateAppointment, ServiceSelection,
};
use crate::scheduling::repo::{self, Appointment, AppointmentItem, NewAppointment, ServiceItem};

/// Installation work is booked per tire; every other service has a fixed slot.
const PER_UNIT_SERVICE: &str = "New Tires";

/// Mon-Fri 08:30-15:30, Sat 08:30-11:30, closed Sunday.
pub fn within_business_hours(date: Date, t: Time) -> bool {
    let (open, close) = match date.weekday() {
        Weekday::Sunday => return false,
        Weekday::Saturday => (time!(8:30), time!(11:30)),
        _ => (time!(8:30), time!(15:30)),
    };
    t >= open && t <= close
}

/// End time of a booking, or None when it would run past midnight.
fn appointment_end(date: Date, start: Time, minutes: i32) -> Option<Time> {
    let end = PrimitiveDateTime::new(date, start) + Duration::minutes(i64::from(minutes));
    (end.date() == date).then(|| end.time())
}

pub fn line_duration(service: &ServiceItem, quantity: i32) -> i32 {
    if service.name == PER_UNIT_SERVICE {
        service.duration_minutes * quantity
    } else {
        service.duration_minutes
    }
}

pub fn line_price(service: &ServiceItem, quantity: i32) -> f64 {
    service.price * f64::from(quantity)
}

/// Check each requested service against the overlapping scheduled
/// appointments; a service already at its `max_concurrent` is a conflict.
pub fn find_conflicts(
    date: Date,
    start: Time,
    total_duration: i32,
    services: &[ServiceItem],
    existing: &[(Appointment, Vec<AppointmentItem>)],
) -> Vec<String> {
    let start_dt = PrimitiveDateTime::new(date, start);
    let end_dt = start_dt + Duration::minutes(i64::from(total_duration));

    let mut conflicts = Vec::new();
    for service in services {
        let mut concurrent = 0;
        for (appointment, items) in existing {
            let existing_start =
                PrimitiveDateTime::new(appointment.scheduled_date, appointment.scheduled_time);
            let existing_end = existing_start
                + Duration::minutes(i64::from(appointment.total_duration_minutes));
            let overlaps = !(end_dt <= existing_start || start_dt >= existing_end);
            if overlaps && items.iter().any(|i| i.service_item_id == service.id) {
                concurrent += 1;
            }
        }
        if concurrent >= service.max_concurrent {
            conflicts.push(format!("{} is fully booked at this time", service.name));
        }
    }
    conflicts
}

fn parse_schedule(date: &str, t: &str) -> Result<(Date, Time), Vec<FieldError>> {
    let date_format = format_description!("[year]-[month]-[day]");
    let time_format = format_description!("[hour]:[minute]");

    let mut errors = Vec::new();
    let parsed_date = Date::parse(date, &date_format)
        .map_err(|_| errors.push(FieldError::new("date", "invalid date format")))
        .ok();
    let parsed_time = Time::parse(t, &time_format)
        .map_err(|_| errors.push(FieldError::new("time", "invalid time format")))
        .ok();

    match (parsed_date, parsed_time) {
        (Some(d), Some(t)) => Ok((d, t)),
        _ => Err(errors),
    }
}

pub async fn list_service_items(db: &PgPool) -> Result<Vec<ServiceItem>, AppError> {
    Ok(repo::active_service_items(db).await?)
}

pub async fn check_availability(
    db: &PgPool,
    req: AvailabilityRequest,
) -> Result<AvailabilityResponse, AppError> {
    let (date, start) = parse_schedule(&req.date, &req.time).map_err(AppError::Validation)?;

    if !within_business_hours(date, start) {
        return Ok(AvailabilityResponse::unavailable("Outside business hours"));
    }

    let services = repo::service_items_by_ids(db, &req.service_ids).await?;
    if services.len() != req.service_ids.len() {
        return Ok(AvailabilityResponse::unavailable("Invalid service items"));
    }

    let total_duration: i32 = services.iter().map(|s| s.duration_minutes).sum();
    let in_hours = appointment_end(date, start, total_duration)
        .map(|end| within_business_hours(date, end))
        .unwrap_or(false);
    if !in_hours {
        return Ok(AvailabilityResponse::unavailable(
            "Appointment would extend beyond business hours",
        ));
    }

    let existing = repo::scheduled_on(db, date).await?;
    if !find_conflicts(date, start, total_duration, &services, &existing).is_empty() {
        return Ok(AvailabilityResponse::unavailable(
            "Time slot conflicts with existing appointments",
        ));
    }

    Ok(AvailabilityResponse::available())
}

fn validate_request(req: &CreateAppointment) -> Vec<FieldError> {
    let mut errors = Vec::new();
    for (field, value) in [
        ("customer_name", &req.customer_name),
        ("customer_phone", &req.customer_phone),
        ("car_make", &req.car_make),
        ("car_model", &req.car_model),
    ] {
        if value.trim().is_empty() {
            errors.push(FieldError::new(
                field,
                format!("Missing required field: {field}"),
            ));
        }
    }
    if req.service_items.is_empty() {
        errors.push(FieldError::new(
            "service_items",
            "At least one service item required",
        ));
    }
    if req.service_items.iter().any(|s| s.quantity < 1) {
        errors.push(FieldError::new(
            "service_items",
            "quantity must be at least 1",
        ));
    }
    errors
}

fn schedule_error(reason: &str) -> AppError {
    AppError::Validation(vec![FieldError::new("schedule", reason)])
}

pub async fn create_appointment(
    db: &PgPool,
    req: CreateAppointment,
) -> Result<Appointment, AppError> {
    let errors = validate_request(&req);
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }
    let (date, start) = parse_schedule(&req.date, &req.time).map_err(AppError::Validation)?;

    let ids: Vec<Uuid> = req.service_items.iter().map(|s| s.id).collect();
    let services: HashMap<Uuid, ServiceItem> = repo::service_items_by_ids(db, &ids)
        .await?
        .into_iter()
        .map(|s| (s.id, s))
        .collect();
    if services.len() != ids.len() {
        return Err(AppError::Validation(vec![FieldError::new(
            "service_items",
            "Invalid service items",
        )]));
    }

    let mut total_duration = 0;
    let mut total_price = 0.0;
    let mut lines: Vec<(&ServiceItem, &ServiceSelection)> = Vec::new();
    for selection in &req.service_items {
        let service = services.get(&selection.id).ok_or_else(|| {
            AppError::Validation(vec![FieldError::new("service_items", "Invalid service items")])
        })?;
        total_duration += line_duration(service, selection.quantity);
        total_price += line_price(service, selection.quantity);
        lines.push((service, selection));
    }

    if !within_business_hours(date, start) {
        return Err(schedule_error("Outside business hours"));
    }
    let in_hours = appointment_end(date, start, total_duration)
        .map(|end| within_business_hours(date, end))
        .unwrap_or(false);
    if !in_hours {
        return Err(schedule_error(
            "Appointment would extend beyond business hours",
        ));
    }

    // Availability is re-checked right before writing; the slot may have been
    // taken since the caller last asked.
    let existing = repo::scheduled_on(db, date).await?;
    let service_list: Vec<ServiceItem> = services.values().cloned().collect();
    if !find_conflicts(date, start, total_duration, &service_list, &existing).is_empty() {
        return Err(schedule_error("Time slot no longer available"));
    }

    let mut tx = db.begin().await?;
    let appointment = repo::insert_appointment_tx(
        &mut tx,
        &NewAppointment {
            customer_name: req.customer_name.trim(),
            customer_phone: req.customer_phone.trim(),
            car_make: req.car_make.trim(),
            car_model: req.car_model.trim(),
            scheduled_date: date,
            scheduled_time: start,
            total_duration_minutes: total_duration,
            total_price,
            notes: req.notes.as_deref(),
        },
    )
    .await?;
    for (service, selection) in &lines {
        repo::insert_appointment_item_tx(
            &mut tx,
            appointment.id,
            service.id,
            selection.quantity,
            line_duration(service, selection.quantity),
            line_price(service, selection.quantity),
        )
        .await?;
    }
    tx.commit().await?;

    info!(
        appointment_id = %appointment.id,
        date = %appointment.scheduled_date,
        services = lines.len(),
        "appointment scheduled"
    );
    Ok(appointment)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;
    use time::OffsetDateTime;

    fn service(name: &str, duration: i32, price: f64, max_concurrent: i32) -> ServiceItem {
        ServiceItem {
            id: Uuid::new_v4(),
            name: name.into(),
            description: None,
            duration_minutes: duration,
            price,
            max_concurrent,
            active: true,
        }
    }

    fn appointment_at(date: Date, start: Time, minutes: i32) -> Appointment {
        Appointment {
            id: Uuid::new_v4(),
            customer_name: "Dana Reyes".into(),
            customer_phone: "555-0101".into(),
            car_make: "Honda".into(),
            car_model: "Civic".into(),
            scheduled_date: date,
            scheduled_time: start,
            total_duration_minutes: minutes,
            total_price: 0.0,
            status: "scheduled".into(),
            notes: None,
            created_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    fn item_for(appointment: &Appointment, service: &ServiceItem) -> AppointmentItem {
        AppointmentItem {
            id: Uuid::new_v4(),
            appointment_id: appointment.id,
            service_item_id: service.id,
            quantity: 1,
            duration_minutes: service.duration_minutes,
            price: service.price,
        }
    }

    #[test]
    fn closed_on_sundays() {
        assert!(!within_business_hours(date!(2024 - 03 - 10), time!(10:00)));
    }

    #[test]
    fn saturday_closes_early() {
        let saturday = date!(2024 - 03 - 09);
        assert!(within_business_hours(saturday, time!(8:30)));
        assert!(within_business_hours(saturday, time!(11:30)));
        assert!(!within_business_hours(saturday, time!(12:00)));
    }

    #[test]
    fn weekday_boundaries_are_inclusive() {
        let monday = date!(2024 - 03 - 11);
        assert!(!within_business_hours(monday, time!(8:29)));
        assert!(within_business_hours(monday, time!(8:30)));
        assert!(within_business_hours(monday, time!(15:30)));
        assert!(!within_business_hours(monday, time!(15:31)));
    }

    #[test]
    fn end_past_midnight_is_rejected() {
        assert_eq!(appointment_end(date!(2024 - 03 - 11), time!(23:00), 90), None);
        assert_eq!(
            appointment_end(date!(2024 - 03 - 11), time!(9:00), 90),
            Some(time!(10:30))
        );
    }

    #[test]
    fn tire_installation_scales_with_quantity() {
        let install = service("New Tires", 5, 25.0, 999);
        let rotation = service("Tire Rotation", 15, 29.99, 2);
        assert_eq!(line_duration(&install, 4), 20);
        assert_eq!(line_duration(&rotation, 4), 15);
        assert_eq!(line_price(&install, 4), 100.0);
        assert_eq!(line_price(&rotation, 2), 59.98);
    }

    #[test]
    fn fully_booked_service_conflicts() {
        let monday = date!(2024 - 03 - 11);
        let alignment = service("Alignment", 60, 79.99, 1);
        let booked = appointment_at(monday, time!(9:00), 60);
        let items = vec![item_for(&booked, &alignment)];

        let conflicts = find_conflicts(
            monday,
            time!(9:30),
            60,
            std::slice::from_ref(&alignment),
            &[(booked, items)],
        );
        assert_eq!(conflicts.len(), 1);
        assert!(conflicts[0].contains("Alignment"));
    }

    #[test]
    fn non_overlapping_slot_is_free() {
        let monday = date!(2024 - 03 - 11);
        let alignment = service("Alignment", 60, 79.99, 1);
        let booked = appointment_at(monday, time!(9:00), 60);
        let items = vec![item_for(&booked, &alignment)];

        // Back-to-back is allowed: the previous booking ends at 10:00.
        let conflicts = find_conflicts(
            monday,
            time!(10:00),
            60,
            std::slice::from_ref(&alignment),
            &[(booked, items)],
        );
        assert!(conflicts.is_empty());
    }

    #[test]
    fn other_services_do_not_count_toward_limit() {
        let monday = date!(2024 - 03 - 11);
        let alignment = service("Alignment", 60, 79.99, 1);
        let inspection = service("Inspection", 60, 49.99, 1);
        let booked = appointment_at(monday, time!(9:00), 60);
        let items = vec![item_for(&booked, &inspection)];

        let conflicts = find_conflicts(
            monday,
            time!(9:00),
            60,
            std::slice::from_ref(&alignment),
            &[(booked, items)],
        );
        assert!(conflicts.is_empty());
    }

    #[test]
    fn capacity_above_one_allows_overlap() {
        let monday = date!(2024 - 03 - 11);
        let rotation = service("Tire Rotation", 15, 29.99, 2);
        let booked = appointment_at(monday, time!(9:00), 15);
        let items = vec![item_for(&booked, &rotation)];

        let conflicts = find_conflicts(
            monday,
            time!(9:00),
            15,
            std::slice::from_ref(&rotation),
            &[(booked, items)],
        );
        assert!(conflicts.is_empty());
    }

    #[test]
    fn schedule_parsing_flags_each_field() {
        let errors = parse_schedule("03/11/2024", "930").unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert!(fields.contains(&"date"));
        assert!(fields.contains(&"time"));
        assert!(parse_schedule("2024-03-11", "09:30").is_ok());
    }

    #[test]
    fn missing_required_fields_are_reported() {
        let req = CreateAppointment {
            customer_name: String::new(),
            customer_phone: "555-0101".into(),
            car_make: "Honda".into(),
            car_model: "Civic".into(),
            date: "2024-03-11".into(),
            time: "09:30".into(),
            service_items: vec![],
            notes: None,
        };
        let errors = validate_request(&req);
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert!(fields.contains(&"customer_name"));
        assert!(fields.contains(&"service_items"));
    }
}
