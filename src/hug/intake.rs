//! Order intake from the public contact form.
//!
//! Validation collects every offending field before anything touches the
//! store. Enrichment (device description, reverse geocoding) is best-effort
//! and never fails a submission.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::db::DbHandle;
use super::device::describe_device;
use super::geo::{ReverseGeocoder, enrich_location};
use super::models::{DeliveryType, Location, NewOrder, Order, ServiceType};
use crate::errors::{FieldError, HugError};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LocationInput {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub city: Option<String>,
    pub country: Option<String>,
}

/// Raw form payload. Every field is optional here so that missing fields
/// are reported as validation errors rather than decode failures.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrderSubmission {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub recipient_name: Option<String>,
    pub recipient_address: Option<String>,
    pub service_type: Option<String>,
    pub delivery_type: Option<String>,
    pub feelings: Option<String>,
    pub story: Option<String>,
    pub specific_details: Option<String>,
    pub location: Option<LocationInput>,
    pub device: Option<String>,
}

fn trimmed(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn required(field: &str, value: &Option<String>, errors: &mut Vec<FieldError>) -> String {
    match trimmed(value) {
        Some(v) => v,
        None => {
            errors.push(FieldError::new(field, "is required"));
            String::new()
        }
    }
}

pub fn is_plausible_email(email: &str) -> bool {
    let mut parts = email.split('@');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => {
            !local.is_empty()
                && !domain.is_empty()
                && !email.chars().any(char::is_whitespace)
        }
        _ => false,
    }
}

fn validate_location(input: &LocationInput, errors: &mut Vec<FieldError>) -> Option<Location> {
    let latitude = match input.latitude {
        Some(lat) if lat.is_finite() && (-90.0..=90.0).contains(&lat) => Some(lat),
        Some(_) => {
            errors.push(FieldError::new(
                "location.latitude",
                "must be between -90 and 90",
            ));
            None
        }
        None => {
            errors.push(FieldError::new("location.latitude", "is required"));
            None
        }
    };
    let longitude = match input.longitude {
        Some(lon) if lon.is_finite() && (-180.0..=180.0).contains(&lon) => Some(lon),
        Some(_) => {
            errors.push(FieldError::new(
                "location.longitude",
                "must be between -180 and 180",
            ));
            None
        }
        None => {
            errors.push(FieldError::new("location.longitude", "is required"));
            None
        }
    };
    Some(Location {
        latitude: latitude?,
        longitude: longitude?,
        city: trimmed(&input.city),
        country: trimmed(&input.country),
    })
}

impl OrderSubmission {
    /// Check every field and build the order to insert.
    pub fn validate(&self) -> Result<NewOrder, HugError> {
        let mut errors = Vec::new();

        let name = required("name", &self.name, &mut errors);
        let email = required("email", &self.email, &mut errors);
        if !email.is_empty() && !is_plausible_email(&email) {
            errors.push(FieldError::new("email", "is not a valid address"));
        }
        let phone = required("phone", &self.phone, &mut errors);
        let recipient_name = required("recipientName", &self.recipient_name, &mut errors);
        let recipient_address =
            required("recipientAddress", &self.recipient_address, &mut errors);

        let service_type = match trimmed(&self.service_type) {
            Some(s) => match s.parse::<ServiceType>() {
                Ok(t) => Some(t),
                Err(_) => {
                    errors.push(FieldError::new(
                        "serviceType",
                        format!("'{}' is not an offered service", s),
                    ));
                    None
                }
            },
            None => {
                errors.push(FieldError::new("serviceType", "is required"));
                None
            }
        };
        let delivery_type = match trimmed(&self.delivery_type) {
            Some(s) => match s.parse::<DeliveryType>() {
                Ok(t) => Some(t),
                Err(_) => {
                    errors.push(FieldError::new(
                        "deliveryType",
                        "must be 'Standard Delivery' or 'Express Delivery'",
                    ));
                    None
                }
            },
            None => {
                errors.push(FieldError::new("deliveryType", "is required"));
                None
            }
        };

        let feelings = required("feelings", &self.feelings, &mut errors);
        let story = required("story", &self.story, &mut errors);
        let location = self
            .location
            .as_ref()
            .and_then(|loc| validate_location(loc, &mut errors));

        match (service_type, delivery_type) {
            (Some(service_type), Some(delivery_type)) if errors.is_empty() => Ok(NewOrder {
                name,
                email,
                phone,
                recipient_name,
                recipient_address,
                service_type,
                delivery_type,
                feelings,
                story,
                specific_details: trimmed(&self.specific_details),
                location,
                device: trimmed(&self.device),
            }),
            _ => Err(HugError::Validation(errors)),
        }
    }
}

/// Validate, enrich and persist a submission. Returns the stored order.
pub async fn submit_order(
    db: &DbHandle,
    geocoder: &dyn ReverseGeocoder,
    submission: OrderSubmission,
    user_agent: Option<&str>,
    now: DateTime<Utc>,
) -> Result<Order, HugError> {
    let mut order = submission.validate()?;

    if order.device.is_none() {
        order.device = user_agent
            .filter(|ua| !ua.trim().is_empty())
            .map(describe_device);
    }
    if let Some(location) = order.location.take() {
        order.location = Some(enrich_location(geocoder, location).await);
    }

    let stored = db
        .call(move |db| db.insert_order(&order, now))
        .await
        .map_err(HugError::Store)?;
    tracing::info!(order_id = %stored.id, service = %stored.service_type, "order received");
    Ok(stored)
}
