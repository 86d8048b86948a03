use thiserror::Error;
use uuid::Uuid;

use crate::domain::value_objects::{
    periods::Period,
    subscriptions::{CalculateCostModel, InsertSubscriptionModel},
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {reason}")]
pub struct InvalidInput {
    pub field: &'static str,
    pub reason: String,
}

impl InvalidInput {
    pub fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }

    fn required(field: &'static str) -> Self {
        Self::new(field, "is required")
    }
}

/// Create input after every field has been checked and parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedSubscription {
    pub service_name: String,
    pub price: i32,
    pub user_id: Uuid,
    pub start: Period,
}

pub fn validate_create(
    input: &InsertSubscriptionModel,
) -> Result<ValidatedSubscription, InvalidInput> {
    let service_name = validate_service_name(&input.service_name)?;
    let price = validate_price(input.price)?;
    let user_id = validate_user_id(&input.user_id)?;
    let start = validate_period("start_date", &input.start_date)?;

    Ok(ValidatedSubscription {
        service_name,
        price,
        user_id,
        start,
    })
}

pub fn validate_service_name(raw: &str) -> Result<String, InvalidInput> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(InvalidInput::required("service_name"));
    }
    Ok(trimmed.to_string())
}

pub fn validate_price(price: i32) -> Result<i32, InvalidInput> {
    if price <= 0 {
        return Err(InvalidInput::new("price", "must be positive"));
    }
    Ok(price)
}

/// Accepts any textual UUID form regardless of version.
pub fn validate_user_id(raw: &str) -> Result<Uuid, InvalidInput> {
    if raw.is_empty() {
        return Err(InvalidInput::required("user_id"));
    }
    Uuid::parse_str(raw).map_err(|_| InvalidInput::new("user_id", "must be a valid UUID"))
}

pub fn validate_period(field: &'static str, raw: &str) -> Result<Period, InvalidInput> {
    if raw.is_empty() {
        return Err(InvalidInput::required(field));
    }
    Period::parse(raw).map_err(|err| InvalidInput::new(field, err.to_string()))
}

/// Both periods must parse; ordering is left to the caller.
pub fn validate_period_pair(start: &str, end: &str) -> Result<(Period, Period), InvalidInput> {
    let start = validate_period("start_period", start)?;
    let end = validate_period("end_period", end)?;
    Ok((start, end))
}

pub fn validate_subscription_id(raw: &str) -> Result<i32, InvalidInput> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(InvalidInput::required("id"));
    }
    trimmed
        .parse::<i32>()
        .map_err(|_| InvalidInput::new("id", "must be an integer"))
}

pub fn validate_cost_request(
    request: &CalculateCostModel,
) -> Result<(Uuid, String, Period, Period), InvalidInput> {
    let user_id = validate_user_id(&request.user_id)?;
    let service_name = validate_service_name(&request.service_name)?;
    let (start, end) = validate_period_pair(&request.start_period, &request.end_period)?;
    Ok((user_id, service_name, start, end))
}
