//! Input schemas. Every payload is validated here before any service touches
//! the database.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::{MarketError, MarketResult};

pub const MIN_PRICE: i32 = 20;
pub const MAX_PRICE: i32 = 500;
pub const MAX_MESSAGE_CHARS: usize = 1_000;
pub const MAX_TITLE_CHARS: usize = 256;
pub const MAX_DETAIL_CHARS: usize = 4_000;
pub const MAX_PICKUP_CHARS: usize = 512;

/// Body of `POST /requests`.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRequestInput {
    pub activity_id: Uuid,
    pub price: i32,
    #[serde(default)]
    pub message: Option<String>,
}

impl NewRequestInput {
    pub fn validate(&self) -> MarketResult<()> {
        validate_price(self.price)?;
        if let Some(message) = &self.message {
            validate_length("message", message, MAX_MESSAGE_CHARS)?;
        }
        Ok(())
    }

    pub fn normalized_message(&self) -> Option<String> {
        normalize_optional(self.message.as_deref())
    }
}

/// Body of `POST /activities`.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewActivityInput {
    pub title: String,
    #[serde(default)]
    pub detail: Option<String>,
    pub start_date_time: DateTime<Utc>,
    pub end_date_time: DateTime<Utc>,
    pub pickup_point: String,
    pub price: i32,
}

impl NewActivityInput {
    pub fn validate(&self) -> MarketResult<()> {
        validate_required("title", &self.title, MAX_TITLE_CHARS)?;
        validate_required("pickupPoint", &self.pickup_point, MAX_PICKUP_CHARS)?;
        if let Some(detail) = &self.detail {
            validate_length("detail", detail, MAX_DETAIL_CHARS)?;
        }
        validate_price(self.price)?;
        if self.start_date_time >= self.end_date_time {
            return Err(MarketError::invalid(
                "startDateTime must be before endDateTime",
            ));
        }
        Ok(())
    }

    pub fn normalized_detail(&self) -> Option<String> {
        normalize_optional(self.detail.as_deref())
    }
}

/// Query of `GET /activities`.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
pub struct ListActivitiesQuery {
    pub limit: Option<u64>,
}

pub const DEFAULT_ACTIVITY_PAGE: u64 = 50;
pub const MAX_ACTIVITY_PAGE: u64 = 100;

impl ListActivitiesQuery {
    pub fn limit(&self) -> MarketResult<u64> {
        match self.limit {
            None => Ok(DEFAULT_ACTIVITY_PAGE),
            Some(0) => Err(MarketError::invalid("limit must be positive")),
            Some(n) if n > MAX_ACTIVITY_PAGE => Err(MarketError::invalid(format!(
                "limit must be at most {MAX_ACTIVITY_PAGE}"
            ))),
            Some(n) => Ok(n),
        }
    }
}

pub fn price_in_range(price: i32) -> bool {
    (MIN_PRICE..=MAX_PRICE).contains(&price)
}

fn validate_price(price: i32) -> MarketResult<()> {
    if !price_in_range(price) {
        return Err(MarketError::invalid(format!(
            "price must be between {MIN_PRICE} and {MAX_PRICE}"
        )));
    }
    Ok(())
}

fn validate_required(field: &str, value: &str, max: usize) -> MarketResult<()> {
    if value.trim().is_empty() {
        return Err(MarketError::invalid(format!("{field} is required")));
    }
    validate_length(field, value.trim(), max)
}

fn validate_length(field: &str, value: &str, max: usize) -> MarketResult<()> {
    if value.chars().count() > max {
        return Err(MarketError::invalid(format!(
            "{field} must be at most {max} characters"
        )));
    }
    Ok(())
}

fn normalize_optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn request(price: i32) -> NewRequestInput {
        NewRequestInput {
            activity_id: Uuid::new_v4(),
            price,
            message: Some("I love dogs".into()),
        }
    }

    fn activity() -> NewActivityInput {
        let start = Utc::now() + Duration::days(1);
        NewActivityInput {
            title: "Walk Rex".into(),
            detail: None,
            start_date_time: start,
            end_date_time: start + Duration::hours(2),
            pickup_point: "Main St 1".into(),
            price: 40,
        }
    }

    #[test]
    fn price_bounds_are_inclusive() {
        for price in [19, 20, 21, 250, 499, 500, 501, 0, -5, i32::MAX] {
            let ok = request(price).validate().is_ok();
            assert_eq!(ok, (20..=500).contains(&price), "price {price}");
        }
    }

    #[test]
    fn overlong_message_is_rejected() {
        let mut input = request(30);
        input.message = Some("x".repeat(MAX_MESSAGE_CHARS + 1));
        assert!(matches!(
            input.validate(),
            Err(MarketError::InvalidArgument(_))
        ));
    }

    #[test]
    fn blank_message_normalizes_to_none() {
        let mut input = request(30);
        input.message = Some("   ".into());
        assert_eq!(input.normalized_message(), None);
    }

    #[test]
    fn request_body_uses_camel_case() {
        let id = Uuid::new_v4();
        let input: NewRequestInput = serde_json::from_value(serde_json::json!({
            "activityId": id,
            "price": 45,
            "message": "hi"
        }))
        .unwrap();
        assert_eq!(input.activity_id, id);
        assert_eq!(input.price, 45);
    }

    #[test]
    fn activity_window_must_be_ordered() {
        let mut input = activity();
        assert!(input.validate().is_ok());
        input.end_date_time = input.start_date_time;
        assert!(input.validate().is_err());
    }

    #[test]
    fn activity_title_is_required() {
        let mut input = activity();
        input.title = "  ".into();
        let err = input.validate().unwrap_err();
        assert_eq!(err.to_string(), "title is required");
    }

    #[test]
    fn list_limit_defaults_and_caps() {
        assert_eq!(ListActivitiesQuery::default().limit().unwrap(), 50);
        assert!(ListActivitiesQuery { limit: Some(0) }.limit().is_err());
        assert!(ListActivitiesQuery { limit: Some(101) }.limit().is_err());
        assert_eq!(ListActivitiesQuery { limit: Some(7) }.limit().unwrap(), 7);
    }
}
