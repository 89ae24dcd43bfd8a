use chrono::{DateTime, Utc};
use entity::{activity, request};
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::Serialize;
use uuid::Uuid;

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ActivityDto {
    pub id: Uuid,
    pub title: String,
    pub detail: Option<String>,
    pub start_date_time: DateTime<Utc>,
    pub end_date_time: DateTime<Utc>,
    pub pickup_point: String,
    pub price: i32,
    pub state: &'static str,
    pub customer_id: Uuid,
    pub petsitter_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl From<activity::Model> for ActivityDto {
    fn from(model: activity::Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            detail: model.detail,
            start_date_time: utc(model.start_date_time),
            end_date_time: utc(model.end_date_time),
            pickup_point: model.pickup_point,
            price: model.price,
            state: activity_state_str(model.state),
            customer_id: model.customer_id,
            petsitter_id: model.petsitter_id,
            created_at: utc(model.created_at),
        }
    }
}

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RequestDto {
    pub id: Uuid,
    pub activity_id: Uuid,
    pub petsitter_id: Uuid,
    pub price: i32,
    pub message: Option<String>,
    pub state: &'static str,
    pub created_at: DateTime<Utc>,
}

impl From<request::Model> for RequestDto {
    fn from(model: request::Model) -> Self {
        Self {
            id: model.id,
            activity_id: model.activity_id,
            petsitter_id: model.petsitter_id,
            price: model.price,
            message: model.message,
            state: request_state_str(model.state),
            created_at: utc(model.created_at),
        }
    }
}

/// Body of a successful `PATCH /requests/{id}/accept`.
#[derive(Clone, Debug, Serialize)]
pub struct MessageDto {
    pub message: String,
}

pub fn activity_state_str(state: activity::State) -> &'static str {
    match state {
        activity::State::Open => "OPEN",
        activity::State::Assigned => "ASSIGNED",
        activity::State::Completed => "COMPLETED",
        activity::State::Cancelled => "CANCELLED",
    }
}

pub fn request_state_str(state: request::State) -> &'static str {
    match state {
        request::State::Pending => "PENDING",
        request::State::Accepted => "ACCEPTED",
        request::State::Rejected => "REJECTED",
    }
}

fn utc(value: DateTimeWithTimeZone) -> DateTime<Utc> {
    value.with_timezone(&Utc)
}
