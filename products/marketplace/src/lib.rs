//! Marketplace vertical slice: customers post activities, pet-sitters bid on
//! them with requests, and the owning customer accepts exactly one.

pub mod accounts;
pub mod activities;
pub mod dto;
pub mod error;
pub mod requests;
pub mod schema;
pub mod seed;
pub mod views;

use entity::user::Role;
use uuid::Uuid;

pub use error::{MarketError, MarketResult};

/// Authenticated principal as seen by the services.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Caller {
    pub user_id: Uuid,
    pub role: Role,
}

impl Caller {
    pub fn new(user_id: Uuid, role: Role) -> Self {
        Self { user_id, role }
    }
}
