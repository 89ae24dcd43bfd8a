//! Profile lookups shared by the services and the auth extractor.

use entity::{customer, petsitter, user};
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};
use uuid::Uuid;

use crate::{MarketError, MarketResult};

pub async fn customer_for_user<C>(conn: &C, user_id: Uuid) -> MarketResult<customer::Model>
where
    C: ConnectionTrait,
{
    customer::Entity::find()
        .filter(customer::Column::UserId.eq(user_id))
        .one(conn)
        .await?
        .ok_or(MarketError::not_found("Customer"))
}

pub async fn petsitter_for_user<C>(conn: &C, user_id: Uuid) -> MarketResult<petsitter::Model>
where
    C: ConnectionTrait,
{
    petsitter::Entity::find()
        .filter(petsitter::Column::UserId.eq(user_id))
        .one(conn)
        .await?
        .ok_or(MarketError::not_found("Petsitter"))
}

/// Returns `None` for unknown or deactivated users.
pub async fn active_user<C>(conn: &C, user_id: Uuid) -> MarketResult<Option<user::Model>>
where
    C: ConnectionTrait,
{
    let user = user::Entity::find_by_id(user_id).one(conn).await?;
    Ok(user.filter(|u| u.is_active))
}
