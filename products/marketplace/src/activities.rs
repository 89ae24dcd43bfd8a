use chrono::Utc;
use entity::activity;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection,
    EntityTrait, QueryFilter, QueryOrder, QuerySelect, prelude::DateTimeWithTimeZone,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    MarketError, MarketResult,
    accounts::customer_for_user,
    schema::{ListActivitiesQuery, NewActivityInput},
};

/// Posts a new `OPEN` activity owned by the calling customer.
#[instrument(name = "activity.create", skip(db, input), fields(user_id = %user_id))]
pub async fn create_activity(
    db: &DatabaseConnection,
    user_id: Uuid,
    input: NewActivityInput,
) -> MarketResult<activity::Model> {
    input.validate()?;
    let customer = customer_for_user(db, user_id).await?;

    let now: DateTimeWithTimeZone = Utc::now().into();
    let model = activity::ActiveModel {
        id: Set(Uuid::new_v4()),
        title: Set(input.title.trim().to_string()),
        detail: Set(input.normalized_detail()),
        start_date_time: Set(input.start_date_time.into()),
        end_date_time: Set(input.end_date_time.into()),
        pickup_point: Set(input.pickup_point.trim().to_string()),
        price: Set(input.price),
        state: Set(activity::State::Open),
        customer_id: Set(customer.id),
        petsitter_id: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await?;

    info!(activity_id = %model.id, customer_id = %customer.id, "activity posted");
    Ok(model)
}

pub async fn list_open_activities(
    db: &DatabaseConnection,
    query: ListActivitiesQuery,
) -> MarketResult<Vec<activity::Model>> {
    let limit = query.limit()?;
    let rows = activity::Entity::find()
        .filter(activity::Column::State.eq(activity::State::Open))
        .order_by_asc(activity::Column::StartDateTime)
        .order_by_asc(activity::Column::Id)
        .limit(limit)
        .all(db)
        .await?;
    Ok(rows)
}

pub async fn find_activity<C>(conn: &C, activity_id: Uuid) -> MarketResult<activity::Model>
where
    C: ConnectionTrait,
{
    activity::Entity::find_by_id(activity_id)
        .one(conn)
        .await?
        .ok_or(MarketError::not_found("Activity"))
}
