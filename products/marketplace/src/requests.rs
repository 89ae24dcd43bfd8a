//! Pet-sitter requests and the acceptance workflow.
//!
//! A request starts `PENDING`. Accepting one moves it to `ACCEPTED`, moves
//! every sibling on the same activity to `REJECTED`, and assigns the activity
//! to the request's pet-sitter. The three writes share one transaction.

use chrono::Utc;
use entity::{activity, petsitter, request, user::Role};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder, TransactionTrait, prelude::DateTimeWithTimeZone,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    Caller, MarketError, MarketResult,
    accounts::{customer_for_user, petsitter_for_user},
    activities::find_activity,
    schema::NewRequestInput,
};

/// Closed-interval overlap: `[a_start, a_end]` and `[b_start, b_end]` share
/// at least one instant. Touching endpoints count as overlapping.
pub fn windows_overlap(
    a_start: DateTimeWithTimeZone,
    a_end: DateTimeWithTimeZone,
    b_start: DateTimeWithTimeZone,
    b_end: DateTimeWithTimeZone,
) -> bool {
    a_start <= b_end && a_end >= b_start
}

/// Files a `PENDING` request from the calling pet-sitter.
#[instrument(
    name = "request.create",
    skip(db, input),
    fields(user_id = %user_id, activity_id = %input.activity_id)
)]
pub async fn create_request(
    db: &DatabaseConnection,
    user_id: Uuid,
    input: NewRequestInput,
) -> MarketResult<request::Model> {
    input.validate()?;

    let txn = db.begin().await?;
    let target = find_activity(&txn, input.activity_id).await?;
    let sitter = petsitter_for_user(&txn, user_id).await?;

    let existing = request::Entity::find()
        .filter(request::Column::ActivityId.eq(target.id))
        .filter(request::Column::PetsitterId.eq(sitter.id))
        .one(&txn)
        .await?;
    if existing.is_some() {
        return Err(MarketError::conflict(
            "A request for this activity already exists",
        ));
    }

    ensure_schedule_free(&txn, &sitter, &target).await?;

    if target.state != activity::State::Open {
        return Err(MarketError::conflict("Activity is no longer open"));
    }

    let now: DateTimeWithTimeZone = Utc::now().into();
    let created = request::ActiveModel {
        id: Set(Uuid::new_v4()),
        activity_id: Set(target.id),
        petsitter_id: Set(sitter.id),
        price: Set(input.price),
        message: Set(input.normalized_message()),
        state: Set(request::State::Pending),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&txn)
    .await?;
    txn.commit().await?;

    info!(request_id = %created.id, petsitter_id = %sitter.id, "request filed");
    Ok(created)
}

async fn ensure_schedule_free<C>(
    conn: &C,
    sitter: &petsitter::Model,
    target: &activity::Model,
) -> MarketResult<()>
where
    C: sea_orm::ConnectionTrait,
{
    let assigned = activity::Entity::find()
        .filter(activity::Column::PetsitterId.eq(sitter.id))
        .filter(activity::Column::State.eq(activity::State::Assigned))
        .filter(activity::Column::Id.ne(target.id))
        .all(conn)
        .await?;
    let clash = assigned.iter().find(|booked| {
        windows_overlap(
            booked.start_date_time,
            booked.end_date_time,
            target.start_date_time,
            target.end_date_time,
        )
    });
    if let Some(booked) = clash {
        warn!(conflicting_activity = %booked.id, "schedule overlap");
        return Err(MarketError::conflict(
            "You already have an activity scheduled in this time window",
        ));
    }
    Ok(())
}

/// Result of a committed acceptance.
#[derive(Clone, Debug)]
pub struct Acceptance {
    pub activity: activity::Model,
    pub accepted: request::Model,
    pub rejected: u64,
}

/// Accepts `request_id` on behalf of the customer identified by `user_id`.
///
/// Fails with `Conflict` when the activity is no longer `OPEN` or the request
/// is no longer `PENDING`; nothing is written in that case.
#[instrument(name = "request.accept", skip(db), fields(user_id = %user_id, request_id = %request_id))]
pub async fn accept_request(
    db: &DatabaseConnection,
    user_id: Uuid,
    request_id: Uuid,
) -> MarketResult<Acceptance> {
    let txn = db.begin().await?;

    let customer = customer_for_user(&txn, user_id).await?;
    let (chosen, parent) = request::Entity::find_by_id(request_id)
        .find_also_related(activity::Entity)
        .one(&txn)
        .await?
        .ok_or(MarketError::not_found("Request"))?;
    let parent = parent.ok_or(MarketError::not_found("Activity"))?;

    if parent.customer_id != customer.id {
        return Err(MarketError::forbidden(
            "Only the activity owner can accept requests",
        ));
    }

    let now: DateTimeWithTimeZone = Utc::now().into();

    let assigned = activity::Entity::update_many()
        .set(activity::ActiveModel {
            petsitter_id: Set(Some(chosen.petsitter_id)),
            state: Set(activity::State::Assigned),
            price: Set(chosen.price),
            updated_at: Set(now),
            ..Default::default()
        })
        .filter(activity::Column::Id.eq(parent.id))
        .filter(activity::Column::State.eq(activity::State::Open))
        .exec(&txn)
        .await?;
    if assigned.rows_affected == 0 {
        return Err(MarketError::conflict("Activity is no longer open"));
    }

    let accepted = request::Entity::update_many()
        .set(request::ActiveModel {
            state: Set(request::State::Accepted),
            updated_at: Set(now),
            ..Default::default()
        })
        .filter(request::Column::Id.eq(chosen.id))
        .filter(request::Column::State.eq(request::State::Pending))
        .exec(&txn)
        .await?;
    if accepted.rows_affected == 0 {
        return Err(MarketError::conflict("Request is no longer pending"));
    }

    let rejected = request::Entity::update_many()
        .set(request::ActiveModel {
            state: Set(request::State::Rejected),
            updated_at: Set(now),
            ..Default::default()
        })
        .filter(request::Column::ActivityId.eq(parent.id))
        .filter(request::Column::Id.ne(chosen.id))
        .exec(&txn)
        .await?;

    let activity = find_activity(&txn, parent.id).await?;
    let accepted = request::Entity::find_by_id(chosen.id)
        .one(&txn)
        .await?
        .ok_or(MarketError::not_found("Request"))?;
    txn.commit().await?;

    info!(
        activity_id = %activity.id,
        petsitter_id = %accepted.petsitter_id,
        rejected = rejected.rows_affected,
        "request accepted"
    );
    Ok(Acceptance {
        activity,
        accepted,
        rejected: rejected.rows_affected,
    })
}

/// Requests on an activity, filtered by what the caller may see.
pub async fn list_requests(
    db: &DatabaseConnection,
    caller: Caller,
    activity_id: Uuid,
) -> MarketResult<Vec<request::Model>> {
    let target = find_activity(db, activity_id).await?;
    let mut query = request::Entity::find().filter(request::Column::ActivityId.eq(target.id));

    match caller.role {
        Role::Admin => {}
        Role::Customer => {
            let customer = customer_for_user(db, caller.user_id).await?;
            if customer.id != target.customer_id {
                return Err(MarketError::forbidden(
                    "Only the activity owner can list its requests",
                ));
            }
        }
        Role::Petsitter => {
            let sitter = petsitter_for_user(db, caller.user_id).await?;
            query = query.filter(request::Column::PetsitterId.eq(sitter.id));
        }
    }

    let rows = query
        .order_by_asc(request::Column::CreatedAt)
        .order_by_asc(request::Column::Id)
        .all(db)
        .await?;
    Ok(rows)
}
