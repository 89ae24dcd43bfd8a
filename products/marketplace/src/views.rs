//! Role-specific renderings of a single activity.
//!
//! The variant is chosen from the caller's role before any request rows load.

use entity::{request, user::Role};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    Caller, MarketResult,
    accounts::{customer_for_user, petsitter_for_user},
    activities::find_activity,
    dto::{ActivityDto, RequestDto},
};

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
#[serde(tag = "view", rename_all = "camelCase")]
pub enum ActivityView {
    Customer(CustomerView),
    Petsitter(PetsitterView),
    Admin(AdminView),
}

/// Owners see every bid; other customers see the listing only.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CustomerView {
    pub activity: ActivityDto,
    pub owned: bool,
    pub requests: Vec<RequestDto>,
}

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PetsitterView {
    pub activity: ActivityDto,
    pub my_request: Option<RequestDto>,
    pub assigned_to_me: bool,
}

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AdminView {
    pub activity: ActivityDto,
    pub requests: Vec<RequestDto>,
}

pub async fn activity_view(
    db: &DatabaseConnection,
    caller: Caller,
    activity_id: Uuid,
) -> MarketResult<ActivityView> {
    let model = find_activity(db, activity_id).await?;

    let view = match caller.role {
        Role::Customer => {
            let customer = customer_for_user(db, caller.user_id).await?;
            let owned = customer.id == model.customer_id;
            let requests = if owned {
                requests_for(db, model.id, None).await?
            } else {
                Vec::new()
            };
            ActivityView::Customer(CustomerView {
                activity: model.into(),
                owned,
                requests,
            })
        }
        Role::Petsitter => {
            let sitter = petsitter_for_user(db, caller.user_id).await?;
            let my_request = requests_for(db, model.id, Some(sitter.id))
                .await?
                .into_iter()
                .next();
            let assigned_to_me = model.petsitter_id == Some(sitter.id);
            ActivityView::Petsitter(PetsitterView {
                activity: model.into(),
                my_request,
                assigned_to_me,
            })
        }
        Role::Admin => {
            let requests = requests_for(db, model.id, None).await?;
            ActivityView::Admin(AdminView {
                activity: model.into(),
                requests,
            })
        }
    };
    Ok(view)
}

async fn requests_for(
    db: &DatabaseConnection,
    activity_id: Uuid,
    petsitter_id: Option<Uuid>,
) -> MarketResult<Vec<RequestDto>> {
    let mut query = request::Entity::find().filter(request::Column::ActivityId.eq(activity_id));
    if let Some(id) = petsitter_id {
        query = query.filter(request::Column::PetsitterId.eq(id));
    }
    let rows = query
        .order_by_asc(request::Column::CreatedAt)
        .all(db)
        .await?;
    Ok(rows.into_iter().map(RequestDto::from).collect())
}
