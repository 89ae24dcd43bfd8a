#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use entity::{activity, customer, petsitter, request, user};
use migration::{Migrator, MigratorTrait};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, Database, DatabaseConnection, EntityTrait,
    prelude::DateTimeWithTimeZone,
};
use uuid::Uuid;

pub async fn setup_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    Migrator::up(&db, None).await.unwrap();
    db
}

pub fn at(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2030, 5, day, hour, 0, 0).single().unwrap()
}

fn now() -> DateTimeWithTimeZone {
    Utc::now().into()
}

async fn insert_user(db: &DatabaseConnection, email: &str, role: user::Role) -> user::Model {
    user::ActiveModel {
        id: Set(Uuid::new_v4()),
        email: Set(email.to_string()),
        display_name: Set(email.split('@').next().unwrap_or(email).to_string()),
        role: Set(role),
        is_active: Set(true),
        created_at: Set(now()),
    }
    .insert(db)
    .await
    .unwrap()
}

pub async fn customer(db: &DatabaseConnection, email: &str) -> (user::Model, customer::Model) {
    let account = insert_user(db, email, user::Role::Customer).await;
    let profile = customer::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(account.id),
        created_at: Set(now()),
    }
    .insert(db)
    .await
    .unwrap();
    (account, profile)
}

pub async fn petsitter(db: &DatabaseConnection, email: &str) -> (user::Model, petsitter::Model) {
    let account = insert_user(db, email, user::Role::Petsitter).await;
    let profile = petsitter::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(account.id),
        bio: Set(None),
        created_at: Set(now()),
    }
    .insert(db)
    .await
    .unwrap();
    (account, profile)
}

pub async fn admin(db: &DatabaseConnection, email: &str) -> user::Model {
    insert_user(db, email, user::Role::Admin).await
}

pub async fn open_activity(
    db: &DatabaseConnection,
    customer_id: Uuid,
    start: DateTime<Utc>,
    hours: i64,
) -> activity::Model {
    insert_activity(db, customer_id, start, hours, activity::State::Open, None).await
}

pub async fn assigned_activity(
    db: &DatabaseConnection,
    customer_id: Uuid,
    petsitter_id: Uuid,
    start: DateTime<Utc>,
    hours: i64,
) -> activity::Model {
    insert_activity(
        db,
        customer_id,
        start,
        hours,
        activity::State::Assigned,
        Some(petsitter_id),
    )
    .await
}

async fn insert_activity(
    db: &DatabaseConnection,
    customer_id: Uuid,
    start: DateTime<Utc>,
    hours: i64,
    state: activity::State,
    petsitter_id: Option<Uuid>,
) -> activity::Model {
    activity::ActiveModel {
        id: Set(Uuid::new_v4()),
        title: Set("Feed the cats".into()),
        detail: Set(None),
        start_date_time: Set(start.into()),
        end_date_time: Set((start + Duration::hours(hours)).into()),
        pickup_point: Set("Elm Street 4".into()),
        price: Set(25),
        state: Set(state),
        customer_id: Set(customer_id),
        petsitter_id: Set(petsitter_id),
        created_at: Set(now()),
        updated_at: Set(now()),
    }
    .insert(db)
    .await
    .unwrap()
}

pub async fn pending_request(
    db: &DatabaseConnection,
    activity_id: Uuid,
    petsitter_id: Uuid,
    price: i32,
) -> request::Model {
    request::ActiveModel {
        id: Set(Uuid::new_v4()),
        activity_id: Set(activity_id),
        petsitter_id: Set(petsitter_id),
        price: Set(price),
        message: Set(Some("Happy to help".into())),
        state: Set(request::State::Pending),
        created_at: Set(now()),
        updated_at: Set(now()),
    }
    .insert(db)
    .await
    .unwrap()
}

pub async fn reload_activity(db: &DatabaseConnection, id: Uuid) -> activity::Model {
    activity::Entity::find_by_id(id)
        .one(db)
        .await
        .unwrap()
        .unwrap()
}

pub async fn reload_request(db: &DatabaseConnection, id: Uuid) -> request::Model {
    request::Entity::find_by_id(id).one(db).await.unwrap().unwrap()
}
