//! Demo fixtures for local development and tests.

use chrono::{Duration, Utc};
use entity::{activity, customer, petsitter, user};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ConnectionTrait, DatabaseConnection, DbErr,
    TransactionTrait, prelude::DateTimeWithTimeZone,
};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct SeededMarketplace {
    pub users: Vec<user::Model>,
    pub customers: Vec<customer::Model>,
    pub petsitters: Vec<petsitter::Model>,
    pub activities: Vec<activity::Model>,
}

impl SeededMarketplace {
    pub fn user_email(&self, email: &str) -> Option<&user::Model> {
        self.users.iter().find(|u| u.email == email)
    }

    pub fn customer_of(&self, user_id: Uuid) -> Option<&customer::Model> {
        self.customers.iter().find(|c| c.user_id == user_id)
    }

    pub fn petsitter_of(&self, user_id: Uuid) -> Option<&petsitter::Model> {
        self.petsitters.iter().find(|p| p.user_id == user_id)
    }
}

pub async fn seed_demo(db: &DatabaseConnection) -> Result<SeededMarketplace, DbErr> {
    let txn = db.begin().await?;
    let now: DateTimeWithTimeZone = Utc::now().into();

    let owner = insert_user(&txn, "carla@pawpal.test", "Carla", user::Role::Customer, now).await?;
    let sam = insert_user(&txn, "sam@pawpal.test", "Sam", user::Role::Petsitter, now).await?;
    let pia = insert_user(&txn, "pia@pawpal.test", "Pia", user::Role::Petsitter, now).await?;
    let admin = insert_user(&txn, "admin@pawpal.test", "Admin", user::Role::Admin, now).await?;

    let carla = customer::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(owner.id),
        created_at: Set(now),
    }
    .insert(&txn)
    .await?;

    let mut petsitters = Vec::new();
    for (account, bio) in [(&sam, "Dog walker, 5 years"), (&pia, "Cats and rabbits")] {
        let profile = petsitter::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(account.id),
            bio: Set(Some(bio.to_string())),
            created_at: Set(now),
        }
        .insert(&txn)
        .await?;
        petsitters.push(profile);
    }

    let start = now + Duration::days(2);
    let walk = activity::ActiveModel {
        id: Set(Uuid::new_v4()),
        title: Set("Evening walk for Rex".into()),
        detail: Set(Some("Labrador, friendly, pulls on the leash".into())),
        start_date_time: Set(start),
        end_date_time: Set(start + Duration::hours(1)),
        pickup_point: Set("12 Harbour Road".into()),
        price: Set(35),
        state: Set(activity::State::Open),
        customer_id: Set(carla.id),
        petsitter_id: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;
    Ok(SeededMarketplace {
        users: vec![owner, sam, pia, admin],
        customers: vec![carla],
        petsitters,
        activities: vec![walk],
    })
}

async fn insert_user<C>(
    conn: &C,
    email: &str,
    display_name: &str,
    role: user::Role,
    now: DateTimeWithTimeZone,
) -> Result<user::Model, DbErr>
where
    C: ConnectionTrait,
{
    user::ActiveModel {
        id: Set(Uuid::new_v4()),
        email: Set(email.to_string()),
        display_name: Set(display_name.to_string()),
        role: Set(role),
        is_active: Set(true),
        created_at: Set(now),
    }
    .insert(conn)
    .await
}
