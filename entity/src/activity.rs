use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "activity")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub title: String,
    pub detail: Option<String>,
    pub start_date_time: DateTimeWithTimeZone,
    pub end_date_time: DateTimeWithTimeZone,
    pub pickup_point: String,
    pub price: i32,
    pub state: State,
    #[sea_orm(indexed)]
    pub customer_id: Uuid,
    #[sea_orm(indexed)]
    pub petsitter_id: Option<Uuid>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::customer::Entity",
        from = "Column::CustomerId",
        to = "super::customer::Column::Id",
        on_delete = "Cascade"
    )]
    Customer,
    #[sea_orm(
        belongs_to = "super::petsitter::Entity",
        from = "Column::PetsitterId",
        to = "super::petsitter::Column::Id",
        on_delete = "SetNull"
    )]
    Petsitter,
    #[sea_orm(has_many = "super::request::Entity")]
    Request,
}

impl Related<super::customer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Customer.def()
    }
}

impl Related<super::petsitter::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Petsitter.def()
    }
}

impl Related<super::request::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Request.def()
    }
}

/// `petsitter_id` is set exactly when the state is `Assigned` or later.
#[derive(Copy, Clone, Debug, EnumIter, DeriveActiveEnum, Eq, PartialEq)]
#[sea_orm(rs_type = "String", db_type = "String(Some(16))")]
pub enum State {
    #[sea_orm(string_value = "OPEN")]
    Open,
    #[sea_orm(string_value = "ASSIGNED")]
    Assigned,
    #[sea_orm(string_value = "COMPLETED")]
    Completed,
    #[sea_orm(string_value = "CANCELLED")]
    Cancelled,
}

impl ActiveModelBehavior for ActiveModel {}
