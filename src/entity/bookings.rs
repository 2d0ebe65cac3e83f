use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "bookings")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: Uuid,
    pub space_id: Uuid,
    pub advertiser_id: Uuid,
    pub start_date: Date,
    pub end_date: Date,
    pub status: String,
    pub total_price: i64,
    pub contact_name: String,
    pub contact_phone: String,
    pub contact_address: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::ad_spaces::Entity",
        from = "Column::SpaceId",
        to = "super::ad_spaces::Column::Id"
    )]
    AdSpaces,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::AdvertiserId",
        to = "super::users::Column::Id"
    )]
    Users,
}

impl Related<super::ad_spaces::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AdSpaces.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
