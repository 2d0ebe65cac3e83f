use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "blocked_dates")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: Uuid,
    pub space_id: Uuid,
    pub day: Date,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::ad_spaces::Entity",
        from = "Column::SpaceId",
        to = "super::ad_spaces::Column::Id"
    )]
    AdSpaces,
}

impl Related<super::ad_spaces::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AdSpaces.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
