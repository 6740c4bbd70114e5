use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "ingredients")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::product_ingredient::Entity")]
    ProductIngredient,
}

impl Related<super::product_ingredient::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProductIngredient.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
