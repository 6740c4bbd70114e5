//! Ingredients: flat CRUD resource. Deleting an ingredient drops it from every
//! product's composition.

use async_trait::async_trait;
use sea_orm::{
    ActiveValue::Set, ColumnTrait, DatabaseTransaction, DbErr, EntityTrait, QueryFilter,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::core::{CatalogResource, MergeIntoActiveModel};
use crate::entities::{ingredient, product_ingredient};
use crate::validation::{Validatable, ValidationErrors, validators::validate_name};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Ingredient {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct IngredientCreate {
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct IngredientUpdate {
    #[serde(default)]
    pub name: Option<String>,
}

impl From<IngredientCreate> for ingredient::ActiveModel {
    fn from(create: IngredientCreate) -> Self {
        Self {
            name: Set(create.name.trim().to_string()),
            ..Default::default()
        }
    }
}

impl MergeIntoActiveModel<ingredient::ActiveModel> for IngredientUpdate {
    fn merge_into_activemodel(
        self,
        mut existing: ingredient::ActiveModel,
    ) -> ingredient::ActiveModel {
        if let Some(name) = self.name {
            existing.name = Set(name.trim().to_string());
        }
        existing
    }
}

impl Validatable for IngredientCreate {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.check(validate_name("name", &self.name));
        errors.result()
    }
}

impl Validatable for IngredientUpdate {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Some(name) = &self.name {
            errors.check(validate_name("name", name));
        }
        errors.result()
    }
}

#[async_trait]
impl CatalogResource for Ingredient {
    type EntityType = ingredient::Entity;
    type ModelType = ingredient::Model;
    type PrimaryKeyType = ingredient::PrimaryKey;
    type ColumnType = ingredient::Column;
    type ActiveModelType = ingredient::ActiveModel;
    type CreateModel = IngredientCreate;
    type UpdateModel = IngredientUpdate;

    const ID_COLUMN: ingredient::Column = ingredient::Column::Id;
    const RESOURCE_NAME_SINGULAR: &'static str = "Ingredient";
    const RESOURCE_NAME_PLURAL: &'static str = "ingredients";

    fn from_model(model: ingredient::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
        }
    }

    async fn before_delete(txn: &DatabaseTransaction, id: i32) -> Result<(), DbErr> {
        product_ingredient::Entity::delete_many()
            .filter(product_ingredient::Column::IngredientId.eq(id))
            .exec(txn)
            .await?;
        Ok(())
    }

    fn filterable_columns() -> Vec<(&'static str, ingredient::Column)> {
        vec![("id", ingredient::Column::Id), ("name", ingredient::Column::Name)]
    }

    fn sortable_columns() -> Vec<(&'static str, ingredient::Column)> {
        vec![("id", ingredient::Column::Id), ("name", ingredient::Column::Name)]
    }

    fn search_column() -> Option<ingredient::Column> {
        Some(ingredient::Column::Name)
    }
}
