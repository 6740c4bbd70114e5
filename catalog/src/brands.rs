//! Brands: flat CRUD resource. Deleting a brand unlinks its products.

use async_trait::async_trait;
use sea_orm::{
    ActiveValue::Set, ColumnTrait, DatabaseTransaction, DbErr, EntityTrait, QueryFilter,
    sea_query::Expr,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::core::{CatalogResource, MergeIntoActiveModel};
use crate::entities::{brand, product};
use crate::validation::{Validatable, ValidationErrors, validators::validate_name};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Brand {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct BrandCreate {
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct BrandUpdate {
    #[serde(default)]
    pub name: Option<String>,
}

impl From<BrandCreate> for brand::ActiveModel {
    fn from(create: BrandCreate) -> Self {
        Self {
            name: Set(create.name.trim().to_string()),
            ..Default::default()
        }
    }
}

impl MergeIntoActiveModel<brand::ActiveModel> for BrandUpdate {
    fn merge_into_activemodel(self, mut existing: brand::ActiveModel) -> brand::ActiveModel {
        if let Some(name) = self.name {
            existing.name = Set(name.trim().to_string());
        }
        existing
    }
}

impl Validatable for BrandCreate {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.check(validate_name("name", &self.name));
        errors.result()
    }
}

impl Validatable for BrandUpdate {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Some(name) = &self.name {
            errors.check(validate_name("name", name));
        }
        errors.result()
    }
}

#[async_trait]
impl CatalogResource for Brand {
    type EntityType = brand::Entity;
    type ModelType = brand::Model;
    type PrimaryKeyType = brand::PrimaryKey;
    type ColumnType = brand::Column;
    type ActiveModelType = brand::ActiveModel;
    type CreateModel = BrandCreate;
    type UpdateModel = BrandUpdate;

    const ID_COLUMN: brand::Column = brand::Column::Id;
    const RESOURCE_NAME_SINGULAR: &'static str = "Brand";
    const RESOURCE_NAME_PLURAL: &'static str = "brands";

    fn from_model(model: brand::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
        }
    }

    async fn before_delete(txn: &DatabaseTransaction, id: i32) -> Result<(), DbErr> {
        let unlinked = product::Entity::update_many()
            .col_expr(product::Column::BrandId, Expr::value(Option::<i32>::None))
            .filter(product::Column::BrandId.eq(id))
            .exec(txn)
            .await?
            .rows_affected;
        tracing::info!(brand_id = id, unlinked_products = unlinked, "Unlinked products from brand");
        Ok(())
    }

    fn filterable_columns() -> Vec<(&'static str, brand::Column)> {
        vec![("id", brand::Column::Id), ("name", brand::Column::Name)]
    }

    fn sortable_columns() -> Vec<(&'static str, brand::Column)> {
        vec![("id", brand::Column::Id), ("name", brand::Column::Name)]
    }

    fn search_column() -> Option<brand::Column> {
        Some(brand::Column::Name)
    }
}
