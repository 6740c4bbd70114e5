use async_trait::async_trait;
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection,
    DatabaseTransaction, DbErr, EntityTrait, FromQueryResult, IntoActiveModel, Order,
    PaginatorTrait, PrimaryKeyTrait, QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
};
use serde::{Serialize, de::DeserializeOwned};

use crate::errors::CatalogError;
use crate::validation::Validatable;

pub trait MergeIntoActiveModel<ActiveModelType> {
    /// Apply the fields present in this update onto an existing active model.
    fn merge_into_activemodel(self, existing: ActiveModelType) -> ActiveModelType;
}

/// A catalog table exposed as a plain CRUD resource keyed by an integer id.
///
/// Implementors only name their types and columns; every operation has a default.
/// [`before_delete`](CatalogResource::before_delete) runs inside the delete
/// transaction so dependent rows can be cleaned up atomically.
#[async_trait]
pub trait CatalogResource: Serialize + Sized + Send + Sync + 'static {
    type EntityType: EntityTrait<
            Model = Self::ModelType,
            PrimaryKey = Self::PrimaryKeyType,
            Column = Self::ColumnType,
        > + Sync;
    type ModelType: FromQueryResult + IntoActiveModel<Self::ActiveModelType> + Send + Sync;
    type PrimaryKeyType: PrimaryKeyTrait<ValueType = i32>;
    type ColumnType: ColumnTrait + Copy + std::fmt::Debug;
    type ActiveModelType: ActiveModelTrait<Entity = Self::EntityType>
        + ActiveModelBehavior
        + Send
        + Sync;
    type CreateModel: Into<Self::ActiveModelType> + Validatable + DeserializeOwned + Send;
    type UpdateModel: MergeIntoActiveModel<Self::ActiveModelType>
        + Validatable
        + DeserializeOwned
        + Send;

    const ID_COLUMN: Self::ColumnType;
    const RESOURCE_NAME_SINGULAR: &'static str;
    const RESOURCE_NAME_PLURAL: &'static str;

    fn from_model(model: Self::ModelType) -> Self;

    async fn get_all(
        db: &DatabaseConnection,
        condition: &Condition,
        order_column: Self::ColumnType,
        order_direction: Order,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<Self>, DbErr> {
        let models = Self::EntityType::find()
            .filter(condition.clone())
            .order_by(order_column, order_direction)
            .offset(offset)
            .limit(limit)
            .all(db)
            .await?;
        Ok(models.into_iter().map(Self::from_model).collect())
    }

    async fn get_one(db: &DatabaseConnection, id: i32) -> Result<Self, CatalogError> {
        let model = Self::EntityType::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| CatalogError::not_found(Self::RESOURCE_NAME_SINGULAR, id))?;
        Ok(Self::from_model(model))
    }

    async fn create(
        db: &DatabaseConnection,
        create_model: Self::CreateModel,
    ) -> Result<Self, CatalogError> {
        create_model.validate()?;
        let active_model: Self::ActiveModelType = create_model.into();
        let model = active_model.insert(db).await?;
        tracing::info!(resource = Self::RESOURCE_NAME_SINGULAR, "Created resource");
        Ok(Self::from_model(model))
    }

    async fn update(
        db: &DatabaseConnection,
        id: i32,
        update_model: Self::UpdateModel,
    ) -> Result<Self, CatalogError> {
        update_model.validate()?;
        let model = Self::EntityType::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| CatalogError::not_found(Self::RESOURCE_NAME_SINGULAR, id))?;
        let existing: Self::ActiveModelType = model.into_active_model();
        let updated = update_model.merge_into_activemodel(existing).update(db).await?;
        tracing::info!(resource = Self::RESOURCE_NAME_SINGULAR, id, "Updated resource");
        Ok(Self::from_model(updated))
    }

    /// Delete one row and whatever [`before_delete`](Self::before_delete) cleans up,
    /// all in one transaction.
    async fn delete(db: &DatabaseConnection, id: i32) -> Result<i32, CatalogError> {
        let txn = db.begin().await?;
        if Self::EntityType::find_by_id(id).one(&txn).await?.is_none() {
            return Err(CatalogError::not_found(Self::RESOURCE_NAME_SINGULAR, id));
        }
        Self::before_delete(&txn, id).await?;
        Self::EntityType::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;
        tracing::info!(resource = Self::RESOURCE_NAME_SINGULAR, id, "Deleted resource");
        Ok(id)
    }

    /// Hook run inside the delete transaction before the row is removed.
    async fn before_delete(_txn: &DatabaseTransaction, _id: i32) -> Result<(), DbErr> {
        Ok(())
    }

    async fn total_count(db: &DatabaseConnection, condition: &Condition) -> Result<u64, DbErr> {
        Self::EntityType::find()
            .filter(condition.clone())
            .count(db)
            .await
    }

    /// `(api name, column)` pairs accepted by the `filter` parameter.
    #[must_use]
    fn filterable_columns() -> Vec<(&'static str, Self::ColumnType)> {
        vec![("id", Self::ID_COLUMN)]
    }

    /// `(api name, column)` pairs accepted by the `sort` parameter.
    #[must_use]
    fn sortable_columns() -> Vec<(&'static str, Self::ColumnType)> {
        vec![("id", Self::ID_COLUMN)]
    }

    /// Column matched by the `q` search key, if any.
    #[must_use]
    fn search_column() -> Option<Self::ColumnType> {
        None
    }
}
