//! # Category maintenance
//!
//! Create, update, list and delete categories while keeping the parent relation
//! acyclic.
//!
//! Deletion never cascades: inside one transaction the category's product tags are
//! removed, its direct children become roots, and only then is the row deleted.
//! Products tagged with the deleted category's ancestors keep those tags, even when
//! they were only there because of the deleted category.

use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection,
    EntityTrait, IntoActiveModel, QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
    sea_query::Expr,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::{Category as CategoryEntity, ProductCategory, category, product_category};
use crate::errors::CatalogError;
use crate::hierarchy::{CategoryId, CategoryTree};
use crate::validation::{Validatable, ValidationErrors, validators::validate_name};

const RESOURCE: &str = "Category";

/// Category as returned by the API, with its direct children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub parent_category_id: Option<CategoryId>,
    /// Direct children only, ascending.
    pub subcategory_ids: Vec<CategoryId>,
}

impl Category {
    fn from_model(model: category::Model, subcategory_ids: Vec<CategoryId>) -> Self {
        Self {
            id: model.id,
            name: model.name,
            parent_category_id: model.parent_category_id,
            subcategory_ids,
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryCreate {
    pub name: String,
    #[serde(default)]
    pub parent_category_id: Option<CategoryId>,
}

/// Partial update. An explicit `"parentCategoryId": null` moves the category to root;
/// leaving the field out keeps the current parent.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<i32>, nullable)]
    pub parent_category_id: Option<Option<CategoryId>>,
}

impl Validatable for CategoryCreate {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.check(validate_name("name", &self.name));
        errors.result()
    }
}

impl Validatable for CategoryUpdate {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Some(name) = &self.name {
            errors.check(validate_name("name", name));
        }
        errors.result()
    }
}

/// Outcome of a category deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeletedCategory {
    pub id: CategoryId,
    pub detached_products: u64,
    pub orphaned_children: u64,
}

async fn child_ids<C: ConnectionTrait>(
    db: &C,
    id: CategoryId,
) -> Result<Vec<CategoryId>, CatalogError> {
    let ids = CategoryEntity::find()
        .select_only()
        .column(category::Column::Id)
        .filter(category::Column::ParentCategoryId.eq(id))
        .order_by_asc(category::Column::Id)
        .into_tuple()
        .all(db)
        .await?;
    Ok(ids)
}

async fn ensure_exists<C: ConnectionTrait>(db: &C, id: CategoryId) -> Result<(), CatalogError> {
    if CategoryEntity::find_by_id(id).one(db).await?.is_none() {
        return Err(CatalogError::invalid_reference("categories", vec![id]));
    }
    Ok(())
}

/// Every category ordered by id.
///
/// # Errors
///
/// Database errors.
pub async fn list(db: &DatabaseConnection) -> Result<Vec<Category>, CatalogError> {
    let models = CategoryEntity::find()
        .order_by_asc(category::Column::Id)
        .all(db)
        .await?;
    let tree = CategoryTree::from_pairs(models.iter().map(|m| (m.id, m.parent_category_id)));
    Ok(models
        .into_iter()
        .map(|model| {
            let children = tree.children_of(model.id).to_vec();
            Category::from_model(model, children)
        })
        .collect())
}

/// # Errors
///
/// [`CatalogError::NotFound`] when the category does not exist.
pub async fn get_one<C: ConnectionTrait>(db: &C, id: CategoryId) -> Result<Category, CatalogError> {
    let model = CategoryEntity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| CatalogError::not_found(RESOURCE, id))?;
    let children = child_ids(db, id).await?;
    Ok(Category::from_model(model, children))
}

/// # Errors
///
/// Validation errors for a blank name, [`CatalogError::InvalidReference`] when the
/// parent does not exist.
pub async fn create(
    db: &DatabaseConnection,
    input: CategoryCreate,
) -> Result<Category, CatalogError> {
    input.validate()?;
    if let Some(parent) = input.parent_category_id {
        ensure_exists(db, parent).await?;
    }

    let model = category::ActiveModel {
        name: Set(input.name.trim().to_string()),
        parent_category_id: Set(input.parent_category_id),
        ..Default::default()
    }
    .insert(db)
    .await?;

    tracing::info!(
        category_id = model.id,
        parent_category_id = ?model.parent_category_id,
        "Created category"
    );
    Ok(Category::from_model(model, Vec::new()))
}

/// # Errors
///
/// [`CatalogError::NotFound`] for an unknown category, [`CatalogError::InvalidReference`]
/// for an unknown parent, [`CatalogError::CyclicParent`] when the new parent is the
/// category itself or one of its descendants.
pub async fn update(
    db: &DatabaseConnection,
    id: CategoryId,
    input: CategoryUpdate,
) -> Result<Category, CatalogError> {
    input.validate()?;

    let txn = db.begin().await?;
    let existing = CategoryEntity::find_by_id(id)
        .one(&txn)
        .await?
        .ok_or_else(|| CatalogError::not_found(RESOURCE, id))?;

    if let Some(Some(parent)) = input.parent_category_id {
        let tree = CategoryTree::load(&txn).await?;
        if !tree.contains(parent) {
            return Err(CatalogError::invalid_reference("categories", vec![parent]));
        }
        if tree.is_self_or_descendant(id, parent) {
            return Err(CatalogError::CyclicParent { id, parent });
        }
    }

    let mut active = existing.into_active_model();
    if let Some(name) = input.name {
        active.name = Set(name.trim().to_string());
    }
    if let Some(parent) = input.parent_category_id {
        active.parent_category_id = Set(parent);
    }
    active.update(&txn).await?;

    let updated = get_one(&txn, id).await?;
    txn.commit().await?;

    tracing::info!(
        category_id = id,
        parent_category_id = ?updated.parent_category_id,
        "Updated category"
    );
    Ok(updated)
}

/// Delete a category without cascading.
///
/// Runs in one transaction: the category's product tags are removed, its direct
/// children are moved to root, and the row is deleted. Any failure leaves all three
/// untouched.
///
/// # Errors
///
/// [`CatalogError::NotFound`] when the category does not exist.
pub async fn delete(
    db: &DatabaseConnection,
    id: CategoryId,
) -> Result<DeletedCategory, CatalogError> {
    let txn = db.begin().await?;

    if CategoryEntity::find_by_id(id).one(&txn).await?.is_none() {
        return Err(CatalogError::not_found(RESOURCE, id));
    }

    let detached_products = ProductCategory::delete_many()
        .filter(product_category::Column::CategoryId.eq(id))
        .exec(&txn)
        .await?
        .rows_affected;

    let orphaned_children = CategoryEntity::update_many()
        .col_expr(
            category::Column::ParentCategoryId,
            Expr::value(Option::<CategoryId>::None),
        )
        .filter(category::Column::ParentCategoryId.eq(id))
        .exec(&txn)
        .await?
        .rows_affected;

    CategoryEntity::delete_by_id(id).exec(&txn).await?;
    txn.commit().await?;

    tracing::info!(
        category_id = id,
        detached_products,
        orphaned_children,
        "Deleted category"
    );
    Ok(DeletedCategory {
        id,
        detached_products,
        orphaned_children,
    })
}
