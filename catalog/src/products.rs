//! # Products
//!
//! Product writes validate the merged record, resolve every reference (brand,
//! ingredients, categories) and store the product row together with its join rows in
//! one transaction.
//!
//! The stored category set is always the ancestor closure of the requested ids, and it
//! is recomputed on every write: an update without `categoryIds` re-expands the
//! product's current tags against the current tree.

use std::collections::{BTreeSet, HashMap, HashSet};

use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, ConnectionTrait,
    DatabaseConnection, DatabaseTransaction, EntityTrait, IntoActiveModel, Order, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
    sea_query::{Expr, Query},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::entities::{
    Brand, Ingredient, Product as ProductEntity, ProductCategory, ProductIngredient, ingredient,
    product, product_category, product_ingredient,
};
use crate::errors::CatalogError;
use crate::filtering::{apply_filters, as_id, generic_sort};
use crate::hierarchy::{CategoryId, expand_categories};
use crate::validation::{
    Validatable, ValidationError, ValidationErrors,
    validators::{validate_at_least, validate_greater_than, validate_name, validate_required},
};

const RESOURCE: &str = "Product";

/// Filter key for category browsing.
pub const CATEGORY_FILTER_KEY: &str = "categoryId";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IngredientAmount {
    pub ingredient_id: i32,
    pub amount: Decimal,
    pub unit: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductIngredientView {
    pub ingredient_id: i32,
    pub name: String,
    pub amount: Decimal,
    pub unit: String,
}

/// Product as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub available_quantity: i32,
    pub is_prescription_required: bool,
    pub brand_id: Option<i32>,
    /// Ancestor closure of the requested categories, ascending.
    pub category_ids: Vec<CategoryId>,
    pub ingredients: Vec<ProductIngredientView>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductCreate {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: Decimal,
    #[serde(default)]
    pub available_quantity: i32,
    #[serde(default)]
    pub is_prescription_required: bool,
    #[serde(default)]
    pub brand_id: Option<i32>,
    #[serde(default)]
    pub category_ids: Vec<CategoryId>,
    #[serde(default)]
    pub ingredients: Vec<IngredientAmount>,
}

/// Partial update; absent fields keep their stored value. `description` and `brandId`
/// accept an explicit `null` to clear them.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>, nullable)]
    pub description: Option<Option<String>>,
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub available_quantity: Option<i32>,
    #[serde(default)]
    pub is_prescription_required: Option<bool>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<i32>, nullable)]
    pub brand_id: Option<Option<i32>>,
    #[serde(default)]
    pub category_ids: Option<Vec<CategoryId>>,
    #[serde(default)]
    pub ingredients: Option<Vec<IngredientAmount>>,
}

/// Fully merged product record, validated before anything is written.
#[derive(Debug, Clone, PartialEq)]
struct ProductDraft {
    name: String,
    description: Option<String>,
    price: Decimal,
    available_quantity: i32,
    is_prescription_required: bool,
    brand_id: Option<i32>,
    category_ids: BTreeSet<CategoryId>,
    ingredients: Vec<IngredientAmount>,
}

impl From<ProductCreate> for ProductDraft {
    fn from(create: ProductCreate) -> Self {
        Self {
            name: create.name.trim().to_string(),
            description: create.description,
            price: create.price,
            available_quantity: create.available_quantity,
            is_prescription_required: create.is_prescription_required,
            brand_id: create.brand_id,
            category_ids: create.category_ids.into_iter().collect(),
            ingredients: create.ingredients,
        }
    }
}

impl ProductDraft {
    fn merge(mut self, update: ProductUpdate) -> Self {
        if let Some(name) = update.name {
            self.name = name.trim().to_string();
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(price) = update.price {
            self.price = price;
        }
        if let Some(quantity) = update.available_quantity {
            self.available_quantity = quantity;
        }
        if let Some(required) = update.is_prescription_required {
            self.is_prescription_required = required;
        }
        if let Some(brand_id) = update.brand_id {
            self.brand_id = brand_id;
        }
        if let Some(category_ids) = update.category_ids {
            self.category_ids = category_ids.into_iter().collect();
        }
        if let Some(ingredients) = update.ingredients {
            self.ingredients = ingredients;
        }
        self
    }

    fn apply_to(&self, mut active: product::ActiveModel) -> product::ActiveModel {
        active.name = Set(self.name.clone());
        active.description = Set(self.description.clone());
        active.price = Set(self.price);
        active.available_quantity = Set(self.available_quantity);
        active.is_prescription_required = Set(self.is_prescription_required);
        active.brand_id = Set(self.brand_id);
        active
    }
}

impl Validatable for ProductDraft {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.check(validate_name("name", &self.name));
        errors.check(validate_greater_than("price", self.price, Decimal::ZERO));
        errors.check(validate_at_least("availableQuantity", self.available_quantity, 0));
        if self.is_prescription_required && self.available_quantity != 0 {
            errors.add(ValidationError::new(
                "availableQuantity",
                "Must be 0 for prescription products",
            ));
        }

        let mut seen = HashSet::new();
        for item in &self.ingredients {
            if !seen.insert(item.ingredient_id) {
                errors.add(ValidationError::new(
                    "ingredients",
                    format!("Ingredient {} is listed more than once", item.ingredient_id),
                ));
            }
            errors.check(validate_greater_than("ingredients.amount", item.amount, Decimal::ZERO));
            errors.check(validate_required("ingredients.unit", &item.unit));
        }
        errors.result()
    }
}

async fn ensure_references(
    txn: &DatabaseTransaction,
    draft: &ProductDraft,
) -> Result<BTreeSet<CategoryId>, CatalogError> {
    if let Some(brand_id) = draft.brand_id {
        if Brand::find_by_id(brand_id).one(txn).await?.is_none() {
            return Err(CatalogError::invalid_reference("brands", vec![brand_id]));
        }
    }

    if !draft.ingredients.is_empty() {
        let requested: BTreeSet<i32> = draft.ingredients.iter().map(|i| i.ingredient_id).collect();
        let found: HashSet<i32> = Ingredient::find()
            .select_only()
            .column(ingredient::Column::Id)
            .filter(ingredient::Column::Id.is_in(requested.iter().copied()))
            .into_tuple::<i32>()
            .all(txn)
            .await?
            .into_iter()
            .collect();
        let missing: Vec<i32> = requested.into_iter().filter(|id| !found.contains(id)).collect();
        if !missing.is_empty() {
            return Err(CatalogError::invalid_reference("ingredients", missing));
        }
    }

    expand_categories(txn, draft.category_ids.iter().copied()).await
}

/// Replace the product's join rows with `closure` and `ingredients`.
async fn write_associations(
    txn: &DatabaseTransaction,
    product_id: i32,
    closure: &BTreeSet<CategoryId>,
    ingredients: &[IngredientAmount],
) -> Result<(), CatalogError> {
    ProductCategory::delete_many()
        .filter(product_category::Column::ProductId.eq(product_id))
        .exec(txn)
        .await?;
    if !closure.is_empty() {
        ProductCategory::insert_many(closure.iter().map(|&category_id| {
            product_category::ActiveModel {
                product_id: Set(product_id),
                category_id: Set(category_id),
            }
        }))
        .exec_without_returning(txn)
        .await?;
    }

    ProductIngredient::delete_many()
        .filter(product_ingredient::Column::ProductId.eq(product_id))
        .exec(txn)
        .await?;
    if !ingredients.is_empty() {
        ProductIngredient::insert_many(ingredients.iter().map(|item| {
            product_ingredient::ActiveModel {
                product_id: Set(product_id),
                ingredient_id: Set(item.ingredient_id),
                amount: Set(item.amount),
                unit: Set(item.unit.trim().to_string()),
            }
        }))
        .exec_without_returning(txn)
        .await?;
    }
    Ok(())
}

/// Load category tags and ingredients for a batch of products.
async fn load_views<C: ConnectionTrait>(
    db: &C,
    models: Vec<product::Model>,
) -> Result<Vec<Product>, CatalogError> {
    let ids: Vec<i32> = models.iter().map(|m| m.id).collect();
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let mut categories: HashMap<i32, Vec<CategoryId>> = HashMap::new();
    for link in ProductCategory::find()
        .filter(product_category::Column::ProductId.is_in(ids.clone()))
        .order_by_asc(product_category::Column::CategoryId)
        .all(db)
        .await?
    {
        categories.entry(link.product_id).or_default().push(link.category_id);
    }

    let mut ingredients: HashMap<i32, Vec<ProductIngredientView>> = HashMap::new();
    for (link, ingredient) in ProductIngredient::find()
        .filter(product_ingredient::Column::ProductId.is_in(ids))
        .order_by_asc(product_ingredient::Column::IngredientId)
        .find_also_related(Ingredient)
        .all(db)
        .await?
    {
        ingredients
            .entry(link.product_id)
            .or_default()
            .push(ProductIngredientView {
                ingredient_id: link.ingredient_id,
                name: ingredient.map(|i| i.name).unwrap_or_default(),
                amount: link.amount,
                unit: link.unit,
            });
    }

    Ok(models
        .into_iter()
        .map(|model| Product {
            category_ids: categories.remove(&model.id).unwrap_or_default(),
            ingredients: ingredients.remove(&model.id).unwrap_or_default(),
            id: model.id,
            name: model.name,
            description: model.description,
            price: model.price,
            available_quantity: model.available_quantity,
            is_prescription_required: model.is_prescription_required,
            brand_id: model.brand_id,
        })
        .collect())
}

async fn load_view<C: ConnectionTrait>(db: &C, id: i32) -> Result<Product, CatalogError> {
    let model = ProductEntity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| CatalogError::not_found(RESOURCE, id))?;
    load_views(db, vec![model])
        .await?
        .pop()
        .ok_or_else(|| CatalogError::not_found(RESOURCE, id))
}

/// Filter whitelist for the `filter` parameter.
#[must_use]
pub fn filterable_columns() -> Vec<(&'static str, product::Column)> {
    vec![
        ("id", product::Column::Id),
        ("name", product::Column::Name),
        ("brandId", product::Column::BrandId),
        ("isPrescriptionRequired", product::Column::IsPrescriptionRequired),
    ]
}

/// Sort whitelist for the `sort` parameter.
#[must_use]
pub fn sortable_columns() -> Vec<(&'static str, product::Column)> {
    vec![
        ("id", product::Column::Id),
        ("name", product::Column::Name),
        ("price", product::Column::Price),
        ("availableQuantity", product::Column::AvailableQuantity),
    ]
}

/// Condition for `filter`, including category browsing through the join table.
#[must_use]
pub fn build_condition(filters: &HashMap<String, Value>) -> Condition {
    let mut condition = apply_filters(filters, &filterable_columns(), Some(product::Column::Name));

    let category_ids: Vec<i64> = match filters.get(CATEGORY_FILTER_KEY) {
        Some(Value::Array(values)) => values.iter().filter_map(as_id).collect(),
        Some(value) => as_id(value).into_iter().collect(),
        None => Vec::new(),
    };
    if !category_ids.is_empty() {
        condition = condition.add(
            product::Column::Id.in_subquery(
                Query::select()
                    .column(product_category::Column::ProductId)
                    .from(ProductCategory)
                    .and_where(Expr::col(product_category::Column::CategoryId).is_in(category_ids))
                    .to_owned(),
            ),
        );
    }
    condition
}

/// One page of products plus the total matching count.
///
/// # Errors
///
/// Database errors.
pub async fn list(
    db: &DatabaseConnection,
    filters: &HashMap<String, Value>,
    sort: Option<&str>,
    offset: u64,
    limit: u64,
) -> Result<(Vec<Product>, u64), CatalogError> {
    let condition = build_condition(filters);
    let (order_column, order_direction): (product::Column, Order) =
        generic_sort(sort, &sortable_columns(), product::Column::Id);

    let models = ProductEntity::find()
        .filter(condition.clone())
        .order_by(order_column, order_direction)
        .order_by_asc(product::Column::Id)
        .offset(offset)
        .limit(limit)
        .all(db)
        .await?;
    let total = ProductEntity::find().filter(condition).count(db).await?;
    Ok((load_views(db, models).await?, total))
}

/// # Errors
///
/// [`CatalogError::NotFound`] when the product does not exist.
pub async fn get_one(db: &DatabaseConnection, id: i32) -> Result<Product, CatalogError> {
    load_view(db, id).await
}

/// Create a product tagged with the ancestor closure of `categoryIds`.
///
/// # Errors
///
/// Validation errors, or [`CatalogError::InvalidReference`] when a brand, ingredient or
/// category id does not exist.
pub async fn create(
    db: &DatabaseConnection,
    input: ProductCreate,
) -> Result<Product, CatalogError> {
    let draft = ProductDraft::from(input);
    draft.validate()?;

    let txn = db.begin().await?;
    let closure = ensure_references(&txn, &draft).await?;
    let model = draft
        .apply_to(<product::ActiveModel as Default>::default())
        .insert(&txn)
        .await?;
    write_associations(&txn, model.id, &closure, &draft.ingredients).await?;
    let created = load_view(&txn, model.id).await?;
    txn.commit().await?;

    tracing::info!(
        product_id = created.id,
        requested_categories = draft.category_ids.len(),
        stored_categories = closure.len(),
        "Created product"
    );
    Ok(created)
}

/// Merge `input` into the stored product and rewrite its category closure.
///
/// # Errors
///
/// [`CatalogError::NotFound`] for an unknown product, otherwise as [`create`].
pub async fn update(
    db: &DatabaseConnection,
    id: i32,
    input: ProductUpdate,
) -> Result<Product, CatalogError> {
    let txn = db.begin().await?;
    let model = ProductEntity::find_by_id(id)
        .one(&txn)
        .await?
        .ok_or_else(|| CatalogError::not_found(RESOURCE, id))?;
    let current = load_views(&txn, vec![model.clone()])
        .await?
        .pop()
        .ok_or_else(|| CatalogError::not_found(RESOURCE, id))?;

    let draft = ProductDraft {
        name: current.name,
        description: current.description,
        price: current.price,
        available_quantity: current.available_quantity,
        is_prescription_required: current.is_prescription_required,
        brand_id: current.brand_id,
        category_ids: current.category_ids.into_iter().collect(),
        ingredients: current
            .ingredients
            .into_iter()
            .map(|i| IngredientAmount {
                ingredient_id: i.ingredient_id,
                amount: i.amount,
                unit: i.unit,
            })
            .collect(),
    }
    .merge(input);
    draft.validate()?;

    let closure = ensure_references(&txn, &draft).await?;
    draft.apply_to(model.into_active_model()).update(&txn).await?;
    write_associations(&txn, id, &closure, &draft.ingredients).await?;
    let updated = load_view(&txn, id).await?;
    txn.commit().await?;

    tracing::info!(
        product_id = id,
        stored_categories = closure.len(),
        "Updated product"
    );
    Ok(updated)
}

/// Delete a product and its join rows.
///
/// # Errors
///
/// [`CatalogError::NotFound`] when the product does not exist.
pub async fn delete(db: &DatabaseConnection, id: i32) -> Result<i32, CatalogError> {
    let txn = db.begin().await?;
    if ProductEntity::find_by_id(id).one(&txn).await?.is_none() {
        return Err(CatalogError::not_found(RESOURCE, id));
    }
    ProductCategory::delete_many()
        .filter(product_category::Column::ProductId.eq(id))
        .exec(&txn)
        .await?;
    ProductIngredient::delete_many()
        .filter(product_ingredient::Column::ProductId.eq(id))
        .exec(&txn)
        .await?;
    ProductEntity::delete_by_id(id).exec(&txn).await?;
    txn.commit().await?;

    tracing::info!(product_id = id, "Deleted product");
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DbBackend, QueryTrait};

    fn draft() -> ProductDraft {
        ProductDraft {
            name: "Ibuprofen 200mg".to_string(),
            description: None,
            price: Decimal::new(499, 2),
            available_quantity: 10,
            is_prescription_required: false,
            brand_id: None,
            category_ids: BTreeSet::from([3]),
            ingredients: vec![IngredientAmount {
                ingredient_id: 1,
                amount: Decimal::new(200, 0),
                unit: "mg".to_string(),
            }],
        }
    }

    fn fields(result: Result<(), ValidationErrors>) -> Vec<String> {
        result
            .unwrap_err()
            .errors()
            .iter()
            .map(|e| e.field.clone())
            .collect()
    }

    #[test]
    fn test_valid_draft() {
        assert!(draft().validate().is_ok());
    }

    #[test]
    fn test_price_must_be_positive() {
        let mut d = draft();
        d.price = Decimal::ZERO;
        assert_eq!(fields(d.validate()), vec!["price"]);
    }

    #[test]
    fn test_quantity_not_negative() {
        let mut d = draft();
        d.available_quantity = -1;
        assert_eq!(fields(d.validate()), vec!["availableQuantity"]);
    }

    #[test]
    fn test_prescription_requires_zero_stock() {
        let mut d = draft();
        d.is_prescription_required = true;
        assert_eq!(fields(d.validate()), vec!["availableQuantity"]);

        d.available_quantity = 0;
        assert!(d.validate().is_ok());
    }

    #[test]
    fn test_ingredient_rules() {
        let mut d = draft();
        d.ingredients.push(IngredientAmount {
            ingredient_id: 1,
            amount: Decimal::ZERO,
            unit: " ".to_string(),
        });
        assert_eq!(
            fields(d.validate()),
            vec!["ingredients", "ingredients.amount", "ingredients.unit"]
        );
    }

    #[test]
    fn test_all_errors_reported_together() {
        let mut d = draft();
        d.name = String::new();
        d.price = Decimal::new(-1, 0);
        assert_eq!(fields(d.validate()), vec!["name", "price"]);
    }

    #[test]
    fn test_merge_keeps_absent_fields_and_clears_nulls() {
        let mut d = draft();
        d.brand_id = Some(4);
        d.description = Some("Pain relief".to_string());
        let update: ProductUpdate = serde_json::from_str(
            r#"{"price": "5.99", "brandId": null, "categoryIds": [5, 6]}"#,
        )
        .unwrap();
        let merged = d.clone().merge(update);
        assert_eq!(merged.price, Decimal::new(599, 2));
        assert_eq!(merged.brand_id, None);
        assert_eq!(merged.description, d.description);
        assert_eq!(merged.category_ids, BTreeSet::from([5, 6]));
        assert_eq!(merged.ingredients, d.ingredients);
    }

    #[test]
    fn test_category_filter_uses_join_table() {
        let filters: HashMap<String, Value> =
            serde_json::from_str(r#"{"categoryId": 2}"#).unwrap();
        let sql = ProductEntity::find()
            .filter(build_condition(&filters))
            .build(DbBackend::Sqlite)
            .to_string();
        assert!(sql.contains(r#"IN (SELECT "product_id" FROM "product_categories""#), "{sql}");
        assert!(sql.contains(r#""category_id" IN (2)"#), "{sql}");
    }

    #[test]
    fn test_category_filter_accepts_string_ids() {
        let filters: HashMap<String, Value> =
            serde_json::from_str(r#"{"categoryId": ["2", 5]}"#).unwrap();
        let sql = ProductEntity::find()
            .filter(build_condition(&filters))
            .build(DbBackend::Sqlite)
            .to_string();
        assert!(sql.contains(r#""category_id" IN (2, 5)"#), "{sql}");
    }
}
