//! Schema migrations, run on server start-up and by the test suite.

use sea_orm_migration::prelude::*;

use crate::entities::{
    Brand, Category, Ingredient, Product, ProductCategory, ProductIngredient, brand, category,
    ingredient, product, product_category, product_ingredient,
};

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(CreateCategoryTable), Box::new(CreateProductTables)]
    }
}

pub struct CreateCategoryTable;

impl MigrationName for CreateCategoryTable {
    fn name(&self) -> &'static str {
        "m20240101_000001_create_category_table"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for CreateCategoryTable {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let table = Table::create()
            .table(Category)
            .if_not_exists()
            .col(
                ColumnDef::new(category::Column::Id)
                    .integer()
                    .not_null()
                    .auto_increment()
                    .primary_key(),
            )
            .col(ColumnDef::new(category::Column::Name).string().not_null())
            .col(
                ColumnDef::new(category::Column::ParentCategoryId)
                    .integer()
                    .null(),
            )
            .foreign_key(
                ForeignKey::create()
                    .name("fk_categories_parent")
                    .from(Category, category::Column::ParentCategoryId)
                    .to(Category, category::Column::Id),
            )
            .to_owned();

        manager.create_table(table).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Category).to_owned())
            .await?;
        Ok(())
    }
}

pub struct CreateProductTables;

impl MigrationName for CreateProductTables {
    fn name(&self) -> &'static str {
        "m20240101_000002_create_product_tables"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for CreateProductTables {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Brand)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(brand::Column::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(brand::Column::Name)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Ingredient)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ingredient::Column::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ingredient::Column::Name)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Product)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(product::Column::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(product::Column::Name).string().not_null())
                    .col(ColumnDef::new(product::Column::Description).text().null())
                    .col(
                        ColumnDef::new(product::Column::Price)
                            .decimal_len(10, 2)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(product::Column::AvailableQuantity)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(product::Column::IsPrescriptionRequired)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(product::Column::BrandId).integer().null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_products_brand")
                            .from(Product, product::Column::BrandId)
                            .to(Brand, brand::Column::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ProductCategory)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(product_category::Column::ProductId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(product_category::Column::CategoryId)
                            .integer()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(product_category::Column::ProductId)
                            .col(product_category::Column::CategoryId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_product_categories_product")
                            .from(ProductCategory, product_category::Column::ProductId)
                            .to(Product, product::Column::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_product_categories_category")
                            .from(ProductCategory, product_category::Column::CategoryId)
                            .to(Category, category::Column::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_product_categories_category")
                    .table(ProductCategory)
                    .col(product_category::Column::CategoryId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ProductIngredient)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(product_ingredient::Column::ProductId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(product_ingredient::Column::IngredientId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(product_ingredient::Column::Amount)
                            .decimal_len(10, 3)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(product_ingredient::Column::Unit)
                            .string()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(product_ingredient::Column::ProductId)
                            .col(product_ingredient::Column::IngredientId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_product_ingredients_product")
                            .from(ProductIngredient, product_ingredient::Column::ProductId)
                            .to(Product, product::Column::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_product_ingredients_ingredient")
                            .from(ProductIngredient, product_ingredient::Column::IngredientId)
                            .to(Ingredient, ingredient::Column::Id),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Reverse dependency order
        manager
            .drop_table(Table::drop().table(ProductIngredient).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ProductCategory).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Product).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Ingredient).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Brand).to_owned())
            .await?;
        Ok(())
    }
}
