//! Sea-ORM entities for the catalog tables.
//!
//! Many-to-many links are explicit join entities (`product_category`,
//! `product_ingredient`) keyed by id pairs, so services query them directly
//! instead of walking navigation properties.

pub mod brand;
pub mod category;
pub mod ingredient;
pub mod product;
pub mod product_category;
pub mod product_ingredient;

pub use brand::Entity as Brand;
pub use category::Entity as Category;
pub use ingredient::Entity as Ingredient;
pub use product::Entity as Product;
pub use product_category::Entity as ProductCategory;
pub use product_ingredient::Entity as ProductIngredient;
