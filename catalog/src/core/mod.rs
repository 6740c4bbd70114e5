// Generic CRUD for flat catalog resources (brands, ingredients).
// Categories and products carry relational rules and have their own services.

pub mod traits;

pub use traits::{CatalogResource, MergeIntoActiveModel};
