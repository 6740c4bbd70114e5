//! `/ingredients` handlers.

use crate::ingredients::{Ingredient, IngredientCreate, IngredientUpdate};

super::crud::catalog_resource_handlers!(
    Ingredient,
    IngredientCreate,
    IngredientUpdate,
    "/ingredients",
    "/ingredients/{id}",
    "ingredient"
);
