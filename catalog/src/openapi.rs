use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};

use crate::routes;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Pharmacy Catalog API",
        description = "Pharmacy catalog. Products carry the ancestor closure of their categories."
    ),
    paths(
        routes::categories::list_categories,
        routes::categories::get_category,
        routes::categories::create_category,
        routes::categories::update_category,
        routes::categories::delete_category,
        routes::products::list_products,
        routes::products::get_product,
        routes::products::create_product,
        routes::products::update_product,
        routes::products::delete_product,
        routes::brands::get_all_handler,
        routes::brands::get_one_handler,
        routes::brands::create_one_handler,
        routes::brands::update_one_handler,
        routes::brands::delete_one_handler,
        routes::ingredients::get_all_handler,
        routes::ingredients::get_one_handler,
        routes::ingredients::create_one_handler,
        routes::ingredients::update_one_handler,
        routes::ingredients::delete_one_handler,
    ),
    components(schemas(
        crate::categories::Category,
        crate::categories::CategoryCreate,
        crate::categories::CategoryUpdate,
        crate::products::Product,
        crate::products::ProductCreate,
        crate::products::ProductUpdate,
        crate::products::IngredientAmount,
        crate::products::ProductIngredientView,
        crate::brands::Brand,
        crate::brands::BrandCreate,
        crate::brands::BrandUpdate,
        crate::ingredients::Ingredient,
        crate::ingredients::IngredientCreate,
        crate::ingredients::IngredientUpdate,
    )),
    modifiers(&BearerAuth)
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
            );
        }
    }
}
