// Product writes: validation, reference checks, closure persistence and listing.

use axum::http::StatusCode;
use rust_decimal::Decimal;
use serde_json::{Value, json};
use std::str::FromStr;

mod common;
use common::{
    admin, category_ids, create_category, encode_query, get, setup_test_app, setup_test_db,
};

async fn create_named(app: &axum::Router, uri: &str, name: &str) -> i64 {
    let response = admin(app, "POST", uri, Some(json!({ "name": name }))).await;
    assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
    response.body["id"].as_i64().unwrap()
}

fn decimal(value: &Value) -> Decimal {
    match value {
        Value::String(s) => Decimal::from_str(s).unwrap(),
        other => Decimal::from_str(&other.to_string()).unwrap(),
    }
}

#[tokio::test]
async fn test_product_crud_with_brand_and_ingredients() {
    let db = setup_test_db().await.expect("Failed to setup test database");
    let app = setup_test_app(db);

    let brand = create_named(&app, "/brands", "Nurofen").await;
    let ibuprofen = create_named(&app, "/ingredients", "Ibuprofen").await;
    let pain = create_category(&app, "Pain Relief", None).await;

    let response = admin(
        &app,
        "POST",
        "/products",
        Some(json!({
            "name": "Nurofen Express",
            "description": "Fast pain relief",
            "price": "6.49",
            "availableQuantity": 30,
            "brandId": brand,
            "categoryIds": [pain],
            "ingredients": [{ "ingredientId": ibuprofen, "amount": "200", "unit": "mg" }]
        })),
    )
    .await;
    assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
    let product = response.body;
    let id = product["id"].as_i64().unwrap();
    assert_eq!(product["brandId"], brand);
    assert_eq!(decimal(&product["price"]).round_dp(2), Decimal::new(649, 2));
    assert_eq!(product["ingredients"][0]["name"], "Ibuprofen");
    assert_eq!(product["ingredients"][0]["unit"], "mg");
    assert_eq!(category_ids(&product), vec![pain]);

    // Partial update: clear the description, keep everything else
    let response = admin(
        &app,
        "PUT",
        &format!("/products/{id}"),
        Some(json!({ "description": null, "availableQuantity": 5 })),
    )
    .await;
    assert_eq!(response.status, StatusCode::OK, "{}", response.body);
    assert!(response.body["description"].is_null());
    assert_eq!(response.body["availableQuantity"], 5);
    assert_eq!(response.body["name"], "Nurofen Express");
    assert_eq!(response.body["ingredients"].as_array().unwrap().len(), 1);
    assert_eq!(category_ids(&response.body), vec![pain]);

    let response = admin(&app, "DELETE", &format!("/products/{id}"), None).await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);
    let response = get(&app, &format!("/products/{id}")).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    // Join rows went with the product, so the references can be deleted too
    let response = admin(&app, "DELETE", &format!("/ingredients/{ibuprofen}"), None).await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);
    let response = admin(&app, "DELETE", &format!("/categories/{pain}"), None).await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_update_recomputes_closure() {
    let db = setup_test_db().await.expect("Failed to setup test database");
    let app = setup_test_app(db);

    let medicine = create_category(&app, "Medicine", None).await;
    let allergy = create_category(&app, "Allergy", Some(medicine)).await;
    let cosmetics = create_category(&app, "Cosmetics", None).await;
    let skin = create_category(&app, "Skin", Some(cosmetics)).await;

    let response = admin(
        &app,
        "POST",
        "/products",
        Some(json!({ "name": "Antihistamine Cream", "price": 8, "categoryIds": [allergy] })),
    )
    .await;
    let id = response.body["id"].as_i64().unwrap();
    assert_eq!(category_ids(&response.body), vec![medicine, allergy]);

    let response = admin(
        &app,
        "PUT",
        &format!("/products/{id}"),
        Some(json!({ "categoryIds": [allergy, skin] })),
    )
    .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(category_ids(&response.body), vec![medicine, allergy, cosmetics, skin]);

    let response = admin(
        &app,
        "PUT",
        &format!("/products/{id}"),
        Some(json!({ "categoryIds": [] })),
    )
    .await;
    assert!(category_ids(&response.body).is_empty());
}

#[tokio::test]
async fn test_unknown_category_is_bad_request_and_writes_nothing() {
    let db = setup_test_db().await.expect("Failed to setup test database");
    let app = setup_test_app(db);

    let real = create_category(&app, "Real", None).await;
    let response = admin(
        &app,
        "POST",
        "/products",
        Some(json!({ "name": "Phantom", "price": 1, "categoryIds": [real, 404] })),
    )
    .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "One or more categories were not found");

    let response = get(&app, "/products").await;
    assert_eq!(response.body, json!([]));
    assert_eq!(response.content_range.as_deref(), Some("products 0-0/0"));
}

#[tokio::test]
async fn test_unknown_brand_and_ingredient_are_bad_requests() {
    let db = setup_test_db().await.expect("Failed to setup test database");
    let app = setup_test_app(db);

    let response = admin(
        &app,
        "POST",
        "/products",
        Some(json!({ "name": "Generic", "price": 1, "brandId": 7 })),
    )
    .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "One or more brands were not found");

    let response = admin(
        &app,
        "POST",
        "/products",
        Some(json!({
            "name": "Generic",
            "price": 1,
            "ingredients": [{ "ingredientId": 3, "amount": 1, "unit": "g" }]
        })),
    )
    .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "One or more ingredients were not found");
}

#[tokio::test]
async fn test_validation_rules() {
    let db = setup_test_db().await.expect("Failed to setup test database");
    let app = setup_test_app(db);

    let response = admin(
        &app,
        "POST",
        "/products",
        Some(json!({ "name": "", "price": 0, "availableQuantity": -2 })),
    )
    .await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response.body["details"].as_array().unwrap().len(), 3);

    let response = admin(
        &app,
        "POST",
        "/products",
        Some(json!({
            "name": "Amoxicillin",
            "price": "9.90",
            "availableQuantity": 4,
            "isPrescriptionRequired": true
        })),
    )
    .await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        response.body["details"],
        json!(["availableQuantity: Must be 0 for prescription products"])
    );

    let response = admin(
        &app,
        "POST",
        "/products",
        Some(json!({ "name": "Amoxicillin", "price": "9.90", "isPrescriptionRequired": true })),
    )
    .await;
    assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
    let id = response.body["id"].as_i64().unwrap();

    // The rule is checked against the merged record
    let response = admin(
        &app,
        "PUT",
        &format!("/products/{id}"),
        Some(json!({ "availableQuantity": 3 })),
    )
    .await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_list_filter_sort_and_range() {
    let db = setup_test_db().await.expect("Failed to setup test database");
    let app = setup_test_app(db);

    let seed = [
        ("Aspirin", "2.50"),
        ("Zinc", "5.00"),
        ("Melatonin", "7.25"),
        ("Aspirin Plus", "3.10"),
    ];
    for (name, price) in seed {
        let body = json!({ "name": name, "price": price });
        let response = admin(&app, "POST", "/products", Some(body)).await;
        assert_eq!(response.status, StatusCode::CREATED);
    }

    let sort = encode_query(r#"["price","DESC"]"#);
    let range = encode_query("[0,1]");
    let response = get(&app, &format!("/products?sort={sort}&range={range}")).await;
    assert_eq!(response.status, StatusCode::OK);
    let names: Vec<&str> = response
        .body
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Melatonin", "Zinc"]);
    assert_eq!(response.content_range.as_deref(), Some("products 0-1/4"));

    let filter = encode_query(&json!({ "q": "aspirin" }).to_string());
    let response = get(&app, &format!("/products?filter={filter}")).await;
    assert_eq!(response.body.as_array().unwrap().len(), 2);

    let filter = encode_query(&json!({ "id": [1, 3] }).to_string());
    let response = get(&app, &format!("/products?filter={filter}")).await;
    assert_eq!(response.content_range.as_deref(), Some("products 0-1/2"));
}
