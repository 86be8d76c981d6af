use axum::http::StatusCode;
use axum_ecommerce_crud::{
    db::{create_orm_conn, run_migrations},
    entity::{OrderProducts, order_products},
    error::AppError,
    models::{Order, Product, User},
    response::MessageBody,
    routes::create_router,
    services::order_product_service::{ALREADY_IN_ORDER, insert_link},
    state::AppState,
};
use axum_test::TestServer;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use serde_json::{Value, json};

// Each test gets its own in-memory SQLite database behind the real router.
async fn setup() -> (TestServer, AppState) {
    let orm = create_orm_conn("sqlite::memory:", 1)
        .await
        .expect("sqlite connection");
    run_migrations(&orm).await.expect("migrations");
    let state = AppState { orm };
    let server = TestServer::new(create_router(state.clone())).expect("test server");
    (server, state)
}

async fn create_user(server: &TestServer, name: &str) -> User {
    let response = server
        .post("/users")
        .json(&json!({
            "name": name,
            "email": format!("{}@example.com", name.to_lowercase()),
            "street_number": 12,
            "street_name": "Main St",
            "city": "Portland",
            "state": "OR",
            "zip_code": "97201"
        }))
        .await;
    response.assert_status(StatusCode::CREATED);
    response.json::<User>()
}

async fn create_product(server: &TestServer, name: &str, price: f64) -> Product {
    let response = server
        .post("/products")
        .json(&json!({ "name": name, "price": price }))
        .await;
    response.assert_status(StatusCode::CREATED);
    response.json::<Product>()
}

async fn create_order(server: &TestServer, user_id: i32) -> Order {
    let response = server
        .post("/orders")
        .json(&json!({ "order_date": "2024-05-01T09:30:00", "user_id": user_id }))
        .await;
    response.assert_status(StatusCode::CREATED);
    response.json::<Order>()
}

async fn linked_products(state: &AppState, order_id: i32) -> u64 {
    OrderProducts::find()
        .filter(order_products::Column::OrderId.eq(order_id))
        .count(&state.orm)
        .await
        .expect("count association rows")
}

#[tokio::test]
async fn created_user_is_retrievable_by_assigned_id() {
    let (server, _) = setup().await;

    let user = create_user(&server, "Alice").await;
    assert!(user.id > 0);
    assert_eq!(user.city.as_deref(), Some("Portland"));

    let fetched = server.get(&format!("/users/{}", user.id)).await;
    fetched.assert_status_ok();
    assert_eq!(fetched.json::<User>(), user);

    let all = server.get("/users").await.json::<Vec<User>>();
    assert_eq!(all, vec![user]);
}

#[tokio::test]
async fn user_with_only_a_name_is_accepted() {
    let (server, _) = setup().await;

    let response = server.post("/users").json(&json!({ "name": "Min" })).await;
    response.assert_status(StatusCode::CREATED);
    let user = response.json::<User>();
    assert_eq!(user.email, None);
    assert_eq!(user.street_number, None);
}

#[tokio::test]
async fn validation_reports_every_bad_field() {
    let (server, _) = setup().await;

    let response = server
        .post("/users")
        .json(&json!({ "email": 5, "street_number": "twelve", "nickname": "al" }))
        .await;
    response.assert_status_bad_request();

    let body = response.json::<Value>();
    let errors = &body["validation_errors"];
    assert_eq!(errors["name"], json!(["Missing data for required field."]));
    assert_eq!(errors["email"], json!(["Not a valid string."]));
    assert_eq!(errors["street_number"], json!(["Not a valid integer."]));
    assert_eq!(errors["nickname"], json!(["Unknown field."]));

    let users = server.get("/users").await.json::<Vec<User>>();
    assert!(users.is_empty());
}

#[tokio::test]
async fn negative_price_is_rejected() {
    let (server, _) = setup().await;

    let response = server
        .post("/products")
        .json(&json!({ "name": "Broken", "price": -1.5 }))
        .await;
    response.assert_status_bad_request();
    assert_eq!(
        response.json::<Value>()["validation_errors"]["price"],
        json!(["Must be greater than or equal to 0."])
    );
}

#[tokio::test]
async fn missing_records_return_404_with_message() {
    let (server, _) = setup().await;

    for path in ["/users/99", "/products/99", "/orders/99"] {
        let response = server.get(path).await;
        response.assert_status_not_found();
    }

    let response = server.delete("/users/99").await;
    response.assert_status_not_found();
    assert_eq!(response.json::<MessageBody>().message, "User not found");
}

#[tokio::test]
async fn order_for_unknown_user_returns_404_and_persists_nothing() {
    let (server, _) = setup().await;

    let response = server
        .post("/orders")
        .json(&json!({ "order_date": "2024-05-01T09:30:00", "user_id": 42 }))
        .await;
    response.assert_status_not_found();
    assert_eq!(response.json::<MessageBody>().message, "User not found");

    let orders = server.get("/orders").await.json::<Vec<Order>>();
    assert!(orders.is_empty());
}

#[tokio::test]
async fn adding_the_same_product_twice_conflicts() {
    let (server, state) = setup().await;
    let user = create_user(&server, "Alice").await;
    let order = create_order(&server, user.id).await;

    let response = server
        .post("/products")
        .json(&json!({ "name": "Widget", "price": 9.99 }))
        .await;
    response.assert_status(StatusCode::CREATED);
    assert_eq!(
        response.json::<Value>(),
        json!({ "id": 1, "name": "Widget", "price": 9.99 })
    );

    let path = format!("/orders/{}/products", order.id);
    let first = server.post(&path).json(&json!({ "product_id": 1 })).await;
    first.assert_status_ok();
    assert_eq!(
        first.json::<MessageBody>().message,
        format!("Product 1 added to order {}", order.id)
    );

    let second = server.post(&path).json(&json!({ "product_id": 1 })).await;
    second.assert_status_bad_request();
    assert_eq!(second.json::<MessageBody>().message, "Product already in order");

    assert_eq!(linked_products(&state, order.id).await, 1);
    let products = server.get(&path).await.json::<Vec<Product>>();
    assert_eq!(products.len(), 1);
    assert_eq!(products[0].name, "Widget");
}

#[tokio::test]
async fn add_product_checks_body_and_existence() {
    let (server, _) = setup().await;
    let user = create_user(&server, "Alice").await;
    let order = create_order(&server, user.id).await;
    let path = format!("/orders/{}/products", order.id);

    let missing = server.post(&path).json(&json!({})).await;
    missing.assert_status_bad_request();
    assert_eq!(
        missing.json::<Value>()["validation_errors"]["product_id"],
        json!(["Missing data for required field."])
    );

    let unknown_product = server.post(&path).json(&json!({ "product_id": 7 })).await;
    unknown_product.assert_status_not_found();
    assert_eq!(
        unknown_product.json::<MessageBody>().message,
        "Product not found"
    );

    let unknown_order = server
        .post("/orders/99/products")
        .json(&json!({ "product_id": 1 }))
        .await;
    unknown_order.assert_status_not_found();
    assert_eq!(unknown_order.json::<MessageBody>().message, "Order not found");
}

#[tokio::test]
async fn removing_a_product_not_in_the_order_changes_nothing() {
    let (server, state) = setup().await;
    let user = create_user(&server, "Alice").await;
    let order = create_order(&server, user.id).await;
    let kept = create_product(&server, "Kept", 1.0).await;
    let stranger = create_product(&server, "Stranger", 2.0).await;

    server
        .post(&format!("/orders/{}/products", order.id))
        .json(&json!({ "product_id": kept.id }))
        .await
        .assert_status_ok();

    let response = server
        .delete(&format!("/orders/{}/products/{}", order.id, stranger.id))
        .await;
    response.assert_status_not_found();
    assert_eq!(response.json::<MessageBody>().message, "Product not in order");
    assert_eq!(linked_products(&state, order.id).await, 1);

    let removed = server
        .delete(&format!("/orders/{}/products/{}", order.id, kept.id))
        .await;
    removed.assert_status_ok();
    assert_eq!(
        removed.json::<MessageBody>().message,
        format!("Product {} removed from order {}", kept.id, order.id)
    );
    assert_eq!(linked_products(&state, order.id).await, 0);
}

#[tokio::test]
async fn duplicate_association_insert_is_a_conflict() {
    let (server, state) = setup().await;
    let user = create_user(&server, "Alice").await;
    let order = create_order(&server, user.id).await;
    let widget = create_product(&server, "Widget", 9.99).await;

    insert_link(&state.orm, order.id, widget.id)
        .await
        .expect("first insert");
    let second = insert_link(&state.orm, order.id, widget.id).await;
    assert!(
        matches!(&second, Err(AppError::Conflict(message)) if message == ALREADY_IN_ORDER),
        "unexpected result: {second:?}"
    );
    assert_eq!(linked_products(&state, order.id).await, 1);
}

#[tokio::test]
async fn removing_from_missing_order_or_product_is_404() {
    let (server, _) = setup().await;
    let user = create_user(&server, "Alice").await;
    let order = create_order(&server, user.id).await;
    let widget = create_product(&server, "Widget", 9.99).await;

    let no_order = server
        .delete(&format!("/orders/99/products/{}", widget.id))
        .await;
    no_order.assert_status_not_found();
    assert_eq!(no_order.json::<MessageBody>().message, "Order not found");

    let no_product = server
        .delete(&format!("/orders/{}/products/999", order.id))
        .await;
    no_product.assert_status_not_found();
    assert_eq!(no_product.json::<MessageBody>().message, "Product not found");
}

#[tokio::test]
async fn malformed_order_bodies_are_rejected() {
    let (server, _) = setup().await;
    let user = create_user(&server, "Alice").await;
    let order = create_order(&server, user.id).await;

    let created = server
        .post("/orders")
        .json(&json!({ "order_date": "yesterday" }))
        .await;
    created.assert_status_bad_request();
    let errors = &created.json::<Value>()["validation_errors"];
    assert_eq!(errors["order_date"], json!(["Not a valid datetime."]));
    assert_eq!(errors["user_id"], json!(["Missing data for required field."]));
    assert_eq!(server.get("/orders").await.json::<Vec<Order>>().len(), 1);

    let updated = server
        .put(&format!("/orders/{}", order.id))
        .json(&json!({ "order_date": "not a date" }))
        .await;
    updated.assert_status_bad_request();
    assert_eq!(
        updated.json::<Value>()["validation_errors"]["order_date"],
        json!(["Not a valid datetime."])
    );
    let unchanged = server
        .get(&format!("/orders/{}", order.id))
        .await
        .json::<Order>();
    assert_eq!(unchanged, order);
}

#[tokio::test]
async fn deleting_an_order_keeps_its_user_and_products() {
    let (server, state) = setup().await;
    let user = create_user(&server, "Alice").await;
    let order = create_order(&server, user.id).await;
    let widget = create_product(&server, "Widget", 9.99).await;
    let gadget = create_product(&server, "Gadget", 19.5).await;

    for product in [&widget, &gadget] {
        server
            .post(&format!("/orders/{}/products", order.id))
            .json(&json!({ "product_id": product.id }))
            .await
            .assert_status_ok();
    }

    let response = server.delete(&format!("/orders/{}", order.id)).await;
    response.assert_status_ok();
    assert_eq!(
        response.json::<MessageBody>().message,
        format!("Order {} deleted successfully", order.id)
    );

    server
        .get(&format!("/orders/{}", order.id))
        .await
        .assert_status_not_found();
    assert_eq!(linked_products(&state, order.id).await, 0);
    server.get(&format!("/users/{}", user.id)).await.assert_status_ok();
    server
        .get(&format!("/products/{}", widget.id))
        .await
        .assert_status_ok();
    server
        .get(&format!("/products/{}", gadget.id))
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn deleting_a_product_removes_it_from_orders() {
    let (server, _) = setup().await;
    let user = create_user(&server, "Alice").await;
    let order = create_order(&server, user.id).await;
    let widget = create_product(&server, "Widget", 9.99).await;

    server
        .post(&format!("/orders/{}/products", order.id))
        .json(&json!({ "product_id": widget.id }))
        .await
        .assert_status_ok();

    let response = server.delete(&format!("/products/{}", widget.id)).await;
    response.assert_status_ok();
    assert_eq!(
        response.json::<MessageBody>().message,
        format!("Product {} deleted successfully", widget.id)
    );

    let products = server
        .get(&format!("/orders/{}/products", order.id))
        .await
        .json::<Vec<Product>>();
    assert!(products.is_empty());
}

#[tokio::test]
async fn deleting_a_user_removes_their_orders() {
    let (server, state) = setup().await;
    let alice = create_user(&server, "Alice").await;
    let bob = create_user(&server, "Bob").await;
    let alice_order = create_order(&server, alice.id).await;
    let bob_order = create_order(&server, bob.id).await;
    let widget = create_product(&server, "Widget", 9.99).await;

    for order in [&alice_order, &bob_order] {
        server
            .post(&format!("/orders/{}/products", order.id))
            .json(&json!({ "product_id": widget.id }))
            .await
            .assert_status_ok();
    }

    let response = server.delete(&format!("/users/{}", alice.id)).await;
    response.assert_status_ok();
    assert_eq!(
        response.json::<MessageBody>().message,
        "User deleted successfully"
    );

    let orders = server.get("/orders").await.json::<Vec<Order>>();
    assert_eq!(orders, vec![bob_order.clone()]);
    assert_eq!(linked_products(&state, alice_order.id).await, 0);
    assert_eq!(linked_products(&state, bob_order.id).await, 1);
}

#[tokio::test]
async fn partial_update_leaves_other_fields_untouched() {
    let (server, _) = setup().await;
    let product = create_product(&server, "Widget", 9.99).await;

    let response = server
        .put(&format!("/products/{}", product.id))
        .json(&json!({ "price": 12.5 }))
        .await;
    response.assert_status_ok();
    let updated = response.json::<Product>();
    assert_eq!(updated.name, "Widget");
    assert_eq!(updated.price, 12.5);

    let user = create_user(&server, "Alice").await;
    let response = server
        .put(&format!("/users/{}", user.id))
        .json(&json!({ "city": "Salem", "zip_code": null }))
        .await;
    response.assert_status_ok();
    let updated = response.json::<User>();
    assert_eq!(updated.name, "Alice");
    assert_eq!(updated.email, user.email);
    assert_eq!(updated.city.as_deref(), Some("Salem"));
    assert_eq!(updated.zip_code, None);
}

#[tokio::test]
async fn empty_update_returns_the_record_unchanged() {
    let (server, _) = setup().await;
    let product = create_product(&server, "Widget", 9.99).await;

    let response = server
        .put(&format!("/products/{}", product.id))
        .json(&json!({}))
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Product>(), product);
}

#[tokio::test]
async fn update_of_missing_record_is_404_even_with_bad_body() {
    let (server, _) = setup().await;

    let response = server
        .put("/products/5")
        .json(&json!({ "price": "free" }))
        .await;
    response.assert_status_not_found();
    assert_eq!(response.json::<MessageBody>().message, "Product not found");
}

#[tokio::test]
async fn order_update_checks_the_new_user() {
    let (server, _) = setup().await;
    let alice = create_user(&server, "Alice").await;
    let bob = create_user(&server, "Bob").await;
    let order = create_order(&server, alice.id).await;
    let path = format!("/orders/{}", order.id);

    let response = server.put(&path).json(&json!({ "user_id": 404 })).await;
    response.assert_status_not_found();
    assert_eq!(response.json::<MessageBody>().message, "User not found");
    let unchanged = server.get(&path).await.json::<Order>();
    assert_eq!(unchanged.user_id, alice.id);

    let response = server.put(&path).json(&json!({ "user_id": bob.id })).await;
    response.assert_status_ok();
    let moved = response.json::<Order>();
    assert_eq!(moved.user_id, bob.id);
    assert_eq!(moved.order_date, order.order_date);
}

#[tokio::test]
async fn user_orders_view_lists_only_that_users_orders() {
    let (server, _) = setup().await;
    let alice = create_user(&server, "Alice").await;
    let bob = create_user(&server, "Bob").await;
    let first = create_order(&server, alice.id).await;
    let second = create_order(&server, alice.id).await;
    create_order(&server, bob.id).await;

    let orders = server
        .get(&format!("/users/{}/orders", alice.id))
        .await
        .json::<Vec<Order>>();
    assert_eq!(orders, vec![first, second]);

    server.get("/users/99/orders").await.assert_status_not_found();
    server
        .get("/orders/99/products")
        .await
        .assert_status_not_found();
}

#[tokio::test]
async fn order_date_with_offset_is_stored_in_utc() {
    let (server, _) = setup().await;
    let user = create_user(&server, "Alice").await;

    let response = server
        .post("/orders")
        .json(&json!({ "order_date": "2024-05-01T12:30:00+02:00", "user_id": user.id }))
        .await;
    response.assert_status(StatusCode::CREATED);
    assert_eq!(
        response.json::<Value>()["order_date"],
        json!("2024-05-01T10:30:00")
    );
}

#[tokio::test]
async fn unknown_route_falls_back_to_404() {
    let (server, _) = setup().await;

    let response = server.get("/nowhere").await;
    response.assert_status_not_found();
    assert_eq!(response.json::<Value>()["path"], json!("/nowhere"));
}

#[tokio::test]
async fn non_integer_path_ids_return_json_404() {
    let (server, _) = setup().await;

    for path in ["/orders/abc", "/users/99999999999", "/orders/abc/products"] {
        let response = server.get(path).await;
        response.assert_status_not_found();
    }

    let response = server.delete("/orders/1/products/x").await;
    response.assert_status_not_found();
    assert_eq!(response.json::<MessageBody>().message, "Not Found");
}
