use utoipa::{OpenApi, openapi::OpenApi as OpenApiSpec};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        orders::{AddProductRequest, OrderRequest},
        products::ProductRequest,
        users::UserRequest,
    },
    models::{Order, Product, User},
    response::{ErrorBody, MessageBody, ValidationErrorBody},
    routes::{health, orders, products, users},
    validation::ValidationErrors,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        users::create_user,
        users::list_users,
        users::get_user,
        users::update_user,
        users::delete_user,
        users::list_user_orders,
        products::list_products,
        products::create_product,
        products::get_product,
        products::update_product,
        products::delete_product,
        orders::create_order,
        orders::list_orders,
        orders::get_order,
        orders::update_order,
        orders::delete_order,
        orders::list_order_products,
        orders::add_product_to_order,
        orders::remove_product_from_order
    ),
    components(
        schemas(
            User,
            Product,
            Order,
            UserRequest,
            ProductRequest,
            OrderRequest,
            AddProductRequest,
            MessageBody,
            ErrorBody,
            ValidationErrorBody,
            ValidationErrors,
            health::HealthData
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Users", description = "User endpoints"),
        (name = "Products", description = "Product endpoints"),
        (name = "Orders", description = "Order endpoints and order products"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
