pub mod order_products;
pub mod orders;
pub mod products;
pub mod users;

pub use order_products::Entity as OrderProducts;
pub use orders::Entity as Orders;
pub use products::Entity as Products;
pub use users::Entity as Users;
