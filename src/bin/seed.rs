use axum_ecommerce_crud::{
    config::AppConfig,
    db::{create_orm_conn, run_migrations},
    entity::{
        Products, Users,
        products::{ActiveModel as ProductActive, Column as ProdCol},
        users::{ActiveModel as UserActive, Column as UserCol},
    },
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let orm = create_orm_conn(&config.database_url, config.max_connections).await?;
    // Ensure migrations are applied.
    run_migrations(&orm).await?;

    let alice = ensure_user(&orm, "Alice Smith", "alice@example.com", "Springfield").await?;
    let bob = ensure_user(&orm, "Bob Jones", "bob@example.com", "Shelbyville").await?;
    seed_products(&orm).await?;

    println!("Seed completed. User IDs: {alice}, {bob}");
    Ok(())
}

async fn ensure_user(
    orm: &DatabaseConnection,
    name: &str,
    email: &str,
    city: &str,
) -> anyhow::Result<i32> {
    let existing = Users::find()
        .filter(UserCol::Email.eq(email))
        .one(orm)
        .await?;
    if let Some(user) = existing {
        return Ok(user.id);
    }

    let user = UserActive {
        name: Set(name.to_string()),
        email: Set(Some(email.to_string())),
        street_number: Set(Some(742)),
        street_name: Set(Some("Evergreen Terrace".to_string())),
        city: Set(Some(city.to_string())),
        state: Set(Some("OR".to_string())),
        zip_code: Set(Some("97403".to_string())),
        ..Default::default()
    }
    .insert(orm)
    .await?;

    println!("Ensured user {email}");
    Ok(user.id)
}

async fn seed_products(orm: &DatabaseConnection) -> anyhow::Result<()> {
    let products = vec![
        ("Widget", 9.99),
        ("Gadget", 24.50),
        ("Sprocket", 3.75),
        ("Gizmo", 120.0),
    ];

    for (name, price) in products {
        let exists = Products::find()
            .filter(ProdCol::Name.eq(name))
            .one(orm)
            .await?
            .is_some();
        if exists {
            continue;
        }
        ProductActive {
            name: Set(name.to_string()),
            price: Set(price),
            ..Default::default()
        }
        .insert(orm)
        .await?;
    }

    println!("Seeded products");
    Ok(())
}
