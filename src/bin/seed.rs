use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use shop_billing::{
    config::AppConfig,
    db::{create_orm_conn, run_migrations},
    dto::{customers::CreateCustomerRequest, products::CreateProductRequest},
    entity::{
        customers::{Column as CustomerCol, Entity as Customers},
        products::{Column as ProductCol, Entity as Products},
    },
    models::Money,
    services::{catalog_service, party_service},
    state::AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let orm = create_orm_conn(&config.database_url, 1).await?;
    // Ensure migrations are applied.
    run_migrations(&orm).await?;
    let state = AppState::new(orm, config.stock_policy);

    let walk_in_id = party_service::ensure_walk_in_customer(&state.orm).await?;
    let staff_id = ensure_staff(&state, "admin", "admin123", "Store Administrator").await?;
    seed_customers(&state).await?;
    seed_products(&state).await?;

    println!("Seed completed. Walk-in customer ID: {walk_in_id}, Staff ID: {staff_id}");
    Ok(())
}

async fn ensure_staff(
    state: &AppState,
    username: &str,
    password: &str,
    full_name: &str,
) -> anyhow::Result<i32> {
    if let Some(existing) = party_service::find_user_by_username(&state.orm, username).await? {
        return Ok(existing.id);
    }
    let user = party_service::create_user(&state.orm, username, password, full_name, "admin").await?;
    println!("Ensured user {username} (role=admin)");
    Ok(user.id)
}

async fn seed_customers(state: &AppState) -> anyhow::Result<()> {
    let customers = [
        ("John Doe", "john@example.com", "081234567890", "Jl. Merdeka No. 1"),
        ("Jane Smith", "jane@example.com", "081234567891", "Jl. Sudirman No. 2"),
        ("Mike Johnson", "mike@example.com", "081234567892", "Jl. Thamrin No. 3"),
        ("Sarah Wilson", "sarah@example.com", "081234567893", "Jl. Gatot Subroto No. 4"),
    ];

    for (name, email, phone, address) in customers {
        let existing = Customers::find()
            .filter(CustomerCol::Email.eq(email))
            .count(&state.orm)
            .await?;
        if existing > 0 {
            continue;
        }
        party_service::create_customer(
            &state.orm,
            CreateCustomerRequest {
                name: name.to_owned(),
                username: None,
                email: Some(email.to_owned()),
                phone: Some(phone.to_owned()),
                address: Some(address.to_owned()),
            },
        )
        .await?;
    }

    println!("Seeded customers");
    Ok(())
}

async fn seed_products(state: &AppState) -> anyhow::Result<()> {
    let products = [
        ("Laptop Dell Inspiron", "15 inch laptop", 4_500_000, 10, "Electronics", "1234567890123"),
        ("Wireless Mouse", "2.4GHz wireless mouse", 120_000, 50, "Electronics", "1234567890124"),
        ("Office Chair", "Ergonomic office chair", 850_000, 15, "Furniture", "1234567890125"),
        ("Coffee Mug", "Ceramic coffee mug", 25_000, 100, "Kitchen", "1234567890126"),
        ("Notebook A4", "A4 ruled notebook", 15_000, 200, "Stationery", "1234567890127"),
        ("Smartphone Samsung", "Android smartphone", 2_500_000, 25, "Electronics", "1234567890128"),
        ("Desk Lamp", "LED desk lamp", 180_000, 30, "Furniture", "1234567890129"),
        ("Water Bottle", "Stainless steel bottle", 45_000, 75, "Kitchen", "1234567890130"),
    ];

    for (name, description, price, stock, category, barcode) in products {
        let existing = Products::find()
            .filter(ProductCol::Barcode.eq(barcode))
            .count(&state.orm)
            .await?;
        if existing > 0 {
            continue;
        }
        catalog_service::create_product(
            state,
            CreateProductRequest {
                name: name.to_owned(),
                description: Some(description.to_owned()),
                price: Money::from_cents(price),
                stock_quantity: stock,
                category: Some(category.to_owned()),
                barcode: Some(barcode.to_owned()),
                image_path: None,
            },
        )
        .await?;
    }

    println!("Seeded products");
    Ok(())
}
