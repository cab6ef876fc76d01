use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ConnectionTrait, Set, Statement};
use storefront_api::{
    db::{create_orm_conn, create_pool, run_migrations},
    dto::{
        auth::RegisterRequest,
        cart::UpdateQuantityRequest,
        categories::{CreateCategoryRequest, UpdateCategoryRequest},
        products::CreateProductRequest,
        profile::UpdateProfileRequest,
    },
    entity::{
        categories::ActiveModel as CategoryActive, products::ActiveModel as ProductActive,
        users::ActiveModel as UserActive,
    },
    error::AppError,
    middleware::auth::AuthUser,
    routes::params::Pagination,
    services::{auth_service, cart_service, category_service, product_service, profile_service},
    state::AppState,
};
use uuid::Uuid;

// Integration flow: shopper fills and edits a cart; registration creates a
// profile which is then replaced; admin manages the catalog.
#[tokio::test]
async fn cart_profile_and_catalog_flow() -> anyhow::Result<()> {
    // Allow skipping when no DB is configured in the environment.
    let database_url =
        match std::env::var("TEST_DATABASE_URL").or_else(|_| std::env::var("DATABASE_URL")) {
            Ok(url) => url,
            Err(_) => {
                eprintln!(
                    "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests."
                );
                return Ok(());
            }
        };

    let state = setup_state(&database_url).await?;

    // Seed a shopper and a catalog entry directly.
    let user_id = create_user(&state, "user", "flow-shopper").await?;
    let shopper = AuthUser {
        user_id,
        role: "user".into(),
    };
    let admin = AuthUser {
        user_id: create_user(&state, "admin", "flow-admin").await?,
        role: "admin".into(),
    };

    let category = CategoryActive {
        id: Set(Uuid::new_v4()),
        name: Set("Flow Widgets".into()),
        description: Set(Some("Widgets for the flow test".into())),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    let product = ProductActive {
        id: Set(Uuid::new_v4()),
        category_id: Set(category.id),
        name: Set("Flow Widget".into()),
        description: Set(Some("A widget for testing".into())),
        price: Set(1000),
        stock: Set(10),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    // A user with no rows gets an empty cart, not an error.
    let cart = cart_service::get_cart(&state, &shopper).await?.data.unwrap();
    assert!(cart.items.is_empty());
    assert_eq!(cart.total, 0);

    // Adding an unknown product is NotFound.
    let err = cart_service::add_to_cart(&state, &shopper, Uuid::new_v4())
        .await
        .expect_err("unknown product");
    assert!(matches!(err, AppError::NotFound));

    // First add inserts with quantity 1, second add bumps to 2.
    let line = cart_service::add_to_cart(&state, &shopper, product.id)
        .await?
        .data
        .unwrap();
    assert_eq!(line.quantity, 1);
    let line = cart_service::add_to_cart(&state, &shopper, product.id)
        .await?
        .data
        .unwrap();
    assert_eq!(line.quantity, 2);

    // Explicit quantity update; line total and cart total derive from price.
    let cart = cart_service::update_quantity(
        &state,
        &shopper,
        product.id,
        UpdateQuantityRequest { quantity: 5 },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(cart.items.len(), 1);
    assert_eq!(cart.items[0].quantity, 5);
    assert_eq!(cart.items[0].line_total, 5000);
    assert_eq!(cart.total, 5000);

    // Re-applying the same quantity leaves the cart unchanged.
    let again = cart_service::update_quantity(
        &state,
        &shopper,
        product.id,
        UpdateQuantityRequest { quantity: 5 },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(again.items[0].quantity, 5);
    assert_eq!(again.total, cart.total);

    // Updating a line that does not exist fails and leaves the cart alone.
    let err = cart_service::update_quantity(
        &state,
        &shopper,
        Uuid::new_v4(),
        UpdateQuantityRequest { quantity: 3 },
    )
    .await
    .expect_err("missing line");
    assert!(matches!(err, AppError::NotFound));
    let cart = cart_service::get_cart(&state, &shopper).await?.data.unwrap();
    assert_eq!(cart.items[0].quantity, 5);

    // Negative quantities are rejected; zero removes the line.
    let err = cart_service::update_quantity(
        &state,
        &shopper,
        product.id,
        UpdateQuantityRequest { quantity: -1 },
    )
    .await
    .expect_err("negative quantity");
    assert!(matches!(err, AppError::BadRequest(_)));
    let cart = cart_service::update_quantity(
        &state,
        &shopper,
        product.id,
        UpdateQuantityRequest { quantity: 0 },
    )
    .await?
    .data
    .unwrap();
    assert!(cart.items.is_empty());

    // Clearing is idempotent.
    cart_service::add_to_cart(&state, &shopper, product.id).await?;
    cart_service::clear_cart(&state, &shopper).await?;
    let cart = cart_service::get_cart(&state, &shopper).await?.data.unwrap();
    assert!(cart.items.is_empty());
    cart_service::clear_cart(&state, &shopper).await?;

    // Registration creates the user together with a blank profile.
    let registered = auth_service::register_user(
        &state,
        RegisterRequest {
            username: "flow-registered".into(),
            password: "secret123".into(),
        },
    )
    .await?
    .data
    .unwrap();
    let registered_user = AuthUser {
        user_id: registered.id,
        role: "user".into(),
    };
    let profile = profile_service::get_profile(&state, &registered_user)
        .await?
        .data
        .unwrap();
    assert_eq!(profile.user_id, registered.id);
    assert_eq!(profile.first_name, "");

    // Duplicate usernames are rejected.
    let err = auth_service::register_user(
        &state,
        RegisterRequest {
            username: "flow-registered".into(),
            password: "secret123".into(),
        },
    )
    .await
    .expect_err("duplicate username");
    assert!(matches!(err, AppError::BadRequest(_)));

    // Replace the profile attributes and read them back.
    let updated = profile_service::update_profile(
        &state,
        &registered_user,
        UpdateProfileRequest {
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            phone: "555-0100".into(),
            email: "ada@example.com".into(),
            address: "12 Analytical Way".into(),
            city: "London".into(),
            state: "LDN".into(),
            zip: "12345".into(),
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(updated.first_name, "Ada");
    let profile = profile_service::get_profile(&state, &registered_user)
        .await?
        .data
        .unwrap();
    assert_eq!(profile.email, "ada@example.com");

    // A caller without a profile row gets NotFound, not a server error.
    let ghost = AuthUser {
        user_id: Uuid::new_v4(),
        role: "user".into(),
    };
    let err = profile_service::get_profile(&state, &ghost)
        .await
        .expect_err("no profile row");
    assert!(matches!(err, AppError::NotFound));

    // Catalog management.
    let created = category_service::create_category(
        &state,
        &admin,
        CreateCategoryRequest {
            name: "Flow Gadgets".into(),
            description: None,
        },
    )
    .await?
    .data
    .unwrap();
    let fetched = category_service::get_category(&state, created.id)
        .await?
        .data
        .unwrap();
    assert_eq!(fetched.name, "Flow Gadgets");

    let renamed = category_service::update_category(
        &state,
        &admin,
        created.id,
        UpdateCategoryRequest {
            name: Some("Flow Gizmos".into()),
            description: Some("Renamed".into()),
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(renamed.name, "Flow Gizmos");

    // Products must reference an existing category.
    let err = product_service::create_product(
        &state,
        &admin,
        CreateProductRequest {
            category_id: Uuid::new_v4(),
            name: "Orphan".into(),
            description: None,
            price: 100,
            stock: 1,
        },
    )
    .await
    .expect_err("bogus category");
    assert!(matches!(err, AppError::BadRequest(_)));

    let gadget = product_service::create_product(
        &state,
        &admin,
        CreateProductRequest {
            category_id: created.id,
            name: "Flow Gizmo".into(),
            description: Some("Shiny".into()),
            price: 2500,
            stock: 3,
        },
    )
    .await?
    .data
    .unwrap();

    let listing = product_service::list_products_by_category(
        &state,
        created.id,
        Pagination {
            page: Some(1),
            per_page: Some(20),
        },
    )
    .await?
    .data
    .unwrap();
    assert!(listing.items.iter().any(|p| p.id == gadget.id));

    let err = product_service::list_products_by_category(
        &state,
        Uuid::new_v4(),
        Pagination {
            page: None,
            per_page: None,
        },
    )
    .await
    .expect_err("unknown category");
    assert!(matches!(err, AppError::NotFound));

    // A category with products cannot be deleted until they are gone.
    let err = category_service::delete_category(&state, &admin, created.id)
        .await
        .expect_err("category in use");
    assert!(matches!(err, AppError::BadRequest(_)));

    product_service::delete_product(&state, &admin, gadget.id).await?;
    category_service::delete_category(&state, &admin, created.id).await?;
    let err = category_service::get_category(&state, created.id)
        .await
        .expect_err("deleted category");
    assert!(matches!(err, AppError::NotFound));

    Ok(())
}

async fn setup_state(database_url: &str) -> anyhow::Result<AppState> {
    let pool = create_pool(database_url).await?;
    let orm = create_orm_conn(database_url).await?;
    run_migrations(&orm).await?;

    // Clean tables between runs
    let backend = orm.get_database_backend();
    orm.execute(Statement::from_string(
        backend,
        "TRUNCATE TABLE cart_items, audit_logs, products, categories, profiles, users RESTART IDENTITY CASCADE",
    ))
    .await?;

    Ok(AppState { pool, orm })
}

async fn create_user(state: &AppState, role: &str, username: &str) -> anyhow::Result<Uuid> {
    let user = UserActive {
        id: Set(Uuid::new_v4()),
        username: Set(username.to_string()),
        password_hash: Set("dummy".into()),
        role: Set(role.into()),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(user.id)
}
