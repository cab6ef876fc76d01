use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::cart::{Cart, CartLine, UpdateQuantityRequest},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{CartItem, Product},
    response::{ApiResponse, Meta},
    state::AppState,
};

#[derive(FromRow)]
struct CartLineRow {
    cart_id: Uuid,
    quantity: i32,
    product_id: Uuid,
    category_id: Uuid,
    name: String,
    description: Option<String>,
    price: i64,
    stock: i32,
    created_at: DateTime<Utc>,
}

/// A user with no cart rows simply gets an empty cart; this never fails
/// with NotFound. Line totals are derived from the current product price.
pub async fn get_cart(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<Cart>> {
    let rows = sqlx::query_as::<_, CartLineRow>(
        r#"
        SELECT ci.id AS cart_id, ci.quantity,
               p.id AS product_id, p.category_id, p.name, p.description,
               p.price, p.stock, p.created_at
        FROM cart_items ci
        JOIN products p ON p.id = ci.product_id
        WHERE ci.user_id = $1
        ORDER BY ci.created_at
        "#,
    )
    .bind(user.user_id)
    .fetch_all(&state.pool)
    .await?;

    let items: Vec<CartLine> = rows
        .into_iter()
        .map(|row| CartLine {
            id: row.cart_id,
            line_total: row.price * i64::from(row.quantity),
            quantity: row.quantity,
            product: Product {
                id: row.product_id,
                category_id: row.category_id,
                name: row.name,
                description: row.description,
                price: row.price,
                stock: row.stock,
                created_at: row.created_at,
            },
        })
        .collect();

    let total = items.iter().map(|line| line.line_total).sum();
    Ok(ApiResponse::success("OK", Cart { items, total }, None))
}

/// Insert a line with quantity 1, or bump an existing line by 1. The upsert
/// is a single statement keyed on the (user_id, product_id) unique index so
/// concurrent adds for the same product cannot lose updates.
pub async fn add_to_cart(
    state: &AppState,
    user: &AuthUser,
    product_id: Uuid,
) -> AppResult<ApiResponse<CartItem>> {
    let product_exist: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM products WHERE id = $1")
        .bind(product_id)
        .fetch_optional(&state.pool)
        .await?;
    if product_exist.is_none() {
        return Err(AppError::NotFound);
    }

    let cart_item = sqlx::query_as::<_, CartItem>(
        r#"
        INSERT INTO cart_items (id, user_id, product_id, quantity)
        VALUES ($1, $2, $3, 1)
        ON CONFLICT (user_id, product_id)
        DO UPDATE SET quantity = cart_items.quantity + 1
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user.user_id)
    .bind(product_id)
    .fetch_one(&state.pool)
    .await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "cart_add",
        Some("cart_items"),
        Some(serde_json::json!({ "product_id": product_id, "quantity": cart_item.quantity })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success("Added to cart", cart_item, None))
}

/// Set the quantity of an existing line. Quantity 0 removes the line,
/// negative quantities are rejected; a missing line is NotFound either way
/// and the cart is left untouched.
pub async fn update_quantity(
    state: &AppState,
    user: &AuthUser,
    product_id: Uuid,
    payload: UpdateQuantityRequest,
) -> AppResult<ApiResponse<Cart>> {
    if payload.quantity < 0 {
        return Err(AppError::BadRequest(
            "quantity must not be negative".to_string(),
        ));
    }

    if payload.quantity == 0 {
        let result = sqlx::query("DELETE FROM cart_items WHERE user_id = $1 AND product_id = $2")
            .bind(user.user_id)
            .bind(product_id)
            .execute(&state.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound);
        }
    } else {
        let updated: Option<CartItem> = sqlx::query_as(
            r#"
            UPDATE cart_items
            SET quantity = $3
            WHERE user_id = $1 AND product_id = $2
            RETURNING *
            "#,
        )
        .bind(user.user_id)
        .bind(product_id)
        .bind(payload.quantity)
        .fetch_optional(&state.pool)
        .await?;
        if updated.is_none() {
            return Err(AppError::NotFound);
        }
    }

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "cart_update",
        Some("cart_items"),
        Some(serde_json::json!({ "product_id": product_id, "quantity": payload.quantity })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    get_cart(state, user).await
}

/// Remove every line for the user. Clearing an already-empty cart succeeds.
pub async fn clear_cart(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<serde_json::Value>> {
    sqlx::query("DELETE FROM cart_items WHERE user_id = $1")
        .bind(user.user_id)
        .execute(&state.pool)
        .await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "cart_clear",
        Some("cart_items"),
        None,
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Cart cleared",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}
