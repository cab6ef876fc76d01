use crate::{
    audit::log_audit,
    dto::profile::UpdateProfileRequest,
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::Profile,
    response::ApiResponse,
    state::AppState,
};

pub async fn get_profile(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<Profile>> {
    let profile: Option<Profile> = sqlx::query_as("SELECT * FROM profiles WHERE user_id = $1")
        .bind(user.user_id)
        .fetch_optional(&state.pool)
        .await?;

    let profile = match profile {
        Some(p) => p,
        None => return Err(AppError::NotFound),
    };
    Ok(ApiResponse::success("Profile", profile, None))
}

/// Full replacement of the mutable attributes for the caller's row.
pub async fn update_profile(
    state: &AppState,
    user: &AuthUser,
    payload: UpdateProfileRequest,
) -> AppResult<ApiResponse<Profile>> {
    let profile: Option<Profile> = sqlx::query_as(
        r#"
        UPDATE profiles
        SET first_name = $2, last_name = $3, phone = $4, email = $5,
            address = $6, city = $7, state = $8, zip = $9, updated_at = now()
        WHERE user_id = $1
        RETURNING *
        "#,
    )
    .bind(user.user_id)
    .bind(payload.first_name)
    .bind(payload.last_name)
    .bind(payload.phone)
    .bind(payload.email)
    .bind(payload.address)
    .bind(payload.city)
    .bind(payload.state)
    .bind(payload.zip)
    .fetch_optional(&state.pool)
    .await?;

    let profile = match profile {
        Some(p) => p,
        None => return Err(AppError::NotFound),
    };

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "profile_update",
        Some("profiles"),
        Some(serde_json::json!({ "user_id": user.user_id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success("Profile updated", profile, None))
}
