use serde::Deserialize;
use utoipa::ToSchema;

/// Full replacement of the mutable profile attributes. The owning user id
/// always comes from the authenticated caller, never from the body.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateProfileRequest {
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub email: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip: String,
}
