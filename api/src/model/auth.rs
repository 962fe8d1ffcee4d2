use kernel::model::id::UserId;
use serde::{Deserialize, Serialize};

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct AccessTokenResponse {
    pub user_id: UserId,
    pub access_token: String,
}
