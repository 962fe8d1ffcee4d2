use axum::{
    routing::{get, post},
    Router,
};
use registry::AppRegistry;

use crate::handler::auth::{login, logout, register_user, show_current_user};

pub fn build_auth_routers() -> Router<AppRegistry> {
    Router::new()
        .route("/register", post(register_user))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/user", get(show_current_user))
}
