use axum::{
    routing::{delete, get, post, put},
    Router,
};
use registry::AppRegistry;

use crate::handler::booking::{
    check_prices, check_spaces, delete_booking, register_booking, show_booking, show_booking_list,
    update_booking,
};

pub fn build_booking_routers() -> Router<AppRegistry> {
    let bookings_routers = Router::new()
        .route("/", post(register_booking))
        .route("/", get(show_booking_list))
        .route("/:booking_id", get(show_booking))
        .route("/:booking_id", put(update_booking).patch(update_booking))
        .route("/:booking_id", delete(delete_booking));

    Router::new()
        .nest("/bookings", bookings_routers)
        .route("/bookings-check", get(check_spaces))
        .route("/price-check", get(check_prices))
}
