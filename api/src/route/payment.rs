use axum::{
    routing::{get, post},
    Router,
};
use registry::AppRegistry;

use crate::handler::payment::{
    checkout_cancel, checkout_success, create_checkout_session, show_payment_list,
};

pub fn build_payment_routers() -> Router<AppRegistry> {
    let routers = Router::new()
        .route("/create-checkout-session", post(create_checkout_session))
        .route("/success", get(checkout_success))
        .route("/cancel", post(checkout_cancel))
        .route("/payments", get(show_payment_list));
    Router::new().nest("/payment", routers)
}
