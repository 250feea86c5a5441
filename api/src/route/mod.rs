use axum::Router;
use registry::AppRegistry;

pub mod auth;
pub mod book;
pub mod borrowing;
pub mod health;
pub mod payment;

pub fn routes() -> Router<AppRegistry> {
    let router = Router::new()
        .merge(health::build_health_check_routers())
        .merge(auth::build_auth_routers())
        .merge(book::build_book_routers())
        .merge(borrowing::build_borrowing_routers())
        .merge(payment::build_payment_routers());
    Router::new().nest("/api", router)
}
