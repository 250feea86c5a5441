use axum::{routing::post, Router};
use registry::AppRegistry;

use crate::handler::borrowing::{register_borrowing, return_borrowing, show_borrowing_list};

pub fn build_borrowing_routers() -> Router<AppRegistry> {
    let routers = Router::new()
        .route("/", post(register_borrowing).get(show_borrowing_list))
        .route("/:borrowing_id/return", post(return_borrowing));
    Router::new().nest("/borrowings", routers)
}
