use axum::routing::get;
use axum::Router;
use http::header::{ACCEPT, CONTENT_TYPE, ORIGIN};
use http::Method;
use tower_http::cors::{Any, CorsLayer};

pub mod client;
pub mod presign;

use crate::ServiceState;

/// Path the browser editor asks for upload grants on.
pub const PRESIGN_PATH: &str = "/generate-presigned-url";

pub fn router(state: ServiceState) -> Router<ServiceState> {
    let cors_layer = CorsLayer::new()
        .allow_methods(vec![Method::GET])
        .allow_headers(vec![ACCEPT, CONTENT_TYPE, ORIGIN])
        .allow_origin(Any)
        .allow_credentials(false);

    Router::new()
        .route(PRESIGN_PATH, get(presign::handler))
        .with_state(state)
        .layer(cors_layer)
}
