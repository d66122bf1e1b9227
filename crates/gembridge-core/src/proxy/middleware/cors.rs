// CORS middleware
use axum::http::Method;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

/// Any browser origin may call the gateway; the origin is mirrored back.
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
        .allow_credentials(false)
        .max_age(std::time::Duration::from_secs(3600))
}
