use axum::{http::Method, Router};
use std::path::Path;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

pub mod bookings;
pub mod cars;
pub mod error;
pub mod health;
pub mod images;
pub mod middleware;
pub mod state;

pub use state::AppState;

/// The rental API. Resource routes answer both at the root and under `/api`,
/// where the browser client expects them.
///
/// With `static_root` set, files under it are served first (so
/// `/cars/swift.svg` is the image, not a car lookup) and every other request
/// falls through to the API. Both go through the same layers.
pub fn app(state: AppState, static_root: Option<&Path>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::USER_AGENT,
        ]);

    let api = Router::new()
        .merge(api_routes())
        .nest("/api", api_routes())
        .merge(health::routes())
        .with_state(state.clone());

    let routed = match static_root {
        Some(root) => Router::new().fallback_service(
            ServeDir::new(root)
                .append_index_html_on_directories(false)
                .call_fallback_on_method_not_allowed(true)
                .fallback(api),
        ),
        None => api,
    };

    routed
        .layer(axum::middleware::from_fn_with_state(
            state,
            middleware::record_requests,
        ))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::new())
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(cars::routes())
        .merge(bookings::routes())
        .merge(images::routes())
}
