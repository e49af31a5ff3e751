use crate::controller::{health_check_controller, oauth_controller};
use crate::response::callback_error::CallbackError;
use crate::AppState;
use axum::{routing::get, Router};

use utoipa::OpenApi;
use utoipa_rapidoc::RapiDoc;

// This is the global definition of our OpenAPI document. To be a part
// of the rendered document, a path and schema must be listed here.
#[derive(OpenApi)]
#[openapi(
        info(
            title = "Reclique Login API"
        ),
        paths(
            health_check_controller::health_check,
            oauth_controller::authenticate_redirect,
            oauth_controller::authenticate_callback,
        ),
        components(
            schemas(
                CallbackError,
            )
        ),
        tags(
            (name = "reclique_login", description = "Reclique member login for Virtual Y")
        )
    )]
struct ApiDoc;

pub fn define_routes(app_state: AppState) -> Router {
    Router::new()
        .merge(health_routes())
        .merge(oauth_routes(app_state))
        .merge(RapiDoc::with_openapi("/api-docs/openapi.json", ApiDoc::openapi()).path("/rapidoc"))
}

fn health_routes() -> Router {
    Router::new().route("/health", get(health_check_controller::health_check))
}

fn oauth_routes(app_state: AppState) -> Router {
    Router::new()
        .route(
            "/reclique/oauth2/authenticate",
            get(oauth_controller::authenticate_redirect),
        )
        .route(
            "/reclique/oauth2/callback",
            get(oauth_controller::authenticate_callback),
        )
        .with_state(app_state)
}
