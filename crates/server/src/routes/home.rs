//! Root redirect and API description.

use axum::{
    Json,
    extract::State,
    response::{IntoResponse, Redirect},
};
use serde::Serialize;

use crate::routes::ROUTES;
use crate::state::AppState;

/// `/` sends clients to the API description.
pub async fn home(State(state): State<AppState>) -> impl IntoResponse {
    Redirect::temporary(&state.config().docs_url)
}

#[derive(Debug, Serialize)]
pub struct ApiDocs {
    pub title: &'static str,
    pub version: &'static str,
    pub routes: Vec<RouteDoc>,
}

#[derive(Debug, Serialize)]
pub struct RouteDoc {
    pub method: &'static str,
    pub path: &'static str,
    pub auth: bool,
    pub description: &'static str,
}

/// JSON description of every route.
pub async fn docs() -> Json<ApiDocs> {
    Json(ApiDocs {
        title: "flatshop",
        version: env!("CARGO_PKG_VERSION"),
        routes: ROUTES
            .iter()
            .map(|&(method, path, auth, description)| RouteDoc {
                method,
                path,
                auth,
                description,
            })
            .collect(),
    })
}
