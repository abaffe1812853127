//! Default tool messages, by language.

use crate::state::AppState;
use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect},
    routing::get,
    Json, Router,
};
use tracing::info;

pub const DEFAULT_LANGUAGE: &str = "en";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/default-tools-messages", get(redirect_to_default))
        .route("/default-tools-messages/", get(redirect_to_default))
        .route("/default-tools-messages/:lang", get(messages_for_language))
}

async fn redirect_to_default() -> Redirect {
    Redirect::temporary(&format!("/default-tools-messages/{DEFAULT_LANGUAGE}"))
}

async fn messages_for_language(
    State(state): State<AppState>,
    Path(lang): Path<String>,
) -> impl IntoResponse {
    info!(lang = %lang, "Default tool messages requested");
    Json(state.messages.for_language(&lang))
}
