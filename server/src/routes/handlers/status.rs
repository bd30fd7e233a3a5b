use axum::{extract::State, Json};
use chrono::Utc;
use serde_json::{json, Value};

use crate::{
    model::response::{CategoriesResponse, ConfigurationStatus},
    state::AppContext,
};

pub async fn root() -> Json<Value> {
    Json(json!({
        "message": "AI Maintenance Supervisor API",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running"
    }))
}

pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": Utc::now().to_rfc3339()
    }))
}

pub async fn config_status(State(ctx): State<AppContext>) -> Json<ConfigurationStatus> {
    Json(ctx.configuration_status())
}

pub async fn categories() -> Json<CategoriesResponse> {
    Json(CategoriesResponse::from_glyph_table())
}
