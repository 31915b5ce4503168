use std::sync::Arc;

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::context::AppContext;

/// UI settings that outlive a single run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default)]
    pub dark_mode: bool,
}

pub async fn get_preferences(State(ctx): State<Arc<AppContext>>) -> Json<Preferences> {
    Json(ctx.preferences().await)
}

pub async fn update_preferences(
    State(ctx): State<Arc<AppContext>>,
    Json(preferences): Json<Preferences>,
) -> Json<Preferences> {
    ctx.set_preferences(preferences.clone()).await;
    Json(preferences)
}
