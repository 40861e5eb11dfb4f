// HTTP handlers for admin settings

use axum::{extract::State, Json};
use validator::Validate;

use crate::error::ApiError;
use crate::settings::AdminSettings;
use crate::AppState;

/// Handler for GET /api/settings
/// Returns stored settings, or defaults if none were saved yet
#[utoipa::path(
    get,
    path = "/api/settings",
    responses((status = 200, description = "Current settings", body = AdminSettings)),
    tag = "settings"
)]
pub async fn get_settings(State(state): State<AppState>) -> Result<Json<AdminSettings>, ApiError> {
    let settings = state.settings.load().await?;
    Ok(Json(settings))
}

/// Handler for PUT /api/settings
/// Replaces the settings record
#[utoipa::path(
    put,
    path = "/api/settings",
    request_body = AdminSettings,
    responses(
        (status = 200, description = "Settings saved", body = AdminSettings),
        (status = 400, description = "Invalid settings")
    ),
    tag = "settings"
)]
pub async fn update_settings(
    State(state): State<AppState>,
    Json(mut payload): Json<AdminSettings>,
) -> Result<Json<AdminSettings>, ApiError> {
    payload.validate()?;

    payload.currency = payload.currency.trim().to_uppercase();
    state.settings.save(&payload).await?;

    tracing::info!(
        "Settings updated: currency={}, tax_rate={}, shipping_fee={}",
        payload.currency,
        payload.tax_rate,
        payload.shipping_fee
    );
    Ok(Json(payload))
}
