use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct BatchRequest {
    pub action: String,
    #[serde(default)]
    pub ids: Vec<String>,
}

/// Decode the batch body explicitly so a malformed request gets the JSON
/// error shape instead of the framework's default rejection.
fn parse_request(body: Value) -> Result<BatchRequest, AppError> {
    serde_json::from_value(body)
        .map_err(|e| AppError::BadRequest(format!("Invalid batch request: {e}")))
}

/// `POST /roommates/batch` — bulk delete or availability toggle.
///
/// Toggle walks the ids sequentially with no cross-document transaction:
/// a failure partway leaves earlier documents flipped, and the response
/// reports only the aggregate modifiedCount.
pub async fn batch_operation(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, AppError> {
    let request = parse_request(body)?;
    if request.ids.is_empty() {
        return Err(AppError::BadRequest("ids required".to_string()));
    }

    match request.action.as_str() {
        "delete" => {
            let modified = state.repo.delete_many(&request.ids).await?;
            tracing::info!(count = modified, "batch delete");
            Ok(Json(json!({ "message": "Listings deleted", "modifiedCount": modified })))
        }
        "toggle-availability" => {
            let mut modified = 0u64;
            for id in &request.ids {
                let Some(listing) = state.repo.find_by_id(id).await? else {
                    continue;
                };
                if state
                    .repo
                    .set_availability(id, listing.availability.toggled())
                    .await?
                {
                    modified += 1;
                }
            }
            tracing::info!(count = modified, "batch availability toggle");
            Ok(Json(json!({ "message": "Availability toggled", "modifiedCount": modified })))
        }
        other => Err(AppError::BadRequest(format!("Invalid action: {other}"))),
    }
}
