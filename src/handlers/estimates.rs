use axum::Json;

use crate::auth::SessionId;
use crate::error::{ApiResult, AppError, ValidationError};
use crate::models::estimate::{EstimateRequest, EstimateResponse, TreeContributionResponse};
use crate::services::credit_estimator;

/// POST /api/estimates - preview of the offset a submission would carry
pub async fn estimate(
    _session: SessionId,
    Json(request): Json<EstimateRequest>,
) -> ApiResult<EstimateResponse> {
    if request.trees.is_empty() {
        return Err(AppError::from(ValidationError::new(
            "trees",
            "at least one tree is required",
        ))
        .into());
    }

    let trees = credit_estimator::validate_trees(&request.trees).map_err(AppError::from)?;
    let equipment =
        credit_estimator::validate_equipment(&request.equipment).map_err(AppError::from)?;
    let estimate = credit_estimator::estimate(&trees, &equipment);

    Ok(Json(EstimateResponse {
        estimated_co2_offset: estimate.total,
        tree_count: estimate.tree_count,
        impact_note: estimate.impact_note,
        trees: estimate
            .contributions
            .into_iter()
            .map(|c| TreeContributionResponse {
                species_name: c.species_name,
                rate: c.rate,
                contribution: c.contribution,
            })
            .collect(),
    }))
}
