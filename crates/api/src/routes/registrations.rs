use axum::{
    extract::{Path, State},
    Json,
};

use infra::RegistrationRow;

use crate::committee::CommitteeMember;
use crate::error::AppError;
use crate::forms::{PaymentRequest, RegistrationForm};
use crate::services::registration::{Finalized, Submission};
use crate::state::AppState;

/// POST /api/registrations: the completed multi-step form.
pub async fn submit(
    State(state): State<AppState>,
    Json(form): Json<RegistrationForm>,
) -> Result<Json<Submission>, AppError> {
    let submission = state.registration().submit(&form).await?;
    Ok(Json(submission))
}

/// GET /api/registrations/:id. Serves the tracking page and the printable
/// receipt.
pub async fn lookup(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<RegistrationRow>>, AppError> {
    let rows = state.registration().lookup(&id).await?;
    Ok(Json(rows))
}

/// POST /api/registrations/:id/payment. Payment-method confirmation.
pub async fn complete_payment(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<PaymentRequest>,
) -> Result<Json<Finalized>, AppError> {
    let finalized = state.registration().complete_payment(&id, &request).await?;
    Ok(Json(finalized))
}

/// GET /api/committee-members: the offline-payment dropdown.
pub async fn committee_members(State(state): State<AppState>) -> Json<Vec<CommitteeMember>> {
    Json(state.committee().members().to_vec())
}
