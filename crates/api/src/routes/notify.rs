//! The thin email relay: accepts the raw form payload and sends the admin
//! alert plus the registrant confirmation. Unlike the lifecycle, a dispatch
//! failure here is the endpoint's whole job, so it surfaces as HTTP 500.

use axum::{extract::State, Json};
use serde::Deserialize;
use serde_json::{json, Value};

use infra::{PaymentMethod, PaymentStatus};

use crate::error::AppError;
use crate::forms::RegistrationForm;
use crate::services::RegistrationNotice;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailRelayRequest {
    pub form_data: RelayForm,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayForm {
    #[serde(flatten)]
    pub form: RegistrationForm,
    #[serde(default)]
    pub tracking_id: Option<String>,
    #[serde(default)]
    pub payment_details: Option<RelayPaymentDetails>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayPaymentDetails {
    #[serde(default)]
    pub method: Option<PaymentMethod>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub committee_member: Option<RelayCommitteeMember>,
}

#[derive(Debug, Deserialize)]
pub struct RelayCommitteeMember {
    pub name: String,
}

/// POST /api/send-email
pub async fn send_email(
    State(state): State<AppState>,
    Json(request): Json<EmailRelayRequest>,
) -> Result<Json<Value>, AppError> {
    let service = state.registration();
    let relay = request.form_data;

    let amount = service.fee_per_team() * relay.form.teams.len() as i32;
    let mut notice = RegistrationNotice::from_form(&relay.form, amount);
    notice.tracking_id = relay.tracking_id;
    if let Some(payment) = relay.payment_details {
        notice.payment_method = payment.method;
        notice.payment_status = payment.status.as_deref().map(PaymentStatus::from_provider);
        notice.committee_member = payment.committee_member.map(|m| m.name);
    }

    if let Some(warning) = service.dispatch_notifications(&notice).await {
        return Err(AppError::Notification(warning));
    }
    Ok(Json(json!({ "success": true })))
}
