//! Admin dashboard API: list, edit, delete, CSV export, stats, and the
//! gateway payment-status refresh. Every route here sits behind the JWT
//! middleware.

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, HeaderValue},
    Json,
};
use serde::{Deserialize, Serialize};

use infra::pagination::LimitOffset;
use infra::{PaymentStatus, RegistrationPatch, RegistrationRow, RegistrationStats, TrackingId};

use crate::error::AppError;
use crate::services::registration::RefreshOutcome;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PageParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminPatch {
    pub company_name: Option<String>,
    pub payment_status: Option<PaymentStatus>,
}

#[derive(Debug, Serialize)]
pub struct Deleted {
    pub deleted: u64,
}

/// GET /api/admin/registrations
pub async fn list(
    State(state): State<AppState>,
    Query(page): Query<PageParams>,
) -> Result<Json<Vec<RegistrationRow>>, AppError> {
    let page = LimitOffset::from_params(page.limit, page.offset);
    let rows = state.store().list_all(Some(page)).await?;
    Ok(Json(rows))
}

/// GET /api/admin/stats
pub async fn stats(State(state): State<AppState>) -> Result<Json<RegistrationStats>, AppError> {
    Ok(Json(state.store().stats().await?))
}

/// PATCH /api/admin/registrations/:id. Edits company name and/or payment
/// status across the event's rows.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<AdminPatch>,
) -> Result<Json<Vec<RegistrationRow>>, AppError> {
    let id = parse_id(&id)?;
    let patch = RegistrationPatch {
        company_name: patch.company_name,
        payment_status: patch.payment_status,
        payment_reference: None,
        payment_date: None,
    };
    let updated = state.store().apply_patch(&id, &patch).await?;
    if updated == 0 {
        return Err(AppError::NotFound);
    }
    let rows = state.store().find_by_tracking_id(&id).await?;
    Ok(Json(rows))
}

/// POST /api/admin/registrations/:id/refresh-payment
pub async fn refresh_payment(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<RefreshOutcome>, AppError> {
    let outcome = state.registration().refresh_payment_status(&id).await?;
    Ok(Json(outcome))
}

/// DELETE /api/admin/registrations/:id
pub async fn delete_one(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Deleted>, AppError> {
    let id = parse_id(&id)?;
    let deleted = state.store().delete_event(&id).await?;
    if deleted == 0 {
        return Err(AppError::NotFound);
    }
    Ok(Json(Deleted { deleted }))
}

/// DELETE /api/admin/registrations: clear everything.
pub async fn clear_all(State(state): State<AppState>) -> Result<Json<Deleted>, AppError> {
    let deleted = state.store().delete_all().await?;
    Ok(Json(Deleted { deleted }))
}

/// GET /api/admin/registrations/export: the dashboard's CSV download.
pub async fn export_csv(
    State(state): State<AppState>,
) -> Result<(HeaderMap, String), AppError> {
    let rows = state.store().list_all(None).await?;

    let mut csv = String::from(
        "ID,Company Name,Team,Captain,Contact Phone,Payment Status,Amount,Player 1,Player 2,Player 3\n",
    );
    for row in &rows {
        let amount = row.amount.to_string();
        let fields = [
            row.id.as_str(),
            row.company_name.as_str(),
            row.team_number.as_str(),
            row.captain_name.as_str(),
            row.contact_phone.as_str(),
            row.payment_status.as_str(),
            amount.as_str(),
            row.player1_name.as_str(),
            row.player2_name.as_str(),
            row.player3_name.as_deref().unwrap_or(""),
        ]
        .map(csv_field);
        csv.push_str(&fields.join(","));
        csv.push('\n');
    }

    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/csv"));
    headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_static("attachment; filename=\"registrations.csv\""),
    );
    Ok((headers, csv))
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn parse_id(raw: &str) -> Result<TrackingId, AppError> {
    TrackingId::normalize(raw)
        .ok_or_else(|| AppError::Validation("Tracking id must be 6 digits.".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_fields_are_quoted_when_needed() {
        assert_eq!(csv_field("Acme Corp"), "Acme Corp");
        assert_eq!(csv_field("Acme, Inc"), "\"Acme, Inc\"");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }
}
