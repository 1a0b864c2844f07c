//! The registration lifecycle: submit the validated form, branch on the
//! payment method, and expose final state for the receipt and tracking
//! pages.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};

use infra::{
    NewRegistration, PaymentMethod, PaymentStatus, PaymentUpdate, RegistrationPatch,
    RegistrationRow, RegistrationStore, StoreError, TrackingId,
};

use crate::committee::CommitteeRoster;
use crate::error::AppError;
use crate::forms::{PaymentRequest, RegistrationForm};
use crate::services::gateway::PaymentGateway;
use crate::services::notifier::{NotificationDispatcher, RegistrationNotice};
use crate::services::tracking;
use crate::validation;

/// Insert attempts per submission. Each retry re-allocates after losing the
/// allocation race at the storage layer.
const MAX_INSERT_ATTEMPTS: u32 = 3;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub tracking_id: TrackingId,
    pub teams: usize,
    pub amount: i32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Finalized {
    pub tracking_id: TrackingId,
    pub payment_status: PaymentStatus,
    pub payment_method: PaymentMethod,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub committee_member: Option<String>,
    /// Where to send the registrant next; present for online payments.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_url: Option<String>,
    /// Non-fatal notification failure, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshOutcome {
    pub updated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_status: Option<PaymentStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_reference: Option<String>,
}

#[derive(Clone)]
pub struct RegistrationService {
    store: Arc<dyn RegistrationStore>,
    notifier: Arc<dyn NotificationDispatcher>,
    committee: Arc<CommitteeRoster>,
    gateway: PaymentGateway,
    fee_per_team: i32,
}

impl RegistrationService {
    pub fn new(
        store: Arc<dyn RegistrationStore>,
        notifier: Arc<dyn NotificationDispatcher>,
        committee: Arc<CommitteeRoster>,
        gateway: PaymentGateway,
        fee_per_team: i32,
    ) -> Self {
        Self {
            store,
            notifier,
            committee,
            gateway,
            fee_per_team,
        }
    }

    pub fn fee_per_team(&self) -> i32 {
        self.fee_per_team
    }

    /// Validate the form, allocate a tracking id and persist one row per
    /// team, atomically. Nothing is written when validation fails.
    pub async fn submit(&self, form: &RegistrationForm) -> Result<Submission, AppError> {
        validation::validate_submission(form)?;

        let amount = self.fee_per_team * form.teams.len() as i32;

        for attempt in 1..=MAX_INSERT_ATTEMPTS {
            let id = tracking::allocate(self.store.as_ref()).await?;
            let rows = build_rows(&id, form, amount);
            match self.store.insert_event(&rows).await {
                Ok(()) => {
                    info!(tracking_id = %id, teams = rows.len(), amount, "registration submitted");
                    return Ok(Submission {
                        tracking_id: id,
                        teams: rows.len(),
                        amount,
                    });
                }
                Err(StoreError::DuplicateId) => {
                    warn!(tracking_id = %id, attempt, "lost tracking id race, reallocating");
                }
                Err(e) => return Err(e.into()),
            }
        }
        Err(AppError::IdSpaceExhausted)
    }

    /// Apply the payment-method branch to a submitted registration. The
    /// terminal transition lands exactly once; a second confirmation is
    /// rejected.
    pub async fn complete_payment(
        &self,
        raw_id: &str,
        request: &PaymentRequest,
    ) -> Result<Finalized, AppError> {
        let id = normalize_id(raw_id)?;
        let rows = self.store.find_by_tracking_id(&id).await?;
        let Some(first) = rows.first() else {
            return Err(AppError::NotFound);
        };
        if first.payment_method.is_some() {
            return Err(AppError::Validation(
                "Payment has already been recorded for this registration.".into(),
            ));
        }

        let (update, redirect_url) = match request.method {
            PaymentMethod::Online => {
                let url = self.gateway.payment_url(
                    &first.company_name,
                    &first.contact_phone,
                    first.amount,
                    &first.contact_email,
                );
                (
                    PaymentUpdate {
                        status: PaymentStatus::Paid,
                        method: PaymentMethod::Online,
                        payment_date: Some(Utc::now()),
                        committee_member: None,
                        referred_by: None,
                    },
                    Some(url),
                )
            }
            PaymentMethod::Offline => {
                let attribution = request
                    .committee_member
                    .as_deref()
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .ok_or_else(|| {
                        AppError::Validation(
                            "Please select a committee member you're paying to.".into(),
                        )
                    })?;
                // Accept a roster id or a free-form name.
                let member = self
                    .committee
                    .get(attribution)
                    .map(|m| m.name.clone())
                    .unwrap_or_else(|| attribution.to_string());
                (
                    PaymentUpdate {
                        status: PaymentStatus::Pending,
                        method: PaymentMethod::Offline,
                        payment_date: None,
                        committee_member: Some(member),
                        referred_by: request
                            .referred_by
                            .as_deref()
                            .map(str::trim)
                            .filter(|s| !s.is_empty())
                            .map(str::to_string),
                    },
                    None,
                )
            }
        };

        let updated = self.store.record_payment(&id, &update).await?;
        if updated == 0 {
            // Lost a concurrent confirmation race.
            return Err(AppError::Validation(
                "Payment has already been recorded for this registration.".into(),
            ));
        }
        info!(
            tracking_id = %id,
            method = update.method.as_str(),
            status = update.status.as_str(),
            "payment method recorded"
        );

        let rows = self.store.find_by_tracking_id(&id).await?;
        let warning = match RegistrationNotice::from_rows(&rows) {
            Some(notice) => self.dispatch_notifications(&notice).await,
            None => None,
        };

        Ok(Finalized {
            tracking_id: id,
            payment_status: update.status,
            payment_method: update.method,
            committee_member: update.committee_member,
            redirect_url,
            warning,
        })
    }

    /// Exact-match fetch of every team row under the identifier.
    pub async fn lookup(&self, raw_id: &str) -> Result<Vec<RegistrationRow>, AppError> {
        let id = normalize_id(raw_id)?;
        let rows = self.store.find_by_tracking_id(&id).await?;
        if rows.is_empty() {
            return Err(AppError::NotFound);
        }
        Ok(rows)
    }

    /// Poll the gateway for this registration's payment and persist what it
    /// reports. Admin-dashboard operation.
    pub async fn refresh_payment_status(&self, raw_id: &str) -> Result<RefreshOutcome, AppError> {
        let id = normalize_id(raw_id)?;
        let rows = self.store.find_by_tracking_id(&id).await?;
        let Some(first) = rows.first() else {
            return Err(AppError::NotFound);
        };

        let details = self
            .gateway
            .fetch_payment_details(&first.contact_phone)
            .await
            .map_err(|e| AppError::Internal(format!("payment gateway: {e}")))?;

        let Some(details) = details else {
            return Ok(RefreshOutcome {
                updated: false,
                payment_status: None,
                payment_reference: None,
            });
        };

        let patch = RegistrationPatch {
            company_name: None,
            payment_status: Some(details.status),
            payment_reference: Some(details.transaction_id.clone()),
            payment_date: Some(details.transaction_date),
        };
        self.store.apply_patch(&id, &patch).await?;
        info!(tracking_id = %id, status = details.status.as_str(), "payment status refreshed");

        Ok(RefreshOutcome {
            updated: true,
            payment_status: Some(details.status),
            payment_reference: Some(details.transaction_id),
        })
    }

    /// Send the admin alert and the registrant confirmation. Failures are
    /// collapsed into a warning; the lifecycle has already finalized.
    pub async fn dispatch_notifications(&self, notice: &RegistrationNotice) -> Option<String> {
        let mut problems = Vec::new();

        if let Err(e) = self.notifier.send_admin_alert(notice).await {
            warn!(error = %e, "admin alert failed");
            problems.push(format!("admin alert: {e}"));
        }

        let recipients = notice.recipients();
        if let Err(e) = self.notifier.send_confirmation(notice, &recipients).await {
            warn!(error = %e, "confirmation email failed");
            problems.push(format!("confirmation: {e}"));
        }

        if problems.is_empty() {
            None
        } else {
            Some(format!(
                "Registration saved, but some emails could not be sent ({})",
                problems.join("; ")
            ))
        }
    }
}

fn normalize_id(raw: &str) -> Result<TrackingId, AppError> {
    TrackingId::normalize(raw)
        .ok_or_else(|| AppError::Validation("Tracking id must be 6 digits.".into()))
}

fn build_rows(id: &TrackingId, form: &RegistrationForm, amount: i32) -> Vec<NewRegistration> {
    form.teams
        .iter()
        .enumerate()
        .map(|(i, team)| {
            let player3 = team.player3.as_ref().filter(|p| !p.name.trim().is_empty());
            NewRegistration {
                id: id.clone(),
                team_number: format!("Team {}", i + 1),
                company_name: form.company_name.trim().to_string(),
                address: form.address.trim().to_string(),
                gst_number: clean_opt(form.gst_number.as_deref()),
                contact_phone: form.contact_phone.trim().to_string(),
                contact_email: form.contact_email.trim().to_string(),
                player1_name: team.player1.name.trim().to_string(),
                player1_mobile: team.player1.mobile.trim().to_string(),
                player1_email: clean_opt(team.player1.email.as_deref()),
                player2_name: team.player2.name.trim().to_string(),
                player2_mobile: team.player2.mobile.trim().to_string(),
                player2_email: clean_opt(team.player2.email.as_deref()),
                player3_name: player3.map(|p| p.name.trim().to_string()),
                player3_mobile: player3.map(|p| p.mobile.trim().to_string()),
                player3_email: player3.and_then(|p| clean_opt(p.email.as_deref())),
                captain_name: form.captain_name.trim().to_string(),
                captain_designation: form.captain_designation.trim().to_string(),
                captain_phone: clean_opt(form.captain_phone.as_deref()),
                captain_email: clean_opt(form.captain_email.as_deref()),
                amount,
            }
        })
        .collect()
}

fn clean_opt(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
