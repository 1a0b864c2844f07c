//! Request payloads for the registration flow. Field names mirror the
//! multi-step form's JSON (camelCase on the wire).

use serde::Deserialize;

use infra::PaymentMethod;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerEntry {
    pub name: String,
    pub mobile: String,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamEntry {
    pub player1: PlayerEntry,
    pub player2: PlayerEntry,
    #[serde(default)]
    pub player3: Option<PlayerEntry>,
}

/// The completed multi-step form, as submitted after the review step.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationForm {
    pub company_name: String,
    pub address: String,
    #[serde(default)]
    pub gst_number: Option<String>,
    pub contact_phone: String,
    pub contact_email: String,
    pub teams: Vec<TeamEntry>,
    pub captain_name: String,
    pub captain_designation: String,
    #[serde(default)]
    pub captain_phone: Option<String>,
    #[serde(default)]
    pub captain_email: Option<String>,
    #[serde(default)]
    pub rules_accepted: bool,
}

/// Payment-method confirmation for a submitted registration.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    pub method: PaymentMethod,
    /// Roster id or free-form name; required when `method` is offline.
    #[serde(default)]
    pub committee_member: Option<String>,
    #[serde(default)]
    pub referred_by: Option<String>,
}
