use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Six-digit tracking identifier shared by every team row of one
/// registration event. Doubles as the human-facing tracking code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct TrackingId(String);

pub const TRACKING_ID_LEN: usize = 6;

impl TrackingId {
    /// Wrap a value that is already known to be exactly six digits.
    /// Returns `None` otherwise.
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        if raw.len() == TRACKING_ID_LEN && raw.bytes().all(|b| b.is_ascii_digit()) {
            Some(Self(raw))
        } else {
            None
        }
    }

    /// Sanitize free-form input: keep digits only, take the first six.
    /// Anything shorter than six digits is rejected.
    pub fn normalize(input: &str) -> Option<Self> {
        let digits: String = input
            .chars()
            .filter(|c| c.is_ascii_digit())
            .take(TRACKING_ID_LEN)
            .collect();
        Self::new(digits)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TrackingId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "TEXT")]
pub enum PaymentStatus {
    Pending,
    Paid,
}

impl PaymentStatus {
    /// Collapse provider-defined status strings onto the two states the
    /// lifecycle recognizes.
    pub fn from_provider(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "paid" | "completed" | "success" | "online" => Self::Paid,
            _ => Self::Pending,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Paid => "Paid",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Online,
    Offline,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Online => "online",
            Self::Offline => "offline",
        }
    }
}

/// One persisted row: a single team under a registration event.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct RegistrationRow {
    pub id: TrackingId,
    pub team_number: String,
    pub company_name: String,
    pub address: String,
    pub gst_number: Option<String>,
    pub contact_phone: String,
    pub contact_email: String,
    pub player1_name: String,
    pub player1_mobile: String,
    pub player1_email: Option<String>,
    pub player2_name: String,
    pub player2_mobile: String,
    pub player2_email: Option<String>,
    pub player3_name: Option<String>,
    pub player3_mobile: Option<String>,
    pub player3_email: Option<String>,
    pub captain_name: String,
    pub captain_designation: String,
    pub captain_phone: Option<String>,
    pub captain_email: Option<String>,
    pub payment_status: PaymentStatus,
    pub payment_method: Option<PaymentMethod>,
    pub payment_reference: Option<String>,
    pub payment_date: Option<DateTime<Utc>>,
    pub committee_member: Option<String>,
    pub referred_by: Option<String>,
    pub amount: i32,
    pub created_at: DateTime<Utc>,
}

/// Insert payload for one team row. `created_at` is server-populated.
#[derive(Debug, Clone)]
pub struct NewRegistration {
    pub id: TrackingId,
    pub team_number: String,
    pub company_name: String,
    pub address: String,
    pub gst_number: Option<String>,
    pub contact_phone: String,
    pub contact_email: String,
    pub player1_name: String,
    pub player1_mobile: String,
    pub player1_email: Option<String>,
    pub player2_name: String,
    pub player2_mobile: String,
    pub player2_email: Option<String>,
    pub player3_name: Option<String>,
    pub player3_mobile: Option<String>,
    pub player3_email: Option<String>,
    pub captain_name: String,
    pub captain_designation: String,
    pub captain_phone: Option<String>,
    pub captain_email: Option<String>,
    pub amount: i32,
}

/// Payment finalization applied to every row of an event. Guarded so it
/// lands at most once (`payment_method IS NULL`).
#[derive(Debug, Clone)]
pub struct PaymentUpdate {
    pub status: PaymentStatus,
    pub method: PaymentMethod,
    pub payment_date: Option<DateTime<Utc>>,
    pub committee_member: Option<String>,
    pub referred_by: Option<String>,
}

/// Admin edit; `None` leaves the column untouched.
#[derive(Debug, Clone, Default)]
pub struct RegistrationPatch {
    pub company_name: Option<String>,
    pub payment_status: Option<PaymentStatus>,
    pub payment_reference: Option<String>,
    pub payment_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct RegistrationStats {
    pub total: i64,
    pub paid: i64,
    pub pending: i64,
}
