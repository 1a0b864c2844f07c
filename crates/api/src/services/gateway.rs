//! Contract with the external payment gateway: the redirect URL the online
//! branch sends registrants to, and the payment-details poll the admin
//! dashboard uses to refresh a registration's status.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;
use thiserror::Error;

use infra::PaymentStatus;

use crate::config::GatewayConfig;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("gateway returned an unreadable response: {0}")]
    BadResponse(String),
}

#[derive(Debug, Deserialize)]
struct DetailsResponse {
    success: bool,
    data: Option<DetailsRaw>,
}

#[derive(Debug, Deserialize)]
struct DetailsRaw {
    #[serde(default)]
    payment_status: String,
    #[serde(default)]
    transaction_id: String,
    #[serde(default)]
    transaction_date: String,
}

/// A settled (or still pending) payment as reported by the gateway.
#[derive(Debug, Clone)]
pub struct PaymentDetails {
    pub status: PaymentStatus,
    pub transaction_id: String,
    pub transaction_date: DateTime<Utc>,
}

#[derive(Clone)]
pub struct PaymentGateway {
    http: reqwest::Client,
    config: GatewayConfig,
}

impl PaymentGateway {
    pub fn new(config: GatewayConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    /// Redirect target for the online branch. Embeds the organization id,
    /// the (encoded) company name, contact phone, total amount and contact
    /// email, which is what the gateway keys its records on.
    pub fn payment_url(&self, company_name: &str, phone: &str, amount: i32, email: &str) -> String {
        let encoded_company = urlencoding::encode(company_name);
        format!(
            "{base}?organization_id={org}&name={encoded_company}&phone_number={phone}&amount={amount}&email={email}&company_name={encoded_company}",
            base = self.config.base_url,
            org = self.config.organization_id,
            phone = urlencoding::encode(phone),
            email = urlencoding::encode(email),
        )
    }

    /// Ask the gateway what it knows about payments from this phone number.
    /// `Ok(None)` means it has no record.
    pub async fn fetch_payment_details(
        &self,
        phone: &str,
    ) -> Result<Option<PaymentDetails>, GatewayError> {
        let url = format!(
            "{}?action=get_payment_details&phone_number={}",
            self.config.base_url,
            urlencoding::encode(phone)
        );
        let response = self.http.get(&url).send().await?;
        let payload: DetailsResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::BadResponse(e.to_string()))?;

        match payload.data {
            Some(data) if payload.success => Ok(Some(PaymentDetails {
                status: PaymentStatus::from_provider(&data.payment_status),
                transaction_id: data.transaction_id,
                transaction_date: parse_transaction_date(&data.transaction_date)
                    .unwrap_or_else(Utc::now),
            })),
            _ => Ok(None),
        }
    }
}

/// The provider's date format is not pinned down; accept RFC 3339 and the
/// common `YYYY-MM-DD HH:MM:SS` form.
fn parse_transaction_date(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gateway() -> PaymentGateway {
        PaymentGateway::new(GatewayConfig {
            base_url: "https://pay.example/make_payment_merchant.php".into(),
            organization_id: "RCGC".into(),
        })
    }

    #[test]
    fn payment_url_embeds_the_contract_parameters() {
        let url = gateway().payment_url("Acme & Sons", "9876543210", 17700, "office@acme.example");
        assert!(url.starts_with("https://pay.example/make_payment_merchant.php?"));
        assert!(url.contains("organization_id=RCGC"));
        assert!(url.contains("name=Acme%20%26%20Sons"));
        assert!(url.contains("company_name=Acme%20%26%20Sons"));
        assert!(url.contains("phone_number=9876543210"));
        assert!(url.contains("amount=17700"));
        assert!(url.contains("email=office%40acme.example"));
    }

    #[test]
    fn transaction_dates_parse_both_forms() {
        assert!(parse_transaction_date("2025-04-22T10:30:00+05:30").is_some());
        assert!(parse_transaction_date("2025-04-22 10:30:00").is_some());
        assert!(parse_transaction_date("last tuesday").is_none());
    }
}
