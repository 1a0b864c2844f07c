//! Confirmation and admin-alert emails, sent through a transactional email
//! HTTP API. Dispatch failures never block the registration lifecycle.

use async_trait::async_trait;
use serde_json::json;
use thiserror::Error;

use infra::{PaymentMethod, PaymentStatus, RegistrationRow};

use crate::config::EmailConfig;
use crate::forms::RegistrationForm;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("email api error: {0}")]
    Api(String),

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

#[derive(Debug, Clone)]
pub struct RosterPlayer {
    pub name: String,
    pub mobile: String,
    pub email: Option<String>,
}

#[derive(Debug, Clone)]
pub struct TeamRoster {
    pub number: String,
    pub players: Vec<RosterPlayer>,
}

/// Everything the email templates need about one registration event.
#[derive(Debug, Clone)]
pub struct RegistrationNotice {
    pub tracking_id: Option<String>,
    pub company_name: String,
    pub gst_number: Option<String>,
    pub contact_phone: String,
    pub contact_email: String,
    pub captain_name: String,
    pub num_teams: usize,
    pub amount: i32,
    pub payment_status: Option<PaymentStatus>,
    pub payment_method: Option<PaymentMethod>,
    pub committee_member: Option<String>,
    pub teams: Vec<TeamRoster>,
}

impl RegistrationNotice {
    /// Reassemble the event from its persisted team rows.
    pub fn from_rows(rows: &[RegistrationRow]) -> Option<Self> {
        let first = rows.first()?;
        let teams = rows
            .iter()
            .map(|row| {
                let mut players = vec![
                    RosterPlayer {
                        name: row.player1_name.clone(),
                        mobile: row.player1_mobile.clone(),
                        email: row.player1_email.clone(),
                    },
                    RosterPlayer {
                        name: row.player2_name.clone(),
                        mobile: row.player2_mobile.clone(),
                        email: row.player2_email.clone(),
                    },
                ];
                if let Some(name) = &row.player3_name {
                    players.push(RosterPlayer {
                        name: name.clone(),
                        mobile: row.player3_mobile.clone().unwrap_or_default(),
                        email: row.player3_email.clone(),
                    });
                }
                TeamRoster {
                    number: row.team_number.clone(),
                    players,
                }
            })
            .collect();

        Some(Self {
            tracking_id: Some(first.id.to_string()),
            company_name: first.company_name.clone(),
            gst_number: first.gst_number.clone(),
            contact_phone: first.contact_phone.clone(),
            contact_email: first.contact_email.clone(),
            captain_name: first.captain_name.clone(),
            num_teams: rows.len(),
            amount: first.amount,
            payment_status: Some(first.payment_status),
            payment_method: first.payment_method,
            committee_member: first.committee_member.clone(),
            teams,
        })
    }

    /// Build from raw form data, for the thin email relay.
    pub fn from_form(form: &RegistrationForm, amount: i32) -> Self {
        let teams = form
            .teams
            .iter()
            .enumerate()
            .map(|(i, team)| {
                let mut players = vec![
                    RosterPlayer {
                        name: team.player1.name.clone(),
                        mobile: team.player1.mobile.clone(),
                        email: team.player1.email.clone(),
                    },
                    RosterPlayer {
                        name: team.player2.name.clone(),
                        mobile: team.player2.mobile.clone(),
                        email: team.player2.email.clone(),
                    },
                ];
                if let Some(player3) = &team.player3 {
                    players.push(RosterPlayer {
                        name: player3.name.clone(),
                        mobile: player3.mobile.clone(),
                        email: player3.email.clone(),
                    });
                }
                TeamRoster {
                    number: format!("Team {}", i + 1),
                    players,
                }
            })
            .collect();

        Self {
            tracking_id: None,
            company_name: form.company_name.clone(),
            gst_number: form.gst_number.clone(),
            contact_phone: form.contact_phone.clone(),
            contact_email: form.contact_email.clone(),
            captain_name: form.captain_name.clone(),
            num_teams: form.teams.len(),
            amount,
            payment_status: None,
            payment_method: None,
            committee_member: None,
            teams,
        }
    }

    /// Contact email plus every distinct player email present.
    pub fn recipients(&self) -> Vec<String> {
        let mut out = vec![self.contact_email.clone()];
        for email in self
            .teams
            .iter()
            .flat_map(|t| t.players.iter())
            .filter_map(|p| p.email.as_deref())
        {
            let email = email.trim();
            if !email.is_empty() && !out.iter().any(|e| e == email) {
                out.push(email.to_string());
            }
        }
        out
    }
}

#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    async fn send_admin_alert(&self, notice: &RegistrationNotice) -> Result<(), NotifyError>;

    async fn send_confirmation(
        &self,
        notice: &RegistrationNotice,
        recipients: &[String],
    ) -> Result<(), NotifyError>;
}

#[derive(Clone)]
pub struct EmailNotifier {
    http: reqwest::Client,
    config: EmailConfig,
}

impl EmailNotifier {
    pub fn new(config: EmailConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    async fn post_email(
        &self,
        recipients: &[String],
        subject: &str,
        html: String,
    ) -> Result<(), NotifyError> {
        if self.config.api_key.is_empty() {
            return Err(NotifyError::Api("email api key not configured".into()));
        }

        let body = json!({
            "Recipients": recipients.iter().map(|e| json!({ "Email": e })).collect::<Vec<_>>(),
            "Content": {
                "Body": [{ "ContentType": "HTML", "Content": html }],
                "From": self.config.from,
                "Subject": subject,
            },
        });

        let response = self
            .http
            .post(format!("{}/v4/emails/transactional", self.config.api_base))
            .header("X-ElasticEmail-ApiKey", &self.config.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(NotifyError::Api(format!(
                "email api returned {}",
                response.status()
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl NotificationDispatcher for EmailNotifier {
    async fn send_admin_alert(&self, notice: &RegistrationNotice) -> Result<(), NotifyError> {
        let subject = format!("New Tournament Registration - {}", notice.company_name);
        self.post_email(
            std::slice::from_ref(&self.config.admin_email),
            &subject,
            admin_alert_html(notice),
        )
        .await
    }

    async fn send_confirmation(
        &self,
        notice: &RegistrationNotice,
        recipients: &[String],
    ) -> Result<(), NotifyError> {
        let subject = format!(
            "RCGC Merchants Cup - Registration Confirmation - {}",
            notice.company_name
        );
        self.post_email(recipients, &subject, confirmation_html(notice))
            .await
    }
}

fn admin_alert_html(notice: &RegistrationNotice) -> String {
    let tracking = notice
        .tracking_id
        .as_deref()
        .map(|id| format!("<p><strong>Tracking ID:</strong> {id}</p>"))
        .unwrap_or_default();
    format!(
        r#"<h2>New Team Registration - Merchants Cup</h2>
{tracking}<p><strong>Company:</strong> {company}</p>
<p><strong>GST Number:</strong> {gst}</p>
<p><strong>Contact:</strong> {phone}</p>
<p><strong>Email:</strong> {email}</p>
<p><strong>Teams Registered:</strong> {teams}</p>
<p><strong>Amount:</strong> &#8377;{amount}</p>"#,
        company = notice.company_name,
        gst = notice.gst_number.as_deref().unwrap_or("-"),
        phone = notice.contact_phone,
        email = notice.contact_email,
        teams = notice.num_teams,
        amount = notice.amount,
    )
}

fn confirmation_html(notice: &RegistrationNotice) -> String {
    let team_details: String = notice
        .teams
        .iter()
        .map(|team| {
            let players: String = team
                .players
                .iter()
                .enumerate()
                .map(|(i, p)| format!("<li>Player {}: {} ({})</li>", i + 1, p.name, p.mobile))
                .collect();
            format!(
                r#"<div style="margin-bottom: 20px;">
  <h3>{number}</h3>
  <ul style="list-style: none; padding-left: 0;">{players}</ul>
</div>"#,
                number = team.number,
            )
        })
        .collect();

    let method_line = notice
        .payment_method
        .map(|m| {
            format!(
                "<li>Payment Method: <span class=\"highlight\">{}</span></li>",
                m.as_str().to_uppercase()
            )
        })
        .unwrap_or_default();
    let committee_line = notice
        .committee_member
        .as_deref()
        .map(|name| format!("<li>Committee Member: <span class=\"highlight\">{name}</span></li>"))
        .unwrap_or_default();
    let tracking_line = notice
        .tracking_id
        .as_deref()
        .map(|id| format!("<li>Tracking ID: <span class=\"highlight\">{id}</span></li>"))
        .unwrap_or_default();

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
  <style>
    body {{ font-family: Arial, sans-serif; line-height: 1.6; color: #333; }}
    .container {{ max-width: 600px; margin: 0 auto; padding: 20px; }}
    .highlight {{ color: #2563eb; font-weight: bold; }}
  </style>
</head>
<body>
  <div class="container">
    <div class="header">
      <h1>RCGC Merchants Cup Lawn Bowls Tournament</h1>
      <p>Registration Confirmation</p>
    </div>
    <p>Dear {captain},</p>
    <p>Thank you for registering for the RCGC Merchants Cup Lawn Bowls Tournament.
       Your registration has been successfully processed.</p>
    <h2>Registration Details:</h2>
    <ul>
      {tracking_line}
      <li>Company: <span class="highlight">{company}</span></li>
      <li>GST Number: <span class="highlight">{gst}</span></li>
      <li>Number of Teams: <span class="highlight">{teams}</span></li>
      <li>Total Amount: <span class="highlight">&#8377;{amount}</span></li>
      {method_line}
      {committee_line}
    </ul>
    <h2>Team Details:</h2>
    {team_details}
    <p><strong>Venue:</strong> RCGC Maidan Pavilion</p>
    <div class="footer">
      <p>For any queries, please contact the tournament committee.</p>
      <p>Best regards,<br>RCGC Tournament Committee</p>
    </div>
  </div>
</body>
</html>"#,
        captain = notice.captain_name,
        company = notice.company_name,
        gst = notice.gst_number.as_deref().unwrap_or("-"),
        teams = notice.num_teams,
        amount = notice.amount,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forms::{PlayerEntry, TeamEntry};

    fn sample_form() -> RegistrationForm {
        RegistrationForm {
            company_name: "Acme Corp".into(),
            address: "12 Park Street".into(),
            gst_number: Some("19AABCU9603R1ZM".into()),
            contact_phone: "9876543210".into(),
            contact_email: "office@acme.example".into(),
            teams: vec![TeamEntry {
                player1: PlayerEntry {
                    name: "Asha".into(),
                    mobile: "9000000001".into(),
                    email: Some("asha@acme.example".into()),
                },
                player2: PlayerEntry {
                    name: "Binod".into(),
                    mobile: "9000000002".into(),
                    email: Some("office@acme.example".into()),
                },
                player3: None,
            }],
            captain_name: "Chitra".into(),
            captain_designation: "Manager".into(),
            captain_phone: None,
            captain_email: None,
            rules_accepted: true,
        }
    }

    #[test]
    fn recipients_are_deduplicated() {
        let notice = RegistrationNotice::from_form(&sample_form(), 8850);
        // The contact address also appears as player 2's email.
        assert_eq!(
            notice.recipients(),
            vec!["office@acme.example".to_string(), "asha@acme.example".to_string()]
        );
    }

    #[test]
    fn confirmation_template_carries_event_details() {
        let mut notice = RegistrationNotice::from_form(&sample_form(), 8850);
        notice.payment_method = Some(PaymentMethod::Offline);
        notice.committee_member = Some("Timir Roy".into());
        let html = confirmation_html(&notice);
        assert!(html.contains("Acme Corp"));
        assert!(html.contains("Dear Chitra"));
        assert!(html.contains("8850"));
        assert!(html.contains("OFFLINE"));
        assert!(html.contains("Timir Roy"));
        assert!(html.contains("Team 1"));
        assert!(html.contains("Asha"));
    }

    #[test]
    fn admin_alert_template_carries_contact_details() {
        let html = admin_alert_html(&RegistrationNotice::from_form(&sample_form(), 17700));
        assert!(html.contains("Acme Corp"));
        assert!(html.contains("9876543210"));
        assert!(html.contains("17700"));
    }
}
