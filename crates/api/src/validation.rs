//! Server-side validation of the registration form. The UI validates per
//! step; everything is re-checked here before any repository call.

use crate::error::AppError;
use crate::forms::{PlayerEntry, RegistrationForm};

pub const MAX_TEAMS: usize = 3;

fn fail(msg: impl Into<String>) -> AppError {
    AppError::Validation(msg.into())
}

fn is_ten_digit_phone(value: &str) -> bool {
    value.len() == 10 && value.bytes().all(|b| b.is_ascii_digit())
}

/// Loose RFC shape: one `@`, non-empty local part, dotted domain, no
/// whitespace.
fn is_email_shaped(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((head, tld)) => !head.is_empty() && !tld.is_empty(),
        None => false,
    }
}

fn require(value: &str, message: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(fail(message));
    }
    Ok(())
}

fn check_player(player: &PlayerEntry, team: usize, label: &str) -> Result<(), AppError> {
    if player.name.trim().is_empty() || player.mobile.trim().is_empty() {
        return Err(fail(format!(
            "Please complete {label} details for Team {team}."
        )));
    }
    if let Some(email) = player.email.as_deref().map(str::trim).filter(|e| !e.is_empty()) {
        if !is_email_shaped(email) {
            return Err(fail(format!(
                "Invalid email address for {label} of Team {team}."
            )));
        }
    }
    Ok(())
}

pub fn validate_submission(form: &RegistrationForm) -> Result<(), AppError> {
    // Company step.
    require(&form.company_name, "Please enter your company name.")?;
    require(&form.address, "Please enter your company address.")?;
    require(&form.contact_phone, "Please enter a contact phone number.")?;
    require(&form.contact_email, "Please enter a contact email address.")?;
    if !is_ten_digit_phone(form.contact_phone.trim()) {
        return Err(fail("Please enter a valid 10-digit phone number."));
    }
    if !is_email_shaped(form.contact_email.trim()) {
        return Err(fail("Please enter a valid email address."));
    }

    // Team step.
    if form.teams.is_empty() {
        return Err(fail("You need to register at least 1 team."));
    }
    if form.teams.len() > MAX_TEAMS {
        return Err(fail(format!("You can register up to {MAX_TEAMS} teams only.")));
    }
    for (i, team) in form.teams.iter().enumerate() {
        let n = i + 1;
        check_player(&team.player1, n, "player 1")?;
        check_player(&team.player2, n, "player 2")?;
        if let Some(player3) = &team.player3 {
            // Optional third player, but once named the entry must be whole.
            if !player3.name.trim().is_empty() || !player3.mobile.trim().is_empty() {
                check_player(player3, n, "player 3")?;
            }
        }
    }

    // Captain step.
    require(&form.captain_name, "Please enter the captain's name.")?;
    require(&form.captain_designation, "Please enter the captain's designation.")?;
    if let Some(email) = form.captain_email.as_deref().map(str::trim).filter(|e| !e.is_empty()) {
        if !is_email_shaped(email) {
            return Err(fail("Please enter a valid captain email address."));
        }
    }

    // Review step.
    if !form.rules_accepted {
        return Err(fail("You must accept the tournament rules to proceed."));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forms::TeamEntry;

    fn player(name: &str, mobile: &str) -> PlayerEntry {
        PlayerEntry {
            name: name.into(),
            mobile: mobile.into(),
            email: None,
        }
    }

    fn valid_form() -> RegistrationForm {
        RegistrationForm {
            company_name: "Acme Corp".into(),
            address: "12 Park Street, Kolkata".into(),
            gst_number: Some("19AABCU9603R1ZM".into()),
            contact_phone: "9876543210".into(),
            contact_email: "office@acme.example".into(),
            teams: vec![TeamEntry {
                player1: player("Asha", "9000000001"),
                player2: player("Binod", "9000000002"),
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
    fn accepts_a_complete_form() {
        assert!(validate_submission(&valid_form()).is_ok());
    }

    #[test]
    fn rejects_short_phone() {
        let mut form = valid_form();
        form.contact_phone = "12345".into();
        let err = validate_submission(&form).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn rejects_non_numeric_phone() {
        let mut form = valid_form();
        form.contact_phone = "98765abc10".into();
        assert!(validate_submission(&form).is_err());
    }

    #[test]
    fn rejects_malformed_email() {
        for bad in ["missing-at.example", "a@b", "a b@c.example", "@x.example"] {
            let mut form = valid_form();
            form.contact_email = bad.into();
            assert!(validate_submission(&form).is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn rejects_unaccepted_rules() {
        let mut form = valid_form();
        form.rules_accepted = false;
        assert!(validate_submission(&form).is_err());
    }

    #[test]
    fn rejects_incomplete_team() {
        let mut form = valid_form();
        form.teams[0].player2 = player("", "");
        assert!(validate_submission(&form).is_err());
    }

    #[test]
    fn rejects_too_many_teams() {
        let mut form = valid_form();
        let team = form.teams[0].clone();
        form.teams = vec![team.clone(), team.clone(), team.clone(), team];
        assert!(validate_submission(&form).is_err());
    }

    #[test]
    fn partial_third_player_must_be_completed() {
        let mut form = valid_form();
        form.teams[0].player3 = Some(player("Dev", ""));
        assert!(validate_submission(&form).is_err());

        form.teams[0].player3 = Some(player("Dev", "9000000003"));
        assert!(validate_submission(&form).is_ok());
    }
}
