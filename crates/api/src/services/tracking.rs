//! Tracking-id allocation: propose a random six-digit identifier and verify
//! it is unused. The probe loop is bounded; closing the remaining
//! check-then-act window is the storage layer's composite key, which the
//! caller answers by re-allocating.

use rand::Rng;

use infra::{RegistrationStore, TrackingId};

use crate::error::AppError;

/// Probe budget per allocation. Collisions and transient repository errors
/// both consume attempts, so a broken repository cannot spin forever.
pub const MAX_GENERATE_ATTEMPTS: u32 = 10;

fn random_candidate() -> TrackingId {
    let value = rand::thread_rng().gen_range(100_000..=999_999);
    TrackingId::new(value.to_string()).expect("a value in 100000..=999999 has six digits")
}

/// Return an identifier with no existing registration at check time.
pub async fn allocate(store: &dyn RegistrationStore) -> Result<TrackingId, AppError> {
    for attempt in 1..=MAX_GENERATE_ATTEMPTS {
        let candidate = random_candidate();
        match store.find_by_tracking_id(&candidate).await {
            Ok(rows) if rows.is_empty() => return Ok(candidate),
            Ok(_) => {
                tracing::debug!(%candidate, attempt, "tracking id already taken");
            }
            Err(e) => {
                tracing::warn!(error = %e, attempt, "tracking id uniqueness probe failed");
            }
        }
    }
    Err(AppError::IdSpaceExhausted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn candidates_are_six_decimal_digits() {
        for _ in 0..1000 {
            let id = random_candidate();
            assert_eq!(id.as_str().len(), 6);
            assert!(id.as_str().bytes().all(|b| b.is_ascii_digit()));
            assert_ne!(id.as_str().as_bytes()[0], b'0');
        }
    }
}
