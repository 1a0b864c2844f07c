//! In-memory `RegistrationStore`, used by the test suites and handy for
//! running the API without Postgres.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::models::{
    NewRegistration, PaymentStatus, PaymentUpdate, RegistrationPatch, RegistrationRow,
    RegistrationStats, TrackingId,
};
use crate::pagination::LimitOffset;
use crate::store::{RegistrationStore, StoreError};

#[derive(Clone, Default)]
pub struct MemoryStore {
    events: Arc<RwLock<HashMap<TrackingId, Vec<RegistrationRow>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn materialize(row: &NewRegistration) -> RegistrationRow {
        RegistrationRow {
            id: row.id.clone(),
            team_number: row.team_number.clone(),
            company_name: row.company_name.clone(),
            address: row.address.clone(),
            gst_number: row.gst_number.clone(),
            contact_phone: row.contact_phone.clone(),
            contact_email: row.contact_email.clone(),
            player1_name: row.player1_name.clone(),
            player1_mobile: row.player1_mobile.clone(),
            player1_email: row.player1_email.clone(),
            player2_name: row.player2_name.clone(),
            player2_mobile: row.player2_mobile.clone(),
            player2_email: row.player2_email.clone(),
            player3_name: row.player3_name.clone(),
            player3_mobile: row.player3_mobile.clone(),
            player3_email: row.player3_email.clone(),
            captain_name: row.captain_name.clone(),
            captain_designation: row.captain_designation.clone(),
            captain_phone: row.captain_phone.clone(),
            captain_email: row.captain_email.clone(),
            payment_status: PaymentStatus::Pending,
            payment_method: None,
            payment_reference: None,
            payment_date: None,
            committee_member: None,
            referred_by: None,
            amount: row.amount,
            created_at: Utc::now(),
        }
    }
}

#[async_trait]
impl RegistrationStore for MemoryStore {
    async fn find_by_tracking_id(
        &self,
        id: &TrackingId,
    ) -> Result<Vec<RegistrationRow>, StoreError> {
        let events = self.events.read().await;
        Ok(events.get(id).cloned().unwrap_or_default())
    }

    async fn insert_event(&self, rows: &[NewRegistration]) -> Result<(), StoreError> {
        let mut events = self.events.write().await;
        if let Some(first) = rows.first() {
            if events.contains_key(&first.id) {
                return Err(StoreError::DuplicateId);
            }
            events.insert(first.id.clone(), rows.iter().map(Self::materialize).collect());
        }
        Ok(())
    }

    async fn record_payment(
        &self,
        id: &TrackingId,
        update: &PaymentUpdate,
    ) -> Result<u64, StoreError> {
        let mut events = self.events.write().await;
        let Some(rows) = events.get_mut(id) else {
            return Ok(0);
        };
        let mut updated = 0;
        for row in rows.iter_mut().filter(|r| r.payment_method.is_none()) {
            row.payment_status = update.status;
            row.payment_method = Some(update.method);
            row.payment_date = update.payment_date;
            row.committee_member = update.committee_member.clone();
            row.referred_by = update.referred_by.clone();
            updated += 1;
        }
        Ok(updated)
    }

    async fn apply_patch(
        &self,
        id: &TrackingId,
        patch: &RegistrationPatch,
    ) -> Result<u64, StoreError> {
        let mut events = self.events.write().await;
        let Some(rows) = events.get_mut(id) else {
            return Ok(0);
        };
        for row in rows.iter_mut() {
            if let Some(name) = &patch.company_name {
                row.company_name = name.clone();
            }
            if let Some(status) = patch.payment_status {
                row.payment_status = status;
            }
            if let Some(reference) = &patch.payment_reference {
                row.payment_reference = Some(reference.clone());
            }
            if let Some(date) = patch.payment_date {
                row.payment_date = Some(date);
            }
        }
        Ok(rows.len() as u64)
    }

    async fn delete_event(&self, id: &TrackingId) -> Result<u64, StoreError> {
        let mut events = self.events.write().await;
        Ok(events.remove(id).map_or(0, |rows| rows.len() as u64))
    }

    async fn delete_all(&self) -> Result<u64, StoreError> {
        let mut events = self.events.write().await;
        let count = events.values().map(Vec::len).sum::<usize>() as u64;
        events.clear();
        Ok(count)
    }

    async fn list_all(
        &self,
        page: Option<LimitOffset>,
    ) -> Result<Vec<RegistrationRow>, StoreError> {
        let events = self.events.read().await;
        let mut rows: Vec<RegistrationRow> = events.values().flatten().cloned().collect();
        rows.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.id.as_str().cmp(b.id.as_str()))
                .then_with(|| a.team_number.cmp(&b.team_number))
        });
        let p = page.unwrap_or_default();
        Ok(rows
            .into_iter()
            .skip(p.offset.max(0) as usize)
            .take(p.limit.max(0) as usize)
            .collect())
    }

    async fn stats(&self) -> Result<RegistrationStats, StoreError> {
        let events = self.events.read().await;
        let mut stats = RegistrationStats::default();
        for row in events.values().flatten() {
            stats.total += 1;
            match row.payment_status {
                PaymentStatus::Paid => stats.paid += 1,
                PaymentStatus::Pending => stats.pending += 1,
            }
        }
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn team_row(id: &TrackingId, n: usize) -> NewRegistration {
        NewRegistration {
            id: id.clone(),
            team_number: format!("Team {n}"),
            company_name: "Acme Corp".into(),
            address: "12 Park Street, Kolkata".into(),
            gst_number: None,
            contact_phone: "9876543210".into(),
            contact_email: "office@acme.example".into(),
            player1_name: "P One".into(),
            player1_mobile: "9000000001".into(),
            player1_email: None,
            player2_name: "P Two".into(),
            player2_mobile: "9000000002".into(),
            player2_email: None,
            player3_name: None,
            player3_mobile: None,
            player3_email: None,
            captain_name: "C Captain".into(),
            captain_designation: "Manager".into(),
            captain_phone: None,
            captain_email: None,
            amount: 8850,
        }
    }

    #[tokio::test]
    async fn insert_then_find_round_trips() {
        let store = MemoryStore::new();
        let id = TrackingId::new("123456").unwrap();
        store
            .insert_event(&[team_row(&id, 1), team_row(&id, 2)])
            .await
            .unwrap();

        let rows = store.find_by_tracking_id(&id).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].team_number, "Team 1");
        assert_eq!(rows[1].team_number, "Team 2");
        assert!(rows.iter().all(|r| r.payment_status == PaymentStatus::Pending));
    }

    #[tokio::test]
    async fn duplicate_event_is_rejected() {
        let store = MemoryStore::new();
        let id = TrackingId::new("222333").unwrap();
        store.insert_event(&[team_row(&id, 1)]).await.unwrap();
        let err = store.insert_event(&[team_row(&id, 1)]).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateId));
    }

    #[tokio::test]
    async fn record_payment_lands_once() {
        let store = MemoryStore::new();
        let id = TrackingId::new("654321").unwrap();
        store.insert_event(&[team_row(&id, 1)]).await.unwrap();

        let update = PaymentUpdate {
            status: PaymentStatus::Paid,
            method: crate::models::PaymentMethod::Online,
            payment_date: Some(Utc::now()),
            committee_member: None,
            referred_by: None,
        };
        assert_eq!(store.record_payment(&id, &update).await.unwrap(), 1);
        // Second confirmation finds nothing left to finalize.
        assert_eq!(store.record_payment(&id, &update).await.unwrap(), 0);
    }
}
