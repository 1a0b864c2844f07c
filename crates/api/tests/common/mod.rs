use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;

use api::committee::CommitteeRoster;
use api::config::GatewayConfig;
use api::forms::{PlayerEntry, RegistrationForm, TeamEntry};
use api::services::notifier::{NotificationDispatcher, NotifyError, RegistrationNotice};
use api::services::{PaymentGateway, RegistrationService};
use infra::memory::MemoryStore;
use infra::pagination::LimitOffset;
use infra::{
    NewRegistration, PaymentStatus, PaymentUpdate, RegistrationPatch, RegistrationRow,
    RegistrationStats, RegistrationStore, StoreError, TrackingId,
};

pub const TEST_FEE: i32 = 8850;

#[allow(dead_code)]
pub fn service_with(
    store: Arc<dyn RegistrationStore>,
    notifier: Arc<dyn NotificationDispatcher>,
) -> RegistrationService {
    RegistrationService::new(
        store,
        notifier,
        Arc::new(CommitteeRoster::default()),
        PaymentGateway::new(GatewayConfig {
            base_url: "https://pay.example/make_payment_merchant.php".into(),
            organization_id: "RCGC".into(),
        }),
        TEST_FEE,
    )
}

#[allow(dead_code)]
pub fn player(name: &str, mobile: &str, email: Option<&str>) -> PlayerEntry {
    PlayerEntry {
        name: name.into(),
        mobile: mobile.into(),
        email: email.map(Into::into),
    }
}

/// A complete, valid form with the requested number of teams.
#[allow(dead_code)]
pub fn sample_form(teams: usize) -> RegistrationForm {
    let team = |n: usize| TeamEntry {
        player1: player(
            &format!("Player {n}A"),
            "9000000001",
            Some("playera@acme.example"),
        ),
        player2: player(&format!("Player {n}B"), "9000000002", None),
        player3: None,
    };
    RegistrationForm {
        company_name: "Acme Corp".into(),
        address: "12 Park Street, Kolkata".into(),
        gst_number: Some("19AABCU9603R1ZM".into()),
        contact_phone: "9876543210".into(),
        contact_email: "office@acme.example".into(),
        teams: (1..=teams).map(team).collect(),
        captain_name: "Chitra Sen".into(),
        captain_designation: "Manager".into(),
        captain_phone: None,
        captain_email: None,
        rules_accepted: true,
    }
}

/// Wraps a store and counts repository traffic, so tests can assert that
/// validation failures never reach the datastore.
pub struct CountingStore<S> {
    inner: S,
    pub finds: AtomicUsize,
    pub inserts: AtomicUsize,
}

#[allow(dead_code)]
impl<S> CountingStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            finds: AtomicUsize::new(0),
            inserts: AtomicUsize::new(0),
        }
    }

    pub fn find_count(&self) -> usize {
        self.finds.load(Ordering::SeqCst)
    }

    pub fn insert_count(&self) -> usize {
        self.inserts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<S: RegistrationStore> RegistrationStore for CountingStore<S> {
    async fn find_by_tracking_id(
        &self,
        id: &TrackingId,
    ) -> Result<Vec<RegistrationRow>, StoreError> {
        self.finds.fetch_add(1, Ordering::SeqCst);
        self.inner.find_by_tracking_id(id).await
    }

    async fn insert_event(&self, rows: &[NewRegistration]) -> Result<(), StoreError> {
        self.inserts.fetch_add(1, Ordering::SeqCst);
        self.inner.insert_event(rows).await
    }

    async fn record_payment(
        &self,
        id: &TrackingId,
        update: &PaymentUpdate,
    ) -> Result<u64, StoreError> {
        self.inner.record_payment(id, update).await
    }

    async fn apply_patch(
        &self,
        id: &TrackingId,
        patch: &RegistrationPatch,
    ) -> Result<u64, StoreError> {
        self.inner.apply_patch(id, patch).await
    }

    async fn delete_event(&self, id: &TrackingId) -> Result<u64, StoreError> {
        self.inner.delete_event(id).await
    }

    async fn delete_all(&self) -> Result<u64, StoreError> {
        self.inner.delete_all().await
    }

    async fn list_all(
        &self,
        page: Option<LimitOffset>,
    ) -> Result<Vec<RegistrationRow>, StoreError> {
        self.inner.list_all(page).await
    }

    async fn stats(&self) -> Result<RegistrationStats, StoreError> {
        self.inner.stats().await
    }
}

/// Scripts the uniqueness probe: the first `collisions` lookups report the
/// candidate as taken, every later lookup reports it free. Only the probe
/// path is exercised through this store.
pub struct ScriptedStore {
    collisions: usize,
    pub finds: AtomicUsize,
}

#[allow(dead_code)]
impl ScriptedStore {
    pub fn with_collisions(collisions: usize) -> Self {
        Self {
            collisions,
            finds: AtomicUsize::new(0),
        }
    }

    pub fn find_count(&self) -> usize {
        self.finds.load(Ordering::SeqCst)
    }
}

fn occupied_row(id: &TrackingId) -> RegistrationRow {
    RegistrationRow {
        id: id.clone(),
        team_number: "Team 1".into(),
        company_name: "Occupied Ltd".into(),
        address: "somewhere".into(),
        gst_number: None,
        contact_phone: "9111111111".into(),
        contact_email: "taken@example.com".into(),
        player1_name: "A".into(),
        player1_mobile: "9000000001".into(),
        player1_email: None,
        player2_name: "B".into(),
        player2_mobile: "9000000002".into(),
        player2_email: None,
        player3_name: None,
        player3_mobile: None,
        player3_email: None,
        captain_name: "C".into(),
        captain_designation: "Captain".into(),
        captain_phone: None,
        captain_email: None,
        payment_status: PaymentStatus::Pending,
        payment_method: None,
        payment_reference: None,
        payment_date: None,
        committee_member: None,
        referred_by: None,
        amount: TEST_FEE,
        created_at: Utc::now(),
    }
}

#[async_trait]
impl RegistrationStore for ScriptedStore {
    async fn find_by_tracking_id(
        &self,
        id: &TrackingId,
    ) -> Result<Vec<RegistrationRow>, StoreError> {
        let probe = self.finds.fetch_add(1, Ordering::SeqCst);
        if probe < self.collisions {
            Ok(vec![occupied_row(id)])
        } else {
            Ok(vec![])
        }
    }

    async fn insert_event(&self, _rows: &[NewRegistration]) -> Result<(), StoreError> {
        Ok(())
    }

    async fn record_payment(
        &self,
        _id: &TrackingId,
        _update: &PaymentUpdate,
    ) -> Result<u64, StoreError> {
        Ok(0)
    }

    async fn apply_patch(
        &self,
        _id: &TrackingId,
        _patch: &RegistrationPatch,
    ) -> Result<u64, StoreError> {
        Ok(0)
    }

    async fn delete_event(&self, _id: &TrackingId) -> Result<u64, StoreError> {
        Ok(0)
    }

    async fn delete_all(&self) -> Result<u64, StoreError> {
        Ok(0)
    }

    async fn list_all(
        &self,
        _page: Option<LimitOffset>,
    ) -> Result<Vec<RegistrationRow>, StoreError> {
        Ok(vec![])
    }

    async fn stats(&self) -> Result<RegistrationStats, StoreError> {
        Ok(RegistrationStats::default())
    }
}

/// Records every dispatch instead of sending anything.
#[derive(Default)]
pub struct RecordingNotifier {
    pub alerts: Mutex<Vec<RegistrationNotice>>,
    pub confirmations: Mutex<Vec<(RegistrationNotice, Vec<String>)>>,
}

#[async_trait]
impl NotificationDispatcher for RecordingNotifier {
    async fn send_admin_alert(&self, notice: &RegistrationNotice) -> Result<(), NotifyError> {
        self.alerts.lock().unwrap().push(notice.clone());
        Ok(())
    }

    async fn send_confirmation(
        &self,
        notice: &RegistrationNotice,
        recipients: &[String],
    ) -> Result<(), NotifyError> {
        self.confirmations
            .lock()
            .unwrap()
            .push((notice.clone(), recipients.to_vec()));
        Ok(())
    }
}

/// Every dispatch fails, for exercising the non-fatal warning path.
pub struct FailingNotifier;

#[async_trait]
impl NotificationDispatcher for FailingNotifier {
    async fn send_admin_alert(&self, _notice: &RegistrationNotice) -> Result<(), NotifyError> {
        Err(NotifyError::Api("smtp relay down".into()))
    }

    async fn send_confirmation(
        &self,
        _notice: &RegistrationNotice,
        _recipients: &[String],
    ) -> Result<(), NotifyError> {
        Err(NotifyError::Api("smtp relay down".into()))
    }
}

/// Memory-backed service wired with a recording notifier.
#[allow(dead_code)]
pub fn memory_service() -> (RegistrationService, Arc<MemoryStore>, Arc<RecordingNotifier>) {
    let store = Arc::new(MemoryStore::new());
    let notifier = Arc::new(RecordingNotifier::default());
    let service = service_with(store.clone(), notifier.clone());
    (service, store, notifier)
}
