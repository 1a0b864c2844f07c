use std::sync::Arc;

use infra::db::Db;
use infra::repos::RegistrationRepo;
use infra::RegistrationStore;

use crate::auth::JwtService;
use crate::committee::CommitteeRoster;
use crate::config::AppConfig;
use crate::services::{EmailNotifier, NotificationDispatcher, PaymentGateway, RegistrationService};

#[derive(Clone)]
pub struct AdminCredentials {
    pub username: String,
    pub password_hash: String,
}

#[derive(Clone)]
pub struct AppState {
    pub db: Db,
    store: Arc<dyn RegistrationStore>,
    registration: RegistrationService,
    jwt_service: JwtService,
    admin: AdminCredentials,
    committee: Arc<CommitteeRoster>,
}

impl AppState {
    pub fn new(db: Db, config: &AppConfig) -> anyhow::Result<Self> {
        let store: Arc<dyn RegistrationStore> = Arc::new(RegistrationRepo::new(db.clone()));
        let notifier: Arc<dyn NotificationDispatcher> =
            Arc::new(EmailNotifier::new(config.email.clone()));
        let committee = Arc::new(CommitteeRoster::load(config.committee_file.as_deref())?);
        let gateway = PaymentGateway::new(config.gateway.clone());

        let registration = RegistrationService::new(
            store.clone(),
            notifier,
            committee.clone(),
            gateway,
            config.fee_per_team,
        );

        Ok(Self {
            db,
            store,
            registration,
            jwt_service: JwtService::new(&config.auth),
            admin: AdminCredentials {
                username: config.auth.admin_username.clone(),
                password_hash: config.auth.admin_password_hash.clone(),
            },
            committee,
        })
    }

    pub fn registration(&self) -> &RegistrationService {
        &self.registration
    }

    pub fn store(&self) -> &dyn RegistrationStore {
        self.store.as_ref()
    }

    pub fn jwt_service(&self) -> &JwtService {
        &self.jwt_service
    }

    pub fn admin(&self) -> &AdminCredentials {
        &self.admin
    }

    pub fn committee(&self) -> &CommitteeRoster {
        &self.committee
    }
}
