pub mod db;
pub mod memory;
pub mod models;
pub mod pagination;
pub mod repos;
pub mod store;

pub use models::{
    NewRegistration, PaymentMethod, PaymentStatus, PaymentUpdate, RegistrationPatch,
    RegistrationRow, RegistrationStats, TrackingId,
};
pub use store::{RegistrationStore, StoreError};
