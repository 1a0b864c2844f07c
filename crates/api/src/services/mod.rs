pub mod gateway;
pub mod notifier;
pub mod registration;
pub mod tracking;

pub use gateway::PaymentGateway;
pub use notifier::{EmailNotifier, NotificationDispatcher, RegistrationNotice};
pub use registration::RegistrationService;
