pub mod registrations;

pub use registrations::RegistrationRepo;
