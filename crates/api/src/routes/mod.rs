pub mod admin;
pub mod login;
pub mod notify;
pub mod registrations;
