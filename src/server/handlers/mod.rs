pub mod auth;
pub mod chat;
pub mod health;
pub mod medicines;
pub mod prescriptions;
