//! Qoncier: onboarding, health records and the completion reveal for the
//! Qoncier health companion app.

pub mod accessibility;
pub mod app;
pub mod chat;
pub mod config;
pub mod error;
pub mod feedback;
pub mod health;
pub mod onboarding;
pub mod store;
