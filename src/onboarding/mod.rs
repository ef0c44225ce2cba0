//! Onboarding: the first-launch flow and the reveal that ends it.
//!
//! A new user walks through eleven fixed screens. Progress lives in the
//! shared [`OnboardingTracker`], which persists it in the `user-storage`
//! slot and tells the root navigator which screen stack to show. The last
//! screen plays the [`RevealChoreographer`] celebration, which marks
//! onboarding complete when it finishes.

pub mod effects;
pub mod model;
pub mod reveal;
pub mod routes;
pub mod state;
pub mod steps;
pub mod timeline;
pub mod tracker;
pub mod validate;

pub use effects::{Cue, Particle, RevealEffect, TouchPoint};
pub use model::{AppSettings, EmergencyContact, Gender, UserProfile, UserState};
pub use reveal::{RevealChoreographer, RevealEvent, RevealPhase, TimerStats};
pub use routes::{OnboardingRouteState, onboarding_routes};
pub use state::OnboardingProgress;
pub use steps::OnboardingStep;
pub use timeline::{Timeline, TimelineHandle};
pub use tracker::{OnboardingStatus, OnboardingTracker, RootStack};
pub use validate::{ContactDraft, PersonalInfoForm, validate_contacts};
