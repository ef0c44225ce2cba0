//! OnboardingTracker: the single shared handle every onboarding screen
//! reads and mutates.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, info};

use super::model::{AppSettings, UserProfile, UserState};
use super::state::OnboardingProgress;
use super::steps::OnboardingStep;
use crate::store::SharedState;

/// Which screen stack the root navigator should present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RootStack {
    Onboarding,
    Main,
}

impl RootStack {
    fn for_progress(progress: &OnboardingProgress) -> Self {
        if progress.should_show_onboarding() {
            Self::Onboarding
        } else {
            Self::Main
        }
    }
}

/// Onboarding status returned by the REST endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingStatus {
    pub progress: OnboardingProgress,
    pub should_show_onboarding: bool,
    pub root_stack: RootStack,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_screen: Option<OnboardingStep>,
}

/// Shared onboarding progress tracker.
///
/// Clones are handles to the same state; no caller holds a private copy.
/// The tracker never navigates itself. It publishes the derived
/// [`RootStack`] for whoever owns navigation.
#[derive(Clone)]
pub struct OnboardingTracker {
    user: SharedState<UserState>,
    root_tx: Arc<watch::Sender<RootStack>>,
}

impl OnboardingTracker {
    pub async fn new(user: SharedState<UserState>) -> Self {
        let initial = user
            .read(|s| RootStack::for_progress(&s.onboarding_progress))
            .await;
        let (root_tx, _rx) = watch::channel(initial);
        Self {
            user,
            root_tx: Arc::new(root_tx),
        }
    }

    /// The underlying `user-storage` container.
    pub fn user_state(&self) -> &SharedState<UserState> {
        &self.user
    }

    pub async fn progress(&self) -> OnboardingProgress {
        self.user.read(|s| s.onboarding_progress.clone()).await
    }

    pub async fn advance(&self) -> u32 {
        let step = self.user.update(|s| s.onboarding_progress.advance()).await;
        debug!(step, "Onboarding advanced");
        step
    }

    pub async fn retreat(&self) -> u32 {
        let step = self.user.update(|s| s.onboarding_progress.retreat()).await;
        debug!(step, "Onboarding retreated");
        step
    }

    pub async fn mark_step_complete(&self, step_id: &str) -> bool {
        let inserted = self
            .user
            .update(|s| s.onboarding_progress.mark_step_complete(step_id))
            .await;
        if inserted {
            info!(step = %step_id, "Onboarding step completed");
        }
        inserted
    }

    /// Mark `step` done and advance, as one mutation.
    pub async fn finish_step(&self, step: OnboardingStep) -> u32 {
        let current = self
            .user
            .update(|s| s.onboarding_progress.finish_step(step))
            .await;
        info!(step = %step, current, "Onboarding step finished");
        current
    }

    /// Mark onboarding complete and switch the root stack to `Main`.
    pub async fn complete(&self) -> DateTime<Utc> {
        let (completed_at, switched) = self
            .user
            .update(|s| {
                let completed_at = s.complete_onboarding();
                (completed_at, self.publish_root_stack(s))
            })
            .await;
        if switched {
            info!(%completed_at, "Onboarding complete");
        }
        completed_at
    }

    /// Restart onboarding from the first step.
    pub async fn reset(&self) {
        let switched = self
            .user
            .update(|s| {
                s.reset_onboarding();
                self.publish_root_stack(s)
            })
            .await;
        if switched {
            info!("Onboarding reset");
        }
    }

    pub async fn should_show_onboarding(&self) -> bool {
        self.user
            .read(|s| s.onboarding_progress.should_show_onboarding())
            .await
    }

    /// Last published root stack.
    pub fn root_stack(&self) -> RootStack {
        *self.root_tx.borrow()
    }

    /// Observe root stack changes.
    pub fn subscribe_root_stack(&self) -> watch::Receiver<RootStack> {
        self.root_tx.subscribe()
    }

    pub async fn status(&self) -> OnboardingStatus {
        let progress = self.progress().await;
        OnboardingStatus {
            should_show_onboarding: progress.should_show_onboarding(),
            root_stack: RootStack::for_progress(&progress),
            current_screen: progress.current_screen(),
            progress,
        }
    }

    // ── Profile and settings ────────────────────────────────────────

    pub async fn profile(&self) -> Option<UserProfile> {
        self.user.read(|s| s.profile.clone()).await
    }

    pub async fn set_profile(&self, profile: UserProfile) {
        self.user.update(|s| s.set_profile(profile)).await;
    }

    /// Returns `false` when there is no profile to update.
    pub async fn update_profile(&self, f: impl FnOnce(&mut UserProfile)) -> bool {
        self.user.update(|s| s.update_profile(f)).await
    }

    pub async fn update_settings(&self, f: impl FnOnce(&mut AppSettings)) {
        self.user.update(|s| s.update_settings(f)).await;
    }

    /// Publish the stack derived from `state`. Called from inside the
    /// update so the published value follows the order of writes.
    fn publish_root_stack(&self, state: &UserState) -> bool {
        let stack = RootStack::for_progress(&state.onboarding_progress);
        self.root_tx.send_if_modified(|current| {
            if *current == stack {
                false
            } else {
                *current = stack;
                true
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::onboarding::model::Gender;
    use crate::store::{KeyValueStore, MemoryStore, slot_keys};

    async fn tracker_with(store: Arc<dyn KeyValueStore>) -> OnboardingTracker {
        let user = SharedState::load(store, slot_keys::USER).await;
        OnboardingTracker::new(user).await
    }

    async fn tracker() -> OnboardingTracker {
        tracker_with(Arc::new(MemoryStore::new())).await
    }

    #[tokio::test]
    async fn handles_share_state() {
        let a = tracker().await;
        let b = a.clone();
        a.finish_step(OnboardingStep::Welcome).await;
        assert_eq!(b.progress().await.current_step(), 2);
        assert!(b.progress().await.is_step_complete("welcome"));
    }

    #[tokio::test]
    async fn concurrent_advances_clamp() {
        let t = tracker().await;
        let mut handles = Vec::new();
        for _ in 0..30 {
            let t = t.clone();
            handles.push(tokio::spawn(async move { t.advance().await }));
        }
        for h in handles {
            assert!(h.await.unwrap() <= 11);
        }
        assert_eq!(t.progress().await.current_step(), 11);
    }

    #[tokio::test]
    async fn complete_flips_root_stack_once() {
        let t = tracker().await;
        let mut rx = t.subscribe_root_stack();
        assert_eq!(t.root_stack(), RootStack::Onboarding);
        assert!(t.should_show_onboarding().await);

        let first = t.complete().await;
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), RootStack::Main);

        let second = t.complete().await;
        assert_eq!(first, second);
        assert!(!rx.has_changed().unwrap());
        assert!(!t.should_show_onboarding().await);
        assert!(!t.user_state().read(|s| s.is_first_launch).await);
    }

    #[tokio::test]
    async fn reset_returns_to_onboarding() {
        let t = tracker().await;
        t.complete().await;
        t.reset().await;
        assert_eq!(t.root_stack(), RootStack::Onboarding);
        let status = t.status().await;
        assert!(status.should_show_onboarding);
        assert_eq!(status.current_screen, Some(OnboardingStep::Welcome));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn overlapping_complete_and_reset_agree_with_root_stack() {
        let t = tracker().await;
        for round in 0..20 {
            let mut handles = Vec::new();
            for i in 0..8 {
                let t = t.clone();
                handles.push(tokio::spawn(async move {
                    if (i + round) % 2 == 0 {
                        t.complete().await;
                    } else {
                        t.reset().await;
                    }
                }));
            }
            for h in handles {
                h.await.unwrap();
            }

            let expected = if t.should_show_onboarding().await {
                RootStack::Onboarding
            } else {
                RootStack::Main
            };
            assert_eq!(t.root_stack(), expected, "round {round}");
        }
    }

    #[tokio::test]
    async fn progress_survives_restart() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        {
            let t = tracker_with(Arc::clone(&store)).await;
            t.finish_step(OnboardingStep::Welcome).await;
            t.finish_step(OnboardingStep::PersonalInfo).await;
            t.complete().await;
        }

        let t = tracker_with(store).await;
        let progress = t.progress().await;
        assert_eq!(progress.current_step(), 3);
        assert!(progress.is_completed());
        assert_eq!(t.root_stack(), RootStack::Main);
    }

    #[tokio::test]
    async fn profile_updates() {
        let t = tracker().await;
        assert!(!t.update_profile(|p| p.health_goals.push("sleep".into())).await);

        t.set_profile(UserProfile::new("Ana", None, "2000-01-01", Gender::Female))
            .await;
        assert!(t.update_profile(|p| p.health_goals.push("sleep".into())).await);
        assert_eq!(t.profile().await.unwrap().health_goals, vec!["sleep"]);

        t.update_settings(|s| s.privacy.analytics = true).await;
        assert!(t.user_state().read(|s| s.settings.privacy.analytics).await);
    }
}
