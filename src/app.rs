//! Application context, built once at startup and handed to every screen.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::info;

use crate::accessibility::MotionPreference;
use crate::chat::ChatStore;
use crate::config::RevealTimings;
use crate::feedback::Feedback;
use crate::health::HealthStore;
use crate::onboarding::{OnboardingTracker, RevealChoreographer, RootStack};
use crate::store::{KeyValueStore, SharedState, slot_keys};

/// Handles to every persisted store plus the injected platform
/// capabilities. Clones share state.
#[derive(Clone)]
pub struct AppContext {
    pub onboarding: OnboardingTracker,
    pub health: HealthStore,
    pub chat: ChatStore,
    feedback: Arc<dyn Feedback>,
    motion: Arc<dyn MotionPreference>,
    reveal_timings: RevealTimings,
}

impl AppContext {
    /// Load all three slots. Missing or unreadable slots start from
    /// first-launch defaults.
    pub async fn load(
        store: Arc<dyn KeyValueStore>,
        feedback: Arc<dyn Feedback>,
        motion: Arc<dyn MotionPreference>,
        reveal_timings: RevealTimings,
    ) -> Self {
        let user = SharedState::load(Arc::clone(&store), slot_keys::USER).await;
        let health = SharedState::load(Arc::clone(&store), slot_keys::HEALTH).await;
        let chat = SharedState::load(store, slot_keys::CHAT).await;

        let onboarding = OnboardingTracker::new(user).await;
        info!(root_stack = ?onboarding.root_stack(), "Application state loaded");

        Self {
            onboarding,
            health: HealthStore::new(health),
            chat: ChatStore::new(chat),
            feedback,
            motion,
            reveal_timings,
        }
    }

    pub fn root_stack(&self) -> RootStack {
        self.onboarding.root_stack()
    }

    pub fn subscribe_root_stack(&self) -> watch::Receiver<RootStack> {
        self.onboarding.subscribe_root_stack()
    }

    pub fn feedback(&self) -> Arc<dyn Feedback> {
        Arc::clone(&self.feedback)
    }

    pub fn motion(&self) -> &dyn MotionPreference {
        self.motion.as_ref()
    }

    /// Mount the completion screen's reveal.
    pub fn mount_reveal(&self) -> RevealChoreographer {
        RevealChoreographer::mount(
            self.onboarding.clone(),
            self.feedback(),
            self.motion(),
            self.reveal_timings,
        )
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::accessibility::MotionSettings;
    use crate::feedback::TracingFeedback;
    use crate::health::{Severity, Symptom};
    use crate::onboarding::{RevealPhase, TouchPoint};
    use crate::store::MemoryStore;

    async fn context(store: Arc<dyn KeyValueStore>, reduce_motion: bool) -> AppContext {
        AppContext::load(
            store,
            Arc::new(TracingFeedback),
            Arc::new(MotionSettings::new(reduce_motion)),
            RevealTimings::default().scaled(0.01),
        )
        .await
    }

    #[tokio::test]
    async fn reveal_swaps_root_stack() {
        let ctx = context(Arc::new(MemoryStore::new()), false).await;
        let mut root = ctx.subscribe_root_stack();
        assert_eq!(ctx.root_stack(), RootStack::Onboarding);

        let mut reveal = ctx.mount_reveal();
        let mut phase = reveal.subscribe_phase();
        assert!(reveal.tap(TouchPoint::new(160.0, 400.0)));

        let done = phase.wait_for(|p| *p == RevealPhase::Complete);
        tokio::time::timeout(Duration::from_secs(5), done)
            .await
            .unwrap()
            .unwrap();
        root.changed().await.unwrap();
        assert_eq!(*root.borrow(), RootStack::Main);
    }

    #[tokio::test]
    async fn slots_are_independent() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let ctx = context(Arc::clone(&store), true).await;
        ctx.health.add_symptom(Symptom::new("Headache", Severity::MILD)).await;
        ctx.onboarding.complete().await;

        // Wipe only the chat slot.
        store.remove(slot_keys::CHAT).await.unwrap();

        let reloaded = context(store, true).await;
        assert_eq!(reloaded.root_stack(), RootStack::Main);
        assert_eq!(reloaded.health.snapshot().await.symptoms.len(), 1);
        assert_eq!(reloaded.chat.messages().await.len(), 1);
    }
}
