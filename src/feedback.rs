//! Haptic and audio feedback capability.
//!
//! Every call is best effort: failures are logged and swallowed, and never
//! interrupt whatever triggered them.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::FeedbackError;

/// Strength of an impact haptic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImpactIntensity {
    Light,
    Medium,
    Heavy,
}

impl std::fmt::Display for ImpactIntensity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Light => write!(f, "light"),
            Self::Medium => write!(f, "medium"),
            Self::Heavy => write!(f, "heavy"),
        }
    }
}

/// Platform haptics/audio.
#[async_trait]
pub trait Feedback: Send + Sync {
    async fn trigger_impact(&self, intensity: ImpactIntensity) -> Result<(), FeedbackError>;

    async fn trigger_success(&self) -> Result<(), FeedbackError>;

    async fn trigger_selection(&self) -> Result<(), FeedbackError>;

    /// Prepare the audio session so a success chime can play.
    async fn prime_audio(&self) -> Result<(), FeedbackError> {
        Ok(())
    }
}

/// Headless implementation that only logs each call.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingFeedback;

#[async_trait]
impl Feedback for TracingFeedback {
    async fn trigger_impact(&self, intensity: ImpactIntensity) -> Result<(), FeedbackError> {
        debug!(%intensity, "Impact haptic");
        Ok(())
    }

    async fn trigger_success(&self) -> Result<(), FeedbackError> {
        debug!("Success haptic");
        Ok(())
    }

    async fn trigger_selection(&self) -> Result<(), FeedbackError> {
        debug!("Selection haptic");
        Ok(())
    }
}

fn swallow(what: &str, result: Result<(), FeedbackError>) {
    if let Err(e) = result {
        warn!(error = %e, "Failed to {what}");
    }
}

/// Named feedback sequences fired by the app.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackCue {
    /// Audio prime plus success notification.
    Success,
    ButtonPress,
    Selection,
    /// Heavy, medium, light triple pulse.
    Achievement,
    RingCompletion,
    /// Success notification followed by a medium impact.
    JourneyBegin,
}

impl FeedbackCue {
    /// Play this cue. Never fails; individual errors are logged.
    pub async fn play(self, feedback: &dyn Feedback) {
        match self {
            Self::Success => {
                swallow("prime audio", feedback.prime_audio().await);
                swallow("trigger success haptic", feedback.trigger_success().await);
            }
            Self::ButtonPress => swallow(
                "trigger impact haptic",
                feedback.trigger_impact(ImpactIntensity::Medium).await,
            ),
            Self::Selection => swallow(
                "trigger selection haptic",
                feedback.trigger_selection().await,
            ),
            Self::Achievement => {
                pulse(feedback, ImpactIntensity::Heavy).await;
                tokio::time::sleep(Duration::from_millis(100)).await;
                pulse(feedback, ImpactIntensity::Medium).await;
                tokio::time::sleep(Duration::from_millis(100)).await;
                pulse(feedback, ImpactIntensity::Light).await;
            }
            Self::RingCompletion => pulse(feedback, ImpactIntensity::Light).await,
            Self::JourneyBegin => {
                swallow("trigger success haptic", feedback.trigger_success().await);
                tokio::time::sleep(Duration::from_millis(150)).await;
                pulse(feedback, ImpactIntensity::Medium).await;
            }
        }
    }
}

async fn pulse(feedback: &dyn Feedback, intensity: ImpactIntensity) {
    swallow(
        "trigger impact haptic",
        feedback.trigger_impact(intensity).await,
    );
}


#[cfg(test)]
mod tests {
    use super::testing::{Call, RecordingFeedback};
    use super::*;

    #[tokio::test]
    async fn achievement_is_triple_pulse() {
        let fb = RecordingFeedback::default();
        FeedbackCue::Achievement.play(&fb).await;
        assert_eq!(
            fb.calls(),
            vec![
                Call::Impact(ImpactIntensity::Heavy),
                Call::Impact(ImpactIntensity::Medium),
                Call::Impact(ImpactIntensity::Light),
            ]
        );
    }

    #[tokio::test]
    async fn journey_begin_sequence() {
        let fb = RecordingFeedback::default();
        FeedbackCue::JourneyBegin.play(&fb).await;
        assert_eq!(
            fb.calls(),
            vec![Call::Success, Call::Impact(ImpactIntensity::Medium)]
        );
    }

    #[tokio::test]
    async fn success_primes_audio_first() {
        let fb = RecordingFeedback::default();
        FeedbackCue::Success.play(&fb).await;
        assert_eq!(fb.calls(), vec![Call::PrimeAudio, Call::Success]);
    }

    #[tokio::test]
    async fn failures_are_swallowed() {
        let fb = RecordingFeedback::failing();
        FeedbackCue::JourneyBegin.play(&fb).await;
        // Both calls were still attempted.
        assert_eq!(fb.calls().len(), 2);
    }

    #[tokio::test]
    async fn tracing_feedback_never_fails() {
        let fb = TracingFeedback;
        assert!(fb.trigger_impact(ImpactIntensity::Light).await.is_ok());
        assert!(fb.trigger_selection().await.is_ok());
        assert!(fb.prime_audio().await.is_ok());
    }
}
