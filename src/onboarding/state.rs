//! Onboarding progress: which step the user is on and what is done.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::steps::OnboardingStep;

/// Persisted onboarding progress.
///
/// `current_step` is 1-based and only moves forward through [`advance`]
/// (or back through an explicit [`retreat`]). Once [`complete`] has been
/// called the progress is frozen until [`reset`].
///
/// [`advance`]: OnboardingProgress::advance
/// [`retreat`]: OnboardingProgress::retreat
/// [`complete`]: OnboardingProgress::complete
/// [`reset`]: OnboardingProgress::reset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "ProgressRecord")]
pub struct OnboardingProgress {
    current_step: u32,
    total_steps: u32,
    completed_steps: BTreeSet<String>,
    is_completed: bool,
    started_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    completed_at: Option<DateTime<Utc>>,
}

impl Default for OnboardingProgress {
    fn default() -> Self {
        Self::new(OnboardingStep::COUNT)
    }
}

impl OnboardingProgress {
    /// Fresh progress at step 1 of `total_steps`.
    pub fn new(total_steps: u32) -> Self {
        Self {
            current_step: 1,
            total_steps: total_steps.max(1),
            completed_steps: BTreeSet::new(),
            is_completed: false,
            started_at: Utc::now(),
            completed_at: None,
        }
    }

    /// Move to the next step, clamped at `total_steps`. Returns the new step.
    pub fn advance(&mut self) -> u32 {
        if !self.is_completed {
            self.current_step = (self.current_step + 1).min(self.total_steps);
        }
        self.current_step
    }

    /// Move to the previous step, floored at 1. Returns the new step.
    pub fn retreat(&mut self) -> u32 {
        if !self.is_completed {
            self.current_step = self.current_step.saturating_sub(1).max(1);
        }
        self.current_step
    }

    /// Record `step_id` as done. Returns `true` if it was newly inserted.
    pub fn mark_step_complete(&mut self, step_id: impl Into<String>) -> bool {
        if self.is_completed {
            return false;
        }
        self.completed_steps.insert(step_id.into())
    }

    /// What every onboarding screen does on "next": mark the step done,
    /// then advance.
    pub fn finish_step(&mut self, step: OnboardingStep) -> u32 {
        self.mark_step_complete(step.id());
        self.advance()
    }

    /// Mark the whole flow done. `completed_at` is stamped only on the first
    /// call; the stamp is returned.
    pub fn complete(&mut self) -> DateTime<Utc> {
        self.is_completed = true;
        *self.completed_at.get_or_insert_with(Utc::now)
    }

    /// Return to first-launch state.
    pub fn reset(&mut self) {
        *self = Self::new(self.total_steps);
    }

    /// Derived navigation decision for the root navigator.
    pub fn should_show_onboarding(&self) -> bool {
        !self.is_completed
    }

    pub fn current_step(&self) -> u32 {
        self.current_step
    }

    pub fn total_steps(&self) -> u32 {
        self.total_steps
    }

    /// The screen for `current_step`, when it maps to a known step.
    pub fn current_screen(&self) -> Option<OnboardingStep> {
        OnboardingStep::at(self.current_step)
    }

    pub fn completed_steps(&self) -> &BTreeSet<String> {
        &self.completed_steps
    }

    pub fn is_step_complete(&self, step_id: &str) -> bool {
        self.completed_steps.contains(step_id)
    }

    pub fn is_completed(&self) -> bool {
        self.is_completed
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// Progress bar fill in `0.0..=1.0`.
    pub fn fraction(&self) -> f32 {
        self.current_step as f32 / self.total_steps as f32
    }
}

/// Wire shape of [`OnboardingProgress`]; clamps out-of-range values on load.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProgressRecord {
    #[serde(default)]
    current_step: u32,
    #[serde(default = "default_total_steps")]
    total_steps: u32,
    #[serde(default)]
    completed_steps: BTreeSet<String>,
    #[serde(default)]
    is_completed: bool,
    #[serde(default = "Utc::now")]
    started_at: DateTime<Utc>,
    #[serde(default)]
    completed_at: Option<DateTime<Utc>>,
}

fn default_total_steps() -> u32 {
    OnboardingStep::COUNT
}

impl From<ProgressRecord> for OnboardingProgress {
    fn from(r: ProgressRecord) -> Self {
        let total_steps = r.total_steps.max(1);
        let completed_at = match (r.is_completed, r.completed_at) {
            (true, None) => Some(r.started_at),
            (_, at) => at,
        };
        Self {
            current_step: r.current_step.clamp(1, total_steps),
            total_steps,
            completed_steps: r.completed_steps,
            is_completed: r.is_completed,
            started_at: r.started_at,
            completed_at,
        }
    }
}
