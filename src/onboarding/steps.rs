//! The fixed, linear sequence of onboarding screens.

use serde::{Deserialize, Serialize};

/// One onboarding screen. Declaration order is flow order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OnboardingStep {
    Welcome,
    PersonalInfo,
    HealthGoals,
    MedicalHistory,
    Medications,
    ActivityLevel,
    Notifications,
    Privacy,
    HealthPermissions,
    EmergencyContacts,
    Completion,
}

impl OnboardingStep {
    /// Every step, in flow order.
    pub const ALL: [OnboardingStep; 11] = [
        Self::Welcome,
        Self::PersonalInfo,
        Self::HealthGoals,
        Self::MedicalHistory,
        Self::Medications,
        Self::ActivityLevel,
        Self::Notifications,
        Self::Privacy,
        Self::HealthPermissions,
        Self::EmergencyContacts,
        Self::Completion,
    ];

    /// Total number of steps in the flow.
    pub const COUNT: u32 = Self::ALL.len() as u32;

    /// Stable string identifier recorded in `completed_steps`.
    pub fn id(&self) -> &'static str {
        match self {
            Self::Welcome => "welcome",
            Self::PersonalInfo => "personal-info",
            Self::HealthGoals => "health-goals",
            Self::MedicalHistory => "medical-history",
            Self::Medications => "medications",
            Self::ActivityLevel => "activity-level",
            Self::Notifications => "notifications",
            Self::Privacy => "privacy",
            Self::HealthPermissions => "health-permissions",
            Self::EmergencyContacts => "emergency-contacts",
            Self::Completion => "completion",
        }
    }

    /// Parse a step identifier.
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.id() == id)
    }

    /// 1-based position in the flow.
    pub fn number(&self) -> u32 {
        *self as u32 + 1
    }

    /// The step at a 1-based position.
    pub fn at(number: u32) -> Option<Self> {
        let index = number.checked_sub(1)?;
        Self::ALL.get(index as usize).copied()
    }

    /// The following step, if any.
    pub fn next(&self) -> Option<Self> {
        Self::at(self.number() + 1)
    }

    pub fn is_last(&self) -> bool {
        matches!(self, Self::Completion)
    }
}

impl std::fmt::Display for OnboardingStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}
