//! User profile, settings, and the `user-storage` slot contents.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::state::OnboardingProgress;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Gender {
    Male,
    Female,
    Other,
    PreferNotToSay,
}

impl Gender {
    pub fn from_id(id: &str) -> Option<Self> {
        match id {
            "male" => Some(Self::Male),
            "female" => Some(Self::Female),
            "other" => Some(Self::Other),
            "prefer-not-to-say" => Some(Self::PreferNotToSay),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ActivityLevel {
    Sedentary,
    LightlyActive,
    #[default]
    ModeratelyActive,
    VeryActive,
    ExtremelyActive,
}

/// Someone to call in an emergency.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EmergencyContact {
    pub id: String,
    pub name: String,
    pub relationship: String,
    pub phone_number: String,
    pub is_primary: bool,
}

/// Health profile collected during onboarding.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub date_of_birth: String,
    pub gender: Gender,
    /// Centimetres.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f32>,
    /// Kilograms.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f32>,
    #[serde(default)]
    pub health_goals: Vec<String>,
    #[serde(default)]
    pub activity_level: ActivityLevel,
    #[serde(default)]
    pub allergies: Vec<String>,
    #[serde(default)]
    pub medical_conditions: Vec<String>,
    #[serde(default)]
    pub emergency_contacts: Vec<EmergencyContact>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserProfile {
    /// A new profile from the personal-info screen's fields.
    pub fn new(
        name: impl Into<String>,
        email: Option<String>,
        date_of_birth: impl Into<String>,
        gender: Gender,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            email,
            date_of_birth: date_of_birth.into(),
            gender,
            height: None,
            weight: None,
            health_goals: Vec::new(),
            activity_level: ActivityLevel::default(),
            allergies: Vec::new(),
            medical_conditions: Vec::new(),
            emergency_contacts: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// First word of the name, or "there" for "Welcome, there!".
    pub fn greeting_name(&self) -> &str {
        self.name.split_whitespace().next().unwrap_or("there")
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NotificationSettings {
    pub medications: bool,
    pub symptoms: bool,
    pub achievements: bool,
    pub insights: bool,
    pub reminders: bool,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            medications: true,
            symptoms: true,
            achievements: true,
            insights: true,
            reminders: true,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct PrivacySettings {
    pub share_data: bool,
    pub analytics: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AppSettings {
    pub notifications: NotificationSettings,
    pub privacy: PrivacySettings,
    pub theme: Theme,
    pub language: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            notifications: NotificationSettings::default(),
            privacy: PrivacySettings::default(),
            theme: Theme::default(),
            language: "en".to_string(),
        }
    }
}

/// Everything stored in the `user-storage` slot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserState {
    #[serde(default)]
    pub profile: Option<UserProfile>,
    #[serde(default)]
    pub onboarding_progress: OnboardingProgress,
    #[serde(default)]
    pub settings: AppSettings,
    #[serde(default = "first_launch")]
    pub is_first_launch: bool,
}

fn first_launch() -> bool {
    true
}

impl Default for UserState {
    fn default() -> Self {
        Self {
            profile: None,
            onboarding_progress: OnboardingProgress::default(),
            settings: AppSettings::default(),
            is_first_launch: true,
        }
    }
}

impl UserState {
    /// Replace the profile wholesale.
    pub fn set_profile(&mut self, profile: UserProfile) {
        self.profile = Some(profile);
    }

    /// Edit the existing profile and stamp `updated_at`. Returns `false`
    /// when there is no profile yet.
    pub fn update_profile(&mut self, f: impl FnOnce(&mut UserProfile)) -> bool {
        match self.profile.as_mut() {
            Some(profile) => {
                f(profile);
                profile.updated_at = Utc::now();
                true
            }
            None => false,
        }
    }

    pub fn update_settings(&mut self, f: impl FnOnce(&mut AppSettings)) {
        f(&mut self.settings);
    }

    /// Finish onboarding and clear the first-launch flag.
    pub fn complete_onboarding(&mut self) -> DateTime<Utc> {
        self.is_first_launch = false;
        self.onboarding_progress.complete()
    }

    /// Restart onboarding from scratch. Profile and settings are kept.
    pub fn reset_onboarding(&mut self) {
        self.onboarding_progress.reset();
        self.is_first_launch = true;
    }
}
