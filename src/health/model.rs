//! Health record types stored in the `health-storage` slot.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{FieldError, ValidationError};

pub(crate) fn new_id() -> String {
    Uuid::new_v4().to_string()
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum MetricType {
    Steps,
    HeartRate,
    BloodPressure,
    Weight,
    Sleep,
    WaterIntake,
    Calories,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum MetricSource {
    #[default]
    Manual,
    Device,
    Estimated,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HealthMetric {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: MetricType,
    pub value: f64,
    pub unit: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub source: MetricSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
}

/// Symptom severity, 1 (mild) to 5 (severe).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(try_from = "u8", into = "u8")]
pub struct Severity(u8);

impl Severity {
    pub const MILD: Severity = Severity(1);
    pub const SEVERE: Severity = Severity(5);

    pub fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Severity {
    type Error = ValidationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if (1..=5).contains(&value) {
            Ok(Self(value))
        } else {
            Err(ValidationError {
                fields: vec![FieldError::new(
                    "severity",
                    format!("Severity must be between 1 and 5, got {value}"),
                )],
            })
        }
    }
}

impl From<Severity> for u8 {
    fn from(severity: Severity) -> Self {
        severity.0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Symptom {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub severity: Severity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_part: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(default)]
    pub triggers: Vec<String>,
    #[serde(default)]
    pub photos: Vec<String>,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Symptom {
    pub fn new(name: impl Into<String>, severity: Severity) -> Self {
        Self {
            id: new_id(),
            name: name.into(),
            description: None,
            severity,
            body_part: None,
            duration: None,
            triggers: Vec::new(),
            photos: Vec::new(),
            timestamp: Utc::now(),
            tags: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MedicationReminder {
    pub id: String,
    pub medication_id: String,
    /// `HH:MM`.
    pub time: String,
    /// 0-6, Sunday is 0.
    pub days: Vec<u8>,
    pub is_enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Medication {
    pub id: String,
    pub name: String,
    pub dosage: String,
    pub frequency: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prescribed_by: Option<String>,
    pub start_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(default)]
    pub reminders: Vec<MedicationReminder>,
    #[serde(default)]
    pub side_effects: Vec<String>,
    pub is_active: bool,
    #[serde(default)]
    pub photos: Vec<String>,
}

impl Medication {
    pub fn new(
        name: impl Into<String>,
        dosage: impl Into<String>,
        frequency: impl Into<String>,
        start_date: impl Into<String>,
    ) -> Self {
        Self {
            id: new_id(),
            name: name.into(),
            dosage: dosage.into(),
            frequency: frequency.into(),
            instructions: None,
            prescribed_by: None,
            start_date: start_date.into(),
            end_date: None,
            reminders: Vec::new(),
            side_effects: Vec::new(),
            is_active: true,
            photos: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MedicationLog {
    pub id: String,
    pub medication_id: String,
    pub timestamp: DateTime<Utc>,
    pub taken: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Macros {
    pub protein: f32,
    pub carbs: f32,
    pub fat: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fiber: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sugar: Option<f32>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum NutritionSource {
    Barcode,
    Photo,
    #[default]
    Manual,
    AiAnalysis,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NutritionEntry {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub barcode: Option<String>,
    pub quantity: f32,
    pub unit: String,
    pub calories: f32,
    pub macros: Macros,
    /// Vitamin or mineral name to amount.
    #[serde(default)]
    pub micros: BTreeMap<String, f32>,
    pub meal_type: MealType,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub photos: Vec<String>,
    #[serde(default)]
    pub source: NutritionSource,
}

impl NutritionEntry {
    pub fn new(name: impl Into<String>, calories: f32, meal_type: MealType) -> Self {
        Self {
            id: new_id(),
            name: name.into(),
            brand: None,
            barcode: None,
            quantity: 1.0,
            unit: "serving".to_string(),
            calories,
            macros: Macros::default(),
            micros: BTreeMap::new(),
            meal_type,
            timestamp: Utc::now(),
            photos: Vec::new(),
            source: NutritionSource::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AchievementCategory {
    Steps,
    Medication,
    Nutrition,
    Symptoms,
    General,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Achievement {
    pub id: String,
    pub title: String,
    pub description: String,
    pub icon: String,
    pub category: AchievementCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unlocked_at: Option<DateTime<Utc>>,
    pub progress: u32,
    pub target: u32,
    pub is_unlocked: bool,
}

impl Achievement {
    fn locked(
        id: &str,
        title: &str,
        description: &str,
        icon: &str,
        category: AchievementCategory,
        target: u32,
    ) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            icon: icon.to_string(),
            category,
            unlocked_at: None,
            progress: 0,
            target,
            is_unlocked: false,
        }
    }

    /// Unlock and fill progress. The first unlock time sticks.
    pub fn unlock(&mut self) -> bool {
        if self.is_unlocked {
            return false;
        }
        self.is_unlocked = true;
        self.unlocked_at.get_or_insert_with(Utc::now);
        self.progress = self.target;
        true
    }
}

pub mod achievement_ids {
    pub const FIRST_STEPS: &str = "1";
    pub const MEDICATION_MASTER: &str = "2";
    pub const NUTRITION_TRACKER: &str = "3";
    pub const STEP_COUNTER: &str = "4";
}

/// Nutrition entries needed for the "Nutrition Tracker" achievement.
pub const NUTRITION_TRACKER_TARGET: u32 = 10;

pub fn default_achievements() -> Vec<Achievement> {
    vec![
        Achievement::locked(
            achievement_ids::FIRST_STEPS,
            "First Steps",
            "Log your first symptom",
            "medical",
            AchievementCategory::Symptoms,
            1,
        ),
        Achievement::locked(
            achievement_ids::MEDICATION_MASTER,
            "Medication Master",
            "Take medications for 7 days straight",
            "medical",
            AchievementCategory::Medication,
            7,
        ),
        Achievement::locked(
            achievement_ids::NUTRITION_TRACKER,
            "Nutrition Tracker",
            "Log 10 meals",
            "nutrition",
            AchievementCategory::Nutrition,
            NUTRITION_TRACKER_TARGET,
        ),
        Achievement::locked(
            achievement_ids::STEP_COUNTER,
            "Step Counter",
            "Walk 10,000 steps in a day",
            "walk",
            AchievementCategory::Steps,
            10_000,
        ),
    ]
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum InsightKind {
    Positive,
    Warning,
    Neutral,
    Achievement,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum InsightCategory {
    Activity,
    Nutrition,
    Medication,
    Symptoms,
    Sleep,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HealthInsight {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: InsightKind,
    pub category: InsightCategory,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub actionable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_type: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum DeviceKind {
    AppleHealth,
    Fitbit,
    Oura,
    Garmin,
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DeviceConnection {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: DeviceKind,
    pub is_connected: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_sync: Option<DateTime<Utc>>,
    pub permissions: Vec<String>,
}

impl DeviceConnection {
    fn available(id: &str, name: &str, kind: DeviceKind, permissions: &[&str]) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            kind,
            is_connected: false,
            last_sync: None,
            permissions: permissions.iter().map(|p| p.to_string()).collect(),
        }
    }
}

pub fn default_device_connections() -> Vec<DeviceConnection> {
    vec![
        DeviceConnection::available(
            "1",
            "Apple Health",
            DeviceKind::AppleHealth,
            &["steps", "heart-rate", "sleep"],
        ),
        DeviceConnection::available(
            "2",
            "Fitbit",
            DeviceKind::Fitbit,
            &["steps", "heart-rate", "sleep", "weight"],
        ),
        DeviceConnection::available(
            "3",
            "Oura Ring",
            DeviceKind::Oura,
            &["sleep", "heart-rate", "activity"],
        ),
        DeviceConnection::available(
            "4",
            "Garmin",
            DeviceKind::Garmin,
            &["steps", "heart-rate", "sleep", "activity"],
        ),
    ]
}

/// Today's headline numbers shown on the dashboard.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DailySnapshot {
    pub today_steps: u32,
    pub heart_rate: u32,
    pub sleep_hours: f32,
    pub water_intake: u32,
    pub calories_consumed: u32,
    /// Percent.
    pub medication_adherence: u32,
}

impl Default for DailySnapshot {
    fn default() -> Self {
        Self {
            today_steps: 7842,
            heart_rate: 72,
            sleep_hours: 7.5,
            water_intake: 6,
            calories_consumed: 1850,
            medication_adherence: 85,
        }
    }
}
