//! Health records: symptoms, medications, nutrition, achievements and
//! connected devices, persisted in the `health-storage` slot.

pub mod model;
pub mod state;

pub use model::{
    Achievement, DailySnapshot, DeviceConnection, HealthInsight, HealthMetric, MealType,
    Medication, MedicationLog, NutritionEntry, Severity, Symptom,
};
pub use state::{HealthState, HealthStore};
