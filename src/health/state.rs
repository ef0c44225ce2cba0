//! The `health-storage` slot and its shared handle.

use serde::{Deserialize, Serialize};
use tracing::info;

use super::model::{
    Achievement, DailySnapshot, DeviceConnection, HealthInsight, HealthMetric, Medication,
    MedicationLog, NUTRITION_TRACKER_TARGET, NutritionEntry, Symptom, achievement_ids,
    default_achievements, default_device_connections,
};
use crate::store::SharedState;

/// Everything stored in the `health-storage` slot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HealthState {
    #[serde(default)]
    pub metrics: Vec<HealthMetric>,
    #[serde(default)]
    pub symptoms: Vec<Symptom>,
    #[serde(default)]
    pub medications: Vec<Medication>,
    #[serde(default)]
    pub medication_logs: Vec<MedicationLog>,
    #[serde(default)]
    pub nutrition_entries: Vec<NutritionEntry>,
    #[serde(default = "default_achievements")]
    pub achievements: Vec<Achievement>,
    #[serde(default)]
    pub insights: Vec<HealthInsight>,
    #[serde(default = "default_device_connections")]
    pub device_connections: Vec<DeviceConnection>,
    #[serde(default)]
    pub daily_snapshot: DailySnapshot,
}

impl Default for HealthState {
    fn default() -> Self {
        Self {
            metrics: Vec::new(),
            symptoms: Vec::new(),
            medications: Vec::new(),
            medication_logs: Vec::new(),
            nutrition_entries: Vec::new(),
            achievements: default_achievements(),
            insights: Vec::new(),
            device_connections: default_device_connections(),
            daily_snapshot: DailySnapshot::default(),
        }
    }
}

/// Apply `f` to the record with `id`. Returns whether one was found.
fn update_by_id<T>(
    items: &mut [T],
    id: &str,
    item_id: impl Fn(&T) -> &str,
    f: impl FnOnce(&mut T),
) -> bool {
    match items.iter_mut().find(|item| item_id(item) == id) {
        Some(item) => {
            f(item);
            true
        }
        None => false,
    }
}

fn remove_by_id<T>(items: &mut Vec<T>, id: &str, item_id: impl Fn(&T) -> &str) -> bool {
    let before = items.len();
    items.retain(|item| item_id(item) != id);
    items.len() != before
}

impl HealthState {
    pub fn add_metric(&mut self, metric: HealthMetric) {
        self.metrics.push(metric);
    }

    /// Log a symptom. The first one ever unlocks "First Steps".
    pub fn add_symptom(&mut self, symptom: Symptom) {
        self.symptoms.push(symptom);
        if self.symptoms.len() == 1 {
            self.unlock_achievement(achievement_ids::FIRST_STEPS);
        }
    }

    pub fn update_symptom(&mut self, id: &str, f: impl FnOnce(&mut Symptom)) -> bool {
        update_by_id(&mut self.symptoms, id, |s| s.id.as_str(), f)
    }

    pub fn delete_symptom(&mut self, id: &str) -> bool {
        remove_by_id(&mut self.symptoms, id, |s| s.id.as_str())
    }

    pub fn add_medication(&mut self, medication: Medication) {
        self.medications.push(medication);
    }

    pub fn update_medication(&mut self, id: &str, f: impl FnOnce(&mut Medication)) -> bool {
        update_by_id(&mut self.medications, id, |m| m.id.as_str(), f)
    }

    pub fn delete_medication(&mut self, id: &str) -> bool {
        remove_by_id(&mut self.medications, id, |m| m.id.as_str())
    }

    pub fn log_medication(&mut self, log: MedicationLog) {
        self.medication_logs.push(log);
    }

    /// Log a meal. Reaching ten entries unlocks "Nutrition Tracker".
    pub fn add_nutrition_entry(&mut self, entry: NutritionEntry) {
        self.nutrition_entries.push(entry);
        if self.nutrition_entries.len() >= NUTRITION_TRACKER_TARGET as usize {
            self.unlock_achievement(achievement_ids::NUTRITION_TRACKER);
        }
    }

    pub fn update_nutrition_entry(
        &mut self,
        id: &str,
        f: impl FnOnce(&mut NutritionEntry),
    ) -> bool {
        update_by_id(&mut self.nutrition_entries, id, |e| e.id.as_str(), f)
    }

    pub fn delete_nutrition_entry(&mut self, id: &str) -> bool {
        remove_by_id(&mut self.nutrition_entries, id, |e| e.id.as_str())
    }

    /// Returns `true` only the first time the achievement unlocks.
    pub fn unlock_achievement(&mut self, id: &str) -> bool {
        let unlocked = self
            .achievements
            .iter_mut()
            .find(|a| a.id == id)
            .is_some_and(Achievement::unlock);
        if unlocked {
            info!(achievement = %id, "Achievement unlocked");
        }
        unlocked
    }

    pub fn add_insight(&mut self, insight: HealthInsight) {
        self.insights.push(insight);
    }

    pub fn update_device_connection(
        &mut self,
        id: &str,
        f: impl FnOnce(&mut DeviceConnection),
    ) -> bool {
        update_by_id(&mut self.device_connections, id, |d| d.id.as_str(), f)
    }

    pub fn update_daily_snapshot(&mut self, f: impl FnOnce(&mut DailySnapshot)) {
        f(&mut self.daily_snapshot);
    }
}

/// Shared handle over the `health-storage` slot. Every mutation is
/// persisted before it returns.
#[derive(Clone)]
pub struct HealthStore {
    state: SharedState<HealthState>,
}

impl HealthStore {
    pub fn new(state: SharedState<HealthState>) -> Self {
        Self { state }
    }

    pub async fn snapshot(&self) -> HealthState {
        self.state.snapshot().await
    }

    pub async fn read<R>(&self, f: impl FnOnce(&HealthState) -> R) -> R {
        self.state.read(f).await
    }

    /// Apply any mutation from [`HealthState`] and persist the result.
    pub async fn update<R>(&self, f: impl FnOnce(&mut HealthState) -> R) -> R {
        self.state.update(f).await
    }

    pub async fn add_symptom(&self, symptom: Symptom) {
        self.state.update(|s| s.add_symptom(symptom)).await;
    }

    pub async fn add_medication(&self, medication: Medication) {
        self.state.update(|s| s.add_medication(medication)).await;
    }

    pub async fn log_medication(&self, log: MedicationLog) {
        self.state.update(|s| s.log_medication(log)).await;
    }

    pub async fn add_nutrition_entry(&self, entry: NutritionEntry) {
        self.state.update(|s| s.add_nutrition_entry(entry)).await;
    }

    pub async fn unlock_achievement(&self, id: &str) -> bool {
        self.state.update(|s| s.unlock_achievement(id)).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::health::model::{MealType, Severity};
    use crate::store::{KeyValueStore, MemoryStore, slot_keys};

    fn achievement<'a>(state: &'a HealthState, id: &str) -> &'a Achievement {
        state.achievements.iter().find(|a| a.id == id).unwrap()
    }

    #[test]
    fn fresh_state_is_seeded() {
        let state = HealthState::default();
        assert_eq!(state.achievements.len(), 4);
        assert!(state.achievements.iter().all(|a| !a.is_unlocked));
        let names: Vec<_> = state.device_connections.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["Apple Health", "Fitbit", "Oura Ring", "Garmin"]);
    }

    #[test]
    fn first_symptom_unlocks_first_steps() {
        let mut state = HealthState::default();
        state.add_symptom(Symptom::new("Headache", Severity::MILD));
        let first = achievement(&state, achievement_ids::FIRST_STEPS).clone();
        assert!(first.is_unlocked);
        assert_eq!(first.progress, 1);

        state.add_symptom(Symptom::new("Nausea", Severity::SEVERE));
        assert_eq!(
            achievement(&state, achievement_ids::FIRST_STEPS).unlocked_at,
            first.unlocked_at
        );
    }

    #[test]
    fn tenth_meal_unlocks_nutrition_tracker() {
        let mut state = HealthState::default();
        for i in 0..9 {
            let meal = NutritionEntry::new(format!("meal {i}"), 400.0, MealType::Lunch);
            state.add_nutrition_entry(meal);
        }
        assert!(!achievement(&state, achievement_ids::NUTRITION_TRACKER).is_unlocked);

        state.add_nutrition_entry(NutritionEntry::new("dinner", 600.0, MealType::Dinner));
        assert!(achievement(&state, achievement_ids::NUTRITION_TRACKER).is_unlocked);
    }

    #[test]
    fn update_and_delete_by_id() {
        let mut state = HealthState::default();
        let symptom = Symptom::new("Cough", Severity::MILD);
        let id = symptom.id.clone();
        state.add_symptom(symptom);

        assert!(state.update_symptom(&id, |s| s.tags.push("winter".into())));
        assert_eq!(state.symptoms[0].tags, vec!["winter"]);
        assert!(!state.update_symptom("missing", |s| s.tags.clear()));

        assert!(state.delete_symptom(&id));
        assert!(!state.delete_symptom(&id));
        assert!(state.symptoms.is_empty());

        assert!(state.update_device_connection("2", |d| d.is_connected = true));
        assert!(state.device_connections[1].is_connected);
        assert!(!state.unlock_achievement("nope"));
    }

    #[tokio::test]
    async fn store_persists_mutations() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let health =
            HealthStore::new(SharedState::load(Arc::clone(&store), slot_keys::HEALTH).await);
        health
            .add_medication(Medication::new("Metformin", "500mg", "twice daily", "2024-01-01"))
            .await;
        health.add_symptom(Symptom::new("Fatigue", Severity::MILD)).await;

        let reloaded = HealthStore::new(SharedState::load(store, slot_keys::HEALTH).await);
        let state = reloaded.snapshot().await;
        assert_eq!(state.medications[0].name, "Metformin");
        assert!(achievement(&state, achievement_ids::FIRST_STEPS).is_unlocked);
    }
}
