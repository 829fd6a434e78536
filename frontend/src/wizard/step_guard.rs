use log::warn;

use crate::config;
use crate::storage::{KeyValueStore, LocalStore};

pub const MIN_STEP: u8 = 1;
pub const MAX_STEP: u8 = 5;

pub fn clamp_step(step: i64) -> u8 {
    step.clamp(MIN_STEP as i64, MAX_STEP as i64) as u8
}

/// Numeric coercion shared by stored values and URL params. Fractions are
/// truncated; blank, unparsable and infinite input all become [`MIN_STEP`].
pub fn coerce_step(raw: &str) -> u8 {
    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => clamp_step(value.trunc() as i64),
        _ => MIN_STEP,
    }
}

/// Tracks how far each analysis has been unlocked. Values live in the
/// store as decimal strings under `<namespace>:<analysis_id>:maxStep`.
pub struct StepGuard<S> {
    store: S,
    namespace: &'static str,
}

impl StepGuard<LocalStore> {
    pub fn browser() -> Self {
        Self::new(LocalStore, config::STORAGE_NAMESPACE)
    }
}

impl<S: KeyValueStore> StepGuard<S> {
    pub fn new(store: S, namespace: &'static str) -> Self {
        Self { store, namespace }
    }

    pub fn storage_key(&self, analysis_id: &str) -> String {
        format!("{}:{}:maxStep", self.namespace, analysis_id)
    }

    /// Missing, empty, non-numeric and negative values all read as
    /// [`MIN_STEP`]. Storage is not repaired on read.
    pub fn max_allowed_step(&self, analysis_id: &str) -> u8 {
        self.store
            .get(&self.storage_key(analysis_id))
            .map(|raw| coerce_step(&raw))
            .unwrap_or(MIN_STEP)
    }

    /// Overwrites the stored value with `step` clamped to the valid range.
    /// Unlike [`unlock_next_step`](Self::unlock_next_step) this may move
    /// progress backwards; it is the reset path.
    pub fn set_max_allowed_step(&self, analysis_id: &str, step: i64) {
        let step = clamp_step(step);
        if let Err(e) = self
            .store
            .set(&self.storage_key(analysis_id), &step.to_string())
        {
            warn!("Failed to persist max step for {}: {}", analysis_id, e);
        }
    }

    /// Unlocks the step after `current_step`. Never lowers stored progress.
    /// Returns the max allowed step after the call.
    pub fn unlock_next_step(&self, analysis_id: &str, current_step: i64) -> u8 {
        let next = clamp_step(current_step.saturating_add(1));
        let current_max = self.max_allowed_step(analysis_id);
        if next > current_max {
            self.set_max_allowed_step(analysis_id, next as i64);
            next
        } else {
            current_max
        }
    }
}
