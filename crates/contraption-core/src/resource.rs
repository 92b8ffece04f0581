//! Bounded continuous resource store.

use serde::{Deserialize, Serialize};

/// A named continuous quantity clamped to `[min, max]`. Every mutation path
/// clamps before committing, so no caller observes an out-of-range value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    name: String,
    value: f64,
    min: f64,
    max: f64,
}

impl Resource {
    /// Create a resource; the initial value is clamped into `[min, max]`.
    pub fn new(name: &str, value: f64, min: f64, max: f64) -> Self {
        let mut resource = Self {
            name: name.to_string(),
            value: 0.0,
            min,
            max,
        };
        resource.set(value);
        resource
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get(&self) -> f64 {
        self.value
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn set(&mut self, value: f64) {
        self.value = value.min(self.max).max(self.min);
    }

    /// Apply a delta, clamped to the bounds. Returns the delta actually
    /// applied, which is smaller in magnitude than requested when a bound
    /// was hit; callers use this to detect saturation.
    pub fn change(&mut self, delta: f64) -> f64 {
        let before = self.value;
        self.set(before + delta);
        self.value - before
    }

    /// Replace the bounds and re-clamp the current value.
    pub fn set_bounds(&mut self, min: f64, max: f64) {
        self.min = min;
        self.max = max;
        self.set(self.value);
    }
}
