//! Phase - Reference object exposed to JavaScript hosts
//!
//! A small stateful accumulator whose methods cover every coercible
//! parameter kind. Hosts construct it through `Bridge<Phase>`.
//!
//! ## Features
//!
//! - `wasm` - Export `initBridge` to JavaScript via wasm-bindgen

use std::collections::BTreeMap;
use std::time::Duration;

use bridge_runtime::{Exposed, MethodInfo, exposed};

#[cfg(feature = "wasm")]
mod wasm;

/// Errors reported through the result list
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PhaseError {
    #[error("no weights given")]
    NoWeights,

    #[error("sample index {0} out of range")]
    IndexOutOfRange(i64),

    #[error("weights sum to zero")]
    ZeroWeight,
}

/// Recorded samples plus a little descriptive state
#[derive(Debug, Clone)]
pub struct Phase {
    samples: Vec<i64>,
    label: String,
    enabled: bool,
    elapsed: Duration,
}

impl Phase {
    pub fn new() -> Self {
        Self {
            samples: Vec::new(),
            label: "phase".to_string(),
            enabled: true,
            elapsed: Duration::ZERO,
        }
    }
}

impl Default for Phase {
    fn default() -> Self {
        Self::new()
    }
}

#[exposed(name = "Phase", constructor = "new")]
impl Phase {
    /// Add two integers.
    #[expose(name = "Add")]
    pub fn add(&self, a: i64, b: i64) -> i64 {
        a.saturating_add(b)
    }

    /// Append samples and return how many are recorded.
    #[expose(name = "Record")]
    pub fn record(&mut self, values: Vec<i64>) -> usize {
        self.samples.extend(values);
        self.samples.len()
    }

    #[expose(name = "Samples")]
    pub fn samples(&self) -> Vec<i64> {
        self.samples.clone()
    }

    /// Weighted mean of the samples selected by index.
    #[expose(name = "Weighted")]
    pub fn weighted(&self, weights: BTreeMap<i64, f64>) -> Result<f64, PhaseError> {
        if weights.is_empty() {
            return Err(PhaseError::NoWeights);
        }

        let mut sum = 0.0;
        let mut total = 0.0;
        for (&index, &weight) in &weights {
            let sample = usize::try_from(index)
                .ok()
                .and_then(|i| self.samples.get(i))
                .ok_or(PhaseError::IndexOutOfRange(index))?;
            sum += *sample as f64 * weight;
            total += weight;
        }

        if total == 0.0 {
            return Err(PhaseError::ZeroWeight);
        }
        Ok(sum / total)
    }

    #[expose(name = "SetLabel")]
    pub fn set_label(&mut self, label: String) {
        self.label = label;
    }

    #[expose(name = "Label")]
    pub fn label(&self) -> String {
        self.label.clone()
    }

    #[expose(name = "SetEnabled")]
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    #[expose(name = "Enabled")]
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Advance the phase clock; returns the total elapsed time.
    #[expose(name = "Advance")]
    pub fn advance(&mut self, step: Duration) -> Duration {
        self.elapsed = self.elapsed.saturating_add(step);
        self.elapsed
    }

    /// Sample count and label.
    #[expose(name = "Status")]
    pub fn status(&self) -> (usize, String) {
        (self.samples.len(), self.label.clone())
    }

    #[expose(name = "Reset")]
    pub fn reset(&mut self) {
        tracing::debug!(label = %self.label, "resetting {} samples", self.samples.len());
        *self = Self::new();
    }

    /// Describe every exposed method.
    #[expose(name = "GetphaseMethods", enumerate)]
    pub fn methods(&self) -> Vec<MethodInfo> {
        <Self as Exposed>::method_table().describe()
    }
}
