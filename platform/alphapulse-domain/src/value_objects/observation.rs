use crate::value_objects::bar::Bar;
use serde::Serialize;

pub const OBSERVATION_LEN: usize = 5;

/// `[open, high, low, close, volume]` of a single bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Observation(pub [f64; OBSERVATION_LEN]);

impl Observation {
    pub fn from_bar(bar: &Bar) -> Self {
        Self([bar.open, bar.high, bar.low, bar.close, bar.volume])
    }

    pub fn values(&self) -> &[f64] {
        &self.0
    }

    pub fn close(&self) -> f64 {
        self.0[3]
    }

    pub fn to_vec(&self) -> Vec<f64> {
        self.0.to_vec()
    }
}
