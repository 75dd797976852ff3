use crate::value_objects::depth::DepthTick;

/// Primary, ordered, append-only record of collected ticks.
pub trait TickLog {
    fn append(&mut self, tick: &DepthTick) -> Result<(), String>;
}

/// Secondary copy of each tick. Callers treat failures as best-effort.
pub trait TickMirror {
    fn mirror(&self, tick: &DepthTick) -> Result<(), String>;
}
