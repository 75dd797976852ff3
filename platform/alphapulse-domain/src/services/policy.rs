use crate::entities::episode_state::EpisodeSnapshot;
use crate::value_objects::action::Action;
use crate::value_objects::observation::Observation;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Decision rule used to drive an environment outside of training.
pub trait Policy {
    fn name(&self) -> &str;
    fn reset(&mut self) {}
    fn act(&mut self, observation: &Observation, state: &EpisodeSnapshot) -> Action;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct HoldPolicy;

impl Policy for HoldPolicy {
    fn name(&self) -> &str {
        "hold"
    }

    fn act(&mut self, _observation: &Observation, _state: &EpisodeSnapshot) -> Action {
        Action::Hold
    }
}

/// Uniform over the four actions, from its own seeded stream.
#[derive(Debug, Clone)]
pub struct RandomPolicy {
    seed: u64,
    rng: ChaCha8Rng,
}

impl RandomPolicy {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl Policy for RandomPolicy {
    fn name(&self) -> &str {
        "random"
    }

    fn reset(&mut self) {
        self.rng = ChaCha8Rng::seed_from_u64(self.seed);
    }

    fn act(&mut self, _observation: &Observation, _state: &EpisodeSnapshot) -> Action {
        Action::ALL[self.rng.gen_range(0..Action::COUNT)]
    }
}

/// Replays a fixed action list, then holds.
#[derive(Debug, Clone)]
pub struct ScriptedPolicy {
    script: Vec<Action>,
    cursor: usize,
}

impl ScriptedPolicy {
    pub fn new(script: Vec<Action>) -> Self {
        Self { script, cursor: 0 }
    }
}

impl Policy for ScriptedPolicy {
    fn name(&self) -> &str {
        "scripted"
    }

    fn reset(&mut self) {
        self.cursor = 0;
    }

    fn act(&mut self, _observation: &Observation, _state: &EpisodeSnapshot) -> Action {
        let action = self.script.get(self.cursor).copied().unwrap_or(Action::Hold);
        self.cursor += 1;
        action
    }
}
