use crate::entities::episode_state::EpisodeState;
use crate::errors::EnvError;
use crate::services::engine::execution::ExecutionConfig;
use crate::services::engine::executor::StepExecutor;
use crate::services::market_data_source::{MarketDataFeed, VecBarFeed};
use crate::services::observation::{
    build_observation, ActionSpace, ObservationSpace, ACTION_SPACE, OBSERVATION_SPACE,
};
use crate::services::reward::{RewardBreakdown, RewardConfig, RewardFunction, RewardInput};
use crate::value_objects::action::Action;
use crate::value_objects::observation::Observation;
use serde::Serialize;
use std::collections::BTreeMap;

pub type Info = BTreeMap<String, f64>;

/// Capability contract for any simulation driven by reset/step.
pub trait Environment {
    type Action: TryFrom<i64, Error = EnvError>;

    fn observation_space(&self) -> ObservationSpace;
    fn action_space(&self) -> ActionSpace;
    fn reset(&mut self, seed: Option<u64>) -> Result<(Observation, Info), EnvError>;
    fn step(&mut self, action: Self::Action) -> Result<StepResult, EnvError>;

    /// Step with a raw discrete action. Values outside the action space fail
    /// with `InvalidAction` before the episode is touched.
    fn step_discrete(&mut self, action: i64) -> Result<StepResult, EnvError> {
        let action = Self::Action::try_from(action)?;
        self.step(action)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EpisodeStatus {
    Active,
    Terminated,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnvConfig {
    pub initial_balance: f64,
    pub execution: ExecutionConfig,
    pub reward: RewardConfig,
    /// Seed for the slippage stream at construction; `None` draws from entropy.
    pub seed: Option<u64>,
    /// Optional time limit; when reached `truncated` is reported. The core
    /// state machine is unaffected.
    pub max_episode_steps: Option<usize>,
}

impl EnvConfig {
    pub fn new(initial_balance: f64) -> Self {
        Self {
            initial_balance,
            execution: ExecutionConfig::default(),
            reward: RewardConfig::default(),
            seed: None,
            max_episode_steps: None,
        }
    }

    pub fn validate(&self) -> Result<(), EnvError> {
        if !self.initial_balance.is_finite() || self.initial_balance <= 0.0 {
            return Err(EnvError::InvalidConfig(format!(
                "initial_balance must be finite and > 0 (got {})",
                self.initial_balance
            )));
        }
        if self.max_episode_steps == Some(0) {
            return Err(EnvError::InvalidConfig(
                "max_episode_steps must be > 0 when set".to_string(),
            ));
        }
        self.execution.validate()?;
        self.reward.validate()
    }
}

/// Per-step diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StepInfo {
    pub step_index: usize,
    pub action: Action,
    pub balance: f64,
    pub position: i64,
    pub entry_price: f64,
    pub equity: f64,
    pub peak_equity: f64,
    pub drawdown: f64,
    pub reference_price: f64,
    pub execution_price: f64,
    pub quantity: i64,
    pub fee: f64,
    pub slippage_cost: f64,
    pub step_return: f64,
    pub reward: RewardBreakdown,
}

impl StepInfo {
    pub fn to_map(&self) -> Info {
        let mut map = Info::new();
        map.insert("step_index".to_string(), self.step_index as f64);
        map.insert("action".to_string(), self.action.index() as f64);
        map.insert("balance".to_string(), self.balance);
        map.insert("position".to_string(), self.position as f64);
        map.insert("entry_price".to_string(), self.entry_price);
        map.insert("equity".to_string(), self.equity);
        map.insert("peak_equity".to_string(), self.peak_equity);
        map.insert("drawdown".to_string(), self.drawdown);
        map.insert("reference_price".to_string(), self.reference_price);
        map.insert("execution_price".to_string(), self.execution_price);
        map.insert("quantity".to_string(), self.quantity as f64);
        map.insert("fee".to_string(), self.fee);
        map.insert("slippage_cost".to_string(), self.slippage_cost);
        map.insert("step_return".to_string(), self.step_return);
        map.insert("pnl".to_string(), self.reward.pnl);
        map.insert("cost".to_string(), self.reward.cost);
        map.insert("volatility_penalty".to_string(), self.reward.volatility_penalty);
        map.insert("drawdown_penalty".to_string(), self.reward.drawdown_penalty);
        map
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StepResult {
    pub observation: Observation,
    pub reward: f64,
    pub terminated: bool,
    pub truncated: bool,
    pub info: StepInfo,
}

/// Single-asset trading environment over a finite bar feed.
///
/// Owns its episode state and its slippage stream; nothing is shared between
/// instances, so independent environments can run on separate threads.
#[derive(Debug, Clone)]
pub struct TradingEnv<F = VecBarFeed, R = RewardConfig> {
    feed: F,
    config: EnvConfig,
    reward: R,
    executor: StepExecutor,
    state: EpisodeState,
}

impl<F: MarketDataFeed> TradingEnv<F, RewardConfig> {
    pub fn new(feed: F, config: EnvConfig) -> Result<Self, EnvError> {
        let reward = config.reward;
        Self::with_reward(feed, config, reward)
    }
}

impl<F: MarketDataFeed, R: RewardFunction> TradingEnv<F, R> {
    /// Uses `reward` in place of the configured modules. The returns window
    /// capacity still comes from `config.reward.volatility.window`.
    pub fn with_reward(feed: F, config: EnvConfig, reward: R) -> Result<Self, EnvError> {
        if feed.is_empty() {
            return Err(EnvError::EmptyDataset);
        }
        config.validate()?;

        let executor = StepExecutor::new(config.execution, config.seed);
        let state = EpisodeState::new(config.initial_balance, config.reward.volatility.window);
        Ok(Self {
            feed,
            config,
            reward,
            executor,
            state,
        })
    }

    pub fn state(&self) -> &EpisodeState {
        &self.state
    }

    pub fn config(&self) -> &EnvConfig {
        &self.config
    }

    pub fn feed(&self) -> &F {
        &self.feed
    }

    pub fn len(&self) -> usize {
        self.feed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.feed.is_empty()
    }

    pub fn status(&self) -> EpisodeStatus {
        if self.state.step_index + 1 >= self.feed.len() {
            EpisodeStatus::Terminated
        } else {
            EpisodeStatus::Active
        }
    }

    /// Observation for the bar the next decision is made on.
    pub fn observation(&self) -> Result<Observation, EnvError> {
        build_observation(&self.feed, self.state.step_index)
    }

    pub fn reset(&mut self, seed: Option<u64>) -> Result<(Observation, Info), EnvError> {
        if let Some(seed) = seed {
            self.executor.reseed(seed);
        }
        self.state.reset(self.config.initial_balance);
        Ok((self.observation()?, Info::new()))
    }

    pub fn step(&mut self, action: Action) -> Result<StepResult, EnvError> {
        if self.status() == EpisodeStatus::Terminated {
            return Err(EnvError::EpisodeFinished {
                step_index: self.state.step_index,
                length: self.feed.len(),
            });
        }

        let reference_price = self.feed.bar_at(self.state.step_index)?.close;
        let before = self.state.snapshot();
        let report = self
            .executor
            .execute(&mut self.state, action, reference_price);
        let breakdown = self.reward.evaluate(&RewardInput {
            before: &before,
            after: &self.state,
            report: &report,
        });

        let terminated = self.status() == EpisodeStatus::Terminated;
        let truncated = !terminated
            && self
                .config
                .max_episode_steps
                .is_some_and(|limit| self.state.step_index >= limit);
        let observation = self.observation()?;

        Ok(StepResult {
            observation,
            reward: breakdown.reward,
            terminated,
            truncated,
            info: StepInfo {
                step_index: self.state.step_index,
                action,
                balance: self.state.balance,
                position: self.state.position,
                entry_price: self.state.entry_price,
                equity: self.state.equity,
                peak_equity: self.state.peak_equity,
                drawdown: self.state.drawdown(),
                reference_price,
                execution_price: report.execution_price,
                quantity: report.quantity,
                fee: report.fee,
                slippage_cost: report.slippage_cost,
                step_return: report.step_return,
                reward: breakdown,
            },
        })
    }
}

impl<F: MarketDataFeed, R: RewardFunction> Environment for TradingEnv<F, R> {
    type Action = Action;

    fn observation_space(&self) -> ObservationSpace {
        OBSERVATION_SPACE
    }

    fn action_space(&self) -> ActionSpace {
        ACTION_SPACE
    }

    fn reset(&mut self, seed: Option<u64>) -> Result<(Observation, Info), EnvError> {
        TradingEnv::reset(self, seed)
    }

    fn step(&mut self, action: Action) -> Result<StepResult, EnvError> {
        TradingEnv::step(self, action)
    }
}
