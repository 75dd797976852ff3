use crate::errors::EnvError;
use crate::services::environment::{EpisodeStatus, StepInfo, TradingEnv};
use crate::services::market_data_source::MarketDataFeed;
use crate::services::policy::Policy;
use crate::services::reward::RewardFunction;
use crate::value_objects::observation::Observation;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transition {
    pub timestamp: i64,
    pub observation: Observation,
    pub reward: f64,
    pub terminated: bool,
    pub truncated: bool,
    pub info: StepInfo,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EpisodeSummary {
    pub policy: String,
    pub steps: usize,
    pub trades: usize,
    pub total_reward: f64,
    pub initial_equity: f64,
    pub final_equity: f64,
    pub net_profit: f64,
    pub sharpe: f64,
    pub max_drawdown: f64,
    pub total_fees: f64,
    pub truncated: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EpisodeTrace {
    pub transitions: Vec<Transition>,
    pub summary: EpisodeSummary,
}

/// Resets `env` with `seed`, then steps `policy` until the episode terminates
/// or is truncated.
pub fn run_episode<F, R, P>(
    env: &mut TradingEnv<F, R>,
    policy: &mut P,
    seed: Option<u64>,
) -> Result<EpisodeTrace, EnvError>
where
    F: MarketDataFeed,
    R: RewardFunction,
    P: Policy + ?Sized,
{
    let (mut observation, _info) = env.reset(seed)?;
    policy.reset();

    let initial_equity = env.state().equity;
    let mut transitions = Vec::with_capacity(env.len().saturating_sub(1));
    let mut truncated = false;

    while env.status() == EpisodeStatus::Active {
        let snapshot = env.state().snapshot();
        let action = policy.act(&observation, &snapshot);
        let timestamp = env.feed().bar_at(snapshot.step_index)?.timestamp;
        let result = env.step(action)?;
        observation = result.observation;
        transitions.push(Transition {
            timestamp,
            observation: result.observation,
            reward: result.reward,
            terminated: result.terminated,
            truncated: result.truncated,
            info: result.info,
        });
        if result.truncated {
            truncated = true;
            break;
        }
    }

    let summary = summarize(policy.name(), initial_equity, &transitions, truncated);
    Ok(EpisodeTrace {
        transitions,
        summary,
    })
}

pub fn summarize(
    policy: &str,
    initial_equity: f64,
    transitions: &[Transition],
    truncated: bool,
) -> EpisodeSummary {
    let final_equity = transitions
        .last()
        .map(|t| t.info.equity)
        .unwrap_or(initial_equity);
    let returns: Vec<f64> = transitions.iter().map(|t| t.info.step_return).collect();

    let mut peak = initial_equity;
    let mut max_drawdown = 0.0f64;
    for t in transitions {
        peak = peak.max(t.info.equity);
        if peak > 0.0 {
            max_drawdown = max_drawdown.max((peak - t.info.equity) / peak);
        }
    }

    EpisodeSummary {
        policy: policy.to_string(),
        steps: transitions.len(),
        trades: transitions.iter().filter(|t| t.info.quantity != 0).count(),
        total_reward: transitions.iter().map(|t| t.reward).sum(),
        initial_equity,
        final_equity,
        net_profit: final_equity - initial_equity,
        sharpe: sharpe_ratio(&returns),
        max_drawdown,
        total_fees: transitions.iter().map(|t| t.info.fee).sum(),
        truncated,
    }
}

/// Mean over sample standard deviation of per-step returns, scaled by
/// `sqrt(n)`. Zero with fewer than two returns or no dispersion.
pub fn sharpe_ratio(returns: &[f64]) -> f64 {
    if returns.len() < 2 {
        return 0.0;
    }
    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let var = returns
        .iter()
        .map(|r| {
            let diff = r - mean;
            diff * diff
        })
        .sum::<f64>()
        / (n - 1.0);
    let std = var.sqrt();
    if std == 0.0 || !std.is_finite() {
        0.0
    } else {
        mean / std * n.sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::{run_episode, sharpe_ratio};
    use crate::services::engine::execution::ExecutionConfig;
    use crate::services::environment::{EnvConfig, TradingEnv};
    use crate::services::market_data_source::VecBarFeed;
    use crate::services::policy::{HoldPolicy, ScriptedPolicy};
    use crate::value_objects::action::Action;
    use crate::value_objects::bar::Bar;

    fn feed(closes: &[f64]) -> VecBarFeed {
        VecBarFeed::new(
            closes
                .iter()
                .enumerate()
                .map(|(i, c)| Bar::flat(i, 60 * i as i64, *c, 1.0))
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn hold_episode_has_no_trades_or_drawdown() {
        let mut env = TradingEnv::new(feed(&[10.0, 11.0, 9.0, 12.0]), EnvConfig::new(100.0)).unwrap();
        let trace = run_episode(&mut env, &mut HoldPolicy, Some(1)).unwrap();
        assert_eq!(trace.transitions.len(), 3);
        assert_eq!(trace.summary.trades, 0);
        assert_eq!(trace.summary.net_profit, 0.0);
        assert_eq!(trace.summary.max_drawdown, 0.0);
        assert_eq!(trace.transitions[1].timestamp, 60);
    }

    #[test]
    fn scripted_episode_tracks_drawdown() {
        let mut config = EnvConfig::new(100.0);
        config.execution = ExecutionConfig::frictionless();
        let mut env = TradingEnv::new(feed(&[10.0, 10.0, 5.0, 5.0]), config).unwrap();
        let mut policy = ScriptedPolicy::new(vec![Action::Buy]);
        let trace = run_episode(&mut env, &mut policy, Some(1)).unwrap();
        assert_eq!(trace.summary.trades, 1);
        assert!((trace.summary.net_profit + 5.0).abs() < 1e-9);
        assert!((trace.summary.max_drawdown - 0.05).abs() < 1e-9);
    }

    #[test]
    fn sharpe_is_zero_without_dispersion() {
        assert_eq!(sharpe_ratio(&[0.01, 0.01, 0.01]), 0.0);
        assert_eq!(sharpe_ratio(&[0.01]), 0.0);
        assert!(sharpe_ratio(&[0.02, 0.01, 0.03]) > 0.0);
    }
}
