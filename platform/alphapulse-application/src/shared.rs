use crate::config::{Config, PolicyKind};
use alphapulse_domain::services::engine::execution::ExecutionConfig;
use alphapulse_domain::services::environment::EnvConfig;
use alphapulse_domain::services::policy::{HoldPolicy, Policy, RandomPolicy, ScriptedPolicy};
use alphapulse_domain::services::reward::cost::CostModel;
use alphapulse_domain::services::reward::{RewardConfig, RewardPreset};
use alphapulse_domain::value_objects::action::Action;
use sha2::{Digest, Sha256};

pub fn resolve_execution_config(config: &Config) -> ExecutionConfig {
    let defaults = ExecutionConfig::default();
    let Some(exec) = config.execution.as_ref() else {
        return defaults;
    };
    ExecutionConfig {
        slippage_std_fraction: exec
            .slippage_std_fraction
            .unwrap_or(defaults.slippage_std_fraction),
        fee_rate: exec.fee_rate.unwrap_or(defaults.fee_rate),
        fee_fixed: exec.fee_fixed.unwrap_or(defaults.fee_fixed),
    }
}

pub fn resolve_reward_config(config: &Config) -> Result<RewardConfig, String> {
    let Some(section) = config.reward.as_ref() else {
        return Ok(RewardConfig::default());
    };
    let preset = match section.preset.as_deref() {
        Some(value) => RewardPreset::parse(value)?,
        None => RewardPreset::RiskAdjusted,
    };
    let mut reward = RewardConfig::preset(preset);

    if let Some(value) = section.volatility_coefficient {
        reward.volatility.coefficient = value;
    }
    if let Some(value) = section.volatility_window {
        reward.volatility.window = value;
    }
    if let Some(value) = section.volatility_min_samples {
        reward.volatility.min_samples = value;
    }
    if let Some(value) = section.drawdown_coefficient {
        reward.drawdown.coefficient = value;
    }
    if let Some(rate) = section.cost_rate {
        reward.cost = match reward.cost {
            CostModel::InBalance => {
                return Err(
                    "reward.cost_rate requires preset mark_to_entry or spread_cost".to_string(),
                )
            }
            CostModel::FeeFraction {
                close_slippage_rate,
                ..
            } => CostModel::FeeFraction {
                fee_rate: rate,
                close_slippage_rate,
            },
            CostModel::SpreadFraction { .. } => CostModel::SpreadFraction { spread_rate: rate },
        };
    }
    Ok(reward)
}

/// Environment settings for one run. `seed` overrides `run.seed`.
pub fn resolve_env_config(config: &Config, seed: Option<u64>) -> Result<EnvConfig, String> {
    let env_config = EnvConfig {
        initial_balance: config.run.initial_balance,
        execution: resolve_execution_config(config),
        reward: resolve_reward_config(config)?,
        seed: seed.or(config.run.seed),
        max_episode_steps: config.run.max_episode_steps,
    };
    env_config.validate().map_err(|err| err.to_string())?;
    Ok(env_config)
}

pub fn parse_script(steps: &[String]) -> Result<Vec<Action>, String> {
    steps
        .iter()
        .map(|s| Action::parse(s))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|err| format!("invalid policy.script: {err}"))
}

/// Mixed into `run.seed` when the policy has no seed of its own, so the
/// policy stream and the episode's slippage stream start apart.
const POLICY_SEED_SALT: u64 = 0x9e37_79b9_7f4a_7c15;

/// Seed of the random policy for the `episode`-th rollout.
pub fn policy_seed(config: &Config, episode: u32) -> u64 {
    let base = match config.policy.as_ref().and_then(|p| p.seed) {
        Some(seed) => seed,
        None => config.run.seed.unwrap_or(0) ^ POLICY_SEED_SALT,
    };
    base.wrapping_add(episode as u64)
}

/// Baseline policy for the `episode`-th rollout of a run.
pub fn build_policy(config: &Config, episode: u32) -> Result<Box<dyn Policy>, String> {
    let section = config.policy.clone().unwrap_or_default();
    let policy: Box<dyn Policy> = match section.kind {
        PolicyKind::Hold => Box::new(HoldPolicy),
        PolicyKind::Random => Box::new(RandomPolicy::new(policy_seed(config, episode))),
        PolicyKind::Scripted => {
            let script = section
                .script
                .as_deref()
                .ok_or_else(|| "policy.kind=scripted requires policy.script".to_string())?;
            Box::new(ScriptedPolicy::new(parse_script(script)?))
        }
    };
    Ok(policy)
}

pub fn episode_seed(config: &Config, episode: u32) -> Option<u64> {
    config
        .run
        .seed
        .map(|seed| seed.wrapping_add(episode as u64))
}

pub fn config_sha256(contents: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(contents.as_bytes());
    to_hex(&hasher.finalize()[..])
}

fn to_hex(bytes: &[u8]) -> String {
    const HEX: &[u8; 16] = b"0123456789abcdef";
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        out.push(HEX[(b >> 4) as usize] as char);
        out.push(HEX[(b & 0x0f) as usize] as char);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{
        build_policy, config_sha256, episode_seed, policy_seed, resolve_env_config,
        resolve_reward_config,
    };
    use crate::config::Config;
    use alphapulse_domain::services::reward::cost::CostModel;
    use alphapulse_domain::services::reward::pnl::PnlSource;

    fn config(extra: &str) -> Config {
        let toml_str = format!(
            r#"
[run]
run_id = "t"
symbol = "ETHUSDT"
initial_balance = 1000.0
seed = 7

[data]
ohlcv_csv = "bars.csv"

[output]
out_dir = "runs"
{extra}
"#
        );
        toml::from_str(&toml_str).expect("config should parse")
    }

    #[test]
    fn reward_overrides_apply_on_top_of_preset() {
        let cfg = config(
            r#"
[reward]
preset = "legacy"
volatility_coefficient = 0.25
cost_rate = 0.002
"#,
        );
        let reward = resolve_reward_config(&cfg).unwrap();
        assert_eq!(reward.pnl, PnlSource::MarkToEntry);
        assert_eq!(reward.volatility.coefficient, 0.25);
        assert!(matches!(
            reward.cost,
            CostModel::FeeFraction { fee_rate, .. } if fee_rate == 0.002
        ));
    }

    #[test]
    fn cost_rate_is_rejected_for_in_balance_costs() {
        let cfg = config("[reward]\ncost_rate = 0.1\n");
        assert!(resolve_reward_config(&cfg).is_err());
    }

    #[test]
    fn invalid_window_surfaces_as_config_error() {
        let cfg = config("[reward]\nvolatility_window = 5\nvolatility_min_samples = 5\n");
        let err = resolve_env_config(&cfg, None).unwrap_err();
        assert!(err.contains("invalid config"), "{err}");
    }

    #[test]
    fn scripted_policy_requires_script() {
        let cfg = config("[policy]\nkind = \"scripted\"\n");
        assert!(build_policy(&cfg, 0).is_err());

        let cfg = config("[policy]\nkind = \"scripted\"\nscript = [\"buy\", \"jump\"]\n");
        let err = build_policy(&cfg, 0).err().unwrap_or_default();
        assert!(err.contains("jump"), "{err}");
    }

    #[test]
    fn policy_stream_is_not_seeded_like_slippage() {
        let cfg = config("[policy]\nkind = \"random\"\n");
        for episode in 0..4 {
            assert_eq!(episode_seed(&cfg, episode), Some(7 + episode as u64));
            assert_ne!(Some(policy_seed(&cfg, episode)), episode_seed(&cfg, episode));
        }
        assert_eq!(policy_seed(&cfg, 1), policy_seed(&cfg, 0).wrapping_add(1));

        let cfg = config("[policy]\nkind = \"random\"\nseed = 42\n");
        assert_eq!(policy_seed(&cfg, 2), 44);
    }

    #[test]
    fn config_hash_is_hex_sha256() {
        let hash = config_sha256("abc");
        assert_eq!(
            hash,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
