use alphapulse_domain::errors::EnvError;
use alphapulse_domain::services::engine::execution::ExecutionConfig;
use alphapulse_domain::services::environment::{EnvConfig, Environment, StepResult, TradingEnv};
use alphapulse_domain::services::market_data_source::VecBarFeed;
use alphapulse_domain::services::observation::{ACTION_SPACE, OBSERVATION_SPACE};
use alphapulse_domain::services::policy::RandomPolicy;
use alphapulse_domain::services::reward::{RewardConfig, RewardPreset};
use alphapulse_domain::services::rollout::run_episode;
use alphapulse_domain::value_objects::action::Action;
use alphapulse_domain::value_objects::bar::Bar;

const INITIAL_BALANCE: f64 = 100_000.0;
const FEE_RATE: f64 = 0.0001;

fn bars(closes: &[f64]) -> Vec<Bar> {
    closes
        .iter()
        .enumerate()
        .map(|(idx, close)| Bar {
            index: idx,
            timestamp: 1_700_000_000 + 60 * idx as i64,
            open: close - 0.5,
            high: close + 1.0,
            low: close - 1.0,
            close: *close,
            volume: 1_000.0 + idx as f64,
        })
        .collect()
}

fn zero_slippage_env(closes: &[f64]) -> TradingEnv {
    let mut config = EnvConfig::new(INITIAL_BALANCE);
    config.execution = ExecutionConfig {
        slippage_std_fraction: 0.0,
        fee_rate: FEE_RATE,
        fee_fixed: 0.0,
    };
    config.seed = Some(42);
    TradingEnv::new(VecBarFeed::new(bars(closes)).unwrap(), config).unwrap()
}

fn seeded_env(closes: &[f64], seed: u64) -> TradingEnv {
    let mut config = EnvConfig::new(INITIAL_BALANCE);
    config.seed = Some(seed);
    TradingEnv::new(VecBarFeed::new(bars(closes)).unwrap(), config).unwrap()
}

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-6,
        "expected {expected}, got {actual}"
    );
}

#[test]
fn three_bar_buy_hold_marks_on_the_acting_bar() {
    let mut env = zero_slippage_env(&[100.0, 101.0, 99.0]);
    let (obs, info) = env.reset(Some(42)).unwrap();
    assert_eq!(obs.close(), 100.0);
    assert!(info.is_empty());

    let fee = FEE_RATE * 100.0;
    let first = env.step(Action::Buy).unwrap();
    assert_eq!(env.state().position, 1);
    assert_close(env.state().balance, INITIAL_BALANCE - 100.0 - fee);
    assert_close(env.state().equity, INITIAL_BALANCE - fee);
    assert_close(first.info.entry_price, 100.0);
    assert_close(first.reward, -fee - 2.0 * fee / INITIAL_BALANCE);
    assert_eq!(first.observation.close(), 101.0);
    assert!(!first.terminated);

    let second = env.step(Action::Hold).unwrap();
    assert_close(env.state().equity, INITIAL_BALANCE - fee + 1.0);
    assert_close(second.reward, 1.0);
    assert!(second.terminated);
    assert!(!second.truncated);

    assert!(matches!(
        env.step(Action::CloseAll),
        Err(EnvError::EpisodeFinished { .. })
    ));
}

#[test]
fn close_all_realizes_pnl_net_of_fees() {
    let mut env = zero_slippage_env(&[100.0, 101.0, 99.0, 99.0]);
    env.reset(Some(42)).unwrap();

    let buy_fee = FEE_RATE * 100.0;
    let close_fee = FEE_RATE * 99.0;
    env.step(Action::Buy).unwrap();
    env.step(Action::Hold).unwrap();
    let peak = INITIAL_BALANCE - buy_fee + 1.0;
    assert_close(env.state().peak_equity, peak);

    let last = env.step(Action::CloseAll).unwrap();
    let final_balance = INITIAL_BALANCE - 100.0 - buy_fee + 99.0 - close_fee;
    assert_eq!(env.state().position, 0);
    assert_eq!(env.state().entry_price, 0.0);
    assert_close(env.state().balance, final_balance);
    assert_close(env.state().equity, final_balance);

    let pnl = final_balance - peak;
    let drawdown = (peak - final_balance) / peak;
    assert_close(last.info.reward.pnl, pnl);
    assert_eq!(last.info.reward.volatility_penalty, 0.0);
    assert_close(last.info.reward.drawdown_penalty, 2.0 * drawdown);
    assert_close(last.reward, pnl - 2.0 * drawdown);
    assert!(last.terminated);
}

#[test]
fn consecutive_resets_reproduce_initial_observation() {
    let mut env = seeded_env(&[10.0, 11.0, 12.0], 1);
    let (first, _) = env.reset(None).unwrap();
    let (second, _) = env.reset(None).unwrap();
    assert_eq!(first, second);

    env.step(Action::Buy).unwrap();
    let (third, _) = env.reset(Some(9)).unwrap();
    assert_eq!(first, third);
    assert_eq!(env.state().step_index, 0);
    assert_eq!(env.state().equity, INITIAL_BALANCE);
}

fn trajectory(env: &mut TradingEnv, seed: u64, actions: &[Action]) -> Vec<StepResult> {
    env.reset(Some(seed)).unwrap();
    actions.iter().map(|a| env.step(*a).unwrap()).collect()
}

#[test]
fn seeded_runs_are_bit_identical() {
    let closes: Vec<f64> = (0..40).map(|i| 100.0 + (i as f64 * 0.7).sin() * 5.0).collect();
    let actions: Vec<Action> = (0..39).map(|i| Action::ALL[(i * 7 + 3) % 4]).collect();

    let mut a = seeded_env(&closes, 1);
    let mut b = seeded_env(&closes, 2);
    let run_a = trajectory(&mut a, 77, &actions);
    let run_b = trajectory(&mut b, 77, &actions);
    for (x, y) in run_a.iter().zip(run_b.iter()) {
        assert_eq!(x.reward.to_bits(), y.reward.to_bits());
        assert_eq!(x.observation, y.observation);
        assert_eq!(x.info.execution_price.to_bits(), y.info.execution_price.to_bits());
    }

    let rerun = trajectory(&mut a, 77, &actions);
    assert_eq!(run_a, rerun);
}

#[test]
fn environments_do_not_share_slippage_streams() {
    let closes: Vec<f64> = (0..20).map(|i| 50.0 + i as f64).collect();
    let actions = vec![Action::Buy; 19];

    let mut solo = seeded_env(&closes, 5);
    let expected = trajectory(&mut solo, 5, &actions);

    let mut left = seeded_env(&closes, 5);
    let mut right = seeded_env(&closes, 5);
    left.reset(Some(5)).unwrap();
    right.reset(Some(5)).unwrap();
    for (idx, action) in actions.iter().enumerate() {
        let l = left.step(*action).unwrap();
        let r = right.step(*action).unwrap();
        assert_eq!(l, expected[idx]);
        assert_eq!(r, expected[idx]);
    }
}

#[test]
fn environments_run_on_separate_threads() {
    fn assert_send<T: Send>() {}
    assert_send::<TradingEnv>();

    let closes: Vec<f64> = (0..30).map(|i| 20.0 + (i % 5) as f64).collect();
    let handles: Vec<_> = (0..4u64)
        .map(|worker| {
            let closes = closes.clone();
            std::thread::spawn(move || {
                let mut env = seeded_env(&closes, worker);
                let mut policy = RandomPolicy::new(worker);
                run_episode(&mut env, &mut policy, Some(worker)).map(|trace| trace.summary)
            })
        })
        .collect();
    for handle in handles {
        let summary = handle.join().unwrap().unwrap();
        assert_eq!(summary.steps, 29);
    }
}

#[test]
fn reward_preset_is_selectable() {
    let mut config = EnvConfig::new(INITIAL_BALANCE);
    config.execution = ExecutionConfig::frictionless();
    config.reward = RewardConfig::preset(RewardPreset::MarkToEntry);
    let mut env = TradingEnv::new(VecBarFeed::new(bars(&[100.0, 102.0, 104.0])).unwrap(), config).unwrap();
    env.step(Action::Buy).unwrap();
    let hold = env.step(Action::Hold).unwrap();
    assert_close(hold.info.reward.pnl, 2.0);
}

#[test]
fn exposes_space_descriptors_through_the_contract() {
    let env = seeded_env(&[1.0, 2.0], 0);
    let contract: &dyn Environment<Action = Action> = &env;
    assert_eq!(contract.action_space(), ACTION_SPACE);
    assert_eq!(contract.observation_space().shape, [5]);
    assert_eq!(OBSERVATION_SPACE.high, f64::INFINITY);
}

#[test]
fn raw_actions_step_through_the_contract() {
    let mut env = seeded_env(&[100.0, 101.0, 102.0], 0);
    let contract: &mut dyn Environment<Action = Action> = &mut env;
    contract.reset(Some(4)).unwrap();

    let result = contract.step_discrete(1).unwrap();
    assert_eq!(result.info.action, Action::Buy);
    assert_eq!(result.info.position, 1);

    assert_eq!(
        contract.step_discrete(4).unwrap_err(),
        EnvError::InvalidAction(4)
    );
    assert_eq!(env.state().position, 1);
    assert_eq!(env.state().step_index, 1);
}
