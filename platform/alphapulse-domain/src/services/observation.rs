use crate::errors::EnvError;
use crate::services::market_data_source::MarketDataFeed;
use crate::value_objects::action::Action;
use crate::value_objects::observation::{Observation, OBSERVATION_LEN};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObservationSpace {
    pub shape: [usize; 1],
    pub low: f64,
    pub high: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionSpace {
    pub n: usize,
}

pub const OBSERVATION_SPACE: ObservationSpace = ObservationSpace {
    shape: [OBSERVATION_LEN],
    low: 0.0,
    high: f64::INFINITY,
};

pub const ACTION_SPACE: ActionSpace = ActionSpace { n: Action::COUNT };

impl ObservationSpace {
    pub fn contains(&self, observation: &Observation) -> bool {
        observation
            .values()
            .iter()
            .all(|v| !v.is_nan() && *v >= self.low && *v <= self.high)
    }
}

impl ActionSpace {
    pub fn contains(&self, action: i64) -> bool {
        action >= 0 && (action as usize) < self.n
    }
}

pub fn build_observation<F: MarketDataFeed + ?Sized>(
    feed: &F,
    index: usize,
) -> Result<Observation, EnvError> {
    feed.bar_at(index).map(Observation::from_bar)
}

#[cfg(test)]
mod tests {
    use super::{build_observation, ACTION_SPACE, OBSERVATION_SPACE};
    use crate::services::market_data_source::VecBarFeed;
    use crate::value_objects::bar::Bar;

    #[test]
    fn observation_projects_ohlcv_in_order() {
        let feed = VecBarFeed::new(vec![Bar {
            index: 0,
            timestamp: 1,
            open: 1.0,
            high: 4.0,
            low: 0.5,
            close: 2.0,
            volume: 10.0,
        }])
        .unwrap();
        let obs = build_observation(&feed, 0).unwrap();
        assert_eq!(obs.values(), &[1.0, 4.0, 0.5, 2.0, 10.0]);
        assert!(OBSERVATION_SPACE.contains(&obs));
        assert!(build_observation(&feed, 1).is_err());
    }

    #[test]
    fn action_space_has_four_discrete_values() {
        assert_eq!(ACTION_SPACE.n, 4);
        assert!(ACTION_SPACE.contains(3));
        assert!(!ACTION_SPACE.contains(4));
        assert!(!ACTION_SPACE.contains(-1));
    }
}
