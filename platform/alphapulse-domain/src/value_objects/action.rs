use crate::errors::EnvError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Hold,
    Buy,
    Sell,
    CloseAll,
}

impl Action {
    pub const COUNT: usize = 4;
    pub const ALL: [Action; Action::COUNT] =
        [Action::Hold, Action::Buy, Action::Sell, Action::CloseAll];

    pub fn from_index(value: i64) -> Result<Self, EnvError> {
        match value {
            0 => Ok(Action::Hold),
            1 => Ok(Action::Buy),
            2 => Ok(Action::Sell),
            3 => Ok(Action::CloseAll),
            other => Err(EnvError::InvalidAction(other)),
        }
    }

    pub fn index(self) -> i64 {
        match self {
            Action::Hold => 0,
            Action::Buy => 1,
            Action::Sell => 2,
            Action::CloseAll => 3,
        }
    }

    pub fn parse(value: &str) -> Result<Self, String> {
        match value.trim().to_lowercase().as_str() {
            "hold" | "0" => Ok(Action::Hold),
            "buy" | "1" => Ok(Action::Buy),
            "sell" | "2" => Ok(Action::Sell),
            "close_all" | "closeall" | "close" | "3" => Ok(Action::CloseAll),
            _ => Err(format!("unsupported action: {value}")),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Action::Hold => "hold",
            Action::Buy => "buy",
            Action::Sell => "sell",
            Action::CloseAll => "close_all",
        }
    }

    pub fn is_hold(self) -> bool {
        matches!(self, Action::Hold)
    }
}

impl TryFrom<i64> for Action {
    type Error = EnvError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Action::from_index(value)
    }
}
