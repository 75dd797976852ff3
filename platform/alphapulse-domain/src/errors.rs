/// Failures surfaced by the environment contract.
///
/// Numeric edge cases (near-zero equity or peak equity) are not errors; the
/// reward modules floor their denominators instead.
#[derive(Debug, Clone, PartialEq)]
pub enum EnvError {
    InvalidAction(i64),
    EpisodeFinished { step_index: usize, length: usize },
    OutOfRange { index: usize, length: usize },
    EmptyDataset,
    InvalidConfig(String),
}

impl std::fmt::Display for EnvError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EnvError::InvalidAction(value) => {
                write!(f, "invalid action {value}: expected one of 0=hold, 1=buy, 2=sell, 3=close_all")
            }
            EnvError::EpisodeFinished { step_index, length } => write!(
                f,
                "episode finished at step {step_index} of {length} bars; call reset() first"
            ),
            EnvError::OutOfRange { index, length } => {
                write!(f, "bar index {index} out of range for dataset of {length} bars")
            }
            EnvError::EmptyDataset => write!(f, "dataset must contain at least one bar"),
            EnvError::InvalidConfig(msg) => write!(f, "invalid config: {msg}"),
        }
    }
}

impl std::error::Error for EnvError {}

impl From<EnvError> for String {
    fn from(err: EnvError) -> Self {
        err.to_string()
    }
}
