use std::{path::Path, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{
    cost::MismatchCost,
    error::{Error, Result},
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// Repeated global minimum-cost matching.
    #[default]
    Optimal,
    /// Nearest compatible room, one participant at a time.
    Greedy,
}

/// Accepts the same names as the config file (`optimal`, `greedy`).
impl FromStr for StrategyKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Ok(serde_json::from_value(serde_json::Value::String(s.to_owned()))?)
    }
}

/// Order in which the greedy strategy serves participants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticipantOrder {
    /// Per test type, districts farthest from their nearest compatible room
    /// go first.
    #[default]
    DistrictPriority,
    InputOrder,
}

/// How open rooms become columns of a matching round.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeatColumns {
    /// One column per open room; a room fills up over several rounds.
    PerRoom,
    /// One column per free seat, capped by pending demand for the room's type.
    #[default]
    PerSeat,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AllocationConfig {
    pub strategy: StrategyKind,
    pub mismatch: MismatchCost,
    pub participant_order: ParticipantOrder,
    pub seat_columns: SeatColumns,
    /// Upper bound on matching rounds; defaults to participants + 1.
    pub max_rounds: Option<usize>,
}

impl AllocationConfig {
    pub fn with_strategy(self, strategy: StrategyKind) -> Self {
        Self { strategy, ..self }
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        match self.mismatch {
            MismatchCost::Penalized(p) if !(p.is_finite() && p >= 0.) => {
                Err(Error::InvalidPenalty(p))
            }
            _ => Ok(()),
        }
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }
}
