use std::fmt;

use thiserror::Error;

use super::stats::types::PartType;

/// Rejected part-equip request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EquipError {
    #[error("unknown part `{0}`")]
    UnknownPart(String),
    #[error("part `{part}` is a {actual}, not a {expected}")]
    SlotMismatch {
        part: String,
        expected: PartType,
        actual: PartType,
    },
    #[error("part `{part}` unlocks at stage {required}, sword is stage {current}")]
    Locked {
        part: String,
        required: u8,
        current: u8,
    },
    #[error("cannot swap parts while an evolution is in progress")]
    EvolutionInProgress,
}

/// A single gate condition the sword does not meet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnmetCondition {
    MissingParts(Vec<PartType>),
    InsufficientStats { total: i32, required: i32 },
    MaxStageReached,
}

impl fmt::Display for UnmetCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingParts(missing) => {
                let names: Vec<&str> = missing.iter().map(|t| t.display_name()).collect();
                write!(f, "missing parts: {}", names.join(", "))
            }
            Self::InsufficientStats { total, required } => {
                write!(f, "insufficient stats: {total}/{required}")
            }
            Self::MaxStageReached => f.write_str("already at the final stage"),
        }
    }
}

/// Rejected evolution request or sequence control.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvolutionError {
    #[error("evolution denied: {}", join_conditions(.0))]
    Denied(Vec<UnmetCondition>),
    #[error("an evolution is already in progress")]
    AlreadyRunning,
    #[error("no evolution is in progress")]
    NotRunning,
    #[error("the evolution cannot be cancelled once started")]
    CancelBlocked,
    #[error("the evolution has already completed")]
    AlreadyComplete,
}

fn join_conditions(conds: &[UnmetCondition]) -> String {
    conds
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HistoryError {
    #[error("step {index} out of range (history has {len} steps)")]
    OutOfRange { index: usize, len: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn denied_lists_every_condition() {
        let err = EvolutionError::Denied(vec![
            UnmetCondition::MissingParts(vec![PartType::Guard, PartType::Handle]),
            UnmetCondition::InsufficientStats {
                total: 10,
                required: 15,
            },
        ]);
        assert_eq!(
            err.to_string(),
            "evolution denied: missing parts: Guard, Handle; insufficient stats: 10/15"
        );
    }
}
