use crate::game::error::UnmetCondition;
use crate::game::sword::Sword;

/// Outcome of checking whether a sword may start evolving.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateVerdict {
    Allow,
    Deny(Vec<UnmetCondition>),
}

impl GateVerdict {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }

    pub fn unmet(&self) -> &[UnmetCondition] {
        match self {
            Self::Allow => &[],
            Self::Deny(conds) => conds,
        }
    }
}

/// Evaluate the evolution gate. Every unmet condition is reported, not just the first.
///
/// Conditions: blade, guard and handle equipped (gem optional); stat total at
/// least `15 × stage`; stage below the cap.
pub fn check(sword: &Sword) -> GateVerdict {
    let mut unmet = Vec::new();

    if sword.stage.is_max() {
        unmet.push(UnmetCondition::MaxStageReached);
    }

    let missing = sword.parts.missing_required();
    if !missing.is_empty() {
        unmet.push(UnmetCondition::MissingParts(missing));
    }

    let total = sword.stats.total();
    let required = sword.required_stat_total();
    if total < required {
        unmet.push(UnmetCondition::InsufficientStats { total, required });
    }

    if unmet.is_empty() {
        GateVerdict::Allow
    } else {
        GateVerdict::Deny(unmet)
    }
}
