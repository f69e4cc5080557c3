use bevy::prelude::*;

use super::error::{EquipError, EvolutionError, HistoryError, UnmetCondition};
use super::evolution::sequence::EvolutionPhase;
use super::stats::types::PartType;

/// Player intent: written by UI/input systems in `ForgeSet::Input`, applied
/// to the session in `ForgeSet::Apply`.
#[derive(Message, Debug, Clone, PartialEq)]
pub enum ForgeIntent {
    SelectSlot(Option<PartType>),
    Equip { slot: PartType, part_id: String },
    RequestEvolution,
    /// Close the evolution view (dismiss when complete, cancel otherwise).
    CloseEvolution,
    SelectStep(usize),
    Restart,
}

/// Everything the session reports back after applying intents or ticking.
#[derive(Message, Debug, Clone)]
pub enum ForgeEvent {
    PartEquipped { slot: PartType, part_id: String },
    EquipRejected(EquipError),
    EvolutionDenied(Vec<UnmetCondition>),
    EvolutionRejected(EvolutionError),
    PhaseEntered(EvolutionPhase),
    Evolved { stage: u8, name: String },
    EvolutionCancelled,
    StepSelected { index: usize, stage: u8 },
    StepRejected(HistoryError),
    SessionRestarted,
}
