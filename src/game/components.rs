use bevy::prelude::*;

use super::stats::types::PartType;

// ── Marker components ───────────────────────────────────────────────

/// Root entity of the sword visual; scaled/pulsed as a whole.
#[derive(Component)]
pub struct SwordVisual;

/// One part mesh of the sword visual.
#[derive(Component, Debug, Clone, Copy)]
pub struct SwordPartVisual(pub PartType);

/// Aura ring behind the sword, tinted by stage.
#[derive(Component)]
pub struct StageAura;

// ── System ordering ─────────────────────────────────────────────────

/// Update-schedule ordering: input → session → presentation.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum ForgeSet {
    Input,
    Apply,
    Present,
}
