use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::EquipError;
use super::parts::registry::PartCatalog;
use super::parts::PartSlots;
use super::stats::types::{PartType, Stage, SwordStats};

/// Flat stat bonus applied by each completed evolution.
pub const EVOLUTION_BONUS: SwordStats = SwordStats::new(10, 5, 3);

/// Stat total required per stage before an evolution is allowed.
pub const STAT_THRESHOLD_PER_STAGE: i32 = 15;

/// Narrative bookkeeping carried alongside the sword. Not interpreted by the forge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryProgress {
    pub chapter: u32,
    pub choices: BTreeMap<String, String>,
}

impl Default for StoryProgress {
    fn default() -> Self {
        Self {
            chapter: 1,
            choices: BTreeMap::new(),
        }
    }
}

/// The player's weapon. Mutated in place by equips and evolutions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sword {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub stage: Stage,
    pub parts: PartSlots,
    pub stats: SwordStats,
    pub story_progress: StoryProgress,
}

/// Result of a successful equip call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EquipOutcome {
    /// The part was already in its slot; nothing changed.
    Unchanged,
    Equipped {
        slot: PartType,
        replaced: Option<String>,
    },
}

impl Sword {
    /// A fresh stage-1 sword with nothing equipped.
    pub fn new(owner_id: impl Into<String>, base: SwordStats) -> Self {
        let stage = Stage::first();
        Self {
            id: Uuid::new_v4().to_string(),
            owner_id: owner_id.into(),
            name: name_for_stage(stage),
            stage,
            parts: PartSlots::default(),
            stats: base,
            story_progress: StoryProgress::default(),
        }
    }

    /// Swap `part_id` into `slot`, moving the aggregate stats by the delta.
    ///
    /// Validation happens before any field is touched, so a rejected call
    /// leaves the sword as it was.
    pub fn equip(
        &mut self,
        slot: PartType,
        part_id: &str,
        catalog: &PartCatalog,
    ) -> Result<EquipOutcome, EquipError> {
        let part = catalog
            .get(part_id)
            .ok_or_else(|| EquipError::UnknownPart(part_id.to_string()))?;
        if part.part_type != slot {
            return Err(EquipError::SlotMismatch {
                part: part.id.clone(),
                expected: slot,
                actual: part.part_type,
            });
        }
        if self.parts.get(slot) == Some(part_id) {
            return Ok(EquipOutcome::Unchanged);
        }
        if !part.is_unlocked(self.stage) {
            return Err(EquipError::Locked {
                part: part.id.clone(),
                required: part.required_stage().unwrap_or(Stage::MIN),
                current: self.stage.get(),
            });
        }
        let old_effect = match self.parts.get(slot) {
            Some(old_id) => {
                catalog
                    .get(old_id)
                    .ok_or_else(|| EquipError::UnknownPart(old_id.to_string()))?
                    .stats_effect
            }
            None => SwordStats::ZERO,
        };

        self.stats -= old_effect;
        let replaced = self.parts.set(slot, part.id.clone());
        self.stats += part.stats_effect;
        self.name = name_for_stage(self.stage);

        Ok(EquipOutcome::Equipped { slot, replaced })
    }

    /// Apply one completed evolution: next stage, new name, flat bonus.
    /// Returns `false` (and changes nothing) when already at the final stage.
    pub fn apply_evolution(&mut self) -> bool {
        let Some(next) = self.stage.next() else {
            return false;
        };
        self.stage = next;
        self.name = name_for_stage(next);
        self.stats += EVOLUTION_BONUS;
        true
    }

    /// First unfilled slot in `blade → guard → handle → gem`, or `None`.
    pub fn next_recommended_slot(&self) -> Option<PartType> {
        self.parts.first_empty()
    }

    /// Stat total the gate requires at the current stage.
    pub fn required_stat_total(&self) -> i32 {
        STAT_THRESHOLD_PER_STAGE * self.stage.get() as i32
    }

    /// Recompute stats from scratch: base + equipped parts + evolution bonuses.
    /// Parts missing from the catalog contribute nothing.
    pub fn derived_stats(&self, base: SwordStats, catalog: &PartCatalog) -> SwordStats {
        let parts = self
            .parts
            .iter()
            .filter_map(|(_, id)| catalog.get(id))
            .fold(SwordStats::ZERO, |acc, p| acc + p.stats_effect);
        base + parts + EVOLUTION_BONUS.times(self.stage.evolutions())
    }
}

/// Display name for a sword at `stage`. Depends on the stage only, never on parts.
pub fn name_for_stage(stage: Stage) -> String {
    let (prefix, base) = match stage.get() {
        1 => ("Apprentice's ", "Sword"),
        2 => ("Seasoned ", "Longsword"),
        3 => ("Enchanted ", "Runeblade"),
        4 => ("Legendary ", "Holy Sword"),
        _ => ("Mythic ", "Godblade"),
    };
    format!("{prefix}{base}")
}
