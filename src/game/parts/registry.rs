use std::collections::HashMap;

use bevy::prelude::*;

use super::{Part, UnlockCondition};
use crate::game::stats::types::{PartType, Stage, SwordStats};

/// Catalog of every equippable part, indexed by ID.
/// Read-only after startup; populated with hardcoded presets.
#[derive(Resource, Debug, Default, Clone)]
pub struct PartCatalog {
    parts: Vec<Part>,
    index: HashMap<String, usize>,
}

impl PartCatalog {
    /// Populate with the stock parts.
    pub fn with_defaults() -> Self {
        let mut cat = Self::default();

        // ── Blades ───────────────────────────────────────────────
        cat.insert(preset(
            "blade-1",
            PartType::Blade,
            "Basic Blade",
            "A plain, serviceable blade.",
            "basic-blade",
            SwordStats::new(5, 0, 0),
            None,
        ));
        cat.insert(preset(
            "blade-2",
            PartType::Blade,
            "Tempered Blade",
            "A blade hardened by repeated tempering.",
            "enhanced-blade",
            SwordStats::new(10, 0, 0),
            Some(2),
        ));
        cat.insert(preset(
            "blade-3",
            PartType::Blade,
            "Arcane Blade",
            "A blade humming with bound magic.",
            "magic-blade",
            SwordStats::new(15, 0, 5),
            Some(3),
        ));

        // ── Guards ───────────────────────────────────────────────
        cat.insert(preset(
            "guard-1",
            PartType::Guard,
            "Basic Guard",
            "A plain crossguard.",
            "basic-guard",
            SwordStats::new(0, 5, 0),
            None,
        ));
        cat.insert(preset(
            "guard-2",
            PartType::Guard,
            "Tempered Guard",
            "A reinforced crossguard.",
            "enhanced-guard",
            SwordStats::new(0, 10, 0),
            Some(2),
        ));

        // ── Handles ──────────────────────────────────────────────
        cat.insert(preset(
            "handle-1",
            PartType::Handle,
            "Basic Handle",
            "A leather-wrapped grip.",
            "basic-handle",
            SwordStats::new(2, 2, 0),
            None,
        ));
        cat.insert(preset(
            "handle-2",
            PartType::Handle,
            "Tempered Handle",
            "A balanced grip with a weighted pommel.",
            "enhanced-handle",
            SwordStats::new(3, 5, 0),
            Some(2),
        ));

        // ── Gems ─────────────────────────────────────────────────
        cat.insert(preset(
            "gem-1",
            PartType::Gem,
            "Basic Gem",
            "A faintly glowing stone.",
            "basic-gem",
            SwordStats::new(0, 0, 5),
            None,
        ));
        cat.insert(preset(
            "gem-2",
            PartType::Gem,
            "Arcane Gem",
            "A gem brimming with magic.",
            "magic-gem",
            SwordStats::new(0, 0, 15),
            Some(3),
        ));

        cat
    }

    /// Register a part. A part with the same ID replaces the earlier one.
    pub fn insert(&mut self, part: Part) {
        if let Some(&idx) = self.index.get(&part.id) {
            self.parts[idx] = part;
        } else {
            self.index.insert(part.id.clone(), self.parts.len());
            self.parts.push(part);
        }
    }

    pub fn get(&self, id: &str) -> Option<&Part> {
        self.index.get(id).map(|&idx| &self.parts[idx])
    }

    /// All parts in registration order.
    pub fn all(&self) -> &[Part] {
        &self.parts
    }

    pub fn by_type(&self, part_type: PartType) -> impl Iterator<Item = &Part> + '_ {
        self.parts.iter().filter(move |p| p.part_type == part_type)
    }

    /// Parts of `part_type` a sword at `stage` may equip.
    pub fn unlocked(&self, part_type: PartType, stage: Stage) -> impl Iterator<Item = &Part> + '_ {
        self.by_type(part_type).filter(move |p| p.is_unlocked(stage))
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}

fn preset(
    id: &str,
    part_type: PartType,
    name: &str,
    description: &str,
    model_asset: &str,
    stats_effect: SwordStats,
    unlock_stage: Option<u8>,
) -> Part {
    Part {
        id: id.into(),
        part_type,
        name: name.into(),
        description: description.into(),
        model_asset: model_asset.into(),
        stats_effect,
        unlock_condition: unlock_stage.map(|stage| UnlockCondition { stage: Some(stage) }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_every_slot() {
        let cat = PartCatalog::with_defaults();
        assert_eq!(cat.len(), 9);
        for t in PartType::ORDER {
            assert!(cat.by_type(t).count() >= 2, "{t} has too few parts");
        }
    }

    #[test]
    fn unlocked_filters_by_stage() {
        let cat = PartCatalog::with_defaults();
        let ids = |stage: u8| -> Vec<String> {
            cat.unlocked(PartType::Blade, Stage::new(stage))
                .map(|p| p.id.clone())
                .collect()
        };
        assert_eq!(ids(1), vec!["blade-1"]);
        assert_eq!(ids(2), vec!["blade-1", "blade-2"]);
        assert_eq!(ids(3), vec!["blade-1", "blade-2", "blade-3"]);
    }

    #[test]
    fn insert_replaces_same_id() {
        let mut cat = PartCatalog::with_defaults();
        let mut gem = cat.get("gem-1").cloned().unwrap();
        gem.stats_effect = SwordStats::new(0, 0, 7);
        cat.insert(gem);
        assert_eq!(cat.len(), 9);
        assert_eq!(cat.get("gem-1").unwrap().stats_effect.magic, 7);
        assert!(cat.get("gem-9").is_none());
    }

    #[test]
    fn effect_text_skips_zero_fields() {
        let cat = PartCatalog::with_defaults();
        assert_eq!(cat.get("blade-3").unwrap().effect_text(), "ATK +15, MAG +5");
        assert_eq!(cat.get("handle-1").unwrap().effect_text(), "ATK +2, DEF +2");
    }
}
