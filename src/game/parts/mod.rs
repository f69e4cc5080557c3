pub mod registry;

use serde::{Deserialize, Serialize};

use crate::game::stats::types::{PartType, Stage, SwordStats};

/// Stage requirement gating a part in the picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UnlockCondition {
    pub stage: Option<u8>,
}

/// An equippable part definition. Immutable once registered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Part {
    pub id: String,
    pub part_type: PartType,
    pub name: String,
    pub description: String,
    /// Visual key the renderer may use to pick a model variant.
    pub model_asset: String,
    pub stats_effect: SwordStats,
    pub unlock_condition: Option<UnlockCondition>,
}

impl Part {
    /// Whether a sword at `stage` may equip this part.
    pub fn is_unlocked(&self, stage: Stage) -> bool {
        match self.unlock_condition.and_then(|c| c.stage) {
            Some(required) => required <= stage.get(),
            None => true,
        }
    }

    /// Stage required to unlock, if any.
    pub fn required_stage(&self) -> Option<u8> {
        self.unlock_condition.and_then(|c| c.stage)
    }

    /// Detail line for the picker: description, effect and unlock stage.
    pub fn card_text(&self) -> String {
        let mut text = format!("{}: {} ({})", self.name, self.description, self.effect_text());
        if let Some(stage) = self.required_stage() {
            text.push_str(&format!(". Unlocks at stage {stage}"));
        }
        text
    }

    /// Human-readable stat summary, e.g. "ATK +5, MAG +5". Zero fields are skipped.
    pub fn effect_text(&self) -> String {
        let SwordStats {
            attack,
            defense,
            magic,
        } = self.stats_effect;
        let mut parts = Vec::new();
        if attack > 0 {
            parts.push(format!("ATK +{attack}"));
        }
        if defense > 0 {
            parts.push(format!("DEF +{defense}"));
        }
        if magic > 0 {
            parts.push(format!("MAG +{magic}"));
        }
        parts.join(", ")
    }
}

/// Equipped part ids, one optional slot per part type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartSlots {
    pub blade: Option<String>,
    pub guard: Option<String>,
    pub handle: Option<String>,
    pub gem: Option<String>,
}

impl PartSlots {
    pub fn get(&self, slot: PartType) -> Option<&str> {
        match slot {
            PartType::Blade => self.blade.as_deref(),
            PartType::Guard => self.guard.as_deref(),
            PartType::Handle => self.handle.as_deref(),
            PartType::Gem => self.gem.as_deref(),
        }
    }

    /// Put `id` into `slot`, returning the id it replaced.
    pub fn set(&mut self, slot: PartType, id: String) -> Option<String> {
        let cell = match slot {
            PartType::Blade => &mut self.blade,
            PartType::Guard => &mut self.guard,
            PartType::Handle => &mut self.handle,
            PartType::Gem => &mut self.gem,
        };
        cell.replace(id)
    }

    pub fn is_filled(&self, slot: PartType) -> bool {
        self.get(slot).is_some()
    }

    /// First empty slot in recommendation order.
    pub fn first_empty(&self) -> Option<PartType> {
        PartType::ORDER.into_iter().find(|&t| !self.is_filled(t))
    }

    /// Required slots that are still empty.
    pub fn missing_required(&self) -> Vec<PartType> {
        PartType::REQUIRED
            .into_iter()
            .filter(|&t| !self.is_filled(t))
            .collect()
    }

    /// Iterate over (slot, part id) for every filled slot.
    pub fn iter(&self) -> impl Iterator<Item = (PartType, &str)> + '_ {
        PartType::ORDER
            .into_iter()
            .filter_map(move |t| self.get(t).map(|id| (t, id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_empty_follows_slot_order() {
        let mut slots = PartSlots::default();
        assert_eq!(slots.first_empty(), Some(PartType::Blade));
        slots.set(PartType::Guard, "guard-1".into());
        assert_eq!(slots.first_empty(), Some(PartType::Blade));
        slots.set(PartType::Blade, "blade-1".into());
        slots.set(PartType::Handle, "handle-1".into());
        assert_eq!(slots.first_empty(), Some(PartType::Gem));
        slots.set(PartType::Gem, "gem-1".into());
        assert_eq!(slots.first_empty(), None);
    }

    #[test]
    fn set_returns_previous_occupant() {
        let mut slots = PartSlots::default();
        assert_eq!(slots.set(PartType::Blade, "blade-1".into()), None);
        assert_eq!(
            slots.set(PartType::Blade, "blade-2".into()).as_deref(),
            Some("blade-1")
        );
        assert_eq!(slots.get(PartType::Blade), Some("blade-2"));
    }

    #[test]
    fn gem_is_not_required() {
        let mut slots = PartSlots::default();
        slots.set(PartType::Gem, "gem-1".into());
        assert_eq!(
            slots.missing_required(),
            vec![PartType::Blade, PartType::Guard, PartType::Handle]
        );
    }

    #[test]
    fn card_text_shows_description_and_unlock() {
        let part = Part {
            id: "gem-x".into(),
            part_type: PartType::Gem,
            name: "Star Gem".into(),
            description: "Hums with starlight".into(),
            model_asset: "star-gem".into(),
            stats_effect: SwordStats::new(0, 0, 9),
            unlock_condition: Some(UnlockCondition { stage: Some(4) }),
        };
        assert_eq!(
            part.card_text(),
            "Star Gem: Hums with starlight (MAG +9). Unlocks at stage 4"
        );

        let plain = Part {
            unlock_condition: None,
            ..part
        };
        assert_eq!(plain.card_text(), "Star Gem: Hums with starlight (MAG +9)");
    }
}
