use bevy::prelude::*;
use std::collections::HashMap;

use crate::game::stats::types::Stage;

/// Maps part `model_asset` keys and sword stages to placeholder colors.
#[derive(Resource, Default)]
pub struct AssetsMap {
    pub part_colors: HashMap<String, Color>,
    pub stage_colors: Vec<Color>,
}

impl AssetsMap {
    pub fn with_defaults() -> Self {
        let mut map = HashMap::new();
        map.insert("basic-blade".into(), Color::srgb(0.75, 0.75, 0.78));
        map.insert("enhanced-blade".into(), Color::srgb(0.55, 0.70, 0.90));
        map.insert("magic-blade".into(), Color::srgb(0.70, 0.45, 1.0));
        map.insert("basic-guard".into(), Color::srgb(0.60, 0.45, 0.25));
        map.insert("enhanced-guard".into(), Color::srgb(0.85, 0.70, 0.20));
        map.insert("basic-handle".into(), Color::srgb(0.40, 0.25, 0.15));
        map.insert("enhanced-handle".into(), Color::srgb(0.25, 0.20, 0.30));
        map.insert("basic-gem".into(), Color::srgb(0.2, 0.8, 0.6));
        map.insert("magic-gem".into(), Color::srgb(0.9, 0.2, 0.8));

        let stage_colors = vec![
            Color::srgba(0.5, 0.5, 0.5, 0.0),
            Color::srgba(0.3, 0.6, 1.0, 0.25),
            Color::srgba(0.6, 0.3, 1.0, 0.35),
            Color::srgba(1.0, 0.85, 0.2, 0.45),
            Color::srgba(1.0, 0.4, 0.9, 0.55),
        ];

        Self {
            part_colors: map,
            stage_colors,
        }
    }

    pub fn get_color(&self, model_asset: &str) -> Color {
        self.part_colors
            .get(model_asset)
            .copied()
            .unwrap_or(Color::srgb(0.5, 0.5, 0.5))
    }

    pub fn stage_color(&self, stage: u8) -> Color {
        let idx = (stage.clamp(Stage::MIN, Stage::MAX) - Stage::MIN) as usize;
        self.stage_colors
            .get(idx)
            .copied()
            .unwrap_or(Color::srgba(0.5, 0.5, 0.5, 0.0))
    }
}
