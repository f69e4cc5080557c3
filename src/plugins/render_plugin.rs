use std::collections::HashMap;
use std::f32::consts::TAU;

use bevy::prelude::*;

use crate::assets_map::AssetsMap;
use crate::config::tuning::Tuning;
use crate::game::{
    components::{ForgeSet, StageAura, SwordPartVisual, SwordVisual},
    parts::registry::PartCatalog,
    session::{ForgeSession, RenderView},
    stats::types::{PartType, Stage},
};

/// Pre-built material handles, one per part model key and per stage.
#[derive(Resource)]
struct SwordMaterials {
    parts: HashMap<String, Handle<ColorMaterial>>,
    stages: Vec<Handle<ColorMaterial>>,
    fallback: Handle<ColorMaterial>,
}

impl SwordMaterials {
    fn from_assets(assets: &AssetsMap, materials: &mut Assets<ColorMaterial>) -> Self {
        Self {
            parts: assets
                .part_colors
                .keys()
                .map(|key| (key.clone(), materials.add(assets.get_color(key))))
                .collect(),
            stages: (Stage::MIN..=Stage::MAX)
                .map(|s| materials.add(assets.stage_color(s)))
                .collect(),
            fallback: materials.add(assets.get_color("")),
        }
    }

    fn part(&self, model_asset: &str) -> Handle<ColorMaterial> {
        self.parts
            .get(model_asset)
            .cloned()
            .unwrap_or_else(|| self.fallback.clone())
    }

    fn stage(&self, stage: u8) -> Handle<ColorMaterial> {
        let idx = (stage.clamp(Stage::MIN, Stage::MAX) - Stage::MIN) as usize;
        self.stages
            .get(idx)
            .cloned()
            .unwrap_or_else(|| self.fallback.clone())
    }
}

/// Placeholder 2D sword renderer. Reads only the session's `RenderView`.
pub struct RenderPlugin;

impl Plugin for RenderPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(AssetsMap::with_defaults());
        app.insert_resource(ClearColor(Color::srgb(0.05, 0.05, 0.08)));
        app.add_systems(Startup, setup_sword_visual);
        app.add_systems(
            Update,
            (update_sword_parts, animate_sword)
                .chain()
                .in_set(ForgeSet::Present)
                .run_if(resource_exists::<ForgeSession>),
        );
    }
}

// ── Startup ─────────────────────────────────────────────────────────

fn setup_sword_visual(
    mut commands: Commands,
    tuning: Res<Tuning>,
    assets: Res<AssetsMap>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<ColorMaterial>>,
) {
    commands.spawn(Camera2d);

    let mats = SwordMaterials::from_assets(&assets, &mut materials);

    // Sword layout in world units, pointing up; scaled by pixels_per_unit.
    let ppu = tuning.pixels_per_unit.max(1.0);
    let blade = meshes.add(Rectangle::new(0.5 * ppu, 6.0 * ppu));
    let guard = meshes.add(Rectangle::new(2.4 * ppu, 0.4 * ppu));
    let handle = meshes.add(Rectangle::new(0.35 * ppu, 1.8 * ppu));
    let gem = meshes.add(Circle::new(0.3 * ppu));
    let aura = meshes.add(Circle::new(4.5 * ppu));

    commands
        .spawn((
            SwordVisual,
            Transform::from_translation(Vec3::new(6.0 * ppu, 0.0, 0.0)),
            Visibility::default(),
        ))
        .with_children(|root| {
            root.spawn((
                StageAura,
                Mesh2d(aura),
                MeshMaterial2d(mats.stage(Stage::MIN)),
                Transform::from_translation(Vec3::new(0.0, 1.0 * ppu, -0.5)),
            ));
            root.spawn((
                SwordPartVisual(PartType::Blade),
                Mesh2d(blade),
                MeshMaterial2d(mats.fallback.clone()),
                Transform::from_translation(Vec3::new(0.0, 3.2 * ppu, 0.0)),
                Visibility::Hidden,
            ));
            root.spawn((
                SwordPartVisual(PartType::Guard),
                Mesh2d(guard),
                MeshMaterial2d(mats.fallback.clone()),
                Transform::from_translation(Vec3::new(0.0, 0.0, 0.1)),
                Visibility::Hidden,
            ));
            root.spawn((
                SwordPartVisual(PartType::Handle),
                Mesh2d(handle),
                MeshMaterial2d(mats.fallback.clone()),
                Transform::from_translation(Vec3::new(0.0, -1.1 * ppu, 0.0)),
                Visibility::Hidden,
            ));
            root.spawn((
                SwordPartVisual(PartType::Gem),
                Mesh2d(gem),
                MeshMaterial2d(mats.fallback.clone()),
                Transform::from_translation(Vec3::new(0.0, 0.0, 0.2)),
                Visibility::Hidden,
            ));
        });

    commands.insert_resource(mats);
}

// ── Presentation ────────────────────────────────────────────────────

/// Show equipped parts with their model colors; tint the aura by stage.
fn update_sword_parts(
    session: Res<ForgeSession>,
    catalog: Res<PartCatalog>,
    mats: Res<SwordMaterials>,
    mut parts_q: Query<
        (&SwordPartVisual, &mut Visibility, &mut MeshMaterial2d<ColorMaterial>),
        Without<StageAura>,
    >,
    mut aura_q: Query<&mut MeshMaterial2d<ColorMaterial>, With<StageAura>>,
) {
    if !session.is_changed() {
        return;
    }
    let view = session.render_view();

    for (visual, mut visibility, mut material) in &mut parts_q {
        let model = view
            .weapon
            .parts
            .get(visual.0)
            .and_then(|id| catalog.get(id))
            .map(|p| p.model_asset.as_str());
        match model {
            Some(key) => {
                *visibility = Visibility::Inherited;
                material.0 = mats.part(key);
            }
            None => *visibility = Visibility::Hidden,
        }
    }
    for mut material in &mut aura_q {
        material.0 = mats.stage(view.display_stage);
    }
}

/// Grow the sword with its stage; pulse and sway while evolving.
fn animate_sword(
    session: Res<ForgeSession>,
    tuning: Res<Tuning>,
    time: Res<Time>,
    mut root_q: Query<&mut Transform, With<SwordVisual>>,
) {
    let RenderView {
        display_stage,
        is_evolving,
        ..
    } = session.render_view();

    let base_scale = 1.0 + 0.12 * (display_stage.saturating_sub(Stage::MIN)) as f32;
    let (pulse, sway) = if is_evolving {
        let phase = time.elapsed_secs() * tuning.evolving_pulse_hz * TAU;
        (1.0 + 0.08 * phase.sin(), 0.06 * (phase * 0.5).sin())
    } else {
        (1.0, 0.0)
    };

    for mut tf in &mut root_q {
        tf.scale = Vec3::splat(base_scale * pulse);
        tf.rotation = Quat::from_rotation_z(sway);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn materials_cover_every_part_key_and_stage() {
        let assets = AssetsMap::with_defaults();
        let mut materials = Assets::<ColorMaterial>::default();
        let mats = SwordMaterials::from_assets(&assets, &mut materials);

        assert_eq!(mats.parts.len(), assets.part_colors.len());
        assert_eq!(mats.stages.len(), Stage::MAX as usize);
        assert_eq!(materials.len(), assets.part_colors.len() + Stage::MAX as usize + 1);

        for key in assets.part_colors.keys() {
            assert_ne!(mats.part(key), mats.fallback);
        }
        assert_eq!(mats.part("no-such-model"), mats.fallback);
        assert_eq!(mats.stage(9), mats.stages[4]);
        assert_eq!(mats.stage(0), mats.stages[0]);
    }
}
