use bevy::ecs::hierarchy::ChildSpawnerCommands;
use bevy::prelude::*;

use crate::config::tuning::Tuning;
use crate::game::{
    components::ForgeSet,
    events::{ForgeEvent, ForgeIntent},
    evolution::sequence::EvolutionPhase,
    parts::registry::PartCatalog,
    session::ForgeSession,
    stats::types::PartType,
};

// ── Marker components ────────────────────────────────────────────────

#[derive(Component)]
struct NameText;

#[derive(Component)]
struct StatsText;

#[derive(Component)]
struct GuideText;

#[derive(Component)]
struct StatusText;

#[derive(Component)]
struct PartInfoText;

#[derive(Component)]
struct HistoryBar;

#[derive(Component)]
struct EvolutionOverlay;

#[derive(Component)]
struct PhaseText;

#[derive(Component)]
struct ProgressFill;

#[derive(Component)]
struct CloseLabel;

#[derive(Component, Debug, Clone, PartialEq)]
enum ForgeButton {
    SlotTab(Option<PartType>),
    Part { slot: PartType, id: String },
    Evolve,
    Step(usize),
    Close,
}

// ── Colors ───────────────────────────────────────────────────────────

const COLOR_PANEL: Color = Color::srgba(0.08, 0.08, 0.12, 0.92);
const COLOR_BTN: Color = Color::srgba(0.18, 0.20, 0.28, 1.0);
const COLOR_BTN_HOVER: Color = Color::srgba(0.28, 0.32, 0.42, 1.0);
const COLOR_BTN_PRESS: Color = Color::srgba(0.12, 0.14, 0.20, 1.0);
const COLOR_BTN_DISABLED: Color = Color::srgba(0.14, 0.14, 0.18, 1.0);
const COLOR_SELECTED: Color = Color::srgba(0.15, 0.45, 0.75, 1.0);
const COLOR_SELECTED_HOVER: Color = Color::srgba(0.20, 0.55, 0.85, 1.0);
const COLOR_TEXT: Color = Color::WHITE;
const COLOR_TEXT_DIM: Color = Color::srgba(0.5, 0.5, 0.5, 1.0);
const COLOR_ACCENT: Color = Color::srgba(0.2, 0.7, 1.0, 1.0);
const COLOR_WARN: Color = Color::srgba(1.0, 0.75, 0.3, 1.0);
const COLOR_EVOLVE: Color = Color::srgba(0.45, 0.20, 0.70, 1.0);
const COLOR_OVERLAY: Color = Color::srgba(0.0, 0.0, 0.0, 0.25);

// ── Plugin ───────────────────────────────────────────────────────────

pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, setup_ui);
        app.add_systems(Update, button_intents.in_set(ForgeSet::Input));
        app.add_systems(
            Update,
            (
                update_sword_text,
                update_status_text,
                update_button_colors,
                update_part_list,
                update_part_info,
                rebuild_history_bar,
                update_overlay,
            )
                .chain()
                .in_set(ForgeSet::Present)
                .run_if(resource_exists::<ForgeSession>),
        );
    }
}

// ── Startup ──────────────────────────────────────────────────────────

fn setup_ui(mut commands: Commands, catalog: Res<PartCatalog>) {
    commands
        .spawn((
            Node {
                position_type: PositionType::Absolute,
                left: Val::Px(10.0),
                top: Val::Px(10.0),
                width: Val::Px(440.0),
                flex_direction: FlexDirection::Column,
                row_gap: Val::Px(8.0),
                padding: UiRect::all(Val::Px(12.0)),
                border_radius: BorderRadius::all(Val::Px(10.0)),
                ..default()
            },
            BackgroundColor(COLOR_PANEL),
        ))
        .with_children(|panel| {
            panel.spawn((
                NameText,
                Text::new("---"),
                TextFont { font_size: 28.0, ..default() },
                TextColor(COLOR_ACCENT),
            ));
            panel.spawn((
                StatsText,
                Text::new(""),
                TextFont { font_size: 18.0, ..default() },
                TextColor(COLOR_TEXT),
            ));
            panel.spawn((
                GuideText,
                Text::new(""),
                TextFont { font_size: 16.0, ..default() },
                TextColor(COLOR_ACCENT),
            ));

            // Slot tabs
            panel
                .spawn(Node {
                    flex_direction: FlexDirection::Row,
                    column_gap: Val::Px(6.0),
                    ..default()
                })
                .with_children(|row| {
                    spawn_btn(row, "All", ForgeButton::SlotTab(None), 70.0, 32.0, 16.0);
                    for slot in PartType::ORDER {
                        spawn_btn(
                            row,
                            slot.display_name(),
                            ForgeButton::SlotTab(Some(slot)),
                            80.0,
                            32.0,
                            16.0,
                        );
                    }
                });

            // Part picker
            panel
                .spawn(Node {
                    flex_direction: FlexDirection::Column,
                    row_gap: Val::Px(4.0),
                    ..default()
                })
                .with_children(|list| {
                    for part in catalog.all() {
                        let mut label = format!("{}  ({})", part.name, part.effect_text());
                        if let Some(stage) = part.required_stage() {
                            label.push_str(&format!("  [stage {stage}+]"));
                        }
                        spawn_btn(
                            list,
                            &label,
                            ForgeButton::Part {
                                slot: part.part_type,
                                id: part.id.clone(),
                            },
                            416.0,
                            30.0,
                            15.0,
                        );
                    }
                });

            panel.spawn((
                PartInfoText,
                Text::new("Hover a part to see its details"),
                TextFont { font_size: 14.0, ..default() },
                TextColor(COLOR_TEXT_DIM),
            ));

            spawn_btn(panel, "Evolve (E)", ForgeButton::Evolve, 416.0, 44.0, 22.0);

            panel.spawn((
                StatusText,
                Text::new("Forge your sword and evolve it!"),
                TextFont { font_size: 15.0, ..default() },
                TextColor(COLOR_WARN),
            ));

            panel.spawn((
                Text::new("Evolution steps"),
                TextFont { font_size: 14.0, ..default() },
                TextColor(COLOR_TEXT_DIM),
            ));
            panel.spawn((
                HistoryBar,
                Node {
                    flex_direction: FlexDirection::Row,
                    flex_wrap: FlexWrap::Wrap,
                    column_gap: Val::Px(6.0),
                    row_gap: Val::Px(6.0),
                    ..default()
                },
            ));
        });

    spawn_overlay(&mut commands);
}

fn spawn_overlay(commands: &mut Commands) {
    commands
        .spawn((
            EvolutionOverlay,
            Node {
                position_type: PositionType::Absolute,
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                flex_direction: FlexDirection::Column,
                justify_content: JustifyContent::FlexEnd,
                align_items: AlignItems::Center,
                row_gap: Val::Px(14.0),
                padding: UiRect::bottom(Val::Px(60.0)),
                display: Display::None,
                ..default()
            },
            BackgroundColor(COLOR_OVERLAY),
            GlobalZIndex(10),
        ))
        .with_children(|overlay| {
            overlay.spawn((
                PhaseText,
                Text::new(""),
                TextFont { font_size: 32.0, ..default() },
                TextColor(Color::srgb(0.8, 0.6, 1.0)),
            ));
            overlay
                .spawn((
                    Node {
                        width: Val::Px(420.0),
                        height: Val::Px(10.0),
                        border_radius: BorderRadius::all(Val::Px(5.0)),
                        ..default()
                    },
                    BackgroundColor(Color::srgba(0.3, 0.3, 0.35, 1.0)),
                ))
                .with_children(|track| {
                    track.spawn((
                        ProgressFill,
                        Node {
                            width: Val::Percent(0.0),
                            height: Val::Percent(100.0),
                            border_radius: BorderRadius::all(Val::Px(5.0)),
                            ..default()
                        },
                        BackgroundColor(COLOR_EVOLVE),
                    ));
                });
            overlay
                .spawn((
                    ForgeButton::Close,
                    Button,
                    Node {
                        width: Val::Px(220.0),
                        height: Val::Px(44.0),
                        justify_content: JustifyContent::Center,
                        align_items: AlignItems::Center,
                        border_radius: BorderRadius::all(Val::Px(8.0)),
                        ..default()
                    },
                    BackgroundColor(COLOR_BTN),
                ))
                .with_children(|btn| {
                    btn.spawn((
                        CloseLabel,
                        Text::new("Cancel"),
                        TextFont { font_size: 20.0, ..default() },
                        TextColor(COLOR_TEXT),
                    ));
                });
        });
}

fn spawn_btn(
    parent: &mut ChildSpawnerCommands,
    label: &str,
    marker: ForgeButton,
    width: f32,
    height: f32,
    font_size: f32,
) {
    parent
        .spawn((
            marker,
            Button,
            Node {
                width: Val::Px(width),
                height: Val::Px(height),
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                border_radius: BorderRadius::all(Val::Px(6.0)),
                ..default()
            },
            BackgroundColor(COLOR_BTN),
        ))
        .with_children(|btn| {
            btn.spawn((
                Text::new(label),
                TextFont { font_size, ..default() },
                TextColor(COLOR_TEXT),
            ));
        });
}

// ── Input ────────────────────────────────────────────────────────────

fn button_intents(
    q: Query<(&Interaction, &ForgeButton), Changed<Interaction>>,
    mut intents: MessageWriter<ForgeIntent>,
) {
    for (interaction, button) in &q {
        if *interaction != Interaction::Pressed {
            continue;
        }
        let intent = match button {
            ForgeButton::SlotTab(slot) => ForgeIntent::SelectSlot(*slot),
            ForgeButton::Part { slot, id } => ForgeIntent::Equip {
                slot: *slot,
                part_id: id.clone(),
            },
            ForgeButton::Evolve => ForgeIntent::RequestEvolution,
            ForgeButton::Step(index) => ForgeIntent::SelectStep(*index),
            ForgeButton::Close => ForgeIntent::CloseEvolution,
        };
        intents.write(intent);
    }
}

// ── Presentation ─────────────────────────────────────────────────────

fn update_sword_text(
    session: Res<ForgeSession>,
    mut name_q: Query<&mut Text, (With<NameText>, Without<StatsText>, Without<GuideText>)>,
    mut stats_q: Query<&mut Text, (With<StatsText>, Without<NameText>, Without<GuideText>)>,
    mut guide_q: Query<&mut Text, (With<GuideText>, Without<NameText>, Without<StatsText>)>,
) {
    if !session.is_changed() {
        return;
    }
    let shown = session.displayed();
    let history = session.history();

    for mut text in &mut name_q {
        **text = format!("{}  (stage {})", shown.name, shown.stage);
    }
    for mut text in &mut stats_q {
        let equipped: Vec<String> = shown
            .parts
            .iter()
            .map(|(slot, id)| format!("{slot}: {id}"))
            .collect();
        let viewing = if history.is_viewing_latest() {
            String::new()
        } else {
            format!(
                "\nViewing step {}/{}",
                history.selected_index() + 1,
                history.len()
            )
        };
        **text = format!(
            "{}  (total {}/{})\n{}{}",
            shown.stats,
            shown.stats.total(),
            shown.required_stat_total(),
            if equipped.is_empty() {
                "Nothing equipped".to_string()
            } else {
                equipped.join("  ")
            },
            viewing
        );
    }
    for mut text in &mut guide_q {
        **text = match session.next_slot() {
            Some(slot) => format!("Next: equip a {slot} ({})", slot.effect_hint()),
            None => "All slots filled".to_string(),
        };
    }
}

fn update_status_text(
    mut events: MessageReader<ForgeEvent>,
    mut q: Query<&mut Text, With<StatusText>>,
) {
    let Some(line) = events.read().filter_map(status_line).last() else {
        return;
    };
    for mut text in &mut q {
        **text = line.clone();
    }
}

fn status_line(event: &ForgeEvent) -> Option<String> {
    Some(match event {
        ForgeEvent::PartEquipped { slot, part_id } => format!("Equipped {part_id} as {slot}"),
        ForgeEvent::EquipRejected(e) => format!("Cannot equip: {e}"),
        ForgeEvent::EvolutionDenied(unmet) => {
            let lines: Vec<String> = unmet.iter().map(|c| format!("- {c}")).collect();
            format!("Evolution conditions not met:\n{}", lines.join("\n"))
        }
        ForgeEvent::EvolutionRejected(e) => e.to_string(),
        ForgeEvent::Evolved { stage, name } => {
            format!("Congratulations! Your sword evolved to stage {stage}: {name}")
        }
        ForgeEvent::EvolutionCancelled => "Evolution cancelled".to_string(),
        ForgeEvent::StepSelected { index, stage } => {
            format!("Viewing step {} (stage {stage})", index + 1)
        }
        ForgeEvent::StepRejected(e) => e.to_string(),
        ForgeEvent::SessionRestarted => "A new sword has been forged".to_string(),
        ForgeEvent::PhaseEntered(_) => return None,
    })
}

/// Highlight the selected tab and equipped parts; dim locked parts.
fn update_button_colors(
    session: Res<ForgeSession>,
    catalog: Res<PartCatalog>,
    mut q: Query<(&Interaction, &ForgeButton, &mut BackgroundColor)>,
) {
    let sword = session.sword();
    for (interaction, button, mut bg) in &mut q {
        let (selected, disabled) = match button {
            ForgeButton::SlotTab(slot) => (session.selected_slot() == *slot, false),
            ForgeButton::Part { slot, id } => {
                let equipped = sword.parts.get(*slot) == Some(id.as_str());
                let locked = catalog
                    .get(id)
                    .is_some_and(|p| !p.is_unlocked(sword.stage));
                (equipped, session.is_evolving() || (locked && !equipped))
            }
            ForgeButton::Evolve => (
                false,
                session.phase() != EvolutionPhase::Idle || !session.gate().is_allowed(),
            ),
            ForgeButton::Step(index) => (session.history().selected_index() == *index, false),
            ForgeButton::Close => (false, false),
        };
        let color = match (disabled, selected, interaction) {
            (true, _, _) => COLOR_BTN_DISABLED,
            (false, true, Interaction::Hovered) => COLOR_SELECTED_HOVER,
            (false, true, _) => COLOR_SELECTED,
            (false, false, Interaction::Pressed) => COLOR_BTN_PRESS,
            (false, false, Interaction::Hovered) => COLOR_BTN_HOVER,
            (false, false, Interaction::None) => match button {
                ForgeButton::Evolve => COLOR_EVOLVE,
                _ => COLOR_BTN,
            },
        };
        if bg.0 != color {
            *bg = BackgroundColor(color);
        }
    }
}

/// Show only the parts of the selected slot tab (all parts when none is selected).
fn update_part_list(session: Res<ForgeSession>, mut q: Query<(&ForgeButton, &mut Node)>) {
    if !session.is_changed() {
        return;
    }
    let filter = session.selected_slot();
    for (button, mut node) in &mut q {
        let ForgeButton::Part { slot, .. } = button else {
            continue;
        };
        let display = if filter.is_none_or(|f| f == *slot) {
            Display::Flex
        } else {
            Display::None
        };
        if node.display != display {
            node.display = display;
        }
    }
}

/// Describe the part under the cursor.
fn update_part_info(
    catalog: Res<PartCatalog>,
    buttons_q: Query<(&Interaction, &ForgeButton), Changed<Interaction>>,
    mut info_q: Query<&mut Text, With<PartInfoText>>,
) {
    let hovered = buttons_q.iter().find_map(|(interaction, button)| match button {
        ForgeButton::Part { id, .. } if *interaction != Interaction::None => catalog.get(id),
        _ => None,
    });
    let Some(part) = hovered else {
        return;
    };
    let line = part.card_text();
    for mut text in &mut info_q {
        if text.as_str() != line {
            **text = line.clone();
        }
    }
}

/// Rebuild the step buttons whenever the history length changes.
fn rebuild_history_bar(
    mut commands: Commands,
    session: Res<ForgeSession>,
    bar_q: Query<Entity, With<HistoryBar>>,
    mut shown: Local<Option<usize>>,
) {
    let history = session.history();
    if *shown == Some(history.len()) {
        return;
    }
    let Ok(bar) = bar_q.single() else {
        return;
    };

    commands.entity(bar).despawn_related::<Children>();
    commands.entity(bar).with_children(|row| {
        for (index, step) in history.steps().iter().enumerate() {
            spawn_btn(
                row,
                &format!("Stage {}\n{}", step.stage.get(), step.name),
                ForgeButton::Step(index),
                132.0,
                52.0,
                13.0,
            );
        }
    });
    *shown = Some(history.len());
}

fn update_overlay(
    session: Res<ForgeSession>,
    tuning: Res<Tuning>,
    mut overlay_q: Query<&mut Node, (With<EvolutionOverlay>, Without<ProgressFill>)>,
    mut fill_q: Query<&mut Node, (With<ProgressFill>, Without<EvolutionOverlay>)>,
    mut phase_q: Query<&mut Text, (With<PhaseText>, Without<CloseLabel>)>,
    mut label_q: Query<&mut Text, (With<CloseLabel>, Without<PhaseText>)>,
) {
    let phase = session.phase();
    let visible = phase != EvolutionPhase::Idle;

    for mut node in &mut overlay_q {
        let display = if visible { Display::Flex } else { Display::None };
        if node.display != display {
            node.display = display;
        }
    }
    if !visible {
        return;
    }

    for mut node in &mut fill_q {
        node.width = Val::Percent(session.progress() * 100.0);
    }
    for mut text in &mut phase_q {
        if text.as_str() != phase.message() {
            **text = phase.message().to_string();
        }
    }
    let label = match phase {
        EvolutionPhase::Complete => "Continue",
        _ if tuning.allow_cancel_evolution => "Cancel (Esc)",
        _ => "Evolving...",
    };
    for mut text in &mut label_q {
        if text.as_str() != label {
            **text = label.to_string();
        }
    }
}
