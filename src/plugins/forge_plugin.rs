use bevy::prelude::*;

use crate::config::tuning::Tuning;
use crate::game::{
    components::ForgeSet,
    error::EvolutionError,
    events::{ForgeEvent, ForgeIntent},
    evolution::sequence::EvolutionPhase,
    parts::registry::PartCatalog,
    session::ForgeSession,
    sword::EquipOutcome,
};

pub struct ForgePlugin;

impl Plugin for ForgePlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<ForgeIntent>();
        app.add_message::<ForgeEvent>();

        app.configure_sets(
            Update,
            (ForgeSet::Input, ForgeSet::Apply, ForgeSet::Present).chain(),
        );

        // Part catalog is static data; available before Startup runs.
        app.insert_resource(PartCatalog::with_defaults());

        // ── Startup ─────────────────────────────────────────────────────
        app.add_systems(Startup, init_session);

        // ── Keyboard shortcuts ──────────────────────────────────────────
        app.add_systems(
            Update,
            (keyboard_intents, tuning_reload_input).in_set(ForgeSet::Input),
        );

        // ── Session: intents first, then timers ─────────────────────────
        app.add_systems(
            Update,
            (apply_intents, tick_evolution)
                .chain()
                .in_set(ForgeSet::Apply)
                .run_if(resource_exists::<ForgeSession>),
        );
    }
}

// ── Startup ─────────────────────────────────────────────────────────

fn init_session(mut commands: Commands, tuning: Res<Tuning>, catalog: Res<PartCatalog>) {
    let session = ForgeSession::new(&tuning);
    info!(
        "Forge ready: {} ({} parts in catalog), stats {}",
        session.sword().name,
        catalog.len(),
        session.sword().stats
    );
    commands.insert_resource(session);
}

// ── Input ───────────────────────────────────────────────────────────

/// E to evolve, Esc to close the evolution view, R to start over.
fn keyboard_intents(keyboard: Res<ButtonInput<KeyCode>>, mut intents: MessageWriter<ForgeIntent>) {
    if keyboard.just_pressed(KeyCode::KeyE) {
        intents.write(ForgeIntent::RequestEvolution);
    }
    if keyboard.just_pressed(KeyCode::Escape) {
        intents.write(ForgeIntent::CloseEvolution);
    }
    if keyboard.just_pressed(KeyCode::KeyR) {
        intents.write(ForgeIntent::Restart);
    }
}

/// Reload tuning with F5.
fn tuning_reload_input(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut tuning: ResMut<Tuning>,
    session: Option<ResMut<ForgeSession>>,
) {
    if keyboard.just_pressed(KeyCode::F5) {
        tuning.reload();
        if let Some(mut session) = session {
            session.apply_tuning(&tuning);
        }
    }
}

// ── Session ─────────────────────────────────────────────────────────

/// Apply every pending intent to the session, in order.
fn apply_intents(
    mut intents: MessageReader<ForgeIntent>,
    mut session: ResMut<ForgeSession>,
    catalog: Res<PartCatalog>,
    tuning: Res<Tuning>,
    mut events: MessageWriter<ForgeEvent>,
) {
    for intent in intents.read() {
        match intent {
            ForgeIntent::SelectSlot(slot) => session.select_slot(*slot),
            ForgeIntent::Equip { slot, part_id } => {
                match session.equip_part(*slot, part_id, &catalog) {
                    Ok(EquipOutcome::Equipped { slot, .. }) => {
                        events.write(ForgeEvent::PartEquipped {
                            slot,
                            part_id: part_id.clone(),
                        });
                    }
                    Ok(EquipOutcome::Unchanged) => {}
                    Err(e) => {
                        warn!("Equip rejected: {e}");
                        events.write(ForgeEvent::EquipRejected(e));
                    }
                }
            }
            ForgeIntent::RequestEvolution => match session.request_evolution() {
                Ok(()) => {
                    events.write(ForgeEvent::PhaseEntered(EvolutionPhase::Preparing));
                }
                Err(EvolutionError::Denied(unmet)) => {
                    info!("Evolution denied: {} condition(s) unmet", unmet.len());
                    events.write(ForgeEvent::EvolutionDenied(unmet));
                }
                Err(e) => {
                    warn!("Evolution request rejected: {e}");
                    events.write(ForgeEvent::EvolutionRejected(e));
                }
            },
            ForgeIntent::CloseEvolution => {
                let was_complete = session.phase() == EvolutionPhase::Complete;
                match session.close_evolution() {
                    Ok(()) if !was_complete => {
                        events.write(ForgeEvent::EvolutionCancelled);
                    }
                    Ok(()) => {}
                    // Esc with nothing open
                    Err(EvolutionError::NotRunning) => {}
                    Err(e) => {
                        warn!("Close rejected: {e}");
                        events.write(ForgeEvent::EvolutionRejected(e));
                    }
                }
            }
            ForgeIntent::SelectStep(index) => match session.select_step(*index) {
                Ok(step) => {
                    let stage = step.stage.get();
                    events.write(ForgeEvent::StepSelected {
                        index: *index,
                        stage,
                    });
                }
                Err(e) => {
                    warn!("Step selection rejected: {e}");
                    events.write(ForgeEvent::StepRejected(e));
                }
            },
            ForgeIntent::Restart => {
                if session.is_evolving() {
                    warn!("Restart ignored while evolving");
                    continue;
                }
                session.reset(&tuning);
                info!("Session restarted with {}", session.sword().name);
                events.write(ForgeEvent::SessionRestarted);
            }
        }
    }
}

/// Drive the evolution timers from frame time.
fn tick_evolution(
    time: Res<Time>,
    mut session: ResMut<ForgeSession>,
    mut events: MessageWriter<ForgeEvent>,
) {
    // Avoid flagging the resource as changed on idle frames.
    if !session.is_evolving() {
        return;
    }
    for phase in session.tick(time.delta_secs()) {
        events.write(ForgeEvent::PhaseEntered(phase));
        if phase == EvolutionPhase::Complete {
            let sword = session.sword();
            events.write(ForgeEvent::Evolved {
                stage: sword.stage.get(),
                name: sword.name.clone(),
            });
        }
    }
}
