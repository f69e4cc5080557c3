use bevy::log::{debug, info, warn};
use bevy::prelude::Resource;

use super::error::{EquipError, EvolutionError, HistoryError};
use super::evolution::gate::{self, GateVerdict};
use super::evolution::sequence::{EvolutionPhase, EvolutionSequence, PhaseTimings};
use super::history::StepHistory;
use super::parts::registry::PartCatalog;
use super::stats::types::{PartType, SwordStats};
use super::sword::{EquipOutcome, Sword};
use crate::config::tuning::Tuning;

/// What the renderer needs to draw the sword. Nothing else is exposed to it.
#[derive(Debug, Clone, Copy)]
pub struct RenderView<'a> {
    pub weapon: &'a Sword,
    pub display_stage: u8,
    pub is_evolving: bool,
}

/// All mutable forge state for one play session, owned by the app root.
#[derive(Resource, Debug, Clone)]
pub struct ForgeSession {
    base_stats: SwordStats,
    sword: Sword,
    history: StepHistory,
    next_slot: Option<PartType>,
    selected_slot: Option<PartType>,
    sequence: EvolutionSequence,
    allow_cancel: bool,
}

impl ForgeSession {
    /// Start a session with a fresh stage-1 sword built from tuning.
    pub fn new(tuning: &Tuning) -> Self {
        let base = tuning.base_stats();
        Self::with_sword(Sword::new(tuning.owner_id.clone(), base), base, tuning)
    }

    /// Start a session around an existing sword. `base` is the part-free,
    /// stage-1 stat line the sword was built from.
    pub fn with_sword(sword: Sword, base: SwordStats, tuning: &Tuning) -> Self {
        Self {
            base_stats: base,
            next_slot: sword.next_recommended_slot(),
            selected_slot: None,
            history: StepHistory::new(sword.clone()),
            sword,
            sequence: EvolutionSequence::new(PhaseTimings::from_tuning(tuning)),
            allow_cancel: tuning.allow_cancel_evolution,
        }
    }

    // ── Accessors ────────────────────────────────────────────────

    /// The live sword (latest step).
    pub fn sword(&self) -> &Sword {
        &self.sword
    }

    pub fn base_stats(&self) -> SwordStats {
        self.base_stats
    }

    pub fn history(&self) -> &StepHistory {
        &self.history
    }

    pub fn next_slot(&self) -> Option<PartType> {
        self.next_slot
    }

    pub fn selected_slot(&self) -> Option<PartType> {
        self.selected_slot
    }

    pub fn phase(&self) -> EvolutionPhase {
        self.sequence.phase()
    }

    pub fn is_evolving(&self) -> bool {
        self.sequence.is_in_flight()
    }

    pub fn progress(&self) -> f32 {
        self.sequence.progress()
    }

    pub fn gate(&self) -> GateVerdict {
        gate::check(&self.sword)
    }

    /// Sword on display: the provisional snapshot mid-evolution, else the selected step.
    pub fn displayed(&self) -> &Sword {
        match self.sequence.provisional() {
            Some(provisional) if self.sequence.is_in_flight() => provisional,
            _ => self.history.selected(),
        }
    }

    pub fn render_view(&self) -> RenderView<'_> {
        let weapon = self.displayed();
        RenderView {
            weapon,
            display_stage: weapon.stage.get(),
            is_evolving: self.sequence.is_in_flight(),
        }
    }

    // ── Operations ───────────────────────────────────────────────

    pub fn select_slot(&mut self, slot: Option<PartType>) {
        self.selected_slot = slot;
    }

    /// Swap a part onto the live sword and mirror it into the latest step.
    pub fn equip_part(
        &mut self,
        slot: PartType,
        part_id: &str,
        catalog: &PartCatalog,
    ) -> Result<EquipOutcome, EquipError> {
        if self.sequence.is_in_flight() {
            return Err(EquipError::EvolutionInProgress);
        }
        let outcome = self.sword.equip(slot, part_id, catalog)?;
        if let EquipOutcome::Equipped { slot, ref replaced } = outcome {
            info!(
                "Equipped {part_id} in {slot} (replaced {:?}); stats now {}",
                replaced, self.sword.stats
            );
            self.history.replace_latest(self.sword.clone());
            self.next_slot = self.sword.next_recommended_slot();
            if let Some(current) = self.selected_slot {
                self.selected_slot = current.following();
            }
        }
        Ok(outcome)
    }

    /// Check the gate and, if it allows, enter `Preparing`.
    pub fn request_evolution(&mut self) -> Result<(), EvolutionError> {
        match self.sequence.phase() {
            EvolutionPhase::Idle => {}
            EvolutionPhase::Complete => return Err(EvolutionError::AlreadyComplete),
            _ => return Err(EvolutionError::AlreadyRunning),
        }
        let verdict = self.gate();
        debug!("Evolution gate: {verdict:?}");
        if let GateVerdict::Deny(unmet) = verdict {
            return Err(EvolutionError::Denied(unmet));
        }
        self.sequence.start()?;
        info!("Evolution started from stage {}", self.sword.stage.get());
        Ok(())
    }

    /// Advance the evolution timers. Finalizes when `Complete` is entered.
    pub fn tick(&mut self, dt: f32) -> Vec<EvolutionPhase> {
        let entered = self.sequence.tick(dt, &self.sword);
        for &phase in &entered {
            info!("Evolution phase: {phase:?}");
            if phase == EvolutionPhase::Complete {
                self.finalize_evolution();
            }
        }
        entered
    }

    /// Abandon an in-flight evolution.
    pub fn cancel_evolution(&mut self) -> Result<(), EvolutionError> {
        self.sequence.cancel(self.allow_cancel)?;
        info!("Evolution cancelled; provisional snapshot discarded");
        Ok(())
    }

    /// Close the evolution view: dismiss when complete, cancel otherwise.
    pub fn close_evolution(&mut self) -> Result<(), EvolutionError> {
        if self.sequence.phase() == EvolutionPhase::Complete {
            self.sequence.dismiss()
        } else {
            self.cancel_evolution()
        }
    }

    pub fn select_step(&mut self, index: usize) -> Result<&Sword, HistoryError> {
        self.history.select(index)
    }

    /// Pick up reloaded timings / cancel policy. An in-flight phase keeps
    /// the duration it was scheduled with.
    pub fn apply_tuning(&mut self, tuning: &Tuning) {
        self.sequence.set_timings(PhaseTimings::from_tuning(tuning));
        self.allow_cancel = tuning.allow_cancel_evolution;
    }

    /// Throw the session away and start over with a fresh sword.
    pub fn reset(&mut self, tuning: &Tuning) {
        *self = Self::new(tuning);
    }

    fn finalize_evolution(&mut self) {
        let mut evolved = self
            .sequence
            .take_provisional()
            .unwrap_or_else(|| self.sword.clone());
        if !evolved.apply_evolution() {
            warn!("Evolution finalized at the final stage; nothing applied");
            return;
        }
        info!(
            "Sword evolved to stage {} ({}), stats {}",
            evolved.stage.get(),
            evolved.name,
            evolved.stats
        );
        self.sword = evolved.clone();
        self.history.push_evolution(evolved);
        self.next_slot = self.sword.next_recommended_slot();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::error::UnmetCondition;
    use crate::game::stats::types::Stage;

    fn tuning() -> Tuning {
        Tuning {
            preparing_secs: 1.0,
            charging_secs: 1.0,
            transforming_secs: 1.0,
            ..Tuning::default()
        }
    }

    fn equip_basics(session: &mut ForgeSession, cat: &PartCatalog) {
        session.equip_part(PartType::Blade, "blade-1", cat).unwrap();
        session.equip_part(PartType::Guard, "guard-1", cat).unwrap();
        session.equip_part(PartType::Handle, "handle-1", cat).unwrap();
    }

    fn run_to_complete(session: &mut ForgeSession) {
        session.request_evolution().unwrap();
        session.tick(10.0);
        assert_eq!(session.phase(), EvolutionPhase::Complete);
    }

    #[test]
    fn evolution_from_stage_two_appends_one_step() {
        let t = tuning();
        let mut sword = Sword::new("tester", SwordStats::ZERO);
        for slot in PartType::REQUIRED {
            sword.parts.set(slot, format!("{}-1", slot.display_name().to_lowercase()));
        }
        sword.stage = Stage::new(2);
        sword.stats = SwordStats::new(20, 15, 5);
        let mut session = ForgeSession::with_sword(sword, SwordStats::ZERO, &t);

        run_to_complete(&mut session);

        assert_eq!(session.sword().stage.get(), 3);
        assert_eq!(session.sword().stats, SwordStats::new(30, 20, 8));
        assert_eq!(session.history().len(), 2);
        assert_eq!(session.history().latest(), session.sword());
    }

    #[test]
    fn denied_request_reports_conditions_and_stays_idle() {
        let t = tuning();
        let cat = PartCatalog::with_defaults();
        let mut session = ForgeSession::new(&t);
        session.equip_part(PartType::Blade, "blade-1", &cat).unwrap();

        let unmet = match session.request_evolution() {
            Err(EvolutionError::Denied(unmet)) => unmet,
            other => panic!("expected denial, got {other:?}"),
        };
        assert!(unmet.iter().any(|c| matches!(c, UnmetCondition::MissingParts(_))));
        assert_eq!(session.phase(), EvolutionPhase::Idle);
    }

    #[test]
    fn stats_match_derivation_through_equips_and_evolutions() {
        let t = tuning();
        let cat = PartCatalog::with_defaults();
        let mut session = ForgeSession::new(&t);
        let base = session.base_stats();

        equip_basics(&mut session, &cat);
        run_to_complete(&mut session);
        session.close_evolution().unwrap();

        session.equip_part(PartType::Blade, "blade-2", &cat).unwrap();
        session.equip_part(PartType::Gem, "gem-1", &cat).unwrap();
        session.equip_part(PartType::Guard, "guard-2", &cat).unwrap();
        assert_eq!(session.sword().stats, session.sword().derived_stats(base, &cat));

        run_to_complete(&mut session);
        assert_eq!(session.sword().stage.get(), 3);
        assert_eq!(session.sword().stats, session.sword().derived_stats(base, &cat));
    }

    #[test]
    fn equips_never_grow_history() {
        let t = tuning();
        let cat = PartCatalog::with_defaults();
        let mut session = ForgeSession::new(&t);
        for _ in 0..3 {
            equip_basics(&mut session, &cat);
            session.equip_part(PartType::Gem, "gem-1", &cat).unwrap();
        }
        assert_eq!(session.history().len(), 1);
        assert_eq!(session.history().latest(), session.sword());

        run_to_complete(&mut session);
        assert_eq!(session.history().len(), 2);
    }

    #[test]
    fn stage_never_exceeds_cap() {
        let t = tuning();
        let cat = PartCatalog::with_defaults();
        let mut session = ForgeSession::new(&t);
        equip_basics(&mut session, &cat);

        for _ in 0..10 {
            if session.request_evolution().is_ok() {
                session.tick(10.0);
                session.close_evolution().unwrap();
            }
        }
        assert_eq!(session.sword().stage.get(), Stage::MAX);
        assert_eq!(session.history().len(), Stage::MAX as usize);
        assert_eq!(
            session.gate().unmet(),
            &[UnmetCondition::MaxStageReached]
        );
    }

    #[test]
    fn equip_blocked_mid_evolution() {
        let t = tuning();
        let cat = PartCatalog::with_defaults();
        let mut session = ForgeSession::new(&t);
        equip_basics(&mut session, &cat);
        session.request_evolution().unwrap();
        assert_eq!(
            session.equip_part(PartType::Gem, "gem-1", &cat),
            Err(EquipError::EvolutionInProgress)
        );
        assert_eq!(
            session.request_evolution(),
            Err(EvolutionError::AlreadyRunning)
        );
    }

    #[test]
    fn cancel_discards_provisional_and_keeps_stage() {
        let t = tuning();
        let cat = PartCatalog::with_defaults();
        let mut session = ForgeSession::new(&t);
        equip_basics(&mut session, &cat);
        let before = session.sword().clone();

        session.request_evolution().unwrap();
        session.tick(2.5);
        assert_eq!(session.phase(), EvolutionPhase::Transforming);
        assert!(session.render_view().is_evolving);

        session.close_evolution().unwrap();
        session.tick(10.0);
        assert_eq!(session.phase(), EvolutionPhase::Idle);
        assert_eq!(session.sword(), &before);
        assert_eq!(session.history().len(), 1);
    }

    #[test]
    fn cancel_blocked_when_disallowed() {
        let t = Tuning {
            allow_cancel_evolution: false,
            ..tuning()
        };
        let cat = PartCatalog::with_defaults();
        let mut session = ForgeSession::new(&t);
        equip_basics(&mut session, &cat);
        session.request_evolution().unwrap();
        assert_eq!(
            session.cancel_evolution(),
            Err(EvolutionError::CancelBlocked)
        );
        session.tick(10.0);
        assert_eq!(session.sword().stage.get(), 2);
        assert_eq!(
            session.cancel_evolution(),
            Err(EvolutionError::AlreadyComplete)
        );
    }

    #[test]
    fn selecting_history_changes_display_only() {
        let t = tuning();
        let cat = PartCatalog::with_defaults();
        let mut session = ForgeSession::new(&t);
        equip_basics(&mut session, &cat);
        run_to_complete(&mut session);
        session.close_evolution().unwrap();

        let steps = session.history().steps().to_vec();
        session.select_step(0).unwrap();
        assert_eq!(session.render_view().display_stage, 1);
        assert_eq!(session.sword().stage.get(), 2);
        assert_eq!(session.history().steps(), steps.as_slice());
        assert!(session.select_step(7).is_err());

        session.equip_part(PartType::Gem, "gem-1", &cat).unwrap();
        assert_eq!(session.render_view().display_stage, 2);
        assert_eq!(session.history().steps()[0], steps[0]);
    }

    #[test]
    fn next_evolution_waits_for_close() {
        let t = tuning();
        let cat = PartCatalog::with_defaults();
        let mut session = ForgeSession::new(&t);
        equip_basics(&mut session, &cat);
        run_to_complete(&mut session);

        assert_eq!(
            session.request_evolution(),
            Err(EvolutionError::AlreadyComplete)
        );
        assert_eq!(session.phase(), EvolutionPhase::Complete);
        assert_eq!(session.history().len(), 2);

        session.close_evolution().unwrap();
        session.request_evolution().unwrap();
        assert_eq!(session.phase(), EvolutionPhase::Preparing);
    }

    #[test]
    fn reset_mid_evolution_starts_clean() {
        let t = tuning();
        let cat = PartCatalog::with_defaults();
        let mut session = ForgeSession::new(&t);
        equip_basics(&mut session, &cat);
        session.request_evolution().unwrap();
        session.tick(1.5);

        session.reset(&t);
        assert_eq!(session.phase(), EvolutionPhase::Idle);
        assert!(session.tick(10.0).is_empty());
        assert_eq!(session.sword().stage.get(), 1);
        assert_eq!(session.history().len(), 1);
    }

    #[test]
    fn selected_slot_advances_after_equip() {
        let t = tuning();
        let cat = PartCatalog::with_defaults();
        let mut session = ForgeSession::new(&t);
        assert_eq!(session.next_slot(), Some(PartType::Blade));

        session.select_slot(Some(PartType::Handle));
        session.equip_part(PartType::Handle, "handle-1", &cat).unwrap();
        assert_eq!(session.selected_slot(), Some(PartType::Gem));
        assert_eq!(session.next_slot(), Some(PartType::Blade));

        session.equip_part(PartType::Gem, "gem-1", &cat).unwrap();
        assert_eq!(session.selected_slot(), None);
    }
}
