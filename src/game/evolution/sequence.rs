use serde::{Deserialize, Serialize};

use crate::config::tuning::Tuning;
use crate::game::error::EvolutionError;
use crate::game::sword::Sword;

/// Phases of the evolution animation, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum EvolutionPhase {
    #[default]
    Idle,
    Preparing,
    Charging,
    Transforming,
    Complete,
}

impl EvolutionPhase {
    /// Phase reached when the current phase's timer fires.
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Preparing => Some(Self::Charging),
            Self::Charging => Some(Self::Transforming),
            Self::Transforming => Some(Self::Complete),
            Self::Idle | Self::Complete => None,
        }
    }

    /// Started but not yet complete.
    pub fn is_in_flight(self) -> bool {
        matches!(self, Self::Preparing | Self::Charging | Self::Transforming)
    }

    /// 0-based position among the timed phases (Complete = 3).
    fn index(self) -> u8 {
        match self {
            Self::Idle | Self::Preparing => 0,
            Self::Charging => 1,
            Self::Transforming => 2,
            Self::Complete => 3,
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Self::Idle => "",
            Self::Preparing => "Preparing evolution...",
            Self::Charging => "Channeling energy...",
            Self::Transforming => "Transforming...",
            Self::Complete => "Evolution complete!",
        }
    }
}

/// How long each timed phase lasts before the next one fires (seconds).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhaseTimings {
    pub preparing: f32,
    pub charging: f32,
    pub transforming: f32,
}

impl PhaseTimings {
    pub fn from_tuning(tuning: &Tuning) -> Self {
        Self {
            preparing: tuning.preparing_secs.max(0.0),
            charging: tuning.charging_secs.max(0.0),
            transforming: tuning.transforming_secs.max(0.0),
        }
    }

    fn duration_of(&self, phase: EvolutionPhase) -> f32 {
        match phase {
            EvolutionPhase::Preparing => self.preparing,
            EvolutionPhase::Charging => self.charging,
            EvolutionPhase::Transforming => self.transforming,
            EvolutionPhase::Idle | EvolutionPhase::Complete => 0.0,
        }
    }
}

impl Default for PhaseTimings {
    fn default() -> Self {
        Self::from_tuning(&Tuning::default())
    }
}

/// A scheduled phase change. Fires only if `token` still matches the
/// sequence generation.
#[derive(Debug, Clone, Copy)]
struct PendingTransition {
    token: u64,
    to: EvolutionPhase,
    remaining: f32,
    duration: f32,
}

/// Timer-driven evolution state machine.
///
/// A single pending transition acts as the scheduler. `cancel` and `reset`
/// bump the generation, which disposes of anything already scheduled.
#[derive(Debug, Clone, Default)]
pub struct EvolutionSequence {
    phase: EvolutionPhase,
    generation: u64,
    pending: Option<PendingTransition>,
    timings: PhaseTimings,
    provisional: Option<Sword>,
}

impl EvolutionSequence {
    pub fn new(timings: PhaseTimings) -> Self {
        Self {
            timings,
            ..Default::default()
        }
    }

    pub fn phase(&self) -> EvolutionPhase {
        self.phase
    }

    pub fn is_in_flight(&self) -> bool {
        self.phase.is_in_flight()
    }

    pub fn set_timings(&mut self, timings: PhaseTimings) {
        self.timings = timings;
    }

    /// Snapshot taken on entering `Transforming`, for preview.
    pub fn provisional(&self) -> Option<&Sword> {
        self.provisional.as_ref()
    }

    pub fn take_provisional(&mut self) -> Option<Sword> {
        self.provisional.take()
    }

    /// Enter `Preparing`. The caller has already consulted the gate.
    /// A completed sequence must be dismissed first.
    pub fn start(&mut self) -> Result<(), EvolutionError> {
        match self.phase {
            EvolutionPhase::Idle => {}
            EvolutionPhase::Complete => return Err(EvolutionError::AlreadyComplete),
            _ => return Err(EvolutionError::AlreadyRunning),
        }
        self.generation = self.generation.wrapping_add(1);
        self.provisional = None;
        self.enter(EvolutionPhase::Preparing);
        Ok(())
    }

    /// Advance timers by `dt` seconds. Returns every phase entered, in order.
    /// `live` is snapshotted when `Transforming` is entered.
    pub fn tick(&mut self, dt: f32, live: &Sword) -> Vec<EvolutionPhase> {
        let mut entered = Vec::new();
        let mut budget = dt.max(0.0);

        while let Some(mut pending) = self.pending.take() {
            if pending.token != self.generation {
                break;
            }
            if pending.remaining > budget {
                pending.remaining -= budget;
                self.pending = Some(pending);
                break;
            }
            budget -= pending.remaining;
            if pending.to == EvolutionPhase::Transforming {
                self.provisional = Some(live.clone());
            }
            self.enter(pending.to);
            entered.push(pending.to);
        }
        entered
    }

    /// Abandon an in-flight sequence, discarding the provisional snapshot.
    pub fn cancel(&mut self, allow_cancel: bool) -> Result<(), EvolutionError> {
        match self.phase {
            EvolutionPhase::Idle => Err(EvolutionError::NotRunning),
            EvolutionPhase::Complete => Err(EvolutionError::AlreadyComplete),
            _ if !allow_cancel => Err(EvolutionError::CancelBlocked),
            _ => {
                self.reset();
                Ok(())
            }
        }
    }

    /// Leave the terminal `Complete` phase.
    pub fn dismiss(&mut self) -> Result<(), EvolutionError> {
        match self.phase {
            EvolutionPhase::Complete => {
                self.phase = EvolutionPhase::Idle;
                Ok(())
            }
            EvolutionPhase::Idle => Err(EvolutionError::NotRunning),
            _ => Err(EvolutionError::AlreadyRunning),
        }
    }

    /// Tear down: drop any scheduled transition and return to `Idle`.
    pub fn reset(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.pending = None;
        self.provisional = None;
        self.phase = EvolutionPhase::Idle;
    }

    /// Overall progress in [0, 1], interpolated within the current phase.
    pub fn progress(&self) -> f32 {
        let within = match self.pending {
            Some(p) if p.duration > 0.0 => 1.0 - p.remaining / p.duration,
            _ => 0.0,
        };
        ((self.phase.index() as f32 + within) / 3.0).clamp(0.0, 1.0)
    }

    fn enter(&mut self, phase: EvolutionPhase) {
        self.phase = phase;
        self.pending = phase.next().map(|to| {
            let duration = self.timings.duration_of(phase);
            PendingTransition {
                token: self.generation,
                to,
                remaining: duration,
                duration,
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::stats::types::SwordStats;

    fn timings() -> PhaseTimings {
        PhaseTimings {
            preparing: 1.0,
            charging: 1.0,
            transforming: 1.0,
        }
    }

    fn live() -> Sword {
        Sword::new("tester", SwordStats::new(10, 5, 0))
    }

    #[test]
    fn phases_advance_on_timers() {
        let mut seq = EvolutionSequence::new(timings());
        let s = live();
        seq.start().unwrap();
        assert_eq!(seq.phase(), EvolutionPhase::Preparing);

        assert!(seq.tick(0.5, &s).is_empty());
        assert_eq!(seq.tick(0.5, &s), vec![EvolutionPhase::Charging]);
        assert_eq!(seq.tick(1.0, &s), vec![EvolutionPhase::Transforming]);
        assert_eq!(seq.provisional(), Some(&s));
        assert_eq!(seq.tick(1.0, &s), vec![EvolutionPhase::Complete]);
        assert!(seq.tick(10.0, &s).is_empty());
        assert_eq!(seq.phase(), EvolutionPhase::Complete);
    }

    #[test]
    fn large_tick_enters_every_phase_in_order() {
        let mut seq = EvolutionSequence::new(timings());
        seq.start().unwrap();
        assert_eq!(
            seq.tick(5.0, &live()),
            vec![
                EvolutionPhase::Charging,
                EvolutionPhase::Transforming,
                EvolutionPhase::Complete,
            ]
        );
    }

    #[test]
    fn cannot_start_twice() {
        let mut seq = EvolutionSequence::new(timings());
        seq.start().unwrap();
        assert_eq!(seq.start(), Err(EvolutionError::AlreadyRunning));
    }

    #[test]
    fn cancel_discards_and_disposes_pending_transition() {
        let mut seq = EvolutionSequence::new(timings());
        let s = live();
        seq.start().unwrap();
        seq.tick(2.5, &s);
        assert!(seq.provisional().is_some());

        seq.cancel(true).unwrap();
        assert_eq!(seq.phase(), EvolutionPhase::Idle);
        assert!(seq.provisional().is_none());
        assert!(seq.tick(10.0, &s).is_empty());
        assert_eq!(seq.phase(), EvolutionPhase::Idle);
    }

    #[test]
    fn cancel_rules() {
        let mut seq = EvolutionSequence::new(timings());
        assert_eq!(seq.cancel(true), Err(EvolutionError::NotRunning));

        seq.start().unwrap();
        assert_eq!(seq.cancel(false), Err(EvolutionError::CancelBlocked));
        assert!(seq.is_in_flight());

        seq.tick(3.0, &live());
        assert_eq!(seq.cancel(true), Err(EvolutionError::AlreadyComplete));
        assert_eq!(seq.phase(), EvolutionPhase::Complete);
    }

    #[test]
    fn dismiss_only_from_complete() {
        let mut seq = EvolutionSequence::new(timings());
        assert_eq!(seq.dismiss(), Err(EvolutionError::NotRunning));
        seq.start().unwrap();
        assert_eq!(seq.dismiss(), Err(EvolutionError::AlreadyRunning));
        seq.tick(3.0, &live());
        seq.dismiss().unwrap();
        assert_eq!(seq.phase(), EvolutionPhase::Idle);
    }

    #[test]
    fn restart_requires_dismiss_after_complete() {
        let mut seq = EvolutionSequence::new(timings());
        seq.start().unwrap();
        seq.tick(3.0, &live());
        assert_eq!(seq.start(), Err(EvolutionError::AlreadyComplete));
        assert_eq!(seq.phase(), EvolutionPhase::Complete);

        seq.dismiss().unwrap();
        seq.start().unwrap();
        assert_eq!(seq.phase(), EvolutionPhase::Preparing);
    }

    #[test]
    fn progress_is_monotonic() {
        let mut seq = EvolutionSequence::new(timings());
        let s = live();
        seq.start().unwrap();
        let mut last = seq.progress();
        for _ in 0..40 {
            seq.tick(0.1, &s);
            let p = seq.progress();
            assert!(p >= last);
            last = p;
        }
        assert_eq!(last, 1.0);
    }
}
