use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};

use serde::{Deserialize, Serialize};

// ── Newtypes ────────────────────────────────────────────────────────

/// Aggregate combat stats of a sword, or the delta a part/evolution applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
pub struct SwordStats {
    pub attack: i32,
    pub defense: i32,
    pub magic: i32,
}

impl SwordStats {
    pub const ZERO: Self = Self::new(0, 0, 0);

    pub const fn new(attack: i32, defense: i32, magic: i32) -> Self {
        Self {
            attack,
            defense,
            magic,
        }
    }

    /// attack + defense + magic, the figure the evolution gate compares.
    pub fn total(self) -> i32 {
        self.attack + self.defense + self.magic
    }

    /// Multiply every field by `n` (used for cumulative evolution bonuses).
    pub fn times(self, n: i32) -> Self {
        Self::new(self.attack * n, self.defense * n, self.magic * n)
    }
}

impl Add for SwordStats {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(
            self.attack + rhs.attack,
            self.defense + rhs.defense,
            self.magic + rhs.magic,
        )
    }
}

impl AddAssign for SwordStats {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for SwordStats {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(
            self.attack - rhs.attack,
            self.defense - rhs.defense,
            self.magic - rhs.magic,
        )
    }
}

impl SubAssign for SwordStats {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl fmt::Display for SwordStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ATK {}  DEF {}  MAG {}",
            self.attack, self.defense, self.magic
        )
    }
}

/// Progression level of a sword. Always within [1, MAX].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Stage(u8);

impl Stage {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn new(v: u8) -> Self {
        Self(v.clamp(Self::MIN, Self::MAX))
    }

    pub fn first() -> Self {
        Self(Self::MIN)
    }

    pub fn get(self) -> u8 {
        self.0
    }

    pub fn is_max(self) -> bool {
        self.0 >= Self::MAX
    }

    /// The following stage, or `None` once the cap is reached.
    pub fn next(self) -> Option<Self> {
        if self.is_max() {
            None
        } else {
            Some(Self(self.0 + 1))
        }
    }

    /// Number of evolutions that have been applied to reach this stage.
    pub fn evolutions(self) -> i32 {
        (self.0 - Self::MIN) as i32
    }
}

impl Default for Stage {
    fn default() -> Self {
        Self::first()
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.0, Self::MAX)
    }
}

// ── Enums ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartType {
    Blade,
    Guard,
    Handle,
    Gem,
}

impl PartType {
    /// Fixed recommendation order for filling slots.
    pub const ORDER: [PartType; 4] = [Self::Blade, Self::Guard, Self::Handle, Self::Gem];

    /// Slots that must be filled before an evolution may start.
    pub const REQUIRED: [PartType; 3] = [Self::Blade, Self::Guard, Self::Handle];

    pub fn display_name(self) -> &'static str {
        match self {
            Self::Blade => "Blade",
            Self::Guard => "Guard",
            Self::Handle => "Handle",
            Self::Gem => "Gem",
        }
    }

    /// Short flavour line shown on the slot tab.
    pub fn effect_hint(self) -> &'static str {
        match self {
            Self::Blade => "Raises attack",
            Self::Guard => "Raises defense",
            Self::Handle => "Improves handling",
            Self::Gem => "Adds magic",
        }
    }

    /// The slot after this one in `ORDER`, `None` after the gem.
    pub fn following(self) -> Option<Self> {
        let idx = Self::ORDER.iter().position(|&t| t == self)?;
        Self::ORDER.get(idx + 1).copied()
    }
}

impl fmt::Display for PartType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_arithmetic() {
        let a = SwordStats::new(10, 5, 0);
        let b = SwordStats::new(2, 2, 3);
        assert_eq!(a + b, SwordStats::new(12, 7, 3));
        assert_eq!((a + b) - b, a);
        assert_eq!(b.times(3), SwordStats::new(6, 6, 9));
        assert_eq!(a.total(), 15);
    }

    #[test]
    fn stage_is_clamped_and_capped() {
        assert_eq!(Stage::new(0).get(), 1);
        assert_eq!(Stage::new(9).get(), 5);
        assert_eq!(Stage::new(4).next(), Some(Stage::new(5)));
        assert_eq!(Stage::new(5).next(), None);
        assert_eq!(Stage::new(3).evolutions(), 2);
    }

    #[test]
    fn part_type_following_walks_order() {
        assert_eq!(PartType::Blade.following(), Some(PartType::Guard));
        assert_eq!(PartType::Handle.following(), Some(PartType::Gem));
        assert_eq!(PartType::Gem.following(), None);
    }
}
