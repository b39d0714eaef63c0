//! Seams to the external collaborators the combat core depends on.
//!
//! The core never reaches into global state. Everything it needs from the
//! rest of the game — event buffs, meta-progression multipliers, loot rolls,
//! resource credits — arrives through the traits in this module, passed by
//! reference into each tick. Tests swap in small recording fakes.
//!
//! Multiplier values are read at the moment of use, never cached for the
//! tick.

use serde::{Deserialize, Serialize};

use crate::combatant::CombatantId;

/// Read-only source of external numeric multipliers.
///
/// Implementations wrap event buffs, meta upgrades, and ascension state.
/// All methods default to the neutral value so minimal implementations stay
/// small.
pub trait ModifierSource {
    /// Multiplier applied to hero strike damage (event buff).
    fn event_attack_multiplier(&self) -> f32 {
        1.0
    }

    /// Divisor applied to enemy strike damage (event buff, modeled as
    /// damage reduction).
    fn event_defense_multiplier(&self) -> f32 {
        1.0
    }

    /// Multiplier on gold rewards.
    fn gold_multiplier(&self) -> f32 {
        1.0
    }

    /// Multiplier on xp rewards.
    fn xp_multiplier(&self) -> f32 {
        1.0
    }

    /// Multiplier on soul rewards (boss kills).
    fn soul_multiplier(&self) -> f32 {
        1.0
    }

    /// Enemy stat multiplier from ascension difficulty.
    fn ascension_difficulty(&self) -> f32 {
        1.0
    }

    /// Interest rate applied to the gold balance on zone clear, if the
    /// upgrade is unlocked.
    fn gold_interest_rate(&self) -> Option<f32> {
        None
    }
}

/// A plain-value [`ModifierSource`] for tests and defaults.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StaticModifiers {
    /// Hero damage multiplier.
    pub attack: f32,
    /// Enemy damage divisor.
    pub defense: f32,
    /// Gold reward multiplier.
    pub gold: f32,
    /// Xp reward multiplier.
    pub xp: f32,
    /// Soul reward multiplier.
    pub souls: f32,
    /// Enemy stat multiplier.
    pub ascension: f32,
    /// Gold interest rate, if unlocked.
    pub interest: Option<f32>,
}

impl Default for StaticModifiers {
    fn default() -> Self {
        Self {
            attack: 1.0,
            defense: 1.0,
            gold: 1.0,
            xp: 1.0,
            souls: 1.0,
            ascension: 1.0,
            interest: None,
        }
    }
}

impl ModifierSource for StaticModifiers {
    fn event_attack_multiplier(&self) -> f32 {
        self.attack
    }

    fn event_defense_multiplier(&self) -> f32 {
        self.defense
    }

    fn gold_multiplier(&self) -> f32 {
        self.gold
    }

    fn xp_multiplier(&self) -> f32 {
        self.xp
    }

    fn soul_multiplier(&self) -> f32 {
        self.souls
    }

    fn ascension_difficulty(&self) -> f32 {
        self.ascension
    }

    fn gold_interest_rate(&self) -> Option<f32> {
        self.interest
    }
}

/// Quality tier requested from the loot collaborator.
///
/// Tiers are ordered; elite kills are guaranteed at least [`LootTier::Elite`].
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum LootTier {
    /// Regular enemy drop table.
    Standard,
    /// Elite drop table.
    Elite,
    /// Boss drop table.
    Boss,
}

/// Opaque item descriptor returned by a loot roll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LootDrop {
    /// External item identifier; the core never interprets it.
    pub item: u64,
    /// Tier the drop was rolled at.
    pub tier: LootTier,
}

/// Loot collaborator queried on kills.
pub trait LootTable {
    /// Rolls the table at the given tier.
    ///
    /// `None` means no drop — inventory full or an empty roll — and is
    /// absorbed silently by the core.
    fn roll(&mut self, tier: LootTier) -> Option<LootDrop>;
}

/// Resource collaborator credited with combat rewards.
pub trait ResourceLedger {
    /// Adds gold to the shared pool.
    fn credit_gold(&mut self, amount: u64);

    /// Adds xp to a single hero.
    fn credit_xp(&mut self, hero: CombatantId, amount: u64);

    /// Adds souls to the prestige pool.
    fn credit_souls(&mut self, amount: u64);

    /// Current gold balance, read when applying zone-clear interest.
    fn gold_balance(&self) -> u64;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_modifiers_default_to_neutral() {
        let mods = StaticModifiers::default();
        assert!((mods.event_attack_multiplier() - 1.0).abs() < f32::EPSILON);
        assert!((mods.ascension_difficulty() - 1.0).abs() < f32::EPSILON);
        assert!(mods.gold_interest_rate().is_none());
    }

    #[test]
    fn loot_tiers_are_ordered() {
        assert!(LootTier::Standard < LootTier::Elite);
        assert!(LootTier::Elite < LootTier::Boss);
        assert_eq!(LootTier::Standard.max(LootTier::Elite), LootTier::Elite);
    }
}
