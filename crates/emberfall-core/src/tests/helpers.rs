//! Shared test factories and collaborator fakes.

use glam::Vec2;

use crate::combatant::{Combatant, CombatantId, EnemyKind, HeroClass, HeroSpec};
use crate::encounter::{EncounterDirector, TickContext, WaveProgress};
use crate::hooks::{LootDrop, LootTable, LootTier, ResourceLedger, StaticModifiers};
use crate::registry::Battlefield;

// =============================================================================
// Collaborator fakes
// =============================================================================

/// Ledger fake that records every credit it receives.
#[derive(Debug, Default)]
pub struct RecordingLedger {
    /// Accumulated gold.
    pub gold: u64,
    /// Accumulated souls.
    pub souls: u64,
    /// Every xp credit, in call order.
    pub xp: Vec<(CombatantId, u64)>,
}

impl ResourceLedger for RecordingLedger {
    fn credit_gold(&mut self, amount: u64) {
        self.gold += amount;
    }

    fn credit_xp(&mut self, hero: CombatantId, amount: u64) {
        self.xp.push((hero, amount));
    }

    fn credit_souls(&mut self, amount: u64) {
        self.souls += amount;
    }

    fn gold_balance(&self) -> u64 {
        self.gold
    }
}

/// Loot fake that always drops and records the tiers it was asked for.
#[derive(Debug, Default)]
pub struct CountingLoot {
    /// Every tier requested, in call order.
    pub rolls: Vec<LootTier>,
}

impl LootTable for CountingLoot {
    fn roll(&mut self, tier: LootTier) -> Option<LootDrop> {
        self.rolls.push(tier);
        Some(LootDrop { item: 7, tier })
    }
}

/// Loot fake modeling a full inventory: never drops.
#[derive(Debug, Default)]
pub struct EmptyLoot;

impl LootTable for EmptyLoot {
    fn roll(&mut self, _tier: LootTier) -> Option<LootDrop> {
        None
    }
}

// =============================================================================
// Encounter harness
// =============================================================================

/// A director with all of its external collaborators, pre-wired.
pub struct EncounterHarness {
    /// The director under test.
    pub director: EncounterDirector,
    /// Wave state, as the external game-state collaborator would own it.
    pub wave: WaveProgress,
    /// Multiplier values.
    pub modifiers: StaticModifiers,
    /// Always-dropping loot fake.
    pub loot: CountingLoot,
    /// Recording ledger fake.
    pub ledger: RecordingLedger,
}

impl EncounterHarness {
    /// Harness with the reference tuning and a 5-kill, 10-wave zone shape.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            director: EncounterDirector::new(seed),
            wave: WaveProgress::new(5, 10),
            modifiers: StaticModifiers::default(),
            loot: CountingLoot::default(),
            ledger: RecordingLedger::default(),
        }
    }

    /// Runs one tick with the wired collaborators.
    pub fn tick(&mut self, delta: f32) {
        let mut ctx = TickContext {
            wave: &mut self.wave,
            modifiers: &self.modifiers,
            loot: &mut self.loot,
            ledger: &mut self.ledger,
        };
        self.director.tick(delta, &mut ctx);
    }

    /// Runs `count` ticks of `delta` each.
    pub fn run(&mut self, count: usize, delta: f32) {
        for _ in 0..count {
            self.tick(delta);
        }
    }
}

// =============================================================================
// Entity factories
// =============================================================================

/// A hero spec with sturdy all-round stats.
#[must_use]
pub fn hero_spec(class: HeroClass, position: Vec2) -> HeroSpec {
    HeroSpec {
        class,
        position,
        max_hp: 200,
        attack: 20,
        defense: 10,
        range: 120.0,
        attack_interval: 60.0,
    }
}

/// Spawns a melee enemy directly into a battlefield.
pub fn spawn_melee(field: &mut Battlefield, position: Vec2, hp: i32) -> CombatantId {
    field.spawn(Combatant::enemy(
        EnemyKind::Melee,
        position,
        hp,
        6,
        2,
        60.0,
        120.0,
        10,
        5,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn harness_wiring_reaches_the_ledger() {
        let mut h = EncounterHarness::new(1);
        h.director.recruit_hero(&hero_spec(HeroClass::Cleric, Vec2::ZERO));
        let dead = spawn_melee(h.director.battlefield_mut(), Vec2::new(50.0, 0.0), 30);
        h.director
            .battlefield_mut()
            .get_mut(dead)
            .unwrap()
            .apply_damage(1_000);

        h.tick(1.0);

        assert_eq!(h.ledger.gold, 10);
        assert_eq!(h.loot.rolls.len(), 1);
    }

    #[test]
    fn empty_loot_never_drops() {
        let mut loot = EmptyLoot;
        assert!(loot.roll(LootTier::Boss).is_none());
    }
}
