//! Combatant data records for the wave-combat simulation.
//!
//! This module provides the core types describing a single participant in
//! combat:
//! - [`CombatantId`]: Unique identifier, ordered for deterministic iteration
//! - [`Faction`]: Hero or enemy allegiance
//! - [`HeroClass`] / [`EnemyKind`]: Archetype selection
//! - [`EliteAffix`]: Special behavior attached to promoted enemies
//! - [`StatusFlags`]: Lifecycle and role flags
//! - [`Combatant`]: The pure data record, indexed by id in a [`Battlefield`]
//!
//! # Architecture
//!
//! A `Combatant` carries no identity of its own and no presentation state.
//! The battlefield registry maps ids to records; views that mirror records
//! for rendering are an external concern and read state after the tick.
//!
//! [`Battlefield`]: crate::registry::Battlefield

use bitflags::bitflags;
use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::skills::SkillState;

/// Unique identifier for a combatant.
///
/// `CombatantId` is a newtype wrapper around `u64`. Ids are assigned
/// monotonically by the battlefield and never reused within one registry.
///
/// # Ordering
///
/// Ids are ordered by their numeric value. Registry iteration follows this
/// order, which also defines the first-found-wins tie-break used by
/// targeting queries.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CombatantId(u64);

impl CombatantId {
    /// Creates a new `CombatantId` from a raw `u64` value.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw `u64` value of this identifier.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for CombatantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CombatantId({})", self.0)
    }
}

impl fmt::Display for CombatantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for CombatantId {
    fn from(id: u64) -> Self {
        Self::new(id)
    }
}

/// Combat allegiance.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Faction {
    /// Player-controlled party member.
    Hero,
    /// Procedurally spawned opponent.
    Enemy,
}

impl Faction {
    /// Returns the opposing faction.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Hero => Self::Enemy,
            Self::Enemy => Self::Hero,
        }
    }
}

/// Hero archetype, determining the bound skill.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HeroClass {
    /// Front-line fighter; skill stuns and strikes a single enemy.
    Vanguard,
    /// Area caster; skill strikes every enemy at once.
    Arcanist,
    /// Precision shooter; skill bursts several random enemies.
    Marksman,
    /// Party healer; skill restores every wounded hero.
    Cleric,
    /// Defensive anchor; skill opens a party-wide damage-reduction window.
    Sentinel,
}

/// Regular enemy archetype. Weighting between kinds shifts with zone tier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    /// Close-range bruiser.
    Melee,
    /// Long-range attacker with reduced damage.
    Ranged,
    /// Support unit that heals wounded allies instead of attacking.
    Healer,
}

/// Special behavior attached to an elite enemy.
///
/// Affixes are mutually exclusive, assigned once at spawn, and never change
/// during the combatant's lifetime.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EliteAffix {
    /// Heals for a fraction of damage dealt to heroes.
    Vampiric,
    /// Takes halved damage while its shield window is still running.
    Shielded,
    /// Deals more damage as its remaining hp fraction drops.
    Berserker,
}

bitflags! {
    /// Lifecycle and role flags for a combatant.
    ///
    /// Serde support comes from the `bitflags` serde feature.
    #[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
    pub struct StatusFlags: u8 {
        /// At 0 hp; performs no actions and is excluded from targeting.
        const INCAPACITATED = 1 << 0;
        /// Attack and skill execution suspended for a fixed duration.
        const STUNNED = 1 << 1;
        /// The single, much stronger enemy of a boss wave.
        const BOSS = 1 << 2;
        /// Promoted enemy carrying an [`EliteAffix`].
        const ELITE = 1 << 3;
        /// Runs the fixed-interval heal pulse instead of auto-attacking.
        const HEALER = 1 << 4;
    }
}

/// Everything the external party store provides when recruiting a hero.
///
/// Stats arrive pre-multiplied by meta-progression; the core treats them as
/// opaque numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeroSpec {
    /// Archetype, selecting the bound skill.
    pub class: HeroClass,
    /// Starting position.
    pub position: Vec2,
    /// Maximum hit points.
    pub max_hp: i32,
    /// Base attack stat.
    pub attack: i32,
    /// Base defense stat.
    pub defense: i32,
    /// Attack range.
    pub range: f32,
    /// Ticks between auto-attacks.
    pub attack_interval: f32,
}

/// A single participant in combat: party member or enemy.
///
/// `Combatant` is a pure data record. It holds stats, countdown timers, and
/// status, but no identity and no presentation state. All timing fields are
/// delta-driven countdowns ticked by the encounter loop; no wall-clock time
/// is involved anywhere.
///
/// # Invariants
///
/// - `0 <= hp <= max_hp` after every mutation
/// - An incapacitated combatant performs no attacks, casts no skills, and is
///   excluded from targeting as an attack target; it is not a heal target
///   either (heroes passively regenerate instead)
/// - `affix` is set at most once, at spawn, and only on elites
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Combatant {
    /// Combat allegiance.
    pub faction: Faction,
    /// Hero archetype; `None` for enemies.
    pub class: Option<HeroClass>,
    /// Enemy archetype; `None` for heroes and bosses.
    pub kind: Option<EnemyKind>,
    /// World position.
    pub position: Vec2,
    /// Current hit points, always in `[0, max_hp]`.
    pub hp: i32,
    /// Maximum hit points.
    pub max_hp: i32,
    /// Base attack stat.
    pub base_attack: i32,
    /// Base defense stat.
    pub base_defense: i32,
    /// Equipment-derived attack bonus.
    pub bonus_attack: i32,
    /// Equipment-derived defense bonus.
    pub bonus_defense: i32,
    /// Attack range.
    pub range: f32,
    /// Countdown until the next auto-attack is allowed.
    pub attack_timer: f32,
    /// Ticks between auto-attacks.
    pub attack_interval: f32,
    /// Countdown until the next heal pulse (healer-flagged combatants).
    pub heal_timer: f32,
    /// Accumulator for passive regeneration while incapacitated.
    pub regen_timer: f32,
    /// Remaining stun duration; acting is suspended while above zero.
    pub stun_timer: f32,
    /// Remaining shield window for `Shielded` elites.
    pub shield_timer: f32,
    /// Elite affix, if promoted.
    pub affix: Option<EliteAffix>,
    /// Lifecycle and role flags.
    pub flags: StatusFlags,
    /// Bound skill state; heroes only.
    pub skill: Option<SkillState>,
    /// Gold granted when this enemy is removed.
    pub gold_reward: u64,
    /// Experience granted when this enemy is removed.
    pub xp_reward: u64,
}

impl Combatant {
    /// Creates a hero from a recruitment spec.
    ///
    /// Clerics are flagged as healers; the skill state is attached by the
    /// encounter director, which knows the configured cooldowns.
    #[must_use]
    pub fn hero(spec: &HeroSpec) -> Self {
        let mut flags = StatusFlags::empty();
        if spec.class == HeroClass::Cleric {
            flags |= StatusFlags::HEALER;
        }
        Self {
            faction: Faction::Hero,
            class: Some(spec.class),
            kind: None,
            position: spec.position,
            hp: spec.max_hp,
            max_hp: spec.max_hp,
            base_attack: spec.attack,
            base_defense: spec.defense,
            bonus_attack: 0,
            bonus_defense: 0,
            range: spec.range,
            attack_timer: 0.0,
            attack_interval: spec.attack_interval,
            heal_timer: 0.0,
            regen_timer: 0.0,
            stun_timer: 0.0,
            shield_timer: 0.0,
            affix: None,
            flags,
            skill: None,
            gold_reward: 0,
            xp_reward: 0,
        }
    }

    /// Creates an enemy with the given kind and rolled stats.
    ///
    /// Elite promotion and boss scaling are applied by the spawner after
    /// construction.
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn enemy(
        kind: EnemyKind,
        position: Vec2,
        max_hp: i32,
        attack: i32,
        defense: i32,
        range: f32,
        attack_interval: f32,
        gold_reward: u64,
        xp_reward: u64,
    ) -> Self {
        let mut flags = StatusFlags::empty();
        if kind == EnemyKind::Healer {
            flags |= StatusFlags::HEALER;
        }
        Self {
            faction: Faction::Enemy,
            class: None,
            kind: Some(kind),
            position,
            hp: max_hp,
            max_hp,
            base_attack: attack,
            base_defense: defense,
            bonus_attack: 0,
            bonus_defense: 0,
            range,
            attack_timer: 0.0,
            attack_interval,
            heal_timer: 0.0,
            regen_timer: 0.0,
            stun_timer: 0.0,
            shield_timer: 0.0,
            affix: None,
            flags,
            skill: None,
            gold_reward,
            xp_reward,
        }
    }

    /// Effective attack: base plus equipment bonus.
    #[must_use]
    pub fn effective_attack(&self) -> i32 {
        self.base_attack + self.bonus_attack
    }

    /// Effective defense: base plus equipment bonus.
    #[must_use]
    pub fn effective_defense(&self) -> i32 {
        self.base_defense + self.bonus_defense
    }

    /// Remaining hp as a fraction of maximum, in `[0, 1]`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn health_ratio(&self) -> f32 {
        if self.max_hp <= 0 {
            return 0.0;
        }
        self.hp as f32 / self.max_hp as f32
    }

    /// True while at 0 hp.
    #[must_use]
    pub fn is_incapacitated(&self) -> bool {
        self.flags.contains(StatusFlags::INCAPACITATED)
    }

    /// True while the stun countdown is running.
    #[must_use]
    pub fn is_stunned(&self) -> bool {
        self.flags.contains(StatusFlags::STUNNED)
    }

    /// True when the combatant may attack or cast this tick.
    #[must_use]
    pub fn can_act(&self) -> bool {
        !self.is_incapacitated() && !self.is_stunned()
    }

    /// True for the single enemy of a boss wave.
    #[must_use]
    pub fn is_boss(&self) -> bool {
        self.flags.contains(StatusFlags::BOSS)
    }

    /// True for promoted enemies carrying an affix.
    #[must_use]
    pub fn is_elite(&self) -> bool {
        self.flags.contains(StatusFlags::ELITE)
    }

    /// True for combatants that heal instead of auto-attacking.
    #[must_use]
    pub fn is_healer(&self) -> bool {
        self.flags.contains(StatusFlags::HEALER)
    }

    /// True while a `Shielded` elite's damage-reduction window is running.
    #[must_use]
    pub fn shield_active(&self) -> bool {
        self.affix == Some(EliteAffix::Shielded) && self.shield_timer > 0.0
    }

    /// Reduces hp by `amount`, clamped to zero.
    ///
    /// Returns `true` when this hit was lethal: hp reached 0 and the
    /// combatant transitioned to incapacitated. A combatant that was already
    /// incapacitated absorbs nothing and the call reports `false`.
    pub fn apply_damage(&mut self, amount: i32) -> bool {
        if self.is_incapacitated() || amount <= 0 {
            return false;
        }
        self.hp = (self.hp - amount).max(0);
        if self.hp == 0 {
            self.flags.insert(StatusFlags::INCAPACITATED);
            self.regen_timer = 0.0;
            return true;
        }
        false
    }

    /// Raises hp by `amount`, clamped to `max_hp`.
    ///
    /// Returns `true` if the heal brought hp up to `max_hp`. A no-op for
    /// non-positive amounts or a combatant already at full.
    pub fn apply_heal(&mut self, amount: i32) -> bool {
        if amount <= 0 || self.hp >= self.max_hp {
            return false;
        }
        self.hp = (self.hp + amount).min(self.max_hp);
        self.hp == self.max_hp
    }

    /// Starts (or refreshes) the stun countdown.
    pub fn stun(&mut self, duration: f32) {
        self.stun_timer = self.stun_timer.max(duration);
        self.flags.insert(StatusFlags::STUNNED);
    }

    /// Clears incapacitation after a full passive regeneration.
    pub fn revive(&mut self) {
        self.flags.remove(StatusFlags::INCAPACITATED);
        self.regen_timer = 0.0;
        self.attack_timer = self.attack_interval;
    }
}
