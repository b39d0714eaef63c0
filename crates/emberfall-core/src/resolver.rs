//! Damage and heal resolution.
//!
//! Pure combat math plus the helpers that apply outcomes to the battlefield.
//! Both strike paths share the same skeleton — modifier, half-defense
//! subtraction, floor, minimum of 1 — and differ in the modifiers layered on
//! top:
//!
//! - [`strike_enemy`] (hero attacks): event attack multiplier, critical
//!   roll, elite shield reduction.
//! - [`strike_hero`] (enemy attacks): berserker scaling, event defense
//!   divisor, party guard window, vampiric lifesteal.
//!
//! # Failure semantics
//!
//! Resolving against a missing or already-incapacitated target is a no-op
//! returning `None`, never an error. A "zombie" id left in some collection
//! this tick short-circuits here.

use rand::Rng;

use crate::combatant::{CombatantId, EliteAffix};
use crate::config::TuningConfig;
use crate::registry::Battlefield;

/// Read-once snapshot of the external multipliers relevant to one strike.
///
/// Built at the moment of use from the [`ModifierSource`] collaborator plus
/// the director's guard-window state; never cached across a tick.
///
/// [`ModifierSource`]: crate::hooks::ModifierSource
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModifierSnapshot {
    /// Multiplier on hero strike damage (event buff).
    pub attack_multiplier: f32,
    /// Divisor on enemy strike damage (event buff, damage reduction).
    pub defense_multiplier: f32,
    /// Scale on hero damage taken; below 1.0 while the party guard window
    /// is open.
    pub damage_taken_scale: f32,
}

impl Default for ModifierSnapshot {
    fn default() -> Self {
        Self {
            attack_multiplier: 1.0,
            defense_multiplier: 1.0,
            damage_taken_scale: 1.0,
        }
    }
}

/// Result of a resolved strike.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HitOutcome {
    /// Final damage applied, always `>= 1`.
    pub damage: i32,
    /// The critical roll succeeded.
    pub crit: bool,
    /// The target's hp reached 0 on this hit.
    pub lethal: bool,
}

#[allow(clippy::cast_possible_truncation)]
fn floor_min_one(value: f32) -> i32 {
    (value.floor() as i32).max(1)
}

/// Resolves a hero-side strike against an enemy.
///
/// Pipeline: `base_amount` × event attack multiplier, minus half the
/// defender's effective defense, floored and clamped to at least 1; an
/// independent critical roll then multiplies the result, and the elite
/// shield reduction (halved, floored, minimum 1) applies last, only while
/// the defender's shield window is still running.
///
/// Returns `None` without touching anything if the defender is missing or
/// already incapacitated.
#[allow(clippy::cast_precision_loss)]
pub fn strike_enemy(
    battlefield: &mut Battlefield,
    defender: CombatantId,
    base_amount: i32,
    config: &TuningConfig,
    mods: &ModifierSnapshot,
    rng: &mut impl Rng,
) -> Option<HitOutcome> {
    let target = battlefield.get(defender)?;
    if target.is_incapacitated() {
        return None;
    }

    let raw = base_amount as f32 * mods.attack_multiplier
        - target.effective_defense() as f32 * 0.5;
    let mut damage = floor_min_one(raw);

    let crit = rng.gen_bool(f64::from(config.crit_chance));
    if crit {
        damage = floor_min_one(damage as f32 * config.crit_multiplier);
    }

    if target.shield_active() {
        damage = floor_min_one(damage as f32 * (1.0 - config.shield_reduction));
    }

    let lethal = battlefield
        .get_mut(defender)
        .is_some_and(|t| t.apply_damage(damage));

    Some(HitOutcome {
        damage,
        crit,
        lethal,
    })
}

/// Resolves an enemy-side strike against a hero.
///
/// A `Berserker` attacker scales its base by `1 + (1 - hp/max_hp)` of its
/// own remaining health. The event defense multiplier divides the result,
/// modeling damage reduction, before the half-defense subtraction, floor,
/// and minimum of 1. The party guard window scales the final figure down
/// while open. No critical roll on this path. A `Vampiric` attacker heals
/// for a fraction of the damage actually dealt.
///
/// Returns `None` without touching anything if the attacker or defender is
/// missing or incapacitated.
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
pub fn strike_hero(
    battlefield: &mut Battlefield,
    attacker: CombatantId,
    defender: CombatantId,
    config: &TuningConfig,
    mods: &ModifierSnapshot,
) -> Option<HitOutcome> {
    let (base, vampiric) = {
        let a = battlefield.get(attacker)?;
        if a.is_incapacitated() {
            return None;
        }
        let mut base = a.effective_attack() as f32;
        if a.affix == Some(EliteAffix::Berserker) {
            base *= 1.0 + (1.0 - a.health_ratio());
        }
        (base, a.affix == Some(EliteAffix::Vampiric))
    };

    let defense = {
        let d = battlefield.get(defender)?;
        if d.is_incapacitated() {
            return None;
        }
        d.effective_defense()
    };

    let raw = base / mods.defense_multiplier - defense as f32 * 0.5;
    let mut damage = floor_min_one(raw);
    if mods.damage_taken_scale < 1.0 {
        damage = floor_min_one(damage as f32 * mods.damage_taken_scale);
    }

    let lethal = battlefield
        .get_mut(defender)
        .is_some_and(|d| d.apply_damage(damage));

    if vampiric {
        let restored = (damage as f32 * config.vampiric_ratio).floor() as i32;
        if restored > 0 {
            if let Some(a) = battlefield.get_mut(attacker) {
                a.apply_heal(restored);
            }
        }
    }

    Some(HitOutcome {
        damage,
        crit: false,
        lethal,
    })
}

/// Heals a combatant, clamping at max hp.
///
/// Returns the amount actually restored. A no-op (returning 0) when the
/// target is missing, incapacitated, or already at full.
pub fn heal(battlefield: &mut Battlefield, target: CombatantId, amount: i32) -> i32 {
    let Some(t) = battlefield.get_mut(target) else {
        return 0;
    };
    if t.is_incapacitated() || amount <= 0 {
        return 0;
    }
    let before = t.hp;
    t.apply_heal(amount);
    t.hp - before
}
