//! Per-combatant state machine: the tick behavior of a single entity.
//!
//! States: `Active` → `Incapacitated` (hp reaches 0) → `Active` again after
//! full passive regeneration (heroes only; enemies are swept instead). A
//! stun countdown suspends attacks and skills without suspending
//! regeneration.
//!
//! The encounter director drives these functions once per combatant per
//! tick. None of them removes anything from the registry; removal is the
//! director's mark-then-sweep job.

use rand::Rng;

use crate::combatant::{Combatant, CombatantId, Faction, StatusFlags};
use crate::config::TuningConfig;
use crate::events::{AudioCue, EventQueue, Notification, ParticleKind};
use crate::registry::Battlefield;
use crate::resolver::{self, ModifierSnapshot};
use crate::targeting;

/// Advances the stun and shield countdowns.
///
/// The stunned flag clears the moment its countdown elapses.
pub fn tick_status_timers(combatant: &mut Combatant, delta: f32) {
    if combatant.stun_timer > 0.0 {
        combatant.stun_timer = (combatant.stun_timer - delta).max(0.0);
        if combatant.stun_timer <= 0.0 {
            combatant.flags.remove(StatusFlags::STUNNED);
        }
    }
    if combatant.shield_timer > 0.0 {
        combatant.shield_timer = (combatant.shield_timer - delta).max(0.0);
    }
}

/// Advances passive regeneration for an incapacitated hero.
///
/// Each full regeneration interval restores a fraction of max hp. Reaching
/// max hp transitions the hero back to `Active` — exactly once, reported by
/// the return value. No attacks or skills execute in this state.
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
pub fn tick_incapacitated_hero(
    combatant: &mut Combatant,
    delta: f32,
    config: &TuningConfig,
) -> bool {
    combatant.regen_timer += delta;
    while combatant.regen_timer >= config.regen_interval {
        combatant.regen_timer -= config.regen_interval;
        let pulse = ((combatant.max_hp as f32 * config.regen_fraction).floor() as i32).max(1);
        combatant.hp = (combatant.hp + pulse).min(combatant.max_hp);
        if combatant.hp >= combatant.max_hp {
            combatant.revive();
            return true;
        }
    }
    false
}

/// Runs one tick of active combat behavior for a combatant.
///
/// Regular combatants advance their attack countdown and, once it elapses
/// with a hostile target inside attack range, strike and reset the
/// countdown to their attack interval. With no target in range the
/// countdown stays elapsed so the strike lands the moment a target closes.
///
/// Healer-flagged combatants instead run a fixed-interval heal pulse at
/// their most wounded ally, independent of the attack gate.
///
/// Incapacitated or stunned combatants do nothing here; the function
/// short-circuits on zombie ids.
pub fn tick_combat_action(
    battlefield: &mut Battlefield,
    id: CombatantId,
    delta: f32,
    config: &TuningConfig,
    mods: &ModifierSnapshot,
    rng: &mut impl Rng,
    events: &mut EventQueue,
) {
    let (faction, healer) = match battlefield.get(id) {
        Some(c) if c.can_act() => (c.faction, c.is_healer()),
        _ => return,
    };

    if healer {
        heal_pulse(battlefield, id, delta, config, events);
        return;
    }

    let (position, range, attack, interval) = {
        let Some(c) = battlefield.get_mut(id) else {
            return;
        };
        c.attack_timer = (c.attack_timer - delta).max(0.0);
        if c.attack_timer > 0.0 {
            return;
        }
        (c.position, c.range, c.effective_attack(), c.attack_interval)
    };

    let Some(target) = targeting::nearest_hostile(battlefield, id) else {
        return;
    };
    let Some(target_position) = battlefield.get(target).map(|c| c.position) else {
        return;
    };
    if position.distance(target_position) > range {
        return;
    }

    let struck = match faction {
        Faction::Hero => {
            let outcome =
                resolver::strike_enemy(battlefield, target, attack, config, mods, rng);
            if outcome.is_some() {
                events.push(Notification::Audio(AudioCue::EnemyHit));
                events.push(Notification::Particles {
                    position: target_position,
                    kind: ParticleKind::Slash,
                });
            }
            outcome.is_some()
        }
        Faction::Enemy => {
            let outcome = resolver::strike_hero(battlefield, id, target, config, mods);
            if let Some(outcome) = outcome {
                if outcome.lethal {
                    events.push(Notification::HeroDowned { id: target });
                    events.push(Notification::Audio(AudioCue::HeroDown));
                }
            }
            outcome.is_some()
        }
    };

    if struck {
        if let Some(c) = battlefield.get_mut(id) {
            c.attack_timer = interval;
        }
    }
}

fn heal_pulse(
    battlefield: &mut Battlefield,
    id: CombatantId,
    delta: f32,
    config: &TuningConfig,
    events: &mut EventQueue,
) {
    let power = {
        let Some(c) = battlefield.get_mut(id) else {
            return;
        };
        c.heal_timer -= delta;
        if c.heal_timer > 0.0 {
            return;
        }
        c.heal_timer = config.heal_pulse_interval;
        c.effective_attack()
    };

    let Some(target) = targeting::most_wounded_ally(battlefield, id) else {
        return;
    };
    let restored = resolver::heal(battlefield, target, power);
    if restored > 0 {
        if let Some(position) = battlefield.get(target).map(|c| c.position) {
            events.push(Notification::Particles {
                position,
                kind: ParticleKind::Heal,
            });
        }
    }
}
