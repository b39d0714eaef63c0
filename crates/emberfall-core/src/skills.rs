//! Class skills and their cooldown controller.
//!
//! Each hero carries one [`SkillState`]: a delta-driven cooldown countdown
//! bound to a [`SkillKind`]. The encounter director ticks the countdown and,
//! when it reaches zero and the hero may act, invokes [`execute`].
//!
//! # Cooldown contract
//!
//! A cast that found a valid target resets the countdown to its maximum. A
//! cast that found nothing to do leaves the countdown at zero, so the skill
//! retries on the next tick instead of wasting a full cooldown.
//!
//! Skill effects are deterministic given their inputs; the only randomness
//! is the volley's target selection, which samples distinct indices without
//! replacement from the seeded encounter RNG.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::combatant::{CombatantId, Faction, HeroClass};
use crate::config::TuningConfig;
use crate::events::{AudioCue, EventQueue, Notification, ParticleKind};
use crate::registry::Battlefield;
use crate::resolver::{self, ModifierSnapshot};
use crate::targeting;

/// Base-attack multiplier for the stunning blow.
const STUNNING_BLOW_SCALE: f32 = 2.0;
/// Base-attack multiplier for each cataclysm hit.
const CATACLYSM_SCALE: f32 = 1.4;
/// Base-attack multiplier for each volley arrow.
const VOLLEY_SCALE: f32 = 1.2;
/// Base-attack multiplier for the radiance heal per hero.
const RADIANCE_SCALE: f32 = 1.5;

/// The five class skills.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SkillKind {
    /// Heavy single strike that also stuns (Vanguard).
    StunningBlow,
    /// One strike against every active enemy (Arcanist).
    Cataclysm,
    /// Burst against several random distinct enemies (Marksman).
    Volley,
    /// Party-wide heal of every wounded hero (Cleric).
    Radiance,
    /// Opens the party-wide damage-reduction window (Sentinel).
    Bulwark,
}

impl SkillKind {
    /// The skill bound to a hero class.
    #[must_use]
    pub const fn for_class(class: HeroClass) -> Self {
        match class {
            HeroClass::Vanguard => Self::StunningBlow,
            HeroClass::Arcanist => Self::Cataclysm,
            HeroClass::Marksman => Self::Volley,
            HeroClass::Cleric => Self::Radiance,
            HeroClass::Sentinel => Self::Bulwark,
        }
    }

    /// Configured cooldown for this skill.
    #[must_use]
    pub fn cooldown(self, config: &TuningConfig) -> f32 {
        let cd = &config.skill_cooldowns;
        match self {
            Self::StunningBlow => cd.vanguard,
            Self::Cataclysm => cd.arcanist,
            Self::Volley => cd.marksman,
            Self::Radiance => cd.cleric,
            Self::Bulwark => cd.sentinel,
        }
    }
}

/// Per-hero cooldown state for the bound skill.
///
/// The countdown is monotonically non-increasing between casts and is reset
/// to `max` only immediately after a successful cast.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SkillState {
    /// Which skill is bound.
    pub kind: SkillKind,
    /// Remaining countdown; the skill is ready at 0.
    pub remaining: f32,
    /// Countdown value restored after a successful cast.
    pub max: f32,
}

impl SkillState {
    /// Creates a skill state starting on full cooldown.
    #[must_use]
    pub fn new(kind: SkillKind, cooldown: f32) -> Self {
        Self {
            kind,
            remaining: cooldown,
            max: cooldown,
        }
    }

    /// Advances the countdown, clamping at zero.
    pub fn tick(&mut self, delta: f32) {
        self.remaining = (self.remaining - delta).max(0.0);
    }

    /// True when the countdown has elapsed.
    #[must_use]
    pub fn ready(&self) -> bool {
        self.remaining <= 0.0
    }

    /// Restores the full cooldown after a successful cast.
    pub fn reset(&mut self) {
        self.remaining = self.max;
    }
}

/// What a cast attempt amounted to.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CastOutcome {
    /// No valid target or action; the cooldown must not reset.
    NoTarget,
    /// The effect ran to completion.
    Done,
    /// The bulwark asked the director to open the party guard window.
    GuardRaised,
}

#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
fn scaled(attack: i32, scale: f32) -> i32 {
    ((attack as f32 * scale).floor() as i32).max(1)
}

/// Executes one skill on behalf of `caster`.
///
/// The director has already verified the caster may act; the checks here
/// only short-circuit zombie references.
pub fn execute(
    kind: SkillKind,
    caster: CombatantId,
    battlefield: &mut Battlefield,
    config: &TuningConfig,
    mods: &ModifierSnapshot,
    rng: &mut impl Rng,
    events: &mut EventQueue,
) -> CastOutcome {
    let Some(c) = battlefield.get(caster) else {
        return CastOutcome::NoTarget;
    };
    if !c.can_act() {
        return CastOutcome::NoTarget;
    }
    let attack = c.effective_attack();

    let outcome = match kind {
        SkillKind::StunningBlow => stunning_blow(caster, attack, battlefield, config, mods, rng),
        SkillKind::Cataclysm => cataclysm(attack, battlefield, config, mods, rng, events),
        SkillKind::Volley => volley(attack, battlefield, config, mods, rng),
        SkillKind::Radiance => radiance(attack, battlefield, events),
        SkillKind::Bulwark => bulwark(battlefield),
    };

    if outcome != CastOutcome::NoTarget {
        events.push(Notification::SkillCast { caster, kind });
        events.push(Notification::Audio(AudioCue::SkillCast));
    }
    outcome
}

fn stunning_blow(
    caster: CombatantId,
    attack: i32,
    battlefield: &mut Battlefield,
    config: &TuningConfig,
    mods: &ModifierSnapshot,
    rng: &mut impl Rng,
) -> CastOutcome {
    let Some(target) = targeting::nearest_hostile(battlefield, caster) else {
        return CastOutcome::NoTarget;
    };

    let outcome = resolver::strike_enemy(
        battlefield,
        target,
        scaled(attack, STUNNING_BLOW_SCALE),
        config,
        mods,
        rng,
    );
    if outcome.is_none() {
        return CastOutcome::NoTarget;
    }

    // A lethal blow leaves nothing to stun.
    if let Some(t) = battlefield.get_mut(target) {
        if !t.is_incapacitated() {
            t.stun(config.stun_duration);
        }
    }
    CastOutcome::Done
}

fn cataclysm(
    attack: i32,
    battlefield: &mut Battlefield,
    config: &TuningConfig,
    mods: &ModifierSnapshot,
    rng: &mut impl Rng,
    events: &mut EventQueue,
) -> CastOutcome {
    let targets: Vec<CombatantId> = battlefield
        .iter()
        .filter(|(_, c)| c.faction == Faction::Enemy && !c.is_incapacitated())
        .map(|(id, _)| id)
        .collect();
    if targets.is_empty() {
        return CastOutcome::NoTarget;
    }

    let amount = scaled(attack, CATACLYSM_SCALE);
    for target in targets {
        if let Some(position) = battlefield.get(target).map(|c| c.position) {
            resolver::strike_enemy(battlefield, target, amount, config, mods, rng);
            events.push(Notification::Particles {
                position,
                kind: ParticleKind::Explosion,
            });
        }
    }
    CastOutcome::Done
}

fn volley(
    attack: i32,
    battlefield: &mut Battlefield,
    config: &TuningConfig,
    mods: &ModifierSnapshot,
    rng: &mut impl Rng,
) -> CastOutcome {
    let candidates: Vec<CombatantId> = battlefield
        .iter()
        .filter(|(_, c)| c.faction == Faction::Enemy && !c.is_incapacitated())
        .map(|(id, _)| id)
        .collect();
    if candidates.is_empty() {
        return CastOutcome::NoTarget;
    }

    // Distinct targets, sampled without replacement.
    let count = config.volley_targets.min(candidates.len());
    let picks = rand::seq::index::sample(rng, candidates.len(), count);

    let amount = scaled(attack, VOLLEY_SCALE);
    for index in picks {
        resolver::strike_enemy(battlefield, candidates[index], amount, config, mods, rng);
    }
    CastOutcome::Done
}

fn radiance(
    attack: i32,
    battlefield: &mut Battlefield,
    events: &mut EventQueue,
) -> CastOutcome {
    let wounded: Vec<CombatantId> = battlefield
        .iter()
        .filter(|(_, c)| {
            c.faction == Faction::Hero && !c.is_incapacitated() && c.hp < c.max_hp
        })
        .map(|(id, _)| id)
        .collect();
    if wounded.is_empty() {
        return CastOutcome::NoTarget;
    }

    let amount = scaled(attack, RADIANCE_SCALE);
    for hero in wounded {
        let restored = resolver::heal(battlefield, hero, amount);
        if restored > 0 {
            if let Some(position) = battlefield.get(hero).map(|c| c.position) {
                events.push(Notification::Particles {
                    position,
                    kind: ParticleKind::Heal,
                });
            }
        }
    }
    CastOutcome::Done
}

fn bulwark(battlefield: &Battlefield) -> CastOutcome {
    // Raising the guard with nothing attacking would waste the window.
    if battlefield.active_count(Faction::Enemy) == 0 {
        return CastOutcome::NoTarget;
    }
    CastOutcome::GuardRaised
}
