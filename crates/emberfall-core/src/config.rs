//! Balance tuning values for the combat core.
//!
//! Every numeric constant the simulation depends on lives in
//! [`TuningConfig`], so tests can instantiate isolated variations and
//! downstream tooling can load overrides from data. The `Default` impl
//! carries the reference balance.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A tuning value was outside its legal range.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    /// A probability field must lie in `[0, 1]`.
    #[error("{field} must be a probability in [0, 1], got {value}")]
    Probability {
        /// Name of the offending field.
        field: &'static str,
        /// The rejected value.
        value: f32,
    },
    /// A scalar field must be strictly positive.
    #[error("{field} must be positive, got {value}")]
    NonPositive {
        /// Name of the offending field.
        field: &'static str,
        /// The rejected value.
        value: f32,
    },
}

/// Per-class skill cooldowns, in ticks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SkillCooldowns {
    /// Vanguard's stunning blow.
    pub vanguard: f32,
    /// Arcanist's cataclysm.
    pub arcanist: f32,
    /// Marksman's volley.
    pub marksman: f32,
    /// Cleric's radiance.
    pub cleric: f32,
    /// Sentinel's bulwark.
    pub sentinel: f32,
}

impl Default for SkillCooldowns {
    fn default() -> Self {
        Self {
            vanguard: 480.0,
            arcanist: 720.0,
            marksman: 600.0,
            cleric: 540.0,
            sentinel: 900.0,
        }
    }
}

/// Balance constants for combat resolution and encounter pacing.
///
/// All durations are expressed in ticks at the reference frame rate
/// (`delta == 1.0` advances one tick).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TuningConfig {
    /// Chance for a hero strike to critically hit.
    pub crit_chance: f32,
    /// Damage multiplier applied on a critical hit.
    pub crit_multiplier: f32,
    /// Chance for a non-boss spawn to be promoted to elite.
    pub elite_chance: f32,
    /// Duration of a `Shielded` elite's damage-reduction window.
    pub shield_window: f32,
    /// Fraction of damage removed while the shield window runs.
    pub shield_reduction: f32,
    /// Fraction of dealt damage a `Vampiric` elite heals back.
    pub vampiric_ratio: f32,
    /// Ticks between enemy spawns.
    pub spawn_interval: f32,
    /// Pause after a wave clears, during which nothing spawns.
    pub transition_window: f32,
    /// Stun duration applied by the stunning blow.
    pub stun_duration: f32,
    /// Duration of the party-wide damage-reduction window.
    pub guard_window: f32,
    /// Fraction by which hero damage taken is scaled during the guard
    /// window.
    pub guard_reduction: f32,
    /// Ticks between passive-regeneration pulses while incapacitated.
    pub regen_interval: f32,
    /// Fraction of max hp restored per regeneration pulse.
    pub regen_fraction: f32,
    /// Ticks between healer heal pulses.
    pub heal_pulse_interval: f32,
    /// Number of targets struck by the Marksman's volley.
    pub volley_targets: usize,
    /// Enemy base hp before zone scaling.
    pub enemy_base_hp: i32,
    /// Enemy base attack before zone scaling.
    pub enemy_base_attack: i32,
    /// Enemy base defense before zone scaling.
    pub enemy_base_defense: i32,
    /// Per-zone geometric stat scaling factor.
    pub zone_scaling: f32,
    /// Base gold reward for a regular enemy, before zone scaling.
    pub enemy_gold_reward: u64,
    /// Base xp reward for a regular enemy, before zone scaling.
    pub enemy_xp_reward: u64,
    /// Boss hp multiplier over a regular enemy of the same zone.
    pub boss_hp_multiplier: f32,
    /// Boss attack multiplier over a regular enemy of the same zone.
    pub boss_attack_multiplier: f32,
    /// Boss gold multiplier over a regular enemy of the same zone.
    pub boss_gold_multiplier: f32,
    /// Boss xp multiplier over a regular enemy of the same zone.
    pub boss_xp_multiplier: f32,
    /// Melee attack range.
    pub melee_range: f32,
    /// Ranged and healer attack range.
    pub ranged_range: f32,
    /// Ticks between enemy auto-attacks.
    pub enemy_attack_interval: f32,
    /// Distance from origin past which an enemy is culled as
    /// out-of-bounds.
    pub play_bounds: f32,
    /// X offset at which enemies spawn.
    pub spawn_distance: f32,
    /// Half-height of the lane enemies spawn across.
    pub spawn_lane: f32,
    /// Base gold bonus for clearing a zone, multiplied by the zone
    /// number.
    pub zone_clear_gold: u64,
    /// Per-class skill cooldowns.
    pub skill_cooldowns: SkillCooldowns,
}

impl Default for TuningConfig {
    fn default() -> Self {
        Self {
            crit_chance: 0.10,
            crit_multiplier: 2.0,
            elite_chance: 0.10,
            shield_window: 600.0,
            shield_reduction: 0.5,
            vampiric_ratio: 0.30,
            spawn_interval: 90.0,
            transition_window: 120.0,
            stun_duration: 120.0,
            guard_window: 240.0,
            guard_reduction: 0.5,
            regen_interval: 180.0,
            regen_fraction: 0.05,
            heal_pulse_interval: 150.0,
            volley_targets: 3,
            enemy_base_hp: 30,
            enemy_base_attack: 6,
            enemy_base_defense: 2,
            zone_scaling: 1.25,
            enemy_gold_reward: 10,
            enemy_xp_reward: 5,
            boss_hp_multiplier: 8.0,
            boss_attack_multiplier: 2.0,
            boss_gold_multiplier: 10.0,
            boss_xp_multiplier: 5.0,
            melee_range: 60.0,
            ranged_range: 240.0,
            enemy_attack_interval: 120.0,
            play_bounds: 2_000.0,
            spawn_distance: 400.0,
            spawn_lane: 120.0,
            zone_clear_gold: 100,
            skill_cooldowns: SkillCooldowns::default(),
        }
    }
}

impl TuningConfig {
    /// Checks every field against its legal range.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found, in field-declaration order.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("crit_chance", self.crit_chance),
            ("elite_chance", self.elite_chance),
            ("shield_reduction", self.shield_reduction),
            ("vampiric_ratio", self.vampiric_ratio),
            ("guard_reduction", self.guard_reduction),
            ("regen_fraction", self.regen_fraction),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Probability { field, value });
            }
        }

        #[allow(clippy::cast_precision_loss)]
        let positives = [
            ("crit_multiplier", self.crit_multiplier),
            ("spawn_interval", self.spawn_interval),
            ("transition_window", self.transition_window),
            ("stun_duration", self.stun_duration),
            ("regen_interval", self.regen_interval),
            ("heal_pulse_interval", self.heal_pulse_interval),
            ("zone_scaling", self.zone_scaling),
            ("enemy_attack_interval", self.enemy_attack_interval),
            ("play_bounds", self.play_bounds),
            ("enemy_base_hp", self.enemy_base_hp as f32),
        ];
        for (field, value) in positives {
            if value <= 0.0 {
                return Err(ConfigError::NonPositive { field, value });
            }
        }

        Ok(())
    }
}
