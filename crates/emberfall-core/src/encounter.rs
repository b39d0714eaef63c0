//! Encounter orchestration: the wave/zone state machine.
//!
//! The [`EncounterDirector`] drives everything that happens between an
//! external per-frame tick and the battlefield registry:
//!
//! 1. **Phase machine**: `Spawning` accumulates the spawn timer and places
//!    enemies (or the single boss); `Transitioning` is the pause after a
//!    wave clears, during which nothing spawns; `Idle` is the
//!    parked state after construction or a reset.
//! 2. **Combatant updates**: every hero, then every enemy, advances through
//!    the per-combatant state machine. Skill cooldowns tick and auto-cast
//!    here.
//! 3. **Mark-then-sweep removal**: enemies at 0 hp or far outside the play
//!    bounds are collected during the scan and removed only after it
//!    completes, each removal distributing rewards exactly once. Nothing is
//!    ever removed from the collection being iterated.
//! 4. **Wave bookkeeping**: kill-target detection, the transition pause,
//!    wave advancement, and zone-clear rewards when the wave counter wraps.
//!
//! # Determinism
//!
//! The director owns a `ChaCha8Rng` seeded at construction. Given the same
//! seed, configuration, and tick inputs, an encounter replays identically.
//!
//! # Mutation discipline
//!
//! The director is the only writer of the battlefield during a tick.
//! External collaborators arrive as a [`TickContext`] of narrow trait
//! handles; multiplier values are read at the moment of use, never cached.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::combatant::{
    Combatant, CombatantId, EliteAffix, EnemyKind, Faction, HeroSpec, StatusFlags,
};
use crate::config::TuningConfig;
use crate::events::{
    AudioCue, EventQueue, NarrativeEvent, Notification, ParticleKind, ProgressSnapshot,
    RemovalCause,
};
use crate::hooks::{LootTable, LootTier, ModifierSource, ResourceLedger};
use crate::lifecycle;
use crate::registry::Battlefield;
use crate::resolver::ModifierSnapshot;
use crate::skills::{self, CastOutcome, SkillKind, SkillState};

/// Ranged enemies trade damage for reach.
const RANGED_ATTACK_SCALE: f32 = 0.8;
/// Healer enemies use their attack stat as heal power.
const HEALER_POWER_SCALE: f32 = 0.7;

/// Phase of the encounter state machine.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EncounterPhase {
    /// Parked: freshly constructed or after a reset.
    Idle,
    /// Normal operation: the spawn timer runs.
    Spawning,
    /// Post-clear pause: no spawning until the countdown elapses.
    Transitioning,
}

/// Wave and zone progression state, owned by the external game-state
/// collaborator and advanced by the director on wave clear.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaveProgress {
    /// Current zone, 1-based.
    pub zone: u32,
    /// Current wave within the zone, 1-based.
    pub wave: u32,
    /// Waves per zone; the final wave is the boss wave.
    pub waves_per_zone: u32,
    /// Kill target for a regular wave.
    pub enemies_per_wave: u32,
    /// Kills recorded this wave.
    pub killed_this_wave: u32,
}

impl WaveProgress {
    /// Starts at zone 1, wave 1, with no kills.
    #[must_use]
    pub fn new(enemies_per_wave: u32, waves_per_zone: u32) -> Self {
        Self {
            zone: 1,
            wave: 1,
            waves_per_zone,
            enemies_per_wave,
            killed_this_wave: 0,
        }
    }

    /// True on the final wave of a zone: exactly one much stronger enemy.
    #[must_use]
    pub fn is_boss_wave(&self) -> bool {
        self.wave >= self.waves_per_zone
    }

    /// True once this wave's kill target is satisfied.
    #[must_use]
    pub fn kill_target_met(&self) -> bool {
        let target = if self.is_boss_wave() {
            1
        } else {
            self.enemies_per_wave
        };
        self.killed_this_wave >= target
    }

    /// Records one kill.
    pub fn record_kill(&mut self) {
        self.killed_this_wave += 1;
    }

    /// Advances to the next wave, resetting the kill count.
    ///
    /// Returns `true` when the wave counter wrapped back to 1, meaning a
    /// new zone begins.
    pub fn advance_wave(&mut self) -> bool {
        self.killed_this_wave = 0;
        if self.wave >= self.waves_per_zone {
            self.wave = 1;
            self.zone += 1;
            true
        } else {
            self.wave += 1;
            false
        }
    }
}

/// External collaborators handed to each tick.
pub struct TickContext<'a> {
    /// Wave/zone progression, advanced by the director on clear.
    pub wave: &'a mut WaveProgress,
    /// Read-only numeric multipliers.
    pub modifiers: &'a dyn ModifierSource,
    /// Loot collaborator queried on kills.
    pub loot: &'a mut dyn LootTable,
    /// Resource collaborator credited with rewards.
    pub ledger: &'a mut dyn ResourceLedger,
}

/// Hero vital signs for the external party store's per-tick read-back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeroVitals {
    /// The hero's id.
    pub id: CombatantId,
    /// Current hp.
    pub hp: i32,
    /// Maximum hp.
    pub max_hp: i32,
    /// Currently regenerating instead of fighting.
    pub incapacitated: bool,
}

/// The encounter orchestrator.
///
/// Constructed once with a seed and tuning values and passed by reference
/// wherever it is needed — there is no global instance, so tests
/// instantiate isolated directors freely.
#[derive(Debug)]
pub struct EncounterDirector {
    battlefield: Battlefield,
    config: TuningConfig,
    phase: EncounterPhase,
    spawn_timer: f32,
    transition_timer: f32,
    guard_timer: f32,
    rng: ChaCha8Rng,
    events: EventQueue,
    seed: u64,
    total_kills: u64,
    wipe_announced: bool,
}

impl EncounterDirector {
    /// Creates a director with the reference tuning.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self::with_config(seed, TuningConfig::default())
    }

    /// Creates a director with explicit tuning values.
    #[must_use]
    pub fn with_config(seed: u64, config: TuningConfig) -> Self {
        Self {
            battlefield: Battlefield::new(),
            config,
            phase: EncounterPhase::Idle,
            spawn_timer: 0.0,
            transition_timer: 0.0,
            guard_timer: 0.0,
            rng: ChaCha8Rng::seed_from_u64(seed),
            events: EventQueue::new(),
            seed,
            total_kills: 0,
            wipe_announced: false,
        }
    }

    /// The seed this director was constructed with.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Current phase of the wave state machine.
    #[must_use]
    pub fn phase(&self) -> EncounterPhase {
        self.phase
    }

    /// Remaining ticks of the party-wide damage-reduction window.
    #[must_use]
    pub fn guard_remaining(&self) -> f32 {
        self.guard_timer
    }

    /// Total kills recorded since construction or the last reset.
    #[must_use]
    pub fn total_kills(&self) -> u64 {
        self.total_kills
    }

    /// Read access to the live registry.
    #[must_use]
    pub fn battlefield(&self) -> &Battlefield {
        &self.battlefield
    }

    /// Mutable access to the live registry, for scenario setup.
    ///
    /// During a tick the director is the only writer; avoid holding this
    /// across ticks.
    #[must_use]
    pub fn battlefield_mut(&mut self) -> &mut Battlefield {
        &mut self.battlefield
    }

    /// Removes and returns all notifications produced so far.
    pub fn drain_events(&mut self) -> Vec<Notification> {
        self.events.drain()
    }

    /// Read access to the pending notifications.
    #[must_use]
    pub fn events(&self) -> &EventQueue {
        &self.events
    }

    /// Recruits a hero from the party collaborator's spec.
    ///
    /// Attaches the class-bound skill on the configured cooldown.
    pub fn recruit_hero(&mut self, spec: &HeroSpec) -> CombatantId {
        let mut hero = Combatant::hero(spec);
        let kind = SkillKind::for_class(spec.class);
        hero.skill = Some(SkillState::new(kind, kind.cooldown(&self.config)));
        let id = self.battlefield.spawn(hero);
        self.wipe_announced = false;
        debug!(hero = %id, class = ?spec.class, "hero recruited");
        id
    }

    /// Removes a hero from the battlefield (party-store driven).
    ///
    /// A no-op returning `None` for ids that are missing or not heroes.
    pub fn dismiss_hero(&mut self, id: CombatantId) -> Option<Combatant> {
        if self.battlefield.get(id)?.faction != Faction::Hero {
            return None;
        }
        self.battlefield.remove(id)
    }

    /// Hero vitals for the external party store's hp write-back.
    #[must_use]
    pub fn hero_vitals(&self) -> Vec<HeroVitals> {
        self.battlefield
            .iter()
            .filter(|(_, c)| c.faction == Faction::Hero)
            .map(|(id, c)| HeroVitals {
                id,
                hp: c.hp,
                max_hp: c.max_hp,
                incapacitated: c.is_incapacitated(),
            })
            .collect()
    }

    /// Atomically clears both registries and every in-flight timer.
    ///
    /// Called on party wipe or prestige. Runs between ticks by
    /// construction — the core is single-threaded — so it can never
    /// interleave with a partial update.
    pub fn reset(&mut self) {
        self.battlefield.clear();
        self.spawn_timer = 0.0;
        self.transition_timer = 0.0;
        self.guard_timer = 0.0;
        self.phase = EncounterPhase::Idle;
        self.total_kills = 0;
        self.wipe_announced = false;
        debug!("encounter reset");
    }

    /// Advances the encounter by one frame.
    ///
    /// `delta` is the frame-time scalar (1.0 at the reference frame rate),
    /// pre-scaled by any external time multiplier.
    pub fn tick(&mut self, delta: f32, ctx: &mut TickContext<'_>) {
        match self.phase {
            EncounterPhase::Idle => {
                if self.battlefield.active_count(Faction::Hero) > 0
                    && ctx.wave.enemies_per_wave > 0
                {
                    trace!("encounter engaged");
                    self.phase = EncounterPhase::Spawning;
                }
            }
            EncounterPhase::Spawning => self.advance_spawning(delta, ctx),
            EncounterPhase::Transitioning => {
                self.transition_timer -= delta;
                if self.transition_timer <= 0.0 {
                    self.finish_transition(ctx);
                }
            }
        }

        if self.guard_timer > 0.0 {
            self.guard_timer = (self.guard_timer - delta).max(0.0);
        }

        for id in self.battlefield.faction_ids(Faction::Hero) {
            self.update_hero(id, delta, ctx);
        }

        let enemy_ids = self.battlefield.faction_ids(Faction::Enemy);
        for id in &enemy_ids {
            self.update_enemy(*id, delta, ctx);
        }

        // Mark-then-sweep: collect after the scan, never mid-iteration.
        let mut removals: Vec<(CombatantId, RemovalCause)> = Vec::new();
        for id in &enemy_ids {
            if let Some(c) = self.battlefield.get(*id) {
                if c.is_incapacitated() {
                    removals.push((*id, RemovalCause::Slain));
                } else if c.position.length() > self.config.play_bounds {
                    removals.push((*id, RemovalCause::OutOfBounds));
                }
            }
        }
        for (id, cause) in removals {
            self.remove_and_reward(id, cause, ctx);
        }

        if self.phase == EncounterPhase::Spawning
            && ctx.wave.kill_target_met()
            && self.battlefield.faction_count(Faction::Enemy) == 0
        {
            self.begin_transition(ctx);
        }

        self.check_party_wipe();
    }

    /// Multiplier snapshot taken at the moment of use.
    fn snapshot(&self, modifiers: &dyn ModifierSource) -> ModifierSnapshot {
        let defense = modifiers.event_defense_multiplier();
        ModifierSnapshot {
            attack_multiplier: modifiers.event_attack_multiplier(),
            defense_multiplier: if defense > 0.0 { defense } else { 1.0 },
            damage_taken_scale: if self.guard_timer > 0.0 {
                self.config.guard_reduction
            } else {
                1.0
            },
        }
    }

    fn update_hero(&mut self, id: CombatantId, delta: f32, ctx: &TickContext<'_>) {
        let revived = {
            let Some(c) = self.battlefield.get_mut(id) else {
                return;
            };
            lifecycle::tick_status_timers(c, delta);
            if c.is_incapacitated() {
                if !lifecycle::tick_incapacitated_hero(c, delta, &self.config) {
                    return;
                }
                true
            } else {
                false
            }
        };

        if revived {
            self.wipe_announced = false;
            self.events.push(Notification::HeroRevived { id });
            self.events.push(Notification::Audio(AudioCue::HeroRevived));
            return;
        }

        let mods = self.snapshot(ctx.modifiers);
        lifecycle::tick_combat_action(
            &mut self.battlefield,
            id,
            delta,
            &self.config,
            &mods,
            &mut self.rng,
            &mut self.events,
        );
        self.tick_skill(id, delta, ctx);
    }

    fn update_enemy(&mut self, id: CombatantId, delta: f32, ctx: &TickContext<'_>) {
        {
            let Some(c) = self.battlefield.get_mut(id) else {
                return;
            };
            lifecycle::tick_status_timers(c, delta);
            if c.is_incapacitated() {
                // Swept after the scan.
                return;
            }
        }

        let mods = self.snapshot(ctx.modifiers);
        lifecycle::tick_combat_action(
            &mut self.battlefield,
            id,
            delta,
            &self.config,
            &mods,
            &mut self.rng,
            &mut self.events,
        );
    }

    /// Skill controller: ticks the cooldown and auto-casts when ready.
    ///
    /// A successful cast resets the countdown to its maximum; a cast that
    /// found no valid target leaves it at zero for an immediate retry next
    /// tick.
    fn tick_skill(&mut self, id: CombatantId, delta: f32, ctx: &TickContext<'_>) {
        let ready_kind = {
            let Some(c) = self.battlefield.get_mut(id) else {
                return;
            };
            let can_act = c.can_act();
            let Some(skill) = c.skill.as_mut() else {
                return;
            };
            skill.tick(delta);
            (skill.ready() && can_act).then_some(skill.kind)
        };
        let Some(kind) = ready_kind else {
            return;
        };

        let mods = self.snapshot(ctx.modifiers);
        let outcome = skills::execute(
            kind,
            id,
            &mut self.battlefield,
            &self.config,
            &mods,
            &mut self.rng,
            &mut self.events,
        );
        match outcome {
            CastOutcome::NoTarget => {}
            CastOutcome::Done => self.reset_skill(id),
            CastOutcome::GuardRaised => {
                self.guard_timer = self.config.guard_window;
                self.reset_skill(id);
            }
        }
    }

    fn reset_skill(&mut self, id: CombatantId) {
        if let Some(skill) = self
            .battlefield
            .get_mut(id)
            .and_then(|c| c.skill.as_mut())
        {
            skill.reset();
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    fn advance_spawning(&mut self, delta: f32, ctx: &TickContext<'_>) {
        self.spawn_timer += delta;
        if self.spawn_timer < self.config.spawn_interval {
            return;
        }
        self.spawn_timer = 0.0;

        if ctx.wave.is_boss_wave() {
            // The boss spawns exactly once per boss wave: only with no
            // living enemies and zero kills recorded this wave.
            if ctx.wave.killed_this_wave == 0
                && self.battlefield.faction_count(Faction::Enemy) == 0
            {
                self.spawn_boss(ctx);
            }
            return;
        }

        let live = self.battlefield.faction_count(Faction::Enemy) as u32;
        if ctx.wave.killed_this_wave + live < ctx.wave.enemies_per_wave {
            self.spawn_regular(ctx);
        }
    }

    #[allow(clippy::cast_possible_wrap)]
    fn zone_scale(&self, ctx: &TickContext<'_>) -> f32 {
        self.config.zone_scaling.powi(ctx.wave.zone as i32 - 1)
            * ctx.modifiers.ascension_difficulty()
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    fn spawn_regular(&mut self, ctx: &TickContext<'_>) {
        let zone = ctx.wave.zone;
        let scale = self.zone_scale(ctx);

        // Type weighting shifts at the zone-tier thresholds.
        let roll = self.rng.gen_range(0..100_u32);
        let kind = if zone < 3 {
            if roll < 70 {
                EnemyKind::Melee
            } else {
                EnemyKind::Ranged
            }
        } else if zone < 5 {
            if roll < 50 {
                EnemyKind::Melee
            } else if roll < 85 {
                EnemyKind::Ranged
            } else {
                EnemyKind::Healer
            }
        } else if roll < 40 {
            EnemyKind::Melee
        } else if roll < 75 {
            EnemyKind::Ranged
        } else {
            EnemyKind::Healer
        };

        let hp = ((self.config.enemy_base_hp as f32 * scale).floor() as i32).max(1);
        let base_attack = ((self.config.enemy_base_attack as f32 * scale).floor() as i32).max(1);
        let defense = ((self.config.enemy_base_defense as f32 * scale).floor() as i32).max(0);
        let (attack, range) = match kind {
            EnemyKind::Melee => (base_attack, self.config.melee_range),
            EnemyKind::Ranged => (
                ((base_attack as f32 * RANGED_ATTACK_SCALE).floor() as i32).max(1),
                self.config.ranged_range,
            ),
            EnemyKind::Healer => (
                ((base_attack as f32 * HEALER_POWER_SCALE).floor() as i32).max(1),
                self.config.ranged_range,
            ),
        };
        let gold = ((self.config.enemy_gold_reward as f32 * scale).floor() as u64).max(1);
        let xp = ((self.config.enemy_xp_reward as f32 * scale).floor() as u64).max(1);

        let lane = self.config.spawn_lane;
        let position = glam::Vec2::new(
            self.config.spawn_distance,
            self.rng.gen_range(-lane..=lane),
        );

        let mut enemy = Combatant::enemy(
            kind,
            position,
            hp,
            attack,
            defense,
            range,
            self.config.enemy_attack_interval,
            gold,
            xp,
        );

        // Elite promotion is an independent roll on every non-boss spawn.
        if self.rng.gen_bool(f64::from(self.config.elite_chance)) {
            enemy.max_hp *= 2;
            enemy.hp = enemy.max_hp;
            enemy.base_attack *= 2;
            enemy.gold_reward *= 3;
            enemy.xp_reward *= 2;
            enemy.flags.insert(StatusFlags::ELITE);
            enemy.affix = Some(match self.rng.gen_range(0..3_u8) {
                0 => EliteAffix::Vampiric,
                1 => EliteAffix::Shielded,
                _ => EliteAffix::Berserker,
            });
            if enemy.affix == Some(EliteAffix::Shielded) {
                enemy.shield_timer = self.config.shield_window;
            }
        }

        let elite = enemy.is_elite();
        let id = self.battlefield.spawn(enemy);
        debug!(enemy = %id, ?kind, zone, elite, "enemy spawned");
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    fn spawn_boss(&mut self, ctx: &TickContext<'_>) {
        let zone = ctx.wave.zone;
        let scale = self.zone_scale(ctx);
        let hp = ((self.config.enemy_base_hp as f32 * scale * self.config.boss_hp_multiplier)
            .floor() as i32)
            .max(1);
        let attack = ((self.config.enemy_base_attack as f32
            * scale
            * self.config.boss_attack_multiplier)
            .floor() as i32)
            .max(1);
        let defense = ((self.config.enemy_base_defense as f32 * scale).floor() as i32).max(0);
        let gold = ((self.config.enemy_gold_reward as f32
            * scale
            * self.config.boss_gold_multiplier)
            .floor() as u64)
            .max(1);
        let xp = ((self.config.enemy_xp_reward as f32 * scale * self.config.boss_xp_multiplier)
            .floor() as u64)
            .max(1);

        let mut boss = Combatant::enemy(
            EnemyKind::Melee,
            glam::Vec2::new(self.config.spawn_distance, 0.0),
            hp,
            attack,
            defense,
            self.config.melee_range,
            self.config.enemy_attack_interval,
            gold,
            xp,
        );
        boss.kind = None;
        boss.flags.insert(StatusFlags::BOSS);

        let id = self.battlefield.spawn(boss);
        self.events
            .push(Notification::Toast(format!("Zone {zone} boss approaches!")));
        debug!(boss = %id, zone, "boss spawned");
    }

    /// Removes one enemy and distributes its rewards — exactly once, after
    /// the scan that marked it.
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    fn remove_and_reward(
        &mut self,
        id: CombatantId,
        cause: RemovalCause,
        ctx: &mut TickContext<'_>,
    ) {
        // A zombie reference lingering in the mark list short-circuits.
        let Some(fallen) = self.battlefield.remove(id) else {
            return;
        };

        ctx.wave.record_kill();
        self.total_kills += 1;

        let gold = ((fallen.gold_reward as f32) * ctx.modifiers.gold_multiplier()).floor() as u64;
        if gold > 0 {
            ctx.ledger.credit_gold(gold);
        }

        // Xp splits evenly among the heroes still standing.
        let standing: Vec<CombatantId> = self
            .battlefield
            .iter()
            .filter(|(_, c)| c.faction == Faction::Hero && !c.is_incapacitated())
            .map(|(hid, _)| hid)
            .collect();
        if !standing.is_empty() {
            let total = ((fallen.xp_reward as f32) * ctx.modifiers.xp_multiplier()).floor() as u64;
            let share = total / standing.len() as u64;
            if share > 0 {
                for hero in &standing {
                    ctx.ledger.credit_xp(*hero, share);
                }
            }
        }

        if fallen.is_boss() {
            let souls =
                ((f64::from(ctx.wave.zone)) * f64::from(ctx.modifiers.soul_multiplier())).floor()
                    as u64;
            if souls > 0 {
                ctx.ledger.credit_souls(souls);
            }
        }

        // Elite kills roll at least the elite tier; bosses roll twice.
        let tier = if fallen.is_boss() {
            LootTier::Boss
        } else if fallen.is_elite() {
            LootTier::Standard.max(LootTier::Elite)
        } else {
            LootTier::Standard
        };
        let rolls = if fallen.is_boss() { 2 } else { 1 };
        for _ in 0..rolls {
            if let Some(drop) = ctx.loot.roll(tier) {
                self.events.push(Notification::LootDropped { drop });
            }
        }

        // Side effects fire only after the death transition completed.
        self.events.push(Notification::Particles {
            position: fallen.position,
            kind: ParticleKind::Burst,
        });
        self.events.push(Notification::Audio(if fallen.is_boss() {
            AudioCue::BossDown
        } else {
            AudioCue::EnemyDown
        }));
        if fallen.is_boss() {
            self.events
                .push(Notification::Toast("Boss vanquished!".to_string()));
        }
        self.events.push(Notification::EnemyRemoved {
            id,
            cause,
            elite: fallen.is_elite(),
            boss: fallen.is_boss(),
        });

        debug!(enemy = %id, ?cause, boss = fallen.is_boss(), "enemy removed");
    }

    fn begin_transition(&mut self, ctx: &TickContext<'_>) {
        self.phase = EncounterPhase::Transitioning;
        self.transition_timer = self.config.transition_window;
        self.spawn_timer = 0.0;
        // Stragglers cannot survive into the pause.
        self.battlefield.clear_faction(Faction::Enemy);
        self.events.push(Notification::WaveCleared {
            zone: ctx.wave.zone,
            wave: ctx.wave.wave,
        });
        self.events.push(Notification::Audio(AudioCue::WaveCleared));
        debug!(zone = ctx.wave.zone, wave = ctx.wave.wave, "wave cleared");
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    fn finish_transition(&mut self, ctx: &mut TickContext<'_>) {
        let cleared_zone = ctx.wave.zone;
        let new_zone = ctx.wave.advance_wave();

        if new_zone {
            let bonus = ((self.config.zone_clear_gold * u64::from(cleared_zone)) as f32
                * ctx.modifiers.gold_multiplier())
            .floor() as u64;
            if bonus > 0 {
                ctx.ledger.credit_gold(bonus);
            }
            self.events.push(Notification::ZoneCleared {
                zone: cleared_zone,
                bonus_gold: bonus,
            });
            self.events.push(Notification::Audio(AudioCue::ZoneCleared));

            let narrative = match self.rng.gen_range(0..4_u8) {
                0 => NarrativeEvent::WanderingMerchant,
                1 => NarrativeEvent::AncientShrine,
                2 => NarrativeEvent::Windfall,
                _ => NarrativeEvent::RestfulNight,
            };
            self.events.push(Notification::Narrative(narrative));

            if let Some(rate) = ctx.modifiers.gold_interest_rate() {
                let interest = ((ctx.ledger.gold_balance() as f32) * rate).floor() as u64;
                if interest > 0 {
                    ctx.ledger.credit_gold(interest);
                }
            }

            self.events
                .push(Notification::AchievementCheck(ProgressSnapshot {
                    zone: ctx.wave.zone,
                    wave: ctx.wave.wave,
                    total_kills: self.total_kills,
                }));
            debug!(zone = cleared_zone, "zone cleared");
        }

        self.phase = EncounterPhase::Spawning;
        self.spawn_timer = 0.0;
        self.transition_timer = 0.0;
    }

    fn check_party_wipe(&mut self) {
        let heroes = self.battlefield.faction_count(Faction::Hero);
        if heroes == 0 {
            return;
        }
        if self.battlefield.active_count(Faction::Hero) == 0 {
            if !self.wipe_announced {
                self.wipe_announced = true;
                self.events.push(Notification::PartyWiped);
                debug!("party wiped");
            }
        } else {
            self.wipe_announced = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combatant::HeroClass;
    use crate::hooks::{LootDrop, StaticModifiers};
    use glam::Vec2;

    /// Ledger fake that records every credit.
    #[derive(Debug, Default)]
    struct RecordingLedger {
        gold: u64,
        souls: u64,
        xp: Vec<(CombatantId, u64)>,
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

    /// Loot fake: always drops, counting rolls per tier.
    #[derive(Debug, Default)]
    struct CountingLoot {
        rolls: Vec<LootTier>,
    }

    impl LootTable for CountingLoot {
        fn roll(&mut self, tier: LootTier) -> Option<LootDrop> {
            self.rolls.push(tier);
            Some(LootDrop { item: 1, tier })
        }
    }

    struct Harness {
        director: EncounterDirector,
        wave: WaveProgress,
        modifiers: StaticModifiers,
        loot: CountingLoot,
        ledger: RecordingLedger,
    }

    impl Harness {
        fn new(seed: u64) -> Self {
            Self::with_config(seed, TuningConfig::default())
        }

        fn with_config(seed: u64, config: TuningConfig) -> Self {
            Self {
                director: EncounterDirector::with_config(seed, config),
                wave: WaveProgress::new(5, 10),
                modifiers: StaticModifiers::default(),
                loot: CountingLoot::default(),
                ledger: RecordingLedger::default(),
            }
        }

        fn tick(&mut self, delta: f32) {
            let mut ctx = TickContext {
                wave: &mut self.wave,
                modifiers: &self.modifiers,
                loot: &mut self.loot,
                ledger: &mut self.ledger,
            };
            self.director.tick(delta, &mut ctx);
        }

        fn recruit(&mut self, class: HeroClass) -> CombatantId {
            self.director.recruit_hero(&HeroSpec {
                class,
                position: Vec2::ZERO,
                max_hp: 500,
                attack: 40,
                defense: 10,
                range: 600.0,
                attack_interval: 30.0,
            })
        }
    }

    mod wave_progress_tests {
        use super::*;

        #[test]
        fn final_wave_is_boss_wave() {
            let mut wave = WaveProgress::new(5, 10);
            assert!(!wave.is_boss_wave());
            wave.wave = 10;
            assert!(wave.is_boss_wave());
        }

        #[test]
        fn boss_wave_needs_one_kill() {
            let mut wave = WaveProgress::new(5, 10);
            wave.wave = 10;
            assert!(!wave.kill_target_met());
            wave.record_kill();
            assert!(wave.kill_target_met());
        }

        #[test]
        fn advance_wraps_into_next_zone() {
            let mut wave = WaveProgress::new(5, 3);
            assert!(!wave.advance_wave());
            assert!(!wave.advance_wave());
            assert!(wave.advance_wave());
            assert_eq!(wave.zone, 2);
            assert_eq!(wave.wave, 1);
            assert_eq!(wave.killed_this_wave, 0);
        }
    }

    mod phase_tests {
        use super::*;

        #[test]
        fn idle_until_a_hero_stands() {
            let mut h = Harness::new(1);
            h.tick(1.0);
            assert_eq!(h.director.phase(), EncounterPhase::Idle);

            h.recruit(HeroClass::Vanguard);
            h.tick(1.0);
            assert_eq!(h.director.phase(), EncounterPhase::Spawning);
        }

        #[test]
        fn spawn_timer_places_an_enemy() {
            let mut h = Harness::new(1);
            h.recruit(HeroClass::Cleric);
            h.tick(1.0); // engage
            h.tick(TuningConfig::default().spawn_interval);
            assert_eq!(h.director.battlefield().faction_count(Faction::Enemy), 1);
        }

        #[test]
        fn spawning_stops_at_the_wave_cap() {
            let mut h = Harness::new(1);
            h.recruit(HeroClass::Cleric);
            h.tick(1.0);
            for _ in 0..20 {
                h.tick(TuningConfig::default().spawn_interval);
            }
            // killed 0 + alive capped at enemies_per_wave.
            assert_eq!(h.director.battlefield().faction_count(Faction::Enemy), 5);
        }
    }

    mod removal_tests {
        use super::*;

        #[test]
        fn deferred_sweep_rewards_exactly_once() {
            let mut h = Harness::new(1);
            // A Cleric never auto-attacks, keeping the scenario inert.
            h.recruit(HeroClass::Cleric);
            let enemies: Vec<_> = (0..3_i16)
                .map(|i| {
                    h.director.battlefield_mut().spawn(Combatant::enemy(
                        EnemyKind::Melee,
                        Vec2::new(5_000.0, f32::from(i)),
                        30,
                        6,
                        2,
                        60.0,
                        120.0,
                        10,
                        5,
                    ))
                })
                .collect();
            // Enemy #2 is already at zero hp when the scan starts.
            h.director
                .battlefield_mut()
                .get_mut(enemies[1])
                .unwrap()
                .apply_damage(1_000);
            // Out of attack range of the hero; out of play bounds too, but
            // only #2 is dead.
            h.director
                .battlefield_mut()
                .get_mut(enemies[0])
                .unwrap()
                .position = Vec2::new(100.0, 0.0);
            h.director
                .battlefield_mut()
                .get_mut(enemies[2])
                .unwrap()
                .position = Vec2::new(100.0, 10.0);

            h.tick(1.0);

            assert!(!h.director.battlefield().contains(enemies[1]));
            assert!(h.director.battlefield().contains(enemies[0]));
            assert!(h.director.battlefield().contains(enemies[2]));
            assert_eq!(h.wave.killed_this_wave, 1);
            assert_eq!(h.loot.rolls.len(), 1);
        }

        #[test]
        fn out_of_bounds_enemy_is_culled_with_kill_credit() {
            let mut h = Harness::new(1);
            h.recruit(HeroClass::Cleric);
            let runaway = h.director.battlefield_mut().spawn(Combatant::enemy(
                EnemyKind::Melee,
                Vec2::new(9_999.0, 0.0),
                30,
                6,
                2,
                60.0,
                120.0,
                10,
                5,
            ));

            h.tick(1.0);

            assert!(!h.director.battlefield().contains(runaway));
            assert_eq!(h.wave.killed_this_wave, 1);
            let drained = h.director.drain_events();
            assert!(drained.iter().any(|n| matches!(
                n,
                Notification::EnemyRemoved {
                    cause: RemovalCause::OutOfBounds,
                    ..
                }
            )));
        }

        #[test]
        fn rewards_scale_and_split_between_standing_heroes() {
            let mut h = Harness::new(1);
            h.modifiers.gold = 2.0;
            h.modifiers.xp = 2.0;
            let a = h.recruit(HeroClass::Vanguard);
            let b = h.recruit(HeroClass::Cleric);
            h.director.battlefield_mut().spawn({
                let mut e = Combatant::enemy(
                    EnemyKind::Melee,
                    Vec2::new(9_999.0, 0.0),
                    30,
                    6,
                    2,
                    60.0,
                    120.0,
                    10,
                    6,
                );
                e.apply_damage(1_000);
                e
            });

            h.tick(1.0);

            // gold 10 * 2 = 20; xp 6 * 2 = 12 split across two heroes.
            assert_eq!(h.ledger.gold, 20);
            assert_eq!(h.ledger.xp, vec![(a, 6), (b, 6)]);
        }
    }

    mod wave_clear_tests {
        use super::*;

        #[test]
        fn kill_target_enters_transition_and_blocks_spawning() {
            let mut h = Harness::new(1);
            h.recruit(HeroClass::Cleric);
            h.tick(1.0); // engage
            h.wave.killed_this_wave = 5;

            h.tick(1.0);
            assert_eq!(h.director.phase(), EncounterPhase::Transitioning);

            // Accumulate far past the spawn interval: nothing may spawn.
            h.tick(TuningConfig::default().spawn_interval * 1.2);
            assert_eq!(h.director.battlefield().faction_count(Faction::Enemy), 0);
        }

        #[test]
        fn transition_elapses_into_next_wave() {
            let mut h = Harness::new(1);
            h.recruit(HeroClass::Cleric);
            h.tick(1.0);
            h.wave.killed_this_wave = 5;
            h.tick(1.0);

            h.tick(TuningConfig::default().transition_window + 1.0);
            assert_eq!(h.director.phase(), EncounterPhase::Spawning);
            assert_eq!(h.wave.wave, 2);
            assert_eq!(h.wave.killed_this_wave, 0);
        }

        #[test]
        fn zone_wrap_grants_bonus_and_achievement_check() {
            let mut h = Harness::new(1);
            h.recruit(HeroClass::Cleric);
            h.tick(1.0);
            h.wave.wave = 10;
            h.wave.killed_this_wave = 1;
            h.tick(1.0);
            assert_eq!(h.director.phase(), EncounterPhase::Transitioning);

            h.tick(TuningConfig::default().transition_window + 1.0);

            assert_eq!(h.wave.zone, 2);
            assert_eq!(h.wave.wave, 1);
            // zone_clear_gold * zone 1.
            assert_eq!(h.ledger.gold, 100);
            let drained = h.director.drain_events();
            assert!(drained
                .iter()
                .any(|n| matches!(n, Notification::ZoneCleared { zone: 1, .. })));
            assert!(drained
                .iter()
                .any(|n| matches!(n, Notification::Narrative(_))));
            assert!(drained
                .iter()
                .any(|n| matches!(n, Notification::AchievementCheck(_))));
        }

        #[test]
        fn gold_interest_applies_when_unlocked() {
            let mut h = Harness::new(1);
            h.modifiers.interest = Some(0.10);
            h.ledger.gold = 1_000;
            h.recruit(HeroClass::Cleric);
            h.tick(1.0);
            h.wave.wave = 10;
            h.wave.killed_this_wave = 1;
            h.tick(1.0);

            h.tick(TuningConfig::default().transition_window + 1.0);

            // 1000 + 100 bonus, then 10% interest on 1100.
            assert_eq!(h.ledger.gold, 1_210);
        }
    }

    mod boss_tests {
        use super::*;

        fn boss_wave_harness(seed: u64) -> Harness {
            let mut h = Harness::new(seed);
            h.recruit(HeroClass::Cleric);
            h.tick(1.0); // engage
            h.wave.wave = 10;
            h
        }

        #[test]
        fn boss_wave_spawns_exactly_one_boss() {
            let mut h = boss_wave_harness(3);
            for _ in 0..10 {
                h.tick(TuningConfig::default().spawn_interval);
            }

            let bosses = h
                .director
                .battlefield()
                .iter()
                .filter(|(_, c)| c.is_boss())
                .count();
            assert_eq!(bosses, 1);
            assert_eq!(h.director.battlefield().faction_count(Faction::Enemy), 1);
        }

        #[test]
        fn no_second_boss_after_the_kill_this_wave() {
            let mut h = boss_wave_harness(3);
            h.tick(TuningConfig::default().spawn_interval);
            let boss_id = h
                .director
                .battlefield()
                .iter()
                .find(|(_, c)| c.is_boss())
                .map(|(id, _)| id)
                .unwrap();
            h.director
                .battlefield_mut()
                .get_mut(boss_id)
                .unwrap()
                .apply_damage(1_000_000);

            h.tick(1.0); // sweep removes the boss, wave clear fires
            assert_eq!(h.director.phase(), EncounterPhase::Transitioning);
            assert!(h.ledger.souls >= 1);
            assert_eq!(
                h.loot.rolls,
                vec![LootTier::Boss, LootTier::Boss],
                "boss rolls loot twice"
            );

            h.tick(TuningConfig::default().transition_window + 1.0);
            assert_eq!(h.wave.zone, 2);
            assert_eq!(h.wave.killed_this_wave, 0);
        }

        #[test]
        fn boss_stats_scale_from_zone_base() {
            let mut h = boss_wave_harness(3);
            h.tick(TuningConfig::default().spawn_interval);
            let (_, boss) = h
                .director
                .battlefield()
                .iter()
                .find(|(_, c)| c.is_boss())
                .unwrap();
            // Zone 1: base hp 30 * 8.
            assert_eq!(boss.max_hp, 240);
            assert!(boss.kind.is_none());
        }
    }

    mod elite_tests {
        use super::*;

        #[test]
        fn elite_promotion_doubles_and_triples_exactly() {
            // Force promotion on every spawn.
            let config = TuningConfig {
                elite_chance: 1.0,
                ..TuningConfig::default()
            };
            let mut h = Harness::with_config(5, config);
            h.recruit(HeroClass::Cleric);
            h.tick(1.0);
            h.tick(TuningConfig::default().spawn_interval);

            let (_, elite) = h
                .director
                .battlefield()
                .iter()
                .find(|(_, c)| c.faction == Faction::Enemy)
                .unwrap();
            assert!(elite.is_elite());
            assert!(elite.affix.is_some());
            assert_eq!(elite.max_hp % 2, 0);
            assert_eq!(elite.base_attack % 2, 0);
            assert_eq!(elite.gold_reward % 3, 0);
            assert_eq!(elite.xp_reward % 2, 0);
            if elite.affix == Some(EliteAffix::Shielded) {
                assert!(elite.shield_timer > 0.0);
            }
        }

        #[test]
        fn zero_elite_chance_never_promotes() {
            let config = TuningConfig {
                elite_chance: 0.0,
                ..TuningConfig::default()
            };
            let mut h = Harness::with_config(5, config);
            h.recruit(HeroClass::Cleric);
            h.tick(1.0);
            for _ in 0..5 {
                h.tick(TuningConfig::default().spawn_interval);
            }

            assert!(h
                .director
                .battlefield()
                .iter()
                .filter(|(_, c)| c.faction == Faction::Enemy)
                .all(|(_, c)| !c.is_elite()));
        }
    }

    mod party_tests {
        use super::*;

        #[test]
        fn wipe_announced_once_until_a_revival() {
            let mut h = Harness::new(1);
            let hero = h.recruit(HeroClass::Vanguard);
            h.director
                .battlefield_mut()
                .get_mut(hero)
                .unwrap()
                .apply_damage(10_000);

            h.tick(1.0);
            h.tick(1.0);

            let wipes = h
                .director
                .drain_events()
                .iter()
                .filter(|n| matches!(n, Notification::PartyWiped))
                .count();
            assert_eq!(wipes, 1);
        }

        #[test]
        fn vitals_reflect_hp_for_the_party_store() {
            let mut h = Harness::new(1);
            let hero = h.recruit(HeroClass::Vanguard);
            h.director
                .battlefield_mut()
                .get_mut(hero)
                .unwrap()
                .apply_damage(100);

            let vitals = h.director.hero_vitals();
            assert_eq!(vitals.len(), 1);
            assert_eq!(vitals[0].hp, 400);
            assert!(!vitals[0].incapacitated);
        }

        #[test]
        fn dismiss_only_removes_heroes() {
            let mut h = Harness::new(1);
            let hero = h.recruit(HeroClass::Vanguard);
            let enemy = h.director.battlefield_mut().spawn(Combatant::enemy(
                EnemyKind::Melee,
                Vec2::ZERO,
                30,
                6,
                2,
                60.0,
                120.0,
                10,
                5,
            ));

            assert!(h.director.dismiss_hero(enemy).is_none());
            assert!(h.director.dismiss_hero(hero).is_some());
            assert!(h.director.battlefield().contains(enemy));
        }

        #[test]
        fn reset_clears_registries_and_timers() {
            let mut h = Harness::new(1);
            h.recruit(HeroClass::Vanguard);
            h.tick(1.0);
            h.tick(50.0);
            assert!(!h.director.battlefield().is_empty());

            h.director.reset();
            assert!(h.director.battlefield().is_empty());
            assert_eq!(h.director.phase(), EncounterPhase::Idle);
            assert_eq!(h.director.total_kills(), 0);
        }
    }
}
