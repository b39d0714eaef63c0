//! # Emberfall Core
//!
//! Wave-combat and encounter orchestration core for Emberfall.
//!
//! This crate is the headless, deterministic simulation heart of a
//! wave-based idle RPG: it resolves attacks, healing, critical hits, elite
//! modifiers, and skill activations between a player party and procedurally
//! spawned enemy waves, and it drives the wave/zone progression state
//! machine.
//!
//! ## Architecture
//!
//! - **Combatants** ([`combatant`]): pure data records, indexed by id
//! - **Battlefield** ([`registry`]): the live registry with deterministic
//!   iteration order
//! - **Resolver** ([`resolver`]): damage and heal math
//! - **Targeting** ([`targeting`]): nearest-entity and triage queries
//! - **Skills** ([`skills`]): class abilities on delta-driven cooldowns
//! - **Lifecycle** ([`lifecycle`]): the per-combatant state machine
//! - **Encounter** ([`encounter`]): spawn scheduling, wave clears, rewards
//!
//! Rendering, persistence, audio, and platform integration are external
//! collaborators; they consume drained notifications and the hero vitals
//! read-back, and they feed in multipliers through the [`hooks`] traits.
//!
//! ## Scheduling model
//!
//! Single-threaded, cooperative, frame-driven. An external per-frame tick
//! supplies a delta-time scalar; everything a tick triggers completes
//! synchronously within that tick, in a fixed order.
//!
//! ## Usage
//!
//! ```
//! use emberfall_core::combatant::{HeroClass, HeroSpec};
//! use emberfall_core::encounter::{EncounterDirector, TickContext, WaveProgress};
//! use emberfall_core::hooks::{LootDrop, LootTable, LootTier, ResourceLedger, StaticModifiers};
//! use emberfall_core::combatant::CombatantId;
//! use glam::Vec2;
//!
//! struct NoLoot;
//! impl LootTable for NoLoot {
//!     fn roll(&mut self, _tier: LootTier) -> Option<LootDrop> {
//!         None
//!     }
//! }
//!
//! #[derive(Default)]
//! struct Pool {
//!     gold: u64,
//! }
//! impl ResourceLedger for Pool {
//!     fn credit_gold(&mut self, amount: u64) {
//!         self.gold += amount;
//!     }
//!     fn credit_xp(&mut self, _hero: CombatantId, _amount: u64) {}
//!     fn credit_souls(&mut self, _amount: u64) {}
//!     fn gold_balance(&self) -> u64 {
//!         self.gold
//!     }
//! }
//!
//! let mut director = EncounterDirector::new(42);
//! director.recruit_hero(&HeroSpec {
//!     class: HeroClass::Vanguard,
//!     position: Vec2::ZERO,
//!     max_hp: 100,
//!     attack: 20,
//!     defense: 10,
//!     range: 60.0,
//!     attack_interval: 90.0,
//! });
//!
//! let mut wave = WaveProgress::new(5, 10);
//! let modifiers = StaticModifiers::default();
//! let mut loot = NoLoot;
//! let mut pool = Pool::default();
//!
//! for _ in 0..600 {
//!     let mut ctx = TickContext {
//!         wave: &mut wave,
//!         modifiers: &modifiers,
//!         loot: &mut loot,
//!         ledger: &mut pool,
//!     };
//!     director.tick(1.0, &mut ctx);
//! }
//!
//! for notification in director.drain_events() {
//!     // hand off to audio / particles / toasts
//!     let _ = notification;
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod combatant;
pub mod config;
pub mod encounter;
pub mod events;
pub mod hooks;
pub mod lifecycle;
pub mod registry;
pub mod resolver;
pub mod skills;
pub mod targeting;

pub use combatant::{Combatant, CombatantId, EliteAffix, Faction, HeroClass, HeroSpec};
pub use config::TuningConfig;
pub use encounter::{EncounterDirector, EncounterPhase, TickContext, WaveProgress};
pub use events::{EventQueue, Notification};
pub use registry::Battlefield;

#[cfg(test)]
mod tests;
