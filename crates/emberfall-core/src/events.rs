//! Outbound notifications from the combat core.
//!
//! The core never calls into presentation code. Anything the outside world
//! should react to — audio cues, particle requests, toast text, kill and
//! wave events — is pushed onto the [`EventQueue`] and drained by the caller
//! after each tick. Notifications are strictly one-way: no return value is
//! ever consumed.
//!
//! Ordering guarantee: a notification is pushed only after the state change
//! it describes has fully completed, so a consumer never observes an event
//! ahead of its cause.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::combatant::CombatantId;
use crate::hooks::LootDrop;
use crate::skills::SkillKind;

/// Identifier for a fire-and-forget audio cue.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AudioCue {
    /// An enemy took a hit.
    EnemyHit,
    /// A regular or elite enemy went down.
    EnemyDown,
    /// The boss went down.
    BossDown,
    /// A hero was incapacitated.
    HeroDown,
    /// A hero finished regenerating and rejoined the fight.
    HeroRevived,
    /// A hero skill fired.
    SkillCast,
    /// A wave was cleared.
    WaveCleared,
    /// A zone was cleared.
    ZoneCleared,
}

/// Particle effect requested at a world position.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParticleKind {
    /// Melee impact.
    Slash,
    /// Death burst.
    Burst,
    /// Healing sparkle.
    Heal,
    /// Area-of-effect blast.
    Explosion,
}

/// Why an enemy left the battlefield.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RemovalCause {
    /// Hp reached zero.
    Slain,
    /// Position drifted far outside the play bounds.
    OutOfBounds,
}

/// Narrative flavor event rolled when a zone is cleared.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NarrativeEvent {
    /// A merchant offers wares on the road.
    WanderingMerchant,
    /// The party finds an ancient shrine.
    AncientShrine,
    /// A stash of gold turns up.
    Windfall,
    /// The party camps without incident.
    RestfulNight,
}

/// Progress snapshot handed to the achievement collaborator.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    /// Zone just entered.
    pub zone: u32,
    /// Wave number within the zone.
    pub wave: u32,
    /// Total kills across the whole run.
    pub total_kills: u64,
}

/// A single outbound notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Notification {
    /// Play an audio cue.
    Audio(AudioCue),
    /// Emit particles at a position.
    Particles {
        /// World position of the effect.
        position: Vec2,
        /// Effect kind.
        kind: ParticleKind,
    },
    /// Show toast text.
    Toast(String),
    /// An enemy was removed and its rewards distributed.
    EnemyRemoved {
        /// The removed enemy's id.
        id: CombatantId,
        /// Why it was removed.
        cause: RemovalCause,
        /// It carried an elite affix.
        elite: bool,
        /// It was the boss of a boss wave.
        boss: bool,
    },
    /// A hero was incapacitated.
    HeroDowned {
        /// The downed hero's id.
        id: CombatantId,
    },
    /// A hero finished regenerating.
    HeroRevived {
        /// The revived hero's id.
        id: CombatantId,
    },
    /// A hero skill fired.
    SkillCast {
        /// The casting hero's id.
        caster: CombatantId,
        /// Which skill fired.
        kind: SkillKind,
    },
    /// The loot collaborator produced a drop.
    LootDropped {
        /// The rolled item.
        drop: LootDrop,
    },
    /// The current wave's kill target was met.
    WaveCleared {
        /// Zone the wave belonged to.
        zone: u32,
        /// The cleared wave number.
        wave: u32,
    },
    /// The final wave of a zone was cleared.
    ZoneCleared {
        /// The completed zone.
        zone: u32,
        /// Gold bonus credited for the clear.
        bonus_gold: u64,
    },
    /// Narrative flavor rolled on zone clear.
    Narrative(NarrativeEvent),
    /// Re-check unlockable achievements against this snapshot.
    AchievementCheck(ProgressSnapshot),
    /// Every hero is simultaneously incapacitated.
    PartyWiped,
}

/// FIFO queue of outbound notifications.
///
/// The encounter director pushes during the tick; the caller drains after.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventQueue {
    queue: Vec<Notification>,
}

impl EventQueue {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a notification.
    pub fn push(&mut self, notification: Notification) {
        self.queue.push(notification);
    }

    /// Removes and returns all queued notifications, in push order.
    pub fn drain(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.queue)
    }

    /// Iterates queued notifications without removing them.
    pub fn iter(&self) -> impl Iterator<Item = &Notification> + '_ {
        self.queue.iter()
    }

    /// Number of queued notifications.
    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// True if nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drain_returns_in_push_order_and_empties() {
        let mut queue = EventQueue::new();
        queue.push(Notification::Audio(AudioCue::EnemyHit));
        queue.push(Notification::PartyWiped);

        let drained = queue.drain();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0], Notification::Audio(AudioCue::EnemyHit));
        assert_eq!(drained[1], Notification::PartyWiped);
        assert!(queue.is_empty());
    }

    #[test]
    fn serialization_roundtrip() {
        let event = Notification::EnemyRemoved {
            id: CombatantId::new(3),
            cause: RemovalCause::Slain,
            elite: true,
            boss: false,
        };
        let json = serde_json::to_string(&event).unwrap();
        let back: Notification = serde_json::from_str(&json).unwrap();
        assert_eq!(event, back);
    }
}
