//! Battlefield registry: the container for all live combatants.
//!
//! The [`Battlefield`] owns every combatant currently participating in the
//! encounter, heroes and enemies alike. It provides:
//! - Storage with deterministic iteration order (`BTreeMap`)
//! - Monotonic id assignment
//! - Lifecycle management (spawn/remove, faction-wide clears)
//!
//! # Determinism
//!
//! Entity storage uses a `BTreeMap` so that iterating over combatants always
//! produces the same id-ordered sequence across platforms. This order is
//! load-bearing: targeting ties resolve to the first candidate found.
//!
//! # Mutation discipline
//!
//! Only the encounter director (and the state-machine code acting on its
//! behalf) mutates the registry during a tick. Removal during iteration is
//! forbidden; the director marks ids during its scan and sweeps them after
//! the scan completes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::combatant::{Combatant, CombatantId, Faction};

/// Container for all live combatants in an encounter.
///
/// # Example
///
/// ```
/// use emberfall_core::registry::Battlefield;
/// use emberfall_core::combatant::{Combatant, EnemyKind, Faction};
/// use glam::Vec2;
///
/// let mut field = Battlefield::new();
/// let id = field.spawn(Combatant::enemy(
///     EnemyKind::Melee,
///     Vec2::new(100.0, 0.0),
///     30,
///     6,
///     2,
///     60.0,
///     120.0,
///     10,
///     5,
/// ));
///
/// assert!(field.get(id).is_some());
/// assert_eq!(field.faction_count(Faction::Enemy), 1);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Battlefield {
    /// Monotonically increasing id counter.
    next_id: u64,
    /// Combatant storage with deterministic iteration order.
    combatants: BTreeMap<CombatantId, Combatant>,
}

impl Battlefield {
    /// Creates a new empty battlefield.
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_id: 0,
            combatants: BTreeMap::new(),
        }
    }

    /// Adds a combatant and returns its assigned id.
    pub fn spawn(&mut self, combatant: Combatant) -> CombatantId {
        let id = CombatantId::new(self.next_id);
        self.next_id += 1;
        self.combatants.insert(id, combatant);
        id
    }

    /// Removes a combatant, returning it if it existed.
    pub fn remove(&mut self, id: CombatantId) -> Option<Combatant> {
        self.combatants.remove(&id)
    }

    /// Returns a reference to a combatant by id.
    #[must_use]
    pub fn get(&self, id: CombatantId) -> Option<&Combatant> {
        self.combatants.get(&id)
    }

    /// Returns a mutable reference to a combatant by id.
    #[must_use]
    pub fn get_mut(&mut self, id: CombatantId) -> Option<&mut Combatant> {
        self.combatants.get_mut(&id)
    }

    /// True if the id refers to a live combatant.
    #[must_use]
    pub fn contains(&self, id: CombatantId) -> bool {
        self.combatants.contains_key(&id)
    }

    /// Iterates over `(id, combatant)` pairs in id order.
    pub fn iter(&self) -> impl Iterator<Item = (CombatantId, &Combatant)> + '_ {
        self.combatants.iter().map(|(id, c)| (*id, c))
    }

    /// Iterates over ids in id order.
    pub fn ids_sorted(&self) -> impl Iterator<Item = CombatantId> + '_ {
        self.combatants.keys().copied()
    }

    /// Collects the ids of one faction, in id order.
    ///
    /// The returned `Vec` is a snapshot: the caller may mutate the registry
    /// while walking it, which is exactly what the per-tick scan does.
    #[must_use]
    pub fn faction_ids(&self, faction: Faction) -> Vec<CombatantId> {
        self.combatants
            .iter()
            .filter(|(_, c)| c.faction == faction)
            .map(|(id, _)| *id)
            .collect()
    }

    /// Number of live combatants in one faction.
    #[must_use]
    pub fn faction_count(&self, faction: Faction) -> usize {
        self.combatants
            .values()
            .filter(|c| c.faction == faction)
            .count()
    }

    /// Number of non-incapacitated combatants in one faction.
    #[must_use]
    pub fn active_count(&self, faction: Faction) -> usize {
        self.combatants
            .values()
            .filter(|c| c.faction == faction && !c.is_incapacitated())
            .count()
    }

    /// Total number of live combatants.
    #[must_use]
    pub fn len(&self) -> usize {
        self.combatants.len()
    }

    /// True if no combatants are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.combatants.is_empty()
    }

    /// Removes every combatant of one faction.
    pub fn clear_faction(&mut self, faction: Faction) {
        self.combatants.retain(|_, c| c.faction != faction);
    }

    /// Removes every combatant. Id assignment keeps counting.
    pub fn clear(&mut self) {
        self.combatants.clear();
    }
}
