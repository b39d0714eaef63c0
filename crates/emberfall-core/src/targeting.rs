//! Targeting queries over the live combatant set.
//!
//! All queries are linear scans in id order over the battlefield registry,
//! skipping incapacitated combatants. Distance comparisons use strict `<`,
//! so ties resolve to the first candidate found — the registry's natural
//! iteration order.

use crate::combatant::CombatantId;
use crate::registry::Battlefield;

/// Finds the Euclidean-nearest active combatant of the opposing faction.
///
/// Returns `None` when the source is missing or no valid target exists.
#[must_use]
pub fn nearest_hostile(battlefield: &Battlefield, from: CombatantId) -> Option<CombatantId> {
    let source = battlefield.get(from)?;
    let position = source.position;
    let wanted = source.faction.opposite();

    let mut best: Option<(CombatantId, f32)> = None;
    for (id, candidate) in battlefield.iter() {
        if candidate.faction != wanted || candidate.is_incapacitated() {
            continue;
        }
        let distance = position.distance_squared(candidate.position);
        if best.is_none_or(|(_, d)| distance < d) {
            best = Some((id, distance));
        }
    }
    best.map(|(id, _)| id)
}

/// Finds the Euclidean-nearest active combatant of the same faction,
/// excluding the source itself.
#[must_use]
pub fn nearest_friendly(battlefield: &Battlefield, from: CombatantId) -> Option<CombatantId> {
    let source = battlefield.get(from)?;
    let position = source.position;
    let faction = source.faction;

    let mut best: Option<(CombatantId, f32)> = None;
    for (id, candidate) in battlefield.iter() {
        if id == from || candidate.faction != faction || candidate.is_incapacitated() {
            continue;
        }
        let distance = position.distance_squared(candidate.position);
        if best.is_none_or(|(_, d)| distance < d) {
            best = Some((id, distance));
        }
    }
    best.map(|(id, _)| id)
}

/// Finds the same-faction combatant with the lowest `hp/max_hp` ratio,
/// excluding the source and anyone incapacitated.
///
/// If no other ally is damaged, falls back to the source itself when it is
/// damaged; otherwise returns `None`. Used by healer-flagged combatants to
/// pick their pulse target.
#[must_use]
pub fn most_wounded_ally(battlefield: &Battlefield, from: CombatantId) -> Option<CombatantId> {
    let source = battlefield.get(from)?;
    let faction = source.faction;

    let mut best: Option<(CombatantId, f32)> = None;
    for (id, candidate) in battlefield.iter() {
        if id == from || candidate.faction != faction || candidate.is_incapacitated() {
            continue;
        }
        let ratio = candidate.health_ratio();
        if ratio >= 1.0 {
            continue;
        }
        if best.is_none_or(|(_, r)| ratio < r) {
            best = Some((id, ratio));
        }
    }

    if let Some((id, _)) = best {
        return Some(id);
    }
    if !source.is_incapacitated() && source.hp < source.max_hp {
        return Some(from);
    }
    None
}
