//! Authoritative enemy state management utilities.

use std::time::Duration;

use spire_defence_core::{EnemyColor, EnemyId, WorldPoint, WorldVec};

/// Enemy travelling along the lane.
#[derive(Clone, Debug)]
pub(crate) struct Enemy {
    pub(crate) id: EnemyId,
    pub(crate) position: WorldPoint,
    pub(crate) previous_position: WorldPoint,
    pub(crate) velocity: WorldVec,
    pub(crate) health: u32,
    pub(crate) max_health: u32,
    pub(crate) incoming_damage: u32,
    pub(crate) color: EnemyColor,
}

impl Enemy {
    /// Moves the enemy forward, remembering where it stood before the step.
    pub(crate) fn advance(&mut self, dt: Duration) {
        self.previous_position = self.position;
        self.position += self.velocity * dt.as_secs_f32();
    }

    /// Applies damage, saturating at zero health.
    pub(crate) fn absorb(&mut self, damage: u32) {
        self.health = self.health.saturating_sub(damage);
    }

    /// Releases damage previously committed by a projectile in flight.
    pub(crate) fn release_incoming(&mut self, damage: u32) {
        self.incoming_damage = self.incoming_damage.saturating_sub(damage);
    }
}

/// Roster that stores enemies and manages identifier allocation.
#[derive(Debug)]
pub(crate) struct EnemyRoster {
    entries: Vec<Enemy>,
    next_enemy_id: EnemyId,
}

impl EnemyRoster {
    /// Creates an empty roster with a reset identifier counter.
    pub(crate) fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_enemy_id: EnemyId::new(0),
        }
    }

    /// Clears every enemy and resets identifier allocation.
    pub(crate) fn clear(&mut self) {
        self.entries.clear();
        self.next_enemy_id = EnemyId::new(0);
    }

    /// Adds a new enemy at the provided position and returns its identifier.
    pub(crate) fn spawn(
        &mut self,
        position: WorldPoint,
        velocity: WorldVec,
        health: u32,
        color: EnemyColor,
    ) -> EnemyId {
        let id = self.next_enemy_id;
        self.next_enemy_id = EnemyId::new(id.get().wrapping_add(1));
        self.entries.push(Enemy {
            id,
            position,
            previous_position: position,
            velocity,
            health,
            max_health: health,
            incoming_damage: 0,
            color,
        });
        id
    }

    /// Retrieves a mutable reference to the enemy with the provided identifier.
    pub(crate) fn get_mut(&mut self, id: EnemyId) -> Option<&mut Enemy> {
        self.entries.iter_mut().find(|enemy| enemy.id == id)
    }

    /// Reports whether an enemy with the provided identifier is alive.
    pub(crate) fn contains(&self, id: EnemyId) -> bool {
        self.entries.iter().any(|enemy| enemy.id == id)
    }

    /// Iterates enemies in spawn order, which is also ascending id order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = &Enemy> {
        self.entries.iter()
    }

    /// Iterates enemies mutably in spawn order.
    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Enemy> {
        self.entries.iter_mut()
    }

    /// Removes enemies rejected by the predicate, preserving order.
    pub(crate) fn retain<F>(&mut self, keep: F)
    where
        F: FnMut(&Enemy) -> bool,
    {
        self.entries.retain(keep);
    }
}
