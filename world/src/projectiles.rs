//! Authoritative projectile state management utilities.

use std::time::Duration;

use spire_defence_core::{EnemyId, ProjectileId, WorldPoint, WorldVec};

/// Ballistic projectile in flight.
///
/// Projectiles fly in a straight line; `aimed_at` only records which enemy
/// the shot was computed against so the incoming-damage ledger can be
/// settled when the flight ends.
#[derive(Clone, Debug)]
pub(crate) struct Projectile {
    pub(crate) id: ProjectileId,
    pub(crate) position: WorldPoint,
    pub(crate) previous_position: WorldPoint,
    pub(crate) velocity: WorldVec,
    pub(crate) damage: u32,
    pub(crate) aimed_at: EnemyId,
    pub(crate) remaining: Duration,
}

impl Projectile {
    /// Moves the projectile forward and burns flight time.
    pub(crate) fn advance(&mut self, dt: Duration) {
        self.previous_position = self.position;
        self.position += self.velocity * dt.as_secs_f32();
        self.remaining = self.remaining.saturating_sub(dt);
    }

    /// Reports whether the projectile ran out of flight time.
    pub(crate) fn expired(&self) -> bool {
        self.remaining.is_zero()
    }
}

/// Storage for projectiles in flight with identifier allocation.
#[derive(Debug)]
pub(crate) struct ProjectileStore {
    entries: Vec<Projectile>,
    next_projectile_id: ProjectileId,
}

impl ProjectileStore {
    /// Creates an empty store with a reset identifier counter.
    pub(crate) fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_projectile_id: ProjectileId::new(0),
        }
    }

    /// Clears every projectile and resets identifier allocation.
    pub(crate) fn clear(&mut self) {
        self.entries.clear();
        self.next_projectile_id = ProjectileId::new(0);
    }

    /// Launches a new projectile and returns its identifier.
    pub(crate) fn launch(
        &mut self,
        origin: WorldPoint,
        velocity: WorldVec,
        damage: u32,
        aimed_at: EnemyId,
        lifetime: Duration,
    ) -> ProjectileId {
        let id = self.next_projectile_id;
        self.next_projectile_id = ProjectileId::new(id.get().wrapping_add(1));
        self.entries.push(Projectile {
            id,
            position: origin,
            previous_position: origin,
            velocity,
            damage,
            aimed_at,
            remaining: lifetime,
        });
        id
    }

    /// Iterates projectiles in launch order, which is ascending id order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = &Projectile> {
        self.entries.iter()
    }

    /// Iterates projectiles mutably in launch order.
    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Projectile> {
        self.entries.iter_mut()
    }

    /// Removes projectiles rejected by the predicate, preserving order.
    pub(crate) fn retain<F>(&mut self, keep: F)
    where
        F: FnMut(&Projectile) -> bool,
    {
        self.entries.retain(keep);
    }
}
