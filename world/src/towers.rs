//! Authoritative tower state management utilities.

use std::collections::BTreeMap;
use std::time::Duration;

use spire_defence_core::{TileCoord, TowerId, TowerKind};

/// Tower stored inside the world.
#[derive(Clone, Debug)]
pub(crate) struct TowerState {
    /// Identifier allocated by the world for the tower.
    pub(crate) id: TowerId,
    /// Kind of tower that was constructed.
    pub(crate) kind: TowerKind,
    /// Level the tower currently stands at, starting from zero.
    pub(crate) level: u8,
    /// Tile hosting the tower.
    pub(crate) tile: TileCoord,
    /// Remaining cooldown before the tower may fire again.
    pub(crate) cooldown: Duration,
}

/// Registry that stores towers and manages identifier allocation.
#[derive(Debug)]
pub(crate) struct TowerRegistry {
    entries: BTreeMap<TowerId, TowerState>,
    next_tower_id: TowerId,
}

impl TowerRegistry {
    /// Creates an empty tower registry with a reset identifier counter.
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_tower_id: TowerId::new(0),
        }
    }

    /// Clears every tower and resets identifier allocation.
    pub(crate) fn clear(&mut self) {
        self.entries.clear();
        self.next_tower_id = TowerId::new(0);
    }

    /// Inserts a new level-zero tower and returns its identifier.
    pub(crate) fn place(&mut self, kind: TowerKind, tile: TileCoord) -> TowerId {
        let id = self.next_tower_id;
        self.next_tower_id = TowerId::new(id.get().wrapping_add(1));
        let previous = self.entries.insert(
            id,
            TowerState {
                id,
                kind,
                level: 0,
                tile,
                cooldown: Duration::ZERO,
            },
        );
        debug_assert!(previous.is_none(), "tower ids are never reused");
        id
    }

    /// Removes the tower with the provided identifier, returning its state.
    pub(crate) fn remove(&mut self, id: TowerId) -> Option<TowerState> {
        self.entries.remove(&id)
    }

    /// Retrieves the tower with the provided identifier.
    pub(crate) fn get(&self, id: TowerId) -> Option<&TowerState> {
        self.entries.get(&id)
    }

    /// Retrieves a mutable reference to the tower with the provided identifier.
    pub(crate) fn get_mut(&mut self, id: TowerId) -> Option<&mut TowerState> {
        self.entries.get_mut(&id)
    }

    /// Reports whether any tower occupies the provided tile.
    pub(crate) fn occupies(&self, tile: TileCoord) -> bool {
        self.tower_at(tile).is_some()
    }

    /// Finds the tower hosted on the provided tile, if any.
    pub(crate) fn tower_at(&self, tile: TileCoord) -> Option<&TowerState> {
        self.entries.values().find(|state| state.tile == tile)
    }

    /// Iterates towers in ascending identifier order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = &TowerState> {
        self.entries.values()
    }

    /// Reduces every tower's cooldown by the elapsed time.
    pub(crate) fn tick(&mut self, dt: Duration) {
        for state in self.entries.values_mut() {
            state.cooldown = state.cooldown.saturating_sub(dt);
        }
    }
}
