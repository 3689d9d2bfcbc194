#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Spire Defence engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! snapshots, and respond exclusively with new command batches.

pub mod geometry;

use std::time::Duration;

use serde::{Deserialize, Serialize};

pub use geometry::{angle_to_vector, predict_intercept, WorldPoint, WorldVec};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Spire Defence.";

/// Unique identifier assigned to a tower.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TowerId(u32);

impl TowerId {
    /// Creates a new tower identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates a new enemy identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a projectile in flight.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProjectileId(u32);

impl ProjectileId {
    /// Creates a new projectile identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Player currency used to buy, upgrade, and refund towers.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Gold(u32);

impl Gold {
    /// Zero gold.
    pub const ZERO: Self = Self(0);

    /// Creates a new gold amount.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the underlying amount.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Adds another amount, saturating at the numeric ceiling.
    #[must_use]
    pub const fn saturating_add(self, other: Gold) -> Gold {
        Gold(self.0.saturating_add(other.0))
    }

    /// Subtracts another amount, saturating at zero.
    #[must_use]
    pub const fn saturating_sub(self, other: Gold) -> Gold {
        Gold(self.0.saturating_sub(other.0))
    }

    /// Reports whether this balance covers the provided price.
    #[must_use]
    pub const fn covers(self, price: Gold) -> bool {
        self.0 >= price.0
    }
}

/// Location of a single grid tile expressed as column and row indices.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileCoord {
    column: u32,
    row: u32,
}

impl TileCoord {
    /// Creates a new tile coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the tile.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the tile.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }
}

/// Selects which point of a tile a conversion should produce.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TileAnchor {
    /// Upper-left corner of the tile.
    TopLeft,
    /// Geometric center of the tile.
    Center,
}

/// Describes the discrete tile layout of the battlefield.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TileGrid {
    columns: u32,
    rows: u32,
    tile_length: f32,
}

impl TileGrid {
    /// Creates a new tile grid description.
    #[must_use]
    pub const fn new(columns: u32, rows: u32, tile_length: f32) -> Self {
        Self {
            columns,
            rows,
            tile_length,
        }
    }

    /// Number of columns contained in the grid.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows contained in the grid.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Side length of a single square tile expressed in world units.
    #[must_use]
    pub const fn tile_length(&self) -> f32 {
        self.tile_length
    }

    /// Total width of the grid measured in world units.
    #[must_use]
    pub const fn width(&self) -> f32 {
        self.columns as f32 * self.tile_length
    }

    /// Total height of the grid measured in world units.
    #[must_use]
    pub const fn height(&self) -> f32 {
        self.rows as f32 * self.tile_length
    }

    /// Reports whether the provided tile lies within the grid bounds.
    #[must_use]
    pub const fn contains(&self, tile: TileCoord) -> bool {
        tile.column() < self.columns && tile.row() < self.rows
    }

    /// Converts a tile coordinate into a world-space position.
    ///
    /// The anchor selects between the tile's upper-left corner and its
    /// center. Out-of-bounds tiles still convert; callers that care about
    /// validity check [`TileGrid::contains`] first.
    #[must_use]
    pub fn tile_to_world(&self, tile: TileCoord, anchor: TileAnchor) -> WorldPoint {
        let corner_x = tile.column() as f32 * self.tile_length;
        let corner_y = tile.row() as f32 * self.tile_length;
        match anchor {
            TileAnchor::TopLeft => WorldPoint::new(corner_x, corner_y),
            TileAnchor::Center => WorldPoint::new(
                corner_x + self.tile_length * 0.5,
                corner_y + self.tile_length * 0.5,
            ),
        }
    }

    /// Converts a world-space position into the tile that contains it.
    ///
    /// Returns `None` for positions left of or above the grid origin and
    /// for positions at or beyond the right/bottom edge.
    #[must_use]
    pub fn world_to_tile(&self, position: WorldPoint) -> Option<TileCoord> {
        if self.tile_length <= f32::EPSILON {
            return None;
        }
        if position.x() < 0.0 || position.y() < 0.0 {
            return None;
        }

        let column = (position.x() / self.tile_length).floor();
        let row = (position.y() / self.tile_length).floor();
        if column >= self.columns as f32 || row >= self.rows as f32 {
            return None;
        }

        Some(TileCoord::new(column as u32, row as u32))
    }
}

/// Visual appearance applied to an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnemyColor {
    red: u8,
    green: u8,
    blue: u8,
}

impl EnemyColor {
    /// Creates a new enemy color from byte RGB components.
    #[must_use]
    pub const fn from_rgb(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Red component of the color.
    #[must_use]
    pub const fn red(&self) -> u8 {
        self.red
    }

    /// Green component of the color.
    #[must_use]
    pub const fn green(&self) -> u8 {
        self.green
    }

    /// Blue component of the color.
    #[must_use]
    pub const fn blue(&self) -> u8 {
        self.blue
    }
}

/// Types of towers that can be constructed on the battlefield.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TowerKind {
    /// Rapid-fire tower with modest damage per shot.
    Pulse,
    /// Slow, heavy-hitting tower with extended reach.
    Cannon,
}

/// Attributes describing a single tower level.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerAttributes {
    /// Gold required to buy this level. Level zero is the purchase price;
    /// later entries are upgrade prices.
    pub cost: Gold,
    /// Targeting radius measured in world units.
    pub range: f32,
    /// Damage applied per projectile hit.
    pub damage: u32,
    /// Minimum time between successive shots.
    pub fire_interval: Duration,
    /// Projectile muzzle speed in world units per second.
    pub projectile_speed: f32,
}

const PULSE_ATTRIBUTES: [TowerAttributes; 3] = [
    TowerAttributes {
        cost: Gold::new(50),
        range: 220.0,
        damage: 8,
        fire_interval: Duration::from_millis(400),
        projectile_speed: 520.0,
    },
    TowerAttributes {
        cost: Gold::new(75),
        range: 250.0,
        damage: 12,
        fire_interval: Duration::from_millis(350),
        projectile_speed: 560.0,
    },
    TowerAttributes {
        cost: Gold::new(120),
        range: 280.0,
        damage: 18,
        fire_interval: Duration::from_millis(300),
        projectile_speed: 600.0,
    },
];

const CANNON_ATTRIBUTES: [TowerAttributes; 3] = [
    TowerAttributes {
        cost: Gold::new(90),
        range: 320.0,
        damage: 30,
        fire_interval: Duration::from_millis(1200),
        projectile_speed: 380.0,
    },
    TowerAttributes {
        cost: Gold::new(140),
        range: 350.0,
        damage: 45,
        fire_interval: Duration::from_millis(1100),
        projectile_speed: 400.0,
    },
    TowerAttributes {
        cost: Gold::new(220),
        range: 380.0,
        damage: 70,
        fire_interval: Duration::from_millis(1000),
        projectile_speed: 420.0,
    },
];

impl TowerKind {
    /// Enumerates every constructible tower kind in presentation order.
    pub const ALL: [TowerKind; 2] = [TowerKind::Pulse, TowerKind::Cannon];

    /// Complete leveled attribute table for the kind.
    ///
    /// Tables are never empty; index zero always exists.
    #[must_use]
    pub const fn attribute_table(self) -> &'static [TowerAttributes] {
        match self {
            TowerKind::Pulse => &PULSE_ATTRIBUTES,
            TowerKind::Cannon => &CANNON_ATTRIBUTES,
        }
    }

    /// Attributes for the provided level, or `None` past the table end.
    #[must_use]
    pub fn attributes(self, level: u8) -> Option<&'static TowerAttributes> {
        self.attribute_table().get(usize::from(level))
    }

    /// Highest level the kind can be upgraded to.
    #[must_use]
    pub fn max_level(self) -> u8 {
        (self.attribute_table().len() - 1) as u8
    }

    /// Gold required to place the tower at level zero.
    #[must_use]
    pub fn purchase_cost(self) -> Gold {
        self.attribute_table()[0].cost
    }

    /// Total gold invested into a tower standing at the provided level.
    ///
    /// Levels past the table end are clamped to the table so a stale level
    /// never panics.
    #[must_use]
    pub fn invested_cost(self, level: u8) -> Gold {
        let table = self.attribute_table();
        let top = usize::from(level).min(table.len() - 1);
        table[..=top]
            .iter()
            .fold(Gold::ZERO, |total, attributes| {
                total.saturating_add(attributes.cost)
            })
    }
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Command {
    /// Configures the battlefield's tile grid using the provided dimensions.
    ConfigureTileGrid {
        /// Number of tile columns laid out in the grid.
        columns: u32,
        /// Number of tile rows laid out in the grid.
        rows: u32,
        /// Length of each square tile measured in world units.
        tile_length: f32,
    },
    /// Resets the player economy to the provided starting values.
    ConfigureEconomy {
        /// Gold balance granted at session start.
        starting_gold: Gold,
        /// Lives available before the session is lost.
        starting_lives: u32,
    },
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Requests that a new enemy enter the lane.
    SpawnEnemy {
        /// Hit points assigned to the enemy.
        health: u32,
        /// Movement speed in world units per second.
        speed: f32,
        /// Appearance to assign to the spawned enemy.
        color: EnemyColor,
    },
    /// Requests placement of a tower on the provided tile.
    PlaceTower {
        /// Type of tower to construct.
        kind: TowerKind,
        /// Tile that should host the tower.
        tile: TileCoord,
    },
    /// Requests an upgrade of an existing tower to its next level.
    UpgradeTower {
        /// Identifier of the tower to upgrade.
        tower: TowerId,
    },
    /// Requests the sale of an existing tower for a partial refund.
    SellTower {
        /// Identifier of the tower to sell.
        tower: TowerId,
    },
    /// Changes which tower is currently selected, if any.
    SelectTower {
        /// Tower to select, or `None` to clear the selection.
        tower: Option<TowerId>,
    },
    /// Requests that a tower fire a projectile toward an aim point.
    FireProjectile {
        /// Identifier of the firing tower.
        tower: TowerId,
        /// Enemy the shot was computed against.
        target: EnemyId,
        /// World-space point the projectile should fly toward.
        aim: WorldPoint,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that an enemy entered the lane.
    EnemySpawned {
        /// Identifier assigned to the enemy.
        enemy: EnemyId,
        /// World-space position the enemy starts at.
        position: WorldPoint,
        /// Hit points the enemy spawned with.
        health: u32,
    },
    /// Reports that an enemy ran out of health.
    EnemyDied {
        /// Identifier of the enemy that died.
        enemy: EnemyId,
        /// Gold awarded for the kill.
        bounty: Gold,
    },
    /// Reports that an enemy reached the end of the lane.
    EnemyEscaped {
        /// Identifier of the escaped enemy.
        enemy: EnemyId,
    },
    /// Reports that an escape cost the player a life.
    LifeLost {
        /// Lives remaining after the loss.
        remaining: u32,
    },
    /// Reports the player's gold balance after it changed.
    GoldChanged {
        /// Balance after the change.
        balance: Gold,
    },
    /// Confirms that a tower was placed.
    TowerPlaced {
        /// Identifier assigned to the tower by the world.
        tower: TowerId,
        /// Type of tower that was placed.
        kind: TowerKind,
        /// Tile hosting the tower.
        tile: TileCoord,
    },
    /// Reports that a tower placement request was rejected.
    TowerPlacementRejected {
        /// Type of tower requested for placement.
        kind: TowerKind,
        /// Tile provided in the placement request.
        tile: TileCoord,
        /// Specific reason the placement failed.
        reason: PlacementError,
    },
    /// Confirms that a tower advanced to a new level.
    TowerUpgraded {
        /// Identifier of the upgraded tower.
        tower: TowerId,
        /// Level the tower now stands at.
        level: u8,
    },
    /// Reports that a tower upgrade request was rejected.
    TowerUpgradeRejected {
        /// Identifier of the tower targeted for upgrade.
        tower: TowerId,
        /// Specific reason the upgrade failed.
        reason: UpgradeError,
    },
    /// Confirms that a tower was sold.
    TowerSold {
        /// Identifier of the tower that was sold.
        tower: TowerId,
        /// Gold refunded to the player.
        refund: Gold,
    },
    /// Reports that a tower sale request was rejected.
    TowerSaleRejected {
        /// Identifier of the tower targeted for sale.
        tower: TowerId,
        /// Specific reason the sale failed.
        reason: SellError,
    },
    /// Announces a change of the selected tower.
    TowerSelected {
        /// Newly selected tower, or `None` when the selection cleared.
        tower: Option<TowerId>,
    },
    /// Confirms that a projectile left a tower's muzzle.
    ProjectileFired {
        /// Identifier assigned to the projectile.
        projectile: ProjectileId,
        /// Tower that fired the shot.
        tower: TowerId,
        /// Enemy the shot was computed against.
        target: EnemyId,
        /// Muzzle position of the shot.
        origin: WorldPoint,
        /// Velocity the projectile departs with.
        velocity: WorldVec,
    },
    /// Reports that a projectile struck an enemy.
    ProjectileHit {
        /// Identifier of the projectile that hit.
        projectile: ProjectileId,
        /// Enemy that absorbed the hit.
        enemy: EnemyId,
        /// Damage applied by the hit.
        damage: u32,
    },
    /// Reports that a projectile ran out of flight time without hitting.
    ProjectileExpired {
        /// Identifier of the expired projectile.
        projectile: ProjectileId,
    },
}

/// Reasons a tower placement request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlacementError {
    /// The requested tile lies outside the configured grid bounds.
    OutOfBounds,
    /// The requested tile overlaps the enemy lane.
    BlocksLane,
    /// The requested tile already hosts a tower.
    Occupied,
    /// The player cannot afford the tower's purchase cost.
    InsufficientGold,
}

/// Reasons a tower upgrade request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UpgradeError {
    /// No tower with the provided identifier exists.
    MissingTower,
    /// The tower already stands at its maximum level.
    MaxLevel,
    /// The player cannot afford the next level's cost.
    InsufficientGold,
}

/// Reasons a tower sale request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SellError {
    /// No tower with the provided identifier exists.
    MissingTower,
}

/// Immutable representation of a single tower's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerSnapshot {
    /// Identifier allocated to the tower by the world.
    pub id: TowerId,
    /// Kind of tower that was constructed.
    pub kind: TowerKind,
    /// Level the tower currently stands at.
    pub level: u8,
    /// Tile hosting the tower.
    pub tile: TileCoord,
    /// Remaining cooldown before the tower may fire again.
    pub cooldown_remaining: Duration,
}

/// Read-only snapshot describing all towers on the battlefield.
#[derive(Clone, Debug, Default)]
pub struct TowerView {
    snapshots: Vec<TowerSnapshot>,
}

impl TowerView {
    /// Creates a new tower view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<TowerSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured tower snapshots in deterministic order.
    #[must_use]
    pub fn iter(&self) -> impl Iterator<Item = &TowerSnapshot> {
        self.snapshots.iter()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<TowerSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a single enemy's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemySnapshot {
    /// Unique identifier assigned to the enemy.
    pub id: EnemyId,
    /// World-space position after the latest tick.
    pub position: WorldPoint,
    /// World-space position before the latest tick, for render interpolation.
    pub previous_position: WorldPoint,
    /// Current velocity in world units per second.
    pub velocity: WorldVec,
    /// Remaining hit points.
    pub health: u32,
    /// Hit points the enemy spawned with.
    pub max_health: u32,
    /// Damage already committed by projectiles in flight.
    pub incoming_damage: u32,
    /// Appearance assigned to the enemy.
    pub color: EnemyColor,
}

/// Read-only snapshot describing all enemies on the lane.
#[derive(Clone, Debug, Default)]
pub struct EnemyView {
    snapshots: Vec<EnemySnapshot>,
}

impl EnemyView {
    /// Creates a new enemy view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<EnemySnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured enemy snapshots in deterministic order.
    #[must_use]
    pub fn iter(&self) -> impl Iterator<Item = &EnemySnapshot> {
        self.snapshots.iter()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<EnemySnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a projectile in flight.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectileSnapshot {
    /// Identifier assigned to the projectile.
    pub id: ProjectileId,
    /// World-space position after the latest tick.
    pub position: WorldPoint,
    /// World-space position before the latest tick, for render interpolation.
    pub previous_position: WorldPoint,
    /// Velocity in world units per second.
    pub velocity: WorldVec,
}

/// Read-only snapshot describing all projectiles in flight.
#[derive(Clone, Debug, Default)]
pub struct ProjectileView {
    snapshots: Vec<ProjectileSnapshot>,
}

impl ProjectileView {
    /// Creates a new projectile view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<ProjectileSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured projectile snapshots in deterministic order.
    #[must_use]
    pub fn iter(&self) -> impl Iterator<Item = &ProjectileSnapshot> {
        self.snapshots.iter()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<ProjectileSnapshot> {
        self.snapshots
    }
}

/// Immutable cooldown readout for a single tower.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TowerCooldownSnapshot {
    /// Identifier of the tower the cooldown belongs to.
    pub tower: TowerId,
    /// Kind of the tower, for attribute lookups.
    pub kind: TowerKind,
    /// Level of the tower, for attribute lookups.
    pub level: u8,
    /// Remaining time before the tower may fire again.
    pub ready_in: Duration,
}

/// Read-only snapshot of every tower's firing cooldown.
#[derive(Clone, Debug, Default)]
pub struct TowerCooldownView {
    snapshots: Vec<TowerCooldownSnapshot>,
}

impl TowerCooldownView {
    /// Creates a new cooldown view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<TowerCooldownSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.tower);
        Self { snapshots }
    }

    /// Iterator over the captured cooldown snapshots in deterministic order.
    #[must_use]
    pub fn iter(&self) -> impl Iterator<Item = &TowerCooldownSnapshot> {
        self.snapshots.iter()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<TowerCooldownSnapshot> {
        self.snapshots
    }
}

/// Firing solution computed by the targeting system for a single tower.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerTarget {
    /// Tower the solution belongs to.
    pub tower: TowerId,
    /// Enemy selected as the tower's target.
    pub enemy: EnemyId,
    /// World-space center of the tower.
    pub tower_center: WorldPoint,
    /// World-space position of the enemy at selection time.
    pub enemy_position: WorldPoint,
    /// Velocity of the enemy at selection time.
    pub enemy_velocity: WorldVec,
    /// Muzzle speed of the tower's projectiles at its current level.
    pub projectile_speed: f32,
}

#[cfg(test)]
mod tests {
    use super::{
        Gold, PlacementError, SellError, TileAnchor, TileCoord, TileGrid, TowerId, TowerKind,
        UpgradeError, WorldPoint,
    };
    use serde::{de::DeserializeOwned, Serialize};

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn tower_id_round_trips_through_bincode() {
        assert_round_trip(&TowerId::new(42));
    }

    #[test]
    fn tower_kind_round_trips_through_bincode() {
        assert_round_trip(&TowerKind::Cannon);
    }

    #[test]
    fn placement_error_round_trips_through_bincode() {
        assert_round_trip(&PlacementError::Occupied);
    }

    #[test]
    fn upgrade_error_round_trips_through_bincode() {
        assert_round_trip(&UpgradeError::MaxLevel);
    }

    #[test]
    fn sell_error_round_trips_through_bincode() {
        assert_round_trip(&SellError::MissingTower);
    }

    #[test]
    fn gold_round_trips_through_bincode() {
        assert_round_trip(&Gold::new(125));
    }

    #[test]
    fn gold_arithmetic_saturates() {
        assert_eq!(Gold::new(5).saturating_sub(Gold::new(9)), Gold::ZERO);
        assert_eq!(
            Gold::new(u32::MAX).saturating_add(Gold::new(1)),
            Gold::new(u32::MAX)
        );
        assert!(Gold::new(10).covers(Gold::new(10)));
        assert!(!Gold::new(9).covers(Gold::new(10)));
    }

    #[test]
    fn attribute_tables_are_well_formed() {
        for kind in TowerKind::ALL {
            let table = kind.attribute_table();
            assert!(!table.is_empty());
            for attributes in table {
                assert!(attributes.range > 0.0);
                assert!(attributes.projectile_speed > 0.0);
                assert!(attributes.damage > 0);
                assert!(!attributes.fire_interval.is_zero());
            }
        }
    }

    #[test]
    fn attribute_lookup_is_bounds_checked() {
        let kind = TowerKind::Pulse;
        assert!(kind.attributes(0).is_some());
        assert!(kind.attributes(kind.max_level()).is_some());
        assert!(kind.attributes(kind.max_level() + 1).is_none());
    }

    #[test]
    fn invested_cost_sums_levels_and_clamps() {
        let kind = TowerKind::Pulse;
        let table = kind.attribute_table();
        let expected = table[0]
            .cost
            .saturating_add(table[1].cost)
            .saturating_add(table[2].cost);

        assert_eq!(kind.invested_cost(0), table[0].cost);
        assert_eq!(kind.invested_cost(2), expected);
        assert_eq!(kind.invested_cost(200), expected);
    }

    #[test]
    fn tile_to_world_honors_the_anchor() {
        let grid = TileGrid::new(12, 8, 100.0);
        let tile = TileCoord::new(3, 2);

        let corner = grid.tile_to_world(tile, TileAnchor::TopLeft);
        assert_eq!(corner, WorldPoint::new(300.0, 200.0));

        let center = grid.tile_to_world(tile, TileAnchor::Center);
        assert_eq!(center, WorldPoint::new(350.0, 250.0));
    }

    #[test]
    fn world_to_tile_floors_within_bounds() {
        let grid = TileGrid::new(4, 3, 50.0);

        assert_eq!(
            grid.world_to_tile(WorldPoint::new(0.0, 0.0)),
            Some(TileCoord::new(0, 0))
        );
        assert_eq!(
            grid.world_to_tile(WorldPoint::new(99.9, 149.0)),
            Some(TileCoord::new(1, 2))
        );
    }

    #[test]
    fn world_to_tile_rejects_outside_positions() {
        let grid = TileGrid::new(4, 3, 50.0);

        assert!(grid.world_to_tile(WorldPoint::new(-0.1, 10.0)).is_none());
        assert!(grid.world_to_tile(WorldPoint::new(10.0, -0.1)).is_none());
        assert!(grid.world_to_tile(WorldPoint::new(200.0, 10.0)).is_none());
        assert!(grid.world_to_tile(WorldPoint::new(10.0, 150.0)).is_none());
    }

    #[test]
    fn conversions_round_trip_through_tile_centers() {
        let grid = TileGrid::new(6, 6, 80.0);
        for column in 0..6 {
            for row in 0..6 {
                let tile = TileCoord::new(column, row);
                let center = grid.tile_to_world(tile, TileAnchor::Center);
                assert_eq!(grid.world_to_tile(center), Some(tile));
            }
        }
    }
}
