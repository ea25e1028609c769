use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A complete dotproduct arena settings document.
///
/// Fields are serialized in declaration order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Scoring and team rules.
    pub game: GameSettings,
    /// Position update timing.
    pub network: NetworkSettings,
    /// Arena dimensions.
    pub map: MapSettings,
    /// Prize (power-up) spawning.
    pub prize: PrizeSettings,
    /// One entry per ship, in [`ShipKind::ALL`] order.
    pub ships: Vec<Ship>,
}

/// Scoring and team rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSettings {
    /// Points awarded for a kill, before bounty.
    pub kill_points: i64,
    /// Number of teams players are balanced across.
    pub max_teams: i64,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            kill_points: 20,
            max_teams: 2,
        }
    }
}

/// Position update timing, in ticks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkSettings {
    /// Ticks between position updates, from `Misc:SendPositionDelay`.
    pub send_position_delay: i64,
    /// Ticks between position updates for nearby ships.
    pub fast_send_position_delay: i64,
}

/// Arena dimensions, in tiles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapSettings {
    /// Map width in tiles.
    pub width: i64,
    /// Map height in tiles.
    pub height: i64,
    /// Distance from the centre within which ships spawn.
    pub spawn_radius: i64,
}

impl Default for MapSettings {
    fn default() -> Self {
        Self {
            width: 1024,
            height: 1024,
            spawn_radius: 500,
        }
    }
}

/// Prize spawning rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrizeSettings {
    /// Ticks before an uncollected prize disappears.
    pub decay_time: i64,
    /// Number of prizes kept on the map.
    pub count: i64,
    /// Distance from the centre within which prizes appear.
    pub radius: i64,
    /// Relative likelihood of each prize type.
    pub weights: Vec<i64>,
}

impl Default for PrizeSettings {
    fn default() -> Self {
        Self {
            decay_time: 18000,
            count: 50,
            radius: 128,
            weights: vec![1, 0, 0, 0, 0, 0],
        }
    }
}

/// The eight ship classes, in the order they appear in the settings document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShipKind {
    /// Ship 1.
    Warbird,
    /// Ship 2.
    Javelin,
    /// Ship 3.
    Spider,
    /// Ship 4.
    Leviathan,
    /// Ship 5.
    Terrier,
    /// Ship 6.
    Weasel,
    /// Ship 7.
    Lancaster,
    /// Ship 8.
    Shark,
}

impl ShipKind {
    /// Every ship class, in output order.
    pub const ALL: [ShipKind; 8] = [
        ShipKind::Warbird,
        ShipKind::Javelin,
        ShipKind::Spider,
        ShipKind::Leviathan,
        ShipKind::Terrier,
        ShipKind::Weasel,
        ShipKind::Lancaster,
        ShipKind::Shark,
    ];

    /// Name of the `server.cfg` section holding this ship's settings. This is
    /// also the ship's name in the output.
    pub fn section_name(self) -> &'static str {
        use ShipKind::*;
        match self {
            Warbird => "Warbird",
            Javelin => "Javelin",
            Spider => "Spider",
            Leviathan => "Leviathan",
            Terrier => "Terrier",
            Weasel => "Weasel",
            Lancaster => "Lancaster",
            Shark => "Shark",
        }
    }
}

impl fmt::Display for ShipKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.section_name())
    }
}

/// The given name is not a known ship class.
#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown ship class {0:?}")]
pub struct ParseShipKindError(String);

impl FromStr for ShipKind {
    type Err = ParseShipKindError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ShipKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.section_name().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseShipKindError(s.to_string()))
    }
}

/// Movement, energy and weapon settings for one ship class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ship {
    /// Ship class name, e.g. `Warbird`.
    pub name: String,
    /// Collision radius in pixels.
    pub radius: i64,
    /// Speed kept after bouncing off a wall.
    pub bounce_factor: f64,
    /// From `InitialRotation`.
    pub rotation_radians_per_tick: f64,
    /// From `InitialSpeed`.
    pub speed_pixels_per_tick: f64,
    /// From `InitialEnergy`.
    pub max_energy: i64,
    /// From `InitialThrust`.
    pub acceleration_per_tick: f64,
    /// Twice the normal top speed.
    pub afterburner_max_speed: f64,
    /// The same for every ship.
    pub afterburner_acceleration: f64,
    /// Energy drained per tick, from `AfterburnerEnergy`.
    pub afterburner_energy: f64,
    /// Energy regained per tick, from `InitialRecharge`.
    pub recharge_rate: f64,
    /// Ticks between death and respawn.
    pub respawn_delay: i64,
    /// Guns.
    pub bullet: Bullet,
    /// Bombs.
    pub bomb: Bomb,
    /// Shrapnel bursts.
    pub burst: Burst,
}

/// Gun settings. Levels are 0-based.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bullet {
    /// From `BulletFireEnergy`.
    pub fire_energy: i64,
    /// Pixels per tick, from `BulletSpeed`.
    pub speed: f64,
    /// Ticks, from `BulletFireDelay`.
    pub fire_delay: i64,
    /// Ticks, from `Bullet:BulletAliveTime`.
    pub lifetime: i64,
    /// From `Bullet:BulletDamageLevel`.
    pub damage: i64,
    /// Extra damage per gun level, from `Bullet:BulletDamageUpgrade`.
    pub damage_upgrade: i64,
    /// From `InitialGuns`.
    pub initial_level: i64,
    /// From `MaxGuns`.
    pub max_level: i64,
    /// Whether bullets bounce off walls.
    pub bounces: bool,
    /// Only ships with a spread angle have a multifire mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multifire: Option<Multifire>,
}

/// Alternate gun mode that fires bullets at a spread angle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Multifire {
    /// From `MultiFireEnergy`.
    pub fire_energy: i64,
    /// Ticks, from `MultiFireDelay`.
    pub fire_delay: i64,
    /// Spread angle in radians.
    pub angle: f64,
}

/// Bomb settings. Levels are 0-based, so a ship without bombs has levels of
/// `-1`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bomb {
    /// From `BombFireEnergy`.
    pub fire_energy: i64,
    /// Extra energy per bomb level, from `BombFireEnergyUpgrade`.
    pub fire_energy_upgrade: i64,
    /// Pixels per tick, from `BombSpeed`.
    pub speed: f64,
    /// Ticks, from `BombFireDelay`.
    pub fire_delay: i64,
    /// Ticks, from `Bomb:BombAliveTime`.
    pub lifetime: i64,
    /// From `Bomb:BombDamageLevel`.
    pub damage: i64,
    /// Same as `damage`.
    pub damage_upgrade: i64,
    /// From `InitialBombs`.
    pub initial_level: i64,
    /// From `MaxBombs`.
    pub max_level: i64,
    /// Pixels, from `Bomb:BombExplodePixels`.
    pub blast_radius: i64,
    /// Same as `blast_radius`.
    pub blast_radius_upgrade: i64,
    /// From `Bomb:ProximityDistance`.
    pub prox_radius: i64,
    /// Same as `prox_radius`.
    pub prox_radius_upgrade: i64,
    /// Wall bounces before a bomb explodes, from `BombBounceCount`.
    pub bounce_count: i64,
    /// Push back on the firing ship, from `BombThrust`.
    pub recoil_acceleration: f64,
}

/// Shrapnel burst settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Burst {
    /// The ship's `BulletFireDelay`.
    pub fire_delay: i64,
    /// `Bullet:BulletAliveTime`.
    pub lifetime: i64,
    /// Bullet damage with four upgrades.
    pub damage: i64,
    /// Pixels per tick, from `BurstSpeed`.
    pub speed: f64,
    /// From `BurstShrapnel`.
    pub shrapnel_count: i64,
    /// From `InitialBurst`.
    pub initial_count: i64,
    /// From `BurstMax`.
    pub max_count: i64,
}
