//! Conversion from SubSpace `server.cfg` settings to dotproduct settings.
//!
//! SubSpace measures angles in 1/40000ths of a full turn and speeds in
//! 1/1000ths of a pixel per tick; dotproduct wants radians and pixels.
use crate::types::*;
use dotproduct_cfg::{LegacySettings, Section};
use std::f64::consts::PI;

/// Converts SubSpace angle units to radians.
pub const ANGLE_FACTOR: f64 = 2.0 * PI / 40000.0;
/// Converts SubSpace speed units to pixels per tick.
pub const SPEED_FACTOR: f64 = 1.0 / 1000.0;
/// Divided by `Misc:BounceFactor` to get each ship's bounce factor.
pub const BOUNCE_FACTOR_SCALE: f64 = 16.0;
/// Radius used for ships whose `Radius` is `0`.
pub const DEFAULT_RADIUS: i64 = 14;
/// SubSpace has no afterburner acceleration setting, every ship gets this.
pub const AFTERBURNER_ACCELERATION: f64 = 0.02;
/// Respawn delay in ticks, for every ship.
pub const RESPAWN_DELAY: i64 = 500;

/// Error indicating settings conversion failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConvertError {
    /// A section the converter needs is not in the settings file.
    #[error("missing section [{0}]")]
    MissingSection(String),
    /// A key the converter needs is not in its section.
    #[error("missing setting {section}:{key}")]
    MissingKey {
        /// The section that was searched.
        section: String,
        /// The key that was not found.
        key: String,
    },
    /// A setting that should be an integer is not.
    #[error("setting {section}:{key} is not an integer: {value:?}")]
    InvalidNumber {
        /// The section containing the setting.
        section: String,
        /// The key of the setting.
        key: String,
        /// The raw value found in the file.
        value: String,
    },
    /// A value derived from this setting does not fit in a 64-bit integer.
    #[error("setting {section}:{key} is out of range")]
    Overflow {
        /// The section containing the setting.
        section: String,
        /// The key of the setting.
        key: String,
    },
    /// `Misc:BounceFactor` is 0, which would give every ship an infinite
    /// bounce factor.
    #[error("Misc:BounceFactor must not be 0")]
    ZeroBounceFactor,
}

/// Typed access to one section of the settings file.
#[derive(Debug, Clone, Copy)]
struct SectionReader<'a> {
    name: &'a str,
    section: &'a Section,
}

impl<'a> SectionReader<'a> {
    fn open(legacy: &'a LegacySettings, name: &'a str) -> Result<Self, ConvertError> {
        let section = legacy
            .section(name)
            .ok_or_else(|| ConvertError::MissingSection(name.to_string()))?;
        Ok(Self { name, section })
    }

    /// Reads an integer setting. Surrounding whitespace and a leading sign are
    /// accepted.
    fn int(&self, key: &str) -> Result<i64, ConvertError> {
        let value = self
            .section
            .get(key)
            .ok_or_else(|| ConvertError::MissingKey {
                section: self.name.to_string(),
                key: key.to_string(),
            })?;
        value
            .trim()
            .parse()
            .map_err(|_| ConvertError::InvalidNumber {
                section: self.name.to_string(),
                key: key.to_string(),
                value: value.to_string(),
            })
    }

    /// Reads an integer setting as a float.
    fn float(&self, key: &str) -> Result<f64, ConvertError> {
        self.int(key).map(|value| value as f64)
    }

    /// Reads a 1-based level setting as a 0-based level.
    fn level(&self, key: &str) -> Result<i64, ConvertError> {
        let level = self.int(key)?;
        level.checked_sub(1).ok_or_else(|| self.overflow(key))
    }

    fn overflow(&self, key: &str) -> ConvertError {
        ConvertError::Overflow {
            section: self.name.to_string(),
            key: key.to_string(),
        }
    }
}

/// The shared sections every ship conversion reads from.
#[derive(Debug, Clone, Copy)]
struct SharedSections<'a> {
    misc: SectionReader<'a>,
    bullet: SectionReader<'a>,
    bomb: SectionReader<'a>,
}

impl<'a> SharedSections<'a> {
    fn open(legacy: &'a LegacySettings) -> Result<Self, ConvertError> {
        Ok(Self {
            misc: SectionReader::open(legacy, "Misc")?,
            bullet: SectionReader::open(legacy, "Bullet")?,
            bomb: SectionReader::open(legacy, "Bomb")?,
        })
    }

    fn bounce_factor(&self) -> Result<f64, ConvertError> {
        let divisor = self.misc.int("BounceFactor")?;
        if divisor == 0 {
            return Err(ConvertError::ZeroBounceFactor);
        }
        Ok(BOUNCE_FACTOR_SCALE / divisor as f64)
    }
}

/// Converts SubSpace settings to a dotproduct settings document.
///
/// The game, map and prize sections have no SubSpace counterpart; they are
/// copied from the converter. `Default` gives the stock dotproduct values.
///
/// ## Usage
///
/// ```rust,ignore
/// use dotproduct_settings::convert::SettingsConverter;
/// let settings = SettingsConverter::default().convert(&legacy)?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct SettingsConverter {
    /// Scoring and team rules to emit.
    pub game: GameSettings,
    /// Map dimensions to emit.
    pub map: MapSettings,
    /// Prize rules to emit.
    pub prize: PrizeSettings,
}

impl SettingsConverter {
    /// Convert a whole settings file.
    ///
    /// Fails without producing any output if a section or key is missing, if
    /// a value is not an integer, or if a derived value overflows.
    pub fn convert(&self, legacy: &LegacySettings) -> Result<Settings, ConvertError> {
        let network = convert_network(legacy)?;
        let ships = ShipKind::ALL
            .iter()
            .map(|&kind| convert_ship(kind, legacy))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Settings {
            game: self.game.clone(),
            network,
            map: self.map.clone(),
            prize: self.prize.clone(),
            ships,
        })
    }
}

/// Convert a whole settings file with the stock game, map and prize sections.
pub fn convert(legacy: &LegacySettings) -> Result<Settings, ConvertError> {
    SettingsConverter::default().convert(legacy)
}

/// Derive the network section from `Misc:SendPositionDelay`.
///
/// The fast delay is a quarter of the normal one, rounded down, and at least
/// one tick.
fn convert_network(legacy: &LegacySettings) -> Result<NetworkSettings, ConvertError> {
    let misc = SectionReader::open(legacy, "Misc")?;
    let send_position_delay = misc.int("SendPositionDelay")?;
    Ok(NetworkSettings {
        send_position_delay,
        fast_send_position_delay: (send_position_delay / 4).max(1),
    })
}

/// Convert the settings for a single ship class.
pub fn convert_ship(kind: ShipKind, legacy: &LegacySettings) -> Result<Ship, ConvertError> {
    let ship = SectionReader::open(legacy, kind.section_name())?;
    let shared = SharedSections::open(legacy)?;

    let radius = match ship.int("Radius")? {
        0 => DEFAULT_RADIUS,
        radius => radius,
    };
    let speed_pixels_per_tick = ship.float("InitialSpeed")? * SPEED_FACTOR;

    let converted = Ship {
        name: kind.section_name().to_string(),
        radius,
        bounce_factor: shared.bounce_factor()?,
        rotation_radians_per_tick: ship.float("InitialRotation")? * ANGLE_FACTOR,
        speed_pixels_per_tick,
        max_energy: ship.int("InitialEnergy")?,
        acceleration_per_tick: ship.float("InitialThrust")? / 1000.0,
        afterburner_max_speed: speed_pixels_per_tick * 2.0,
        afterburner_acceleration: AFTERBURNER_ACCELERATION,
        afterburner_energy: ship.float("AfterburnerEnergy")? / 1000.0,
        recharge_rate: ship.float("InitialRecharge")? / 1000.0,
        respawn_delay: RESPAWN_DELAY,
        bullet: convert_bullet(&ship, &shared)?,
        bomb: convert_bomb(&ship, &shared)?,
        burst: convert_burst(&ship, &shared)?,
    };
    log::debug!(
        "Converted {}: radius {}, speed {}",
        kind,
        converted.radius,
        converted.speed_pixels_per_tick
    );
    Ok(converted)
}

fn convert_bullet(
    ship: &SectionReader<'_>,
    shared: &SharedSections<'_>,
) -> Result<Bullet, ConvertError> {
    let multifire = match ship.int("MultiFireAngle")? {
        0 => None,
        angle => Some(Multifire {
            fire_energy: ship.int("MultiFireEnergy")?,
            fire_delay: ship.int("MultiFireDelay")?,
            angle: angle as f64 * ANGLE_FACTOR,
        }),
    };
    log::trace!("{} multifire: {:?}", ship.name, multifire);

    Ok(Bullet {
        fire_energy: ship.int("BulletFireEnergy")?,
        speed: ship.float("BulletSpeed")? * SPEED_FACTOR,
        fire_delay: ship.int("BulletFireDelay")?,
        lifetime: shared.bullet.int("BulletAliveTime")?,
        damage: shared.bullet.int("BulletDamageLevel")?,
        damage_upgrade: shared.bullet.int("BulletDamageUpgrade")?,
        initial_level: ship.level("InitialGuns")?,
        max_level: ship.level("MaxGuns")?,
        bounces: false,
        multifire,
    })
}

fn convert_bomb(
    ship: &SectionReader<'_>,
    shared: &SharedSections<'_>,
) -> Result<Bomb, ConvertError> {
    let damage = shared.bomb.int("BombDamageLevel")?;
    let blast_radius = shared.bomb.int("BombExplodePixels")?;
    let prox_radius = shared.bomb.int("ProximityDistance")?;

    // SubSpace has no upgrade settings for bomb damage, blast radius or
    // proximity, so the upgrades repeat the base values.
    Ok(Bomb {
        fire_energy: ship.int("BombFireEnergy")?,
        fire_energy_upgrade: ship.int("BombFireEnergyUpgrade")?,
        speed: ship.float("BombSpeed")? * SPEED_FACTOR,
        fire_delay: ship.int("BombFireDelay")?,
        lifetime: shared.bomb.int("BombAliveTime")?,
        damage,
        damage_upgrade: damage,
        initial_level: ship.level("InitialBombs")?,
        max_level: ship.level("MaxBombs")?,
        blast_radius,
        blast_radius_upgrade: blast_radius,
        prox_radius,
        prox_radius_upgrade: prox_radius,
        bounce_count: ship.int("BombBounceCount")?,
        recoil_acceleration: ship.float("BombThrust")? / 1000.0,
    })
}

/// Bursts are modelled as bullets that hit with four upgrades' worth of
/// damage, sharing the gun's fire delay and lifetime.
fn convert_burst(
    ship: &SectionReader<'_>,
    shared: &SharedSections<'_>,
) -> Result<Burst, ConvertError> {
    let level = shared.bullet.int("BulletDamageLevel")?;
    let upgrade = shared.bullet.int("BulletDamageUpgrade")?;
    let damage = upgrade
        .checked_mul(4)
        .and_then(|upgrades| level.checked_add(upgrades))
        .ok_or_else(|| shared.bullet.overflow("BulletDamageUpgrade"))?;
    Ok(Burst {
        fire_delay: ship.int("BulletFireDelay")?,
        lifetime: shared.bullet.int("BulletAliveTime")?,
        damage,
        speed: ship.float("BurstSpeed")? * SPEED_FACTOR,
        shrapnel_count: ship.int("BurstShrapnel")?,
        initial_count: ship.int("InitialBurst")?,
        max_count: ship.int("BurstMax")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SERVER_CFG: &str = include_str!("../test/server.cfg");

    fn legacy() -> LegacySettings {
        SERVER_CFG.parse().expect("failed to parse test settings")
    }

    /// Replace a single setting in the test file.
    fn with_setting(section: &str, key: &str, value: &str) -> LegacySettings {
        let mut legacy = legacy();
        let mut replaced = legacy.section(section).cloned().unwrap_or_default();
        replaced.insert(key, value);
        legacy.insert_section(section, replaced);
        legacy
    }

    /// Remove a single setting from the test file.
    fn without_setting(section: &str, key: &str) -> LegacySettings {
        let mut legacy = legacy();
        let kept: Section = legacy
            .section(section)
            .unwrap()
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        legacy.insert_section(section, kept);
        legacy
    }

    fn assert_close(expected: f64, actual: f64) {
        assert!(
            (expected - actual).abs() < 1e-12,
            "expected {}, got {}",
            expected,
            actual
        );
    }

    #[test]
    fn warbird() -> anyhow::Result<()> {
        let ship = convert_ship(ShipKind::Warbird, &legacy())?;
        assert_eq!("Warbird", ship.name);
        assert_eq!(14, ship.radius);
        assert_close(16.0 / 28.0, ship.bounce_factor);
        assert_close(0.06283185307179587, ship.rotation_radians_per_tick);
        assert_close(3.0, ship.speed_pixels_per_tick);
        assert_eq!(1500, ship.max_energy);
        assert_close(0.016, ship.acceleration_per_tick);
        assert_close(6.0, ship.afterburner_max_speed);
        assert_close(0.02, ship.afterburner_acceleration);
        assert_close(1.2, ship.afterburner_energy);
        assert_close(4.0, ship.recharge_rate);
        assert_eq!(500, ship.respawn_delay);
        Ok(())
    }

    #[test]
    fn warbird_weapons() -> anyhow::Result<()> {
        let ship = convert_ship(ShipKind::Warbird, &legacy())?;

        let bullet = &ship.bullet;
        assert_eq!(300, bullet.fire_energy);
        assert_close(2.0, bullet.speed);
        assert_eq!(50, bullet.fire_delay);
        assert_eq!(550, bullet.lifetime);
        assert_eq!(200, bullet.damage);
        assert_eq!(100, bullet.damage_upgrade);
        assert_eq!(1, bullet.initial_level);
        assert_eq!(2, bullet.max_level);
        assert!(!bullet.bounces);
        assert_eq!(None, bullet.multifire);

        let bomb = &ship.bomb;
        assert_eq!(1500, bomb.fire_energy);
        assert_eq!(500, bomb.fire_energy_upgrade);
        assert_close(2.5, bomb.speed);
        assert_eq!(100, bomb.fire_delay);
        assert_eq!(6000, bomb.lifetime);
        assert_eq!(1100, bomb.damage);
        assert_eq!(1100, bomb.damage_upgrade);
        assert_eq!(-1, bomb.initial_level);
        assert_eq!(-1, bomb.max_level);
        assert_eq!(48, bomb.blast_radius);
        assert_eq!(48, bomb.blast_radius_upgrade);
        assert_eq!(3, bomb.prox_radius);
        assert_eq!(3, bomb.prox_radius_upgrade);
        assert_eq!(0, bomb.bounce_count);
        assert_close(0.3, bomb.recoil_acceleration);

        let burst = &ship.burst;
        assert_eq!(50, burst.fire_delay);
        assert_eq!(550, burst.lifetime);
        assert_eq!(600, burst.damage);
        assert_close(4.0, burst.speed);
        assert_eq!(8, burst.shrapnel_count);
        assert_eq!(0, burst.initial_count);
        assert_eq!(2, burst.max_count);
        Ok(())
    }

    #[test]
    fn radius_zero_means_default() -> anyhow::Result<()> {
        assert_eq!(14, convert_ship(ShipKind::Warbird, &legacy())?.radius);
        assert_eq!(22, convert_ship(ShipKind::Javelin, &legacy())?.radius);
        let legacy = with_setting("Javelin", "Radius", "0");
        assert_eq!(14, convert_ship(ShipKind::Javelin, &legacy)?.radius);
        Ok(())
    }

    #[test]
    fn multifire_only_with_angle() -> anyhow::Result<()> {
        let spider = convert_ship(ShipKind::Spider, &legacy())?;
        let multifire = spider.bullet.multifire.expect("spider should have multifire");
        assert_eq!(600, multifire.fire_energy);
        assert_eq!(45, multifire.fire_delay);
        assert_close(500.0 * 2.0 * PI / 40000.0, multifire.angle);

        let legacy = with_setting("Spider", "MultiFireAngle", "0");
        let spider = convert_ship(ShipKind::Spider, &legacy)?;
        assert_eq!(None, spider.bullet.multifire);
        Ok(())
    }

    #[test]
    fn multifire_keys_are_optional_without_angle() -> anyhow::Result<()> {
        let legacy = without_setting("Warbird", "MultiFireEnergy");
        let ship = convert_ship(ShipKind::Warbird, &legacy)?;
        assert_eq!(None, ship.bullet.multifire);
        Ok(())
    }

    #[test]
    fn convert_ship_is_pure() -> anyhow::Result<()> {
        let legacy = legacy();
        for &kind in ShipKind::ALL.iter() {
            assert_eq!(convert_ship(kind, &legacy)?, convert_ship(kind, &legacy)?);
        }
        Ok(())
    }

    #[test]
    fn ships_in_declared_order() -> anyhow::Result<()> {
        let settings = convert(&legacy())?;
        let names: Vec<&str> = settings.ships.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(
            vec![
                "Warbird",
                "Javelin",
                "Spider",
                "Leviathan",
                "Terrier",
                "Weasel",
                "Lancaster",
                "Shark"
            ],
            names
        );
        Ok(())
    }

    #[test]
    fn fixed_sections_ignore_input() -> anyhow::Result<()> {
        let settings = convert(&legacy())?;
        assert_eq!(
            GameSettings {
                kill_points: 20,
                max_teams: 2
            },
            settings.game
        );
        assert_eq!(
            MapSettings {
                width: 1024,
                height: 1024,
                spawn_radius: 500
            },
            settings.map
        );
        assert_eq!(PrizeSettings::default(), settings.prize);
        assert_eq!(18000, settings.prize.decay_time);
        assert_eq!(vec![1, 0, 0, 0, 0, 0], settings.prize.weights);
        Ok(())
    }

    #[test]
    fn custom_fixed_sections() -> anyhow::Result<()> {
        let converter = SettingsConverter {
            game: GameSettings {
                kill_points: 50,
                max_teams: 4,
            },
            ..Default::default()
        };
        let settings = converter.convert(&legacy())?;
        assert_eq!(50, settings.game.kill_points);
        assert_eq!(4, settings.game.max_teams);
        assert_eq!(MapSettings::default(), settings.map);
        Ok(())
    }

    #[test]
    fn fast_send_delay_rounds_down() -> anyhow::Result<()> {
        let settings = convert(&legacy())?;
        assert_eq!(10, settings.network.send_position_delay);
        assert_eq!(2, settings.network.fast_send_position_delay);

        for (delay, fast) in [("3", 1), ("0", 1), ("4", 1), ("9", 2), ("100", 25)] {
            let legacy = with_setting("Misc", "SendPositionDelay", delay);
            assert_eq!(fast, convert(&legacy)?.network.fast_send_position_delay);
        }
        Ok(())
    }

    #[test]
    fn missing_section() {
        let legacy: LegacySettings = legacy()
            .iter()
            .filter(|(name, _)| name.as_str() != "Shark")
            .map(|(name, section)| (name.clone(), section.clone()))
            .collect();
        assert_eq!(
            Err(ConvertError::MissingSection("Shark".to_string())),
            convert(&legacy)
        );
        assert!(convert_ship(ShipKind::Warbird, &legacy).is_ok());
    }

    #[test]
    fn missing_key() {
        let legacy = without_setting("Bomb", "ProximityDistance");
        assert_eq!(
            Err(ConvertError::MissingKey {
                section: "Bomb".to_string(),
                key: "ProximityDistance".to_string(),
            }),
            convert(&legacy)
        );
    }

    #[test]
    fn invalid_number() {
        let legacy = with_setting("Weasel", "InitialEnergy", "lots");
        assert_eq!(
            Err(ConvertError::InvalidNumber {
                section: "Weasel".to_string(),
                key: "InitialEnergy".to_string(),
                value: "lots".to_string(),
            }),
            convert(&legacy)
        );
    }

    #[test]
    fn lenient_integers() -> anyhow::Result<()> {
        let legacy = with_setting("Warbird", "InitialEnergy", " +1600 ");
        assert_eq!(1600, convert_ship(ShipKind::Warbird, &legacy)?.max_energy);
        Ok(())
    }

    #[test]
    fn values_beyond_32_bits() -> anyhow::Result<()> {
        let legacy = with_setting("Warbird", "InitialEnergy", "3000000000");
        assert_eq!(3_000_000_000, convert_ship(ShipKind::Warbird, &legacy)?.max_energy);

        let legacy = with_setting("Warbird", "InitialGuns", "-2147483648");
        let ship = convert_ship(ShipKind::Warbird, &legacy)?;
        assert_eq!(-2_147_483_649, ship.bullet.initial_level);

        let legacy = with_setting("Bullet", "BulletDamageUpgrade", "600000000");
        let ship = convert_ship(ShipKind::Warbird, &legacy)?;
        assert_eq!(200 + 2_400_000_000, ship.burst.damage);
        Ok(())
    }

    #[test]
    fn level_out_of_range() {
        let min = i64::MIN.to_string();
        for (section, key) in [("Warbird", "InitialGuns"), ("Warbird", "MaxBombs")] {
            let legacy = with_setting(section, key, &min);
            assert_eq!(
                Err(ConvertError::Overflow {
                    section: section.to_string(),
                    key: key.to_string(),
                }),
                convert(&legacy)
            );
        }
    }

    #[test]
    fn burst_damage_out_of_range() {
        let legacy = with_setting("Bullet", "BulletDamageUpgrade", &(i64::MAX / 2).to_string());
        assert_eq!(
            Err(ConvertError::Overflow {
                section: "Bullet".to_string(),
                key: "BulletDamageUpgrade".to_string(),
            }),
            convert(&legacy)
        );

        let legacy = with_setting("Bullet", "BulletDamageLevel", &i64::MAX.to_string());
        assert!(matches!(
            convert(&legacy),
            Err(ConvertError::Overflow { .. })
        ));
    }

    #[test]
    fn too_large_for_64_bits() {
        let legacy = with_setting("Warbird", "InitialEnergy", "99999999999999999999");
        assert!(matches!(
            convert(&legacy),
            Err(ConvertError::InvalidNumber { .. })
        ));
    }

    #[test]
    fn zero_bounce_factor() {
        let legacy = with_setting("Misc", "BounceFactor", "0");
        assert_eq!(Err(ConvertError::ZeroBounceFactor), convert(&legacy));
    }

    #[test]
    fn ship_kind_from_str() {
        assert_eq!(ShipKind::Leviathan, "Leviathan".parse::<ShipKind>().unwrap());
        assert_eq!(ShipKind::Shark, "shark".parse::<ShipKind>().unwrap());
        assert!("Bomber".parse::<ShipKind>().is_err());
    }
}
