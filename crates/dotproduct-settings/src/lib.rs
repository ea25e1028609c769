//! Converts SubSpace `server.cfg` settings into the `settings.json` document
//! read by the dotproduct game server.
//!
//! Only the ship, bullet, bomb and position-update settings have SubSpace
//! counterparts. The rest of the document (scoring, map size, prizes) is filled
//! in with dotproduct's stock values.
//!
//! ```rust
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use dotproduct_settings::Settings;
//! let input = std::fs::File::open("./test/server.cfg")?;
//! let settings = Settings::read_legacy_from(input)?;
//! assert_eq!(settings.ships.len(), 8);
//! assert_eq!(settings.ships[0].name, "Warbird");
//! assert_eq!(settings.network.fast_send_position_delay, 2);
//! # Ok(()) }
//! ```
//!
//! ## Known quirks
//!
//! SubSpace has no upgrade settings for bomb damage, blast radius or
//! proximity radius. The `damageUpgrade`, `blastRadiusUpgrade` and
//! `proxRadiusUpgrade` fields therefore repeat their base values.

#![deny(future_incompatible)]
#![deny(nonstandard_style)]
#![deny(rust_2018_idioms)]
#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(unused)]

pub mod convert;
mod types;

use dotproduct_cfg::{LegacySettings, ParseError};
use std::io::{self, Read, Write};

pub use convert::{convert, convert_ship, ConvertError, SettingsConverter};
pub use types::*;

/// Errors that may occur while reading, converting or writing settings.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The SubSpace settings file could not be read.
    #[error(transparent)]
    ParseError(#[from] ParseError),
    /// The SubSpace settings could not be converted.
    #[error(transparent)]
    ConvertError(#[from] ConvertError),
    /// The settings document could not be encoded or decoded.
    #[error("invalid settings JSON: {0}")]
    JsonError(#[from] serde_json::Error),
    /// Writing the settings document failed.
    #[error(transparent)]
    IoError(#[from] io::Error),
}

/// Result type for settings methods.
pub type Result<T> = std::result::Result<T, Error>;

impl Settings {
    /// Convert already parsed SubSpace settings.
    pub fn from_legacy(legacy: &LegacySettings) -> std::result::Result<Self, ConvertError> {
        convert(legacy)
    }

    /// Read and convert a SubSpace `server.cfg` file.
    pub fn read_legacy_from(input: impl Read) -> Result<Self> {
        let legacy = LegacySettings::read_from(input)?;
        Ok(Self::from_legacy(&legacy)?)
    }

    /// Read a dotproduct `settings.json` document.
    pub fn from_json_reader(input: impl Read) -> Result<Self> {
        Ok(serde_json::from_reader(input)?)
    }

    /// Write this document as indented JSON, followed by a newline.
    pub fn write_json_to<W: Write>(&self, output: &mut W) -> Result<()> {
        serde_json::to_writer_pretty(&mut *output, self)?;
        output.write_all(b"\n")?;
        Ok(())
    }

    /// Render this document as indented JSON.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
