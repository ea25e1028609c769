//! Tools for moving SubSpace arenas to dotproduct.
//!
//! ## Settings Files
//!
//! SubSpace servers keep their arena rules in an INI-style `server.cfg`. The
//! `cfg` module reads those files into raw key-value sections, and the
//! `settings` module converts them to the `settings.json` document loaded by
//! the dotproduct server from `data/arenas/<arena>/settings.json`.
//!
//! ```rust
//! use dotproduct::Settings;
//! let input = std::fs::File::open("./crates/dotproduct-settings/test/server.cfg")
//!     .expect("failed to open file");
//!
//! let settings = Settings::read_legacy_from(input).expect("failed to convert settings");
//! assert_eq!(settings.ships.len(), 8);
//! assert_eq!(settings.ships[7].name, "Shark");
//! ```
//!
//! The `convertsettings` binary wraps this up for the command line:
//!
//! ```text
//! convertsettings server.cfg --output data/arenas/svs/settings.json
//! ```

#![deny(future_incompatible)]
#![deny(nonstandard_style)]
#![deny(rust_2018_idioms)]
#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(unused)]

pub use dotproduct_cfg as cfg;
pub use dotproduct_settings as settings;

pub use dotproduct_cfg::LegacySettings;
pub use dotproduct_settings::Settings;
